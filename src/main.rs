//! Material catalog CLI
//!
//! Browse, filter, compare and export construction material records.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::{Level, debug, info};

use material_catalog::aggregate::{self, GroupBy};
use material_catalog::assembly::{self, Layer};
use material_catalog::card;
use material_catalog::config::CatalogConfig;
use material_catalog::export;
use material_catalog::filter::{self, FilterCriteria, Range, SortOrder};
use material_catalog::{Catalog, Column, Enrichment, EnrichmentCache, RecordStore, db};

#[derive(Parser)]
#[command(name = "material-catalog")]
#[command(about = "Browse and compare construction material records")]
struct Cli {
    /// Path to the semicolon-separated materials CSV
    #[arg(short, long, global = true, default_value = "materiaux_clean.csv")]
    data: PathBuf,

    /// Read materials from this SQLite database instead of the CSV
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Optional JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file into a SQLite database
    Import {
        /// CSV file to import
        source: PathBuf,

        /// Database to create or replace
        #[arg(short, long, default_value = "materiaux.db")]
        output: PathBuf,
    },

    /// List materials matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show the card of a material
    Show {
        /// Material name
        name: String,
    },

    /// Export the filtered materials as delimited text
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare up to six materials side by side
    Compare {
        /// Material names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Catalog statistics with a biosourced focus
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List the values offered for a text column
    Options {
        /// Column header, e.g. "type" or "sous_type"
        column: String,

        /// Narrow subtypes to these types
        #[arg(long = "type")]
        types: Vec<String>,
    },

    /// Thermal resistance of a wall assembly, layers given as NAME:CM
    Assembly {
        #[arg(required = true, num_args = 1..=assembly::MAX_LAYERS)]
        layers: Vec<String>,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive text searched in name and description
    #[arg(short, long, default_value = "")]
    search: String,

    #[arg(long = "type")]
    types: Vec<String>,

    #[arg(long = "subtype")]
    subtypes: Vec<String>,

    #[arg(long)]
    density_min: Option<f64>,

    #[arg(long)]
    density_max: Option<f64>,

    #[arg(long)]
    lambda_min: Option<f64>,

    #[arg(long)]
    lambda_max: Option<f64>,

    #[arg(long = "country")]
    countries: Vec<String>,

    #[arg(long = "manufacturer")]
    manufacturers: Vec<String>,

    #[arg(long, value_enum)]
    sort: Option<SortOrder>,
}

impl FilterArgs {
    /// Open-ended bounds default to the observed range of the column
    fn to_criteria(&self, catalog: &Catalog, config: &CatalogConfig) -> FilterCriteria {
        let bounded = |min: Option<f64>, max: Option<f64>, column: Column, fallback: (f64, f64)| {
            if min.is_none() && max.is_none() {
                return None;
            }
            let observed = filter::value_range(catalog, column, fallback);
            Some(Range::new(min.unwrap_or(observed.min), max.unwrap_or(observed.max)))
        };

        FilterCriteria {
            search: self.search.clone(),
            types: self.types.clone(),
            subtypes: self.subtypes.clone(),
            density: bounded(self.density_min, self.density_max, Column::Density, config.density_fallback),
            conductivity: bounded(
                self.lambda_min,
                self.lambda_max,
                Column::Conductivity,
                config.conductivity_fallback,
            ),
            countries: self.countries.clone(),
            manufacturers: self.manufacturers.clone(),
            sort: self.sort,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_store(cli: &Cli, config: &CatalogConfig) -> Result<RecordStore> {
    let store = match &cli.database {
        Some(path) => {
            let conn = Connection::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))?;
            db::load_store(&conn)?
        }
        None => RecordStore::load_csv(&cli.data, config.delimiter_byte())
            .with_context(|| format!("Failed to load {}", cli.data.display()))?,
    };
    Ok(store)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => CatalogConfig::load_from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => CatalogConfig::default(),
    };
    debug!("Using configuration {:?}", config);

    if let Commands::Import { source, output } = &cli.command {
        return import(source, output, &config);
    }

    let store = load_store(&cli, &config)?;
    let mut cache = EnrichmentCache::new();
    let catalog = cache.get(
        &store,
        Enrichment {
            eco_score: config.eco_score,
        },
    );

    match &cli.command {
        Commands::Import { .. } => unreachable!("handled before loading"),

        Commands::List { filters } => {
            let criteria = filters.to_criteria(&catalog, &config);
            let views = filter::apply(&catalog, &criteria);
            println!("Showing {} of {} material(s)", views.len(), catalog.len());
            println!(
                "{:<32} {:<18} {:>12} {:>10} {:>6} {:>4}",
                "Material", "Type", "Density", "λ", "Eco", "Bio"
            );
            println!("{}", "-".repeat(87));
            for v in &views {
                println!(
                    "{:<32} {:<18} {:>12} {:>10} {:>6} {:>4}",
                    v.name().unwrap_or("—"),
                    v.text(Column::Type).unwrap_or("—"),
                    card::format_value(v.number(Column::Density), ""),
                    card::format_value(v.number(Column::Conductivity), ""),
                    v.eco_score.map_or("—".to_string(), |e| format!("{:.1}", e)),
                    if v.biosourced { "yes" } else { "" }
                );
            }
        }

        Commands::Show { name } => match catalog.find(name) {
            Some(view) => print!("{}", card::render_card(&view)),
            None => bail!("Material '{}' not found", name),
        },

        Commands::Export { filters, output } => {
            let criteria = filters.to_criteria(&catalog, &config);
            let views = filter::apply(&catalog, &criteria);
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    export::write_csv(&catalog, &views, file, config.delimiter_byte())?;
                    info!("Exported {} materials to {}", views.len(), path.display());
                }
                None => export::write_csv(&catalog, &views, io::stdout().lock(), config.delimiter_byte())?,
            }
        }

        Commands::Compare { names } => {
            if names.len() > card::MAX_COMPARED {
                bail!("At most {} materials can be compared", card::MAX_COMPARED);
            }
            let views = card::select_for_comparison(&catalog, names);
            if views.is_empty() {
                println!("None of the given materials were found.");
            } else {
                print!("{}", card::render_comparison(&catalog, &views));
            }
        }

        Commands::Stats { filters } => {
            let criteria = filters.to_criteria(&catalog, &config);
            print_stats(&catalog, &criteria);
        }

        Commands::Options { column, types } => {
            let column = Column::from_header(column)
                .with_context(|| format!("Unknown column '{}'", column))?;
            let values = if column == Column::Subtype {
                filter::subtype_options(&catalog, types)
            } else {
                filter::options(catalog.views(), catalog.columns(), column)
            };
            if values.is_empty() {
                println!("No values for '{}' in this dataset.", column);
            }
            for value in values {
                println!("  {}", value);
            }
        }

        Commands::Assembly { layers } => {
            let layers = layers
                .iter()
                .map(|s| Layer::parse(s))
                .collect::<material_catalog::Result<Vec<_>>>()?;
            let result = assembly::compute_assembly(&catalog, &layers)?;
            print!("{}", result);
        }
    }

    Ok(())
}

fn import(source: &Path, output: &Path, config: &CatalogConfig) -> Result<()> {
    let store = RecordStore::load_csv(source, config.delimiter_byte())
        .with_context(|| format!("Failed to load {}", source.display()))?;
    let conn = Connection::open(output)
        .with_context(|| format!("Failed to open database {}", output.display()))?;
    let count = db::import_store(&conn, &store)?;
    println!("Imported {} materials into {} (table '{}')", count, output.display(), db::TABLE);
    Ok(())
}

fn print_stats(catalog: &Catalog, criteria: &FilterCriteria) {
    let all = catalog.views();
    let filtered = filter::apply(catalog, criteria);
    let columns = catalog.columns();

    let overview = aggregate::overview(&all, &filtered, columns);
    let count_or_dash = |n: Option<usize>| n.map_or("—".to_string(), |n| n.to_string());
    println!("=== Catalog ===");
    println!("  Total materials:    {}", overview.total);
    println!("  Filtered results:   {}", overview.filtered);
    println!("  Material types:     {}", count_or_dash(overview.types));
    println!("  Countries:          {}", count_or_dash(overview.countries));
    println!("  Average density:    {}", card::format_value(overview.mean_density, " kg/m³"));
    println!("  Average λ:          {}", card::format_value(overview.mean_conductivity, " W/m·K"));
    println!("  Average CO₂:        {}", card::format_value(overview.mean_carbon, " kgCO₂e/kg"));
    println!();

    println!("=== Materials per type ===");
    for (kind, count) in aggregate::group_count(&all, columns, GroupBy::Column(Column::Type)) {
        println!("  {:<30} {:>5}", kind, count);
    }
    println!();

    if catalog.has_column(Column::EcoScore) {
        println!("=== Mean eco-score per type ===");
        for (kind, mean) in aggregate::group_mean(&all, columns, GroupBy::Column(Column::Type), Column::EcoScore) {
            println!("  {:<30} {:>6.1}", kind, mean);
        }
        println!();
    }

    let bio = aggregate::biosourced_stats(&all, columns);
    println!("=== Biosourced ===");
    println!("  Biosourced materials: {} of {}", bio.biosourced, bio.total);
    println!("  Share of biosourced:  {:.1} %", bio.share_pct);
    for (column, bio_mean, other_mean) in &bio.means {
        match (bio_mean, other_mean) {
            (Some(b), Some(o)) => println!("  {:<30} biosourced {:>10.3}  other {:>10.3}", column.header(), b, o),
            _ => println!("  {:<30} not enough data", column.header()),
        }
    }
    if bio.conductivity_by_type.is_empty() {
        println!("  No biosourced materials to report λ by type.");
    } else {
        println!("  Biosourced λ by type:");
        for (kind, lambda) in &bio.conductivity_by_type {
            println!("    {:<28} {:>8.3}", kind, lambda);
        }
    }
}

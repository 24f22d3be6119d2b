//! Record store: the immutable table of material records for a session
//!
//! Loading normalises the raw cells the way the catalog dataset is cleaned:
//! text is trimmed with whitespace runs collapsed, numbers accept a decimal
//! comma and embedded spaces, and anything unparseable becomes absent.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::models::{Column, ColumnSet, Header, MaterialRecord};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

const BOM: char = '\u{feff}';

/// Shared, read-only record table plus the schema it was loaded with
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<Vec<MaterialRecord>>,
    headers: Arc<Vec<Header>>,
    columns: ColumnSet,
}

impl RecordStore {
    /// Build a store from records that already share one schema
    pub fn new(records: Vec<MaterialRecord>, headers: Vec<Header>) -> Self {
        let columns = headers.iter().filter_map(Header::column).collect();
        Self {
            records: Arc::new(records),
            headers: Arc::new(headers),
            columns,
        }
    }

    /// Build a store from records, declaring every source column present
    pub fn from_records(records: Vec<MaterialRecord>) -> Self {
        let headers = Column::SOURCE.into_iter().map(Header::known).collect();
        Self::new(records, headers)
    }

    /// Build a store from raw header names and raw string cells
    pub fn from_table<I>(raw_headers: &[String], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<Option<String>>>,
    {
        if raw_headers.is_empty() {
            return Err(CatalogError::Dataset("no header row".to_string()));
        }

        let layout = resolve_headers(raw_headers);
        let mut records = Vec::new();
        for row in rows {
            let mut record = MaterialRecord {
                extra: vec![None; layout.extra_count],
                ..MaterialRecord::default()
            };
            for (idx, target) in layout.targets.iter().enumerate() {
                let raw = row.get(idx).and_then(|c| c.as_deref());
                match target {
                    Target::Skip => {}
                    Target::Column(column) if column.is_numeric() => {
                        record.set_number(*column, raw.and_then(parse_number));
                    }
                    Target::Column(column) => {
                        record.set_text(*column, raw.and_then(normalize_text));
                    }
                    Target::Extra(slot) => {
                        record.extra[*slot] = raw.and_then(normalize_text);
                    }
                }
            }
            records.push(record);
        }

        let store = Self::new(records, layout.headers);
        debug!(
            "Resolved {} known columns out of {} headers",
            store.columns.iter().count(),
            store.headers.len()
        );
        Ok(store)
    }

    pub fn load_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading materials from {}", path.display());
        let file = File::open(path)?;
        let store = Self::from_reader(file, delimiter)?;
        info!("Loaded {} materials", store.len());
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let rec = result?;
            rows.push(rec.iter().map(|c| Some(c.to_string())).collect());
        }
        Self::from_table(&headers, rows)
    }

    pub fn records(&self) -> &[MaterialRecord] {
        &self.records
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Two stores are the same snapshot when they share the record table
    pub fn same_snapshot(&self, other: &RecordStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

enum Target {
    Skip,
    Column(Column),
    Extra(usize),
}

struct Layout {
    headers: Vec<Header>,
    targets: Vec<Target>,
    extra_count: usize,
}

fn resolve_headers(raw_headers: &[String]) -> Layout {
    let mut headers: Vec<Header> = Vec::new();
    let mut targets = Vec::new();
    let mut seen = ColumnSet::new();
    let mut extra_count = 0;

    for (idx, raw) in raw_headers.iter().enumerate() {
        let name = if idx == 0 {
            raw.trim_start_matches(BOM).trim()
        } else {
            raw.trim()
        };

        if name.is_empty() || name.starts_with("Unnamed") {
            targets.push(Target::Skip);
            continue;
        }

        match Column::from_header(name) {
            Some(Column::EcoScore) => {
                warn!("Ignoring source column '{}': eco-score is always recomputed", name);
                targets.push(Target::Skip);
            }
            Some(column) if !seen.contains(column) => {
                seen.insert(column);
                let name = unique_name(&headers, name);
                headers.push(Header::Known { column, name });
                targets.push(Target::Column(column));
            }
            _ => {
                let name = unique_name(&headers, name);
                headers.push(Header::Extra { name, slot: extra_count });
                targets.push(Target::Extra(extra_count));
                extra_count += 1;
            }
        }
    }

    Layout {
        headers,
        targets,
        extra_count,
    }
}

/// Suffix `.1`, `.2`, ... until the name differs from every kept header, ignoring case
fn unique_name(headers: &[Header], name: &str) -> String {
    let taken = |candidate: &str| headers.iter().any(|h| h.name().eq_ignore_ascii_case(candidate));
    if !taken(name) {
        return name.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}.{}", name, n);
        if !taken(&candidate) {
            debug!("Renamed duplicate column '{}' to '{}'", name, candidate);
            return candidate;
        }
        n += 1;
    }
}

/// Trim, collapse internal whitespace, and treat empty or `nan` as absent
pub fn normalize_text(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    if collapsed.is_empty() || collapsed == "nan" {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Parse a number written with a decimal comma and optional spaces
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}nom;type;masse_volumique_kg_m3;conductivite_w_mk;Unnamed: 4;notes\n\
                          Laine  de   bois ;Isolant;  55 ;0,038;;  souple \n\
                          Béton;Structure;2 400;n/a;;\n";

    #[test]
    fn loads_and_normalises_cells() {
        let store = RecordStore::from_reader(SAMPLE.as_bytes(), b';').unwrap();
        assert_eq!(store.len(), 2);

        let wood = &store.records()[0];
        assert_eq!(wood.name.as_deref(), Some("Laine de bois"));
        assert_eq!(wood.density_kg_m3, Some(55.0));
        assert_eq!(wood.thermal_conductivity_w_mk, Some(0.038));
        assert_eq!(wood.extra(0), Some("souple"));

        let concrete = &store.records()[1];
        assert_eq!(concrete.density_kg_m3, Some(2400.0));
        assert_eq!(concrete.thermal_conductivity_w_mk, None);
        assert_eq!(concrete.extra(0), None);
    }

    #[test]
    fn schema_drops_unnamed_and_keeps_extras() {
        let store = RecordStore::from_reader(SAMPLE.as_bytes(), b';').unwrap();
        let names: Vec<&str> = store.headers().iter().map(|h| h.name()).collect();
        assert_eq!(
            names,
            vec!["nom", "type", "masse_volumique_kg_m3", "conductivite_w_mk", "notes"]
        );
        assert!(store.columns().contains(Column::Density));
        assert!(!store.columns().contains(Column::Cost));
    }

    #[test]
    fn blank_headers_are_dropped() {
        let store = RecordStore::from_reader("nom;type;;\nA;Isolant;;\nB;Terre;;\n".as_bytes(), b';').unwrap();
        let names: Vec<&str> = store.headers().iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["nom", "type"]);
        assert_eq!(store.records()[1].material_type.as_deref(), Some("Terre"));
    }

    #[test]
    fn duplicate_headers_get_distinct_names() {
        let csv = "nom;NOM;notes;Notes;notes\nA;B;x;y;z\n";
        let store = RecordStore::from_reader(csv.as_bytes(), b';').unwrap();
        let names: Vec<&str> = store.headers().iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["nom", "NOM.1", "notes", "Notes.1", "notes.2"]);

        let record = &store.records()[0];
        assert_eq!(record.name.as_deref(), Some("A"));
        assert_eq!(record.extra(0), Some("B"));
        assert_eq!(record.extra(3), Some("z"));
    }

    #[test]
    fn english_headers_keep_their_text() {
        let store = RecordStore::from_reader("name;cost_eur_m2\nA;10\n".as_bytes(), b';').unwrap();
        let names: Vec<&str> = store.headers().iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["name", "cost_eur_m2"]);
        assert!(store.columns().contains(Column::Cost));
        assert_eq!(store.records()[0].cost_eur_m2, Some(10.0));
    }

    #[test]
    fn source_eco_score_is_ignored() {
        let csv = "nom;eco_score\nA;99\n";
        let store = RecordStore::from_reader(csv.as_bytes(), b';').unwrap();
        assert_eq!(store.headers().len(), 1);
        assert!(!store.columns().contains(Column::EcoScore));
    }

    #[test]
    fn empty_input_is_a_dataset_error() {
        let err = RecordStore::from_table(&[], Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Dataset(_)));
    }

    #[test]
    fn text_and_number_cleanup() {
        assert_eq!(normalize_text("  nan "), None);
        assert_eq!(normalize_text("a \t b"), Some("a b".to_string()));
        assert_eq!(parse_number("1 234,5"), Some(1234.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn clones_share_the_snapshot() {
        let store = RecordStore::from_records(vec![MaterialRecord::named("A")]);
        let other = RecordStore::from_records(vec![MaterialRecord::named("A")]);
        assert!(store.same_snapshot(&store.clone()));
        assert!(!store.same_snapshot(&other));
    }
}

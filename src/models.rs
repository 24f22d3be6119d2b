//! Data models for construction material records

use std::collections::BTreeSet;
use std::fmt;

/// Whether a column holds free text or a floating-point measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
}

/// Every attribute the catalog understands.
///
/// `EcoScore` is derived by the metrics engine and never read from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Name,
    Type,
    Subtype,
    Description,
    OriginNote,
    Manufacturer,
    Country,
    Density,
    Conductivity,
    ThermalCapacity,
    CompressiveStrength,
    YoungModulus,
    TensileStrength,
    VapourPermeability,
    Porosity,
    RecycledContent,
    EmbodiedEnergy,
    CarbonFootprint,
    Cost,
    Durability,
    ImageUrl,
    EcoScore,
}

impl Column {
    /// Columns a loader may find in a source dataset
    pub const SOURCE: [Column; 21] = [
        Column::Name,
        Column::Type,
        Column::Subtype,
        Column::Description,
        Column::OriginNote,
        Column::Manufacturer,
        Column::Country,
        Column::Density,
        Column::Conductivity,
        Column::ThermalCapacity,
        Column::CompressiveStrength,
        Column::YoungModulus,
        Column::TensileStrength,
        Column::VapourPermeability,
        Column::Porosity,
        Column::RecycledContent,
        Column::EmbodiedEnergy,
        Column::CarbonFootprint,
        Column::Cost,
        Column::Durability,
        Column::ImageUrl,
    ];

    /// Header used by the French source dataset
    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "nom",
            Column::Type => "type",
            Column::Subtype => "sous_type",
            Column::Description => "description",
            Column::OriginNote => "origine",
            Column::Manufacturer => "fabricant",
            Column::Country => "pays_origine",
            Column::Density => "masse_volumique_kg_m3",
            Column::Conductivity => "conductivite_w_mk",
            Column::ThermalCapacity => "capacite_thermique_j_kgk",
            Column::CompressiveStrength => "resistance_compression_mpa",
            Column::YoungModulus => "module_young_gpa",
            Column::TensileStrength => "resistance_traction_mpa",
            Column::VapourPermeability => "permeabilite_vapeur_mu",
            Column::Porosity => "porosite_pct",
            Column::RecycledContent => "contenu_recycle_pct",
            Column::EmbodiedEnergy => "energie_grise_mj_kg",
            Column::CarbonFootprint => "empreinte_carbone_kgco2e_kg",
            Column::Cost => "cout_eur_m2",
            Column::Durability => "durabilite_ans",
            Column::ImageUrl => "image_url",
            Column::EcoScore => "eco_score",
        }
    }

    /// English attribute name, accepted as an alias when loading
    pub fn alias(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Type => "type",
            Column::Subtype => "subtype",
            Column::Description => "description",
            Column::OriginNote => "origin_note",
            Column::Manufacturer => "manufacturer",
            Column::Country => "country_of_origin",
            Column::Density => "density_kg_m3",
            Column::Conductivity => "thermal_conductivity_w_mk",
            Column::ThermalCapacity => "thermal_capacity_j_kgk",
            Column::CompressiveStrength => "compressive_strength_mpa",
            Column::YoungModulus => "young_modulus_gpa",
            Column::TensileStrength => "tensile_strength_mpa",
            Column::VapourPermeability => "vapour_permeability_mu",
            Column::Porosity => "porosity_pct",
            Column::RecycledContent => "recycled_content_pct",
            Column::EmbodiedEnergy => "embodied_energy_mj_kg",
            Column::CarbonFootprint => "carbon_footprint_kgco2e_kg",
            Column::Cost => "cost_eur_m2",
            Column::Durability => "durability_years",
            Column::ImageUrl => "image_url",
            Column::EcoScore => "eco_score",
        }
    }

    /// Resolve a dataset header (French or English form, case-insensitive)
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::SOURCE
            .into_iter()
            .chain(std::iter::once(Column::EcoScore))
            .find(|c| header.eq_ignore_ascii_case(c.header()) || header.eq_ignore_ascii_case(c.alias()))
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Name
            | Column::Type
            | Column::Subtype
            | Column::Description
            | Column::OriginNote
            | Column::Manufacturer
            | Column::Country
            | Column::ImageUrl => ColumnKind::Text,
            _ => ColumnKind::Numeric,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.kind() == ColumnKind::Numeric
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// The set of columns actually present in a loaded dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet(BTreeSet<Column>);

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: Column) {
        self.0.insert(column);
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One header of the input schema, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// A recognised column, keeping the header text it was loaded under
    Known { column: Column, name: String },
    /// A column the catalog does not interpret, carried through for export
    Extra { name: String, slot: usize },
}

impl Header {
    /// A recognised column under its French dataset header
    pub fn known(column: Column) -> Self {
        Header::Known {
            column,
            name: column.header().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Header::Known { name, .. } | Header::Extra { name, .. } => name,
        }
    }

    pub fn column(&self) -> Option<Column> {
        match self {
            Header::Known { column, .. } => Some(*column),
            Header::Extra { .. } => None,
        }
    }
}

/// One row of the material catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRecord {
    pub name: Option<String>,
    pub material_type: Option<String>,
    pub subtype: Option<String>,
    pub description: Option<String>,
    pub origin_note: Option<String>,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub density_kg_m3: Option<f64>,
    pub thermal_conductivity_w_mk: Option<f64>,
    pub thermal_capacity_j_kgk: Option<f64>,
    pub compressive_strength_mpa: Option<f64>,
    pub young_modulus_gpa: Option<f64>,
    pub tensile_strength_mpa: Option<f64>,
    pub vapour_permeability_mu: Option<f64>,
    pub porosity_pct: Option<f64>,
    pub recycled_content_pct: Option<f64>,
    pub embodied_energy_mj_kg: Option<f64>,
    pub carbon_footprint_kgco2e_kg: Option<f64>,
    pub cost_eur_m2: Option<f64>,
    pub durability_years: Option<f64>,
    pub image_url: Option<String>,
    /// Cells of `Header::Extra` columns, indexed by slot
    pub extra: Vec<Option<String>>,
}

impl MaterialRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn text(&self, column: Column) -> Option<&str> {
        let value = match column {
            Column::Name => &self.name,
            Column::Type => &self.material_type,
            Column::Subtype => &self.subtype,
            Column::Description => &self.description,
            Column::OriginNote => &self.origin_note,
            Column::Manufacturer => &self.manufacturer,
            Column::Country => &self.country_of_origin,
            Column::ImageUrl => &self.image_url,
            _ => return None,
        };
        value.as_deref()
    }

    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Density => self.density_kg_m3,
            Column::Conductivity => self.thermal_conductivity_w_mk,
            Column::ThermalCapacity => self.thermal_capacity_j_kgk,
            Column::CompressiveStrength => self.compressive_strength_mpa,
            Column::YoungModulus => self.young_modulus_gpa,
            Column::TensileStrength => self.tensile_strength_mpa,
            Column::VapourPermeability => self.vapour_permeability_mu,
            Column::Porosity => self.porosity_pct,
            Column::RecycledContent => self.recycled_content_pct,
            Column::EmbodiedEnergy => self.embodied_energy_mj_kg,
            Column::CarbonFootprint => self.carbon_footprint_kgco2e_kg,
            Column::Cost => self.cost_eur_m2,
            Column::Durability => self.durability_years,
            _ => None,
        }
    }

    pub fn set_text(&mut self, column: Column, value: Option<String>) {
        match column {
            Column::Name => self.name = value,
            Column::Type => self.material_type = value,
            Column::Subtype => self.subtype = value,
            Column::Description => self.description = value,
            Column::OriginNote => self.origin_note = value,
            Column::Manufacturer => self.manufacturer = value,
            Column::Country => self.country_of_origin = value,
            Column::ImageUrl => self.image_url = value,
            _ => {}
        }
    }

    pub fn set_number(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::Density => self.density_kg_m3 = value,
            Column::Conductivity => self.thermal_conductivity_w_mk = value,
            Column::ThermalCapacity => self.thermal_capacity_j_kgk = value,
            Column::CompressiveStrength => self.compressive_strength_mpa = value,
            Column::YoungModulus => self.young_modulus_gpa = value,
            Column::TensileStrength => self.tensile_strength_mpa = value,
            Column::VapourPermeability => self.vapour_permeability_mu = value,
            Column::Porosity => self.porosity_pct = value,
            Column::RecycledContent => self.recycled_content_pct = value,
            Column::EmbodiedEnergy => self.embodied_energy_mj_kg = value,
            Column::CarbonFootprint => self.carbon_footprint_kgco2e_kg = value,
            Column::Cost => self.cost_eur_m2 = value,
            Column::Durability => self.durability_years = value,
            _ => {}
        }
    }

    pub fn extra(&self, slot: usize) -> Option<&str> {
        self.extra.get(slot).and_then(|v| v.as_deref())
    }
}

/// A stored record together with its derived attributes
#[derive(Debug, Clone, Copy)]
pub struct MaterialView<'a> {
    pub record: &'a MaterialRecord,
    pub eco_score: Option<f64>,
    pub biosourced: bool,
}

impl<'a> MaterialView<'a> {
    pub fn text(&self, column: Column) -> Option<&'a str> {
        self.record.text(column)
    }

    /// Numeric value of a column, including the derived eco-score
    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::EcoScore => self.eco_score,
            other => self.record.number(other),
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        self.record.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_resolve_in_both_languages() {
        assert_eq!(Column::from_header("sous_type"), Some(Column::Subtype));
        assert_eq!(Column::from_header("subtype"), Some(Column::Subtype));
        assert_eq!(Column::from_header(" Conductivite_W_mK "), Some(Column::Conductivity));
        assert_eq!(Column::from_header("eco_score"), Some(Column::EcoScore));
        assert_eq!(Column::from_header("Unnamed: 3"), None);
    }

    #[test]
    fn accessors_match_setters() {
        let mut record = MaterialRecord::named("Chanvre");
        record.set_number(Column::Density, Some(110.0));
        record.set_text(Column::Subtype, Some("Isolant biosourcé".into()));

        assert_eq!(record.number(Column::Density), Some(110.0));
        assert_eq!(record.text(Column::Subtype), Some("Isolant biosourcé"));
        assert_eq!(record.text(Column::Density), None);
        assert_eq!(record.number(Column::Name), None);
    }

    #[test]
    fn known_header_keeps_source_text() {
        let header = Header::Known {
            column: Column::Cost,
            name: "cost_eur_m2".into(),
        };
        assert_eq!(header.name(), "cost_eur_m2");
        assert_eq!(header.column(), Some(Column::Cost));
        assert_eq!(Header::known(Column::Cost).name(), "cout_eur_m2");
    }
}

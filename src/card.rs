//! Text rendering of material cards and side-by-side comparisons

use crate::catalog::Catalog;
use crate::models::{Column, MaterialRecord, MaterialView};

pub const MAX_COMPARED: usize = 6;

/// Two decimals plus a unit suffix, or an em dash when absent
pub fn format_value(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v, suffix),
        None => "—".to_string(),
    }
}

/// The image URL when it is an absolute http(s) URL
pub fn valid_image_url(record: &MaterialRecord) -> Option<&str> {
    let url = record.image_url.as_deref()?.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
}

const SECTIONS: [(&str, [(Column, &str, &str); 2]); 3] = [
    (
        "PHYSICAL PROPERTIES",
        [
            (Column::Density, "Density", " kg/m³"),
            (Column::Conductivity, "Thermal Conductivity λ", " W/m·K"),
        ],
    ),
    (
        "THERMAL & MECHANICAL",
        [
            (Column::CompressiveStrength, "Compressive Strength", " MPa"),
            (Column::ThermalCapacity, "Thermal Capacity", " J/kg·K"),
        ],
    ),
    (
        "SUSTAINABILITY",
        [
            (Column::RecycledContent, "Recycled Content", " %"),
            (Column::CarbonFootprint, "CO₂ Footprint", " kgCO₂e/kg"),
        ],
    ),
];

/// Render one record as a text card
pub fn render_card(view: &MaterialView<'_>) -> String {
    let record = view.record;
    let mut out = String::new();

    out.push_str(&format!("{}\n", view.name().unwrap_or("Material")));
    out.push_str(&format!(
        "{} → {}\n",
        record.material_type.as_deref().unwrap_or("—"),
        record.subtype.as_deref().unwrap_or("—")
    ));
    if let Some(url) = valid_image_url(record) {
        out.push_str(&format!("Image: {}\n", url));
    }
    if let Some(desc) = record.description.as_deref() {
        out.push_str(&format!("Description: {}\n", desc));
    }

    for (title, metrics) in SECTIONS {
        out.push_str(&format!("\n  {}\n", title));
        for (column, label, suffix) in metrics {
            out.push_str(&format!("    {:<24} {}\n", label, format_value(view.number(column), suffix)));
        }
    }

    if view.eco_score.is_some() || view.biosourced {
        out.push_str("\n  ECO\n");
        out.push_str(&format!("    {:<24} {}\n", "Eco-score", format_value(view.eco_score, " / 100")));
        out.push_str(&format!("    {:<24} {}\n", "Biosourced", if view.biosourced { "yes" } else { "no" }));
    }

    let sources: Vec<String> = [
        ("Manufacturer", Column::Manufacturer),
        ("Country", Column::Country),
        ("Origin", Column::OriginNote),
    ]
    .into_iter()
    .filter_map(|(label, column)| view.text(column).map(|v| format!("{}: {}", label, v)))
    .collect();
    if !sources.is_empty() {
        out.push_str("\n  SOURCE INFORMATION\n");
        out.push_str(&format!("    {}\n", sources.join(" | ")));
    }

    out
}

/// Resolve up to six names to their first matching record, keeping input order
pub fn select_for_comparison<'a>(catalog: &'a Catalog, names: &[String]) -> Vec<MaterialView<'a>> {
    let mut seen: Vec<&str> = Vec::new();
    names
        .iter()
        .filter(|name| {
            if seen.contains(&name.as_str()) {
                false
            } else {
                seen.push(name.as_str());
                true
            }
        })
        .filter_map(|name| catalog.find(name))
        .take(MAX_COMPARED)
        .collect()
}

const COMPARED_COLUMNS: [Column; 8] = [
    Column::Density,
    Column::Conductivity,
    Column::CompressiveStrength,
    Column::ThermalCapacity,
    Column::RecycledContent,
    Column::CarbonFootprint,
    Column::Cost,
    Column::EcoScore,
];

/// Side-by-side table of the compared materials, one column per material
pub fn render_comparison(catalog: &Catalog, views: &[MaterialView<'_>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<28}", ""));
    for view in views {
        out.push_str(&format!(" {:>14}", truncate(view.name().unwrap_or("—"), 14)));
    }
    out.push('\n');
    out.push_str(&format!("{}\n", "-".repeat(28 + 15 * views.len())));

    for column in COMPARED_COLUMNS.into_iter().filter(|c| catalog.has_column(*c)) {
        out.push_str(&format!("{:<28}", column.header()));
        for view in views {
            out.push_str(&format!(" {:>14}", format_value(view.number(column), "")));
        }
        out.push('\n');
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

//! Delimited-text export of a filtered selection
//!
//! Columns follow the input schema, then `eco_score` when it was computed.
//! Output depends only on the catalog and the views passed in.

use std::io::Write;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{Column, Header, MaterialView};

pub fn export_headers(catalog: &Catalog) -> Vec<String> {
    let mut headers: Vec<String> = catalog
        .store()
        .headers()
        .iter()
        .map(|h| h.name().to_string())
        .collect();
    if catalog.enrichment().eco_score {
        headers.push(Column::EcoScore.header().to_string());
    }
    headers
}

fn cell(view: &MaterialView<'_>, header: &Header) -> String {
    match header {
        Header::Known { column, .. } if column.is_numeric() => format_number(view.number(*column)),
        Header::Known { column, .. } => view.text(*column).unwrap_or_default().to_string(),
        Header::Extra { slot, .. } => view.record.extra(*slot).unwrap_or_default().to_string(),
    }
}

fn format_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_csv<W: Write>(catalog: &Catalog, views: &[MaterialView<'_>], writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    wtr.write_record(export_headers(catalog))?;

    let headers = catalog.store().headers();
    let with_eco = catalog.enrichment().eco_score;
    for view in views {
        let mut row: Vec<String> = headers.iter().map(|h| cell(view, h)).collect();
        if with_eco {
            row.push(format_number(view.eco_score));
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(catalog: &Catalog, views: &[MaterialView<'_>], delimiter: u8) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(catalog, views, &mut buf, delimiter)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Enrichment;
    use crate::store::RecordStore;

    const INPUT: &str = "nom;cout_eur_m2;remarque\nA;10;x\nB;20,5;\nC;;z; w\n";

    #[test]
    fn mirrors_input_schema_plus_eco_score() {
        let store = RecordStore::from_reader(INPUT.as_bytes(), b';').unwrap();
        let catalog = Catalog::enrich(store, Enrichment::default());
        let out = to_csv_string(&catalog, &catalog.views(), b';').unwrap();
        assert_eq!(
            out,
            "nom;cout_eur_m2;remarque;eco_score\nA;10;x;100\nB;20.5;;0\nC;;z;\n"
        );
    }

    #[test]
    fn eco_score_column_omitted_when_disabled() {
        let store = RecordStore::from_reader(INPUT.as_bytes(), b';').unwrap();
        let catalog = Catalog::enrich(store, Enrichment { eco_score: false });
        let views = catalog.views();
        let out = to_csv_string(&catalog, &views[..1], b';').unwrap();
        assert_eq!(out, "nom;cout_eur_m2;remarque\nA;10;x\n");
    }

    #[test]
    fn fields_with_delimiter_are_quoted() {
        let store = RecordStore::from_reader("nom\n\"a;b\"\n".as_bytes(), b';').unwrap();
        let catalog = Catalog::enrich(store, Enrichment { eco_score: false });
        let out = to_csv_string(&catalog, &catalog.views(), b';').unwrap();
        assert_eq!(out, "nom\n\"a;b\"\n");
    }

    #[test]
    fn english_headers_are_written_back_unchanged() {
        let store = RecordStore::from_reader("name;Cost_EUR_m2\nA;10\nB;20\n".as_bytes(), b';').unwrap();
        let catalog = Catalog::enrich(store, Enrichment::default());
        let out = to_csv_string(&catalog, &catalog.views(), b';').unwrap();
        assert_eq!(out, "name;Cost_EUR_m2;eco_score\nA;10;100\nB;20;0\n");
    }
}

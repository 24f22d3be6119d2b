//! SQLite import of a catalog and loading it back

use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::models::{Header, MaterialRecord};
use crate::store::RecordStore;

pub const TABLE: &str = "materiaux";

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(header: &Header) -> &'static str {
    match header {
        Header::Known { column, .. } if column.is_numeric() => "REAL",
        _ => "TEXT",
    }
}

/// Recreate the materials table with one column per header
pub fn init_schema(conn: &Connection, headers: &[Header]) -> Result<()> {
    let columns: Vec<String> = headers
        .iter()
        .map(|h| format!("{} {}", quote_ident(h.name()), sql_type(h)))
        .collect();
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({columns});",
        table = TABLE,
        columns = columns.join(", ")
    ))?;
    Ok(())
}

fn cell_value(record: &MaterialRecord, header: &Header) -> Value {
    match header {
        Header::Known { column, .. } if column.is_numeric() => {
            record.number(*column).map_or(Value::Null, Value::Real)
        }
        Header::Known { column, .. } => record
            .text(*column)
            .map_or(Value::Null, |t| Value::Text(t.to_string())),
        Header::Extra { slot, .. } => record
            .extra(*slot)
            .map_or(Value::Null, |t| Value::Text(t.to_string())),
    }
}

/// Replace the materials table with the contents of a store
pub fn import_store(conn: &Connection, store: &RecordStore) -> Result<usize> {
    let headers = store.headers();
    if headers.is_empty() {
        return Err(CatalogError::Dataset("no usable columns to import".to_string()));
    }

    let tx = conn.unchecked_transaction()?;
    init_schema(&tx, headers)?;

    let placeholders: Vec<String> = (1..=headers.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE,
        headers.iter().map(|h| quote_ident(h.name())).collect::<Vec<_>>().join(", "),
        placeholders.join(", ")
    );
    {
        let mut stmt = tx.prepare(&sql)?;
        for record in store.records() {
            let values: Vec<Value> = headers.iter().map(|h| cell_value(record, h)).collect();
            stmt.execute(rusqlite::params_from_iter(values))?;
        }
    }
    tx.commit()?;

    info!("Imported {} materials into table '{}'", store.len(), TABLE);
    Ok(store.len())
}

/// Load the materials table as a record store
pub fn load_store(conn: &Connection) -> Result<RecordStore> {
    let mut stmt = conn.prepare(&format!("SELECT name FROM pragma_table_info('{}')", TABLE))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut headers = Vec::new();
    for row in rows {
        headers.push(row?);
    }
    if headers.is_empty() {
        return Err(CatalogError::Dataset(format!(
            "table '{}' not found; run 'import' first",
            TABLE
        )));
    }

    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", TABLE))?;
    let width = headers.len();
    let rows = stmt.query_map([], |row| {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            let cell = match row.get::<_, Value>(idx)? {
                Value::Null | Value::Blob(_) => None,
                Value::Integer(i) => Some(i.to_string()),
                Value::Real(f) => Some(f.to_string()),
                Value::Text(t) => Some(t),
            };
            cells.push(cell);
        }
        Ok(cells)
    })?;

    let mut table = Vec::new();
    for row in rows {
        table.push(row?);
    }

    let store = RecordStore::from_table(&headers, table)?;
    info!("Loaded {} materials from SQLite", store.len());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    const INPUT: &str = "nom;type;masse_volumique_kg_m3;remarque\nBrique;Maçonnerie;1 800;cuite\nPisé;Terre;;\n";

    #[test]
    fn import_then_load_preserves_store() {
        let conn = Connection::open_in_memory().unwrap();
        let store = RecordStore::from_reader(INPUT.as_bytes(), b';').unwrap();

        assert_eq!(import_store(&conn, &store).unwrap(), 2);
        let loaded = load_store(&conn).unwrap();

        assert_eq!(loaded.headers(), store.headers());
        assert_eq!(loaded.records(), store.records());
        assert!(loaded.columns().contains(Column::Density));
    }

    #[test]
    fn reimport_replaces_table() {
        let conn = Connection::open_in_memory().unwrap();
        let store = RecordStore::from_reader(INPUT.as_bytes(), b';').unwrap();
        import_store(&conn, &store).unwrap();

        let smaller = RecordStore::from_reader("nom\nAcier\n".as_bytes(), b';').unwrap();
        import_store(&conn, &smaller).unwrap();

        let loaded = load_store(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.headers().len(), 1);
    }

    #[test]
    fn blank_and_case_duplicate_headers_import() {
        let conn = Connection::open_in_memory().unwrap();
        let csv = "nom;NOM;type;;\nA;a;Isolant;;\nB;b;Terre;;\n";
        let store = RecordStore::from_reader(csv.as_bytes(), b';').unwrap();

        assert_eq!(import_store(&conn, &store).unwrap(), 2);
        let loaded = load_store(&conn).unwrap();
        assert_eq!(loaded.headers(), store.headers());
        assert_eq!(loaded.records(), store.records());
    }

    #[test]
    fn english_headers_name_the_table_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let store = RecordStore::from_reader("name;cost_eur_m2\nA;10\n".as_bytes(), b';').unwrap();
        import_store(&conn, &store).unwrap();

        let cost: f64 = conn
            .query_row("SELECT cost_eur_m2 FROM materiaux WHERE name = 'A'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(cost, 10.0);
        assert_eq!(load_store(&conn).unwrap().records(), store.records());
    }

    #[test]
    fn loads_table_written_by_another_importer() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE materiaux (nom TEXT, conductivite_w_mk REAL, \"Unnamed: 2\" TEXT);
             INSERT INTO materiaux VALUES ('Chanvre', 0.04, NULL);",
        )
        .unwrap();

        let loaded = load_store(&conn).unwrap();
        assert_eq!(loaded.headers().len(), 2);
        assert_eq!(loaded.records()[0].thermal_conductivity_w_mk, Some(0.04));
    }

    #[test]
    fn loading_without_import_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(load_store(&conn), Err(CatalogError::Dataset(_))));
    }
}

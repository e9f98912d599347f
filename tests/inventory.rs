use std::path::Path;

use observatum_tools::inventory::{is_key_column, key_field_inventory};
use observatum_tools::model::{FieldValue, KeyField};
use observatum_tools::report::render_inventory;
use observatum_tools::source::{ExcelSource, SourceColumns, SqliteSource};
use rusqlite::Connection;
use tempfile::tempdir;

fn master_fixture(path: &Path) {
    let conn = Connection::open(path).expect("database created");
    conn.execute_batch(
        "CREATE TABLE organism_master (
             item_name TEXT NOT NULL,
             taxon_version_key TEXT,
             rank TEXT,
             recommended_tvk TEXT,
             synonym_tvk TEXT,
             organism_key TEXT,
             version INTEGER,
             notes TEXT
         );
         INSERT INTO organism_master VALUES (
             'Rutpela maculata', 'NBNSYS0000011024', 'Species',
             NULL, '', 'NHMSYS0021235010', 3, 'banded longhorn'
         );",
    )
    .expect("database seeded");
}

fn master_columns() -> SourceColumns {
    SourceColumns::new("organism_master", "item_name")
}

#[test]
fn inventory_filters_key_columns_in_native_order() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("uksi.db");
    master_fixture(&path);

    let mut source = SqliteSource::open(&path, master_columns(), None).expect("source opened");
    let fields = key_field_inventory(&mut source, "Rutpela").expect("inventory extracted");

    let columns: Vec<&str> = fields.iter().map(|field| field.column.as_str()).collect();
    assert_eq!(
        columns,
        vec![
            "taxon_version_key",
            "recommended_tvk",
            "synonym_tvk",
            "organism_key",
            "version",
        ]
    );
}

#[test]
fn inventory_distinguishes_null_from_empty_string() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("uksi.db");
    master_fixture(&path);

    let mut source = SqliteSource::open(&path, master_columns(), None).expect("source opened");
    let fields = key_field_inventory(&mut source, "Rutpela").expect("inventory extracted");

    let value_of = |column: &str| {
        fields
            .iter()
            .find(|field| field.column == column)
            .map(|field| field.value.clone())
            .expect("column present")
    };
    assert_eq!(value_of("recommended_tvk"), FieldValue::Null);
    assert_eq!(value_of("synonym_tvk"), FieldValue::Text(String::new()));
    assert_ne!(value_of("recommended_tvk"), value_of("synonym_tvk"));
    assert_eq!(value_of("version"), FieldValue::Integer(3));
}

#[test]
fn no_matching_row_yields_empty_inventory() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("uksi.db");
    master_fixture(&path);

    let mut source = SqliteSource::open(&path, master_columns(), None).expect("source opened");
    let fields = key_field_inventory(&mut source, "Zygaena").expect("inventory extracted");
    assert!(fields.is_empty());
}

#[test]
fn marker_match_is_case_insensitive_substring() {
    assert!(is_key_column("taxon_version_key"));
    assert!(is_key_column("Recommended_Tvk"));
    assert!(is_key_column("import_version"));
    assert!(is_key_column("ORGANISM_KEY"));
    assert!(!is_key_column("item_name"));
    assert!(!is_key_column("rank"));
}

#[test]
fn inventory_reads_excel_worksheets() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("uksi.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("organism_master")
        .expect("sheet renamed");
    for (column, header) in ["item_name", "taxon_version_key", "parent_tvk", "rank"]
        .iter()
        .enumerate()
    {
        worksheet
            .write_string(0, column as u16, *header)
            .expect("header written");
    }
    worksheet
        .write_string(1, 0, "Erithacus rubecula")
        .expect("name written");
    worksheet
        .write_string(1, 1, "NHMSYS0000502568")
        .expect("key written");
    // parent_tvk blank, rank written so the row spans every column
    worksheet.write_string(1, 3, "Species").expect("rank written");
    workbook.save(&path).expect("workbook saved");

    let mut source = ExcelSource::open(&path, master_columns()).expect("workbook opened");
    let fields = key_field_inventory(&mut source, "Erithacus").expect("inventory extracted");

    assert_eq!(
        fields,
        vec![
            KeyField {
                column: "taxon_version_key".to_string(),
                value: FieldValue::Text("NHMSYS0000502568".to_string()),
            },
            KeyField {
                column: "parent_tvk".to_string(),
                value: FieldValue::Null,
            },
        ]
    );
}

#[test]
fn inventory_renders_aligned_text() {
    let fields = vec![
        KeyField {
            column: "taxon_version_key".to_string(),
            value: FieldValue::Text("NBNSYS0000011024".to_string()),
        },
        KeyField {
            column: "recommended_tvk".to_string(),
            value: FieldValue::Null,
        },
    ];

    let text = render_inventory(&fields);
    assert!(text.contains("taxon_version_key = NBNSYS0000011024"));
    assert!(text.contains("recommended_tvk   = NULL"));
    assert_eq!(render_inventory(&[]), "no key fields matched\n");
}

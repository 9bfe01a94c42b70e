//! Re-running registration as a descriptor grows.
//!
//! Version 1 of a `notes` table is registered and filled, then version 2
//! adds columns. Registration adds them in place and keeps existing rows;
//! rolling back to version 1 reports the extra columns without dropping
//! them.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p rowgate-demos --example schema_evolution
//! ```

use rowgate_core::{ColumnDef, Row, TableSchema};
use rowgate_db::{GatewayConfig, TableCatalog};
use rowgate_sqlite::{ConvergeReport, SchemaManager, TableGateway, open};

fn notes_v1() -> TableSchema {
    TableSchema::new("notes")
        .with_column(ColumnDef::integer("id").not_null().auto_increment())
        .with_column(ColumnDef::text("body").not_null())
}

fn notes_v2() -> TableSchema {
    notes_v1()
        .with_version("2.0")
        .with_column(ColumnDef::text("author").not_null().with_default("anonymous"))
        .with_column(ColumnDef::integer("pinned").with_default(0))
}

fn print_report(label: &str, reports: &[ConvergeReport]) {
    for report in reports {
        println!(
            "{label}: {} created={} added={:?} extra={:?}",
            report.table, report.created, report.added_columns, report.extra_columns
        );
    }
}

fn main() {
    let dir = std::env::temp_dir().join("rowgate_schema_evolution_demo");
    std::fs::create_dir_all(&dir).unwrap();
    let config = GatewayConfig {
        database: Some(dir.join("notes.db")),
        ..GatewayConfig::default()
    };
    std::fs::remove_file(dir.join("notes.db")).ok();

    let conn = open(&config).unwrap();
    let manager = SchemaManager::new(&conn, &config.locale);

    let v1 = TableCatalog::from_tables(vec![notes_v1()]).unwrap();
    print_report("v1", &manager.register(&v1).unwrap());
    TableGateway::new(&conn, notes_v1())
        .insert(&Row::new().with("body", "first note"), "note")
        .unwrap();

    let v2 = TableCatalog::from_tables(vec![notes_v2()]).unwrap();
    print_report("v2", &manager.register(&v2).unwrap());
    let gateway = TableGateway::new(&conn, notes_v2());
    let row = gateway.fetch_by_id(1).unwrap().unwrap();
    println!("existing row after upgrade: {}", serde_json::to_string(&row).unwrap());

    print_report("rollback", &manager.register(&v1).unwrap());
    for status in manager.status(&v2).unwrap() {
        println!("{}: installed={} rows={:?}", status.table, status.installed, status.rows);
    }

    std::fs::remove_dir_all(&dir).ok();
}

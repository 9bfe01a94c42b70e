use std::path::Path;

use rowgate_core::{ColumnDef, IndexDef, TablePackage, TableSchema, Value, validate_table};
use rowgate_db::{CatalogSource, ConfigError, GatewayConfig, TableCatalog};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn orders() -> TableSchema {
    TableSchema::new("orders")
        .with_version("2.1")
        .with_column(ColumnDef::integer("id").not_null().auto_increment())
        .with_column(ColumnDef::text("customer").not_null())
        .with_column(ColumnDef::real("total"))
        .with_column(ColumnDef::text("status").with_default("pending"))
        .with_index(IndexDef::new("idx_orders_customer", ["customer"]))
}

fn customers() -> TableSchema {
    TableSchema::new("customers")
        .with_column(ColumnDef::integer("id").not_null().auto_increment())
        .with_column(ColumnDef::text("email").not_null().unique())
}

fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) {
    std::fs::write(path, serde_yaml::to_string(value).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Descriptor files
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_descriptor_matches_builder() {
    let yaml = r#"
name: orders
version: "2.1"
columns:
  - name: id
    type: INTEGER
    nullable: false
    auto_increment: true
  - name: customer
    type: text
    nullable: false
  - name: total
    type: real
  - name: status
    type: text
    default: pending
indexes:
  - name: idx_orders_customer
    columns: [customer]
"#;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("orders.yml"), yaml).unwrap();

    let catalog = TableCatalog::from_dir(dir.path()).unwrap();
    let loaded = catalog.get("orders").unwrap();
    assert_eq!(loaded, &orders());
    assert!(validate_table(loaded).is_empty());
    assert_eq!(
        loaded.defaults().get("status"),
        Some(&Value::from("pending"))
    );
}

#[test]
fn test_json_descriptor_with_format_symbols() {
    let json = r#"{
        "name": "events",
        "columns": [
            { "name": "id", "type": "integer", "auto_increment": true },
            { "name": "score", "type": "DECIMAL(10,2)", "format": "%f" },
            { "name": "payload", "type": "text", "format": "%s" }
        ]
    }"#;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("events.json"), json).unwrap();

    let catalog = TableCatalog::from_dir(dir.path()).unwrap();
    let events = catalog.get("events").unwrap();
    assert_eq!(events.primary_key, "id");
    assert_eq!(events.version, "1.0");
    assert_eq!(events.columns()[1].1.symbol(), "%f");
}

// ---------------------------------------------------------------------------
// Config-driven loading
// ---------------------------------------------------------------------------

#[test]
fn test_config_relative_sources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("tables")).unwrap();
    write_yaml(&dir.path().join("tables").join("orders.yml"), &orders());

    let mut package = TablePackage::new("1.0.0");
    package.tables.push(customers());
    write_yaml(&dir.path().join("package.yml"), &package);

    std::fs::write(
        dir.path().join("rowgate.yml"),
        "tables_dir: tables\npackage: package.yml\ndatabase: app.db\n",
    )
    .unwrap();

    let config = GatewayConfig::load(dir.path().join("rowgate.yml")).unwrap();
    assert_eq!(config.database, Some(dir.path().join("app.db")));

    let catalog = TableCatalog::from_config(&config).unwrap();
    assert_eq!(catalog.names(), vec!["orders", "customers"]);
    assert!(matches!(catalog.source(), CatalogSource::Multiple(sources) if sources.len() == 2));
}

#[test]
fn test_config_duplicate_across_sources() {
    let dir = tempfile::tempdir().unwrap();
    let tables = dir.path().join("tables");
    std::fs::create_dir(&tables).unwrap();
    write_yaml(&tables.join("orders.yml"), &orders());

    let mut package = TablePackage::new("1.0.0");
    package.tables.push(orders());
    let package_path = dir.path().join("shop.json");
    std::fs::write(&package_path, serde_json::to_string(&package).unwrap()).unwrap();

    let config = GatewayConfig {
        tables_dir: Some(tables),
        package: Some(package_path),
        ..GatewayConfig::default()
    };
    let err = TableCatalog::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateTable(name) if name == "orders"));
}

#[test]
fn test_missing_directory() {
    let err = TableCatalog::from_dir("/nonexistent/rowgate/tables").unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

//! Table gateway walkthrough on an `orders` table.
//!
//! Registers the table, inserts with defaults, reads, updates and deletes a
//! row, and shows that invalid ids never reach the database.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p rowgate-demos --example orders_lifecycle
//! ```

use rowgate_core::{ColumnDef, IndexDef, Row, TableSchema};
use rowgate_db::LocaleConfig;
use rowgate_sqlite::{GatewayError, InsertEvent, SchemaManager, TableGateway};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

fn orders() -> TableSchema {
    TableSchema::new("orders")
        .with_version("1.0")
        .with_column(ColumnDef::integer("id").not_null().auto_increment())
        .with_column(ColumnDef::text("customer").not_null())
        .with_column(ColumnDef::real("total"))
        .with_column(ColumnDef::text("status").with_default("pending"))
        .with_column(ColumnDef::text("placed_at"))
        .with_index(IndexDef::new("idx_orders_customer", ["customer"]))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // === Step 1: Register the table ===
    println!("=== Registration ===");
    let conn = Connection::open_in_memory().unwrap();
    let manager = SchemaManager::new(&conn, &LocaleConfig::default());
    for ddl in manager.ddl(&orders()).unwrap() {
        print!("{ddl}");
    }
    let report = manager.register(&orders()).unwrap();
    println!("created: {}", report[0].created);
    println!("second run is a no-op: {}", manager.register(&orders()).unwrap()[0].is_noop());

    // === Step 2: Insert with defaults ===
    println!("\n=== Insert ===");
    let gateway = TableGateway::new(&conn, orders()).with_notifier(|event: &InsertEvent<'_>| {
        println!("  hook {} ({} columns)", event.hook_name(), event.data().len());
    });

    let placed_at = chrono::Utc::now().to_rfc3339();
    let alice = gateway
        .insert(
            &Row::new()
                .with("customer", "alice")
                .with("total", 9.99)
                .with("placed_at", placed_at.as_str())
                .with("is_admin", 1),
            "order",
        )
        .unwrap();
    let bob = gateway
        .insert(
            &Row::new()
                .with("Customer", "bob")
                .with("total", 1)
                .with("status", "done"),
            "order",
        )
        .unwrap();
    println!("inserted ids {alice} and {bob}");

    // === Step 3: Read ===
    println!("\n=== Read ===");
    let row = gateway.fetch_by_id(alice).unwrap().unwrap();
    println!("{}", serde_json::to_string_pretty(&row).unwrap());
    println!(
        "bob's status: {:?}",
        gateway.fetch_field_by("status", "customer", "bob").unwrap()
    );

    // === Step 4: Update and delete ===
    println!("\n=== Update / delete ===");
    let updated = gateway
        .update(alice, &Row::new().with("status", "shipped"))
        .unwrap();
    println!("updated rows: {updated}");
    println!("status now: {:?}", gateway.fetch_field("status", alice).unwrap());
    println!("deleted rows: {}", gateway.delete(alice).unwrap());
    println!("deleting again: {} rows", gateway.delete(alice).unwrap());

    match gateway.delete(0) {
        Err(GatewayError::InvalidId(id)) => println!("rejected id {id} before any statement"),
        other => println!("unexpected: {other:?}"),
    }

    println!("\nrows left: {}", gateway.count().unwrap());
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_rowgate");

/// Writes a config, a tables directory with an `orders` descriptor, and
/// returns the config path.
fn write_workspace(dir: &Path) -> PathBuf {
    let tables = dir.join("tables");
    fs::create_dir_all(&tables).expect("failed to create tables dir");
    fs::write(
        tables.join("orders.yml"),
        r#"name: orders
columns:
  - name: id
    type: integer
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
"#,
    )
    .expect("failed to write descriptor");

    let config = dir.join("rowgate.yml");
    fs::write(&config, "database: shop.db\ntables_dir: tables\n").expect("failed to write config");
    config
}

fn rowgate(config: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run rowgate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

// ---------------------------------------------------------------------------
// install / status / ddl
// ---------------------------------------------------------------------------

#[test]
fn install_creates_tables_and_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workspace(dir.path());

    let first = rowgate(&config, &["install"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout(&first).contains("orders: created"));
    assert!(dir.path().join("shop.db").exists());

    let second = rowgate(&config, &["install"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("orders: up to date"));
}

#[test]
fn status_before_and_after_install() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workspace(dir.path());

    let before = rowgate(&config, &["status"]);
    assert!(before.status.success());
    assert!(stdout(&before).contains("orders: not installed"));

    rowgate(&config, &["install"]);
    let after = rowgate(&config, &["status"]);
    assert!(stdout(&after).contains("orders: installed, 0 rows"));
}

#[test]
fn ddl_prints_create_statement() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workspace(dir.path());

    let output = rowgate(&config, &["ddl"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("CREATE TABLE `orders`"));
    assert!(text.contains("`id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL"));
    assert!(text.contains("`status` TEXT DEFAULT 'pending'"));
}

// ---------------------------------------------------------------------------
// row commands
// ---------------------------------------------------------------------------

#[test]
fn row_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workspace(dir.path());
    rowgate(&config, &["install"]);

    let insert = rowgate(
        &config,
        &[
            "insert",
            "--table",
            "orders",
            "--data",
            r#"{"customer":"alice","total":9.99,"is_admin":1}"#,
        ],
    );
    assert!(insert.status.success(), "{}", String::from_utf8_lossy(&insert.stderr));
    let id = stdout(&insert);
    assert_eq!(id, "1");

    let get = rowgate(&config, &["get", "--table", "orders", "--id", &id]);
    let row: serde_json::Value = serde_json::from_str(&stdout(&get)).unwrap();
    assert_eq!(row["customer"], "alice");
    assert_eq!(row["status"], "pending");
    assert!(row.get("is_admin").is_none());

    let update = rowgate(
        &config,
        &["update", "--table", "orders", "--id", &id, "--data", r#"{"status":"shipped"}"#],
    );
    assert_eq!(stdout(&update), "1");

    let by_id = rowgate(&config, &["get", "--table", "orders", "--id", &id, "--field", "status"]);
    assert!(by_id.status.success(), "{}", String::from_utf8_lossy(&by_id.stderr));
    assert_eq!(stdout(&by_id), "\"shipped\"");

    let field = rowgate(
        &config,
        &["get", "--table", "orders", "--by", "customer", "--equals", "alice", "--field", "status"],
    );
    assert_eq!(stdout(&field), "\"shipped\"");

    let delete = rowgate(&config, &["delete", "--table", "orders", "--id", &id]);
    assert_eq!(stdout(&delete), "1");

    let missing = rowgate(&config, &["get", "--table", "orders", "--id", &id]);
    assert!(!missing.status.success());
}

#[test]
fn invalid_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workspace(dir.path());
    rowgate(&config, &["install"]);

    let output = rowgate(&config, &["delete", "--table", "orders", "--id", "0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid row id 0"));
}

#[test]
fn unknown_table_lists_known_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_workspace(dir.path());

    let output = rowgate(&config, &["delete", "--table", "users", "--id", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown table 'users'"));
    assert!(stderr.contains("orders"));
}

#[test]
fn missing_table_sources_is_an_error() {
    let output = Command::new(BIN)
        .args(["--db", ":memory:", "status"])
        .output()
        .expect("failed to run rowgate");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no table sources configured"));
}

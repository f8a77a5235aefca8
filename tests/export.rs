//! End-to-end export tests against temp-file SQLite databases.
//!
//! These tests verify:
//! - Batch pagination reads every row exactly once
//! - Array and line framing of the output files
//! - Column rules (fixed values, increments, renames, skips, quoting)
//! - Statement exports, row limits and dry runs

use tokio_util::sync::CancellationToken;

use db_json_export::{run_export, Config};

mod helpers;
use helpers::{parse_lines, read_output, TestDb};

async fn orders_db() -> TestDb {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, note TEXT)",
        "INSERT INTO orders (id, note) VALUES (1, 'a'), (2, 'b'), (3, 'c')",
    ])
    .await;
    db
}

async fn export(config: Config) -> db_json_export::ExportReport {
    run_export(config, CancellationToken::new())
        .await
        .expect("Export should succeed")
}

#[tokio::test]
async fn test_orders_line_output_in_two_batches() {
    let db = orders_db().await;
    let config = Config {
        tables: vec!["orders".into()],
        batch_size: 2,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.tables[0].rows, 3);
    assert_eq!(report.tables[0].batches, 2);
    assert_eq!(
        read_output(&db.out_dir().join("orders.json")),
        "{\"id\":1,\"note\":\"a\"}\n{\"id\":2,\"note\":\"b\"}\n{\"id\":3,\"note\":\"c\"}\n"
    );
}

#[tokio::test]
async fn test_orders_array_output() {
    let db = orders_db().await;
    let config = Config {
        tables: vec!["orders".into()],
        batch_size: 2,
        array_file: true,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.tables[0].batches, 2);
    let text = read_output(&db.out_dir().join("orders.json"));
    assert_eq!(
        text,
        "[\n{\"id\":1,\"note\":\"a\"},\n{\"id\":2,\"note\":\"b\"},\n{\"id\":3,\"note\":\"c\"}\n]\n"
    );
    let parsed: serde_json::Value = serde_json::from_str(&text).expect("Output is one JSON array");
    assert_eq!(parsed.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_pagination_reads_every_row_once() {
    const BATCH: u64 = 4;
    for rows in [0, 1, BATCH - 1, BATCH, BATCH + 1, 3 * BATCH] {
        let db = TestDb::new().await;
        db.create_numbered_table("numbers", rows).await;
        let config = Config {
            tables: vec!["numbers".into()],
            batch_size: BATCH,
            ..db.config()
        };

        let report = export(config).await;

        let values = parse_lines(&read_output(&db.out_dir().join("numbers.json")));
        let ids: Vec<u64> = values
            .iter()
            .map(|v| v["id"].as_u64().expect("numeric id"))
            .collect();
        assert_eq!(ids, (1..=rows).collect::<Vec<_>>(), "rows = {rows}");
        assert_eq!(report.tables[0].rows, rows);
        // A full last batch needs one more (empty) query to detect the end
        assert_eq!(report.tables[0].batches, rows / BATCH + 1, "rows = {rows}");
    }
}

#[tokio::test]
async fn test_batch_size_zero_reads_with_one_query() {
    let db = TestDb::new().await;
    db.create_numbered_table("numbers", 25).await;
    let config = Config {
        tables: vec!["numbers".into()],
        batch_size: 0,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.tables[0].rows, 25);
    assert_eq!(report.tables[0].batches, 1);
}

#[tokio::test]
async fn test_tables_without_single_primary_key_export_unbatched() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE logs (msg TEXT)",
        "INSERT INTO logs (msg) VALUES ('x'), ('y'), ('z')",
        "CREATE TABLE pairs (a INTEGER, b INTEGER, PRIMARY KEY (a, b))",
        "INSERT INTO pairs (a, b) VALUES (1, 1), (1, 2), (2, 1)",
    ])
    .await;
    let config = Config {
        batch_size: 2,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    let names: Vec<&str> = report.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["logs", "pairs"]);
    for table in &report.tables {
        assert_eq!(table.rows, 3, "{}", table.name);
        assert_eq!(table.batches, 1, "{}", table.name);
    }
}

#[tokio::test]
async fn test_fixed_column_increments_across_batches() {
    let db = TestDb::new().await;
    db.create_numbered_table("items", 5).await;
    let config = Config {
        tables: vec!["items".into()],
        batch_size: 2,
        column_values: vec![("seq".into(), "10".into()), ("src".into(), "erp".into())],
        column_increments: vec![("seq".into(), "5".into())],
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.tables[0].batches, 3);
    let values = parse_lines(&read_output(&db.out_dir().join("items.json")));
    let seqs: Vec<i64> = values.iter().map(|v| v["seq"].as_i64().expect("seq")).collect();
    assert_eq!(seqs, vec![10, 15, 20, 25, 30]);
    assert!(values.iter().all(|v| v["src"] == "erp"));
}

#[tokio::test]
async fn test_skip_empty_and_null_policy() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, nickname TEXT, secret TEXT)",
        "INSERT INTO people VALUES (1, 'Ann', '', 's1'), (2, 'Bob', NULL, 's2')",
    ])
    .await;

    let keep_all = Config {
        tables: vec!["people".into()],
        skip_columns: vec!["SECRET".into()],
        ..db.config()
    };
    export(keep_all).await;
    assert_eq!(
        read_output(&db.out_dir().join("people.json")),
        "{\"id\":1,\"name\":\"Ann\",\"nickname\":\"\"}\n{\"id\":2,\"name\":\"Bob\",\"nickname\":null}\n"
    );

    let skip_both = Config {
        tables: vec!["people".into()],
        skip_columns: vec!["secret".into()],
        skip_empty: true,
        skip_null: true,
        ..db.config()
    };
    export(skip_both).await;
    assert_eq!(
        read_output(&db.out_dir().join("people.json")),
        "{\"id\":1,\"name\":\"Ann\"}\n{\"id\":2,\"name\":\"Bob\"}\n"
    );
}

#[tokio::test]
async fn test_types_quoting_and_renames() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE flags (id INTEGER PRIMARY KEY, active TINYINT(1), score DECIMAL(5,2), label TEXT)",
        "INSERT INTO flags VALUES (1, 1, 2.5, '[1,2]'), (2, 0, NULL, '{\"x\":1}')",
    ])
    .await;
    let config = Config {
        tables: vec!["flags".into()],
        tiny1_as_bool: true,
        quoted_columns: vec!["id".into()],
        column_json_names: vec![("score".into(), "points".into())],
        unquoted_columns: vec!["label".into()],
        ..db.config()
    };

    export(config).await;

    let values = parse_lines(&read_output(&db.out_dir().join("flags.json")));
    assert_eq!(values[0]["id"], "1");
    assert_eq!(values[0]["active"], true);
    assert_eq!(values[1]["active"], false);
    assert_eq!(values[0]["points"], 2.5);
    assert!(values[1]["points"].is_null());
    assert!(values[0].get("score").is_none());
    // Forced-unquoted values are written as they are stored
    assert_eq!(values[0]["label"], serde_json::json!([1, 2]));
    assert_eq!(values[1]["label"]["x"], 1);
}

#[tokio::test]
async fn test_escaped_string_value() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)",
        "INSERT INTO notes VALUES (1, 'a\"' || char(9) || 'b')",
    ])
    .await;
    let config = Config {
        tables: vec!["notes".into()],
        ..db.config()
    };

    export(config).await;

    assert_eq!(
        read_output(&db.out_dir().join("notes.json")),
        "{\"id\":1,\"body\":\"a\\\"\\tb\"}\n"
    );
}

#[tokio::test]
async fn test_string_batch_column_is_quoted_in_cursor() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE codes (code TEXT PRIMARY KEY, n INTEGER)",
        "INSERT INTO codes VALUES ('a''1', 1), ('b', 2), ('c', 3), ('d', 4), ('e', 5)",
    ])
    .await;
    let config = Config {
        tables: vec!["codes".into()],
        batch_size: 2,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.tables[0].batches, 3);
    let values = parse_lines(&read_output(&db.out_dir().join("codes.json")));
    let codes: Vec<&str> = values.iter().map(|v| v["code"].as_str().expect("code")).collect();
    assert_eq!(codes, vec!["a'1", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_where_suffix_filters_every_batch() {
    let db = TestDb::new().await;
    db.create_numbered_table("numbers", 10).await;
    let config = Config {
        tables: vec!["numbers".into()],
        batch_size: 2,
        where_suffix: Some("id % 2 = 0".into()),
        ..db.config()
    };

    let report = export(config).await;

    let values = parse_lines(&read_output(&db.out_dir().join("numbers.json")));
    let ids: Vec<i64> = values.iter().map(|v| v["id"].as_i64().expect("id")).collect();
    assert_eq!(ids, vec![2, 4, 6, 8, 10]);
    assert_eq!(report.tables[0].batches, 3);
}

#[tokio::test]
async fn test_statement_export_to_file() {
    let db = orders_db().await;
    let out = db.dir.path().join("statement.json");
    let config = Config {
        sql: Some("SELECT id, upper(note) AS note FROM orders%W%O".into()),
        file: Some(out.clone()),
        batch_column: Some("id".into()),
        batch_size: 2,
        array_file: true,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.tables[0].rows, 3);
    assert_eq!(report.tables[0].batches, 2);
    let parsed: serde_json::Value =
        serde_json::from_str(&read_output(&out)).expect("Output is one JSON array");
    assert_eq!(
        parsed,
        serde_json::json!([
            {"id": 1, "note": "A"},
            {"id": 2, "note": "B"},
            {"id": 3, "note": "C"}
        ])
    );
}

#[tokio::test]
async fn test_statement_batches_on_primary_key_of_its_table() {
    let db = orders_db().await;
    let out = db.dir.path().join("auto.json");
    let config = Config {
        sql: Some("SELECT id, note FROM orders%W%O".into()),
        file: Some(out.clone()),
        batch_size: 2,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.tables[0].rows, 3);
    assert_eq!(report.tables[0].batches, 2);
    let ids: Vec<i64> = parse_lines(&read_output(&out))
        .iter()
        .map(|v| v["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_statement_over_a_join_exports_unbatched() {
    let db = orders_db().await;
    db.execute_all(&[
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT)",
        "INSERT INTO customers VALUES (1, 'x'), (2, 'y'), (3, 'z')",
    ])
    .await;
    let out = db.dir.path().join("joined.json");
    let config = Config {
        sql: Some("SELECT o.id, c.name FROM orders o JOIN customers c ON c.id = o.id%W".into()),
        file: Some(out.clone()),
        batch_size: 2,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.tables[0].rows, 3);
    assert_eq!(report.tables[0].batches, 1);
}

#[tokio::test]
async fn test_non_utf8_text_and_blob_are_escaped_per_byte() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE raw (id INTEGER PRIMARY KEY, note TEXT, data BLOB)",
        "INSERT INTO raw VALUES (1, CAST(x'61ff62' AS TEXT), x'61ff62')",
    ])
    .await;
    let config = Config {
        tables: vec!["raw".into()],
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        read_output(&db.out_dir().join("raw.json")),
        "{\"id\":1,\"note\":\"a\\u00FFb\",\"data\":\"a\\u00FFb\"}\n"
    );
}

#[tokio::test]
async fn test_non_utf8_batch_values_advance_the_cursor() {
    let db = TestDb::new().await;
    db.execute_all(&[
        "CREATE TABLE tags (name TEXT PRIMARY KEY)",
        "INSERT INTO tags VALUES ('a'), (CAST(x'61ff' AS TEXT)), ('b')",
    ])
    .await;
    let config = Config {
        tables: vec!["tags".into()],
        batch_size: 1,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.tables[0].rows, 3);
    assert_eq!(report.tables[0].batches, 4);
    assert_eq!(
        read_output(&db.out_dir().join("tags.json")),
        "{\"name\":\"a\"}\n{\"name\":\"a\\u00FF\"}\n{\"name\":\"b\"}\n"
    );
}

#[tokio::test]
async fn test_table_limit_and_global_limit() {
    let db = TestDb::new().await;
    for name in ["t1", "t2", "t3"] {
        db.create_numbered_table(name, 10).await;
    }

    let per_table = Config {
        table_limit: 5,
        batch_size: 2,
        ..db.config()
    };
    let report = export(per_table).await;
    assert!(report.tables.iter().all(|t| t.rows == 5));
    assert!(report.tables.iter().all(|t| t.batches == 3));

    let global = Config {
        limit: 12,
        batch_size: 3,
        ..db.config()
    };
    let report = export(global).await;
    assert_eq!(report.total_rows(), 12);
    let written: usize = ["t1", "t2", "t3"]
        .iter()
        .map(|name| parse_lines(&read_output(&db.out_dir().join(format!("{name}.json")))).len())
        .sum();
    assert_eq!(written, 12);
}

#[tokio::test]
async fn test_sequential_export_matches_parallel() {
    let db = TestDb::new().await;
    for name in ["alpha", "beta"] {
        db.create_numbered_table(name, 7).await;
    }
    let config = Config {
        parallel: false,
        batch_size: 3,
        extension: ".jsonl".into(),
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.total_rows(), 14);
    assert_eq!(report.tables_exported(), 2);
    for name in ["alpha", "beta"] {
        let values = parse_lines(&read_output(&db.out_dir().join(format!("{name}.jsonl"))));
        assert_eq!(values.len(), 7);
    }
}

#[tokio::test]
async fn test_init_and_finish_statements() {
    let db = orders_db().await;
    db.execute_all(&["CREATE TABLE audit (event TEXT)"]).await;
    let config = Config {
        tables: vec!["orders".into()],
        sql_init: vec!["INSERT INTO audit VALUES ('start')".into()],
        sql_finish: vec![
            "INSERT INTO audit VALUES ('end')".into(),
            "THIS IS NOT SQL".into(),
        ],
        ..db.config()
    };

    let report = export(config).await;

    // A failing finish statement never changes the outcome
    assert_eq!(report.exit_code(), 0);
    let events: Vec<String> = sqlx::query_scalar("SELECT event FROM audit ORDER BY rowid")
        .fetch_all(&db.pool)
        .await
        .expect("audit rows");
    assert_eq!(events, vec!["start".to_string(), "end".to_string()]);
}

#[tokio::test]
async fn test_dry_run_describes_without_writing() {
    let db = orders_db().await;
    let config = Config {
        tables: vec!["orders".into()],
        batch_size: 2,
        dry_run: true,
        ..db.config()
    };

    let report = export(config).await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.descriptions.len(), 1);
    let description = &report.descriptions[0];
    assert!(description.starts_with("Table: orders\n"));
    assert!(description.contains("Batch col: id"));
    assert!(description.contains("  Name: note\n"));
    assert!(description.contains("Type: Numeric Unquoted"));
    assert!(description.contains("Type: String Quoted"));
    assert!(!db.out_dir().exists());
}

use flatrow_db::{
    Catalog, Database, DatabaseConfig, DatabaseError, QueryResponse, Row, StatementKind, Value,
    execute,
};
use tempfile::TempDir;

fn open(tmp: &TempDir) -> Database {
    Database::new(tmp.path()).expect("Failed to open database")
}

fn run(db: &mut Database, query: &str) -> QueryResponse {
    db.execute_query(query)
        .unwrap_or_else(|e| panic!("{query:?} failed: {e}"))
}

fn rows(db: &mut Database, query: &str) -> Vec<Row> {
    run(db, query).into_rows().expect("Expected rows")
}

fn row(values: Vec<Value>) -> Row {
    Row::new(values)
}

fn setup_users(db: &mut Database) {
    run(db, "CREATE TABLE t (id INT, name VARCHAR(5))");
}

#[test]
fn test_scenario_a_insert_and_select() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);

    run(&mut db, "INSERT INTO t VALUES (1, 'alice')");

    assert_eq!(
        rows(&mut db, "SELECT * FROM t"),
        vec![row(vec![Value::Int(1), Value::from("alice")])]
    );
}

#[test]
fn test_scenario_b_truncated_projection() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);

    run(&mut db, "INSERT INTO t VALUES (1, 'alice')");
    run(&mut db, "INSERT INTO t VALUES (2, 'bobbytown')");

    assert_eq!(
        rows(&mut db, "SELECT name FROM t WHERE id = 2"),
        vec![row(vec![Value::from("bobby")])]
    );
}

#[test]
fn test_scenario_c_delete_all() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (1, 'alice')");
    run(&mut db, "INSERT INTO t VALUES (2, 'bob')");

    let response = run(&mut db, "DELETE * FROM t");
    assert_eq!(response.message(), Some("All rows deleted from t"));

    assert!(rows(&mut db, "SELECT * FROM t").is_empty());
    assert_eq!(db.catalog().table("t").unwrap().row_count().unwrap(), 0);
}

#[test]
fn test_scenario_d_index_rebuilt_after_delete() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (1, 'a')");
    run(&mut db, "INSERT INTO t VALUES (2, 'b')");
    run(&mut db, "INSERT INTO t VALUES (3, 'c')");
    run(&mut db, "CREATE INDEX ON t (id)");

    let response = run(&mut db, "DELETE FROM t WHERE id = 2");
    assert_eq!(response.message(), Some("Deleted 1 row(s) where id = 2"));

    assert_eq!(
        rows(&mut db, "SELECT * FROM t WHERE id = 3"),
        vec![row(vec![Value::Int(3), Value::from("c")])]
    );
    assert!(rows(&mut db, "SELECT * FROM t WHERE id = 2").is_empty());
    assert_eq!(
        db.catalog().index("t", "id").unwrap().find(&Value::Int(3)),
        &[1]
    );
}

#[test]
fn test_scenario_e_zero_reads_back_as_null() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);

    run(&mut db, "INSERT INTO t VALUES (0, 'zero')");

    assert_eq!(
        rows(&mut db, "SELECT * FROM t"),
        vec![row(vec![Value::Null, Value::from("zero")])]
    );
    assert!(rows(&mut db, "SELECT * FROM t WHERE id = 0").is_empty());
}

#[test]
fn test_indexed_select_matches_full_scan() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    run(&mut db, "CREATE TABLE t (id INT, grp INT, name VARCHAR(8))");
    run(&mut db, "INSERT INTO t VALUES (1, 10, 'a')");
    run(&mut db, "CREATE INDEX ON t (grp)");

    for (id, grp) in [(2, 20), (3, 10), (4, 0), (5, 20), (6, 10)] {
        run(&mut db, &format!("INSERT INTO t VALUES ({id}, {grp}, 'n{id}')"));
    }

    for grp in [0, 10, 20, 30] {
        let indexed = rows(&mut db, &format!("SELECT * FROM t WHERE grp = {grp}"));
        let scanned: Vec<Row> = rows(&mut db, "SELECT * FROM t")
            .into_iter()
            .filter(|r| r.values[1] == Value::Int(grp))
            .collect();
        assert_eq!(indexed, scanned, "grp = {grp}");
    }
}

#[test]
fn test_projection_order_and_unknown_columns() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (7, 'gus')");

    match run(&mut db, "SELECT name, missing, id FROM t") {
        QueryResponse::Rows { columns, rows } => {
            assert_eq!(columns, vec!["name".to_string(), "id".to_string()]);
            assert_eq!(rows, vec![row(vec![Value::from("gus"), Value::Int(7)])]);
        }
        other => panic!("Expected rows, got {other:?}"),
    }
}

#[test]
fn test_select_by_text() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (1, 'ann')");
    run(&mut db, "INSERT INTO t VALUES (2, \"bo\")");
    run(&mut db, "INSERT INTO t VALUES (3, 'ann')");

    assert_eq!(rows(&mut db, "SELECT id FROM t WHERE name = 'ann'").len(), 2);
    assert_eq!(
        rows(&mut db, "SELECT id FROM t WHERE name = bo"),
        vec![row(vec![Value::Int(2)])]
    );
}

#[test]
fn test_dropped_column_definitions() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);

    run(&mut db, "CREATE TABLE t (id INT, price FLOAT, name VARCHAR, tag VARCHAR(3))");

    let schema = db.catalog().table("t").unwrap().schema().clone();
    assert_eq!(schema.column_names(), vec!["id".to_string(), "tag".to_string()]);
    assert_eq!(schema.row_size(), 11);
}

#[test]
fn test_insert_fewer_values_fills_null() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);

    run(&mut db, "INSERT INTO t VALUES (5)");
    assert_eq!(
        rows(&mut db, "SELECT * FROM t"),
        vec![row(vec![Value::Int(5), Value::Null])]
    );
}

#[test]
fn test_insert_errors() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);

    assert!(matches!(
        db.execute_query("INSERT INTO t VALUES ('x', 'y')"),
        Err(DatabaseError::ValueCoercion { .. })
    ));
    assert!(matches!(
        db.execute_query("INSERT INTO t VALUES (1, 'y', 3)"),
        Err(DatabaseError::ValueCoercion { .. })
    ));
    assert!(matches!(
        db.execute_query("INSERT INTO ghost VALUES (1)"),
        Err(DatabaseError::TableNotFound(_))
    ));
    assert!(rows(&mut db, "SELECT * FROM t").is_empty());
}

#[test]
fn test_error_taxonomy() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);

    assert!(matches!(
        db.execute_query("UPDATE t SET id = 1"),
        Err(DatabaseError::UnsupportedStatement(_))
    ));
    assert!(matches!(
        db.execute_query("INSERT t VALUES (1)"),
        Err(DatabaseError::Syntax { statement: StatementKind::Insert, .. })
    ));
    assert!(matches!(
        db.execute_query("SELECT * FROM nope"),
        Err(DatabaseError::TableNotFound(_))
    ));
    assert!(matches!(
        db.execute_query("SELECT * FROM t WHERE age = 3"),
        Err(DatabaseError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        db.execute_query("DELETE FROM t WHERE age = 3"),
        Err(DatabaseError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        db.execute_query("CREATE INDEX ON t (name)"),
        Err(DatabaseError::ColumnNotIndexable { .. })
    ));
    assert!(matches!(
        db.execute_query("SELECT * FROM t WHERE id = abc"),
        Err(DatabaseError::ValueCoercion { .. })
    ));
}

#[test]
fn test_tables_reload_from_disk() {
    let tmp = TempDir::new().unwrap();
    {
        let mut db = open(&tmp);
        setup_users(&mut db);
        run(&mut db, "INSERT INTO t VALUES (1, 'alice')");
        run(&mut db, "CREATE INDEX ON t (id)");
        run(&mut db, "INSERT INTO t VALUES (2, 'bob')");
    }

    let mut db = open(&tmp);
    assert!(!db.catalog().is_resident("t"));
    assert_eq!(
        rows(&mut db, "SELECT name FROM t WHERE id = 2"),
        vec![row(vec![Value::from("bob")])]
    );
    assert!(db.catalog().index("t", "id").is_some());
}

#[test]
fn test_index_cleared_by_delete_all_then_maintained() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (1, 'a')");
    run(&mut db, "CREATE INDEX ON t (id)");
    assert!(tmp.path().join("t_id.index").exists());

    run(&mut db, "DELETE * FROM t");
    assert!(!tmp.path().join("t_id.index").exists());
    assert!(db.catalog().index("t", "id").unwrap().find(&Value::Int(1)).is_empty());

    run(&mut db, "INSERT INTO t VALUES (1, 'b')");
    assert_eq!(
        rows(&mut db, "SELECT * FROM t WHERE id = 1"),
        vec![row(vec![Value::Int(1), Value::from("b")])]
    );
}

#[test]
fn test_delete_where_leaves_no_temp_file() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (1, 'a')");
    run(&mut db, "INSERT INTO t VALUES (2, 'b')");

    run(&mut db, "DELETE FROM t WHERE name = 'a'");

    assert!(!tmp.path().join("t.data.tmp").exists());
    assert_eq!(
        rows(&mut db, "SELECT * FROM t"),
        vec![row(vec![Value::Int(2), Value::from("b")])]
    );
}

#[test]
fn test_strict_int_nulls() {
    let tmp = TempDir::new().unwrap();
    let config = DatabaseConfig::builder()
        .data_dir(tmp.path())
        .strict_int_nulls(true)
        .build();
    let mut db = Database::open(config).unwrap();
    setup_users(&mut db);

    assert!(matches!(
        db.execute_query("INSERT INTO t VALUES (0, 'z')"),
        Err(DatabaseError::ValueCoercion { .. })
    ));
    run(&mut db, "INSERT INTO t VALUES (1, 'z')");
}

#[test]
fn test_execute_with_caller_owned_catalog() {
    let tmp = TempDir::new().unwrap();
    let mut catalog = Catalog::open(DatabaseConfig::new(tmp.path())).unwrap();

    execute(&mut catalog, "create table t (id int, name varchar(5));").unwrap();
    execute(&mut catalog, "insert into t values (4, 'dee');").unwrap();

    let response = execute(&mut catalog, "select * from t where id = 4;").unwrap();
    assert_eq!(
        response.rows().unwrap(),
        &[row(vec![Value::Int(4), Value::from("dee")])]
    );
}

#[test]
fn test_recreate_table_truncates() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "INSERT INTO t VALUES (1, 'a')");

    run(&mut db, "CREATE TABLE t (id INT)");

    assert!(rows(&mut db, "SELECT * FROM t").is_empty());
    run(&mut db, "INSERT INTO t VALUES (9)");
    assert_eq!(rows(&mut db, "SELECT * FROM t"), vec![row(vec![Value::Int(9)])]);
}

#[test]
fn test_index_snapshot_not_trusted_after_unindexed_rewrite() {
    let tmp = TempDir::new().unwrap();
    let open_with = |persist: bool| {
        Database::open(
            DatabaseConfig::builder()
                .data_dir(tmp.path())
                .persist_indexes(persist)
                .build(),
        )
        .unwrap()
    };

    {
        let mut db = open_with(true);
        setup_users(&mut db);
        run(&mut db, "INSERT INTO t VALUES (1, 'a')");
        run(&mut db, "INSERT INTO t VALUES (2, 'b')");
        run(&mut db, "INSERT INTO t VALUES (3, 'c')");
        run(&mut db, "CREATE INDEX ON t (id)");
    }
    {
        let mut db = open_with(false);
        run(&mut db, "DELETE FROM t WHERE id = 1");
        run(&mut db, "INSERT INTO t VALUES (4, 'd')");
    }

    let mut db = open_with(true);
    let indexed = rows(&mut db, "SELECT * FROM t WHERE id = 3");
    assert!(db.catalog().index("t", "id").is_some());
    assert_eq!(indexed, vec![row(vec![Value::Int(3), Value::from("c")])]);
    assert_eq!(
        rows(&mut db, "SELECT * FROM t WHERE id = 4"),
        vec![row(vec![Value::Int(4), Value::from("d")])]
    );
}

#[test]
fn test_inserts_reach_index_file_on_flush() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);
    setup_users(&mut db);
    run(&mut db, "CREATE INDEX ON t (id)");
    let snapshot = std::fs::read(tmp.path().join("t_id.index")).unwrap();

    for id in 1..=20 {
        run(&mut db, &format!("INSERT INTO t VALUES ({id}, 'n')"));
    }
    assert_eq!(std::fs::read(tmp.path().join("t_id.index")).unwrap(), snapshot);

    db.flush().unwrap();
    drop(db);

    let mut db = open(&tmp);
    assert_eq!(
        rows(&mut db, "SELECT id FROM t WHERE id = 17"),
        vec![row(vec![Value::Int(17)])]
    );
    assert_eq!(
        db.catalog().index("t", "id").unwrap().find(&Value::Int(17)),
        &[16]
    );
}

#[test]
fn test_unlexable_column_definitions_are_dropped() {
    let tmp = TempDir::new().unwrap();
    let mut db = open(&tmp);

    run(
        &mut db,
        "CREATE TABLE t (id INT, qty INT CHECK (qty > 0), `bio` TEXT, tag VARCHAR(3))",
    );

    let schema = db.catalog().table("t").unwrap().schema().clone();
    assert_eq!(
        schema.column_names(),
        vec!["id".to_string(), "qty".to_string(), "tag".to_string()]
    );
}

use sql_session::prelude::*;

fn people() -> Result<Session, SqlSessionError> {
    let mut session = Session::open("sqlite::memory:", "", "")?;
    session.execute_batch(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER);
         INSERT INTO people (name, age) VALUES ('ann', 31), ('bob', 45), ('cy', 45);",
    )?;
    Ok(session)
}

fn count(session: &mut Session) -> Result<i64, SqlSessionError> {
    let table = session.query("SELECT count(*) AS n FROM people")?.into_table();
    Ok(table.value("n", 0).and_then(RowValues::as_int).copied().unwrap_or_default())
}

#[test]
fn update_reports_rows_or_minus_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    assert_eq!(
        session.update("UPDATE people SET age = age + 1 WHERE age = ?1", &[45.into()])?,
        2
    );
    assert_eq!(
        session.update("UPDATE people SET age = 0 WHERE name = ?1", &["nobody".into()])?,
        NO_ROWS
    );
    Ok(())
}

#[test]
fn delete_reports_rows_or_minus_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    assert_eq!(session.delete("DELETE FROM people WHERE name = ?1", &["ann".into()])?, 1);
    assert_eq!(session.delete("DELETE FROM people WHERE name = ?1", &["ann".into()])?, -1);
    assert_eq!(count(&mut session)?, 2);
    Ok(())
}

#[test]
fn insert_returns_the_generated_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let id = session.insert(
        "INSERT INTO people (name, age) VALUES (?1, ?2)",
        &[RowValues::from("dee"), RowValues::Null],
    )?;
    assert_eq!(id, 4);

    let table = session
        .query_with("SELECT name, age FROM people WHERE id = ?1", &[id.into()])?
        .into_table();
    assert_eq!(table.value("name", 0).and_then(RowValues::as_text), Some("dee"));
    assert_eq!(table.value("age", 0), Some(&RowValues::Null));
    Ok(())
}

#[test]
fn insert_without_new_rows_returns_minus_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let id = session.insert(
        "INSERT INTO people (name, age) SELECT name, age FROM people WHERE 0",
        &[],
    )?;
    assert_eq!(id, NO_ROWS);
    // Not an INSERT INTO, so no key is reported even though a row changed.
    assert_eq!(
        session.insert("UPDATE people SET age = 1 WHERE name = 'ann'", &[])?,
        NO_ROWS
    );
    Ok(())
}

#[test]
fn wrong_parameter_count_fails_before_execution() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let err = session
        .insert("INSERT INTO people (name, age) VALUES (?1, ?2)", &["eve".into()])
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::ParameterError(_)), "{err:?}");

    let err = session
        .delete("DELETE FROM people WHERE id = ?1", &[1.into(), 2.into()])
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::ParameterError(_)), "{err:?}");

    assert_eq!(count(&mut session)?, 3);
    Ok(())
}

#[test]
fn disallowed_statements_never_reach_the_database() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    for sql in [
        "PRAGMA user_version = 3",
        "REPLACE INTO people (name) VALUES ('x')",
        "INSERT people (name) VALUES ('x')",
        "WITH t AS (SELECT 1) SELECT * FROM t",
        "  ",
    ] {
        let err = session.update(sql, &[]).unwrap_err();
        assert!(matches!(err, SqlSessionError::InvalidStatement(_)), "{sql}: {err:?}");
    }
    let version = session.with_connection(|conn| {
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))?)
    })?;
    assert_eq!(version, 0);

    // Validation runs first, even on a closed session.
    session.close()?;
    let err = session.delete("TRUNCATE people", &[]).unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)));
    Ok(())
}

#[test]
fn lowercase_and_indented_statements_are_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    assert_eq!(
        session.update("\n   update people set age = 2 where name = 'bob'", &[])?,
        1
    );
    assert_eq!(session.query("  select * from people")?.row_count(), 3);
    Ok(())
}

#[test]
fn schema_statements_report_no_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    assert_eq!(
        session.update("CREATE TABLE pets (id INTEGER PRIMARY KEY, owner INTEGER)", &[])?,
        NO_ROWS
    );
    assert_eq!(session.update("ALTER TABLE pets ADD COLUMN name TEXT", &[])?, NO_ROWS);
    assert_eq!(session.insert("INSERT INTO pets (owner, name) VALUES (1, 'rex')", &[])?, 1);
    assert_eq!(session.update("DROP TABLE pets", &[])?, NO_ROWS);
    Ok(())
}

#[test]
fn driver_errors_are_surfaced() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let err = session
        .insert("INSERT INTO people (id, name) VALUES (1, 'dup')", &[])
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::DriverError(_)), "{err:?}");

    let err = session.query("SELECT missing FROM people").unwrap_err();
    assert!(matches!(err, SqlSessionError::DriverError(_)), "{err:?}");
    assert!(!err.is_mapping());
    Ok(())
}

#[test]
fn batch_scripts_are_atomic() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let err = session
        .execute_batch(
            "INSERT INTO people (name) VALUES ('ok');
             INSERT INTO people (name) VALUES (NULL);",
        )
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::DriverError(_)));
    assert_eq!(count(&mut session)?, 3);
    assert!(!session.in_transaction());

    let err = session.execute_batch("VACUUM").unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)));
    Ok(())
}

#[test]
fn typed_values_round_trip_through_storage() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(":memory:", "", "")?;
    session.execute_batch("CREATE TABLE vals (i INTEGER, f REAL, t TEXT, b BLOB, ts TEXT, j TEXT)")?;
    let ts = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_milli_opt(8, 15, 0, 250))
        .expect("valid timestamp");
    session.insert(
        "INSERT INTO vals VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        &[
            RowValues::Int(-7),
            RowValues::Float(1.5),
            RowValues::from("text"),
            RowValues::Blob(vec![0, 1, 2]),
            RowValues::Timestamp(ts),
            RowValues::JSON(serde_json::json!({"k": [1, 2]})),
        ],
    )?;
    let result = session.query("SELECT * FROM vals")?;
    let row = result.rows().get(0).expect("one row");
    assert_eq!(row.get("i"), Some(&RowValues::Int(-7)));
    assert_eq!(row.get("b").and_then(RowValues::as_blob), Some(&[0u8, 1, 2][..]));
    assert_eq!(row.get("ts").and_then(RowValues::as_timestamp), Some(ts));
    let json: serde_json::Value = serde_json::from_str(
        row.get("j").and_then(RowValues::as_text).expect("json stored as text"),
    )?;
    assert_eq!(json["k"][1], 2);
    Ok(())
}

fn user_version(session: &mut Session) -> Result<i64, SqlSessionError> {
    session.with_connection(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
}

#[test]
fn every_statement_of_a_batch_is_validated() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let err = session
        .execute_batch("CREATE TABLE t (a INTEGER); PRAGMA user_version = 7;")
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)), "{err:?}");
    assert_eq!(user_version(&mut session)?, 0);
    // The script ran in its own transaction, so the table is gone too.
    assert!(session.query("SELECT a FROM t").is_err());

    session.begin()?;
    let err = session
        .execute_batch("INSERT INTO people (name) VALUES ('zed');\n  pragma user_version = 9")
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)), "{err:?}");
    assert!(session.in_transaction());
    session.rollback()?;
    assert_eq!(user_version(&mut session)?, 0);
    assert_eq!(count(&mut session)?, 3);
    Ok(())
}

#[test]
fn batch_statements_may_span_lines_and_bodies() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    session.execute_batch(
        "CREATE TABLE audit (who TEXT);
         CREATE TRIGGER people_audit AFTER INSERT ON people BEGIN
             INSERT INTO audit VALUES (NEW.name);
         END;
         INSERT INTO people (name) VALUES ('dee');
         SELECT * FROM audit;",
    )?;
    let table = session.query("SELECT who FROM audit")?.into_table();
    assert_eq!(table.get("who").unwrap(), &[RowValues::from("dee")]);
    Ok(())
}

#[test]
fn upsert_that_only_updates_reports_no_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    session.execute_batch(
        "CREATE TABLE kv (id INTEGER PRIMARY KEY, k TEXT UNIQUE, v INTEGER);
         CREATE TABLE other (id INTEGER PRIMARY KEY);",
    )?;
    let upsert = "INSERT INTO kv (k, v) VALUES (?1, ?2) ON CONFLICT(k) DO UPDATE SET v = excluded.v";
    assert_eq!(session.insert(upsert, &["a".into(), 1.into()])?, 1);
    assert_eq!(session.insert("INSERT INTO other (id) VALUES (500)", &[])?, 500);

    assert_eq!(session.insert(upsert, &["a".into(), 2.into()])?, NO_ROWS);
    let table = session.query("SELECT v FROM kv WHERE k = 'a'")?.into_table();
    assert_eq!(table.get("v").unwrap(), &[RowValues::Int(2)]);

    // A fresh key is still reported.
    assert_eq!(session.insert(upsert, &["b".into(), 3.into()])?, 2);
    Ok(())
}

#[test]
fn queries_refuse_statements_without_result_columns() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = people()?;
    let err = session.query("DELETE FROM people").unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)), "{err:?}");
    let err = session
        .query_table("UPDATE people SET age = 0", &[])
        .unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)), "{err:?}");
    let err = session.query("CREATE TABLE never (a)").unwrap_err();
    assert!(matches!(err, SqlSessionError::InvalidStatement(_)), "{err:?}");

    assert_eq!(count(&mut session)?, 3);
    let ages = session.query("SELECT age FROM people WHERE age = 0")?;
    assert!(ages.is_empty());
    assert!(session.query("SELECT a FROM never").is_err());

    // RETURNING gives the statement result columns, so it runs as a query.
    let gone = session.query_with(
        "DELETE FROM people WHERE name = ?1 RETURNING id",
        &["ann".into()],
    )?;
    assert_eq!(gone.table().get("id").unwrap(), &[RowValues::Int(1)]);
    assert_eq!(count(&mut session)?, 2);
    Ok(())
}

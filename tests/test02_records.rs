use chrono::NaiveDateTime;
use sql_session::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct LastUpdate {
    last_update: Option<NaiveDateTime>,
}
impl_record!(LastUpdate { last_update });

#[derive(Debug, Default, Clone, PartialEq)]
struct Actor {
    actor_id: i64,
    first_name: String,
    last_name: String,
    audit: LastUpdate,
}
impl_record!(Actor {
    actor_id,
    first_name,
    last_name,
} parents {
    audit: LastUpdate,
});

#[derive(Debug, Default, PartialEq)]
struct Pair {
    id: i64,
    name: String,
}
impl_record!(Pair { id, name });

fn actor_session() -> Result<Session, SqlSessionError> {
    let mut session = Session::open(":memory:", "root", "")?;
    session.execute_batch(
        "CREATE TABLE actor (
            actor_id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            last_update TEXT
        );
        INSERT INTO actor VALUES (1, 'PENELOPE', 'GUINESS', '2006-02-15 04:34:33');
        INSERT INTO actor VALUES (2, 'NICK', 'WAHLBERG', NULL);
        INSERT INTO actor VALUES (3, 'ED', 'CHASE', '2006-02-15 04:34:33.500');",
    )?;
    Ok(session)
}

#[test]
fn single_row_maps_own_and_parent_fields() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = actor_session()?;
    let actor = session
        .query_as::<Actor>("SELECT * FROM actor WHERE actor_id = ?1", &[RowValues::Int(1)])?
        .into_single()
        .expect("exactly one row");
    assert_eq!(actor.actor_id, 1);
    assert_eq!(actor.first_name, "PENELOPE");
    assert_eq!(actor.last_name, "GUINESS");
    assert_eq!(
        actor.audit.last_update,
        Some(NaiveDateTime::parse_from_str(
            "2006-02-15 04:34:33",
            "%Y-%m-%d %H:%M:%S"
        )?)
    );
    Ok(())
}

#[test]
fn many_rows_are_keyed_by_first_column() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = actor_session()?;
    let actors = session.query_as::<Actor>("SELECT * FROM actor ORDER BY actor_id", &[])?;
    assert!(!actors.is_single());
    assert_eq!(actors.len(), 3);
    assert_eq!(actors.get(2).map(|a| a.first_name.as_str()), Some("NICK"));
    assert_eq!(actors.get(2).and_then(|a| a.audit.last_update), None);
    assert!(actors.get(3).and_then(|a| a.audit.last_update).is_some());
    let names: Vec<String> = actors.into_records().into_iter().map(|a| a.first_name).collect();
    assert_eq!(names, ["PENELOPE", "NICK", "ED"]);
    Ok(())
}

#[test]
fn zero_rows_give_an_empty_map() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = actor_session()?;
    let none = session.query_as::<Actor>(
        "SELECT * FROM actor WHERE first_name = ?1",
        &[RowValues::from("NOBODY")],
    )?;
    assert!(none.is_empty());
    assert!(none.keyed().is_some());
    Ok(())
}

#[test]
fn duplicate_keys_keep_the_last_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open("sqlite::memory:", "", "")?;
    session.execute_batch(
        "CREATE TABLE pairs (seq INTEGER PRIMARY KEY, id INTEGER, name TEXT);
         INSERT INTO pairs (id, name) VALUES (1, 'a');
         INSERT INTO pairs (id, name) VALUES (2, 'b');
         INSERT INTO pairs (id, name) VALUES (2, 'c');",
    )?;
    let got = session.query_as::<Pair>("SELECT id, name FROM pairs ORDER BY seq", &[])?;
    let map = got.into_keyed().expect("three rows give a map");
    assert_eq!(map.len(), 2);
    assert_eq!(
        map.get(&RecordKey::from(1)),
        Some(&Pair {
            id: 1,
            name: "a".into()
        })
    );
    assert_eq!(
        map.get(&RecordKey::from(2)),
        Some(&Pair {
            id: 2,
            name: "c".into()
        })
    );
    Ok(())
}

#[test]
fn unknown_columns_are_skipped_and_key_is_first_column() -> Result<(), Box<dyn std::error::Error>>
{
    let mut session = actor_session()?;
    // first_name leads, so it becomes the key even though actor_id is the primary key.
    let got = session.query_as::<Pair>(
        "SELECT first_name AS name, actor_id AS id, last_name FROM actor ORDER BY actor_id",
        &[],
    )?;
    let ed = got.get("ED").expect("keyed by name");
    assert_eq!(ed.id, 3);
    assert_eq!(ed.name, "ED");
    Ok(())
}

#[test]
fn type_mismatch_aborts_the_whole_result() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = actor_session()?;
    let err = session
        .query_as::<Pair>("SELECT actor_id AS id, actor_id AS name FROM actor", &[])
        .unwrap_err();
    assert!(err.is_mapping());
    assert!(err.to_string().contains("`name`"), "{err}");
    Ok(())
}

#[test]
fn records_from_a_buffered_query_result() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = actor_session()?;
    let result = session.query("SELECT actor_id, first_name FROM actor ORDER BY actor_id")?;
    // The same buffered rows feed both the table and the records.
    let actors = materialize::<Actor>(result.rows())?;
    assert_eq!(actors.len(), result.table().row_count());
    assert_eq!(actors.get(1).map(|a| a.last_name.as_str()), Some(""));
    Ok(())
}

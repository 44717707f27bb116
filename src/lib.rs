//! Blocking convenience session over `rusqlite`.
//!
//! A [`Session`] validates each statement against a keyword allow-list, binds
//! positional parameters, runs it, and returns detached results: a
//! column-keyed [`ResultTable`] (with the buffered rows alongside) or records
//! declared with [`impl_record!`].
//!
//! ```rust
//! use sql_session::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Actor {
//!     actor_id: i64,
//!     first_name: String,
//! }
//! impl_record!(Actor { actor_id, first_name });
//!
//! # fn main() -> Result<(), SqlSessionError> {
//! let mut session = Session::open("sqlite::memory:", "", "")?;
//! session.execute_batch("CREATE TABLE actor (actor_id INTEGER PRIMARY KEY, first_name TEXT);")?;
//! session.insert("INSERT INTO actor (first_name) VALUES (?1)", &[RowValues::from("PENELOPE")])?;
//!
//! let table = session.query("SELECT * FROM actor")?.into_table();
//! assert_eq!(table.get("first_name").unwrap()[0].as_text(), Some("PENELOPE"));
//!
//! let actor = session
//!     .query_as::<Actor>("SELECT * FROM actor WHERE actor_id = ?1", &[RowValues::Int(1)])?
//!     .into_single()
//!     .unwrap();
//! assert_eq!(actor.first_name, "PENELOPE");
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod helpers;
pub mod params;
pub mod prelude;
pub mod record;
pub mod results;
pub mod session;
pub mod types;
pub mod validate;

pub use config::{SessionOptions, SessionOptionsBuilder};
pub use error::{Result, SqlSessionError};
pub use record::{Materialized, Record, RecordKey};
pub use results::{QueryResult, ResultTable};
pub use session::Session;
pub use types::RowValues;

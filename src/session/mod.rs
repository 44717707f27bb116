// Session module - the blocking facade over one SQLite connection
//
// - core: open/close, statement plumbing shared by the other parts
// - select: queries returning tables or records
// - dml: update/insert/delete and batch scripts
// - tx: begin/commit/rollback

mod core;
mod dml;
mod select;
mod tx;

pub use core::Session;
pub use dml::NO_ROWS;
pub use tx::TxState;

//! Bookkeeping tables owned by the ledger itself.

pub mod applied_migration;
pub mod ledger_lock;

//! Schema version ledger.
//!
//! Migrations are plain data ([`Migration`]: an id, dependency ids and an
//! ordered list of [`Operation`]s). [`plan`] orders them topologically and
//! [`Ledger`] applies them exactly once against a live database, recording
//! each success in `tally_migrations`.

pub mod entities;
pub mod error;
pub mod ledger;
pub mod plan;
pub mod state;
pub mod types;

mod ddl;

pub use error::LedgerError;
pub use ledger::{ApplyOutcome, Ledger, MigrateReport, MigrationStatus};
pub use plan::{plan, resolve_order};
pub use state::{EntityShape, SchemaState, StateError};
pub use types::{FieldDefault, FieldSpec, FieldType, Migration, MigrationId, Operation};

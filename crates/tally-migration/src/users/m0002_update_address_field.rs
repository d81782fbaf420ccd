use tally_ledger::{FieldSpec, Migration, Operation};

/// Narrow `address` to an Ethereum address and make it optional. Present
/// addresses stay unique.
pub fn migration() -> Migration {
    Migration::new("users", "0002_update_address_field")
        .depends_on("users", "0001_initial")
        .operation(Operation::alter_field(
            "users",
            "address",
            FieldSpec::char(42).nullable().unique(),
        ))
}

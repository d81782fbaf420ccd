use tally_ledger::{FieldSpec, Migration, Operation};

/// Adds `inactive` to the permitted statuses. Storage is unchanged.
pub fn migration() -> Migration {
    Migration::new("validators", "0002_alter_validatorwallet_status")
        .depends_on("validators", "0001_initial")
        .operation(Operation::alter_field(
            "validator_wallets",
            "status",
            FieldSpec::char(20)
                .default_str("active")
                .choices(&["active", "banned", "permabanned", "inactive"]),
        ))
}

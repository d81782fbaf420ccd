use tally_ledger::{FieldDefault, FieldSpec, Migration, Operation};

pub fn migration() -> Migration {
    Migration::new("validators", "0001_initial")
        .depends_on("users", "0001_initial")
        .operation(Operation::create_entity(
            "validator_wallets",
            vec![
                ("id", FieldSpec::auto_id()),
                ("address", FieldSpec::char(42).unique()),
                (
                    "status",
                    FieldSpec::char(20)
                        .default_str("active")
                        .choices(&["active", "banned", "permabanned"]),
                ),
                ("operator_address", FieldSpec::char(42).nullable()),
                ("moniker", FieldSpec::char(255).default_str("")),
                ("created_at", FieldSpec::datetime().default(FieldDefault::Now)),
                ("updated_at", FieldSpec::datetime().default(FieldDefault::Now)),
            ],
        ))
}

use tally_ledger::{FieldSpec, Migration, Operation};

pub fn migration() -> Migration {
    Migration::new("ethereum_auth", "0001_initial").operation(Operation::create_entity(
        "nonces",
        vec![
            ("id", FieldSpec::auto_id()),
            ("value", FieldSpec::char(64).unique()),
            ("created_at", FieldSpec::datetime()),
            ("used", FieldSpec::boolean().default_bool(false)),
            ("expires_at", FieldSpec::datetime()),
        ],
    ))
}

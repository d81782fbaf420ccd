use tally_ledger::{FieldDefault, FieldSpec, Migration, Operation};

pub fn migration() -> Migration {
    Migration::new("users", "0001_initial").operation(Operation::create_entity(
        "users",
        vec![
            ("id", FieldSpec::auto_id()),
            ("email", FieldSpec::char(254).unique()),
            ("username", FieldSpec::char(150).default_str("")),
            ("name", FieldSpec::char(255).default_str("")),
            ("address", FieldSpec::char(255)),
            ("visible", FieldSpec::boolean().default_bool(true)),
            ("created_at", FieldSpec::datetime().default(FieldDefault::Now)),
            ("updated_at", FieldSpec::datetime().default(FieldDefault::Now)),
        ],
    ))
}

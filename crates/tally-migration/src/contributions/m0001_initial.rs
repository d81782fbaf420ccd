use tally_ledger::{FieldDefault, FieldSpec, Migration, Operation};

pub fn migration() -> Migration {
    Migration::new("contributions", "0001_initial").operation(Operation::create_entity(
        "contribution_types",
        vec![
            ("id", FieldSpec::auto_id()),
            ("name", FieldSpec::char(100).unique()),
            ("slug", FieldSpec::char(100).nullable().unique()),
            ("description", FieldSpec::text().default_str("")),
            ("min_points", FieldSpec::integer().default_int(0)),
            ("max_points", FieldSpec::integer().default_int(100)),
            ("is_default", FieldSpec::boolean().default_bool(false)),
            ("is_submittable", FieldSpec::boolean().default_bool(true)),
            ("created_at", FieldSpec::datetime().default(FieldDefault::Now)),
            ("updated_at", FieldSpec::datetime().default(FieldDefault::Now)),
        ],
    ))
}

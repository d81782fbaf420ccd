use tally_ledger::{FieldDefault, FieldSpec, Migration, Operation};

pub fn migration() -> Migration {
    Migration::new("contributions", "0002_add_highlight_icon_and_examples")
        .depends_on("contributions", "0001_initial")
        .operation(Operation::add_field(
            "contribution_types",
            "icon",
            FieldSpec::char(100).default_str(""),
        ))
        .operation(Operation::add_field(
            "contribution_types",
            "examples",
            FieldSpec::json().default(FieldDefault::EmptyList),
        ))
        .operation(Operation::add_field(
            "contribution_types",
            "is_highlight",
            FieldSpec::boolean().default_bool(false),
        ))
}

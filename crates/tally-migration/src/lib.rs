use tally_ledger::Migration;

mod contributions;
mod ethereum_auth;
mod users;
mod validators;

/// Every migration of the project, grouped by app. Apply order is resolved
/// by the ledger from the declared dependencies.
pub fn catalog() -> Vec<Migration> {
    vec![
        users::m0001_initial::migration(),
        users::m0002_update_address_field::migration(),
        contributions::m0001_initial::migration(),
        contributions::m0002_add_highlight_icon_and_examples::migration(),
        validators::m0001_initial::migration(),
        validators::m0002_alter_validatorwallet_status::migration(),
        ethereum_auth::m0001_initial::migration(),
    ]
}

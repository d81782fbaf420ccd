pub mod m0001_initial;
pub mod m0002_update_address_field;

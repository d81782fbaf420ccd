pub mod m0001_initial;
pub mod m0002_alter_validatorwallet_status;

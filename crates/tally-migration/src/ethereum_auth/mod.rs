pub mod m0001_initial;

pub mod m0001_initial;
pub mod m0002_add_highlight_icon_and_examples;

#[path = "../utils/mod.rs"]
mod utils;

mod basic_test;
mod wire_test;

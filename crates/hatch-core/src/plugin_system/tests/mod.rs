pub mod common;
pub mod name_tests;
pub mod resolution_tests;

//! Property test modules

mod alias_tests;
mod secret_ref_tests;

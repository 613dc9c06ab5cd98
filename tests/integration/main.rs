//! Integration tests for trade-guard

mod admission_test;
mod config_test;
mod lock_test;
mod restore_test;
mod sizing_test;

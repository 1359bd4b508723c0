//! Session module integration tests

mod failure_tests;
mod lifecycle_tests;
mod reconcile_tests;
mod update_tests;

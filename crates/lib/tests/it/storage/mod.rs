//! Storage module integration tests

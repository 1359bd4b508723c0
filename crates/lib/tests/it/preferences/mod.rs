//! Preference sync integration tests

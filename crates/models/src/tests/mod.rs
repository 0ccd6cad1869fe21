/// Construction, update and policy tests for every entity type
pub mod entity_tests;

/// Record / transport serialization tests
pub mod serialization_tests;

//! Channel subscription integration tests

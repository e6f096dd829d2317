//! Poll client integration tests

#[cfg(feature = "ssr")]
mod end_to_end_test;

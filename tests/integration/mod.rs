//! Integration tests

#[cfg(feature = "ssr")]
mod config_test;
#[cfg(feature = "ssr")]
mod realtime;
mod client;

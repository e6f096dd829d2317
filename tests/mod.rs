//! Test suite for pollcast
//!
//! This module organizes all tests

pub mod integration;
pub mod property;

//! Messaging Module
//!
//! Threads, thread messages and the participant check that gates thread
//! channels.

pub mod access;
pub mod db;
pub mod handlers;

pub use access::{MembershipTable, ThreadAccess};
pub use handlers::{create_thread, send_message};

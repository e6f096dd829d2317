//! Feed Module
//!
//! Global feed posts. Creating a post publishes `post_created` on
//! `feed:global`.

pub mod db;
pub mod handlers;

pub use handlers::{create_post, list_posts};

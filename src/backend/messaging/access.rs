//! Thread access decisions
//!
//! Answers "may this user observe this thread?" for the thread poll route
//! and the message send route. With a database the answer comes from
//! `thread_participants`; without one, from an in-memory membership table.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use sqlx::PgPool;
use uuid::Uuid;

use super::db;

/// In-memory thread membership
#[derive(Clone, Default, Debug)]
pub struct MembershipTable {
    threads: Arc<RwLock<HashMap<Uuid, HashSet<Uuid>>>>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, thread_id: Uuid, user_id: Uuid) {
        self.threads.write().entry(thread_id).or_default().insert(user_id);
    }

    pub fn revoke(&self, thread_id: Uuid, user_id: Uuid) {
        let mut threads = self.threads.write();
        if let Some(members) = threads.get_mut(&thread_id) {
            members.remove(&user_id);
            if members.is_empty() {
                threads.remove(&thread_id);
            }
        }
    }

    pub fn is_participant(&self, thread_id: Uuid, user_id: Uuid) -> bool {
        self.threads
            .read()
            .get(&thread_id)
            .is_some_and(|members| members.contains(&user_id))
    }
}

/// Participant check used as a boolean gate
#[derive(Clone, Debug)]
pub enum ThreadAccess {
    Postgres(PgPool),
    Memory(MembershipTable),
}

impl ThreadAccess {
    pub async fn is_participant(&self, thread_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        match self {
            Self::Postgres(pool) => db::is_user_participant(pool, thread_id, user_id).await,
            Self::Memory(table) => Ok(table.is_participant(thread_id, user_id)),
        }
    }
}

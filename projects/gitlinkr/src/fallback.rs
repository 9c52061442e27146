//! In-memory stores used when the reactions or repo-follows tables are
//! unreachable. Process-local and lost on restart.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// item id -> reaction type -> users.
#[derive(Debug, Default)]
pub struct MemoryReactions {
    items: Mutex<HashMap<String, HashMap<String, HashSet<String>>>>,
}

pub type ReactionCounts = BTreeMap<String, BTreeMap<String, i64>>;

impl MemoryReactions {
    pub fn add(&self, item_id: &str, kind: &str, user: &str) {
        lock(&self.items)
            .entry(item_id.to_string())
            .or_default()
            .entry(kind.to_string())
            .or_default()
            .insert(user.to_string());
    }

    pub fn remove(&self, item_id: &str, kind: &str, user: &str) {
        if let Some(users) = lock(&self.items)
            .get_mut(item_id)
            .and_then(|kinds| kinds.get_mut(kind))
        {
            users.remove(user);
        }
    }

    /// Items never reacted to are absent; emptied types report zero.
    pub fn counts(&self, ids: &[String]) -> ReactionCounts {
        let items = lock(&self.items);
        ids.iter()
            .filter_map(|id| {
                items.get(id).map(|kinds| {
                    let counts = kinds
                        .iter()
                        .map(|(kind, users)| (kind.clone(), users.len() as i64))
                        .collect();
                    (id.clone(), counts)
                })
            })
            .collect()
    }
}

/// user -> followed repository full names, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryRepoFollows {
    users: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryRepoFollows {
    pub fn add(&self, user: &str, repo: &str) {
        let mut users = lock(&self.users);
        let repos = users.entry(user.to_string()).or_default();
        if !repos.iter().any(|r| r == repo) {
            repos.push(repo.to_string());
        }
    }

    pub fn remove(&self, user: &str, repo: &str) {
        if let Some(repos) = lock(&self.users).get_mut(user) {
            repos.retain(|r| r != repo);
        }
    }

    pub fn list(&self, user: &str) -> Vec<String> {
        lock(&self.users).get(user).cloned().unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_counts_are_per_type_and_user_unique() {
        let store = MemoryReactions::default();
        store.add("event-1", "like", "ada");
        store.add("event-1", "like", "ada");
        store.add("event-1", "like", "grace");
        store.add("event-1", "fire", "ada");
        store.remove("event-1", "fire", "ada");

        let counts = store.counts(&["event-1".into(), "event-2".into()]);

        assert_eq!(counts.len(), 1);
        assert_eq!(counts["event-1"]["like"], 2);
        assert_eq!(counts["event-1"]["fire"], 0);
    }

    #[test]
    fn repo_follows_keep_order_without_duplicates() {
        let store = MemoryRepoFollows::default();
        store.add("ada", "rust-lang/rust");
        store.add("ada", "tokio-rs/tokio");
        store.add("ada", "rust-lang/rust");
        store.remove("ada", "missing/repo");

        assert_eq!(store.list("ada"), vec!["rust-lang/rust", "tokio-rs/tokio"]);
        assert!(store.list("grace").is_empty());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cross-thread recall for one user, keyed by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMemory {
    pub user_email: String,
    /// Most recently touched first
    #[serde(default)]
    pub recent_threads: Vec<RecentThread>,
    #[serde(default)]
    pub facts: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentThread {
    pub thread_id: String,
    pub scenario: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: String,
    pub updated_at: DateTime<Utc>,
}

impl UserMemory {
    pub fn new(user_email: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into().trim().to_lowercase(),
            recent_threads: Vec::new(),
            facts: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Move `entry` to the front, evicting the oldest entries past `cap`
    pub fn touch_thread(&mut self, entry: RecentThread, cap: usize) {
        self.recent_threads.retain(|t| t.thread_id != entry.thread_id);
        self.recent_threads.insert(0, entry);
        self.recent_threads.truncate(cap);
        self.updated_at = Utc::now();
    }

    pub fn forget_thread(&mut self, thread_id: &str) -> bool {
        let before = self.recent_threads.len();
        self.recent_threads.retain(|t| t.thread_id != thread_id);
        self.updated_at = Utc::now();
        before != self.recent_threads.len()
    }

    /// Add a fact unless an equal one (ignoring case) exists; oldest facts go first past `cap`
    pub fn remember_fact(&mut self, fact: &str, cap: usize) -> bool {
        let fact = fact.trim();
        if fact.is_empty() || self.facts.iter().any(|f| f.eq_ignore_ascii_case(fact)) {
            return false;
        }
        self.facts.push(fact.to_string());
        if self.facts.len() > cap {
            let excess = self.facts.len() - cap;
            self.facts.drain(..excess);
        }
        self.updated_at = Utc::now();
        true
    }
}

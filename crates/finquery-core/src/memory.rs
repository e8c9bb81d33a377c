//! Bounded per-session conversation memory
//!
//! An explicit keyed store (session id → bounded log) rather than ambient
//! globals, so many sessions can run concurrently in tests without
//! cross-contamination. Appends for the same session serialize on a
//! per-session mutex; sessions never contend with each other.

use chrono::{DateTime, Duration, Utc};
use finquery_llm::Role;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

/// A single turn in a session transcript, immutable once appended
#[derive(Debug, Clone)]
pub struct Turn {
    /// Who spoke
    pub role: Role,
    /// Turn text
    pub content: String,
    /// When the turn was appended
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn stamped now
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn stamped now
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only bounded transcript for one session
#[derive(Debug)]
struct SessionLog {
    turns: VecDeque<Turn>,
    last_active: DateTime<Utc>,
}

impl SessionLog {
    fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(window),
            last_active: Utc::now(),
        }
    }

    fn append(&mut self, turn: Turn, window: usize) {
        self.turns.push_back(turn);
        // Sliding window: oldest turns evicted, never summarized
        while self.turns.len() > window {
            self.turns.pop_front();
        }
        self.last_active = Utc::now();
    }
}

/// Keyed store of bounded session transcripts
pub struct ConversationMemory {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionLog>>>>,
    window: usize,
}

impl ConversationMemory {
    /// Create a store with the given per-session window size
    pub fn new(window: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            window,
        }
    }

    /// The configured window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Last-N turns for a session, oldest first
    ///
    /// A session that has never spoken yields an empty context; nothing is
    /// created as a side effect of reading.
    pub fn context(&self, session_id: &str) -> Vec<Turn> {
        let log = {
            let sessions = match self.sessions.read() {
                Ok(sessions) => sessions,
                Err(_) => return Vec::new(),
            };
            match sessions.get(session_id) {
                Some(log) => Arc::clone(log),
                None => return Vec::new(),
            }
        };

        let log = match log.lock() {
            Ok(log) => log,
            Err(_) => return Vec::new(),
        };
        log.turns.iter().cloned().collect()
    }

    /// Append a single turn, creating the session on first use
    pub fn append(&self, session_id: &str, turn: Turn) {
        let log = self.get_or_create(session_id);
        if let Ok(mut log) = log.lock() {
            log.append(turn, self.window);
        }
    }

    /// Append a completed user/assistant exchange atomically
    ///
    /// Both turns go in under one lock acquisition so a rapid double-submit
    /// on the same session cannot interleave the pair.
    pub fn append_exchange(
        &self,
        session_id: &str,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) {
        let log = self.get_or_create(session_id);
        if let Ok(mut log) = log.lock() {
            log.append(Turn::user(user_text), self.window);
            log.append(Turn::assistant(assistant_text), self.window);
        }
    }

    /// Remove sessions idle longer than `max_idle`; returns how many
    ///
    /// The eviction policy itself (when to call this) is external.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };

        let cutoff = Utc::now() - max_idle;
        let before = sessions.len();
        sessions.retain(|_, log| match log.lock() {
            Ok(log) => log.last_active >= cutoff,
            Err(_) => false,
        });
        before - sessions.len()
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionLog>> {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(log) = sessions.get(session_id) {
                return Arc::clone(log);
            }
        }

        let mut sessions = match self.sessions.write() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(SessionLog::new(self.window)))),
        )
    }
}

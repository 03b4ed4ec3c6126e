//! Bounded conversation memory.
//!
//! `ConversationMemory` keeps the last N turns of a session in insertion
//! order; `SignalHistory` keeps the last few risk signals for escalation checks.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use super::signals::{RiskTag, Signal};

/// Default number of turns kept per session
pub const DEFAULT_MEMORY_CAPACITY: usize = 10;

/// Number of past signals kept per session
pub const SIGNAL_HISTORY_CAPACITY: usize = 5;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// FIFO buffer of turns, never longer than its capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMemory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}

impl ConversationMemory {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Add to the tail, evicting from the head until within capacity.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Append a user/assistant exchange.
    pub fn append_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.append(Turn::user(user));
        self.append(Turn::assistant(assistant));
    }

    /// Replace the whole history, keeping the capacity.
    pub fn replace(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.clear();
        for turn in turns {
            self.append(turn);
        }
    }

    /// Ordered snapshot, oldest first
    pub fn turns(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Most recent turn written by the user
    pub fn last_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::User)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Recent risk signals of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalHistory {
    signals: VecDeque<Signal>,
}

impl SignalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, signal: Signal) {
        self.signals.push_back(signal);
        while self.signals.len() > SIGNAL_HISTORY_CAPACITY {
            self.signals.pop_front();
        }
    }

    /// Risk level of the previous message, if any
    pub fn last_risk_level(&self) -> Option<u8> {
        self.signals.back().map(|s| s.risk_level)
    }

    /// Tag occurrence counts across the kept signals
    pub fn summarize(&self) -> BTreeMap<RiskTag, usize> {
        let mut counts = BTreeMap::new();
        for signal in &self.signals {
            for tag in &signal.tags {
                *counts.entry(*tag).or_insert(0) += 1;
            }
        }
        counts
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

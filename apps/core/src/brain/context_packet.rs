//! Context Packet - Output structure for Brain analysis.
//!
//! Contains everything extracted from a user message before the completion call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::router::RoutePlan;
use super::signals::{
    FootballIntent, MatchPsychology, Mood, RiskTag, Signal, ESCALATION_GUARD_SCORE,
    MAX_ESCALATION_SCORE,
};

/// Pressure on the advisor's limits, across the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardReport {
    /// The message asks to bypass the rules
    pub override_requested: bool,
    /// 0 - 5
    pub escalation_score: u8,
    /// Elevated risk on this message and the previous one
    pub escalation_confirmed: bool,
    /// Tags seen at least three times across recent messages
    pub recurring_tags: Vec<RiskTag>,
}

impl GuardReport {
    /// The message alone shows enough pressure for the guard
    pub fn is_escalating(&self) -> bool {
        self.escalation_score >= ESCALATION_GUARD_SCORE
    }

    /// Whether the prompt needs a risk-guard section
    pub fn is_triggered(&self) -> bool {
        self.override_requested
            || self.escalation_confirmed
            || self.is_escalating()
            || !self.recurring_tags.is_empty()
    }
}

/// Complete context packet from Brain analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPacket {
    /// Original user message
    pub message: String,

    pub signal: Signal,

    pub mood: Mood,

    pub match_psychology: MatchPsychology,

    pub football: FootballIntent,

    pub guard: GuardReport,

    /// Chosen engine with its confidence
    pub route: RoutePlan,

    /// Processing time in microseconds
    pub processing_time_us: u64,

    /// Timestamp of analysis
    pub timestamp: DateTime<Utc>,
}

impl ContextPacket {
    /// Create a new empty context packet
    pub fn new(message: String) -> Self {
        Self {
            message,
            signal: Signal::default(),
            mood: Mood::default(),
            match_psychology: MatchPsychology::default(),
            football: FootballIntent::default(),
            guard: GuardReport::default(),
            route: RoutePlan::default(),
            processing_time_us: 0,
            timestamp: Utc::now(),
        }
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Route: {} ({:.0}%, {}), Risk: {}/5 {:?}, Tone: {:?}, Escalation: {}/{}, Guard: {}",
            self.route.route,
            self.route.confidence * 100.0,
            self.route.reason.label(),
            self.signal.risk_level,
            self.signal.tags,
            self.mood.tone(),
            self.guard.escalation_score,
            MAX_ESCALATION_SCORE,
            if self.guard.is_triggered() { "yes" } else { "no" }
        )
    }
}

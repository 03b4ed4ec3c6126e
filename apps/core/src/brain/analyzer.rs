//! Brain Analyzer - Main orchestrator for the Brain module.
//!
//! Runs signal extraction, guard checks and routing over a message and the
//! session state, producing a `ContextPacket`. Pure: no I/O, never fails.

use chrono::Utc;
use std::time::Instant;
use tracing::debug;

use super::context_packet::{ContextPacket, GuardReport};
use super::memory::{ConversationMemory, SignalHistory};
use super::router::IntentRouter;
use super::signals::{confirm_escalation, RiskTag, Signal, TextSignalExtractor};

/// Occurrences across recent messages for a tag to count as recurring
const RECURRING_TAG_THRESHOLD: usize = 3;

/// Main Brain analyzer that orchestrates all analysis components
#[derive(Debug, Default, Clone, Copy)]
pub struct BrainAnalyzer {
    extractor: TextSignalExtractor,
    router: IntentRouter,
}

impl BrainAnalyzer {
    pub fn new() -> Self {
        Self {
            extractor: TextSignalExtractor::new(),
            router: IntentRouter::new(),
        }
    }

    /// Analyze a message against the turns and signals recorded before it.
    pub fn analyze(
        &self,
        message: &str,
        memory: &ConversationMemory,
        history: &SignalHistory,
    ) -> ContextPacket {
        let start = Instant::now();

        let mut packet = ContextPacket::new(message.to_string());

        // 1. Heuristic signals
        let signals = self.extractor.extract(message);

        // 2. Guards need the current signal and the session's recent ones
        packet.guard = GuardReport {
            override_requested: signals.override_requested,
            escalation_score: signals.escalation_score,
            escalation_confirmed: history
                .last_risk_level()
                .is_some_and(|previous| confirm_escalation(previous, signals.signal.risk_level)),
            recurring_tags: recurring_tags(history, &signals.signal),
        };

        // 3. Routing
        packet.route = self.router.route(message, &signals.football, memory);

        packet.signal = signals.signal;
        packet.mood = signals.mood;
        packet.match_psychology = signals.match_psychology;
        packet.football = signals.football;

        // 4. Set timing
        packet.processing_time_us = start.elapsed().as_micros() as u64;
        packet.timestamp = Utc::now();

        debug!("Brain analysis: {}", packet.summary());
        packet
    }
}

/// Tags that appear often enough across history plus the current signal.
fn recurring_tags(history: &SignalHistory, current: &Signal) -> Vec<RiskTag> {
    let mut counts = history.summarize();
    for tag in &current.tags {
        *counts.entry(*tag).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= RECURRING_TAG_THRESHOLD)
        .map(|(tag, _)| tag)
        .collect()
}

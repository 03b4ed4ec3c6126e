//! Intent Router.
//!
//! Picks the engine (chat, football or hybrid) for a message from its football
//! intent and the session memory. Never performs I/O: fetching fixtures is the
//! caller's job once the route is not `Chat`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::memory::ConversationMemory;
use super::signals::{FootballIntent, TextSignalExtractor};

/// Matched keywords needed for full football confidence
const FULL_CONFIDENCE_KEYWORDS: f32 = 5.0;

/// Below this football confidence the route is downgraded to hybrid
const HYBRID_THRESHOLD: f32 = 0.4;

/// Confidence assigned to a follow-up of a football conversation
const FOLLOWUP_CONFIDENCE: f32 = 0.2;

/// Messages up to this length may continue a football conversation
const FOLLOWUP_MAX_CHARS: usize = 80;

/// Engine that answers the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Chat,
    Football,
    Hybrid,
}

impl Route {
    pub fn label(&self) -> &'static str {
        match self {
            Route::Chat => "chat",
            Route::Football => "football",
            Route::Hybrid => "hybrid",
        }
    }

    /// Whether fixture data should be fetched for this route
    pub fn needs_fixtures(&self) -> bool {
        !matches!(self, Route::Chat)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why a route was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    #[default]
    Default,
    FootballDetected,
    MixedIntent,
    FootballFollowup,
}

impl RouteReason {
    pub fn label(&self) -> &'static str {
        match self {
            RouteReason::Default => "default",
            RouteReason::FootballDetected => "football_detected",
            RouteReason::MixedIntent => "mixed_intent",
            RouteReason::FootballFollowup => "football_followup",
        }
    }
}

/// Routing decision for one message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePlan {
    pub route: Route,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub reason: RouteReason,
    pub matched_keywords: Vec<String>,
}

/// Stateless router
#[derive(Debug, Default, Clone, Copy)]
pub struct IntentRouter {
    extractor: TextSignalExtractor,
}

impl IntentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a message given its football intent and the turns before it.
    pub fn route(
        &self,
        message: &str,
        football: &FootballIntent,
        memory: &ConversationMemory,
    ) -> RoutePlan {
        if football.detected {
            let confidence = (football.matched_keywords.len() as f32
                / FULL_CONFIDENCE_KEYWORDS)
                .clamp(0.0, 1.0);

            let (route, reason) = if confidence < HYBRID_THRESHOLD {
                (Route::Hybrid, RouteReason::MixedIntent)
            } else {
                (Route::Football, RouteReason::FootballDetected)
            };

            return RoutePlan {
                route,
                confidence,
                reason,
                matched_keywords: football.matched_keywords.clone(),
            };
        }

        if let Some(plan) = self.followup(message, memory) {
            return plan;
        }

        RoutePlan::default()
    }

    /// A short message right after a football question keeps football context around.
    fn followup(&self, message: &str, memory: &ConversationMemory) -> Option<RoutePlan> {
        if message.trim().chars().count() > FOLLOWUP_MAX_CHARS {
            return None;
        }

        let previous = memory.last_user_turn()?;
        let previous_intent = self.extractor.football_intent(&previous.content);
        if !previous_intent.detected {
            return None;
        }

        Some(RoutePlan {
            route: Route::Hybrid,
            confidence: FOLLOWUP_CONFIDENCE,
            reason: RouteReason::FootballFollowup,
            matched_keywords: previous_intent.matched_keywords,
        })
    }
}

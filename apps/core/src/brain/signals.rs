//! Text signal extraction using regex tables.
//!
//! Fast, deterministic heuristics over the user's message: bettor risk,
//! mood, match psychology, football intent and override/escalation pressure.
//! No I/O, no failure mode - empty input yields the default signals.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Upper bound of `Signal::risk_level`.
pub const MAX_RISK_LEVEL: u8 = 5;

/// Upper bound of the escalation score.
pub const MAX_ESCALATION_SCORE: u8 = 5;

/// Escalation score from which a single message raises the risk guard.
pub const ESCALATION_GUARD_SCORE: u8 = 3;

/// Messages longer than this count as escalation pressure.
const LONG_MESSAGE_CHARS: usize = 120;

/// Risk level at which a message counts as "elevated" for escalation confirmation.
const ESCALATION_RISK_FLOOR: u8 = 2;

/// Risk category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTag {
    /// "all in", "must win", "sure win"...
    Overconfidence,
    /// "now", "today", "urgently", "faster"...
    Urgency,
    /// "lost", "recover", "revenge"...
    LossChasing,
    /// "angry", "tired", "frustrated"...
    Emotional,
}

impl RiskTag {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTag::Overconfidence => "overconfidence",
            RiskTag::Urgency => "urgency",
            RiskTag::LossChasing => "loss-chasing",
            RiskTag::Emotional => "emotional",
        }
    }
}

impl fmt::Display for RiskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Advisory derived from the clamped risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineHint {
    #[default]
    Stable,
    Moderate,
    High,
}

impl DisciplineHint {
    /// Map a risk level to its hint: >= 4 high, >= 2 moderate, else stable.
    pub fn from_risk(level: u8) -> Self {
        if level >= 4 {
            DisciplineHint::High
        } else if level >= 2 {
            DisciplineHint::Moderate
        } else {
            DisciplineHint::Stable
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            DisciplineHint::High => "High risk detected. Reduce stake size.",
            DisciplineHint::Moderate => "Moderate risk detected. Be selective.",
            DisciplineHint::Stable => "Psychology stable.",
        }
    }
}

/// Bettor risk signal for a single message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Clamped to `0..=MAX_RISK_LEVEL`
    pub risk_level: u8,
    /// Matched categories, in table order
    pub tags: Vec<RiskTag>,
    pub discipline_hint: DisciplineHint,
}

impl Signal {
    #[cfg(test)]
    pub fn has_tag(&self, tag: RiskTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Conversational mood flags, used for tone selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub emotional: bool,
    pub confident: bool,
    pub curious: bool,
    pub aggressive: bool,
}

/// Response tone for the general engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Supportive,
    Direct,
    Structured,
}

impl Tone {
    pub fn description(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral and intelligent",
            Tone::Supportive => "supportive, calm, and grounded",
            Tone::Direct => "direct and empowering",
            Tone::Structured => "clear, educational, and structured",
        }
    }
}

impl Mood {
    /// Curious wins over confident, which wins over emotional.
    pub fn tone(&self) -> Tone {
        if self.curious {
            Tone::Structured
        } else if self.confident {
            Tone::Direct
        } else if self.emotional {
            Tone::Supportive
        } else {
            Tone::Neutral
        }
    }
}

/// Psychology of the match request itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPsychology {
    pub must_win: bool,
    /// Correct/exact score or high-odds request
    pub high_risk: bool,
    pub safe_mode: bool,
}

/// Football intent with the keyword labels that matched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootballIntent {
    pub detected: bool,
    pub matched_keywords: Vec<String>,
}

/// Everything extracted from one message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSignals {
    pub signal: Signal,
    pub mood: Mood,
    pub match_psychology: MatchPsychology,
    pub football: FootballIntent,
    pub override_requested: bool,
    pub escalation_score: u8,
}

/// One row of the risk table
struct RiskRule {
    tag: RiskTag,
    weight: u8,
    pattern: Regex,
}

// NOTE: expect() is acceptable here: the patterns are literals and a bad one is a build-time bug.
static RISK_RULES: LazyLock<Vec<RiskRule>> = LazyLock::new(|| {
    vec![
        RiskRule {
            tag: RiskTag::Overconfidence,
            weight: 2,
            pattern: Regex::new(r"\ball in\b|\bmust win\b|\bsure win\b|100%|\bno error\b")
                .expect("Invalid regex: overconfidence"),
        },
        RiskRule {
            tag: RiskTag::Urgency,
            weight: 1,
            pattern: Regex::new(r"\b(now|today|urgent(ly)?|fast(er)?|quick(ly|er)?)\b")
                .expect("Invalid regex: urgency"),
        },
        RiskRule {
            tag: RiskTag::LossChasing,
            weight: 3,
            pattern: Regex::new(r"\b(lost|loss(es)?|recover(y|ing|ed)?|chas(e|ed|ing)|revenge)\b")
                .expect("Invalid regex: loss-chasing"),
        },
        RiskRule {
            tag: RiskTag::Emotional,
            weight: 2,
            pattern: Regex::new(r"\b(angry|mad|tired|frustrated)\b")
                .expect("Invalid regex: emotional"),
        },
    ]
});

static EMOTIONAL_MOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(sad|tired|lonely|depressed|angry|frustrated|hurt)\b")
        .expect("Invalid regex: emotional mood")
});
static CONFIDENT_MOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(sure|ready|confident|certain|focused)\b").expect("Invalid regex: confident mood")
});
static CURIOUS_MOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(why|how|explain|what is|how does)\b").expect("Invalid regex: curious mood")
});
static AGGRESSIVE_MOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(stupid|hate|annoying|trash|nonsense)\b")
        .expect("Invalid regex: aggressive mood")
});

static MUST_WIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(must win|do or die|final|relegation|qualification)\b")
        .expect("Invalid regex: must win")
});
static HIGH_RISK_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(correct score|exact score|high odds)\b").expect("Invalid regex: high risk")
});
static SAFE_MODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(safe|low risk|sure|banker)\b").expect("Invalid regex: safe mode")
});

/// Football keyword table: (label, pattern). Order is the order of `matched_keywords`.
static FOOTBALL_KEYWORDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("fixture", r"\bfixtures?\b"),
        ("match", r"\bmatch(es)?\b"),
        ("odds", r"\bodds\b"),
        ("bet", r"\bbet(s|ting)?\b"),
        ("prediction", r"\bpredict(ion|ions)?\b"),
        ("correct score", r"\bcorrect scores?\b"),
        ("score", r"\bscores?\b"),
        ("vs", r"\b(vs|versus)\b"),
        ("kickoff", r"\bkick-?off\b"),
        ("football", r"\b(football|soccer)\b"),
        ("premier league", r"\bpremier league\b|\bepl\b"),
        ("champions league", r"\bchampions league\b|\bucl\b"),
        ("europa league", r"\beuropa league\b"),
        ("la liga", r"\bla liga\b"),
        ("serie a", r"\bserie a\b"),
        ("bundesliga", r"\bbundesliga\b"),
        ("ligue 1", r"\bligue 1\b"),
    ]
    .into_iter()
    .map(|(label, pattern)| {
        (
            label,
            Regex::new(pattern).expect("Invalid regex: football keyword"),
        )
    })
    .collect()
});

/// Phrases that try to push past the advisor's limits.
const OVERRIDE_PHRASES: &[&str] = &[
    "override",
    "god mode",
    "no limit",
    "proceed anyway",
    "i accept the risk",
    "ignore the rules",
    "ignore your rules",
    "bypass",
];

static CAPS_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{3,}").expect("Invalid regex: caps run"));
static REPEATED_BANG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!{2,}").expect("Invalid regex: repeated exclamation"));

/// Escalation is confirmed only when the elevated risk repeats.
pub fn confirm_escalation(previous_level: u8, current_level: u8) -> bool {
    previous_level >= ESCALATION_RISK_FLOOR && current_level >= ESCALATION_RISK_FLOOR
}

/// Heuristic extractor for all text signals
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSignalExtractor;

impl TextSignalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every detector over the text. The input is lower-cased once.
    pub fn extract(&self, text: &str) -> TextSignals {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return TextSignals::default();
        }

        let lower = trimmed.to_lowercase();
        let override_requested = detect_override(&lower);

        TextSignals {
            signal: risk_signal(&lower),
            mood: mood(&lower),
            match_psychology: match_psychology(&lower),
            football: football_intent(&lower),
            override_requested,
            escalation_score: escalation_score(trimmed, override_requested),
        }
    }

    /// Risk signal only
    #[cfg(test)]
    pub fn signal(&self, text: &str) -> Signal {
        self.extract(text).signal
    }

    /// Football intent only
    pub fn football_intent(&self, text: &str) -> FootballIntent {
        football_intent(&text.to_lowercase())
    }
}

fn risk_signal(lower: &str) -> Signal {
    let mut raw: u32 = 0;
    let mut tags = Vec::new();

    for rule in RISK_RULES.iter() {
        if rule.pattern.is_match(lower) {
            raw += u32::from(rule.weight);
            tags.push(rule.tag);
        }
    }

    // All contributions are summed before clamping.
    let risk_level = raw.min(u32::from(MAX_RISK_LEVEL)) as u8;

    Signal {
        risk_level,
        tags,
        discipline_hint: DisciplineHint::from_risk(risk_level),
    }
}

fn mood(lower: &str) -> Mood {
    Mood {
        emotional: EMOTIONAL_MOOD.is_match(lower),
        confident: CONFIDENT_MOOD.is_match(lower),
        curious: CURIOUS_MOOD.is_match(lower),
        aggressive: AGGRESSIVE_MOOD.is_match(lower),
    }
}

fn match_psychology(lower: &str) -> MatchPsychology {
    MatchPsychology {
        must_win: MUST_WIN.is_match(lower),
        high_risk: HIGH_RISK_REQUEST.is_match(lower),
        safe_mode: SAFE_MODE.is_match(lower),
    }
}

fn football_intent(lower: &str) -> FootballIntent {
    let matched_keywords: Vec<String> = FOOTBALL_KEYWORDS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(lower))
        .map(|(label, _)| label.to_string())
        .collect();

    FootballIntent {
        detected: !matched_keywords.is_empty(),
        matched_keywords,
    }
}

fn detect_override(lower: &str) -> bool {
    OVERRIDE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Scored on the original casing so ALL-CAPS runs are visible.
fn escalation_score(text: &str, override_requested: bool) -> u8 {
    let mut score: u8 = 0;

    if override_requested {
        score += 2;
    }
    if text.chars().count() > LONG_MESSAGE_CHARS {
        score += 1;
    }
    if CAPS_RUN.is_match(text) {
        score += 1;
    }
    if REPEATED_BANG.is_match(text) {
        score += 1;
    }

    score.min(MAX_ESCALATION_SCORE)
}

//! Football fixtures from API-Football (v3).
//!
//! Auth: `x-apisports-key` header. Endpoint: `GET /fixtures?date=YYYY-MM-DD`.
//! Every failure is folded into `FixtureFeed` so a fixture problem never fails a chat request.

use crate::actors::traits::FixtureProvider;
use crate::brain::prompt::FixtureSummary;
use crate::config::FixturesConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Matches listed per date in a summary
const MAX_FIXTURES_PER_DAY: usize = 25;

/// One scheduled match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
    pub league: String,
    pub kickoff: Option<DateTime<Utc>>,
}

/// Outcome of one fixtures lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureFeed {
    Matches(Vec<Fixture>),
    /// No API key configured
    Unconfigured,
    /// Provider unreachable or answered with an error
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    errors: serde_json::Value,
    #[serde(default)]
    response: Vec<ApiFixture>,
}

#[derive(Deserialize)]
struct ApiFixture {
    fixture: ApiFixtureInfo,
    league: ApiLeague,
    teams: ApiTeams,
}

#[derive(Deserialize)]
struct ApiFixtureInfo {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
struct ApiLeague {
    name: String,
}

#[derive(Deserialize)]
struct ApiTeams {
    home: ApiTeam,
    away: ApiTeam,
}

#[derive(Deserialize)]
struct ApiTeam {
    name: String,
}

impl From<ApiFixture> for Fixture {
    fn from(api: ApiFixture) -> Self {
        Fixture {
            home: api.teams.home.name,
            away: api.teams.away.name,
            league: api.league.name,
            kickoff: api
                .fixture
                .date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

/// API-Football reports request problems in `errors` with a 200 status.
fn has_api_errors(errors: &serde_json::Value) -> bool {
    match errors {
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Null => false,
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct ApiFootballProvider {
    http: Client,
    config: FixturesConfig,
}

impl ApiFootballProvider {
    pub fn new(config: FixturesConfig) -> Self {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("neurogen/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/fixtures", self.config.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl FixtureProvider for ApiFootballProvider {
    async fn fetch_fixtures(&self, date: NaiveDate) -> FixtureFeed {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return FixtureFeed::Unconfigured;
        };

        let day = date.format("%Y-%m-%d").to_string();
        let res = match self
            .http
            .get(self.endpoint())
            .header("x-apisports-key", api_key)
            .query(&[("date", day.as_str())])
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("Fixtures request for {} failed: {}", day, e);
                return FixtureFeed::Unavailable(e.to_string());
            }
        };

        let status = res.status();
        if !status.is_success() {
            warn!("Fixtures request for {} returned {}", day, status);
            return FixtureFeed::Unavailable(format!("status {}", status));
        }

        let body: ApiResponse = match res.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Malformed fixtures response for {}: {}", day, e);
                return FixtureFeed::Unavailable(e.to_string());
            }
        };

        if has_api_errors(&body.errors) {
            warn!("Fixtures API reported errors for {}: {}", day, body.errors);
            return FixtureFeed::Unavailable(body.errors.to_string());
        }

        let mut fixtures: Vec<Fixture> = body.response.into_iter().map(Fixture::from).collect();
        fixtures.sort_by(|a, b| a.kickoff.cmp(&b.kickoff));
        debug!("Fetched {} fixtures for {}", fixtures.len(), day);
        FixtureFeed::Matches(fixtures)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

fn fixture_line(fixture: &Fixture) -> String {
    match fixture.kickoff {
        Some(kickoff) => format!(
            "- {} UTC: {} vs {} ({})",
            kickoff.format("%H:%M"),
            fixture.home,
            fixture.away,
            fixture.league
        ),
        None => format!("- {} vs {} ({})", fixture.home, fixture.away, fixture.league),
    }
}

/// Render per-date feeds as the prompt's fixture block.
///
/// The summary counts as available when at least one date returned a match list,
/// even an empty one.
pub fn summarize_feeds(feeds: &[(NaiveDate, FixtureFeed)]) -> FixtureSummary {
    let mut blocks = Vec::with_capacity(feeds.len());
    let mut available = false;

    for (date, feed) in feeds {
        let header = format!("Fixtures for {}:", date.format("%a, %d %b %Y"));
        let body = match feed {
            FixtureFeed::Matches(fixtures) if fixtures.is_empty() => {
                available = true;
                "No fixtures scheduled.".to_string()
            }
            FixtureFeed::Matches(fixtures) => {
                available = true;
                let mut lines: Vec<String> = fixtures
                    .iter()
                    .take(MAX_FIXTURES_PER_DAY)
                    .map(fixture_line)
                    .collect();
                if fixtures.len() > MAX_FIXTURES_PER_DAY {
                    lines.push(format!("- ...and {} more", fixtures.len() - MAX_FIXTURES_PER_DAY));
                }
                lines.join("\n")
            }
            FixtureFeed::Unconfigured => "Fixtures data not configured.".to_string(),
            FixtureFeed::Unavailable(_) => "Fixtures data unavailable.".to_string(),
        };
        blocks.push(format!("{}\n{}", header, body));
    }

    FixtureSummary::new(blocks.join("\n\n"), available)
}

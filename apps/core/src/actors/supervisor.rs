use crate::actors::fixtures::{summarize_feeds, ApiFootballProvider};
use crate::actors::llm::OpenAiClient;
use crate::actors::messages::{AppError, ChatReply, CompletionRequest, SupervisorMessage};
use crate::actors::traits::{CompletionClient, FixtureProvider};
use crate::brain::memory::Turn;
use crate::brain::prompt::{FixtureSummary, ServerTime};
use crate::brain::{BrainAnalyzer, PromptComposer};
use crate::config::AppConfig;
use crate::sessions::SessionStore;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, instrument, warn};

/// Reply used when the completion provider fails or misses its deadline.
pub const FALLBACK_REPLY: &str = "I could not generate a response right now. Please try again in a moment.";

/// Extra time a caller waits beyond the session wait and the completion deadline.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

/// Tunables of the supervisor
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub completion_timeout: Duration,
    pub memory_capacity: usize,
    pub session_capacity: usize,
}

impl From<&AppConfig> for SupervisorOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            completion_timeout: config.completion.timeout,
            memory_capacity: config.memory_capacity,
            session_capacity: config.session_capacity,
        }
    }
}

/// A handle to the `SupervisorActor`.
///
/// This is the primary entry point for all business logic in the application. It owns the
/// session store and orchestrates the brain, the fixture provider and the completion client.
#[derive(Clone)]
pub struct SupervisorHandle {
    sender: mpsc::Sender<SupervisorMessage>,
    request_timeout: Duration,
}

impl SupervisorHandle {
    /// Creates the production supervisor: OpenAI completions and API-Football fixtures.
    pub fn new(config: &AppConfig) -> Self {
        Self::new_with_collaborators(
            Arc::new(OpenAiClient::new(config.completion.clone())),
            Arc::new(ApiFootballProvider::new(config.fixtures.clone())),
            SupervisorOptions::from(config),
        )
    }

    /// Creates a supervisor over arbitrary collaborators and returns a handle to it.
    ///
    /// This is the main constructor that spawns the actor loop.
    pub fn new_with_collaborators(
        completion: Arc<dyn CompletionClient>,
        fixtures: Arc<dyn FixtureProvider>,
        options: SupervisorOptions,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(64);
        // Session wait and completion are each bounded by the completion deadline.
        let request_timeout = options.completion_timeout * 2 + REQUEST_TIMEOUT_MARGIN;
        let runner = SupervisorRunner {
            receiver,
            pipeline: Arc::new(ChatPipeline {
                completion,
                fixtures,
                sessions: SessionStore::new(options.session_capacity, options.memory_capacity),
                analyzer: BrainAnalyzer::new(),
                composer: PromptComposer::new(),
                completion_timeout: options.completion_timeout,
            }),
        };
        tokio::spawn(async move { runner.run().await });
        Self {
            sender,
            request_timeout,
        }
    }

    /// Processes a user message.
    ///
    /// 1. Resolves (or creates) the session and locks it for the whole request.
    /// 2. Analyzes the message and routes it.
    /// 3. Fetches today's and tomorrow's fixtures when the route needs them.
    /// 4. Composes the system prompt and calls the completion client under a deadline.
    /// 5. Records the exchange in the session on success.
    ///
    /// Upstream failures, a busy session and a missed request deadline produce
    /// `FALLBACK_REPLY`, not an error. An abandoned request is cancelled before it
    /// can touch the session.
    #[instrument(skip(self, content, memory))]
    pub async fn process_message(
        &self,
        session_id: Option<String>,
        content: String,
        memory: Option<Vec<Turn>>,
    ) -> Result<ChatReply, AppError> {
        let session_id = SessionStore::resolve_id(session_id);
        let (send, recv) = oneshot::channel();
        let msg = SupervisorMessage::ProcessUserMessage {
            session_id: Some(session_id.clone()),
            content,
            memory,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        match timeout(self.request_timeout, recv).await {
            Ok(result) => result.map_err(|e| AppError::Actor(e.to_string()))?,
            Err(_) => {
                warn!(
                    session_id = %session_id,
                    "Request exceeded {:?}, using fallback reply", self.request_timeout
                );
                Ok(fallback_reply(session_id))
            }
        }
    }

    /// Stops the actor loop. Requests already in flight still complete.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(SupervisorMessage::Shutdown)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }
}

// --- Actor Runner ---
struct SupervisorRunner {
    receiver: mpsc::Receiver<SupervisorMessage>,
    pipeline: Arc<ChatPipeline>,
}

impl SupervisorRunner {
    async fn run(mut self) {
        info!("Supervisor started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SupervisorMessage::ProcessUserMessage {
                    session_id,
                    content,
                    memory,
                    mut responder,
                } => {
                    // One task per request; the session lock orders requests of one session.
                    let pipeline = Arc::clone(&self.pipeline);
                    tokio::spawn(async move {
                        // Dropping the pipeline future releases the session untouched.
                        let outcome = tokio::select! {
                            result = pipeline.handle_user_message(session_id, content, memory) => Some(result),
                            _ = responder.closed() => None,
                        };
                        match outcome {
                            Some(result) => {
                                if let Err(e) = &result {
                                    error!("Error processing user message: {:?}", e);
                                }
                                let _ = responder.send(result);
                            }
                            None => warn!("Caller gone, request abandoned"),
                        }
                    });
                }
                SupervisorMessage::Shutdown => {
                    info!("Supervisor shutting down...");
                    break;
                }
            }
        }
        info!("Supervisor stopped");
    }
}

fn fallback_reply(session_id: String) -> ChatReply {
    ChatReply {
        reply: FALLBACK_REPLY.to_string(),
        session_id,
        fallback: true,
    }
}

struct ChatPipeline {
    completion: Arc<dyn CompletionClient>,
    fixtures: Arc<dyn FixtureProvider>,
    sessions: SessionStore,
    analyzer: BrainAnalyzer,
    composer: PromptComposer,
    completion_timeout: Duration,
}

impl ChatPipeline {
    #[instrument(skip(self, content, memory))]
    async fn handle_user_message(
        &self,
        session_id: Option<String>,
        content: String,
        memory: Option<Vec<Turn>>,
    ) -> Result<ChatReply, AppError> {
        let message = content.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message is empty".to_string()));
        }

        let (session_id, session) = self.sessions.get_or_create(session_id);
        let mut session = match timeout(self.completion_timeout, session.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    session_id = %session_id,
                    "Session busy for {:?}, using fallback reply", self.completion_timeout
                );
                return Ok(fallback_reply(session_id));
            }
        };
        debug!(
            session_id = %session.id,
            created_at = %session.created_at,
            last_seen = %session.last_seen,
            "Session resumed"
        );
        session.touch();

        if let Some(turns) = memory {
            session.memory.replace(turns);
        }

        // --- Analysis & Routing ---
        let packet = self
            .analyzer
            .analyze(message, &session.memory, &session.signal_history);
        info!(session_id = %session_id, "{}", packet.summary());

        // --- Fixtures ---
        let now = ServerTime::now();
        let fixtures = if packet.route.route.needs_fixtures() {
            Some(self.fetch_fixtures(&now).await)
        } else {
            None
        };

        // --- Generation ---
        let prompt = self.composer.compose(&packet, &now, fixtures.as_ref());
        let request = CompletionRequest {
            system_prompt: prompt.system_prompt,
            history: session.memory.turns(),
            user_message: message.to_string(),
            temperature: prompt.temperature,
        };

        let (reply, fallback) =
            match timeout(self.completion_timeout, self.completion.complete(request)).await {
                Ok(Ok(reply)) => (reply, false),
                Ok(Err(e)) if e.is_upstream() => {
                    warn!("Completion failed, using fallback reply: {}", e);
                    (FALLBACK_REPLY.to_string(), true)
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(
                        "Completion exceeded {:?}, using fallback reply",
                        self.completion_timeout
                    );
                    (FALLBACK_REPLY.to_string(), true)
                }
            };

        // A fallback is not part of the conversation.
        if !fallback {
            session.memory.append_exchange(message, reply.clone());
            session.signal_history.record(packet.signal);
        }

        Ok(ChatReply {
            reply,
            session_id,
            fallback,
        })
    }

    async fn fetch_fixtures(&self, now: &ServerTime) -> FixtureSummary {
        let dates = now.fixture_dates();
        let feeds = join_all(dates.iter().map(|date| self.fixtures.fetch_fixtures(*date))).await;
        summarize_feeds(&dates.into_iter().zip(feeds).collect::<Vec<_>>())
    }
}

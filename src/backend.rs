//! Load, verification and statistics collaborators.
//!
//! The engine never talks to the network. A [`PuzzleBackend`] fetches the
//! payload, grades guesses and serves statistics; [`HttpBackend`] speaks the
//! puzzle server's JSON API.

use crate::puzzle::{Feedback, GameStatus, Guess, LoadError, PuzzleData, Tier, NOT_SUBMITTED};
use crate::stats::{Statistics, StatsSubject};
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Message shown when a request fails without a server explanation.
pub const GENERIC_FAILURE: &str = "Looks like something went wrong...";

/// Collaborator contract consumed by [`crate::PuzzleSession`].
#[async_trait]
pub trait PuzzleBackend: Send + Sync {
    /// Fetches the puzzle (and any stored progress) for the current player.
    async fn load_puzzle(&self) -> Result<PuzzleData, BackendError>;

    /// Sends a guess for grading.
    async fn submit_guess(&self, guess: &Guess) -> Result<Feedback, BackendError>;

    /// Fetches statistics for a subject.
    async fn statistics(&self, subject: StatsSubject) -> Result<Statistics, BackendError>;
}

/// Collaborator failure: transport error, rejection, or unreadable body.
#[derive(Debug, Clone, Display, Error)]
#[display("Backend error: {} at {}:{}", message, file, line)]
pub struct BackendError {
    /// Message suitable for the player.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BackendError {
    /// Creates a new backend error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        warn!(error = %err, "HTTP request failed");
        Self::new(GENERIC_FAILURE)
    }
}

impl From<LoadError> for BackendError {
    #[track_caller]
    fn from(err: LoadError) -> Self {
        Self::new(err.message)
    }
}

// ─────────────────────────────────────────────────────────────
//  Wire formats
// ─────────────────────────────────────────────────────────────

/// Load response. Array fields arrive as JSON-encoded strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    letters: String,
    #[serde(default, rename = "uniqueletters")]
    unique_letters: String,
    #[serde(default)]
    guess_count: u32,
    #[serde(default)]
    status: u8,
    #[serde(default)]
    gpositions: String,
    #[serde(default)]
    lpositions: String,
}

/// Reply that carries nothing but success, such as a player switch.
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl AckResponse {
    fn into_result(self) -> Result<(), BackendError> {
        if self.success {
            Ok(())
        } else {
            Err(BackendError::new(
                self.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ))
        }
    }
}

/// A stored letter placement: a letter, or `0` for an empty position.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StoredLetter {
    Letter(String),
    Empty(#[allow(dead_code)] i64),
}

impl TryFrom<LoadResponse> for PuzzleData {
    type Error = LoadError;

    fn try_from(response: LoadResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(LoadError::new(
                response.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ));
        }

        let letters: Vec<String> = decode(&response.letters, "letters")?;
        let letters = letters
            .iter()
            .map(|s| {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c.to_ascii_uppercase()),
                    _ => Err(LoadError::new(format!("Invalid tile letter '{}'", s))),
                }
            })
            .collect::<Result<Vec<char>, _>>()?;
        let groups: Vec<usize> = decode(&response.unique_letters, "uniqueletters")?;
        let history: Vec<Vec<Tier>> = if response.gpositions.is_empty() {
            Vec::new()
        } else {
            decode(&response.gpositions, "gpositions")?
        };
        let placements: Vec<StoredLetter> = if response.lpositions.is_empty() {
            Vec::new()
        } else {
            decode(&response.lpositions, "lpositions")?
        };
        let placements = placements
            .into_iter()
            .map(|stored| match stored {
                StoredLetter::Letter(s) => s.chars().next().map(|c| c.to_ascii_uppercase()),
                StoredLetter::Empty(_) => None,
            })
            .collect();
        let status = GameStatus::from_code(response.status)
            .ok_or_else(|| LoadError::new(format!("Unknown status code {}", response.status)))?;

        Ok(PuzzleData::new(letters, groups)
            .with_history(history)
            .with_placements(placements)
            .with_turns_used(response.guess_count)
            .with_status(status))
    }
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str, field: &str) -> Result<T, LoadError> {
    serde_json::from_str(raw).map_err(|e| LoadError::new(format!("Failed to parse {}: {}", field, e)))
}

/// Verification response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    status: Option<u8>,
}

/// Per-word grading: tier array or the "None" placeholder.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WordGrade {
    Tiers(Vec<u8>),
    Skipped(String),
}

impl TryFrom<SubmitResponse> for Feedback {
    type Error = BackendError;

    fn try_from(response: SubmitResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(BackendError::new(
                response.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ));
        }

        let raw = response
            .response
            .ok_or_else(|| BackendError::new("Verification response carried no grading"))?;
        let grades: Vec<WordGrade> = serde_json::from_str(&raw)
            .map_err(|e| BackendError::new(format!("Failed to parse grading: {}", e)))?;
        if grades.len() != crate::puzzle::WORD_COUNT {
            return Err(BackendError::new(format!(
                "Expected {} graded words, got {}",
                crate::puzzle::WORD_COUNT,
                grades.len()
            )));
        }

        let mut words: [Option<Vec<u8>>; crate::puzzle::WORD_COUNT] = Default::default();
        for (slot, grade) in words.iter_mut().zip(grades) {
            match grade {
                WordGrade::Tiers(tiers) => *slot = Some(tiers),
                WordGrade::Skipped(s) if s == NOT_SUBMITTED => {}
                WordGrade::Skipped(s) => {
                    return Err(BackendError::new(format!("Unexpected grade '{}'", s)));
                }
            }
        }

        let mut feedback = Feedback::from_raw(words).map_err(BackendError::new)?;
        if let Some(code) = response.status {
            let status = GameStatus::from_code(code)
                .ok_or_else(|| BackendError::new(format!("Unknown status code {}", code)))?;
            feedback = feedback.with_status(status);
        }
        Ok(feedback)
    }
}

/// Statistics response. `userGuesses` is a JSON-encoded string.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "userGuesses")]
    user_guesses: String,
    #[serde(default, rename = "totalGuesses")]
    total_guesses: u32,
    #[serde(default, rename = "userwinrate")]
    user_win_rate: u32,
    #[serde(default, rename = "winrate")]
    win_rate: u32,
    #[serde(default, rename = "averageGuesses")]
    average_guesses: u32,
}

impl TryFrom<StatsResponse> for Statistics {
    type Error = BackendError;

    fn try_from(response: StatsResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(BackendError::new(
                response.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ));
        }
        let distribution: Vec<u32> = serde_json::from_str(&response.user_guesses)
            .map_err(|e| BackendError::new(format!("Failed to parse userGuesses: {}", e)))?;
        Ok(Statistics::new(
            distribution,
            response.total_guesses,
            response.user_win_rate,
            response.win_rate,
            response.average_guesses,
        ))
    }
}

// ─────────────────────────────────────────────────────────────
//  HTTP implementation
// ─────────────────────────────────────────────────────────────

/// Puzzle server client over HTTP.
///
/// The server keys the player's game on a session cookie, so one client
/// (with its cookie store) must be used for the whole session. The cookie is
/// issued by the index page, which is visited once before the first load.
/// Clones share the cookie store and the started session.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    user_id: Option<String>,
    client: reqwest::Client,
    session: Arc<OnceCell<()>>,
}

impl HttpBackend {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the HTTP client cannot be built.
    #[instrument(skip(user_id))]
    pub fn new(base_url: &str, user_id: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
            client,
            session: Arc::new(OnceCell::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Obtains the session cookie and binds the configured player to it.
    ///
    /// Runs once per client; a failed attempt is retried on the next load.
    #[instrument(skip(self))]
    async fn start_session(&self) -> Result<(), BackendError> {
        self.session
            .get_or_try_init(|| async {
                info!("Starting server session");
                self.client
                    .get(format!("{}/", self.base_url))
                    .send()
                    .await?
                    .error_for_status()?;

                if let Some(user_id) = &self.user_id {
                    info!(%user_id, "Switching player");
                    let ack: AckResponse = self
                        .client
                        .put(self.url("load/changeuser"))
                        .json(user_id)
                        .send()
                        .await?
                        .json()
                        .await?;
                    ack.into_result()?;
                }
                Ok::<(), BackendError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PuzzleBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn load_puzzle(&self) -> Result<PuzzleData, BackendError> {
        self.start_session().await?;
        info!("Loading puzzle");
        let response: LoadResponse = self
            .client
            .put(self.url("load/game"))
            .header("Content-Type", "application/json")
            .send()
            .await?
            .json()
            .await?;
        debug!(guess_count = response.guess_count, status = response.status, "Got load response");
        Ok(PuzzleData::try_from(response)?)
    }

    #[instrument(skip(self), fields(guess = ?guess.to_wire()))]
    async fn submit_guess(&self, guess: &Guess) -> Result<Feedback, BackendError> {
        info!("Submitting guess");
        let response = self.client.post(self.url("game/guess")).json(guess).send().await?;
        let status = response.status();
        let body: SubmitResponse = response.json().await?;
        debug!(%status, success = body.success, "Got verification response");
        Feedback::try_from(body)
    }

    #[instrument(skip(self))]
    async fn statistics(&self, subject: StatsSubject) -> Result<Statistics, BackendError> {
        debug!("Fetching statistics");
        let user_id = self.user_id.clone().unwrap_or_default();
        let url = reqwest::Url::parse_with_params(
            &self.url("stats/game"),
            &[("userid", user_id), ("type", subject.to_string())],
        )
        .map_err(|e| BackendError::new(format!("Invalid statistics URL: {}", e)))?;
        let response: StatsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .json()
            .await?;
        Statistics::try_from(response)
    }
}

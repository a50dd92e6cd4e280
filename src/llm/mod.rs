//! # LLM Module
//!
//! The automated player: renders the board as text, asks a chat-completion
//! endpoint for the next move, and parses the reply back into a
//! [`Direction`].
//!
//! The wire protocol is deliberately thin: a system prompt carrying a
//! textual board rendering, and a reply consisting of a single direction
//! digit (0 = up, 1 = right, 2 = down, 3 = left). Everything about it is
//! confined to this module and replaceable.
//!
//! Some strategies to try:
//!   * Render the state of the game as a JSON object instead of a table.
//!   * Show the result of the four possible moves.
//!   * Have the model respond with both the move and a justification.
//!   * Provide the board and chosen move for the last few moves.

use crate::game::{Direction, GameSnapshot, MoveSource};
use crate::input::{InputEvent, InputListener};
use crate::{Llm2048Error, Llm2048Result};
use serde::{Deserialize, Serialize};
use std::pin::pin;
use std::time::Duration;

// Per-token prices in USD for GPT-4o.
const INPUT_TOKEN_COST_USD: f64 = 5.0 / 1e6;
const OUTPUT_TOKEN_COST_USD: f64 = 15.0 / 1e6;

// Breather between automated moves so the board is watchable.
const MOVE_PACING: Duration = Duration::from_millis(100);

const SYSTEM_PROMPT: &str = "You are an AI assistant that plays the game 2048. The goal of this \
    game is to combine the numeric tiles in a {size}x{size} grid to create a tile with the value \
    2048. Your output should consist of one of the following values: 0 (up), 1 (right), 2 (down), \
    or 3 (left). You should ONLY output a single number (0, 1, 2, or 3) to indicate the direction \
    in which to move, with no other text or explanation for your move.";

/// Configuration for the automated player.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat-completion endpoint URL
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Bearer token for the endpoint
    pub api_key: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token cap; a direction digit needs very few
    pub max_tokens: u32,
    /// Attempts per move before giving up
    pub max_retries: u32,
}

impl LlmConfig {
    /// Creates a configuration with default sampling parameters.
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        Self {
            endpoint,
            model,
            api_key,
            temperature: 0.7,
            max_tokens: 16,
            max_retries: 3,
        }
    }
}

/// Accumulated token usage and estimated spend for one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageTracker {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl UsageTracker {
    /// Adds one response's usage to the running totals.
    pub fn record(&mut self, usage: &Usage) {
        self.input_tokens += usage.prompt_tokens;
        self.output_tokens += usage.completion_tokens;
    }

    /// Estimated cost in USD at the fixed per-token rates.
    pub fn cost_usd(&self) -> f64 {
        self.input_tokens as f64 * INPUT_TOKEN_COST_USD
            + self.output_tokens as f64 * OUTPUT_TOKEN_COST_USD
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Token counts reported by the endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Renders the board as a fixed-width text table for the prompt.
pub fn board_text(snapshot: &GameSnapshot) -> String {
    let separator = format!("    +{}+", "-".repeat(snapshot.size as usize * 8));
    let mut out = String::from("\n");
    out.push_str(&separator);
    for y in 0..snapshot.size {
        let cells: Vec<String> = (0..snapshot.size)
            .map(|x| {
                let value = snapshot
                    .value_at(x, y)
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                format!("{value:>6}")
            })
            .collect();
        out.push('\n');
        out.push_str(&format!("    |{}  |", cells.join(" |")));
        out.push('\n');
        out.push_str(&separator);
    }
    out
}

/// Extracts a direction from a model reply.
///
/// Accepts a bare digit or a digit embedded in prose; rejects anything
/// without a digit in `0..=3`.
pub fn parse_direction(content: &str) -> Option<Direction> {
    content
        .chars()
        .find(char::is_ascii_digit)
        .and_then(|digit| Direction::from_index(digit as u8 - b'0'))
}

fn build_system_prompt(snapshot: &GameSnapshot) -> String {
    let instructions = SYSTEM_PROMPT.replace("{size}", &snapshot.size.to_string());
    format!(
        "{instructions}\n\nThe current state of the game board is:\n{}\n",
        board_text(snapshot)
    )
}

/// Asks a chat-completion endpoint for moves.
pub struct LlmPlayer {
    client: reqwest::Client,
    config: LlmConfig,
    usage: UsageTracker,
}

impl LlmPlayer {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            usage: UsageTracker::default(),
        }
    }

    /// Session-wide token usage so far.
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Proposes the next move for `snapshot`.
    ///
    /// Malformed replies and transport errors are retried up to the
    /// configured attempt limit; the engine never sees an invalid
    /// direction.
    pub async fn propose_move(&mut self, snapshot: &GameSnapshot) -> Llm2048Result<Direction> {
        for attempt in 1..=self.config.max_retries {
            match self.request_completion(snapshot).await {
                Ok(content) => {
                    if let Some(direction) = parse_direction(&content) {
                        log::debug!(
                            "model proposed {direction:?} ({} in / {} out, est. ${:.4})",
                            self.usage.input_tokens,
                            self.usage.output_tokens,
                            self.usage.cost_usd()
                        );
                        return Ok(direction);
                    }
                    log::warn!("attempt {attempt}: unusable completion {content:?}");
                }
                Err(error) => {
                    log::warn!("attempt {attempt}: completion request failed: {error}");
                }
            }
        }
        Err(Llm2048Error::Llm(format!(
            "no usable direction after {} attempts",
            self.config.max_retries
        )))
    }

    async fn request_completion(&mut self, snapshot: &GameSnapshot) -> Llm2048Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: build_system_prompt(snapshot),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "What should my next move be?".to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        if let Some(usage) = &response.usage {
            self.usage.record(usage);
        }
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Llm2048Error::Llm("completion carried no content".to_string()))?;
        Ok(content)
    }
}

/// Adapts the LLM player to the [`MoveSource`] contract.
///
/// While a completion is in flight the keyboard channel is still serviced,
/// so a quit request takes effect immediately; manual move keys are ignored
/// during autoplay.
pub struct LlmSource {
    player: LlmPlayer,
    listener: InputListener,
}

impl LlmSource {
    pub fn new(player: LlmPlayer, listener: InputListener) -> Self {
        Self { player, listener }
    }

    /// Session-wide token usage so far.
    pub fn usage(&self) -> &UsageTracker {
        self.player.usage()
    }
}

impl MoveSource for LlmSource {
    async fn next_move(&mut self, snapshot: &GameSnapshot) -> Llm2048Result<Option<Direction>> {
        tokio::time::sleep(MOVE_PACING).await;
        let mut proposal = pin!(self.player.propose_move(snapshot));
        loop {
            tokio::select! {
                event = self.listener.next() => match event {
                    Some(InputEvent::Quit) | None => return Ok(None),
                    Some(InputEvent::Move(_)) => {}
                },
                direction = &mut proposal => return direction.map(Some),
            }
        }
    }
}

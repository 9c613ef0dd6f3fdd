//! Action catalogue
//!
//! Every action an agent can attempt in a turn, with its energy cost and the
//! parsing rules that turn a raw provider decision into a typed action.
//!
//! # Critical Invariants
//!
//! 1. Costs are fixed per action kind, never per outcome
//! 2. Parsing never panics on malformed provider output; unparseable
//!    decisions surface as errors and the turn retries once
//! 3. A proposed tax rate above 1.0 is read as a percentage and divided
//!    by 100 before clamping

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::Decision;

/// Gross energy credited for a trade before tax
pub const TRADE_GROSS_REWARD: i64 = 4;
/// Epochs an announcement stays on the board
pub const ANNOUNCEMENT_LIFETIME: usize = 2;
/// Energy earned back by speaking in a restricted space
pub const RESTRICTED_SPEAK_REWARD: i64 = 1;
/// Default energy granted when a subsidy names no amount
pub const DEFAULT_SUBSIDY_AMOUNT: f64 = 10.0;

/// Typed action with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Speak { content: String },
    Trade,
    Support { target: String },
    Whisper { target: String, content: String },
    Move { destination: String },
    Idle,
    PostAnnouncement { content: String },
    AdjustTax { rate: f64 },
    GrantSubsidy { target: String, amount: f64 },
}

/// Action discriminant, for cost tables and log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Speak,
    Trade,
    Support,
    Whisper,
    Move,
    Idle,
    PostAnnouncement,
    AdjustTax,
    GrantSubsidy,
}

/// Errors from decision parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("action {0} requires a target")]
    MissingTarget(String),

    #[error("action {0} requires content")]
    MissingContent(String),

    #[error("action {action} has malformed numeric field: {raw}")]
    BadNumber { action: String, raw: String },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Speak { .. } => ActionKind::Speak,
            Action::Trade => ActionKind::Trade,
            Action::Support { .. } => ActionKind::Support,
            Action::Whisper { .. } => ActionKind::Whisper,
            Action::Move { .. } => ActionKind::Move,
            Action::Idle => ActionKind::Idle,
            Action::PostAnnouncement { .. } => ActionKind::PostAnnouncement,
            Action::AdjustTax { .. } => ActionKind::AdjustTax,
            Action::GrantSubsidy { .. } => ActionKind::GrantSubsidy,
        }
    }

    /// Energy cost charged when the action resolves
    pub fn energy_cost(&self) -> i64 {
        self.kind().energy_cost()
    }

    /// Whether the action requires architect privileges
    pub fn is_privileged(&self) -> bool {
        matches!(
            self.kind(),
            ActionKind::PostAnnouncement | ActionKind::AdjustTax | ActionKind::GrantSubsidy
        )
    }

    /// Build a typed action from a raw provider decision.
    ///
    /// Field conventions: `target` carries the counterparty or destination,
    /// `content` carries free text, numeric payloads, or both.
    pub fn from_decision(decision: &Decision) -> Result<Action, ActionParseError> {
        let name = decision.action.trim().to_lowercase();
        let target = || {
            decision
                .target
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ActionParseError::MissingTarget(name.clone()))
        };
        let content = || {
            decision
                .content
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ActionParseError::MissingContent(name.clone()))
        };

        match name.as_str() {
            "speak" => Ok(Action::Speak { content: content()? }),
            "trade" => Ok(Action::Trade),
            "support" => Ok(Action::Support { target: target()? }),
            "whisper" => Ok(Action::Whisper {
                target: target()?,
                content: content()?,
            }),
            "move" => Ok(Action::Move {
                destination: target()?,
            }),
            "idle" | "rest" => Ok(Action::Idle),
            "post_announcement" | "build_billboard" => Ok(Action::PostAnnouncement {
                content: content()?,
            }),
            "adjust_tax" => {
                let raw = decision
                    .content
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| ActionParseError::MissingContent(name.clone()))?;
                let mut rate: f64 = raw.parse().map_err(|_| ActionParseError::BadNumber {
                    action: name.clone(),
                    raw: raw.to_string(),
                })?;
                // Values above 1.0 read as percentages
                if rate > 1.0 {
                    rate /= 100.0;
                }
                Ok(Action::AdjustTax { rate })
            }
            "grant_subsidy" => {
                let target = target()?;
                let amount = match decision.content.as_deref().map(str::trim) {
                    Some(raw) if !raw.is_empty() => {
                        raw.parse().map_err(|_| ActionParseError::BadNumber {
                            action: name.clone(),
                            raw: raw.to_string(),
                        })?
                    }
                    _ => DEFAULT_SUBSIDY_AMOUNT,
                };
                Ok(Action::GrantSubsidy { target, amount })
            }
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }
}

impl ActionKind {
    /// Fixed energy cost table
    pub fn energy_cost(&self) -> i64 {
        match self {
            ActionKind::Speak => 2,
            ActionKind::Trade => 2,
            ActionKind::Support => 1,
            ActionKind::Whisper => 1,
            ActionKind::Move => 0,
            ActionKind::Idle => 0,
            ActionKind::PostAnnouncement => 10,
            ActionKind::AdjustTax => 5,
            ActionKind::GrantSubsidy => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Speak => "speak",
            ActionKind::Trade => "trade",
            ActionKind::Support => "support",
            ActionKind::Whisper => "whisper",
            ActionKind::Move => "move",
            ActionKind::Idle => "idle",
            ActionKind::PostAnnouncement => "post_announcement",
            ActionKind::AdjustTax => "adjust_tax",
            ActionKind::GrantSubsidy => "grant_subsidy",
        }
    }
}

//! Shared history digest
//!
//! Notable events accumulate over the run; the context shown to each agent
//! carries a digest of the most important recent ones. Selection takes the
//! top N by importance (ties favoring recency), then presents them in
//! chronological order. Each event renders through a fixed template for
//! its kind, in the run language.
//!
//! # Critical Invariants
//!
//! 1. Importance is clamped to [1, 5] at creation
//! 2. Digest selection sorts by (importance desc, epoch desc), truncates,
//!    then re-sorts by epoch ascending for presentation
//! 3. Events are immutable once recorded

use serde::{Deserialize, Serialize};

use crate::models::config::Language;

/// Lowest event importance
pub const MIN_IMPORTANCE: u8 = 1;
/// Highest event importance
pub const MAX_IMPORTANCE: u8 = 5;
/// Default digest length
pub const DEFAULT_DIGEST_SIZE: usize = 8;

/// What class of event this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Remark,
    Announcement,
    TaxChange,
    Subsidy,
    LeakedWhisper,
    MutualSupport,
    TreasuryOverflow,
}

/// One notable event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub epoch: usize,
    pub kind: HistoryKind,
    pub importance: u8,
    /// Agents the event names, in narrative order
    pub involved: Vec<String>,
    /// Kind-specific payload: quoted text, a rate, an amount
    pub detail: String,
}

impl HistoryEvent {
    /// Importance outside [1, 5] is clamped, never rejected
    pub fn new(
        epoch: usize,
        kind: HistoryKind,
        importance: u8,
        involved: &[&str],
        detail: &str,
    ) -> Self {
        Self {
            epoch,
            kind,
            importance: importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE),
            involved: involved.iter().map(|s| s.to_string()).collect(),
            detail: detail.to_string(),
        }
    }

    fn who(&self, index: usize) -> &str {
        self.involved.get(index).map(String::as_str).unwrap_or("?")
    }

    /// Render through the fixed template for this event's kind
    pub fn describe(&self, language: Language) -> String {
        match language {
            Language::En => match self.kind {
                HistoryKind::Remark => format!("{} said: \"{}\"", self.who(0), self.detail),
                HistoryKind::Announcement => {
                    format!("{} posted an announcement: \"{}\"", self.who(0), self.detail)
                }
                HistoryKind::TaxChange => {
                    format!("{} set the market tax to {}", self.who(0), self.detail)
                }
                HistoryKind::Subsidy => format!(
                    "{} granted a subsidy of {} energy to {}",
                    self.who(0),
                    self.detail,
                    self.who(1)
                ),
                HistoryKind::LeakedWhisper => format!(
                    "a whisper between {} and {} was overheard",
                    self.who(0),
                    self.who(1)
                ),
                HistoryKind::MutualSupport => format!(
                    "{} and {} exchanged mutual support",
                    self.who(0),
                    self.who(1)
                ),
                HistoryKind::TreasuryOverflow => format!(
                    "the treasury overflowed and {} energy was retired",
                    self.detail
                ),
            },
            Language::Ko => match self.kind {
                HistoryKind::Remark => {
                    format!("{}이(가) 말했다: \"{}\"", self.who(0), self.detail)
                }
                HistoryKind::Announcement => {
                    format!("{}이(가) 공고를 붙였다: \"{}\"", self.who(0), self.detail)
                }
                HistoryKind::TaxChange => {
                    format!("{}이(가) 시장 세율을 {}로 정했다", self.who(0), self.detail)
                }
                HistoryKind::Subsidy => format!(
                    "{}이(가) {}에게 에너지 {}을 지원했다",
                    self.who(0),
                    self.who(1),
                    self.detail
                ),
                HistoryKind::LeakedWhisper => format!(
                    "{}와(과) {} 사이의 속삭임이 새어 나갔다",
                    self.who(0),
                    self.who(1)
                ),
                HistoryKind::MutualSupport => format!(
                    "{}와(과) {}이(가) 상호 지지를 교환했다",
                    self.who(0),
                    self.who(1)
                ),
                HistoryKind::TreasuryOverflow => {
                    format!("국고가 넘쳐 에너지 {}이 소각되었다", self.detail)
                }
            },
        }
    }
}

/// Append-only event store with digest selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEngine {
    events: Vec<HistoryEvent>,
}

impl HistoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        epoch: usize,
        kind: HistoryKind,
        importance: u8,
        involved: &[&str],
        detail: &str,
    ) {
        self.events
            .push(HistoryEvent::new(epoch, kind, importance, involved, detail));
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The `limit` most important events, presented chronologically.
    ///
    /// Among equal importance, the more recent event wins selection. The
    /// selected set is then re-sorted by epoch so readers see a timeline.
    pub fn digest(&self, limit: usize) -> Vec<HistoryEvent> {
        let mut ranked: Vec<HistoryEvent> = self.events.clone();
        ranked.sort_by(|a, b| {
            b.importance
                .cmp(&a.importance)
                .then_with(|| b.epoch.cmp(&a.epoch))
        });
        ranked.truncate(limit);
        ranked.sort_by_key(|e| e.epoch);
        ranked
    }

    /// Digest rendered as prompt text, one line per event
    pub fn summarize(&self, max_events: usize, language: Language) -> String {
        let digest = self.digest(max_events);
        if digest.is_empty() {
            return match language {
                Language::En => "No notable history yet.".to_string(),
                Language::Ko => "아직 기록된 역사가 없습니다.".to_string(),
            };
        }
        digest
            .iter()
            .map(|event| match language {
                Language::En => format!("[Epoch {}] {}", event.epoch, event.describe(language)),
                Language::Ko => {
                    format!("[{}번째 시대] {}", event.epoch, event.describe(language))
                }
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

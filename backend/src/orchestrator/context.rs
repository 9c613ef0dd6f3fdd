//! Turn context
//!
//! The snapshot an agent's provider sees before deciding: personal state,
//! who else is around, the policy environment, and the history digest.
//! Rendering produces the prompt text, in the run's configured language.

use serde::{Deserialize, Serialize};

use crate::models::agent::SuspicionRecord;
use crate::models::config::Language;
use crate::models::world::Visibility;
use crate::systems::history::HistoryEvent;
use crate::systems::influence::InfluenceTier;

/// What one agent knows at the start of its turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnContext {
    pub epoch: usize,
    pub agent_id: String,
    pub persona: String,
    pub language: Language,

    pub energy: i64,
    pub influence: i64,
    pub tier: InfluenceTier,

    pub location: String,
    pub visibility: Visibility,
    /// Everyone at the location, the agent included
    pub occupants: Vec<String>,
    /// Locations the agent could move to this turn
    pub reachable_locations: Vec<String>,

    pub tax_rate: f64,
    pub treasury_balance: i64,
    pub announcement: Option<String>,

    pub history: Vec<HistoryEvent>,
    pub suspicions: Vec<SuspicionRecord>,
    /// Agents this one has supported so far
    pub supported: Vec<String>,
}

impl TurnContext {
    /// Co-located agents, excluding the agent itself
    pub fn others_here(&self) -> Vec<String> {
        self.occupants
            .iter()
            .filter(|id| **id != self.agent_id)
            .cloned()
            .collect()
    }

    /// Prompt text in the run's language
    pub fn render(&self) -> String {
        match self.language {
            Language::En => self.render_en(),
            Language::Ko => self.render_ko(),
        }
    }

    fn render_en(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("== Epoch {} ==\n", self.epoch));
        out.push_str(&format!(
            "You are {} ({}), a {} with {} energy and {} influence.\n",
            self.agent_id,
            self.persona,
            self.tier.as_str(),
            self.energy,
            self.influence
        ));
        out.push_str(&format!(
            "You are at {} ({:?}). Also here: {}.\n",
            self.location,
            self.visibility,
            join_or(&self.others_here(), "nobody")
        ));
        out.push_str(&format!(
            "Market tax is {:.0}%; the treasury holds {}.\n",
            self.tax_rate * 100.0,
            self.treasury_balance
        ));
        if let Some(ann) = &self.announcement {
            out.push_str(&format!("Announcement board: {ann}\n"));
        }
        if !self.history.is_empty() {
            out.push_str("Recent history:\n");
            for event in &self.history {
                out.push_str(&format!(
                    "  [epoch {}] {}\n",
                    event.epoch,
                    event.describe(Language::En)
                ));
            }
        }
        for suspicion in &self.suspicions {
            out.push_str(&format!(
                "You suspect {} whispered about {} in epoch {}.\n",
                suspicion.informant, suspicion.subject, suspicion.epoch
            ));
        }
        out
    }

    fn render_ko(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("== {}번째 시대 ==\n", self.epoch));
        out.push_str(&format!(
            "당신은 {}({})이며, {} 등급으로 에너지 {}, 영향력 {}을 가지고 있습니다.\n",
            self.agent_id,
            self.persona,
            self.tier.as_str(),
            self.energy,
            self.influence
        ));
        out.push_str(&format!(
            "현재 위치: {}. 함께 있는 사람: {}.\n",
            self.location,
            join_or(&self.others_here(), "없음")
        ));
        out.push_str(&format!(
            "시장 세율은 {:.0}%이고 국고에는 {}이 있습니다.\n",
            self.tax_rate * 100.0,
            self.treasury_balance
        ));
        if let Some(ann) = &self.announcement {
            out.push_str(&format!("공고판: {ann}\n"));
        }
        if !self.history.is_empty() {
            out.push_str("최근 역사:\n");
            for event in &self.history {
                out.push_str(&format!(
                    "  [{}시대] {}\n",
                    event.epoch,
                    event.describe(Language::Ko)
                ));
            }
        }
        for suspicion in &self.suspicions {
            out.push_str(&format!(
                "{}시대에 {}이(가) {}에 대해 속삭인 것 같습니다.\n",
                suspicion.epoch, suspicion.informant, suspicion.subject
            ));
        }
        out
    }

    /// Bare context for provider unit tests
    pub fn empty_for_tests(agent_id: &str) -> Self {
        Self {
            epoch: 0,
            agent_id: agent_id.to_string(),
            persona: String::new(),
            language: Language::En,
            energy: 100,
            influence: 0,
            tier: InfluenceTier::Commoner,
            location: "plaza".to_string(),
            visibility: Visibility::Public,
            occupants: vec![agent_id.to_string()],
            reachable_locations: Vec::new(),
            tax_rate: 0.1,
            treasury_balance: 0,
            announcement: None,
            history: Vec::new(),
            suspicions: Vec::new(),
            supported: Vec::new(),
        }
    }
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_others_here_excludes_self() {
        let mut ctx = TurnContext::empty_for_tests("a");
        ctx.occupants = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(ctx.others_here(), vec!["b", "c"]);
    }

    #[test]
    fn test_render_mentions_announcement() {
        let mut ctx = TurnContext::empty_for_tests("a");
        ctx.announcement = Some("market closes early".to_string());
        assert!(ctx.render().contains("market closes early"));

        ctx.language = Language::Ko;
        assert!(ctx.render().contains("market closes early"));
    }
}

//! Influence tiers
//!
//! Influence maps onto three social tiers. Tier boundaries are fixed:
//! commoner [0, 4], notable [5, 9], elder [10, ∞). Elders give amplified
//! support: their energy gifts are multiplied and they confer bonus
//! influence on the recipient.

use serde::{Deserialize, Serialize};

/// Social standing derived from influence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceTier {
    Commoner,
    Notable,
    Elder,
}

impl InfluenceTier {
    /// Tier for an influence score. Negative scores read as commoner.
    pub fn from_influence(influence: i64) -> Self {
        match influence {
            i if i >= 10 => InfluenceTier::Elder,
            i if i >= 5 => InfluenceTier::Notable,
            _ => InfluenceTier::Commoner,
        }
    }

    /// Multiplier applied to support energy gifts given by this tier
    pub fn support_multiplier(&self) -> f64 {
        match self {
            InfluenceTier::Elder => 1.5,
            _ => 1.0,
        }
    }

    /// Bonus influence a recipient earns from this tier's support
    pub fn support_influence_bonus(&self) -> i64 {
        match self {
            InfluenceTier::Elder => 1,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InfluenceTier::Commoner => "commoner",
            InfluenceTier::Notable => "notable",
            InfluenceTier::Elder => "elder",
        }
    }
}

/// Static tier table, exposed for context rendering
#[derive(Debug, Clone, Copy)]
pub struct InfluenceTable;

impl InfluenceTable {
    /// Tier boundaries as (tier, lower bound) pairs in ascending order
    pub fn boundaries() -> [(InfluenceTier, i64); 3] {
        [
            (InfluenceTier::Commoner, 0),
            (InfluenceTier::Notable, 5),
            (InfluenceTier::Elder, 10),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(InfluenceTier::from_influence(0), InfluenceTier::Commoner);
        assert_eq!(InfluenceTier::from_influence(4), InfluenceTier::Commoner);
        assert_eq!(InfluenceTier::from_influence(5), InfluenceTier::Notable);
        assert_eq!(InfluenceTier::from_influence(9), InfluenceTier::Notable);
        assert_eq!(InfluenceTier::from_influence(10), InfluenceTier::Elder);
        assert_eq!(InfluenceTier::from_influence(100), InfluenceTier::Elder);
        assert_eq!(InfluenceTier::from_influence(-3), InfluenceTier::Commoner);
    }

    #[test]
    fn test_elder_amplifies_support() {
        assert_eq!(InfluenceTier::Elder.support_multiplier(), 1.5);
        assert_eq!(InfluenceTier::Elder.support_influence_bonus(), 1);
        assert_eq!(InfluenceTier::Notable.support_multiplier(), 1.0);
        assert_eq!(InfluenceTier::Commoner.support_influence_bonus(), 0);
    }
}

//! Roll → outcome tier tables
//!
//! Each attack type carries an ordered list of `[min_roll, max_roll]` brackets
//! that must tile 1..=100 exactly. Tables are checked once when the config is
//! loaded and indexed by roll, so a lookup can never miss.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::types::AttackType;

pub const MIN_ROLL: u8 = 1;
pub const MAX_ROLL: u8 = 100;

/// A named outcome bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessTier {
    pub name: String,
    pub min_roll: u8,
    pub max_roll: u8,
    pub multiplier: f64,
}

impl SuccessTier {
    pub fn new(name: &str, min_roll: u8, max_roll: u8, multiplier: f64) -> Self {
        Self {
            name: name.to_string(),
            min_roll,
            max_roll,
            multiplier,
        }
    }

    pub fn contains(&self, roll: u8) -> bool {
        (self.min_roll..=self.max_roll).contains(&roll)
    }
}

/// Validated tier table with a dense roll index
#[derive(Debug, Clone)]
pub struct TierTable {
    tiers: Vec<SuccessTier>,
    /// `index[roll - 1]` is the position in `tiers` covering `roll`
    index: [u8; MAX_ROLL as usize],
}

impl TierTable {
    pub fn build(attack_type: AttackType, tiers: &[SuccessTier]) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::TierGap {
                attack_type,
                roll: MIN_ROLL,
            });
        }
        if tiers.len() > MAX_ROLL as usize {
            return Err(ConfigError::setting(
                format!("attack_types.{}.success_tiers", attack_type),
                "more tiers than possible rolls",
            ));
        }

        let mut sorted = tiers.to_vec();
        sorted.sort_by_key(|t| t.min_roll);

        for tier in &sorted {
            let invalid = |reason: &str| ConfigError::InvalidTier {
                attack_type,
                name: tier.name.clone(),
                reason: reason.to_string(),
            };
            if tier.name.trim().is_empty() {
                return Err(invalid("name is empty"));
            }
            if tier.min_roll < MIN_ROLL || tier.max_roll > MAX_ROLL {
                return Err(invalid("roll bounds must lie within 1..=100"));
            }
            if tier.min_roll > tier.max_roll {
                return Err(invalid("min_roll exceeds max_roll"));
            }
            if !tier.multiplier.is_finite() || tier.multiplier < 0.0 {
                return Err(invalid("multiplier must be a non-negative number"));
            }
            if sorted.iter().filter(|t| t.name == tier.name).count() > 1 {
                return Err(invalid("name is used by more than one tier"));
            }
        }

        let mut expected = MIN_ROLL;
        for tier in &sorted {
            if tier.min_roll > expected {
                return Err(ConfigError::TierGap {
                    attack_type,
                    roll: expected,
                });
            }
            if tier.min_roll < expected {
                return Err(ConfigError::TierOverlap {
                    attack_type,
                    roll: tier.min_roll,
                });
            }
            expected = tier.max_roll + 1;
        }
        if sorted.last().map(|t| t.max_roll) != Some(MAX_ROLL) {
            return Err(ConfigError::TierGap {
                attack_type,
                roll: expected,
            });
        }

        let mut index = [0u8; MAX_ROLL as usize];
        for (pos, tier) in sorted.iter().enumerate() {
            for roll in tier.min_roll..=tier.max_roll {
                index[(roll - 1) as usize] = pos as u8;
            }
        }

        Ok(Self {
            tiers: sorted,
            index,
        })
    }

    /// Tier covering `roll`. Rolls outside 1..=100 are clamped first.
    pub fn lookup(&self, roll: u8) -> &SuccessTier {
        let roll = roll.clamp(MIN_ROLL, MAX_ROLL);
        &self.tiers[self.index[(roll - 1) as usize] as usize]
    }

    /// The highest-ranked tier: the one covering roll 100
    pub fn highest(&self) -> &SuccessTier {
        self.lookup(MAX_ROLL)
    }

    pub fn get(&self, name: &str) -> Option<&SuccessTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Tiers in ascending roll order
    pub fn tiers(&self) -> &[SuccessTier] {
        &self.tiers
    }

    pub fn max_multiplier(&self) -> f64 {
        self.tiers.iter().map(|t| t.multiplier).fold(0.0, f64::max)
    }
}

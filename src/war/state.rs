//! War record and its lifecycle
//!
//! `Active → Concluded`. Conclusion happens exactly once and is final.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::combat::loot::BattleLoot;
use crate::core::config::TacticalSettings;
use crate::core::error::PreconditionError;
use crate::core::types::{NationId, Resource, Turn, WarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarStatus {
    Active,
    Concluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConclusionType {
    AttackerVictory,
    DefenderVictory,
    Ceasefire,
    Surrender,
    NationEliminated,
}

impl ConclusionType {
    /// Whether the winner collects the loot accrued during the war
    pub fn transfers_loot(&self) -> bool {
        !matches!(self, ConclusionType::Ceasefire)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    pub conclusion_type: ConclusionType,
    pub winner_id: Option<NationId>,
    pub reason: String,
    pub concluded_at: DateTime<Utc>,
    /// What actually moved from loser to winner
    pub loot_transferred: Option<LootAccrual>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blockade {
    pub active: bool,
    pub blockading_nation_id: Option<NationId>,
    pub blockaded_nation_id: Option<NationId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// One value per side of a war
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideValues<T> {
    pub attacker: T,
    pub defender: T,
}

impl<T> SideValues<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Attacker => &self.attacker,
            Side::Defender => &self.defender,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Attacker => &mut self.attacker,
            Side::Defender => &mut self.defender,
        }
    }
}

/// Loot won so far, held until the war concludes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootAccrual {
    pub cash: f64,
    pub resources: BTreeMap<Resource, u64>,
}

impl LootAccrual {
    pub fn add(&mut self, loot: &BattleLoot) {
        self.cash += loot.cash;
        for (&resource, &amount) in &loot.resources {
            *self.resources.entry(resource).or_insert(0) += amount;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct War {
    pub id: WarId,
    pub attacker_id: NationId,
    pub defender_id: NationId,
    pub status: WarStatus,
    pub starting_resistance: f64,
    pub resistance: SideValues<f64>,
    pub tactical_points: SideValues<u32>,
    /// Time of each side's last attack, for the cooldown
    pub last_attack_at: SideValues<Option<DateTime<Utc>>>,
    pub blockade: Blockade,
    pub conclusion: Option<Conclusion>,
    pub loot: SideValues<LootAccrual>,
    pub declared_at: DateTime<Utc>,
    pub last_regenerated_turn: Option<Turn>,
    /// Bumped on every committed mutation
    pub version: u64,
}

impl War {
    pub fn new(
        id: WarId,
        attacker_id: NationId,
        defender_id: NationId,
        starting_resistance: f64,
        tactical: &TacticalSettings,
        declared_at: DateTime<Utc>,
    ) -> Self {
        let points = tactical.tactical_points_on_war_start.min(tactical.max_tactical_points);
        Self {
            id,
            attacker_id,
            defender_id,
            status: WarStatus::Active,
            starting_resistance,
            resistance: SideValues {
                attacker: starting_resistance,
                defender: starting_resistance,
            },
            tactical_points: SideValues {
                attacker: points,
                defender: points,
            },
            last_attack_at: SideValues::default(),
            blockade: Blockade::default(),
            conclusion: None,
            loot: SideValues::default(),
            declared_at,
            last_regenerated_turn: None,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == WarStatus::Active
    }

    pub fn ensure_active(&self) -> Result<(), PreconditionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(PreconditionError::WarNotActive(self.id))
        }
    }

    /// Which side `nation` fights on, None for outsiders
    pub fn side_of(&self, nation: NationId) -> Option<Side> {
        if nation == self.attacker_id {
            Some(Side::Attacker)
        } else if nation == self.defender_id {
            Some(Side::Defender)
        } else {
            None
        }
    }

    pub fn nation(&self, side: Side) -> NationId {
        match side {
            Side::Attacker => self.attacker_id,
            Side::Defender => self.defender_id,
        }
    }

    pub fn opponent_of(&self, nation: NationId) -> Option<NationId> {
        self.side_of(nation).map(|side| self.nation(side.opponent()))
    }

    /// One turn of tactical point regeneration. Applied at most once per turn.
    pub fn regenerate(&mut self, turn: Turn, settings: &TacticalSettings) -> bool {
        if !self.is_active() || self.last_regenerated_turn.is_some_and(|last| turn <= last) {
            return false;
        }
        self.tactical_points.attacker = crate::combat::tactical::regenerate(self.tactical_points.attacker, settings);
        self.tactical_points.defender = crate::combat::tactical::regenerate(self.tactical_points.defender, settings);
        self.last_regenerated_turn = Some(turn);
        self.version += 1;
        true
    }

    pub fn impose_blockade(&mut self, blockading: NationId, blockaded: NationId) {
        self.blockade = Blockade {
            active: true,
            blockading_nation_id: Some(blockading),
            blockaded_nation_id: Some(blockaded),
        };
    }

    /// Whether this war currently blockades `nation`
    pub fn blockades(&self, nation: NationId) -> bool {
        self.is_active() && self.blockade.active && self.blockade.blockaded_nation_id == Some(nation)
    }

    /// Winner when one side's resistance has run out
    pub fn resistance_winner(&self) -> Option<(ConclusionType, NationId)> {
        if self.resistance.defender <= 0.0 {
            Some((ConclusionType::AttackerVictory, self.attacker_id))
        } else if self.resistance.attacker <= 0.0 {
            Some((ConclusionType::DefenderVictory, self.defender_id))
        } else {
            None
        }
    }

    /// Move to Concluded. Fails if the war already concluded.
    pub fn conclude(
        &mut self,
        conclusion_type: ConclusionType,
        winner_id: Option<NationId>,
        reason: impl Into<String>,
        at: DateTime<Utc>,
        loot_transferred: Option<LootAccrual>,
    ) -> Result<(), PreconditionError> {
        self.ensure_active()?;
        self.status = WarStatus::Concluded;
        self.blockade = Blockade::default();
        self.conclusion = Some(Conclusion {
            conclusion_type,
            winner_id,
            reason: reason.into(),
            concluded_at: at,
            loot_transferred,
        });
        self.version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn war() -> War {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        War::new(WarId(1), NationId(1), NationId(2), 100.0, &TacticalSettings::default(), at)
    }

    #[test]
    fn test_new_war_starts_active_with_full_resistance() {
        let war = war();
        assert!(war.is_active());
        assert_eq!(war.resistance.attacker, 100.0);
        assert_eq!(war.tactical_points.defender, 12);
        assert!(war.conclusion.is_none());
    }

    #[test]
    fn test_regeneration_once_per_turn_and_capped() {
        let settings = TacticalSettings::default();
        let mut war = war();
        assert!(war.regenerate(1, &settings));
        assert!(!war.regenerate(1, &settings));
        assert_eq!(war.tactical_points.attacker, 16);
        for turn in 2..10 {
            war.regenerate(turn, &settings);
        }
        assert_eq!(war.tactical_points.attacker, 24);
        assert!(!war.regenerate(5, &settings));
    }

    #[test]
    fn test_conclude_once() {
        let mut war = war();
        war.impose_blockade(NationId(1), NationId(2));
        assert!(war.blockades(NationId(2)));

        let at = war.declared_at;
        war.conclude(ConclusionType::Surrender, Some(NationId(1)), "surrendered", at, None)
            .unwrap();
        assert_eq!(war.status, WarStatus::Concluded);
        assert!(!war.blockade.active);
        assert!(!war.blockades(NationId(2)));

        let again = war.conclude(ConclusionType::Ceasefire, None, "late", at, None);
        assert_eq!(again, Err(PreconditionError::WarNotActive(WarId(1))));
        assert_eq!(
            war.conclusion.as_ref().map(|c| c.conclusion_type),
            Some(ConclusionType::Surrender)
        );
    }

    #[test]
    fn test_concluded_war_does_not_regenerate() {
        let mut war = war();
        let at = war.declared_at;
        war.conclude(ConclusionType::Ceasefire, None, "peace", at, None).unwrap();
        assert!(!war.regenerate(1, &TacticalSettings::default()));
    }

    #[test]
    fn test_sides() {
        let war = war();
        assert_eq!(war.side_of(NationId(2)), Some(Side::Defender));
        assert_eq!(war.side_of(NationId(9)), None);
        assert_eq!(war.opponent_of(NationId(1)), Some(NationId(2)));
    }
}

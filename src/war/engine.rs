//! War engine - the single writer for war, nation and ceasefire state
//!
//! Each war and each nation sits behind its own mutex. Locks are always taken
//! in the same order: war, then nations by ascending id, then the ceasefire
//! book. Every effect is computed on copies and committed by assignment, so a
//! rejected action leaves nothing behind.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::combat::impact::{self, ImpactReport};
use crate::combat::power::{self, SidePowers};
use crate::combat::{casualties, loot, resistance, resources, roller, tactical};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{LootSettings, WarConfig};
use crate::core::error::{PreconditionError, Result, WarError};
use crate::core::types::{AttackType, NationId, ProposalId, Turn, UnitCounts, WarId};
use crate::nation::Nation;
use crate::war::ceasefire::{CeasefireBook, CeasefireProposal, ProposalStatus};
use crate::war::log::{BattleHistory, BattleLog};
use crate::war::state::{ConclusionType, LootAccrual, SideValues, War};

/// One attack order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRequest {
    pub war_id: WarId,
    pub attacker_id: NationId,
    pub attack_type: AttackType,
    pub units_committed: UnitCounts,
    /// City name or numeric city id in the defending nation
    #[serde(default)]
    pub selected_target: Option<String>,
}

#[derive(Debug)]
struct WarRecord {
    war: War,
    history: BattleHistory,
}

struct Settlement {
    conclusion_type: ConclusionType,
    winner_id: Option<NationId>,
    reason: String,
}

fn poisoned(what: &str) -> WarError {
    WarError::StateConflict(format!("{} lock poisoned", what))
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| poisoned(what))
}

/// Lock two nations in ascending id order, guards returned in argument order
fn lock_nations<'a>(
    first: (NationId, &'a Mutex<Nation>),
    second: (NationId, &'a Mutex<Nation>),
) -> Result<(MutexGuard<'a, Nation>, MutexGuard<'a, Nation>)> {
    if first.0 < second.0 {
        let a = lock(first.1, "nation")?;
        let b = lock(second.1, "nation")?;
        Ok((a, b))
    } else {
        let b = lock(second.1, "nation")?;
        let a = lock(first.1, "nation")?;
        Ok((a, b))
    }
}

/// Drop zero entries and check the order against the attack type
fn validate_request(config: &WarConfig, request: &BattleRequest) -> Result<UnitCounts> {
    let settings = config.attack(request.attack_type);
    let committed: UnitCounts = request
        .units_committed
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(&unit, &count)| (unit, count))
        .collect();

    if committed.is_empty() {
        return Err(WarError::Validation("no units committed".into()));
    }
    if let Some(unit) = committed.keys().find(|u| !settings.allowed_units.contains(*u)) {
        return Err(WarError::Validation(format!(
            "{} cannot take part in {}",
            unit, request.attack_type
        )));
    }
    let has_target = request
        .selected_target
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if settings.requires_target && !has_target {
        return Err(WarError::Validation(format!(
            "{} requires a target city",
            request.attack_type
        )));
    }
    Ok(committed)
}

/// Move the winner's accrued loot out of the loser, re-capped against what the loser holds now
fn transfer_loot(settings: &LootSettings, accrued: &LootAccrual, loser: &mut Nation, winner: &mut Nation) -> LootAccrual {
    let cash_wanted = accrued.cash.min(loot::cash_cap(settings, loser.resources.treasury()));
    let cash = loser.resources.debit_treasury(cash_wanted);
    winner.resources.credit_treasury(cash);

    let mut moved = BTreeMap::new();
    for (&resource, &amount) in &accrued.resources {
        let capped = amount.min(loot::resource_cap(settings, loser.resources.get(resource)));
        let taken = loser.resources.remove(resource, capped);
        if taken > 0 {
            winner.resources.add(resource, taken);
            moved.insert(resource, taken);
        }
    }
    LootAccrual { cash, resources: moved }
}

/// Conclude `war` on copies of both participants
fn settle(
    config: &WarConfig,
    war: &mut War,
    first: &mut Nation,
    second: &mut Nation,
    settlement: Settlement,
    now: DateTime<Utc>,
) -> Result<()> {
    war.ensure_active()?;

    let transferred = match settlement.winner_id {
        Some(winner_id) if settlement.conclusion_type.transfers_loot() => {
            let side = war.side_of(winner_id).ok_or_else(|| {
                WarError::Validation(format!("{} is not a participant in {}", winner_id, war.id))
            })?;
            let accrued = war.loot.get(side).clone();
            let (winner, loser) = if first.id == winner_id {
                (&mut *first, &mut *second)
            } else {
                (&mut *second, &mut *first)
            };
            Some(transfer_loot(&config.settings().loot, &accrued, loser, winner))
        }
        _ => None,
    };

    war.conclude(
        settlement.conclusion_type,
        settlement.winner_id,
        settlement.reason,
        now,
        transferred,
    )?;

    if let Some(points) = config.settings().action_points_on_war_conclusion {
        first.action_points = points;
        second.action_points = points;
    }
    Ok(())
}

pub struct WarEngine {
    wars: RwLock<AHashMap<WarId, Arc<Mutex<WarRecord>>>>,
    nations: RwLock<AHashMap<NationId, Arc<Mutex<Nation>>>>,
    ceasefires: Mutex<CeasefireBook>,
    next_war_id: AtomicU32,
    next_proposal_id: AtomicU32,
    clock: Arc<dyn Clock>,
}

impl WarEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            wars: RwLock::new(AHashMap::new()),
            nations: RwLock::new(AHashMap::new()),
            ceasefires: Mutex::new(CeasefireBook::new()),
            next_war_id: AtomicU32::new(1),
            next_proposal_id: AtomicU32::new(1),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    fn war_handle(&self, id: WarId) -> Result<Arc<Mutex<WarRecord>>> {
        let wars = self.wars.read().map_err(|_| poisoned("war registry"))?;
        wars.get(&id).cloned().ok_or(WarError::WarNotFound(id))
    }

    fn nation_handle(&self, id: NationId) -> Result<Arc<Mutex<Nation>>> {
        let nations = self.nations.read().map_err(|_| poisoned("nation registry"))?;
        nations.get(&id).cloned().ok_or(WarError::NationNotFound(id))
    }

    // ---- setup ----

    /// Hand a nation record to the engine
    pub fn register_nation(&self, nation: Nation) -> Result<NationId> {
        let mut nations = self.nations.write().map_err(|_| poisoned("nation registry"))?;
        let id = nation.id;
        if nations.contains_key(&id) {
            return Err(WarError::Validation(format!("{} is already registered", id)));
        }
        nations.insert(id, Arc::new(Mutex::new(nation)));
        tracing::debug!(nation = %id, "nation registered");
        Ok(id)
    }

    pub fn declare_war(&self, config: &WarConfig, attacker_id: NationId, defender_id: NationId) -> Result<War> {
        if attacker_id == defender_id {
            return Err(WarError::Validation(format!("{} cannot declare war on itself", attacker_id)));
        }
        self.nation_handle(attacker_id)?;
        self.nation_handle(defender_id)?;

        let mut wars = self.wars.write().map_err(|_| poisoned("war registry"))?;
        for handle in wars.values() {
            let record = lock(handle, "war")?;
            let war = &record.war;
            if war.is_active() && war.side_of(attacker_id).is_some() && war.side_of(defender_id).is_some() {
                return Err(WarError::Validation(format!(
                    "{} and {} are already at war in {}",
                    attacker_id, defender_id, war.id
                )));
            }
        }

        let id = WarId(self.next_war_id.fetch_add(1, Ordering::SeqCst));
        let settings = config.settings();
        let war = War::new(
            id,
            attacker_id,
            defender_id,
            settings.starting_resistance,
            &settings.tactical,
            self.clock.now(),
        );
        wars.insert(
            id,
            Arc::new(Mutex::new(WarRecord {
                war: war.clone(),
                history: BattleHistory::new(),
            })),
        );
        tracing::info!(war = %id, attacker = %attacker_id, defender = %defender_id, "war declared");
        Ok(war)
    }

    // ---- battles ----

    /// Resolve one battle. All effects land together or not at all.
    pub fn initiate_battle<R: Rng + ?Sized>(
        &self,
        config: &WarConfig,
        request: &BattleRequest,
        rng: &mut R,
    ) -> Result<BattleLog> {
        let result = self.resolve_battle(config, request, rng);
        match &result {
            Ok(log) => tracing::info!(
                war = %log.war_id,
                battle = log.battle_number,
                attacker = %log.attacker_id,
                defender = %log.defender_id,
                attack_type = %log.attack_type,
                units = ?log.units_committed,
                tier = %log.outcome_tier,
                roll = ?log.roll,
                damage = log.resistance_damage,
                resistance = log.defender_resistance_after,
                concluded = log.conclusion.is_some(),
                "battle resolved"
            ),
            Err(err) => tracing::warn!(
                war = %request.war_id,
                attacker = %request.attacker_id,
                attack_type = %request.attack_type,
                units = ?request.units_committed,
                error = %err,
                "battle rejected"
            ),
        }
        result
    }

    fn resolve_battle<R: Rng + ?Sized>(
        &self,
        config: &WarConfig,
        request: &BattleRequest,
        rng: &mut R,
    ) -> Result<BattleLog> {
        let committed = validate_request(config, request)?;
        let attack = config.attack(request.attack_type);

        let handle = self.war_handle(request.war_id)?;
        let mut record = lock(&handle, "war")?;
        record.war.ensure_active()?;
        let side = record.war.side_of(request.attacker_id).ok_or_else(|| {
            WarError::Validation(format!(
                "{} is not a participant in {}",
                request.attacker_id, request.war_id
            ))
        })?;
        let target_side = side.opponent();
        let defender_id = record.war.nation(target_side);

        let attacker_handle = self.nation_handle(request.attacker_id)?;
        let defender_handle = self.nation_handle(defender_id)?;
        let (mut attacker_guard, mut defender_guard) = lock_nations(
            (request.attacker_id, &*attacker_handle),
            (defender_id, &*defender_handle),
        )?;

        let mut war = record.war.clone();
        let mut attacker = (*attacker_guard).clone();
        let mut defender = (*defender_guard).clone();

        if !attacker.military.can_commit(&committed) {
            return Err(WarError::Validation(format!(
                "{} cannot field the committed units",
                attacker.id
            )));
        }
        let target = match request.selected_target.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(defender.find_city(name).ok_or_else(|| {
                WarError::Validation(format!("{} has no city '{}'", defender_id, name))
            })?),
            _ => None,
        };

        // Preconditions, checked before anything is touched
        let requirement = resources::attack_requirement(config, &committed);
        resources::check_attacker_supply(&attacker.resources, &requirement)?;
        tactical::check_affordable(*war.tactical_points.get(side), attack.action_point_cost)?;
        let now = self.clock.now();
        tactical::check_cooldown(*war.last_attack_at.get(side), now, &config.settings().tactical)?;

        let supply = resources::defender_supply(config, request.attack_type, &defender.military, &defender.resources);
        let powers = SidePowers {
            attacker: power::attacker_power(config, &committed),
            defender: power::defender_power(config, request.attack_type, &defender.military, &supply),
        };
        let outcome = roller::roll_outcome(config, request.attack_type, &powers, rng);

        let damage = resistance::resistance_damage(attack, outcome.multiplier);
        let resistance_after =
            resistance::apply_damage(*war.resistance.get(target_side), damage, war.starting_resistance);

        let attacker_losses = casualties::attacker_losses(attack, &committed, outcome.multiplier);
        let expended = casualties::expended_units(attack, &committed);
        let pool = casualties::defender_loss_pool(config, damage);
        let defender_losses = casualties::defender_losses(attack, pool, &defender.military);

        let impact = if request.attack_type == AttackType::NuclearStrike {
            impact::nuclear_impact(&config.settings().nuclear, &mut defender.cities, target, rng)
        } else if let Some(range) = &attack.impact {
            impact::conventional_impact(range, &mut defender.cities, target, rng)
        } else {
            ImpactReport::default()
        };

        let battle_loot = loot::battle_loot(
            &config.settings().loot,
            request.attack_type,
            &outcome.tier_name,
            &defender.resources,
            rng,
        );

        // Apply to the copies
        resources::debit_attacker(&mut attacker.resources, &requirement);
        attacker
            .military
            .apply_losses(&casualties::attacker_debit(&attacker_losses, &expended));
        defender.military.apply_losses(&defender_losses);

        *war.tactical_points.get_mut(side) -= attack.action_point_cost;
        *war.last_attack_at.get_mut(side) = Some(now);
        *war.resistance.get_mut(target_side) = resistance_after;
        war.loot.get_mut(side).add(&battle_loot);

        let qualifies_for_blockade = request.attack_type == AttackType::NavalBattle
            && config
                .settings()
                .naval
                .blockade_qualifying_tiers
                .iter()
                .any(|tier| *tier == outcome.tier_name);
        if qualifies_for_blockade {
            war.impose_blockade(attacker.id, defender.id);
        }
        war.version += 1;

        let battle_number = record.history.next_battle_number();
        if let Some((conclusion_type, winner_id)) = war.resistance_winner() {
            let reason = format!("{} resistance broken in battle {}", defender_id, battle_number);
            settle(
                config,
                &mut war,
                &mut attacker,
                &mut defender,
                Settlement {
                    conclusion_type,
                    winner_id: Some(winner_id),
                    reason,
                },
                now,
            )?;
        }

        let mut book = lock(&self.ceasefires, "ceasefire book")?;
        if !war.is_active() {
            book.close_war(war.id, now);
        }

        let log = BattleLog {
            war_id: war.id,
            battle_number,
            attacker_id: attacker.id,
            defender_id,
            attack_type: request.attack_type,
            units_committed: committed,
            power_a: powers.attacker,
            power_b: powers.defender,
            power_ratio_band: outcome.band,
            raw_roll: outcome.raw_roll,
            roll_modifier: outcome.modifier,
            roll: outcome.final_roll,
            outcome_tier: outcome.tier_name,
            multiplier: outcome.multiplier,
            resistance_damage: damage,
            defender_resistance_after: resistance_after,
            attacker_losses,
            defender_losses,
            units_expended: expended,
            infrastructure_destroyed: impact.infrastructure_destroyed,
            civilian_casualties: impact.civilian_casualties,
            city_impacts: impact.cities,
            loot: battle_loot,
            ammo_consumed: requirement.ammo,
            gasoline_consumed: requirement.gasoline,
            defender_supplied: supply.ammo_sufficient && supply.gasoline_sufficient,
            blockade_imposed: qualifies_for_blockade && war.is_active(),
            conclusion: war.conclusion.clone(),
            timestamp: now,
        };

        // Commit
        *attacker_guard = attacker;
        *defender_guard = defender;
        record.war = war;
        record.history.record(log.clone());
        drop(book);
        Ok(log)
    }

    // ---- turns ----

    /// Regenerate tactical points for one turn. Returns false if already applied.
    pub fn advance_turn(&self, config: &WarConfig, war_id: WarId, turn: Turn) -> Result<bool> {
        let handle = self.war_handle(war_id)?;
        let mut record = lock(&handle, "war")?;
        let applied = record.war.regenerate(turn, &config.settings().tactical);
        if applied {
            tracing::debug!(
                war = %war_id,
                turn,
                attacker_points = record.war.tactical_points.attacker,
                defender_points = record.war.tactical_points.defender,
                "tactical points regenerated"
            );
        }
        Ok(applied)
    }

    /// Count one turn of recovery for every ruined city of a nation
    pub fn recover_ruined_cities(&self, nation_id: NationId, turn: Turn) -> Result<usize> {
        let handle = self.nation_handle(nation_id)?;
        let mut nation = lock(&handle, "nation")?;
        let recovered = nation
            .cities
            .iter_mut()
            .map(|city| city.recover(turn))
            .filter(|&recovered| recovered)
            .count();
        if recovered > 0 {
            tracing::debug!(nation = %nation_id, turn, recovered, "ruined cities recovering");
        }
        Ok(recovered)
    }

    // ---- ceasefire ----

    pub fn propose_ceasefire(
        &self,
        config: &WarConfig,
        war_id: WarId,
        proposer_id: NationId,
        message: Option<String>,
    ) -> Result<CeasefireProposal> {
        let handle = self.war_handle(war_id)?;
        let record = lock(&handle, "war")?;
        record.war.ensure_active()?;
        let recipient_id = record.war.opponent_of(proposer_id).ok_or_else(|| {
            WarError::Validation(format!("{} is not a participant in {}", proposer_id, war_id))
        })?;

        let now = self.clock.now();
        let mut book = lock(&self.ceasefires, "ceasefire book")?;
        if let Some(existing) = book.pending_for(war_id, now) {
            return Err(PreconditionError::CeasefireAlreadyPending {
                war_id,
                proposal_id: existing.id,
            }
            .into());
        }
        let id = ProposalId(self.next_proposal_id.fetch_add(1, Ordering::SeqCst));
        let expires_at = now
            .checked_add_signed(config.proposal_duration())
            .ok_or_else(|| WarError::StateConflict(format!("ceasefire expiry overflows the clock at {}", now)))?;
        let proposal = book.open(id, war_id, proposer_id, recipient_id, message, now, expires_at)?;

        tracing::info!(
            war = %war_id,
            proposal = %id,
            proposer = %proposer_id,
            recipient = %recipient_id,
            expires_at = %proposal.expires_at,
            "ceasefire proposed"
        );
        Ok(proposal)
    }

    /// Accept or reject a proposal. Accepting concludes the war as a ceasefire.
    ///
    /// A proposal that has lapsed, or whose war already ended, is closed as
    /// expired and returned without touching the war.
    pub fn respond_to_ceasefire(
        &self,
        config: &WarConfig,
        proposal_id: ProposalId,
        accept: bool,
    ) -> Result<CeasefireProposal> {
        let war_id = lock(&self.ceasefires, "ceasefire book")?
            .get(proposal_id, self.clock.now())
            .map(|p| p.war_id)
            .ok_or(WarError::ProposalNotFound(proposal_id))?;

        let handle = self.war_handle(war_id)?;
        let mut record = lock(&handle, "war")?;
        let (attacker_id, defender_id) = (record.war.attacker_id, record.war.defender_id);
        let attacker_handle = self.nation_handle(attacker_id)?;
        let defender_handle = self.nation_handle(defender_id)?;
        let (mut attacker_guard, mut defender_guard) =
            lock_nations((attacker_id, &*attacker_handle), (defender_id, &*defender_handle))?;

        let now = self.clock.now();
        let mut book = lock(&self.ceasefires, "ceasefire book")?;
        let proposal = book
            .get(proposal_id, now)
            .cloned()
            .ok_or(WarError::ProposalNotFound(proposal_id))?;

        match proposal.status {
            ProposalStatus::Expired => {
                tracing::info!(war = %war_id, proposal = %proposal_id, "ceasefire response after expiry");
                return Ok(proposal);
            }
            ProposalStatus::Accepted | ProposalStatus::Rejected => {
                return Err(PreconditionError::ProposalNotPending(proposal_id).into());
            }
            ProposalStatus::Pending => {}
        }

        if !record.war.is_active() {
            book.close_war(war_id, now);
            return book
                .get(proposal_id, now)
                .cloned()
                .ok_or(WarError::ProposalNotFound(proposal_id));
        }

        if !accept {
            let rejected = book.resolve(proposal_id, ProposalStatus::Rejected, now)?;
            tracing::info!(war = %war_id, proposal = %proposal_id, "ceasefire rejected");
            return Ok(rejected);
        }

        let mut war = record.war.clone();
        let mut attacker = (*attacker_guard).clone();
        let mut defender = (*defender_guard).clone();
        settle(
            config,
            &mut war,
            &mut attacker,
            &mut defender,
            Settlement {
                conclusion_type: ConclusionType::Ceasefire,
                winner_id: None,
                reason: format!("ceasefire {} accepted", proposal_id),
            },
            now,
        )?;
        let accepted = book.resolve(proposal_id, ProposalStatus::Accepted, now)?;

        *attacker_guard = attacker;
        *defender_guard = defender;
        record.war = war;
        tracing::info!(war = %war_id, proposal = %proposal_id, "ceasefire accepted, war concluded");
        Ok(accepted)
    }

    // ---- other conclusions ----

    fn conclude_locked(&self, config: &WarConfig, record: &mut WarRecord, settlement: Settlement) -> Result<War> {
        let (attacker_id, defender_id) = (record.war.attacker_id, record.war.defender_id);
        let attacker_handle = self.nation_handle(attacker_id)?;
        let defender_handle = self.nation_handle(defender_id)?;
        let (mut attacker_guard, mut defender_guard) =
            lock_nations((attacker_id, &*attacker_handle), (defender_id, &*defender_handle))?;

        let now = self.clock.now();
        let mut war = record.war.clone();
        let mut attacker = (*attacker_guard).clone();
        let mut defender = (*defender_guard).clone();
        settle(config, &mut war, &mut attacker, &mut defender, settlement, now)?;

        let mut book = lock(&self.ceasefires, "ceasefire book")?;
        book.close_war(war.id, now);

        *attacker_guard = attacker;
        *defender_guard = defender;
        record.war = war.clone();
        tracing::info!(
            war = %war.id,
            conclusion = ?war.conclusion.as_ref().map(|c| c.conclusion_type),
            winner = ?war.conclusion.as_ref().and_then(|c| c.winner_id),
            "war concluded"
        );
        Ok(war)
    }

    pub fn surrender(&self, config: &WarConfig, war_id: WarId, nation_id: NationId) -> Result<War> {
        let handle = self.war_handle(war_id)?;
        let mut record = lock(&handle, "war")?;
        record.war.ensure_active()?;
        let winner_id = record.war.opponent_of(nation_id).ok_or_else(|| {
            WarError::Validation(format!("{} is not a participant in {}", nation_id, war_id))
        })?;
        self.conclude_locked(
            config,
            &mut record,
            Settlement {
                conclusion_type: ConclusionType::Surrender,
                winner_id: Some(winner_id),
                reason: format!("{} surrendered", nation_id),
            },
        )
    }

    /// Conclude every active war of an eliminated nation in its opponent's favour
    pub fn eliminate_nation(&self, config: &WarConfig, nation_id: NationId) -> Result<Vec<War>> {
        self.nation_handle(nation_id)?;
        let handles: Vec<_> = {
            let wars = self.wars.read().map_err(|_| poisoned("war registry"))?;
            wars.values().cloned().collect()
        };

        let mut concluded = Vec::new();
        for handle in handles {
            let mut record = lock(&handle, "war")?;
            if !record.war.is_active() {
                continue;
            }
            let Some(winner_id) = record.war.opponent_of(nation_id) else {
                continue;
            };
            let war = self.conclude_locked(
                config,
                &mut record,
                Settlement {
                    conclusion_type: ConclusionType::NationEliminated,
                    winner_id: Some(winner_id),
                    reason: format!("{} was eliminated", nation_id),
                },
            )?;
            concluded.push(war);
        }
        concluded.sort_by_key(|w| w.id);
        Ok(concluded)
    }

    // ---- reads ----

    pub fn war(&self, war_id: WarId) -> Result<War> {
        let handle = self.war_handle(war_id)?;
        let record = lock(&handle, "war")?;
        Ok(record.war.clone())
    }

    pub fn tactical_points(&self, war_id: WarId, nation_id: NationId) -> Result<u32> {
        let war = self.war(war_id)?;
        let side = war
            .side_of(nation_id)
            .ok_or_else(|| WarError::Validation(format!("{} is not a participant in {}", nation_id, war_id)))?;
        Ok(*war.tactical_points.get(side))
    }

    pub fn resistance(&self, war_id: WarId, nation_id: NationId) -> Result<f64> {
        let war = self.war(war_id)?;
        let side = war
            .side_of(nation_id)
            .ok_or_else(|| WarError::Validation(format!("{} is not a participant in {}", nation_id, war_id)))?;
        Ok(*war.resistance.get(side))
    }

    /// Whether any active war currently blockades the nation
    pub fn blockade_status(&self, nation_id: NationId) -> Result<bool> {
        let wars = self.wars.read().map_err(|_| poisoned("war registry"))?;
        for handle in wars.values() {
            if lock(handle, "war")?.war.blockades(nation_id) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn battle_history(&self, war_id: WarId) -> Result<Vec<BattleLog>> {
        let handle = self.war_handle(war_id)?;
        let record = lock(&handle, "war")?;
        Ok(record.history.battles().to_vec())
    }

    /// Battles in a war launched by one of its participants
    pub fn battles_by(&self, war_id: WarId, nation_id: NationId) -> Result<Vec<BattleLog>> {
        let handle = self.war_handle(war_id)?;
        let record = lock(&handle, "war")?;
        if record.war.side_of(nation_id).is_none() {
            return Err(WarError::Validation(format!("{} is not a participant in {}", nation_id, war_id)));
        }
        Ok(record.history.battles_by(nation_id).cloned().collect())
    }

    pub fn loot_accrual(&self, war_id: WarId) -> Result<SideValues<LootAccrual>> {
        Ok(self.war(war_id)?.loot)
    }

    pub fn nation(&self, nation_id: NationId) -> Result<Nation> {
        let handle = self.nation_handle(nation_id)?;
        let nation = lock(&handle, "nation")?;
        Ok(nation.clone())
    }

    pub fn proposal(&self, proposal_id: ProposalId) -> Result<CeasefireProposal> {
        let mut book = lock(&self.ceasefires, "ceasefire book")?;
        book.get(proposal_id, self.clock.now())
            .cloned()
            .ok_or(WarError::ProposalNotFound(proposal_id))
    }

    pub fn pending_ceasefire(&self, war_id: WarId) -> Result<Option<CeasefireProposal>> {
        let mut book = lock(&self.ceasefires, "ceasefire book")?;
        Ok(book.pending_for(war_id, self.clock.now()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::error::ErrorKind;
    use crate::core::types::{Resource, UnitType};
    use crate::nation::{NationMilitary, NationResources};
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (WarEngine, Arc<ManualClock>, WarConfig, War) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let engine = WarEngine::new(clock.clone());
        let config = WarConfig::default();
        for id in [1, 2] {
            let nation = Nation::new(NationId(id), &format!("Nation {}", id))
                .with_military(NationMilitary::new().with(UnitType::Soldiers, 5_000).with(UnitType::Tanks, 50))
                .with_resources(
                    NationResources::new(100_000.0)
                        .with(Resource::Ammo, 10_000)
                        .with(Resource::Gasoline, 10_000),
                );
            engine.register_nation(nation).unwrap();
        }
        let war = engine.declare_war(&config, NationId(1), NationId(2)).unwrap();
        (engine, clock, config, war)
    }

    fn ground(war_id: WarId, soldiers: u64) -> BattleRequest {
        BattleRequest {
            war_id,
            attacker_id: NationId(1),
            attack_type: AttackType::GroundBattle,
            units_committed: [(UnitType::Soldiers, soldiers)].into(),
            selected_target: None,
        }
    }

    #[test]
    fn test_battle_spends_points_and_logs() {
        let (engine, _clock, config, war) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let log = engine.initiate_battle(&config, &ground(war.id, 1_000), &mut rng).unwrap();

        assert_eq!(log.battle_number, 1);
        assert_eq!(log.ammo_consumed, 10);
        assert_eq!(engine.tactical_points(war.id, NationId(1)).unwrap(), 9);
        assert_eq!(engine.battle_history(war.id).unwrap().len(), 1);
        assert_eq!(engine.nation(NationId(1)).unwrap().resources.get(Resource::Ammo), 9_990);
        assert!(engine.war(war.id).unwrap().version > war.version);
    }

    #[test]
    fn test_cooldown_blocks_second_attack() {
        let (engine, clock, config, war) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        engine.initiate_battle(&config, &ground(war.id, 100), &mut rng).unwrap();

        clock.advance(Duration::seconds(20));
        let err = engine.initiate_battle(&config, &ground(war.id, 100), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            WarError::Precondition(PreconditionError::CooldownActive { remaining_seconds: 40 })
        ));

        clock.advance(Duration::seconds(40));
        assert!(engine.initiate_battle(&config, &ground(war.id, 100), &mut rng).is_ok());
    }

    #[test]
    fn test_disallowed_unit_is_validation_error() {
        let (engine, _clock, config, war) = setup();
        let mut request = ground(war.id, 10);
        request.units_committed.insert(UnitType::Nukes, 1);
        let err = engine
            .initiate_battle(&config, &request, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_outsider_cannot_attack() {
        let (engine, _clock, config, war) = setup();
        engine.register_nation(Nation::new(NationId(3), "Bystander")).unwrap();
        let mut request = ground(war.id, 10);
        request.attacker_id = NationId(3);
        let err = engine
            .initiate_battle(&config, &request, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_war_rejected() {
        let (engine, _clock, config, _war) = setup();
        let err = engine.declare_war(&config, NationId(2), NationId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(engine.declare_war(&config, NationId(1), NationId(1)).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_surrender_resets_action_points() {
        let (engine, _clock, config, war) = setup();
        let concluded = engine.surrender(&config, war.id, NationId(2)).unwrap();
        let conclusion = concluded.conclusion.unwrap();
        assert_eq!(conclusion.conclusion_type, ConclusionType::Surrender);
        assert_eq!(conclusion.winner_id, Some(NationId(1)));
        assert_eq!(engine.nation(NationId(1)).unwrap().action_points, 10);
        assert_eq!(engine.nation(NationId(2)).unwrap().action_points, 10);

        let again = engine.surrender(&config, war.id, NationId(2)).unwrap_err();
        assert!(matches!(
            again,
            WarError::Precondition(PreconditionError::WarNotActive(id)) if id == war.id
        ));
    }

    #[test]
    fn test_unknown_ids() {
        let (engine, _clock, config, _war) = setup();
        assert_eq!(engine.war(WarId(99)).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(engine.nation(NationId(99)).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(engine.proposal(ProposalId(5)).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(engine.advance_turn(&config, WarId(99), 1).unwrap_err().kind(), ErrorKind::NotFound);
    }
}

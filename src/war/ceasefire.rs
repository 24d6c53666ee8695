//! Ceasefire proposals
//!
//! At most one pending proposal per war. Expiry is lazy: a proposal past its
//! `expires_at` is marked expired the next time anything looks at it.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::PreconditionError;
use crate::core::types::{NationId, ProposalId, WarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeasefireProposal {
    pub id: ProposalId,
    pub war_id: WarId,
    pub proposer_id: NationId,
    pub recipient_id: NationId,
    pub status: ProposalStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl CeasefireProposal {
    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Mark expired if pending and past deadline. Returns true on transition.
    fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_pending() && self.is_expired_at(now) {
            self.status = ProposalStatus::Expired;
            true
        } else {
            false
        }
    }

    fn close(&mut self, status: ProposalStatus, now: DateTime<Utc>) {
        self.status = status;
        self.responded_at = Some(now);
    }
}

/// All proposals plus the pending-per-war index
#[derive(Debug, Default)]
pub struct CeasefireBook {
    proposals: AHashMap<ProposalId, CeasefireProposal>,
    pending_by_war: AHashMap<WarId, ProposalId>,
}

impl CeasefireBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh_war(&mut self, war_id: WarId, now: DateTime<Utc>) {
        let Some(&id) = self.pending_by_war.get(&war_id) else {
            return;
        };
        match self.proposals.get_mut(&id) {
            Some(proposal) => {
                if proposal.expire_if_due(now) || !proposal.is_pending() {
                    self.pending_by_war.remove(&war_id);
                }
            }
            None => {
                self.pending_by_war.remove(&war_id);
            }
        }
    }

    /// The live pending proposal for a war, after lazy expiry
    pub fn pending_for(&mut self, war_id: WarId, now: DateTime<Utc>) -> Option<&CeasefireProposal> {
        self.refresh_war(war_id, now);
        let id = self.pending_by_war.get(&war_id)?;
        self.proposals.get(id)
    }

    /// File a new proposal. Fails if the war already has a live one.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        id: ProposalId,
        war_id: WarId,
        proposer_id: NationId,
        recipient_id: NationId,
        message: Option<String>,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<CeasefireProposal, PreconditionError> {
        if let Some(existing) = self.pending_for(war_id, now) {
            return Err(PreconditionError::CeasefireAlreadyPending {
                war_id,
                proposal_id: existing.id,
            });
        }
        let proposal = CeasefireProposal {
            id,
            war_id,
            proposer_id,
            recipient_id,
            status: ProposalStatus::Pending,
            message,
            created_at: now,
            expires_at,
            responded_at: None,
        };
        self.proposals.insert(id, proposal.clone());
        self.pending_by_war.insert(war_id, id);
        Ok(proposal)
    }

    /// Proposal by id, after lazy expiry
    pub fn get(&mut self, id: ProposalId, now: DateTime<Utc>) -> Option<&CeasefireProposal> {
        let war_id = self.proposals.get(&id)?.war_id;
        self.refresh_war(war_id, now);
        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.expire_if_due(now);
        }
        self.proposals.get(&id)
    }

    /// Close a pending proposal with a final status
    pub fn resolve(
        &mut self,
        id: ProposalId,
        status: ProposalStatus,
        now: DateTime<Utc>,
    ) -> Result<CeasefireProposal, PreconditionError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(PreconditionError::ProposalNotPending(id))?;
        if !proposal.is_pending() {
            return Err(PreconditionError::ProposalNotPending(id));
        }
        proposal.close(status, now);
        let resolved = proposal.clone();
        if self.pending_by_war.get(&resolved.war_id) == Some(&id) {
            self.pending_by_war.remove(&resolved.war_id);
        }
        Ok(resolved)
    }

    /// Expire every pending proposal of a war, used when the war concludes
    pub fn close_war(&mut self, war_id: WarId, now: DateTime<Utc>) {
        if let Some(id) = self.pending_by_war.remove(&war_id) {
            if let Some(proposal) = self.proposals.get_mut(&id) {
                if proposal.is_pending() {
                    proposal.close(ProposalStatus::Expired, now);
                }
            }
        }
    }
}

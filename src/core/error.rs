use thiserror::Error;

use crate::core::types::{AttackType, NationId, ProposalId, WarId};

/// Errors raised while loading or validating a war configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{attack_type}: success tiers leave roll {roll} uncovered")]
    TierGap { attack_type: AttackType, roll: u8 },

    #[error("{attack_type}: success tiers overlap at roll {roll}")]
    TierOverlap { attack_type: AttackType, roll: u8 },

    #[error("{attack_type}: invalid success tier '{name}': {reason}")]
    InvalidTier {
        attack_type: AttackType,
        name: String,
        reason: String,
    },

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn setting(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidSetting {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Unmet preconditions for a war action. Nothing is mutated when these are returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionError {
    #[error(
        "insufficient resources: need {ammo_required} ammo and {gasoline_required} gasoline, \
         have {ammo_available} ammo and {gasoline_available} gasoline"
    )]
    InsufficientResources {
        ammo_required: u64,
        ammo_available: u64,
        gasoline_required: u64,
        gasoline_available: u64,
    },

    #[error("insufficient tactical points: need {required}, have {available}")]
    InsufficientTacticalPoints { required: u32, available: u32 },

    #[error("combat action cooldown active for another {remaining_seconds}s")]
    CooldownActive { remaining_seconds: i64 },

    #[error("{0} is not active")]
    WarNotActive(WarId),

    #[error("{war_id} already has pending ceasefire {proposal_id}")]
    CeasefireAlreadyPending { war_id: WarId, proposal_id: ProposalId },

    #[error("{0} is no longer pending")]
    ProposalNotPending(ProposalId),
}

/// Flat error category, for callers that only need to branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Precondition,
    ConfigValidation,
    StateConflict,
    NotFound,
    Serialization,
}

#[derive(Error, Debug)]
pub enum WarError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Config validation error: {0}")]
    ConfigValidation(#[from] ConfigError),

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("War not found: {0}")]
    WarNotFound(WarId),

    #[error("Nation not found: {0}")]
    NationNotFound(NationId),

    #[error("Ceasefire proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl WarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WarError::Validation(_) => ErrorKind::Validation,
            WarError::Precondition(_) => ErrorKind::Precondition,
            WarError::ConfigValidation(_) => ErrorKind::ConfigValidation,
            WarError::StateConflict(_) => ErrorKind::StateConflict,
            WarError::WarNotFound(_) | WarError::NationNotFound(_) | WarError::ProposalNotFound(_) => {
                ErrorKind::NotFound
            }
            WarError::SerdeError(_) => ErrorKind::Serialization,
        }
    }
}

pub type Result<T> = std::result::Result<T, WarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_converts_with_kind() {
        let err: WarError = PreconditionError::WarNotActive(WarId(3)).into();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.to_string(), "Precondition failed: war#3 is not active");
    }

    #[test]
    fn test_not_found_kinds() {
        assert_eq!(WarError::NationNotFound(NationId(1)).kind(), ErrorKind::NotFound);
        assert_eq!(WarError::ProposalNotFound(ProposalId(1)).kind(), ErrorKind::NotFound);
    }
}

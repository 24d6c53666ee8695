//! War-scoped tactical point pools and the attack cooldown

use chrono::{DateTime, Utc};

use crate::core::config::TacticalSettings;
use crate::core::error::PreconditionError;

pub fn check_affordable(available: u32, cost: u32) -> Result<(), PreconditionError> {
    if available < cost {
        return Err(PreconditionError::InsufficientTacticalPoints {
            required: cost,
            available,
        });
    }
    Ok(())
}

/// Real-time gate between two attacks by the same nation in the same war
pub fn check_cooldown(
    last_attack: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    settings: &TacticalSettings,
) -> Result<(), PreconditionError> {
    let Some(last) = last_attack else {
        return Ok(());
    };
    let elapsed = (now - last).num_seconds();
    let remaining = settings.combat_action_cooldown_seconds - elapsed;
    if remaining > 0 {
        return Err(PreconditionError::CooldownActive {
            remaining_seconds: remaining,
        });
    }
    Ok(())
}

/// One turn of regeneration, capped at the pool maximum
pub fn regenerate(points: u32, settings: &TacticalSettings) -> u32 {
    points
        .saturating_add(settings.tactical_points_per_turn)
        .min(settings.max_tactical_points)
}

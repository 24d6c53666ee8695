//! Battle resolution math
//!
//! Every calculator here is a pure function over config, nation snapshots and
//! an injected RNG. Nothing in this module touches shared state; the war
//! engine commits the results.

pub mod casualties;
pub mod impact;
pub mod loot;
pub mod power;
pub mod resistance;
pub mod resources;
pub mod roller;
pub mod tactical;

pub use impact::{CityImpact, ImpactReport};
pub use loot::BattleLoot;
pub use power::SidePowers;
pub use resources::{DefenderSupply, ResourceRequirement};
pub use roller::{PowerRatioBand, RollOutcome};

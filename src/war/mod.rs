//! War lifecycle: war records, ceasefires, battle history and the engine
//! that owns them

pub mod ceasefire;
pub mod engine;
pub mod log;
pub mod state;

pub use ceasefire::{CeasefireBook, CeasefireProposal, ProposalStatus};
pub use engine::{BattleRequest, WarEngine};
pub use log::{BattleHistory, BattleLog};
pub use state::{Blockade, Conclusion, ConclusionType, LootAccrual, Side, SideValues, War, WarStatus};

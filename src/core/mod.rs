pub mod clock;
pub mod config;
pub mod error;
pub mod tiers;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{WarConfig, WarSettings};
pub use error::{ErrorKind, Result, WarError};

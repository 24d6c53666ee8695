//! War Engine - battle resolution and war lifecycle for a nation simulation
//!
//! Nations at war trade attacks. Each battle is resolved from a validated
//! [`core::config::WarConfig`] and an injected RNG, and its effects land on
//! the war and both nations atomically through [`war::WarEngine`].

pub mod combat;
pub mod core;
pub mod nation;
pub mod war;

//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Runtime helpers supporting the session runtime."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
//! Tick scheduling for the UrbanFarm runtime.

pub mod scheduling;

pub use scheduling::{RateLimiter, TickScheduler, TimerFired};

//! Background Tasks Module
//!
//! Contains background tasks that run alongside cache operations.
//!
//! # Tasks
//! - Expiry Sweeper: removes expired cache entries at configured intervals

mod sweeper;

pub use sweeper::spawn_sweeper;

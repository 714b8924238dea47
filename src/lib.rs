//! Football scoreline distributions and model confidence calibration.
//!
//! [`engine`] holds the pure computations, [`reference`] the read-only lookup
//! tables they consult, and [`api`] the JSON surface over both.

pub mod api;
pub mod config;
pub mod engine;
pub mod reference;

//! Monte Carlo ROI simulation for marketing-channel budget allocation.
//!
//! Data flows one way: channel parameters → channel simulator →
//! per-channel draws → portfolio optimizer → ranked portfolios.

pub mod analysis;
pub mod channel_simulator;
pub mod config;
pub mod error;
pub mod portfolio_optimizer;
pub mod rng;
pub mod stats;
pub mod types;

//! Shared primitive types used across the entire simulator.

/// A marketing channel's unique name, e.g. "Google Ads".
pub type ChannelName = String;

/// A monetary amount in the table's currency unit.
pub type Money = f64;

/// Per-channel budget weight in [0, 1].
pub type Weight = f64;

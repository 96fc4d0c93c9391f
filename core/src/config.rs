use crate::{
    error::{SimError, SimResult},
    types::ChannelName,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Channel parameters ──────────────────────────────────────────────

/// Distribution parameters for one marketing channel.
///
/// Every driver is modelled as a normal distribution; the simulator clamps
/// samples into their valid range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelParams {
    pub name: ChannelName,
    pub cpc_mean: f64,
    pub cpc_stddev: f64,
    pub ctr_mean: f64,
    pub ctr_stddev: f64,
    pub conversion_mean: f64,
    pub conversion_stddev: f64,
    pub ticket_mean: f64,
    pub ticket_stddev: f64,
}

impl ChannelParams {
    /// Means must be finite and positive, stddevs finite and non-negative.
    pub(crate) fn validate(&self) -> SimResult<()> {
        let means = [
            ("cpc_mean", self.cpc_mean),
            ("ctr_mean", self.ctr_mean),
            ("conversion_mean", self.conversion_mean),
            ("ticket_mean", self.ticket_mean),
        ];
        for (field, value) in means {
            if !(value.is_finite() && value > 0.0) {
                return Err(self.invalid(field, value));
            }
        }

        let stddevs = [
            ("cpc_stddev", self.cpc_stddev),
            ("ctr_stddev", self.ctr_stddev),
            ("conversion_stddev", self.conversion_stddev),
            ("ticket_stddev", self.ticket_stddev),
        ];
        for (field, value) in stddevs {
            if !(value.is_finite() && value >= 0.0) {
                return Err(self.invalid(field, value));
            }
        }
        Ok(())
    }

    fn invalid(&self, field: &'static str, value: f64) -> SimError {
        SimError::InvalidParameters {
            channel: self.name.clone(),
            field,
            value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChannelTableFile {
    channels: Vec<ChannelParams>,
}

/// Immutable, validated reference table of channel parameters.
///
/// Channel order is significant: allocation vectors index into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTable {
    channels: Vec<ChannelParams>,
}

impl ChannelTable {
    /// Build a table, rejecting empty tables, duplicate names and
    /// non-positive means.
    pub fn new(channels: Vec<ChannelParams>) -> SimResult<Self> {
        if channels.is_empty() {
            return Err(SimError::EmptyChannelTable);
        }

        let mut seen = HashSet::new();
        for channel in &channels {
            if !seen.insert(channel.name.as_str()) {
                return Err(SimError::DuplicateChannel { name: channel.name.clone() });
            }
            channel.validate()?;
        }

        Ok(Self { channels })
    }

    /// Load from a JSON file of the form `{"channels": [...]}`.
    /// In tests, use ChannelTable::standard().
    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SimResult<Self> {
        let file: ChannelTableFile = serde_json::from_str(content)?;
        Self::new(file.channels)
    }

    /// The five reference channels used by the default analysis.
    pub fn standard() -> Self {
        let channels = vec![
            standard_channel("Google Ads",      2.5,  0.5,  0.035, 0.008, 0.030, 0.008, 150.0, 30.0),
            standard_channel("Facebook Ads",    1.8,  0.4,  0.025, 0.006, 0.025, 0.007, 120.0, 25.0),
            standard_channel("Instagram Ads",   1.5,  0.3,  0.022, 0.005, 0.020, 0.005, 100.0, 20.0),
            standard_channel("Email Marketing", 0.05, 0.01, 0.150, 0.030, 0.050, 0.015, 200.0, 50.0),
            standard_channel("LinkedIn Ads",    5.0,  1.0,  0.028, 0.007, 0.040, 0.010, 300.0, 80.0),
        ];
        Self { channels }
    }

    pub fn get(&self, name: &str) -> SimResult<&ChannelParams> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SimError::InvalidChannel { name: name.to_string() })
    }

    pub fn channels(&self) -> &[ChannelParams] {
        &self.channels
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn standard_channel(
    name: &str,
    cpc_mean: f64,
    cpc_stddev: f64,
    ctr_mean: f64,
    ctr_stddev: f64,
    conversion_mean: f64,
    conversion_stddev: f64,
    ticket_mean: f64,
    ticket_stddev: f64,
) -> ChannelParams {
    ChannelParams {
        name: name.into(),
        cpc_mean,
        cpc_stddev,
        ctr_mean,
        ctr_stddev,
        conversion_mean,
        conversion_stddev,
        ticket_mean,
        ticket_stddev,
    }
}

// ── Run configuration ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Number of random allocation vectors to score.
    pub portfolio_trials: usize,
    /// Monte Carlo draws per channel, per trial.
    pub draws_per_channel: usize,
    /// Symmetric Dirichlet concentration. 1.0 = uniform over the simplex.
    #[serde(default = "default_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    /// Evaluate trials on the rayon pool. Results are identical either way.
    #[serde(default)]
    pub parallel: bool,
}

fn default_dirichlet_alpha() -> f64 {
    1.0
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            portfolio_trials:  1000,
            draws_per_channel: 1000,
            dirichlet_alpha:   default_dirichlet_alpha(),
            parallel:          false,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.portfolio_trials == 0 {
            return Err(SimError::InvalidTrialCount { count: self.portfolio_trials });
        }
        if self.draws_per_channel == 0 {
            return Err(SimError::InvalidDrawCount { count: self.draws_per_channel });
        }
        if !(self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0) {
            return Err(SimError::InvalidParameters {
                channel: "*".into(),
                field: "dirichlet_alpha",
                value: self.dirichlet_alpha,
            });
        }
        Ok(())
    }
}

/// Settings for the standalone per-channel analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub total_budget: f64,
    pub draws_per_channel: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            total_budget:      50_000.0,
            draws_per_channel: 10_000,
        }
    }
}

impl AnalysisConfig {
    /// Each channel is analysed with an even share of the total budget.
    pub fn budget_per_channel(&self, table: &ChannelTable) -> f64 {
        self.total_budget / table.len() as f64
    }
}

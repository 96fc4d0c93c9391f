//! Per-channel risk analysis: summary statistics over simulation draws.
//!
//! Produces the plain numbers a report needs (mean/median ROI, probability
//! of loss, value-at-risk, expected profit) so presentation code never has
//! to re-derive anything from simulation internals.

use crate::{
    channel_simulator::{simulate_channel, SimulationDraw},
    config::{AnalysisConfig, ChannelTable},
    error::{SimError, SimResult},
    rng::RngBank,
    stats,
    types::{ChannelName, Money},
};
use serde::{Deserialize, Serialize};

/// Tail probability used for value-at-risk.
pub const VAR_QUANTILE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel:               ChannelName,
    pub budget:                Money,
    pub draw_count:            usize,
    pub mean_roi:              f64,
    pub median_roi:            f64,
    pub roi_stddev:            f64,
    /// Percent of draws with profit < 0.
    pub probability_of_loss:   f64,
    /// Percent of draws with profit >= 0.
    pub probability_of_profit: f64,
    /// 5th percentile of profit.
    pub value_at_risk_5:       Money,
    pub expected_profit:       Money,
    pub mean_conversions:      f64,
    pub mean_revenue:          Money,
}

impl ChannelSummary {
    pub fn from_draws(channel: &str, budget: Money, draws: &[SimulationDraw]) -> SimResult<Self> {
        if draws.is_empty() {
            return Err(SimError::InvalidDrawCount { count: 0 });
        }

        let rois: Vec<f64> = draws.iter().map(|d| d.roi_percent).collect();
        let profits: Vec<f64> = draws.iter().map(|d| d.profit).collect();
        let conversions: Vec<f64> = draws.iter().map(|d| d.conversions as f64).collect();
        let revenues: Vec<f64> = draws.iter().map(|d| d.revenue).collect();

        Ok(Self {
            channel: channel.to_string(),
            budget,
            draw_count: draws.len(),
            mean_roi: stats::mean(&rois),
            median_roi: stats::median(&rois),
            roi_stddev: stats::sample_std(&rois),
            probability_of_loss: stats::percent_where(&profits, |p| p < 0.0),
            probability_of_profit: stats::percent_where(&profits, |p| p >= 0.0),
            value_at_risk_5: stats::quantile(&profits, VAR_QUANTILE),
            expected_profit: stats::mean(&profits),
            mean_conversions: stats::mean(&conversions),
            mean_revenue: stats::mean(&revenues),
        })
    }
}

/// Simulate every channel at an even share of the analysis budget.
///
/// Channel `i` draws from the bank's channel-analysis stream `i`.
pub fn analyze_channels(
    table: &ChannelTable,
    config: &AnalysisConfig,
    bank: &RngBank,
) -> SimResult<Vec<ChannelSummary>> {
    let budget = config.budget_per_channel(table);

    table
        .channels()
        .iter()
        .enumerate()
        .map(|(i, params)| -> SimResult<ChannelSummary> {
            let mut rng = bank.for_channel_analysis(i);
            let draws = simulate_channel(params, budget, config.draws_per_channel, &mut rng)?;
            let summary = ChannelSummary::from_draws(&params.name, budget, &draws)?;
            log::info!(
                "analysis: channel={} mean_roi={:.2}% p_loss={:.1}% var5={:.2}",
                summary.channel,
                summary.mean_roi,
                summary.probability_of_loss,
                summary.value_at_risk_5
            );
            Ok(summary)
        })
        .collect()
}

//! Channel simulator: Monte Carlo draws of one channel's performance.
//!
//! Per draw:
//!   1. Sample cpc, ctr, conversion rate and ticket from normal distributions
//!   2. Clamp each sample into its valid range
//!   3. Derive clicks, impressions, conversions, revenue, profit and ROI
//!
//! Draws are independent; derived fields depend only on the draw's own samples.

use crate::{
    config::{ChannelParams, ChannelTable},
    error::{SimError, SimResult},
    rng::SimRng,
    types::Money,
};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

pub const MIN_CPC: f64 = 0.01;
pub const MIN_RATE: f64 = 0.001;
pub const MAX_RATE: f64 = 1.0;
pub const MIN_TICKET: f64 = 10.0;

/// Upper bound on clicks per draw; keeps the integer cast and revenue finite.
pub const MAX_CLICKS: f64 = (1u64 << 53) as f64;

// ── Public types ─────────────────────────────────────────────────────────────

/// One Monte Carlo sample for one channel at one budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDraw {
    pub cpc:             f64,
    pub ctr:             f64,
    pub conversion_rate: f64,
    pub ticket:          f64,
    pub clicks:          u64,
    /// Informational only; nothing downstream reads it.
    pub impressions:     u64,
    pub conversions:     u64,
    pub revenue:         Money,
    pub profit:          Money,
    pub roi_percent:     f64,
}

impl SimulationDraw {
    /// Derive every dependent field from the sampled drivers.
    fn derive(budget: Money, cpc: f64, ctr: f64, conversion_rate: f64, ticket: f64) -> Self {
        let clicks = (budget / cpc).floor().min(MAX_CLICKS) as u64;
        let impressions = (clicks as f64 / ctr).floor() as u64;
        let conversions = (clicks as f64 * conversion_rate).floor() as u64;
        let revenue = conversions as f64 * ticket;
        let profit = revenue - budget;
        let roi_percent = if budget > 0.0 { profit / budget * 100.0 } else { 0.0 };

        Self {
            cpc,
            ctr,
            conversion_rate,
            ticket,
            clicks,
            impressions,
            conversions,
            revenue,
            profit,
            roi_percent,
        }
    }
}

/// The four driver distributions of one channel, built once per run.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSampler {
    cpc:        Normal<f64>,
    ctr:        Normal<f64>,
    conversion: Normal<f64>,
    ticket:     Normal<f64>,
}

impl ChannelSampler {
    pub fn new(params: &ChannelParams) -> SimResult<Self> {
        params.validate()?;

        let normal = |field: &'static str, mean: f64, stddev: f64| {
            Normal::new(mean, stddev).map_err(|_| SimError::InvalidParameters {
                channel: params.name.clone(),
                field,
                value: stddev,
            })
        };

        Ok(Self {
            cpc:        normal("cpc_stddev", params.cpc_mean, params.cpc_stddev)?,
            ctr:        normal("ctr_stddev", params.ctr_mean, params.ctr_stddev)?,
            conversion: normal("conversion_stddev", params.conversion_mean, params.conversion_stddev)?,
            ticket:     normal("ticket_stddev", params.ticket_mean, params.ticket_stddev)?,
        })
    }

    /// Produce one draw. Sampling order is fixed: cpc, ctr, conversion, ticket.
    pub fn draw(&self, budget: Money, rng: &mut SimRng) -> SimulationDraw {
        let cpc = self.cpc.sample(rng).max(MIN_CPC);
        let ctr = self.ctr.sample(rng).clamp(MIN_RATE, MAX_RATE);
        let conversion_rate = self.conversion.sample(rng).clamp(MIN_RATE, MAX_RATE);
        let ticket = self.ticket.sample(rng).max(MIN_TICKET);

        SimulationDraw::derive(budget, cpc, ctr, conversion_rate, ticket)
    }

    pub fn draw_batch(&self, budget: Money, draw_count: usize, rng: &mut SimRng) -> Vec<SimulationDraw> {
        (0..draw_count).map(|_| self.draw(budget, rng)).collect()
    }
}

/// Aggregates of one channel's draws as consumed by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawAggregate {
    pub mean_roi:      f64,
    pub mean_profit:   Money,
    pub profit_stddev: Money,
}

impl DrawAggregate {
    pub fn from_draws(draws: &[SimulationDraw]) -> Self {
        let rois: Vec<f64> = draws.iter().map(|d| d.roi_percent).collect();
        let profits: Vec<f64> = draws.iter().map(|d| d.profit).collect();
        Self {
            mean_roi:      crate::stats::mean(&rois),
            mean_profit:   crate::stats::mean(&profits),
            profit_stddev: crate::stats::sample_std(&profits),
        }
    }
}

// ── Entry points ─────────────────────────────────────────────────────────────

pub fn validate_budget(budget: Money) -> SimResult<()> {
    if budget.is_finite() && budget >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidBudget { budget })
    }
}

/// Simulate `draw_count` independent draws of `channel_name` at `budget`.
pub fn simulate(
    channel_name: &str,
    budget: Money,
    table: &ChannelTable,
    draw_count: usize,
    rng: &mut SimRng,
) -> SimResult<Vec<SimulationDraw>> {
    let params = table.get(channel_name)?;
    simulate_channel(params, budget, draw_count, rng)
}

/// As [`simulate`], for parameters already looked up.
pub fn simulate_channel(
    params: &ChannelParams,
    budget: Money,
    draw_count: usize,
    rng: &mut SimRng,
) -> SimResult<Vec<SimulationDraw>> {
    validate_budget(budget)?;
    if draw_count == 0 {
        return Err(SimError::InvalidDrawCount { count: draw_count });
    }

    let sampler = ChannelSampler::new(params)?;
    let draws = sampler.draw_batch(budget, draw_count, rng);

    log::debug!(
        "simulate: channel={} budget={budget:.2} draws={draw_count} stream={}",
        params.name,
        rng.name
    );

    Ok(draws)
}

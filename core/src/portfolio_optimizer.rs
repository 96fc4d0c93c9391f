//! Portfolio optimizer: random search over budget allocations.
//!
//! This module:
//!   1. Draws allocation vectors from a symmetric Dirichlet distribution
//!   2. Scores each allocation by simulating every funded channel
//!   3. Selects the best candidate by expected ROI and by sharpe ratio
//!
//! Randomness: allocations come from the bank's allocation stream; each
//! trial is then evaluated on its own stream, so sequential and parallel
//! evaluation produce identical candidates.

use crate::{
    channel_simulator::{validate_budget, ChannelSampler, DrawAggregate},
    config::{ChannelTable, OptimizerConfig},
    error::{SimError, SimResult},
    rng::{RngBank, SimRng},
    types::{ChannelName, Money, Weight},
};
use rand_distr::{Distribution, Gamma};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCandidate {
    /// Position in generation order.
    pub trial:           usize,
    /// Per-channel weights in table order; sums to 1.
    pub allocation:      Vec<Weight>,
    pub expected_roi:    f64,
    pub expected_profit: Money,
    /// Allocation-weighted standard deviation of profit.
    pub risk:            Money,
    pub sharpe_ratio:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAllocation {
    pub channel: ChannelName,
    pub weight:  Weight,
    pub budget:  Money,
}

impl PortfolioCandidate {
    /// Weight and budget of every channel, in table order.
    pub fn channel_budgets(&self, total_budget: Money, table: &ChannelTable) -> Vec<ChannelAllocation> {
        table
            .names()
            .zip(&self.allocation)
            .map(|(name, &weight)| ChannelAllocation {
                channel: name.to_string(),
                weight,
                budget: total_budget * weight,
            })
            .collect()
    }

    /// Channels whose weight exceeds `threshold` (e.g. 0.01 for 1%).
    pub fn significant_allocations(
        &self,
        total_budget: Money,
        table: &ChannelTable,
        threshold: Weight,
    ) -> Vec<ChannelAllocation> {
        self.channel_budgets(total_budget, table)
            .into_iter()
            .filter(|a| a.weight > threshold)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub total_budget:   Money,
    pub candidates:     Vec<PortfolioCandidate>,
    /// Index into `candidates`.
    pub best_by_roi:    usize,
    /// Index into `candidates`.
    pub best_by_sharpe: usize,
}

impl OptimizationResult {
    /// `None` only for a hand-built result with no candidates.
    pub fn best_roi(&self) -> Option<&PortfolioCandidate> {
        self.candidates.get(self.best_by_roi)
    }

    pub fn best_sharpe(&self) -> Option<&PortfolioCandidate> {
        self.candidates.get(self.best_by_sharpe)
    }
}

// ── Allocation sampling ──────────────────────────────────────────────────────

/// Symmetric Dirichlet sampler over `channel_count` channels.
///
/// Implemented as normalised Gamma(alpha, 1) draws, which also covers the
/// single-channel case (always `[1.0]`).
pub struct AllocationSampler {
    gamma:         Gamma<f64>,
    channel_count: usize,
}

impl AllocationSampler {
    pub fn new(channel_count: usize, alpha: f64) -> SimResult<Self> {
        if channel_count == 0 {
            return Err(SimError::EmptyChannelTable);
        }
        let gamma = Gamma::new(alpha, 1.0).map_err(|_| SimError::InvalidParameters {
            channel: "*".into(),
            field: "dirichlet_alpha",
            value: alpha,
        })?;
        Ok(Self { gamma, channel_count })
    }

    pub fn sample(&self, rng: &mut SimRng) -> Vec<Weight> {
        let raw: Vec<f64> = (0..self.channel_count).map(|_| self.gamma.sample(rng)).collect();
        let sum: f64 = raw.iter().sum();
        if !(sum > 0.0 && sum.is_finite()) {
            // All-zero draw (only reachable with tiny alpha); fall back to uniform.
            return vec![1.0 / self.channel_count as f64; self.channel_count];
        }
        raw.iter().map(|g| g / sum).collect()
    }
}

// ── Optimizer ────────────────────────────────────────────────────────────────

/// Score one allocation vector. Channels with no budget are skipped.
fn evaluate_allocation(
    trial: usize,
    allocation: Vec<Weight>,
    total_budget: Money,
    samplers: &[ChannelSampler],
    draws_per_channel: usize,
    rng: &mut SimRng,
) -> PortfolioCandidate {
    let mut expected_roi = 0.0;
    let mut expected_profit = 0.0;
    let mut risk = 0.0;

    for (sampler, &weight) in samplers.iter().zip(&allocation) {
        let channel_budget = total_budget * weight;
        if channel_budget <= 0.0 {
            continue;
        }

        let draws = sampler.draw_batch(channel_budget, draws_per_channel, rng);
        let agg = DrawAggregate::from_draws(&draws);

        expected_roi += agg.mean_roi * weight;
        // Simulated profit already reflects the channel's budget share.
        expected_profit += agg.mean_profit;
        risk += agg.profit_stddev * weight;
    }

    let sharpe_ratio = if risk > 0.0 { expected_profit / risk } else { 0.0 };

    log::debug!(
        "trial={trial} roi={expected_roi:.2} profit={expected_profit:.2} risk={risk:.2} sharpe={sharpe_ratio:.4}"
    );

    PortfolioCandidate {
        trial,
        allocation,
        expected_roi,
        expected_profit,
        risk,
        sharpe_ratio,
    }
}

/// Index of the first candidate with the maximal `key`. NaN keys are
/// skipped; if every key is NaN the first candidate is returned.
fn first_max_by(candidates: &[PortfolioCandidate], key: impl Fn(&PortfolioCandidate) -> f64) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let k = key(candidate);
        if k.is_nan() {
            continue;
        }
        match best {
            Some((_, best_key)) if k <= best_key => {}
            _ => best = Some((i, k)),
        }
    }
    best.map_or(0, |(i, _)| i)
}

/// Search random allocations of `total_budget` across every channel in `table`.
pub fn optimize(
    total_budget: Money,
    table: &ChannelTable,
    config: &OptimizerConfig,
    bank: &RngBank,
) -> SimResult<OptimizationResult> {
    validate_budget(total_budget)?;
    config.validate()?;

    let samplers = table
        .channels()
        .iter()
        .map(ChannelSampler::new)
        .collect::<SimResult<Vec<_>>>()?;

    let allocation_sampler = AllocationSampler::new(table.len(), config.dirichlet_alpha)?;
    let mut alloc_rng = bank.allocation_stream();
    let allocations: Vec<Vec<Weight>> = (0..config.portfolio_trials)
        .map(|_| allocation_sampler.sample(&mut alloc_rng))
        .collect();

    log::info!(
        "optimize: budget={total_budget:.2} channels={} trials={} draws_per_channel={} parallel={}",
        table.len(),
        config.portfolio_trials,
        config.draws_per_channel,
        config.parallel
    );

    let evaluate = |(trial, allocation): (usize, Vec<Weight>)| {
        let mut rng = bank.for_trial(trial);
        evaluate_allocation(
            trial,
            allocation,
            total_budget,
            &samplers,
            config.draws_per_channel,
            &mut rng,
        )
    };

    let candidates: Vec<PortfolioCandidate> = if config.parallel {
        allocations.into_par_iter().enumerate().map(evaluate).collect()
    } else {
        allocations.into_iter().enumerate().map(evaluate).collect()
    };

    let best_by_roi = first_max_by(&candidates, |c| c.expected_roi);
    let best_by_sharpe = first_max_by(&candidates, |c| c.sharpe_ratio);

    log::info!(
        "optimize: best_roi trial={} ({:.2}%), best_sharpe trial={} ({:.4})",
        best_by_roi,
        candidates[best_by_roi].expected_roi,
        best_by_sharpe,
        candidates[best_by_sharpe].sharpe_ratio
    );

    Ok(OptimizationResult {
        total_budget,
        candidates,
        best_by_roi,
        best_by_sharpe,
    })
}

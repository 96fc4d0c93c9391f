//! roi-runner: headless Monte Carlo run over the marketing channel table.
//!
//! Usage:
//!   roi-runner --seed 12345 --budget 50000 --trials 1000 --draws 1000
//!   roi-runner --channels channels.json --parallel --json

use anyhow::Result;
use channel_sim_core::{
    analysis::{analyze_channels, ChannelSummary},
    config::{AnalysisConfig, ChannelTable, OptimizerConfig},
    portfolio_optimizer::{optimize, ChannelAllocation, OptimizationResult, PortfolioCandidate},
    rng::RngBank,
};
use std::env;

/// Channels at or below this weight are left out of allocation listings.
const DISPLAY_WEIGHT_THRESHOLD: f64 = 0.01;

#[derive(serde::Serialize)]
struct PortfolioReport {
    trial:           usize,
    expected_roi:    f64,
    expected_profit: f64,
    risk:            f64,
    sharpe_ratio:    f64,
    allocations:     Vec<ChannelAllocation>,
}

#[derive(serde::Serialize)]
struct RunReport {
    run_id:          uuid::Uuid,
    generated_at:    chrono::DateTime<chrono::Utc>,
    seed:            u64,
    total_budget:    f64,
    channels:        Vec<ChannelSummary>,
    candidate_count: usize,
    best_roi:        PortfolioReport,
    best_sharpe:     PortfolioReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let budget = parse_arg(&args, "--budget", AnalysisConfig::default().total_budget);
    let trials = parse_arg(&args, "--trials", OptimizerConfig::default().portfolio_trials);
    let draws = parse_arg(&args, "--draws", OptimizerConfig::default().draws_per_channel);
    let analysis_draws = parse_arg(
        &args,
        "--analysis-draws",
        AnalysisConfig::default().draws_per_channel,
    );
    let parallel = args.iter().any(|a| a == "--parallel");
    let json_mode = args.iter().any(|a| a == "--json");
    let channels_path = args
        .windows(2)
        .find(|w| w[0] == "--channels")
        .map(|w| w[1].as_str());

    let table = match channels_path {
        Some(path) => ChannelTable::load(path)?,
        None => ChannelTable::standard(),
    };

    if !json_mode {
        println!("Marketing channel ROI: roi-runner");
        println!("  seed:      {seed}");
        println!("  budget:    {budget:.2}");
        println!("  channels:  {}", table.len());
        println!("  trials:    {trials}");
        println!("  draws:     {draws} per channel per trial");
        println!();
    }

    let bank = RngBank::new(seed);

    // 1. Individual channel analysis
    let analysis_config = AnalysisConfig {
        total_budget: budget,
        draws_per_channel: analysis_draws,
    };
    let summaries = analyze_channels(&table, &analysis_config, &bank)?;

    // 2. Portfolio optimization
    let optimizer_config = OptimizerConfig {
        portfolio_trials: trials,
        draws_per_channel: draws,
        parallel,
        ..OptimizerConfig::default()
    };
    let result = optimize(budget, &table, &optimizer_config, &bank)?;
    let best_roi = result
        .best_roi()
        .ok_or_else(|| anyhow::anyhow!("optimizer returned no portfolio candidates"))?;
    let best_sharpe = result
        .best_sharpe()
        .ok_or_else(|| anyhow::anyhow!("optimizer returned no portfolio candidates"))?;

    if json_mode {
        let report = RunReport {
            run_id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            seed,
            total_budget: budget,
            channels: summaries,
            candidate_count: result.candidates.len(),
            best_roi: portfolio_report(best_roi, &result, &table),
            best_sharpe: portfolio_report(best_sharpe, &result, &table),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_channel_summaries(&summaries);
        print_portfolio("BEST ROI PORTFOLIO", best_roi, &result, &table);
        print_portfolio("BEST SHARPE PORTFOLIO", best_sharpe, &result, &table);
        print_comparison(result.candidates.len(), best_roi, best_sharpe);
    }

    Ok(())
}

fn portfolio_report(
    candidate: &PortfolioCandidate,
    result: &OptimizationResult,
    table: &ChannelTable,
) -> PortfolioReport {
    PortfolioReport {
        trial: candidate.trial,
        expected_roi: candidate.expected_roi,
        expected_profit: candidate.expected_profit,
        risk: candidate.risk,
        sharpe_ratio: candidate.sharpe_ratio,
        allocations: candidate.significant_allocations(
            result.total_budget,
            table,
            DISPLAY_WEIGHT_THRESHOLD,
        ),
    }
}

fn print_channel_summaries(summaries: &[ChannelSummary]) {
    println!("=== CHANNEL ANALYSIS ===");
    for s in summaries {
        println!();
        println!("  {} (budget {:.2}, {} draws)", s.channel, s.budget, s.draw_count);
        println!("    mean ROI:          {:.2}%", s.mean_roi);
        println!("    median ROI:        {:.2}%", s.median_roi);
        println!("    ROI std dev:       {:.2}%", s.roi_stddev);
        println!("    P(loss):           {:.1}%", s.probability_of_loss);
        println!("    value at risk 5%:  {:.2}", s.value_at_risk_5);
        println!("    expected profit:   {:.2}", s.expected_profit);
    }
    println!();
}

fn print_portfolio(
    title: &str,
    candidate: &PortfolioCandidate,
    result: &OptimizationResult,
    table: &ChannelTable,
) {
    println!("=== {title} (trial {}) ===", candidate.trial);
    println!(
        "  ROI: {:.1}% | Profit: {:.2} | Risk: {:.2} | Sharpe: {:.4}",
        candidate.expected_roi, candidate.expected_profit, candidate.risk, candidate.sharpe_ratio
    );
    for a in candidate.significant_allocations(result.total_budget, table, DISPLAY_WEIGHT_THRESHOLD) {
        println!("    {:<18} {:>5.1}%  {:>12.2}", a.channel, a.weight * 100.0, a.budget);
    }
    println!();
}

fn print_comparison(portfolio_count: usize, best_roi: &PortfolioCandidate, best_sharpe: &PortfolioCandidate) {
    println!("=== STRATEGY COMPARISON ({portfolio_count} portfolios) ===");
    for (label, c) in [("Best ROI", best_roi), ("Best Sharpe", best_sharpe)] {
        println!("  {label}:");
        println!("    - expected ROI:    {:.2}%", c.expected_roi);
        println!("    - expected profit: {:.2}", c.expected_profit);
        println!("    - risk:            {:.2}", c.risk);
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

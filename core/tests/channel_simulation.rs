use channel_sim_core::{
    channel_simulator::{simulate, simulate_channel, ChannelSampler, MAX_CLICKS, MAX_RATE, MIN_CPC, MIN_RATE, MIN_TICKET},
    config::{ChannelParams, ChannelTable},
    error::SimError,
    rng::SimRng,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn zero_variance_channel() -> ChannelParams {
    ChannelParams {
        name: "Fixed".into(),
        cpc_mean: 2.0,
        cpc_stddev: 0.0,
        ctr_mean: 0.04,
        ctr_stddev: 0.0,
        conversion_mean: 0.1,
        conversion_stddev: 0.0,
        ticket_mean: 100.0,
        ticket_stddev: 0.0,
    }
}

/// Means sit next to the clamp bounds and stddevs dwarf them, so most raw
/// samples land outside the valid range.
fn extreme_channel() -> ChannelParams {
    ChannelParams {
        name: "Wild".into(),
        cpc_mean: 0.02,
        cpc_stddev: 5.0,
        ctr_mean: 0.5,
        ctr_stddev: 10.0,
        conversion_mean: 0.5,
        conversion_stddev: 10.0,
        ticket_mean: 11.0,
        ticket_stddev: 500.0,
    }
}

fn table_of(channel: ChannelParams) -> ChannelTable {
    ChannelTable::new(vec![channel]).expect("valid table")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn returns_exactly_draw_count_draws() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(42);

    for n in [1usize, 2, 17, 1000] {
        let draws = simulate("Facebook Ads", 10_000.0, &table, n, &mut rng).unwrap();
        assert_eq!(draws.len(), n, "Expected {n} draws, got {}", draws.len());
    }
}

#[test]
fn samples_are_clamped_into_valid_ranges() {
    let table = table_of(extreme_channel());
    let mut rng = SimRng::seeded(7);

    let draws = simulate("Wild", 5_000.0, &table, 20_000, &mut rng).unwrap();

    for d in &draws {
        assert!(d.cpc >= MIN_CPC, "cpc={} below floor", d.cpc);
        assert!(d.ctr >= MIN_RATE && d.ctr <= MAX_RATE, "ctr={} out of range", d.ctr);
        assert!(
            d.conversion_rate >= MIN_RATE && d.conversion_rate <= MAX_RATE,
            "conversion_rate={} out of range",
            d.conversion_rate
        );
        assert!(d.ticket >= MIN_TICKET, "ticket={} below floor", d.ticket);
    }

    // The bounds must actually have been hit, otherwise the test proves nothing.
    assert!(draws.iter().any(|d| d.cpc == MIN_CPC));
    assert!(draws.iter().any(|d| d.ctr == MIN_RATE));
    assert!(draws.iter().any(|d| d.conversion_rate == MAX_RATE));
    assert!(draws.iter().any(|d| d.ticket == MIN_TICKET));
}

#[test]
fn derived_fields_are_consistent_with_samples() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(99);
    let budget = 7_500.0;

    for channel in ["Google Ads", "Email Marketing", "LinkedIn Ads"] {
        let draws = simulate(channel, budget, &table, 2_000, &mut rng).unwrap();
        for d in &draws {
            assert_eq!(d.clicks, (budget / d.cpc).floor() as u64);
            assert_eq!(d.impressions, (d.clicks as f64 / d.ctr).floor() as u64);
            assert_eq!(d.conversions, (d.clicks as f64 * d.conversion_rate).floor() as u64);
            assert_eq!(d.revenue, d.conversions as f64 * d.ticket);
            assert_eq!(d.profit, d.revenue - budget);
            assert_eq!(d.roi_percent, d.profit / budget * 100.0);
        }
    }
}

/// stddev = 0 collapses every distribution to its mean.
#[test]
fn zero_variance_channel_is_fully_deterministic() {
    let table = table_of(zero_variance_channel());
    let mut rng = SimRng::seeded(1);

    let draws = simulate("Fixed", 1000.0, &table, 250, &mut rng).unwrap();

    for d in &draws {
        assert_eq!(d.cpc, 2.0);
        assert_eq!(d.clicks, 500);
        assert_eq!(d.conversions, 50);
        assert_eq!(d.revenue, 5000.0);
        assert_eq!(d.profit, 4000.0);
        assert_eq!(d.roi_percent, 400.0);
    }
    assert!(draws.windows(2).all(|w| w[0] == w[1]), "Draws should be identical");
}

#[test]
fn zero_budget_yields_zero_metrics_not_nan() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(5);

    let draws = simulate("Instagram Ads", 0.0, &table, 500, &mut rng).unwrap();

    for d in &draws {
        assert_eq!(d.clicks, 0);
        assert_eq!(d.impressions, 0);
        assert_eq!(d.conversions, 0);
        assert_eq!(d.revenue, 0.0);
        assert_eq!(d.profit, 0.0);
        assert_eq!(d.roi_percent, 0.0);
        assert!(!d.roi_percent.is_nan());
    }
}

#[test]
fn unknown_channel_is_rejected() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(5);

    let err = simulate("TikTok Ads", 1000.0, &table, 10, &mut rng).unwrap_err();
    assert!(
        matches!(err, SimError::InvalidChannel { ref name } if name == "TikTok Ads"),
        "Expected InvalidChannel, got {err:?}"
    );
}

#[test]
fn negative_or_non_finite_budget_is_rejected() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(5);

    for budget in [-0.01, -1000.0, f64::NAN, f64::INFINITY] {
        let err = simulate("Google Ads", budget, &table, 10, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidBudget { .. }), "budget={budget}: got {err:?}");
    }
}

/// Parameters that never went through `ChannelTable::new` are still
/// checked before any sampling happens.
#[test]
fn unvalidated_parameters_are_rejected_before_sampling() {
    let mut rng = SimRng::seeded(5);

    let mut nan_ctr = zero_variance_channel();
    nan_ctr.ctr_mean = f64::NAN;
    let err = simulate_channel(&nan_ctr, 1000.0, 10, &mut rng).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameters { field: "ctr_mean", .. }));

    let mut negative_conversion = zero_variance_channel();
    negative_conversion.conversion_mean = -0.1;
    let err = simulate_channel(&negative_conversion, 1000.0, 10, &mut rng).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameters { field: "conversion_mean", .. }));

    let mut infinite_ticket = zero_variance_channel();
    infinite_ticket.ticket_stddev = f64::INFINITY;
    assert!(matches!(
        ChannelSampler::new(&infinite_ticket),
        Err(SimError::InvalidParameters { field: "ticket_stddev", .. })
    ));
}

#[test]
fn enormous_budget_saturates_clicks() {
    let table = table_of(zero_variance_channel());
    let mut rng = SimRng::seeded(9);

    let draws = simulate("Fixed", 1e300, &table, 3, &mut rng).unwrap();
    for d in &draws {
        assert_eq!(d.clicks as f64, MAX_CLICKS);
        assert!(d.revenue.is_finite());
        assert!(d.roi_percent.is_finite());
    }
}

#[test]
fn zero_draw_count_is_rejected() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(5);

    let err = simulate("Google Ads", 1000.0, &table, 0, &mut rng).unwrap_err();
    assert!(matches!(err, SimError::InvalidDrawCount { count: 0 }));
}

/// Email has a tiny cpc and high conversion; it should be clearly profitable.
#[test]
fn standard_email_channel_is_profitable_on_average() {
    let table = ChannelTable::standard();
    let mut rng = SimRng::seeded(2024);

    let draws = simulate("Email Marketing", 10_000.0, &table, 5_000, &mut rng).unwrap();
    let mean_profit = draws.iter().map(|d| d.profit).sum::<f64>() / draws.len() as f64;

    assert!(mean_profit > 0.0, "Expected positive mean profit, got {mean_profit}");
}

//! End-to-end tests: outcome file → config → service → status reporter.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::io::Write;

use monte_carlo_engine::config::load_config_from_string;
use monte_carlo_engine::ingest::load_outcomes;
use monte_carlo_engine::reporting::{StatusKind, StatusReporter};
use monte_carlo_engine::simulation::RunnerConfig;
use monte_carlo_engine::{ErrorCode, SimulationEvent, SimulationRequest, SimulationService};

const TRADES_CSV: &str = "\
# strategy export
balance=10000
ticket,profit
1,250
2,-120
3,80
4,-300
5,410
6,-60
7,150
8,-90
9,220
10,-40
";

fn write_trades() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(TRADES_CSV.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_file_to_metrics() {
    let file = write_trades();
    let loaded = load_outcomes(file.path()).unwrap();
    assert_eq!(loaded.outcomes.len(), 10);

    let config = load_config_from_string(
        r"
simulation:
  num_simulations: 200
engine:
  seed: 11
",
    )
    .unwrap();

    let request = config
        .simulation
        .to_request(loaded.outcomes, loaded.initial_balance.unwrap());
    let service = SimulationService::new(config.engine.clone());

    let mut reporter = StatusReporter::new();
    reporter.set_simulating(request.num_simulations);
    let mut handle = service.submit(request);

    let Some(SimulationEvent::Completed(metrics)) = reporter.follow(&mut handle).await else {
        panic!("run should complete");
    };

    assert_eq!(reporter.snapshot().kind, StatusKind::Complete);
    assert_eq!(reporter.snapshot().progress_percent, 100);

    assert_eq!(metrics.num_simulations, 200);
    assert_eq!(metrics.total_trades, 10);
    assert_eq!(metrics.max_x, 10);
    // Net +500 on 10,000 regardless of order
    assert!((metrics.median_return - 5.0).abs() < 1e-9);
    assert!((metrics.expectancy_per_trade - 1050.0).abs() < 1e-9);
    assert_eq!(metrics.median_curve.len(), 11);
    assert_eq!(metrics.sample_curves.len(), 5);
    assert_eq!(metrics.risk_of_ruin, 0.0);
}

#[tokio::test]
async fn test_mt5_deals_report_to_metrics() {
    let rows = [
        "Trade History Report",
        "Deals",
        "Time\tDeal\tSymbol\tType\tDirection\tVolume\tPrice\tOrder\tCommission\tSwap\tProfit\tBalance\tComment",
        "2024.03.01 08:00:00\t1\t\tbalance\t\t\t\t\t0.00\t0.00\t20 000.00\t20 000.00\tdeposit",
        "2024.03.01 09:00:00\t2\tEURUSD\tbuy\tin\t1.00\t1.0840\t2\t0.00\t0.00\t0.00\t20 000.00\t",
        "2024.03.01 15:00:00\t3\tEURUSD\tsell\tout\t1.00\t1.0870\t3\t0.00\t0.00\t300.00\t20 300.00\t",
        "2024.03.02 09:00:00\t4\tUSDJPY\tsell\tin\t1.00\t150.10\t4\t0.00\t0.00\t0.00\t20 300.00\t",
        "2024.03.02 11:00:00\t5\tUSDJPY\tbuy\tout\t1.00\t150.25\t5\t0.00\t0.00\t-100.00\t20 200.00\t",
        "2024.03.03 09:00:00\t6\tXAUUSD\tbuy\tin\t0.10\t2050.00\t6\t0.00\t0.00\t0.00\t20 200.00\t",
        "2024.03.03 13:00:00\t7\tXAUUSD\tsell\tout\t0.10\t2070.00\t7\t0.00\t0.00\t200.00\t20 400.00\t",
        "\t\t\t\t\t\t\t\t0.00\t0.00\t400.00\t20 400.00\t",
    ];
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(rows.join("\n").as_bytes()).unwrap();

    let loaded = load_outcomes(file.path()).unwrap();
    assert_eq!(loaded.outcomes, vec![300.0, -100.0, 200.0]);
    assert_eq!(loaded.initial_balance, Some(20_000.0));

    let request = SimulationRequest::new(loaded.outcomes, loaded.initial_balance.unwrap())
        .with_simulations(50);
    let service = SimulationService::new(RunnerConfig::default().with_seed(3));
    let events = service.submit(request).collect_events().await;

    let Some(SimulationEvent::Completed(metrics)) = events.last() else {
        panic!("run should complete");
    };
    assert_eq!(metrics.total_trades, 3);
    // Net +400 on 20,000 regardless of order
    assert!((metrics.median_return - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_seeded_service_runs_match() {
    let outcomes = vec![250.0, -120.0, 80.0, -300.0, 410.0, -60.0];
    let request = SimulationRequest::new(outcomes, 5_000.0).with_simulations(100);

    let mut results = Vec::new();
    for _ in 0..2 {
        let service = SimulationService::new(RunnerConfig::default().with_seed(99));
        let events = service.submit(request.clone()).collect_events().await;
        let Some(SimulationEvent::Completed(metrics)) = events.into_iter().last() else {
            panic!("run should complete");
        };
        results.push(metrics);
    }

    assert_eq!(results[0], results[1]);
}

#[tokio::test]
async fn test_parallel_service_matches_sequential_shape() {
    let outcomes: Vec<f64> = (0..1200)
        .map(|i| if i % 3 == 0 { -45.0 } else { 30.0 })
        .collect();
    let request = SimulationRequest::new(outcomes, 10_000.0).with_simulations(64);
    let service = SimulationService::new(RunnerConfig::default().with_seed(1).with_parallel(16));

    let events = service.submit(request).collect_events().await;

    let progress: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SimulationEvent::Progress(p) => Some(p.current),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![16, 32, 48, 64]);

    let Some(SimulationEvent::Completed(metrics)) = events.last() else {
        panic!("run should complete");
    };
    // 1201 points with step 2 keeps indices 0, 2, ..., 1200
    assert_eq!(metrics.median_curve.len(), 601);
    assert!(metrics.sample_curves.iter().all(|c| c.len() == 601));
}

#[tokio::test]
async fn test_zero_simulations_rejected() {
    let service = SimulationService::new(RunnerConfig::default());
    let request = SimulationRequest::new(vec![1.0, 2.0], 100.0).with_simulations(0);

    let mut reporter = StatusReporter::new();
    let mut handle = service.submit(request);
    let terminal = reporter.follow(&mut handle).await;

    let Some(SimulationEvent::Failed { code, .. }) = terminal else {
        panic!("zero simulations should fail, got {terminal:?}");
    };
    assert_eq!(code, ErrorCode::InvalidSimulationCount);
    assert_eq!(reporter.snapshot().kind, StatusKind::Error);
    assert_eq!(
        reporter.snapshot().text,
        "Error: Number of simulations must be positive"
    );
}

#[tokio::test]
async fn test_metrics_json_contract() {
    let service = SimulationService::new(RunnerConfig::default().with_seed(4));
    let request = SimulationRequest::new(vec![100.0, -50.0, 200.0], 1_000.0).with_simulations(20);

    let events = service.submit(request).collect_events().await;
    let Some(SimulationEvent::Completed(metrics)) = events.last() else {
        panic!("run should complete");
    };

    let json = serde_json::to_value(metrics).unwrap();
    for key in [
        "medianReturn",
        "riskOfRuin",
        "valueAtRisk95",
        "expectancyPerTrade",
        "medianCurve",
        "confidenceCurve",
        "sampleCurves",
        "minY",
        "maxY",
        "maxX",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["medianCurve"][0]["x"], 0);
    assert_eq!(json["medianCurve"][0]["y"], 1000.0);
}

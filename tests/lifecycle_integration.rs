//! End-to-end diagnostic runs
//!
//! Drives listeners through a simulated moving-targets loop: a learner that
//! fits its targets exactly, and a master step that flips labels toward the
//! constraint between iterations.

use ajuste::{
    CallbackManager, DiagnosticConfig, DiagnosticError, DiagnosticListener, DiagnosticMode,
    DiagnosticReport, FeatureTable, GroupEncoding, IterationContext, LifecycleState, PanelSeries,
    Predictions, ProcessCallback, ProcessContext, Renderer, Source,
};
use approx::assert_relative_eq;
use ndarray::array;
use std::sync::{Arc, Mutex};

/// Six applicants: income, then a one-hot `race_*` block
fn applicants() -> FeatureTable {
    FeatureTable::new(
        vec!["income", "race_a", "race_b"],
        array![
            [12.0, 1.0, 0.0],
            [18.0, 1.0, 0.0],
            [25.0, 1.0, 0.0],
            [14.0, 0.0, 1.0],
            [22.0, 0.0, 1.0],
            [30.0, 0.0, 1.0],
        ],
    )
    .unwrap()
}

const TARGETS: [f64; 6] = [0.0, 1.0, 1.0, 0.0, 0.0, 1.0];

/// Adjusted targets per iteration; index 0 is the pretraining step
fn master_steps() -> Vec<Vec<f64>> {
    vec![
        TARGETS.to_vec(),
        vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0],
        vec![0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
    ]
}

/// Run the loop against any callback, with a learner that predicts its
/// current targets as probabilities
fn run(callback: &mut dyn ProcessCallback, features: &FeatureTable) -> ajuste::Result<()> {
    callback.on_process_start(&ProcessContext::new(features, &TARGETS))?;
    for (i, z) in master_steps().iter().enumerate() {
        let probs = Predictions::Values(z.iter().map(|&t| 0.2 + 0.6 * t).collect());
        let ctx = IterationContext::new(&probs).with_iteration(i);
        if i == 0 {
            callback.on_training_end(&ctx)?;
        } else {
            callback.on_training_end(&ctx.with_adjusted_targets(z))?;
        }
    }
    callback.on_process_end()
}

#[derive(Clone, Default)]
struct CollectingRenderer {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Renderer for CollectingRenderer {
    fn render(&mut self, report: &DiagnosticReport) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(report.to_string());
        }
    }
}

#[test]
fn balance_run_counts_every_row_per_source() {
    let features = applicants();
    let mut listener = DiagnosticListener::new(DiagnosticConfig::balance()).unwrap();
    run(&mut listener, &features).unwrap();

    let report = listener.report().unwrap();
    assert_eq!(report.mode, DiagnosticMode::Balance);
    assert_eq!(report.panels.len(), 3);
    assert_eq!(report.layout.num_rows, 1);

    for panel in &report.panels {
        let target_source = Source::target_for(panel.iteration);
        let targets: usize = panel.series.counts_for(target_source).values().sum();
        let predictions: usize = panel.series.counts_for(Source::Predictions).values().sum();
        assert_eq!(targets, 6);
        assert_eq!(predictions, 6);
    }

    let first = report.panel(0).unwrap();
    assert!(first.series.counts_for(Source::Adjusted).is_empty());
    assert_eq!(first.series.counts_for(Source::Targets)[&0], 3);

    let second = report.panel(1).unwrap();
    assert_eq!(second.series.counts_for(Source::Adjusted)[&1], 4);
    assert_eq!(second.series.counts_for(Source::Predictions)[&1], 4);
}

#[test]
fn fairness_classification_run_with_one_hot_groups() {
    let features = applicants();
    let config = DiagnosticConfig::fairness_classification("race", GroupEncoding::OneHot);
    let mut listener = DiagnosticListener::new(config).unwrap();
    run(&mut listener, &features).unwrap();

    let table = listener.table().unwrap();
    assert_eq!(table.group(), Some(&[0usize, 0, 0, 1, 1, 1][..]));
    assert_eq!(table.iterations().collect::<Vec<_>>(), vec![0, 1, 2]);

    let report = listener.report().unwrap();
    for panel in &report.panels {
        for group in 0..2 {
            let total: f64 = panel.series.shares_for(group).unwrap().values().sum();
            assert_relative_eq!(total, 100.0, epsilon = 1e-9);
        }
    }

    // Iteration 2 predicts [0, 1, 0] for group 0 and [0, 1, 1] for group 1
    let last = report.panel(2).unwrap();
    let group0 = last.series.shares_for(0).unwrap();
    let group1 = last.series.shares_for(1).unwrap();
    assert_relative_eq!(group0[&1], 100.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(group1[&1], 200.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn fairness_regression_run_summarizes_each_group() {
    let features = applicants();
    let config = DiagnosticConfig::fairness_regression("race", GroupEncoding::OneHot)
        .with_num_columns(2);
    let mut listener = DiagnosticListener::new(config).unwrap();
    run(&mut listener, &features).unwrap();

    let report = listener.report().unwrap();
    assert_eq!(report.layout.num_rows, 2);
    let panel = report.panel(1).unwrap();
    assert!(matches!(panel.series, PanelSeries::Spread(_)));

    let adjusted = panel.series.spread_for(1, Source::Adjusted).unwrap();
    assert_eq!(adjusted.values, vec![0.0, 1.0, 1.0]);
    let summary = adjusted.summary.unwrap();
    assert_relative_eq!(summary.median, 1.0);

    let predicted = panel.series.spread_for(1, Source::Predictions).unwrap();
    assert_eq!(predicted.values.len(), 3);
    assert_relative_eq!(predicted.summary.unwrap().max, 0.8, epsilon = 1e-12);
}

#[test]
fn listeners_share_a_run_through_the_manager() {
    let features = applicants();
    let renderer = CollectingRenderer::default();
    let seen = renderer.seen.clone();

    let mut manager = CallbackManager::new();
    manager.add(
        DiagnosticListener::new(DiagnosticConfig::balance())
            .unwrap()
            .with_renderer(renderer.clone()),
    );
    manager.add(
        DiagnosticListener::new(DiagnosticConfig::fairness_classification(
            "race",
            GroupEncoding::OneHot,
        ))
        .unwrap()
        .with_renderer(renderer),
    );

    manager
        .on_process_start(&ProcessContext::new(&features, &TARGETS))
        .unwrap();
    for (i, z) in master_steps().iter().enumerate() {
        let probs = Predictions::Values(z.clone());
        let ctx = IterationContext::new(&probs);
        let ctx = if i == 0 { ctx } else { ctx.with_adjusted_targets(z) };
        manager.on_training_end(&ctx).unwrap();
    }
    manager.on_process_end().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].starts_with("balance diagnostics: 3 iteration(s)"));
    assert!(seen[1].starts_with("fairness-classification diagnostics: 3 iteration(s)"));
}

#[test]
fn yaml_configured_listener_exports_json() {
    let yaml = r#"
mode: fairness_classification
protected:
  prefix: race
  encoding: one_hot
num_columns: 3
threshold: 0.5
"#;
    let config = DiagnosticConfig::from_yaml(yaml).unwrap();
    let features = applicants();
    let mut listener = DiagnosticListener::new(config).unwrap();
    run(&mut listener, &features).unwrap();

    let table_json = listener.table().unwrap().to_json().unwrap();
    assert!(table_json.contains("adjusted_target_2"));
    assert!(table_json.contains("prediction_0"));

    let report_json = listener.report().unwrap().to_json().unwrap();
    assert!(report_json.contains("\"kind\": \"percentages\""));
    assert!(report_json.contains("iteration: 2"));
}

#[test]
fn interrupted_run_keeps_recorded_iterations() {
    let features = applicants();
    let mut listener = DiagnosticListener::new(DiagnosticConfig::balance()).unwrap();
    listener
        .on_process_start(&ProcessContext::new(&features, &TARGETS))
        .unwrap();
    let probs = Predictions::Values(TARGETS.to_vec());
    listener
        .on_training_end(&IterationContext::new(&probs))
        .unwrap();

    let skipped = listener.on_training_end(&IterationContext::new(&probs).with_iteration(2));
    assert!(matches!(
        skipped,
        Err(DiagnosticError::OutOfOrderIteration {
            expected: 1,
            actual: 2
        })
    ));
    assert_eq!(listener.state(), LifecycleState::Aborted);
    assert_eq!(listener.table().unwrap().iteration_count(), 1);
    assert!(listener.report().is_none());
}

//! Fairness Diagnostics Simulation
//!
//! Simulates a moving-targets run on a synthetic loan dataset where one
//! group is approved far less often. Between iterations a master step flips
//! rejected labels in the disadvantaged group until approval rates match.
//! Two listeners record the run: one for class balance, one for per-group
//! approval percentages.
//!
//! Run with: RUST_LOG=ajuste=debug cargo run --example fairness_run

use ajuste::{
    CallbackManager, DiagnosticConfig, DiagnosticListener, DiagnosticReport, FeatureTable,
    GroupEncoding, IterationContext, Predictions, ProcessContext, Renderer,
};
use tracing_subscriber::EnvFilter;

const ROWS: usize = 200;
const ITERATIONS: usize = 5;

/// Prints each finished report as a text table
struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&mut self, report: &DiagnosticReport) {
        println!("{report}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ajuste=info".parse()?))
        .init();

    let (features, targets) = loan_data(ROWS, 7)?;
    let groups: Vec<usize> = features.column(1).iter().map(|&g| g as usize).collect();
    let income: Vec<f64> = features.column(0).to_vec();

    let mut manager = CallbackManager::new();
    manager.add(DiagnosticListener::new(DiagnosticConfig::balance())?.with_renderer(TextRenderer));
    manager.add(
        DiagnosticListener::new(
            DiagnosticConfig::fairness_classification("group", GroupEncoding::SingleColumn)
                .with_num_columns(3),
        )?
        .with_renderer(TextRenderer),
    );

    manager.on_process_start(&ProcessContext::new(&features, &targets))?;

    let mut adjusted = targets.clone();
    for iteration in 0..ITERATIONS {
        if iteration > 0 {
            master_step(&mut adjusted, &groups, &income);
        }
        let predictions = Predictions::Values(learner(&adjusted, &income));
        let ctx = IterationContext::new(&predictions).with_iteration(iteration);
        let ctx = if iteration == 0 {
            ctx
        } else {
            ctx.with_adjusted_targets(&adjusted)
        };
        manager.on_training_end(&ctx)?;
        println!(
            "iteration {iteration}: approval rates {:.2} / {:.2}",
            approval_rate(&adjusted, &groups, 0),
            approval_rate(&adjusted, &groups, 1)
        );
    }

    manager.on_process_end()?;
    Ok(())
}

/// Synthetic applicants: income in [0, 1), a binary group, and approvals
/// that favor group 0
fn loan_data(rows: usize, seed: u64) -> ajuste::Result<(FeatureTable, Vec<f64>)> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let mut income = Vec::with_capacity(rows);
    let mut group = Vec::with_capacity(rows);
    let mut approved = Vec::with_capacity(rows);
    for _ in 0..rows {
        let x = next();
        let g = if next() < 0.4 { 1.0 } else { 0.0 };
        let bar = if g == 0.0 { 0.4 } else { 0.75 };
        income.push(x);
        group.push(g);
        approved.push(if x > bar { 1.0 } else { 0.0 });
    }

    let features = FeatureTable::from_columns(vec![("income", income), ("group", group)])?;
    Ok((features, approved))
}

/// A learner that mostly fits its targets, nudged by income
fn learner(targets: &[f64], income: &[f64]) -> Vec<f64> {
    targets
        .iter()
        .zip(income)
        .map(|(&t, &x)| 0.8 * t + 0.2 * x)
        .collect()
}

/// Approve the richest rejected applicant of the lagging group, repeated
/// until the gap shrinks below five points or a tenth of the rows changed
fn master_step(targets: &mut [f64], groups: &[usize], income: &[f64]) {
    let budget = targets.len() / 10;
    for _ in 0..budget {
        let (r0, r1) = (
            approval_rate(targets, groups, 0),
            approval_rate(targets, groups, 1),
        );
        if (r0 - r1).abs() < 0.05 {
            break;
        }
        let lagging = usize::from(r1 < r0);
        let candidate = (0..targets.len())
            .filter(|&i| groups[i] == lagging && targets[i] == 0.0)
            .max_by(|&a, &b| income[a].total_cmp(&income[b]));
        match candidate {
            Some(i) => targets[i] = 1.0,
            None => break,
        }
    }
}

fn approval_rate(targets: &[f64], groups: &[usize], group: usize) -> f64 {
    let members: Vec<f64> = targets
        .iter()
        .zip(groups)
        .filter(|(_, g)| **g == group)
        .map(|(&t, _)| t)
        .collect();
    if members.is_empty() {
        0.0
    } else {
        members.iter().sum::<f64>() / members.len() as f64
    }
}

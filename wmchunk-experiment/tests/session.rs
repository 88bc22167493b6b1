//! Full runs against a scripted subject and a recording display.

use std::time::Duration;

use wmchunk_core::testing::{RecordingDisplay, ScriptedInput};
use wmchunk_core::{DEFAULT_MASK, RecallDir, TrialSpec};
use wmchunk_experiment::{
    ExperimentConfig, TargetDesign, TrialPlan, TrialScheduler, show_scoreboard,
};
use wmchunk_timing::ManualTimer;

fn pair(seq: &str, chunk: usize, dir: RecallDir) -> Vec<TrialSpec> {
    let enc = TrialSpec::encoding(1, seq, chunk, dir);
    let masked = vec!["#"; enc.len()].join(" ");
    let ret = TrialSpec::retrieval_for(&enc, &masked);
    vec![enc, ret]
}

#[test]
fn chunked_reveal_then_backward_recall() {
    let plan = TrialPlan::new(pair("1 2 3 4", 2, RecallDir::Backward), DEFAULT_MASK).unwrap();
    let input = ScriptedInput::new([("4", 1.0), ("3", 1.5), ("2", 2.0), ("1", 2.5)]);
    let mut scheduler = TrialScheduler::new(
        plan,
        ExperimentConfig::default(),
        ManualTimer::new(),
        RecordingDisplay::new(),
        input,
    );

    let outcome = scheduler.run();
    assert_eq!(outcome.completed, 2);
    assert!(!outcome.aborted);

    let texts: Vec<Vec<String>> = scheduler.display.texts();
    assert_eq!(texts[0], vec!["1 2"]);
    assert_eq!(texts[1], vec!["# #"]);
    assert_eq!(texts[2], vec!["# # 3 4"]);
    assert_eq!(texts[3], vec!["# # # #"]);

    let records = scheduler.results().records();
    let retrieval = &records[1];
    assert_eq!(retrieval.points, 10);
    assert!(!retrieval.is_error);
    assert!(!retrieval.timed_out);
    assert!((retrieval.movement_time - 1.5).abs() < 1e-6);
    assert_eq!(scheduler.input.remaining(), 0);
}

#[test]
fn scoreboard_reports_run_totals() {
    let mut specs = pair("1 2 3", 3, RecallDir::Forward);
    specs.extend(pair("4 4", 1, RecallDir::Forward));
    let plan = TrialPlan::new(specs, DEFAULT_MASK).unwrap();
    let input = ScriptedInput::new([
        ("1", 0.5),
        ("2", 1.0),
        ("3", 1.5),
        ("4", 0.2),
        ("1", 0.4),
    ]);
    let config = ExperimentConfig::default();
    let mut scheduler = TrialScheduler::new(
        plan,
        config.clone(),
        ManualTimer::new(),
        RecordingDisplay::new(),
        input,
    );
    scheduler.run();

    let summary = config
        .scoring
        .summarize(scheduler.results().records());
    // 10 for the perfect trial, 1 for the half-right one
    assert_eq!(summary.raw_points, 11);
    assert_eq!(summary.errors, 1);
    assert!((summary.percent_correct - 75.0).abs() < 1e-9);
    // encoding rows count as 0.0: (0 + 1.0 + 0 + 0.2) / 4
    assert!((summary.mean_movement_time - 0.3).abs() < 1e-6);
    assert!(summary.bonus_applied);
    assert_eq!(summary.total_points, 22);

    let mut display = RecordingDisplay::new();
    show_scoreboard(&mut display, &config.layout, &summary);
    assert_eq!(
        display.texts(),
        vec![vec!["Total points: 22\n\n% correct 75.00\n\nMT 0.30".to_string()]]
    );
}

#[test]
fn generated_design_runs_to_completion() {
    let rows = TargetDesign::default().with_seed(11).generate();
    let plan = TrialPlan::new(rows, DEFAULT_MASK).unwrap();
    let expected_time = plan.minimum_duration();

    // nobody answers: every retrieval times out after 100 ms
    let config = ExperimentConfig {
        response_timeout_ms: Some(100),
        ..ExperimentConfig::default()
    };
    let timer = ManualTimer::new();
    let mut scheduler = TrialScheduler::new(
        plan,
        config,
        timer.clone(),
        RecordingDisplay::new(),
        ScriptedInput::default(),
    );
    let outcome = scheduler.run();

    assert_eq!(outcome.completed, 40);
    let records = scheduler.into_results().into_records();
    assert!(
        records
            .iter()
            .filter(|r| r.spec.phase_type == wmchunk_core::PhaseType::Retrieval)
            .all(|r| r.movement_time.is_nan() && r.points == 0 && r.is_error && r.timed_out)
    );
    let summary = ExperimentConfig::default().scoring.summarize(&records);
    // unanswered retrievals are errors; encoding rows are not
    assert_eq!(summary.errors, 20);
    assert!((summary.percent_correct - 50.0).abs() < 1e-9);
    assert_eq!(
        timer.absolute(),
        expected_time + Duration::from_millis(100) * 20
    );
}

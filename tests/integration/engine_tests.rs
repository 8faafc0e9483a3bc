//! Integration tests for the round engine
//!
//! These tests drive the round controller with a scripted in-memory
//! operation, so every scenario is deterministic and needs no network.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_sweep::engine::{
    EngineConfig, FailureReason, Operation, Outcome, ProgressObserver, RoundController,
    RoundProgress, RoundSummary, Target, Termination,
};
use sumi_sweep::SweepError;

/// What a scripted target answers on one attempt
#[derive(Debug, Clone, Copy)]
enum Step {
    Ok,
    Unavailable,
    NotFound,
    Refused,
}

/// Answers each target from its script; the last step repeats forever
struct ScriptedOperation {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    attempts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

impl ScriptedOperation {
    fn new(scripts: Vec<(String, Vec<Step>)>) -> Self {
        Self {
            scripts: Mutex::new(
                scripts
                    .into_iter()
                    .map(|(target, steps)| (target, steps.into()))
                    .collect(),
            ),
            attempts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay: Duration::from_millis(2),
        }
    }

    fn uniform(count: usize, steps: Vec<Step>) -> (Vec<Target>, Self) {
        let names: Vec<String> = (0..count).map(|i| format!("https://blog.example.com/post/{}", i)).collect();
        let targets = names.iter().map(|name| Target::from(name.as_str())).collect();
        let operation = Self::new(names.into_iter().map(|name| (name, steps.clone())).collect());
        (targets, operation)
    }

    fn next_step(&self, target: &str) -> Step {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.get_mut(target).expect("unscripted target");
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            *script.front().unwrap()
        }
    }

    fn attempts_for(&self, target: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|attempt| attempt.as_str() == target)
            .count()
    }
}

#[async_trait]
impl Operation for ScriptedOperation {
    type Client = ();
    type Payload = String;

    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn execute(&self, target: &Target, _client: &()) -> Outcome<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.attempts.lock().unwrap().push(target.to_string());

        tokio::time::sleep(self.delay).await;
        let step = self.next_step(target.as_str());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step {
            Step::Ok => Outcome::success(target.clone(), format!("payload:{}", target)),
            Step::Unavailable => Outcome::retryable(target.clone(), FailureReason::Status(503)),
            Step::NotFound => Outcome::permanent(target.clone(), FailureReason::Status(404)),
            Step::Refused => {
                Outcome::retryable(target.clone(), FailureReason::Connect("refused".to_string()))
            }
        }
    }
}

/// Records the pending set size at the start of every round
#[derive(Default)]
struct RoundLog {
    started: Mutex<Vec<(u32, usize)>>,
    finished: Mutex<Vec<RoundSummary>>,
    completions: AtomicUsize,
}

impl ProgressObserver for RoundLog {
    fn round_started(&self, round: u32, _max_rounds: u32, pending: usize) {
        self.started.lock().unwrap().push((round, pending));
    }

    fn target_completed(&self, _progress: &RoundProgress) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }

    fn round_finished(&self, summary: &RoundSummary) {
        self.finished.lock().unwrap().push(summary.clone());
    }
}

fn engine_config(concurrency: usize, max_rounds: u32) -> EngineConfig {
    EngineConfig {
        concurrency_limit: concurrency,
        operation_timeout: Duration::from_secs(5),
        max_rounds,
        inter_round_cooldown: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn test_all_targets_succeed_in_one_round() {
    let (targets, operation) = ScriptedOperation::uniform(10, vec![Step::Ok]);

    let output = RoundController::new(targets, operation, (), engine_config(4, 5))
        .unwrap()
        .run()
        .await;
    let report = output.report;

    assert_eq!(report.termination, Termination::Drained);
    assert_eq!(report.rounds_run(), 1);
    assert_eq!(report.succeeded, 10);
    assert!(report.failed.is_empty());
    assert_eq!(report.cooldowns, 0);
    assert!(report.is_complete());
    assert_eq!(output.payloads.len(), 10);
}

#[tokio::test]
async fn test_transient_failures_recover_in_second_round() {
    let mut scripts: Vec<(String, Vec<Step>)> = (0..7)
        .map(|i| (format!("ok-{}", i), vec![Step::Ok]))
        .collect();
    scripts.extend((0..3).map(|i| (format!("flaky-{}", i), vec![Step::Unavailable, Step::Ok])));
    let targets: Vec<Target> = scripts.iter().map(|(name, _)| Target::from(name.as_str())).collect();
    let log = Arc::new(RoundLog::default());

    let output = RoundController::new(targets, ScriptedOperation::new(scripts), (), engine_config(5, 5))
        .unwrap()
        .with_observer(log.clone())
        .run()
        .await;
    let report = output.report;

    assert_eq!(report.termination, Termination::Drained);
    assert_eq!(report.rounds_run(), 2);
    assert_eq!(report.succeeded, 10);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.cooldowns, 1);

    assert_eq!(report.rounds[0].succeeded, 7);
    assert_eq!(report.rounds[0].retryable, 3);
    assert_eq!(report.rounds[1].submitted, 3);
    assert_eq!(report.rounds[1].succeeded, 3);

    assert_eq!(*log.started.lock().unwrap(), vec![(1, 10), (2, 3)]);
    assert_eq!(log.finished.lock().unwrap().len(), 2);
    assert_eq!(log.completions.load(Ordering::SeqCst), 13);
}

#[tokio::test]
async fn test_permanent_failures_end_after_first_round() {
    let (targets, operation) = ScriptedOperation::uniform(5, vec![Step::NotFound]);

    let report = RoundController::new(targets, operation, (), engine_config(5, 5))
        .unwrap()
        .run()
        .await
        .report;

    assert_eq!(report.termination, Termination::Drained);
    assert_eq!(report.rounds_run(), 1);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed_count(), 5);
    assert_eq!(report.cooldowns, 0);
    assert!(report.failed.iter().all(|failed| !failed.retryable));
    assert!(report
        .failed
        .iter()
        .all(|failed| failed.reason == FailureReason::Status(404)));
}

#[tokio::test]
async fn test_unreachable_targets_exhaust_round_ceiling() {
    let (targets, operation) = ScriptedOperation::uniform(5, vec![Step::Refused]);
    let operation = Arc::new(operation);

    let report = RoundController::new(targets.clone(), SharedOperation(operation.clone()), (), engine_config(5, 5))
        .unwrap()
        .run()
        .await
        .report;

    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.rounds_run(), 5);
    assert_eq!(report.cooldowns, 4);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed_count(), 5);
    assert!(report.failed.iter().all(|failed| failed.retryable && failed.round == 5));

    for target in &targets {
        assert_eq!(operation.attempts_for(target.as_str()), 5);
    }
}

#[tokio::test]
async fn test_permanent_failures_are_never_resubmitted() {
    let scripts = vec![
        ("gone".to_string(), vec![Step::NotFound]),
        ("flaky".to_string(), vec![Step::Unavailable, Step::Unavailable, Step::Ok]),
        ("fine".to_string(), vec![Step::Ok]),
    ];
    let targets: Vec<Target> = scripts.iter().map(|(name, _)| Target::from(name.as_str())).collect();
    let operation = Arc::new(ScriptedOperation::new(scripts));

    let report = RoundController::new(targets, SharedOperation(operation.clone()), (), engine_config(2, 5))
        .unwrap()
        .run()
        .await
        .report;

    assert_eq!(report.rounds_run(), 3);
    assert_eq!(operation.attempts_for("gone"), 1);
    assert_eq!(operation.attempts_for("flaky"), 3);
    assert_eq!(operation.attempts_for("fine"), 1);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed_targets().map(Target::as_str).collect::<Vec<_>>(), vec!["gone"]);
}

#[tokio::test]
async fn test_every_target_accounted_for_exactly_once() {
    let scripts = vec![
        ("a".to_string(), vec![Step::Ok]),
        ("b".to_string(), vec![Step::NotFound]),
        ("c".to_string(), vec![Step::Unavailable, Step::Ok]),
        ("d".to_string(), vec![Step::Refused]),
        ("e".to_string(), vec![Step::Unavailable, Step::NotFound]),
    ];
    let targets: Vec<Target> = scripts.iter().map(|(name, _)| Target::from(name.as_str())).collect();

    let output = RoundController::new(targets, ScriptedOperation::new(scripts), (), engine_config(3, 3))
        .unwrap()
        .run()
        .await;
    let report = output.report;

    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.succeeded + report.failed_count(), report.total_initial);

    let mut failed: Vec<&str> = report.failed_targets().map(Target::as_str).collect();
    failed.sort();
    assert_eq!(failed, vec!["b", "d", "e"]);

    let mut payloads = output.payloads;
    payloads.sort();
    assert_eq!(payloads, vec!["payload:a", "payload:c"]);
}

#[tokio::test]
async fn test_duplicate_targets_are_independent_units() {
    let operation = ScriptedOperation::new(vec![("dup".to_string(), vec![Step::Ok])]);
    let targets = vec![Target::from("dup"), Target::from("dup"), Target::from("dup")];

    let output = RoundController::new(targets, operation, (), engine_config(2, 5))
        .unwrap()
        .run()
        .await;

    assert_eq!(output.report.total_initial, 3);
    assert_eq!(output.report.succeeded, 3);
    assert_eq!(output.payloads.len(), 3);
}

#[tokio::test]
async fn test_concurrency_limit_is_never_exceeded() {
    let (targets, mut operation) = ScriptedOperation::uniform(30, vec![Step::Unavailable, Step::Ok]);
    operation.delay = Duration::from_millis(10);
    let operation = Arc::new(operation);

    let report = RoundController::new(targets, SharedOperation(operation.clone()), (), engine_config(4, 5))
        .unwrap()
        .run()
        .await
        .report;

    assert_eq!(report.succeeded, 30);
    let peak = operation.peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak in-flight was {}", peak);
    assert!(peak >= 2, "workers never overlapped");
}

#[tokio::test]
async fn test_slow_operations_time_out_as_retryable() {
    let (targets, mut operation) = ScriptedOperation::uniform(2, vec![Step::Ok]);
    operation.delay = Duration::from_millis(500);
    let config = EngineConfig {
        operation_timeout: Duration::from_millis(20),
        ..engine_config(2, 2)
    };

    let report = RoundController::new(targets, operation, (), config)
        .unwrap()
        .run()
        .await
        .report;

    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.rounds_run(), 2);
    assert!(report
        .failed
        .iter()
        .all(|failed| failed.reason == FailureReason::Timeout && failed.retryable));
}

#[test]
fn test_engine_level_errors_before_first_round() {
    let empty = RoundController::new(vec![], ScriptedOperation::new(vec![]), (), engine_config(2, 5));
    assert!(matches!(empty, Err(SweepError::EmptyTargets)));

    let no_workers = RoundController::new(
        vec![Target::from("a")],
        ScriptedOperation::new(vec![]),
        (),
        engine_config(0, 5),
    );
    assert!(matches!(no_workers, Err(SweepError::InvalidEngineConfig(_))));
}

/// Lets a test keep a handle on the operation the controller owns
struct SharedOperation(Arc<ScriptedOperation>);

#[async_trait]
impl Operation for SharedOperation {
    type Client = ();
    type Payload = String;

    fn name(&self) -> &'static str {
        self.0.name()
    }

    async fn execute(&self, target: &Target, client: &()) -> Outcome<String> {
        self.0.execute(target, client).await
    }
}

// tests/cancel_behaviour.rs

use std::error::Error;

use tokio::time::{Duration, sleep, timeout};

use stackdag::dag::{GraphBuilder, JobState};
use stackdag::exec::{Executor, HandlerMap, JobOutcome, RunStatus};
use stackdag_test_utils::builders::{chain, quick_job};
use stackdag_test_utils::fake_handler::{FakeHandler, Scripted};
use stackdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn cancelling_before_the_run_dispatches_nothing() -> TestResult {
    init_tracing();

    let handler = FakeHandler::new();
    let handlers = HandlerMap::uniform(handler.clone());
    let executor = Executor::new(chain(&["a", "b"]), &handlers)?;

    executor.cancel_handle().cancel();
    let result = timeout(Duration::from_secs(3), executor.run()).await?;

    assert_eq!(result.status, RunStatus::Cancelled);
    assert!(handler.executed().is_empty());
    for report in &result.reports {
        assert_eq!(report.state, JobState::Cancelled);
        assert_eq!(report.attempts, 0);
    }
    Ok(())
}

/// Cancellation is observable during the inter-retry wait: the sleep is
/// interrupted, the job ends `Cancelled` with its attempts on record, and
/// nothing else is dispatched.
#[tokio::test]
async fn cancelling_interrupts_the_retry_wait() -> TestResult {
    init_tracing();

    let mut builder = GraphBuilder::new();
    // Long wait: the run would take ~30s if cancellation didn't cut it short.
    builder.add_job(
        quick_job("a")
            .wait_interval(Duration::from_secs(30))
            .retries(1),
    )?;
    builder.add_job(quick_job("b"))?;
    builder.add_edge("a", "b")?;

    let handler = FakeHandler::new();
    handler.fail_always("a", "boom");

    let handlers = HandlerMap::uniform(handler.clone());
    let executor = Executor::new(builder.build()?, &handlers)?;
    let cancel = executor.cancel_handle();

    let run = tokio::spawn(executor.run());

    // Give the first attempt time to fail and enter the retry wait.
    sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let result = timeout(Duration::from_secs(3), run).await??;

    assert_eq!(result.status, RunStatus::Cancelled);
    let a = result.report("a").unwrap();
    assert_eq!(a.state, JobState::Cancelled);
    assert_eq!(a.attempts, 1);
    assert!(a.failure.is_some());

    assert_eq!(result.report("b").unwrap().state, JobState::Cancelled);
    assert_eq!(handler.attempts_of("a"), 1);
    assert_eq!(handler.attempts_of("b"), 0);
    Ok(())
}

/// A job that is already running when cancellation arrives finishes its
/// attempt, and its outcome is recorded; only undispatched jobs flip to
/// `Cancelled`.
#[tokio::test]
async fn running_job_outcome_is_still_recorded() -> TestResult {
    init_tracing();

    let handler = FakeHandler::new();
    handler.script(
        "a",
        [Scripted::SlowOutcome(
            Duration::from_millis(300),
            JobOutcome::Succeeded,
        )],
    );

    let handlers = HandlerMap::uniform(handler.clone());
    let executor = Executor::new(chain(&["a", "b"]), &handlers)?;
    let cancel = executor.cancel_handle();

    let run = tokio::spawn(executor.run());

    sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let result = timeout(Duration::from_secs(3), run).await??;

    assert_eq!(result.status, RunStatus::Cancelled);
    let a = result.report("a").unwrap();
    assert_eq!(a.state, JobState::Succeeded);
    assert_eq!(a.attempts, 1);

    assert_eq!(result.report("b").unwrap().state, JobState::Cancelled);
    assert_eq!(handler.attempts_of("b"), 0);
    Ok(())
}

#[tokio::test]
async fn cancel_is_idempotent() -> TestResult {
    init_tracing();

    let handler = FakeHandler::new();
    let handlers = HandlerMap::uniform(handler.clone());
    let executor = Executor::new(chain(&["a"]), &handlers)?;
    let cancel = executor.cancel_handle();

    cancel.cancel();
    cancel.cancel();
    assert!(cancel.is_cancelled());

    let result = timeout(Duration::from_secs(3), executor.run()).await?;
    assert_eq!(result.status, RunStatus::Cancelled);
    Ok(())
}

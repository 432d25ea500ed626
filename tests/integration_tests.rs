//! End-to-end runs through a real shell.

use std::time::Duration;

use chrono::NaiveDate;
use queue_runner::config::RunnerConfig;
use queue_runner::plan::populate;
use queue_runner::scheduler::{FailureKind, Job, JobQueue, JobStatus, QueueRunner};
use queue_runner::worker::{ShellLauncher, LAUNCH_FAILURE_CODE};

fn fast_config(concurrency: usize) -> RunnerConfig {
    RunnerConfig::new(concurrency).with_poll_interval(Duration::from_millis(20))
}

fn runner_for(queue: JobQueue, config: RunnerConfig) -> QueueRunner<ShellLauncher> {
    let launcher = ShellLauncher::new(config.shell.clone());
    QueueRunner::new(queue, launcher, config).unwrap()
}

fn queue_of(jobs: &[(&str, &str)]) -> JobQueue {
    let mut queue = JobQueue::new("integration");
    for (id, command) in jobs {
        queue.add(Job::new(*id, *command)).unwrap();
    }
    queue
}

#[tokio::test]
async fn test_five_jobs_two_slots_all_succeed() {
    let queue = queue_of(&[
        ("1", "true"),
        ("2", "sleep 0.05"),
        ("3", "true"),
        ("4", "sleep 0.05"),
        ("5", "true"),
    ]);
    let mut runner = runner_for(queue, fast_config(2));

    let report = runner.run().await.unwrap();

    assert_eq!(report.status.complete(), 5);
    assert_eq!(report.status.error(), 0);
    assert_eq!(report.status.pending(), 0);
    assert_eq!(report.status.running(), 0);
    assert!(report.is_success());
    assert_eq!(runner.launcher().in_flight(), 0);
}

#[tokio::test]
async fn test_failed_command_recorded_and_run_drains() {
    let queue = queue_of(&[("a", "true"), ("b", "exit 1"), ("c", "sleep 0.05")]);
    let mut runner = runner_for(queue, fast_config(2));

    let report = runner.run().await.unwrap();

    assert_eq!(report.status.complete(), 2);
    assert_eq!(report.status.error(), 1);
    let failed = report.job("b").unwrap();
    assert_eq!(failed.exit_code, Some(1));
    assert_eq!(failed.failure, Some(FailureKind::CommandFailure));
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_all_jobs_start_in_first_cycle_when_limit_is_high() {
    let queue = queue_of(&[("a", "sleep 0.2"), ("b", "sleep 0.2"), ("c", "sleep 0.2")]);
    let mut runner = runner_for(queue, fast_config(10));

    let snapshot = runner.cycle().unwrap();
    assert_eq!(snapshot.running(), 3);
    assert_eq!(snapshot.pending(), 0);

    let report = runner.run().await.unwrap();
    assert_eq!(report.status.complete(), 3);
}

#[tokio::test]
async fn test_single_slot_runs_jobs_in_id_order() {
    // "b" is the fastest job but must wait for "a"
    let queue = queue_of(&[("c", "true"), ("b", "true"), ("a", "sleep 0.1")]);
    let mut runner = runner_for(queue, fast_config(1));

    runner.run().await.unwrap();

    let queue = runner.queue();
    let a = queue.get("a").unwrap();
    let b = queue.get("b").unwrap();
    let c = queue.get("c").unwrap();
    assert!(b.started_at().unwrap() >= a.ended_at().unwrap());
    assert!(c.started_at().unwrap() >= b.ended_at().unwrap());
}

#[tokio::test]
async fn test_unlaunchable_jobs_end_in_error() {
    let queue = queue_of(&[("a", "true"), ("b", "true")]);
    let config = fast_config(2).with_shell("/nonexistent/shell");
    let mut runner = runner_for(queue, config);

    let report = runner.run().await.unwrap();

    assert_eq!(report.status.error(), 2);
    assert_eq!(report.status.pending(), 0);
    for job in &report.jobs {
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.exit_code, Some(LAUNCH_FAILURE_CODE));
        assert_eq!(job.failure, Some(FailureKind::LaunchFailure));
    }
}

#[tokio::test]
async fn test_dated_queue_end_to_end() {
    let mut queue = JobQueue::new("dated");
    populate(
        &mut queue,
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2018, 1, 5).unwrap(),
        "test {yyyymmdd} -ne 20180102",
    )
    .unwrap();
    queue
        .add(Job::new("99999999", "echo Manually added job > /dev/null"))
        .unwrap();
    let mut runner = runner_for(queue, fast_config(4));

    let report = runner.run().await.unwrap();

    assert_eq!(report.status.total, 5);
    assert_eq!(report.status.complete(), 4);
    assert_eq!(report.status.error(), 1);
    assert_eq!(report.job("20180102").unwrap().exit_code, Some(1));
    assert_eq!(report.job("99999999").unwrap().status, JobStatus::Complete);

    let ids: Vec<_> = report.jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["20180101", "20180102", "20180103", "20180104", "99999999"]
    );
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let queue = queue_of(&[("a", "true"), ("b", "exit 2")]);
    let mut runner = runner_for(queue, fast_config(2));
    let report = runner.run().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["queue"], "integration");
    assert_eq!(json["status"]["tally"]["Complete"], 1);
    assert_eq!(json["status"]["tally"]["Error"], 1);
    assert_eq!(json["jobs"][1]["exit_code"], 2);
    assert_eq!(json["jobs"][1]["failure"], "command_failure");
}

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use queue_runner::config::{RunnerConfig, ShellConfig};
use queue_runner::plan::{parse_job_spec, populate};
use queue_runner::scheduler::{JobQueue, QueueRunner, RunReport};
use queue_runner::worker::ShellLauncher;

#[derive(Parser, Debug)]
#[command(name = "queue-runner")]
#[command(version)]
#[command(about = "Run a batch of shell commands with bounded concurrency")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a command once per day over a date range
    Run(RunArgs),
}

// =============================================================================
// Run Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct RunArgs {
    /// Queue name used in logs and the final report
    #[arg(long, default_value = "default")]
    name: String,

    /// First day to run (YYYY-MM-DD)
    #[arg(long, requires = "end", requires = "command")]
    start: Option<NaiveDate>,

    /// Day after the last day to run (YYYY-MM-DD, exclusive)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Command template; {yyyymmdd} and {yyyy-mm-dd} are replaced per day
    /// Example: "loadDate -db TAQ -date {yyyymmdd}"
    #[arg(long, short = 'c', requires = "start")]
    command: Option<String>,

    /// Extra job as ID=COMMAND (repeatable)
    #[arg(long = "job", short = 'j')]
    jobs: Vec<String>,

    /// Maximum number of jobs running at once
    #[arg(long, short = 'n', default_value = "4")]
    concurrency: usize,

    /// Milliseconds to wait between scheduling cycles
    #[arg(long, default_value = "3000")]
    poll_interval_ms: u64,

    /// Shell used to run each command
    #[arg(long, default_value = "sh")]
    shell: String,

    /// Output format for the final report
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Run Implementation
// =============================================================================

async fn run_queue(args: RunArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let mut queue = JobQueue::new(args.name.clone());

    if let (Some(start), Some(end), Some(template)) = (args.start, args.end, &args.command) {
        populate(&mut queue, start, end, template)?;
    }
    for spec in &args.jobs {
        queue.add(parse_job_spec(spec)?)?;
    }

    if queue.is_empty() {
        return Err("no jobs to run, use --start/--end/--command or --job".into());
    }

    let config = RunnerConfig {
        concurrency: args.concurrency,
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        shell: ShellConfig {
            program: args.shell,
            ..ShellConfig::default()
        },
    };

    tracing::info!(
        queue = %queue,
        concurrency = config.concurrency,
        poll_interval_ms = args.poll_interval_ms,
        shell = %config.shell.program,
        "Starting queue-runner"
    );

    let launcher = ShellLauncher::new(config.shell.clone());
    let mut runner = QueueRunner::new(queue, launcher, config)?;

    eprintln!("beginning run of queue");
    let report = runner.run().await?;
    runner.log_job_details();
    eprintln!("completed run of queue");

    print_report(&report, &args.output)?;
    Ok(report.is_success())
}

fn print_report(
    report: &RunReport,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<20} {:<10} {:>6} {:>12}  COMMAND",
                "JOB ID", "STATUS", "EXIT", "ELAPSED(ms)"
            );
            for job in &report.jobs {
                println!(
                    "{:<20} {:<10} {:>6} {:>12}  {}",
                    job.id,
                    job.status.to_string(),
                    job.exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    job.elapsed_ms
                        .map(|ms| ms.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    job.command
                );
            }
            println!();
            println!("Queue:     {}", report.queue);
            println!("Jobs:      {}", report.status.total);
            println!("Complete:  {}", report.status.complete());
            println!("Error:     {}", report.status.error());
            println!("Elapsed:   {:.1}s", report.elapsed_ms as f64 / 1000.0);
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Run(run_args) => {
            if !run_queue(run_args).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

//! RL-Vis - training telemetry dashboard CLI
//!
//! The `rlvis` command ingests reward/confidence logs, stores them as named
//! runs, and prepares KPI summaries and chart data.
//!
//! ## Commands
//!
//! - `register`: Create an owner account
//! - `upload`: Ingest one or more CSV logs as a new run
//! - `runs`: List saved runs, newest first
//! - `show`: Print KPIs and the displayed point count for a run
//! - `plot`: Write a chart render request as JSON
//! - `delete`: Delete a saved run

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rlvis_core::{
    downsample, render_view, ChartRenderer, ChartRequest, ChartView, Dashboard, DashboardView,
    OwnerId, RecordingRenderer, RunId, Session, UploadedFile, ViewParams, METRICS,
};
use rlvis_core::domain::params::{DEFAULT_SAMPLE_RATE, DEFAULT_WINDOW_SIZE};
use rlvis_state::{OwnerDirectory, SurrealRunStore};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "rlvis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "RL-Vis: reinforcement-learning training telemetry dashboard", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Account email
    #[arg(long, global = true, env = "RLVIS_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "RLVIS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account with --email and --password
    Register,

    /// Ingest CSV logs as a new run
    Upload {
        /// Run name
        #[arg(short, long)]
        name: String,

        /// One or more CSV files; each becomes one series
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List saved runs, newest first
    Runs,

    /// Show KPIs for a saved run
    Show {
        run_id: String,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Write the reward or confidence chart of a run as JSON
    Plot {
        run_id: String,

        /// Which chart to emit
        #[arg(long, value_enum, default_value_t = ViewKind::Reward)]
        view: ViewKind,

        #[command(flatten)]
        params: ViewArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a saved run
    Delete { run_id: String },
}

#[derive(clap::Args, Debug, Clone)]
struct ViewArgs {
    /// Keep every Nth confidence-only row (1 = full detail)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: usize,

    /// Smooth the reward chart with a trailing moving average
    #[arg(long)]
    smooth: bool,

    /// Smoothing window, in episodes
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,
}

impl ViewArgs {
    fn params(&self) -> Result<ViewParams> {
        ViewParams::new(self.sample_rate, self.smooth, self.window)
            .context("Invalid view parameters")
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ViewKind {
    Reward,
    Confidence,
}

impl From<ViewKind> for ChartView {
    fn from(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Reward => ChartView::Reward,
            ViewKind::Confidence => ChartView::Confidence,
        }
    }
}

/// Writes each render request as pretty-printed JSON.
struct JsonChartSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonChartSink<W> {
    fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ChartRenderer for JsonChartSink<W> {
    fn render(&mut self, request: &ChartRequest) -> rlvis_core::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, request)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    rlvis_core::init_tracing(cli.json, level);

    let store = SurrealRunStore::from_env()
        .await
        .context("Failed to connect to RL-Vis database")?;

    let credentials = (cli.email.as_deref(), cli.password.as_deref());
    let result = run_command(&store, credentials, cli.command).await;

    METRICS.flush();
    result
}

type Credentials<'a> = (Option<&'a str>, Option<&'a str>);

async fn run_command(
    store: &SurrealRunStore,
    credentials: Credentials<'_>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Register => cmd_register(store, credentials).await,
        Commands::Upload { name, files } => {
            let (dashboard, mut session) = open_session(store, credentials).await?;
            cmd_upload(&dashboard, &mut session, &name, &files)
                .await
                .map(|_| ())
        }
        Commands::Runs => {
            let (dashboard, session) = open_session(store, credentials).await?;
            cmd_runs(&dashboard, &session).await
        }
        Commands::Show { run_id, view } => {
            let params = view.params()?;
            let (dashboard, mut session) = open_session(store, credentials).await?;
            let view = cmd_show(&dashboard, &mut session, &run_id, &params).await?;
            print_view(&view);
            Ok(())
        }
        Commands::Plot {
            run_id,
            view,
            params,
            output,
        } => {
            let params = params.params()?;
            let (dashboard, mut session) = open_session(store, credentials).await?;
            cmd_plot(
                &dashboard,
                &mut session,
                &run_id,
                view,
                &params,
                output.as_deref(),
            )
            .await
        }
        Commands::Delete { run_id } => {
            let (dashboard, mut session) = open_session(store, credentials).await?;
            cmd_delete(&dashboard, &mut session, &run_id).await
        }
    }
}

/// Authenticate and start a session for one command.
async fn open_session(
    store: &SurrealRunStore,
    credentials: Credentials<'_>,
) -> Result<(Dashboard<SurrealRunStore>, Session)> {
    let owner = login(store, credentials).await?;
    Ok((Dashboard::new(store.clone()), Session::new(owner)))
}

fn require<'a>(value: Option<&'a str>, flag: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!(
            "{flag} is required (or set RLVIS_{})",
            flag.trim_start_matches('-').to_uppercase()
        ),
    }
}

async fn login(
    directory: &impl OwnerDirectory,
    (email, password): Credentials<'_>,
) -> Result<OwnerId> {
    let email = require(email, "--email")?;
    let password = require(password, "--password")?;
    directory
        .authenticate(email, password)
        .await
        .map_err(rlvis_core::RlvisError::from)
        .context("Login failed")
}

/// Register a new owner
async fn cmd_register(
    directory: &impl OwnerDirectory,
    (email, password): Credentials<'_>,
) -> Result<()> {
    let email = require(email, "--email")?;
    let password = require(password, "--password")?;
    let owner = directory
        .register(email, password)
        .await
        .map_err(rlvis_core::RlvisError::from)
        .context("Registration failed")?;

    info!(owner_id = %owner, "owner registered");
    println!("Registered {email}");
    Ok(())
}

/// Ingest files and save them as a new run
async fn cmd_upload(
    dashboard: &Dashboard<SurrealRunStore>,
    session: &mut Session,
    name: &str,
    paths: &[PathBuf],
) -> Result<RunId> {
    let files = paths
        .iter()
        .map(|p| {
            UploadedFile::from_path(p).with_context(|| format!("Failed to read {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let run_id = dashboard
        .upload(session, name, &files)
        .await
        .context("Upload failed")?;

    let rows = session.current.as_ref().map(|a| a.run.len()).unwrap_or(0);
    println!("Saved run '{name}' ({rows} rows from {} files)", files.len());
    println!("Run ID: {run_id}");
    Ok(run_id)
}

/// List saved runs
async fn cmd_runs(dashboard: &Dashboard<SurrealRunStore>, session: &Session) -> Result<()> {
    let runs = dashboard.runs(session).await?;
    if runs.is_empty() {
        println!("No saved runs. Upload one with `rlvis upload`.");
        return Ok(());
    }

    println!("{:<38} {:<20} NAME", "RUN ID", "CREATED");
    for run in runs {
        println!(
            "{:<38} {:<20} {}",
            run.run_id,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.name
        );
    }
    Ok(())
}

/// Fail unless `run_id` is in the session owner's listing.
async fn ensure_owned(
    dashboard: &Dashboard<SurrealRunStore>,
    session: &Session,
    run_id: &RunId,
) -> Result<()> {
    let owned = dashboard
        .runs(session)
        .await?
        .iter()
        .any(|listing| &listing.run_id == run_id);
    if !owned {
        bail!("Run not found: {run_id}");
    }
    Ok(())
}

/// Open one of the session owner's runs.
async fn open_owned(
    dashboard: &Dashboard<SurrealRunStore>,
    session: &mut Session,
    run_id: &str,
) -> Result<()> {
    let run_id = RunId::from(run_id);
    ensure_owned(dashboard, session, &run_id).await?;
    dashboard.open(session, &run_id).await?;
    Ok(())
}

/// KPIs and point counts for a run
async fn cmd_show(
    dashboard: &Dashboard<SurrealRunStore>,
    session: &mut Session,
    run_id: &str,
    params: &ViewParams,
) -> Result<DashboardView> {
    open_owned(dashboard, session, run_id).await?;
    let Some(active) = session.current.as_ref() else {
        bail!("Run not found: {run_id}");
    };

    let _span = rlvis_core::RunSpan::enter(run_id);
    let mut renderer = RecordingRenderer::default();
    Ok(render_view(&active.run, params, &mut renderer)?)
}

fn print_view(view: &DashboardView) {
    println!("{}", view.run_name);
    println!();
    for kpi in &view.kpis {
        println!("File: {}", kpi.file_label);
        println!("  Total Timesteps:        {}", kpi.total_timesteps);
        match kpi.max_reward {
            Some(max) => println!("  Max Reward Achieved:    {max:.2}"),
            None => println!("  Max Reward Achieved:    n/a"),
        }
        println!("  Avg. Reward (Last 100): {:.2}", kpi.avg_reward_last_100);
        if kpi.reward_rows == 0 {
            println!("  No episode rewards found in this log.");
        }
    }
    println!();
    println!("{}", view.summary());
}

/// Emit one chart as JSON
async fn cmd_plot(
    dashboard: &Dashboard<SurrealRunStore>,
    session: &mut Session,
    run_id: &str,
    kind: ViewKind,
    params: &ViewParams,
    output: Option<&Path>,
) -> Result<()> {
    open_owned(dashboard, session, run_id).await?;
    let Some(active) = session.current.as_ref() else {
        bail!("Run not found: {run_id}");
    };

    let _span = rlvis_core::RunSpan::enter(run_id);
    let sampled = downsample(&active.run.records, params.sample_rate);
    let request = ChartView::from(kind).build(&sampled, params.smoothing());

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            JsonChartSink::new(BufWriter::new(file)).render(&request)?;
            println!("Wrote {} points to {}", request.points.len(), path.display());
        }
        None => JsonChartSink::new(io::stdout().lock()).render(&request)?,
    }
    Ok(())
}

/// Delete a run
async fn cmd_delete(
    dashboard: &Dashboard<SurrealRunStore>,
    session: &mut Session,
    run_id: &str,
) -> Result<()> {
    let id = RunId::from(run_id);
    ensure_owned(dashboard, session, &id).await?;
    dashboard.remove(session, &id).await?;
    println!("Deleted run {run_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PPO: &str = "timestep,value_estimate,cumulative_reward\n1,0.5,\n2,0.6,10\n3,0.7,\n4,0.8,30\n";

    async fn setup() -> (Dashboard<SurrealRunStore>, Session) {
        let store = SurrealRunStore::in_memory().await.unwrap();
        cmd_register(&store, (Some("ada@example.com"), Some("pw")))
            .await
            .unwrap();
        let owner = login(&store, (Some("ada@example.com"), Some("pw")))
            .await
            .unwrap();
        (Dashboard::new(store), Session::new(owner))
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn cli_parses_show_with_view_flags() {
        let cli = Cli::try_parse_from([
            "rlvis", "show", "abc", "--sample-rate", "1", "--smooth", "--window", "20",
        ])
        .unwrap();
        match cli.command {
            Commands::Show { run_id, view } => {
                assert_eq!(run_id, "abc");
                let params = view.params().unwrap();
                assert_eq!(params.sample_rate.get(), 1);
                assert_eq!(params.smoothing().map(|w| w.get()), Some(20));
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn out_of_range_window_is_rejected() {
        let args = ViewArgs {
            sample_rate: 100,
            smooth: true,
            window: 5,
        };
        assert!(args.params().is_err());
    }

    #[test]
    fn upload_requires_files() {
        assert!(Cli::try_parse_from(["rlvis", "upload", "--name", "x"]).is_err());
    }

    #[tokio::test]
    async fn wrong_password_fails_login() {
        let store = SurrealRunStore::in_memory().await.unwrap();
        cmd_register(&store, (Some("bo@example.com"), Some("right")))
            .await
            .unwrap();
        assert!(login(&store, (Some("bo@example.com"), Some("wrong"))).await.is_err());
        assert!(login(&store, (None, Some("right"))).await.is_err());
    }

    #[tokio::test]
    async fn upload_show_plot_delete() {
        let (dashboard, mut session) = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "ppo.csv", PPO);

        let run_id = cmd_upload(&dashboard, &mut session, "first", &[csv])
            .await
            .unwrap();

        let view = cmd_show(&dashboard, &mut session, run_id.as_str(), &ViewParams::default())
            .await
            .unwrap();
        assert_eq!(view.run_name, "first");
        assert_eq!(view.kpis[0].max_reward, Some(30.0));
        assert_eq!(view.kpis[0].avg_reward_last_100, 20.0);
        // rewards (2) plus confidence rows at positions 0 of 2
        assert_eq!(view.displayed_points, 3);

        let out = dir.path().join("reward.json");
        let params = ViewParams::new(1, true, 10).unwrap();
        cmd_plot(&dashboard, &mut session, run_id.as_str(), ViewKind::Reward, &params, Some(&out))
            .await
            .unwrap();
        let written: ChartRequest =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written.y_field, "smoothed_reward");
        let values: Vec<f64> = written.points.iter().map(|p| p.value).collect();
        assert_eq!(values, [10.0, 20.0]);

        cmd_delete(&dashboard, &mut session, run_id.as_str()).await.unwrap();
        assert!(dashboard.runs(&session).await.unwrap().is_empty());
        assert!(cmd_show(&dashboard, &mut session, run_id.as_str(), &ViewParams::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn other_owners_runs_are_hidden() {
        let (dashboard, mut session) = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "ppo.csv", PPO);
        let run_id = cmd_upload(&dashboard, &mut session, "mine", &[csv]).await.unwrap();

        let mut stranger = Session::new(OwnerId::new());
        assert!(cmd_delete(&dashboard, &mut stranger, run_id.as_str()).await.is_err());
        assert_eq!(dashboard.runs(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ensure_owned_checks_the_callers_listing() {
        let (dashboard, mut session) = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "ppo.csv", PPO);
        let run_id = cmd_upload(&dashboard, &mut session, "mine", &[csv]).await.unwrap();

        assert!(ensure_owned(&dashboard, &session, &run_id).await.is_ok());
        assert!(ensure_owned(&dashboard, &session, &RunId::new()).await.is_err());

        let mut stranger = Session::new(OwnerId::new());
        assert!(ensure_owned(&dashboard, &stranger, &run_id).await.is_err());
        assert!(cmd_show(&dashboard, &mut stranger, run_id.as_str(), &ViewParams::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn bad_upload_saves_nothing() {
        let (dashboard, mut session) = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let good = write_csv(&dir, "good.csv", PPO);
        let bad = write_csv(&dir, "bad.csv", "timestep,reward\n1,2\n");

        assert!(cmd_upload(&dashboard, &mut session, "mixed", &[good, bad])
            .await
            .is_err());
        assert!(dashboard.runs(&session).await.unwrap().is_empty());
    }
}

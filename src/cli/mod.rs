pub mod connection;
pub mod jobs;
pub mod run;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::config::resolve_config_dir;
use crate::models::Application;

/// mediareaparr - tag-and-age cleanup jobs for Radarr and Sonarr
#[derive(Parser, Debug)]
#[command(
    name = "mediareaparr",
    version,
    about = "mediareaparr - tag-and-age cleanup jobs for Radarr and Sonarr"
)]
pub struct Cli {
    /// Directory holding config.json, state.json and run-now flags
    #[arg(long = "config-dir", env = "CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run cleanup jobs (all enabled jobs by default)
    Run {
        /// Run a single job by id
        #[arg(long = "job-id")]
        job_id: Option<String>,

        /// Only run enabled jobs that have a run-now flag
        #[arg(long = "run-now-only", conflicts_with = "job_id")]
        run_now_only: bool,
    },

    /// List configured jobs
    Jobs {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recorded runs
    Status {
        /// Only show this job
        #[arg(long = "job-id")]
        job_id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Request a run of a job on the next `run --run-now-only`
    Trigger {
        /// Job id
        job_id: String,
    },

    /// Check URL and API key against the application's status endpoint
    TestConnection {
        #[arg(value_enum)]
        app: AppArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppArg {
    Radarr,
    Sonarr,
}

impl From<AppArg> for Application {
    fn from(arg: AppArg) -> Self {
        match arg {
            AppArg::Radarr => Application::Radarr,
            AppArg::Sonarr => Application::Sonarr,
        }
    }
}

impl Cli {
    pub fn config_dir(&self) -> PathBuf {
        resolve_config_dir(self.config_dir.as_deref())
    }
}

/// Dispatch the CLI command and return the process exit code.
pub async fn dispatch(cli: &Cli) -> anyhow::Result<i32> {
    let config_dir = cli.config_dir();
    let dir: &Path = &config_dir;
    match &cli.command {
        Some(Commands::Run {
            job_id,
            run_now_only,
        }) => run::cmd_run(dir, job_id.as_deref(), *run_now_only).await,
        Some(Commands::Jobs { json }) => jobs::cmd_jobs(dir, *json).map(|()| 0),
        Some(Commands::Status { job_id, json }) => {
            jobs::cmd_status(dir, job_id.as_deref(), *json)
                .await
                .map(|()| 0)
        }
        Some(Commands::Trigger { job_id }) => run::cmd_trigger(dir, job_id).await,
        Some(Commands::TestConnection { app }) => {
            connection::cmd_test_connection(dir, (*app).into()).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(0)
        }
    }
}

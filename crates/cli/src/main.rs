//! Imhotep CLI - Command-line client for the Imhotep forecasting API

mod logging;
mod render;
mod telemetry;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use futures::StreamExt;
use imhotep_core::application::{Completion, JobUpdate, TransportKind};
use imhotep_core::domain::{ForecastResult, SubmissionOutcome};
use imhotep_core::port::{CookieSession, SessionProvider, StaticSession};
use imhotep_sdk::{ClientConfig, ForecastClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "imhotep")]
#[command(about = "Imhotep demand forecasting CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Forecasting API base URL (overrides the config file)
    #[arg(long, env = "IMHOTEP_API_URL", global = true)]
    api_url: Option<String>,

    /// Bearer token
    #[arg(long, env = "IMHOTEP_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Tenant id sent as X-Tenant-ID
    #[arg(long, env = "IMHOTEP_TENANT", global = true)]
    tenant: Option<String>,

    /// Cookie header to read the session from (takes precedence over --token)
    #[arg(long, env = "IMHOTEP_COOKIE", global = true, hide_env_values = true)]
    cookie: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long, env = "IMHOTEP_CONFIG", global = true)]
    config: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args, Clone, Copy, Default)]
struct WatchArgs {
    /// Wait for the job and render the result
    #[arg(short, long)]
    watch: bool,

    /// Follow the job over the event stream instead of polling
    #[arg(long)]
    stream: bool,
}

impl WatchArgs {
    fn transport(&self) -> TransportKind {
        if self.stream {
            TransportKind::Push
        } else {
            TransportKind::Poll
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a dataset (.csv, .xls, .xlsx) and start a forecast
    Upload {
        /// Dataset file
        path: PathBuf,

        /// Upload through a presigned storage URL
        #[arg(long)]
        presigned: bool,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Forecast the sample dataset
    Sample {
        /// Industry parameter (e.g., retail, grocery)
        #[arg(short, long)]
        industry: Option<String>,

        /// Dataset to forecast instead of the configured sample
        #[arg(long)]
        dataset_id: Option<String>,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Show the current status of a job
    Status {
        /// Job ID
        job_id: String,
    },

    /// Follow a job until it completes or fails
    Watch {
        /// Job ID
        job_id: String,

        /// Use the event stream instead of polling
        #[arg(long)]
        stream: bool,
    },

    /// Show the forecast time series and model metrics
    Series {
        /// Job ID
        job_id: String,
    },

    /// Render a saved result file
    Report {
        /// JSON file containing a forecast result
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    let outcome = run(cli).await;
    telemetry::shutdown();
    outcome
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;

    // Offline command: no client needed
    if let Commands::Report { file } = &cli.command {
        let raw = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let result: ForecastResult =
            serde_json::from_str(&raw).context("File is not a forecast result")?;
        return show_result(&result, json);
    }

    let client = build_client(&cli)?;

    match cli.command {
        Commands::Upload {
            path,
            presigned,
            watch,
        } => {
            info!(path = %path.display(), presigned, "Uploading dataset");
            let outcome = if presigned {
                client.upload_presigned(&path).await
            } else {
                client.submit_file(&path).await
            }
            .with_context(|| format!("Upload of {} failed", path.display()))?;

            finish_submission(&client, outcome, watch, json).await
        }

        Commands::Sample {
            industry,
            dataset_id,
            watch,
        } => {
            let outcome = match dataset_id {
                Some(dataset_id) => client.submit_dataset(dataset_id, industry).await,
                None => client.submit_sample(industry).await,
            }
            .context("Forecast request failed")?;

            finish_submission(&client, outcome, watch, json).await
        }

        Commands::Status { job_id } => {
            let snapshot = client.status(&job_id).await.context("Status request failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            println!("{} {}", "Job".cyan().bold(), job_id.bold());
            println!("  {} {}", "Status:".bold(), snapshot.status);
            if let Some(error) = &snapshot.error {
                println!("  {} {}", "Error:".bold(), error.red());
            }
            if snapshot.status.is_terminal() && snapshot.has_content() {
                println!();
                render::print_result(&snapshot);
            }
            Ok(())
        }

        Commands::Watch { job_id, stream } => {
            let watch = WatchArgs {
                watch: true,
                stream,
            };
            let result = watch_job(&client, &job_id, watch.transport(), json).await?;
            show_result(&result, json)
        }

        Commands::Series { job_id } => {
            let series = client.series(&job_id).await.context("Series request failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                render::print_series(&series);
            }
            Ok(())
        }

        Commands::Report { .. } => Ok(()),
    }
}

fn build_client(cli: &Cli) -> Result<ForecastClient> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }

    let session: Arc<dyn SessionProvider> = match &cli.cookie {
        Some(header) => Arc::new(CookieSession::new(
            header,
            config.auth_cookie_name.clone(),
            config.tenant_cookie_name.clone(),
        )),
        None => Arc::new(StaticSession::new(cli.token.clone(), cli.tenant.clone())),
    };
    if session.access_token().is_none() {
        debug!("No access token configured; sending unauthenticated requests");
    }

    ForecastClient::connect(config, session).context("Failed to create client")
}

async fn finish_submission(
    client: &ForecastClient,
    outcome: SubmissionOutcome,
    watch: WatchArgs,
    json: bool,
) -> Result<()> {
    match outcome {
        SubmissionOutcome::Ready(result) => show_result(&result, json),
        SubmissionOutcome::Failed { job_id, error } => {
            bail!(failed_submission_message(job_id.as_deref(), &error))
        }
        SubmissionOutcome::Accepted { job_id } => {
            if !watch.watch {
                if json {
                    println!("{}", serde_json::json!({ "job_id": job_id }));
                } else {
                    println!("{}", "✓ Forecast job accepted".green().bold());
                    println!("  {} {}", "Job ID:".bold(), job_id);
                    println!();
                    println!("  Follow it with: imhotep watch {}", job_id);
                }
                return Ok(());
            }

            let result = watch_job(client, &job_id, watch.transport(), json).await?;
            show_result(&result, json)
        }
    }
}

/// Follow a job until terminal; Ctrl-C tears the observation down
async fn watch_job(
    client: &ForecastClient,
    job_id: &str,
    transport: TransportKind,
    json: bool,
) -> Result<ForecastResult> {
    if !json {
        println!(
            "{} {} ({})",
            "Watching job".cyan().bold(),
            job_id.bold(),
            transport
        );
    }

    let mut observation = client.observe(job_id, transport);
    loop {
        let update = tokio::select! {
            update = observation.next() => update,
            _ = tokio::signal::ctrl_c() => {
                observation.shutdown().await;
                bail!("Stopped watching job {}", job_id);
            }
        };

        let Some(update) = update else {
            bail!("Observation of job {} ended without a result", job_id);
        };
        if !json {
            render::print_update(&update);
        }

        match update {
            JobUpdate::Completed(Completion::Result(result)) => return Ok(*result),
            JobUpdate::Completed(Completion::Stream(_)) => {
                return client
                    .completed_result(job_id)
                    .await
                    .context("Failed to fetch the completed result");
            }
            JobUpdate::Failed { error } => bail!("Forecast job {} failed: {}", job_id, error),
            JobUpdate::Aborted(reason) => bail!("Stopped watching job {}: {}", job_id, reason),
            _ => {}
        }
    }
}

fn failed_submission_message(job_id: Option<&str>, error: &str) -> String {
    match job_id {
        Some(job_id) => format!("Forecast job {} failed: {}", job_id, error),
        None => format!("Forecast failed: {}", error),
    }
}

fn show_result(result: &ForecastResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!();
        render::print_result(result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_submission_message_names_the_job() {
        assert_eq!(
            failed_submission_message(Some("job-9"), "dataset has no date column"),
            "Forecast job job-9 failed: dataset has no date column"
        );
        assert_eq!(
            failed_submission_message(None, "bad file"),
            "Forecast failed: bad file"
        );
    }

    #[tokio::test]
    async fn test_failed_submission_is_an_error() {
        let client = ForecastClient::connect(
            ClientConfig::default(),
            Arc::new(StaticSession::new(None, None)),
        )
        .unwrap();
        let outcome = SubmissionOutcome::Failed {
            job_id: Some("job-9".to_string()),
            error: "dataset has no date column".to_string(),
        };

        let err = finish_submission(&client, outcome, WatchArgs::default(), true)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("dataset has no date column"));
    }
}

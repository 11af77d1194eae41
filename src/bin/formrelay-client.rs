//! Submit a form payload to a formrelay server and follow the job to completion.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use formrelay::poller::{
    HttpStatusSource, PollOutcome, Poller, StatusSource, SubmitClient, SubmitOutcome,
};

#[derive(Parser)]
#[command(name = "formrelay-client", about = "Submit lead-generation forms and poll job status")]
struct Cli {
    /// Base URL of the formrelay server
    #[arg(long, env = "FORMRELAY_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a JSON payload and wait for the generated report
    Submit {
        /// Form slug, e.g. lead-nurture-email
        #[arg(long)]
        form: String,
        /// JSON payload file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Return right after submission without polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Print the current status of a job
    Status { job_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Status { job_id } => {
            let status = HttpStatusSource::new(&cli.server)?.fetch_status(&job_id).await?;
            println!("{status}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit { form, file, no_wait } => {
            let payload = read_payload(file)?;
            let email = payload
                .get("email")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("your email")
                .to_string();

            let client = SubmitClient::new(&cli.server)?;
            let (job_id, redirect) = match client.submit(&form, &payload).await? {
                SubmitOutcome::AcceptedInBackground => {
                    println!(
                        "Submitted. Processing is taking a while, so the result will be sent to {email} when ready (usually 5-10 minutes)."
                    );
                    return Ok(ExitCode::SUCCESS);
                }
                SubmitOutcome::Rejected { message, .. } => {
                    eprintln!("{message}");
                    return Ok(ExitCode::FAILURE);
                }
                SubmitOutcome::Accepted {
                    message,
                    job_id,
                    redirect_url,
                } => {
                    println!("{message}");
                    match job_id {
                        Some(id) if !no_wait => (id, redirect_url),
                        _ => {
                            println!("The result will be sent to {email} when ready.");
                            return Ok(ExitCode::SUCCESS);
                        }
                    }
                }
            };

            let redirect = absolute_url(
                client.base_url(),
                redirect.unwrap_or_else(|| format!("/{form}/{job_id}")),
            );

            // Ctrl+C ends the poll loop instead of the process.
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = cancel_tx.send(true);
                }
            });

            let mut poller = Poller::new(HttpStatusSource::new(&cli.server)?);
            let outcome = poller
                .run(&job_id, &email, redirect, cancel_rx, |update| {
                    println!("[{:?}] {}", update.state, update.message);
                })
                .await;

            match outcome {
                PollOutcome::Completed { redirect } => {
                    println!("Report: {redirect}");
                    Ok(ExitCode::SUCCESS)
                }
                PollOutcome::TimedOut { .. } | PollOutcome::Cancelled => {
                    println!("Job ID: {job_id}");
                    Ok(ExitCode::SUCCESS)
                }
                PollOutcome::Failed { .. } => Ok(ExitCode::FAILURE),
            }
        }
    }
}

fn read_payload(file: Option<PathBuf>) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let payload: Value = serde_json::from_str(&raw)?;
    if !payload.is_object() {
        return Err("payload must be a JSON object".into());
    }
    Ok(payload)
}

fn absolute_url(base: &str, target: String) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target
    } else {
        format!("{base}{target}")
    }
}

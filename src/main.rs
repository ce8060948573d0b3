use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use palografico::api::{CaseId, HttpApi, ReviewApi};
use palografico::config::ClientConfig;
use palografico::error::{ApiError, LOGIN_REQUIRED_MESSAGE};
use palografico::poll::{NO_JOB_MESSAGE, PollEvent, spawn_job_poller};
use palografico::session::{self, CredentialStore, Session};
use palografico::shell;
use palografico::workspace::ReviewWorkspace;
use review::consts::INTERVAL_COUNT;
use review::{ItemId, ItemKind};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("token must not be blank")]
    BlankToken,
    #[error("no {kind} with id {id} in case {case_id}")]
    UnknownItem { case_id: CaseId, id: ItemId, kind: ItemKind },
    #[error("expected exactly 5 interval counts, got {0}")]
    IntervalCount(usize),
    #[error("job polling stopped: {0}")]
    PollStopped(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    fn message(&self) -> String {
        match self {
            Self::Api(e) if e.requires_login() => LOGIN_REQUIRED_MESSAGE.to_owned(),
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "palografico", about = "Review client for palográfico test scoring")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "PALO_API_URL")]
    base_url: Option<String>,

    /// Bearer token; falls back to the stored token.
    #[arg(long, env = "PALO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log at DEBUG level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Cases(CasesCommand),
    Case(CaseCommand),
    Review(ReviewCommand),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    /// Store a bearer token obtained from the backend's login.
    SetToken { token: String },
    /// Forget the stored token.
    Clear,
}

#[derive(Args, Debug)]
struct CasesCommand {
    #[command(subcommand)]
    command: CasesSubcommand,
}

#[derive(Subcommand, Debug)]
enum CasesSubcommand {
    List,
}

#[derive(Args, Debug)]
struct CaseCommand {
    #[command(subcommand)]
    command: CaseSubcommand,
}

#[derive(Subcommand, Debug)]
enum CaseSubcommand {
    /// Print the latest processing job once.
    Status { case_id: CaseId },
    /// Poll the latest job until it finishes.
    Watch { case_id: CaseId },
}

#[derive(Args, Debug)]
struct ReviewCommand {
    #[command(subcommand)]
    command: ReviewSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReviewSubcommand {
    Show {
        case_id: CaseId,
    },
    Delete {
        case_id: CaseId,
        item_id: String,
        #[arg(long, value_parser = parse_kind)]
        kind: ItemKind,
    },
    Override {
        case_id: CaseId,
        #[arg(num_args = INTERVAL_COUNT, required = true)]
        counts: Vec<i64>,
    },
    /// Discard manual edits and rerun detection.
    Reprocess {
        case_id: CaseId,
        /// Skip the confirmation prompt.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Approve the case for the training dataset.
    Approve {
        case_id: CaseId,
    },
    /// Interactive review session.
    Shell {
        case_id: CaseId,
    },
}

fn parse_kind(raw: &str) -> Result<ItemKind, String> {
    raw.parse::<ItemKind>().map_err(|e| e.to_string())
}

struct CliContext {
    config: ClientConfig,
    token: Option<String>,
}

impl CliContext {
    fn store(&self) -> CredentialStore {
        CredentialStore::new(&self.config.token_file)
    }

    fn api(&self) -> Result<Arc<HttpApi>, CliError> {
        let session: Session = session::resolve(self.token.as_deref(), &self.store())?;
        let api = HttpApi::new(&self.config, session)?;
        tracing::debug!(base_url = api.base_url(), "backend client ready");
        Ok(Arc::new(api))
    }

    fn workspace(&self, case_id: CaseId) -> Result<ReviewWorkspace<HttpApi>, CliError> {
        Ok(ReviewWorkspace::new(self.api()?, case_id, self.config.poll_interval))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env loaded"),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {}", e.message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    let token = cli.token.or_else(|| config.token.clone());
    let ctx = CliContext { config, token };

    match cli.command {
        Command::Auth(auth) => run_auth(&ctx, auth),
        Command::Cases(cases) => run_cases(&ctx, cases).await,
        Command::Case(case) => run_case(&ctx, case).await,
        Command::Review(review) => run_review(&ctx, review).await,
    }
}

fn run_auth(ctx: &CliContext, auth: AuthCommand) -> Result<(), CliError> {
    let store = ctx.store();
    match auth.command {
        AuthSubcommand::SetToken { token } => {
            let session = Session::new(token).ok_or(CliError::BlankToken)?;
            store.save(&session)?;
            println!("token stored in {}", store.path().display());
        }
        AuthSubcommand::Clear => {
            store.clear()?;
            println!("token cleared");
        }
    }
    Ok(())
}

async fn run_cases(ctx: &CliContext, cases: CasesCommand) -> Result<(), CliError> {
    match cases.command {
        CasesSubcommand::List => {
            let list = ctx.api()?.list_cases().await?;
            print_json(&serde_json::to_value(list)?)
        }
    }
}

async fn run_case(ctx: &CliContext, case: CaseCommand) -> Result<(), CliError> {
    match case.command {
        CaseSubcommand::Status { case_id } => match ctx.api()?.latest_job(case_id).await {
            Ok(job) => {
                println!("{}", shell::describe_job(&job));
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                println!("{NO_JOB_MESSAGE}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        CaseSubcommand::Watch { case_id } => {
            let api = ctx.api()?;
            let mut poller = spawn_job_poller(api, case_id, ctx.config.poll_interval);
            follow(&mut poller).await
        }
    }
}

async fn run_review(ctx: &CliContext, review: ReviewCommand) -> Result<(), CliError> {
    match review.command {
        ReviewSubcommand::Show { case_id } => {
            let mut ws = ctx.workspace(case_id)?;
            let report = ws.load().await;
            print!("{}", shell::render_summary(ws.core()));
            report.into_result()?;
        }
        ReviewSubcommand::Delete { case_id, item_id, kind } => {
            let mut ws = ctx.workspace(case_id)?;
            ws.load().await.into_result()?;
            let id = ItemId::parse(&item_id);
            if !ws.delete(&id, kind).await? {
                return Err(CliError::UnknownItem { case_id, id, kind });
            }
            print_notification(&mut ws);
        }
        ReviewSubcommand::Override { case_id, counts } => {
            let counts: [i64; INTERVAL_COUNT] = counts
                .as_slice()
                .try_into()
                .map_err(|_| CliError::IntervalCount(counts.len()))?;
            let mut ws = ctx.workspace(case_id)?;
            ws.load().await.into_result()?;
            ws.override_counts(counts).await?;
            print_notification(&mut ws);
        }
        ReviewSubcommand::Reprocess { case_id, yes } => {
            let confirmed = yes
                || confirm("Reprocessing discards all manual edits for this case. Continue? [y/N] ").await?;
            let mut ws = ctx.workspace(case_id)?;
            match ws.reprocess(confirmed).await? {
                Some(mut poller) => {
                    print_notification(&mut ws);
                    follow(&mut poller).await?;
                }
                None => println!("cancelled"),
            }
        }
        ReviewSubcommand::Approve { case_id } => {
            let mut ws = ctx.workspace(case_id)?;
            let message = ws.approve_dataset().await?;
            println!("{message}");
        }
        ReviewSubcommand::Shell { case_id } => {
            let mut ws = ctx.workspace(case_id)?;
            let report = ws.load().await;
            if let Err(e) = report.into_result() {
                if e.requires_login() {
                    return Err(e.into());
                }
                tracing::warn!(case_id, error = %e, "starting shell with partial data");
            }
            // Notifications raised by the initial load are already in the log.
            ws.take_notification();
            let stdin = BufReader::new(tokio::io::stdin());
            shell::run(&mut ws, stdin, tokio::io::stdout()).await?;
        }
    }
    Ok(())
}

/// Print every poll observation until polling ends.
async fn follow(poller: &mut palografico::poll::JobPoller) -> Result<(), CliError> {
    while let Some(event) = poller.next().await {
        print!("{}", shell::describe_event(&event));
        match event {
            PollEvent::Stopped(message) => return Err(CliError::PollStopped(message)),
            event if event.is_final() => return Ok(()),
            _ => {}
        }
    }
    Ok(())
}

async fn confirm(prompt: &str) -> Result<bool, CliError> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_notification(ws: &mut ReviewWorkspace<HttpApi>) {
    if let Some(notification) = ws.take_notification() {
        println!("{}", notification.message);
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

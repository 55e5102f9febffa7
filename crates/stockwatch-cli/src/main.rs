use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use stockwatch_client::email::DEFAULT_SMTP_PORT;
use stockwatch_client::fetcher::DEFAULT_ACCEPT_LANGUAGE;
use stockwatch_client::{
    EmailConfig, EmailNotifier, HtmlPageParser, ReqwestFetcher, TelegramNotifier,
};
use stockwatch_core::extract::{DEFAULT_IN_STOCK_PHRASES, DEFAULT_OUT_OF_STOCK_PHRASES};
use stockwatch_core::{
    AvailabilityExtractor, NotifierSet, RunOutcome, TracingWatchReporter, WatchService,
};
use stockwatch_store::config::DEFAULT_STATE_FILE;
use stockwatch_store::{FileStatusStore, StoreConfig};

/// Check a product page once and notify when it comes back in stock.
///
/// Exit codes: 0 available or undetermined, 1 out of stock, 2 page could
/// not be fetched. A notification channel that cannot be set up is skipped
/// with a warning; it never changes the exit code.
#[derive(Parser, Debug)]
#[command(name = "stockwatch", version)]
struct Cli {
    /// Product page URL
    #[arg(short, long, env = "WATCH_URL")]
    url: String,

    /// Status file path
    #[arg(long, env = "STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Fetch timeout in seconds
    #[arg(long, env = "TIMEOUT", default_value_t = 20)]
    timeout: u64,

    /// Accept-Language header sent with the page request
    #[arg(long, env = "ACCEPT_LANGUAGE", default_value = DEFAULT_ACCEPT_LANGUAGE)]
    accept_language: String,

    /// Comma-separated phrases meaning "in stock" (replaces the defaults)
    #[arg(long, env = "IN_STOCK_PHRASES", value_delimiter = ',')]
    in_stock_phrases: Vec<String>,

    /// Comma-separated phrases meaning "sold out" (replaces the defaults)
    #[arg(long, env = "OUT_OF_STOCK_PHRASES", value_delimiter = ',')]
    out_of_stock_phrases: Vec<String>,

    #[command(flatten)]
    telegram: TelegramArgs,

    #[command(flatten)]
    smtp: SmtpArgs,
}

#[derive(Args, Debug, Default)]
struct TelegramArgs {
    /// Telegram bot token
    #[arg(long, env = "TG_BOT_TOKEN", hide_env_values = true)]
    tg_bot_token: Option<String>,

    /// Telegram chat id to notify
    #[arg(long, env = "TG_CHAT_ID")]
    tg_chat_id: Option<String>,
}

#[derive(Args, Debug, Default)]
struct SmtpArgs {
    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    /// SMTP port (STARTTLS)
    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    smtp_port: u16,

    /// SMTP username
    #[arg(long, env = "SMTP_USER")]
    smtp_user: Option<String>,

    /// SMTP password
    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    smtp_pass: Option<String>,

    /// Notification recipient
    #[arg(long, env = "EMAIL_TO")]
    email_to: Option<String>,

    /// Sender address (defaults to the SMTP username)
    #[arg(long, env = "EMAIL_FROM")]
    email_from: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stockwatch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match run(cli).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("{e:#}");
            RunOutcome::FetchFailed
        }
    };

    ExitCode::from(outcome.exit_code())
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    let fetcher = ReqwestFetcher::with_options(
        Duration::from_secs(cli.timeout),
        &cli.accept_language,
    )
    .context("Failed to create HTTP client")?;

    let store_config = StoreConfig::from_path(cli.state_file.clone())
        .context("Invalid status file configuration")?;
    let store = FileStatusStore::from_config(&store_config);

    let notifiers = build_notifiers(&cli.telegram, &cli.smtp);
    if notifiers.is_empty() {
        tracing::debug!("No notification channels configured");
    }

    let service = WatchService::new(fetcher, HtmlPageParser::new(), store)
        .with_extractor(build_extractor(&cli))
        .with_notifiers(notifiers);

    let result = service.check(&cli.url, &TracingWatchReporter).await;
    if let Ok(report) = &result {
        println!("{}", report.availability());
    }

    Ok(RunOutcome::from_result(&result))
}

/// Phrase overrides replace the matching default list; the other list stays.
fn build_extractor(cli: &Cli) -> AvailabilityExtractor {
    let in_stock = phrases_or_default(&cli.in_stock_phrases, DEFAULT_IN_STOCK_PHRASES);
    let out_of_stock = phrases_or_default(&cli.out_of_stock_phrases, DEFAULT_OUT_OF_STOCK_PHRASES);
    AvailabilityExtractor::from_phrases(&in_stock, &out_of_stock)
}

fn phrases_or_default(given: &[String], default: &[&str]) -> Vec<String> {
    let given: Vec<String> = given
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if given.is_empty() {
        default.iter().map(|p| p.to_string()).collect()
    } else {
        given
    }
}

/// Channels are set up independently; one that cannot be built is logged
/// and left out so the check and the remaining channels still run.
fn build_notifiers(telegram: &TelegramArgs, smtp: &SmtpArgs) -> NotifierSet {
    let mut set = NotifierSet::new();

    match (&telegram.tg_bot_token, &telegram.tg_chat_id) {
        (Some(token), Some(chat_id)) => match TelegramNotifier::new(token, chat_id) {
            Ok(notifier) => set.push(notifier),
            Err(e) => tracing::warn!(error = %e, "Telegram disabled: failed to create client"),
        },
        (None, None) => {}
        _ => tracing::warn!("Telegram disabled: set both TG_BOT_TOKEN and TG_CHAT_ID"),
    }

    if let Some(config) = email_config(smtp) {
        match EmailNotifier::new(&config) {
            Ok(notifier) => set.push(notifier),
            Err(e) => tracing::warn!(error = %e, "Email disabled: invalid configuration"),
        }
    } else if smtp.smtp_host.is_some() || smtp.email_to.is_some() {
        tracing::warn!(
            "Email disabled: SMTP_HOST, SMTP_USER, SMTP_PASS and EMAIL_TO are all required"
        );
    }

    set
}

/// Email is enabled only when every required setting is present.
fn email_config(smtp: &SmtpArgs) -> Option<EmailConfig> {
    let host = smtp.smtp_host.clone()?;
    let username = smtp.smtp_user.clone()?;
    let password = smtp.smtp_pass.clone()?;
    let to = smtp.email_to.clone()?;
    let from = smtp.email_from.clone().unwrap_or_else(|| username.clone());

    Some(EmailConfig {
        host,
        port: smtp.smtp_port,
        username,
        password,
        from,
        to,
    })
}

mod api;
mod gateway;
mod markers;

#[cfg(test)]
mod testing;

use clap::{Parser, Subcommand};
use concierge_channels::twilio::TwilioAlertSender;
use concierge_core::{
    config::{self, shellexpand, Config, Prompts},
    message::IncomingMessage,
    traits::{AlertSender, Provider},
};
use concierge_memory::{CalendarFile, MissedLeadLog};
use concierge_providers::OpenAiProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "concierge",
    version,
    about = "Concierge — WhatsApp/SMS booking assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, env = "CONCIERGE_CONFIG", default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server.
    Start,
    /// Show configuration and collaborator health.
    Status,
    /// Run one message through the assistant and print the reply.
    Ask {
        /// Sender key the history is stored under.
        #[arg(long = "from", default_value = "cli")]
        sender: String,
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Clear one sender's conversation history.
    Reset {
        /// Sender key, e.g. `whatsapp:+27821234567`.
        sender: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.config)?;
    cfg.apply_env(|key| std::env::var(key).ok());

    let _log_guard = init_logging(&cfg, matches!(cli.command, Commands::Start));

    match cli.command {
        Commands::Start => {
            let provider = OpenAiProvider::new(&cfg.provider);
            if provider.requires_api_key() && cfg.provider.api_key.trim().is_empty() {
                anyhow::bail!(
                    "completion API key is empty. \
                     Set provider.api_key in config.toml or GROQ_API_KEY."
                );
            }

            config::install_bundled_prompts(&cfg.concierge.data_dir);
            let gateway = build_gateway(&cfg).await?;
            if !gateway.provider_is_available().await {
                warn!(
                    "provider '{}' did not answer the availability check; continuing",
                    gateway.provider_name()
                );
            }

            println!("Concierge — {} is starting...", cfg.concierge.name);
            api::serve(&cfg.api, Arc::new(gateway)).await?;
        }
        Commands::Status => {
            println!("Concierge — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Assistant: {}", cfg.concierge.name);
            println!();

            let provider = OpenAiProvider::new(&cfg.provider);
            println!(
                "  provider: {} ({}) {}",
                provider.name(),
                provider.model(),
                if provider.requires_api_key() && cfg.provider.api_key.is_empty() {
                    "missing api_key"
                } else if provider.is_available().await {
                    "available"
                } else {
                    "unreachable"
                }
            );

            let alerts = TwilioAlertSender::new(&cfg.alert);
            println!(
                "  alerts: {}",
                if alerts.is_configured() {
                    "configured"
                } else {
                    "not configured (escalations are logged only)"
                }
            );

            let store = concierge_memory::open(&cfg.memory).await?;
            println!("  memory: {}", store.name());
            println!(
                "  calendar: {}",
                shellexpand(&cfg.schedule.calendar_path)
            );
            println!(
                "  webhook: http://{}:{}{}",
                cfg.api.host, cfg.api.port, cfg.api.webhook_path
            );
        }
        Commands::Ask { sender, message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: concierge ask --from <sender> <message>");
            }

            let gateway = build_gateway(&cfg).await?;
            let incoming = IncomingMessage::new(sender, message.join(" "));
            let reply = gateway.handle_message(&incoming).await;
            info!("ask finished: {:?}", reply.outcome);
            println!("{}", reply.text);
        }
        Commands::Reset { sender } => {
            let store = concierge_memory::open(&cfg.memory).await?;
            store.reset(&sender).await?;
            println!("History cleared for {sender}");
        }
    }

    Ok(())
}

/// Console logging, plus a daily-rolling file under `{data_dir}/logs` for the server.
fn init_logging(cfg: &Config, to_file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.concierge.log_level));

    let (file_layer, guard) = if to_file {
        let dir = format!("{}/logs", shellexpand(&cfg.concierge.data_dir));
        let appender = tracing_appender::rolling::daily(dir, "concierge.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Wire the handler from configuration.
async fn build_gateway(cfg: &Config) -> anyhow::Result<gateway::Gateway> {
    let provider = Arc::new(OpenAiProvider::new(&cfg.provider));
    let store = concierge_memory::open(&cfg.memory).await?;
    let schedule = Arc::new(CalendarFile::new(shellexpand(&cfg.schedule.calendar_path)));
    let alerts = Arc::new(TwilioAlertSender::new(&cfg.alert));
    let leads = Arc::new(MissedLeadLog::new(shellexpand(&cfg.leads.missed_path)));

    if !alerts.is_configured() {
        warn!("Twilio credentials incomplete; escalations will not send SMS");
    }
    info!(
        "memory backend: {}, model: {}",
        store.name(),
        provider.model()
    );

    Ok(gateway::Gateway::new(
        provider,
        store,
        schedule,
        alerts,
        leads,
        Prompts::load(&cfg.concierge.data_dir),
        cfg.replies.clone(),
        Duration::from_secs(cfg.provider.timeout_secs),
    ))
}

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ripple_gateway::api::{self, ApiState};
use ripple_gateway::channels::SlackChannel;
use ripple_gateway::completion::CompletionClient;
use ripple_gateway::context::HistoryAssembler;
use ripple_gateway::dedup::EventDedup;
use ripple_gateway::dispatch::{Dispatcher, Pipeline};
use ripple_gateway::signature::SignatureVerifier;
use ripple_gateway::Config;

/// Ripple - Slack Events gateway bridging thread mentions to LLM completions
#[derive(Parser)]
#[command(name = "ripple", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "RIPPLE_PORT", default_value = "8080")]
    port: u16,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,ripple_gateway=info",
        1 => "info,ripple_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    if config.signing_secret.is_none() {
        tracing::warn!(
            "SLACK_SIGNING_SECRET is not set; all deliveries will be rejected with 500"
        );
    }

    tracing::info!(
        port = cli.port,
        model = %config.model,
        history_budget = config.history_budget,
        "starting ripple gateway"
    );

    let slack = Arc::new(SlackChannel::new(
        config.slack_api_base.clone(),
        config.bot_token.clone(),
    ));
    let history = HistoryAssembler::new(
        slack.clone(),
        config.bot_user_id.clone(),
        config.history_budget,
    );
    let completion = CompletionClient::new(
        config.completion_api_base.clone(),
        config.completion_api_key.clone(),
        config.model.clone(),
    );

    let dispatcher = Dispatcher::start(Pipeline::new(history, completion, slack));

    let state = Arc::new(ApiState {
        verifier: SignatureVerifier::new(config.signing_secret.clone()),
        bot_user_id: config.bot_user_id.clone(),
        dedup: Mutex::new(EventDedup::default()),
        dispatcher,
    });

    api::serve(state, cli.port).await?;
    Ok(())
}

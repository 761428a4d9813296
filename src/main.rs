use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::*;

use service::{config::Config, items, logging::Logger, Connector, Error};
use tiktok_auth::oauth::CallbackData;
use tiktok_node::{ExecutionMode, Operation, Resource};

#[derive(Parser)]
#[command(name = "tiktok_connector", version, about = "TikTok account connector")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the TikTok authorization URL and store the pending state
    Authorize {
        /// Redirect URI registered for the TikTok app
        #[arg(long)]
        redirect_uri: String,
        /// Correlation id echoed back in the callback state
        #[arg(long)]
        cid: Option<String>,
    },
    /// Complete an authorization from the redirect's callback URL or query string
    Callback {
        /// Callback URL or query string, e.g. `?code=...&state=...`
        query: Option<String>,
        /// Authorization code supplied directly
        #[arg(long)]
        code: Option<String>,
    },
    /// Refresh the stored access token
    Refresh,
    /// Check that the stored token works
    Test,
    /// Run one resource operation over a batch of items
    Execute {
        /// Resource, e.g. `videoPost`
        #[arg(long)]
        resource: Resource,
        /// Operation, e.g. `upload`
        #[arg(long)]
        operation: Operation,
        /// JSON file holding the array of input items
        #[arg(long)]
        items: PathBuf,
        /// Emit an error record for a failed item instead of stopping the batch
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Revoke the stored token and delete it
    Disconnect,
}

#[tokio::main]
async fn main() {
    // Load .env file first
    dotenv().ok();
    let cli = Cli::parse();
    Logger::init_logger(&cli.config);

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let connector = Connector::from_config(cli.config)?;

    match cli.command {
        Command::Authorize { redirect_uri, cid } => {
            let request = connector.authorize(&redirect_uri, cid).await?;
            println!("{}", request.url);
        }
        Command::Callback { query, code } => {
            let callback = CallbackData {
                raw_query_string: query,
                code,
                ..Default::default()
            };
            let data = connector.callback(&callback).await?;
            match data.user.as_ref().and_then(|u| u.label()) {
                Some(label) => info!("Connected TikTok account {}", label),
                None => info!("Connected TikTok account"),
            }
        }
        Command::Refresh => {
            let data = connector.refresh().await?;
            info!("Token refreshed, expires at {:?}", data.expires_at);
        }
        Command::Test => {
            println!("{}", connector.test_connection().await?);
        }
        Command::Execute {
            resource,
            operation,
            items: items_path,
            continue_on_fail,
        } => {
            let items = items::load_items(&items_path).await?;
            let mode = if continue_on_fail {
                ExecutionMode::ContinueOnFail
            } else {
                ExecutionMode::Abort
            };
            for record in connector.execute(resource, operation, &items, mode).await? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Command::Disconnect => connector.disconnect().await?,
    }

    Ok(())
}

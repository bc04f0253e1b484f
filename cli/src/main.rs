//! FactFund command-line client.

mod render;

use anyhow::Context;
use clap::Parser;
use factfund_client::transfer::guess_mime_type;
use factfund_client::{
    track, ClientConfig, FileUpload, FundingClient, ImageUpload, ProposalDraft, TracingNotifier,
};
use factfund_gateway::{GatewayClient, HttpBackend, HttpLedgerIndex};
use factfund_types::{E8s, Principal, ProposalId, Subaccount};
use factfund_utils::{format_duration, init_tracing, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "factfund", about = "FactFund crowdfunding client")]
struct Cli {
    /// Backend actor gateway URL.
    #[arg(long, env = "FACTFUND_BACKEND_URL")]
    backend_url: Option<String>,

    /// Ledger index gateway URL.
    #[arg(long, env = "FACTFUND_LEDGER_URL")]
    ledger_url: Option<String>,

    /// Milliseconds to wait for the ledger after a transfer.
    #[arg(long, env = "FACTFUND_SETTLE_DELAY_MS")]
    settle_delay_ms: Option<u64>,

    /// Whole-request timeout in seconds.
    #[arg(long, env = "FACTFUND_REQUEST_TIMEOUT")]
    request_timeout_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FACTFUND_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FACTFUND_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "FACTFUND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show the caller's balance and recent transactions.
    Profile,

    /// List recent proposals.
    Proposals {
        /// Only proposals created by the caller.
        #[arg(long)]
        mine: bool,
        #[arg(long, default_value_t = 10)]
        count: u64,
    },

    /// Show one proposal with its attachments.
    Show { id: ProposalId },

    /// Create a proposal.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Funding goal in tokens, e.g. "12.5".
        #[arg(long, value_parser = E8s::parse_tokens)]
        goal: E8s,
        /// Cover image file.
        #[arg(long)]
        image: PathBuf,
    },

    /// Donate to a proposal.
    Donate {
        id: ProposalId,
        #[arg(value_parser = E8s::parse_tokens)]
        amount: E8s,
    },

    /// Claim a fully funded proposal you created.
    Claim { id: ProposalId },

    /// Withdraw available funds to another principal.
    Withdraw {
        #[arg(value_parser = E8s::parse_tokens)]
        amount: E8s,
        recipient: Principal,
        /// Destination subaccount as 64 hex digits.
        #[arg(long)]
        subaccount: Option<Subaccount>,
    },

    /// List a proposal's attachments.
    Files { id: ProposalId },

    /// Attach a file to a proposal.
    Upload {
        id: ProposalId,
        path: PathBuf,
        /// Mime type; guessed from the extension when omitted.
        #[arg(long)]
        mime: Option<String>,
    },

    /// Download an attachment.
    Download {
        id: ProposalId,
        name: String,
        /// Directory to save into.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Delete an attachment.
    DeleteFile { id: ProposalId, name: String },
}

type Client = FundingClient<HttpBackend, HttpLedgerIndex>;

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(url) = &cli.ledger_url {
        config.ledger_url = url.clone();
    }
    if let Some(ms) = cli.settle_delay_ms {
        config.settle_delay_ms = ms;
    }
    if let Some(secs) = cli.request_timeout_secs {
        config.request_timeout_secs = secs;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_tracing(&config.log_level, log_format);
    if cli.config.is_some() {
        tracing::debug!(
            backend = %config.backend_url,
            ledger = %config.ledger_url,
            "loaded config"
        );
    }

    let (backend_gw, ledger_gw) = GatewayClient::pair_from_config(&config)?;
    let client: Client = FundingClient::new(
        HttpBackend::new(backend_gw),
        HttpLedgerIndex::new(ledger_gw),
        &config,
    );

    run(&client, cli.command).await
}

async fn run(client: &Client, command: Command) -> anyhow::Result<()> {
    let notifier = TracingNotifier;
    let settle = format_duration(client.settle_delay().as_millis() as u64);

    match command {
        Command::Profile => {
            let profile = track(
                &notifier,
                "Loading profile...",
                |p| format!("Loaded {} transactions", p.transactions.len()),
                client.profile(),
            )
            .await?;
            println!("{}", render::profile(&profile));
        }

        Command::Proposals { mine, count } => {
            let views = if mine {
                track(
                    &notifier,
                    "Loading your proposals...",
                    |v: &Vec<_>| format!("{} proposals", v.len()),
                    client.my_latest_proposals(count),
                )
                .await?
            } else {
                track(
                    &notifier,
                    "Loading proposals...",
                    |v: &Vec<_>| format!("{} proposals", v.len()),
                    client.latest_proposals(count),
                )
                .await?
            };
            for view in &views {
                println!("{}", render::proposal_line(view));
            }
        }

        Command::Show { id } => {
            let view = track(
                &notifier,
                format!("Loading proposal {id}..."),
                |v| format!("Loaded {}", v.proposal.title),
                client.proposal(id),
            )
            .await?;
            let files = client.list_files(id).await?;
            println!("{}", render::proposal(&view, &files));
        }

        Command::Create {
            name,
            title,
            description,
            goal,
            image,
        } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("reading cover image {}", image.display()))?;
            let draft = ProposalDraft {
                name,
                title,
                description,
                goal,
                image: ImageUpload {
                    mime_type: guess_mime_type(&image).to_string(),
                    bytes,
                },
            };
            let id = track(
                &notifier,
                "Creating proposal...",
                |id| format!("Proposal {id} created"),
                client.create_proposal(draft),
            )
            .await?;
            println!("{}", id.get());
        }

        Command::Donate { id, amount } => {
            let receipt = track(
                &notifier,
                format!("Donating {amount} to {id} (settling takes {settle})..."),
                |r| format!("Donated; {id} has raised {}", r.proposal.raised),
                client.donate(id, amount),
            )
            .await?;
            println!("{}", render::proposal_line(&receipt.proposal));
            println!("{}", render::balance(&receipt.balance));
        }

        Command::Claim { id } => {
            let receipt = track(
                &notifier,
                format!("Claiming {id}..."),
                |r| format!("Claim {:?}", r.outcome),
                client.claim(id),
            )
            .await?;
            println!("{}", render::proposal_line(&receipt.proposal));
            println!("{}", render::balance(&receipt.balance));
        }

        Command::Withdraw {
            amount,
            recipient,
            subaccount,
        } => {
            let balance = track(
                &notifier,
                format!("Withdrawing {amount} to {recipient}..."),
                |b| format!("Withdrawn; {} available", b.available),
                client.withdraw(amount, &recipient, subaccount),
            )
            .await?;
            println!("{}", render::balance(&balance));
        }

        Command::Files { id } => {
            let files = track(
                &notifier,
                format!("Loading files of {id}..."),
                |f: &Vec<_>| format!("{} files", f.len()),
                client.list_files(id),
            )
            .await?;
            println!("{}", render::files_list(&files));
        }

        Command::Upload { id, path, mime } => {
            let file = FileUpload::from_path(&path, mime)?;
            let summary = track(
                &notifier,
                format!("Uploading {}...", file.name),
                |s| format!("Uploaded {} in {} chunks", s.file_name, s.total_chunks),
                client.upload_file(id, &file, |percent| eprint!("\r{percent:>3}%")),
            )
            .await;
            eprintln!();
            let summary = summary?;
            println!("{}", render::files_list(&summary.files));
        }

        Command::Download { id, name, out } => {
            let files = client.list_files(id).await?;
            let file_type = files
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.file_type.as_str())
                .unwrap_or_default();
            let downloaded = track(
                &notifier,
                format!("Downloading {name}..."),
                |d| format!("Downloaded {} bytes", d.bytes.len()),
                client.download_file(id, &name, file_type),
            )
            .await?;
            let path = downloaded.save_into(&out)?;
            println!("{}", path.display());
        }

        Command::DeleteFile { id, name } => {
            let files = track(
                &notifier,
                format!("Deleting {name}..."),
                |_| format!("Deleted {name}"),
                client.delete_file(id, &name),
            )
            .await?;
            println!("{}", render::files_list(&files));
        }
    }

    Ok(())
}

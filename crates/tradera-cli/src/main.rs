//! Tradera CLI - a thin command-line caller for the Tradera SOAP API.
//!
//! Credentials come from the environment (or a `.env` file). The user
//! session obtained with `fetch-token` is kept in the data directory so
//! later commands can make restricted calls. Results are printed as JSON.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradera_core::api::TraderaClient;
use tradera_core::auth::{generate_login_url, AuthInfo, SessionStore};
use tradera_core::models::{FeedbackType, ItemRequest, TransactionStatus};
use tradera_core::Config;

#[derive(Parser, Debug)]
#[command(name = "tradera", author, version, about = "Command-line client for the Tradera SOAP API")]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print the call budget after the command
    #[arg(long, global = true)]
    show_rate_limit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the effective configuration with secrets masked
    Config,
    /// Print the token login URL and its secret key
    LoginUrl {
        /// Reuse a secret key instead of generating one
        #[arg(long)]
        secret_key: Option<String>,
    },
    /// Record the user id and expiration delivered by the login redirect
    AuthInfo {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        expires: Option<String>,
    },
    /// Redeem a secret key for a user token and store the session
    FetchToken {
        /// Defaults to the user id recorded with `auth-info`
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long)]
        secret_key: String,
    },
    /// List the category tree
    Categories,
    /// List item fields for a category
    FieldValues {
        #[arg(long)]
        category: i64,
    },
    ShippingOptions,
    PaymentOptions {
        #[arg(long)]
        member_id: Option<i64>,
    },
    SellerItems {
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Show one listing
    Item {
        #[arg(long)]
        id: i64,
    },
    ShopSettings,
    /// List seller transactions, dates as YYYY-MM-DD
    Transactions {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Create a listing
    AddItem {
        /// Read the full item request from a JSON file
        #[arg(long, conflicts_with_all = ["title", "description", "category"])]
        from_file: Option<PathBuf>,
        #[arg(long, required_unless_present = "from_file")]
        title: Option<String>,
        #[arg(long, required_unless_present = "from_file")]
        description: Option<String>,
        #[arg(long, required_unless_present = "from_file")]
        category: Option<i64>,
        /// Auction length in days (3-14)
        #[arg(long, default_value_t = 7)]
        duration: u32,
        /// Starting price in öre
        #[arg(long, default_value_t = 0)]
        start_price: i64,
        /// Buy-it-now price in öre
        #[arg(long, default_value_t = 0)]
        buy_it_now: i64,
        /// Leave the item uncommitted so images can be added
        #[arg(long)]
        no_commit: bool,
        /// Use AddItemXml instead of AddItem
        #[arg(long)]
        xml: bool,
        /// Image files to attach (implies --no-commit followed by a commit)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    CommitItem {
        #[arg(long)]
        id: i64,
    },
    EndItem {
        #[arg(long)]
        id: i64,
    },
    RemoveShopItem {
        #[arg(long)]
        id: i64,
    },
    /// Leave feedback on a transaction
    Feedback {
        #[arg(long)]
        transaction: i64,
        /// Positive, Neutral or Negative
        #[arg(long)]
        kind: FeedbackType,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Mark a transaction as Paid, Shipped, Delivered or Completed
    TransactionStatus {
        #[arg(long)]
        transaction: i64,
        #[arg(long)]
        status: TransactionStatus,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;
    debug!(command = ?cli.command, "Starting");

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("Failed to read configuration")?;
    let data_dir = Config::data_dir()?;
    let store = SessionStore::new(data_dir.clone());

    // Commands that need neither the network nor a client
    match &cli.command {
        Command::Config => {
            println!("{}", config.summary());
            println!("Data directory: {}", data_dir.display());
            return Ok(());
        }
        Command::LoginUrl { secret_key } => {
            config.validate()?;
            let login = generate_login_url(&config.app_id, &config.public_key, secret_key.as_deref());
            return print_json(&login);
        }
        Command::AuthInfo { user_id, expires } => {
            let info = AuthInfo::new(*user_id, expires.clone());
            info.save(&data_dir).context("Failed to save auth info")?;
            info!(user_id, "Auth info recorded");
            return print_json(&info);
        }
        _ => {}
    }

    let mut client = TraderaClient::connect(config)
        .await
        .context("Failed to connect to Tradera")?;
    if let Some(session) = store.load().context("Failed to load session")? {
        // An expired session only matters to restricted commands, which report it themselves
        if let Err(e) = client.restore_session(session) {
            warn!("Ignoring stored session: {}", e);
        }
    }

    match cli.command {
        Command::Config | Command::LoginUrl { .. } | Command::AuthInfo { .. } => {}
        Command::FetchToken { user_id, secret_key } => {
            let user_id = match user_id {
                Some(id) => id,
                None => match AuthInfo::load(&data_dir)? {
                    Some(info) => info.user_id,
                    None => bail!("No --user-id given and no auth info recorded; run `tradera auth-info` first"),
                },
            };
            client.fetch_token(user_id, &secret_key).await?;
            if let Some(session) = client.session() {
                store.save(session).context("Failed to save session")?;
                print_json(&json!({
                    "user_id": session.user_id,
                    "token": session.token_preview(),
                    "expires_at": session.expires_at,
                }))?;
            }
        }
        Command::Categories => print_json(&client.get_categories().await?)?,
        Command::FieldValues { category } => {
            print_json(&client.get_item_field_values(category).await?)?
        }
        Command::ShippingOptions => print_json(&client.get_shipping_options().await?)?,
        Command::PaymentOptions { member_id } => {
            print_json(&client.get_member_payment_options(member_id).await?)?
        }
        Command::SellerItems { user_id } => print_json(&client.get_seller_items(user_id).await?)?,
        Command::Item { id } => match client.get_item(id).await? {
            Some(item) => print_json(&item)?,
            None => bail!("Item {} not found", id),
        },
        Command::ShopSettings => print_json(&client.get_shop_settings().await?)?,
        Command::Transactions { from, to } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            print_json(&client.get_seller_transactions(from, to).await?)?
        }
        Command::AddItem {
            from_file,
            title,
            description,
            category,
            duration,
            start_price,
            buy_it_now,
            no_commit,
            xml,
            images,
        } => {
            let mut request = match from_file {
                Some(path) => {
                    let contents = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    serde_json::from_str::<ItemRequest>(&contents)
                        .with_context(|| format!("Failed to parse {}", path.display()))?
                }
                None => {
                    let mut request = ItemRequest::new(
                        title.unwrap_or_default(),
                        description.unwrap_or_default(),
                        category.unwrap_or_default(),
                    );
                    request.duration = duration;
                    request.start_price = start_price;
                    request.buy_it_now_price = buy_it_now;
                    request
                }
            };
            if no_commit || !images.is_empty() {
                request.auto_commit = false;
            }

            let added = if xml {
                client.add_item_xml(&request).await?
            } else {
                client.add_item(&request).await?
            };

            for path in &images {
                let data = std::fs::read(path)
                    .with_context(|| format!("Failed to read image {}", path.display()))?;
                let name = path.file_name().and_then(|n| n.to_str());
                client.add_item_image(added.item_id, &data, name).await?;
            }
            if !images.is_empty() && !no_commit {
                client.add_item_commit(added.item_id).await?;
            }
            print_json(&added)?;
        }
        Command::CommitItem { id } => {
            client.add_item_commit(id).await?;
            print_json(&json!({ "item_id": id, "committed": true }))?;
        }
        Command::EndItem { id } => {
            client.end_item(id).await?;
            print_json(&json!({ "item_id": id, "ended": true }))?;
        }
        Command::RemoveShopItem { id } => {
            client.remove_shop_item(id).await?;
            print_json(&json!({ "shop_item_id": id, "removed": true }))?;
        }
        Command::Feedback {
            transaction,
            kind,
            comment,
        } => {
            client.leave_feedback(transaction, kind, &comment).await?;
            print_json(&json!({ "transaction_id": transaction, "feedback": kind }))?;
        }
        Command::TransactionStatus {
            transaction,
            status,
        } => {
            client.update_transaction_status(transaction, status).await?;
            print_json(&json!({ "transaction_id": transaction, "status": status }))?;
        }
    }

    if cli.show_rate_limit {
        eprintln!("{}", serde_json::to_string_pretty(&client.rate_limit_info())?);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD` as midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", raw))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid time of day")?;
    Ok(midnight.and_utc())
}

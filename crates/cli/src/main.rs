mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use wallet_dashboard_core::errors::CoreError;
use wallet_dashboard_core::models::asset::{AssetKind, NewAsset, WalletAsset};
use wallet_dashboard_core::models::auth::{Credentials, NewUser, Role};
use wallet_dashboard_core::models::notification::{Notification, NotificationLevel};
use wallet_dashboard_core::models::settings::{ClientConfig, DEFAULT_BASE_URL};
use wallet_dashboard_core::services::session_store::LoginRedirect;
use wallet_dashboard_core::services::view_scope::ViewScope;
use wallet_dashboard_core::storage::manager::FileStore;
use wallet_dashboard_core::{Applied, WalletDashboard};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not determine a data directory; pass --session-file or set WALLET_SESSION_FILE")]
    NoDataDir,
    #[error("failed to read from stdin: {0}")]
    Stdin(#[from] io::Error),
    #[error("invalid value for {field}: {value:?}")]
    InvalidArg { field: &'static str, value: String },
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Parser, Debug)]
#[command(name = "wallet-dashboard", about = "Manage wallets and assets from the terminal")]
struct Cli {
    #[arg(long, env = "WALLET_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Where the session token is kept between runs.
    #[arg(long, env = "WALLET_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[arg(long, env = "WALLET_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the access token.
    Login {
        #[arg(long)]
        login: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "WALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create a new account.
    Signup(SignupArgs),
    /// Forget the stored token.
    Logout,
    /// Show whether a session is stored.
    Status,
    Wallets(WalletsCommand),
    Assets(AssetsCommand),
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    login: String,
    #[arg(long, env = "WALLET_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// admin or customer
    #[arg(long, default_value = "customer")]
    role: String,
}

#[derive(Args, Debug)]
struct WalletsCommand {
    #[command(subcommand)]
    command: WalletsSubcommand,
}

#[derive(Subcommand, Debug)]
enum WalletsSubcommand {
    List {
        /// Also fetch every wallet's assets.
        #[arg(long, default_value_t = false)]
        expand_all: bool,
    },
    /// Show one wallet with its assets.
    Show { wallet_id: String },
    Create { name: String },
    Rename { wallet_id: String, name: String },
    Delete { wallet_id: String },
}

#[derive(Args, Debug)]
struct AssetsCommand {
    #[command(subcommand)]
    command: AssetsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AssetsSubcommand {
    List { wallet_id: String },
    Create(CreateAssetArgs),
}

#[derive(Args, Debug)]
struct CreateAssetArgs {
    #[arg(long)]
    wallet: String,
    /// fixed or variable
    #[arg(long)]
    kind: String,
    #[arg(long)]
    identifier: String,
    #[arg(long, default_value = "")]
    class: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    custody: String,
    #[arg(long)]
    currency: String,
    #[arg(long)]
    total: f64,
    #[arg(long = "yield", default_value_t = 0.0)]
    yield_rate: f64,
    /// YYYY-MM-DD, defaults to today.
    #[arg(long)]
    acquired: Option<String>,
}

/// Forced logout lands here: there is no login page to navigate to, so say what to run.
struct TerminalRedirect;

impl LoginRedirect for TerminalRedirect {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Run `wallet-dashboard login` to sign in again.");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(notification) => {
            emit(&notification);
            if notification.level == NotificationLevel::Error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            emit(&Notification {
                title: "Error".into(),
                description: Some(e.to_string()),
                level: NotificationLevel::Error,
            });
            ExitCode::FAILURE
        }
    }
}

/// API failures come back as an error notification inside `Ok`;
/// `Err` is reserved for setup and argument problems.
async fn run(cli: Cli) -> Result<Notification, CliError> {
    let session_file = match cli.session_file {
        Some(path) => path,
        None => dirs::data_dir()
            .ok_or(CliError::NoDataDir)?
            .join("wallet-dashboard")
            .join("session.json"),
    };
    tracing::debug!(path = %session_file.display(), base_url = %cli.base_url, "starting");
    let config =
        ClientConfig::new(&cli.base_url)?.with_timeout(Duration::from_secs(cli.timeout_secs));
    let storage = Arc::new(FileStore::open(session_file)?);
    let mut dashboard =
        WalletDashboard::connect(config, storage)?.with_redirect(Box::new(TerminalRedirect));

    let notification = match cli.command {
        Command::Login { login, password } => {
            let password = password_or_prompt(password)?;
            let credentials = Credentials::new(login, password)?;
            match dashboard.login(&credentials).await {
                Ok(()) => Notification::success("Login successful"),
                Err(e @ CoreError::Unauthorized { message: None, .. }) => {
                    Notification::failure("Login failed", &e)
                        .with_description("Invalid credentials")
                }
                Err(e) => Notification::failure("Login failed", &e),
            }
        }
        Command::Signup(args) => {
            let password = password_or_prompt(args.password)?;
            let role = Role::parse(&args.role).ok_or(CliError::InvalidArg {
                field: "role",
                value: args.role.clone(),
            })?;
            let user = NewUser {
                login: args.login,
                password,
                name: args.name,
                email: args.email,
                role,
            };
            match dashboard.signup(&user).await {
                Ok(message) => Notification::success("Account created successfully")
                    .with_description(
                        message.unwrap_or_else(|| "Your account has been created".into()),
                    ),
                Err(e) => Notification::failure("Signup failed", &e),
            }
        }
        Command::Logout => match dashboard.logout() {
            Ok(()) => Notification::success("Logged out"),
            Err(e) => Notification::failure("Logout failed", &e),
        },
        Command::Status => {
            if dashboard.is_authenticated() {
                Notification::info("Logged in")
            } else {
                Notification::info("Not logged in")
            }
        }
        Command::Wallets(cmd) => wallets(&mut dashboard, cmd.command).await,
        Command::Assets(cmd) => assets(&mut dashboard, cmd.command).await?,
    };

    Ok(notification)
}

async fn wallets(dashboard: &mut WalletDashboard, command: WalletsSubcommand) -> Notification {
    match command {
        WalletsSubcommand::List { expand_all } => {
            if let Err(e) = dashboard.refresh_wallets().await {
                return Notification::failure("Failed to load wallets", &e);
            }
            if expand_all {
                if let Err(e) = load_all_assets(dashboard).await {
                    return Notification::failure("Failed to load assets", &e);
                }
            }
            print!("{}", render::wallet_table(dashboard.view(), expand_all));
            Notification::info(format!("{} wallet(s)", dashboard.wallets().len()))
        }
        WalletsSubcommand::Show { wallet_id } => {
            if let Err(e) = dashboard.refresh_wallets().await {
                return Notification::failure("Failed to load wallets", &e);
            }
            match dashboard.toggle_wallet(&wallet_id).await {
                Ok(_) => {
                    print!("{}", render::wallet_table(dashboard.view(), true));
                    Notification::info(format!("Wallet {wallet_id}"))
                }
                Err(e) => Notification::failure("Failed to load wallet", &e),
            }
        }
        WalletsSubcommand::Create { name } => match dashboard.create_wallet(&name).await {
            Ok(applied) => applied_notification("Wallet created", Some(name), applied),
            Err(e) => Notification::failure("Failed to create wallet", &e),
        },
        WalletsSubcommand::Rename { wallet_id, name } => {
            match dashboard.rename_wallet(&wallet_id, &name).await {
                Ok(applied) => applied_notification("Wallet renamed", Some(name), applied),
                Err(e) => Notification::failure("Failed to rename wallet", &e),
            }
        }
        WalletsSubcommand::Delete { wallet_id } => match dashboard.delete_wallet(&wallet_id).await {
            Ok(applied) => applied_notification("Wallet deleted", None, applied),
            Err(e) => Notification::failure("Failed to delete wallet", &e),
        },
    }
}

async fn assets(
    dashboard: &mut WalletDashboard,
    command: AssetsSubcommand,
) -> Result<Notification, CliError> {
    Ok(match command {
        AssetsSubcommand::List { wallet_id } => {
            if let Err(e) = dashboard.refresh_wallets().await {
                return Ok(Notification::failure("Failed to load wallets", &e));
            }
            match dashboard.load_assets(&wallet_id).await {
                Ok(assets) => {
                    print!("{}", render::asset_table(assets));
                    Notification::info(format!("{} asset(s)", assets.len()))
                }
                Err(e) => Notification::failure("Failed to load assets", &e),
            }
        }
        AssetsSubcommand::Create(args) => {
            let asset = new_asset(args)?;
            match dashboard.create_asset(&asset).await {
                Ok(applied) => applied_notification("Asset created", Some(asset.name), applied),
                Err(e) => Notification::failure("Failed to create asset", &e),
            }
        }
    })
}

/// Fetch every wallet's assets concurrently. Ctrl-C tears the scope down and
/// discards whatever is still in flight.
async fn load_all_assets(dashboard: &mut WalletDashboard) -> Result<(), CoreError> {
    type Fetched = (String, Result<Vec<WalletAsset>, CoreError>);

    let mut scope: ViewScope<Fetched> = ViewScope::new("wallets");
    for wallet in dashboard.wallets() {
        let client = dashboard.client();
        let wallet_id = wallet.id.clone();
        scope.spawn(async move {
            let result = client.wallet_assets(&wallet_id).await;
            (wallet_id, result)
        });
    }

    loop {
        let next = tokio::select! {
            next = scope.next() => Some(next),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(next) = next else {
            scope.cancel_all();
            return Err(CoreError::Cancelled);
        };
        let Some((wallet_id, result)) = next else {
            return Ok(());
        };
        let applied = result.and_then(|assets| dashboard.apply_assets(&wallet_id, assets));
        if let Err(e) = applied {
            dashboard.handle_error(&e);
            scope.cancel_all();
            return Err(e);
        }
    }
}

/// Success toast for a change the server accepted, noting a stale listing.
fn applied_notification(title: &str, detail: Option<String>, applied: Applied) -> Notification {
    let stale = applied
        .refresh_error
        .map(|e| format!("wallet list not refreshed: {}", e.message()));
    let description = match (detail, stale) {
        (Some(d), Some(s)) => Some(format!("{d} ({s})")),
        (d, s) => d.or(s),
    };
    let notification = Notification::success(title);
    match description {
        Some(d) => notification.with_description(d),
        None => notification,
    }
}

fn new_asset(args: CreateAssetArgs) -> Result<NewAsset, CliError> {
    let asset = AssetKind::parse(&args.kind).ok_or(CliError::InvalidArg {
        field: "kind",
        value: args.kind.clone(),
    })?;
    let acquired = match args.acquired {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| CliError::InvalidArg { field: "acquired", value: raw })?,
        None => chrono::Local::now().date_naive(),
    };
    Ok(NewAsset {
        wallet_id: args.wallet,
        asset,
        identifier: args.identifier,
        class: args.class,
        name: args.name,
        custody: args.custody,
        currency: args.currency.to_uppercase(),
        total: args.total,
        yield_rate: args.yield_rate,
        acquired,
    })
}

fn password_or_prompt(password: Option<String>) -> Result<String, CliError> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn emit(notification: &Notification) {
    match notification.level {
        NotificationLevel::Error => eprintln!("{notification}"),
        NotificationLevel::Success | NotificationLevel::Info => println!("{notification}"),
    }
}

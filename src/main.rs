use clap::{Parser, Subcommand};
use clc_cold_wallet::{
    config::AppConfig,
    crypto::WalletFormat,
    error::ErrorKind,
    ledger::{HttpLedger, Ledger},
    prompt::TerminalPrompt,
    session::SessionStore,
    CoinId, CommandRunner, WalletError, WalletResult,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clc-cold-wallet")]
#[command(version, about = "A CLI tool made to store CLCs locally")]
struct Cli {
    /// Ledger base URL (overrides config)
    #[arg(long, global = true)]
    ledger_url: Option<String>,

    /// Session file location (overrides config)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt a .wallet file and load it to do operations on
    Decrypt {
        path: PathBuf,
        /// Print the decrypted wallet
        #[arg(short, long)]
        print: bool,
    },
    /// Encrypt the loaded wallet to a .wallet file and unload it
    Logout {
        path: PathBuf,
        /// Write the authenticated (AES-GCM) envelope
        #[arg(long)]
        sealed: bool,
    },
    /// Get the balance of your wallet
    #[command(alias = "ballance")]
    Balance,
    /// Get all coins and public keys in your wallet
    Coins {
        /// Check that the ledger still lists this wallet as holder
        #[arg(short, long)]
        validate: bool,
        /// Show the value of each coin
        #[arg(long = "val")]
        val: bool,
    },
    /// Permanently delete a coin from your wallet
    Delete {
        id: CoinId,
        /// Skip retyping the coin id
        #[arg(short, long)]
        confirm: bool,
    },
    /// Add a .coin file to your wallet
    Add {
        cpath: PathBuf,
        /// Check ownership with the ledger before adding
        #[arg(short, long)]
        validate: bool,
    },
    /// Get secret of coin <id>
    Private { id: CoinId },
    /// Generate a pair of public and private keys
    Keys {
        /// Derive the public key of this private key instead
        #[arg(short = 'p', long = "private")]
        private: Option<String>,
    },
    /// Transact coin <id> to address <addr>
    Transact { id: CoinId, addr: String },
    /// Merge <vol> of coin <id> CLCs into coin <target>
    Merge {
        id: CoinId,
        target: CoinId,
        vol: String,
    },
    /// Split off <vol> CLCs from coin <id>
    Split { id: CoinId, vol: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clc_cold_wallet=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(url) = cli.ledger_url {
        config.ledger.url = url;
    }
    if let Some(path) = cli.session {
        config.session.path = Some(path);
    }
    debug!("Configuration loaded: {:?}", config);

    let sessions = SessionStore::new(config.session.resolve_path()?);
    let ledger = HttpLedger::new(&config.ledger)?;
    let mut runner = CommandRunner::new(sessions, ledger, TerminalPrompt, io::stdout())
        .with_format(config.wallet.format);

    if let Err(e) = dispatch(&mut runner, cli.command).await {
        report(&e);
        std::process::exit(1);
    }

    Ok(())
}

async fn dispatch<L, W>(
    runner: &mut CommandRunner<L, TerminalPrompt, W>,
    command: Commands,
) -> WalletResult<()>
where
    L: Ledger,
    W: Write,
{
    match command {
        Commands::Decrypt { path, print } => runner.decrypt(&path, print),
        Commands::Logout { path, sealed } => {
            runner.logout(&path, sealed.then_some(WalletFormat::Sealed))
        }
        Commands::Balance => runner.balance().await.map(|_| ()),
        Commands::Coins { validate, val } => runner.coins(validate, val).await,
        Commands::Delete { id, confirm } => runner.delete(id, confirm),
        Commands::Add { cpath, validate } => runner.add(&cpath, validate).await.map(|_| ()),
        Commands::Private { id } => runner.private(id),
        Commands::Keys { private } => runner.keys(private.as_deref()),
        Commands::Transact { id, addr } => runner.transact(id, &addr).await,
        Commands::Merge { id, target, vol } => runner.merge(id, target, &vol).await,
        Commands::Split { id, vol } => runner.split(id, &vol).await.map(|_| ()),
    }
}

/// Print a failed command the way the user needs to see it.
fn report(error: &WalletError) {
    match error.kind() {
        ErrorKind::Remote => println!("\nLedger refused the request, {}", error),
        ErrorKind::Transport | ErrorKind::Local => eprintln!("\nError: {}", error),
        ErrorKind::Precondition | ErrorKind::Authentication | ErrorKind::Confirmation => {
            println!("\n{}", error)
        }
    }
}

//! Rayls operator console — deploy and drive a token ledger from the shell.
//!
//! State lives in a single JSON snapshot file; every mutating command
//! loads it, applies one ledger operation and writes it back atomically.

use std::path::{Path, PathBuf};

use clap::Parser;

use rayls_ledger::{EventBus, TokenEvent, TokenLedger, TokenMetadata};
use rayls_types::{Principal, TokenAmount};

mod config;
mod error;
mod logging;
mod store;

pub use error::CliError;

use config::DeployConfig;
use logging::{init_logging, LogFormat};
use store::LedgerStore;

#[derive(Parser)]
#[command(name = "rayls", about = "Rayls token ledger operator console")]
struct Cli {
    /// Path to the ledger state file.
    #[arg(long, default_value = "./rayls_ledger.json", env = "RAYLS_STATE")]
    state: PathBuf,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "RAYLS_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "RAYLS_LOG_FORMAT")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Deploy a new token ledger into the state file.
    Deploy {
        /// Principal that deploys the ledger and becomes its owner.
        #[arg(long, env = "RAYLS_DEPLOYER")]
        deployer: String,

        /// Token name (overrides the config file).
        #[arg(long)]
        name: Option<String>,

        /// Token ticker symbol (overrides the config file).
        #[arg(long)]
        symbol: Option<String>,

        /// Initial supply in whole tokens (overrides the config file).
        #[arg(long)]
        supply: Option<String>,

        /// Path to a TOML deployment config. If provided, file settings
        /// are used as the base; CLI flags override them.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print token metadata, supply and owner.
    Info,

    /// Print the balance of a principal.
    Balance {
        /// Principal to query.
        principal: String,
    },

    /// Print the allowance one principal has granted another.
    Allowance {
        /// Principal whose balance the grant draws from.
        owner: String,

        /// Principal allowed to spend.
        spender: String,
    },

    /// Move tokens from the caller to a recipient.
    Transfer {
        /// Principal performing the operation.
        #[arg(long, env = "RAYLS_CALLER")]
        caller: String,

        /// Recipient principal.
        #[arg(long)]
        to: String,

        /// Amount in whole tokens (decimal, e.g. "1.5").
        #[arg(long)]
        amount: String,
    },

    /// Grant a spender an allowance over the caller's balance.
    Approve {
        /// Principal performing the operation.
        #[arg(long, env = "RAYLS_CALLER")]
        caller: String,

        /// Principal allowed to spend.
        #[arg(long)]
        spender: String,

        /// Absolute allowance in whole tokens; replaces any previous grant.
        #[arg(long)]
        amount: String,
    },

    /// Spend a previously granted allowance.
    TransferFrom {
        /// Principal performing the operation.
        #[arg(long, env = "RAYLS_CALLER")]
        caller: String,

        /// Principal whose tokens are spent.
        #[arg(long)]
        owner: String,

        /// Recipient principal.
        #[arg(long)]
        to: String,

        /// Amount in whole tokens.
        #[arg(long)]
        amount: String,
    },

    /// Create new tokens (ledger owner only).
    Mint {
        /// Principal performing the operation.
        #[arg(long, env = "RAYLS_CALLER")]
        caller: String,

        /// Recipient principal.
        #[arg(long)]
        to: String,

        /// Amount in whole tokens.
        #[arg(long)]
        amount: String,
    },

    /// Destroy tokens from the caller's balance.
    Burn {
        /// Principal performing the operation.
        #[arg(long, env = "RAYLS_CALLER")]
        caller: String,

        /// Amount in whole tokens.
        #[arg(long)]
        amount: String,
    },

    /// Hand the owner role to another principal (ledger owner only).
    TransferOwnership {
        /// Principal performing the operation.
        #[arg(long, env = "RAYLS_CALLER")]
        caller: String,

        /// Principal receiving the owner role.
        #[arg(long)]
        new_owner: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = match cli.log_format.to_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Human,
    };
    init_logging(format, &cli.log_level);

    let store = LedgerStore::new(&cli.state);

    match cli.command {
        Command::Deploy {
            deployer,
            name,
            symbol,
            supply,
            config,
        } => deploy(&store, &deployer, name, symbol, supply, config.as_deref())?,
        Command::Info => info(&store)?,
        Command::Balance { principal } => balance(&store, &principal)?,
        Command::Allowance { owner, spender } => allowance(&store, &owner, &spender)?,
        Command::Transfer { caller, to, amount } => transfer(&store, &caller, &to, &amount)?,
        Command::Approve {
            caller,
            spender,
            amount,
        } => approve(&store, &caller, &spender, &amount)?,
        Command::TransferFrom {
            caller,
            owner,
            to,
            amount,
        } => transfer_from(&store, &caller, &owner, &to, &amount)?,
        Command::Mint { caller, to, amount } => mint(&store, &caller, &to, &amount)?,
        Command::Burn { caller, amount } => burn(&store, &caller, &amount)?,
        Command::TransferOwnership { caller, new_owner } => {
            transfer_ownership(&store, &caller, &new_owner)?
        }
    }

    Ok(())
}

// ── Command handlers ───────────────────────────────────────────────────

fn deploy(
    store: &LedgerStore,
    deployer: &str,
    name: Option<String>,
    symbol: Option<String>,
    supply: Option<String>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    if store.exists() {
        return Err(CliError::Config(format!(
            "state file {} already exists; refusing to overwrite a deployed ledger",
            store.path().display()
        )));
    }

    let base = match config {
        Some(path) => {
            let cfg = DeployConfig::from_toml_file(path)?;
            tracing::info!("loaded deploy config from {}", path.display());
            cfg
        }
        None => DeployConfig::default(),
    };
    let name = name.unwrap_or(base.name);
    let symbol = symbol.unwrap_or(base.symbol);
    let supply_text = supply.unwrap_or(base.initial_supply);

    let deployer: Principal = deployer.parse()?;
    let supply: TokenAmount = supply_text.parse()?;

    let ledger = TokenLedger::create_with_events(
        TokenMetadata::new(&name, &symbol),
        supply,
        deployer,
        event_logging_bus(),
    )?;
    store.save(&ledger)?;

    println!("deployed {name} ({symbol})");
    println!("owner:        {deployer}");
    println!("total supply: {} {symbol}", ledger.total_supply());
    println!("state file:   {}", store.path().display());
    Ok(())
}

fn info(store: &LedgerStore) -> Result<(), CliError> {
    let ledger = store.load()?;
    println!("name:         {}", ledger.name());
    println!("symbol:       {}", ledger.symbol());
    println!("decimals:     {}", ledger.decimals());
    println!("owner:        {}", ledger.owner());
    println!("total supply: {} {}", ledger.total_supply(), ledger.symbol());
    println!("holders:      {}", ledger.holder_count());
    Ok(())
}

fn balance(store: &LedgerStore, principal: &str) -> Result<(), CliError> {
    let ledger = store.load()?;
    let principal: Principal = principal.parse()?;
    println!("{} {}", ledger.balance_of(principal), ledger.symbol());
    Ok(())
}

fn allowance(store: &LedgerStore, owner: &str, spender: &str) -> Result<(), CliError> {
    let ledger = store.load()?;
    let owner: Principal = owner.parse()?;
    let spender: Principal = spender.parse()?;
    println!("{} {}", ledger.allowance(owner, spender), ledger.symbol());
    Ok(())
}

fn transfer(store: &LedgerStore, caller: &str, to: &str, amount: &str) -> Result<(), CliError> {
    let caller: Principal = caller.parse()?;
    let to: Principal = to.parse()?;
    let amount: TokenAmount = amount.parse()?;
    with_ledger(store, |ledger| Ok(ledger.transfer(caller, to, amount)?))
}

fn approve(store: &LedgerStore, caller: &str, spender: &str, amount: &str) -> Result<(), CliError> {
    let caller: Principal = caller.parse()?;
    let spender: Principal = spender.parse()?;
    let amount: TokenAmount = amount.parse()?;
    with_ledger(store, |ledger| Ok(ledger.approve(caller, spender, amount)?))
}

fn transfer_from(
    store: &LedgerStore,
    caller: &str,
    owner: &str,
    to: &str,
    amount: &str,
) -> Result<(), CliError> {
    let caller: Principal = caller.parse()?;
    let owner: Principal = owner.parse()?;
    let to: Principal = to.parse()?;
    let amount: TokenAmount = amount.parse()?;
    with_ledger(store, |ledger| {
        Ok(ledger.transfer_from(caller, owner, to, amount)?)
    })
}

fn mint(store: &LedgerStore, caller: &str, to: &str, amount: &str) -> Result<(), CliError> {
    let caller: Principal = caller.parse()?;
    let to: Principal = to.parse()?;
    let amount: TokenAmount = amount.parse()?;
    with_ledger(store, |ledger| Ok(ledger.mint(caller, to, amount)?))
}

fn burn(store: &LedgerStore, caller: &str, amount: &str) -> Result<(), CliError> {
    let caller: Principal = caller.parse()?;
    let amount: TokenAmount = amount.parse()?;
    with_ledger(store, |ledger| Ok(ledger.burn(caller, amount)?))
}

fn transfer_ownership(store: &LedgerStore, caller: &str, new_owner: &str) -> Result<(), CliError> {
    let caller: Principal = caller.parse()?;
    let new_owner: Principal = new_owner.parse()?;
    with_ledger(store, |ledger| {
        ledger.transfer_ownership(caller, new_owner)?;
        tracing::info!("ownership transferred to {new_owner}");
        Ok(())
    })
}

// ── Shared plumbing ────────────────────────────────────────────────────

/// Load the ledger, run one operation with event logging wired up, and
/// save the result. Nothing is written back if the operation fails.
fn with_ledger(
    store: &LedgerStore,
    op: impl FnOnce(&mut TokenLedger) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let mut ledger = store.load()?;
    ledger.subscribe(Box::new(log_event));
    op(&mut ledger)?;
    store.save(&ledger)
}

/// Emit each ledger event as a structured log line.
fn log_event(event: &TokenEvent) {
    match event {
        TokenEvent::Transfer { from, to, amount } if from.is_zero() => {
            tracing::info!("minted {amount} to {to}");
        }
        TokenEvent::Transfer { from, to, amount } if to.is_zero() => {
            tracing::info!("burned {amount} from {from}");
        }
        TokenEvent::Transfer { from, to, amount } => {
            tracing::info!("transfer {amount} from {from} to {to}");
        }
        TokenEvent::Approval {
            owner,
            spender,
            amount,
        } => {
            tracing::info!("approval: {owner} grants {spender} up to {amount}");
        }
    }
}

fn event_logging_bus() -> EventBus {
    let mut bus = EventBus::new();
    bus.subscribe(Box::new(log_event));
    bus
}

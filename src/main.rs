//! Roulette Ledger CLI
//!
//! Drives a file-backed ledger: every command loads the snapshot, applies
//! one operation and writes it back.

use clap::{Parser, Subcommand};
use roulette_ledger::{
    config::{generate_sample_config, ConfigLoader, RouletteConfig},
    errors::{ConfigurationError, RouletteResult, StorageError},
    game_store::{load_snapshot, save_snapshot},
    games::{
        Address, Amount, BetId, PayoutTable, RandomWord, RandomnessOracle, RawSelector, RequestId,
        VrfOracle, WagerController,
    },
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Seed used when no oracle is configured; local use only
const DEV_ORACLE_SEED: [u8; 32] = [0x52; 32];

/// Roulette Ledger CLI
#[derive(Parser)]
#[command(name = "roulette-ledger")]
#[command(about = "Single-zero roulette wagering ledger with a VRF randomness oracle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Snapshot file, overrides storage.state_file
    #[arg(short, long)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty ledger
    Init {
        /// Contract owner (hex address or label)
        #[arg(long, value_parser = parse_address)]
        owner: Address,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Write the default configuration as TOML
    SampleConfig {
        path: PathBuf,
    },

    /// Add native funds to the pooled balance
    Fund {
        #[arg(long, value_parser = parse_address)]
        from: Address,

        amount: Amount,
    },

    /// Deposit oracle fees (owner only)
    DepositFees {
        #[arg(long, value_parser = parse_address)]
        caller: Address,

        amount: Amount,
    },

    /// Sweep the oracle-fee balance to the owner
    WithdrawFees {
        #[arg(long, value_parser = parse_address)]
        caller: Address,
    },

    /// Place a bet, e.g. `bet --player alice color:red straight:17`
    Bet {
        #[arg(long, value_parser = parse_address)]
        player: Address,

        /// Attached value; defaults to bet amount times selections
        #[arg(long)]
        value: Option<Amount>,

        #[arg(required = true)]
        selectors: Vec<RawSelector>,
    },

    /// Let the VRF oracle answer every pending request
    Spin,

    /// Deliver a random word for one request by hand
    Fulfill {
        request_id: RequestId,

        /// Decimal or 0x-prefixed hex
        word: RandomWord,

        /// Callback sender; defaults to the configured oracle
        #[arg(long, value_parser = parse_address)]
        caller: Option<Address>,
    },

    /// Claim rewards for settled bets
    Claim {
        #[arg(long, value_parser = parse_address)]
        player: Address,

        #[arg(required = true)]
        bet_ids: Vec<BetId>,
    },

    /// Show one bet
    Info {
        bet_id: BetId,
    },

    /// List a player's bets
    History {
        #[arg(value_parser = parse_address)]
        player: Address,
    },

    /// Show balances and pending requests
    Status,

    /// Print the payout table
    Payouts,
}

/// Accept `0x` hex addresses, otherwise derive one from the label
fn parse_address(s: &str) -> Result<Address, String> {
    if s.starts_with("0x") {
        return s.parse().map_err(|e| format!("invalid address '{}': {}", s, e));
    }
    if s.is_empty() {
        return Err("address cannot be empty".to_string());
    }
    Ok(Address::from_label(s))
}

fn init_logging(level: &str, verbose: bool) {
    let default_filter = if verbose {
        "roulette_ledger=debug".to_string()
    } else {
        format!("roulette_ledger={}", level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> RouletteResult<()> {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(state) = cli.state {
        config.storage.state_file = state;
    }

    init_logging(&config.logging.level, cli.verbose);

    let state_file = config.storage.state_file.clone();
    match cli.command {
        Commands::Init { owner, force } => init_ledger(&config, &state_file, owner, force),
        Commands::SampleConfig { path } => {
            generate_sample_config(&path)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
        Commands::Fund { from, amount } => with_ledger(&state_file, |ledger| {
            let balance = ledger.fund(from, amount)?;
            println!("Pool balance: {}", balance);
            Ok(())
        }),
        Commands::DepositFees { caller, amount } => with_ledger(&state_file, |ledger| {
            let balance = ledger.deposit_oracle_fees(caller, amount)?;
            println!("Oracle fee balance: {}", balance);
            Ok(())
        }),
        Commands::WithdrawFees { caller } => with_ledger(&state_file, |ledger| {
            let amount = ledger.withdraw_oracle_fees(caller)?;
            println!("Withdrew {} in oracle fees to {}", amount, caller);
            Ok(())
        }),
        Commands::Bet { player, value, selectors } => with_ledger(&state_file, |ledger| {
            let value = value
                .unwrap_or_else(|| ledger.bet_amount().saturating_mul(selectors.len() as Amount));
            let bet_id = ledger.place_bet(player, &selectors, value)?;
            let request_id = ledger.bet_info(bet_id).map(|bet| bet.request_id);
            println!("Placed bet {} (stake {})", bet_id, value);
            if let Some(request_id) = request_id {
                println!("Randomness request: {}", request_id);
            }
            Ok(())
        }),
        Commands::Spin => {
            let oracle = resolve_oracle(&config)?;
            with_ledger(&state_file, |ledger| {
                let reports = ledger.fulfil_pending(&oracle)?;
                if reports.is_empty() {
                    println!("No pending requests");
                }
                for report in reports {
                    println!(
                        "Bet {} landed on {} (reward {})",
                        report.bet_id, report.outcome, report.reward_amount
                    );
                }
                Ok(())
            })
        }
        Commands::Fulfill { request_id, word, caller } => with_ledger(&state_file, |ledger| {
            let caller = caller.unwrap_or_else(|| ledger.oracle());
            let report = ledger.receive_randomness(caller, request_id, &[word])?;
            println!(
                "Bet {} landed on {} (reward {})",
                report.bet_id, report.outcome, report.reward_amount
            );
            Ok(())
        }),
        Commands::Claim { player, bet_ids } => with_ledger(&state_file, |ledger| {
            let total = ledger.claim(player, &bet_ids)?;
            println!("Paid {} to {}", total, player);
            Ok(())
        }),
        Commands::Info { bet_id } => {
            let ledger = open_ledger(&state_file)?;
            match ledger.bet_info(bet_id) {
                Some(bet) => print_json(bet),
                None => {
                    println!("Bet {} not found", bet_id);
                    Ok(())
                }
            }
        }
        Commands::History { player } => {
            let ledger = open_ledger(&state_file)?;
            let bets: Vec<_> = ledger
                .player_bet_ids(&player)
                .iter()
                .filter_map(|id| ledger.bet_info(*id))
                .collect();
            print_json(&bets)
        }
        Commands::Status => {
            let ledger = open_ledger(&state_file)?;
            println!("Owner:              {}", ledger.owner());
            println!("Oracle:             {}", ledger.oracle());
            println!("Bet amount:         {}", ledger.bet_amount());
            println!("Pool balance:       {}", ledger.balance());
            println!("Oracle fee balance: {}", ledger.oracle_fee_balance());
            println!("Outstanding:        {}", ledger.ledger().outstanding_rewards());
            println!("Last bet id:        {}", ledger.last_bet_id());
            for request in ledger.pending_requests() {
                println!("Pending: bet {} request {}", request.bet_id, request.request_id);
            }
            Ok(())
        }
        Commands::Payouts => {
            let table = PayoutTable::STANDARD;
            println!("{:<4} {:<9} {:>10} {:>11}", "id", "category", "multiplier", "max choice");
            for (category, rule) in table.iter() {
                println!(
                    "{:<4} {:<9} {:>10} {:>11}",
                    category.id(),
                    category.name(),
                    rule.multiplier,
                    rule.domain_size - 1
                );
            }
            Ok(())
        }
    }
}

fn init_ledger(config: &RouletteConfig, state_file: &Path, owner: Address, force: bool) -> RouletteResult<()> {
    if state_file.exists() && !force {
        return Err(StorageError::WriteFailed(format!(
            "{} already exists, pass --force to replace it",
            state_file.display()
        ))
        .into());
    }

    let oracle = match config.oracle_address()? {
        Some(address) => address,
        None => resolve_oracle(config)?.address(),
    };

    let ledger = WagerController::new(config.wager_settings(), owner, oracle);
    save_snapshot(state_file, &ledger)?;
    info!(path = %state_file.display(), "Ledger initialised");
    println!("Initialised ledger at {}", state_file.display());
    println!("Owner:  {}", owner);
    println!("Oracle: {}", oracle);
    Ok(())
}

fn resolve_oracle(config: &RouletteConfig) -> RouletteResult<VrfOracle> {
    if let Some(oracle) = config.vrf_oracle()? {
        return Ok(oracle);
    }
    warn!("oracle.seed not configured, using the development oracle");
    Ok(VrfOracle::from_seed(&DEV_ORACLE_SEED)?)
}

fn open_ledger(state_file: &Path) -> RouletteResult<WagerController> {
    load_snapshot(state_file)?.ok_or_else(|| {
        ConfigurationError::ValidationFailed(format!(
            "No ledger at {}, run `init` first",
            state_file.display()
        ))
        .into()
    })
}

/// Load, apply `op`, and persist only if it succeeded
fn with_ledger<F>(state_file: &Path, op: F) -> RouletteResult<()>
where
    F: FnOnce(&mut WagerController) -> RouletteResult<()>,
{
    let mut ledger = open_ledger(state_file)?;
    op(&mut ledger)?;
    save_snapshot(state_file, &ledger)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> RouletteResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::CorruptedData(format!("Failed to encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

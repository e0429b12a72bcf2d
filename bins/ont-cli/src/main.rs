//! ont-cli: Command-line wallet interface for Ontology.
//!
//! Manages encrypted wallet files, derives HD addresses, builds and signs
//! native ONT/ONG transfers, and talks to a node over JSON-RPC.

mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use ont_core::address::Address;
use ont_core::constants::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE};
use ont_core::crypto::PublicKey;
use ont_core::hd::{DerivationPath, ExtendedPublicKey};
use ont_core::transaction::{DecodedTransaction, deserialize};
use ont_rpc::RpcClient;
use ont_wallet::{Asset, RawKey, TransferBuilder, WalletManager};
use serde_json::json;

use crate::settings::Settings;

/// Ontology command-line wallet interface.
#[derive(Parser)]
#[command(name = "ont-cli")]
#[command(version, about = "Ontology wallet and transaction toolkit")]
struct Cli {
    /// Settings file (TOML). `ONT_*` environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management.
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// ONT ID management.
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
    /// Address conversions.
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Hierarchical public key derivation.
    Hd {
        #[command(subcommand)]
        action: HdAction,
    },
    /// Build, sign, and optionally submit a native token transfer.
    Transfer(TransferArgs),
    /// Transaction inspection.
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },
    /// Node queries.
    Rpc {
        #[command(subcommand)]
        action: RpcAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new random account.
    Create(CreateArgs),
    /// Import an account from a hex private key.
    Import(ImportArgs),
    /// List wallet accounts.
    List(WalletArgs),
}

#[derive(Subcommand)]
enum IdentityAction {
    /// Create a new ONT ID with one control key.
    Create(CreateArgs),
}

#[derive(Subcommand)]
enum AddressAction {
    /// Show the script hash behind a base58 address.
    Decode { address: String },
    /// Derive the address of a hex public key.
    FromPubkey { public_key: String },
}

#[derive(Subcommand)]
enum HdAction {
    /// Print the address at each step of a path from an xpub.
    Derive { xpub: String, path: String },
}

#[derive(Subcommand)]
enum TxAction {
    /// Decode a hex transaction.
    Decode { hex: String },
}

#[derive(Subcommand)]
enum RpcAction {
    /// Current block count.
    BlockCount,
    /// ONT and ONG balances of an address.
    Balance { address: String },
}

#[derive(Args)]
struct WalletArgs {
    /// Path to wallet file (default: ~/.ont/wallet.json).
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct CreateArgs {
    /// Label; a random one is chosen if omitted.
    #[arg(short, long)]
    label: Option<String>,

    #[command(flatten)]
    wallet: WalletArgs,
}

#[derive(Args)]
struct ImportArgs {
    /// Hex private key. If not provided, will prompt securely.
    #[arg(short, long)]
    key: Option<String>,

    #[arg(short, long)]
    label: Option<String>,

    #[command(flatten)]
    wallet: WalletArgs,
}

#[derive(Args)]
struct TransferArgs {
    /// Asset to move (ont or ong).
    #[arg(long, default_value = "ont")]
    asset: String,

    /// Recipient address.
    #[arg(short, long)]
    to: String,

    /// Amount in base units.
    #[arg(short, long)]
    amount: u64,

    /// Sender and payer (default: wallet default account).
    #[arg(long)]
    from: Option<String>,

    #[arg(long, default_value_t = DEFAULT_GAS_PRICE)]
    gas_price: u64,

    #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
    gas_limit: u64,

    /// Submit the signed transaction to the configured node.
    #[arg(long)]
    send: bool,

    /// With --send, only simulate execution on the node.
    #[arg(long, requires = "send")]
    pre_exec: bool,

    #[command(flatten)]
    wallet: WalletArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Account { action } => match action {
            AccountAction::Create(args) => account_create(&settings, args),
            AccountAction::Import(args) => account_import(&settings, args),
            AccountAction::List(args) => account_list(&settings, args),
        },
        Commands::Identity { action } => match action {
            IdentityAction::Create(args) => identity_create(&settings, args),
        },
        Commands::Address { action } => match action {
            AddressAction::Decode { address } => address_decode(&address),
            AddressAction::FromPubkey { public_key } => address_from_pubkey(&public_key),
        },
        Commands::Hd { action } => match action {
            HdAction::Derive { xpub, path } => hd_derive(&xpub, &path),
        },
        Commands::Transfer(args) => transfer(&settings, args).await,
        Commands::Tx { action } => match action {
            TxAction::Decode { hex } => tx_decode(&hex),
        },
        Commands::Rpc { action } => match action {
            RpcAction::BlockCount => rpc_block_count(&settings).await,
            RpcAction::Balance { address } => rpc_balance(&settings, &address).await,
        },
    }
}

/// Create a new account, creating the wallet file if needed.
fn account_create(settings: &Settings, args: CreateArgs) -> Result<()> {
    let path = settings.wallet_path(args.wallet.file)?;
    let password = prompt_new_password()?;
    let mut manager = open_wallet(&path)?;
    let address = manager
        .create_account(args.label.as_deref().unwrap_or_default(), &password)
        .context("Failed to create account")?
        .address;
    manager.save().context("Failed to save wallet")?;

    println!("Address: {address}");
    println!("Wallet saved to: {}", path.display());
    Ok(())
}

/// Seal an existing private key into the wallet.
fn account_import(settings: &Settings, args: ImportArgs) -> Result<()> {
    let path = settings.wallet_path(args.wallet.file)?;
    let key_hex = match args.key {
        Some(k) => k,
        None => prompt_password("Private key (hex)")?,
    };
    let key = RawKey::from_hex(key_hex.trim()).context("Invalid private key")?;

    let password = prompt_new_password()?;
    let mut manager = open_wallet(&path)?;
    let address = manager
        .create_account_from_private_key(args.label.as_deref().unwrap_or_default(), &password, &key)
        .context("Failed to import account")?
        .address;
    manager.save().context("Failed to save wallet")?;

    println!("Address: {address}");
    Ok(())
}

fn account_list(settings: &Settings, args: WalletArgs) -> Result<()> {
    let path = settings.wallet_path(args.file)?;
    let manager = WalletManager::open(&path)
        .with_context(|| format!("Failed to open wallet: {}", path.display()))?;

    let accounts = &manager.wallet().accounts;
    if accounts.is_empty() {
        println!("No accounts in {}", path.display());
        return Ok(());
    }
    for record in accounts {
        let marker = if record.is_default { "*" } else { " " };
        println!("{marker} {}  {}", record.address, record.label);
    }
    Ok(())
}

fn identity_create(settings: &Settings, args: CreateArgs) -> Result<()> {
    let path = settings.wallet_path(args.wallet.file)?;
    let password = prompt_new_password()?;
    let mut manager = open_wallet(&path)?;
    let ont_id = manager
        .create_identity(args.label.as_deref().unwrap_or_default(), &password)
        .context("Failed to create identity")?
        .ontid
        .clone();
    manager.save().context("Failed to save wallet")?;

    println!("ONT ID: {ont_id}");
    Ok(())
}

fn address_decode(text: &str) -> Result<()> {
    let address = Address::decode(text).context("Invalid address")?;
    println!("Script hash: {}", hex::encode(address.as_bytes()));
    println!("Reversed:    {}", address.to_hex());
    Ok(())
}

fn address_from_pubkey(public_key_hex: &str) -> Result<()> {
    let public_key = PublicKey::from_hex(public_key_hex).context("Invalid public key")?;
    println!("{}", public_key.address());
    Ok(())
}

fn hd_derive(xpub: &str, path: &str) -> Result<()> {
    let root: ExtendedPublicKey = xpub.parse().context("Invalid extended public key")?;
    let path: DerivationPath = path.parse().context("Invalid derivation path")?;
    let keys = root.derive_path(&path).context("Derivation failed")?;

    // keys[0] is the root itself
    for (depth, key) in keys.iter().enumerate() {
        let prefix = DerivationPath::new(path.indices()[..depth].to_vec());
        println!("{prefix}  {}", key.address());
    }
    Ok(())
}

/// Build and sign a transfer from a wallet account; optionally submit it.
async fn transfer(settings: &Settings, args: TransferArgs) -> Result<()> {
    let asset: Asset = args.asset.parse().context("Invalid asset")?;
    let to = Address::decode(&args.to).context("Invalid recipient address")?;
    if args.amount == 0 {
        bail!("Amount must be greater than zero");
    }

    let path = settings.wallet_path(args.wallet.file)?;
    let manager = WalletManager::open(&path)
        .with_context(|| format!("Failed to open wallet: {}", path.display()))?;
    let from = match args.from {
        Some(s) => Address::decode(&s).context("Invalid sender address")?,
        None => manager.default_account().context("No sender given")?.address,
    };

    let password = prompt_password("Wallet password")?;
    let account = manager
        .get_account_by_address(&from, &password)
        .context("Failed to unlock account (check password)")?;

    let signed = TransferBuilder::new(asset)
        .add_transfer(from, to, args.amount)
        .set_gas_price(args.gas_price)
        .set_gas_limit(args.gas_limit)
        .sign_single(&account)
        .context("Failed to sign transfer")?;

    println!("TxHash: {}", signed.tx_hash_hex());
    println!("{}", signed.to_hex());

    if args.send {
        let client = RpcClient::new(&settings.rpc)?;
        tracing::info!(tx = %signed.tx_hash_hex(), endpoint = client.endpoint(), pre_exec = args.pre_exec, "submitting transfer");
        let result = client
            .send_raw_transaction(&signed, args.pre_exec)
            .await
            .with_context(|| format!("sendrawtransaction to {} failed", client.endpoint()))?;
        println!("\n=== TRANSACTION {} ===", if args.pre_exec { "SIMULATED" } else { "SENT" });
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

fn tx_decode(hex_tx: &str) -> Result<()> {
    let bytes = hex::decode(hex_tx.trim()).context("Invalid hex")?;
    let decoded = deserialize(&bytes).context("Malformed transaction")?;
    println!("{}", serde_json::to_string_pretty(&describe(&decoded))?);
    Ok(())
}

async fn rpc_block_count(settings: &Settings) -> Result<()> {
    let client = RpcClient::new(&settings.rpc)?;
    let count = client
        .get_block_count()
        .await
        .with_context(|| format!("getblockcount from {} failed", client.endpoint()))?;
    println!("{count}");
    Ok(())
}

async fn rpc_balance(settings: &Settings, address: &str) -> Result<()> {
    let address = Address::decode(address).context("Invalid address")?;
    let client = RpcClient::new(&settings.rpc)?;
    let balance = client
        .get_balance(&address)
        .await
        .with_context(|| format!("getbalance from {} failed", client.endpoint()))?;
    println!("ONT: {}", balance.ont);
    println!("ONG: {}", balance.ong);
    Ok(())
}

/// JSON view of a decoded transaction.
fn describe(decoded: &DecodedTransaction) -> serde_json::Value {
    let tx = decoded.unsigned();
    let mut view = json!({
        "hash": tx.tx_hash_hex(),
        "version": tx.version,
        "txType": tx.tx_type,
        "nonce": tx.nonce,
        "gasPrice": tx.gas_price,
        "gasLimit": tx.gas_limit,
        "payer": tx.payer.to_string(),
        "payload": hex::encode(&tx.payload),
        "attributes": tx.attributes.iter()
            .map(|a| json!({"usage": a.usage, "data": hex::encode(&a.data)}))
            .collect::<Vec<_>>(),
    });
    if let DecodedTransaction::Signed(signed) = decoded {
        view["sigs"] = signed
            .sigs()
            .iter()
            .map(|g| {
                json!({
                    "m": g.m,
                    "publicKeys": g.public_keys.iter().map(hex::encode).collect::<Vec<_>>(),
                    "sigData": g.sig_data.iter().map(hex::encode).collect::<Vec<_>>(),
                })
            })
            .collect();
    }
    view
}

/// Prompt for a password securely (no echo).
fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", prompt)).context("Failed to read password")
}

/// Load `path`, or start an empty wallet there. The file is only written
/// by a later `save`.
fn open_wallet(path: &Path) -> Result<WalletManager> {
    WalletManager::open_or_new(path)
        .with_context(|| format!("Failed to open wallet: {}", path.display()))
}

fn prompt_new_password() -> Result<String> {
    let password = prompt_password("Enter password")?;
    let confirm = prompt_password("Confirm password")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}

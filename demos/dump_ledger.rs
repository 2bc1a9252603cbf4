use ledger_notes::{get_transaction_cache, FsVault, LedgerParser, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let root = args.next().ok_or("usage: dump_ledger <vault dir> [settings.toml]")?;
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let vault = FsVault::new(root);
    let cache = get_transaction_cache(
        &vault,
        &vault,
        &LedgerParser,
        &settings,
        &settings.ledger_file,
    )
    .await?;
    match cache {
        Some(cache) => println!("{:#?}", cache),
        None => println!("no ledger file at {}", settings.ledger_file),
    }
    Ok(())
}

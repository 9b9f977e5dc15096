use std::error::Error;

use dauction_contract::{AuctionContract, MemoryStore};
use dauction_types::{Account, AuctionConfig, BidSide, ClearingReceipt, Round, RoundId, constants};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resource tiers a seller provisions, with their weight in a buyer's bundle.
const TIER_WEIGHTS: [u32; 3] = [1, 2, 4];
/// Unit cost band of the cheapest tier, in cents. Tier `i` costs `2^i` times more.
const UNIT_COST_CENTS: (i64, i64) = (10, 20);
const OPENING_BALANCE: i64 = 1_000;
const ROUND_ID: &str = "sim";

fn print_help() {
    eprintln!(
        r#"Dauction Simulator - one double auction round over a random population

USAGE:
    dauction-sim [OPTIONS]

OPTIONS:
    --config <PATH>     Load auction configuration from JSON file
    --buyers <N>        Number of buyers (default: 10)
    --sellers <N>       Number of sellers (default: 10)
    --seed <N>          RNG seed (default: 1)
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: dauction=info)

EXAMPLES:
    # Tiered seller bids, 50 buyers
    echo '{{"tier_policy":"tiered"}}' > auction.json
    dauction-sim --config auction.json --buyers 50
"#
    );
}

struct Args {
    config_path: Option<String>,
    buyers: usize,
    sellers: usize,
    seed: u64,
}

/// What the simulator prints on stdout.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimReport {
    engine: &'static str,
    version: &'static str,
    seed: u64,
    receipt: Option<ClearingReceipt>,
    error: Option<String>,
    round: Round,
    accounts: Vec<Account>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config_path: None,
        buyers: 10,
        sellers: 10,
        seed: 1,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--config" | "-c" | "--buyers" | "--sellers" | "--seed" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Error: {flag} requires an argument");
                    std::process::exit(1);
                };
                match flag {
                    "--buyers" => parsed.buyers = parse_number(flag, value),
                    "--sellers" => parsed.sellers = parse_number(flag, value),
                    "--seed" => parsed.seed = parse_number(flag, value),
                    _ => parsed.config_path = Some(value.clone()),
                }
            }
            arg => {
                eprintln!("Unknown argument: {arg}");
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    parsed
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: {flag} expects a non-negative integer, got {value:?}");
        std::process::exit(1);
    })
}

/// Random price in cents within `[lo, hi]`, scaled by `factor`.
fn cents(rng: &mut StdRng, (lo, hi): (i64, i64), factor: i64) -> Decimal {
    Decimal::new(rng.gen_range(lo * factor..=hi * factor), 2)
}

/// A buyer wants a bundle across all tiers and bids one unit price for it.
fn buyer_bid(rng: &mut StdRng) -> (Decimal, u64) {
    let needs: Vec<u32> = TIER_WEIGHTS.iter().map(|_| rng.gen_range(0..10)).collect();
    let units: u32 = needs.iter().sum::<u32>().max(1);
    let weighted: u32 = needs.iter().zip(TIER_WEIGHTS).map(|(n, w)| n * w).sum();
    let unit_cost = cents(rng, UNIT_COST_CENTS, 1);
    let price = (unit_cost * Decimal::from(weighted.max(1)) / Decimal::from(units))
        .round_dp(2)
        .max(Decimal::new(1, 2));
    (price, u64::from(units))
}

/// A seller provisions every tier and quotes one price per tier, cheapest first.
fn seller_bid(rng: &mut StdRng) -> (String, String) {
    let mut prices = Vec::with_capacity(TIER_WEIGHTS.len());
    let mut quantities = Vec::with_capacity(TIER_WEIGHTS.len());
    for tier in 0..TIER_WEIGHTS.len() {
        prices.push(cents(rng, UNIT_COST_CENTS, 1i64 << tier).to_string());
        quantities.push(rng.gen_range(1..10u64).to_string());
    }
    let sep = constants::LIST_SEPARATOR.to_string();
    (prices.join(&sep), quantities.join(&sep))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dauction=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args();

    let config = match &args.config_path {
        Some(path) => {
            tracing::info!(%path, "Loading configuration");
            AuctionConfig::from_json(&std::fs::read_to_string(path)?)?
        }
        None => AuctionConfig::default(),
    };
    tracing::info!(
        buyers = args.buyers,
        sellers = args.sellers,
        seed = args.seed,
        tier_policy = ?config.tier_policy,
        "Starting {} simulator v{}",
        constants::ENGINE_NAME,
        constants::VERSION
    );

    let caller = config.privileged_caller.clone();
    let mut contract = AuctionContract::new(MemoryStore::new(), config)?;
    contract.init_registry(&caller)?;

    let round = RoundId::new(ROUND_ID);
    contract.create_round(&round)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let opening = Decimal::from(OPENING_BALANCE);

    for i in 1..=args.buyers {
        let address = format!("buyer{i}");
        contract.register_account(&address, opening)?;
        let (price, quantity) = buyer_bid(&mut rng);
        contract.submit_bid(&round, BidSide::Buy, &address, price, quantity)?;
    }
    for i in 1..=args.sellers {
        let address = format!("seller{i}");
        contract.register_account(&address, opening)?;
        let (prices, quantities) = seller_bid(&mut rng);
        contract.submit_encoded_bid(&round, BidSide::Sell, &address, &prices, &quantities)?;
    }

    let (receipt, error) = match contract.clear_round(&round) {
        Ok(receipt) => (Some(receipt), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let report = SimReport {
        engine: constants::ENGINE_NAME,
        version: constants::VERSION,
        seed: args.seed,
        receipt,
        error,
        round: contract.query_round(&round)?,
        accounts: contract.query_accounts()?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

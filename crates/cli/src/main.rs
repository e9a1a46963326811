use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use launchpad::{
    create_example_config, quote_buy_at, quote_sell_at, BuyOrder, CurveParams, Launchpad, PlatformConfig, TxContext,
};
use launchpad_core::{Address, CoinId};

#[derive(Parser, Debug)]
#[command(name = "launchpad-cli")]
#[command(about = "Bonding curve launchpad operator tool")]
struct Args {
    /// Path to platform configuration file
    #[arg(short, long, default_value = "launchpad.toml", global = true)]
    config: String,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an example configuration file
    InitConfig { path: String },

    /// Load and validate a configuration file
    Validate { path: String },

    /// Quote a buy at a given sold supply
    QuoteBuy {
        /// Whole tokens already sold
        #[arg(long)]
        supply: u64,
        /// Smallest payment units offered, fee included
        #[arg(long)]
        payment: u64,
    },

    /// Quote a sell at a given sold supply
    QuoteSell {
        /// Whole tokens already sold
        #[arg(long)]
        supply: u64,
        /// Smallest token units to sell
        #[arg(long)]
        tokens: u64,
    },

    /// Print the price and reserve at evenly spaced supplies
    Schedule {
        #[arg(long, default_value = "10")]
        steps: u64,
    },

    /// Run a full launch in memory: sell out, graduate, pay out, hand off
    Simulate {
        /// Payment units each buyer offers
        #[arg(long, default_value = "1000000000000")]
        payment: u64,
    },
}

#[derive(Debug, Serialize)]
struct BuyQuoteOutput {
    supply: u64,
    payment_in: u64,
    tokens: u64,
    token_units: u64,
    cost: u64,
    fee: u64,
    refund: u64,
    price_after: u64,
}

#[derive(Debug, Serialize)]
struct SellQuoteOutput {
    supply: u64,
    tokens: u64,
    proceeds: u64,
    fee: u64,
    payout: u64,
    price_after: u64,
}

#[derive(Debug, Serialize)]
struct ScheduleRow {
    supply: u64,
    price: u64,
    reserve: u128,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match &args.command {
        Command::InitConfig { path } => {
            create_example_config(path).with_context(|| format!("writing example config to {}", path))?;
            tracing::info!(path = %path, "example configuration written");
        }
        Command::Validate { path } => {
            let config = PlatformConfig::load(path)?;
            let params = config.curve_params()?;
            tracing::info!(
                path = %path,
                treasury = %config.treasury(),
                max_curve_supply = params.max_curve_supply,
                "configuration is valid"
            );
            emit(&args, &params, || describe_params(&params))?;
        }
        Command::QuoteBuy { supply, payment } => {
            let config = load_config(&args.config)?;
            let quote = quote_buy(&config, *supply, *payment)?;
            emit(&args, &quote, || {
                format!(
                    "{} tokens for {} (fee {}, refund {}), price after {}",
                    quote.tokens, quote.cost, quote.fee, quote.refund, quote.price_after
                )
            })?;
        }
        Command::QuoteSell { supply, tokens } => {
            let config = load_config(&args.config)?;
            let quote = quote_sell(&config, *supply, *tokens)?;
            emit(&args, &quote, || {
                format!(
                    "{} tokens pay {} (fee {}, proceeds {}), price after {}",
                    quote.tokens, quote.payout, quote.fee, quote.proceeds, quote.price_after
                )
            })?;
        }
        Command::Schedule { steps } => {
            let config = load_config(&args.config)?;
            let rows = schedule(&config.curve_params()?, *steps)?;
            emit(&args, &rows, || {
                rows.iter()
                    .map(|r| format!("{:>14} {:>12} {:>22}", r.supply, r.price, r.reserve))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Simulate { payment } => {
            let config = load_config(&args.config)?;
            simulate(&args, config, *payment)?;
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<PlatformConfig> {
    if Path::new(path).exists() {
        let config = PlatformConfig::load(path)?;
        tracing::debug!(path = %path, "configuration loaded");
        Ok(config)
    } else {
        tracing::warn!(path = %path, "configuration file not found, using defaults");
        Ok(PlatformConfig::default())
    }
}

fn emit<T: Serialize>(args: &Args, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn describe_params(params: &CurveParams) -> String {
    format!(
        "base price {}, slope {}/{}, cap {} of {} tokens, {} decimals",
        params.pricing.base_price,
        params.pricing.slope_numerator,
        params.pricing.slope_denominator,
        params.max_curve_supply,
        params.total_token_supply,
        params.token_decimals
    )
}

fn quote_buy(config: &PlatformConfig, supply: u64, payment_in: u64) -> Result<BuyQuoteOutput> {
    let params = config.curve_params()?;
    let quote = quote_buy_at(&params, config.trade_fee_bps(), supply, payment_in)
        .with_context(|| format!("quoting a buy of {} at supply {}", payment_in, supply))?;
    Ok(BuyQuoteOutput {
        supply,
        payment_in,
        tokens: quote.tokens,
        token_units: quote.token_units,
        cost: quote.cost,
        fee: quote.fee,
        refund: quote.refund,
        price_after: quote.price_after,
    })
}

fn quote_sell(config: &PlatformConfig, supply: u64, token_units: u64) -> Result<SellQuoteOutput> {
    let params = config.curve_params()?;
    let quote = quote_sell_at(&params, config.trade_fee_bps(), supply, token_units)
        .with_context(|| format!("quoting a sell of {} units at supply {}", token_units, supply))?;
    Ok(SellQuoteOutput {
        supply,
        tokens: quote.tokens,
        proceeds: quote.proceeds,
        fee: quote.fee,
        payout: quote.payout,
        price_after: quote.price_after,
    })
}

fn schedule(params: &CurveParams, steps: u64) -> Result<Vec<ScheduleRow>> {
    if steps == 0 {
        bail!("steps must be positive");
    }
    (0..=steps)
        .map(|i| {
            let supply = (params.max_curve_supply as u128 * i as u128 / steps as u128) as u64;
            Ok(ScheduleRow {
                supply,
                price: params.pricing.price(supply)?,
                reserve: params.pricing.cost(supply)?,
            })
        })
        .collect()
}

fn simulate(args: &Args, config: PlatformConfig, payment: u64) -> Result<()> {
    let creator = Address::from_low_u64(0xc0de);
    let (mut launchpad, cap) = Launchpad::new(config)?;
    let coin = CoinId::new("0xfeed::demo::DEMO")?;
    let mut now_ms = 0u64;
    launchpad.create_curve(&TxContext::new(creator, now_ms), coin.clone(), "Demo", "DEMO")?;

    let mut buyer_index = 1u64;
    while launchpad.curve(&coin)?.headroom() > 0 {
        let buyer = Address::from_low_u64(buyer_index);
        now_ms += 1_000;
        launchpad.deposit(buyer, payment)?;
        let order = BuyOrder {
            payment_in: payment,
            min_tokens_out: 0,
            deadline_ms: now_ms,
            referrer: None,
        };
        launchpad.buy(&TxContext::new(buyer, now_ms), &coin, order)?;
        buyer_index += 1;
    }
    tracing::info!(buyers = buyer_index - 1, "curve sold out");

    let ctx = TxContext::new(creator, now_ms);
    launchpad.try_graduate(&ctx, &coin)?;
    launchpad.distribute_payouts(&coin)?;
    if launchpad.config().lp_bot_address().is_some() {
        launchpad.seed_pool_prepare(&ctx, &cap, &coin)?;
    } else {
        tracing::warn!("no lp bot configured, leaving reserves on the curve");
    }

    let stats = launchpad.snapshot(&coin)?;
    emit(args, &stats, || {
        format!(
            "{} ({}) {:?}: {} buyers, final price {}, reserve left {}",
            stats.ticker,
            stats.coin,
            stats.phase,
            buyer_index - 1,
            stats.current_price,
            stats.reserve_balance
        )
    })
}

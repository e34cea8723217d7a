//! Command Line Interface for the concentrated liquidity pool model.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clmm_model_domain::metrics::impermanent_loss::{
    calculate_il_concentrated, calculate_il_constant_product,
};
use clmm_model_domain::{Pool, PoolConfig, ZeroLiquidityPolicy};
use clmm_model_simulation::prelude::*;
use dotenv::dotenv;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "clmm-model")]
#[command(about = "Tick-range concentrated liquidity pool model", long_about = None)]
struct Cli {
    /// JSON config file. Falls back to CLMM_MODEL_CONFIG.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open positions and move the pool along a price path
    Simulate {
        /// Initial pool price
        #[arg(long, default_value_t = 13.0)]
        price: f64,

        /// Price multiplier between adjacent ticks [default: 1.01, or the config file's]
        #[arg(long)]
        tick_size: Option<f64>,

        /// Tick spacing [default: 10, or the config file's]
        #[arg(long)]
        tick_space: Option<i32>,

        /// Position as MIN:MAX:VALUE, repeatable
        #[arg(short = 'P', long = "position", value_parser = parse_position, default_value = "10:16:100")]
        positions: Vec<PositionArg>,

        /// Comma separated target prices
        #[arg(long, value_delimiter = ',', default_value = "20")]
        path: Vec<f64>,

        /// Move through ticks without liquidity instead of failing
        #[arg(long)]
        pass_through: bool,
    },
    /// Push a token amount through the pool
    Swap {
        /// Initial pool price
        #[arg(long, default_value_t = 15.0)]
        price: f64,

        /// Position as MIN:MAX:VALUE, repeatable
        #[arg(short = 'P', long = "position", value_parser = parse_position, default_value = "13:17:100")]
        positions: Vec<PositionArg>,

        /// Token amount; positive pushes price up, negative pushes it down
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
    },
    /// Compare ranges over many stochastic price paths
    MonteCarlo {
        /// Number of paths
        #[arg(short, long)]
        iterations: Option<usize>,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct PositionArg {
    min_price: f64,
    max_price: f64,
    value: f64,
}

fn parse_position(raw: &str) -> std::result::Result<PositionArg, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [min, max, value] = parts.as_slice() else {
        return Err(format!("expected MIN:MAX:VALUE, got '{raw}'"));
    };
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("'{s}': {e}"));
    Ok(PositionArg {
        min_price: parse(*min)?,
        max_price: parse(*max)?,
        value: parse(*value)?,
    })
}

fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

/// Pool config for `simulate`: command line flags override the loaded file,
/// which overrides the scenario defaults.
fn simulate_config(
    loaded: Option<PoolConfig>,
    price: f64,
    tick_size: Option<f64>,
    tick_space: Option<i32>,
    pass_through: bool,
) -> PoolConfig {
    let mut config = loaded.unwrap_or_else(|| {
        PoolConfig::default()
            .with_tick_size(1.01)
            .with_tick_space(10)
    });
    config.initial_price = price;
    if let Some(size) = tick_size {
        config = config.with_tick_size(size);
    }
    if let Some(space) = tick_space {
        config = config.with_tick_space(space);
    }
    if pass_through {
        config = config.with_zero_liquidity(ZeroLiquidityPolicy::PassThrough);
    }
    config
}

fn open_pool(config: PoolConfig, positions: &[PositionArg]) -> Result<Pool> {
    let mut pool = Pool::new(config)?;
    for p in positions {
        let id = pool.open_position(p.min_price, p.max_price, p.value)?;
        info!(position = %id, min = p.min_price, max = p.max_price, value = p.value, "Opened position");
    }
    Ok(pool)
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| env::var("CLMM_MODEL_CONFIG").ok().map(PathBuf::from));

    match &cli.command {
        Commands::Simulate {
            price,
            tick_size,
            tick_space,
            positions,
            path,
            pass_through,
        } => {
            let loaded = match config_path.as_deref() {
                Some(p) => Some(load_config::<PoolConfig>(Some(p))?),
                None => None,
            };
            let config = simulate_config(loaded, *price, *tick_size, *tick_space, *pass_through);

            let mut pool = open_pool(config, positions)?;
            let entry_price = pool.price();
            let mut tracker = PositionTracker::for_pool(&pool);
            let outcome = tracker.follow(&mut pool, path);

            let mut table = Table::new();
            table.add_row(row![
                "Step", "Position", "Price", "x", "y", "Fees x", "Fees y", "IL %", "IL ref %"
            ]);
            for s in &tracker.snapshots {
                let position = pool.position(s.position)?;
                let reference = calculate_il_concentrated(
                    entry_price,
                    s.price,
                    position.min_range(),
                    position.max_range(),
                )?;
                table.add_row(row![
                    s.step,
                    s.position.index,
                    format!("{:.4}", s.price),
                    format!("{:.6}", s.x),
                    format!("{:.6}", s.y),
                    format!("{:.6}", s.fees.x),
                    format!("{:.6}", s.fees.y),
                    format!("{:.4}", s.il_pct * 100.0),
                    format!("{:.4}", reference * 100.0),
                ]);
            }
            table.printstd();

            let full_range = calculate_il_constant_product(entry_price, pool.price())?;
            println!("\n📊 Summary (full-range IL at this move: {:.4}%)", full_range * 100.0);
            let mut summary = Table::new();
            summary.add_row(row![
                "Position", "Range", "Final value", "Hold value", "Fees", "IL %", "Time in range %"
            ]);
            for &id in tracker.positions() {
                let position = pool.position(id)?;
                let s = tracker.summary(id);
                summary.add_row(row![
                    id.index,
                    format!("[{:.4}, {:.4}]", position.min_range(), position.max_range()),
                    format!("{:.6}", s.final_value),
                    format!("{:.6}", s.hodl_value),
                    format!("{:.6}", s.total_fees),
                    format!("{:.4}", s.final_il_pct * Decimal::from(100)),
                    format!("{:.1}", s.time_in_range_pct * Decimal::from(100)),
                ]);
            }
            summary.printstd();

            outcome?;
        }
        Commands::Swap {
            price,
            positions,
            amount,
        } => {
            let base = load_config::<PoolConfig>(config_path.as_deref())?;
            let config = PoolConfig {
                initial_price: *price,
                ..base
            };
            let mut pool = open_pool(config, positions)?;
            let before = pool.price();
            let outcome = pool.swap(*amount)?;

            println!("🔁 Swap of {amount} ({:?})", outcome.direction);
            println!("════════════════════════════════════");
            println!("Price:          {:.6} -> {:.6}", before, outcome.price);
            println!("Gross amount:   {:.6}", outcome.amount_in);
            println!("Fees x / y:     {:.6} / {:.6}", outcome.fees.x, outcome.fees.y);
            println!("Ticks crossed:  {}", outcome.ticks_crossed);
            println!("════════════════════════════════════");
        }
        Commands::MonteCarlo {
            iterations,
            seed,
            json,
        } => {
            let mut config = load_config::<MonteCarloConfig>(config_path.as_deref())?;
            if let Some(n) = iterations {
                config = config.with_iterations(*n);
            }
            if let Some(s) = seed {
                config = config.with_seed(*s);
            }

            println!("🚀 Running {} paths...", config.iterations);
            let report = MonteCarloRunner::new(config).run()?;
            if report.failed == report.iterations {
                bail!("every path ran out of liquidity");
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            let mut table = Table::new();
            table.add_row(row![
                "Range", "Mean IL %", "Mean return %", "Median return %", "VaR 95 %", "Mean fees"
            ]);
            let pct = Decimal::from(100);
            for r in &report.results {
                table.add_row(row![
                    format!("[{}, {}]", r.range.min_price, r.range.max_price),
                    format!("{:.4}", r.il.mean * pct),
                    format!("{:.4}", r.total_return.mean * pct),
                    format!("{:.4}", r.total_return.median * pct),
                    format!("{:.4}", r.total_return.var_95 * pct),
                    format!("{:.6}", r.fees.mean),
                ]);
            }
            table.printstd();
            println!("Dropped paths: {} of {}", report.failed, report.iterations);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_flags_override_loaded_config() {
        let loaded = PoolConfig::new(3000.0).with_tick_size(1.001).with_tick_space(2);

        let config = simulate_config(Some(loaded.clone()), 13.0, Some(1.01), None, false);
        assert_eq!(config.tick_size, 1.01);
        assert_eq!(config.tick_space, 2);
        assert_eq!(config.initial_price, 13.0);
        assert_eq!(config.zero_liquidity, ZeroLiquidityPolicy::Reject);

        let config = simulate_config(Some(loaded), 13.0, None, Some(20), true);
        assert_eq!(config.tick_size, 1.001);
        assert_eq!(config.tick_space, 20);
        assert_eq!(config.zero_liquidity, ZeroLiquidityPolicy::PassThrough);
    }

    #[test]
    fn test_simulate_defaults_without_config() {
        let config = simulate_config(None, 13.0, None, None, false);
        assert_eq!(config.tick_size, 1.01);
        assert_eq!(config.tick_space, 10);
        assert_eq!(config.fee, 0.003);
    }

    #[test]
    fn test_parse_position() {
        let p = parse_position("10:16:100").unwrap();
        assert_eq!((p.min_price, p.max_price, p.value), (10.0, 16.0, 100.0));
        assert!(parse_position("10:16").is_err());
        assert!(parse_position("a:16:100").is_err());
    }
}

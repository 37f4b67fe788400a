//! AlphaLab CLI — evaluate, optimize, compare, and stability-test
//! rule-based strategies against CSV price data.
//!
//! Commands:
//! - `run` — evaluate one parameter combination and print its statistics
//! - `optimize` — random search over parameter ranges, print the leaders
//! - `compare` — distance metrics between two stored runs
//! - `stability` — Lipschitz-style stability estimate for one stored run

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use alphalab_core::eval::Evaluation;
use alphalab_core::stats::Stats;
use alphalab_core::strategy::{
    ParamKind, ParamSet, ParamValue, Strategy, StrategyKind, COST_PER_TRADE,
};
use alphalab_core::table::IndicatorTable;
use alphalab_runner::optimizer::{ParamRange, RangeMap, StdoutProgress};
use alphalab_runner::{
    compare_runs, stability_estimate, store, CompareError, CsvProvider, DatasetId,
    MarketDataProvider, OptimizeConfig, Optimizer, RunRecord,
};

#[derive(Parser)]
#[command(name = "alphalab", about = "AlphaLab — strategy evaluation and optimization engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one parameter combination and print its statistics.
    Run {
        /// Strategy name: SimpleMeanReversion, BasicMomentum, BasicRSI, Bollinger.
        #[arg(long)]
        strategy: String,

        /// Parameter override, repeatable: --param indicator="SMA, 20" --param margin=0.03.
        /// Unspecified parameters use the strategy's defaults.
        #[arg(long = "param")]
        params: Vec<String>,

        /// Fee per position transition, percent.
        #[arg(long, default_value_t = 0.5)]
        fee: f64,

        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Random search over parameter ranges.
    Optimize {
        /// TOML batch config; flag-based setup is ignored when present.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy name (required without --config).
        #[arg(long)]
        strategy: Option<String>,

        /// Sampling range, repeatable: --range indicator=5:50 --range margin=0.0:0.1.
        #[arg(long = "range")]
        ranges: Vec<String>,

        /// Number of trials.
        #[arg(long, default_value_t = 50)]
        trials: usize,

        /// Master seed for reproducible draws.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Fixed fee per position transition, percent. Never sampled.
        #[arg(long, default_value_t = 0.5)]
        fee: f64,

        /// How many leaders to print.
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Directory to write runs.csv and equities.csv into.
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Distance metrics and sensitivity ratio for two stored runs.
    Compare {
        /// Path to a runs.csv written by `optimize --out`.
        #[arg(long)]
        runs: PathBuf,

        /// Index of the first run (0-based).
        #[arg(long)]
        first: usize,

        /// Index of the second run (0-based).
        #[arg(long)]
        second: usize,
    },
    /// Worst-case sensitivity of one stored run against the whole file.
    Stability {
        /// Path to a runs.csv written by `optimize --out`.
        #[arg(long)]
        runs: PathBuf,

        /// Index of the reference run (0-based).
        #[arg(long)]
        reference: usize,
    },
}

#[derive(clap::Args)]
struct DatasetArgs {
    /// Directory of <symbol>_<period>_<interval>.csv bar files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Ticker symbol, e.g. BTC-USD. Not needed when a --config names one.
    #[arg(long)]
    symbol: Option<String>,

    /// Lookback period label, e.g. 365d.
    #[arg(long, default_value = "365d")]
    period: String,

    /// Bar interval label, e.g. 1d.
    #[arg(long, default_value = "1d")]
    interval: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            strategy,
            params,
            fee,
            dataset,
        } => cmd_run(&strategy, &params, fee, &dataset),
        Commands::Optimize {
            config,
            strategy,
            ranges,
            trials,
            seed,
            fee,
            top,
            out,
            dataset,
        } => cmd_optimize(config, strategy, &ranges, trials, seed, fee, top, out, &dataset),
        Commands::Compare {
            runs,
            first,
            second,
        } => cmd_compare(&runs, first, second),
        Commands::Stability { runs, reference } => cmd_stability(&runs, reference),
    }
}

fn load_series(args: &DatasetArgs) -> Result<(DatasetId, alphalab_core::domain::PriceSeries)> {
    let Some(symbol) = &args.symbol else {
        bail!("--symbol is required");
    };
    let provider = CsvProvider::new(&args.data_dir);
    let series = provider.fetch(symbol, &args.period, &args.interval);
    if series.is_empty() {
        eprintln!(
            "warning: no data for {} ({}, {}) under {}; results will be empty",
            symbol,
            args.period,
            args.interval,
            args.data_dir.display()
        );
    }
    let dataset = DatasetId::new(symbol, &args.period, &args.interval);
    Ok((dataset, series))
}

fn parse_strategy(name: &str) -> Result<StrategyKind> {
    name.parse().with_context(|| {
        let known: Vec<&str> = StrategyKind::ALL.iter().map(|k| k.name()).collect();
        format!("unknown strategy '{name}'; known: {}", known.join(", "))
    })
}

/// Split one `name=value` argument.
fn split_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.trim(), value.trim())),
        _ => bail!("expected name=value, got '{raw}'"),
    }
}

fn build_params(kind: StrategyKind, overrides: &[String], fee: f64) -> Result<ParamSet> {
    let schema = kind.schema();
    let mut params = schema.default_set();

    for raw in overrides {
        let (name, value) = split_pair(raw)?;
        if schema.get(name).is_none() {
            bail!("strategy {} has no parameter '{name}'", kind.name());
        }
        let value: ParamValue = value
            .parse()
            .with_context(|| format!("bad value for parameter '{name}'"))?;
        params.insert(name, value);
    }

    params.insert(COST_PER_TRADE, ParamValue::Scalar(fee));
    Ok(params)
}

fn parse_ranges(kind: StrategyKind, raw_ranges: &[String]) -> Result<RangeMap> {
    let schema = kind.schema();
    let mut map = RangeMap::new();

    for raw in raw_ranges {
        let (name, bounds) = split_pair(raw)?;
        let spec = schema
            .get(name)
            .with_context(|| format!("strategy {} has no parameter '{name}'", kind.name()))?;
        let (lo, hi) = bounds
            .split_once(':')
            .with_context(|| format!("expected min:max bounds in '{raw}'"))?;

        let range = match spec.kind {
            ParamKind::Indicator { .. } => ParamRange::Window(
                lo.trim().parse().with_context(|| format!("bad window '{lo}'"))?,
                hi.trim().parse().with_context(|| format!("bad window '{hi}'"))?,
            ),
            ParamKind::Scalar { .. } => ParamRange::Value(
                lo.trim().parse().with_context(|| format!("bad value '{lo}'"))?,
                hi.trim().parse().with_context(|| format!("bad value '{hi}'"))?,
            ),
        };
        map.insert(name.to_string(), range);
    }

    Ok(map)
}

fn print_stats(stats: &Stats) {
    println!("  Profit %              {:>10.2}", stats.profit_pct);
    println!("  Biggest Win %         {:>10.2}", stats.biggest_win_pct);
    println!("  Biggest Loss %        {:>10.2}", stats.biggest_loss_pct);
    println!("  Average Trade Size %  {:>10.2}", stats.avg_trade_pct);
    println!("  Number of Trades      {:>10}", stats.num_trades);
    println!("  Win Rate %            {:>10.2}", stats.win_rate_pct);
    println!("  Sharpe Ratio          {:>10.2}", stats.sharpe);
}

fn format_params(record: &RunRecord) -> String {
    record
        .params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn cmd_run(strategy: &str, overrides: &[String], fee: f64, dataset_args: &DatasetArgs) -> Result<()> {
    let kind = parse_strategy(strategy)?;
    let params = build_params(kind, overrides, fee)?;
    let (dataset, series) = load_series(dataset_args)?;

    let strategy = Strategy::new(kind, &params)?;
    let mut table = IndicatorTable::new(&series);
    let mut eval = Evaluation::from_params(strategy, &params);
    eval.generate_signals(&mut table)?;
    eval.backtest(&table)?;
    let stats = eval.compute_stats()?.clone();

    let record = RunRecord::new(&dataset, kind, &params, stats);
    println!(
        "{} on {} ({}, {})",
        record.strategy, record.asset, record.period, record.interval
    );
    println!("  params: {}", format_params(&record));
    print_stats(&record.stats);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_optimize(
    config: Option<PathBuf>,
    strategy: Option<String>,
    raw_ranges: &[String],
    trials: usize,
    seed: u64,
    fee: f64,
    top: usize,
    out: Option<PathBuf>,
    dataset_args: &DatasetArgs,
) -> Result<()> {
    let (kind, ranges, trials, seed, fee, dataset, series) = match config {
        Some(path) => {
            let config = OptimizeConfig::from_path(&path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            let kind = config.strategy_kind()?;
            let ranges = config.range_map()?;
            let provider = CsvProvider::new(&dataset_args.data_dir);
            let series = provider.fetch(&config.symbol, &config.period, &config.interval);
            let dataset = DatasetId::new(&config.symbol, &config.period, &config.interval);
            (
                kind,
                ranges,
                config.trials,
                config.seed,
                config.cost_per_trade,
                dataset,
                series,
            )
        }
        None => {
            let Some(name) = strategy else {
                bail!("either --config or --strategy is required");
            };
            let kind = parse_strategy(&name)?;
            let ranges = parse_ranges(kind, raw_ranges)?;
            let (dataset, series) = load_series(dataset_args)?;
            (kind, ranges, trials, seed, fee, dataset, series)
        }
    };

    let optimizer = Optimizer::new(kind, &ranges, trials)?
        .with_seed(seed)
        .with_cost_per_trade(fee);

    println!(
        "optimizing {} on {} ({} trials, seed {seed})",
        kind.name(),
        dataset.symbol,
        trials
    );
    let ledger = optimizer.run_with_progress(&series, &dataset, &StdoutProgress)?;

    println!("\ntop {} by profit:", top.min(ledger.len()));
    for (rank, index) in ledger.ranked_by_profit().into_iter().take(top).enumerate() {
        let record = &ledger.records()[index];
        println!(
            "  #{:<2} trial {:<3} profit {:>8.2}%  sharpe {:>6.2}  trades {:>3}  {}",
            rank + 1,
            index,
            record.stats.profit_pct,
            record.stats.sharpe,
            record.stats.num_trades,
            format_params(record)
        );
    }

    if let Some(dir) = out {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        let runs_path = dir.join("runs.csv");
        let eq_path = dir.join("equities.csv");
        store::save_runs(&runs_path, ledger.records())?;
        store::save_equities(&eq_path, ledger.equities())?;
        println!(
            "\nsaved {} runs to {} and curves to {}",
            ledger.len(),
            runs_path.display(),
            eq_path.display()
        );
    }

    Ok(())
}

fn load_record(records: &[RunRecord], index: usize) -> Result<&RunRecord> {
    records
        .get(index)
        .with_context(|| format!("run index {index} out of range (file has {})", records.len()))
}

fn cmd_compare(runs: &PathBuf, first: usize, second: usize) -> Result<()> {
    let records = store::load_runs(runs)?;
    let a = load_record(&records, first)?;
    let b = load_record(&records, second)?;

    match compare_runs(a, b) {
        Ok(sensitivity) => {
            println!("comparing run {first} and run {second} ({})", a.strategy);
            println!("  input distance:  {:.3}", sensitivity.input_distance);
            println!("  output distance: {:.3}", sensitivity.output_distance);
            println!("  ratio:           {:.3}", sensitivity.ratio);
            Ok(())
        }
        Err(CompareError::IncomparableRuns) => {
            bail!("the runs use different data or different strategy classes")
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_stability(runs: &PathBuf, reference: usize) -> Result<()> {
    let records = store::load_runs(runs)?;
    let record = load_record(&records, reference)?;

    let estimate = stability_estimate(record, &records);
    println!(
        "stability of run {reference} ({}) against {} stored runs",
        record.strategy,
        records.len()
    );
    println!("  Lipschitz estimate: {estimate:.3}");
    Ok(())
}

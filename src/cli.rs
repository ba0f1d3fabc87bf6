//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::profile_store::ConfigProfileStore;
use crate::domain::adjustment::adjust_portfolio;
use crate::domain::allocation::{allocate, policy_by_name, RiskTier};
use crate::domain::backtest::{run_backtest_with, BacktestRequest, BacktestResult};
use crate::domain::config::AdvisorConfig;
use crate::domain::error::AdvisorError;
use crate::domain::metrics::PortfolioStats;
use crate::domain::profile::ClientProfile;
use crate::domain::returns::ReturnSeries;
use crate::domain::universe::AssetUniverse;
use crate::domain::weights::WeightVector;
use crate::ports::price_port::PricePort;
use crate::ports::profile_port::ProfileRepository;

#[derive(Parser, Debug)]
#[command(name = "folioadvisor", about = "Portfolio allocation and backtesting advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Propose weights for a risk tier or a stored client
    #[command(group(ArgGroup::new("who").required(true).args(["tier", "client"])))]
    Allocate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        tier: Option<String>,
        #[arg(long)]
        client: Option<String>,
        /// Comma-separated symbols overriding the tier universe
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },
    /// Expected return, volatility and Sharpe ratio of a weight vector
    Stats {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// e.g. VTI=0.6,BND=0.4
        #[arg(short, long)]
        weights: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Replay a fixed-weight portfolio over history
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        weights: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        benchmark: Option<String>,
    },
    /// Tilt a portfolio from a free-text instruction
    Adjust {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        weights: String,
        #[arg(short, long)]
        instruction: String,
    },
    /// Show a stored client profile
    Profile {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        client: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Dispatch a parsed command line, leaving exit-code mapping to [`run`].
pub fn execute(cli: Cli) -> Result<(), AdvisorError> {
    match cli.command {
        Command::Allocate {
            config,
            tier,
            client,
            symbols,
            start,
            end,
        } => run_allocate(
            config.as_ref(),
            tier.as_deref(),
            client.as_deref(),
            symbols.as_deref(),
            start.zip(end),
        ),
        Command::Stats {
            config,
            weights,
            start,
            end,
        } => run_stats(config.as_ref(), &weights, start, end),
        Command::Backtest {
            config,
            weights,
            start,
            end,
            benchmark,
        } => run_backtest(config.as_ref(), &weights, start, end, benchmark.as_deref()),
        Command::Adjust {
            config,
            weights,
            instruction,
        } => run_adjust(config.as_ref(), &weights, &instruction),
        Command::Profile { config, client } => run_profile(&config, &client),
    }
}

/// Parsed INI file plus the validated settings drawn from it.
///
/// Without a file every setting takes its default and no client
/// profiles are known.
pub struct LoadedConfig {
    pub adapter: Option<FileConfigAdapter>,
    pub settings: AdvisorConfig,
}

impl LoadedConfig {
    pub fn find_profile(&self, name: &str) -> Result<ClientProfile, AdvisorError> {
        match &self.adapter {
            Some(adapter) => ConfigProfileStore::new(adapter).get_profile(name),
            None => Err(AdvisorError::ProfileNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn price_port(&self) -> CsvPriceAdapter {
        CsvPriceAdapter::new(self.settings.price_dir.clone())
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<LoadedConfig, AdvisorError> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            adapter: None,
            settings: AdvisorConfig::default(),
        });
    };

    info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    let settings = AdvisorConfig::from_config(&adapter)?;
    Ok(LoadedConfig {
        adapter: Some(adapter),
        settings,
    })
}

/// Fetch prices for `universe` and turn them into aligned returns.
pub fn fetch_returns(
    port: &dyn PricePort,
    universe: &AssetUniverse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ReturnSeries, AdvisorError> {
    info!(
        "Fetching prices for {} assets, {} to {}",
        universe.len(),
        start,
        end
    );
    let prices = port.fetch_prices(universe, start, end)?;
    let returns = ReturnSeries::build(&prices)?;
    info!("  {} aligned return periods", returns.periods());
    Ok(returns)
}

/// Universe named by a weight vector, in the vector's order.
pub fn universe_of(weights: &WeightVector) -> Result<AssetUniverse, AdvisorError> {
    AssetUniverse::new(weights.symbols())
}

fn run_allocate(
    config_path: Option<&PathBuf>,
    tier: Option<&str>,
    client: Option<&str>,
    symbols: Option<&str>,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<(), AdvisorError> {
    let loaded = load_config(config_path)?;
    let settings = &loaded.settings;

    let tier: RiskTier = match (tier, client) {
        (Some(t), _) => t.parse()?,
        (None, Some(name)) => {
            let profile = loaded.find_profile(name)?;
            info!(
                "Client {}: age {}, {} risk, {}-year horizon",
                profile.name, profile.age, profile.risk_tolerance, profile.investment_horizon
            );
            profile.risk_tolerance
        }
        (None, None) => return Err(AdvisorError::UnknownRiskTier(String::new())),
    };

    let universe = match symbols {
        Some(list) => AssetUniverse::parse(list)?,
        None => settings.universe_for(tier),
    };

    let policy = policy_by_name(&settings.policy).ok_or_else(|| AdvisorError::ConfigInvalid {
        section: "portfolio".to_string(),
        key: "policy".to_string(),
        reason: format!("unknown allocation policy '{}'", settings.policy),
    })?;

    let weights = allocate(tier, &universe, policy.as_ref())?;
    println!("=== Allocation ({tier}, {}) ===", policy.name());
    print_weights(&weights);

    if let Some((start, end)) = window {
        let returns = fetch_returns(&loaded.price_port(), &universe, start, end)?;
        let stats = PortfolioStats::compute(&weights, &returns, settings.annualization_factor)?;
        println!();
        print_stats(&stats);
    }
    Ok(())
}

fn run_stats(
    config_path: Option<&PathBuf>,
    weights: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), AdvisorError> {
    let loaded = load_config(config_path)?;
    let weights = WeightVector::parse(weights)?.normalized()?;
    let universe = universe_of(&weights)?;

    let returns = fetch_returns(&loaded.price_port(), &universe, start, end)?;
    let stats = PortfolioStats::compute(&weights, &returns, loaded.settings.annualization_factor)?;

    println!("=== Portfolio Statistics ===");
    print_weights(&weights);
    println!();
    print_stats(&stats);
    Ok(())
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    weights: &str,
    start: NaiveDate,
    end: NaiveDate,
    benchmark_override: Option<&str>,
) -> Result<(), AdvisorError> {
    let loaded = load_config(config_path)?;
    let mut weights = WeightVector::parse(weights)?.normalized()?;

    let benchmark = benchmark_override
        .map(|b| b.trim().to_uppercase())
        .filter(|b| !b.is_empty())
        .or_else(|| loaded.settings.benchmark.clone());

    // The benchmark rides along at zero weight so it shares the timeline.
    if let Some(symbol) = &benchmark {
        if weights.get(symbol).is_none() {
            weights.set(symbol.clone(), 0.0);
        }
    }

    let universe = universe_of(&weights)?;
    let returns = fetch_returns(&loaded.price_port(), &universe, start, end)?;

    let request = BacktestRequest {
        weights: &weights,
        annualization_factor: loaded.settings.annualization_factor,
        benchmark: benchmark.as_deref(),
    };
    let result = run_backtest_with(&request, &returns)?;

    println!("=== Backtest Results ===");
    print_backtest(&result, benchmark.as_deref());
    Ok(())
}

fn run_adjust(
    config_path: Option<&PathBuf>,
    weights: &str,
    instruction: &str,
) -> Result<(), AdvisorError> {
    let loaded = load_config(config_path)?;
    let current = WeightVector::parse(weights)?.normalized()?;
    let adjusted = adjust_portfolio(&current, &loaded.settings.rules, instruction)?;

    println!("=== Adjusted Portfolio ===");
    println!("Instruction: {instruction}");
    for (symbol, weight) in adjusted.iter() {
        let before = current.get(symbol).unwrap_or(0.0);
        println!(
            "  {:<8} {:>7.2}% -> {:>7.2}%",
            symbol,
            before * 100.0,
            weight * 100.0
        );
    }
    Ok(())
}

fn run_profile(config_path: &PathBuf, client: &str) -> Result<(), AdvisorError> {
    let loaded = load_config(Some(config_path))?;
    let profile = loaded.find_profile(client)?;

    println!("=== Client Profile ===");
    println!("Name:             {}", profile.name);
    println!("Age:              {}", profile.age);
    println!("Risk Tolerance:   {}", profile.risk_tolerance);
    println!("Horizon:          {} years", profile.investment_horizon);
    println!("Capital:          {:.2}", profile.capital);
    println!(
        "ESG Preference:   {}",
        if profile.esg_preference { "yes" } else { "no" }
    );
    if !profile.sector_preferences.is_empty() {
        println!("Sectors:          {}", profile.sector_preferences.join(", "));
    }
    Ok(())
}

fn print_weights(weights: &WeightVector) {
    for (symbol, weight) in weights.iter() {
        println!("  {:<8} {:>7.2}%", symbol, weight * 100.0);
    }
}

fn print_stats(stats: &PortfolioStats) {
    println!("Expected Return:  {:.2}%", stats.expected_return * 100.0);
    println!("Volatility:       {:.2}%", stats.volatility * 100.0);
    println!("Sharpe Ratio:     {:.2}", stats.sharpe_ratio);
}

fn print_backtest(result: &BacktestResult, benchmark: Option<&str>) {
    if let (Some(start), Some(end)) = (result.period_start, result.period_end) {
        println!("Period:           {} to {} ({} periods)", start, end, result.periods);
    } else {
        println!("Periods:          {}", result.periods);
    }
    println!("Total Return:     {:.2}%", result.total_return * 100.0);
    println!("CAGR:             {:.2}%", result.cagr * 100.0);
    println!("Volatility:       {:.2}%", result.volatility * 100.0);
    println!("Sharpe Ratio:     {:.2}", result.sharpe_ratio);
    println!("Max Drawdown:     {:.1}%", result.max_drawdown * 100.0);
    match (benchmark, result.benchmark_return) {
        (Some(symbol), Some(r)) => println!("Benchmark ({symbol}):  {:.2}%", r * 100.0),
        (Some(symbol), None) => println!("Benchmark ({symbol}):  no data"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn parse_allocate_by_tier() {
        let cli = Cli::try_parse_from(["folioadvisor", "allocate", "--tier", "moderate"]).unwrap();
        match cli.command {
            Command::Allocate { tier, client, .. } => {
                assert_eq!(tier.as_deref(), Some("moderate"));
                assert_eq!(client, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn allocate_needs_tier_or_client() {
        assert!(Cli::try_parse_from(["folioadvisor", "allocate"]).is_err());
        assert!(Cli::try_parse_from([
            "folioadvisor",
            "allocate",
            "--tier",
            "moderate",
            "--client",
            "alice"
        ])
        .is_err());
    }

    #[test]
    fn allocate_window_needs_both_ends() {
        assert!(Cli::try_parse_from([
            "folioadvisor",
            "allocate",
            "--tier",
            "moderate",
            "--start",
            "2024-01-01"
        ])
        .is_err());
    }

    #[test]
    fn parse_backtest_dates() {
        let cli = Cli::try_parse_from([
            "folioadvisor",
            "backtest",
            "--weights",
            "VTI=0.6,BND=0.4",
            "--start",
            "2024-01-01",
            "--end",
            "2024-06-30",
            "--benchmark",
            "spy",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                start, benchmark, ..
            } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(benchmark.as_deref(), Some("spy"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_date_rejected() {
        assert!(Cli::try_parse_from([
            "folioadvisor",
            "stats",
            "--weights",
            "VTI=1",
            "--start",
            "01/01/2024",
            "--end",
            "2024-06-30"
        ])
        .is_err());
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let loaded = load_config(None).unwrap();
        assert!(loaded.adapter.is_none());
        assert_eq!(loaded.settings.policy, "heuristic");
        assert!(matches!(
            loaded.find_profile("alice"),
            Err(AdvisorError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn universe_of_follows_weight_order() {
        let weights = WeightVector::parse("qqq=0.5,vti=0.5").unwrap();
        assert_eq!(universe_of(&weights).unwrap().symbols(), ["QQQ", "VTI"]);
    }

    #[test]
    fn unknown_tier_is_validation_error() {
        let cli = Cli::try_parse_from(["folioadvisor", "allocate", "--tier", "yolo"]).unwrap();
        let err = execute(cli).unwrap_err();
        assert!(matches!(err, AdvisorError::UnknownRiskTier(ref t) if t == "yolo"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn run_logs_error_once_at_error_level() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let cli = Cli::try_parse_from(["folioadvisor", "allocate", "--tier", "yolo"]).unwrap();
        tracing::subscriber::with_default(subscriber, || run(cli));

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("unknown risk tier: yolo"), "{output}");
        assert!(!output.contains("error: unknown"), "{output}");
    }

    #[test]
    fn missing_config_is_config_error() {
        let cli = Cli::try_parse_from([
            "folioadvisor",
            "profile",
            "--config",
            "/nonexistent/advisor.ini",
            "--client",
            "alice",
        ])
        .unwrap();
        let err = execute(cli).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}

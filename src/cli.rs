//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::telegram_adapter::TelegramAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::QuantsignalError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::metrics::Metrics;
use crate::domain::pipeline::{analyze_many, Analysis};
use crate::domain::price_series::PriceSeries;
use crate::domain::sentiment::mood_label;
use crate::domain::signal::{
    SignalRule, DEFAULT_BUY_RSI, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD, DEFAULT_SELL_RSI,
};
use crate::domain::simulator::DEFAULT_INITIAL_CAPITAL;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, FetchRequest, DEFAULT_INTERVAL, DEFAULT_PERIOD};
use crate::ports::news_port::{symbol_mood, NewsPort};
use crate::ports::notify_port::{notify_transition, NotifyPort};
use crate::ports::report_port::ReportPort;

pub const DEFAULT_WATCHLIST: [&str; 6] = ["BTC-USD", "ETH-USD", "^GSPC", "^IXIC", "NVDA", "AAPL"];
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "quantsignal", about = "Technical signal generator and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the configured strategy over each symbol's history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Symbol to analyze; repeat for several. Defaults to the configured watchlist
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// CSV file receiving indicators and signals per bar
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the latest signal and headline mood per symbol
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Send BUY/SELL alerts to the configured Telegram chat
        #[arg(long)]
        notify: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbols,
            data_dir,
            output,
        } => run_backtest(&config, &symbols, data_dir.as_ref(), output.as_ref()),
        Command::Signals {
            config,
            data_dir,
            notify,
        } => run_signals(&config, data_dir.as_ref(), notify),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn report_error(err: QuantsignalError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn build_indicator_config(adapter: &dyn ConfigPort) -> IndicatorConfig {
    let defaults = IndicatorConfig::default();
    let period = |key: &str, default: usize| {
        let value = adapter.get_int("indicators", key, default as i64);
        usize::try_from(value).unwrap_or(0)
    };

    IndicatorConfig {
        rsi_period: period("rsi_period", defaults.rsi_period),
        sma_fast: period("sma_fast", defaults.sma_fast),
        sma_slow: period("sma_slow", defaults.sma_slow),
        bb_period: period("bb_period", defaults.bb_period),
        bb_stddev_mult: adapter.get_double("indicators", "bb_stddev_mult", defaults.bb_stddev_mult),
        macd_fast: period("macd_fast", defaults.macd_fast),
        macd_slow: period("macd_slow", defaults.macd_slow),
        macd_signal: period("macd_signal", defaults.macd_signal),
    }
}

pub fn build_signal_rule(adapter: &dyn ConfigPort) -> Result<SignalRule, QuantsignalError> {
    let rule = adapter
        .get_string("strategy", "rule")
        .unwrap_or_else(|| "confirmation".to_string());

    match rule.trim().to_lowercase().as_str() {
        "confirmation" => Ok(SignalRule::Confirmation {
            buy_rsi: adapter.get_double("strategy", "buy_rsi", DEFAULT_BUY_RSI),
            sell_rsi: adapter.get_double("strategy", "sell_rsi", DEFAULT_SELL_RSI),
        }),
        "rsi_trend" => Ok(SignalRule::RsiTrend {
            oversold: adapter.get_double("strategy", "oversold", DEFAULT_OVERSOLD),
            overbought: adapter.get_double("strategy", "overbought", DEFAULT_OVERBOUGHT),
        }),
        other => Err(QuantsignalError::ConfigInvalid {
            section: "strategy".into(),
            key: "rule".into(),
            reason: format!("unknown rule '{other}'"),
        }),
    }
}

/// Validates the whole file, then assembles the strategy from it.
pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, QuantsignalError> {
    validate_config(adapter)?;
    let defaults = StrategyConfig::default();

    Ok(StrategyConfig {
        name: adapter.get_string("strategy", "name").unwrap_or(defaults.name),
        indicators: build_indicator_config(adapter),
        rule: build_signal_rule(adapter)?,
        initial_capital: adapter.get_double("strategy", "initial_capital", DEFAULT_INITIAL_CAPITAL),
    })
}

pub fn build_fetch_request(adapter: &dyn ConfigPort) -> FetchRequest {
    FetchRequest {
        period: adapter
            .get_string("data", "period")
            .unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
        interval: adapter
            .get_string("data", "interval")
            .unwrap_or_else(|| DEFAULT_INTERVAL.to_string()),
    }
}

/// Command-line symbols win, then `[data] symbols`, then the default watchlist.
pub fn resolve_symbols(overrides: &[String], adapter: &dyn ConfigPort) -> Vec<String> {
    if !overrides.is_empty() {
        return overrides.to_vec();
    }
    let configured = adapter.get_list("data", "symbols");
    if !configured.is_empty() {
        return configured;
    }
    DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect()
}

pub enum DataSource {
    Csv(CsvAdapter),
    Yahoo(YahooAdapter),
}

impl DataSource {
    pub fn from_config(adapter: &dyn ConfigPort, data_dir: Option<&PathBuf>) -> Result<Self, QuantsignalError> {
        let source = adapter
            .get_string("data", "source")
            .unwrap_or_else(|| "csv".to_string());

        match source.trim().to_lowercase().as_str() {
            "csv" => {
                let dir = data_dir.cloned().unwrap_or_else(|| {
                    PathBuf::from(
                        adapter
                            .get_string("data", "data_dir")
                            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
                    )
                });
                Ok(DataSource::Csv(CsvAdapter::new(dir)))
            }
            "yahoo" => Ok(DataSource::Yahoo(YahooAdapter::new()?)),
            other => Err(QuantsignalError::ConfigInvalid {
                section: "data".into(),
                key: "source".into(),
                reason: format!("unknown source '{other}'"),
            }),
        }
    }

    pub fn data_port(&self) -> &dyn DataPort {
        match self {
            DataSource::Csv(a) => a as &dyn DataPort,
            DataSource::Yahoo(a) => a as &dyn DataPort,
        }
    }

    /// Headlines are only available from the online provider.
    pub fn news_port(&self) -> Option<&dyn NewsPort> {
        match self {
            DataSource::Csv(_) => None,
            DataSource::Yahoo(a) => Some(a as &dyn NewsPort),
        }
    }
}

/// Fetches every symbol, skipping the ones that fail or come back empty.
pub fn fetch_all(
    data_port: &dyn DataPort,
    symbols: &[String],
    request: &FetchRequest,
) -> Vec<(String, PriceSeries)> {
    let mut fetched = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match data_port.fetch_series(symbol, request) {
            Ok(series) if series.is_empty() => {
                eprintln!("warning: skipping {symbol} (no data)");
            }
            Ok(series) => fetched.push((symbol.clone(), series)),
            Err(e) => {
                tracing::warn!(%symbol, "fetch failed: {e}");
                eprintln!("warning: skipping {symbol} ({e})");
            }
        }
    }
    fetched
}

/// Report path for one symbol. With several symbols the symbol is appended
/// to the file stem so each gets its own file.
pub fn report_path(output: &Path, symbol: &str, multiple: bool) -> PathBuf {
    if !multiple {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    output.with_file_name(format!("{stem}_{symbol}.{ext}"))
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match build_strategy_config(&adapter) {
        Ok(strategy) => {
            eprintln!("Configuration is valid.");
            eprintln!("  Strategy:  {}", strategy.name);
            eprintln!("  Rule:      {}", strategy.rule.name());
            eprintln!("  Warm-up:   {} bars", strategy.rule.required_warmup(&strategy.indicators));
            eprintln!("  Capital:   {:.2}", strategy.initial_capital);
            ExitCode::SUCCESS
        }
        Err(e) => report_error(e),
    }
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_overrides: &[String],
    data_dir: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return report_error(e),
    };
    eprintln!("Strategy: {} ({})", strategy.name, strategy.rule.name());

    let source = match DataSource::from_config(&adapter, data_dir) {
        Ok(s) => s,
        Err(e) => return report_error(e),
    };

    let symbols = resolve_symbols(symbol_overrides, &adapter);
    let request = build_fetch_request(&adapter);

    run_backtest_pipeline(
        source.data_port(),
        &strategy,
        &symbols,
        &request,
        output_path.map(|p| p.as_path()),
    )
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    symbols: &[String],
    request: &FetchRequest,
    output_path: Option<&Path>,
) -> ExitCode {
    eprintln!(
        "Fetching {} symbols ({} of {} bars)...",
        symbols.len(),
        request.period,
        request.interval
    );
    let inputs = fetch_all(data_port, symbols, request);
    if inputs.is_empty() {
        eprintln!("error: no symbols with data to backtest");
        return ExitCode::from(5);
    }

    let multiple = inputs.len() > 1;
    let results = analyze_many(inputs, strategy);
    let mut completed = 0usize;

    eprintln!("\n=== Backtest Results ===");
    for (symbol, result) in results {
        let analysis = match result {
            Ok(a) => a,
            Err(e) => {
                eprintln!("  {symbol}: error: {e}");
                continue;
            }
        };
        completed += 1;
        print_backtest_summary(&analysis);

        if let Some(output) = output_path {
            let path = report_path(output, &symbol, multiple);
            let path_str = path.to_string_lossy();
            match CsvReportAdapter.write(&analysis, &path_str) {
                Ok(()) => eprintln!("    Report written to: {}", path.display()),
                Err(e) => return report_error(e),
            }
        }
    }

    if completed == 0 {
        eprintln!("error: every symbol failed");
        return ExitCode::from(4);
    }
    ExitCode::SUCCESS
}

fn print_backtest_summary(analysis: &Analysis) {
    let report = &analysis.report;
    eprintln!("  {}:", analysis.symbol);
    if analysis.insufficient_data {
        eprintln!(
            "    Insufficient data ({} bars); no trades simulated",
            analysis.frame.len()
        );
    }
    if analysis.rejected_bars > 0 {
        eprintln!("    Rejected bars:    {}", analysis.rejected_bars);
    }

    let metrics = Metrics::compute(report);
    eprintln!("    Final Balance:    {:.2}", report.final_balance);
    eprintln!("    Total Return:     {:.2}%", report.total_return_pct);
    eprintln!("    Trades:           {}", report.trade_count);
    eprintln!("    Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("    Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    if let Some(exit) = &report.forced_exit {
        eprintln!("    Open position liquidated at {:.2} ({})", exit.price, exit.timestamp);
    }
}

fn run_signals(config_path: &PathBuf, data_dir: Option<&PathBuf>, notify: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return report_error(e),
    };

    let source = match DataSource::from_config(&adapter, data_dir) {
        Ok(s) => s,
        Err(e) => return report_error(e),
    };

    let notifier = if notify {
        match TelegramAdapter::from_config(&adapter) {
            Ok(Some(t)) => Some(t),
            Ok(None) => {
                eprintln!("warning: --notify given but [telegram] token/chat_id are not set");
                None
            }
            Err(e) => return report_error(e),
        }
    } else {
        None
    };

    let symbols = resolve_symbols(&[], &adapter);
    let request = build_fetch_request(&adapter);

    run_signals_pipeline(
        source.data_port(),
        source.news_port(),
        notifier.as_ref().map(|n| n as &dyn NotifyPort),
        &strategy,
        &symbols,
        &request,
    )
}

pub fn run_signals_pipeline(
    data_port: &dyn DataPort,
    news_port: Option<&dyn NewsPort>,
    notify_port: Option<&dyn NotifyPort>,
    strategy: &StrategyConfig,
    symbols: &[String],
    request: &FetchRequest,
) -> ExitCode {
    let inputs = fetch_all(data_port, symbols, request);
    if inputs.is_empty() {
        eprintln!("error: no symbols with data");
        return ExitCode::from(5);
    }

    let mut alerts = 0usize;
    eprintln!("\n=== Latest Signals ===");
    for (symbol, result) in analyze_many(inputs, strategy) {
        let analysis = match result {
            Ok(a) => a,
            Err(e) => {
                eprintln!("  {symbol}: error: {e}");
                continue;
            }
        };

        let mood = news_port
            .map(|port| {
                let score = symbol_mood(port, &symbol);
                format!("{:+.2} ({})", score, mood_label(score))
            })
            .unwrap_or_else(|| "n/a".to_string());

        match analysis.latest_signal() {
            Some(latest) => {
                eprintln!(
                    "  {:<10} {:<4} at {:.2} ({})  mood {}",
                    symbol, latest.signal, latest.close, latest.timestamp, mood
                );
                if let Some(port) = notify_port {
                    if notify_transition(port, &symbol, latest) {
                        alerts += 1;
                    }
                }
            }
            None => eprintln!("  {:<10} no signal (insufficient data)  mood {}", symbol, mood),
        }
    }

    if notify_port.is_some() {
        eprintln!("\n{alerts} alert(s) sent");
    }
    ExitCode::SUCCESS
}

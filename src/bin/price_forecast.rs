use egostrategy_forecast::config::Config;
use egostrategy_forecast::data_provider::{ExpiryPolicy, PriceDataProvider};
use egostrategy_forecast::forecast::gbm::GbmParams;
use egostrategy_forecast::models::market::Market;
use egostrategy_forecast::providers::{ArrowFileProvider, MarketDataProvider, YahooProvider};
use egostrategy_forecast::render::text;
use egostrategy_forecast::services::ForecastService;
use egostrategy_forecast::util::{self, arrow_utils};
use egostrategy_forecast::web::{self, AppState};

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn date_arg(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<NaiveDate>> {
    matches
        .value_of(name)
        .map(|s| util::parse_date(s).with_context(|| format!("Invalid --{} value: {}", name, s)))
        .transpose()
}

fn market_arg(matches: &ArgMatches) -> anyhow::Result<Market> {
    match matches.value_of("market") {
        Some(m) => m.parse::<Market>().map_err(|e| anyhow!(e)),
        None => Ok(Market::default()),
    }
}

/// 各子命令共有的参数 -> 配置
fn config_from(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = Config::new();

    if let Some(start) = date_arg(matches, "start")? {
        config = config.with_start_date(start);
    }
    if let Some(end) = date_arg(matches, "date")? {
        config = config.with_end_date(end);
    }
    if let Some(url) = matches.value_of("base-url") {
        config = config.with_yahoo_base_url(url);
    }
    if let Some(timeout) = matches.value_of("timeout") {
        let secs = timeout.parse::<u64>().with_context(|| format!("Invalid --timeout value: {}", timeout))?;
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    Ok(config)
}

fn source_for(config: &Config, data_dir: Option<&str>) -> anyhow::Result<Arc<dyn MarketDataProvider + Send + Sync>> {
    Ok(match data_dir {
        Some(dir) => {
            info!("Reading daily data from {}", dir);
            Arc::new(ArrowFileProvider::new(dir))
        }
        None => Arc::new(YahooProvider::new(&config.yahoo_base_url, config.request_timeout)?),
    })
}

fn service_for(config: Config, data_dir: Option<&str>) -> anyhow::Result<ForecastService> {
    let source = source_for(&config, data_dir)?;
    let provider = PriceDataProvider::new(source, config.start_date).with_expiry(config.cache_expiry);
    Ok(ForecastService::new(config, Arc::new(provider)))
}

async fn serve(matches: &ArgMatches) -> anyhow::Result<()> {
    let mut config = config_from(matches)?;
    if let Some(bind) = matches.value_of("bind") {
        config = config.with_bind(bind);
    }
    if let Some(ttl) = matches.value_of("cache-ttl") {
        let secs = ttl.parse::<u64>().with_context(|| format!("Invalid --cache-ttl value: {}", ttl))?;
        config = config.with_cache_expiry(ExpiryPolicy::After(Duration::from_secs(secs)));
    }
    let bind = config.bind.clone();
    let service = service_for(config, None)?;
    let app = web::router(AppState::new(Arc::new(service)));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Dashboard listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn predict(matches: &ArgMatches) -> anyhow::Result<()> {
    let market = market_arg(matches)?;
    let mut config = config_from(matches)?;
    if let Some(seed) = matches.value_of("seed") {
        let seed = seed.parse::<u64>().with_context(|| format!("Invalid --seed value: {}", seed))?;
        config = config.with_gbm(GbmParams { seed, ..GbmParams::default() });
    }
    let tail_rows = config.tail_rows;
    let service = service_for(config, matches.value_of("data-dir"))?;

    let ticker = market.resolve_ticker(matches.value_of("stock"), matches.value_of("ticker"));
    info!("Market: {}, ticker: {}", market, ticker);

    let series = service.load_series(market, &ticker).await?;
    info!("Raw data for {}", series.symbol);
    for line in text::tail_lines(&series, tail_rows) {
        info!("{}", line);
    }

    match service.forecast_series(market, Arc::clone(&series)) {
        Ok(report) => {
            info!("{}", text::forecast_line(&report.forecast, report.currency));
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            warn!("{}", e);
            Ok(())
        }
        Err(e) => {
            error!("Forecast for {} failed: {}", ticker, e);
            Err(e.into())
        }
    }
}

async fn export(matches: &ArgMatches) -> anyhow::Result<()> {
    let ticker = matches.value_of("ticker").ok_or_else(|| anyhow!("--ticker is required"))?;
    let out = matches.value_of("out").ok_or_else(|| anyhow!("--out is required"))?;
    let market = market_arg(matches)?;
    let config = config_from(matches)?;
    let end = config.end_date.unwrap_or_else(|| util::today_in(market.timezone()));

    let provider = YahooProvider::new(&config.yahoo_base_url, config.request_timeout)?;
    let series = provider.fetch_daily(ticker, config.start_date, end).await?;
    if series.is_empty() {
        warn!("No data available for {}, nothing exported", ticker);
        return Ok(());
    }

    arrow_utils::save_price_series_to_arrow(&series, Path::new(out))?;
    info!("Exported {} records of {} to {}", series.len(), ticker, out);
    Ok(())
}

fn list_markets() {
    for market in Market::ALL {
        info!("{} ({}, {})", market, market.currency_symbol(), market.timezone());
        info!("{:-<60}", "");
        for instrument in market.instruments() {
            info!("{:<16} {}", instrument.symbol, instrument.name);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 默认输出 info 级别日志，可用 RUST_LOG 覆盖
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_flag = Arg::with_name("start")
        .long("start")
        .value_name("DATE")
        .help("First date of the history (YYYY-MM-DD)")
        .takes_value(true);
    let today_flag = Arg::with_name("date")
        .short('d')
        .long("date")
        .value_name("DATE")
        .help("Treat DATE as today instead of the market's current date (YYYY-MM-DD)")
        .takes_value(true);
    let market_flag = Arg::with_name("market")
        .short('m')
        .long("market")
        .value_name("MARKET")
        .help("Market to select from (US, India)")
        .takes_value(true);
    let base_url_flag = Arg::with_name("base-url")
        .long("base-url")
        .value_name("URL")
        .help("Yahoo Finance base url")
        .takes_value(true);
    let timeout_flag = Arg::with_name("timeout")
        .long("timeout")
        .value_name("SECS")
        .help("HTTP request timeout in seconds")
        .takes_value(true);

    let app = App::new("Price Forecast")
        .version("2025.6.2")
        .author("EgoStrategy Team")
        .about("Next-day close price forecast dashboard")
        .subcommand(
            SubCommand::with_name("serve")
                .about("Serve the forecast dashboard over HTTP")
                .arg(
                    Arg::with_name("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to listen on")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("cache-ttl")
                        .long("cache-ttl")
                        .value_name("SECS")
                        .help("Refetch a ticker after SECS seconds (cached for the process lifetime by default)")
                        .takes_value(true),
                )
                .arg(start_flag.clone())
                .arg(today_flag.clone())
                .arg(base_url_flag.clone())
                .arg(timeout_flag.clone()),
        )
        .subcommand(
            SubCommand::with_name("predict")
                .about("Forecast the next business day's close for one ticker")
                .arg(market_flag.clone())
                .arg(
                    Arg::with_name("stock")
                        .short('s')
                        .long("stock")
                        .value_name("NAME")
                        .help("Instrument display name, e.g. \"Apple (AAPL)\"")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .help("Custom ticker, overrides --stock")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("data-dir")
                        .long("data-dir")
                        .value_name("DIR")
                        .help("Read exported Arrow files from DIR instead of Yahoo Finance")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Random seed for the boosted trees")
                        .takes_value(true),
                )
                .arg(start_flag.clone())
                .arg(today_flag.clone())
                .arg(base_url_flag.clone())
                .arg(timeout_flag.clone()),
        )
        .subcommand(
            SubCommand::with_name("export")
                .about("Download daily data for a ticker into an Arrow file")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .help("Ticker to download")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("out")
                        .short('o')
                        .long("out")
                        .value_name("FILE")
                        .help("Output Arrow file")
                        .required(true)
                        .takes_value(true),
                )
                .arg(market_flag)
                .arg(start_flag)
                .arg(today_flag)
                .arg(base_url_flag)
                .arg(timeout_flag),
        )
        .subcommand(SubCommand::with_name("markets").about("List the selectable instruments per market"));

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("serve") {
        serve(matches).await?;
    } else if let Some(matches) = matches.subcommand_matches("predict") {
        predict(matches).await?;
    } else if let Some(matches) = matches.subcommand_matches("export") {
        export(matches).await?;
    } else if matches.subcommand_matches("markets").is_some() {
        list_markets();
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

//! rwtrade - Rwanda trade statistics in the terminal
//!
//! A command-line client for the trade dashboard API that prints quarterly
//! trade, partner rankings, commodity breakdowns and forecasts.

use std::error::Error;
use std::io::{self, IsTerminal, Write};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rwtrade::api::{ApiClient, FetchOptions, TerminalIndicator, TerminalNotifier};
use rwtrade::cli::{Action, Cli, CliError, StartupConfig};
use rwtrade::config::ApiConfig;
use rwtrade::data::{Dashboard, TradeClient, TradeFlow};
use rwtrade::render::{self, table_height};

/// Installs the log subscriber; `RUST_LOG` overrides the default `warn` level.
/// Logs go to stderr so stdout stays clean for data.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Asks whether a failed request should be sent again
fn confirm_retry() -> bool {
    if !io::stdin().is_terminal() {
        return false;
    }
    eprint!("Retry? [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer).is_ok()
        && matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}

fn print_dashboard(dashboard: &Dashboard) {
    let width = render::terminal_width();

    match dashboard.overview {
        Some(ref overview) => {
            let height = if overview.re_exports.is_some() { 7 } else { 6 };
            render::print_widget(render::overview_paragraph(overview), height);
        }
        None => println!("Overview unavailable."),
    }

    if !dashboard.trend.is_empty() {
        for line in render::trend_lines(&dashboard.trend, width) {
            println!("{}", line);
        }
    }

    if !dashboard.quarterly.is_empty() {
        render::print_widget(
            render::quarterly_table(&dashboard.quarterly),
            table_height(dashboard.quarterly.len()),
        );
    }

    for (flow, countries) in [
        (TradeFlow::Exports, &dashboard.top_exports),
        (TradeFlow::Imports, &dashboard.top_imports),
    ] {
        if !countries.is_empty() {
            render::print_widget(
                render::country_table(flow, countries),
                table_height(countries.len()),
            );
        }
    }
}

async fn run_fetch(
    trade: &TradeClient,
    endpoint: &str,
    options: FetchOptions,
) -> Result<(), Box<dyn Error>> {
    let api = trade.api();
    let mut result = api.fetch(endpoint, options).await;

    while result.is_err() && confirm_retry() {
        match api.repeat_last().await {
            Some(repeated) => result = repeated,
            None => break,
        }
    }

    let value = result?;
    println!("{}", serde_json::to_string_pretty(&*value)?);
    Ok(())
}

async fn run(trade: &TradeClient, action: Action) -> Result<(), Box<dyn Error>> {
    match action {
        Action::Overview { limit } => {
            let dashboard = trade.load_dashboard(limit).await;
            print_dashboard(&dashboard);
        }
        Action::Quarterly => {
            let rows = trade.quarterly_trade().await?;
            if rows.is_empty() {
                println!("No quarterly data available.");
            } else {
                render::print_widget(render::quarterly_table(&rows), table_height(rows.len()));
            }
        }
        Action::Countries { flow, limit } => {
            let countries = trade.top_countries(flow, limit).await?;
            if countries.is_empty() {
                println!("No partner data available for {}.", flow.as_str());
            } else {
                render::print_widget(
                    render::country_table(flow, &countries),
                    table_height(countries.len()),
                );
            }
        }
        Action::Commodities { flow } => {
            let sections = trade.commodities(flow).await?;
            if sections.is_empty() {
                println!("No commodity data available for {}.", flow.as_str());
            } else {
                render::print_widget(
                    render::commodity_table(flow, &sections),
                    table_height(sections.len()),
                );
            }
        }
        Action::Forecast => {
            let forecast = trade.forecast().await?;
            render::print_widget(
                render::forecast_table(&forecast),
                table_height(render::forecast_rows(&forecast)),
            );
        }
        Action::Fetch { endpoint, options } => run_fetch(trade, &endpoint, options).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let cli = Cli::parse();
    let startup = ApiConfig::from_env()
        .map_err(CliError::from)
        .and_then(|env| StartupConfig::from_cli(&cli, env));
    let startup = match startup {
        Ok(startup) => startup,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(2);
        }
    };
    tracing::debug!(
        base_url = %startup.api.base_url,
        timeout_ms = startup.timeout().as_millis() as u64,
        "starting"
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("rwtrade/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let api = ApiClient::new(startup.api.clone())
        .with_http_client(http)
        .with_indicator(Arc::new(TerminalIndicator::new()))
        .with_notifier(Arc::new(TerminalNotifier));
    let trade = TradeClient::new(api);

    if let Err(err) = run(&trade, startup.action).await {
        eprintln!("error: {}", err);
        process::exit(1);
    }

    Ok(())
}

//! Command-line interface parsing for the trade statistics client
//!
//! This module handles parsing of CLI arguments using clap and turns them,
//! together with the environment configuration, into a validated
//! [`StartupConfig`].

use clap::{Parser, Subcommand};
use reqwest::Method;
use std::time::Duration;
use thiserror::Error;

use crate::api::FetchOptions;
use crate::config::{parse_timeout_ms, ApiConfig, ConfigError};
use crate::data::trade::DEFAULT_COUNTRY_LIMIT;
use crate::data::TradeFlow;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified flow name is not recognized
    #[error("Invalid flow: '{0}'. Valid flows: exports, imports")]
    InvalidFlow(String),

    /// A header argument is not in `NAME:VALUE` form
    #[error("Invalid header: '{0}'. Expected NAME:VALUE")]
    InvalidHeader(String),

    /// A form field argument is not in `NAME=VALUE` form
    #[error("Invalid form field: '{0}'. Expected NAME=VALUE")]
    InvalidFormField(String),

    /// The HTTP method is not a valid token
    #[error("Invalid method: '{0}'")]
    InvalidMethod(String),

    /// API URL or timeout override is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rwanda trade statistics in the terminal
#[derive(Parser, Debug)]
#[command(name = "rwtrade")]
#[command(about = "Rwanda trade statistics from the trade dashboard API")]
#[command(version)]
pub struct Cli {
    /// Base URL of the trade statistics API (overrides RWTRADE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds (overrides RWTRADE_API_TIMEOUT_MS)
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; `overview` runs when none is given
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Headline figures, quarterly trend and top partners
    Overview {
        /// Partner countries per flow
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Quarterly exports and imports
    Quarterly,
    /// Top partner countries for a flow
    Countries {
        /// exports or imports
        #[arg(long, default_value = "exports")]
        flow: String,
        #[arg(long, default_value_t = DEFAULT_COUNTRY_LIMIT)]
        limit: usize,
    },
    /// Trade value per SITC section for a flow
    Commodities {
        /// exports or imports
        #[arg(long, default_value = "exports")]
        flow: String,
    },
    /// Backend forecasts for the coming quarters
    Forecast,
    /// Call any endpoint and print the JSON response
    ///
    /// Examples:
    ///   rwtrade fetch /exports/quarterly
    ///   rwtrade fetch /chat -X POST -d '{"message":"Top exports?"}'
    Fetch {
        /// Endpoint path relative to the API URL, or an absolute URL
        endpoint: String,
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Extra header, repeatable
        #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
        headers: Vec<String>,
        /// Request body; sent as JSON
        #[arg(short = 'd', long, conflicts_with = "form")]
        data: Option<String>,
        /// Multipart form field, repeatable
        #[arg(short = 'F', long = "form", value_name = "NAME=VALUE")]
        form: Vec<String>,
        /// Skip the response cache
        #[arg(long)]
        no_cache: bool,
    },
}

/// What to do once the client is built
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Overview { limit: usize },
    Quarterly,
    Countries { flow: TradeFlow, limit: usize },
    Commodities { flow: TradeFlow },
    Forecast,
    Fetch { endpoint: String, options: FetchOptions },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    /// Resolved API configuration
    pub api: ApiConfig,
    /// Action to run
    pub action: Action,
}

/// Parses a flow string argument into a TradeFlow
pub fn parse_flow_arg(s: &str) -> Result<TradeFlow, CliError> {
    TradeFlow::from_str(s).ok_or_else(|| CliError::InvalidFlow(s.to_string()))
}

/// Parses `NAME:VALUE` into a header pair; surrounding space is trimmed
pub fn parse_header_arg(s: &str) -> Result<(String, String), CliError> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidHeader(s.to_string())),
    }
}

/// Parses `NAME=VALUE` into a form field
pub fn parse_form_arg(s: &str) -> Result<(String, String), CliError> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(CliError::InvalidFormField(s.to_string())),
    }
}

/// Parses an HTTP method, case-insensitively
pub fn parse_method_arg(s: &str) -> Result<Method, CliError> {
    Method::from_bytes(s.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| CliError::InvalidMethod(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    /// * `env` - Configuration resolved from the environment
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with CLI overrides applied
    /// * `Err(CliError)` if any argument is invalid
    pub fn from_cli(cli: &Cli, env: ApiConfig) -> Result<Self, CliError> {
        let mut api = env;
        if let Some(ref url) = cli.api_url {
            api = api.with_base_url(url)?;
        }
        if let Some(ref raw) = cli.timeout_ms {
            api = api.with_timeout(parse_timeout_ms(raw)?);
        }

        let action = match cli.command.clone() {
            None => Action::Overview { limit: 5 },
            Some(Command::Overview { limit }) => Action::Overview { limit },
            Some(Command::Quarterly) => Action::Quarterly,
            Some(Command::Countries { flow, limit }) => Action::Countries {
                flow: parse_flow_arg(&flow)?,
                limit,
            },
            Some(Command::Commodities { flow }) => Action::Commodities {
                flow: parse_flow_arg(&flow)?,
            },
            Some(Command::Forecast) => Action::Forecast,
            Some(Command::Fetch {
                endpoint,
                method,
                headers,
                data,
                form,
                no_cache,
            }) => {
                let mut options = FetchOptions::get().method(parse_method_arg(&method)?);
                for header in &headers {
                    let (name, value) = parse_header_arg(header)?;
                    options = options.header(name, value);
                }
                if let Some(data) = data {
                    options = match serde_json::from_str(&data) {
                        Ok(json) => options.json(json),
                        Err(_) => options.raw(data),
                    };
                }
                if !form.is_empty() {
                    let fields = form
                        .iter()
                        .map(|f| parse_form_arg(f))
                        .collect::<Result<Vec<_>, _>>()?;
                    options = options.form(fields);
                }
                if no_cache {
                    options = options.no_cache();
                }
                Action::Fetch { endpoint, options }
            }
        };

        Ok(StartupConfig { api, action })
    }

    /// Timeout the client will apply to each call
    pub fn timeout(&self) -> Duration {
        self.api.timeout
    }
}

//! Trade statistics data models
//!
//! This module contains the shapes returned by the trade statistics API for
//! quarterly totals, country rankings, SITC commodity sections and forecasts,
//! plus small helpers for presenting them.

pub mod quarter;
pub mod trade;

pub use quarter::Quarter;
pub use trade::{Dashboard, TradeClient};

use serde::{Deserialize, Serialize};

/// Direction of a trade flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeFlow {
    Exports,
    Imports,
}

impl TradeFlow {
    /// Parses a flow name, accepting singular and plural forms
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exports" | "export" | "x" => Some(TradeFlow::Exports),
            "imports" | "import" | "m" => Some(TradeFlow::Imports),
            _ => None,
        }
    }

    /// Path segment used by the API
    pub fn as_str(self) -> &'static str {
        match self {
            TradeFlow::Exports => "exports",
            TradeFlow::Imports => "imports",
        }
    }

    /// Capitalized label for headings
    pub fn label(self) -> &'static str {
        match self {
            TradeFlow::Exports => "Exports",
            TradeFlow::Imports => "Imports",
        }
    }
}

/// Exports and imports for one quarter, in millions of USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyTrade {
    /// Quarter label, e.g. `2024Q4`
    pub period: String,
    pub exports: f64,
    pub imports: f64,
}

impl QuarterlyTrade {
    /// Exports minus imports
    pub fn balance(&self) -> f64 {
        self.exports - self.imports
    }

    pub fn quarter(&self) -> Option<Quarter> {
        Quarter::parse(&self.period)
    }
}

/// Chart-shaped quarterly series: parallel arrays indexed by period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    #[serde(default)]
    pub periods: Vec<String>,
    #[serde(default)]
    pub exports: Vec<f64>,
    #[serde(default)]
    pub imports: Vec<f64>,
}

impl TrendSeries {
    /// Builds the series from per-quarter records, keeping their order
    pub fn from_quarters(quarters: &[QuarterlyTrade]) -> Self {
        Self {
            periods: quarters.iter().map(|q| q.period.clone()).collect(),
            exports: quarters.iter().map(|q| q.exports).collect(),
            imports: quarters.iter().map(|q| q.imports).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Headline figures for the latest quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOverview {
    pub period: String,
    pub exports: f64,
    pub imports: f64,
    #[serde(default)]
    pub re_exports: Option<f64>,
    /// Quarter-on-quarter export growth in percent
    #[serde(default)]
    pub export_growth: Option<f64>,
    /// Quarter-on-quarter import growth in percent
    #[serde(default)]
    pub import_growth: Option<f64>,
}

impl TradeOverview {
    pub fn balance(&self) -> f64 {
        self.exports - self.imports
    }

    pub fn total_trade(&self) -> f64 {
        self.exports + self.imports
    }

    /// Fills growth figures the backend left out
    ///
    /// Growth is measured against the quarter before `period` in `quarters`,
    /// which must be in chronological order. Figures the backend did send are
    /// kept as they are.
    pub fn fill_growth(&mut self, quarters: &[QuarterlyTrade]) {
        let Some(index) = quarters.iter().position(|q| q.period == self.period) else {
            return;
        };
        let Some(previous) = index.checked_sub(1).map(|i| &quarters[i]) else {
            return;
        };

        if self.export_growth.is_none() {
            self.export_growth = Some(growth_rate(self.exports, previous.exports));
        }
        if self.import_growth.is_none() {
            self.import_growth = Some(growth_rate(self.imports, previous.imports));
        }
    }
}

/// A trading partner and its value for the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryValue {
    pub country: String,
    pub value: f64,
    /// Share of the flow's total, in percent
    #[serde(default)]
    pub share: Option<f64>,
}

/// Trade value of one SITC section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommoditySection {
    /// SITC section code, treated as an opaque label
    #[serde(alias = "sitc")]
    pub sitc_section: String,
    #[serde(default)]
    pub description: String,
    pub value: f64,
    #[serde(default)]
    pub share: Option<f64>,
}

/// Backend forecast for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricForecast {
    #[serde(default)]
    pub quarters: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
    /// Model the backend used, e.g. `ensemble`
    #[serde(default)]
    pub method: String,
    /// Confidence in percent
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub historical_avg: Option<f64>,
    #[serde(default)]
    pub last_value: Option<f64>,
}

impl MetricForecast {
    /// `(quarter, value)` pairs; unmatched trailing entries are dropped
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.quarters
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Forecasts for the headline metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeForecast {
    #[serde(default)]
    pub exports: Option<MetricForecast>,
    #[serde(default)]
    pub imports: Option<MetricForecast>,
    #[serde(default)]
    pub trade_balance: Option<MetricForecast>,
}

/// Formats a USD amount with a B/M/K suffix
///
/// Billions keep two decimals, everything smaller keeps one.
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{}${:.2}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.1}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.1}K", sign, abs / 1e3)
    } else {
        format!("{}${:.1}", sign, abs)
    }
}

/// Percentage change from `previous` to `current`; zero when `previous` is zero
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_flow_from_str_aliases() {
        assert_eq!(TradeFlow::from_str("exports"), Some(TradeFlow::Exports));
        assert_eq!(TradeFlow::from_str("Export"), Some(TradeFlow::Exports));
        assert_eq!(TradeFlow::from_str("imports"), Some(TradeFlow::Imports));
        assert_eq!(TradeFlow::from_str("m"), Some(TradeFlow::Imports));
        assert_eq!(TradeFlow::from_str("re-exports"), None);
    }

    #[test]
    fn test_quarterly_trade_parses_backend_shape() {
        let rows: Vec<QuarterlyTrade> =
            serde_json::from_str(r#"[{"period":"2024Q4","exports":677.45,"imports":1629.39}]"#)
                .expect("valid quarterly payload");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quarter(), Quarter::new(2024, 4));
        assert!((rows[0].balance() - (677.45 - 1629.39)).abs() < 1e-9);
    }

    #[test]
    fn test_trend_series_from_quarters() {
        let quarters = vec![
            QuarterlyTrade {
                period: "2024Q3".to_string(),
                exports: 600.0,
                imports: 1500.0,
            },
            QuarterlyTrade {
                period: "2024Q4".to_string(),
                exports: 677.45,
                imports: 1629.39,
            },
        ];

        let series = TrendSeries::from_quarters(&quarters);
        assert_eq!(series.periods, vec!["2024Q3", "2024Q4"]);
        assert_eq!(series.exports, vec![600.0, 677.45]);
        assert_eq!(series.imports, vec![1500.0, 1629.39]);
        assert!(TrendSeries::from_quarters(&[]).is_empty());
    }

    #[test]
    fn test_overview_optional_fields_default() {
        let overview: TradeOverview =
            serde_json::from_str(r#"{"period":"2025Q1","exports":500.0,"imports":1200.0}"#)
                .unwrap();
        assert!(overview.re_exports.is_none());
        assert_eq!(overview.total_trade(), 1700.0);
        assert_eq!(overview.balance(), -700.0);
    }

    fn quarter(period: &str, exports: f64, imports: f64) -> QuarterlyTrade {
        QuarterlyTrade {
            period: period.to_string(),
            exports,
            imports,
        }
    }

    fn overview(period: &str, exports: f64, imports: f64) -> TradeOverview {
        TradeOverview {
            period: period.to_string(),
            exports,
            imports,
            re_exports: None,
            export_growth: None,
            import_growth: None,
        }
    }

    #[test]
    fn test_fill_growth_uses_previous_quarter() {
        let quarters = vec![quarter("2024Q3", 500.0, 1600.0), quarter("2024Q4", 550.0, 1200.0)];
        let mut latest = overview("2024Q4", 550.0, 1200.0);

        latest.fill_growth(&quarters);

        assert!((latest.export_growth.unwrap() - 10.0).abs() < 1e-9);
        assert!((latest.import_growth.unwrap() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_growth_keeps_backend_figures() {
        let quarters = vec![quarter("2024Q3", 500.0, 1600.0), quarter("2024Q4", 550.0, 1200.0)];
        let mut latest = overview("2024Q4", 550.0, 1200.0);
        latest.export_growth = Some(3.5);

        latest.fill_growth(&quarters);

        assert_eq!(latest.export_growth, Some(3.5));
        assert!(latest.import_growth.is_some());
    }

    #[test]
    fn test_fill_growth_needs_a_previous_quarter() {
        let mut first = overview("2024Q3", 500.0, 1600.0);
        first.fill_growth(&[quarter("2024Q3", 500.0, 1600.0)]);
        assert!(first.export_growth.is_none());

        let mut unknown = overview("2025Q2", 500.0, 1600.0);
        unknown.fill_growth(&[quarter("2024Q3", 1.0, 1.0), quarter("2024Q4", 2.0, 2.0)]);
        assert!(unknown.import_growth.is_none());
    }

    #[test]
    fn test_commodity_accepts_short_sitc_key() {
        let section: CommoditySection =
            serde_json::from_str(r#"{"sitc":"0","description":"Food and live animals","value":120.5}"#)
                .unwrap();
        assert_eq!(section.sitc_section, "0");
        assert!(section.share.is_none());
    }

    #[test]
    fn test_metric_forecast_points_pair_up() {
        let forecast = MetricForecast {
            quarters: vec!["2025Q2".to_string(), "2025Q3".to_string()],
            values: vec![700.0, 710.0, 720.0],
            method: "ensemble".to_string(),
            confidence: 85.0,
            historical_avg: None,
            last_value: None,
        };
        let points: Vec<(&str, f64)> = forecast.points().collect();
        assert_eq!(points, vec![("2025Q2", 700.0), ("2025Q3", 710.0)]);
    }

    #[test]
    fn test_format_usd_thresholds() {
        assert_eq!(format_usd(2_346_000_000.0), "$2.35B");
        assert_eq!(format_usd(4_500_000.0), "$4.5M");
        assert_eq!(format_usd(6_700.0), "$6.7K");
        assert_eq!(format_usd(8.94), "$8.9");
        assert_eq!(format_usd(-1_500_000.0), "-$1.5M");
    }

    #[test]
    fn test_growth_rate() {
        assert!((growth_rate(110.0, 100.0) - 10.0).abs() < 1e-9);
        assert!((growth_rate(90.0, 100.0) + 10.0).abs() < 1e-9);
        assert_eq!(growth_rate(50.0, 0.0), 0.0);
    }
}

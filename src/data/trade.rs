//! Typed access to the trade statistics endpoints
//!
//! Each accessor names the UI region it loads and, for chart and table panels,
//! an empty fallback so a failed call leaves the panel empty instead of
//! failing the whole view.

use serde_json::json;

use super::{
    CommoditySection, CountryValue, QuarterlyTrade, TradeFlow, TradeForecast, TradeOverview,
    TrendSeries,
};
use crate::api::{ApiClient, FetchError, FetchOptions};

const OVERVIEW_ENDPOINT: &str = "/overview";
const QUARTERLY_ENDPOINT: &str = "/exports/quarterly";
const FORECAST_ENDPOINT: &str = "/predictions";

/// Number of partner countries shown when no limit is given
pub const DEFAULT_COUNTRY_LIMIT: usize = 10;

/// Everything the overview screen shows, loaded in one go
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Headline figures; `None` when the overview call failed
    pub overview: Option<TradeOverview>,
    /// Chart panel series
    pub trend: TrendSeries,
    /// Table panel rows
    pub quarterly: Vec<QuarterlyTrade>,
    pub top_exports: Vec<CountryValue>,
    pub top_imports: Vec<CountryValue>,
}

/// Client for the trade statistics endpoints
#[derive(Debug, Clone)]
pub struct TradeClient {
    api: ApiClient,
}

impl TradeClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying fetch wrapper
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Headline figures for the latest quarter
    ///
    /// Has no fallback: a screen without headline figures reports the error.
    pub async fn overview(&self) -> Result<TradeOverview, FetchError> {
        self.api
            .fetch_json(OVERVIEW_ENDPOINT, FetchOptions::get().target("overview"))
            .await
    }

    /// Quarterly exports and imports in chronological order
    pub async fn quarterly_trade(&self) -> Result<Vec<QuarterlyTrade>, FetchError> {
        let mut rows: Vec<QuarterlyTrade> = self
            .api
            .fetch_json(
                QUARTERLY_ENDPOINT,
                FetchOptions::get()
                    .target("quarterly-chart")
                    .fallback(json!([])),
            )
            .await?;
        sort_chronologically(&mut rows);
        Ok(rows)
    }

    /// Chart-ready quarterly series, built from [`Self::quarterly_trade`]
    pub async fn quarterly_series(&self) -> Result<TrendSeries, FetchError> {
        self.quarterly_trade()
            .await
            .map(|rows| TrendSeries::from_quarters(&rows))
    }

    /// Largest partners for a flow, biggest first, at most `limit` entries
    pub async fn top_countries(
        &self,
        flow: TradeFlow,
        limit: usize,
    ) -> Result<Vec<CountryValue>, FetchError> {
        let endpoint = format!("/{}/countries?limit={}", flow.as_str(), limit);
        let mut countries: Vec<CountryValue> = self
            .api
            .fetch_json(
                &endpoint,
                FetchOptions::get()
                    .target(format!("{}-countries", flow.as_str()))
                    .fallback(json!([])),
            )
            .await?;
        countries.sort_by(|a, b| b.value.total_cmp(&a.value));
        countries.truncate(limit);
        Ok(countries)
    }

    /// Trade value per SITC section for a flow, biggest first
    pub async fn commodities(&self, flow: TradeFlow) -> Result<Vec<CommoditySection>, FetchError> {
        let endpoint = format!("/{}/commodities", flow.as_str());
        let mut sections: Vec<CommoditySection> = self
            .api
            .fetch_json(
                &endpoint,
                FetchOptions::get()
                    .target(format!("{}-commodities", flow.as_str()))
                    .fallback(json!([])),
            )
            .await?;
        sections.sort_by(|a, b| b.value.total_cmp(&a.value));
        Ok(sections)
    }

    /// Backend forecasts for the coming quarters
    pub async fn forecast(&self) -> Result<TradeForecast, FetchError> {
        self.api
            .fetch_json(FORECAST_ENDPOINT, FetchOptions::get().target("forecast"))
            .await
    }

    /// Loads every overview panel concurrently
    ///
    /// Failed panels come back empty; their errors have already been logged
    /// and reported by the fetch wrapper. The trend chart and any growth
    /// figures missing from the overview are derived from the quarterly rows.
    pub async fn load_dashboard(&self, country_limit: usize) -> Dashboard {
        let (overview, quarterly, top_exports, top_imports) = futures::join!(
            self.overview(),
            self.quarterly_trade(),
            self.top_countries(TradeFlow::Exports, country_limit),
            self.top_countries(TradeFlow::Imports, country_limit),
        );

        let quarterly = quarterly.unwrap_or_default();
        let overview = overview.ok().map(|mut overview| {
            overview.fill_growth(&quarterly);
            overview
        });

        Dashboard {
            overview,
            trend: TrendSeries::from_quarters(&quarterly),
            quarterly,
            top_exports: top_exports.unwrap_or_default(),
            top_imports: top_imports.unwrap_or_default(),
        }
    }
}

/// Orders rows by quarter; rows with unreadable periods keep their order at the end
fn sort_chronologically(rows: &mut [QuarterlyTrade]) {
    rows.sort_by_key(|row| {
        let quarter = row.quarter();
        (quarter.is_none(), quarter)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::Value;
    use std::time::Duration;

    fn offline_client() -> TradeClient {
        let config = ApiConfig::default()
            .with_base_url("http://127.0.0.1:9/api")
            .unwrap()
            .with_timeout(Duration::from_millis(500));
        let api = ApiClient::new(config);
        api.connectivity().set_online(false);
        TradeClient::new(api)
    }

    fn seed(client: &TradeClient, endpoint: &str, value: Value) {
        let api = client.api();
        let key = FetchOptions::get().cache_key(&api.config().resolve(endpoint));
        api.cache().write(key, value);
    }

    fn row(period: &str) -> QuarterlyTrade {
        QuarterlyTrade {
            period: period.to_string(),
            exports: 1.0,
            imports: 2.0,
        }
    }

    #[test]
    fn test_sort_chronologically_puts_unknown_periods_last() {
        let mut rows = vec![row("2025Q1"), row("latest"), row("2023Q4"), row("2024Q2")];
        sort_chronologically(&mut rows);
        let periods: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2023Q4", "2024Q2", "2025Q1", "latest"]);
    }

    #[tokio::test]
    async fn test_quarterly_trade_is_sorted() {
        let client = offline_client();
        seed(
            &client,
            QUARTERLY_ENDPOINT,
            json!([
                {"period": "2024Q4", "exports": 677.45, "imports": 1629.39},
                {"period": "2024Q3", "exports": 650.0, "imports": 1500.0}
            ]),
        );

        let rows = client.quarterly_trade().await.unwrap();
        assert_eq!(rows[0].period, "2024Q3");
        assert_eq!(rows[1].period, "2024Q4");
    }

    #[tokio::test]
    async fn test_quarterly_series_follows_quarterly_rows() {
        let client = offline_client();
        seed(
            &client,
            QUARTERLY_ENDPOINT,
            json!([
                {"period": "2024Q4", "exports": 677.45, "imports": 1629.39},
                {"period": "2024Q3", "exports": 650.0, "imports": 1500.0}
            ]),
        );

        let rows = client.quarterly_trade().await.unwrap();
        let series = client.quarterly_series().await.unwrap();

        assert_eq!(series, TrendSeries::from_quarters(&rows));
        assert_eq!(series.periods, vec!["2024Q3", "2024Q4"]);
    }

    #[tokio::test]
    async fn test_load_dashboard_derives_trend_and_growth() {
        let client = offline_client();
        seed(
            &client,
            OVERVIEW_ENDPOINT,
            json!({"period": "2024Q4", "exports": 660.0, "imports": 1500.0}),
        );
        seed(
            &client,
            QUARTERLY_ENDPOINT,
            json!([
                {"period": "2024Q4", "exports": 660.0, "imports": 1500.0},
                {"period": "2024Q3", "exports": 600.0, "imports": 1500.0}
            ]),
        );

        let dashboard = client.load_dashboard(DEFAULT_COUNTRY_LIMIT).await;

        assert_eq!(dashboard.trend.exports, vec![600.0, 660.0]);
        let overview = dashboard.overview.expect("overview was cached");
        assert!((overview.export_growth.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(overview.import_growth, Some(0.0));
    }

    #[tokio::test]
    async fn test_panels_fall_back_to_empty_when_offline() {
        let client = offline_client();

        assert!(client.quarterly_trade().await.unwrap().is_empty());
        assert!(client.quarterly_series().await.unwrap().is_empty());
        assert!(client
            .top_countries(TradeFlow::Exports, 5)
            .await
            .unwrap()
            .is_empty());
        assert!(client
            .commodities(TradeFlow::Imports)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_overview_and_forecast_propagate_failures() {
        let client = offline_client();
        assert!(matches!(
            client.overview().await,
            Err(FetchError::Offline(_))
        ));
        assert!(matches!(
            client.forecast().await,
            Err(FetchError::Offline(_))
        ));
    }

    #[tokio::test]
    async fn test_top_countries_sorted_and_limited() {
        let client = offline_client();
        seed(
            &client,
            "/imports/countries?limit=2",
            json!([
                {"country": "Kenya", "value": 90.0},
                {"country": "China", "value": 310.5},
                {"country": "Tanzania", "value": 120.0}
            ]),
        );

        let countries = client
            .top_countries(TradeFlow::Imports, 2)
            .await
            .unwrap();
        let names: Vec<&str> = countries.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(names, vec!["China", "Tanzania"]);
    }

    #[tokio::test]
    async fn test_load_dashboard_keeps_loaded_panels() {
        let client = offline_client();
        seed(
            &client,
            OVERVIEW_ENDPOINT,
            json!({"period": "2024Q4", "exports": 677.45, "imports": 1629.39}),
        );

        let dashboard = client.load_dashboard(DEFAULT_COUNTRY_LIMIT).await;

        assert_eq!(
            dashboard.overview.map(|o| o.period),
            Some("2024Q4".to_string())
        );
        assert!(dashboard.trend.is_empty());
        assert!(dashboard.quarterly.is_empty());
        assert!(dashboard.top_exports.is_empty());
        assert!(dashboard.top_imports.is_empty());
    }
}

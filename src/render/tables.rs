//! Table builders for the trade panels

use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Row, Table},
};

use super::{render_lines, TrendSparkline};
use crate::data::{
    format_usd, CommoditySection, CountryValue, MetricForecast, QuarterlyTrade, TradeFlow,
    TradeForecast, TradeOverview, TrendSeries,
};

/// Rows taken by borders and the header
const TABLE_CHROME: u16 = 3;

/// Height needed to show `rows` data rows
pub fn table_height(rows: usize) -> u16 {
    u16::try_from(rows)
        .unwrap_or(u16::MAX)
        .saturating_add(TABLE_CHROME)
}

/// API values are in millions of USD
fn millions(value: f64) -> String {
    format_usd(value * 1e6)
}

fn header(cells: Vec<&'static str>) -> Row<'static> {
    Row::new(cells).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn balance_style(balance: f64) -> Style {
    if balance < 0.0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

/// Quarterly exports, imports and balance
pub fn quarterly_table(rows: &[QuarterlyTrade]) -> Table<'static> {
    let body: Vec<Row> = rows
        .iter()
        .map(|q| {
            Row::new(vec![
                Span::raw(q.period.clone()),
                Span::raw(millions(q.exports)),
                Span::raw(millions(q.imports)),
                Span::styled(millions(q.balance()), balance_style(q.balance())),
            ])
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header(vec!["Period", "Exports", "Imports", "Balance"]))
    .block(Block::bordered().title(" Quarterly trade "))
}

/// Ranked partner countries for one flow
pub fn country_table(flow: TradeFlow, countries: &[CountryValue]) -> Table<'static> {
    let body: Vec<Row> = countries
        .iter()
        .enumerate()
        .map(|(rank, c)| {
            Row::new(vec![
                (rank + 1).to_string(),
                c.country.clone(),
                millions(c.value),
                c.share.map(|s| format!("{:.1}%", s)).unwrap_or_default(),
            ])
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header(vec!["#", "Country", "Value", "Share"]))
    .block(Block::bordered().title(format!(" Top {} partners ", flow.as_str())))
}

/// Trade value per SITC section
pub fn commodity_table(flow: TradeFlow, sections: &[CommoditySection]) -> Table<'static> {
    let body: Vec<Row> = sections
        .iter()
        .map(|s| {
            Row::new(vec![
                s.sitc_section.clone(),
                s.description.clone(),
                millions(s.value),
                s.share.map(|v| format!("{:.1}%", v)).unwrap_or_default(),
            ])
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Length(6),
            Constraint::Min(24),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header(vec!["SITC", "Section", "Value", "Share"]))
    .block(Block::bordered().title(format!(" {} by commodity ", flow.label())))
}

/// Metric whose quarters label the forecast rows
fn lead_metric(forecast: &TradeForecast) -> Option<&MetricForecast> {
    forecast
        .exports
        .as_ref()
        .or(forecast.imports.as_ref())
        .or(forecast.trade_balance.as_ref())
}

/// Number of rows [`forecast_table`] draws
pub fn forecast_rows(forecast: &TradeForecast) -> usize {
    lead_metric(forecast).map_or(0, |m| m.points().count())
}

/// Forecast values per quarter, one column per metric
pub fn forecast_table(forecast: &TradeForecast) -> Table<'static> {
    let value_at = |metric: &Option<MetricForecast>, index: usize| -> String {
        metric
            .as_ref()
            .and_then(|m| m.values.get(index))
            .map(|v| millions(*v))
            .unwrap_or_else(|| "-".to_string())
    };

    let body: Vec<Row> = lead_metric(forecast)
        .into_iter()
        .flat_map(|lead| lead.points())
        .enumerate()
        .map(|(i, (quarter, _))| {
            Row::new(vec![
                quarter.to_string(),
                value_at(&forecast.exports, i),
                value_at(&forecast.imports, i),
                value_at(&forecast.trade_balance, i),
            ])
        })
        .collect();

    let title = match forecast.exports.as_ref() {
        Some(m) if !m.method.is_empty() => {
            format!(" Forecast ({}, {:.0}% confidence) ", m.method, m.confidence)
        }
        _ => " Forecast ".to_string(),
    };

    Table::new(
        body,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header(vec!["Quarter", "Exports", "Imports", "Balance"]))
    .block(Block::bordered().title(title))
}

/// Headline figures for the latest quarter
pub fn overview_paragraph(overview: &TradeOverview) -> Paragraph<'static> {
    let growth = |g: Option<f64>| match g {
        Some(g) => format!(" ({:+.1}%)", g),
        None => String::new(),
    };

    let mut lines = vec![
        Line::from(format!(
            "Exports  {}{}",
            millions(overview.exports),
            growth(overview.export_growth)
        )),
        Line::from(format!(
            "Imports  {}{}",
            millions(overview.imports),
            growth(overview.import_growth)
        )),
        Line::from(vec![
            Span::raw("Balance  "),
            Span::styled(millions(overview.balance()), balance_style(overview.balance())),
        ]),
        Line::from(format!("Total    {}", millions(overview.total_trade()))),
    ];
    if let Some(re_exports) = overview.re_exports {
        lines.push(Line::from(format!("Re-exp.  {}", millions(re_exports))));
    }

    Paragraph::new(lines).block(Block::bordered().title(format!(" {} overview ", overview.period)))
}

/// Labelled export and import sparklines on a shared scale
pub fn trend_lines(series: &TrendSeries, width: u16) -> Vec<String> {
    const LABEL: usize = 9;
    let spark_width = width.saturating_sub(LABEL as u16).max(1);
    let max = series
        .exports
        .iter()
        .chain(&series.imports)
        .copied()
        .fold(0.0_f64, f64::max);

    let render = |values: &[f64]| -> String {
        render_lines(
            TrendSparkline::new(values).max_value(max).mark_latest(),
            spark_width,
            1,
        )
        .concat()
    };

    vec![
        format!("{:<width$}{}", "Exports", render(&series.exports), width = LABEL),
        format!("{:<width$}{}", "Imports", render(&series.imports), width = LABEL),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter(period: &str, exports: f64, imports: f64) -> QuarterlyTrade {
        QuarterlyTrade {
            period: period.to_string(),
            exports,
            imports,
        }
    }

    #[test]
    fn test_table_height_adds_chrome() {
        assert_eq!(table_height(0), 3);
        assert_eq!(table_height(4), 7);
    }

    #[test]
    fn test_table_height_saturates_for_huge_tables() {
        assert_eq!(table_height(65_536), u16::MAX);
        assert_eq!(table_height(usize::MAX), u16::MAX);
        assert_eq!(table_height(u16::MAX as usize - 3), u16::MAX);
    }

    #[test]
    fn test_quarterly_table_renders_rows() {
        let rows = vec![quarter("2024Q4", 677.45, 1629.39)];
        let lines = render_lines(quarterly_table(&rows), 60, table_height(rows.len()));
        let text = lines.join("\n");

        assert!(text.contains("Quarterly trade"));
        assert!(text.contains("Period"));
        assert!(text.contains("2024Q4"));
        assert!(text.contains("$677."));
        assert!(text.contains("$1.63B"));
        assert!(text.contains("-$951.9M"));
    }

    #[test]
    fn test_country_table_ranks_from_one() {
        let countries = vec![
            CountryValue {
                country: "United Arab Emirates".to_string(),
                value: 310.2,
                share: Some(45.3),
            },
            CountryValue {
                country: "DR Congo".to_string(),
                value: 120.0,
                share: None,
            },
        ];
        let lines = render_lines(
            country_table(TradeFlow::Exports, &countries),
            60,
            table_height(countries.len()),
        );
        let text = lines.join("\n");

        assert!(text.contains("Top exports partners"));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("│1 ") && l.contains("United Arab Emirates")));
        assert!(text.contains("45.3%"));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("│2 ") && l.contains("DR Congo")));
    }

    #[test]
    fn test_forecast_table_fills_missing_metrics_with_dash() {
        let forecast = TradeForecast {
            exports: Some(MetricForecast {
                quarters: vec!["2025Q2".to_string()],
                values: vec![700.0],
                method: "ensemble".to_string(),
                confidence: 85.0,
                historical_avg: None,
                last_value: None,
            }),
            imports: None,
            trade_balance: None,
        };

        assert_eq!(forecast_rows(&forecast), 1);
        let text = render_lines(forecast_table(&forecast), 60, table_height(1)).join("\n");
        assert!(text.contains("ensemble, 85% confidence"));
        assert!(text.contains("2025Q2"));
        assert!(text.contains("$700.0M"));
        assert!(text.contains('-'));
    }

    #[test]
    fn test_forecast_table_skips_quarters_without_values() {
        let forecast = TradeForecast {
            exports: None,
            imports: Some(MetricForecast {
                quarters: vec!["2025Q2".to_string(), "2025Q3".to_string()],
                values: vec![1500.0],
                method: String::new(),
                confidence: 0.0,
                historical_avg: None,
                last_value: None,
            }),
            trade_balance: None,
        };

        assert_eq!(forecast_rows(&forecast), 1);
        let text = render_lines(forecast_table(&forecast), 60, table_height(2)).join("\n");
        assert!(text.contains("2025Q2"));
        assert!(text.contains("$1.50B"));
        assert!(!text.contains("2025Q3"));
        assert!(text.contains(" Forecast "));
    }

    #[test]
    fn test_overview_paragraph_shows_growth() {
        let overview = TradeOverview {
            period: "2025Q1".to_string(),
            exports: 500.0,
            imports: 1200.0,
            re_exports: None,
            export_growth: Some(4.25),
            import_growth: None,
        };
        let text = render_lines(overview_paragraph(&overview), 50, 6).join("\n");
        assert!(text.contains("2025Q1 overview"));
        assert!(text.contains("(+4.2%)") || text.contains("(+4.3%)"));
        assert!(text.contains("Total    $1.70B"));
    }

    #[test]
    fn test_trend_lines_share_a_scale() {
        let series = TrendSeries {
            periods: vec!["2024Q3".to_string(), "2024Q4".to_string()],
            exports: vec![0.0, 800.0],
            imports: vec![1600.0, 1600.0],
        };
        let lines = trend_lines(&series, 20);
        assert_eq!(lines[0], "Exports  ▁▅");
        assert_eq!(lines[1], "Imports  ██");
    }

    #[test]
    fn test_trend_lines_for_empty_series() {
        let lines = trend_lines(&TrendSeries::default(), 20);
        assert_eq!(lines, vec!["Exports  ".to_string(), "Imports  ".to_string()]);
    }
}

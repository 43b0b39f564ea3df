//! Terminal rendering of results, series and live updates

use colored::Colorize;
use imhotep_core::application::render::HIGH_RISK_HIGHLIGHTS;
use imhotep_core::application::{Completion, JobUpdate, ResultView};
use imhotep_core::domain::{ForecastItem, ForecastResult, ForecastSeries, Level};
use tabled::{Table, Tabled};

#[derive(Tabled)]
pub struct ForecastRow {
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Stock")]
    stock: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Impact")]
    impact: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

impl From<&ForecastItem> for ForecastRow {
    fn from(item: &ForecastItem) -> Self {
        Self {
            sku: item.sku.clone(),
            stock: format!("{:.0}", item.current_stock),
            predicted: format!("{:.1}", item.predicted_demand),
            risk: item.risk_level.to_string(),
            impact: currency(item.potential_revenue_impact),
            recommendation: item.recommendation.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct SeriesRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Forecast")]
    forecast: String,
    #[tabled(rename = "Range")]
    range: String,
}

fn currency(value: f64) -> String {
    format!("${:.2}", value)
}

fn risk_label(level: Level) -> colored::ColoredString {
    match level {
        Level::High => level.as_str().red().bold(),
        Level::Medium => level.as_str().yellow(),
        Level::Low => level.as_str().green(),
    }
}

/// Full dashboard for a completed result
pub fn print_result(result: &ForecastResult) {
    let view = ResultView::new(result);
    let summary = &result.summary;

    println!("{}", "Forecast Summary".cyan().bold());
    println!();
    println!("  {} {}", "Rows:".bold(), summary.total_rows);
    if !summary.date_range.is_empty() {
        println!("  {} {}", "Date range:".bold(), summary.date_range);
    }
    if !summary.columns_detected.is_empty() {
        println!("  {} {}", "Columns:".bold(), summary.columns_detected.join(", "));
    }
    println!("  {} {}", "Missing values:".bold(), summary.missing_values);
    println!("  {} {}", "Anomalies:".bold(), summary.anomalies_detected);
    if let Some(generated_at) = &result.generated_at {
        println!("  {} {}", "Generated:".bold(), generated_at);
    }
    println!();

    if result.forecasts.is_empty() {
        println!("{}", "No forecasts in this result".yellow());
        println!();
    } else {
        let counts = view
            .risk_counts()
            .iter()
            .map(|(level, count)| format!("{} {}", count, risk_label(*level)))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {} {}", "Risk:".bold(), counts);
        println!(
            "  {} {}",
            "Revenue impact:".bold(),
            currency(view.total_revenue_impact())
        );
        println!();

        let top = view.top_high_risk(HIGH_RISK_HIGHLIGHTS);
        if !top.is_empty() {
            println!("{}", "High-Risk Items".red().bold());
            for item in top {
                println!(
                    "  {} {} - {}",
                    "!".red().bold(),
                    item.sku.bold(),
                    item.recommendation
                );
            }
            println!();
        }

        println!("{}", "All Forecasts".cyan().bold());
        let rows: Vec<ForecastRow> = result.forecasts.iter().map(ForecastRow::from).collect();
        println!("{}", Table::new(rows));
        println!();
    }

    let insights = view.high_priority_insights();
    if !insights.is_empty() {
        println!("{}", "High-Priority Insights".magenta().bold());
        for insight in insights {
            let sku = insight
                .sku
                .as_deref()
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            println!("  • {}{}: {}", insight.kind.to_string().bold(), sku, insight.message);
            if let Some(impact) = &insight.impact {
                println!("    {}", impact.dimmed());
            }
        }
        println!();
    }

    let notes = view.methodology_notes();
    if !notes.is_empty() {
        println!("{}", "Methodology".cyan().bold());
        for note in notes {
            println!("  - {}", note);
        }
        println!();
    }
}

pub fn print_series(series: &ForecastSeries) {
    let metrics = &series.metrics;

    println!("{} {}", "Forecast".cyan().bold(), series.job_id.bold());
    println!();
    println!("  {} {}", "Status:".bold(), series.status);
    println!("  {} {}", "RMSE:".bold(), metrics.rmse_display());
    println!("  {} {}", "MAPE:".bold(), metrics.mape_display());
    println!(
        "  {} {}",
        "Forecast period:".bold(),
        metrics.forecast_period_display()
    );
    println!("  {} {}", "Confidence:".bold(), metrics.confidence_display());
    println!();

    if series.forecast.is_empty() {
        println!("{}", "No data points".yellow());
        return;
    }

    println!("{}", Table::new(series_rows(series)));
}

pub fn series_rows(series: &ForecastSeries) -> Vec<SeriesRow> {
    series
        .forecast
        .iter()
        .map(|point| SeriesRow {
            date: point.date.clone(),
            actual: point
                .actual
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string()),
            forecast: format!("{:.1}", point.forecast),
            range: match (point.lower_bound, point.upper_bound) {
                (Some(lo), Some(hi)) => format!("{:.1} - {:.1}", lo, hi),
                _ => "-".to_string(),
            },
        })
        .collect()
}

/// One line per live update while watching a job
pub fn print_update(update: &JobUpdate) {
    match update {
        JobUpdate::Status { status, state } => {
            println!("  {} {} (backend: {})", "•".bold(), state, status);
        }
        JobUpdate::Progress(progress) => {
            let pct = (progress.progress.clamp(0.0, 1.0) * 100.0).round();
            match &progress.message {
                Some(message) => println!("  {} {:>3}% {}", "•".bold(), pct, message),
                None => println!("  {} {:>3}%", "•".bold(), pct),
            }
        }
        JobUpdate::Update(data) => {
            if let Some(message) = &data.message {
                println!("  {} {}", "•".bold(), message);
            }
            if let Some(metrics) = &data.metrics {
                let line = metrics
                    .iter()
                    .map(|(name, value)| format!("{}={:.2}", name, value))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("    {}", line.dimmed());
            }
        }
        JobUpdate::Completed(Completion::Stream(data)) => {
            println!(
                "{}",
                format!("✓ Forecast {} completed", data.forecast_id).green().bold()
            );
        }
        JobUpdate::Completed(Completion::Result(_)) => {
            println!("{}", "✓ Forecast completed".green().bold());
        }
        JobUpdate::Failed { error } => {
            println!("{}", format!("✗ Forecast failed: {}", error).red().bold());
        }
        JobUpdate::Aborted(reason) => {
            println!("{}", format!("✗ Stopped watching: {}", reason).red());
        }
    }
}

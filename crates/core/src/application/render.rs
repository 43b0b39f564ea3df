// Result View - read-only projections of a forecast result

use crate::domain::{ForecastInsight, ForecastItem, ForecastResult, Level, Priority, RiskLevel};

/// Number of high-risk items the dashboard highlights
pub const HIGH_RISK_HIGHLIGHTS: usize = 3;

/// Borrowed view over a terminal result
///
/// Every filter preserves input order and allocates only the returned
/// vector of references.
#[derive(Debug, Clone, Copy)]
pub struct ResultView<'a> {
    result: &'a ForecastResult,
}

impl<'a> ResultView<'a> {
    pub fn new(result: &'a ForecastResult) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &'a ForecastResult {
        self.result
    }

    pub fn is_empty(&self) -> bool {
        self.result.forecasts.is_empty() && self.result.insights.is_empty()
    }

    pub fn forecasts_by_risk(&self, level: RiskLevel) -> Vec<&'a ForecastItem> {
        self.result
            .forecasts
            .iter()
            .filter(|item| item.risk_level == level)
            .collect()
    }

    pub fn high_risk(&self) -> Vec<&'a ForecastItem> {
        self.forecasts_by_risk(Level::High)
    }

    /// First `n` high-risk items in payload order
    pub fn top_high_risk(&self, n: usize) -> Vec<&'a ForecastItem> {
        self.result
            .forecasts
            .iter()
            .filter(|item| item.risk_level == Level::High)
            .take(n)
            .collect()
    }

    pub fn insights_by_priority(&self, priority: Priority) -> Vec<&'a ForecastInsight> {
        filter_by_priority(self.result.insights.iter(), priority)
    }

    pub fn high_priority_insights(&self) -> Vec<&'a ForecastInsight> {
        self.insights_by_priority(Level::High)
    }

    /// (level, count) for low, medium and high, in that order
    pub fn risk_counts(&self) -> [(RiskLevel, usize); 3] {
        Level::ALL.map(|level| {
            let count = self
                .result
                .forecasts
                .iter()
                .filter(|item| item.risk_level == level)
                .count();
            (level, count)
        })
    }

    pub fn total_revenue_impact(&self) -> f64 {
        self.result
            .forecasts
            .iter()
            .map(|item| item.potential_revenue_impact)
            .sum()
    }

    pub fn methodology_notes(&self) -> &'a [String] {
        &self.result.methodology_notes
    }
}

/// Priority filter over any sequence of insights
pub fn filter_by_priority<'a, I>(insights: I, priority: Priority) -> Vec<&'a ForecastInsight>
where
    I: IntoIterator<Item = &'a ForecastInsight>,
{
    insights
        .into_iter()
        .filter(|insight| insight.priority == priority)
        .collect()
}

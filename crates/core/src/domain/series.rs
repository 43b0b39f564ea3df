// Forecast Series (job detail view)

use super::job::JobStatus;
use serde::{Deserialize, Serialize};

/// One point on the forecast chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDataPoint {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    pub forecast: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl ForecastDataPoint {
    /// True when both bounds are present and bracket the forecast
    pub fn has_confidence_band(&self) -> bool {
        match (self.lower_bound, self.upper_bound) {
            (Some(lo), Some(hi)) => lo <= self.forecast && self.forecast <= hi,
            _ => false,
        }
    }
}

/// Model quality metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default)]
    pub mape: Option<f64>,
    /// Days forecasted
    #[serde(default)]
    pub forecast_period: Option<u32>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

const NOT_AVAILABLE: &str = "N/A";

impl ForecastMetrics {
    pub fn rmse_display(&self) -> String {
        self.rmse
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn mape_display(&self) -> String {
        self.mape
            .map(|v| format!("{:.2}%", v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn forecast_period_display(&self) -> String {
        self.forecast_period
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn confidence_display(&self) -> String {
        self.confidence
            .map(|v| format!("{}%", v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

/// Detailed forecast returned by `GET /forecasts/{job_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub job_id: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub metrics: ForecastMetrics,
    #[serde(default)]
    pub forecast: Vec<ForecastDataPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_display() {
        let metrics = ForecastMetrics {
            rmse: Some(12.3456),
            mape: Some(4.5),
            forecast_period: None,
            confidence: Some(92.0),
        };
        assert_eq!(metrics.rmse_display(), "12.35");
        assert_eq!(metrics.mape_display(), "4.50%");
        assert_eq!(metrics.forecast_period_display(), "N/A");
        assert_eq!(metrics.confidence_display(), "92%");
    }

    #[test]
    fn test_confidence_band() {
        let point = ForecastDataPoint {
            date: "2024-03-01".to_string(),
            actual: None,
            forecast: 10.0,
            lower_bound: Some(8.0),
            upper_bound: Some(12.0),
        };
        assert!(point.has_confidence_band());

        let open = ForecastDataPoint {
            upper_bound: None,
            ..point
        };
        assert!(!open.has_confidence_band());
    }
}

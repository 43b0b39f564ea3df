// Forecast Result Model

use super::error::{DomainError, Result};
use super::job::JobStatus;
use serde::{Deserialize, Serialize};

/// Three-step severity used for risk levels and insight priorities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

pub type RiskLevel = Level;
pub type Priority = Level;

impl Level {
    pub const ALL: [Level; 3] = [Level::Low, Level::Medium, Level::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Insight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Stockout,
    Overstock,
    Opportunity,
    Trend,
    Anomaly,
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InsightType::Stockout => "stockout",
            InsightType::Overstock => "overstock",
            InsightType::Opportunity => "opportunity",
            InsightType::Trend => "trend",
            InsightType::Anomaly => "anomaly",
        };
        write!(f, "{}", name)
    }
}

/// Aggregate counts over the input dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub columns_detected: Vec<String>,
    #[serde(default)]
    pub missing_values: u64,
    #[serde(default)]
    pub anomalies_detected: u64,
    #[serde(default)]
    pub date_range: String,
}

/// Per-SKU prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub sku: String,
    #[serde(default)]
    pub current_stock: f64,
    pub predicted_demand: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub potential_revenue_impact: f64,
}

/// Advisory message attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastInsight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub message: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Result payload returned by the backend, also used as the poll payload
///
/// Collections default to empty so in-progress payloads decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub summary: ForecastSummary,
    #[serde(default)]
    pub forecasts: Vec<ForecastItem>,
    #[serde(default)]
    pub insights: Vec<ForecastInsight>,
    #[serde(default)]
    pub methodology_notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ForecastResult {
    /// Reject predictions the renderer cannot show
    pub fn validate(&self) -> Result<()> {
        for item in &self.forecasts {
            if item.predicted_demand.is_nan() || item.predicted_demand < 0.0 {
                return Err(DomainError::ValidationError(format!(
                    "predicted_demand for {} must be non-negative, got {}",
                    item.sku, item.predicted_demand
                )));
            }
        }
        Ok(())
    }

    /// True when the payload carries any result content
    pub fn has_content(&self) -> bool {
        self.summary != ForecastSummary::default()
            || !self.forecasts.is_empty()
            || !self.insights.is_empty()
            || !self.methodology_notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_dashboard_payload() {
        let payload = json!({
            "summary": {
                "total_rows": 42,
                "columns_detected": ["date", "sku", "quantity", "revenue"],
                "missing_values": 3,
                "anomalies_detected": 2,
                "date_range": "2023-01-01 to 2023-12-31"
            },
            "forecasts": [{
                "sku": "SKU-123",
                "current_stock": 150,
                "predicted_demand": 230,
                "risk_level": "high",
                "recommendation": "Increase stock by 80 units",
                "potential_revenue_impact": 4500
            }],
            "insights": [{
                "type": "stockout",
                "message": "Potential stockout risk for SKU-123 in the next 30 days",
                "priority": "high",
                "sku": "SKU-123"
            }],
            "methodology_notes": ["Confidence level: 92%"]
        });

        let result: ForecastResult = serde_json::from_value(payload).unwrap();
        assert_eq!(result.summary.total_rows, 42);
        assert_eq!(result.forecasts[0].risk_level, Level::High);
        assert_eq!(result.insights[0].kind, InsightType::Stockout);
        assert!(result.status.is_unknown());
        assert!(result.has_content());
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_in_progress_payload_decodes_without_summary() {
        let result: ForecastResult =
            serde_json::from_value(json!({"job_id": "j-1", "status": "running"})).unwrap();
        assert_eq!(result.status, JobStatus::Running);
        assert!(result.forecasts.is_empty());
        assert!(!result.has_content());
    }

    #[test]
    fn test_negative_demand_rejected() {
        let result = ForecastResult {
            forecasts: vec![ForecastItem {
                sku: "SKU-9".to_string(),
                current_stock: 1.0,
                predicted_demand: -3.0,
                risk_level: Level::Low,
                recommendation: String::new(),
                potential_revenue_impact: 0.0,
            }],
            ..ForecastResult::default()
        };
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::High > Level::Medium);
        assert!(Level::Medium > Level::Low);
    }
}

use serde::{Deserialize, Serialize};

/// Dashboard time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Hours24,
    #[default]
    Days7,
    Days30,
    Days90,
}

impl TimeRange {
    /// Parse a dashboard `timeRange` value. Unknown values fall back to 7 days.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("24h") => Self::Hours24,
            Some("7d") => Self::Days7,
            Some("30d") => Self::Days30,
            Some("90d") => Self::Days90,
            _ => Self::Days7,
        }
    }

    /// The `hours=`/`days=` query parameter the detection backend expects.
    pub fn backend_param(&self) -> (&'static str, u32) {
        match self {
            Self::Hours24 => ("hours", 24),
            Self::Days7 => ("days", 7),
            Self::Days30 => ("days", 30),
            Self::Days90 => ("days", 90),
        }
    }

    /// Number of whole days covered, at least one.
    pub fn days(&self) -> u32 {
        match self.backend_param() {
            ("hours", hours) => hours.div_ceil(24).max(1),
            (_, days) => days,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hours24 => "24h",
            Self::Days7 => "7d",
            Self::Days30 => "30d",
            Self::Days90 => "90d",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyData {
    pub hour: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyData {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionData {
    pub ltr: u32,
    pub rtl: u32,
    pub ltr_percentage: f64,
    pub rtl_percentage: f64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total: u32,
    pub change: f64,
    pub hourly_data: Vec<HourlyData>,
    pub directions: DirectionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_detections: u32,
    pub avg_per_day: u32,
    pub peak_hour: String,
    pub peak_count: u32,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraAnalytics {
    pub id: String,
    pub name: String,
    pub count: u32,
    pub ltr: u32,
    pub rtl: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub cameras: Vec<CameraAnalytics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_backend_params() {
        assert_eq!(TimeRange::parse(Some("24h")).backend_param(), ("hours", 24));
        assert_eq!(TimeRange::parse(Some("7d")).backend_param(), ("days", 7));
        assert_eq!(TimeRange::parse(Some("30d")).backend_param(), ("days", 30));
        assert_eq!(TimeRange::parse(Some("90d")).backend_param(), ("days", 90));
    }

    #[test]
    fn test_unknown_time_range_defaults_to_week() {
        assert_eq!(TimeRange::parse(None), TimeRange::Days7);
        assert_eq!(TimeRange::parse(Some("1y")), TimeRange::Days7);
        assert_eq!(TimeRange::parse(Some("")), TimeRange::Days7);
    }

    #[test]
    fn test_days_covered() {
        assert_eq!(TimeRange::Hours24.days(), 1);
        assert_eq!(TimeRange::Days90.days(), 90);
    }

    #[test]
    fn test_metrics_wire_names() {
        let summary = SummaryResponse {
            total_detections: 1248,
            avg_per_day: 178,
            peak_hour: "12:00 - 13:00".to_string(),
            peak_count: 78,
            change: 8.3,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["totalDetections"], 1248);
        assert_eq!(value["avgPerDay"], 178);
        assert_eq!(value["peakHour"], "12:00 - 13:00");
    }
}

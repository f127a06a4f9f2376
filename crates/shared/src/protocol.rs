use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{FileKind, StockStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<String>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub source: Option<String>,
}

/// Per-file receipt inside an upload response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFileSummary {
    pub filename: String,
    pub rows: u64,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    pub uploaded_files: IndexMap<FileKind, UploadedFileSummary>,
}

/// One product's forecast as produced by the demand model. The backend
/// guarantees `daily_forecast` and `forecast_dates` line up; the client
/// re-checks rather than trusting it blindly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub daily_forecast: Vec<f64>,
    pub total_forecast: f64,
    pub forecast_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub avg_daily_demand: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub product_ids: Vec<String>,
    pub days_ahead: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub forecast_period: String,
    pub predictions: IndexMap<String, ForecastEntry>,
    #[serde(default)]
    pub total_products: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    /// `None` asks the backend to plan over every known product. An empty
    /// list is never sent; workflows require a non-empty selection instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
    pub planning_horizon: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostAnalysis {
    #[serde(default)]
    pub estimated_inventory_value: f64,
    #[serde(default)]
    pub weekly_holding_cost: f64,
    #[serde(default)]
    pub potential_spoilage_cost: f64,
    #[serde(default)]
    pub total_cost_risk: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPlanEntry {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub shelf_life_days: u32,
    pub predicted_demand: f64,
    pub recommended_stock: f64,
    #[serde(default)]
    pub daily_stock_plan: Vec<f64>,
    #[serde(default)]
    pub stock_status: StockStatus,
    pub wastage_risk: f64,
    pub service_level: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub cost_analysis: CostAnalysis,
}

/// Aggregate block the optimizer attaches to a stock plan. All fields are
/// defaulted because the backend emits `{}` when the plan is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanSummary {
    #[serde(default)]
    pub total_recommended_stock: f64,
    #[serde(default)]
    pub total_predicted_demand: f64,
    #[serde(default)]
    pub overall_service_level: f64,
    #[serde(default)]
    pub average_wastage_risk: f64,
    #[serde(default)]
    pub stock_status_distribution: IndexMap<String, u64>,
    #[serde(default)]
    pub optimization_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanResponse {
    #[serde(default)]
    pub message: String,
    pub stock_plan: Vec<StockPlanEntry>,
    #[serde(default)]
    pub summary: PlanSummary,
    #[serde(default)]
    pub planning_horizon: String,
    #[serde(default)]
    pub total_products: usize,
}

/// Dataset-quality statistics for the products file.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetStats {
    pub total_products: u64,
    pub columns: Vec<String>,
    #[serde(default)]
    pub data_types: IndexMap<String, String>,
    #[serde(default)]
    pub missing_values: IndexMap<String, u64>,
    #[serde(default)]
    pub category_distribution: IndexMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub message: String,
    pub statistics: DatasetStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfoResponse {
    #[serde(default)]
    pub message: String,
    pub product: IndexMap<String, serde_json::Value>,
}

/// Shape of every non-2xx body the backend produces.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

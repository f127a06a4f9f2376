//! One controller per user-facing flow. Each owns a single
//! [`RequestLifecycle`] plus whatever local input model the flow needs, and
//! pushes every remote outcome through that lifecycle; submit methods only
//! fail for local validation or an in-flight request.

use indexmap::IndexMap;
use shared::domain::{FileKind, StatusFilter};
use shared::error::{SubmitError, ValidationError};
use shared::protocol::{
    DatasetStats, ForecastEntry, PlanRequest, PlanSummary, PredictRequest, StockPlanEntry,
    UploadedFileSummary,
};
use tracing::{info, warn};

use crate::lifecycle::{RequestLifecycle, RequestState};
use crate::metrics::{
    category_distribution, data_completeness, dtype_distribution, forecast_summary,
    missing_value_ranking, stock_coverage_percent, validate_forecast_entry, CategorySlice,
    DataCompleteness, ForecastSummary, MissingColumn, TypeBucketShare,
};
use crate::selection::ProductSelectionModel;
use crate::staging::{FileStagingSet, StagedFile};
use crate::transport::PlanningApi;

pub const FORECAST_DAY_CHOICES: [u32; 4] = [3, 7, 14, 30];
pub const PLANNING_HORIZON_CHOICES: [u32; 5] = [3, 7, 14, 21, 30];

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub files: IndexMap<FileKind, UploadedFileSummary>,
    pub total_rows: u64,
}

/// Drives the data-upload flow over a [`FileStagingSet`]. Submittability is
/// a property of the staged files alone; a completed or failed upload leaves
/// it untouched.
#[derive(Default)]
pub struct UploadWorkflow {
    pub staging: FileStagingSet,
    lifecycle: RequestLifecycle<UploadOutcome>,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState<UploadOutcome> {
        self.lifecycle.state()
    }

    pub fn outcome(&self) -> Option<&UploadOutcome> {
        self.lifecycle.payload()
    }

    pub async fn submit(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        if !self.staging.is_submittable() {
            return Err(ValidationError::MissingRequiredFiles.into());
        }
        let submission = self.lifecycle.submit()?;
        let files: Vec<StagedFile> = self.staging.files().cloned().collect();
        info!(
            files = files.len(),
            bytes = self.staging.total_size_bytes(),
            "submitting staged files"
        );
        match api.upload(&files).await {
            Ok(response) => {
                let total_rows = response.uploaded_files.values().map(|file| file.rows).sum();
                self.lifecycle.succeed(
                    submission,
                    UploadOutcome {
                        files: response.uploaded_files,
                        total_rows,
                    },
                );
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                self.lifecycle.fail(submission, err);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    /// Per-product forecasts in response order.
    pub predictions: IndexMap<String, ForecastEntry>,
    pub forecast_period: String,
    pub summary: ForecastSummary,
}

/// Drives demand forecasting over a product selection.
pub struct ForecastWorkflow {
    pub selection: ProductSelectionModel,
    lifecycle: RequestLifecycle<ForecastOutcome>,
    days_ahead: u32,
}

impl Default for ForecastWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastWorkflow {
    pub fn new() -> Self {
        Self {
            selection: ProductSelectionModel::new(),
            lifecycle: RequestLifecycle::new(),
            days_ahead: 7,
        }
    }

    pub fn days_ahead(&self) -> u32 {
        self.days_ahead
    }

    pub fn set_days_ahead(&mut self, days: u32) -> Result<(), ValidationError> {
        if !FORECAST_DAY_CHOICES.contains(&days) {
            return Err(ValidationError::InvalidHorizon(days));
        }
        self.days_ahead = days;
        Ok(())
    }

    pub fn state(&self) -> &RequestState<ForecastOutcome> {
        self.lifecycle.state()
    }

    pub fn outcome(&self) -> Option<&ForecastOutcome> {
        self.lifecycle.payload()
    }

    pub async fn submit(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        if self.selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let submission = self.lifecycle.submit()?;
        let request = PredictRequest {
            product_ids: self.selection.selected(),
            days_ahead: self.days_ahead,
        };
        info!(
            products = request.product_ids.len(),
            days_ahead = request.days_ahead,
            "requesting demand forecast"
        );
        match api.predict(&request).await {
            Ok(response) => {
                let invalid = response
                    .predictions
                    .iter()
                    .find_map(|(id, entry)| validate_forecast_entry(id, entry).err());
                if let Some(err) = invalid {
                    warn!(error = %err, "rejecting inconsistent forecast response");
                    self.lifecycle.fail(submission, err);
                } else {
                    let summary = forecast_summary(&response.predictions, self.days_ahead);
                    self.lifecycle.succeed(
                        submission,
                        ForecastOutcome {
                            predictions: response.predictions,
                            forecast_period: response.forecast_period,
                            summary,
                        },
                    );
                }
            }
            Err(err) => {
                warn!(error = %err, "forecast request failed");
                self.lifecycle.fail(submission, err);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StockPlanOutcome {
    pub entries: Vec<StockPlanEntry>,
    pub summary: PlanSummary,
    pub planning_horizon: String,
}

impl StockPlanOutcome {
    pub fn stock_coverage_percent(&self) -> f64 {
        stock_coverage_percent(
            self.summary.total_recommended_stock,
            self.summary.total_predicted_demand,
        )
    }
}

/// Drives shelf-life-aware stock planning. The status filter is applied
/// client-side over the stored plan; changing it never re-fetches.
pub struct StockPlanWorkflow {
    pub selection: ProductSelectionModel,
    lifecycle: RequestLifecycle<StockPlanOutcome>,
    planning_horizon: u32,
    status_filter: StatusFilter,
}

impl Default for StockPlanWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl StockPlanWorkflow {
    pub fn new() -> Self {
        Self {
            selection: ProductSelectionModel::new(),
            lifecycle: RequestLifecycle::new(),
            planning_horizon: 7,
            status_filter: StatusFilter::All,
        }
    }

    pub fn planning_horizon(&self) -> u32 {
        self.planning_horizon
    }

    pub fn set_planning_horizon(&mut self, days: u32) -> Result<(), ValidationError> {
        if !PLANNING_HORIZON_CHOICES.contains(&days) {
            return Err(ValidationError::InvalidHorizon(days));
        }
        self.planning_horizon = days;
        Ok(())
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn state(&self) -> &RequestState<StockPlanOutcome> {
        self.lifecycle.state()
    }

    pub fn outcome(&self) -> Option<&StockPlanOutcome> {
        self.lifecycle.payload()
    }

    /// Stored entries that pass the current status filter.
    pub fn visible_entries(&self) -> Vec<&StockPlanEntry> {
        self.outcome()
            .map(|outcome| {
                outcome
                    .entries
                    .iter()
                    .filter(|entry| self.status_filter.matches(entry.stock_status))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Plans over the current selection; requires at least one product.
    pub async fn submit(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        if self.selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let product_ids = Some(self.selection.selected());
        self.submit_request(api, product_ids).await
    }

    /// Plans over every product the backend knows about (`product_ids`
    /// omitted from the request body).
    pub async fn submit_all_products(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        self.submit_request(api, None).await
    }

    async fn submit_request(
        &mut self,
        api: &dyn PlanningApi,
        product_ids: Option<Vec<String>>,
    ) -> Result<(), SubmitError> {
        let submission = self.lifecycle.submit()?;
        let request = PlanRequest {
            product_ids,
            planning_horizon: self.planning_horizon,
        };
        info!(
            products = request.product_ids.as_ref().map_or(0, Vec::len),
            all_products = request.product_ids.is_none(),
            planning_horizon = request.planning_horizon,
            "requesting stock plan"
        );
        match api.plan(&request).await {
            Ok(response) => {
                self.lifecycle.succeed(
                    submission,
                    StockPlanOutcome {
                        entries: response.stock_plan,
                        summary: response.summary,
                        planning_horizon: response.planning_horizon,
                    },
                );
            }
            Err(err) => {
                warn!(error = %err, "stock plan request failed");
                self.lifecycle.fail(submission, err);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticsOutcome {
    pub stats: DatasetStats,
    pub completeness: DataCompleteness,
    pub categories: Vec<CategorySlice>,
    pub missing_ranking: Vec<MissingColumn>,
    pub dtype_shares: Vec<TypeBucketShare>,
}

/// Drives the parameterless data-quality view. `activate` fetches on first
/// sight of the page (and again after a failure); a settled successful
/// payload is reused until an explicit `refresh`.
#[derive(Default)]
pub struct AnalyticsWorkflow {
    lifecycle: RequestLifecycle<AnalyticsOutcome>,
}

impl AnalyticsWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState<AnalyticsOutcome> {
        self.lifecycle.state()
    }

    pub fn outcome(&self) -> Option<&AnalyticsOutcome> {
        self.lifecycle.payload()
    }

    pub async fn activate(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        if matches!(
            self.lifecycle.state(),
            RequestState::Succeeded(_) | RequestState::Pending
        ) {
            return Ok(());
        }
        self.fetch(api).await
    }

    pub async fn refresh(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        self.fetch(api).await
    }

    async fn fetch(&mut self, api: &dyn PlanningApi) -> Result<(), SubmitError> {
        let submission = self.lifecycle.submit()?;
        match api.product_stats().await {
            Ok(response) => {
                let stats = response.statistics;
                let outcome = AnalyticsOutcome {
                    completeness: data_completeness(stats.total_products, &stats.missing_values),
                    categories: category_distribution(&stats.category_distribution),
                    missing_ranking: missing_value_ranking(
                        &stats.missing_values,
                        stats.total_products,
                    ),
                    dtype_shares: dtype_distribution(&stats.data_types),
                    stats,
                };
                self.lifecycle.succeed(submission, outcome);
            }
            Err(err) => {
                warn!(error = %err, "product stats request failed");
                self.lifecycle.fail(submission, err);
            }
        }
        Ok(())
    }
}

//! Client core for the demand-forecasting and stock-planning console: stages
//! and validates uploads, manages per-workflow request lifecycles against the
//! remote planning service, and derives every displayed statistic from raw
//! response payloads.

use std::sync::Arc;

use shared::error::RemoteError;
use tracing::info;

pub mod lifecycle;
pub mod metrics;
pub mod selection;
pub mod staging;
pub mod transport;
pub mod workflows;

pub use lifecycle::{RequestLifecycle, RequestState, Submission};
pub use selection::ProductSelectionModel;
pub use staging::{FileCandidate, FileStagingSet, StagedFile};
pub use transport::{HttpPlanningApi, PlanningApi};
pub use workflows::{
    AnalyticsWorkflow, ForecastWorkflow, StockPlanWorkflow, UploadWorkflow,
};

/// One user session: the shared product catalog plus the four independent
/// workflows. Each workflow owns its own lifecycle; the session only wires
/// them to the same API handle and catalog.
pub struct ConsoleSession {
    api: Arc<dyn PlanningApi>,
    catalog: Vec<String>,
    pub upload: UploadWorkflow,
    pub forecast: ForecastWorkflow,
    pub stock_plan: StockPlanWorkflow,
    pub analytics: AnalyticsWorkflow,
}

impl ConsoleSession {
    pub fn new(api: Arc<dyn PlanningApi>) -> Self {
        Self {
            api,
            catalog: Vec::new(),
            upload: UploadWorkflow::new(),
            forecast: ForecastWorkflow::new(),
            stock_plan: StockPlanWorkflow::new(),
            analytics: AnalyticsWorkflow::new(),
        }
    }

    pub fn api(&self) -> Arc<dyn PlanningApi> {
        Arc::clone(&self.api)
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Reloads the catalog and pushes it into both selection models. A 404
    /// means no product data has been uploaded yet and resolves to an empty
    /// catalog instead of an error. Existing selections are not pruned when
    /// the catalog changes; that is left to explicit user action.
    pub async fn refresh_catalog(&mut self) -> Result<usize, RemoteError> {
        let api = Arc::clone(&self.api);
        let products = match api.list_products().await {
            Ok(response) => response.products,
            Err(err) if err.is_not_found() => {
                info!("no product data uploaded yet; starting with an empty catalog");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        self.catalog = products.clone();
        self.forecast.selection.set_catalog(products.clone());
        self.stock_plan.selection.set_catalog(products);
        Ok(self.catalog.len())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

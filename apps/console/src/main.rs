use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::metrics::{clamp_percent, round1, RiskBucket};
use client_core::{ConsoleSession, FileCandidate, HttpPlanningApi, PlanningApi, RequestState};
use shared::domain::{FileKind, StatusFilter};

mod config;

#[derive(Parser, Debug)]
#[command(about = "Operations console for the demand forecasting and stock planning service")]
struct Cli {
    /// Base URL of the planning API; overrides console.toml and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the planning service is reachable.
    Health,
    /// List the product catalog.
    Products,
    /// Show data-quality analytics for the products dataset.
    Stats,
    /// Show the backend's record for one product.
    Info { product_id: String },
    /// Upload CSV datasets. Sales and products are required, weather is optional.
    Upload {
        #[arg(long)]
        sales: Option<PathBuf>,
        #[arg(long)]
        products: Option<PathBuf>,
        #[arg(long)]
        weather: Option<PathBuf>,
    },
    /// Forecast demand for selected products.
    Forecast {
        /// Comma-separated product ids.
        #[arg(long, value_delimiter = ',')]
        products: Vec<String>,
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Build a shelf-life-aware stock plan.
    Plan {
        /// Comma-separated product ids; omit to plan over all products.
        #[arg(long, value_delimiter = ',')]
        products: Vec<String>,
        #[arg(long, default_value_t = 7)]
        horizon: u32,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let mut settings = config::load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let api: Arc<dyn PlanningApi> = Arc::new(HttpPlanningApi::new(settings.api_base_url));
    let mut session = ConsoleSession::new(Arc::clone(&api));

    match cli.command {
        Command::Health => {
            let health = api.health().await?;
            println!("{}: {}", health.status, health.message);
        }
        Command::Products => {
            let count = session.refresh_catalog().await?;
            if count == 0 {
                println!("no products yet; upload a products.csv first");
            } else {
                for product in session.catalog() {
                    println!("{product}");
                }
                println!("{count} products");
            }
        }
        Command::Stats => run_stats(&mut session, api.as_ref()).await?,
        Command::Info { product_id } => {
            let info = api.product_info(&product_id).await?;
            for (field, value) in &info.product {
                println!("{field}: {value}");
            }
        }
        Command::Upload {
            sales,
            products,
            weather,
        } => run_upload(&mut session, api.as_ref(), sales, products, weather).await?,
        Command::Forecast { products, days } => {
            run_forecast(&mut session, api.as_ref(), products, days).await?
        }
        Command::Plan {
            products,
            horizon,
            status,
        } => run_plan(&mut session, api.as_ref(), products, horizon, status).await?,
    }

    Ok(())
}

/// Only CSV paths get a media type; anything else is left for the staging
/// validator to reject.
fn media_type_for(path: &Path) -> Option<&'static str> {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        .then_some("text/csv")
}

fn stage_from_disk(
    session: &mut ConsoleSession,
    kind: FileKind,
    path: &Path,
) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {} file {}", kind, path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{kind}.csv"));
    let candidate = FileCandidate::new(name, media_type_for(path), bytes);
    session
        .upload
        .staging
        .stage(kind, candidate)
        .with_context(|| format!("cannot stage {} file", kind))?;
    Ok(())
}

async fn run_upload(
    session: &mut ConsoleSession,
    api: &dyn PlanningApi,
    sales: Option<PathBuf>,
    products: Option<PathBuf>,
    weather: Option<PathBuf>,
) -> Result<()> {
    let slots = [
        (FileKind::Sales, sales),
        (FileKind::Products, products),
        (FileKind::Weather, weather),
    ];
    for (kind, path) in &slots {
        if let Some(path) = path {
            stage_from_disk(session, *kind, path)?;
        }
    }
    if !session.upload.staging.is_submittable() {
        bail!("both --sales and --products are required for an upload");
    }

    session.upload.submit(api).await?;
    match session.upload.state() {
        RequestState::Succeeded(outcome) => {
            for (kind, file) in &outcome.files {
                println!(
                    "{kind}: {} ({} rows, {} columns)",
                    file.filename,
                    file.rows,
                    file.columns.len()
                );
            }
            println!("total rows: {}", outcome.total_rows);
        }
        RequestState::Failed(message) => bail!("upload failed: {message}"),
        _ => {}
    }
    Ok(())
}

async fn run_forecast(
    session: &mut ConsoleSession,
    api: &dyn PlanningApi,
    products: Vec<String>,
    days: u32,
) -> Result<()> {
    session.refresh_catalog().await?;
    for product in &products {
        if session.catalog().iter().any(|known| known == product) {
            session.forecast.selection.toggle(product);
        } else {
            tracing::warn!(%product, "skipping product not present in the catalog");
        }
    }
    session.forecast.set_days_ahead(days)?;
    session.forecast.submit(api).await?;

    match session.forecast.state() {
        RequestState::Succeeded(outcome) => {
            for (product_id, entry) in &outcome.predictions {
                let name = entry.product_name.as_deref().unwrap_or(product_id);
                println!(
                    "{product_id} ({name}): total {:.2}, avg/day {:.2}",
                    entry.total_forecast, entry.avg_daily_demand
                );
            }
            println!("forecast period: {}", outcome.forecast_period);
            println!("total units: {:.2}", outcome.summary.total_units);
            println!(
                "average daily demand: {:.2}",
                outcome.summary.avg_daily_demand
            );
            if let Some(peak) = &outcome.summary.peak_product {
                println!(
                    "peak product: {} ({:.2} units)",
                    peak.product_id, peak.total_forecast
                );
            }
        }
        RequestState::Failed(message) => bail!("forecast failed: {message}"),
        _ => {}
    }
    Ok(())
}

async fn run_plan(
    session: &mut ConsoleSession,
    api: &dyn PlanningApi,
    products: Vec<String>,
    horizon: u32,
    status: StatusFilter,
) -> Result<()> {
    session.refresh_catalog().await?;
    session.stock_plan.set_planning_horizon(horizon)?;
    session.stock_plan.set_status_filter(status);

    if products.is_empty() {
        session.stock_plan.submit_all_products(api).await?;
    } else {
        for product in &products {
            session.stock_plan.selection.toggle(product);
        }
        session.stock_plan.submit(api).await?;
    }

    match session.stock_plan.state() {
        RequestState::Succeeded(outcome) => {
            for entry in session.stock_plan.visible_entries() {
                let name = entry.product_name.as_deref().unwrap_or(&entry.product_id);
                println!(
                    "{} ({name}): demand {:.2}, stock {:.2}, status {}, risk {} ({:.3}), service {:.1}%",
                    entry.product_id,
                    entry.predicted_demand,
                    entry.recommended_stock,
                    entry.stock_status,
                    RiskBucket::classify(entry.wastage_risk).label(),
                    entry.wastage_risk,
                    clamp_percent(entry.service_level),
                );
                for recommendation in &entry.recommendations {
                    println!("  - {recommendation}");
                }
            }
            println!("planning horizon: {}", outcome.planning_horizon);
            println!(
                "stock coverage: {:.1}%",
                round1(outcome.stock_coverage_percent())
            );
            println!(
                "overall service level: {:.1}%",
                clamp_percent(outcome.summary.overall_service_level)
            );
            println!(
                "average wastage risk: {} ({:.3})",
                RiskBucket::classify(outcome.summary.average_wastage_risk).label(),
                outcome.summary.average_wastage_risk
            );
        }
        RequestState::Failed(message) => bail!("stock plan failed: {message}"),
        _ => {}
    }
    Ok(())
}

async fn run_stats(session: &mut ConsoleSession, api: &dyn PlanningApi) -> Result<()> {
    session.analytics.activate(api).await?;
    match session.analytics.state() {
        RequestState::Succeeded(outcome) => {
            println!(
                "{} products, {} columns",
                outcome.stats.total_products,
                outcome.stats.columns.len()
            );
            println!(
                "data completeness: {:.1}%",
                clamp_percent(outcome.completeness.percent)
            );
            if !outcome.missing_ranking.is_empty() {
                println!("columns with missing values:");
                for column in &outcome.missing_ranking {
                    println!("  {}: {} ({:.1}%)", column.label, column.count, column.percent);
                }
            }
            if !outcome.dtype_shares.is_empty() {
                println!("column types:");
                for share in &outcome.dtype_shares {
                    println!(
                        "  {}: {} ({:.1}%)",
                        share.bucket.label(),
                        share.count,
                        share.percent
                    );
                }
            }
            if !outcome.categories.is_empty() {
                println!("categories:");
                for slice in &outcome.categories {
                    println!("  {}: {}", slice.label, slice.count);
                }
            }
        }
        RequestState::Failed(message) => bail!("analytics failed: {message}"),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_follows_the_extension() {
        assert_eq!(media_type_for(Path::new("sales.csv")), Some("text/csv"));
        assert_eq!(media_type_for(Path::new("SALES.CSV")), Some("text/csv"));
        assert_eq!(media_type_for(Path::new("sales.xlsx")), None);
        assert_eq!(media_type_for(Path::new("sales")), None);
    }

    #[test]
    fn non_csv_path_is_rejected_at_staging() {
        let path = std::env::temp_dir().join("console_stage_reject.txt");
        std::fs::write(&path, b"not,a,csv\n").expect("write fixture");

        let api: Arc<dyn PlanningApi> = Arc::new(HttpPlanningApi::new("http://127.0.0.1:9/api"));
        let mut session = ConsoleSession::new(api);
        let err = stage_from_disk(&mut session, FileKind::Sales, &path).unwrap_err();
        assert!(err.to_string().contains("cannot stage"), "got: {err}");
        assert_eq!(session.upload.staging.file_count(), 0);

        std::fs::remove_file(&path).ok();
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three dataset slots the backend accepts in one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Sales,
    Products,
    Weather,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Sales, FileKind::Products, FileKind::Weather];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Sales => "sales",
            FileKind::Products => "products",
            FileKind::Weather => "weather",
        }
    }

    /// Sales and products gate submission; weather only enriches the model.
    pub fn is_required(&self) -> bool {
        !matches!(self, FileKind::Weather)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inventory position classification returned by the planning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Optimal,
    Overstock,
    Understock,
    #[default]
    #[serde(other)]
    Unknown,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Optimal => "optimal",
            StockStatus::Overstock => "overstock",
            StockStatus::Understock => "understock",
            StockStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side filter over an already-fetched stock plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Optimal,
    Overstock,
    Understock,
}

impl StatusFilter {
    pub fn matches(&self, status: StockStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Optimal => status == StockStatus::Optimal,
            StatusFilter::Overstock => status == StockStatus::Overstock,
            StatusFilter::Understock => status == StockStatus::Understock,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "optimal" => Ok(StatusFilter::Optimal),
            "overstock" => Ok(StatusFilter::Overstock),
            "understock" => Ok(StatusFilter::Understock),
            other => Err(format!("unknown stock status filter: {other}")),
        }
    }
}

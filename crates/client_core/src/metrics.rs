//! Display-ready statistics derived from raw backend payloads. Everything in
//! this module is a pure function over already-fetched data; no network, no
//! shared state.

use indexmap::IndexMap;
use shared::protocol::ForecastEntry;
use thiserror::Error;

/// Fixed chart palette, cycled by iteration-order index.
pub const CATEGORY_PALETTE: [&str; 7] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#84cc16",
];

/// Absolute slack allowed between the server's `total_forecast` and the sum
/// of its daily values; covers the backend's two-decimal rounding.
const TOTAL_DRIFT_TOLERANCE: f64 = 0.5;

/// Rounds to one decimal place for display.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamp applied to every percentage before it reaches a progress indicator.
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastValidationError {
    #[error("forecast for {product_id} has {values} values but {dates} dates")]
    LengthMismatch {
        product_id: String,
        values: usize,
        dates: usize,
    },
    #[error("forecast total for {product_id} drifted: server reports {reported}, daily values sum to {computed}")]
    TotalDrift {
        product_id: String,
        reported: f64,
        computed: f64,
    },
}

/// Checks the per-entry invariants before an entry is accepted for display:
/// the daily series and its dates must line up, and the server-side total
/// must agree with the recomputed sum. The server's figure is trusted once
/// it passes; it is never replaced by the recomputed one.
pub fn validate_forecast_entry(
    product_id: &str,
    entry: &ForecastEntry,
) -> Result<(), ForecastValidationError> {
    if entry.daily_forecast.len() != entry.forecast_dates.len() {
        return Err(ForecastValidationError::LengthMismatch {
            product_id: product_id.to_owned(),
            values: entry.daily_forecast.len(),
            dates: entry.forecast_dates.len(),
        });
    }
    let computed: f64 = entry.daily_forecast.iter().sum();
    if (computed - entry.total_forecast).abs() > TOTAL_DRIFT_TOLERANCE {
        return Err(ForecastValidationError::TotalDrift {
            product_id: product_id.to_owned(),
            reported: entry.total_forecast,
            computed,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakProduct {
    pub product_id: String,
    pub product_name: Option<String>,
    pub total_forecast: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub total_units: f64,
    pub avg_daily_demand: f64,
    pub peak_product: Option<PeakProduct>,
}

/// Aggregates a prediction mapping: grand total, average daily demand over
/// `days_ahead * products`, and the peak product. Ties on the peak go to the
/// first entry in response order.
pub fn forecast_summary(
    predictions: &IndexMap<String, ForecastEntry>,
    days_ahead: u32,
) -> ForecastSummary {
    let total_units: f64 = predictions.values().map(|entry| entry.total_forecast).sum();
    let slots = days_ahead as f64 * predictions.len() as f64;
    let avg_daily_demand = if slots == 0.0 { 0.0 } else { total_units / slots };

    let mut peak: Option<PeakProduct> = None;
    for (product_id, entry) in predictions {
        let is_new_peak = peak
            .as_ref()
            .map_or(true, |current| entry.total_forecast > current.total_forecast);
        if is_new_peak {
            peak = Some(PeakProduct {
                product_id: product_id.clone(),
                product_name: entry.product_name.clone(),
                total_forecast: entry.total_forecast,
            });
        }
    }

    ForecastSummary {
        total_units,
        avg_daily_demand,
        peak_product: peak,
    }
}

/// Spoilage-likelihood bucket for a wastage-risk score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn classify(risk: f64) -> Self {
        if risk < 0.3 {
            RiskBucket::Low
        } else if risk < 0.6 {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::Low => "Low",
            RiskBucket::Medium => "Medium",
            RiskBucket::High => "High",
        }
    }
}

/// Recommended stock as a percentage of predicted demand. Zero demand means
/// zero coverage rather than a division by zero.
pub fn stock_coverage_percent(total_recommended: f64, total_predicted: f64) -> f64 {
    if total_predicted == 0.0 {
        0.0
    } else {
        total_recommended / total_predicted * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletenessColor {
    Green,
    Orange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataCompleteness {
    pub percent: f64,
    pub color: CompletenessColor,
}

/// Share of cells that are populated, floored at zero. Green only when the
/// dataset has no missing values at all.
pub fn data_completeness(total_products: u64, missing_values: &IndexMap<String, u64>) -> DataCompleteness {
    let missing_sum: u64 = missing_values.values().sum();
    let percent = if total_products == 0 {
        if missing_sum == 0 {
            100.0
        } else {
            0.0
        }
    } else {
        (100.0 - missing_sum as f64 / total_products as f64 * 100.0).max(0.0)
    };
    let color = if missing_sum == 0 {
        CompletenessColor::Green
    } else {
        CompletenessColor::Orange
    };
    DataCompleteness { percent, color }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    pub label: String,
    pub count: u64,
    pub color: &'static str,
}

/// Category counts with palette colors assigned by position. A blank
/// category label renders as "Unknown" but keeps its count.
pub fn category_distribution(raw: &IndexMap<String, u64>) -> Vec<CategorySlice> {
    raw.iter()
        .enumerate()
        .map(|(index, (category, count))| CategorySlice {
            label: if category.trim().is_empty() {
                "Unknown".to_owned()
            } else {
                category.clone()
            },
            count: *count,
            color: CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingColumn {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

/// Columns with at least one missing value, worst first, with display labels
/// and a one-decimal percentage of affected rows.
pub fn missing_value_ranking(
    missing_values: &IndexMap<String, u64>,
    total_products: u64,
) -> Vec<MissingColumn> {
    let mut ranked: Vec<MissingColumn> = missing_values
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(column, count)| MissingColumn {
            label: format_column_label(column),
            count: *count,
            percent: if total_products == 0 {
                0.0
            } else {
                round1(*count as f64 / total_products as f64 * 100.0)
            },
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// `shelf_life_days` -> `Shelf Life Days`.
pub fn format_column_label(column: &str) -> String {
    column
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Normalized column-type bucket for a raw dtype label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeBucket {
    Integer,
    Float,
    Text,
    Date,
    Other,
}

impl TypeBucket {
    const ORDERED: [TypeBucket; 5] = [
        TypeBucket::Integer,
        TypeBucket::Float,
        TypeBucket::Text,
        TypeBucket::Date,
        TypeBucket::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TypeBucket::Integer => "Integer",
            TypeBucket::Float => "Float",
            TypeBucket::Text => "Text",
            TypeBucket::Date => "Date",
            TypeBucket::Other => "Other",
        }
    }
}

/// First substring match wins, in this order: int, float, object, datetime.
pub fn bucket_for_dtype(raw: &str) -> TypeBucket {
    let lowered = raw.to_lowercase();
    if lowered.contains("int") {
        TypeBucket::Integer
    } else if lowered.contains("float") {
        TypeBucket::Float
    } else if lowered.contains("object") {
        TypeBucket::Text
    } else if lowered.contains("datetime") {
        TypeBucket::Date
    } else {
        TypeBucket::Other
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeBucketShare {
    pub bucket: TypeBucket,
    pub count: usize,
    pub percent: f64,
}

/// Bucket counts over all columns, as a share of the column total. Buckets
/// with no columns are omitted.
pub fn dtype_distribution(data_types: &IndexMap<String, String>) -> Vec<TypeBucketShare> {
    let total_columns = data_types.len();
    TypeBucket::ORDERED
        .iter()
        .filter_map(|bucket| {
            let count = data_types
                .values()
                .filter(|raw| bucket_for_dtype(raw) == *bucket)
                .count();
            (count > 0).then(|| TypeBucketShare {
                bucket: *bucket,
                count,
                percent: round1(count as f64 / total_columns as f64 * 100.0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(daily: &[f64], total: f64) -> ForecastEntry {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        ForecastEntry {
            product_name: None,
            daily_forecast: daily.to_vec(),
            total_forecast: total,
            forecast_dates: (0..daily.len() as u64)
                .map(|offset| start + chrono::Days::new(offset))
                .collect(),
            avg_daily_demand: 0.0,
        }
    }

    fn index_map<V: Clone>(pairs: &[(&str, V)]) -> IndexMap<String, V> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn risk_bucket_boundaries() {
        assert_eq!(RiskBucket::classify(0.29), RiskBucket::Low);
        assert_eq!(RiskBucket::classify(0.3), RiskBucket::Medium);
        assert_eq!(RiskBucket::classify(0.59), RiskBucket::Medium);
        assert_eq!(RiskBucket::classify(0.6), RiskBucket::High);
    }

    #[test]
    fn stock_coverage_zero_demand_is_zero() {
        assert_eq!(stock_coverage_percent(0.0, 0.0), 0.0);
        assert_eq!(stock_coverage_percent(12.0, 0.0), 0.0);
        assert_eq!(stock_coverage_percent(50.0, 100.0), 50.0);
    }

    #[test]
    fn completeness_score_and_color() {
        let clean = data_completeness(100, &index_map(&[("category", 0u64)]));
        assert_eq!(clean.percent, 100.0);
        assert_eq!(clean.color, CompletenessColor::Green);

        let patchy = data_completeness(100, &index_map(&[("category", 10u64)]));
        assert_eq!(patchy.percent, 90.0);
        assert_eq!(patchy.color, CompletenessColor::Orange);
    }

    #[test]
    fn completeness_floors_at_zero() {
        let hopeless = data_completeness(10, &index_map(&[("a", 90u64), ("b", 80u64)]));
        assert_eq!(hopeless.percent, 0.0);
    }

    #[test]
    fn forecast_summary_peak_prefers_first_on_tie() {
        let predictions = index_map(&[
            ("P1", entry(&[5.0, 5.0], 10.0)),
            ("P2", entry(&[6.0, 6.0], 12.0)),
            ("P3", entry(&[6.0, 6.0], 12.0)),
        ]);
        let summary = forecast_summary(&predictions, 2);
        assert_eq!(summary.total_units, 34.0);
        let peak = summary.peak_product.unwrap();
        assert_eq!(peak.product_id, "P2");
        assert_eq!(summary.avg_daily_demand, 34.0 / 6.0);
    }

    #[test]
    fn forecast_summary_of_nothing_is_zeroed() {
        let summary = forecast_summary(&IndexMap::new(), 7);
        assert_eq!(summary.total_units, 0.0);
        assert_eq!(summary.avg_daily_demand, 0.0);
        assert!(summary.peak_product.is_none());
    }

    #[test]
    fn length_mismatch_is_detected() {
        let mut bad = entry(&[1.0, 2.0, 3.0], 6.0);
        bad.forecast_dates.pop();
        let err = validate_forecast_entry("P9", &bad).unwrap_err();
        assert!(matches!(
            err,
            ForecastValidationError::LengthMismatch { values: 3, dates: 2, .. }
        ));
    }

    #[test]
    fn total_drift_is_detected_but_rounding_is_tolerated() {
        let rounded = entry(&[1.01, 2.02], 3.0);
        assert!(validate_forecast_entry("P1", &rounded).is_ok());

        let drifted = entry(&[1.0, 2.0], 30.0);
        assert!(matches!(
            validate_forecast_entry("P1", &drifted),
            Err(ForecastValidationError::TotalDrift { .. })
        ));
    }

    #[test]
    fn category_colors_cycle_through_the_palette() {
        let raw = index_map(&[
            ("Dairy", 10u64),
            ("Bakery", 8),
            ("Produce", 7),
            ("Frozen", 5),
            ("Beverages", 5),
            ("Snacks", 3),
            ("Deli", 2),
            ("Household", 1),
        ]);
        let slices = category_distribution(&raw);
        assert_eq!(slices.len(), 8);
        assert_eq!(slices[0].color, CATEGORY_PALETTE[0]);
        assert_eq!(slices[7].color, CATEGORY_PALETTE[0]);
    }

    #[test]
    fn blank_category_counts_as_unknown() {
        let raw = index_map(&[("", 4u64), ("Dairy", 2)]);
        let slices = category_distribution(&raw);
        assert_eq!(slices[0].label, "Unknown");
        assert_eq!(slices[0].count, 4);
    }

    #[test]
    fn missing_ranking_sorts_descending_and_formats_labels() {
        let missing = index_map(&[
            ("product_name", 2u64),
            ("shelf_life_days", 9),
            ("category", 0),
        ]);
        let ranked = missing_value_ranking(&missing, 40);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "Shelf Life Days");
        assert_eq!(ranked[0].percent, 22.5);
        assert_eq!(ranked[1].label, "Product Name");
        assert_eq!(ranked[1].percent, 5.0);
    }

    #[test]
    fn dtype_buckets_match_pandas_labels() {
        assert_eq!(bucket_for_dtype("int64"), TypeBucket::Integer);
        assert_eq!(bucket_for_dtype("uint32"), TypeBucket::Integer);
        assert_eq!(bucket_for_dtype("float64"), TypeBucket::Float);
        assert_eq!(bucket_for_dtype("object"), TypeBucket::Text);
        assert_eq!(bucket_for_dtype("datetime64[ns]"), TypeBucket::Date);
        assert_eq!(bucket_for_dtype("bool"), TypeBucket::Other);
    }

    #[test]
    fn dtype_distribution_shares() {
        let types = index_map(&[
            ("product_id", "object".to_owned()),
            ("product_name", "object".to_owned()),
            ("shelf_life_days", "int64".to_owned()),
            ("category", "object".to_owned()),
        ]);
        let shares = dtype_distribution(&types);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].bucket, TypeBucket::Integer);
        assert_eq!(shares[0].percent, 25.0);
        assert_eq!(shares[1].bucket, TypeBucket::Text);
        assert_eq!(shares[1].percent, 75.0);
    }

    #[test]
    fn clamp_and_round_helpers() {
        assert_eq!(clamp_percent(104.2), 100.0);
        assert_eq!(clamp_percent(-3.0), 0.0);
        assert_eq!(round1(22.449), 22.4);
        assert_eq!(round1(22.46), 22.5);
    }
}

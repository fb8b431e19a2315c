//! Feature Reconstruction Module
//!
//! Turns a sparse six-field request into the complete, ordered feature row
//! the classifier expects. The reconstruction is a pure function of the
//! request, the baseline row (reference-table column means), and the loaded
//! column schema:
//!
//! 1. start from a copy of the baseline
//! 2. zero every season / crop-type indicator column
//! 3. set the requested season and crop-type indicators, if those columns
//!    exist in the schema (unknown categories are a silent no-op)
//! 4. overwrite the four directly-supplied numeric columns
//! 5. recompute the interaction columns from the just-updated values
//! 6. project onto the ordered column list
//!
//! Every column not touched above keeps the reference-table mean, standing
//! in for "typical" conditions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CropStressError, Result};

/// Marker substring identifying season indicator columns.
pub const SEASON_MARKER: &str = "Season_";

/// Marker substring identifying crop-type indicator columns.
pub const CROP_TYPE_MARKER: &str = "Crop_Type_";

const TEMPERATURE_COLUMN: &str = "T2M";
const RAINFALL_COLUMN: &str = "Rainfall";
const SOIL_MOISTURE_COLUMN: &str = "Soil_Moisture";
const PEST_DAMAGE_COLUMN: &str = "Pest_Damage";

const TEMP_DEVIATION_COLUMN: &str = "temp_deviation_from_normal";
const PEST_HOTSPOTS_COLUMN: &str = "Pest_Hotspots";

const PEST_MOISTURE_INTERACTION: &str = "pest_damage_x_moisture";
const PEST_TEMP_DEVIATION_INTERACTION: &str = "pest_damage_x_temp_deviation";
const HOTSPOTS_RAINFALL_INTERACTION: &str = "pest_hotspots_x_rainfall";

/// A crop stress prediction request. Category fields are free-form strings;
/// values without a matching indicator column simply activate nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub season: String,
    pub crop_type: String,
    pub temperature: f64,
    pub rainfall: f64,
    pub soil_moisture: f64,
    pub pest_damage: f64,
}

/// Build the feature row for one request, in schema order.
///
/// Fails only if a schema column cannot be derived from the baseline plus
/// the request overrides.
pub fn build_feature_row(
    request: &PredictionRequest,
    baseline: &HashMap<String, f64>,
    feature_columns: &[String],
) -> Result<Vec<f32>> {
    let mut row = baseline.clone();

    // Clear whichever indicators were "typically on" in the training
    // average before conditionally setting the requested ones.
    for column in feature_columns {
        if column.contains(SEASON_MARKER) || column.contains(CROP_TYPE_MARKER) {
            row.insert(column.clone(), 0.0);
        }
    }

    let season_column = format!("{SEASON_MARKER}{}", request.season);
    if row.contains_key(&season_column) {
        row.insert(season_column, 1.0);
    }
    let crop_column = format!("{CROP_TYPE_MARKER}{}", request.crop_type);
    if row.contains_key(&crop_column) {
        row.insert(crop_column, 1.0);
    }

    row.insert(TEMPERATURE_COLUMN.to_string(), request.temperature);
    row.insert(RAINFALL_COLUMN.to_string(), request.rainfall);
    row.insert(SOIL_MOISTURE_COLUMN.to_string(), request.soil_moisture);
    row.insert(PEST_DAMAGE_COLUMN.to_string(), request.pest_damage);

    // Interaction columns are recomputed from the updated values rather
    // than left at their training means.
    let temp_deviation = row.get(TEMP_DEVIATION_COLUMN).copied().unwrap_or(0.0);
    let pest_hotspots = row.get(PEST_HOTSPOTS_COLUMN).copied().unwrap_or(0.0);
    row.insert(
        PEST_MOISTURE_INTERACTION.to_string(),
        request.pest_damage * request.soil_moisture,
    );
    row.insert(
        PEST_TEMP_DEVIATION_INTERACTION.to_string(),
        request.pest_damage * temp_deviation,
    );
    row.insert(
        HOTSPOTS_RAINFALL_INTERACTION.to_string(),
        pest_hotspots * request.rainfall,
    );

    feature_columns
        .iter()
        .map(|column| {
            row.get(column)
                .map(|&value| value as f32)
                .ok_or_else(|| CropStressError::MissingFeature(column.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<String> {
        [
            "T2M",
            "Rainfall",
            "Soil_Moisture",
            "Pest_Damage",
            "Pest_Hotspots",
            "temp_deviation_from_normal",
            "pest_damage_x_moisture",
            "pest_damage_x_temp_deviation",
            "pest_hotspots_x_rainfall",
            "NDVI",
            "Season_Kharif",
            "Season_Rabi",
            "Crop_Type_Rice",
            "Crop_Type_Wheat",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn baseline() -> HashMap<String, f64> {
        let mut means = HashMap::new();
        means.insert("T2M".to_string(), 27.0);
        means.insert("Rainfall".to_string(), 5.5);
        means.insert("Soil_Moisture".to_string(), 22.0);
        means.insert("Pest_Damage".to_string(), 0.3);
        means.insert("Pest_Hotspots".to_string(), 2.0);
        means.insert("temp_deviation_from_normal".to_string(), 1.5);
        means.insert("pest_damage_x_moisture".to_string(), 6.6);
        means.insert("pest_damage_x_temp_deviation".to_string(), 0.45);
        means.insert("pest_hotspots_x_rainfall".to_string(), 11.0);
        means.insert("NDVI".to_string(), 0.62);
        // Training averages: indicators are fractions, not 0/1.
        means.insert("Season_Kharif".to_string(), 0.6);
        means.insert("Season_Rabi".to_string(), 0.4);
        means.insert("Crop_Type_Rice".to_string(), 0.7);
        means.insert("Crop_Type_Wheat".to_string(), 0.3);
        means
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            season: "Kharif".to_string(),
            crop_type: "Rice".to_string(),
            temperature: 32.5,
            rainfall: 10.0,
            soil_moisture: 15.0,
            pest_damage: 0.8,
        }
    }

    fn value(row: &[f32], columns: &[String], name: &str) -> f32 {
        let index = columns.iter().position(|c| c == name).unwrap();
        row[index]
    }

    #[test]
    fn test_known_categories_set_exactly_one_indicator_per_group() {
        let columns = schema();
        let row = build_feature_row(&request(), &baseline(), &columns).unwrap();

        assert_eq!(value(&row, &columns, "Season_Kharif"), 1.0);
        assert_eq!(value(&row, &columns, "Season_Rabi"), 0.0);
        assert_eq!(value(&row, &columns, "Crop_Type_Rice"), 1.0);
        assert_eq!(value(&row, &columns, "Crop_Type_Wheat"), 0.0);
    }

    #[test]
    fn test_unknown_category_clears_the_whole_group() {
        let columns = schema();
        let mut req = request();
        req.season = "Monsoon".to_string();
        let row = build_feature_row(&req, &baseline(), &columns).unwrap();

        // Even the indicator the baseline had at 0.6 must be reset.
        assert_eq!(value(&row, &columns, "Season_Kharif"), 0.0);
        assert_eq!(value(&row, &columns, "Season_Rabi"), 0.0);
        assert_eq!(value(&row, &columns, "Crop_Type_Rice"), 1.0);
    }

    #[test]
    fn test_direct_and_interaction_overrides() {
        let columns = schema();
        let row = build_feature_row(&request(), &baseline(), &columns).unwrap();

        assert_eq!(value(&row, &columns, "T2M"), 32.5);
        assert_eq!(value(&row, &columns, "Rainfall"), 10.0);
        assert_eq!(value(&row, &columns, "Soil_Moisture"), 15.0);
        assert_eq!(value(&row, &columns, "Pest_Damage"), 0.8);
        assert!((value(&row, &columns, "pest_damage_x_moisture") - 12.0).abs() < 1e-5);
        assert!((value(&row, &columns, "pest_damage_x_temp_deviation") - 1.2).abs() < 1e-5);
        assert!((value(&row, &columns, "pest_hotspots_x_rainfall") - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_untouched_columns_keep_the_baseline_mean() {
        let columns = schema();
        let row = build_feature_row(&request(), &baseline(), &columns).unwrap();
        assert!((value(&row, &columns, "NDVI") - 0.62).abs() < 1e-6);
    }

    #[test]
    fn test_interaction_inputs_default_to_zero_when_absent() {
        let mut means = baseline();
        means.remove("temp_deviation_from_normal");
        means.remove("Pest_Hotspots");
        let columns: Vec<String> = schema()
            .into_iter()
            .filter(|c| c != "temp_deviation_from_normal" && c != "Pest_Hotspots")
            .collect();

        let row = build_feature_row(&request(), &means, &columns).unwrap();
        assert_eq!(value(&row, &columns, "pest_damage_x_temp_deviation"), 0.0);
        assert_eq!(value(&row, &columns, "pest_hotspots_x_rainfall"), 0.0);
    }

    #[test]
    fn test_missing_schema_column_is_an_error() {
        let mut columns = schema();
        columns.push("Humidity".to_string());
        let err = build_feature_row(&request(), &baseline(), &columns).unwrap_err();
        match err {
            CropStressError::MissingFeature(name) => assert_eq!(name, "Humidity"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_indicator_column_missing_from_baseline_is_backfilled() {
        // The reset walks the schema, so an indicator column absent from
        // the baseline still ends up in the row, at 0.
        let mut means = baseline();
        means.remove("Season_Rabi");
        let columns = schema();
        let row = build_feature_row(&request(), &means, &columns).unwrap();
        assert_eq!(value(&row, &columns, "Season_Rabi"), 0.0);
    }

    #[test]
    fn test_baseline_is_not_mutated() {
        let means = baseline();
        let before = means.clone();
        let columns = schema();
        build_feature_row(&request(), &means, &columns).unwrap();
        assert_eq!(means, before);
    }

    #[test]
    fn test_row_matches_schema_order_and_length() {
        let columns = schema();
        let row = build_feature_row(&request(), &baseline(), &columns).unwrap();
        assert_eq!(row.len(), columns.len());
        assert_eq!(row[0], 32.5);
    }

    #[test]
    fn test_reconstruction_is_deterministic() {
        let columns = schema();
        let means = baseline();
        let first = build_feature_row(&request(), &means, &columns).unwrap();
        let second = build_feature_row(&request(), &means, &columns).unwrap();
        assert_eq!(first, second);
    }
}

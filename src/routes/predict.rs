//! Prediction endpoint
//!
//! Orchestrates the request pipeline: ready-check on the model store,
//! feature reconstruction, inference, and response shaping. Every failure
//! anywhere in the path — malformed body, unknown schema column, inference
//! error — becomes a `success: false` body with HTTP 200; the process never
//! crashes on a bad request.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::CropStressError;
use crate::features::{build_feature_row, PredictionRequest};
use crate::model::store::ModelStore;
use crate::state::SharedState;
use crate::{NUM_CLASSES, STRESS_CLASSES};

/// Per-class probability breakdown, in percent, each value rounded to two
/// decimals independently. The rounded values may not sum to exactly 100.
#[derive(Debug, Clone, Serialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Healthy")]
    pub healthy: f64,
    #[serde(rename = "Moderate Stress")]
    pub moderate_stress: f64,
    #[serde(rename = "Severe Stress")]
    pub severe_stress: f64,
}

/// Response body for the prediction endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<ClassProbabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    fn success(prediction: String, confidence: f64, probabilities: ClassProbabilities) -> Self {
        Self {
            success: true,
            prediction: Some(prediction),
            confidence: Some(confidence),
            probabilities: Some(probabilities),
            error: None,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            prediction: None,
            confidence: None,
            probabilities: None,
            error: Some(message),
        }
    }
}

/// POST /api/predict - Crop stress prediction endpoint
///
/// The body is extracted fallibly so that malformed JSON is reported as a
/// normal failure body instead of a 4xx status.
pub async fn predict(
    State(state): State<SharedState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Json<PredictResponse> {
    match payload {
        Ok(Json(request)) => Json(run_prediction(&state.store, &request)),
        Err(rejection) => Json(PredictResponse::failure(rejection.body_text())),
    }
}

/// Run the full prediction pipeline for one request.
///
/// Pure function of the immutable store and the request, so identical
/// requests always produce identical responses.
pub fn run_prediction(store: &ModelStore, request: &PredictionRequest) -> PredictResponse {
    match predict_inner(store, request) {
        Ok(response) => response,
        Err(e) => PredictResponse::failure(e.to_string()),
    }
}

fn predict_inner(
    store: &ModelStore,
    request: &PredictionRequest,
) -> Result<PredictResponse, CropStressError> {
    let (classifier, baseline, feature_columns) =
        match (store.classifier(), store.baseline(), store.feature_columns()) {
            (Some(classifier), Some(baseline), Some(columns)) => {
                (classifier, baseline, columns)
            }
            _ => return Err(CropStressError::ModelNotLoaded),
        };

    let row = build_feature_row(request, baseline, feature_columns)?;

    let class_index = classifier.predict(&row)?;
    let label = STRESS_CLASSES
        .get(class_index)
        .ok_or(CropStressError::UnknownClass(class_index))?;

    let probabilities = classifier.predict_proba(&row)?;
    if probabilities.len() < NUM_CLASSES {
        return Err(CropStressError::UnsupportedModel(format!(
            "model produced {} probabilities, expected {NUM_CLASSES}",
            probabilities.len()
        )));
    }

    let confidence = probabilities
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
        * 100.0;

    Ok(PredictResponse::success(
        label.to_string(),
        round2(confidence),
        ClassProbabilities {
            healthy: round2(probabilities[0] * 100.0),
            moderate_stress: round2(probabilities[1] * 100.0),
            severe_stress: round2(probabilities[2] * 100.0),
        },
    ))
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

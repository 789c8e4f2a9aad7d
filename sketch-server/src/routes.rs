//! API route handlers.

use std::time::Instant;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sketch_core::{
    ComponentId, Conversion, ConversionReport, DesignShape, PresetText, RawShape, SketchError,
    StyleMode, UIComponent,
};
use thiserror::Error;

use crate::metrics;
use crate::validation::{self, ValidationError};
use crate::AppState;

/// One detected shape as posted by the detector.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShapeInput {
    /// Position and size.
    #[serde(flatten)]
    pub shape: RawShape,
    /// Text the detector already read inside the shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Body of `POST /api/convert`.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Detected shapes in detection order.
    pub shapes: Vec<ShapeInput>,
    /// Output style; the server default when absent.
    #[serde(default)]
    pub style_mode: Option<StyleMode>,
}

/// Body of `POST /api/design`.
#[derive(Debug, Deserialize)]
pub struct DesignRequest {
    /// Design-tool shapes.
    pub shapes: Vec<DesignShape>,
    /// Output style; inline when absent.
    #[serde(default)]
    pub style_mode: Option<StyleMode>,
}

/// Response of both conversion endpoints.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    /// HTML fragment.
    pub html: String,
    /// Stylesheet for the fragment.
    pub css: String,
    /// Surviving components, largest first.
    pub components: Vec<UIComponent>,
    /// Counts and diagnostics.
    pub report: ConversionReport,
}

impl ConvertResponse {
    fn from_conversion(conversion: Conversion) -> Self {
        Self {
            html: conversion.markup.html,
            css: conversion.markup.css,
            components: conversion.components,
            report: conversion.report,
        }
    }
}

/// Errors returned by the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The payload broke a request limit.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The pipeline failed the request.
    #[error(transparent)]
    Pipeline(#[from] SketchError),
    /// The conversion task did not complete.
    #[error("conversion task failed: {0}")]
    Task(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(SketchError::Recognition(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(SketchError::MalformedShape { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Pipeline(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Split detector shapes into geometry and preset text keyed by the id the
/// pipeline will assign.
fn split_shapes(shapes: Vec<ShapeInput>) -> (Vec<RawShape>, PresetText) {
    let mut preset = PresetText::new();
    let raw = shapes
        .into_iter()
        .enumerate()
        .map(|(index, shape)| {
            if let Some(text) = shape.text {
                preset.insert(ComponentId::from_index(index), text);
            }
            shape.shape
        })
        .collect();
    (raw, preset)
}

fn record_outcome(endpoint: &'static str, report: &ConversionReport, started: Instant) {
    metrics::record_conversion(endpoint, report);
    metrics::record_conversion_duration(endpoint, started.elapsed().as_secs_f64());
}

/// Convert detected shapes.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:9474/api/convert \
///   -H "Content-Type: application/json" \
///   -d '{"shapes": [{"x": 10, "y": 10, "w": 120, "h": 50, "text": "save"}]}'
/// ```
///
/// # Errors
///
/// 422 when a request limit is exceeded, 502 when text recognition fails.
#[tracing::instrument(name = "convert", skip(state, request), fields(shapes = request.shapes.len()))]
pub async fn convert_handler(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let started = Instant::now();
    if let Err(err) = validation::validate_convert(&request.shapes) {
        metrics::record_validation_failure(err.kind());
        return Err(err.into());
    }

    let mode = request.style_mode.unwrap_or(state.style_mode);
    let (raw, preset) = split_shapes(request.shapes);
    let pipeline = state.pipeline.clone();

    let conversion = tokio::task::spawn_blocking(move || {
        pipeline.convert_shapes(&raw, &preset, mode)
    })
    .await
    .map_err(|e| ApiError::Task(e.to_string()))??;

    record_outcome("convert", &conversion.report, started);
    Ok(Json(ConvertResponse::from_conversion(conversion)))
}

/// Convert design-tool shapes, bypassing the classifier.
///
/// # Errors
///
/// 422 when a request limit is exceeded.
#[tracing::instrument(name = "design", skip(state, request), fields(shapes = request.shapes.len()))]
pub async fn design_handler(
    State(state): State<AppState>,
    Json(request): Json<DesignRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let started = Instant::now();
    if let Err(err) = validation::validate_design(&request.shapes) {
        metrics::record_validation_failure(err.kind());
        return Err(err.into());
    }

    let mode = request.style_mode.unwrap_or(StyleMode::Inline);
    let shapes = request.shapes;
    let pipeline = state.pipeline.clone();

    let conversion = tokio::task::spawn_blocking(move || pipeline.convert_design(&shapes, mode))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;

    record_outcome("design", &conversion.report, started);
    Ok(Json(ConvertResponse::from_conversion(conversion)))
}

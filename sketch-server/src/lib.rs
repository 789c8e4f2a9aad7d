//! # Saorsa Sketch Server Library
//!
//! Shared types and the HTTP router for the sketch server.
//! This library is used by both the binary and integration tests.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sketch-server -- --port 9474 --config sketch.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use sketch_core::{PipelineConfig, SketchPipeline, SketchResult, StyleMode};

pub mod health;
pub mod metrics;
pub mod routes;
pub mod validation;

/// Default port for the sketch server.
pub const DEFAULT_PORT: u16 = 9474;

/// Command-line arguments for the sketch server.
#[derive(Debug, Clone, Parser)]
#[command(name = "saorsa-sketch")]
#[command(about = "Converts UI sketch shapes into HTML/CSS")]
#[command(version)]
pub struct CliArgs {
    /// Port to listen on (localhost only)
    #[arg(long, env = "SKETCH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Pipeline configuration file (JSON)
    #[arg(long, env = "SKETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default output style for /api/convert: classes or inline
    #[arg(long, env = "SKETCH_STYLE_MODE", default_value = "classes")]
    pub style_mode: StyleMode,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Pipeline thresholds.
    pub pipeline: PipelineConfig,
    /// Default style mode for detector requests.
    pub style_mode: StyleMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            pipeline: PipelineConfig::default(),
            style_mode: StyleMode::Classes,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = sketch_core::SketchError;

    fn try_from(args: CliArgs) -> SketchResult<Self> {
        let pipeline = match &args.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        Ok(Self {
            port: args.port,
            pipeline,
            style_mode: args.style_mode,
        })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Conversion pipeline, shared by all requests.
    pub pipeline: Arc<SketchPipeline>,
    /// Style mode used when a detector request names none.
    pub style_mode: StyleMode,
}

impl AppState {
    /// Build state from a server configuration.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            pipeline: Arc::new(SketchPipeline::new(config.pipeline.clone())),
            style_mode: config.style_mode,
        }
    }
}

/// API and health routes. Metrics and middleware are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route("/api/convert", post(routes::convert_handler))
        .route("/api/design", post(routes::design_handler))
        .layer(DefaultBodyLimit::max(validation::MAX_BODY_BYTES))
        .with_state(state)
}

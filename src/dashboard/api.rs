//! HTTP handlers of the dashboard
//!
//! HTML pages for the browser and a JSON mirror of the same submission
//! under `/api`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;

use crate::error::ErrorCategory;
use crate::export::{CSV_FILENAME, PNG_FILENAME};
use crate::flow::{self, FlowState, SubmissionOutcome, SubmissionReport};
use crate::i18n::t;
use crate::models::{QueryRequest, RelatedQueries};
use crate::normalize::QueryForm;
use crate::present::TabularView;

use super::server::AppState;
use super::templates::{self, download_href, PageContext};

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Link to a generated file
#[derive(Debug, Serialize)]
pub struct DownloadLink {
    pub label: String,
    pub filename: String,
    pub href: String,
}

/// JSON view of a finished submission
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub state: FlowState,
    pub transitions: Vec<FlowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<QueryRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TabularView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedQueries>,
    pub downloads: Vec<DownloadLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
}

impl From<&SubmissionReport> for QueryResponse {
    fn from(report: &SubmissionReport) -> Self {
        let mut response = Self {
            state: report.final_state(),
            transitions: report.transitions.clone(),
            message: None,
            request: None,
            table: None,
            related: None,
            downloads: Vec::new(),
            error_category: None,
        };

        match &report.outcome {
            SubmissionOutcome::NoData { request, message } => {
                response.message = Some(message.clone());
                response.request = Some(request.clone());
            }
            SubmissionOutcome::Failed { message, category } => {
                response.message = Some(message.clone());
                response.error_category = Some(*category);
            }
            SubmissionOutcome::Presented(p) => {
                response.request = Some(p.request.clone());
                response.table = Some(p.view.clone());
                response.related = Some(p.related.clone());
                response.downloads = [&p.png, &p.csv]
                    .into_iter()
                    .map(|d| DownloadLink {
                        label: d.label.clone(),
                        filename: d.filename.to_string(),
                        href: download_href(d.filename),
                    })
                    .collect();
            }
        }

        response
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the dashboard router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Browser pages
        .route("/", get(index))
        .route("/query", post(submit_form))
        .route("/download/{file}", get(download))
        // JSON endpoints
        .route("/api/query", post(submit_json))
        .route("/api/health", get(health_check))
        .with_state(state)
}

// ============================================================================
// Submission
// ============================================================================

/// Run a submission unless another one holds the gate
///
/// The stored presentation is dropped before querying and only replaced by
/// a new one, so downloads never mix results of different submissions.
async fn run_submission(state: &AppState, form: &QueryForm) -> Option<SubmissionReport> {
    let Ok(_guard) = state.gate.try_lock() else {
        tracing::warn!("Submission rejected: another submission is in flight");
        return None;
    };

    *state.latest.write().await = None;

    let report = flow::submit(state.api.as_ref(), form, &state.settings).await;

    if let Some(presentation) = report.outcome.presentation() {
        *state.latest.write().await = Some(Arc::new(presentation.clone()));
    }

    Some(report)
}

fn render_page(state: &AppState, status: StatusCode, page: &PageContext) -> Response {
    match state.templates.render(templates::PAGE, page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

// ============================================================================
// Page Handlers
// ============================================================================

/// Form with default values
async fn index(State(state): State<AppState>) -> Response {
    let page = PageContext::form(state.locale(), &QueryForm::default());
    render_page(&state, StatusCode::OK, &page)
}

/// Form submission from the browser
async fn submit_form(State(state): State<AppState>, Form(form): Form<QueryForm>) -> Response {
    let locale = state.locale();

    match run_submission(&state, &form).await {
        Some(report) => {
            let page = PageContext::outcome(locale, &form, &report.outcome);
            render_page(&state, StatusCode::OK, &page)
        }
        None => {
            let message = t!("flow.busy", locale = locale).to_string();
            let page = PageContext::with_message(locale, &form, "info", message);
            render_page(&state, StatusCode::CONFLICT, &page)
        }
    }
}

/// Files of the last presentation
async fn download(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let latest = state.latest.read().await;

    let found = latest.as_ref().and_then(|p| {
        if file == PNG_FILENAME {
            Some(&p.png)
        } else if file == CSV_FILENAME {
            Some(&p.csv)
        } else {
            None
        }
    });

    match found {
        Some(d) => (
            [
                (header::CONTENT_TYPE, d.mime.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", d.filename),
                ),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
            d.bytes.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            t!("download.missing", locale = state.locale()).to_string(),
        )
            .into_response(),
    }
}

// ============================================================================
// JSON Handlers
// ============================================================================

/// JSON submission
async fn submit_json(State(state): State<AppState>, Json(form): Json<QueryForm>) -> Response {
    let Some(report) = run_submission(&state, &form).await else {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(t!("flow.busy", locale = state.locale()))),
        )
            .into_response();
    };

    let response = QueryResponse::from(&report);
    match &report.outcome {
        SubmissionOutcome::Failed { message, .. } => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::failure(response, message.clone())),
        )
            .into_response(),
        _ => (StatusCode::OK, Json(ApiResponse::success(response))).into_response(),
    }
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
    }))
}

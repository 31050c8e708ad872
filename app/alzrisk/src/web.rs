//! HTTP surface: the prediction form, its results page, and a JSON API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use alzrisk_pipeline::{
    error_banner, input_error_banner, Banner, EncodedVector, InputRecord, Pipeline,
    PredictionReport, Stage,
};
use alzrisk_schema::{FeatureKind, FeatureSchema};
use askama::Template;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Error)]
pub enum WebError {
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        log::error!("{self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub struct AppState {
    pub pipeline: Pipeline,
}

struct OptionView {
    label: String,
    selected: bool,
}

struct FieldView {
    name: String,
    is_select: bool,
    options: Vec<OptionView>,
    value: String,
    min: String,
    step: String,
    placeholder: String,
    caption: String,
}

struct TableView {
    columns: Vec<String>,
    values: Vec<String>,
}

impl TableView {
    fn from_vector(vector: &EncodedVector) -> Self {
        Self {
            columns: vector.columns().to_vec(),
            values: vector.values().iter().map(|v| format!("{v:.4}")).collect(),
        }
    }
}

struct ResultsView {
    before: TableView,
    after: TableView,
    probability_line: String,
    verdict: Banner,
    notices: Vec<String>,
}

impl ResultsView {
    fn from_report(report: &PredictionReport) -> Self {
        Self {
            before: TableView::from_vector(&report.before_scaling),
            after: TableView::from_vector(&report.after_scaling),
            probability_line: report.probability_line.clone(),
            verdict: report.verdict.clone(),
            notices: report.notices.iter().map(|n| n.message()).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    fields: Vec<FieldView>,
    results: Option<ResultsView>,
    error: Option<Banner>,
}

/// One control per feature, in schema order. `submitted` keeps previously
/// entered values on the results page.
fn field_views(schema: &FeatureSchema, submitted: &HashMap<String, String>) -> Vec<FieldView> {
    schema
        .features()
        .iter()
        .map(|feature| {
            let current = submitted.get(&feature.name).map(String::as_str);
            match &feature.kind {
                FeatureKind::Categorical { codebook } => {
                    let chosen = current.or(codebook.default_label());
                    FieldView {
                        name: feature.name.clone(),
                        is_select: true,
                        options: codebook
                            .labels()
                            .map(|label| OptionView {
                                label: label.to_string(),
                                selected: Some(label) == chosen,
                            })
                            .collect(),
                        value: String::new(),
                        min: String::new(),
                        step: String::new(),
                        placeholder: String::new(),
                        caption: String::new(),
                    }
                }
                FeatureKind::Numeric { field } => FieldView {
                    name: feature.name.clone(),
                    is_select: false,
                    options: Vec::new(),
                    value: current.unwrap_or_default().to_string(),
                    min: field.min.to_string(),
                    step: field.step.to_string(),
                    placeholder: field.placeholder.clone(),
                    caption: field.caption.clone().unwrap_or_default(),
                },
            }
        })
        .collect()
}

fn render_page(
    schema: &FeatureSchema,
    submitted: &HashMap<String, String>,
    results: Option<ResultsView>,
    error: Option<Banner>,
) -> Result<Html<String>, WebError> {
    let page = IndexTemplate {
        fields: field_views(schema, submitted),
        results,
        error,
    };
    Ok(Html(page.render()?))
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    log::debug!("stage={} -> {}", Stage::Idle, Stage::Collecting);
    render_page(state.pipeline.schema(), &HashMap::new(), None, None)
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Html<String>, WebError> {
    log::debug!("stage={}", Stage::Submitted);
    let schema = state.pipeline.schema();
    let (results, error) = match InputRecord::from_form(schema, &fields) {
        Err(e) => {
            log::warn!("rejected form input: {e}");
            (None, Some(input_error_banner(&e)))
        }
        Ok(record) => {
            let result = state.pipeline.run(&record);
            log::debug!("stage={}", Stage::settled(&result));
            match result {
                Ok(report) => (Some(ResultsView::from_report(&report)), None),
                Err(e) => (None, Some(error_banner(&e))),
            }
        }
    };
    render_page(schema, &fields, results, error)
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ApiResponse {
    Ok { report: PredictionReport },
    Error { stage: Stage, message: String },
}

async fn api_predict(
    State(state): State<Arc<AppState>>,
    Json(partial): Json<InputRecord>,
) -> (StatusCode, Json<ApiResponse>) {
    let record = partial.completed(state.pipeline.schema());
    match state.pipeline.run(&record) {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::Ok { report })),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::Error {
                stage: e.stage(),
                message: error_banner(&e).message,
            }),
        ),
    }
}

async fn api_schema(State(state): State<Arc<AppState>>) -> Json<FeatureSchema> {
    Json(state.pipeline.schema().clone())
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/predict", post(submit))
        .route("/api/predict", post(api_predict))
        .route("/api/schema", get(api_schema))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(pipeline: Pipeline, addr: SocketAddr) -> Result<(), WebError> {
    let app = router(Arc::new(AppState { pipeline }));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("alzrisk listening on http://{addr}");
    println!("alzrisk listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

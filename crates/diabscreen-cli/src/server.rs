//! HTTP surface for the screening form.
//!
//! `GET /` form, `POST /screen` form submit, `POST /api/screen` JSON,
//! `GET /api/schema`, `GET /health`.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use diabscreen::report::page::{form_page, result_page};
use diabscreen::{
    FeatureSchema, PredictionError, ScreenError, Screener, ScreeningForm, ScreeningInput,
    ScreeningOutcome,
};

use crate::config::ScreenConfig;

#[derive(Clone)]
pub struct AppState {
    pub screener: Arc<Screener>,
    pub prediction_timeout: Duration,
}

impl AppState {
    pub fn new(screener: Screener, prediction_timeout: Duration) -> Self {
        AppState {
            screener: Arc::new(screener),
            prediction_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/screen", post(screen_form))
        .route("/api/screen", post(screen_api))
        .route("/api/schema", get(schema))
        .route("/health", get(health))
        .with_state(state)
}

/// Load the model, bind and serve until Ctrl-C.
pub async fn serve(config: &ScreenConfig) -> Result<()> {
    let screener = Screener::from_dir(&config.model_dir)
        .with_context(|| format!("Failed to load model from {}", config.model_dir))?;
    log::info!(
        "[diabscreen::serve] Loaded model '{}' (schema {})",
        screener.model_name(),
        screener.schema().version
    );

    let state = AppState::new(screener, config.prediction_timeout());
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("[diabscreen::serve] Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("[diabscreen::serve] Shutting down");
}

/// Validate on the request task, then predict on the blocking pool under the
/// configured timeout.
pub async fn run_screening(
    state: &AppState,
    input: ScreeningInput,
) -> Result<ScreeningOutcome, ScreenError> {
    input.validate()?;

    let screener = Arc::clone(&state.screener);
    let task = tokio::task::spawn_blocking(move || screener.screen(&input));
    match tokio::time::timeout(state.prediction_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(PredictionError::Aborted(join_error.to_string()).into()),
        Err(_) => Err(PredictionError::Timeout {
            millis: state.prediction_timeout.as_millis() as u64,
        }
        .into()),
    }
}

async fn index() -> Html<String> {
    Html(form_page(&ScreeningForm::default(), None).into_string())
}

async fn screen_form(
    State(state): State<AppState>,
    form: Result<Form<ScreeningForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            log::debug!("Rejected form submission: {}", rejection);
            let page = form_page(
                &ScreeningForm::default(),
                Some(&form_rejection_message(&rejection)),
            );
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page.into_string())).into_response();
        }
    };

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(e) => {
            let page = form_page(&form, Some(&e.to_string()));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page.into_string())).into_response();
        }
    };

    match run_screening(&state, input).await {
        Ok(outcome) => Html(result_page(&form, &outcome).into_string()).into_response(),
        Err(ScreenError::Validation(e)) => {
            let page = form_page(&form, Some(&e.to_string()));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(page.into_string())).into_response()
        }
        Err(ScreenError::Prediction(e)) => {
            log::error!("[diabscreen::serve] Prediction failed: {}", e);
            let page = form_page(&form, Some(PredictionError::PUBLIC_MESSAGE));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
        }
    }
}

/// Plain-language text for a form body that did not deserialize.
fn form_rejection_message(rejection: &FormRejection) -> String {
    let text = rejection.body_text();
    let missing = text
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(field, _)| field_label(field));
    match missing {
        Some(label) => format!("Please answer every question. Missing: {}.", label),
        None => "Please check your answers and submit the form again.".to_string(),
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "height_cm" => "Height (cm)",
        "weight_kg" => "Weight (kg)",
        "age" => "Age group",
        "phys_activity" => "Physical activity",
        "genhlth" => "General health",
        "smoker" => "Smoker",
        "highbp" => "High blood pressure",
        "highchol" => "High cholesterol",
        other => other,
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { error: error.into() }))
}

async fn screen_api(
    State(state): State<AppState>,
    Json(input): Json<ScreeningInput>,
) -> Result<Json<ScreeningOutcome>, (StatusCode, Json<ApiError>)> {
    match run_screening(&state, input).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(ScreenError::Validation(e)) => {
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(ScreenError::Prediction(e)) => {
            log::error!("[diabscreen::serve] Prediction failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                PredictionError::PUBLIC_MESSAGE,
            ))
        }
    }
}

async fn schema(State(state): State<AppState>) -> Json<FeatureSchema> {
    Json(state.screener.schema().clone())
}

async fn health() -> &'static str {
    "ok"
}

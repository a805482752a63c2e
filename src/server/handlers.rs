use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::language::LanguageModelKey;
use crate::server::form::{self, Notice};
use crate::server::state::AppState;
use crate::service::SpeechFile;
use crate::TtsError;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    loaded_models: usize,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        loaded_models: state.service.cache().loaded_count(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<LanguageModelKey>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TtsResponse {
    Success { file: String, sampling_rate: u32 },
    Error { message: String },
}

/// `POST /tts`.
///
/// The body is always a [`TtsResponse`]. Unless strict status is enabled the
/// HTTP status is 200 even for failures, malformed JSON included.
pub async fn tts(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => convert(&state, request.text, request.language).await,
        Err(rejection) => Err(TtsError::InvalidInput(rejection.body_text())),
    };

    let (status, body) = match result {
        Ok(speech) => (
            StatusCode::OK,
            TtsResponse::Success {
                file: speech.file.display().to_string(),
                sampling_rate: speech.sampling_rate,
            },
        ),
        Err(e) => {
            log::warn!("/tts failed ({}): {e}", e.kind());
            (
                status_for(&e),
                TtsResponse::Error {
                    message: e.to_string(),
                },
            )
        }
    };

    let status = if state.strict_status {
        status
    } else {
        StatusCode::OK
    };
    (status, Json(body)).into_response()
}

/// Status code used for an error when strict status is enabled.
pub fn status_for(err: &TtsError) -> StatusCode {
    match err {
        TtsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TtsError::ModelLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
        TtsError::Inference(_) | TtsError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// `GET /`: the empty form.
pub async fn form_page(State(state): State<AppState>) -> Html<String> {
    let service = &state.service;
    Html(form::render_page(
        service.cache().registry(),
        &service.config().default_language,
        "",
        None,
    ))
}

/// `POST /`: convert the submitted text and re-render the form with the
/// outcome. Errors are shown inline; the page itself always renders.
pub async fn form_submit(State(state): State<AppState>, Form(input): Form<FormInput>) -> Html<String> {
    let language = input
        .language
        .as_deref()
        .map(LanguageModelKey::new)
        .filter(|key| !key.as_str().is_empty());

    let notice = match convert(&state, input.text.clone(), language.clone()).await {
        Ok(speech) => Notice::Success {
            sampling_rate: speech.sampling_rate,
        },
        Err(e) => {
            log::warn!("Form conversion failed ({}): {e}", e.kind());
            Notice::Error(e.to_string())
        }
    };

    let service = &state.service;
    let selected = language.unwrap_or_else(|| service.config().default_language.clone());
    Html(form::render_page(
        service.cache().registry(),
        &selected,
        &input.text,
        Some(&notice),
    ))
}

/// `GET /audio`: the most recent output file.
pub async fn audio(State(state): State<AppState>) -> Response {
    let service = Arc::clone(&state.service);
    let read = tokio::task::spawn_blocking(move || service.read_output())
        .await
        .unwrap_or_else(|e| Err(std::io::Error::other(format!("read task failed: {e}"))));
    match read {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "audio/wav"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "no audio has been generated yet").into_response()
        }
        Err(e) => {
            log::error!(
                "Reading {} failed: {e}",
                state.service.output_path().display()
            );
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Run the blocking pipeline off the async workers.
async fn convert(
    state: &AppState,
    text: String,
    language: Option<LanguageModelKey>,
) -> Result<SpeechFile, TtsError> {
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || service.text_to_speech(&text, language.as_ref()))
        .await
        .unwrap_or_else(|e| Err(TtsError::Inference(format!("synthesis task failed: {e}"))))
}

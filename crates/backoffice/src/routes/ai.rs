//! AI proxy route handlers.
//!
//! Each handler validates the request, resolves the provider key through
//! the credential override chain, calls exactly one external API, and
//! shapes the response. Provider failures are classified into fixed
//! statuses and user messages; nothing here retries a business
//! operation.

use axum::{Json, extract::State, response::IntoResponse};
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use meridian_core::{ItineraryId, Permission};

use crate::ai::{AiError, Message, PLANNER_SYSTEM_PROMPT, build_plan_prompt, parse_day_plans};
use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::{CoverImage, ProviderKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateItineraryRequest {
    pub destination: Option<String>,
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// When present, the generated plan is written into this itinerary.
    pub itinerary_id: Option<ItineraryId>,
}

/// `POST /api/ai/itinerary` - generate a day-by-day plan.
#[instrument(skip(state, current, body))]
pub async fn generate_itinerary(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<GenerateItineraryRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::AiGenerate)?;

    let destination = body
        .destination
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("destination is required".to_owned()))?;
    let duration_days = body
        .duration_days
        .filter(|d| (1..=60).contains(d))
        .ok_or_else(|| {
            AppError::BadRequest("duration_days must be between 1 and 60".to_owned())
        })?;

    if let Some(id) = &body.itinerary_id {
        if state.store().itineraries().get(id.as_str()).is_none() {
            return Err(AppError::NotFound(format!("itinerary '{id}'")));
        }
    }

    let api_key = state
        .credentials()
        .resolve(ProviderKind::Ai)
        .ok_or(AiError::MissingCredentials)?;

    let prompt = build_plan_prompt(&destination, duration_days, &body.interests);
    let response = state
        .ai()
        .chat(
            &api_key,
            vec![Message::user(prompt)],
            Some(PLANNER_SYSTEM_PROMPT.to_owned()),
        )
        .await?;

    let day_plans = parse_day_plans(&response.text())?;

    if let Some(id) = &body.itinerary_id {
        let plans = day_plans.clone();
        state.store().itineraries().update(id.as_str(), |itinerary| {
            itinerary.day_plans = plans;
            itinerary.updated_at = Utc::now();
        })?;
        tracing::info!(itinerary = %id, by = %current.id(), "AI plan attached");
    }

    Ok(ok(json!({
        "destination": destination,
        "durationDays": duration_days,
        "dayPlans": day_plans,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChatTurn {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// `POST /api/ai/chat` - assistant chat passthrough.
#[instrument(skip(state, current, body))]
pub async fn chat(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<ChatRequestBody>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::AiGenerate)?;

    let message = body
        .message
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("message is required".to_owned()))?;

    let mut messages = Vec::with_capacity(body.history.len() + 1);
    for turn in body.history {
        let content = turn
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::BadRequest("history entries need content".to_owned()))?;
        match turn.role.as_deref() {
            Some("user") => messages.push(Message::user(content)),
            Some("assistant") => messages.push(Message::assistant(content)),
            _ => {
                return Err(AppError::BadRequest(
                    "history roles must be 'user' or 'assistant'".to_owned(),
                ));
            }
        }
    }
    messages.push(Message::user(message));

    let api_key = state
        .credentials()
        .resolve(ProviderKind::Ai)
        .ok_or(AiError::MissingCredentials)?;

    let response = state.ai().chat(&api_key, messages, None).await?;

    Ok(ok(json!({
        "reply": response.text(),
        "model": response.model,
        "usage": {
            "inputTokens": response.usage.input_tokens,
            "outputTokens": response.usage.output_tokens,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: Option<String>,
    /// When present, the image becomes this itinerary's cover.
    pub itinerary_id: Option<ItineraryId>,
}

/// `POST /api/ai/image` - generate a cover image.
#[instrument(skip(state, current, body))]
pub async fn generate_image(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<GenerateImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::AiGenerate)?;

    let prompt = body
        .prompt
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("prompt is required".to_owned()))?;

    if let Some(id) = &body.itinerary_id {
        if state.store().itineraries().get(id.as_str()).is_none() {
            return Err(AppError::NotFound(format!("itinerary '{id}'")));
        }
    }

    let api_key = state
        .credentials()
        .resolve(ProviderKind::Image)
        .ok_or(AiError::MissingCredentials)?;

    let image = state.image().generate(&api_key, &prompt).await?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&image.b64_data)
        .map_err(|e| AppError::Ai(AiError::Parse(format!("invalid image payload: {e}"))))?;

    let stored = state
        .storage()
        .save("cover.png", "image/png", &bytes)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(id) = &body.itinerary_id {
        let cover = CoverImage::Uploaded {
            file_id: stored.id.clone(),
            url: stored.url.clone(),
        };
        state.store().itineraries().update(id.as_str(), |itinerary| {
            itinerary.cover_image = Some(cover);
            itinerary.updated_at = Utc::now();
        })?;
        tracing::info!(itinerary = %id, by = %current.id(), "AI cover image attached");
    }

    Ok(ok(stored))
}

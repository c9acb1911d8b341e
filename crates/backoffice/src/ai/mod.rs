//! Generative-AI provider integration.
//!
//! This module provides:
//! - [`AiClient`] for the Anthropic Messages API (itinerary plans, chat)
//! - [`ImageClient`] for the OpenAI Images API (cover images)
//! - Day-plan prompt construction and strict-JSON parsing
//! - Provider error classification into fixed user-facing responses

mod client;
mod error;
mod image;
mod planner;
mod types;

pub use client::AiClient;
pub use error::{AiError, ApiErrorResponse};
pub use image::{GeneratedImage, ImageClient};
pub use planner::{build_plan_prompt, parse_day_plans, PLANNER_SYSTEM_PROMPT};
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message, MessageContent, Usage};

//! Day-plan prompt construction and strict-JSON parsing.

use serde::Deserialize;

use crate::models::DayPlan;

use super::error::AiError;

/// System prompt pinning the planner to strict JSON output.
pub const PLANNER_SYSTEM_PROMPT: &str = "You are a travel planner for a boutique travel agency. \
Respond with a JSON array only - no prose, no markdown fences. Each element must have the keys \
\"day\" (1-based number), \"title\" (short headline), \"summary\" (2-3 sentences), and \
\"activities\" (array of strings in order).";

/// Builds the planning prompt for one itinerary request.
#[must_use]
pub fn build_plan_prompt(destination: &str, duration_days: u32, interests: &[String]) -> String {
    let mut prompt = format!(
        "Plan a {duration_days}-day itinerary for {destination}. \
Cover every day from 1 to {duration_days}."
    );
    if !interests.is_empty() {
        prompt.push_str(&format!(
            " The travellers are particularly interested in: {}.",
            interests.join(", ")
        ));
    }
    prompt
}

#[derive(Deserialize)]
struct RawDayPlan {
    day: u32,
    title: String,
    summary: String,
    #[serde(default)]
    activities: Vec<String>,
}

/// Parses the model's reply into day plans.
///
/// Tolerates a fenced code block around the JSON, since models sometimes
/// add one despite instructions, but otherwise requires the documented
/// shape.
///
/// # Errors
///
/// Returns `AiError::Parse` if the reply is not a JSON array of day
/// objects, or if it is empty.
pub fn parse_day_plans(reply: &str) -> Result<Vec<DayPlan>, AiError> {
    let json = strip_code_fence(reply.trim());

    let raw: Vec<RawDayPlan> = serde_json::from_str(json)
        .map_err(|e| AiError::Parse(format!("planner reply is not a JSON day array: {e}")))?;

    if raw.is_empty() {
        return Err(AiError::Parse("planner reply contained no days".to_owned()));
    }

    let mut plans: Vec<DayPlan> = raw
        .into_iter()
        .map(|day| DayPlan {
            day: day.day,
            title: day.title,
            summary: day.summary,
            activities: day.activities,
        })
        .collect();
    plans.sort_by_key(|plan| plan.day);

    Ok(plans)
}

fn strip_code_fence(reply: &str) -> &str {
    let Some(inner) = reply.strip_prefix("```") else {
        return reply;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim().strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_destination_and_duration() {
        let prompt = build_plan_prompt("Kyoto", 7, &[]);
        assert!(prompt.contains("7-day"));
        assert!(prompt.contains("Kyoto"));
        assert!(!prompt.contains("interested"));
    }

    #[test]
    fn prompt_includes_interests_when_present() {
        let interests = vec!["food".to_owned(), "temples".to_owned()];
        let prompt = build_plan_prompt("Kyoto", 3, &interests);
        assert!(prompt.contains("food, temples"));
    }

    #[test]
    fn parses_a_plain_json_array() {
        let reply = r#"[
            {"day": 2, "title": "Arashiyama", "summary": "Bamboo grove morning.", "activities": ["bamboo walk"]},
            {"day": 1, "title": "Arrival", "summary": "Settle in Gion.", "activities": []}
        ]"#;

        let plans = parse_day_plans(reply).expect("parse");
        assert_eq!(plans.len(), 2);
        // Sorted by day regardless of reply order.
        assert_eq!(plans[0].day, 1);
        assert_eq!(plans[1].title, "Arashiyama");
    }

    #[test]
    fn parses_a_fenced_reply() {
        let reply = "```json\n[{\"day\": 1, \"title\": \"Arrival\", \"summary\": \"Check in.\"}]\n```";
        let plans = parse_day_plans(reply).expect("parse");
        assert_eq!(plans.len(), 1);
        assert!(plans[0].activities.is_empty());
    }

    #[test]
    fn prose_reply_is_a_parse_error() {
        let reply = "Sure! Here is a lovely plan for your trip to Kyoto...";
        assert!(matches!(parse_day_plans(reply), Err(AiError::Parse(_))));
    }

    #[test]
    fn empty_array_is_a_parse_error() {
        assert!(matches!(parse_day_plans("[]"), Err(AiError::Parse(_))));
    }
}

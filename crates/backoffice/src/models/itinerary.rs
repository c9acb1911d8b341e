//! Itinerary documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use meridian_core::{ApprovalStatus, CollateralId, FileId, ItineraryId, UserId};

/// A travel itinerary in the `itineraries` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    /// Document ID.
    pub id: ItineraryId,
    /// Destination shown to customers.
    pub destination: String,
    /// Trip length in days.
    pub duration_days: u32,
    /// Package price.
    pub price: Decimal,
    /// Marketing description.
    pub description: String,
    /// AI-generated day-by-day plan, empty until generated.
    #[serde(default)]
    pub day_plans: Vec<DayPlan>,
    /// Agents assigned to this itinerary.
    #[serde(default)]
    pub assigned_agent_ids: Vec<UserId>,
    /// Pre-multi-assignment field; folded into `assigned_agent_ids` on
    /// normalization and cleared on every assignment write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent_id: Option<UserId>,
    /// Supporting files attached to this itinerary.
    #[serde(default)]
    pub collateral: Vec<Collateral>,
    /// Cover image, external or uploaded.
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    /// When the itinerary was created.
    pub created_at: DateTime<Utc>,
    /// When the itinerary was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Itinerary {
    /// Folds a populated legacy `assigned_agent_id` into the agent list.
    ///
    /// Older documents carry only the single-agent field; resolution and
    /// display always go through `assigned_agent_ids`.
    pub fn normalize_legacy_agent(&mut self) {
        if let Some(legacy) = self.assigned_agent_id.take() {
            if !self.assigned_agent_ids.contains(&legacy) {
                self.assigned_agent_ids.push(legacy);
            }
        }
    }

    /// Replaces the assigned agents and clears the deprecated field.
    pub fn set_assigned_agents(&mut self, agent_ids: Vec<UserId>) {
        self.assigned_agent_ids = agent_ids;
        self.assigned_agent_id = None;
    }
}

/// One day of an AI-generated plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayPlan {
    /// 1-based day number.
    pub day: u32,
    /// Short headline for the day.
    pub title: String,
    /// Narrative summary.
    pub summary: String,
    /// Planned activities in order.
    #[serde(default)]
    pub activities: Vec<String>,
}

/// A supporting file attached to an itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collateral {
    /// Attachment ID.
    pub id: CollateralId,
    /// Original file name.
    pub file_name: String,
    /// MIME type as uploaded.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Download URL.
    pub url: String,
    /// Approval state.
    pub status: ApprovalStatus,
    /// Who uploaded the file.
    pub uploaded_by: UserId,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

/// Cover image source: a plain external URL or an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoverImage {
    External { url: String },
    Uploaded { file_id: FileId, url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn itinerary() -> Itinerary {
        Itinerary {
            id: ItineraryId::generate(),
            destination: "Kyoto".to_owned(),
            duration_days: 7,
            price: Decimal::new(289_900, 2),
            description: "Temples and tea houses".to_owned(),
            day_plans: vec![],
            assigned_agent_ids: vec![],
            assigned_agent_id: None,
            collateral: vec![],
            cover_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn legacy_agent_folds_into_the_list() {
        let mut it = itinerary();
        let legacy = UserId::from("agent-1");
        it.assigned_agent_id = Some(legacy.clone());

        it.normalize_legacy_agent();

        assert_eq!(it.assigned_agent_ids, vec![legacy]);
        assert!(it.assigned_agent_id.is_none());
    }

    #[test]
    fn legacy_agent_already_listed_is_not_duplicated() {
        let mut it = itinerary();
        let agent = UserId::from("agent-1");
        it.assigned_agent_ids = vec![agent.clone()];
        it.assigned_agent_id = Some(agent.clone());

        it.normalize_legacy_agent();

        assert_eq!(it.assigned_agent_ids, vec![agent]);
    }

    #[test]
    fn assignment_write_clears_the_deprecated_field() {
        let mut it = itinerary();
        it.assigned_agent_id = Some(UserId::from("old-agent"));

        let agent = UserId::from("agent-2");
        it.set_assigned_agents(vec![agent.clone()]);

        assert_eq!(it.assigned_agent_ids, vec![agent]);
        assert!(it.assigned_agent_id.is_none());
    }

    #[test]
    fn cleared_legacy_field_is_omitted_from_json() {
        let it = itinerary();
        let json = serde_json::to_value(&it).expect("serialize");
        assert!(json.get("assigned_agent_id").is_none());
    }
}

use axum_helpers::validators::not_blank;
use chrono::{DateTime, Utc};
use domain_requests::RequestItem;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A lendable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Gates bookability and search visibility
    pub available: bool,
    /// Owner id, fixed at creation
    pub owner: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
}

/// DTO for listing an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(required)]
    pub available: Option<bool>,
    /// Request this item answers
    pub request_id: Option<i64>,
}

/// DTO for patching an item; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Booking as projected onto an item's details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: String,
}

/// Stored comment, author as an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: DateTime<Utc>,
}

/// Comment as rendered, author as a name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

/// Blank text is rejected by the service, after the booking check
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[serde(default)]
    pub text: String,
}

/// Item with its comments and, for the owner, its last and next booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingSnapshot>,
    pub next_booking: Option<BookingSnapshot>,
    pub comments: Vec<Comment>,
}

impl Item {
    pub fn apply_update(&mut self, update: UpdateItem) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(available) = update.available {
            self.available = available;
        }
    }

    /// Case-insensitive substring match on name or description
    pub fn matches(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Projection for the request board; `None` unless listed against a request
    pub fn as_request_item(&self) -> Option<RequestItem> {
        self.request_id.map(|request_id| RequestItem {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            available: self.available,
            request_id,
            owner_id: self.owner,
        })
    }
}

impl ItemDetails {
    pub fn new(
        item: Item,
        last_booking: Option<BookingSnapshot>,
        next_booking: Option<BookingSnapshot>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner: item.owner,
            request_id: item.request_id,
            last_booking,
            next_booking,
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drill() -> Item {
        Item {
            id: 1,
            name: "Drill".to_string(),
            description: "Cordless DRILL with two batteries".to_string(),
            available: true,
            owner: 3,
            request_id: None,
        }
    }

    #[test]
    fn test_create_item_requires_available() {
        let input: CreateItem = serde_json::from_value(json!({
            "name": "Drill",
            "description": "Cordless"
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("available"));

        let input: CreateItem = serde_json::from_value(json!({
            "name": "Drill",
            "description": "Cordless",
            "available": false,
            "requestId": 4
        }))
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.request_id, Some(4));
    }

    #[test]
    fn test_create_item_rejects_blank_strings() {
        let input: CreateItem = serde_json::from_value(json!({
            "name": " ",
            "description": "",
            "available": true
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let item = drill();
        assert!(item.matches("drill"));
        assert!(item.matches("BATTER"));
        assert!(!item.matches("saw"));
    }

    #[test]
    fn test_apply_update() {
        let mut item = drill();
        item.apply_update(UpdateItem {
            available: Some(false),
            ..Default::default()
        });
        assert!(!item.available);
        assert_eq!(item.name, "Drill");
    }

    #[test]
    fn test_item_json_shape() {
        let value = serde_json::to_value(drill()).unwrap();
        assert_eq!(value["owner"], 3);
        assert!(value.get("requestId").is_none());

        let answered = Item {
            request_id: Some(8),
            ..drill()
        };
        assert_eq!(serde_json::to_value(&answered).unwrap()["requestId"], 8);
        assert_eq!(answered.as_request_item().unwrap().owner_id, 3);
        assert!(drill().as_request_item().is_none());
    }
}

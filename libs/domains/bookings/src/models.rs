use chrono::{DateTime, NaiveDateTime, Utc};
use domain_items::BookingSnapshot;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Deserializer, Serialize, de};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Booking lifecycle status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    /// Stored and parsed, never produced by an operation
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

/// Filter for booking listings.
///
/// `PAST`, `CURRENT` and `FUTURE` partition every booking for a given `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    #[default]
    All,
    /// `start <= now < end`
    Current,
    /// `end <= now`
    Past,
    /// `now < start`
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// Parse the `state` query value; absent means `ALL`, matching is case-sensitive
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw {
            None => Ok(BookingState::All),
            Some(value) => value.parse().map_err(|_| value.to_string()),
        }
    }

    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => booking.start <= now && booking.end > now,
            BookingState::Past => booking.end <= now,
            BookingState::Future => booking.start > now,
            BookingState::Waiting => booking.status == BookingStatus::Waiting,
            BookingState::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

/// Whose bookings a listing covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingSubject {
    Booker(i64),
    /// Bookings of any of these items, e.g. everything an owner lists
    Items(Vec<i64>),
}

impl BookingSubject {
    pub fn covers(&self, booking: &Booking) -> bool {
        match self {
            BookingSubject::Booker(id) => booking.booker_id == *id,
            BookingSubject::Items(ids) => ids.contains(&booking.item_id),
        }
    }
}

/// Stored booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

impl Booking {
    pub fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            id: self.id,
            start: self.start,
            end: self.end,
            item_id: self.item_id,
            booker_id: self.booker_id,
            status: self.status.to_string(),
        }
    }
}

/// DTO for booking an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    #[validate(required)]
    pub item_id: Option<i64>,
    #[validate(required)]
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[schema(value_type = Option<String>, example = "2030-01-01T12:00:00")]
    pub start: Option<DateTime<Utc>>,
    #[validate(required)]
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[schema(value_type = Option<String>, example = "2030-01-02T12:00:00")]
    pub end: Option<DateTime<Utc>>,
}

/// RFC 3339 timestamp, or a local date-time without offset read as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|at| at.and_utc()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date-time: {}", raw))),
    }
}

impl CreateBooking {
    /// `None` unless every field is present
    pub fn into_new(self, booker_id: i64) -> Option<NewBooking> {
        Some(NewBooking {
            item_id: self.item_id?,
            booker_id,
            start: self.start?,
            end: self.end?,
        })
    }
}

/// Validated booking handed to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookedItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Booker {
    pub id: i64,
    pub name: String,
}

/// Booking with the item and booker flattened to id and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingDetails {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub item: BookedItem,
    pub booker: Booker,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StateQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED
    pub state: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApprovalQuery {
    /// `true` approves, `false` rejects
    pub approved: bool,
}

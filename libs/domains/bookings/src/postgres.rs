use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_items::{BookingHistory, BookingSnapshot, ItemError, ItemResult};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    entity::{self, Column},
    error::{BookingError, BookingResult},
    models::{Booking, BookingState, BookingStatus, BookingSubject, NewBooking},
    repository::BookingRepository,
};

#[derive(Clone)]
pub struct PgBookingRepository {
    db: DatabaseConnection,
}

impl PgBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> BookingError {
    BookingError::Internal(format!("Database error: {}", e))
}

fn history_error(e: DbErr) -> ItemError {
    db_error(e).into()
}

fn subject_condition(subject: BookingSubject) -> Condition {
    match subject {
        BookingSubject::Booker(booker_id) => Condition::all().add(Column::BookerId.eq(booker_id)),
        BookingSubject::Items(item_ids) => Condition::all().add(Column::ItemId.is_in(item_ids)),
    }
}

fn state_condition(state: BookingState, now: DateTime<Utc>) -> Condition {
    match state {
        BookingState::All => Condition::all(),
        BookingState::Current => Condition::all()
            .add(Column::StartDate.lte(now))
            .add(Column::EndDate.gt(now)),
        BookingState::Past => Condition::all().add(Column::EndDate.lte(now)),
        BookingState::Future => Condition::all().add(Column::StartDate.gt(now)),
        BookingState::Waiting => Condition::all().add(Column::Status.eq(BookingStatus::Waiting)),
        BookingState::Rejected => {
            Condition::all().add(Column::Status.eq(BookingStatus::Rejected))
        }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, booking: NewBooking) -> BookingResult<Booking> {
        let active_model = entity::ActiveModel {
            start_date: Set(booking.start.into()),
            end_date: Set(booking.end.into()),
            item_id: Set(booking.item_id),
            booker_id: Set(booking.booker_id),
            status: Set(BookingStatus::Waiting),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(
            booking_id = %model.id,
            item_id = %model.item_id,
            booker_id = %model.booker_id,
            "Created booking"
        );
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> BookingResult<Option<Booking>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn set_status_if_waiting(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> BookingResult<Booking> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let model = entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(BookingError::NotFound(id))?;

        if model.status != BookingStatus::Waiting {
            return Err(BookingError::InvalidState(id));
        }

        let mut active_model: entity::ActiveModel = model.into();
        active_model.status = Set(status);
        let updated = active_model.update(&txn).await.map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;

        tracing::info!(booking_id = %id, status = %status, "Changed booking status");
        Ok(updated.into())
    }

    async fn list(
        &self,
        subject: BookingSubject,
        state: BookingState,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> BookingResult<Vec<Booking>> {
        let models = entity::Entity::find()
            .filter(subject_condition(subject))
            .filter(state_condition(state, now))
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl BookingHistory for PgBookingRepository {
    async fn last_booking(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<Option<BookingSnapshot>> {
        let model = entity::Entity::find()
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::StartDate.lt(now))
            .filter(Column::Status.ne(BookingStatus::Rejected))
            .order_by_desc(Column::EndDate)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(history_error)?;

        Ok(model.map(|m| Booking::from(m).snapshot()))
    }

    async fn next_booking(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<Option<BookingSnapshot>> {
        let model = entity::Entity::find()
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::StartDate.gt(now))
            .filter(Column::Status.ne(BookingStatus::Rejected))
            .order_by_asc(Column::StartDate)
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await
            .map_err(history_error)?;

        Ok(model.map(|m| Booking::from(m).snapshot()))
    }

    async fn has_started_approved_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<bool> {
        let model = entity::Entity::find()
            .filter(Column::BookerId.eq(booker_id))
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::Status.eq(BookingStatus::Approved))
            .filter(Column::StartDate.lt(now))
            .one(&self.db)
            .await
            .map_err(history_error)?;

        Ok(model.is_some())
    }
}

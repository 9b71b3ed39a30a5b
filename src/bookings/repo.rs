use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Canceled,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub accommodation_id: Uuid,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub status: BookingStatus,
    pub created_at: OffsetDateTime,
}

impl Booking {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        accommodation_id: Uuid,
        check_in: Date,
        check_out: Date,
    ) -> sqlx::Result<Booking> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_id, accommodation_id, check_in_date, check_out_date, status)
            VALUES ($1, $2, $3, $4, 'PENDING')
            RETURNING id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(accommodation_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Admin listing: whichever filters are present are ANDed, none means all.
    pub async fn list_filtered(
        db: &PgPool,
        user_id: Option<Uuid>,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            FROM bookings
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::booking_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// All bookings of an accommodation that can still cause a date conflict.
    pub async fn find_active_for_accommodation(
        db: &PgPool,
        accommodation_id: Uuid,
    ) -> sqlx::Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            FROM bookings
            WHERE accommodation_id = $1 AND status <> 'CANCELED'
            "#,
        )
        .bind(accommodation_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update_dates(
        db: &PgPool,
        id: Uuid,
        check_in: Date,
        check_out: Date,
    ) -> sqlx::Result<Booking> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET check_in_date = $2, check_out_date = $3
            WHERE id = $1
            RETURNING id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            "#,
        )
        .bind(id)
        .bind(check_in)
        .bind(check_out)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn set_status(db: &PgPool, id: Uuid, status: BookingStatus) -> sqlx::Result<()> {
        sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Expiry sweep. Already-EXPIRED rows are excluded, so re-running is a no-op.
    pub async fn mark_expired_before(db: &PgPool, threshold: Date) -> sqlx::Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'EXPIRED'
            WHERE check_out_date < $1 AND status NOT IN ('CANCELED', 'EXPIRED')
            RETURNING id, user_id, accommodation_id, check_in_date, check_out_date, status, created_at
            "#,
        )
        .bind(threshold)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

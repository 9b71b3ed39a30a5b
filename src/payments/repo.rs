use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub status: PaymentStatus,
    pub session_id: String,
    pub session_url: String,
    pub amount: Decimal,
    pub created_at: OffsetDateTime,
}

impl Payment {
    pub async fn insert(
        db: &PgPool,
        booking_id: Uuid,
        session_id: &str,
        session_url: &str,
        amount: Decimal,
    ) -> sqlx::Result<Payment> {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (booking_id, status, session_id, session_url, amount)
            VALUES ($1, 'PENDING', $2, $3, $4)
            RETURNING id, booking_id, status, session_id, session_url, amount, created_at
            "#,
        )
        .bind(booking_id)
        .bind(session_id)
        .bind(session_url)
        .bind(amount)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Payment>> {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, booking_id, status, session_id, session_url, amount, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// One payment per booking, looked up by booking id.
    pub async fn find_by_booking(db: &PgPool, booking_id: Uuid) -> sqlx::Result<Option<Payment>> {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, booking_id, status, session_id, session_url, amount, created_at
            FROM payments
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_session(db: &PgPool, session_id: &str) -> sqlx::Result<Option<Payment>> {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, booking_id, status, session_id, session_url, amount, created_at
            FROM payments
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn list_all(db: &PgPool, limit: i64, offset: i64) -> sqlx::Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, booking_id, status, session_id, session_url, amount, created_at
            FROM payments
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.id, p.booking_id, p.status, p.session_id, p.session_url, p.amount, p.created_at
            FROM payments p
            JOIN bookings b ON b.id = p.booking_id
            WHERE b.user_id = $1
            ORDER BY p.created_at DESC
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

    /// Only PENDING payments can still lapse, so the sweep fetches just those.
    pub async fn list_pending(db: &PgPool) -> sqlx::Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, booking_id, status, session_id, session_url, amount, created_at
            FROM payments
            WHERE status = 'PENDING'
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn user_has_pending(db: &PgPool, user_id: Uuid) -> sqlx::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM payments p
                JOIN bookings b ON b.id = p.booking_id
                WHERE b.user_id = $1 AND p.status = 'PENDING'
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(exists)
    }

    /// Point the payment at a fresh session and reopen it.
    pub async fn update_session(
        db: &PgPool,
        id: Uuid,
        session_id: &str,
        session_url: &str,
        amount: Decimal,
    ) -> sqlx::Result<Payment> {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET session_id = $2, session_url = $3, amount = $4, status = 'PENDING'
            WHERE id = $1
            RETURNING id, booking_id, status, session_id, session_url, amount, created_at
            "#,
        )
        .bind(id)
        .bind(session_id)
        .bind(session_url)
        .bind(amount)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn set_status(db: &PgPool, id: Uuid, status: PaymentStatus) -> sqlx::Result<()> {
        sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(db)
            .await?;
        Ok(())
    }
}

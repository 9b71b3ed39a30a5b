use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "accommodation_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccommodationKind {
    House,
    Apartment,
    Condo,
    Hotel,
    VacationHome,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Accommodation {
    pub id: Uuid,
    pub kind: AccommodationKind,
    pub location: String,
    pub size: String,
    pub amenities: Vec<String>,
    pub daily_rate: Decimal,
    pub availability: i32,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, kind, location, size, amenities, daily_rate, availability, created_at";

impl Accommodation {
    pub async fn insert(
        db: &PgPool,
        kind: AccommodationKind,
        location: &str,
        size: &str,
        amenities: &[String],
        daily_rate: Decimal,
        availability: i32,
    ) -> sqlx::Result<Accommodation> {
        let row = sqlx::query_as::<_, Accommodation>(&format!(
            r#"
            INSERT INTO accommodations (kind, location, size, amenities, daily_rate, availability)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(kind)
        .bind(location)
        .bind(size)
        .bind(amenities)
        .bind(daily_rate)
        .bind(availability)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Accommodation>> {
        let row = sqlx::query_as::<_, Accommodation>(&format!(
            "SELECT {COLUMNS} FROM accommodations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> sqlx::Result<Vec<Accommodation>> {
        let rows = sqlx::query_as::<_, Accommodation>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM accommodations
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        kind: AccommodationKind,
        location: &str,
        size: &str,
        amenities: &[String],
        daily_rate: Decimal,
        availability: i32,
    ) -> sqlx::Result<Option<Accommodation>> {
        let row = sqlx::query_as::<_, Accommodation>(&format!(
            r#"
            UPDATE accommodations
            SET kind = $2, location = $3, size = $4, amenities = $5,
                daily_rate = $6, availability = $7
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(kind)
        .bind(location)
        .bind(size)
        .bind(amenities)
        .bind(daily_rate)
        .bind(availability)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Returns whether a row was actually deleted.
    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&AccommodationKind::VacationHome).unwrap(),
            "\"VACATION_HOME\""
        );
        assert_eq!(
            serde_json::from_str::<AccommodationKind>("\"HOUSE\"").unwrap(),
            AccommodationKind::House
        );
    }
}

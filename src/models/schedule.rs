use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One screening: a movie shown in a cinema at a time slot on a date.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i32,
    pub movie_id: i32,
    pub cinema_id: i32,
    pub time_id: i32,
    pub location_id: i32,
    pub date: NaiveDate,
}

impl Schedule {
    pub async fn for_movie(movie_id: i32, db: &crate::database::Database) -> Result<Vec<Schedule>, sqlx::Error> {
        sqlx::query_as::<_, Schedule>(
            "SELECT id, movies_id AS movie_id, cinemas_id AS cinema_id, times_id AS time_id,
                    locations_id AS location_id, date
             FROM schedules
             WHERE movies_id = $1
             ORDER BY date ASC, id ASC",
        )
        .bind(movie_id)
        .fetch_all(&db.pool)
        .await
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use validator::Validate;

use crate::database::Database;

const MOVIE_COLUMNS: &str = "id, backdrop_path AS backdrop, overview, popularity, \
     poster_path AS poster, release_date, duration, title, director_name AS director, \
     created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub backdrop: String,
    pub overview: String,
    pub popularity: f64,
    pub poster: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub title: String,
    pub director: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub genres: Vec<Genre>,
    #[sqlx(skip)]
    pub casts: Vec<Cast>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cast {
    pub id: i32,
    pub name: String,
}

/// Full replacement of a movie's editable fields (admin only).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MovieUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub poster: String,
    #[validate(length(min = 1))]
    pub backdrop: String,
    #[validate(length(min = 1))]
    pub overview: String,
    pub release_date: NaiveDate,
    #[validate(range(min = 1))]
    pub duration: i32,
    #[validate(length(min = 1, max = 255))]
    pub director: String,
    #[validate(range(min = 0.0))]
    pub popularity: f64,
}

impl Movie {
    pub async fn upcoming(db: &Database) -> Result<Vec<Movie>, sqlx::Error> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             WHERE release_date > CURRENT_DATE
             ORDER BY release_date ASC, id ASC"
        );
        let movies = sqlx::query_as::<_, Movie>(&sql).fetch_all(&db.pool).await?;
        Self::with_credits(db, movies).await
    }

    pub async fn popular(db: &Database, limit: i64) -> Result<Vec<Movie>, sqlx::Error> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             ORDER BY popularity DESC, id ASC
             LIMIT $1"
        );
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(limit)
            .fetch_all(&db.pool)
            .await?;
        Self::with_credits(db, movies).await
    }

    /// One page of movies ordered by id, optionally filtered by a
    /// case-insensitive title substring.
    pub async fn page(
        db: &Database,
        limit: i64,
        offset: i64,
        search: &str,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             WHERE $3 = '' OR title ILIKE '%' || $3 || '%'
             ORDER BY id ASC
             LIMIT $1 OFFSET $2"
        );
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(limit)
            .bind(offset)
            .bind(escape_like(search))
            .fetch_all(&db.pool)
            .await?;
        Self::with_credits(db, movies).await
    }

    pub async fn find(db: &Database, id: i32) -> Result<Option<Movie>, sqlx::Error> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        let Some(movie) = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&db.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut movies = Self::with_credits(db, vec![movie]).await?;
        Ok(movies.pop())
    }

    pub async fn all(db: &Database) -> Result<Vec<Movie>, sqlx::Error> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC, id DESC");
        let movies = sqlx::query_as::<_, Movie>(&sql).fetch_all(&db.pool).await?;
        Self::with_credits(db, movies).await
    }

    /// Returns `false` when no movie has the given id.
    pub async fn update(db: &Database, id: i32, update: &MovieUpdate) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movies
             SET title = $1, poster_path = $2, backdrop_path = $3, overview = $4,
                 release_date = $5, duration = $6, director_name = $7, popularity = $8,
                 updated_at = NOW()
             WHERE id = $9",
        )
        .bind(&update.title)
        .bind(&update.poster)
        .bind(&update.backdrop)
        .bind(&update.overview)
        .bind(update.release_date)
        .bind(update.duration)
        .bind(&update.director)
        .bind(update.popularity)
        .bind(id)
        .execute(&db.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes the movie together with its genre/cast links and schedules.
    /// Returns `false` when no movie has the given id. Fails with a foreign
    /// key violation when orders still reference one of its schedules.
    pub async fn delete(db: &Database, id: i32) -> Result<bool, sqlx::Error> {
        let mut tx = db.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, i32>("SELECT id FROM movies WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(false);
        }

        for statement in [
            "DELETE FROM movies_genres WHERE movies_id = $1",
            "DELETE FROM movies_casts WHERE movies_id = $1",
            "DELETE FROM schedules WHERE movies_id = $1",
            "DELETE FROM movies WHERE id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    // Genres and casts for a whole batch in two queries.
    async fn with_credits(db: &Database, mut movies: Vec<Movie>) -> Result<Vec<Movie>, sqlx::Error> {
        if movies.is_empty() {
            return Ok(movies);
        }
        let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();

        let genre_rows: Vec<(i32, i32, String)> = sqlx::query_as(
            "SELECT mg.movies_id, g.id, g.name
             FROM genres g
             INNER JOIN movies_genres mg ON g.id = mg.genres_id
             WHERE mg.movies_id = ANY($1)
             ORDER BY g.name",
        )
        .bind(&ids)
        .fetch_all(&db.pool)
        .await?;

        let cast_rows: Vec<(i32, i32, String)> = sqlx::query_as(
            "SELECT mc.movies_id, c.id, c.name
             FROM casts c
             INNER JOIN movies_casts mc ON c.id = mc.casts_id
             WHERE mc.movies_id = ANY($1)
             ORDER BY mc.id",
        )
        .bind(&ids)
        .fetch_all(&db.pool)
        .await?;

        let mut genres: HashMap<i32, Vec<Genre>> = HashMap::new();
        for (movie_id, id, name) in genre_rows {
            genres.entry(movie_id).or_default().push(Genre { id, name });
        }
        let mut casts: HashMap<i32, Vec<Cast>> = HashMap::new();
        for (movie_id, id, name) in cast_rows {
            casts.entry(movie_id).or_default().push(Cast { id, name });
        }

        for movie in &mut movies {
            movie.genres = genres.remove(&movie.id).unwrap_or_default();
            movie.casts = casts.remove(&movie.id).unwrap_or_default();
        }
        Ok(movies)
    }
}

// Search input is matched literally, so LIKE wildcards must be escaped.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

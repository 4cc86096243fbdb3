use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::GameRecordModel;
use crate::shared::AppError;

/// Trait for game record repository operations
#[async_trait]
pub trait GameRecordRepository {
    async fn create_record(&self, record: &GameRecordModel) -> Result<(), AppError>;
    async fn get_record(&self, record_id: &str) -> Result<Option<GameRecordModel>, AppError>;
    async fn update_record(&self, record: &GameRecordModel) -> Result<(), AppError>;
    /// All records, oldest first
    async fn list_records(&self) -> Result<Vec<GameRecordModel>, AppError>;
}

/// In-memory implementation of GameRecordRepository for development and testing
pub struct InMemoryGameRecordRepository {
    records: Mutex<HashMap<String, GameRecordModel>>,
}

impl Default for InMemoryGameRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameRecordRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, GameRecordModel>>, AppError> {
        self.records.lock().map_err(|_| AppError::Internal)
    }

    pub fn record_count(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GameRecordRepository for InMemoryGameRecordRepository {
    #[instrument(skip(self, record))]
    async fn create_record(&self, record: &GameRecordModel) -> Result<(), AppError> {
        debug!(record_id = %record.id, session_id = %record.user_session_id, "Creating game record in memory");

        let mut records = self.lock()?;
        if records.contains_key(&record.id) {
            warn!(record_id = %record.id, "Game record already exists in memory");
            return Err(AppError::DatabaseError(
                "Game record already exists".to_string(),
            ));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_record(&self, record_id: &str) -> Result<Option<GameRecordModel>, AppError> {
        debug!(record_id = %record_id, "Fetching game record from memory");

        let records = self.lock()?;
        Ok(records.get(record_id).cloned())
    }

    #[instrument(skip(self, record))]
    async fn update_record(&self, record: &GameRecordModel) -> Result<(), AppError> {
        debug!(record_id = %record.id, "Updating game record in memory");

        let mut records = self.lock()?;
        if !records.contains_key(&record.id) {
            warn!(record_id = %record.id, "Game record not found for update in memory");
            return Err(AppError::NotFound("Game record not found".to_string()));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_records(&self) -> Result<Vec<GameRecordModel>, AppError> {
        let records = self.lock()?;
        let mut list: Vec<GameRecordModel> = records.values().cloned().collect();
        list.sort_by_key(|record| record.game_start_time);

        debug!(record_count = list.len(), "Game records listed from memory");
        Ok(list)
    }
}

/// PostgreSQL implementation of game record repository
pub struct PostgresGameRecordRepository {
    pool: PgPool,
}

impl PostgresGameRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> GameRecordModel {
    GameRecordModel {
        id: row.get("id"),
        user_session_id: row.get("user_session_id"),
        game_start_time: row.get("game_start_time"),
        game_end_time: row.get("game_end_time"),
        player_count: row.get("player_count"),
        player_names: row.get("player_names"),
        round_scores: row.get("round_scores"),
        total_scores: row.get("total_scores"),
    }
}

#[async_trait]
impl GameRecordRepository for PostgresGameRecordRepository {
    #[instrument(skip(self, record))]
    async fn create_record(&self, record: &GameRecordModel) -> Result<(), AppError> {
        debug!(record_id = %record.id, "Creating game record in database");

        sqlx::query(
            "INSERT INTO game_record (id, user_session_id, game_start_time, game_end_time, player_count, player_names, round_scores, total_scores) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        )
        .bind(&record.id)
        .bind(&record.user_session_id)
        .bind(record.game_start_time)
        .bind(record.game_end_time)
        .bind(record.player_count)
        .bind(&record.player_names)
        .bind(&record.round_scores)
        .bind(&record.total_scores)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create game record in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_record(&self, record_id: &str) -> Result<Option<GameRecordModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_session_id, game_start_time, game_end_time, player_count, player_names, round_scores, total_scores FROM game_record WHERE id = $1"
        )
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, record_id = %record_id, "Failed to fetch game record from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(record_from_row))
    }

    #[instrument(skip(self, record))]
    async fn update_record(&self, record: &GameRecordModel) -> Result<(), AppError> {
        debug!(record_id = %record.id, "Updating game record in database");

        let result = sqlx::query(
            "UPDATE game_record SET game_end_time = $2, round_scores = $3, total_scores = $4 WHERE id = $1"
        )
        .bind(&record.id)
        .bind(record.game_end_time)
        .bind(&record.round_scores)
        .bind(&record.total_scores)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, record_id = %record.id, "Failed to update game record in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(record_id = %record.id, "Game record not found for update");
            return Err(AppError::NotFound("Game record not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_records(&self) -> Result<Vec<GameRecordModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_session_id, game_start_time, game_end_time, player_count, player_names, round_scores, total_scores FROM game_record ORDER BY game_start_time"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list game records");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(record_count = rows.len(), "Game records listed from database");
        Ok(rows.iter().map(record_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(session_id: &str, players: &[&str]) -> GameRecordModel {
        let roster: Vec<String> = players.iter().map(|s| s.to_string()).collect();
        GameRecordModel::new(session_id, &roster).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_record() {
        let repo = InMemoryGameRecordRepository::new();
        let record = record("session-1", &["Alice", "Bob"]);

        repo.create_record(&record).await.unwrap();

        let retrieved = repo.get_record(&record.id).await.unwrap().unwrap();
        assert_eq!(retrieved.user_session_id, "session-1");
        assert_eq!(retrieved.player_count, 2);
        assert_eq!(repo.record_count(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_record() {
        let repo = InMemoryGameRecordRepository::new();
        let record = record("session-1", &["Alice"]);

        repo.create_record(&record).await.unwrap();
        let result = repo.create_record(&record).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_update_record() {
        let repo = InMemoryGameRecordRepository::new();
        let mut record = record("session-1", &["Alice"]);
        repo.create_record(&record).await.unwrap();

        record.game_end_time = Some(Utc::now());
        record.round_scores = Some("[]".to_string());
        repo.update_record(&record).await.unwrap();

        let retrieved = repo.get_record(&record.id).await.unwrap().unwrap();
        assert!(retrieved.is_finished());
        assert_eq!(retrieved.round_scores.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_update_nonexistent_record() {
        let repo = InMemoryGameRecordRepository::new();
        let result = repo.update_record(&record("s", &["Alice"])).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_records_oldest_first() {
        let repo = InMemoryGameRecordRepository::new();
        let mut older = record("s", &["Alice"]);
        older.game_start_time = Utc::now() - Duration::hours(2);
        let newer = record("s", &["Bob"]);

        repo.create_record(&newer).await.unwrap();
        repo.create_record(&older).await.unwrap();

        let ids: Vec<String> = repo
            .list_records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }
}

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    logic::{GamePhase, GameState, ScoringError},
    manager::GameManager,
    models::GameRecordModel,
    repository::GameRecordRepository,
    types::{EndGameResponse, GameView, PlayRoundRequest, RoundResponse},
};
use crate::{report::ReportService, session::service::SessionService, shared::AppError};

pub const REPORT_FAILED_MESSAGE: &str = "Report generation failed, but the game record was saved";

fn serialization_error(e: serde_json::Error) -> AppError {
    error!(error = %e, "Failed to serialize game record");
    AppError::Internal
}

fn no_game() -> AppError {
    AppError::Conflict("No game in progress".to_string())
}

/// Orchestrates the game lifecycle for a session: setup, rounds and the final write-up
pub struct GameService {
    manager: Arc<GameManager>,
    repository: Arc<dyn GameRecordRepository + Send + Sync>,
    session_service: Arc<SessionService>,
    reports: ReportService,
}

impl GameService {
    pub fn new(
        manager: Arc<GameManager>,
        repository: Arc<dyn GameRecordRepository + Send + Sync>,
        session_service: Arc<SessionService>,
        reports: ReportService,
    ) -> Self {
        Self {
            manager,
            repository,
            session_service,
            reports,
        }
    }

    /// Fixes the roster, records the game start and puts the game into play.
    /// A game already running for the session is replaced.
    #[instrument(skip(self, players))]
    pub async fn setup_game(
        &self,
        session_id: &str,
        players: &[String],
    ) -> Result<GameView, AppError> {
        let mut game = GameState::new();
        game.start(players)?;

        let record = GameRecordModel::new(session_id, game.roster()).map_err(serialization_error)?;
        self.repository.create_record(&record).await?;
        game.set_record_id(record.id.clone());

        if let Some(previous) = self.manager.insert_game(session_id, game.clone()).await {
            if previous.phase() == GamePhase::InProgress {
                warn!(
                    session_id = %session_id,
                    rounds = previous.history().len(),
                    "Replacing unfinished game"
                );
            }
        }

        info!(
            session_id = %session_id,
            record_id = %record.id,
            players = %game.roster().join(", "),
            "Game setup complete"
        );

        Ok(GameView::from(&game))
    }

    #[instrument(skip(self))]
    pub async fn current_game(&self, session_id: &str) -> Result<GameView, AppError> {
        self.manager
            .get_game(session_id)
            .await
            .map(|game| GameView::from(&game))
            .ok_or_else(|| AppError::NotFound("No game has been set up".to_string()))
    }

    /// Settles one round; a rejected round leaves the game unchanged
    #[instrument(skip(self, request), fields(winner = %request.winner))]
    pub async fn play_round(
        &self,
        session_id: &str,
        request: PlayRoundRequest,
    ) -> Result<RoundResponse, AppError> {
        let outcome = self
            .manager
            .update_game(session_id, |game| {
                let result = game.record_round(&request.winner, &request.scores)?;
                Ok::<_, ScoringError>(RoundResponse {
                    round: game.history().len(),
                    result,
                    totals: game.player_totals(),
                })
            })
            .await
            .ok_or_else(no_game)?;

        match outcome {
            Ok(response) => {
                info!(
                    session_id = %session_id,
                    round = response.round,
                    winner = %response.result.winner,
                    "Round complete"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Round rejected");
                Err(e.into())
            }
        }
    }

    /// Ends the game: persists history and totals, drops the live game,
    /// closes the session and renders the scorecard. Report failure does
    /// not fail the call.
    #[instrument(skip(self))]
    pub async fn end_game(&self, session_id: &str) -> Result<EndGameResponse, AppError> {
        let game = self
            .manager
            .update_game(session_id, |game| game.finish().cloned())
            .await
            .ok_or_else(no_game)??;

        info!(
            session_id = %session_id,
            players = game.roster().len(),
            rounds = game.history().len(),
            "Game over"
        );

        let record = self.save_final_record(session_id, &game).await?;
        self.manager.remove_game(session_id).await;
        let session = self.session_service.end_session(session_id).await?;

        let (report, report_error) = match self
            .reports
            .publish(session_id, game.roster(), game.history(), game.totals())
            .await
        {
            Ok(filename) => (Some(filename), None),
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Report generation failed");
                (None, Some(REPORT_FAILED_MESSAGE.to_string()))
            }
        };

        Ok(EndGameResponse {
            record_id: record.id,
            rounds: game.history().len(),
            totals: game.player_totals(),
            ranking: game.ranking(),
            session_duration_secs: session.duration_secs,
            report,
            report_error,
        })
    }

    /// Drops the session's in-memory game; returns whether an unfinished one was dropped
    pub async fn discard_game(&self, session_id: &str) -> bool {
        self.manager
            .remove_game(session_id)
            .await
            .is_some_and(|game| game.phase() == GamePhase::InProgress)
    }

    async fn save_final_record(
        &self,
        session_id: &str,
        game: &GameState,
    ) -> Result<GameRecordModel, AppError> {
        let existing = match game.record_id() {
            Some(record_id) => self.repository.get_record(record_id).await?,
            None => None,
        };

        match existing {
            Some(mut record) => {
                record
                    .complete(game.history(), game.totals())
                    .map_err(serialization_error)?;
                self.repository.update_record(&record).await?;
                Ok(record)
            }
            None => {
                warn!(session_id = %session_id, "Game record missing, creating it at game end");
                let mut record =
                    GameRecordModel::new(session_id, game.roster()).map_err(serialization_error)?;
                record
                    .complete(game.history(), game.totals())
                    .map_err(serialization_error)?;
                self.repository.create_record(&record).await?;
                Ok(record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::repository::InMemoryGameRecordRepository;
    use crate::geo::StaticGeoLocator;
    use crate::report::ReportStore;
    use crate::session::{
        generators::PetNameUsernameGenerator, origin::ClientOrigin,
        repository::InMemoryUserSessionRepository, token::TokenConfig,
        types::CreateSessionRequest,
    };
    use std::collections::HashMap;
    use std::path::Path;

    struct Fixture {
        service: GameService,
        manager: Arc<GameManager>,
        records: Arc<InMemoryGameRecordRepository>,
        session_id: String,
    }

    async fn fixture(report_dir: &Path) -> Fixture {
        let sessions = Arc::new(SessionService::new(
            Arc::new(InMemoryUserSessionRepository::new()),
            Arc::new(StaticGeoLocator::new()),
            Arc::new(PetNameUsernameGenerator::new()),
            TokenConfig::new("test-secret".to_string(), 1),
        ));
        let session = sessions
            .create_session(
                CreateSessionRequest::default(),
                &ClientOrigin {
                    ip: "127.0.0.1".to_string(),
                    user_agent: "test".to_string(),
                },
            )
            .await
            .unwrap();

        let records = Arc::new(InMemoryGameRecordRepository::new());
        let manager = Arc::new(GameManager::new());
        let service = GameService::new(
            Arc::clone(&manager),
            records.clone(),
            sessions,
            ReportService::new(Arc::new(ReportStore::new(report_dir.to_path_buf()))),
        );

        Fixture {
            service,
            manager,
            records,
            session_id: session.session_id,
        }
    }

    fn players(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn round(winner: &str, scores: &[(&str, f64)]) -> PlayRoundRequest {
        PlayRoundRequest {
            winner: winner.to_string(),
            scores: scores
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn test_setup_creates_record_with_start_time_only() {
        let tmp = tempfile::tempdir().unwrap();
        let f = fixture(tmp.path()).await;

        let view = f
            .service
            .setup_game(&f.session_id, &players(&["Alice", "Bob", "Carol"]))
            .await
            .unwrap();

        assert_eq!(view.phase, GamePhase::InProgress);
        let record = f
            .records
            .get_record(view.record_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.user_session_id, f.session_id);
        assert_eq!(record.player_count, 3);
        assert!(!record.is_finished());
    }

    #[tokio::test]
    async fn test_setup_rejects_duplicate_names_without_record() {
        let tmp = tempfile::tempdir().unwrap();
        let f = fixture(tmp.path()).await;

        let result = f
            .service
            .setup_game(&f.session_id, &players(&["Alice", "Alice"]))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(f.records.record_count(), 0);
        assert!(matches!(
            f.service.current_game(&f.session_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_play_round_without_game_is_conflict() {
        let tmp = tempfile::tempdir().unwrap();
        let f = fixture(tmp.path()).await;

        let result = f
            .service
            .play_round(&f.session_id, round("Alice", &[("Bob", -1.0)]))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_full_game_persists_record_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let f = fixture(tmp.path()).await;
        f.service
            .setup_game(&f.session_id, &players(&["Alice", "Bob", "Carol"]))
            .await
            .unwrap();

        let first = f
            .service
            .play_round(&f.session_id, round("Alice", &[("Bob", -3.0), ("Carol", -2.0)]))
            .await
            .unwrap();
        assert_eq!(first.round, 1);
        assert_eq!(first.result.score("Alice"), Some(5.0));

        let rejected = f
            .service
            .play_round(&f.session_id, round("Bob", &[("Alice", 1.0), ("Carol", -4.0)]))
            .await;
        assert!(matches!(rejected, Err(AppError::BadRequest(_))));

        let second = f
            .service
            .play_round(&f.session_id, round("Bob", &[("Alice", -1.0), ("Carol", -4.0)]))
            .await
            .unwrap();
        assert_eq!(second.round, 2);

        let ended = f.service.end_game(&f.session_id).await.unwrap();
        assert_eq!(ended.rounds, 2);
        let ranking: Vec<(&str, f64)> = ended
            .ranking
            .iter()
            .map(|p| (p.name.as_str(), p.total))
            .collect();
        assert_eq!(ranking, vec![("Alice", 4.0), ("Bob", 2.0), ("Carol", -6.0)]);
        assert!(ended.session_duration_secs.is_some());

        let filename = ended.report.unwrap();
        assert_eq!(filename, format!("score_report_{}.pdf", f.session_id));
        assert!(tmp.path().join(&filename).exists());

        let record = f.records.get_record(&ended.record_id).await.unwrap().unwrap();
        assert!(record.is_finished());
        assert_eq!(record.round_count(), 2);
        assert_eq!(record.top_scorer(), ("Alice".to_string(), 4.0));

        assert!(f.manager.get_game(&f.session_id).await.is_none());
        assert!(matches!(
            f.service.current_game(&f.session_id).await,
            Err(AppError::NotFound(_))
        ));

        let again = f.service.end_game(&f.session_id).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
        let late_round = f
            .service
            .play_round(&f.session_id, round("Alice", &[("Bob", -1.0), ("Carol", -1.0)]))
            .await;
        assert!(matches!(late_round, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_report_failure_still_saves_record() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("static");
        std::fs::write(&blocker, b"file, not dir").unwrap();
        let f = fixture(&blocker).await;

        f.service
            .setup_game(&f.session_id, &players(&["Solo"]))
            .await
            .unwrap();
        let ended = f.service.end_game(&f.session_id).await.unwrap();

        assert!(ended.report.is_none());
        assert_eq!(ended.report_error.as_deref(), Some(REPORT_FAILED_MESSAGE));
        let record = f.records.get_record(&ended.record_id).await.unwrap().unwrap();
        assert!(record.is_finished());
        assert!(f.manager.get_game(&f.session_id).await.is_none());
    }

    #[tokio::test]
    async fn test_overflowing_round_is_rejected_without_change() {
        let tmp = tempfile::tempdir().unwrap();
        let f = fixture(tmp.path()).await;
        f.service
            .setup_game(&f.session_id, &players(&["A", "B", "C"]))
            .await
            .unwrap();

        let result = f
            .service
            .play_round(&f.session_id, round("A", &[("B", -1e308), ("C", -1e308)]))
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let view = f.service.current_game(&f.session_id).await.unwrap();
        assert!(view.rounds.is_empty());
        assert!(view.totals.iter().all(|total| total.total == 0.0));
    }

    #[tokio::test]
    async fn test_discard_game() {
        let tmp = tempfile::tempdir().unwrap();
        let f = fixture(tmp.path()).await;

        assert!(!f.service.discard_game(&f.session_id).await);
        f.service
            .setup_game(&f.session_id, &players(&["Alice"]))
            .await
            .unwrap();
        assert!(f.service.discard_game(&f.session_id).await);
        assert!(f.service.current_game(&f.session_id).await.is_err());
    }
}

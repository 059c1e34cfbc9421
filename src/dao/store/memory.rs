//! Process-local store used when no database is configured.
//!
//! Data lives only as long as the process. Selected explicitly through
//! `store.backend = "memory"`; it is never substituted for a failing database.

use std::{cmp::Reverse, sync::Arc, time::SystemTime};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{GameEntity, GamePatch, GameRecord, MentalStateEntity, MentalStatePatch, UserEntity},
    storage::{StorageError, StorageResult},
    store::Store,
};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: DashMap<Uuid, UserEntity>,
    /// Email to user id, enforces email uniqueness.
    emails: DashMap<String, Uuid>,
    games: DashMap<Uuid, GameEntity>,
    /// Keyed by game id so a game can never own two mental states.
    mental_states: DashMap<Uuid, MentalStateEntity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, game: GameEntity) -> GameRecord {
        let mental_state = self
            .inner
            .mental_states
            .get(&game.id)
            .map(|entry| entry.value().clone());
        GameRecord { game, mental_state }
    }

    fn insert_user(&self, user: UserEntity) -> StorageResult<()> {
        match self.inner.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateKey { key: user.email }),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.inner.users.insert(user.id, user);
                Ok(())
            }
        }
    }

    fn find_user_by_email(&self, email: &str) -> Option<UserEntity> {
        let id = *self.inner.emails.get(email)?;
        self.inner.users.get(&id).map(|entry| entry.value().clone())
    }

    fn find_game(&self, id: Uuid) -> Option<GameRecord> {
        let game = self.inner.games.get(&id)?.value().clone();
        Some(self.record(game))
    }

    fn list_games(&self, user_id: Uuid) -> Vec<GameRecord> {
        let mut games = self
            .inner
            .games
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        games.sort_by_key(|game| (Reverse(game.date), Reverse(game.created_at)));

        games.into_iter().map(|game| self.record(game)).collect()
    }

    fn update_game(&self, id: Uuid, patch: &GamePatch, updated_at: SystemTime) -> Option<GameRecord> {
        let game = {
            let mut entry = self.inner.games.get_mut(&id)?;
            patch.apply(&mut entry);
            entry.updated_at = updated_at;
            entry.clone()
        };
        Some(self.record(game))
    }

    fn delete_game(&self, id: Uuid) -> bool {
        let removed = self.inner.games.remove(&id).is_some();
        self.inner.mental_states.remove(&id);
        removed
    }

    fn upsert_mental_state(&self, state: MentalStateEntity) -> Option<MentalStateEntity> {
        // The read guard blocks `delete_game` from removing the game until the write is done;
        // its cascade then removes the state.
        let _game = self.inner.games.get(&state.game_id)?;
        self.inner.mental_states.insert(state.game_id, state.clone());
        Some(state)
    }

    fn update_mental_state(
        &self,
        game_id: Uuid,
        patch: &MentalStatePatch,
        updated_at: SystemTime,
    ) -> Option<MentalStateEntity> {
        let mut entry = self.inner.mental_states.get_mut(&game_id)?;
        patch.apply(&mut entry);
        entry.updated_at = updated_at;
        Some(entry.clone())
    }
}

impl Store for InMemoryStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user) })
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_user_by_email(&email)) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_game(id)) })
    }

    fn list_games(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.list_games(user_id)) })
    }

    fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update_game(id, &patch, updated_at)) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_game(id)) })
    }

    fn upsert_mental_state(
        &self,
        state: MentalStateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<MentalStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.upsert_mental_state(state)) })
    }

    fn update_mental_state(
        &self,
        game_id: Uuid,
        patch: MentalStatePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<MentalStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update_mental_state(game_id, &patch, updated_at)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dao::models::{GameResult, HomeAway, Position};

    fn game(user_id: Uuid, days_ago: u64) -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: Uuid::new_v4(),
            user_id,
            date: now - Duration::from_secs(days_ago * 86_400),
            opponent: "Bruins".into(),
            home_away: HomeAway::Away,
            result: GameResult::Loss,
            goals: 1,
            assists: 0,
            shots: 3,
            plus_minus: -1,
            ice_time: 14.5,
            created_at: now,
            updated_at: now,
        }
    }

    fn mental_state(game_id: Uuid, confidence: u8) -> MentalStateEntity {
        let now = SystemTime::now();
        MentalStateEntity {
            id: Uuid::new_v4(),
            game_id,
            confidence,
            sleep_hours: 8.0,
            sleep_quality: 7,
            stress_level: 3,
            physical_energy: 8,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let user = UserEntity {
            id: Uuid::new_v4(),
            email: "jack@example.com".into(),
            password_hash: "hash".into(),
            name: "Jack".into(),
            team: "Wildcats".into(),
            position: Position::RightWing,
            created_at: SystemTime::now(),
        };
        Store::insert_user(&store, user.clone()).await.unwrap();

        let duplicate = UserEntity {
            id: Uuid::new_v4(),
            ..user
        };
        let err = Store::insert_user(&store, duplicate).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_list_games_is_scoped_and_sorted_by_date_desc() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let older = game(owner, 10);
        let newer = game(owner, 2);
        let foreign = game(Uuid::new_v4(), 1);
        for entity in [older.clone(), newer.clone(), foreign] {
            Store::insert_game(&store, entity).await.unwrap();
        }

        let listed = Store::list_games(&store, owner).await.unwrap();
        let ids = listed.iter().map(|record| record.game.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_delete_game_cascades_mental_state() {
        let store = InMemoryStore::new();
        let entity = game(Uuid::new_v4(), 1);
        Store::insert_game(&store, entity.clone()).await.unwrap();
        Store::upsert_mental_state(&store, mental_state(entity.id, 6))
            .await
            .unwrap();

        assert!(Store::delete_game(&store, entity.id).await.unwrap());
        assert!(Store::find_game(&store, entity.id).await.unwrap().is_none());
        assert!(store.inner.mental_states.get(&entity.id).is_none());
        assert!(!Store::delete_game(&store, entity.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_mental_state_per_game() {
        let store = InMemoryStore::new();
        let entity = game(Uuid::new_v4(), 1);
        Store::insert_game(&store, entity.clone()).await.unwrap();

        Store::upsert_mental_state(&store, mental_state(entity.id, 4))
            .await
            .unwrap();
        Store::upsert_mental_state(&store, mental_state(entity.id, 9))
            .await
            .unwrap();

        assert_eq!(store.inner.mental_states.len(), 1);
        let record = Store::find_game(&store, entity.id).await.unwrap().unwrap();
        assert_eq!(record.mental_state.map(|state| state.confidence), Some(9));
    }

    #[tokio::test]
    async fn test_upsert_without_game_writes_nothing() {
        let store = InMemoryStore::new();
        let game_id = Uuid::new_v4();

        let stored = Store::upsert_mental_state(&store, mental_state(game_id, 7))
            .await
            .unwrap();

        assert!(stored.is_none());
        assert!(store.inner.mental_states.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_upsert_racing_delete_leaves_no_orphan() {
        let store = InMemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let entity = game(Uuid::new_v4(), 1);
            Store::insert_game(&store, entity.clone()).await.unwrap();

            let writer = store.clone();
            let state = mental_state(entity.id, 5);
            handles.push(tokio::spawn(async move {
                Store::upsert_mental_state(&writer, state).await
            }));
            let deleter = store.clone();
            handles.push(tokio::spawn(async move {
                Store::delete_game(&deleter, entity.id).await.map(|_| None)
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(store.inner.games.is_empty());
        assert!(store.inner.mental_states.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_game_returns_none() {
        let store = InMemoryStore::new();
        let updated = Store::update_game(
            &store,
            Uuid::new_v4(),
            GamePatch::default(),
            SystemTime::now(),
        )
        .await
        .unwrap();
        assert!(updated.is_none());
    }
}

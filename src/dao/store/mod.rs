pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    GameEntity, GamePatch, GameRecord, MentalStateEntity, MentalStatePatch, UserEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for users, games and mental states.
///
/// Implementations must cascade game deletion to the linked mental state and keep at most
/// one mental state per game.
pub trait Store: Send + Sync {
    /// Insert a new user, failing with [`StorageError::DuplicateKey`](crate::dao::storage::StorageError::DuplicateKey)
    /// when the email is already registered.
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameRecord>>>;
    /// Games owned by `user_id`, most recent first.
    fn list_games(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>>;
    /// Apply a partial update; `Ok(None)` when the game vanished in the meantime.
    fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameRecord>>>;
    /// Delete a game and its mental state; `Ok(false)` when nothing was deleted.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Create or fully replace the mental state keyed by `state.game_id`.
    ///
    /// Returns the stored state, or `Ok(None)` without writing anything when the game does
    /// not exist. A game deleted concurrently never keeps a mental state.
    fn upsert_mental_state(
        &self,
        state: MentalStateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<MentalStateEntity>>>;
    fn update_mental_state(
        &self,
        game_id: Uuid,
        patch: MentalStatePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<MentalStateEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

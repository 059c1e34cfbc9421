use std::{collections::HashMap, sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, DateTime, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use tracing::warn;
use uuid::Uuid;

use super::{
    connection::{MongoConfig, establish_connection},
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{MongoGameDocument, MongoMentalStateDocument, MongoUserDocument, doc_id, game_ref},
};
use crate::dao::{
    models::{GameEntity, GamePatch, GameRecord, MentalStateEntity, MentalStatePatch, UserEntity},
    storage::StorageResult,
    store::Store,
};

const USER_COLLECTION_NAME: &str = "users";
const GAME_COLLECTION_NAME: &str = "games";
const MENTAL_STATE_COLLECTION_NAME: &str = "mental_states";

#[derive(Clone)]
pub struct MongoStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: Database,
}

impl MongoStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config).await?;

        let store = Self {
            inner: Arc::new(MongoInner { database }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        self.create_index(USER_COLLECTION_NAME, "email", doc! {"email": 1}, true)
            .await?;
        self.create_index(
            GAME_COLLECTION_NAME,
            "user_id,date",
            doc! {"user_id": 1, "date": -1},
            false,
        )
        .await?;
        self.create_index(
            MENTAL_STATE_COLLECTION_NAME,
            "game_id",
            doc! {"game_id": 1},
            true,
        )
        .await
    }

    async fn create_index(
        &self,
        collection: &'static str,
        index: &'static str,
        keys: Document,
        unique: bool,
    ) -> MongoResult<()> {
        let model = IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .name(Some(format!("{collection}_{index}_idx")))
                    .unique(Some(unique))
                    .build(),
            )
            .build();

        self.inner
            .database
            .collection::<Document>(collection)
            .create_index(model)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection,
                index,
                source,
            })?;
        Ok(())
    }

    fn users(&self) -> Collection<MongoUserDocument> {
        self.inner.database.collection(USER_COLLECTION_NAME)
    }

    fn games(&self) -> Collection<MongoGameDocument> {
        self.inner.database.collection(GAME_COLLECTION_NAME)
    }

    fn mental_states(&self) -> Collection<MongoMentalStateDocument> {
        self.inner.database.collection(MENTAL_STATE_COLLECTION_NAME)
    }

    async fn ping(&self) -> MongoResult<()> {
        self.inner
            .database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn insert_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id;
        let email = user.email.clone();
        let document: MongoUserDocument = user.into();
        self.users()
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateKey { key: email, source }
                } else {
                    MongoDaoError::SaveUser { id, source }
                }
            })?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .find_one(doc! {"email": email})
            .await
            .map_err(|source| MongoDaoError::LoadUser { source })?;

        document.map(UserEntity::try_from).transpose()
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.games()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(())
    }

    async fn find_mental_state(&self, game_id: Uuid) -> MongoResult<Option<MentalStateEntity>> {
        let document = self
            .mental_states()
            .find_one(game_ref(game_id))
            .await
            .map_err(|source| MongoDaoError::LoadMentalState { source })?;

        document.map(MentalStateEntity::try_from).transpose()
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameRecord>> {
        let document = self
            .games()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        let Some(document) = document else {
            return Ok(None);
        };

        let game = GameEntity::try_from(document)?;
        let mental_state = self.find_mental_state(id).await?;
        Ok(Some(GameRecord { game, mental_state }))
    }

    async fn list_games(&self, user_id: Uuid) -> MongoResult<Vec<GameRecord>> {
        let documents: Vec<MongoGameDocument> = self
            .games()
            .find(doc! {"user_id": user_id.to_string()})
            .sort(doc! {"date": -1, "created_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListGames { user_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { user_id, source })?;

        let game_ids = documents
            .iter()
            .map(|document| document.id.clone())
            .collect::<Vec<_>>();

        let mental_documents: Vec<MongoMentalStateDocument> = self
            .mental_states()
            .find(doc! {"game_id": {"$in": game_ids}})
            .await
            .map_err(|source| MongoDaoError::LoadMentalState { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadMentalState { source })?;

        let mut mental_states = HashMap::with_capacity(mental_documents.len());
        for document in mental_documents {
            let state = MentalStateEntity::try_from(document)?;
            mental_states.insert(state.game_id, state);
        }

        documents
            .into_iter()
            .map(|document| {
                let game = GameEntity::try_from(document)?;
                let mental_state = mental_states.remove(&game.id);
                Ok(GameRecord { game, mental_state })
            })
            .collect()
    }

    async fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> MongoResult<Option<GameRecord>> {
        let document = self
            .games()
            .find_one_and_update(doc_id(id), game_update(&patch, updated_at))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        let Some(document) = document else {
            return Ok(None);
        };

        let game = GameEntity::try_from(document)?;
        let mental_state = self.find_mental_state(id).await?;
        Ok(Some(GameRecord { game, mental_state }))
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        // Mental state first: a failure afterwards leaves a game without a check-in, never
        // a check-in without a game.
        self.delete_mental_state(id).await?;

        let result = self
            .games()
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;

        // An upsert that landed between the two deletes saw the game and wrote its state.
        if let Err(err) = self.delete_mental_state(id).await {
            warn!(game_id = %id, error = %err, "failed to sweep mental state of deleted game");
        }

        Ok(result.deleted_count > 0)
    }

    async fn delete_mental_state(&self, game_id: Uuid) -> MongoResult<()> {
        self.mental_states()
            .delete_one(game_ref(game_id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame {
                id: game_id,
                source,
            })?;
        Ok(())
    }

    async fn game_exists(&self, id: Uuid) -> MongoResult<bool> {
        let count = self
            .games()
            .count_documents(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;
        Ok(count > 0)
    }

    async fn upsert_mental_state(
        &self,
        state: MentalStateEntity,
    ) -> MongoResult<Option<MentalStateEntity>> {
        let game_id = state.game_id;
        if !self.game_exists(game_id).await? {
            return Ok(None);
        }

        let update = mental_state_upsert(&state);
        let mut attempt = self
            .mental_states()
            .update_one(game_ref(game_id), update.clone())
            .upsert(true)
            .await;
        // Two first check-ins racing on the unique game_id index: the loser matches the
        // winner's document on retry and overwrites its fields.
        if matches!(&attempt, Err(source) if is_duplicate_key(source)) {
            attempt = self
                .mental_states()
                .update_one(game_ref(game_id), update)
                .upsert(true)
                .await;
        }
        attempt.map_err(|source| MongoDaoError::SaveMentalState { game_id, source })?;

        if !self.game_exists(game_id).await? {
            self.delete_mental_state(game_id).await?;
            return Ok(None);
        }
        self.find_mental_state(game_id).await
    }

    async fn update_mental_state(
        &self,
        game_id: Uuid,
        patch: MentalStatePatch,
        updated_at: SystemTime,
    ) -> MongoResult<Option<MentalStateEntity>> {
        let document = self
            .mental_states()
            .find_one_and_update(game_ref(game_id), mental_state_update(&patch, updated_at))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::SaveMentalState { game_id, source })?;

        document.map(MentalStateEntity::try_from).transpose()
    }
}

/// `$set` document touching only the patched game fields.
fn game_update(patch: &GamePatch, updated_at: SystemTime) -> Document {
    let mut set = doc! {"updated_at": DateTime::from_system_time(updated_at)};
    if let Some(date) = patch.date {
        set.insert("date", DateTime::from_system_time(date));
    }
    if let Some(opponent) = &patch.opponent {
        set.insert("opponent", opponent.as_str());
    }
    if let Some(home_away) = patch.home_away {
        set.insert("home_away", home_away.as_str());
    }
    if let Some(result) = patch.result {
        set.insert("result", result.as_str());
    }
    if let Some(goals) = patch.goals {
        set.insert("goals", i64::from(goals));
    }
    if let Some(assists) = patch.assists {
        set.insert("assists", i64::from(assists));
    }
    if let Some(shots) = patch.shots {
        set.insert("shots", i64::from(shots));
    }
    if let Some(plus_minus) = patch.plus_minus {
        set.insert("plus_minus", plus_minus);
    }
    if let Some(ice_time) = patch.ice_time {
        set.insert("ice_time", ice_time);
    }
    doc! {"$set": set}
}

/// Create-or-replace update: every field is overwritten, while the id and creation time
/// are only written when the document is inserted.
fn mental_state_upsert(state: &MentalStateEntity) -> Document {
    let patch = MentalStatePatch {
        confidence: Some(state.confidence),
        sleep_hours: Some(state.sleep_hours),
        sleep_quality: Some(state.sleep_quality),
        stress_level: Some(state.stress_level),
        physical_energy: Some(state.physical_energy),
        notes: Some(state.notes.clone()),
    };
    let mut update = mental_state_update(&patch, state.updated_at);
    update.insert(
        "$setOnInsert",
        doc! {
            "_id": state.id.to_string(),
            "created_at": DateTime::from_system_time(state.created_at),
        },
    );
    update
}

/// `$set` document touching only the patched mental state fields.
fn mental_state_update(patch: &MentalStatePatch, updated_at: SystemTime) -> Document {
    let mut set = doc! {"updated_at": DateTime::from_system_time(updated_at)};
    if let Some(confidence) = patch.confidence {
        set.insert("confidence", i32::from(confidence));
    }
    if let Some(sleep_hours) = patch.sleep_hours {
        set.insert("sleep_hours", sleep_hours);
    }
    if let Some(sleep_quality) = patch.sleep_quality {
        set.insert("sleep_quality", i32::from(sleep_quality));
    }
    if let Some(stress_level) = patch.stress_level {
        set.insert("stress_level", i32::from(stress_level));
    }
    if let Some(physical_energy) = patch.physical_energy {
        set.insert("physical_energy", i32::from(physical_energy));
    }
    if let Some(notes) = &patch.notes {
        let value = match notes {
            Some(text) => Bson::String(text.clone()),
            None => Bson::Null,
        };
        set.insert("notes", value);
    }
    doc! {"$set": set}
}

impl Store for MongoStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await.map_err(Into::into) })
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user_by_email(email).await.map_err(Into::into) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(user_id).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, patch, updated_at)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn upsert_mental_state(
        &self,
        state: MentalStateEntity,
    ) -> BoxFuture<'static, StorageResult<Option<MentalStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_mental_state(state).await.map_err(Into::into) })
    }

    fn update_mental_state(
        &self,
        game_id: Uuid,
        patch: MentalStatePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<MentalStateEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_mental_state(game_id, patch, updated_at)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

use std::sync::Arc;

use crate::{
    auth::{AuthProvider, JwtAuthProvider},
    dao::store::Store,
};

pub type SharedState = Arc<AppState>;

/// Central application state: the persistence backend and the authentication setup.
pub struct AppState {
    store: Arc<dyn Store>,
    auth: Arc<dyn AuthProvider>,
    tokens: JwtAuthProvider,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// `auth` authenticates requests; `tokens` signs the tokens handed out at login. They are
    /// the same provider unless development authentication is enabled.
    pub fn new(
        store: Arc<dyn Store>,
        auth: Arc<dyn AuthProvider>,
        tokens: JwtAuthProvider,
    ) -> SharedState {
        Arc::new(Self {
            store,
            auth,
            tokens,
        })
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn tokens(&self) -> &JwtAuthProvider {
        &self.tokens
    }
}

//! Shared handler state

use std::sync::Arc;

use crate::layout::LayoutLimits;
use crate::query::QueryCompiler;
use crate::store::{Store, StoreResult};

use super::errors::{ApiError, ApiResult};

/// State shared by the flight and seat handlers
pub struct BookingState {
    pub store: Arc<Store>,
    pub compiler: QueryCompiler,
    pub limits: LayoutLimits,
}

impl BookingState {
    pub fn new(store: Store, compiler: QueryCompiler, limits: LayoutLimits) -> Self {
        Self {
            store: Arc::new(store),
            compiler,
            limits,
        }
    }

    /// Fresh in-memory store with default limits
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::new(
            Store::open_in_memory()?,
            QueryCompiler::default(),
            LayoutLimits::default(),
        ))
    }

    /// Run a store operation on the blocking pool.
    pub async fn run<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?
            .map_err(ApiError::from)
    }
}

//! Background catalog loading.
//!
//! A load runs on its own task. Dropping the [`LoadHandle`] before it resolves
//! aborts the task, so a view that goes away never receives a late catalog.

use std::sync::Arc;
use std::time::Instant;

use parcel_core::catalog::Catalog;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::source::ProductSource;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] ClientError),
    #[error("catalog load was cancelled")]
    Cancelled,
    #[error("catalog load task failed: {0}")]
    Failed(String),
}

pub struct CatalogLoader;

impl CatalogLoader {
    pub fn spawn<S>(source: Arc<S>) -> LoadHandle
    where
        S: ProductSource + ?Sized + 'static,
    {
        let task = tokio::spawn(async move { load(source.as_ref()).await });
        LoadHandle { task }
    }
}

/// Fetches products and categories together.
pub async fn load<S>(source: &S) -> Result<Catalog, ClientError>
where
    S: ProductSource + ?Sized,
{
    let started = Instant::now();
    let outcome = tokio::try_join!(source.products(), source.categories());

    match outcome {
        Ok((products, categories)) => {
            info!(
                event_name = "catalog.load.completed",
                products = products.len(),
                categories = categories.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "catalog loaded"
            );
            Ok(Catalog::new(products, categories))
        }
        Err(error) => {
            warn!(
                event_name = "catalog.load.failed",
                error = %error,
                "catalog load failed"
            );
            Err(error)
        }
    }
}

#[derive(Debug)]
pub struct LoadHandle {
    task: JoinHandle<Result<Catalog, ClientError>>,
}

impl LoadHandle {
    pub async fn join(mut self) -> Result<Catalog, LoadError> {
        match (&mut self.task).await {
            Ok(result) => result.map_err(LoadError::from),
            Err(error) if error.is_cancelled() => Err(LoadError::Cancelled),
            Err(error) => Err(LoadError::Failed(error.to_string())),
        }
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

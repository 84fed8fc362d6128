//! Process-wide store registry.
//!
//! Git stores and base paths are registered per namespace. Configs name the
//! namespace they belong to; the loader looks the store up when resolving
//! the document path.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use crate::{
    error::{Error, Result},
    loader::validate_path,
};

mod command;
mod git;

pub use git::{GitConfig, GitOperator};

static STORES: LazyLock<RwLock<HashMap<String, Arc<GitOperator>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

static BASE_PATHS: LazyLock<RwLock<HashMap<String, PathBuf>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register a git store under `namespace`.
///
/// Fails if the namespace already has a store or the configuration is
/// invalid. Nothing is cloned until the first sync.
pub fn register_store(namespace: &str, config: GitConfig) -> Result<Arc<GitOperator>> {
    let mut stores = STORES.write().unwrap_or_else(PoisonError::into_inner);
    if stores.contains_key(namespace) {
        return Err(Error::DuplicateNamespace(namespace.to_string()));
    }
    let operator = Arc::new(GitOperator::new(namespace, config)?);
    stores.insert(namespace.to_string(), operator.clone());
    debug!("registered store `{namespace}`");
    Ok(operator)
}

/// The store registered under `namespace`.
pub fn fetch_store(namespace: &str) -> Option<Arc<GitOperator>> {
    STORES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(namespace)
        .cloned()
}

/// Remove a store and stop its background worker.
pub fn unregister_store(namespace: &str) -> Option<Arc<GitOperator>> {
    let removed = STORES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(namespace);
    if let Some(operator) = &removed {
        operator.shutdown();
    }
    removed
}

/// Prefix the document paths of configs in `namespace` with `path`.
pub fn set_base_path(namespace: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    validate_path(&path.to_string_lossy())?;
    BASE_PATHS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(namespace.to_string(), path.to_path_buf());
    Ok(())
}

pub fn base_path(namespace: &str) -> Option<PathBuf> {
    BASE_PATHS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(namespace)
        .cloned()
}

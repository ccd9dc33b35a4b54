//! Logged-in user cache.
//!
//! The file cache holds one JSON document. A missing file means nobody is
//! logged in.

use crate::environment::UserCache;
use crate::types::User;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// User cache failures
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed
    #[error("user cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The cache file is not a valid user document
    #[error("user cache is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// User cache backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileUserCache {
    path: PathBuf,
}

impl FileUserCache {
    /// Cache stored at `path`; parent directories are created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserCache for FileUserCache {
    fn load(&self) -> Result<Option<User>, CacheError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn store(&self, user: &User) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(user)?)?;
        tracing::debug!(path = %self.path.display(), "Cached user");
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// User cache that lives only as long as the process
#[derive(Debug, Default)]
pub struct InMemoryUserCache {
    user: Mutex<Option<User>>,
}

impl InMemoryUserCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that starts with `user` logged in
    #[must_use]
    pub fn with_user(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }
}

impl UserCache for InMemoryUserCache {
    fn load(&self) -> Result<Option<User>, CacheError> {
        Ok(self.user.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, user: &User) -> Result<(), CacheError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Role, UserId};

    fn user() -> User {
        User {
            id: UserId::new(2),
            name: "Usuario Demo".into(),
            email: "demo@cine.com".into(),
            role: Role::User,
        }
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("boxoffice-cache-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn file_cache_round_trip_and_clear() {
        let cache = FileUserCache::new(scratch_path("user.json"));
        assert!(cache.load().unwrap().is_none());

        cache.store(&user()).unwrap();
        assert_eq!(cache.load().unwrap(), Some(user()));

        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
        // Clearing twice is fine
        cache.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch_path("user.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let cache = FileUserCache::new(&path);
        assert!(matches!(cache.load(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn in_memory_cache() {
        let cache = InMemoryUserCache::with_user(user());
        assert_eq!(cache.load().unwrap(), Some(user()));
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
    }
}

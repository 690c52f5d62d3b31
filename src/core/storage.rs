//! Key-value persistence abstraction for serialized profiles

use anyhow::Result;

/// A string key-value store. Implementations must be usable through a shared
/// reference; callers serialize access to a single profile themselves.
pub trait ProfileStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: ProfileStore + ?Sized> ProfileStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

impl<T: ProfileStore + ?Sized> ProfileStore for &T {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Platform-wide settings read by the course policy layer.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfigInner {
    /// Usernames that administer every course.
    pub superadmins: Vec<String>,
    pub database: DatabaseConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into every course.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(flatten, default)]
    inner: Arc<PlatformConfigInner>,
}

impl PlatformConfig {
    /// Wraps already-built settings.
    #[must_use]
    pub fn new(inner: PlatformConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Shorthand for a configuration that only sets the super-administrators.
    #[must_use]
    pub fn with_superadmins<I, S>(superadmins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(PlatformConfigInner {
            superadmins: superadmins.into_iter().map(Into::into).collect(),
            ..PlatformConfigInner::default()
        })
    }
}

impl Deref for PlatformConfig {
    type Target = PlatformConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PlatformConfig {
    fn deref_mut(&mut self) -> &mut PlatformConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// `SurrealDB` root credentials (optional when using unauthenticated engines like mem://).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "lyceum".to_owned(),
            database: "courses".to_owned(),
            credentials: None,
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

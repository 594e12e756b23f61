//! Logging setup and runtime level control.
//!
//! All diagnostics go to stderr; stdout carries protocol traffic only.
//! The active level lives in a [`LogControl`] that is created once by the
//! binary and handed to the server, so `logging/setLevel` has a single
//! mutation point and no global state beyond the installed subscriber.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer as _, Registry};

use crate::error::LoggingError;

type ReloadHandle = reload::Handle<LevelFilter, Registry>;

/// Handle to the process log level.
#[derive(Clone)]
pub struct LogControl {
    inner: Arc<Inner>,
}

struct Inner {
    handle: Option<ReloadHandle>,
    current: RwLock<LevelFilter>,
}

impl std::fmt::Debug for LogControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogControl")
            .field("level", &self.level())
            .field("installed", &self.inner.handle.is_some())
            .finish()
    }
}

impl LogControl {
    /// Installs the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` directives still apply on top of `level`, which acts as
    /// the reloadable ceiling.
    #[must_use]
    pub fn install(level: LevelFilter) -> Self {
        let (filter, handle) = reload::Layer::new(level);
        let env_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::TRACE.into())
            .from_env_lossy();

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .init();

        Self::with_handle(Some(handle), level)
    }

    /// A control with no subscriber behind it. Level changes are recorded
    /// but affect nothing; used by tests and embedders that manage tracing
    /// themselves.
    #[must_use]
    pub fn detached(level: LevelFilter) -> Self {
        Self::with_handle(None, level)
    }

    fn with_handle(handle: Option<ReloadHandle>, level: LevelFilter) -> Self {
        Self {
            inner: Arc::new(Inner {
                handle,
                current: RwLock::new(level),
            }),
        }
    }

    /// Returns the active level.
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        *self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Changes the active level.
    ///
    /// # Errors
    ///
    /// Returns an error if the installed subscriber has gone away.
    pub fn set_level(&self, level: LevelFilter) -> Result<(), LoggingError> {
        if let Some(handle) = &self.inner.handle {
            handle.reload(level)?;
        }
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = level;
        Ok(())
    }
}

impl Default for LogControl {
    fn default() -> Self {
        Self::detached(LevelFilter::INFO)
    }
}

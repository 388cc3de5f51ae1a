//! Application state management

use std::sync::Arc;

use crate::chat::CompletionProvider;
use crate::config::Config;
use crate::storage::FileLibrary;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    library: FileLibrary,
    completions: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(
        config: Config,
        library: FileLibrary,
        completions: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                library,
                completions,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the PDF storage
    pub fn library(&self) -> &FileLibrary {
        &self.inner.library
    }

    /// Get the completion provider
    pub fn completions(&self) -> &Arc<dyn CompletionProvider> {
        &self.inner.completions
    }
}

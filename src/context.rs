//! Engine context assembly.
//!
//! The context is the launcher's handle to the engine's shared subsystems:
//! it carries the injected-bundle path, the three storage directories, the
//! cookie manager, and the sending half of the bundle message channel. It is
//! built exactly once, from an immutable [`ContextConfiguration`], and
//! released exactly once after the run loop returns.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use tracing::{debug, info, warn};

use crate::session::{ReleaseProbe, mark_released};

// ─────────────────────────────────────────────────────────────────────────────
// Injected bundle messaging
// ─────────────────────────────────────────────────────────────────────────────

/// Message posted to the injected bundle living in the engine's content
/// process. Fire-and-forget; no reply channel exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMessage {
    pub name: String,
    pub body: Vec<String>,
}

/// Sending half of the bundle message channel. Cloned into every page
/// created under the owning context.
#[derive(Clone)]
pub struct BundleSender {
    tx: mpsc::Sender<BundleMessage>,
}

impl BundleSender {
    /// Posts a message toward the bundle. A vanished endpoint (content
    /// process gone) is logged and otherwise ignored.
    pub fn post(&self, message: BundleMessage) {
        if self.tx.send(message).is_err() {
            warn!("Extrémité bundle disparue — message abandonné");
        }
    }
}

/// Receiving half of the bundle message channel — where the engine's content
/// process would pick messages up.
pub struct BundleEndpoint {
    rx: mpsc::Receiver<BundleMessage>,
}

impl BundleEndpoint {
    /// Takes the next pending message, if any. Non-blocking.
    pub fn try_recv(&self) -> Option<BundleMessage> {
        self.rx.try_recv().ok()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable configuration the context is constructed from: bundle path plus
/// the three provisioned storage directories.
#[derive(Debug, Clone, Default)]
pub struct ContextConfiguration {
    injected_bundle_path: PathBuf,
    local_storage_directory: PathBuf,
    disk_cache_directory: PathBuf,
    indexed_db_directory: PathBuf,
}

impl ContextConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn injected_bundle_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.injected_bundle_path = path.into();
        self
    }

    pub fn local_storage_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_storage_directory = path.into();
        self
    }

    pub fn disk_cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_cache_directory = path.into();
        self
    }

    pub fn indexed_db_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.indexed_db_directory = path.into();
        self
    }

    pub fn bundle_path(&self) -> &Path {
        &self.injected_bundle_path
    }

    pub fn local_storage_dir(&self) -> &Path {
        &self.local_storage_directory
    }

    pub fn disk_cache_dir(&self) -> &Path {
        &self.disk_cache_directory
    }

    pub fn indexed_db_dir(&self) -> &Path {
        &self.indexed_db_directory
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cookie manager
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk format of the persistent cookie store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieStorageType {
    /// File-backed relational store (SQLite-compatible), owned by the engine.
    Sqlite,
    /// Legacy plain-text store.
    Text,
}

/// The context's cookie store handle. Without a registered persistent
/// storage, cookies live in memory inside the engine and die with the run.
#[derive(Debug, Default)]
pub struct CookieManager {
    persistent_storage: Option<(PathBuf, CookieStorageType)>,
}

impl CookieManager {
    /// Registers a persistent cookie store at `path`.
    pub fn set_persistent_storage(&mut self, path: impl Into<PathBuf>, kind: CookieStorageType) {
        let path = path.into();
        info!(path = %path.display(), ?kind, "Stockage persistant des cookies activé");
        self.persistent_storage = Some((path, kind));
    }

    pub fn persistent_storage(&self) -> Option<(&Path, CookieStorageType)> {
        self.persistent_storage
            .as_ref()
            .map(|(path, kind)| (path.as_path(), *kind))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine context
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to the engine's shared subsystems. Exactly one per process.
pub struct EngineContext {
    configuration: ContextConfiguration,
    cookie_manager: CookieManager,
    bundle_tx: BundleSender,
    probe: Option<ReleaseProbe>,
}

impl EngineContext {
    /// One-shot context construction. Also returns the bundle endpoint —
    /// the receiving side of the injected-bundle message channel.
    pub fn new(configuration: ContextConfiguration) -> (Self, BundleEndpoint) {
        let (tx, rx) = mpsc::channel();
        debug!(
            bundle = %configuration.injected_bundle_path.display(),
            local_storage = %configuration.local_storage_directory.display(),
            disk_cache = %configuration.disk_cache_directory.display(),
            indexed_db = %configuration.indexed_db_directory.display(),
            "Contexte moteur construit"
        );
        (
            Self {
                configuration,
                cookie_manager: CookieManager::default(),
                bundle_tx: BundleSender { tx },
                probe: None,
            },
            BundleEndpoint { rx },
        )
    }

    pub fn configuration(&self) -> &ContextConfiguration {
        &self.configuration
    }

    pub fn cookie_manager(&self) -> &CookieManager {
        &self.cookie_manager
    }

    pub fn cookie_manager_mut(&mut self) -> &mut CookieManager {
        &mut self.cookie_manager
    }

    /// Sending half of the bundle channel, cloned into pages created under
    /// this context.
    pub(crate) fn bundle_sender(&self) -> BundleSender {
        self.bundle_tx.clone()
    }

    #[cfg(test)]
    pub(crate) fn attach_release_probe(&mut self, probe: ReleaseProbe) {
        self.probe = Some(probe);
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        mark_released(&self.probe, "context");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_message_travels_to_endpoint() {
        let (context, endpoint) = EngineContext::new(ContextConfiguration::new());
        let sender = context.bundle_sender();
        sender.post(BundleMessage {
            name: "Hello".to_string(),
            body: vec!["Test1".to_string()],
        });
        let received = endpoint.try_recv().unwrap();
        assert_eq!(received.name, "Hello");
        assert_eq!(received.body, vec!["Test1"]);
    }

    #[test]
    fn test_post_with_endpoint_gone_does_not_panic() {
        let (context, endpoint) = EngineContext::new(ContextConfiguration::new());
        let sender = context.bundle_sender();
        drop(endpoint);
        sender.post(BundleMessage {
            name: "Hello".to_string(),
            body: vec![],
        });
    }

    #[test]
    fn test_cookie_manager_defaults_to_in_memory() {
        let (context, _endpoint) = EngineContext::new(ContextConfiguration::new());
        assert!(context.cookie_manager().persistent_storage().is_none());
    }

    #[test]
    fn test_cookie_persistent_storage_registration() {
        let (mut context, _endpoint) = EngineContext::new(ContextConfiguration::new());
        context
            .cookie_manager_mut()
            .set_persistent_storage("/tmp/cookies.db", CookieStorageType::Sqlite);
        let (path, kind) = context.cookie_manager().persistent_storage().unwrap();
        assert_eq!(path, Path::new("/tmp/cookies.db"));
        assert_eq!(kind, CookieStorageType::Sqlite);
    }
}

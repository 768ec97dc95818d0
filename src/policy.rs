//! Navigation policy types.
//!
//! The engine asks the launcher for a verdict before committing a pending
//! navigation action or response. The verdict travels back through a
//! [`PolicyListener`], which is consumed by value: the type system enforces
//! that every listener is resolved exactly once. An unresolved listener would
//! hang the load on the engine side, so dropping one without a decision is
//! logged as a defect (and resolved as a deny, the safe direction).

use std::sync::mpsc;

use tracing::warn;
use url::Url;

/// Verdict on a pending navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Let the engine proceed with the navigation.
    Allow,
    /// Abandon the navigation (the engine discards the load).
    Ignore,
}

/// A pending navigation action (link click, redirect, script navigation).
#[derive(Debug, Clone)]
pub struct NavigationAction {
    /// URL the page is about to navigate to.
    pub request_url: Url,
}

/// A received navigation response, pending a display decision.
#[derive(Debug, Clone)]
pub struct NavigationResponse {
    /// URL the response was received for.
    pub request_url: Url,
    /// Content type declared by the response.
    pub mime_type: String,
    /// Whether the engine is able to render this content type.
    /// Renderability is the engine's call; the launcher only reads it.
    pub can_show_mime_type: bool,
}

/// One-shot reply channel carrying a [`PolicyDecision`] back to the engine.
pub struct PolicyListener {
    reply: mpsc::Sender<PolicyDecision>,
    resolved: bool,
}

impl PolicyListener {
    /// Creates a listener and the receiving end the engine side waits on.
    pub fn new() -> (Self, mpsc::Receiver<PolicyDecision>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                reply: tx,
                resolved: false,
            },
            rx,
        )
    }

    /// Resolves the pending navigation as allowed.
    pub fn allow(mut self) {
        self.resolve(PolicyDecision::Allow);
    }

    /// Resolves the pending navigation as ignored.
    pub fn ignore(mut self) {
        self.resolve(PolicyDecision::Ignore);
    }

    fn resolve(&mut self, decision: PolicyDecision) {
        // The engine side may already be gone (process crashed); the verdict
        // is then moot and the send failure is ignored.
        let _ = self.reply.send(decision);
        self.resolved = true;
    }
}

impl Drop for PolicyListener {
    fn drop(&mut self) {
        if !self.resolved {
            warn!("Listener de navigation relâché sans verdict — le chargement resterait suspendu");
            let _ = self.reply.send(PolicyDecision::Ignore);
        }
    }
}

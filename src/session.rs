//! Assemblage de la session et démontage ordonné.
//!
//! La session est l'unique agrégat à longue durée de vie du launcher : un
//! exemplaire de chaque objet moteur, possédé en propriété exclusive par
//! `main` pour toute la vie du processus. L'assemblage est strictement
//! linéaire — provisionner les répertoires, construire la configuration puis
//! le contexte, le groupe et ses préférences, la configuration de page, la
//! vue — sans reprise sur échec : toute erreur est fatale.
//!
//! ## Ordre de relâchement
//!
//! Les champs de [`Session`] sont déclarés dans l'ordre de démontage
//! historique (vue → configuration de page → groupe → contexte →
//! préférences) ; Rust relâche les champs dans l'ordre de déclaration, ce qui
//! reproduit la séquence inverse d'acquisition de l'original.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing::debug;

use crate::config::{Config, EnvToggles};
use crate::context::{
    BundleEndpoint, BundleSender, ContextConfiguration, CookieStorageType, EngineContext,
};
use crate::paths;
use crate::view::{PageConfiguration, PageGroup, Preferences, View};

/// Journal partagé des relâchements, utilisé par les tests de démontage.
pub(crate) type ReleaseProbe = Rc<RefCell<Vec<&'static str>>>;

#[cfg(test)]
pub(crate) fn new_release_recorder() -> ReleaseProbe {
    Rc::new(RefCell::new(Vec::new()))
}

/// Trace le relâchement d'un objet moteur et l'enregistre si un probe est
/// attaché.
pub(crate) fn mark_released(probe: &Option<ReleaseProbe>, kind: &'static str) {
    debug!(object = kind, "Objet moteur relâché");
    if let Some(probe) = probe {
        probe.borrow_mut().push(kind);
    }
}

/// L'agrégat session : un exemplaire de chaque objet moteur, champs déclarés
/// dans l'ordre de relâchement.
pub struct Session {
    view: View,
    page_configuration: PageConfiguration,
    page_group: PageGroup,
    context: EngineContext,
    preferences: Preferences,
}

impl Session {
    /// Assemblage one-shot de la session. Ordre identique à l'original :
    /// répertoires, configuration de contexte, contexte, groupe +
    /// préférences, configuration de page, cookies (optionnel), vue.
    #[allow(clippy::field_reassign_with_default)]
    pub fn assemble(config: &Config, toggles: &EnvToggles) -> io::Result<(Self, BundleEndpoint)> {
        // ── 1. Provisionner les répertoires de stockage (0700) ─────────
        let cache_root = paths::user_cache_dir();
        let namespace = config.storage.cache_namespace.as_str();
        let local_storage =
            paths::provision_dir(0o700, [cache_root.as_path(), namespace.as_ref(), "local-storage".as_ref()])?;
        let disk_cache =
            paths::provision_dir(0o700, [cache_root.as_path(), namespace.as_ref(), "disk-cache".as_ref()])?;
        let indexed_db =
            paths::provision_dir(0o700, [cache_root.as_path(), namespace.as_ref(), "index-db".as_ref()])?;

        // ── 2. Configuration de contexte, puis contexte ────────────────
        let context_configuration = ContextConfiguration::new()
            .injected_bundle_path(config.bundle.injected_bundle_path.as_str())
            .local_storage_directory(local_storage)
            .disk_cache_directory(disk_cache)
            .indexed_db_directory(indexed_db);
        let (mut context, bundle_endpoint) = EngineContext::new(context_configuration);

        // ── 3. Groupe de pages et préférences ──────────────────────────
        let mut page_group = PageGroup::new(config.general.page_group.as_str());

        let mut preferences = Preferences::default();
        preferences.allow_running_of_insecure_content = config.preferences.allow_insecure_content;
        preferences.allow_display_of_insecure_content = config.preferences.allow_insecure_content;
        preferences.web_security_enabled = config.preferences.web_security;
        preferences.logs_page_messages_to_system_console = !toggles.disable_console_log;
        preferences.fullscreen_enabled = config.preferences.fullscreen;
        page_group.set_preferences(&preferences);

        // ── 4. Configuration de page ───────────────────────────────────
        let mut page_configuration = PageConfiguration::new();
        page_configuration.set_context(&context);
        page_configuration.set_page_group(&page_group);

        // ── 5. Stockage persistant des cookies (sur bascule) ───────────
        if toggles.cookie_storage {
            context
                .cookie_manager_mut()
                .set_persistent_storage(paths::cookie_database_path(), CookieStorageType::Sqlite);
        }

        // ── 6. Vue ─────────────────────────────────────────────────────
        let view = View::new(&page_configuration)?;

        Ok((
            Self {
                view,
                page_configuration,
                page_group,
                context,
                preferences,
            },
            bundle_endpoint,
        ))
    }

    /// Charge l'URL initiale dans la page de la vue.
    pub fn load_url(&mut self, url: &str) -> Result<(), url::ParseError> {
        self.view.page_mut().load_url(url)
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Émetteur bundle de la page, pour la table de callbacks.
    pub fn bundle_sender(&self) -> BundleSender {
        self.view.page().bundle_sender()
    }

    /// Attache un journal de relâchement aux cinq objets de la session.
    #[cfg(test)]
    pub(crate) fn attach_release_probes(&mut self, probe: &ReleaseProbe) {
        self.view.attach_release_probe(probe.clone());
        self.page_configuration.attach_release_probe(probe.clone());
        self.page_group.attach_release_probe(probe.clone());
        self.context.attach_release_probe(probe.clone());
        self.preferences.attach_release_probe(probe.clone());
    }
}

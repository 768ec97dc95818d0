//! Assemblage de la vue : préférences, groupe de pages, configuration de
//! page, vue.
//!
//! Reproduit la chaîne d'objets que le moteur attend avant de créer une vue :
//!
//! ```text
//! Preferences → PageGroup → PageConfiguration (+ EngineContext) → View → Page
//! ```
//!
//! La configuration de page ne possède ni le contexte ni le groupe — elle ne
//! garde que ce dont une page a besoin (l'émetteur bundle du contexte, les
//! valeurs de préférences du groupe). Chaque objet existe en un exemplaire
//! unique par processus et n'est relâché qu'une fois, après la boucle.

use std::io;

use tracing::info;
use url::Url;

use crate::context::{BundleMessage, BundleSender, EngineContext};
use crate::session::{ReleaseProbe, mark_released};

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Préférences partagées attachées au groupe de pages.
#[derive(Debug, Default)]
pub struct Preferences {
    pub allow_running_of_insecure_content: bool,
    pub allow_display_of_insecure_content: bool,
    pub web_security_enabled: bool,
    pub logs_page_messages_to_system_console: bool,
    pub fullscreen_enabled: bool,
    probe: Option<ReleaseProbe>,
}

impl Clone for Preferences {
    fn clone(&self) -> Self {
        Self {
            allow_running_of_insecure_content: self.allow_running_of_insecure_content,
            allow_display_of_insecure_content: self.allow_display_of_insecure_content,
            web_security_enabled: self.web_security_enabled,
            logs_page_messages_to_system_console: self.logs_page_messages_to_system_console,
            fullscreen_enabled: self.fullscreen_enabled,
            // Le probe de teardown suit l'exemplaire possédé par la session,
            // jamais les copies internes.
            probe: None,
        }
    }
}

impl Preferences {
    #[cfg(test)]
    pub(crate) fn attach_release_probe(&mut self, probe: ReleaseProbe) {
        self.probe = Some(probe);
    }
}

impl Drop for Preferences {
    fn drop(&mut self) {
        mark_released(&self.probe, "preferences");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PageGroup
// ─────────────────────────────────────────────────────────────────────────────

/// Groupe de pages identifié, porteur des préférences partagées.
pub struct PageGroup {
    identifier: String,
    preferences: Preferences,
    probe: Option<ReleaseProbe>,
}

impl PageGroup {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            preferences: Preferences::default(),
            probe: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Attache les préférences au groupe (copie des valeurs).
    pub fn set_preferences(&mut self, preferences: &Preferences) {
        self.preferences = preferences.clone();
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[cfg(test)]
    pub(crate) fn attach_release_probe(&mut self, probe: ReleaseProbe) {
        self.probe = Some(probe);
    }
}

impl Drop for PageGroup {
    fn drop(&mut self) {
        mark_released(&self.probe, "page-group");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PageConfiguration
// ─────────────────────────────────────────────────────────────────────────────

/// Lie contexte et groupe de pages avant la création de la vue.
#[derive(Default)]
pub struct PageConfiguration {
    bundle: Option<BundleSender>,
    group_identifier: Option<String>,
    preferences: Preferences,
    probe: Option<ReleaseProbe>,
}

impl PageConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Référence le contexte : la configuration ne retient que l'émetteur
    /// bundle, pas la propriété du contexte.
    pub fn set_context(&mut self, context: &EngineContext) {
        self.bundle = Some(context.bundle_sender());
    }

    /// Référence le groupe : identifiant et valeurs de préférences.
    pub fn set_page_group(&mut self, group: &PageGroup) {
        self.group_identifier = Some(group.identifier().to_string());
        self.preferences = group.preferences().clone();
    }

    #[cfg(test)]
    pub(crate) fn attach_release_probe(&mut self, probe: ReleaseProbe) {
        self.probe = Some(probe);
    }
}

impl Drop for PageConfiguration {
    fn drop(&mut self) {
        mark_released(&self.probe, "page-configuration");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View / Page
// ─────────────────────────────────────────────────────────────────────────────

/// La page sous-jacente d'une vue : navigation active + canal bundle.
pub struct Page {
    bundle: BundleSender,
    preferences: Preferences,
    group_identifier: String,
    current_url: Option<Url>,
}

impl Page {
    /// Charge `url` dans la page. Le parsing est la seule validation d'URL
    /// du launcher — l'équivalent du parsing « niveau moteur ».
    pub fn load_url(&mut self, url: &str) -> Result<(), url::ParseError> {
        let parsed = Url::parse(url)?;
        info!(url = %parsed, "Chargement de l'URL initiale");
        self.current_url = Some(parsed);
        Ok(())
    }

    /// URL de la navigation active, si une navigation a été engagée.
    pub fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn group_identifier(&self) -> &str {
        &self.group_identifier
    }

    /// Poste un message vers le bundle injecté. Fire-and-forget.
    pub fn post_message_to_bundle(&self, message: BundleMessage) {
        self.bundle.post(message);
    }

    /// Émetteur bundle de la page, clonable pour les callbacks.
    pub fn bundle_sender(&self) -> BundleSender {
        self.bundle.clone()
    }
}

/// La vue : propriétaire unique de sa [`Page`].
pub struct View {
    page: Page,
    probe: Option<ReleaseProbe>,
}

impl View {
    /// Crée la vue depuis une configuration complète.
    ///
    /// La configuration doit avoir reçu son contexte et son groupe de pages ;
    /// l'original ne vérifiait pas et plantait plus loin — ici l'incomplétude
    /// est une erreur explicite.
    pub fn new(configuration: &PageConfiguration) -> io::Result<Self> {
        let bundle = configuration.bundle.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "page configuration has no engine context",
            )
        })?;
        let group_identifier = configuration.group_identifier.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "page configuration has no page group",
            )
        })?;

        Ok(Self {
            page: Page {
                bundle,
                preferences: configuration.preferences.clone(),
                group_identifier,
                current_url: None,
            },
            probe: None,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    #[cfg(test)]
    pub(crate) fn attach_release_probe(&mut self, probe: ReleaseProbe) {
        self.probe = Some(probe);
    }
}

impl Drop for View {
    fn drop(&mut self) {
        mark_released(&self.probe, "view");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextConfiguration;

    fn complete_configuration() -> (PageConfiguration, crate::context::BundleEndpoint) {
        let (context, endpoint) = EngineContext::new(ContextConfiguration::new());
        let mut group = PageGroup::new("WPEPageGroup");
        let mut preferences = Preferences::default();
        preferences.fullscreen_enabled = true;
        group.set_preferences(&preferences);

        let mut configuration = PageConfiguration::new();
        configuration.set_context(&context);
        configuration.set_page_group(&group);
        (configuration, endpoint)
    }

    #[test]
    fn test_view_requires_context() {
        let mut configuration = PageConfiguration::new();
        configuration.set_page_group(&PageGroup::new("WPEPageGroup"));
        assert!(View::new(&configuration).is_err());
    }

    #[test]
    fn test_view_requires_page_group() {
        let (context, _endpoint) = EngineContext::new(ContextConfiguration::new());
        let mut configuration = PageConfiguration::new();
        configuration.set_context(&context);
        assert!(View::new(&configuration).is_err());
    }

    #[test]
    fn test_view_inherits_group_preferences() {
        let (configuration, _endpoint) = complete_configuration();
        let view = View::new(&configuration).unwrap();
        assert!(view.page().preferences().fullscreen_enabled);
        assert_eq!(view.page().group_identifier(), "WPEPageGroup");
    }

    #[test]
    fn test_load_url_records_active_navigation() {
        let (configuration, _endpoint) = complete_configuration();
        let mut view = View::new(&configuration).unwrap();
        assert!(view.page().current_url().is_none());
        view.page_mut().load_url("http://youtube.com/tv").unwrap();
        assert_eq!(
            view.page().current_url().unwrap().as_str(),
            "http://youtube.com/tv"
        );
    }

    #[test]
    fn test_load_url_rejects_unparseable_input() {
        let (configuration, _endpoint) = complete_configuration();
        let mut view = View::new(&configuration).unwrap();
        assert!(view.page_mut().load_url("pas une url").is_err());
        assert!(view.page().current_url().is_none());
    }

    #[test]
    fn test_page_posts_through_context_channel() {
        let (configuration, endpoint) = complete_configuration();
        let view = View::new(&configuration).unwrap();
        view.page().post_message_to_bundle(BundleMessage {
            name: "Hello".to_string(),
            body: vec!["Test1".to_string(), "Test2".to_string(), "Test3".to_string()],
        });
        let message = endpoint.try_recv().unwrap();
        assert_eq!(message.body.len(), 3);
    }

    #[test]
    fn test_preferences_clone_drops_probe() {
        let recorder = crate::session::new_release_recorder();
        let mut preferences = Preferences::default();
        preferences.attach_release_probe(recorder.clone());
        let copy = preferences.clone();
        drop(copy);
        // Only the probed original may record a release.
        assert!(recorder.borrow().is_empty());
        drop(preferences);
        assert_eq!(recorder.borrow().as_slice(), ["preferences"]);
    }
}

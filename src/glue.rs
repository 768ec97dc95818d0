//! Couche d'intégration entre le moteur et le launcher.
//!
//! [`ShellClient`] est l'unique implémentation de [`EventHandler`] : la table
//! de callbacks enregistrée au moment de l'assemblage de la session. Elle
//! porte les cinq comportements du launcher :
//!
//! 1. **Décision d'action de navigation** : toujours autoriser (pas de
//!    politique).
//! 2. **Décision de réponse de navigation** : autoriser seulement si le
//!    moteur sait afficher le type de contenu déclaré — le seul vrai prédicat
//!    du launcher, qui évite d'afficher ce qui relèverait d'un téléchargement.
//! 3. **Fin de chargement du document** : poster le message de salutation au
//!    bundle injecté (nom et corps fixes, trois jetons ordonnés).
//! 4. **Crashs de sous-processus** (web, réseau, base de données) : demander
//!    l'arrêt de la boucle ; le premier à tirer gagne, effet uniforme.
//! 5. **Frame présenté** : alimenter l'échantillonneur FPS.

use tracing::{debug, error, info};

use crate::context::{BundleMessage, BundleSender};
use crate::fps::FrameRateSampler;
use crate::mainloop::{EventHandler, LoopHandle};
use crate::policy::{NavigationAction, NavigationResponse, PolicyListener};

/// Nom du message envoyé au bundle injecté à chaque fin de chargement.
const BUNDLE_MESSAGE_NAME: &str = "Hello";

/// Corps du message : exactement trois jetons, dans cet ordre.
const BUNDLE_MESSAGE_BODY: [&str; 3] = ["Test1", "Test2", "Test3"];

/// Table de callbacks du launcher, enregistrée une fois sur la boucle.
pub struct ShellClient {
    loop_handle: LoopHandle,
    bundle: BundleSender,
    sampler: FrameRateSampler,
}

impl ShellClient {
    pub fn new(loop_handle: LoopHandle, bundle: BundleSender, sampler: FrameRateSampler) -> Self {
        Self {
            loop_handle,
            bundle,
            sampler,
        }
    }

    /// Construit le message de salutation envoyé au bundle injecté.
    fn greeting() -> BundleMessage {
        BundleMessage {
            name: BUNDLE_MESSAGE_NAME.to_string(),
            body: BUNDLE_MESSAGE_BODY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EventHandler for ShellClient {
    fn decide_navigation_action(&mut self, _action: &NavigationAction, listener: PolicyListener) {
        listener.allow();
    }

    fn decide_navigation_response(
        &mut self,
        response: &NavigationResponse,
        listener: PolicyListener,
    ) {
        if response.can_show_mime_type {
            listener.allow();
        } else {
            debug!(
                url = %response.request_url,
                mime_type = %response.mime_type,
                "Type de contenu non affichable — navigation ignorée"
            );
            listener.ignore();
        }
    }

    fn document_loaded(&mut self) {
        info!("Hello InjectedBundle ...");
        self.bundle.post(Self::greeting());
    }

    fn web_process_crashed(&mut self) {
        error!("Le processus web a planté");
        self.loop_handle.quit();
    }

    fn network_process_crashed(&mut self) {
        error!("Le processus réseau a planté");
        self.loop_handle.quit();
    }

    fn database_process_crashed(&mut self) {
        error!("Le processus base de données a planté");
        self.loop_handle.quit();
    }

    fn frame_displayed(&mut self) {
        if let Some(fps) = self.sampler.frame_displayed() {
            info!(fps = format_args!("{fps:.2}"), "Fréquence d'affichage");
        }
    }
}

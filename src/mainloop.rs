//! Boucle d'événements bloquante du launcher.
//!
//! Équivalent du `GMainLoop` historique : un seul thread, une seule boucle,
//! qui dispatche les événements émis par le moteur vers un [`EventHandler`].
//! Les threads du moteur livrent leurs événements via un [`EventSender`]
//! clonable et `Send` — c'est le seul pont inter-threads du launcher, sur le
//! modèle du `Waker` qui reliait les threads moteur à la boucle principale.
//!
//! ## Cycle de vie du processus
//!
//! ```text
//! Starting → [run() appelé] → Running → [quit() ou senders fermés] → Terminating
//! ```
//!
//! Le dispatch n'a lieu qu'en phase `Running`. `quit()` peut être demandé
//! depuis n'importe quel callback (typiquement une notification de crash) ;
//! l'arrêt est immédiat — les événements encore en file ne sont pas
//! dispatchés — et `run()` retourne.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use crate::policy::{NavigationAction, NavigationResponse, PolicyListener};

// ─────────────────────────────────────────────────────────────────────────────
// Événements moteur
// ─────────────────────────────────────────────────────────────────────────────

/// Événement émis par le moteur, dispatché par la boucle principale.
pub enum EngineEvent {
    /// Le moteur demande un verdict sur une action de navigation.
    NavigationAction {
        action: NavigationAction,
        listener: PolicyListener,
    },
    /// Le moteur demande un verdict sur une réponse de navigation.
    NavigationResponse {
        response: NavigationResponse,
        listener: PolicyListener,
    },
    /// Le document principal a fini de charger.
    DocumentLoaded,
    /// Le processus web du moteur s'est arrêté brutalement.
    WebProcessCrashed,
    /// Le processus réseau du moteur s'est arrêté brutalement.
    NetworkProcessCrashed,
    /// Le processus base-de-données du moteur s'est arrêté brutalement.
    DatabaseProcessCrashed,
    /// Un frame vient d'être présenté à l'écran.
    FrameDisplayed,
}

enum LoopMessage {
    Event(EngineEvent),
    Quit,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventHandler : une méthode par type d'événement, no-op par défaut
// ─────────────────────────────────────────────────────────────────────────────

/// Interface polymorphe de gestion d'événements, enregistrée une fois au
/// moment de l'assemblage de la session.
///
/// Chaque méthode correspond à un type d'événement ; les implémentations par
/// défaut sont des no-ops — sauf pour les décisions de navigation, dont le
/// listener doit être résolu exactement une fois (défaut : autoriser).
pub trait EventHandler {
    fn decide_navigation_action(&mut self, _action: &NavigationAction, listener: PolicyListener) {
        listener.allow();
    }

    fn decide_navigation_response(
        &mut self,
        _response: &NavigationResponse,
        listener: PolicyListener,
    ) {
        listener.allow();
    }

    fn document_loaded(&mut self) {}

    fn web_process_crashed(&mut self) {}

    fn network_process_crashed(&mut self) {}

    fn database_process_crashed(&mut self) {}

    fn frame_displayed(&mut self) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// MainLoop / LoopHandle / EventSender
// ─────────────────────────────────────────────────────────────────────────────

/// Phase de vie du processus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    Terminating,
}

/// Boucle d'événements bloquante, possédée par `main` pour toute la durée
/// de vie du processus.
pub struct MainLoop {
    // Prise à run() : seules les poignées et émetteurs déjà distribués
    // maintiennent alors le canal ouvert.
    tx: Option<mpsc::Sender<LoopMessage>>,
    rx: mpsc::Receiver<LoopMessage>,
    phase: Phase,
    quitting: Arc<AtomicBool>,
}

/// Poignée clonable permettant de demander l'arrêt de la boucle.
#[derive(Clone)]
pub struct LoopHandle {
    tx: mpsc::Sender<LoopMessage>,
    quitting: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Demande l'arrêt de la boucle. Idempotent ; le premier appel gagne,
    /// et plus aucun événement n'est dispatché ensuite.
    pub fn quit(&self) {
        self.quitting.store(true, Ordering::Release);
        // Réveille la boucle si elle est bloquée sur recv().
        let _ = self.tx.send(LoopMessage::Quit);
    }
}

/// Extrémité émettrice du canal d'événements, côté moteur.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<LoopMessage>,
}

impl EventSender {
    /// Livre un événement à la boucle principale.
    pub fn send(&self, event: EngineEvent) {
        if self.tx.send(LoopMessage::Event(event)).is_err() {
            warn!("Boucle principale déjà terminée — événement moteur abandonné");
        }
    }
}

impl MainLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx: Some(tx),
            rx,
            phase: Phase::Starting,
            quitting: Arc::new(AtomicBool::new(false)),
        }
    }

    fn sender(&self) -> mpsc::Sender<LoopMessage> {
        self.tx
            .as_ref()
            .expect("poignées et émetteurs doivent être créés avant run()")
            .clone()
    }

    /// Poignée d'arrêt, à donner aux callbacks de crash.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            tx: self.sender(),
            quitting: Arc::clone(&self.quitting),
        }
    }

    /// Extrémité émettrice, à donner au côté moteur.
    pub fn event_sender(&self) -> EventSender {
        EventSender { tx: self.sender() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Fait tourner la boucle jusqu'à `quit()`. Bloquant.
    ///
    /// Retourne aussi si tous les `EventSender` ont disparu — plus aucun
    /// événement ne peut arriver, rester bloqué n'aurait pas de sens.
    pub fn run(&mut self, handler: &mut dyn EventHandler) {
        // Fermer notre extrémité émettrice : le canal ne reste ouvert que
        // par les poignées et émetteurs distribués pendant l'assemblage.
        drop(self.tx.take());

        self.phase = Phase::Running;
        info!("Boucle principale démarrée");

        loop {
            if self.quitting.load(Ordering::Acquire) {
                info!("Arrêt de la boucle demandé");
                break;
            }
            match self.rx.recv() {
                Ok(LoopMessage::Event(event)) => dispatch(handler, event),
                Ok(LoopMessage::Quit) => {
                    info!("Arrêt de la boucle demandé");
                    break;
                }
                Err(mpsc::RecvError) => {
                    debug!("Tous les émetteurs d'événements ont disparu");
                    break;
                }
            }
        }

        self.phase = Phase::Terminating;
    }
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

fn dispatch(handler: &mut dyn EventHandler, event: EngineEvent) {
    match event {
        EngineEvent::NavigationAction { action, listener } => {
            handler.decide_navigation_action(&action, listener);
        }
        EngineEvent::NavigationResponse { response, listener } => {
            handler.decide_navigation_response(&response, listener);
        }
        EngineEvent::DocumentLoaded => handler.document_loaded(),
        EngineEvent::WebProcessCrashed => handler.web_process_crashed(),
        EngineEvent::NetworkProcessCrashed => handler.network_process_crashed(),
        EngineEvent::DatabaseProcessCrashed => handler.database_process_crashed(),
        EngineEvent::FrameDisplayed => handler.frame_displayed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHandler {
        documents: u32,
        frames: u32,
        quit_on_document: Option<LoopHandle>,
    }

    impl EventHandler for CountingHandler {
        fn document_loaded(&mut self) {
            self.documents += 1;
            if let Some(handle) = &self.quit_on_document {
                handle.quit();
            }
        }

        fn frame_displayed(&mut self) {
            self.frames += 1;
        }
    }

    #[test]
    fn test_loop_exits_when_all_senders_gone() {
        let mut main_loop = MainLoop::new();
        let sender = main_loop.event_sender();
        sender.send(EngineEvent::FrameDisplayed);
        sender.send(EngineEvent::DocumentLoaded);
        drop(sender);

        let mut handler = CountingHandler::default();
        main_loop.run(&mut handler);

        assert_eq!(handler.frames, 1);
        assert_eq!(handler.documents, 1);
        assert_eq!(main_loop.phase(), Phase::Terminating);
    }

    #[test]
    fn test_quit_before_run_dispatches_nothing() {
        let mut main_loop = MainLoop::new();
        let sender = main_loop.event_sender();
        sender.send(EngineEvent::DocumentLoaded);
        main_loop.handle().quit();
        sender.send(EngineEvent::FrameDisplayed);
        drop(sender);

        let mut handler = CountingHandler::default();
        main_loop.run(&mut handler);

        assert_eq!(handler.documents, 0);
        assert_eq!(handler.frames, 0);
        assert_eq!(main_loop.phase(), Phase::Terminating);
    }

    #[test]
    fn test_quit_from_inside_callback() {
        let mut main_loop = MainLoop::new();
        let sender = main_loop.event_sender();

        let mut handler = CountingHandler {
            quit_on_document: Some(main_loop.handle()),
            ..Default::default()
        };

        sender.send(EngineEvent::DocumentLoaded);
        sender.send(EngineEvent::FrameDisplayed);
        main_loop.run(&mut handler);

        // Events still queued when the callback asked to quit are dropped,
        // not dispatched.
        assert_eq!(handler.documents, 1);
        assert_eq!(handler.frames, 0);
        assert_eq!(main_loop.phase(), Phase::Terminating);
    }

    #[test]
    fn test_default_handler_allows_navigation() {
        struct NoopHandler;
        impl EventHandler for NoopHandler {}

        let mut main_loop = MainLoop::new();
        let sender = main_loop.event_sender();

        let (listener, rx) = crate::policy::PolicyListener::new();
        sender.send(EngineEvent::NavigationAction {
            action: NavigationAction {
                request_url: url::Url::parse("http://youtube.com/tv").unwrap(),
            },
            listener,
        });
        drop(sender);

        main_loop.run(&mut NoopHandler);
        assert_eq!(rx.recv().unwrap(), crate::policy::PolicyDecision::Allow);
    }

    #[test]
    fn test_phase_starts_in_starting() {
        assert_eq!(MainLoop::new().phase(), Phase::Starting);
    }
}

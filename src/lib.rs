//! # WPEShell — coquille de lancement pour un moteur web embarqué
//!
//! Launcher minimal : configure un moteur web embarqué (contexte, stockage,
//! préférences, cookies), enregistre une table fixe de callbacks (politique
//! de navigation, notification de crash, compteur de frames) et affiche une
//! URL unique dans une boucle d'événements bloquante. Tout le non-trivial —
//! rendu, réseau, stockage, isolation de processus — appartient au moteur ;
//! cette couche n'en consomme que la surface de configuration et de
//! callbacks.
//!
//! ## Architecture des modules
//!
//! - [`config`] : Configuration TOML (défauts = valeurs historiques) et
//!   bascules d'environnement à présence seule.
//!
//! - [`paths`] : Provisionnement des répertoires de stockage du moteur sous
//!   la racine de cache utilisateur (mode 0700), et chemin de la base de
//!   cookies.
//!
//! - [`context`] : Configuration immuable du contexte moteur, gestionnaire
//!   de cookies, canal de messages vers le bundle injecté.
//!
//! - [`view`] : Chaîne préférences → groupe de pages → configuration de
//!   page → vue, et la page avec sa navigation active.
//!
//! - [`policy`] : Verdicts de navigation ; le listener est consommé par
//!   valeur pour garantir une résolution exactement-une-fois.
//!
//! - [`mainloop`] : Boucle bloquante mono-thread (l'équivalent GMainLoop),
//!   le trait [`mainloop::EventHandler`] et la poignée d'arrêt.
//!
//! - [`glue`] : La table de callbacks du launcher — politique de navigation,
//!   salutation au bundle, arrêt sur crash, échantillonnage FPS.
//!
//! - [`fps`] : Échantillonneur de fréquence d'affichage (fenêtre de 5 s).
//!
//! - [`session`] : Assemblage linéaire de la session et démontage ordonné.

pub mod config;
pub mod context;
pub mod fps;
pub mod glue;
pub mod mainloop;
pub mod paths;
pub mod policy;
pub mod session;
pub mod view;

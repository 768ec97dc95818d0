//! Point d'entrée de WPEShell.
//!
//! Usage :
//!   wpeshell [URL]
//!
//! Zéro ou un argument positionnel ; sans argument, l'URL par défaut de la
//! configuration est chargée. Un arrêt déclenché par un crash de
//! sous-processus moteur reste une sortie normale (code 0) ; seul un échec
//! d'assemblage ou de chargement est une erreur.

use std::env;
use std::error::Error;

use wpeshell::config::{Config, EnvToggles};
use wpeshell::fps::FrameRateSampler;
use wpeshell::glue::ShellClient;
use wpeshell::mainloop::MainLoop;
use wpeshell::session::Session;

fn main() -> Result<(), Box<dyn Error>> {
    // ── 1. Logging / Tracing ───────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // ── 2. Configuration et bascules d'environnement ───────────────────
    let config = Config::load();
    let toggles = EnvToggles::from_env();

    // ── 3. URL cible : premier argument CLI, verbatim, sinon défaut ────
    let url = resolve_target_url(env::args().skip(1), &config);

    // ── 4. Boucle principale et assemblage de la session ───────────────
    let mut main_loop = MainLoop::new();
    let (mut session, _bundle_endpoint) = Session::assemble(&config, &toggles)?;
    session.load_url(&url)?;

    // ── 5. Table de callbacks ──────────────────────────────────────────
    let mut client = ShellClient::new(
        main_loop.handle(),
        session.bundle_sender(),
        FrameRateSampler::new(toggles.display_fps),
    );

    // ── 6. Boucle bloquante ; ne retourne que sur quit() ───────────────
    main_loop.run(&mut client);

    // ── 7. Démontage ordonné, puis sortie 0 ────────────────────────────
    drop(session);
    Ok(())
}

/// Premier argument CLI, passé verbatim ; sinon l'URL par défaut configurée.
fn resolve_target_url(mut args: impl Iterator<Item = String>, config: &Config) -> String {
    args.next()
        .unwrap_or_else(|| config.general.default_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_argument_falls_back_to_configured_default() {
        let config = Config::default();
        let url = resolve_target_url(std::iter::empty(), &config);
        assert_eq!(url, "http://youtube.com/tv");
    }

    #[test]
    fn test_single_argument_is_taken_verbatim() {
        let config = Config::default();
        let args = ["https://example.org/tv?x=1".to_string()].into_iter();
        assert_eq!(resolve_target_url(args, &config), "https://example.org/tv?x=1");
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let config = Config::default();
        let args = ["https://first.example".to_string(), "https://second.example".to_string()]
            .into_iter();
        assert_eq!(resolve_target_url(args, &config), "https://first.example");
    }
}

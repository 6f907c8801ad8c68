//! First-start admin password bootstrap.

use crate::error::DashboardError;
use crate::password::hash_password;
use crate::store::ConfigStore;
use std::io::{self, IsTerminal};
use tracing::{info, warn};

/// Empty answers accepted before giving up on the prompt.
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

/// How the admin password ended up configured (or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyConfigured,
    HashedFromEnv,
    HashedFromPrompt,
    Unset,
}

/// Source of an interactively typed password.
pub trait PasswordPrompt {
    fn is_interactive(&self) -> bool;

    fn read_password(&mut self, prompt: &str) -> io::Result<String>;
}

/// Hidden-input prompt on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Make sure the store holds an admin password hash if one can be obtained.
pub async fn ensure_password(
    store: &ConfigStore,
    env_password: Option<&str>,
    prompt: &mut dyn PasswordPrompt,
) -> Result<BootstrapOutcome, DashboardError> {
    if store.snapshot().await.password_configured() {
        info!("Admin password already configured");
        return Ok(BootstrapOutcome::AlreadyConfigured);
    }

    if let Some(password) = env_password.filter(|p| !p.trim().is_empty()) {
        store_hash(store, password).await?;
        info!("Admin password set from ENIST_ADMIN_PASSWORD");
        return Ok(BootstrapOutcome::HashedFromEnv);
    }

    if !prompt.is_interactive() {
        warn!("No admin password configured and no terminal to ask for one; logins will fail");
        return Ok(BootstrapOutcome::Unset);
    }

    for attempt in 1..=MAX_PROMPT_ATTEMPTS {
        let answer = match prompt.read_password("Set admin password: ") {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Could not read admin password; logins will fail");
                return Ok(BootstrapOutcome::Unset);
            }
        };
        let answer = answer.trim_end_matches(['\r', '\n']);

        if answer.trim().is_empty() {
            warn!(attempt, "Empty admin password refused");
            continue;
        }

        store_hash(store, answer).await?;
        info!("Admin password set from terminal prompt");
        return Ok(BootstrapOutcome::HashedFromPrompt);
    }

    warn!("No admin password entered; logins will fail");
    Ok(BootstrapOutcome::Unset)
}

async fn store_hash(store: &ConfigStore, password: &str) -> Result<(), DashboardError> {
    let hash = hash_password(password)?;
    store.update(|c| c.password_hash = Some(hash)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use std::collections::VecDeque;

    struct ScriptedPrompt {
        interactive: bool,
        answers: VecDeque<String>,
        asked: usize,
    }

    impl ScriptedPrompt {
        fn new(interactive: bool, answers: &[&str]) -> Self {
            Self {
                interactive,
                answers: answers.iter().map(|s| s.to_string()).collect(),
                asked: 0,
            }
        }
    }

    impl PasswordPrompt for ScriptedPrompt {
        fn is_interactive(&self) -> bool {
            self.interactive
        }

        fn read_password(&mut self, _prompt: &str) -> io::Result<String> {
            self.asked += 1;
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input"))
        }
    }

    async fn empty_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("config.json"))
            .await
            .unwrap();
        (dir, store)
    }

    async fn stored_hash(store: &ConfigStore) -> String {
        store.snapshot().await.password_hash.unwrap()
    }

    #[tokio::test]
    async fn test_existing_hash_is_left_alone() {
        let (_dir, store) = empty_store().await;
        store
            .update(|c| c.password_hash = Some("$argon2id$existing".into()))
            .await
            .unwrap();

        let mut prompt = ScriptedPrompt::new(true, &["ignored"]);
        let outcome = ensure_password(&store, Some("from-env"), &mut prompt)
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::AlreadyConfigured);
        assert_eq!(stored_hash(&store).await, "$argon2id$existing");
        assert_eq!(prompt.asked, 0);
    }

    #[tokio::test]
    async fn test_env_password_is_hashed() {
        let (_dir, store) = empty_store().await;
        let mut prompt = ScriptedPrompt::new(true, &[]);

        let outcome = ensure_password(&store, Some("from-env"), &mut prompt)
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::HashedFromEnv);
        let hash = stored_hash(&store).await;
        assert_ne!(hash, "from-env");
        assert!(verify_password("from-env", &hash));
        assert_eq!(prompt.asked, 0);
    }

    #[tokio::test]
    async fn test_blank_env_password_falls_through_to_prompt() {
        let (_dir, store) = empty_store().await;
        let mut prompt = ScriptedPrompt::new(true, &["typed\n"]);

        let outcome = ensure_password(&store, Some("   "), &mut prompt)
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::HashedFromPrompt);
        assert!(verify_password("typed", &stored_hash(&store).await));
    }

    #[tokio::test]
    async fn test_empty_answers_are_refused() {
        let (_dir, store) = empty_store().await;
        let mut prompt = ScriptedPrompt::new(true, &["", "  ", "finally"]);

        let outcome = ensure_password(&store, None, &mut prompt).await.unwrap();

        assert_eq!(outcome, BootstrapOutcome::HashedFromPrompt);
        assert_eq!(prompt.asked, 3);
        assert!(verify_password("finally", &stored_hash(&store).await));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (_dir, store) = empty_store().await;
        let mut prompt = ScriptedPrompt::new(true, &["", "", "", "too late"]);

        let outcome = ensure_password(&store, None, &mut prompt).await.unwrap();

        assert_eq!(outcome, BootstrapOutcome::Unset);
        assert_eq!(prompt.asked, MAX_PROMPT_ATTEMPTS);
        assert!(!store.snapshot().await.password_configured());
    }

    #[tokio::test]
    async fn test_non_interactive_without_env_is_unset() {
        let (dir, store) = empty_store().await;
        let mut prompt = ScriptedPrompt::new(false, &["never read"]);

        let outcome = ensure_password(&store, None, &mut prompt).await.unwrap();

        assert_eq!(outcome, BootstrapOutcome::Unset);
        assert_eq!(prompt.asked, 0);

        let on_disk = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(on_disk.contains("\"password_hash\": null"));
    }

    #[tokio::test]
    async fn test_unreadable_terminal_leaves_password_unset() {
        let (_dir, store) = empty_store().await;
        let mut prompt = ScriptedPrompt::new(true, &[]);

        let outcome = ensure_password(&store, None, &mut prompt).await.unwrap();

        assert_eq!(outcome, BootstrapOutcome::Unset);
        assert_eq!(prompt.asked, 1);
        assert!(!store.snapshot().await.password_configured());
    }
}

//! Session state machine and authorised operations

use crate::config::Config;
use crate::core_accounts::{Account, AccountError, CredentialDirectory};
use crate::core_content::{Comment, ContentError, ContentStore, Post, PostId};
use crate::core_notify::NotificationDispatcher;
use crate::persistence::{LoggingPostSink, PersistenceQueue, PostSink};
use crate::seed;
use metrics::counter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No active session: log in first")]
    NoActiveSession,

    #[error("Lock poisoned: a thread panicked while holding the session lock")]
    LockPoisoned,

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

fn handle_poison<T>(_err: PoisonError<T>) -> SessionError {
    SessionError::LockPoisoned
}

/// Who, if anyone, is logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(Account),
}

/// Mediates every operation the presentation layer performs
pub struct SessionController {
    directory: Arc<CredentialDirectory>,
    store: Arc<ContentStore>,
    dispatcher: NotificationDispatcher,
    state: RwLock<SessionState>,
    shut_down: AtomicBool,
}

impl SessionController {
    pub fn new(
        directory: Arc<CredentialDirectory>,
        store: Arc<ContentStore>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            directory,
            store,
            dispatcher,
            state: RwLock::new(SessionState::LoggedOut),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Seeded controller using the logging persistence stand-in
    pub fn bootstrap(config: &Config) -> Result<Self, SessionError> {
        Self::bootstrap_with_sink(config, Arc::new(LoggingPostSink))
    }

    /// Seeded controller persisting through `sink`
    ///
    /// Must be called from within a tokio runtime: the notification workers
    /// and the persistence task are spawned here.
    pub fn bootstrap_with_sink(
        config: &Config,
        sink: Arc<dyn PostSink>,
    ) -> Result<Self, SessionError> {
        let directory = Arc::new(CredentialDirectory::new());
        seed::seed_directory(&directory)?;

        let dispatcher = NotificationDispatcher::spawn(&config.notifier);
        let (persistence, _task) = PersistenceQueue::spawn(sink);
        let store = Arc::new(ContentStore::new(dispatcher.clone(), persistence));
        seed::seed_content(&store)?;

        info!(
            accounts = directory.len()?,
            workers = config.notifier.workers,
            "Blogging platform initialised"
        );
        Ok(Self::new(directory, store, dispatcher))
    }

    /// Authenticate and make the account current
    ///
    /// A failed attempt leaves the current session as it was. Unknown
    /// identifier and wrong secret are not told apart.
    pub fn login(&self, identifier: &str, secret: &str) -> Option<Account> {
        if self.is_shut_down() {
            warn!(identifier, "Login refused during shutdown");
            return None;
        }

        let Some(account) = self.directory.authenticate(identifier, secret) else {
            counter!("quillpad_logins_total", "result" => "failure").increment(1);
            info!(identifier, "Login failed");
            return None;
        };

        let Ok(mut state) = self.state.write() else {
            warn!("Session lock poisoned, refusing login");
            return None;
        };
        // Re-checked under the lock so a racing shutdown cannot be undone
        if self.is_shut_down() {
            warn!(identifier, "Login refused during shutdown");
            return None;
        }
        *state = SessionState::LoggedIn(account.clone());
        drop(state);

        counter!("quillpad_logins_total", "result" => "success").increment(1);
        info!(identifier, role = %account.role(), "Login successful");
        Some(account)
    }

    pub fn state(&self) -> Result<SessionState, SessionError> {
        Ok(self.state.read().map_err(handle_poison)?.clone())
    }

    pub fn current_account(&self) -> Option<Account> {
        match self.state.read().ok()?.clone() {
            SessionState::LoggedIn(account) => Some(account),
            SessionState::LoggedOut => None,
        }
    }

    // Shutdown leaves the state LoggedOut and login refuses afterwards, so
    // this alone gates every operation once the application stops.
    fn require_account(&self) -> Result<Account, SessionError> {
        match &*self.state.read().map_err(handle_poison)? {
            SessionState::LoggedIn(account) => Ok(account.clone()),
            SessionState::LoggedOut => Err(SessionError::NoActiveSession),
        }
    }

    /// Publish as the current account (Authors only)
    pub fn create_post(&self, title: &str, body: &str) -> Result<Arc<Post>, SessionError> {
        let account = self.require_account()?;
        Ok(self.store.create_post(&account, title, body)?)
    }

    /// Comment as the current account; any role may comment
    pub fn add_comment(&self, post_id: PostId, text: &str) -> Result<Comment, SessionError> {
        let account = self.require_account()?;
        Ok(self.store.add_comment(post_id, &account, text)?)
    }

    pub fn list_posts(&self) -> Result<Vec<Arc<Post>>, SessionError> {
        Ok(self.store.list_posts()?)
    }

    pub fn render_all_posts(&self) -> Result<String, SessionError> {
        Ok(self.store.render_all()?)
    }

    pub fn export_json(&self) -> Result<String, SessionError> {
        Ok(self.store.export_json()?)
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Log out and stop the notification workers
    ///
    /// Never fails: pending deliveries are drained or abandoned inside the
    /// dispatcher. Repeated calls are no-ops.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if self.shut_down.swap(true, Ordering::SeqCst) {
                return;
            }
            *state = SessionState::LoggedOut;
        }

        info!("Shutting down the application...");
        self.dispatcher.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_accounts::Role;
    use crate::test_utils::fast_notifier_config;

    fn controller() -> SessionController {
        let config = Config {
            notifier: fast_notifier_config(),
            ..Default::default()
        };
        SessionController::bootstrap(&config).unwrap()
    }

    #[tokio::test]
    async fn test_starts_logged_out_with_welcome_post() {
        let session = controller();
        assert_eq!(session.state().unwrap(), SessionState::LoggedOut);

        let posts = session.list_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id(), PostId(1));
        assert_eq!(posts[0].title(), "Welcome to the Blog!");
        assert_eq!(posts[0].author(), "author1");
    }

    #[tokio::test]
    async fn test_gated_operations_need_login() {
        let session = controller();
        assert!(matches!(
            session.create_post("T", "B"),
            Err(SessionError::NoActiveSession)
        ));
        assert!(matches!(
            session.add_comment(PostId(1), "hi"),
            Err(SessionError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_current_session() {
        let session = controller();
        session.login("author1", "abcd").unwrap();

        assert!(session.login("author1", "wrong").is_none());
        assert!(session.login("nobody", "abcd").is_none());
        assert_eq!(session.current_account().unwrap().identifier(), "author1");
    }

    #[tokio::test]
    async fn test_successful_login_replaces_account() {
        let session = controller();
        session.login("author1", "abcd").unwrap();
        let reader = session.login("reader1", "xyz").unwrap();

        assert_eq!(reader.role(), Role::Reader);
        assert_eq!(session.state().unwrap(), SessionState::LoggedIn(reader));
    }

    #[tokio::test]
    async fn test_reader_and_admin_cannot_post() {
        let session = controller();
        for (id, secret) in [("reader1", "xyz"), ("admin1", "1234")] {
            session.login(id, secret).unwrap();
            assert!(matches!(
                session.create_post("T", "B"),
                Err(SessionError::Content(ContentError::Unauthorized { .. }))
            ));
        }
        assert_eq!(session.list_posts().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comment_on_unknown_post() {
        let session = controller();
        session.login("reader1", "xyz").unwrap();
        assert!(matches!(
            session.add_comment(PostId(99), "hello?"),
            Err(SessionError::Content(ContentError::PostNotFound(PostId(99))))
        ));
    }

    #[tokio::test]
    async fn test_shutdown_logs_out_and_closes() {
        let session = controller();
        session.login("reader1", "xyz").unwrap();
        session.add_comment(PostId(1), "bye").unwrap();

        session.shutdown().await;
        assert!(session.is_shut_down());
        assert_eq!(session.state().unwrap(), SessionState::LoggedOut);
        assert!(session.dispatcher().is_closed());

        assert!(session.login("reader1", "xyz").is_none());
        assert!(matches!(
            session.add_comment(PostId(1), "again"),
            Err(SessionError::NoActiveSession)
        ));

        // Second call is a no-op
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_gated_operations_after_shutdown_report_no_session() {
        let session = controller();
        session.login("author1", "abcd").unwrap();
        session.shutdown().await;
        assert_eq!(session.state().unwrap(), SessionState::LoggedOut);

        assert!(matches!(
            session.create_post("T", "B"),
            Err(SessionError::NoActiveSession)
        ));
        assert!(matches!(
            session.add_comment(PostId(1), "x"),
            Err(SessionError::NoActiveSession)
        ));
        assert_eq!(session.list_posts().unwrap().len(), 1);
    }
}

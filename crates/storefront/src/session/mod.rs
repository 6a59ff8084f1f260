//! Authentication session store.
//!
//! Tracks the current user identity as resolved from the remote identity
//! service. Only the resolved identity is persisted; the transient
//! loading flag always resets to `true` at construction, forcing a fresh
//! `check_auth` each process start.

mod error;

pub use error::SessionError;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bookhaven_core::{Email, UserRole};

use crate::identity::{IdentityService, NewProfile};
use crate::models::UserIdentity;
use crate::persist::StateStore;
use crate::subscribe::{ListenerSet, Subscription};

/// Namespaced persistence key for the session record.
pub const AUTH_STORE_KEY: &str = "auth-store";

const SESSION_SCHEMA_VERSION: u32 = 1;

/// Durable shape of the session. The loading flag is deliberately absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Schema version for forward-compatible reads.
    pub version: u32,
    /// The resolved identity, or `None` for an anonymous session.
    pub user: Option<UserIdentity>,
}

struct SessionInner {
    user: Option<UserIdentity>,
    loading: bool,
}

/// The authentication session.
///
/// Constructed once at process start and passed by reference to
/// consumers. All remote awaits happen outside the state lock, so readers
/// observe the pre-call snapshot until an operation commits.
pub struct SessionStore {
    service: Arc<dyn IdentityService>,
    state: Mutex<SessionInner>,
    persist: Box<dyn StateStore<SessionRecord>>,
    listeners: ListenerSet,
}

impl SessionStore {
    /// Create the store, rehydrating any persisted identity.
    ///
    /// The store starts with `loading = true`; call
    /// [`SessionStore::check_auth`] once at startup to resolve it.
    #[must_use]
    pub fn new(
        service: Arc<dyn IdentityService>,
        persist: Box<dyn StateStore<SessionRecord>>,
    ) -> Self {
        let user = match persist.load() {
            Ok(Some(record)) => {
                debug!(authenticated = record.user.is_some(), "rehydrated session");
                record.user
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "failed to load persisted session, starting anonymous");
                None
            }
        };

        Self {
            service,
            state: Mutex::new(SessionInner {
                user,
                loading: true,
            }),
            persist,
            listeners: ListenerSet::new(),
        }
    }

    /// Resolve the startup session against the identity service.
    ///
    /// If a remote session exists and its profile resolves, the store
    /// transitions to authenticated. Every failure path is swallowed and
    /// logged; the loading flag is cleared no matter what.
    pub async fn check_auth(&self) {
        {
            let mut state = self.lock_state();
            state.loading = true;
        }
        self.listeners.notify();

        match self.service.current_session().await {
            Ok(Some(session)) => match self.service.profile(&session.user_id).await {
                Ok(profile) => {
                    let user = UserIdentity {
                        id: session.user_id,
                        email: session.email,
                        full_name: profile.full_name,
                        role: profile.role,
                        created_at: profile.created_at,
                    };
                    info!(user_id = %user.id, "session restored");
                    self.commit_user(Some(user));
                }
                Err(err) => {
                    // Profile inconsistency is an authentication failure.
                    warn!(error = %err, "session exists but profile lookup failed");
                }
            },
            Ok(None) => {
                debug!("no remote session");
            }
            Err(err) => {
                warn!(error = %err, "session check failed");
            }
        }

        {
            let mut state = self.lock_state();
            state.loading = false;
        }
        self.listeners.notify();
    }

    /// Authenticate with email and password.
    ///
    /// On success the store transitions to authenticated and persists the
    /// identity. On any failure the state is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns the human-readable failure reason: credential rejection,
    /// profile-lookup failure, or service unavailability.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let email = Email::parse(email)?;

        let session = self.service.authenticate(&email, password).await?;
        let profile = self.service.profile(&session.user_id).await?;

        let user = UserIdentity {
            id: session.user_id,
            email: session.email,
            full_name: profile.full_name,
            role: profile.role,
            created_at: profile.created_at,
        };
        info!(user_id = %user.id, "signed in");
        self.commit_user(Some(user));

        Ok(())
    }

    /// Register a new account and its profile record.
    ///
    /// Registration does not establish a local session; the caller must
    /// follow up with [`SessionStore::sign_in`] or a session check.
    ///
    /// # Errors
    ///
    /// Returns the human-readable failure reason; the local state is
    /// never touched.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), SessionError> {
        let email = Email::parse(email)?;

        let session = self.service.register(&email, password).await?;
        self.service
            .create_profile(&NewProfile {
                user_id: session.user_id.clone(),
                email: session.email,
                full_name: full_name.to_owned(),
                role: UserRole::Customer,
            })
            .await?;

        info!(user_id = %session.user_id, "account registered");
        Ok(())
    }

    /// Sign out.
    ///
    /// The remote call is attempted but its outcome is irrelevant to the
    /// local transition: the store always lands in anonymous.
    pub async fn sign_out(&self) {
        if let Err(err) = self.service.end_session().await {
            warn!(error = %err, "remote sign-out failed, clearing local session anyway");
        }
        info!("signed out");
        self.commit_user(None);
    }

    /// The current authenticated user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.lock_state().user.clone()
    }

    /// Whether the startup session check is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock_state().loading
    }

    /// Whether a user is currently authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_state().user.is_some()
    }

    /// Register a listener invoked after every committed transition.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Commit a user transition: mutate, persist, then notify.
    fn commit_user(&self, user: Option<UserIdentity>) {
        {
            let mut state = self.lock_state();
            state.user = user;
            let record = SessionRecord {
                version: SESSION_SCHEMA_VERSION,
                user: state.user.clone(),
            };
            if let Err(err) = self.persist.save(&record) {
                warn!(error = %err, "failed to persist session");
            }
        }
        self.listeners.notify();
    }
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};

use super::state::Session;
use crate::error::StorageError;
use crate::models::User;
use crate::storage::{TokenStorage, TOKEN_KEY};

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Observable authentication state, owned by the application root.
///
/// The session starts out anonymous and the storage is not read until
/// [`AuthStore::init`] is called, so the store can be built before durable
/// storage is available. Cloning yields another handle to the same state.
///
/// Mutations from different handles are serialized together with their
/// notifications, so every listener sees changes in the order they were
/// applied. Listeners may read the store or unsubscribe, but must not call
/// a mutator or `subscribe` from inside the callback.
#[derive(Clone)]
pub struct AuthStore {
    storage: Arc<dyn TokenStorage>,
    session: Arc<Mutex<Session>>,
    listeners: Arc<Mutex<Listeners>>,
    writer: Arc<Mutex<()>>,
}

/// Handle returned by [`AuthStore::subscribe`].
///
/// Dropping it leaves the listener registered; call
/// [`Subscription::unsubscribe`] to stop receiving updates.
#[must_use = "dropping a Subscription does not unsubscribe; keep it to call unsubscribe()"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl AuthStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            session: Arc::new(Mutex::new(Session::default())),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// The current session.
    pub fn snapshot(&self) -> Session {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register `listener`. It is called right away with the current session and
    /// then after every change, synchronously and in registration order.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let _writer = self.lock_writer();
        let id = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener.clone()));
            id
        };
        listener(&self.snapshot());
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Persist `token` and replace the whole session.
    ///
    /// With a `user` the session becomes authenticated; without one it holds
    /// just the token until [`AuthStore::set_user`] is called.
    pub fn login(&self, token: impl Into<String>, user: Option<User>) -> Result<(), StorageError> {
        let token = token.into();
        let _writer = self.lock_writer();
        self.storage.set(TOKEN_KEY, &token)?;
        info!(
            event_name = "session.login",
            event_domain = "session",
            with_user = user.is_some(),
            "session established"
        );
        let is_authenticated = user.is_some();
        self.apply(|_| Session {
            token: Some(token),
            user,
            is_authenticated,
        });
        Ok(())
    }

    /// Erase the persisted token and reset to an anonymous session.
    pub fn logout(&self) -> Result<(), StorageError> {
        let _writer = self.lock_writer();
        self.storage.remove(TOKEN_KEY)?;
        info!(
            event_name = "session.logout",
            event_domain = "session",
            "session cleared"
        );
        self.apply(|_| Session::default());
        Ok(())
    }

    /// Attach the user record, keeping whatever token the session holds.
    ///
    /// Sequence this after `init` or `login`: without a token the result is an
    /// authenticated session that cannot make authenticated requests.
    pub fn set_user(&self, user: User) {
        let _writer = self.lock_writer();
        self.apply(|current| {
            if current.token.is_none() {
                warn!(
                    event_name = "session.user_without_token",
                    event_domain = "session",
                    user_id = user.id,
                    "user set on a session that has no token"
                );
            }
            Session {
                token: current.token.clone(),
                user: Some(user),
                is_authenticated: true,
            }
        });
    }

    /// Load the persisted token into the session.
    ///
    /// Returns the token when one was stored. Otherwise the session is left
    /// untouched, listeners are not notified, and `None` is returned.
    pub fn init(&self) -> Result<Option<String>, StorageError> {
        let _writer = self.lock_writer();
        let Some(token) = self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
            debug!("No persisted token in {} storage", self.storage.get_name());
            return Ok(None);
        };
        debug!("Restored persisted token from {} storage", self.storage.get_name());
        let restored = token.clone();
        self.apply(|current| Session {
            token: Some(restored),
            ..current.clone()
        });
        Ok(Some(token))
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Caller holds the writer guard for the storage write, the swap and the notification.
    fn apply<F>(&self, update: F)
    where
        F: FnOnce(&Session) -> Session,
    {
        let next = {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            let next = update(&session);
            *session = next.clone();
            next
        };
        self.notify(&next);
    }

    // Only `writer` is held here, so listeners may read the store or unsubscribe.
    fn notify(&self, session: &Session) {
        let listeners: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.entries.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(session);
        }
    }
}

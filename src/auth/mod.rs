//! Local accounts and login state.

use std::sync::Arc;

use crate::app::{LudexError, Result};
use crate::domain::User;
use crate::session::SessionStore;
use crate::store::Store;

pub struct Auth<S: Store> {
    store: Arc<S>,
    session: Arc<dyn SessionStore + Send + Sync>,
}

impl<S: Store> Auth<S> {
    pub fn new(store: Arc<S>, session: Arc<dyn SessionStore + Send + Sync>) -> Self {
        Self { store, session }
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(LudexError::Validation(
                "Name, email and password are all required".into(),
            ));
        }

        let mut user = User::new(name.trim().into(), email.trim().into(), password.into());
        user.id = self
            .store
            .add_user(&user)?
            .ok_or_else(|| LudexError::Auth("email already registered".into()))?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(LudexError::Validation(
                "Email and password must not be empty".into(),
            ));
        }

        let user = self
            .store
            .find_user(email.trim(), password)?
            .ok_or_else(|| LudexError::Auth("invalid email or password".into()))?;

        self.session.save(true, user.id).await?;
        tracing::info!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await
    }

    /// The logged-in user's id, used as the bookmark owner.
    pub fn owner_id(&self) -> Result<i64> {
        self.session.current().owner_id().ok_or(LudexError::NotLoggedIn)
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        match self.session.current().owner_id() {
            Some(id) => self.store.get_user(id),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use crate::store::SqliteStore;
    use tokio_test::{assert_err, assert_ok};

    fn auth() -> Auth<SqliteStore> {
        Auth::new(
            Arc::new(SqliteStore::in_memory().unwrap()),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = auth();
        let user = auth.register("Rin", "rin@example.com", "hunter2").unwrap();
        assert!(user.id > 0);

        let logged_in = auth.login("rin@example.com", "hunter2").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.owner_id().unwrap(), user.id);
        assert_eq!(auth.current_user().unwrap().unwrap().name, "Rin");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = auth();
        auth.register("Rin", "rin@example.com", "hunter2").unwrap();

        let err = auth.login("rin@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, LudexError::Auth(_)));
        assert!(matches!(auth.owner_id(), Err(LudexError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let auth = auth();
        assert!(matches!(
            auth.register("", "a@b.c", "pw"),
            Err(LudexError::Validation(_))
        ));
        assert!(matches!(
            auth.login("  ", "pw").await,
            Err(LudexError::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let auth = auth();
        assert_ok!(auth.register("Rin", "rin@example.com", "a"));
        let err = assert_err!(auth.register("Rin 2", "rin@example.com", "b"));
        assert!(matches!(err, LudexError::Auth(_)));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let auth = auth();
        auth.register("Rin", "rin@example.com", "pw").unwrap();
        auth.login("rin@example.com", "pw").await.unwrap();

        assert_ok!(auth.logout().await);
        assert!(assert_ok!(auth.current_user()).is_none());
        // Logging out twice is harmless
        assert_ok!(auth.logout().await);
    }
}

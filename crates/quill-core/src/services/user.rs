use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{PasswordService, UserRepository};

/// Signup request, already shape-checked by the caller.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Account rules: unique emails, hashed credentials.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn sign_up(&self, request: SignUp) -> Result<User, DomainError> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&request.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let saved = self
            .users
            .save(User::new(request.name, request.email, password_hash))
            .await?;
        tracing::info!(user_id = %saved.id, "User signed up");
        Ok(saved)
    }

    /// Check credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::{FakeStore, PlainPasswords};

    fn service(store: &Arc<FakeStore>) -> UserService {
        UserService::new(store.clone(), Arc::new(PlainPasswords))
    }

    fn ada() -> SignUp {
        SignUp {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "analytical".into(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_hashes_password() {
        let store = FakeStore::new();
        let user = service(&store).sign_up(ada()).await.unwrap();

        assert_eq!(user.name, "Ada");
        assert_ne!(user.password_hash, "analytical");
        assert_eq!(service(&store).get_user(user.id).await.unwrap().email, user.email);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_email() {
        let store = FakeStore::new();
        let svc = service(&store);
        svc.sign_up(ada()).await.unwrap();

        let err = svc.sign_up(ada()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = FakeStore::new();
        let svc = service(&store);
        let user = svc.sign_up(ada()).await.unwrap();

        let found = svc
            .authenticate("ada@example.com", "analytical")
            .await
            .unwrap();
        assert_eq!(found.id, user.id);

        assert!(matches!(
            svc.authenticate("ada@example.com", "difference").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            svc.authenticate("bob@example.com", "analytical").await,
            Err(DomainError::Unauthorized)
        ));
    }
}

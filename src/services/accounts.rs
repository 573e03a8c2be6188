use std::sync::Arc;

use crate::auth::{generate_token, hash_password, verify_password, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{NewUser, UpdateProfileRequest, User, UserRole};
use crate::repo::UserRepo;
use crate::state::AppState;

/// Registration, login, and profile management.
pub struct AccountService {
    users: Arc<dyn UserRepo>,
}

impl AccountService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
        }
    }

    /// Creates a new member account and issues a token for it.
    ///
    /// Fails with `Conflict` if the username or email is already registered.
    /// The repository's unique constraints backstop the pre-checks against
    /// concurrent registrations.
    pub async fn register(&self, request: RegisterRequest) -> Result<(User, String), AppError> {
        if self
            .users
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".into()));
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .insert(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role: UserRole::Member,
            })
            .await?;

        let token = generate_token(user.id, user.role)?;
        Ok((user, token))
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email, wrong password, and deactivated accounts all yield the
    /// same `Unauthorized` message so the response does not reveal which
    /// accounts exist.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<(User, String), AppError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }

        let token = generate_token(user.id, user.role)?;
        Ok((user, token))
    }

    /// The caller's own profile. Tokens are stateless, so an account
    /// deactivated after issuance is re-checked here.
    pub async fn profile(&self, user_id: i32) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account not found".into()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Account deactivated".into()));
        }
        Ok(user)
    }

    /// Applies an email and/or password change to the caller's account.
    /// Fails with `Conflict` if the new email belongs to another account.
    pub async fn update_profile(
        &self,
        user_id: i32,
        request: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let mut user = self.profile(user_id).await?;

        if let Some(email) = request.email {
            user.email = email;
        }
        if let Some(password) = request.password {
            user.password_hash = hash_password(&password)?;
        }

        self.users.update(&user).await?;
        Ok(user)
    }

    /// Soft-deactivates the caller's account; the row is kept so owned
    /// pathways and progress history stay referentially intact.
    pub async fn deactivate(&self, user_id: i32) -> Result<(), AppError> {
        self.users.deactivate(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    fn service() -> AccountService {
        std::env::set_var("JWT_SECRET", "account-service-tests");
        AccountService::new(&AppState::in_memory())
    }

    #[actix_rt::test]
    async fn test_register_then_login() {
        let service = service();

        let (user, token) = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, UserRole::Member);
        assert!(!token.is_empty());

        let (logged_in, _) = service
            .authenticate(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[actix_rt::test]
    async fn test_duplicate_registration_conflicts() {
        let service = service();

        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service
                .register(register_request("alice", "second@example.com"))
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            service
                .register(register_request("alice2", "alice@example.com"))
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[actix_rt::test]
    async fn test_wrong_password_is_unauthorized() {
        let service = service();

        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service
                .authenticate(LoginRequest {
                    email: "alice@example.com".to_string(),
                    password: "wrong_password".to_string(),
                })
                .await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service
                .authenticate(LoginRequest {
                    email: "nobody@example.com".to_string(),
                    password: "password123".to_string(),
                })
                .await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_rt::test]
    async fn test_deactivated_account_cannot_login() {
        let service = service();

        let (user, _) = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();
        service.deactivate(user.id).await.unwrap();

        assert!(matches!(
            service
                .authenticate(LoginRequest {
                    email: "alice@example.com".to_string(),
                    password: "password123".to_string(),
                })
                .await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.profile(user.id).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_rt::test]
    async fn test_update_profile_email_conflict() {
        let service = service();

        let (alice, _) = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();
        service
            .register(register_request("bob", "bob@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service
                .update_profile(
                    alice.id,
                    UpdateProfileRequest {
                        email: Some("bob@example.com".to_string()),
                        password: None,
                    },
                )
                .await,
            Err(AppError::Conflict(_))
        ));

        let updated = service
            .update_profile(
                alice.id,
                UpdateProfileRequest {
                    email: Some("alice@new.example.com".to_string()),
                    password: Some("new_password".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "alice@new.example.com");

        // New password works, old one does not.
        assert!(service
            .authenticate(LoginRequest {
                email: "alice@new.example.com".to_string(),
                password: "new_password".to_string(),
            })
            .await
            .is_ok());
        assert!(service
            .authenticate(LoginRequest {
                email: "alice@new.example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .is_err());
    }
}

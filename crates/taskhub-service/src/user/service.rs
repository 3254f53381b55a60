//! Signup, login, logout and self-service profile management.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use taskhub_auth::jwt::{IssuedToken, JwtEncoder};
use taskhub_auth::password::PasswordHasher;
use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::traits::{TaskRepository, UserRepository};
use taskhub_core::types::id::UserId;
use taskhub_entity::user::normalize_email;
use taskhub_entity::{Task, User, UserChanges};

const MAX_NAME_LENGTH: usize = 50;
const EMAIL_IN_USE: &str = "Email already in use";
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// New account details.
#[derive(Debug, Clone)]
pub struct SignupInput {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Profile changes. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
}

/// An authenticated user together with the token just issued for them.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The user.
    pub user: User,
    /// Issued bearer token.
    #[serde(flatten)]
    pub token: IssuedToken,
}

/// Manages user accounts and their active tokens.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository<User>>,
    tasks: Arc<dyn TaskRepository<Task>>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    password_min_length: usize,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserRepository<User>>,
        tasks: Arc<dyn TaskRepository<Task>>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        password_min_length: usize,
    ) -> Self {
        Self {
            users,
            tasks,
            hasher,
            encoder,
            password_min_length,
        }
    }

    /// Registers a new account and signs it in.
    pub async fn signup(&self, input: SignupInput) -> Result<AuthSession, AppError> {
        self.check_name(&input.name)?;
        self.check_password(&input.password)?;

        let email = normalize_email(&input.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::validation(EMAIL_IN_USE));
        }

        let hash = self.hasher.hash_password(&input.password)?;
        let user = User::new(&input.name, &email, hash);
        let user = self.users.create(&user).await.map_err(email_conflict)?;

        info!(user_id = %user.id, "User signed up");
        self.start_session(user).await
    }

    /// Verifies credentials and issues a new token.
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AppError> {
        let user = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or_else(|| AppError::validation(INVALID_CREDENTIALS))?;

        if !self
            .hasher
            .verify_password(&input.password, &user.password_hash)?
        {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(AppError::validation(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "User logged in");
        self.start_session(user).await
    }

    /// Revokes the given token.
    pub async fn logout(&self, user_id: UserId, token: &str) -> Result<(), AppError> {
        let removed = self.users.remove_token(user_id, token).await?;
        debug!(user_id = %user_id, removed, "User logged out");
        Ok(())
    }

    /// Whether the token is still active for the user.
    pub async fn is_token_active(&self, user_id: UserId, token: &str) -> Result<bool, AppError> {
        self.users.has_token(user_id, token).await
    }

    /// Returns the user's profile.
    pub async fn profile(&self, user_id: UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Applies profile changes.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        input: UpdateProfileInput,
    ) -> Result<User, AppError> {
        let mut user = self.profile(user_id).await?;

        if let Some(ref name) = input.name {
            self.check_name(name)?;
        }
        let password_hash = match input.password {
            Some(ref password) => {
                self.check_password(password)?;
                Some(self.hasher.hash_password(password)?)
            }
            None => None,
        };

        UserChanges {
            name: input.name,
            email: input.email,
            password_hash,
        }
        .apply(&mut user);

        let user = self.users.update(&user).await.map_err(email_conflict)?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Deletes the account and every task it owns.
    pub async fn delete_account(&self, user_id: UserId) -> Result<User, AppError> {
        let user = self.profile(user_id).await?;
        let removed_tasks = self.tasks.delete_all_for_owner(user_id).await?;
        self.users.delete(user_id).await?;
        info!(user_id = %user_id, removed_tasks, "Account deleted");
        Ok(user)
    }

    async fn start_session(&self, user: User) -> Result<AuthSession, AppError> {
        let token = self.encoder.issue(user.id)?;
        self.users.add_token(user.id, &token.token).await?;
        Ok(AuthSession { user, token })
    }

    fn check_name(&self, name: &str) -> Result<(), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "Name cannot exceed {MAX_NAME_LENGTH} characters"
            )));
        }
        Ok(())
    }

    fn check_password(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }
        Ok(())
    }
}

fn email_conflict(err: AppError) -> AppError {
    if err.kind == ErrorKind::Conflict {
        AppError::validation(EMAIL_IN_USE)
    } else {
        err
    }
}

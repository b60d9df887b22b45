//! Account creation: the single signup path behind `/` and `/signup/`.

use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{User, Wallet};
use crate::repositories::UserRepository;

pub const FIELDS_REQUIRED: &str = "All fields are required.";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match.";
pub const ACCOUNT_CREATED: &str = "Account created successfully. Please log in.";

/// Signup form as posted by the browser; absent fields default to empty.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Validate)]
struct RequiredFields {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    password: String,
}

pub struct AccountService;

impl AccountService {
    /// Validate the form, create the user and their wallet.
    ///
    /// Errors: [`AppError::Validation`] for missing fields or mismatched
    /// passwords, [`AppError::DuplicateUsername`] when the name is taken.
    pub async fn signup(users: &dyn UserRepository, form: &SignupForm) -> AppResult<(User, Wallet)> {
        let username = form.username.trim();
        RequiredFields {
            username: username.to_string(),
            password: form.password.clone(),
        }
        .validate()
        .map_err(|_| AppError::Validation(FIELDS_REQUIRED.to_string()))?;

        if form.password != form.confirm_password {
            return Err(AppError::Validation(PASSWORDS_DIFFER.to_string()));
        }

        let email = form
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        let (user, wallet) = users.create_account(username, &form.password, email).await?;
        info!(user_id = %user.id, username = %user.username, "account created");
        Ok((user, wallet))
    }
}

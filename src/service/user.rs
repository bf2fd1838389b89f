use tracing::{info, warn};

use super::clean_optional;
use crate::db::Database;
use crate::error::{NotebridgeError, Result};
use crate::models::{NewUser, RegisterUserRequest, Role, UpdateUserRequest, User};
use crate::password::{hash_password, verify_password};
use crate::validation::InputValidator;

/// Account registration, lookup, profile updates and credential checks
#[derive(Clone)]
pub struct UserService {
    db: Database,
}

impl UserService {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Public self-registration. Never creates an admin.
    pub fn register(&self, request: RegisterUserRequest) -> Result<User> {
        if request.role == Some(Role::Admin) {
            return Err(NotebridgeError::forbidden("Cannot self-register as ADMIN"));
        }
        self.create_user(request)
    }

    /// Create an account with any role, including admin
    pub fn create_user(&self, request: RegisterUserRequest) -> Result<User> {
        let username = request.username.as_deref().map(str::trim).unwrap_or_default().to_string();
        let email = request.email.as_deref().map(str::trim).unwrap_or_default().to_string();
        let password = request.password.unwrap_or_default();

        InputValidator::validate_username(&username)?;
        InputValidator::validate_email(&email)?;
        InputValidator::validate_password(&password)?;

        let bio = clean_optional(request.bio);
        let instrument = clean_optional(request.instrument);
        let first_name = clean_optional(request.first_name);
        let last_name = clean_optional(request.last_name);
        let phone_number = clean_optional(request.phone_number);
        validate_profile(bio.as_deref(), instrument.as_deref(), first_name.as_deref(), last_name.as_deref(), phone_number.as_deref())?;

        if self.db.find_user_by_username(&username)?.is_some() {
            return Err(NotebridgeError::validation("Username already exists"));
        }
        if self.db.find_user_by_email(&email)?.is_some() {
            return Err(NotebridgeError::validation("Email already exists"));
        }

        let new_user = NewUser {
            username,
            password_hash: hash_password(&password)?,
            email,
            role: request.role.unwrap_or_default(),
            instrument,
            bio,
            first_name,
            last_name,
            phone_number,
        };

        let user = self.db.insert_user(&new_user)?;
        info!(user_id = user.id, username = %user.username, role = %user.role, "Created user");
        Ok(user)
    }

    /// Look up a user by id
    pub fn get_user(&self, user_id: i64) -> Result<User> {
        self.db
            .find_user(user_id)?
            .ok_or_else(|| NotebridgeError::not_found(format!("User not found with ID: {user_id}")))
    }

    /// Every account, admin only
    pub fn list_users(&self, caller: &User) -> Result<Vec<User>> {
        if !caller.is_admin() {
            return Err(NotebridgeError::forbidden("Only admins can list users"));
        }
        self.db.list_users()
    }

    /// Partial profile update by the same user or an admin
    pub fn update_user(&self, caller: &User, user_id: i64, request: UpdateUserRequest) -> Result<User> {
        let mut user = self.get_user(user_id)?;
        if !caller.is_self_or_admin(user_id) {
            return Err(NotebridgeError::forbidden("You can only update your own profile"));
        }

        if let Some(email) = request.email {
            let email = email.trim().to_string();
            InputValidator::validate_email(&email)?;
            if email != user.email {
                if self.db.find_user_by_email(&email)?.is_some() {
                    return Err(NotebridgeError::validation("Email already exists"));
                }
                user.email = email;
            }
        }

        if let Some(password) = request.password {
            InputValidator::validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }

        // Present fields overwrite, blanks clear
        if request.bio.is_some() {
            user.bio = clean_optional(request.bio);
        }
        if request.instrument.is_some() {
            user.instrument = clean_optional(request.instrument);
        }
        if request.first_name.is_some() {
            user.first_name = clean_optional(request.first_name);
        }
        if request.last_name.is_some() {
            user.last_name = clean_optional(request.last_name);
        }
        if request.phone_number.is_some() {
            user.phone_number = clean_optional(request.phone_number);
        }
        validate_profile(
            user.bio.as_deref(),
            user.instrument.as_deref(),
            user.first_name.as_deref(),
            user.last_name.as_deref(),
            user.phone_number.as_deref(),
        )?;

        let user = self.db.update_user(&user)?;
        info!(user_id = user.id, updated_by = caller.id, "Updated user");
        Ok(user)
    }

    /// Resolve Basic credentials to a user
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let Some(user) = self.db.find_user_by_username(username)? else {
            warn!(username, "Login attempt for unknown user");
            return Err(NotebridgeError::Unauthenticated("Invalid username or password".to_string()));
        };

        if !verify_password(password, &user.password_hash) {
            warn!(username, "Login attempt with wrong password");
            return Err(NotebridgeError::Unauthenticated("Invalid username or password".to_string()));
        }

        Ok(user)
    }
}

fn validate_profile(
    bio: Option<&str>,
    instrument: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone_number: Option<&str>,
) -> Result<()> {
    if let Some(bio) = bio {
        InputValidator::validate_bio(bio)?;
    }
    if let Some(instrument) = instrument {
        InputValidator::validate_instrument(instrument)?;
    }
    if let Some(first_name) = first_name {
        InputValidator::validate_name("First name", first_name)?;
    }
    if let Some(last_name) = last_name {
        InputValidator::validate_name("Last name", last_name)?;
    }
    if let Some(phone) = phone_number {
        InputValidator::validate_phone(phone)?;
    }
    Ok(())
}

use crate::{
    database::{MongoDB, FRIDGE_ENTRIES, USERNAME_INDEX, USERS},
    models::{CurrentUser, FridgeEntry, FridgeEntryResponse, User, UserInfo},
    services::credential_service::CredentialService,
    utils::{is_duplicate_key_on, AppError},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

// Request/Response structures

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 20, message = "username must be 1-20 characters"))]
    pub username: String,
    #[validate(length(min = 10, message = "password must be 10 or more characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub user_img: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 20, message = "username must be 1-20 characters"))]
    pub username: String,
    #[validate(length(min = 10, message = "password must be 10 or more characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

const LOGIN_FAILED: &str = "Login failed";

/// Creates a new account. The password is stored as a bcrypt hash only.
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<UserInfo, AppError> {
    request.validate()?;

    let collection = db.collection::<User>(USERS);

    if collection
        .find_one(doc! { "username": &request.username })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let new_user = User {
        id: db.next_id(USERS).await?,
        username: request.username.clone(),
        password_hash,
        email: request.email.clone(),
        user_img: request.user_img.clone(),
        created_at: chrono::Utc::now().timestamp(),
    };

    // Two concurrent registrations can both pass the check above
    if let Err(e) = collection.insert_one(&new_user).await {
        if is_duplicate_key_on(&e, USERNAME_INDEX) {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
        return Err(e.into());
    }

    log::info!("✅ User registered successfully: {} (id {})", new_user.username, new_user.id);

    Ok(UserInfo::from(new_user))
}

/// Verifies the password and mints a session token. Unknown usernames and
/// wrong passwords produce the same error.
pub async fn login(
    db: &MongoDB,
    credentials: &CredentialService,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    request.validate()?;

    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "username": &request.username })
        .await?
        .ok_or_else(|| AppError::InvalidRequest(LOGIN_FAILED.to_string()))?;

    let valid = verify(&request.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::InvalidRequest(LOGIN_FAILED.to_string()));
    }

    let mut extra = Map::new();
    extra.insert("username".to_string(), Value::from(user.username.clone()));

    let token = credentials
        .mint(user.id, extra)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

    Ok(LoginResponse { token })
}

/// The token's user plus their fridge. A token can outlive its user, in
/// which case this is a 404.
pub async fn get_current_user(db: &MongoDB, user_id: i64) -> Result<CurrentUser, AppError> {
    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let fridge: Vec<FridgeEntry> = db
        .collection::<FridgeEntry>(FRIDGE_ENTRIES)
        .find(doc! { "user_id": user_id })
        .sort(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(CurrentUser {
        user: UserInfo::from(user),
        fridge: fridge.into_iter().map(FridgeEntryResponse::from).collect(),
    })
}

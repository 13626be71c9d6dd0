use serde::{Deserialize, Serialize};

use super::FridgeEntryResponse;

/// User document as stored in the `users` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: i64,
    pub username: String,
    /// bcrypt hash, never the submitted password
    pub password_hash: String,
    pub email: String,
    pub user_img: Option<String>,
    pub created_at: i64,
}

/// Public view of a user, without credentials.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub user_img: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            user_img: user.user_img,
        }
    }
}

/// `GET /auth/me` payload: the user plus current fridge contents.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: UserInfo,
    pub fridge: Vec<FridgeEntryResponse>,
}

use serde::{Deserialize, Serialize};

/// One product held by one user, as stored in `fridge_entries`.
/// Nothing stops a user from holding the same product twice.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FridgeEntry {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub product_count: i32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FridgeEntryResponse {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub product_count: i32,
}

impl From<FridgeEntry> for FridgeEntryResponse {
    fn from(entry: FridgeEntry) -> Self {
        FridgeEntryResponse {
            id: entry.id,
            user_id: entry.user_id,
            product_id: entry.product_id,
            product_count: entry.product_count,
        }
    }
}

// ==================== FRIDGE MANAGEMENT ====================
// Every operation is scoped to the authenticated user's own entries

use crate::{
    database::{MongoDB, FRIDGE_ENTRIES, PRODUCTS},
    models::{FridgeEntry, FridgeEntryResponse, Product},
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetFridgeRequest {
    pub product_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFridgeItemRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "productCount must be at least 1"))]
    pub product_count: Option<i32>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RemoveFridgeEntriesRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FridgeResponse {
    pub success: bool,
    pub entries: Vec<FridgeEntryResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RemoveFridgeEntriesResponse {
    pub success: bool,
    pub deleted: u64,
}

// ==================== SERVICE FUNCTIONS ====================

pub async fn list_fridge(db: &MongoDB, user_id: i64) -> Result<FridgeResponse, AppError> {
    let entries: Vec<FridgeEntry> = db
        .collection::<FridgeEntry>(FRIDGE_ENTRIES)
        .find(doc! { "user_id": user_id })
        .sort(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(fridge_response(entries))
}

/// Replaces the user's fridge with one entry per product id.
///
/// Delete and insert commit together, so concurrent readers see either the
/// old contents or the new ones. Requires a replica-set deployment.
pub async fn set_fridge_contents(
    db: &MongoDB,
    user_id: i64,
    request: SetFridgeRequest,
) -> Result<FridgeResponse, AppError> {
    let entries = match u32::try_from(request.product_ids.len()) {
        Ok(0) => Vec::new(),
        Ok(n) => {
            let ids = db.next_ids(FRIDGE_ENTRIES, n).await?;
            build_entries(user_id, &request.product_ids, ids)
        }
        Err(_) => return Err(AppError::InvalidRequest("Too many products".to_string())),
    };

    let collection = db.collection::<FridgeEntry>(FRIDGE_ENTRIES);
    let mut session = db.start_session().await?;
    session.start_transaction().await?;

    let replaced = async {
        let removed = collection
            .delete_many(doc! { "user_id": user_id })
            .session(&mut session)
            .await?;

        if !entries.is_empty() {
            collection.insert_many(&entries).session(&mut session).await?;
        }

        Ok::<u64, mongodb::error::Error>(removed.deleted_count)
    }
    .await;

    match replaced {
        Ok(removed) => {
            session.commit_transaction().await?;
            log::info!(
                "🧊 Fridge of user {} replaced: {} removed, {} added",
                user_id,
                removed,
                entries.len()
            );
            Ok(fridge_response(entries))
        }
        Err(e) => {
            if let Err(abort_err) = session.abort_transaction().await {
                log::warn!("⚠️ Failed to abort fridge transaction: {}", abort_err);
            }
            Err(e.into())
        }
    }
}

pub async fn add_fridge_item(
    db: &MongoDB,
    user_id: i64,
    request: AddFridgeItemRequest,
) -> Result<FridgeEntryResponse, AppError> {
    request.validate()?;

    let product_exists = db
        .collection::<Product>(PRODUCTS)
        .find_one(doc! { "_id": request.product_id })
        .await?
        .is_some();

    if !product_exists {
        return Err(AppError::NotFound(format!("Product {} not found", request.product_id)));
    }

    let entry = FridgeEntry {
        id: db.next_id(FRIDGE_ENTRIES).await?,
        user_id,
        product_id: request.product_id,
        product_count: request.product_count.unwrap_or(1),
    };

    db.collection::<FridgeEntry>(FRIDGE_ENTRIES)
        .insert_one(&entry)
        .await?;

    Ok(FridgeEntryResponse::from(entry))
}

/// Removes the listed entries. Ids belonging to other users are ignored.
pub async fn remove_fridge_entries(
    db: &MongoDB,
    user_id: i64,
    request: RemoveFridgeEntriesRequest,
) -> Result<RemoveFridgeEntriesResponse, AppError> {
    if request.ids.is_empty() {
        return Ok(RemoveFridgeEntriesResponse { success: true, deleted: 0 });
    }

    let result = db
        .collection::<FridgeEntry>(FRIDGE_ENTRIES)
        .delete_many(doc! { "_id": { "$in": request.ids.clone() }, "user_id": user_id })
        .await?;

    Ok(RemoveFridgeEntriesResponse {
        success: true,
        deleted: result.deleted_count,
    })
}

fn build_entries(user_id: i64, product_ids: &[i64], ids: impl Iterator<Item = i64>) -> Vec<FridgeEntry> {
    product_ids
        .iter()
        .zip(ids)
        .map(|(&product_id, id)| FridgeEntry {
            id,
            user_id,
            product_id,
            product_count: 1,
        })
        .collect()
}

fn fridge_response(entries: Vec<FridgeEntry>) -> FridgeResponse {
    let entries: Vec<FridgeEntryResponse> = entries.into_iter().map(FridgeEntryResponse::from).collect();
    FridgeResponse {
        success: true,
        count: entries.len(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_entries_one_per_product() {
        let entries = build_entries(9, &[4, 4, 7], 100..=102);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![100, 101, 102]);
        assert_eq!(entries.iter().map(|e| e.product_id).collect::<Vec<_>>(), vec![4, 4, 7]);
        assert!(entries.iter().all(|e| e.user_id == 9 && e.product_count == 1));
    }

    #[test]
    fn test_add_item_count_must_be_positive() {
        let zero = AddFridgeItemRequest { product_id: 1, product_count: Some(0) };
        assert!(zero.validate().is_err());

        let default_count = AddFridgeItemRequest { product_id: 1, product_count: None };
        assert!(default_count.validate().is_ok());
    }

    #[test]
    fn test_set_request_shape() {
        let parsed: SetFridgeRequest = serde_json::from_str(r#"{"productIds":[1,2,3]}"#).unwrap();
        assert_eq!(parsed.product_ids, vec![1, 2, 3]);

        assert!(serde_json::from_str::<SetFridgeRequest>(r#"{"productIds":["milk"]}"#).is_err());
    }

    #[test]
    fn test_fridge_response_counts_entries() {
        let response = fridge_response(build_entries(1, &[5, 6], 1..=2));
        assert_eq!(response.count, 2);
        assert!(response.success);
    }

    // Live-database tests. Each run uses fresh user ids from the counters
    // collection so reruns do not collide.

    async fn fresh_user(db: &MongoDB) -> i64 {
        db.next_id("test_users").await.unwrap()
    }

    async fn stocked_product(db: &MongoDB) -> i64 {
        let id = db.next_id(PRODUCTS).await.unwrap();
        db.collection::<Product>(PRODUCTS)
            .insert_one(Product { id, name: format!("test product {}", id) })
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_remove_ignores_other_users_entries() {
        let db = MongoDB::connect_for_tests().await.unwrap();
        let (owner, intruder) = (fresh_user(&db).await, fresh_user(&db).await);
        let product_id = stocked_product(&db).await;

        let entry = add_fridge_item(&db, owner, AddFridgeItemRequest { product_id, product_count: None })
            .await
            .unwrap();
        assert_eq!(entry.product_count, 1);

        let removed = remove_fridge_entries(&db, intruder, RemoveFridgeEntriesRequest { ids: vec![entry.id] })
            .await
            .unwrap();
        assert_eq!(removed.deleted, 0);

        let owner_fridge = list_fridge(&db, owner).await.unwrap();
        assert_eq!(owner_fridge.entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![entry.id]);
        assert_eq!(list_fridge(&db, intruder).await.unwrap().count, 0);

        let removed = remove_fridge_entries(&db, owner, RemoveFridgeEntriesRequest { ids: vec![entry.id] })
            .await
            .unwrap();
        assert_eq!(removed.deleted, 1);
        assert_eq!(list_fridge(&db, owner).await.unwrap().count, 0);
    }

    #[tokio::test]
    #[ignore] // Requires a MongoDB replica set (transactions)
    async fn test_set_contents_replaces_previous_entries() {
        let db = MongoDB::connect_for_tests().await.unwrap();
        let user_id = fresh_user(&db).await;

        let first = set_fridge_contents(&db, user_id, SetFridgeRequest { product_ids: vec![1, 2, 3] })
            .await
            .unwrap();
        assert_eq!(first.count, 3);

        set_fridge_contents(&db, user_id, SetFridgeRequest { product_ids: vec![9] })
            .await
            .unwrap();
        let listed = list_fridge(&db, user_id).await.unwrap();
        assert_eq!(listed.entries.iter().map(|e| e.product_id).collect::<Vec<_>>(), vec![9]);

        let emptied = set_fridge_contents(&db, user_id, SetFridgeRequest { product_ids: vec![] })
            .await
            .unwrap();
        assert_eq!(emptied.count, 0);
        assert_eq!(list_fridge(&db, user_id).await.unwrap().count, 0);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_add_unknown_product_is_not_found() {
        let db = MongoDB::connect_for_tests().await.unwrap();
        let user_id = fresh_user(&db).await;

        let result = add_fridge_item(&db, user_id, AddFridgeItemRequest { product_id: -1, product_count: Some(2) }).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(list_fridge(&db, user_id).await.unwrap().count, 0);
    }
}

use crate::{
    database::{MongoDB, FRIDGE_ENTRIES, RECIPES},
    models::{FridgeEntry, Recipe},
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchingRecipesResponse {
    pub matching_recipe_ids: Vec<i64>,
}

/// Ids of the recipes whose every ingredient is in `owned`, in input order.
///
/// Duplicate ingredient lines collapse, and a recipe with no ingredients is
/// always makeable. Runs in O(total ingredient lines).
pub fn compute_available(owned: &HashSet<i64>, recipes: &[Recipe]) -> Vec<i64> {
    recipes
        .iter()
        .filter(|recipe| {
            recipe
                .ingredient_list()
                .iter()
                .all(|ingredient| owned.contains(&ingredient.product_id))
        })
        .map(|recipe| recipe.id)
        .collect()
}

/// Loads the user's fridge and the full recipe catalog, then matches.
pub async fn matching_recipes_for_user(db: &MongoDB, user_id: i64) -> Result<MatchingRecipesResponse, AppError> {
    let owned: HashSet<i64> = db
        .collection::<FridgeEntry>(FRIDGE_ENTRIES)
        .find(doc! { "user_id": user_id })
        .await?
        .try_collect::<Vec<_>>()
        .await?
        .into_iter()
        .map(|entry| entry.product_id)
        .collect();

    let recipes: Vec<Recipe> = db
        .collection::<Recipe>(RECIPES)
        .find(doc! {})
        .sort(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?;

    let matching_recipe_ids = compute_available(&owned, &recipes);

    log::debug!(
        "User {} owns {} products, can make {} of {} recipes",
        user_id,
        owned.len(),
        matching_recipe_ids.len(),
        recipes.len()
    );

    Ok(MatchingRecipesResponse { matching_recipe_ids })
}

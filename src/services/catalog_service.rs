use crate::{
    database::{MongoDB, CATEGORIES, PRODUCTS, RECIPES},
    models::{
        Category, CategoryResponse, IngredientResponse, Product, ProductResponse, Recipe,
        RecipeIngredientLink, RecipeResponse,
    },
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use rand::Rng;
use std::collections::HashMap;

pub async fn list_products(db: &MongoDB) -> Result<Vec<ProductResponse>, AppError> {
    let products: Vec<Product> = db
        .collection::<Product>(PRODUCTS)
        .find(doc! {})
        .sort(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(products.into_iter().map(ProductResponse::from).collect())
}

/// All recipes with their category and ingredient lines.
pub async fn list_recipes(db: &MongoDB) -> Result<Vec<RecipeResponse>, AppError> {
    let recipes = all_recipes(db).await?;
    let categories = categories_by_id(db).await?;

    Ok(recipes
        .into_iter()
        .map(|recipe| to_response(recipe, &categories, None))
        .collect())
}

/// One `(recipe, product)` link per ingredient line.
pub async fn list_recipe_ingredients(db: &MongoDB) -> Result<Vec<RecipeIngredientLink>, AppError> {
    Ok(ingredient_links(&all_recipes(db).await?))
}

/// A uniformly chosen recipe, or `NotFound` when the catalog is empty.
pub async fn random_recipe(db: &MongoDB) -> Result<RecipeResponse, AppError> {
    let collection = db.collection::<Recipe>(RECIPES);

    let total = collection.count_documents(doc! {}).await?;
    if total == 0 {
        return Err(AppError::NotFound("No recipes available".to_string()));
    }

    let skip = rand::thread_rng().gen_range(0..total);

    let recipe = collection
        .find_one(doc! {})
        .sort(doc! { "_id": 1 })
        .skip(skip)
        .await?
        // Deleted between count and fetch
        .ok_or_else(|| AppError::NotFound("No recipes available".to_string()))?;

    let categories = categories_by_id(db).await?;
    Ok(to_response(recipe, &categories, None))
}

/// Recipe with its category and the name of each ingredient's product.
pub async fn recipe_detail(db: &MongoDB, recipe_id: i64) -> Result<RecipeResponse, AppError> {
    let recipe = db
        .collection::<Recipe>(RECIPES)
        .find_one(doc! { "_id": recipe_id })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Can't find recipe with ID {}", recipe_id)))?;

    let category = db
        .collection::<Category>(CATEGORIES)
        .find_one(doc! { "_id": recipe.category_id })
        .await?;
    let categories: HashMap<i64, Category> = category.into_iter().map(|c| (c.id, c)).collect();

    let product_ids: Vec<i64> = recipe.ingredient_list().iter().map(|i| i.product_id).collect();
    let product_names: HashMap<i64, String> = db
        .collection::<Product>(PRODUCTS)
        .find(doc! { "_id": { "$in": product_ids } })
        .await?
        .try_collect::<Vec<_>>()
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    Ok(to_response(recipe, &categories, Some(&product_names)))
}

/// Parses the `{id}` path segment of the detail route.
pub fn parse_recipe_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidRequest("Wrong request! Recipe ID needed!".to_string()))
}

async fn all_recipes(db: &MongoDB) -> Result<Vec<Recipe>, AppError> {
    Ok(db
        .collection::<Recipe>(RECIPES)
        .find(doc! {})
        .sort(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?)
}

async fn categories_by_id(db: &MongoDB) -> Result<HashMap<i64, Category>, AppError> {
    let categories: Vec<Category> = db
        .collection::<Category>(CATEGORIES)
        .find(Document::new())
        .await?
        .try_collect()
        .await?;

    Ok(categories.into_iter().map(|c| (c.id, c)).collect())
}

fn ingredient_links(recipes: &[Recipe]) -> Vec<RecipeIngredientLink> {
    recipes
        .iter()
        .flat_map(|recipe| {
            recipe.ingredient_list().iter().map(move |ingredient| RecipeIngredientLink {
                recipe_id: recipe.id,
                product_id: ingredient.product_id,
                amount: ingredient.amount.clone(),
            })
        })
        .collect()
}

fn to_response(
    recipe: Recipe,
    categories: &HashMap<i64, Category>,
    product_names: Option<&HashMap<i64, String>>,
) -> RecipeResponse {
    let ingredients = recipe
        .ingredient_list()
        .iter()
        .map(|ingredient| IngredientResponse {
            product_id: ingredient.product_id,
            product_name: product_names.and_then(|names| names.get(&ingredient.product_id).cloned()),
            amount: ingredient.amount.clone(),
        })
        .collect();

    RecipeResponse {
        id: recipe.id,
        category: categories.get(&recipe.category_id).cloned().map(CategoryResponse::from),
        category_id: recipe.category_id,
        name: recipe.name,
        description: recipe.description,
        image: recipe.image,
        ingredients,
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
}

/// One ingredient line of a recipe. Embedded in the recipe document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// Recipe document as stored in the `recipes` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 0 when the document has no category; no category carries that id.
    #[serde(default)]
    pub category_id: i64,
    /// Older documents may lack the field entirely; treated as no ingredients.
    #[serde(default)]
    pub ingredients: Option<Vec<RecipeIngredient>>,
}

impl Recipe {
    pub fn ingredient_list(&self) -> &[RecipeIngredient] {
        self.ingredients.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        CategoryResponse { id: c.id, name: c.name }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub product_id: i64,
    /// Filled in on the detail view only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category_id: i64,
    pub category: Option<CategoryResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

/// Flat recipe → product link, one per ingredient line.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientLink {
    pub recipe_id: i64,
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_sparse_recipe_document_still_loads() {
        let recipe: Recipe = bson::from_document(doc! { "_id": 12_i64 }).unwrap();

        assert_eq!(recipe.id, 12);
        assert_eq!(recipe.category_id, 0);
        assert!(recipe.name.is_empty());
        assert!(recipe.ingredient_list().is_empty());
    }

    #[test]
    fn test_full_recipe_document() {
        let recipe: Recipe = bson::from_document(doc! {
            "_id": 3_i64,
            "name": "Pancakes",
            "category_id": 2_i64,
            "ingredients": [
                { "product_id": 1_i64, "amount": "2 cups" },
                { "product_id": 4_i64 },
            ],
        })
        .unwrap();

        assert_eq!(recipe.category_id, 2);
        assert_eq!(
            recipe.ingredient_list().iter().map(|i| i.product_id).collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert_eq!(recipe.ingredient_list()[0].amount.as_deref(), Some("2 cups"));
    }
}

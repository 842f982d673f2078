//! Cookbook domain model and grouping queries.
//!
//! The three entity types mirror the book data files: categories and recipes
//! are declared explicitly in JSON, ingredients exist implicitly through the
//! ingredient lists of recipes. Entities reference each other by name key
//! (a recipe holds its category's name, an `IngredientQuantity` holds its
//! ingredient's name); the [`Cookbook`] owns one [`Registry`] per entity
//! type and resolves references at query time.
//!
//! ## Grouping queries
//!
//! The render stage consumes two reports:
//!
//! - [`Cookbook::recipes_by_category`] drives the main body of the book:
//!   one group per category (empty categories included), groups ordered by
//!   the category's `order` field, recipes within a group by their `order`
//!   field.
//! - [`Cookbook::recipes_by_ingredient`] drives the back-of-book index:
//!   one group per ingredient, alphabetical, recipes within a group
//!   alphabetical by name. A recipe appears in every group whose ingredient
//!   it uses.
//!
//! Both sorts are stable, so ties fall back to insertion order (the order
//! entities appeared in the data files).

use crate::registry::{Keyed, Registry};
use serde::{Deserialize, Serialize};

/// A recipe category. Keyed by `name`; `order` controls its position in the
/// book body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Category name in Arabic, shown alongside the Latin name.
    pub arabic_name: String,
    pub order: u32,
}

impl Keyed for Category {
    fn key(&self) -> &str {
        &self.name
    }
}

/// An ingredient, keyed by `name`. Carries no other data — it exists so the
/// ingredient index can enumerate every distinct ingredient in the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
}

impl Keyed for Ingredient {
    fn key(&self) -> &str {
        &self.name
    }
}

/// One line of a recipe's ingredient list: an ingredient reference plus a
/// free-form quantity ("2 cups", "a pinch").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientQuantity {
    /// Key into the cookbook's ingredient registry.
    pub ingredient: String,
    pub quantity: String,
}

/// A recipe. Keyed by `name`; `order` controls its position within its
/// category, `category` is a key into the category registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub order: u32,
    pub category: String,
    pub name: String,
    /// Recipe name in Arabic, shown alongside the Latin name.
    pub arabic_name: String,
    /// Photo path relative to the data directory (e.g. `images/kofta.jpg`).
    pub image_path: String,
    /// Short description, markdown allowed.
    pub description: String,
    pub servings: u32,
    pub ingredients: Vec<IngredientQuantity>,
    pub instructions: Vec<String>,
}

impl Keyed for Recipe {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Recipe {
    /// Whether this recipe's ingredient list references `ingredient` (by
    /// name). A membership test — multiple uses count once.
    pub fn has_ingredient(&self, ingredient: &str) -> bool {
        self.ingredients.iter().any(|iq| iq.ingredient == ingredient)
    }

    pub fn is_in_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// All recipes in one category, in book order.
#[derive(Debug)]
pub struct CategoryGroup<'a> {
    pub category: &'a Category,
    pub recipes: Vec<&'a Recipe>,
}

/// All recipes using one ingredient, alphabetical.
#[derive(Debug)]
pub struct IngredientGroup<'a> {
    pub ingredient: &'a Ingredient,
    pub recipes: Vec<&'a Recipe>,
}

/// The loaded book: one registry per entity type plus the optional intro
/// text for the cover page.
#[derive(Debug)]
pub struct Cookbook {
    pub categories: Registry<Category>,
    pub recipes: Registry<Recipe>,
    pub ingredients: Registry<Ingredient>,
    /// Raw markdown from `intro.md`, if the data directory has one.
    pub intro: Option<String>,
}

impl Cookbook {
    pub fn new() -> Self {
        Self {
            categories: Registry::new("category"),
            recipes: Registry::new("recipe"),
            ingredients: Registry::new("ingredient"),
            intro: None,
        }
    }

    /// Group recipes by category for the book body.
    ///
    /// Every category yields a group, even with no recipes (its divider
    /// page still gets printed). Groups are sorted by `category.order`,
    /// recipes within a group by `recipe.order`.
    pub fn recipes_by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup> = self
            .categories
            .iter()
            .map(|category| CategoryGroup {
                category,
                recipes: Vec::new(),
            })
            .collect();

        let mut recipes: Vec<&Recipe> = self.recipes.iter().collect();
        recipes.sort_by_key(|r| r.order);
        for recipe in recipes {
            // Load guarantees the category exists
            if let Some(group) = groups.iter_mut().find(|g| g.category.name == recipe.category) {
                group.recipes.push(recipe);
            }
        }

        groups.sort_by_key(|g| g.category.order);
        groups
    }

    /// Group recipes by ingredient for the back-of-book index.
    ///
    /// One group per registered ingredient, sorted by ingredient name;
    /// recipes within a group sorted by recipe name. A recipe using an
    /// ingredient twice still appears once in that group.
    pub fn recipes_by_ingredient(&self) -> Vec<IngredientGroup<'_>> {
        let mut recipes: Vec<&Recipe> = self.recipes.iter().collect();
        recipes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut groups: Vec<IngredientGroup> = self
            .ingredients
            .iter()
            .map(|ingredient| IngredientGroup {
                ingredient,
                recipes: recipes
                    .iter()
                    .filter(|r| r.has_ingredient(&ingredient.name))
                    .copied()
                    .collect(),
            })
            .collect();

        groups.sort_by(|a, b| a.ingredient.name.cmp(&b.ingredient.name));
        groups
    }
}

impl Default for Cookbook {
    fn default() -> Self {
        Self::new()
    }
}

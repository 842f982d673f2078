//! Shared test utilities for the cookpress test suite.
//!
//! Provides two fixtures:
//!
//! - [`setup_fixtures`] copies `fixtures/data/` into a temp directory for
//!   tests that exercise file loading and asset handling.
//! - [`sample_cookbook`] builds the same book in memory for tests that only
//!   need the domain model (grouping, rendering, output formatting).
//!
//! The two describe the same book: three categories (Breakfast, Mains,
//! Desserts — Desserts empty), three recipes, garlic shared between Kofta
//! and Molokhia. Categories and recipes are deliberately declared out of
//! book order so sorting is actually exercised.

use std::path::Path;
use tempfile::TempDir;

use crate::book::{Category, Cookbook, Ingredient, IngredientQuantity, Recipe};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/data/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/data");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// In-memory sample book
// =========================================================================

fn add_recipe(book: &mut Cookbook, recipe: Recipe) {
    for iq in &recipe.ingredients {
        book.ingredients.get_or_insert_with(&iq.ingredient, || Ingredient {
            name: iq.ingredient.clone(),
        });
    }
    book.recipes.insert(recipe).unwrap();
}

fn quantities(pairs: &[(&str, &str)]) -> Vec<IngredientQuantity> {
    pairs
        .iter()
        .map(|(name, quantity)| IngredientQuantity {
            ingredient: name.to_string(),
            quantity: quantity.to_string(),
        })
        .collect()
}

/// Build the sample book in memory, mirroring `fixtures/data/`.
pub fn sample_cookbook() -> Cookbook {
    let mut book = Cookbook::new();

    // Out of book order on purpose: Desserts carries the highest order but
    // is declared first.
    for (name, arabic_name, order) in [
        ("Desserts", "حلويات", 3),
        ("Breakfast", "فطور", 1),
        ("Mains", "أطباق رئيسية", 2),
    ] {
        book.categories
            .insert(Category {
                name: name.to_string(),
                arabic_name: arabic_name.to_string(),
                order,
            })
            .unwrap();
    }

    add_recipe(
        &mut book,
        Recipe {
            order: 1,
            category: "Breakfast".to_string(),
            name: "Shakshuka".to_string(),
            arabic_name: "شكشوكة".to_string(),
            image_path: "images/shakshuka.jpg".to_string(),
            description: "Eggs poached in a spiced tomato sauce.".to_string(),
            servings: 4,
            ingredients: quantities(&[
                ("eggs", "4"),
                ("tomatoes", "6 ripe"),
                ("olive oil", "2 tbsp"),
            ]),
            instructions: vec![
                "Simmer the tomatoes with the spices.".to_string(),
                "Crack the eggs into the sauce and cover.".to_string(),
            ],
        },
    );

    // Mains declared out of order: Molokhia (20) before Kofta (10)
    add_recipe(
        &mut book,
        Recipe {
            order: 20,
            category: "Mains".to_string(),
            name: "Molokhia".to_string(),
            arabic_name: "ملوخية".to_string(),
            image_path: "images/molokhia.jpg".to_string(),
            description: "Jute leaf stew served over rice.".to_string(),
            servings: 6,
            ingredients: quantities(&[
                ("molokhia leaves", "400 g"),
                ("garlic", "4 cloves"),
                ("chicken", "1 whole"),
            ]),
            instructions: vec![
                "Boil the chicken and keep the broth.".to_string(),
                "Stir the leaves into the simmering broth.".to_string(),
            ],
        },
    );

    add_recipe(
        &mut book,
        Recipe {
            order: 10,
            category: "Mains".to_string(),
            name: "Kofta".to_string(),
            arabic_name: "كفتة".to_string(),
            image_path: "images/kofta.jpg".to_string(),
            description: "Spiced *grilled* meat fingers.".to_string(),
            servings: 4,
            ingredients: quantities(&[
                ("ground beef", "500 g"),
                ("garlic", "2 cloves"),
                ("parsley", "1 bunch"),
            ]),
            instructions: vec![
                "Knead the beef with garlic and parsley.".to_string(),
                "Shape into fingers.".to_string(),
                "Grill over high heat.".to_string(),
            ],
        },
    );

    book
}

// =========================================================================
// Lookups — panic with a clear message on miss
// =========================================================================

/// Find a recipe by name. Panics if not found.
pub fn find_recipe<'a>(book: &'a Cookbook, name: &str) -> &'a Recipe {
    book.recipes.get(name).unwrap_or_else(|| {
        let names: Vec<&str> = book.recipes.iter().map(|r| r.name.as_str()).collect();
        panic!("recipe '{name}' not found. Available: {names:?}")
    })
}

/// Find a category by name. Panics if not found.
pub fn find_category<'a>(book: &'a Cookbook, name: &str) -> &'a Category {
    book.categories.get(name).unwrap_or_else(|| {
        let names: Vec<&str> = book.categories.iter().map(|c| c.name.as_str()).collect();
        panic!("category '{name}' not found. Available: {names:?}")
    })
}

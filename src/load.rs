//! Book data loading and validation.
//!
//! Stage 1 of the build pipeline. Reads the JSON data files from the data
//! directory and assembles the in-memory [`Cookbook`] the render stage
//! consumes.
//!
//! ## Data Directory
//!
//! ```text
//! data/
//! ├── book.toml           # Book configuration (optional)
//! ├── categories.json     # Category declarations
//! ├── recipes.json        # Recipe declarations
//! ├── intro.md            # Foreword for the cover page (optional)
//! ├── css/                # Extra stylesheets listed in book.toml
//! │   └── family.css
//! └── images/             # Photos referenced by recipe image_path
//!     └── kofta.jpg
//! ```
//!
//! ## Validation
//!
//! The loader enforces these rules:
//! - No duplicate category names
//! - No duplicate recipe names
//! - Every recipe's `category` must name a declared category
//!
//! Ingredients are not declared anywhere — they come into existence the
//! first time a recipe's ingredient list mentions them, and later mentions
//! of the same name resolve to the same entry.

use crate::book::{Category, Cookbook, Ingredient, IngredientQuantity, Recipe};
use crate::config::BookConfig;
use crate::registry::RegistryError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CATEGORIES_FILE: &str = "categories.json";
pub const RECIPES_FILE: &str = "recipes.json";
pub const INTRO_FILE: &str = "intro.md";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("recipe {recipe} references unknown category: {category}")]
    UnknownCategory { recipe: String, category: String },
}

// Raw record shapes as they appear in the JSON files. Kept separate from
// the domain types so the wire format can't leak registry concerns.

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    categories: Vec<CategoryRecord>,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    name: String,
    arabic_name: String,
    order: u32,
}

#[derive(Debug, Deserialize)]
struct RecipesFile {
    recipes: Vec<RecipeRecord>,
}

#[derive(Debug, Deserialize)]
struct RecipeRecord {
    order: u32,
    category: String,
    name: String,
    arabic_name: String,
    image_path: String,
    description: String,
    servings: u32,
    ingredients: Vec<IngredientQuantityRecord>,
    instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IngredientQuantityRecord {
    name: String,
    quantity: String,
}

/// Load and validate the cookbook from `data_dir`.
pub fn load(data_dir: &Path) -> Result<Cookbook, LoadError> {
    let mut book = Cookbook::new();

    let categories: CategoriesFile = read_json(&data_dir.join(CATEGORIES_FILE))?;
    for record in categories.categories {
        book.categories.insert(Category {
            name: record.name,
            arabic_name: record.arabic_name,
            order: record.order,
        })?;
    }

    let recipes: RecipesFile = read_json(&data_dir.join(RECIPES_FILE))?;
    for record in recipes.recipes {
        if !book.categories.contains(&record.category) {
            return Err(LoadError::UnknownCategory {
                recipe: record.name,
                category: record.category,
            });
        }

        let ingredients = record
            .ingredients
            .into_iter()
            .map(|iq| {
                book.ingredients.get_or_insert_with(&iq.name, || Ingredient {
                    name: iq.name.clone(),
                });
                IngredientQuantity {
                    ingredient: iq.name,
                    quantity: iq.quantity,
                }
            })
            .collect();

        book.recipes.insert(Recipe {
            order: record.order,
            category: record.category,
            name: record.name,
            arabic_name: record.arabic_name,
            image_path: record.image_path,
            description: record.description,
            servings: record.servings,
            ingredients,
            instructions: record.instructions,
        })?;
    }

    book.intro = load_intro(data_dir)?;

    Ok(book)
}

/// Read the optional cover-page foreword.
fn load_intro(data_dir: &Path) -> Result<Option<String>, LoadError> {
    let path = data_dir.join(INTRO_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Referenced files that don't exist on disk, as data-dir-relative paths.
///
/// Covers every recipe's `image_path` and every stylesheet in
/// `[styles] css`. Used by the `check` command; the loader itself does not
/// require assets to exist (rendering HTML without photos is legitimate
/// while the data is being written).
pub fn missing_assets(book: &Cookbook, config: &BookConfig, data_dir: &Path) -> Vec<String> {
    let mut missing = Vec::new();
    for recipe in book.recipes.iter() {
        if !data_dir.join(&recipe.image_path).is_file() {
            missing.push(recipe.image_path.clone());
        }
    }
    for css in &config.styles.css {
        if !data_dir.join(css).is_file() {
            missing.push(css.clone());
        }
    }
    missing.sort();
    missing.dedup();
    missing
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

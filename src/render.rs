//! HTML page rendering.
//!
//! Stage 2 of the build pipeline. Takes the loaded [`Cookbook`] and produces
//! a single HTML document in which every book page is a `<section class="page">`
//! that the print engine breaks onto its own sheet (`break-after: page` in
//! the built-in stylesheet).
//!
//! ## Page Sequence
//!
//! 1. **Cover** — title, subtitle, optional markdown foreword. Unnumbered.
//! 2. **Contents** — categories and their recipes with page numbers.
//!    Unnumbered, omitted via `[sections] contents = false`.
//! 3. **Body** — for each category in book order: a divider page, then one
//!    page per recipe. Numbered from 1.
//! 4. **Ingredient index** — every ingredient with its recipes and their
//!    page numbers. Numbered, continuing the sequence; omitted via
//!    `[sections] ingredient_index = false` or when the book has no
//!    ingredients.
//!
//! Numbering happens in a planning pass before any HTML is rendered, so the
//! contents page (which precedes the body) and the index (which references
//! it) both read from the same finished map.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping; the
//! markdown fields (foreword, recipe descriptions) go through pulldown-cmark
//! and are inserted pre-escaped. Arabic names render in `dir="rtl"` spans.
//!
//! ## CSS
//!
//! The built-in stylesheet (`static/book.css`, embedded at compile time)
//! owns page sizing and break rules. Stylesheets from `[styles] css` are
//! inlined after it, in listed order.

use crate::book::{Category, CategoryGroup, Cookbook, IngredientGroup, Recipe};
use crate::config::BookConfig;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error reading stylesheet {path}: {source}")]
    Css {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const CSS_STATIC: &str = include_str!("../static/book.css");

/// Name of the rendered document within the temp directory.
pub const DOCUMENT_FILENAME: &str = "book.html";
/// Name of the page-plan manifest within the temp directory.
pub const PAGES_FILENAME: &str = "pages.json";

/// What a page is, for the manifest and the CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Cover,
    Contents,
    Category,
    Recipe,
    IngredientIndex,
}

/// One entry of the page plan, serialized to `pages.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub kind: PageKind,
    pub title: String,
    /// Printed page number. Cover and contents are unnumbered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// Output of the render stage.
#[derive(Debug)]
pub struct RenderedBook {
    /// The complete HTML document.
    pub document: String,
    /// The page plan, in document order.
    pub pages: Vec<PageInfo>,
}

/// Load and concatenate the extra stylesheets named in `[styles] css`.
pub fn load_extra_css(config: &BookConfig, data_dir: &Path) -> Result<String, RenderError> {
    let mut css = String::new();
    for rel in &config.styles.css {
        let path = data_dir.join(rel);
        let content = fs::read_to_string(&path).map_err(|source| RenderError::Css {
            path: path.clone(),
            source,
        })?;
        css.push('\n');
        css.push_str(&content);
    }
    Ok(css)
}

/// Render the whole book into one HTML document.
pub fn render(book: &Cookbook, config: &BookConfig, extra_css: &str) -> RenderedBook {
    let groups = book.recipes_by_category();
    let ingredient_groups = book.recipes_by_ingredient();

    // Planning pass: assign page numbers before rendering anything.
    let mut category_pages: HashMap<&str, u32> = HashMap::new();
    let mut recipe_pages: HashMap<&str, u32> = HashMap::new();
    let mut next = 1u32;
    for group in &groups {
        category_pages.insert(group.category.name.as_str(), next);
        next += 1;
        for recipe in &group.recipes {
            recipe_pages.insert(recipe.name.as_str(), next);
            next += 1;
        }
    }
    let index_number = next;

    let with_index = config.sections.ingredient_index && !ingredient_groups.is_empty();

    let mut pages = Vec::new();
    let mut body = Vec::new();

    pages.push(PageInfo {
        kind: PageKind::Cover,
        title: config.title.clone(),
        number: None,
    });
    body.push(cover_page(config, book.intro.as_deref()));

    if config.sections.contents {
        pages.push(PageInfo {
            kind: PageKind::Contents,
            title: "Contents".to_string(),
            number: None,
        });
        body.push(contents_page(&groups, &category_pages, &recipe_pages));
    }

    for group in &groups {
        let number = category_pages[group.category.name.as_str()];
        pages.push(PageInfo {
            kind: PageKind::Category,
            title: group.category.name.clone(),
            number: Some(number),
        });
        body.push(category_page(group.category, number));

        for recipe in &group.recipes {
            let number = recipe_pages[recipe.name.as_str()];
            pages.push(PageInfo {
                kind: PageKind::Recipe,
                title: recipe.name.clone(),
                number: Some(number),
            });
            body.push(recipe_page(recipe, number));
        }
    }

    if with_index {
        pages.push(PageInfo {
            kind: PageKind::IngredientIndex,
            title: "Ingredient Index".to_string(),
            number: Some(index_number),
        });
        body.push(ingredient_index_page(
            &ingredient_groups,
            &recipe_pages,
            index_number,
        ));
    }

    let css = format!("{}\n{}", CSS_STATIC, extra_css);
    let document = base_document(&config.title, &css, html! {
        @for page in &body { (page) }
    })
    .into_string();

    RenderedBook { document, pages }
}

/// Convert a markdown string to an HTML fragment.
fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// Footer with the printed page number.
fn page_footer(number: u32) -> Markup {
    html! {
        footer.page-footer {
            span.page-number { (number) }
        }
    }
}

/// A name pair: Latin heading plus the Arabic name right-to-left.
fn bilingual_title(name: &str, arabic_name: &str) -> Markup {
    html! {
        h1 { (name) }
        p.arabic dir="rtl" lang="ar" { (arabic_name) }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Cover page: title, subtitle, optional markdown foreword.
fn cover_page(config: &BookConfig, intro: Option<&str>) -> Markup {
    html! {
        section.page.cover-page {
            div.cover-title {
                h1 { (config.title) }
                @if !config.subtitle.is_empty() {
                    p.subtitle { (config.subtitle) }
                }
            }
            @if let Some(intro) = intro {
                div.cover-intro {
                    (PreEscaped(markdown_to_html(intro)))
                }
            }
        }
    }
}

/// Table of contents: categories and their recipes with page numbers.
fn contents_page(
    groups: &[CategoryGroup],
    category_pages: &HashMap<&str, u32>,
    recipe_pages: &HashMap<&str, u32>,
) -> Markup {
    html! {
        section.page.contents-page {
            h1 { "Contents" }
            @for group in groups {
                div.contents-category {
                    h2 {
                        span.entry-title { (group.category.name) }
                        span.entry-page { (category_pages[group.category.name.as_str()]) }
                    }
                    ul {
                        @for recipe in &group.recipes {
                            li {
                                span.entry-title { (recipe.name) }
                                span.entry-page { (recipe_pages[recipe.name.as_str()]) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Category divider page.
fn category_page(category: &Category, number: u32) -> Markup {
    html! {
        section.page.category-page {
            div.category-title {
                (bilingual_title(&category.name, &category.arabic_name))
            }
            (page_footer(number))
        }
    }
}

/// A full recipe page.
fn recipe_page(recipe: &Recipe, number: u32) -> Markup {
    html! {
        section.page.recipe-page {
            header.recipe-header {
                (bilingual_title(&recipe.name, &recipe.arabic_name))
            }
            img.recipe-photo src=(recipe.image_path) alt=(recipe.name);
            div.recipe-description {
                (PreEscaped(markdown_to_html(&recipe.description)))
            }
            p.servings { "Serves " (recipe.servings) }
            div.recipe-columns {
                section.ingredients {
                    h2 { "Ingredients" }
                    ul {
                        @for iq in &recipe.ingredients {
                            li {
                                span.quantity { (iq.quantity) }
                                " "
                                span.ingredient { (iq.ingredient) }
                            }
                        }
                    }
                }
                section.instructions {
                    h2 { "Instructions" }
                    ol {
                        @for step in &recipe.instructions {
                            li { (step) }
                        }
                    }
                }
            }
            (page_footer(number))
        }
    }
}

/// Back-of-book ingredient index with page references.
fn ingredient_index_page(
    groups: &[IngredientGroup],
    recipe_pages: &HashMap<&str, u32>,
    number: u32,
) -> Markup {
    html! {
        section.page.index-page {
            h1 { "Ingredient Index" }
            ul.index-list {
                @for group in groups {
                    li.index-entry {
                        span.index-ingredient { (group.ingredient.name) }
                        ul {
                            @for recipe in &group.recipes {
                                li {
                                    span.entry-title { (recipe.name) }
                                    span.entry-page { (recipe_pages[recipe.name.as_str()]) }
                                }
                            }
                        }
                    }
                }
            }
            (page_footer(number))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

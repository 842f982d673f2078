//! CLI output formatting for all pipeline stages.
//!
//! Output is information-centric, not file-centric: every entity (category,
//! recipe, page) leads with a 3-digit positional index and its title, with
//! filesystem context shown as indented `Source:` lines.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 Breakfast (1 recipe)
//!     001 Shakshuka (serves 4, 3 ingredients)
//!         Source: images/shakshuka.jpg
//! 002 Desserts (no recipes)
//!
//! Ingredients: 9 distinct
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 Cookbook (cover)
//! 002 Contents
//! 003 Breakfast → page 1
//! 004 Shakshuka → page 2
//!
//! Rendered 4 pages (2 numbered)
//! ```
//!
//! ## Export
//!
//! ```text
//! cookbook.pdf → output/cookbook.pdf (182 KB, 1 attempt)
//! ```

use crate::book::Cookbook;
use crate::export::ExportReport;
use crate::render::{PageInfo, PageKind};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 recipe`, `2 recipes`, `no recipes`.
fn count_label(count: usize, noun: &str) -> String {
    match count {
        0 => format!("no {noun}s"),
        1 => format!("1 {noun}"),
        n => format!("{n} {noun}s"),
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{} KB", bytes / 1024)
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the `check` command output: category tree, ingredient count,
/// missing-asset warnings.
pub fn format_check_output(book: &Cookbook, missing: &[String]) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Categories".to_string());
    for (i, group) in book.recipes_by_category().iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            group.category.name,
            count_label(group.recipes.len(), "recipe")
        ));
        for (j, recipe) in group.recipes.iter().enumerate() {
            lines.push(format!(
                "{}{} {} (serves {}, {})",
                indent(1),
                format_index(j + 1),
                recipe.name,
                recipe.servings,
                count_label(recipe.ingredients.len(), "ingredient")
            ));
            lines.push(format!("{}Source: {}", indent(2), recipe.image_path));
        }
    }

    lines.push(String::new());
    lines.push(format!("Ingredients: {} distinct", book.ingredients.len()));

    if !missing.is_empty() {
        lines.push(String::new());
        lines.push("Missing assets".to_string());
        for path in missing {
            lines.push(format!("{}{}", indent(1), path));
        }
    }

    lines
}

pub fn print_check_output(book: &Cookbook, missing: &[String]) {
    for line in format_check_output(book, missing) {
        println!("{}", line);
    }
}

// ============================================================================
// Render output
// ============================================================================

/// Format the render stage output: the page plan in document order.
pub fn format_render_output(pages: &[PageInfo]) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        let header = format!("{} {}", format_index(i + 1), page.title);
        let line = match (page.kind, page.number) {
            (PageKind::Cover, _) => format!("{header} (cover)"),
            (_, Some(number)) => format!("{header} → page {number}"),
            (_, None) => header,
        };
        lines.push(line);
    }

    let numbered = pages.iter().filter(|p| p.number.is_some()).count();
    lines.push(String::new());
    lines.push(format!(
        "Rendered {} ({} numbered)",
        count_label(pages.len(), "page"),
        numbered
    ));

    lines
}

pub fn print_render_output(pages: &[PageInfo]) {
    for line in format_render_output(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Export output
// ============================================================================

/// Format the export stage output.
pub fn format_export_output(report: &ExportReport) -> Vec<String> {
    let name = report
        .pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if report.cached {
        vec![format!(
            "{} → {} (cached, unchanged since last build)",
            name,
            report.pdf_path.display()
        )]
    } else {
        vec![format!(
            "{} → {} ({}, {})",
            name,
            report.pdf_path.display(),
            format_size(report.bytes_written),
            count_label(report.attempts as usize, "attempt")
        )]
    }
}

pub fn print_export_output(report: &ExportReport) {
    for line in format_export_output(report) {
        println!("{}", line);
    }
}

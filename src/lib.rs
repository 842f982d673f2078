//! # Cookpress
//!
//! A minimal cookbook PDF generator. Your data directory is the source:
//! categories and recipes live in two JSON files, photos in `images/`, and
//! one command turns them into a printed book.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Cookpress processes a book through three independent stages:
//!
//! ```text
//! 1. Load      data/     →  Cookbook       (JSON files → in-memory registries)
//! 2. Render    Cookbook  →  book.html      (maud pages + page-number plan)
//! 3. Export    book.html →  cookbook.pdf   (headless Chrome print-to-PDF)
//! ```
//!
//! Each stage is its own subcommand, and the render stage writes
//! human-readable intermediates (`book.html`, `pages.json`) into a temp
//! directory:
//!
//! - **Debuggability**: open `book.html` in any browser to see exactly what
//!   will be printed; `pages.json` is the page plan as data.
//! - **Incremental builds**: the export stage skips the print when the
//!   rendered document and page setup are unchanged.
//! - **Testability**: load and render are pure functions over in-memory
//!   data, so the whole book logic tests without a browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`registry`] | Identity-keyed, insertion-ordered registry with duplicate detection |
//! | [`book`] | Domain model: categories, recipes, ingredients; grouping queries |
//! | [`load`] | Stage 1 — JSON data files → validated [`book::Cookbook`] |
//! | [`config`] | `book.toml` loading, merging, validation, stock config |
//! | [`render`] | Stage 2 — page planning and maud HTML rendering |
//! | [`export`] | Stage 3 — asset staging, print-to-PDF, bounded retry |
//! | [`cache`] | Content-addressed export cache (skip unchanged prints) |
//! | [`output`] | CLI output formatting — index-and-title entity display |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than a runtime template directory. Malformed
//! markup is a build error, template variables are Rust expressions, all
//! interpolation is auto-escaped, and there are no template files to ship
//! or get out of sync with the data model.
//!
//! ## Chrome As the Print Engine
//!
//! The PDF itself comes from headless Chrome's print-to-PDF, driven through
//! the `headless_chrome` crate. The book is ordinary HTML and CSS; the
//! browser owns pagination, font shaping (the Arabic names need real
//! shaping), and image embedding. Cookpress maps `[page]` config onto print
//! options and wraps the call in a bounded retry, nothing more. Chrome is
//! the one external requirement.
//!
//! ## Registries Instead of a Database
//!
//! A book is a few dozen entities, so the data layer is an in-memory,
//! insertion-ordered registry per entity type ([`registry::Registry`]).
//! It enforces exactly the invariants the data needs — unique names,
//! resolvable references, get-or-create for ingredients that exist only by
//! mention — and nothing else. Grouping and ordering are queries over the
//! registries, computed fresh per render.
//!
//! ## Page Numbers Are Planned, Not Discovered
//!
//! The contents page precedes the body it indexes, so page numbers are
//! assigned in a planning pass before any HTML exists: dividers and recipes
//! get sequential numbers in book order, and cover/contents stay
//! unnumbered. The same plan is serialized to `pages.json` and drives the
//! CLI output.

pub mod book;
pub mod cache;
pub mod config;
pub mod export;
pub mod load;
pub mod output;
pub mod registry;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;

//! PDF export.
//!
//! Stage 3 of the build pipeline. Takes the rendered `book.html` from the
//! temp directory and prints it to a single PDF through headless Chrome
//! (the `headless_chrome` crate). The engine owns all layout and PDF
//! generation; this module stages assets, maps the page config onto print
//! options, and wraps the print call in a bounded retry loop.
//!
//! ## Asset Staging
//!
//! The document references photos by data-dir-relative paths
//! (`images/kofta.jpg`). Before printing, everything except the data files
//! themselves is copied from the data dir into the temp dir, so the
//! `file://` document resolves them.
//!
//! ## Caching
//!
//! A content hash over the rendered HTML and the page setup decides whether
//! the existing PDF is still current (see [`crate::cache`]). A fresh hit
//! skips the browser entirely.
//!
//! ## Retry
//!
//! Chrome occasionally fails to come up or drops the connection mid-print.
//! Each attempt opens a fresh tab; after `export.attempts` failures the
//! last error is returned.

use crate::cache::{self, CacheManifest};
use crate::config::BookConfig;
use crate::render;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("asset walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("browser error: {0}")]
    Browser(anyhow::Error),
    #[error("print engine returned an empty document")]
    EmptyPdf,
    #[error("rendered document not found at {0}; run the render stage first")]
    MissingDocument(PathBuf),
}

/// Result of a successful export.
#[derive(Debug)]
pub struct ExportReport {
    pub pdf_path: PathBuf,
    pub bytes_written: u64,
    /// The existing PDF was current; no print happened.
    pub cached: bool,
    /// Print attempts used (0 when cached).
    pub attempts: u32,
}

/// Data files that must not be staged next to the document.
const DATA_FILES: &[&str] = &[
    crate::config::CONFIG_FILENAME,
    crate::load::CATEGORIES_FILE,
    crate::load::RECIPES_FILE,
    crate::load::INTRO_FILE,
];

/// Export `<temp_dir>/book.html` to `<output_dir>/<export.filename>`.
pub fn export(
    temp_dir: &Path,
    data_dir: &Path,
    output_dir: &Path,
    config: &BookConfig,
    use_cache: bool,
) -> Result<ExportReport, ExportError> {
    let document_path = temp_dir.join(render::DOCUMENT_FILENAME);
    if !document_path.is_file() {
        return Err(ExportError::MissingDocument(document_path));
    }

    stage_assets(data_dir, temp_dir)?;

    // Page setup is part of the cache key: changing margins must reprint
    // even though the HTML is unchanged.
    let html = fs::read(&document_path)?;
    let page_fingerprint = serde_json::to_vec(&config.page)?;
    let content_hash = cache::hash_content(&[&html, &page_fingerprint]);

    fs::create_dir_all(output_dir)?;
    let filename = config.export.filename.as_str();
    let pdf_path = output_dir.join(filename);

    let mut manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };
    if manifest.is_fresh(filename, &content_hash, output_dir) {
        return Ok(ExportReport {
            pdf_path,
            bytes_written: 0,
            cached: true,
            attempts: 0,
        });
    }

    let url = document_url(&document_path)?;
    let (pdf, attempts) = print_document(&url, config)?;

    fs::write(&pdf_path, &pdf)?;
    manifest.record(filename, &content_hash);
    manifest.save(output_dir)?;

    Ok(ExportReport {
        pdf_path,
        bytes_written: pdf.len() as u64,
        cached: false,
        attempts,
    })
}

/// Copy everything the document references out of the data dir into the
/// temp dir, preserving relative paths. The data files themselves, the
/// css directory (inlined at render time), and hidden entries are skipped.
/// Returns the number of files copied.
pub fn stage_assets(data_dir: &Path, temp_dir: &Path) -> Result<usize, ExportError> {
    let mut copied = 0;
    for entry in WalkDir::new(data_dir).min_depth(1) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(data_dir)
            .expect("walkdir yields paths under its root");

        if skip_staging(rel) {
            continue;
        }

        let dst = temp_dir.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
        } else {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dst)?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn skip_staging(rel: &Path) -> bool {
    let mut components = rel.components();
    let first = match components.next() {
        Some(c) => c.as_os_str().to_string_lossy().to_string(),
        None => return true,
    };
    let is_top_level = components.next().is_none();

    // Hidden entries anywhere in the tree
    if rel
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    {
        return true;
    }
    // Stylesheets are inlined at render time
    if first == "css" {
        return true;
    }
    // The data files themselves
    is_top_level && DATA_FILES.contains(&first.as_str())
}

/// Map the page config onto the engine's print options.
pub fn print_options(config: &BookConfig) -> PrintToPdfOptions {
    let (width, height) = config.page.paper.dimensions_inches();
    let [top, right, bottom, left] = config.page.margins;
    PrintToPdfOptions {
        landscape: Some(config.page.landscape),
        display_header_footer: Some(false),
        print_background: Some(config.page.print_background),
        paper_width: Some(width),
        paper_height: Some(height),
        margin_top: Some(top),
        margin_right: Some(right),
        margin_bottom: Some(bottom),
        margin_left: Some(left),
        ..Default::default()
    }
}

fn document_url(document_path: &Path) -> Result<String, ExportError> {
    let absolute = fs::canonicalize(document_path)?;
    Ok(format!("file://{}", absolute.display()))
}

/// Launch the browser and print the document, retrying with a fresh tab on
/// failure.
fn print_document(url: &str, config: &BookConfig) -> Result<(Vec<u8>, u32), ExportError> {
    let browser = Browser::new(LaunchOptions::default()).map_err(ExportError::Browser)?;

    with_retries(config.export.attempts, |_attempt| {
        let options = print_options(config);
        let tab = browser.new_tab().map_err(ExportError::Browser)?;
        tab.navigate_to(url).map_err(ExportError::Browser)?;
        tab.wait_until_navigated().map_err(ExportError::Browser)?;
        let pdf = tab
            .print_to_pdf(Some(options))
            .map_err(ExportError::Browser)?;
        if pdf.is_empty() {
            return Err(ExportError::EmptyPdf);
        }
        Ok(pdf)
    })
}

/// Run `op` up to `attempts` times (at least once), returning the first
/// success together with the attempt count, or the last error.
pub fn with_retries<T>(
    attempts: u32,
    mut op: impl FnMut(u32) -> Result<T, ExportError>,
) -> Result<(T, u32), ExportError> {
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op(attempt) {
            Ok(value) => return Ok((value, attempt)),
            Err(err) => {
                if attempt < attempts {
                    eprintln!("Print attempt {attempt}/{attempts} failed: {err}");
                }
                last_err = Some(err);
            }
        }
    }
    Err(last_err.expect("at least one attempt ran"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paper;
    use crate::test_helpers::setup_fixtures;
    use tempfile::TempDir;

    // =========================================================================
    // with_retries
    // =========================================================================

    #[test]
    fn first_success_returns_immediately() {
        let (value, attempts) = with_retries(3, |_| Ok::<_, ExportError>(42)).unwrap();
        assert_eq!(value, 42);
        assert_eq!(attempts, 1);
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let (value, attempts) = with_retries(3, |attempt| {
            calls += 1;
            if attempt < 3 {
                Err(ExportError::EmptyPdf)
            } else {
                Ok("pdf")
            }
        })
        .unwrap();
        assert_eq!(value, "pdf");
        assert_eq!(attempts, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn all_failures_return_last_error() {
        let err = with_retries(2, |_| Err::<(), _>(ExportError::EmptyPdf)).unwrap_err();
        assert!(matches!(err, ExportError::EmptyPdf));
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let mut calls = 0;
        let result = with_retries(0, |_| {
            calls += 1;
            Ok::<_, ExportError>(())
        });
        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    // =========================================================================
    // print_options
    // =========================================================================

    #[test]
    fn options_map_paper_and_margins() {
        let mut config = BookConfig::default();
        config.page.paper = Paper::Letter;
        config.page.margins = [0.1, 0.2, 0.3, 0.4];
        config.page.landscape = true;
        config.page.print_background = false;

        let options = print_options(&config);
        assert_eq!(options.paper_width, Some(8.5));
        assert_eq!(options.paper_height, Some(11.0));
        assert_eq!(options.margin_top, Some(0.1));
        assert_eq!(options.margin_right, Some(0.2));
        assert_eq!(options.margin_bottom, Some(0.3));
        assert_eq!(options.margin_left, Some(0.4));
        assert_eq!(options.landscape, Some(true));
        assert_eq!(options.print_background, Some(false));
        assert_eq!(options.display_header_footer, Some(false));
    }

    // =========================================================================
    // stage_assets
    // =========================================================================

    #[test]
    fn stages_images_preserving_paths() {
        let data = setup_fixtures();
        let temp = TempDir::new().unwrap();

        let copied = stage_assets(data.path(), temp.path()).unwrap();
        assert!(copied >= 3);
        assert!(temp.path().join("images/kofta.jpg").is_file());
        assert!(temp.path().join("images/shakshuka.jpg").is_file());
    }

    #[test]
    fn data_files_and_css_are_not_staged() {
        let data = setup_fixtures();
        let temp = TempDir::new().unwrap();

        stage_assets(data.path(), temp.path()).unwrap();
        assert!(!temp.path().join("recipes.json").exists());
        assert!(!temp.path().join("categories.json").exists());
        assert!(!temp.path().join("book.toml").exists());
        assert!(!temp.path().join("intro.md").exists());
        assert!(!temp.path().join("css").exists());
    }

    #[test]
    fn hidden_entries_are_not_staged() {
        let data = setup_fixtures();
        std::fs::write(data.path().join("images/.DS_Store"), "junk").unwrap();
        let temp = TempDir::new().unwrap();

        stage_assets(data.path(), temp.path()).unwrap();
        assert!(!temp.path().join("images/.DS_Store").exists());
    }

    // =========================================================================
    // export preconditions and cache
    // =========================================================================

    #[test]
    fn missing_document_is_an_error() {
        let data = setup_fixtures();
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let err = export(
            temp.path(),
            data.path(),
            out.path(),
            &BookConfig::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::MissingDocument(_)));
    }

    #[test]
    fn fresh_cache_skips_the_print() {
        let data = setup_fixtures();
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = BookConfig::default();

        std::fs::write(temp.path().join(render::DOCUMENT_FILENAME), "<html></html>").unwrap();

        // Prime the manifest as if a print had happened
        let html = std::fs::read(temp.path().join(render::DOCUMENT_FILENAME)).unwrap();
        let fingerprint = serde_json::to_vec(&config.page).unwrap();
        let hash = cache::hash_content(&[&html, &fingerprint]);
        let mut manifest = CacheManifest::empty();
        manifest.record(&config.export.filename, &hash);
        manifest.save(out.path()).unwrap();
        std::fs::write(out.path().join(&config.export.filename), b"%PDF-1.7").unwrap();

        let report = export(temp.path(), data.path(), out.path(), &config, true).unwrap();
        assert!(report.cached);
        assert_eq!(report.attempts, 0);
        assert_eq!(report.bytes_written, 0);
    }

    #[test]
    fn changed_page_setup_invalidates_the_cache() {
        let data = setup_fixtures();
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = BookConfig::default();

        std::fs::write(temp.path().join(render::DOCUMENT_FILENAME), "<html></html>").unwrap();

        let html = std::fs::read(temp.path().join(render::DOCUMENT_FILENAME)).unwrap();
        let fingerprint = serde_json::to_vec(&config.page).unwrap();
        let hash = cache::hash_content(&[&html, &fingerprint]);
        let mut manifest = CacheManifest::empty();
        manifest.record(&config.export.filename, &hash);
        manifest.save(out.path()).unwrap();
        std::fs::write(out.path().join(&config.export.filename), b"%PDF-1.7").unwrap();

        let mut changed = config.clone();
        changed.page.landscape = true;
        let html_bytes = std::fs::read(temp.path().join(render::DOCUMENT_FILENAME)).unwrap();
        let changed_fingerprint = serde_json::to_vec(&changed.page).unwrap();
        let changed_hash = cache::hash_content(&[&html_bytes, &changed_fingerprint]);

        // Same HTML, different page setup: the key must differ, so the
        // stored entry no longer matches.
        assert_ne!(hash, changed_hash);
        let manifest = CacheManifest::load(out.path());
        assert!(!manifest.is_fresh(&changed.export.filename, &changed_hash, out.path()));
    }
}

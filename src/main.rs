use clap::{Parser, Subcommand};
use cookpress::{config, export, load, output, render};
use std::path::PathBuf;

/// Shared flags for commands that print the PDF.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the export cache — always print a fresh PDF
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "cookpress")]
#[command(about = "Cookbook PDF generator")]
#[command(long_about = "\
Cookbook PDF generator

Your data directory is the source. Categories and recipes live in two JSON
files, photos in images/, and one command turns them into a printed book.

Data directory structure:

  data/
  ├── book.toml                    # Book config (optional)
  ├── categories.json              # {\"categories\": [{name, arabic_name, order}]}
  ├── recipes.json                 # {\"recipes\": [{name, category, ingredients, ...}]}
  ├── intro.md                     # Foreword for the cover page (optional)
  ├── css/
  │   └── family.css               # Extra stylesheets listed in book.toml
  └── images/
      └── kofta.jpg                # Photos referenced by recipe image_path

Book structure (in page order):
  Cover        title, subtitle, intro.md
  Contents     categories and recipes with page numbers
  Body         per category: divider page, then one page per recipe
  Index        every ingredient with its recipes and page numbers

Requires Chrome or Chromium for the export step.

Run 'cookpress gen-config' to generate a documented book.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Data directory
    #[arg(long, default_value = "data", global = true)]
    data: PathBuf,

    /// Output directory for the PDF
    #[arg(long, default_value = "output", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (rendered HTML, staged assets)
    #[arg(long, default_value = ".cookpress-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate book data without rendering
    Check,
    /// Render the book to HTML in the temp directory
    Render,
    /// Print the rendered HTML to a PDF
    Export(CacheArgs),
    /// Run the full pipeline: load → render → export
    Build(CacheArgs),
    /// Print a stock book.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            println!("==> Checking {}", cli.data.display());
            let config = config::load_config(&cli.data)?;
            let book = load::load(&cli.data)?;
            let missing = load::missing_assets(&book, &config, &cli.data);
            output::print_check_output(&book, &missing);
            if !missing.is_empty() {
                return Err(format!("{} referenced file(s) missing", missing.len()).into());
            }
            println!("==> Data is valid");
        }
        Command::Render => {
            let (rendered, _) = run_render(&cli)?;
            output::print_render_output(&rendered.pages);
        }
        Command::Export(cache_args) => {
            let config = config::load_config(&cli.data)?;
            let report = export::export(
                &cli.temp_dir,
                &cli.data,
                &cli.output,
                &config,
                !cache_args.no_cache,
            )?;
            output::print_export_output(&report);
        }
        Command::Build(ref cache_args) => {
            println!("==> Stage 1+2: Rendering {}", cli.data.display());
            let (rendered, config) = run_render(&cli)?;
            output::print_render_output(&rendered.pages);

            println!("==> Stage 3: Printing PDF → {}", cli.output.display());
            let report = export::export(
                &cli.temp_dir,
                &cli.data,
                &cli.output,
                &config,
                !cache_args.no_cache,
            )?;
            output::print_export_output(&report);

            println!("==> Build complete: {}", report.pdf_path.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the data, render the book, and write the intermediates.
fn run_render(cli: &Cli) -> Result<(render::RenderedBook, config::BookConfig), Box<dyn std::error::Error>> {
    let config = config::load_config(&cli.data)?;
    let book = load::load(&cli.data)?;
    let extra_css = render::load_extra_css(&config, &cli.data)?;
    let rendered = render::render(&book, &config, &extra_css);

    std::fs::create_dir_all(&cli.temp_dir)?;
    std::fs::write(
        cli.temp_dir.join(render::DOCUMENT_FILENAME),
        &rendered.document,
    )?;
    let json = serde_json::to_string_pretty(&rendered.pages)?;
    std::fs::write(cli.temp_dir.join(render::PAGES_FILENAME), json)?;

    Ok((rendered, config))
}

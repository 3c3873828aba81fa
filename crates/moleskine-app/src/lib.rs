//! Moleskine command-line shell.
//!
//! Works on notebook JSON files as written by the document stores: create
//! one, export it to PDF or PNG, and import PDF pages into it.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use moleskine_core::tools::ShortcutRegistry;
use moleskine_core::{EditorConfig, Notebook, Template};
use moleskine_render::{ExportError, ImportError, LocalFiles, export_notebook, export_page_png};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("Unknown template '{0}' (expected none, grid, lines, dots or cornell)")]
    UnknownTemplate(String),
    #[error("PDF import needs the `pdfium` feature")]
    PdfiumUnavailable,
}

#[derive(Parser, Debug)]
#[command(name = "moleskine", version, about = "Moleskine digital notebook tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty notebook file.
    New(NewArgs),
    /// Export a notebook to a multi-page PDF (or one PNG per page).
    Export(ExportArgs),
    /// Append the pages of a PDF to a notebook as background images.
    Import(ImportArgs),
    /// Print the editor keyboard shortcuts.
    Shortcuts,
}

#[derive(Args, Debug)]
pub struct NewArgs {
    pub path: PathBuf,
    #[arg(long, default_value = "Untitled")]
    pub name: String,
    #[arg(long, default_value = "none")]
    pub template: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub notebook: PathBuf,
    /// Output directory.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Write PNG files instead of a PDF.
    #[arg(long)]
    pub png: bool,
    #[arg(long)]
    pub canvas_width: Option<u32>,
    #[arg(long)]
    pub canvas_height: Option<u32>,
    /// Date used in the output file name (defaults to today).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub pdf: PathBuf,
    /// Notebook to append to; created when missing.
    #[arg(long)]
    pub out: PathBuf,
    /// Explicit path to the pdfium shared library.
    #[arg(long)]
    pub pdfium_lib: Option<PathBuf>,
    /// Raster width for imported pages.
    #[arg(long, default_value_t = 1600)]
    pub width: u32,
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::New(args) => create(&args),
        Command::Export(args) => {
            let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
            for path in export(&args, date)? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::Import(args) => {
            let added = import(&args)?;
            println!("Imported {added} page(s) into {}", args.out.display());
            Ok(())
        }
        Command::Shortcuts => {
            ShortcutRegistry::print_all();
            Ok(())
        }
    }
}

pub fn load_notebook(path: &Path) -> Result<Notebook, AppError> {
    let json = fs::read_to_string(path)?;
    let notebook = Notebook::from_json(&json)?;
    log::info!("Loaded '{}' ({} page(s)) from {}", notebook.name, notebook.page_count(), path.display());
    Ok(notebook)
}

pub fn save_notebook(path: &Path, notebook: &Notebook) -> Result<(), AppError> {
    fs::write(path, notebook.to_json()?)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn create(args: &NewArgs) -> Result<(), AppError> {
    let template = Template::from_name(&args.template).ok_or_else(|| AppError::UnknownTemplate(args.template.clone()))?;
    let mut notebook = Notebook::new(args.name.clone());
    notebook.current_page_mut().template = template;
    save_notebook(&args.path, &notebook)
}

/// Write the export files and return their paths.
pub fn export(args: &ExportArgs, date: NaiveDate) -> Result<Vec<PathBuf>, AppError> {
    let notebook = load_notebook(&args.notebook)?;
    let defaults = EditorConfig::default();
    let width = args.canvas_width.unwrap_or(defaults.canvas_width as u32);
    let height = args.canvas_height.unwrap_or(defaults.canvas_height as u32);
    let source = LocalFiles::new(args.notebook.parent().map(Path::to_path_buf));

    fs::create_dir_all(&args.out)?;
    let file_name = notebook.export_file_name(date);

    if !args.png {
        let doc = pollster::block_on(export_notebook(notebook.pages(), width, height, &source))?;
        let path = args.out.join(file_name);
        fs::write(&path, &doc.bytes)?;
        return Ok(vec![path]);
    }

    let stem = file_name.trim_end_matches(".pdf");
    let mut written = Vec::with_capacity(notebook.page_count());
    for (index, page) in notebook.pages().iter().enumerate() {
        let png = pollster::block_on(export_page_png(page, width, height, &source))?;
        let path = args.out.join(format!("{stem}_page{:02}.png", index + 1));
        fs::write(&path, png)?;
        written.push(path);
    }
    log::info!("Exported {} PNG page(s)", written.len());
    Ok(written)
}

fn import(args: &ImportArgs) -> Result<usize, AppError> {
    let bytes = fs::read(&args.pdf)?;
    let rasters = rasterize(&bytes, args)?;
    let source_name = args
        .pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "import.pdf".to_string());
    append_pages(&args.out, rasters, &source_name)
}

#[cfg(feature = "pdfium")]
fn rasterize(bytes: &[u8], args: &ImportArgs) -> Result<Vec<String>, AppError> {
    use moleskine_render::PdfiumRasterizer;

    let rasterizer = match &args.pdfium_lib {
        Some(path) => PdfiumRasterizer::from_library(path, args.width)?,
        None => PdfiumRasterizer::new(args.width)?,
    };
    Ok(pollster::block_on(moleskine_render::import_pdf(bytes, &rasterizer))?)
}

#[cfg(not(feature = "pdfium"))]
fn rasterize(bytes: &[u8], _args: &ImportArgs) -> Result<Vec<String>, AppError> {
    // Fail on unreadable input before complaining about the feature.
    moleskine_render::pdf_page_count(bytes)?;
    Err(AppError::PdfiumUnavailable)
}

/// Append rasters to the notebook at `path`. A notebook created here
/// drops its initial blank page so it holds only the imported ones.
pub fn append_pages(path: &Path, rasters: Vec<String>, source_name: &str) -> Result<usize, AppError> {
    let existing = path.exists();
    let mut notebook = if existing {
        load_notebook(path)?
    } else {
        let name = Path::new(source_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_name.to_string());
        Notebook::new(name)
    };
    let added = notebook.append_imported_pages(rasters, source_name);
    if !existing && added > 0 {
        notebook.delete_page(0);
    }
    save_notebook(path, &notebook)?;
    Ok(added)
}

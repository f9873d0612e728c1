//! Command-line card generation.

use cardsmith_core::elements::ImageFormat;
use cardsmith_core::{ConfigError, DataUrl, Editor, EditorConfig, ExportError, ImportError, Services};
use cardsmith_render::{RenderError, SoftwareRasterizer};
use clap::Parser;
use std::io::BufReader;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

use crate::file_ops::{DirectoryAssetLoader, FileSink, load_fonts};
use crate::terminal::{LogSoundPlayer, TerminalPrompt};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Could not import {path:?}: {source}")]
    Import { path: PathBuf, source: ImportError },
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Command-line options.
#[derive(Parser, Debug, Clone)]
#[command(name = "cardsmith", about = "Generate a birthday card and save it as PNG")]
pub struct AppConfig {
    /// Directory holding the asset library (backgrounds/, stamps/, ...).
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Directory exported cards are written to.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Directory with `<font>.ttf` files (pixel, bubble, script, narrow).
    #[arg(long)]
    pub fonts: Option<PathBuf>,

    /// JSON editor configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for a reproducible random design.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the random design and start from an empty card.
    #[arg(long)]
    pub blank: bool,

    /// Images to place on the card.
    #[arg(long = "import")]
    pub imports: Vec<PathBuf>,

    /// Extra message placed in the middle of the card.
    #[arg(long)]
    pub message: Option<String>,

    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Main application state.
pub struct App {
    config: AppConfig,
    editor: Editor<DirectoryAssetLoader>,
    rasterizer: SoftwareRasterizer,
    sink: FileSink,
}

impl App {
    /// Build the editor and renderer from command-line options.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let mut editor_config = match &config.config {
            Some(path) => EditorConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => EditorConfig::default(),
        };
        if config.seed.is_some() {
            editor_config.seed = config.seed;
        }

        let prompt = TerminalPrompt::new(BufReader::new(std::io::stdin()), config.yes);
        let services = Services::new(Rc::new(LogSoundPlayer), Rc::new(prompt));
        let editor = Editor::new(editor_config, DirectoryAssetLoader::new(&config.assets), services);

        let fonts = match &config.fonts {
            Some(dir) => load_fonts(dir)?,
            None => Default::default(),
        };
        if fonts.is_empty() {
            log::warn!("No fonts registered; text will not be rendered");
        }

        Ok(Self {
            sink: FileSink::new(&config.out),
            rasterizer: SoftwareRasterizer::with_fonts(fonts),
            editor,
            config,
        })
    }

    pub fn editor(&self) -> &Editor<DirectoryAssetLoader> {
        &self.editor
    }

    /// Compose the card and export it. Returns the path of the saved PNG.
    pub async fn run(&mut self) -> Result<PathBuf, AppError> {
        log::info!("Starting Cardsmith");

        if !self.config.blank {
            if let Some(report) = self.editor.random_design().await {
                log::info!(
                    "Composed {} layout over {} ({} elements)",
                    report.template,
                    report.background,
                    report.placed.len()
                );
                for skipped in &report.skipped {
                    log::warn!("Skipped {}", skipped);
                }
            }
        }

        for path in &self.config.imports {
            let bytes = std::fs::read(path)?;
            let mime = ImageFormat::from_magic_bytes(&bytes)
                .map(|f| f.mime_type())
                .unwrap_or("application/octet-stream");
            self.editor
                .import_image(&DataUrl::encode(mime, &bytes))
                .map_err(|source| AppError::Import {
                    path: path.clone(),
                    source,
                })?;
        }

        if let Some(message) = &self.config.message {
            self.editor.add_custom_text(message);
        }

        let filename = self.editor.export(&self.rasterizer, &self.sink)?;
        Ok(self.sink.dir().join(filename))
    }
}

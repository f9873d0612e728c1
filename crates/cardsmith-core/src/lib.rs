//! Cardsmith Core Library
//!
//! Platform-agnostic data structures and logic for the Cardsmith greeting-card
//! editor: the card scene, undo/redo history, drawing tools, fill patterns,
//! wacky effects, the asset library and the random design composer.

pub mod assets;
pub mod composer;
pub mod config;
pub mod data_url;
pub mod editor;
pub mod effects;
pub mod elements;
pub mod export;
pub mod fill;
pub mod history;
pub mod import;
pub mod scene;
pub mod services;
pub mod tools;

pub use assets::{AssetError, AssetLoader, AssetResult, LoadedImage, MemoryAssetLoader};
pub use composer::{CompositionReport, DesignTemplate, TEMPLATES, compose};
pub use config::{ConfigError, EditorConfig};
pub use data_url::{DataUrl, DataUrlError, EMPTY_DATA_URL};
pub use editor::{BusyFlag, Editor};
pub use effects::WackyEffect;
pub use elements::{Element, ElementId, ElementKind, ElementTag, Placement, SerializableColor};
pub use export::{CardSink, ExportError, Rasterizer, export_card};
pub use fill::{FillPattern, PatternTile, fill_background};
pub use history::{HistoryManager, MAX_HISTORY};
pub use import::{ImportError, import_data_url};
pub use scene::{BoxFuture, CardScene, SceneError, SceneEvent, SceneGraph, SceneObserver, SceneResult, SceneSnapshot};
pub use services::{MutedSound, ScriptedPrompt, Services, SoundEffect, SoundPlayer, UserPrompt};
pub use tools::{ToolKind, ToolSettings};

//! One-shot PNG export of the finished card.

use crate::data_url::{DataUrl, DataUrlError, EMPTY_DATA_URL};
use crate::scene::CardScene;
use crate::services::{Services, SoundEffect};
use thiserror::Error;
use web_time::{SystemTime, UNIX_EPOCH};

pub const EXPORT_SUCCESS_MESSAGE: &str = "Card saved! They're going to LOVE it!";
/// Exports are rasterized at twice the canvas size.
pub const EXPORT_MULTIPLIER: f64 = 2.0;
pub const EXPORT_FAILURE_MESSAGE: &str = "Sorry, there was an error saving the card. Please try again!";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,
    #[error("Failed to generate image")]
    EmptyImage,
    #[error("Invalid image data: {0}")]
    DataUrl(DataUrlError),
    #[error("Unexpected image type: {0}")]
    NotPng(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Could not save {filename}: {message}")]
    Sink { filename: String, message: String },
}

/// Turns a scene into an encoded image.
pub trait Rasterizer {
    /// Render at `multiplier` times the scene size and return a PNG data URL.
    ///
    /// A scene with no drawable area yields [`EMPTY_DATA_URL`].
    fn to_data_url(&self, scene: &CardScene, multiplier: f64) -> Result<String, ExportError>;
}

/// Destination for exported files.
pub trait CardSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ExportError>;
}

/// `<prefix>-<unix millis>.png`
pub fn export_filename(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{prefix}-{millis}.png")
}

/// Decode a rasterizer's output into PNG bytes.
pub fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, ExportError> {
    if data_url.is_empty() || data_url == EMPTY_DATA_URL {
        return Err(ExportError::EmptyImage);
    }
    let decoded = DataUrl::parse(data_url).map_err(|e| match e {
        DataUrlError::Empty => ExportError::EmptyImage,
        other => ExportError::DataUrl(other),
    })?;
    if !decoded.mime_type.eq_ignore_ascii_case("image/png") {
        return Err(ExportError::NotPng(decoded.mime_type));
    }
    Ok(decoded.data)
}

/// Rasterize the scene and hand the PNG to `sink`.
///
/// The user is alerted either way. Nothing reaches the sink when the image is
/// empty or invalid. Returns the saved filename.
pub fn export_card<R, S>(
    scene: &CardScene,
    rasterizer: &R,
    sink: &S,
    services: &Services,
    prefix: &str,
) -> Result<String, ExportError>
where
    R: Rasterizer + ?Sized,
    S: CardSink + ?Sized,
{
    services.play(SoundEffect::Success);
    let result = rasterizer
        .to_data_url(scene, EXPORT_MULTIPLIER)
        .and_then(|url| decode_png_data_url(&url))
        .and_then(|bytes| {
            let filename = export_filename(prefix);
            sink.save(&filename, &bytes)?;
            Ok((filename, bytes.len()))
        });

    match result {
        Ok((filename, size)) => {
            log::info!("Exported {filename} ({size} bytes)");
            services.prompt.alert(EXPORT_SUCCESS_MESSAGE);
            Ok(filename)
        }
        Err(e) => {
            log::error!("Error saving card: {e}");
            services.prompt.alert(EXPORT_FAILURE_MESSAGE);
            Err(e)
        }
    }
}

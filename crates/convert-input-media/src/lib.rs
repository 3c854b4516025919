//! Media input plugin — describes images and audio files by their metadata.
//!
//! No OCR or transcription is attempted; the Markdown holds a title and a
//! `Key: value` line per known property.

mod wav;

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::{DocumentFormat, DocumentRef};
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::mime::mime_from_path;

pub struct MediaInputPlugin;

impl InputPlugin for MediaInputPlugin {
    fn name(&self) -> &str {
        "Media Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Image, DocumentFormat::Audio]
    }

    fn convert(&self, input_path: &Path, _ctx: &ExtractContext<'_>) -> Result<String> {
        let doc = DocumentRef::new(input_path);
        let size = std::fs::metadata(input_path)?.len();

        let mut fields: Vec<(&str, String)> = Vec::new();
        match doc.format {
            Some(DocumentFormat::Image) => image_fields(input_path, &mut fields)?,
            _ => audio_fields(input_path, &mut fields)?,
        }
        fields.push(("MimeType", mime_from_path(input_path)));
        fields.push(("FileSize", format!("{} bytes", size)));

        let mut md = format!("# {}\n\n", doc.display_name());
        for (key, value) in fields {
            md.push_str(&format!("{}: {}\n", key, value));
        }
        Ok(md)
    }
}

fn image_fields(path: &Path, fields: &mut Vec<(&str, String)>) -> Result<()> {
    let reader = image::ImageReader::open(path)?
        .with_guessed_format()
        .map_err(|e| ConvertError::Extraction(format!("Cannot read image: {}", e)))?;
    let format = reader
        .format()
        .ok_or_else(|| ConvertError::Extraction("Unrecognised image data".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ConvertError::Extraction(format!("Cannot read image header: {}", e)))?;

    fields.push(("ImageWidth", width.to_string()));
    fields.push(("ImageHeight", height.to_string()));
    fields.push(("Format", format!("{:?}", format).to_uppercase()));
    Ok(())
}

fn audio_fields(path: &Path, fields: &mut Vec<(&str, String)>) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_uppercase();
    fields.push(("Format", ext.clone()));

    if ext == "WAV" {
        let bytes = std::fs::read(path)?;
        match wav::parse_wav(&bytes) {
            Some(info) => {
                fields.push(("Channels", info.channels.to_string()));
                fields.push(("SampleRate", format!("{} Hz", info.sample_rate)));
                fields.push(("BitsPerSample", info.bits_per_sample.to_string()));
                fields.push(("Duration", wav::format_duration(info.duration_secs())));
            }
            None => log::warn!("{}: not a readable RIFF/WAVE header", path.display()),
        }
    }
    Ok(())
}

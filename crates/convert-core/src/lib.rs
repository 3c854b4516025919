//! Core types for docmark: formats, options, plugin traits, the input
//! plugin registry and the batch pipeline.

pub mod error;
pub mod format;
pub mod markdown;
pub mod options;
pub mod pipeline;
pub mod plugin;
pub mod registry;

pub use error::{ConvertError, Result};
pub use format::{DocumentFormat, DocumentRef};
pub use options::ConversionOptions;
pub use pipeline::{BatchReport, FileOutcome, Pipeline, PipelineBuilder};
pub use plugin::{ExtractContext, InputPlugin, OutputPlugin};
pub use registry::PluginRegistry;

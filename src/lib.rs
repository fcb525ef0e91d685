pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{pdf::SofficeRenderer, storage::LocalStorage};
pub use config::{settings::ReportSettings, toml_config::TomlConfig};
pub use core::{engine::ConversionEngine, pipeline::ReportPipeline};
pub use domain::model::{ConversionOutcome, PdfStatus};
pub use utils::error::{ReportError, Result};

pub mod docx;
pub mod engine;
pub mod markdown;
pub mod pipeline;

pub use crate::domain::model::{ConversionOutcome, LoadOutcome, PdfStatus, ReportDocument};
pub use crate::domain::ports::{ConfigProvider, PdfRenderer, Pipeline, Storage};
pub use crate::utils::error::Result;

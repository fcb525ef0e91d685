use crate::domain::ports::PdfRenderer;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

pub const DEFAULT_CONVERTER: &str = "soffice";

/// Converts through a headless office suite (`soffice --headless --convert-to pdf`).
#[derive(Debug, Clone)]
pub struct SofficeRenderer {
    program: String,
}

impl SofficeRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SofficeRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}

#[async_trait]
impl PdfRenderer for SofficeRenderer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn render(&self, docx_path: &Path, pdf_path: &Path) -> Result<()> {
        // the converter names its output after the input, so it writes into a
        // scratch directory and the file is moved into place afterwards
        let temp_dir = tempfile::tempdir()?;
        let output_dir = temp_dir.path();

        tracing::debug!(
            "Running {} --headless --convert-to pdf on {}",
            self.program,
            docx_path.display()
        );

        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(output_dir)
            .arg(docx_path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ReportError::PdfToolNotFound {
                        program: self.program.clone(),
                    }
                } else {
                    ReportError::PdfConversionError {
                        message: format!("failed to run {}: {}", self.program, e),
                    }
                }
            })?;

        if !output.status.success() {
            return Err(ReportError::PdfConversionError {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stem = docx_path
            .file_stem()
            .ok_or_else(|| ReportError::PdfConversionError {
                message: format!("{} has no file name", docx_path.display()),
            })?;
        let produced = output_dir.join(format!("{}.pdf", stem.to_string_lossy()));

        if !tokio::fs::try_exists(&produced).await.unwrap_or(false) {
            return Err(ReportError::PdfConversionError {
                message: format!("PDF not generated at {}", produced.display()),
            });
        }

        if let Some(parent) = pdf_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::copy(&produced, pdf_path).await?;

        tracing::debug!("PDF written to {}", pdf_path.display());
        Ok(())
    }
}

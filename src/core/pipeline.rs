use crate::core::docx::DocxWriter;
use crate::core::markdown;
use crate::core::{ConfigProvider, LoadOutcome, Pipeline, ReportDocument, Storage};
use crate::utils::error::{ReportError, Result};

pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<String> {
        let input = self.config.input_path();

        if !self.storage.exists(input).await {
            return Err(ReportError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        tracing::debug!("Reading markdown from {}", input.display());
        let bytes = self.storage.read_file(input).await?;

        String::from_utf8(bytes).map_err(|_| ReportError::InvalidEncoding {
            path: input.to_path_buf(),
        })
    }

    async fn transform(&self, markdown: String) -> Result<ReportDocument> {
        let document = markdown::parse(&markdown);

        tracing::debug!(
            "Parsed {} block(s), skipped {} line(s)",
            document.blocks.len(),
            document.skipped_lines
        );

        Ok(document)
    }

    async fn load(&self, document: ReportDocument) -> Result<LoadOutcome> {
        let word_path = self.config.word_path();
        let summary = document.summary();

        let docx = DocxWriter::new(self.config.styles()).package(&document)?;

        tracing::debug!("Writing docx ({} bytes) to {}", docx.len(), word_path.display());
        self.storage.write_file(word_path, &docx).await?;

        Ok(LoadOutcome {
            word_path: self.storage.resolve(word_path),
            bytes_written: docx.len(),
            summary,
        })
    }
}

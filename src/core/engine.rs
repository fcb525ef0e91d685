use crate::core::{ConversionOutcome, PdfRenderer, PdfStatus, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::ConversionMonitor;
use std::path::PathBuf;
use std::time::Instant;

pub struct ConversionEngine<P: Pipeline> {
    pipeline: P,
    pdf: Option<(Box<dyn PdfRenderer>, PathBuf)>,
    monitor: ConversionMonitor,
}

impl<P: Pipeline> ConversionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            pdf: None,
            monitor: ConversionMonitor::new(monitor_enabled),
        }
    }

    /// Adds a PDF step after the Word document is written.
    pub fn with_pdf(mut self, renderer: Box<dyn PdfRenderer>, pdf_path: impl Into<PathBuf>) -> Self {
        self.pdf = Some((renderer, pdf_path.into()));
        self
    }

    /// Runs extract, transform and load, then the optional PDF step.
    ///
    /// A failed PDF step does not fail the run: the Word document already
    /// exists, so the failure is reported through [`PdfStatus::Failed`].
    pub async fn run(&self) -> Result<ConversionOutcome> {
        tracing::info!("Starting conversion");
        let mut phases = Vec::with_capacity(4);

        let started = Instant::now();
        let markdown = self.pipeline.extract().await?;
        tracing::info!("Read {} bytes of markdown", markdown.len());
        phases.push(self.monitor.record("extract", started));

        let started = Instant::now();
        let document = self.pipeline.transform(markdown).await?;
        tracing::info!(
            "Parsed {} block(s), {} line(s) skipped",
            document.blocks.len(),
            document.skipped_lines
        );
        phases.push(self.monitor.record("transform", started));

        let started = Instant::now();
        let loaded = self.pipeline.load(document).await?;
        tracing::info!(
            "Word document created: {} ({} bytes)",
            loaded.word_path.display(),
            loaded.bytes_written
        );
        phases.push(self.monitor.record("load", started));

        let pdf = match &self.pdf {
            None => PdfStatus::NotRequested,
            Some((renderer, pdf_path)) => {
                let started = Instant::now();
                let status = match renderer.render(&loaded.word_path, pdf_path).await {
                    Ok(()) => {
                        tracing::info!("PDF created: {}", pdf_path.display());
                        PdfStatus::Created {
                            path: pdf_path.clone(),
                        }
                    }
                    Err(e) => {
                        tracing::warn!("PDF conversion with {} failed: {}", renderer.name(), e);
                        tracing::warn!("💡 {}", e.recovery_suggestion());
                        PdfStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                phases.push(self.monitor.record("pdf", started));
                status
            }
        };

        if let Some(peak) = self.monitor.peak_memory_mb() {
            tracing::info!("📊 Peak memory: {}MB", peak);
        }

        Ok(ConversionOutcome {
            word_path: loaded.word_path,
            pdf,
            summary: loaded.summary,
            phases,
        })
    }
}

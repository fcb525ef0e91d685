use crate::domain::model::{LoadOutcome, ReportDocument};
use crate::domain::style::StyleSheet;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    /// Location the path refers to, as seen by external tools.
    fn resolve(&self, path: &Path) -> PathBuf;
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &Path;
    fn word_path(&self) -> &Path;
    fn styles(&self) -> &StyleSheet;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, markdown: String) -> Result<ReportDocument>;
    async fn load(&self, document: ReportDocument) -> Result<LoadOutcome>;
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Program or backend name, for log and error messages.
    fn name(&self) -> &str;
    async fn render(&self, docx_path: &Path, pdf_path: &Path) -> Result<()>;
}

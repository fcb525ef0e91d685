use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("XML writing failed: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input file is not valid UTF-8: {}", path.display())]
    InvalidEncoding { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("PDF converter '{program}' could not be started")]
    PdfToolNotFound { program: String },

    #[error("PDF conversion failed: {message}")]
    PdfConversionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Rendering,
    Pdf,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputNotFound { .. } | Self::InvalidEncoding { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ZipError(_) | Self::XmlError(_) | Self::SerializationError(_) => {
                ErrorCategory::Rendering
            }
            Self::PdfToolNotFound { .. } | Self::PdfConversionError { .. } => ErrorCategory::Pdf,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the Word document is already on disk when these happen
            Self::PdfToolNotFound { .. } | Self::PdfConversionError { .. } => ErrorSeverity::Low,
            Self::InputNotFound { .. }
            | Self::InvalidEncoding { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::ZipError(_) | Self::XmlError(_) | Self::SerializationError(_) => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InputNotFound { path } => {
                format!("Error: could not find the file {}", path.display())
            }
            Self::InvalidEncoding { path } => {
                format!("Error: {} must be saved as UTF-8 text", path.display())
            }
            Self::PdfToolNotFound { program } => {
                format!("Could not create the PDF: '{program}' is not installed")
            }
            Self::PdfConversionError { .. } => "Could not create the PDF".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => format!("Invalid configuration: {self}"),
            Self::ZipError(_) | Self::XmlError(_) => {
                format!("Error creating the Word document: {self}")
            }
            Self::SerializationError(e) => format!("Error writing the conversion summary: {e}"),
            Self::IoError(e) => format!("File system error: {e}"),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Input => {
                "Check the input path, or pass the Markdown file as the first argument".to_string()
            }
            ErrorCategory::Configuration => {
                "Fix the value in the TOML file or on the command line and run again".to_string()
            }
            ErrorCategory::Rendering => {
                "Check that the output directory is writable and the Markdown is well formed"
                    .to_string()
            }
            ErrorCategory::Pdf => {
                "Open the Word document and export it as PDF manually (File > Save As > PDF)"
                    .to_string()
            }
            ErrorCategory::System => {
                "Check file permissions and free disk space".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_errors_are_low_severity() {
        let err = ReportError::PdfToolNotFound {
            program: "soffice".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Pdf);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.recovery_suggestion().contains("export it as PDF manually"));
    }

    #[test]
    fn test_missing_input_is_high_severity() {
        let err = ReportError::InputNotFound {
            path: PathBuf::from("report.md"),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("report.md"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = ReportError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}

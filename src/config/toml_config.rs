use crate::domain::style::StyleProfile;
use crate::utils::error::{ReportError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Optional configuration file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub document: Option<DocumentConfig>,
    pub pdf: Option<PdfConfig>,
    pub styles: Option<StylesConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PdfConfig {
    pub enabled: Option<bool>,
    pub output: Option<PathBuf>,
    pub converter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylesConfig {
    pub profile: Option<StyleProfile>,
    pub body_font: Option<String>,
    pub heading_font: Option<String>,
    pub code_font: Option<String>,
    pub body_size: Option<f32>,
    pub title_size: Option<f32>,
    pub subtitle_size: Option<f32>,
    pub header_size: Option<f32>,
    pub code_size: Option<f32>,
    pub code_indent_inches: Option<f32>,
    pub separator_width: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ReportError::ConfigError {
            message: format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures<'_>| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn profile(&self) -> Option<StyleProfile> {
        self.styles.as_ref().and_then(|styles| styles.profile)
    }

    pub fn pdf_enabled(&self) -> bool {
        self.pdf
            .as_ref()
            .and_then(|pdf| pdf.enabled)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[document]
input = "docs/INFORME.md"
output = "out/informe.docx"

[pdf]
enabled = true
converter = "libreoffice"

[styles]
profile = "simple"
heading_font = "Helvetica"
code_size = 9.5
separator_width = 40
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let document = config.document.as_ref().unwrap();

        assert_eq!(document.input.as_deref(), Some(Path::new("docs/INFORME.md")));
        assert!(config.pdf_enabled());
        assert_eq!(config.profile(), Some(StyleProfile::Simple));

        let styles = config.styles.as_ref().unwrap();
        assert_eq!(styles.heading_font.as_deref(), Some("Helvetica"));
        assert_eq!(styles.code_size, Some(9.5));
        assert_eq!(styles.separator_width, Some(40));
        assert!(styles.title_size.is_none());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.document.is_none());
        assert!(!config.pdf_enabled());
        assert!(config.profile().is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MDREPORT_TEST_INPUT", "from-env.md");

        let toml_content = r#"
[document]
input = "${MDREPORT_TEST_INPUT}"
output = "${MDREPORT_TEST_UNSET_VARIABLE}.docx"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let document = config.document.unwrap();
        assert_eq!(document.input, Some(PathBuf::from("from-env.md")));
        assert_eq!(
            document.output,
            Some(PathBuf::from("${MDREPORT_TEST_UNSET_VARIABLE}.docx"))
        );

        std::env::remove_var("MDREPORT_TEST_INPUT");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = TomlConfig::from_toml_str("[styles]\ntitle_sise = 12.0\n").unwrap_err();
        assert!(matches!(err, ReportError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        assert!(TomlConfig::from_toml_str("[styles]\nprofile = \"fancy\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[pdf]\nenabled = true\noutput = \"informe.pdf\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.pdf_enabled());
        assert_eq!(
            config.pdf.unwrap().output,
            Some(PathBuf::from("informe.pdf"))
        );
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TomlConfig::from_file("/nonexistent/mdreport.toml").unwrap_err();
        assert!(matches!(err, ReportError::ConfigError { .. }));
    }
}

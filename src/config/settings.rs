use crate::adapters::pdf::DEFAULT_CONVERTER;
use crate::config::toml_config::TomlConfig;
use crate::domain::ports::ConfigProvider;
use crate::domain::style::{StyleProfile, StyleSheet};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_range, Validate,
};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "INFORME_TECNICO_PROYECTO_3P.md";

const INPUT_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];
const MIN_FONT_SIZE: f32 = 6.0;
const MAX_FONT_SIZE: f32 = 96.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSettings {
    pub output: PathBuf,
    pub converter: String,
}

/// Values given explicitly on the command line. They win over the file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pdf: bool,
    pub pdf_output: Option<PathBuf>,
    pub converter: Option<String>,
    pub profile: Option<StyleProfile>,
}

/// Fully resolved configuration for one conversion.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub input: PathBuf,
    pub word_output: PathBuf,
    pub pdf: Option<PdfSettings>,
    pub styles: StyleSheet,
}

impl ReportSettings {
    /// Defaults, then the TOML file, then command-line overrides.
    pub fn resolve(file: Option<&TomlConfig>, overrides: SettingsOverrides) -> Self {
        let default_file = TomlConfig::default();
        let file = file.unwrap_or(&default_file);
        let document = file.document.clone().unwrap_or_default();
        let pdf = file.pdf.clone().unwrap_or_default();

        let input = overrides
            .input
            .or(document.input)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
        let word_output = overrides
            .output
            .or(document.output)
            .unwrap_or_else(|| input.with_extension("docx"));

        // a PDF path or converter on the command line asks for a PDF too
        let pdf_requested = overrides.pdf
            || overrides.pdf_output.is_some()
            || overrides.converter.is_some()
            || file.pdf_enabled();
        let pdf = pdf_requested.then(|| PdfSettings {
            output: overrides
                .pdf_output
                .or(pdf.output)
                .unwrap_or_else(|| word_output.with_extension("pdf")),
            converter: overrides
                .converter
                .or(pdf.converter)
                .unwrap_or_else(|| DEFAULT_CONVERTER.to_string()),
        });

        let profile = overrides.profile.or(file.profile()).unwrap_or_default();
        let mut styles = StyleSheet::for_profile(profile);
        if let Some(custom) = &file.styles {
            // explicit sizes in the file win over the profile preset
            if let Some(font) = &custom.body_font {
                styles.body_font = font.clone();
            }
            if let Some(font) = &custom.heading_font {
                styles.heading_font = font.clone();
            }
            if let Some(font) = &custom.code_font {
                styles.code_font = font.clone();
            }
            styles.body_size = custom.body_size.unwrap_or(styles.body_size);
            styles.title_size = custom.title_size.unwrap_or(styles.title_size);
            styles.subtitle_size = custom.subtitle_size.unwrap_or(styles.subtitle_size);
            styles.header_size = custom.header_size.unwrap_or(styles.header_size);
            styles.code_size = custom.code_size.unwrap_or(styles.code_size);
            styles.code_indent_inches = custom
                .code_indent_inches
                .unwrap_or(styles.code_indent_inches);
            styles.separator_width = custom.separator_width.unwrap_or(styles.separator_width);
        }

        Self {
            input,
            word_output,
            pdf,
            styles,
        }
    }
}

impl ConfigProvider for ReportSettings {
    fn input_path(&self) -> &Path {
        &self.input
    }

    fn word_path(&self) -> &Path {
        &self.word_output
    }

    fn styles(&self) -> &StyleSheet {
        &self.styles
    }
}

impl Validate for ReportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("document.input", &self.input)?;
        validate_file_extension("document.input", &self.input, &INPUT_EXTENSIONS)?;
        validate_path("document.output", &self.word_output)?;
        validate_file_extension("document.output", &self.word_output, &["docx"])?;

        if let Some(pdf) = &self.pdf {
            validate_path("pdf.output", &pdf.output)?;
            validate_file_extension("pdf.output", &pdf.output, &["pdf"])?;
            validate_non_empty_string("pdf.converter", &pdf.converter)?;
        }

        let styles = &self.styles;
        validate_non_empty_string("styles.body_font", &styles.body_font)?;
        validate_non_empty_string("styles.heading_font", &styles.heading_font)?;
        validate_non_empty_string("styles.code_font", &styles.code_font)?;
        for (field, size) in [
            ("styles.body_size", styles.body_size),
            ("styles.title_size", styles.title_size),
            ("styles.subtitle_size", styles.subtitle_size),
            ("styles.header_size", styles.header_size),
            ("styles.code_size", styles.code_size),
        ] {
            validate_range(field, size, MIN_FONT_SIZE, MAX_FONT_SIZE)?;
        }
        validate_range(
            "styles.code_indent_inches",
            styles.code_indent_inches,
            0.0,
            5.0,
        )?;
        validate_range("styles.separator_width", styles.separator_width, 1, 200)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ReportError;

    #[test]
    fn test_defaults_follow_input_name() {
        let settings = ReportSettings::resolve(None, SettingsOverrides::default());

        assert_eq!(settings.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(
            settings.word_output,
            PathBuf::from("INFORME_TECNICO_PROYECTO_3P.docx")
        );
        assert!(settings.pdf.is_none());
        assert_eq!(settings.styles, StyleSheet::for_profile(StyleProfile::Report));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_pdf_flag_derives_pdf_path() {
        let settings = ReportSettings::resolve(
            None,
            SettingsOverrides {
                input: Some(PathBuf::from("docs/informe.md")),
                pdf: true,
                ..SettingsOverrides::default()
            },
        );

        let pdf = settings.pdf.unwrap();
        assert_eq!(pdf.output, PathBuf::from("docs/informe.pdf"));
        assert_eq!(pdf.converter, "soffice");
    }

    #[test]
    fn test_pdf_options_imply_pdf() {
        let settings = ReportSettings::resolve(
            None,
            SettingsOverrides {
                pdf_output: Some(PathBuf::from("out/informe.pdf")),
                ..SettingsOverrides::default()
            },
        );
        assert_eq!(
            settings.pdf.unwrap().output,
            PathBuf::from("out/informe.pdf")
        );

        let settings = ReportSettings::resolve(
            None,
            SettingsOverrides {
                converter: Some("libreoffice".to_string()),
                ..SettingsOverrides::default()
            },
        );
        assert_eq!(settings.pdf.unwrap().converter, "libreoffice");
    }

    #[test]
    fn test_non_finite_sizes_are_rejected() {
        let file = TomlConfig::from_toml_str("[styles]\ntitle_size = nan\n").unwrap();
        let settings = ReportSettings::resolve(Some(&file), SettingsOverrides::default());

        assert!(settings.styles.title_size.is_nan());
        assert!(matches!(
            settings.validate(),
            Err(ReportError::InvalidConfigValueError { ref field, .. }) if field == "styles.title_size"
        ));

        let file = TomlConfig::from_toml_str("[styles]\ncode_indent_inches = inf\n").unwrap();
        let settings = ReportSettings::resolve(Some(&file), SettingsOverrides::default());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[document]
input = "file.md"
output = "file.docx"

[pdf]
enabled = true
converter = "libreoffice"

[styles]
profile = "simple"
title_size = 20.0
"#,
        )
        .unwrap();

        let settings = ReportSettings::resolve(
            Some(&file),
            SettingsOverrides {
                input: Some(PathBuf::from("cli.md")),
                profile: Some(StyleProfile::Report),
                ..SettingsOverrides::default()
            },
        );

        assert_eq!(settings.input, PathBuf::from("cli.md"));
        assert_eq!(settings.word_output, PathBuf::from("file.docx"));
        assert_eq!(settings.pdf.as_ref().unwrap().converter, "libreoffice");
        assert_eq!(settings.pdf.as_ref().unwrap().output, PathBuf::from("file.pdf"));
        // profile from the command line, explicit size from the file
        assert_eq!(settings.styles.subtitle_size, 14.0);
        assert_eq!(settings.styles.title_size, 20.0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = ReportSettings::resolve(None, SettingsOverrides::default());
        settings.word_output = PathBuf::from("report.doc");
        assert!(matches!(
            settings.validate(),
            Err(ReportError::InvalidConfigValueError { ref field, .. }) if field == "document.output"
        ));

        let mut settings = ReportSettings::resolve(None, SettingsOverrides::default());
        settings.styles.title_size = 200.0;
        assert!(settings.validate().is_err());

        let mut settings = ReportSettings::resolve(None, SettingsOverrides::default());
        settings.input = PathBuf::from("report.html");
        assert!(settings.validate().is_err());

        let settings = ReportSettings::resolve(
            None,
            SettingsOverrides {
                pdf: true,
                converter: Some(" ".to_string()),
                ..SettingsOverrides::default()
            },
        );
        assert!(settings.validate().is_err());
    }
}

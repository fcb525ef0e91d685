pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::settings::SettingsOverrides;
#[cfg(feature = "cli")]
use crate::domain::style::StyleProfile;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "mdreport")]
#[command(about = "Convert a Markdown report into a Word document, and optionally a PDF")]
pub struct CliConfig {
    /// Markdown report to convert [default: INFORME_TECNICO_PROYECTO_3P.md]
    pub input: Option<PathBuf>,

    /// Word output path [default: input name with .docx]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also produce a PDF through an office converter
    #[arg(long)]
    pub pdf: bool,

    /// PDF output path, implies --pdf [default: Word output name with .pdf]
    #[arg(long)]
    pub pdf_output: Option<PathBuf>,

    /// Office converter executable used for the PDF, implies --pdf
    #[arg(long)]
    pub converter: Option<String>,

    /// Heading size preset
    #[arg(long, value_enum)]
    pub profile: Option<StyleProfile>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the conversion outcome as JSON to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log per-phase timings and memory usage
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            pdf: self.pdf,
            pdf_output: self.pdf_output.clone(),
            converter: self.converter.clone(),
            profile: self.profile,
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = CliConfig::parse_from([
            "mdreport",
            "informe.md",
            "--pdf",
            "--profile",
            "simple",
            "-o",
            "out/informe.docx",
        ]);

        assert_eq!(cli.input, Some(PathBuf::from("informe.md")));
        assert!(cli.pdf);
        assert_eq!(cli.profile, Some(StyleProfile::Simple));

        let overrides = cli.overrides();
        assert_eq!(overrides.output, Some(PathBuf::from("out/informe.docx")));
        assert!(overrides.converter.is_none());
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = CliConfig::parse_from(["mdreport"]);
        assert!(cli.input.is_none());
        assert!(!cli.pdf);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_rejects_unknown_profile() {
        assert!(CliConfig::try_parse_from(["mdreport", "--profile", "fancy"]).is_err());
    }
}

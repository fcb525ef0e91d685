use serde::Serialize;
use std::path::PathBuf;

use crate::utils::error::Result;
use crate::utils::monitor::PhaseStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    /// `# ` lines, centred.
    Title,
    /// `## ` lines.
    Subtitle,
    /// `### ` lines.
    Section,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

pub type Cell = Vec<TextRun>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: usize,
    /// First row was followed by a Markdown alignment row.
    pub header: bool,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: HeadingLevel, runs: Vec<TextRun> },
    Paragraph { runs: Vec<TextRun> },
    BulletItem { runs: Vec<TextRun> },
    NumberedItem { number: u32, runs: Vec<TextRun> },
    CodeBlock { lines: Vec<String> },
    Table(Table),
    Rule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
    /// Link and image lines, plus table fragments too short to render.
    pub skipped_lines: usize,
}

impl ReportDocument {
    /// Plain text of the first title heading, used for the document properties.
    pub fn title(&self) -> Option<String> {
        self.blocks.iter().find_map(|block| match block {
            Block::Heading {
                level: HeadingLevel::Title,
                runs,
            } => Some(runs.iter().map(|run| run.text.as_str()).collect()),
            _ => None,
        })
    }

    pub fn summary(&self) -> ConversionSummary {
        let mut summary = ConversionSummary {
            skipped_lines: self.skipped_lines,
            ..ConversionSummary::default()
        };

        for block in &self.blocks {
            match block {
                Block::Heading { .. } => summary.headings += 1,
                Block::Paragraph { .. } => summary.paragraphs += 1,
                Block::BulletItem { .. } | Block::NumberedItem { .. } => summary.list_items += 1,
                Block::CodeBlock { .. } => summary.code_blocks += 1,
                Block::Table(_) => summary.tables += 1,
                Block::Rule => summary.rules += 1,
            }
        }

        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub headings: usize,
    pub paragraphs: usize,
    pub list_items: usize,
    pub code_blocks: usize,
    pub tables: usize,
    pub rules: usize,
    pub skipped_lines: usize,
}

impl ConversionSummary {
    /// Body paragraphs as Word counts them, table cells excluded.
    pub fn body_paragraphs(&self) -> usize {
        self.headings + self.paragraphs + self.list_items + self.code_blocks + self.rules
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub word_path: PathBuf,
    pub bytes_written: usize,
    pub summary: ConversionSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PdfStatus {
    NotRequested,
    Created { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub word_path: PathBuf,
    pub pdf: PdfStatus,
    pub summary: ConversionSummary,
    pub phases: Vec<PhaseStat>,
}

impl ConversionOutcome {
    /// Pretty JSON for the `--summary` file.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_blocks() {
        let document = ReportDocument {
            blocks: vec![
                Block::Heading {
                    level: HeadingLevel::Title,
                    runs: vec![TextRun::plain("Informe")],
                },
                Block::Paragraph {
                    runs: vec![TextRun::plain("texto")],
                },
                Block::BulletItem {
                    runs: vec![TextRun::plain("uno")],
                },
                Block::NumberedItem {
                    number: 1,
                    runs: vec![TextRun::plain("dos")],
                },
                Block::Rule,
                Block::Table(Table {
                    columns: 1,
                    header: false,
                    rows: vec![vec![vec![TextRun::plain("a")]]],
                }),
            ],
            skipped_lines: 2,
        };

        let summary = document.summary();
        assert_eq!(summary.headings, 1);
        assert_eq!(summary.paragraphs, 1);
        assert_eq!(summary.list_items, 2);
        assert_eq!(summary.tables, 1);
        assert_eq!(summary.rules, 1);
        assert_eq!(summary.skipped_lines, 2);
        assert_eq!(summary.body_paragraphs(), 5);
    }

    #[test]
    fn test_title_joins_runs() {
        let document = ReportDocument {
            blocks: vec![
                Block::Paragraph {
                    runs: vec![TextRun::plain("intro")],
                },
                Block::Heading {
                    level: HeadingLevel::Title,
                    runs: vec![TextRun::plain("Informe "), TextRun::bold("Final")],
                },
            ],
            skipped_lines: 0,
        };

        assert_eq!(document.title().as_deref(), Some("Informe Final"));
        assert_eq!(ReportDocument::default().title(), None);
    }

    #[test]
    fn test_pdf_status_serialization() {
        let status = PdfStatus::Failed {
            reason: "missing".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "missing");
    }

    #[test]
    fn test_outcome_json_tags_pdf_status() {
        let outcome = ConversionOutcome {
            word_path: PathBuf::from("informe.docx"),
            pdf: PdfStatus::Failed {
                reason: "converter missing".to_string(),
            },
            summary: ConversionSummary::default(),
            phases: vec![PhaseStat {
                phase: "load".to_string(),
                elapsed_ms: 3,
                memory_mb: None,
            }],
        };

        let json: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
        assert_eq!(json["word_path"], "informe.docx");
        assert_eq!(json["pdf"]["status"], "failed");
        assert_eq!(json["pdf"]["reason"], "converter missing");
        assert_eq!(json["phases"][0]["phase"], "load");
        assert!(json["phases"][0].get("memory_mb").is_none());
    }
}

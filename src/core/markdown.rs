//! Line-oriented Markdown scanner.
//!
//! Each trimmed line is matched against a fixed list of prefixes, first match
//! wins. Tables and fenced code blocks pull further lines from the input;
//! everything else maps one line to one block.

use crate::domain::model::{Block, Cell, HeadingLevel, ReportDocument, Table, TextRun};
use regex::Regex;
use std::sync::LazyLock;

static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,9})\. (.*)$").expect("ordered list pattern is valid")
});

const CODE_FENCE: &str = "```";

pub fn parse(markdown: &str) -> ReportDocument {
    let markdown = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut document = ReportDocument::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if let Some(title) = line.strip_prefix("# ") {
            document.blocks.push(heading(HeadingLevel::Title, title));
        } else if let Some(subtitle) = line.strip_prefix("## ") {
            document.blocks.push(heading(HeadingLevel::Subtitle, subtitle));
        } else if let Some(header) = line.strip_prefix("### ") {
            document.blocks.push(heading(HeadingLevel::Section, header));
        } else if line.starts_with('|') {
            let table_lines = collect_table_lines(&lines, &mut i);
            match build_table(&table_lines) {
                Some(table) => document.blocks.push(Block::Table(table)),
                None => {
                    tracing::debug!("Dropping table fragment of {} line(s)", table_lines.len());
                    document.skipped_lines += table_lines.len();
                }
            }
            // collect_table_lines already moved past the table
            continue;
        } else if line.starts_with(CODE_FENCE) {
            i += 1;
            let code_lines = collect_code_lines(&lines, &mut i);
            if !code_lines.is_empty() {
                document.blocks.push(Block::CodeBlock { lines: code_lines });
            }
        } else if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            document.blocks.push(Block::BulletItem {
                runs: parse_inline(item),
            });
        } else if let Some((number, item)) = ordered_item(line) {
            document.blocks.push(Block::NumberedItem {
                number,
                runs: parse_inline(item),
            });
        } else if line == "---" {
            document.blocks.push(Block::Rule);
        } else if is_bold_line(line) {
            let inner = &line[2..line.len() - 2];
            document.blocks.push(Block::Paragraph {
                runs: vec![TextRun::bold(inner)],
            });
        } else if let Some(rest) = line.strip_prefix('✅').or_else(|| line.strip_prefix('❌')) {
            document.blocks.push(Block::Paragraph {
                runs: parse_inline(rest.trim_start_matches('\u{fe0f}').trim()),
            });
        } else if line.starts_with('[') || line.starts_with("![") {
            tracing::debug!("Skipping link/image line: {}", line);
            document.skipped_lines += 1;
        } else if !line.is_empty() {
            document.blocks.push(Block::Paragraph {
                runs: parse_inline(line),
            });
        }

        i += 1;
    }

    document
}

/// Splits `**bold**` spans into runs. An unmatched trailing marker stays literal.
pub fn parse_inline(text: &str) -> Vec<TextRun> {
    let mut parts: Vec<String> = text.split("**").map(str::to_owned).collect();

    if parts.len() % 2 == 0 {
        if let Some(tail) = parts.pop() {
            if let Some(last) = parts.last_mut() {
                last.push_str("**");
                last.push_str(&tail);
            }
        }
    }

    parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(index, part)| TextRun {
            text: part,
            bold: index % 2 == 1,
        })
        .collect()
}

fn heading(level: HeadingLevel, text: &str) -> Block {
    Block::Heading {
        level,
        runs: parse_inline(text),
    }
}

fn ordered_item(line: &str) -> Option<(u32, &str)> {
    let captures = ORDERED_ITEM.captures(line)?;
    let number = captures.get(1)?.as_str().parse().ok()?;
    Some((number, captures.get(2)?.as_str()))
}

fn is_bold_line(line: &str) -> bool {
    line.len() >= 4 && line.starts_with("**") && line.ends_with("**")
}

fn collect_table_lines<'a>(lines: &[&'a str], i: &mut usize) -> Vec<&'a str> {
    let mut table_lines = Vec::new();
    while *i < lines.len() && lines[*i].trim().starts_with('|') {
        table_lines.push(lines[*i].trim());
        *i += 1;
    }
    table_lines
}

/// Raw body lines up to the closing fence. Leaves `i` on the fence (or past
/// the end when the block is unterminated).
fn collect_code_lines(lines: &[&str], i: &mut usize) -> Vec<String> {
    let mut code_lines = Vec::new();
    while *i < lines.len() && !lines[*i].trim().starts_with(CODE_FENCE) {
        code_lines.push(lines[*i].trim_end_matches('\r').to_string());
        *i += 1;
    }
    code_lines
}

fn split_cells(line: &str) -> Vec<&str> {
    let pieces: Vec<&str> = line.split('|').collect();
    if pieces.len() < 2 {
        return Vec::new();
    }
    pieces[1..pieces.len() - 1].to_vec()
}

fn is_alignment_row(cells: &[&str]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let cell = cell.trim();
            cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':')
        })
}

fn build_table(table_lines: &[&str]) -> Option<Table> {
    if table_lines.len() < 2 {
        return None;
    }

    let columns = split_cells(table_lines[0]).len();
    if columns == 0 {
        return None;
    }

    let mut header = false;
    let mut rows = Vec::with_capacity(table_lines.len());

    for (row_index, table_line) in table_lines.iter().enumerate() {
        let cells = split_cells(table_line);
        if is_alignment_row(&cells) {
            // only a real first row becomes a header
            header |= row_index == 1 && rows.len() == 1;
            continue;
        }

        let mut row: Vec<Cell> = cells
            .iter()
            .take(columns)
            .map(|cell| parse_inline(cell.trim()))
            .collect();
        row.resize(columns, Vec::new());
        rows.push(row);
    }

    if rows.is_empty() {
        return None;
    }

    Some(Table {
        columns,
        header,
        rows,
    })
}

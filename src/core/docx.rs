//! WordprocessingML rendering and `.docx` packaging.
//!
//! The body is streamed through `quick_xml::Writer`; the fixed parts
//! (content types, relationships, styles, numbering, properties) are small
//! templates with escaped values.

use crate::domain::model::{Block, HeadingLevel, ReportDocument, Table, TextRun};
use crate::domain::style::{half_points, StyleSheet};
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Letter page, 1 in margins: 6.5 in of text width.
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
const PAGE_MARGIN: u32 = 1440;
const TEXT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

const BULLET_NUM_ID: u32 = 1;
const FIRST_ORDERED_NUM_ID: u32 = 2;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const NUMBERING_PART: &str = "word/numbering.xml";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const APP_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>mdreport</Application></Properties>"#;

/// Word paragraph style ids.
pub mod style_id {
    pub const TITLE: &str = "CustomTitle";
    pub const SUBTITLE: &str = "CustomSubtitle";
    pub const HEADER: &str = "CustomHeader";
    pub const CODE: &str = "CustomCode";
    pub const LIST_BULLET: &str = "ListBullet";
    pub const LIST_NUMBER: &str = "ListNumber";
    pub const TABLE_GRID: &str = "TableGrid";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Justification {
    Left,
    Center,
}

#[derive(Debug, Default)]
struct ParagraphProps<'a> {
    style: Option<&'a str>,
    num_id: Option<u32>,
    indent_left: Option<u32>,
    justification: Option<Justification>,
}

#[derive(Debug)]
pub struct DocxWriter<'a> {
    styles: &'a StyleSheet,
    created: DateTime<Utc>,
}

impl<'a> DocxWriter<'a> {
    pub fn new(styles: &'a StyleSheet) -> Self {
        Self {
            styles,
            created: Utc::now(),
        }
    }

    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Renders the document and returns the zipped `.docx` bytes.
    pub fn package(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let (document_xml, ordered_lists) = self.render_document(document)?;
        let styles_xml = self.render_styles();
        let numbering_xml = render_numbering(&ordered_lists);
        let core_xml = self.render_core_properties(document.title().as_deref());

        tracing::debug!(
            "Packaging docx: document.xml {} bytes, {} numbered list(s)",
            document_xml.len(),
            ordered_lists.len()
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        // [Content_Types].xml goes first so consumers can sniff the package
        zip.start_file::<_, ()>("[Content_Types].xml", FileOptions::default())?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;

        zip.start_file::<_, ()>("_rels/.rels", FileOptions::default())?;
        zip.write_all(PACKAGE_RELS.as_bytes())?;

        zip.start_file::<_, ()>("docProps/core.xml", FileOptions::default())?;
        zip.write_all(core_xml.as_bytes())?;

        zip.start_file::<_, ()>("docProps/app.xml", FileOptions::default())?;
        zip.write_all(APP_PROPS.as_bytes())?;

        zip.start_file::<_, ()>("word/_rels/document.xml.rels", FileOptions::default())?;
        zip.write_all(DOCUMENT_RELS.as_bytes())?;

        zip.start_file::<_, ()>(DOCUMENT_PART, FileOptions::default())?;
        zip.write_all(&document_xml)?;

        zip.start_file::<_, ()>(STYLES_PART, FileOptions::default())?;
        zip.write_all(styles_xml.as_bytes())?;

        zip.start_file::<_, ()>(NUMBERING_PART, FileOptions::default())?;
        zip.write_all(numbering_xml.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Returns `word/document.xml` and the start number of every numbered list.
    pub fn render_document(&self, document: &ReportDocument) -> Result<(Vec<u8>, Vec<u32>)> {
        let mut body = BodyWriter::new();
        let mut ordered_lists: Vec<u32> = Vec::new();
        let mut in_ordered_list = false;

        body.declaration()?;
        body.start("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
        body.start("w:body", &[])?;

        for block in &document.blocks {
            let continues_list = matches!(block, Block::NumberedItem { .. });

            match block {
                Block::Heading { level, runs } => {
                    let (style, justification) = match level {
                        HeadingLevel::Title => (style_id::TITLE, Justification::Center),
                        HeadingLevel::Subtitle => (style_id::SUBTITLE, Justification::Left),
                        HeadingLevel::Section => (style_id::HEADER, Justification::Left),
                    };
                    body.paragraph(
                        &ParagraphProps {
                            style: Some(style),
                            justification: Some(justification),
                            ..ParagraphProps::default()
                        },
                        runs,
                    )?;
                }
                Block::Paragraph { runs } => {
                    body.paragraph(&ParagraphProps::default(), runs)?;
                }
                Block::BulletItem { runs } => {
                    body.paragraph(
                        &ParagraphProps {
                            style: Some(style_id::LIST_BULLET),
                            num_id: Some(BULLET_NUM_ID),
                            ..ParagraphProps::default()
                        },
                        runs,
                    )?;
                }
                Block::NumberedItem { number, runs } => {
                    if !in_ordered_list {
                        ordered_lists.push(*number);
                    }
                    let num_id = FIRST_ORDERED_NUM_ID + (ordered_lists.len() as u32 - 1);
                    body.paragraph(
                        &ParagraphProps {
                            style: Some(style_id::LIST_NUMBER),
                            num_id: Some(num_id),
                            ..ParagraphProps::default()
                        },
                        runs,
                    )?;
                }
                Block::CodeBlock { lines } => {
                    body.code_paragraph(self.styles.code_indent_twips(), &lines.join("\n"))?;
                }
                Block::Table(table) => {
                    body.table(table)?;
                }
                Block::Rule => {
                    body.paragraph(
                        &ParagraphProps::default(),
                        &[TextRun::plain(self.styles.separator())],
                    )?;
                }
            }

            in_ordered_list = continues_list;
        }

        body.section_properties()?;
        body.end("w:body")?;
        body.end("w:document")?;

        Ok((body.into_inner(), ordered_lists))
    }

    pub fn render_styles(&self) -> String {
        let s = self.styles;
        let body_font = escape(&s.body_font);
        let heading_font = escape(&s.heading_font);
        let code_font = escape(&s.code_font);

        let heading_style = |id: &str, size: f32, outline: u8| {
            let sz = half_points(size);
            format!(
                r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="{id}"><w:name w:val="{id}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr><w:rPr><w:rFonts w:ascii="{heading_font}" w:hAnsi="{heading_font}" w:cs="{heading_font}"/><w:b/><w:bCs/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr></w:style>"#
            )
        };

        let body_sz = half_points(s.body_size);
        let code_sz = half_points(s.code_size);

        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:styles xmlns:w="{W_NS}">"#));
        xml.push_str(&format!(
            r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{body_font}" w:eastAsia="{body_font}" w:hAnsi="{body_font}" w:cs="{body_font}"/><w:sz w:val="{body_sz}"/><w:szCs w:val="{body_sz}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#
        ));
        xml.push_str(
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
        );
        xml.push_str(&heading_style(style_id::TITLE, s.title_size, 0));
        xml.push_str(&heading_style(style_id::SUBTITLE, s.subtitle_size, 1));
        xml.push_str(&heading_style(style_id::HEADER, s.header_size, 2));
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="{code}"><w:name w:val="{code}"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="120" w:line="240" w:lineRule="auto"/></w:pPr><w:rPr><w:rFonts w:ascii="{code_font}" w:hAnsi="{code_font}" w:cs="{code_font}"/><w:sz w:val="{code_sz}"/><w:szCs w:val="{code_sz}"/></w:rPr></w:style>"#,
            code = style_id::CODE
        ));
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="{BULLET_NUM_ID}"/></w:numPr><w:contextualSpacing/></w:pPr></w:style>"#,
            id = style_id::LIST_BULLET
        ));
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:contextualSpacing/></w:pPr></w:style>"#,
            id = style_id::LIST_NUMBER
        ));
        xml.push_str(
            r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#,
        );
        xml.push_str(&format!(
            r#"<w:style w:type="table" w:styleId="{id}"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>"#,
            id = style_id::TABLE_GRID
        ));
        xml.push_str("</w:styles>");
        xml
    }

    fn render_core_properties(&self, title: Option<&str>) -> String {
        let timestamp = self.created.to_rfc3339_opts(SecondsFormat::Secs, true);
        let title = xml_safe(title.unwrap_or_default());
        let title = escape(&title);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>mdreport</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{timestamp}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{timestamp}</dcterms:modified></cp:coreProperties>"#
        )
    }
}

/// One bullet definition shared by every bullet item, plus one `w:num` per
/// numbered list so each list restarts at its own first number.
fn render_numbering(ordered_lists: &[u32]) -> String {
    let level = |format: &str, text: &str| {
        format!(
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="{format}"/><w:lvlText w:val="{text}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl>"#
        )
    };

    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:numbering xmlns:w="{W_NS}">"#));
    xml.push_str(r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/>"#);
    xml.push_str(&level("bullet", "\u{2022}"));
    xml.push_str("</w:abstractNum>");
    xml.push_str(r#"<w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/>"#);
    xml.push_str(&level("decimal", "%1."));
    xml.push_str("</w:abstractNum>");
    xml.push_str(&format!(
        r#"<w:num w:numId="{BULLET_NUM_ID}"><w:abstractNumId w:val="0"/></w:num>"#
    ));
    for (index, start) in ordered_lists.iter().enumerate() {
        let num_id = FIRST_ORDERED_NUM_ID + index as u32;
        xml.push_str(&format!(
            r#"<w:num w:numId="{num_id}"><w:abstractNumId w:val="1"/><w:lvlOverride w:ilvl="0"><w:startOverride w:val="{start}"/></w:lvlOverride></w:num>"#
        ));
    }
    xml.push_str("</w:numbering>");
    xml
}

/// Drops characters XML 1.0 does not allow in text, such as vertical tab or
/// form feed pasted into the report.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let forbidden = |c: char| {
        (c < ' ' && !matches!(c, '\t' | '\n' | '\r')) || matches!(c, '\u{fffe}' | '\u{ffff}')
    };

    if text.contains(forbidden) {
        tracing::debug!("Removing control characters from text run");
        Cow::Owned(text.chars().filter(|&c| !forbidden(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

struct BodyWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl BodyWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    fn declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(())
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.start("w:t", &[("xml:space", "preserve")])?;
        self.writer
            .write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
        self.end("w:t")
    }

    fn paragraph_properties(&mut self, props: &ParagraphProps<'_>) -> Result<()> {
        if props.style.is_none()
            && props.num_id.is_none()
            && props.indent_left.is_none()
            && props.justification.is_none()
        {
            return Ok(());
        }

        self.start("w:pPr", &[])?;
        if let Some(style) = props.style {
            self.empty("w:pStyle", &[("w:val", style)])?;
        }
        if let Some(num_id) = props.num_id {
            self.start("w:numPr", &[])?;
            self.empty("w:ilvl", &[("w:val", "0")])?;
            self.empty("w:numId", &[("w:val", num_id.to_string().as_str())])?;
            self.end("w:numPr")?;
        }
        if let Some(indent) = props.indent_left {
            self.empty("w:ind", &[("w:left", indent.to_string().as_str())])?;
        }
        if let Some(justification) = props.justification {
            let value = match justification {
                Justification::Left => "left",
                Justification::Center => "center",
            };
            self.empty("w:jc", &[("w:val", value)])?;
        }
        self.end("w:pPr")
    }

    fn run(&mut self, run: &TextRun) -> Result<()> {
        self.start("w:r", &[])?;
        if run.bold {
            self.start("w:rPr", &[])?;
            self.empty("w:b", &[])?;
            self.empty("w:bCs", &[])?;
            self.end("w:rPr")?;
        }
        self.text(&run.text)?;
        self.end("w:r")
    }

    fn paragraph(&mut self, props: &ParagraphProps<'_>, runs: &[TextRun]) -> Result<()> {
        self.start("w:p", &[])?;
        self.paragraph_properties(props)?;
        for run in runs {
            self.run(run)?;
        }
        self.end("w:p")
    }

    /// Single run; newlines become `w:br`, tabs become `w:tab`.
    fn code_paragraph(&mut self, indent: u32, code: &str) -> Result<()> {
        self.start("w:p", &[])?;
        self.paragraph_properties(&ParagraphProps {
            style: Some(style_id::CODE),
            indent_left: Some(indent),
            ..ParagraphProps::default()
        })?;
        self.start("w:r", &[])?;
        for (line_index, line) in code.split('\n').enumerate() {
            if line_index > 0 {
                self.empty("w:br", &[])?;
            }
            for (piece_index, piece) in line.split('\t').enumerate() {
                if piece_index > 0 {
                    self.empty("w:tab", &[])?;
                }
                if !piece.is_empty() {
                    self.text(piece)?;
                }
            }
        }
        self.end("w:r")?;
        self.end("w:p")
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        let column_width = (TEXT_WIDTH / table.columns.max(1) as u32).to_string();

        self.start("w:tbl", &[])?;
        self.start("w:tblPr", &[])?;
        self.empty("w:tblStyle", &[("w:val", style_id::TABLE_GRID)])?;
        self.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
        self.empty("w:tblLook", &[("w:val", "04A0")])?;
        self.end("w:tblPr")?;

        self.start("w:tblGrid", &[])?;
        for _ in 0..table.columns {
            self.empty("w:gridCol", &[("w:w", column_width.as_str())])?;
        }
        self.end("w:tblGrid")?;

        for (row_index, row) in table.rows.iter().enumerate() {
            let header_row = table.header && row_index == 0;
            self.start("w:tr", &[])?;
            if header_row {
                self.start("w:trPr", &[])?;
                self.empty("w:tblHeader", &[])?;
                self.end("w:trPr")?;
            }
            for cell in row {
                self.start("w:tc", &[])?;
                self.start("w:tcPr", &[])?;
                self.empty("w:tcW", &[("w:w", column_width.as_str()), ("w:type", "dxa")])?;
                self.end("w:tcPr")?;
                // every cell needs a paragraph, even an empty one
                self.start("w:p", &[])?;
                for run in cell {
                    if header_row && !run.bold {
                        self.run(&TextRun::bold(run.text.clone()))?;
                    } else {
                        self.run(run)?;
                    }
                }
                self.end("w:p")?;
                self.end("w:tc")?;
            }
            self.end("w:tr")?;
        }

        self.end("w:tbl")
    }

    fn section_properties(&mut self) -> Result<()> {
        let margin = PAGE_MARGIN.to_string();
        self.start("w:sectPr", &[])?;
        self.empty(
            "w:pgSz",
            &[
                ("w:w", PAGE_WIDTH.to_string().as_str()),
                ("w:h", PAGE_HEIGHT.to_string().as_str()),
            ],
        )?;
        self.empty(
            "w:pgMar",
            &[
                ("w:top", margin.as_str()),
                ("w:right", margin.as_str()),
                ("w:bottom", margin.as_str()),
                ("w:left", margin.as_str()),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        self.end("w:sectPr")
    }
}

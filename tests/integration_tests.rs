use mdreport::config::settings::SettingsOverrides;
use mdreport::{
    ConversionEngine, LocalStorage, PdfStatus, ReportError, ReportPipeline, ReportSettings,
    SofficeRenderer, TomlConfig,
};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE_REPORT: &str = "\u{feff}# Informe Técnico del Proyecto
## Resumen
Este informe describe el **sistema** completo.

### Resultados
- Pruebas unitarias
- Pruebas de carga
✅ Cobertura completa
❌ Rendimiento pendiente
1. Diseño
2. Implementación

| Módulo | Estado |
|--------|--------|
| API | Completo |
| UI | Parcial |

```rust
fn main() {
    println!(\"<hola>\");
}
```

---
**Conclusión**
[Repositorio](https://example.com)
![Diagrama](diagrama.png)
";

fn read_part(docx_path: &Path, name: &str) -> String {
    let data = std::fs::read(docx_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn paragraphs_outside_tables(document_xml: &str) -> usize {
    let mut count = 0;
    let mut rest = document_xml;
    while let Some(start) = rest.find("<w:tbl>") {
        count += rest[..start].matches("<w:p>").count();
        rest = match rest[start..].find("</w:tbl>") {
            Some(end) => &rest[start + end..],
            None => "",
        };
    }
    count + rest.matches("<w:p>").count()
}

fn settings_for(temp_dir: &TempDir, pdf: bool, converter: Option<&str>) -> ReportSettings {
    ReportSettings::resolve(
        None,
        SettingsOverrides {
            input: Some(temp_dir.path().join("informe.md")),
            pdf,
            converter: converter.map(str::to_string),
            ..SettingsOverrides::default()
        },
    )
}

#[tokio::test]
async fn test_end_to_end_word_conversion() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("informe.md"), SAMPLE_REPORT).unwrap();

    let settings = settings_for(&temp_dir, false, None);
    let pipeline = ReportPipeline::new(LocalStorage::default(), settings);
    let engine = ConversionEngine::new(pipeline);

    let outcome = engine.run().await.unwrap();
    let expected = temp_dir.path().join("informe.docx");
    assert_eq!(outcome.word_path, expected);
    assert!(expected.exists());
    assert_eq!(outcome.pdf, PdfStatus::NotRequested);

    let summary = &outcome.summary;
    assert_eq!(summary.headings, 3);
    assert_eq!(summary.list_items, 4);
    assert_eq!(summary.tables, 1);
    assert_eq!(summary.code_blocks, 1);
    assert_eq!(summary.rules, 1);
    assert_eq!(summary.skipped_lines, 2);

    assert_eq!(summary.paragraphs, 4);
    assert_eq!(summary.body_paragraphs(), 13);

    let document = read_part(&expected, "word/document.xml");
    assert_eq!(document.matches("<w:tbl>").count(), 1);
    assert_eq!(paragraphs_outside_tables(&document), summary.body_paragraphs());
    // 3 rows of 2 cells, one paragraph per cell
    assert_eq!(
        document.matches("<w:p>").count(),
        summary.body_paragraphs() + 6
    );
    assert!(document.contains("Informe Técnico del Proyecto"));
    assert!(document.contains("Pruebas unitarias"));
    assert!(document.contains("Cobertura completa"));
    assert!(!document.contains("✅"));
    assert!(!document.contains("Repositorio"));
    assert!(document.contains("&lt;hola&gt;"));
    assert!(document.contains(&"_".repeat(50)));

    let styles = read_part(&expected, "word/styles.xml");
    assert!(styles.contains("CustomTitle"));
    assert!(styles.contains("CustomCode"));

    let core = read_part(&expected, "docProps/core.xml");
    assert!(core.contains("<dc:title>Informe Técnico del Proyecto</dc:title>"));
}

#[tokio::test]
async fn test_missing_input_creates_nothing() {
    let temp_dir = TempDir::new().unwrap();

    let settings = settings_for(&temp_dir, false, None);
    let pipeline = ReportPipeline::new(LocalStorage::default(), settings);
    let engine = ConversionEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, ReportError::InputNotFound { .. }));
    assert!(!temp_dir.path().join("informe.docx").exists());
}

#[tokio::test]
async fn test_missing_pdf_converter_keeps_word_document() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("informe.md"), "# Informe\ntexto\n").unwrap();

    let settings = settings_for(&temp_dir, true, Some("mdreport-no-such-converter"));
    let pdf = settings.pdf.clone().unwrap();
    assert_eq!(pdf.output, temp_dir.path().join("informe.pdf"));

    let pipeline = ReportPipeline::new(LocalStorage::default(), settings);
    let engine = ConversionEngine::new(pipeline)
        .with_pdf(Box::new(SofficeRenderer::new(pdf.converter)), pdf.output.clone());

    let outcome = engine.run().await.unwrap();
    assert!(outcome.word_path.exists());
    assert!(matches!(outcome.pdf, PdfStatus::Failed { .. }));
    assert!(!pdf.output.exists());
}

#[tokio::test]
async fn test_toml_config_drives_conversion() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("notas.md");
    let output = temp_dir.path().join("salida/notas.docx");
    std::fs::write(&input, "# Notas\n").unwrap();

    let config_path = temp_dir.path().join("mdreport.toml");
    std::fs::write(
        &config_path,
        format!(
            "[document]\ninput = {:?}\noutput = {:?}\n\n[styles]\nprofile = \"simple\"\nheading_font = \"Helvetica\"\n",
            input.display().to_string(),
            output.display().to_string()
        ),
    )
    .unwrap();

    let file = TomlConfig::from_file(&config_path).unwrap();
    let settings = ReportSettings::resolve(Some(&file), SettingsOverrides::default());
    assert_eq!(settings.styles.title_size, 18.0);

    let pipeline = ReportPipeline::new(LocalStorage::default(), settings);
    let outcome = ConversionEngine::new(pipeline).run().await.unwrap();

    assert_eq!(outcome.word_path, output);
    let styles = read_part(&output, "word/styles.xml");
    assert!(styles.contains("Helvetica"));
    assert!(styles.contains(r#"<w:sz w:val="36"/>"#));
}

use marksrs::reader::{MemorySource, Sheet, Workbook};
use marksrs::{
    AggregateOptions, Catalog, CatalogError, CatalogOptions, CellValue, DatasetLoader,
    DiagnosticKind, LevelFilter, Marks, MarksConfig, aggregate,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

enum Value<'a> {
    Text(&'a str),
    Number(f64),
}

use Value::{Number as N, Text as T};

fn column_letter(col: usize) -> String {
    let mut col = col;
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

fn sheet_xml(rows: &[Vec<Value>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let cell_ref = format!("{}{}", column_letter(c), r + 1);
            match value {
                Value::Text("") => {}
                Value::Text(s) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    cell_ref, s
                )),
                Value::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, n))
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

// Helper to create a minimal valid XLSX file with inline string cells
fn create_mock_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Value>>)]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options)?;
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }
    content_types.push_str("</Types>");
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
    );
    for (i, (name, _)) in sheets.iter().enumerate() {
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            name,
            i + 1,
            i + 1
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    zip.write_all(workbook_xml.as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    let mut rels_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1, i + 1
        ));
    }
    rels_xml.push_str("</Relationships>");
    zip.write_all(rels_xml.as_bytes())?;

    for (i, (_, rows)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(sheet_xml(rows).as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// A grade report: a detail page, then the summary page with four rows of
/// metadata above its header
fn create_grade_report(path: &Path, students: &[(&str, &str, f64)]) -> anyhow::Result<()> {
    let detail = vec![vec![T("Détail par cours")]];
    let mut summary = vec![
        vec![T("Relevé de notes")],
        vec![],
        vec![T("Filière"), T("Informatique")],
        vec![],
        vec![T("Prenom"), T("Nom"), T("Programmation"), T("Note du module"), T("Module")],
    ];
    for (first, last, grade) in students {
        let status = if *grade >= 4.0 { "Réussi" } else { "Echec" };
        summary.push(vec![T(first), T(last), N(*grade), N(*grade), T(status)]);
    }
    create_mock_xlsx(path, &[("Programmation", detail), ("Résumé", summary)])
}

#[test]
fn test_load_real_workbook() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("205 DataStructures2024-2025.xlsx");
    create_grade_report(&path, &[("Alice", "Martin", 5.5), ("Bob", "Rey", 3.5)])?;

    let mut loader = DatasetLoader::new();
    let table = loader.load(&path)?;

    assert_eq!(table.sheet, "Résumé");
    assert_eq!(
        table.columns,
        vec!["Prenom", "Nom", "Programmation", "Note du module", "Module"]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.student_name(1).as_deref(), Some("Bob Rey"));
    assert_eq!(table.get(0, "Note du module"), Some(&CellValue::Number(5.5)));
    assert_eq!(table.get(1, "Module"), Some(&CellValue::Text("Echec".to_string())));

    // Idempotent, and the second call is served from the cache
    let again = loader.load(&path)?;
    assert_eq!(*table, *again);
    assert_eq!(loader.cache().hits(), 1);

    Ok(())
}

#[test]
fn test_catalog_filters_directory_entries() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    create_grade_report(&dir.path().join("a.xlsx"), &[("Alice", "Martin", 5.0)])?;
    std::fs::write(dir.path().join("~a.xlsx"), "lock")?;
    std::fs::write(dir.path().join("b.txt"), "notes")?;
    std::fs::create_dir(dir.path().join("archive.xlsx"))?;

    let mut loader = DatasetLoader::new();
    let catalog = Catalog::load(dir.path(), &mut loader, &CatalogOptions::default())?;

    assert_eq!(catalog.tables().map(|(name, _)| name).collect::<Vec<_>>(), vec!["a.xlsx"]);
    // "~a.xlsx", "b.txt" and the "archive.xlsx" directory
    assert_eq!(catalog.skipped(), 3);
    // "a.xlsx" carries no module key: visible, not selectable
    assert!(catalog.keys().is_empty());
    assert_eq!(catalog.diagnostics().len(), 1);
    assert_eq!(catalog.diagnostics()[0].kind, DiagnosticKind::Parse);

    Ok(())
}

#[test]
fn test_unreadable_file_is_skipped() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    create_grade_report(
        &dir.path().join("205 Algo 2024-2025.xlsx"),
        &[("Alice", "Martin", 5.0)],
    )?;
    std::fs::write(dir.path().join("101 Broken 2023-2024.xlsx"), "not a zip archive")?;

    let mut loader = DatasetLoader::new();
    let catalog = Catalog::load(dir.path(), &mut loader, &CatalogOptions::default())?;

    assert_eq!(catalog.len(), 1);
    assert!(catalog.table("205 Algo 2024-2025.xlsx").is_some());
    assert_eq!(catalog.skipped(), 0);
    let diagnostics = catalog.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Load);
    assert_eq!(diagnostics[0].subject, "101 Broken 2023-2024.xlsx");

    Ok(())
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = DatasetLoader::new();
    let result = Catalog::load(
        &dir.path().join("absent"),
        &mut loader,
        &CatalogOptions::default(),
    );
    assert!(matches!(result, Err(CatalogError::DirectoryRead { .. })));
}

#[test]
fn test_cohort_aggregation_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    create_grade_report(
        &dir.path().join("101 Algebra2023-2024.xlsx"),
        &[("Alice", "Martin", 4.0), ("Carla", "Luz", 5.0)],
    )?;
    create_grade_report(
        &dir.path().join("205 DataStructures2024-2025.xlsx"),
        &[("Alice", "Martin", 4.5), ("Bob", "Rey", 3.5)],
    )?;
    create_grade_report(
        &dir.path().join("210 Networks2024-2025.xlsx"),
        &[("Alice", "Martin", 5.0)],
    )?;
    create_grade_report(
        &dir.path().join("310 Compilers2024-2025.xlsx"),
        &[("Dan", "Ott", 6.0)],
    )?;

    let config = MarksConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let mut marks = Marks::with_config(config);
    let catalog = marks.load_catalog()?;
    assert_eq!(catalog.len(), 4);

    let result = marks.aggregate(&catalog, &LevelFilter::new(['2']))?;
    assert_eq!(result.columns, vec!["205 DataStructures", "210 Networks"]);
    assert_eq!(result.students().collect::<Vec<_>>(), vec!["Alice Martin", "Bob Rey"]);
    assert_eq!(result.rows["Alice Martin"].len(), 2);
    assert_eq!(result.rows["Bob Rey"].len(), 1);
    assert!(result.grade("Carla Luz", "101 Algebra").is_none());

    let alice = marks.student(&catalog, "Alice Martin");
    assert_eq!(alice.modules.len(), 3);

    Ok(())
}

#[test]
fn test_catalog_with_injected_source() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let names = ["101 A 2023-2024.xlsx", "205 B 2023-2024.xlsx", "310 C 2023-2024.xlsx"];
    let mut source = MemorySource::new();
    for (i, name) in names.iter().enumerate() {
        std::fs::write(dir.path().join(name), "")?;
        let mut summary = Sheet::new("Résumé");
        summary.set(4, 0, "Prenom".into());
        summary.set(4, 1, "Nom".into());
        summary.set(4, 2, "Note du module".into());
        summary.set(5, 0, format!("Student{}", i).as_str().into());
        summary.set(5, 1, "X".into());
        summary.set(5, 2, CellValue::Number(4.0 + i as f64));
        source.insert(
            dir.path().join(name),
            Workbook {
                sheets: vec![summary],
                ..Default::default()
            },
        );
    }

    let mut loader = DatasetLoader::with_source(source);
    let catalog = Catalog::load(dir.path(), &mut loader, &CatalogOptions::default())?;
    assert_eq!(loader.source().reads(), 3);

    let result = aggregate(&catalog, &LevelFilter::new(['2']), &AggregateOptions::default())?;
    assert_eq!(result.columns, vec!["205 B "]);
    assert_eq!(result.grade("Student1 X", "205 B "), Some(&CellValue::Number(5.0)));

    // A second catalog over the same loader reads nothing new
    let again = Catalog::load(dir.path(), &mut loader, &CatalogOptions::default())?;
    assert_eq!(again.len(), 3);
    assert_eq!(loader.source().reads(), 3);

    Ok(())
}

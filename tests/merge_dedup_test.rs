// ==========================================
// 多文件合并与去重 集成测试
// ==========================================
// 测试目标: 合并顺序、后写覆盖、fail-fast、写出后回读
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::mock_config::MockConfig;
use helpers::workbook_builder::{number, serial, text, SyngoWorkbookBuilder};
use std::path::PathBuf;
use syngo_ingest::config::ImportSettings;
use syngo_ingest::domain::procedure::{DateTimePair, ProcedureRecord};
use syngo_ingest::exporter::WorkbookWriter;
use syngo_ingest::importer::{ImportError, ProcedureFileParser, SyngoFileParser, SyngoImporter};
use syngo_ingest::logging;
use tempfile::TempDir;

const DOS_2015_03_02: f64 = 42065.0;
const DOS_2015_03_03: f64 = 42066.0;

async fn xlsx_settings() -> ImportSettings {
    ImportSettings::load(&MockConfig::default()).await.unwrap()
}

fn january(dir: &TempDir) -> PathBuf {
    SyngoWorkbookBuilder::canonical()
        .row(&[("ACC", number(100.0)), ("RAD1", text("SMITH"))])
        .row(&[("ACC", number(200.0)), ("RAD1", text("JONES"))])
        .write(dir.path(), "january.xlsx")
}

fn february(dir: &TempDir) -> PathBuf {
    SyngoWorkbookBuilder::canonical()
        .row(&[("ACC", number(100.0)), ("RAD1", text("BROWN"))])
        .write(dir.path(), "february.xlsx")
}

fn radiologist_for(records: &[ProcedureRecord], acc: i64) -> Option<String> {
    records
        .iter()
        .find(|r| r.accession_number == Some(acc))
        .and_then(|r| r.reading_radiologist_1.clone())
}

#[tokio::test]
async fn test_later_file_wins() {
    logging::init_test();
    let temp_dir = TempDir::new().unwrap();
    let importer = SyngoImporter::new(xlsx_settings().await);

    let outcome = importer
        .import_files(&[january(&temp_dir), february(&temp_dir)])
        .unwrap();
    assert_eq!(outcome.files, 2);
    assert_eq!(outcome.parsed_records, 3);
    assert_eq!(outcome.duplicates_removed, 1);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(radiologist_for(&outcome.records, 100).as_deref(), Some("BROWN"));
    assert_eq!(radiologist_for(&outcome.records, 200).as_deref(), Some("JONES"));

    let outcome = importer
        .import_files(&[february(&temp_dir), january(&temp_dir)])
        .unwrap();
    assert_eq!(radiologist_for(&outcome.records, 100).as_deref(), Some("SMITH"));
}

#[tokio::test]
async fn test_fallback_key_collision() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[("MPI", number(7.0)), ("DOS Start", serial(DOS_2015_03_02)), ("TECH", text("A"))])
        .row(&[("MPI", number(7.0)), ("DOS Start", serial(DOS_2015_03_02)), ("TECH", text("B"))])
        .row(&[("MPI", number(7.0)), ("DOS Start", serial(DOS_2015_03_03)), ("TECH", text("C"))])
        .row(&[("MPI", number(7.0)), ("ACC", number(5.0)), ("DOS Start", serial(DOS_2015_03_02))])
        .write(temp_dir.path(), "fallback.xlsx");

    let importer = SyngoImporter::new(xlsx_settings().await);
    let records = importer.import_file(&path, true).unwrap();
    assert_eq!(records.len(), 3);

    let same_day: Vec<&ProcedureRecord> = records
        .iter()
        .filter(|r| r.accession_number.is_none())
        .filter(|r| r.procedure_start.date == NaiveDate::from_ymd_opt(2015, 3, 2))
        .collect();
    assert_eq!(same_day.len(), 1);
    assert_eq!(same_day[0].technologist.as_deref(), Some("B"));

    assert_eq!(importer.import_file(&path, false).unwrap().len(), 4);
}

#[tokio::test]
async fn test_merge_fails_fast_with_file_context() {
    let temp_dir = TempDir::new().unwrap();
    let bad = SyngoWorkbookBuilder::canonical()
        .row(&[("ACC", text("abc"))])
        .write(temp_dir.path(), "bad.xlsx");

    let importer = SyngoImporter::new(xlsx_settings().await);
    let err = importer
        .import_files(&[january(&temp_dir), bad.clone(), february(&temp_dir)])
        .unwrap_err();

    match err {
        ImportError::File { file, source } => {
            assert!(file.ends_with("bad.xlsx"));
            assert!(matches!(*source, ImportError::RowCoercion { row: 1, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_merge_matches_sequential() {
    let temp_dir = TempDir::new().unwrap();
    let settings = ImportSettings::load(&MockConfig::parallel()).await.unwrap();
    let importer = SyngoImporter::new(settings);

    let outcome = importer
        .import(vec![january(&temp_dir), february(&temp_dir)])
        .await
        .unwrap();
    assert_eq!(outcome.duplicates_removed, 1);
    assert_eq!(radiologist_for(&outcome.records, 100).as_deref(), Some("BROWN"));

    let outcome = importer
        .import_files_concurrent(vec![february(&temp_dir), january(&temp_dir)])
        .await
        .unwrap();
    assert_eq!(radiologist_for(&outcome.records, 100).as_deref(), Some("SMITH"));
}

#[tokio::test]
async fn test_concurrent_merge_reports_failing_file() {
    let temp_dir = TempDir::new().unwrap();
    let importer = SyngoImporter::new(xlsx_settings().await);
    let missing = temp_dir.path().join("missing.xlsx");

    let err = importer
        .import_files_concurrent(vec![january(&temp_dir), missing])
        .await
        .unwrap_err();
    match err.root() {
        ImportError::FileNotFound(path) => assert!(path.ends_with("missing.xlsx")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(err, ImportError::File { ref file, .. } if file.ends_with("missing.xlsx")));
}

#[tokio::test]
async fn test_write_then_reparse_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let settings = xlsx_settings().await;

    let start = DateTimePair::new(
        NaiveDate::from_ymd_opt(2015, 3, 2),
        chrono::NaiveTime::from_hms_opt(9, 15, 30),
    );
    let original = vec![
        ProcedureRecord {
            patient_index: Some(88),
            medical_record_number: Some(445566),
            accession_number: Some(1234567),
            reading_radiologist_1: Some("DOE, JANE".to_string()),
            department: Some("IR".to_string()),
            fluoroscopy_time: Some(4.5),
            kerma_area_product: Some(12.75),
            date_of_birth: NaiveDate::from_ymd_opt(1955, 6, 1),
            procedure_start: start,
            procedure_end: DateTimePair::new(NaiveDate::from_ymd_opt(2015, 3, 2), None),
            billing_codes: vec!["36556".to_string(), "77001".to_string()],
            ..ProcedureRecord::default()
        },
        ProcedureRecord {
            patient_index: Some(89),
            report_sign: DateTimePair::new(None, chrono::NaiveTime::from_hms_opt(17, 0, 0)),
            ..ProcedureRecord::default()
        },
    ];

    let output = temp_dir.path().join("merged.xlsx");
    let empty: Vec<ProcedureRecord> = Vec::new();
    WorkbookWriter::new(&settings)
        .with_timestamps(true)
        .write(
            &output,
            &[("Summary", empty.as_slice()), ("Syngo", original.as_slice())],
        )
        .unwrap();

    let reparsed = SyngoFileParser::new(&settings).parse_file(&output).unwrap();
    assert_eq!(reparsed, original);
}

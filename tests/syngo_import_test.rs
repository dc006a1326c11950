// ==========================================
// Syngo 文件解析 集成测试
// ==========================================
// 测试目标: 工作簿 → 操作记录的完整解析路径
// 夹具: 测试时由 rust_xlsxwriter 生成 .xlsx
// ==========================================

mod helpers;

use chrono::{NaiveDate, NaiveTime};
use helpers::workbook_builder::{
    headers_with_split_codes, number, serial, text, SyngoWorkbookBuilder,
};
use syngo_ingest::config::ImportSettings;
use syngo_ingest::domain::procedure::ProcedureRecord;
use syngo_ingest::domain::types::DateMode;
use syngo_ingest::importer::{DedupKey, ImportError, ProcedureFileParser, SyngoFileParser};
use syngo_ingest::logging;
use tempfile::TempDir;

const DOS_2015_03_02: f64 = 42065.0;
const DOS_2015_03_02_MAC: f64 = 40603.0;
const DOB_1955_06_01: f64 = 20241.0;
const NINE_FIFTEEN: f64 = 0.3854166666666667;

fn xlsx_parser() -> SyngoFileParser {
    SyngoFileParser::new(&ImportSettings::default().with_extension("xlsx"))
}

#[test]
fn test_parse_full_row() {
    logging::init_test();
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[
            ("MPI", number(88.0)),
            ("MRN", text("445566")),
            ("ACC", number(1234567.0)),
            ("RAD1", text("DOE, JANE")),
            ("TECH", text("RT01")),
            ("KAP", number(12.75)),
            ("DOB", serial(DOB_1955_06_01)),
            ("DOS Start", serial(DOS_2015_03_02)),
            ("DOS Time", number(NINE_FIFTEEN)),
            ("End DATE", serial(DOS_2015_03_02)),
            ("CPTs", text(" 36556,,77001.0 ")),
        ])
        .write(temp_dir.path(), "full.xlsx");

    let records = xlsx_parser().parse_file(&path).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.patient_index, Some(88));
    assert_eq!(record.medical_record_number, Some(445566));
    assert_eq!(record.accession_number, Some(1234567));
    assert_eq!(record.reading_radiologist_1.as_deref(), Some("DOE, JANE"));
    assert_eq!(record.reading_radiologist_2, None);
    assert_eq!(record.technologist.as_deref(), Some("RT01"));
    assert_eq!(record.kerma_area_product, Some(12.75));
    assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1955, 6, 1));
    assert_eq!(
        record.start(),
        NaiveDate::from_ymd_opt(2015, 3, 2).and_then(|d| d.and_hms_opt(9, 15, 0))
    );

    // 结束日期存在但时间缺失 → 组合时间戳缺失
    assert_eq!(record.procedure_end.date, NaiveDate::from_ymd_opt(2015, 3, 2));
    assert_eq!(record.procedure_end.time, None);
    assert_eq!(record.end(), None);

    assert_eq!(record.billing_codes, vec!["36556", "77001"]);
}

#[test]
fn test_split_code_columns() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::new(headers_with_split_codes(3))
        .row(&[
            ("ACC", number(1.0)),
            ("CPT1", number(71045.0)),
            ("CPT2", text("71046")),
        ])
        .write(temp_dir.path(), "split.xlsx");

    let records = xlsx_parser().parse_file(&path).unwrap();
    assert_eq!(records[0].billing_codes, vec!["71045", "71046"]);
}

#[test]
fn test_split_codes_are_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::new(headers_with_split_codes(2))
        .row(&[("CPT1", text(" g0288 ")), ("CPT2", text("36556.0"))])
        .write(temp_dir.path(), "normalize.xlsx");

    let records = xlsx_parser().parse_file(&path).unwrap();
    assert_eq!(records[0].billing_codes, vec!["G0288", "36556"]);
}

#[test]
fn test_bad_accession_names_row_and_value() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[("ACC", text("abc"))])
        .write(temp_dir.path(), "bad.xlsx");

    let err = xlsx_parser().parse_file(&path).unwrap_err();
    match &err {
        ImportError::RowCoercion { row, field, value, .. } => {
            assert_eq!(*row, 1);
            assert_eq!(field, "ACC");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("第 1 行"));
    assert!(message.contains("'abc'"));
}

#[test]
fn test_row_numbers_count_blank_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[("ACC", number(1.0))])
        .blank_row()
        .row(&[("KAP", text("n/a"))])
        .write(temp_dir.path(), "blank.xlsx");

    let err = xlsx_parser().parse_file(&path).unwrap_err();
    assert!(matches!(err, ImportError::RowCoercion { row: 3, ref field, .. } if field == "KAP"));
}

#[test]
fn test_blank_row_yields_empty_record() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[("ACC", number(1.0))])
        .blank_row()
        .row(&[("ACC", number(2.0))])
        .write(temp_dir.path(), "gaps.xlsx");

    let records = xlsx_parser().parse_file(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1], ProcedureRecord::default());
    assert_eq!(
        records[1].dedup_key(),
        DedupKey::Fallback {
            patient_index: None,
            procedure_date: None,
        }
    );
}

#[test]
fn test_unparseable_dates_become_none() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[
            ("ACC", number(1.0)),
            ("DOB", number(30.0)),
            ("SIGN DATE", text("yesterday")),
            ("Sign Time", text("noon")),
        ])
        .write(temp_dir.path(), "dates.xlsx");

    let record = &xlsx_parser().parse_file(&path).unwrap()[0];
    assert_eq!(record.date_of_birth, None);
    assert_eq!(record.report_sign.date, None);
    assert_eq!(record.report_sign.time, None);
}

#[test]
fn test_missing_column_is_schema_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .without_column("DEPT")
        .row(&[("ACC", number(1.0))])
        .write(temp_dir.path(), "nodept.xlsx");

    let err = xlsx_parser().parse_file(&path).unwrap_err();
    match err {
        ImportError::Schema { message, .. } => assert!(message.contains("DEPT")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_billing_codes_is_schema_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .without_column("CPTs")
        .write(temp_dir.path(), "nocodes.xlsx");

    let err = xlsx_parser().parse_file(&path).unwrap_err();
    match err {
        ImportError::Schema { message, .. } => {
            assert!(message.contains("CPT1"));
            assert!(message.contains("CPTs"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_too_few_sheets_is_schema_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .without_summary_sheet()
        .row(&[("ACC", number(1.0))])
        .write(temp_dir.path(), "onesheet.xlsx");

    assert!(matches!(
        xlsx_parser().parse_file(&path),
        Err(ImportError::Schema { .. })
    ));
}

#[test]
fn test_default_extension_rejects_xlsx() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical().write(temp_dir.path(), "export.xlsx");

    let err = SyngoFileParser::default().parse_file(&path).unwrap_err();
    assert!(matches!(err, ImportError::Extension { ref found, .. } if found == "xlsx"));
}

#[test]
fn test_configured_epoch_applies_without_date_cells() {
    let temp_dir = TempDir::new().unwrap();
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[
            ("DOS Start", number(DOS_2015_03_02_MAC)),
            ("DOS Time", number(NINE_FIFTEEN)),
        ])
        .write(temp_dir.path(), "mac.xlsx");

    let settings = ImportSettings::default()
        .with_extension("xlsx")
        .with_date_mode(DateMode::Mac1904);
    let record = &SyngoFileParser::new(&settings).parse_file(&path).unwrap()[0];
    assert_eq!(record.procedure_start.date, NaiveDate::from_ymd_opt(2015, 3, 2));
    assert_eq!(record.procedure_start.time, NaiveTime::from_hms_opt(9, 15, 0));
}

#[test]
fn test_workbook_epoch_overrides_configured_epoch() {
    let temp_dir = TempDir::new().unwrap();
    // rust_xlsxwriter 写出 1900 纪元工作簿，日期单元格携带该标志
    let path = SyngoWorkbookBuilder::canonical()
        .row(&[
            ("DOB", serial(DOB_1955_06_01)),
            ("DOS Start", number(DOS_2015_03_02)),
        ])
        .write(temp_dir.path(), "windows.xlsx");

    let settings = ImportSettings::default()
        .with_extension("xlsx")
        .with_date_mode(DateMode::Mac1904);
    let record = &SyngoFileParser::new(&settings).parse_file(&path).unwrap()[0];
    assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1955, 6, 1));
    assert_eq!(record.procedure_start.date, NaiveDate::from_ymd_opt(2015, 3, 2));
}


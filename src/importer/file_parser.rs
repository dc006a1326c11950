// ==========================================
// Syngo 导入引擎 - 文件解析器实现
// ==========================================
// 流程: 扩展名校验 → 打开工作簿 → 工作表数量校验 → 纪元识别 → 表头解析 → 逐行构造
// 红线: 任意一行转换失败，整个文件作废（无部分成功）
// 红线: 纪元取自工作簿本身；工作表中没有日期格式单元格时才使用配置值
// ==========================================

use crate::config::settings::ImportSettings;
use crate::domain::procedure::ProcedureRecord;
use crate::domain::raw_value::RawValue;
use crate::domain::types::DateMode;
use crate::importer::column_resolver::ColumnMap;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::ProcedureFileParser;
use calamine::{open_workbook_auto, Data, ExcelDateTime, ExcelDateTimeType, Range, Reader};
use std::path::Path;
use tracing::{debug, info, instrument};

// ==========================================
// SyngoFileParser
// ==========================================
#[derive(Debug, Clone)]
pub struct SyngoFileParser {
    expected_extension: String,
    data_sheet_index: usize,
    /// 工作簿未携带纪元信息时的回退值
    date_mode: DateMode,
}

impl SyngoFileParser {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            expected_extension: settings.expected_extension.clone(),
            data_sheet_index: settings.data_sheet_index,
            date_mode: settings.date_mode,
        }
    }

    fn check_extension(&self, path: &Path) -> ImportResult<()> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != self.expected_extension {
            return Err(ImportError::Extension {
                expected: self.expected_extension.clone(),
                found: ext.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SyngoFileParser {
    fn default() -> Self {
        Self::new(&ImportSettings::default())
    }
}

/// 从日期格式单元格读取工作簿纪元
///
/// calamine 在每个日期单元格上记录工作簿的 1904 标志；
/// 没有日期格式单元格时返回 None
fn workbook_date_mode(range: &Range<Data>) -> Option<DateMode> {
    range.used_cells().find_map(|(_, _, cell)| match cell {
        Data::DateTime(dt) => Some(date_mode_of(dt)),
        _ => None,
    })
}

fn date_mode_of(dt: &ExcelDateTime) -> DateMode {
    let is_1904 = [ExcelDateTimeType::DateTime, ExcelDateTimeType::TimeDelta]
        .into_iter()
        .any(|kind| *dt == ExcelDateTime::new(dt.as_f64(), kind, true));
    if is_1904 {
        DateMode::Mac1904
    } else {
        DateMode::Windows1900
    }
}

/// calamine 单元格 → 原始值（日期单元格取序号，纪元另行识别）
fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::text(s.as_str()),
        Data::Int(v) => RawValue::Int(*v),
        Data::Float(v) => RawValue::Number(*v),
        Data::Bool(v) => RawValue::Bool(*v),
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::text(s.as_str()),
        // #N/A、#VALUE! 等公式错误按空值处理
        Data::Error(_) => RawValue::Empty,
    }
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(v) => crate::importer::value_coercion::format_number(*v),
        other => other.to_string(),
    }
}

impl ProcedureFileParser for SyngoFileParser {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<ProcedureRecord>> {
        let file_name = file_path.display().to_string();

        // 步骤 1: 扩展名校验（不触碰文件）
        self.check_extension(file_path)?;

        // 步骤 2: 文件存在且可读
        match std::fs::metadata(file_path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::FileNotFound(file_name));
            }
            Err(e) => return Err(e.into()),
        }

        // 步骤 3: 打开工作簿（句柄在本函数内独占，任意路径退出即释放）
        let mut workbook = open_workbook_auto(file_path)?;

        // 步骤 4: 工作表数量校验
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .get(self.data_sheet_index)
            .cloned()
            .ok_or_else(|| ImportError::Schema {
                file: file_name.clone(),
                message: format!(
                    "Syngo 数据必须位于工作簿的第 {} 个工作表（实际只有 {} 个）",
                    self.data_sheet_index + 1,
                    sheet_names.len()
                ),
            })?;
        debug!(sheet = %sheet_name, "读取数据工作表");

        let range = workbook.worksheet_range(&sheet_name)?;

        // 步骤 4.5: 纪元识别
        let date_mode = match workbook_date_mode(&range) {
            Some(mode) => {
                debug!(date_mode = %mode, "从工作簿识别日期纪元");
                mode
            }
            None => {
                debug!(date_mode = %self.date_mode, "工作表没有日期格式单元格，使用配置纪元");
                self.date_mode
            }
        };

        let mut rows = range.rows();

        // 步骤 5: 表头 → ColumnMap
        let header_row = rows.next().ok_or_else(|| ImportError::Schema {
            file: file_name.clone(),
            message: format!("工作表 '{}' 没有表头行", sheet_name),
        })?;
        let headers: Vec<String> = header_row.iter().map(header_label).collect();
        let columns = ColumnMap::resolve(&headers).map_err(|e| ImportError::Schema {
            file: file_name.clone(),
            message: e.to_string(),
        })?;
        debug!(split_codes = columns.has_split_codes(), "列映射完成");

        // 步骤 6: 逐行构造（行号从 1 开始）
        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            let row_number = idx + 1;
            let values: Vec<RawValue> = data_row.iter().map(raw_value).collect();

            // 完全空白的行同样产生一条全空记录
            if values.iter().all(RawValue::is_empty) {
                debug!(row_number, "空白行");
            }

            let record = ProcedureRecord::from_row(&values, &columns, date_mode).map_err(|e| {
                match e {
                    ImportError::TypeConversion { field, value, .. } => ImportError::RowCoercion {
                        file: file_name.clone(),
                        row: row_number,
                        field,
                        value,
                    },
                    other => other,
                }
            })?;
            records.push(record);
        }

        info!(records = records.len(), "文件解析完成");
        Ok(records)
    }
}

// ==========================================
// Syngo 导入引擎 - 工作簿写出器
// ==========================================
// 格式: 每个工作表一行标准表头 + 每条记录一行
// 红线: 空记录列表的工作表不写表头
// 红线: 日期/时间按 1900 纪元序号写出，并附带显示格式
// 红线: 标识符超过 2^53 时写为文本，避免精度丢失
// ==========================================

use crate::config::settings::ImportSettings;
use crate::domain::procedure::{OutputCell, ProcedureRecord};
use crate::domain::types::DateMode;
use crate::importer::error::ImportResult;
use crate::importer::value_coercion::{date_to_serial, datetime_to_serial, time_to_fraction};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::{info, instrument};

const DATE_FORMAT: &str = "mm/dd/yyyy";
const TIME_FORMAT: &str = "hh:mm:ss";
const DATETIME_FORMAT: &str = "mm/dd/yyyy hh:mm:ss";

// 写出序号固定使用的纪元
const WRITER_DATE_MODE: DateMode = DateMode::Windows1900;

// 超出 f64 精确整数范围的标识符按文本写出
const MAX_EXACT_INT: u64 = 1 << 53;

struct CellFormats {
    date: Format,
    time: Format,
    datetime: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format(DATE_FORMAT),
            time: Format::new().set_num_format(TIME_FORMAT),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
        }
    }
}

// ==========================================
// WorkbookWriter
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct WorkbookWriter {
    include_timestamps: bool,
}

impl WorkbookWriter {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            include_timestamps: settings.export_timestamps,
        }
    }

    /// 是否追加组合时间戳列（DOS/End/Read/Sign/Add）
    pub fn with_timestamps(mut self, include_timestamps: bool) -> Self {
        self.include_timestamps = include_timestamps;
        self
    }

    /// 写出工作簿
    ///
    /// # 参数
    /// - path: 输出路径
    /// - sheets: (工作表名, 记录列表)，按给定顺序创建工作表
    #[instrument(skip(self, path, sheets), fields(path = %path.as_ref().display()))]
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        sheets: &[(&str, &[ProcedureRecord])],
    ) -> ImportResult<()> {
        let formats = CellFormats::new();
        let mut workbook = Workbook::new();

        for (sheet_name, records) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*sheet_name)?;

            if records.is_empty() {
                continue;
            }

            for (col, heading) in ProcedureRecord::heading_list(self.include_timestamps)
                .iter()
                .enumerate()
            {
                worksheet.write_string(0, col as u16, *heading)?;
            }

            for (idx, record) in records.iter().enumerate() {
                let row = (idx + 1) as u32;
                for (col, cell) in record.data_list(self.include_timestamps).iter().enumerate() {
                    write_cell(worksheet, row, col as u16, cell, &formats)?;
                }
            }
        }

        workbook.save(path.as_ref())?;
        info!(sheets = sheets.len(), "工作簿写出完成");
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &OutputCell,
    formats: &CellFormats,
) -> ImportResult<()> {
    match cell {
        OutputCell::Empty => {}
        OutputCell::Int(v) if v.unsigned_abs() <= MAX_EXACT_INT => {
            worksheet.write_number(row, col, *v as f64)?;
        }
        OutputCell::Int(v) => {
            worksheet.write_string(row, col, v.to_string())?;
        }
        OutputCell::Float(v) => {
            worksheet.write_number(row, col, *v)?;
        }
        OutputCell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        OutputCell::Date(d) => {
            let serial = date_to_serial(*d, WRITER_DATE_MODE);
            worksheet.write_number_with_format(row, col, serial, &formats.date)?;
        }
        OutputCell::Time(t) => {
            worksheet.write_number_with_format(row, col, time_to_fraction(*t), &formats.time)?;
        }
        OutputCell::DateTime(dt) => {
            let serial = datetime_to_serial(*dt, WRITER_DATE_MODE);
            worksheet.write_number_with_format(row, col, serial, &formats.datetime)?;
        }
    }
    Ok(())
}

// ==========================================
// Syngo 工作簿构建器 - 用于集成测试
// ==========================================
// 生成与 Syngo 导出结构一致的 .xlsx:
// 第 1 个工作表为汇总页，第 2 个工作表为数据页（表头 + 数据行）
// ==========================================

use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use syngo_ingest::domain::types::Field;

/// 夹具单元格
#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// 带日期显示格式的序号
    Serial(f64),
}

pub fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

pub fn number(value: f64) -> Cell {
    Cell::Number(value)
}

pub fn serial(value: f64) -> Cell {
    Cell::Serial(value)
}

/// 标准表头（打乱顺序，验证按标题而非位置解析）
pub fn shuffled_headers() -> Vec<String> {
    let mut headers: Vec<String> = Field::ALL.iter().map(|f| f.label().to_string()).collect();
    headers.reverse();
    headers.swap(0, 7);
    headers
}

/// 表头替换计费代码聚合列为 CPT1..CPTn
pub fn headers_with_split_codes(code_columns: usize) -> Vec<String> {
    let mut headers: Vec<String> = shuffled_headers()
        .into_iter()
        .filter(|h| h != Field::BillingCodes.label())
        .collect();
    for n in 1..=code_columns {
        headers.push(format!("CPT{}", n));
    }
    headers
}

pub struct SyngoWorkbookBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<(String, Cell)>>,
    with_summary_sheet: bool,
}

impl SyngoWorkbookBuilder {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            with_summary_sheet: true,
        }
    }

    pub fn canonical() -> Self {
        Self::new(shuffled_headers())
    }

    /// 去掉汇总页（数据页成为唯一的工作表）
    pub fn without_summary_sheet(mut self) -> Self {
        self.with_summary_sheet = false;
        self
    }

    /// 去掉某一列
    pub fn without_column(mut self, label: &str) -> Self {
        self.headers.retain(|h| h != label);
        self
    }

    /// 追加一行（按列标题赋值，未赋值的列留空）
    pub fn row(mut self, values: &[(&str, Cell)]) -> Self {
        self.rows.push(
            values
                .iter()
                .map(|(label, cell)| (label.to_string(), cell.clone()))
                .collect(),
        );
        self
    }

    /// 追加一个完全空白的行
    pub fn blank_row(mut self) -> Self {
        self.rows.push(Vec::new());
        self
    }

    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let date_format = Format::new().set_num_format("mm/dd/yyyy");
        let mut workbook = Workbook::new();

        if self.with_summary_sheet {
            let summary = workbook.add_worksheet();
            summary.set_name("Summary").unwrap();
            summary.write_string(0, 0, "Syngo procedure log export").unwrap();
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name("Data").unwrap();
        for (col, header) in self.headers.iter().enumerate() {
            sheet.write_string(0, col as u16, header.as_str()).unwrap();
        }

        for (idx, values) in self.rows.iter().enumerate() {
            let row = (idx + 1) as u32;
            for (label, cell) in values {
                let col = self
                    .headers
                    .iter()
                    .position(|h| h == label)
                    .unwrap_or_else(|| panic!("夹具中没有列 {}", label)) as u16;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(row, col, s.as_str()).unwrap();
                    }
                    Cell::Number(v) => {
                        sheet.write_number(row, col, *v).unwrap();
                    }
                    Cell::Serial(v) => {
                        sheet.write_number_with_format(row, col, *v, &date_format).unwrap();
                    }
                }
            }
        }

        workbook.save(&path).unwrap();
        path
    }
}

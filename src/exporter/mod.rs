// ==========================================
// Syngo 导入引擎 - 导出层
// ==========================================
// 职责: 操作记录 → Excel 工作簿
// ==========================================

pub mod workbook_writer;

pub use workbook_writer::WorkbookWriter;

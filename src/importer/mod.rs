// ==========================================
// Syngo 导入引擎 - 导入层
// ==========================================
// 职责: Syngo 导出工作簿 → 操作记录，合并并去重
// 支持: Excel (.xls / .xlsx，扩展名由配置决定)
// ==========================================

// 模块声明
pub mod column_resolver;
pub mod dedup;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod syngo_importer;
pub mod value_coercion;

// 重导出核心类型
pub use column_resolver::{ColumnMap, ColumnResolveError, ColumnSlot};
pub use dedup::{deduplicate, detect_duplicates, DedupKey};
pub use error::{ImportError, ImportResult};
pub use file_parser::SyngoFileParser;
pub use syngo_importer::{MergeOutcome, SyngoImporter};
pub use value_coercion::DateCoercionError;

// 重导出 Trait 接口
pub use importer_trait::ProcedureFileParser;

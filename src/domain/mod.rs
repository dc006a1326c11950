// ==========================================
// Syngo 导入引擎 - 领域模型层
// ==========================================
// 职责: 定义操作记录、字段目录、原始单元格值
// 红线: 不含文件访问逻辑
// ==========================================

pub mod procedure;
pub mod raw_value;
pub mod types;

// 重导出核心类型
pub use procedure::{DateTimePair, OutputCell, ProcedureRecord};
pub use raw_value::{CodeSource, FieldValues, RawValue};
pub use types::{DateMode, Field, FieldClass, TimestampPair};

// ==========================================
// Syngo 导入引擎 - 核心库
// ==========================================
// 用途: 读取 Siemens Syngo 放射科操作日志导出
// 流程: 工作簿 → 列映射 → 值转换 → 操作记录 → 合并去重 → 写出
// 技术栈: Rust + calamine + rust_xlsxwriter + SQLite（配置）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与类型
pub mod domain;

// 导入层 - 解析、合并、去重
pub mod importer;

// 导出层 - 工作簿写出
pub mod exporter;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DateMode, Field, FieldClass, TimestampPair};

// 领域实体
pub use domain::{CodeSource, DateTimePair, FieldValues, ProcedureRecord, RawValue};

// 导入/导出
pub use exporter::WorkbookWriter;
pub use importer::{
    DedupKey, ImportError, ImportResult, MergeOutcome, ProcedureFileParser, SyngoFileParser,
    SyngoImporter,
};

// 配置
pub use config::{ConfigManager, ImportConfigReader, ImportSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Syngo 操作日志导入";

// ==========================================
// Syngo 导入引擎 - 导入接口 Trait
// ==========================================
// 职责: 定义文件解析接口（不包含实现）
// ==========================================

use crate::domain::procedure::ProcedureRecord;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// ProcedureFileParser Trait
// ==========================================
// 用途: 单个 Syngo 导出文件 → 操作记录列表
// 实现者: SyngoFileParser
pub trait ProcedureFileParser: Send + Sync {
    /// 解析单个文件
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(Vec<ProcedureRecord>): 文件中全部记录（按行顺序，不去重）
    /// - Err: 扩展名/表结构/行转换错误，整个文件作废
    fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<ProcedureRecord>>;
}

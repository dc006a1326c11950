// ==========================================
// Syngo 导入引擎 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入/导出所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::DateMode;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取回退日期纪元
    ///
    /// # 默认值
    /// - 1900
    ///
    /// # 说明
    /// - 仅用于没有日期格式单元格的工作表；其余情况以工作簿自身标志为准
    async fn get_date_mode(&self) -> Result<DateMode, Box<dyn Error>>;

    /// 获取允许的输入文件扩展名（不含点）
    ///
    /// # 默认值
    /// - xls
    async fn get_expected_extension(&self) -> Result<String, Box<dyn Error>>;

    /// 获取数据所在工作表的下标（从 0 开始）
    ///
    /// # 默认值
    /// - 1（第二个工作表）
    async fn get_data_sheet_index(&self) -> Result<usize, Box<dyn Error>>;

    /// 是否并发解析多个文件
    ///
    /// # 默认值
    /// - false
    async fn get_parallel_parse(&self) -> Result<bool, Box<dyn Error>>;

    /// 写出时是否追加组合时间戳列（DOS/End/Read/Sign/Add）
    ///
    /// # 默认值
    /// - false
    async fn get_export_timestamps(&self) -> Result<bool, Box<dyn Error>>;
}

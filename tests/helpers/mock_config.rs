// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use syngo_ingest::config::ImportConfigReader;
use syngo_ingest::domain::types::DateMode;
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub date_mode: DateMode,
    pub expected_extension: String,
    pub data_sheet_index: usize,
    pub parallel_parse: bool,
    pub export_timestamps: bool,
}

impl MockConfig {
    /// 创建默认配置（测试夹具为 .xlsx）
    pub fn default() -> Self {
        Self {
            date_mode: DateMode::Windows1900,
            expected_extension: "xlsx".to_string(),
            data_sheet_index: 1,
            parallel_parse: false,
            export_timestamps: false,
        }
    }

    /// 创建并发解析配置
    pub fn parallel() -> Self {
        let mut config = Self::default();
        config.parallel_parse = true;
        config
    }

    /// 创建 1904 纪元配置
    pub fn mac_1904() -> Self {
        let mut config = Self::default();
        config.date_mode = DateMode::Mac1904;
        config
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_date_mode(&self) -> Result<DateMode, Box<dyn Error>> {
        Ok(self.date_mode)
    }

    async fn get_expected_extension(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.expected_extension.clone())
    }

    async fn get_data_sheet_index(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.data_sheet_index)
    }

    async fn get_parallel_parse(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.parallel_parse)
    }

    async fn get_export_timestamps(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.export_timestamps)
    }
}

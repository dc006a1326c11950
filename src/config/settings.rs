// ==========================================
// Syngo 导入引擎 - 导入设置快照
// ==========================================
// 用途: 一次导入/导出使用的配置快照，读取后不再变化
// ==========================================

use crate::config::config_manager::config_keys;
use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::DateMode;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = "xls";
pub const DEFAULT_DATA_SHEET_INDEX: usize = 1;

/// 默认配置库路径: <系统配置目录>/syngo-ingest/config.db
///
/// 可通过环境变量 SYNGO_INGEST_CONFIG_DB 显式指定
pub fn default_config_db_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SYNGO_INGEST_CONFIG_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    dirs::config_dir().map(|dir| dir.join("syngo-ingest").join("config.db"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub date_mode: DateMode,
    pub expected_extension: String,
    pub data_sheet_index: usize,
    pub parallel_parse: bool,
    pub export_timestamps: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            date_mode: DateMode::Windows1900,
            expected_extension: DEFAULT_EXTENSION.to_string(),
            data_sheet_index: DEFAULT_DATA_SHEET_INDEX,
            parallel_parse: false,
            export_timestamps: false,
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载快照
    ///
    /// # 返回
    /// - Err(ConfigReadError): 读取失败的配置键及原因
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        Ok(Self {
            date_mode: config
                .get_date_mode()
                .await
                .map_err(|e| read_error(config_keys::DATE_MODE, e))?,
            expected_extension: config
                .get_expected_extension()
                .await
                .map_err(|e| read_error(config_keys::EXPECTED_EXTENSION, e))?,
            data_sheet_index: config
                .get_data_sheet_index()
                .await
                .map_err(|e| read_error(config_keys::DATA_SHEET_INDEX, e))?,
            parallel_parse: config
                .get_parallel_parse()
                .await
                .map_err(|e| read_error(config_keys::PARALLEL_PARSE, e))?,
            export_timestamps: config
                .get_export_timestamps()
                .await
                .map_err(|e| read_error(config_keys::EXPORT_TIMESTAMPS, e))?,
        })
    }

    /// 指定扩展名（测试与导出文件回读使用）
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.expected_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }
}

fn read_error(key: &str, err: Box<dyn Error>) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: err.to_string(),
    }
}

// ==========================================
// Syngo 导入引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::settings::{DEFAULT_DATA_SHEET_INDEX, DEFAULT_EXTENSION};
use crate::db::{ensure_config_schema, open_sqlite_connection};
use crate::domain::types::DateMode;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 配置库文件路径（不存在时创建 config_kv 表）
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 导入日志中记录本次使用的配置
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    fn get_bool_or_default(&self, key: &str, default: bool) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(key, if default { "true" } else { "false" })?;
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" => Ok(true),
            "0" | "false" | "no" | "n" => Ok(false),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "布尔配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 工作簿纪元（1900 / 1904）
    pub const DATE_MODE: &str = "syngo_date_mode";

    // 输入文件
    pub const EXPECTED_EXTENSION: &str = "syngo_expected_extension";
    pub const DATA_SHEET_INDEX: &str = "syngo_data_sheet_index";

    // 多文件合并
    pub const PARALLEL_PARSE: &str = "syngo_parallel_parse";

    // 写出
    pub const EXPORT_TIMESTAMPS: &str = "syngo_export_timestamps";
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_date_mode(&self) -> Result<DateMode, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DATE_MODE, "1900")?;
        Ok(DateMode::from_config_value(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::DATE_MODE,
                raw_value = %value,
                "日期纪元配置格式错误，使用 1900"
            );
            DateMode::Windows1900
        }))
    }

    async fn get_expected_extension(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::EXPECTED_EXTENSION, DEFAULT_EXTENSION)?;
        let trimmed = value.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            Ok(DEFAULT_EXTENSION.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_data_sheet_index(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::DATA_SHEET_INDEX,
            &DEFAULT_DATA_SHEET_INDEX.to_string(),
        )?;
        Ok(value.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::DATA_SHEET_INDEX,
                raw_value = %value,
                "工作表下标配置格式错误，使用默认值"
            );
            DEFAULT_DATA_SHEET_INDEX
        }))
    }

    async fn get_parallel_parse(&self) -> Result<bool, Box<dyn Error>> {
        self.get_bool_or_default(config_keys::PARALLEL_PARSE, false)
    }

    async fn get_export_timestamps(&self) -> Result<bool, Box<dyn Error>> {
        self.get_bool_or_default(config_keys::EXPORT_TIMESTAMPS, false)
    }
}

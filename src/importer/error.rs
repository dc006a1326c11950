// ==========================================
// Syngo 导入引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 错误必须带上文件名/行号/原始值，便于用户直接定位
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件扩展名必须为 '.{expected}'，实际为 '{found}'")]
    Extension { expected: String, found: String },

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("Excel 写出失败: {0}")]
    ExcelWriteError(String),

    // ===== 表结构错误 =====
    #[error("表结构错误 ({file}): {message}")]
    Schema { file: String, message: String },

    // ===== 数据映射错误 =====
    #[error("解析 {file} 第 {row} 行失败: 在字段 {field} 中发现值 '{value}'，与该列类型不符")]
    RowCoercion {
        file: String,
        row: usize,
        field: String,
        value: String,
    },

    #[error("字段缺失: {0}")]
    MissingField(String),

    #[error("类型转换失败 (字段 {field}): 值 '{value}' 无法解析为{expected}")]
    TypeConversion {
        field: String,
        value: String,
        expected: String,
    },

    // ===== 多文件合并 =====
    #[error("解析 Syngo 文件 {file} 时出错: {source}")]
    File {
        file: String,
        #[source]
        source: Box<ImportError>,
    },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 附加文件名（多文件合并时使用）
    pub fn in_file(self, file: impl Into<String>) -> Self {
        ImportError::File {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// 剥掉 File 包装，取得根本原因
    pub fn root(&self) -> &ImportError {
        match self {
            ImportError::File { source, .. } => source.root(),
            other => other,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<rust_xlsxwriter::XlsxError>
impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::ExcelWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

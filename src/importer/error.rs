// ==========================================
// 优惠批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 这里只放“结构性错误”（整个文件作废）
//       行级错误走 ValidationError，不中断导入
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Please upload a CSV file (got: {0})")]
    UnsupportedFormat(String),

    #[error("Failed to read file: {0}")]
    FileReadError(String),

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    InputTooLarge { size: usize, limit: usize },

    // ===== 结构错误 =====
    #[error("CSV file must have a header row and at least one data row")]
    NotEnoughRows,

    #[error(
        "Missing required columns: {}. Found columns: {}",
        missing.join(", "),
        found.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    // ===== 配置错误 =====
    #[error("Failed to read config (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为表头缺列（用于调用方区分展示）
    pub fn is_missing_columns(&self) -> bool {
        matches!(self, ImportError::MissingColumns { .. })
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::InternalError(format!("CSV write failed: {}", err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

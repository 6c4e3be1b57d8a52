// ==========================================
// 优惠批量导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::OriginalPricePolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const DELIMITER: char = ',';
    pub const MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;
    pub const PREVIEW_LIMIT: usize = 50;
    pub const DEFAULT_EXPIRY_DAYS: i64 = 2;
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 解析
    pub const CSV_DELIMITER: &str = "csv_delimiter";
    pub const MAX_INPUT_BYTES: &str = "max_input_bytes";

    // 预览
    pub const PREVIEW_LIMIT: &str = "preview_limit";

    // 校验
    pub const ORIGINAL_PRICE_POLICY: &str = "original_price_policy";

    // 存储
    pub const DEFAULT_EXPIRY_DAYS: &str = "default_expiry_days";
}

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
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
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
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 解析数值配置；缺失返回默认值，格式错误告警后返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_delimiter(&self) -> ConfigResult<char> {
        let value = self.get_config_value(config_keys::CSV_DELIMITER)?;
        // 只接受单个字符，且不能是引号
        let delimiter = value
            .and_then(|v| {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c != '"' => Some(c),
                    _ => {
                        tracing::warn!(raw_value = %v, "分隔符配置无效，使用 ','");
                        None
                    }
                }
            })
            .unwrap_or(defaults::DELIMITER);
        Ok(delimiter)
    }

    async fn get_max_input_bytes(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_INPUT_BYTES, defaults::MAX_INPUT_BYTES)
    }

    async fn get_preview_limit(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::PREVIEW_LIMIT, defaults::PREVIEW_LIMIT)
    }

    async fn get_original_price_policy(&self) -> ConfigResult<OriginalPricePolicy> {
        self.get_parsed_or_default(
            config_keys::ORIGINAL_PRICE_POLICY,
            OriginalPricePolicy::default(),
        )
    }

    async fn get_default_expiry_days(&self) -> ConfigResult<i64> {
        let days = self.get_parsed_or_default(
            config_keys::DEFAULT_EXPIRY_DAYS,
            defaults::DEFAULT_EXPIRY_DAYS,
        )?;
        Ok(if days > 0 {
            days
        } else {
            defaults::DEFAULT_EXPIRY_DAYS
        })
    }
}

// ==========================================
// DefaultImportConfig - 内置默认配置（无数据库时使用）
// ==========================================
#[derive(Debug, Clone)]
pub struct DefaultImportConfig {
    pub delimiter: char,
    pub max_input_bytes: usize,
    pub preview_limit: usize,
    pub original_price_policy: OriginalPricePolicy,
    pub default_expiry_days: i64,
}

impl Default for DefaultImportConfig {
    fn default() -> Self {
        Self {
            delimiter: defaults::DELIMITER,
            max_input_bytes: defaults::MAX_INPUT_BYTES,
            preview_limit: defaults::PREVIEW_LIMIT,
            original_price_policy: OriginalPricePolicy::default(),
            default_expiry_days: defaults::DEFAULT_EXPIRY_DAYS,
        }
    }
}

#[async_trait]
impl ImportConfigReader for DefaultImportConfig {
    async fn get_delimiter(&self) -> ConfigResult<char> {
        Ok(self.delimiter)
    }

    async fn get_max_input_bytes(&self) -> ConfigResult<usize> {
        Ok(self.max_input_bytes)
    }

    async fn get_preview_limit(&self) -> ConfigResult<usize> {
        Ok(self.preview_limit)
    }

    async fn get_original_price_policy(&self) -> ConfigResult<OriginalPricePolicy> {
        Ok(self.original_price_policy)
    }

    async fn get_default_expiry_days(&self) -> ConfigResult<i64> {
        Ok(self.default_expiry_days)
    }
}

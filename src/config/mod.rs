// ==========================================
// 优惠批量导入 - 配置层
// ==========================================
// 职责: 导入/提交配置读取,支持 config_kv 覆写
// 存储: config_kv 表（无数据库时使用内置默认值）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager, DefaultImportConfig};
pub use import_config_trait::ImportConfigReader;

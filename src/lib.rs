// ==========================================
// 优惠批量导入 - 核心库
// ==========================================
// 管道: 分词 → 表头解析 → 行校验 → 批次汇总 → 提交网关
// 技术栈: Rust + SQLite（本地存储端）+ HTTP（远端存储端）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - CSV 解析与校验
pub mod importer;

// 提交网关 - 整批提交
pub mod gateway;

// 数据仓储层 - 数据访问
pub mod repository;

// API 层 - 批量创建
pub mod api;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DealField, DealStatus, OriginalPricePolicy};

// 领域实体
pub use domain::{
    BulkCreateOutcome, Deal, DealImage, ImportBatch, ImportOutcome, ImportSummary,
    ParsedRecord, RetailerProfile, ValidationError,
};

// 导入
pub use importer::{DealImporter, DealImporterImpl, ImportError};

// 提交
pub use gateway::{DealSubmitter, SubmissionError, SubmissionGateway};

// API
pub use api::{BulkUploadApi, BulkUploadResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "deal-bulk-import";

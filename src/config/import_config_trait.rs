// ==========================================
// 优惠批量导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入/提交所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::OriginalPricePolicy;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、DefaultImportConfig（内置默认值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取字段分隔符
    ///
    /// # 默认值
    /// - ','
    async fn get_delimiter(&self) -> Result<char, Box<dyn Error + Send + Sync>>;

    /// 获取单个导入文件的大小上限（字节）
    ///
    /// # 默认值
    /// - 5 MiB
    ///
    /// # 说明
    /// - 文件整体读入内存后解析，不做流式处理
    async fn get_max_input_bytes(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取预览条数
    ///
    /// # 默认值
    /// - 50
    async fn get_preview_limit(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取原价校验策略
    ///
    /// # 默认值
    /// - LENIENT
    async fn get_original_price_policy(
        &self,
    ) -> Result<OriginalPricePolicy, Box<dyn Error + Send + Sync>>;

    /// 获取默认过期天数（expires_at 缺省时由存储端使用）
    ///
    /// # 默认值
    /// - 2
    async fn get_default_expiry_days(&self) -> Result<i64, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use deal_bulk_import::config::ImportConfigReader;
use deal_bulk_import::domain::OriginalPricePolicy;
use std::error::Error;

/// 配置存储不可用（所有读取均失败）
#[derive(Debug, Clone, Default)]
pub struct UnavailableConfig;

#[async_trait]
impl ImportConfigReader for UnavailableConfig {
    async fn get_delimiter(&self) -> Result<char, Box<dyn Error + Send + Sync>> {
        Err("config store offline".into())
    }

    async fn get_max_input_bytes(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Err("config store offline".into())
    }

    async fn get_preview_limit(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Err("config store offline".into())
    }

    async fn get_original_price_policy(
        &self,
    ) -> Result<OriginalPricePolicy, Box<dyn Error + Send + Sync>> {
        Err("config store offline".into())
    }

    async fn get_default_expiry_days(&self) -> Result<i64, Box<dyn Error + Send + Sync>> {
        Err("config store offline".into())
    }
}

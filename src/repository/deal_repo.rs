// ==========================================
// 优惠批量导入 - 优惠 Repository Trait
// ==========================================
// 职责: 定义批量创建所需的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::deal::{Deal, DealImage};
use crate::domain::retailer::RetailerProfile;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// DealRepository Trait
// ==========================================
// 用途: 零售商档案 / 优惠 / 优惠图片 数据访问
// 实现者: DealRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait DealRepository: Send + Sync {
    // ===== 权限相关 =====

    /// 按所有者查询零售商档案
    async fn find_profile_by_owner(
        &self,
        owner_user_id: &str,
    ) -> RepositoryResult<Option<RetailerProfile>>;

    /// 是否为管理员
    async fn is_admin(&self, user_id: &str) -> RepositoryResult<bool>;

    /// 统计档案自某时刻起创建的优惠数
    async fn count_created_since(
        &self,
        retailer_profile_id: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<i64>;

    // ===== 写入 =====

    /// 将已过期的 active 优惠归档
    ///
    /// # 返回
    /// - Ok(usize): 归档条数
    async fn archive_expired(&self, now: DateTime<Utc>) -> RepositoryResult<usize>;

    /// 批量插入优惠（单事务，失败整体回滚）
    async fn insert_deals(&self, deals: &[Deal]) -> RepositoryResult<usize>;

    /// 批量插入优惠图片（单事务）
    async fn insert_images(&self, images: &[DealImage]) -> RepositoryResult<usize>;

    // ===== 查询 =====

    /// 按档案列出优惠（按创建时间排序）
    async fn list_deals_by_profile(&self, retailer_profile_id: &str)
        -> RepositoryResult<Vec<Deal>>;

    /// 列出优惠的图片
    async fn list_images_by_deal(&self, deal_id: &str) -> RepositoryResult<Vec<DealImage>>;
}

// ==========================================
// 优惠批量导入 - 批量创建API
// ==========================================
// 职责: 接收已解析的优惠批次，复核后整批落库
// 前置: 零售商档案 + CSV 权限（管理员除外）+ 档案启用 + 每日上限
// 写入: deals 单事务；deal_images 失败只记日志
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::deal::{Deal, DealImage, ParsedRecord, ValidationError};
use crate::domain::retailer::RetailerProfile;
use crate::domain::types::{DealField, DealStatus};
use crate::importer::row_validator::is_valid_external_url;
use crate::repository::{DealRepository, DealRepositoryImpl};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 批量创建响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUploadResponse {
    /// 已创建的优惠
    pub deals: Vec<Deal>,
    /// 创建条数
    pub count: usize,
    /// 结果说明
    pub message: String,
}

// ==========================================
// BulkUploadApi
// ==========================================
pub struct BulkUploadApi {
    repo: Arc<dyn DealRepository>,
    config: Arc<dyn ImportConfigReader>,
}

impl BulkUploadApi {
    pub fn new(repo: Arc<dyn DealRepository>, config: Arc<dyn ImportConfigReader>) -> Self {
        Self { repo, config }
    }

    /// 打开数据库（建表幂等），仓储与配置共享同一连接
    pub fn from_db_path(db_path: &str) -> ApiResult<Self> {
        Self::from_connection(open_store(db_path)?)
    }

    /// 基于已初始化的共享连接构造
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        let repo = DealRepositoryImpl::from_connection(conn);

        Ok(Self::new(Arc::new(repo), Arc::new(config)))
    }

    /// 批量创建优惠
    ///
    /// # 参数
    /// - user_id: 提交者
    /// - deals: 已解析记录（按提交顺序，行号 = 下标 + 1）
    ///
    /// # 返回
    /// - Ok(BulkUploadResponse): 全部创建
    /// - Err: 权限/上限/复核失败时不写入任何优惠
    #[instrument(skip(self, deals), fields(deal_count = deals.len()))]
    pub async fn bulk_upload(
        &self,
        user_id: &str,
        deals: Vec<ParsedRecord>,
    ) -> ApiResult<BulkUploadResponse> {
        if deals.is_empty() {
            return Err(ApiError::InvalidInput("No deals provided".to_string()));
        }

        // === 步骤 1: 权限 ===
        let profile = self
            .repo
            .find_profile_by_owner(user_id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("You do not have a retailer profile".to_string()))?;

        let admin = self.repo.is_admin(user_id).await?;
        if !admin && !profile.has_csv_permission {
            return Err(ApiError::Forbidden(
                "You do not have CSV upload permission".to_string(),
            ));
        }
        if !profile.is_active {
            return Err(ApiError::Forbidden(
                "Your retailer profile is not active".to_string(),
            ));
        }

        // === 步骤 2: 每日上限 ===
        let now = Utc::now();
        if !admin {
            self.check_daily_limit(&profile, deals.len(), now).await?;
        }

        // === 步骤 3: 归档过期优惠 ===
        let archived = self.repo.archive_expired(now).await?;
        if archived > 0 {
            info!(archived, "已归档过期优惠");
        }

        // === 步骤 4: 复核并构造实体 ===
        let expiry_days = self
            .config
            .get_default_expiry_days()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let default_expires_at = Duration::try_days(expiry_days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| {
                ApiError::InternalError(format!(
                    "default_expiry_days out of range: {}",
                    expiry_days
                ))
            })?;

        let mut prepared = Vec::with_capacity(deals.len());
        let mut images = Vec::new();
        let mut errors = Vec::new();

        for (idx, record) in deals.into_iter().enumerate() {
            let row = idx + 1;
            if let Some(error) = first_violation(&record, row) {
                debug!(row, field = %error.field, "服务端复核失败");
                errors.push(error);
                continue;
            }

            let deal = Deal {
                id: Uuid::new_v4().to_string(),
                retailer_profile_id: profile.id.clone(),
                deal_type_id: record.deal_type_id,
                title: record.title.trim().to_string(),
                description: record
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                price: record.price,
                original_price: record.original_price,
                external_url: record.external_url.trim().to_string(),
                expires_at: record.expires_at.unwrap_or(default_expires_at),
                status: DealStatus::Active,
                created_at: now,
            };

            if let Some(image_url) = record
                .image_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
            {
                images.push(DealImage {
                    id: Uuid::new_v4().to_string(),
                    deal_id: deal.id.clone(),
                    image_url,
                    display_order: 1,
                });
            }

            prepared.push(deal);
        }

        if !errors.is_empty() {
            warn!(
                success_count = prepared.len(),
                error_count = errors.len(),
                "批量创建复核失败，整批拒绝"
            );
            return Err(ApiError::ValidationFailed {
                success_count: prepared.len(),
                error_count: errors.len(),
                errors,
            });
        }

        // === 步骤 5: 落库 ===
        let created = self.repo.insert_deals(&prepared).await?;

        let image_count = if images.is_empty() {
            0
        } else {
            // 写入失败只记日志，计数仍按提交的图片数
            if let Err(e) = self.repo.insert_images(&images).await {
                warn!(error = %e, image_count = images.len(), "优惠图片写入失败，优惠已创建");
            }
            images.len()
        };

        info!(created, image_count, profile_id = %profile.id, "批量创建完成");

        Ok(BulkUploadResponse {
            count: created,
            message: format!(
                "Successfully created {} deal(s) with {} image(s)",
                created, image_count
            ),
            deals: prepared,
        })
    }

    async fn check_daily_limit(
        &self,
        profile: &RetailerProfile,
        requested: usize,
        now: DateTime<Utc>,
    ) -> ApiResult<()> {
        if !profile.has_daily_limit() {
            return Ok(());
        }

        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);
        let created_today = self
            .repo
            .count_created_since(&profile.id, start_of_day)
            .await?;

        let remaining = profile.daily_deal_limit - created_today;
        if i64::try_from(requested).unwrap_or(i64::MAX) > remaining {
            return Err(ApiError::DailyLimitExceeded {
                remaining,
                limit: profile.daily_deal_limit,
            });
        }
        Ok(())
    }
}

/// 打开数据库并建表（幂等），返回可在配置、仓储、API 间共享的连接
///
/// # 参数
/// - db_path: 数据库文件路径（不存在时创建）
pub fn open_store(db_path: &str) -> ApiResult<Arc<Mutex<Connection>>> {
    let conn = open_sqlite_connection(db_path)
        .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
    init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 服务端复核：每行只报第一个问题
fn first_violation(record: &ParsedRecord, row: usize) -> Option<ValidationError> {
    let violation = |field: DealField, message: &str| ValidationError {
        line: row,
        field,
        message: message.to_string(),
    };

    if record.title.trim().is_empty() {
        return Some(violation(DealField::Title, "Title is required"));
    }
    if !(record.price.is_finite() && record.price > 0.0) {
        return Some(violation(DealField::Price, "Valid price is required"));
    }
    if !is_valid_external_url(record.external_url.trim()) {
        return Some(violation(DealField::ExternalUrl, "Valid URL is required"));
    }
    None
}

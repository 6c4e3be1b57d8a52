// ==========================================
// 优惠批量导入 - 优惠 Repository 实现
// ==========================================
// 存储: retailer_profiles / admin_users / deals / deal_images
// 时间列统一写 RFC 3339（UTC, 微秒, 'Z' 结尾），定长可按字符串比较
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::deal::{Deal, DealImage};
use crate::domain::retailer::RetailerProfile;
use crate::domain::types::DealStatus;
use crate::repository::deal_repo::DealRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

/// 时间列格式化
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(field: &str, raw: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("{} ({})", e, raw),
        })
}

// ==========================================
// DealRepositoryImpl
// ==========================================
pub struct DealRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl DealRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 档案维护（种子数据 / 管理工具使用）=====

    /// 写入零售商档案（同一所有者已有档案时更新，保留原 id）
    pub fn upsert_profile(&self, profile: &RetailerProfile) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO retailer_profiles (
                id, owner_user_id, business_name, has_csv_permission,
                is_active, daily_deal_limit, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(owner_user_id) DO UPDATE SET
                business_name = excluded.business_name,
                has_csv_permission = excluded.has_csv_permission,
                is_active = excluded.is_active,
                daily_deal_limit = excluded.daily_deal_limit
            "#,
            params![
                profile.id,
                profile.owner_user_id,
                profile.business_name,
                profile.has_csv_permission,
                profile.is_active,
                profile.daily_deal_limit,
                format_timestamp(profile.created_at),
            ],
        )?;
        Ok(())
    }

    /// 登记管理员
    pub fn add_admin(&self, user_id: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO admin_users (user_id) VALUES (?1)",
            params![user_id],
        )?;
        Ok(())
    }

    // ===== 事务内批量写入 =====

    fn insert_deals_tx(tx: &Transaction, deals: &[Deal]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO deals (
                id, retailer_profile_id, deal_type_id, title, description,
                price, original_price, external_url, expires_at, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )?;

        let mut count = 0;
        for deal in deals {
            stmt.execute(params![
                deal.id,
                deal.retailer_profile_id,
                deal.deal_type_id,
                deal.title,
                deal.description,
                deal.price,
                deal.original_price,
                deal.external_url,
                format_timestamp(deal.expires_at),
                deal.status.as_str(),
                format_timestamp(deal.created_at),
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn insert_images_tx(tx: &Transaction, images: &[DealImage]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            "INSERT INTO deal_images (id, deal_id, image_url, display_order) VALUES (?1, ?2, ?3, ?4)",
        )?;

        let mut count = 0;
        for image in images {
            stmt.execute(params![
                image.id,
                image.deal_id,
                image.image_url,
                image.display_order,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    // ===== 行映射 =====

    fn map_profile(row: &Row) -> rusqlite::Result<RawProfile> {
        Ok(RawProfile {
            id: row.get(0)?,
            owner_user_id: row.get(1)?,
            business_name: row.get(2)?,
            has_csv_permission: row.get(3)?,
            is_active: row.get(4)?,
            daily_deal_limit: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn map_deal(row: &Row) -> rusqlite::Result<RawDeal> {
        Ok(RawDeal {
            id: row.get(0)?,
            retailer_profile_id: row.get(1)?,
            deal_type_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            price: row.get(5)?,
            original_price: row.get(6)?,
            external_url: row.get(7)?,
            expires_at: row.get(8)?,
            status: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

// 时间与状态列以文本读出，再统一转换
struct RawProfile {
    id: String,
    owner_user_id: String,
    business_name: String,
    has_csv_permission: bool,
    is_active: bool,
    daily_deal_limit: i64,
    created_at: String,
}

impl RawProfile {
    fn into_profile(self) -> RepositoryResult<RetailerProfile> {
        Ok(RetailerProfile {
            created_at: parse_timestamp("created_at", &self.created_at)?,
            id: self.id,
            owner_user_id: self.owner_user_id,
            business_name: self.business_name,
            has_csv_permission: self.has_csv_permission,
            is_active: self.is_active,
            daily_deal_limit: self.daily_deal_limit,
        })
    }
}

struct RawDeal {
    id: String,
    retailer_profile_id: String,
    deal_type_id: Option<String>,
    title: String,
    description: Option<String>,
    price: f64,
    original_price: Option<f64>,
    external_url: String,
    expires_at: String,
    status: String,
    created_at: String,
}

impl RawDeal {
    fn into_deal(self) -> RepositoryResult<Deal> {
        let status = self
            .status
            .parse::<DealStatus>()
            .map_err(|message| RepositoryError::FieldValueError {
                field: "status".to_string(),
                message,
            })?;

        Ok(Deal {
            expires_at: parse_timestamp("expires_at", &self.expires_at)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            id: self.id,
            retailer_profile_id: self.retailer_profile_id,
            deal_type_id: self.deal_type_id,
            title: self.title,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            external_url: self.external_url,
            status,
        })
    }
}

#[async_trait]
impl DealRepository for DealRepositoryImpl {
    async fn find_profile_by_owner(
        &self,
        owner_user_id: &str,
    ) -> RepositoryResult<Option<RetailerProfile>> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                r#"
                SELECT id, owner_user_id, business_name, has_csv_permission,
                       is_active, daily_deal_limit, created_at
                FROM retailer_profiles
                WHERE owner_user_id = ?1
                "#,
                params![owner_user_id],
                Self::map_profile,
            )
            .optional()?;

        found.map(RawProfile::into_profile).transpose()
    }

    async fn is_admin(&self, user_id: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM admin_users WHERE user_id = ?1",
                params![user_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    async fn count_created_since(
        &self,
        retailer_profile_id: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM deals WHERE retailer_profile_id = ?1 AND created_at >= ?2",
            params![retailer_profile_id, format_timestamp(since)],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(count)
    }

    async fn archive_expired(&self, now: DateTime<Utc>) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE deals SET status = ?1 WHERE status = ?2 AND expires_at < ?3",
            params![
                DealStatus::Archived.as_str(),
                DealStatus::Active.as_str(),
                format_timestamp(now),
            ],
        )?;
        Ok(changed)
    }

    async fn insert_deals(&self, deals: &[Deal]) -> RepositoryResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let count = Self::insert_deals_tx(&tx, deals)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn insert_images(&self, images: &[DealImage]) -> RepositoryResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let count = Self::insert_images_tx(&tx, images)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn list_deals_by_profile(
        &self,
        retailer_profile_id: &str,
    ) -> RepositoryResult<Vec<Deal>> {
        let raw = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, retailer_profile_id, deal_type_id, title, description,
                       price, original_price, external_url, expires_at, status, created_at
                FROM deals
                WHERE retailer_profile_id = ?1
                ORDER BY created_at, rowid
                "#,
            )?;
            let rows = stmt.query_map(params![retailer_profile_id], Self::map_deal)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        raw.into_iter().map(RawDeal::into_deal).collect()
    }

    async fn list_images_by_deal(&self, deal_id: &str) -> RepositoryResult<Vec<DealImage>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, deal_id, image_url, display_order
            FROM deal_images
            WHERE deal_id = ?1
            ORDER BY display_order
            "#,
        )?;
        let rows = stmt.query_map(params![deal_id], |row| {
            Ok(DealImage {
                id: row.get(0)?,
                deal_id: row.get(1)?,
                image_url: row.get(2)?,
                display_order: row.get(3)?,
            })
        })?;
        let images = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    fn create_repo() -> (NamedTempFile, DealRepositoryImpl) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&db_path).unwrap();
        crate::db::init_schema(&conn).unwrap();
        (
            temp_file,
            DealRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))),
        )
    }

    fn profile() -> RetailerProfile {
        RetailerProfile {
            id: "rp-1".to_string(),
            owner_user_id: "user-1".to_string(),
            business_name: "Corner Shop".to_string(),
            has_csv_permission: true,
            is_active: true,
            daily_deal_limit: 0,
            created_at: Utc::now(),
        }
    }

    fn deal(id: &str, expires_at: DateTime<Utc>, created_at: DateTime<Utc>) -> Deal {
        Deal {
            id: id.to_string(),
            retailer_profile_id: "rp-1".to_string(),
            deal_type_id: None,
            title: format!("Deal {}", id),
            description: None,
            price: 10.0,
            original_price: Some(20.0),
            external_url: "https://example.com".to_string(),
            expires_at,
            status: DealStatus::Active,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_profile_lookup_and_admin() {
        let (_tmp, repo) = create_repo();
        repo.upsert_profile(&profile()).unwrap();
        repo.add_admin("admin-1").unwrap();

        let found = repo.find_profile_by_owner("user-1").await.unwrap().unwrap();
        assert_eq!(found.business_name, "Corner Shop");
        assert!(found.has_csv_permission);
        assert!(repo.find_profile_by_owner("nobody").await.unwrap().is_none());

        assert!(repo.is_admin("admin-1").await.unwrap());
        assert!(!repo.is_admin("user-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_profile_same_owner_keeps_id() {
        let (_tmp, repo) = create_repo();
        repo.upsert_profile(&profile()).unwrap();

        let mut again = profile();
        again.id = "rp-other".to_string();
        again.daily_deal_limit = 5;
        repo.upsert_profile(&again).unwrap();

        let found = repo.find_profile_by_owner("user-1").await.unwrap().unwrap();
        assert_eq!(found.id, "rp-1");
        assert_eq!(found.daily_deal_limit, 5);
    }

    #[tokio::test]
    async fn test_insert_count_and_archive() {
        let (_tmp, repo) = create_repo();
        repo.upsert_profile(&profile()).unwrap();
        let now = Utc::now();

        let deals = vec![
            deal("d1", now - Duration::hours(1), now - Duration::days(2)),
            deal("d2", now + Duration::days(1), now),
        ];
        assert_eq!(repo.insert_deals(&deals).await.unwrap(), 2);

        let since = now - Duration::hours(12);
        assert_eq!(repo.count_created_since("rp-1", since).await.unwrap(), 1);

        assert_eq!(repo.archive_expired(now).await.unwrap(), 1);
        let stored = repo.list_deals_by_profile("rp-1").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].status, DealStatus::Archived);
        assert_eq!(stored[1].status, DealStatus::Active);
        assert_eq!(stored[1].original_price, Some(20.0));
    }

    #[tokio::test]
    async fn test_insert_deals_rolls_back_on_failure() {
        let (_tmp, repo) = create_repo();
        repo.upsert_profile(&profile()).unwrap();
        let now = Utc::now();

        // 重复主键使第二条失败
        let deals = vec![deal("dup", now, now), deal("dup", now, now)];
        assert!(repo.insert_deals(&deals).await.is_err());
        assert!(repo.list_deals_by_profile("rp-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_images() {
        let (_tmp, repo) = create_repo();
        repo.upsert_profile(&profile()).unwrap();
        let now = Utc::now();
        repo.insert_deals(&[deal("d1", now, now)]).await.unwrap();

        let image = DealImage {
            id: "img-1".to_string(),
            deal_id: "d1".to_string(),
            image_url: "https://example.com/a.png".to_string(),
            display_order: 1,
        };
        assert_eq!(repo.insert_images(&[image.clone()]).await.unwrap(), 1);
        assert_eq!(repo.list_images_by_deal("d1").await.unwrap(), vec![image]);
    }
}

// ==========================================
// BulkUploadApi 集成测试
// ==========================================
// 测试目标: 权限、每日上限、服务端复核、整批写入、图片写入
// ==========================================


use chrono::{Duration, Utc};
use deal_bulk_import::api::{ApiError, BulkUploadApi};
use deal_bulk_import::config::{config_keys, ConfigManager};
use deal_bulk_import::domain::{Deal, DealField, DealStatus, ParsedRecord};
use deal_bulk_import::repository::{DealRepository, DealRepositoryImpl};
use test_helpers::{create_test_db, retailer, seed_admin, seed_retailer};

fn record(title: &str, price: f64) -> ParsedRecord {
    ParsedRecord::new(title, price, format!("https://example.com/{}", title))
}

fn existing_deal(id: &str, profile_id: &str, created_ago: Duration) -> Deal {
    let now = Utc::now();
    Deal {
        id: id.to_string(),
        retailer_profile_id: profile_id.to_string(),
        deal_type_id: None,
        title: id.to_string(),
        description: None,
        price: 1.0,
        original_price: None,
        external_url: "https://example.com".to_string(),
        expires_at: now + Duration::days(1),
        status: DealStatus::Active,
        created_at: now - created_ago,
    }
}

#[tokio::test]
async fn test_bulk_upload_creates_deals_and_images() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_retailer(&db_path, &retailer("rp-1", "user-1")).unwrap();

    let api = BulkUploadApi::from_db_path(&db_path).unwrap();

    let mut with_image = record("lamp", 12.5);
    with_image.image_url = Some(" https://example.com/lamp.png ".to_string());
    with_image.description = Some("   ".to_string());
    let plain = record("fob", 30.0);

    let before = Utc::now();
    let resp = api
        .bulk_upload("user-1", vec![with_image, plain])
        .await
        .unwrap();

    assert_eq!(resp.count, 2);
    assert_eq!(resp.message, "Successfully created 2 deal(s) with 1 image(s)");
    assert_eq!(resp.deals[0].description, None);

    // 未给 expires_at 时默认 2 天后
    let expires = resp.deals[1].expires_at;
    assert!(expires >= before + Duration::days(2));
    assert!(expires <= Utc::now() + Duration::days(2));

    let repo = DealRepositoryImpl::new(&db_path).unwrap();
    let stored = repo.list_deals_by_profile("rp-1").await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|d| d.status == DealStatus::Active));

    let images = repo.list_images_by_deal(&resp.deals[0].id).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image_url, "https://example.com/lamp.png");
    assert_eq!(images[0].display_order, 1);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = BulkUploadApi::from_db_path(&db_path).unwrap();

    let err = api.bulk_upload("user-1", Vec::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "No deals provided");
}

#[tokio::test]
async fn test_permission_checks() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = BulkUploadApi::from_db_path(&db_path).unwrap();

    // 无档案
    let err = api
        .bulk_upload("stranger", vec![record("a", 1.0)])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "You do not have a retailer profile");

    // 无 CSV 权限
    let mut no_csv = retailer("rp-2", "user-2");
    no_csv.has_csv_permission = false;
    seed_retailer(&db_path, &no_csv).unwrap();
    let err = api
        .bulk_upload("user-2", vec![record("a", 1.0)])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "You do not have CSV upload permission");

    // 管理员不需要 CSV 权限
    seed_admin(&db_path, "user-2").unwrap();
    assert!(api.bulk_upload("user-2", vec![record("a", 1.0)]).await.is_ok());

    // 档案未启用（管理员也不放行）
    let mut inactive = retailer("rp-3", "user-3");
    inactive.is_active = false;
    seed_retailer(&db_path, &inactive).unwrap();
    seed_admin(&db_path, "user-3").unwrap();
    let err = api
        .bulk_upload("user-3", vec![record("a", 1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(err.to_string(), "Your retailer profile is not active");
}

#[tokio::test]
async fn test_daily_limit() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut profile = retailer("rp-1", "user-1");
    profile.daily_deal_limit = 3;
    seed_retailer(&db_path, &profile).unwrap();

    let repo = DealRepositoryImpl::new(&db_path).unwrap();
    repo.insert_deals(&[
        existing_deal("today", "rp-1", Duration::zero()),
        existing_deal("last-week", "rp-1", Duration::days(7)),
    ])
    .await
    .unwrap();

    let api = BulkUploadApi::from_db_path(&db_path).unwrap();
    let err = api
        .bulk_upload("user-1", vec![record("a", 1.0), record("b", 2.0), record("c", 3.0)])
        .await
        .unwrap_err();

    match err {
        ApiError::DailyLimitExceeded { remaining, limit } => {
            assert_eq!(remaining, 2);
            assert_eq!(limit, 3);
        }
        other => panic!("Expected DailyLimitExceeded, got {:?}", other),
    }

    let resp = api
        .bulk_upload("user-1", vec![record("a", 1.0), record("b", 2.0)])
        .await
        .unwrap();
    assert_eq!(resp.count, 2);

    // 管理员不受上限约束
    seed_admin(&db_path, "user-1").unwrap();
    assert!(api.bulk_upload("user-1", vec![record("d", 4.0)]).await.is_ok());
}

#[tokio::test]
async fn test_validation_failure_writes_nothing() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_retailer(&db_path, &retailer("rp-1", "user-1")).unwrap();
    let api = BulkUploadApi::from_db_path(&db_path).unwrap();

    let mut bad_url = record("ok-title", 5.0);
    bad_url.external_url = "example.com".to_string();

    let err = api
        .bulk_upload(
            "user-1",
            vec![record("good", 1.0), record(" ", 0.0), bad_url],
        )
        .await
        .unwrap_err();

    match err {
        ApiError::ValidationFailed {
            errors,
            success_count,
            error_count,
        } => {
            assert_eq!(success_count, 1);
            assert_eq!(error_count, 2);
            // 每行只报第一个问题
            assert_eq!(errors[0].line, 2);
            assert_eq!(errors[0].field, DealField::Title);
            assert_eq!(errors[1].line, 3);
            assert_eq!(errors[1].field, DealField::ExternalUrl);
        }
        other => panic!("Expected ValidationFailed, got {:?}", other),
    }

    let repo = DealRepositoryImpl::new(&db_path).unwrap();
    assert!(repo.list_deals_by_profile("rp-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_deals_archived_and_expiry_configurable() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_retailer(&db_path, &retailer("rp-1", "user-1")).unwrap();

    let mut stale = existing_deal("stale", "rp-1", Duration::days(5));
    stale.expires_at = Utc::now() - Duration::days(1);
    let repo = DealRepositoryImpl::new(&db_path).unwrap();
    repo.insert_deals(&[stale]).await.unwrap();

    let config = ConfigManager::new(&db_path).unwrap();
    config
        .set_global_config_value(config_keys::DEFAULT_EXPIRY_DAYS, "7")
        .unwrap();

    let api = BulkUploadApi::from_db_path(&db_path).unwrap();
    let resp = api.bulk_upload("user-1", vec![record("new", 9.0)]).await.unwrap();
    assert!(resp.deals[0].expires_at > Utc::now() + Duration::days(6));

    let stored = repo.list_deals_by_profile("rp-1").await.unwrap();
    let stale = stored.iter().find(|d| d.id == "stale").unwrap();
    assert_eq!(stale.status, DealStatus::Archived);
}

#[tokio::test]
async fn test_out_of_range_expiry_days_is_an_error() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_retailer(&db_path, &retailer("rp-1", "user-1")).unwrap();

    let config = ConfigManager::new(&db_path).unwrap();
    config
        .set_global_config_value(config_keys::DEFAULT_EXPIRY_DAYS, "100000000")
        .unwrap();

    let api = BulkUploadApi::from_db_path(&db_path).unwrap();
    let err = api
        .bulk_upload("user-1", vec![record("late", 9.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InternalError(_)));

    let repo = DealRepositoryImpl::new(&db_path).unwrap();
    assert!(repo.list_deals_by_profile("rp-1").await.unwrap().is_empty());
}

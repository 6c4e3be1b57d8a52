// ==========================================
// 优惠批量导入 - 命令行入口
// ==========================================
// 用法:
//   deal-bulk-import template [out.csv]
//   deal-bulk-import preview <file.csv> [errors_out.csv]
//   deal-bulk-import grant <db_path> <user_id> <business_name> [daily_limit]
//   deal-bulk-import import <db_path> <user_id> <file.csv>
//   deal-bulk-import upload <file.csv>
//
// db_path 传 "-" 时使用默认数据库路径
// upload 读取 DEALS_API_URL / DEALS_API_TOKEN（支持 .env）
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use deal_bulk_import::api::{open_store, BulkUploadApi};
use deal_bulk_import::config::{ConfigManager, DefaultImportConfig, ImportConfigReader};
use deal_bulk_import::db::get_default_db_path;
use deal_bulk_import::domain::{ImportOutcome, RetailerProfile};
use deal_bulk_import::gateway::{
    DealSubmitter, HttpDealSubmitter, LocalStoreSubmitter, SubmissionGateway,
};
use deal_bulk_import::i18n::{t, t_with_args};
use deal_bulk_import::importer::{
    render_error_report, write_error_csv, write_template, DealImporter, DealImporterImpl,
    TEMPLATE_FILE_NAME,
};
use deal_bulk_import::repository::DealRepositoryImpl;
use deal_bulk_import::{logging, APP_NAME, VERSION};
use tracing::info;
use uuid::Uuid;

/// 界面语言环境变量
const LOCALE_ENV: &str = "DEAL_IMPORT_LOCALE";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    if let Ok(locale) = std::env::var(LOCALE_ENV) {
        deal_bulk_import::i18n::set_locale(locale.trim());
    }

    info!("{} v{}", APP_NAME, VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["template"] => cmd_template(TEMPLATE_FILE_NAME),
        ["template", out] => cmd_template(out),
        ["preview", csv] => cmd_preview(csv, None).await,
        ["preview", csv, errors_out] => cmd_preview(csv, Some(errors_out)).await,
        ["grant", db_path, user_id, business_name] => {
            cmd_grant(db_path, user_id, business_name, 0)
        }
        ["grant", db_path, user_id, business_name, limit] => {
            let limit: i64 = limit
                .parse()
                .with_context(|| format!("invalid daily_limit: {}", limit))?;
            cmd_grant(db_path, user_id, business_name, limit)
        }
        ["import", db_path, user_id, csv] => cmd_import(db_path, user_id, csv).await,
        ["upload", csv] => cmd_upload(csv).await,
        _ => {
            eprintln!("{}", t("cli.usage"));
            std::process::exit(2);
        }
    }
}

fn resolve_db_path(db_path: &str) -> String {
    if db_path == "-" {
        get_default_db_path()
    } else {
        db_path.to_string()
    }
}

fn cmd_template(out: &str) -> Result<()> {
    write_template(out)?;
    println!("{}", t_with_args("cli.template_written", &[("path", out)]));
    Ok(())
}

/// 解析并打印汇总；有行级错误时列出错误清单
async fn parse_and_report<C>(importer: &DealImporterImpl<C>, csv: &str) -> Result<ImportOutcome>
where
    C: ImportConfigReader + Send + Sync,
{
    let outcome = importer.import_from_csv(csv).await?;

    println!("{}", outcome.summary.message);
    if outcome.batch.has_errors() {
        println!("{}", render_error_report(&outcome.batch.errors));
    }
    Ok(outcome)
}

async fn cmd_preview(csv: &str, errors_out: Option<&str>) -> Result<()> {
    let importer = DealImporterImpl::from_config(DefaultImportConfig::default()).await?;
    let outcome = parse_and_report(&importer, csv).await?;

    for record in &outcome.summary.preview {
        println!("{}", serde_json::to_string(record)?);
    }
    if outcome.summary.preview_truncated {
        let more = outcome.summary.valid_count - outcome.summary.preview.len();
        println!(
            "{}",
            t_with_args("summary.preview_truncated", &[("more", &more.to_string())])
        );
    }

    if let Some(path) = errors_out {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create {}", path))?;
        write_error_csv(&outcome.batch.errors, file)?;
    }
    Ok(())
}

fn cmd_grant(db_path: &str, user_id: &str, business_name: &str, daily_limit: i64) -> Result<()> {
    let db_path = resolve_db_path(db_path);
    let repo = DealRepositoryImpl::from_connection(open_store(&db_path)?);
    repo.upsert_profile(&RetailerProfile {
        id: Uuid::new_v4().to_string(),
        owner_user_id: user_id.to_string(),
        business_name: business_name.to_string(),
        has_csv_permission: true,
        is_active: true,
        daily_deal_limit: daily_limit,
        created_at: Utc::now(),
    })?;

    println!("{}", t("common.success"));
    Ok(())
}

async fn cmd_import(db_path: &str, user_id: &str, csv: &str) -> Result<()> {
    let db_path = resolve_db_path(db_path);
    info!(%db_path, "使用数据库");

    // 先建表，再读配置；配置、仓储、API 共享同一连接
    let conn = open_store(&db_path)?;
    let config = ConfigManager::from_connection(conn.clone()).map_err(|e| anyhow!("{}", e))?;
    let importer = DealImporterImpl::from_config(config).await?;
    let outcome = parse_and_report(&importer, csv).await?;

    let api = BulkUploadApi::from_connection(conn)?;
    submit(LocalStoreSubmitter::new(api, user_id), outcome).await
}

async fn cmd_upload(csv: &str) -> Result<()> {
    let submitter = HttpDealSubmitter::from_env()
        .ok_or_else(|| anyhow!("DEALS_API_URL is not set"))?;

    let importer = DealImporterImpl::from_config(DefaultImportConfig::default()).await?;
    let outcome = parse_and_report(&importer, csv).await?;

    submit(submitter, outcome).await
}

async fn submit<S: DealSubmitter>(submitter: S, outcome: ImportOutcome) -> Result<()> {
    let gateway = SubmissionGateway::new(submitter);
    match gateway.submit(outcome.batch.records).await {
        Ok(result) => {
            let message = if result.message.is_empty() {
                t_with_args("gateway.uploaded", &[("count", &result.count.to_string())])
            } else {
                result.message
            };
            println!("{}", message);
            Ok(())
        }
        Err(e) => bail!("{}", e),
    }
}

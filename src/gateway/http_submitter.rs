// ==========================================
// 优惠批量导入 - 远端 HTTP 提交方
// ==========================================
// 职责: 整批 POST 到 {base_url}/deals/bulk-upload（Bearer 鉴权）
// 失败: 非 2xx 响应中的 error 原样回传；网络/解析失败视为传输错误
// ==========================================

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::domain::deal::{BulkCreateOutcome, ParsedRecord};
use crate::gateway::error::SubmitterError;
use crate::gateway::submission_gateway::DealSubmitter;

/// API 基础地址环境变量
pub const API_URL_ENV: &str = "DEALS_API_URL";

/// Bearer 令牌环境变量
pub const API_TOKEN_ENV: &str = "DEALS_API_TOKEN";

const BULK_UPLOAD_PATH: &str = "/deals/bulk-upload";

#[derive(Serialize)]
struct BulkUploadRequest<'a> {
    deals: &'a [ParsedRecord],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

// ==========================================
// HttpDealSubmitter
// ==========================================
pub struct HttpDealSubmitter {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpDealSubmitter {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// 从 DEALS_API_URL / DEALS_API_TOKEN 构造
    ///
    /// # 返回
    /// - None: 未配置基础地址
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(API_URL_ENV).ok()?;
        let token = std::env::var(API_TOKEN_ENV).ok();
        if token.is_none() {
            warn!(env = API_TOKEN_ENV, "未配置令牌，提交将被拒绝");
        }
        Some(Self::new(base_url, token))
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, BULK_UPLOAD_PATH)
    }
}

#[async_trait]
impl DealSubmitter for HttpDealSubmitter {
    async fn bulk_create(
        &self,
        deals: &[ParsedRecord],
    ) -> Result<BulkCreateOutcome, SubmitterError> {
        let Some(token) = self.token.as_deref() else {
            return Err(SubmitterError::Rejected(
                "Authentication required".to_string(),
            ));
        };

        let endpoint = self.endpoint();
        debug!(%endpoint, count = deals.len(), "提交批量创建请求");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(token)
            .json(&BulkUploadRequest { deals })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "批量创建请求失败");
                SubmitterError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<BulkCreateOutcome>().await.map_err(|e| {
                error!(error = %e, "批量创建响应无法解析");
                SubmitterError::Transport(e.to_string())
            });
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| "Failed to bulk upload deals".to_string());
        warn!(%status, %message, "批量创建被拒绝");
        Err(SubmitterError::Rejected(message))
    }
}

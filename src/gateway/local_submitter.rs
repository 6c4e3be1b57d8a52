// ==========================================
// 优惠批量导入 - 本地存储提交方
// ==========================================
// 职责: 进程内调用 BulkUploadApi，按远端接口语义返回结果
// ==========================================

use crate::api::{ApiError, BulkUploadApi};
use crate::domain::deal::{BulkCreateOutcome, ParsedRecord};
use crate::gateway::error::SubmitterError;
use crate::gateway::submission_gateway::DealSubmitter;
use async_trait::async_trait;
use tracing::warn;

pub struct LocalStoreSubmitter {
    api: BulkUploadApi,
    user_id: String,
}

impl LocalStoreSubmitter {
    /// # 参数
    /// - api: 批量创建接口
    /// - user_id: 以该用户身份提交
    pub fn new(api: BulkUploadApi, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
        }
    }

    pub fn api(&self) -> &BulkUploadApi {
        &self.api
    }
}

#[async_trait]
impl DealSubmitter for LocalStoreSubmitter {
    async fn bulk_create(
        &self,
        deals: &[ParsedRecord],
    ) -> Result<BulkCreateOutcome, SubmitterError> {
        match self.api.bulk_upload(&self.user_id, deals.to_vec()).await {
            Ok(resp) => Ok(BulkCreateOutcome {
                count: resp.count,
                message: resp.message,
            }),
            // 复核失败时把逐行问题带回调用方
            Err(ApiError::ValidationFailed {
                errors,
                success_count,
                error_count,
            }) => {
                warn!(success_count, error_count, "存储端复核拒绝整批");
                let details: Vec<String> = errors
                    .iter()
                    .map(|e| format!("Row {}: {} - {}", e.line, e.field, e.message))
                    .collect();
                Err(SubmitterError::Rejected(format!(
                    "Validation failed: {}",
                    details.join("; ")
                )))
            }
            // 业务拒绝原样回传；存储故障视为传输失败
            Err(
                e @ (ApiError::InvalidInput(_)
                | ApiError::Forbidden(_)
                | ApiError::DailyLimitExceeded { .. }),
            ) => Err(SubmitterError::Rejected(e.to_string())),
            Err(e) => Err(SubmitterError::Transport(e.to_string())),
        }
    }
}

// ==========================================
// 优惠批量导入 - 提交网关
// ==========================================
// 职责: 把确认后的有效记录整批交给存储端
// 约束: 空批次不发请求；不分片、不重试；记录只提交一次
// ==========================================

use crate::domain::deal::{BulkCreateOutcome, ParsedRecord};
use crate::gateway::error::{SubmissionError, SubmitterError};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

// ==========================================
// DealSubmitter Trait
// ==========================================
// 用途: 批量创建（create-many）协作方
// 实现者: HttpDealSubmitter（远端接口）、LocalStoreSubmitter（本地 SQLite）
#[async_trait]
pub trait DealSubmitter: Send + Sync {
    /// 批量创建
    ///
    /// # 返回
    /// - Ok(BulkCreateOutcome): 全部创建
    /// - Err(Rejected): 远端拒绝（整批）
    /// - Err(Transport): 网络/协议失败
    async fn bulk_create(
        &self,
        deals: &[ParsedRecord],
    ) -> Result<BulkCreateOutcome, SubmitterError>;
}

// ==========================================
// SubmissionGateway
// ==========================================
pub struct SubmissionGateway<S>
where
    S: DealSubmitter,
{
    submitter: S,
}

impl<S> SubmissionGateway<S>
where
    S: DealSubmitter,
{
    pub fn new(submitter: S) -> Self {
        Self { submitter }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// 提交批次（消费记录）
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn submit(
        &self,
        records: Vec<ParsedRecord>,
    ) -> Result<BulkCreateOutcome, SubmissionError> {
        if records.is_empty() {
            warn!("没有可提交的有效记录");
            return Err(SubmissionError::NothingToSubmit);
        }

        match self.submitter.bulk_create(&records).await {
            Ok(outcome) => {
                info!(created = outcome.count, "批量提交成功");
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "批量提交失败");
                Err(e.into())
            }
        }
    }
}

// ==========================================
// 优惠批量导入 - 提交网关
// ==========================================
// 职责: 确认后的有效记录 → 存储端（远端 HTTP / 本地 SQLite）
// ==========================================

pub mod error;
pub mod http_submitter;
pub mod local_submitter;
pub mod submission_gateway;

pub use error::{SubmissionError, SubmitterError};
pub use http_submitter::HttpDealSubmitter;
pub use local_submitter::LocalStoreSubmitter;
pub use submission_gateway::{DealSubmitter, SubmissionGateway};

// ==========================================
// 优惠批量导入 - API 层
// ==========================================
// 职责: 批量创建业务接口（本地落库），供提交网关调用
// ==========================================

pub mod bulk_upload_api;
pub mod error;

// 重导出核心类型
pub use bulk_upload_api::{open_store, BulkUploadApi, BulkUploadResponse};
pub use error::{ApiError, ApiResult};

// ==========================================
// 优惠批量导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod deal;
pub mod retailer;
pub mod types;

// 重导出核心类型
pub use deal::{
    BulkCreateOutcome, Deal, DealImage, ImportBatch, ImportOutcome, ImportSummary, ParsedRecord,
    ValidationError,
};
pub use retailer::RetailerProfile;
pub use types::{DealField, DealStatus, OriginalPricePolicy};

// ==========================================
// 优惠批量导入 - 导入层
// ==========================================
// 职责: CSV 文本 → 有效记录 + 行级错误 + 汇总
// 流程: 分词 → 表头解析 → 行校验 → 批次汇总
// ==========================================

// 模块声明
pub mod batch_reporter;
pub mod deal_importer_impl;
pub mod deal_importer_trait;
pub mod error;
pub mod header_resolver;
pub mod line_tokenizer;
pub mod row_validator;
pub mod template;

// 重导出核心类型
pub use batch_reporter::{render_error_report, write_error_csv, DealBatchReporter as BatchReporterImpl};
pub use deal_importer_impl::DealImporterImpl;
pub use error::{ImportError, ImportResult};
pub use header_resolver::{DealHeaderResolver as HeaderResolverImpl, ResolvedHeader};
pub use line_tokenizer::{tokenize_line, QuoteAwareTokenizer};
pub use row_validator::DealRowValidator as RowValidatorImpl;
pub use template::{template_csv, write_template, TEMPLATE_FILE_NAME};

// 重导出 Trait 接口
pub use deal_importer_trait::{
    BatchReporter, DealImporter, HeaderResolver, LineTokenizer, RowValidator,
};

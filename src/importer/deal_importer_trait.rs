// ==========================================
// 优惠批量导入 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 流程: 分词 → 表头解析（一次）→ 行校验（逐行）→ 批次汇总
// ==========================================

use crate::domain::deal::{ImportBatch, ImportOutcome, ImportSummary, ParsedRecord, ValidationError};
use crate::importer::error::ImportResult;
use crate::importer::header_resolver::ResolvedHeader;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// DealImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: DealImporterImpl
#[async_trait]
pub trait DealImporter: Send + Sync {
    /// 从 CSV 文件导入
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 有效记录 + 行级错误 + 汇总
    /// - Err: 结构性错误（非 CSV、文件过大、行数不足、缺必填列）
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportOutcome>;

    /// 从内存文本导入（文件已整体读入）
    async fn import_from_text(&self, text: &str) -> ImportResult<ImportOutcome>;
}

// ==========================================
// LineTokenizer Trait
// ==========================================
// 用途: 单行切分
// 实现者: QuoteAwareTokenizer
pub trait LineTokenizer: Send + Sync {
    /// 切分一行为字段列表（不报错）
    fn tokenize(&self, line: &str) -> Vec<String>;
}

// ==========================================
// HeaderResolver Trait
// ==========================================
// 用途: 表头解析
// 实现者: DealHeaderResolver
pub trait HeaderResolver: Send + Sync {
    /// 解析表头
    ///
    /// # 返回
    /// - Ok(ResolvedHeader): 归一化列名 + 列位置映射
    /// - Err(MissingColumns): 缺少必填列（整个导入终止）
    fn resolve(&self, header_values: &[String]) -> ImportResult<ResolvedHeader>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 单行校验
// 实现者: DealRowValidator
pub trait RowValidator: Send + Sync {
    /// 校验一行
    ///
    /// # 参数
    /// - header: 已解析表头
    /// - values: 分词结果
    /// - line: 原始文件行号（表头 = 1）
    ///
    /// # 返回
    /// - Ok(ParsedRecord): 无错误
    /// - Err(Vec<ValidationError>): 该行全部错误（至少一条）
    fn validate_row(
        &self,
        header: &ResolvedHeader,
        values: &[String],
        line: usize,
    ) -> Result<ParsedRecord, Vec<ValidationError>>;
}

// ==========================================
// BatchReporter Trait
// ==========================================
// 用途: 批次汇总
// 实现者: DealBatchReporter
pub trait BatchReporter: Send + Sync {
    /// 生成汇总
    ///
    /// # 参数
    /// - batch: 解析结果
    /// - total_lines: 非空数据行数
    fn summarize(&self, batch: &ImportBatch, total_lines: usize) -> ImportSummary;
}

// ==========================================
// 优惠批量导入 - 导入器实现
// ==========================================
// 职责: 整合导入管道，从文件文本到 ImportOutcome
// 流程: 读取 → 分词 → 表头解析（一次）→ 行校验（逐行）→ 汇总
// 说明: 文件整体读入内存后再解析；不做流式处理，按大小上限拦截
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::deal::{ImportBatch, ImportOutcome};
use crate::importer::batch_reporter::DealBatchReporter;
use crate::importer::deal_importer_trait::{
    BatchReporter, DealImporter, HeaderResolver, LineTokenizer, RowValidator,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_resolver::DealHeaderResolver;
use crate::importer::line_tokenizer::QuoteAwareTokenizer;
use crate::importer::row_validator::DealRowValidator;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

const UTF8_BOM: char = '\u{feff}';

// ==========================================
// DealImporterImpl - 优惠导入器实现
// ==========================================
pub struct DealImporterImpl<C>
where
    C: ImportConfigReader,
{
    // 配置读取器
    config: C,

    // 导入组件
    tokenizer: Box<dyn LineTokenizer>,
    header_resolver: Box<dyn HeaderResolver>,
    row_validator: Box<dyn RowValidator>,
    batch_reporter: Box<dyn BatchReporter>,
}

impl<C> DealImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 创建新的 DealImporter 实例
    ///
    /// # 参数
    /// - config: 配置读取器（读取文件大小上限）
    /// - tokenizer: 行分词器
    /// - header_resolver: 表头解析器
    /// - row_validator: 行校验器
    /// - batch_reporter: 批次汇总器
    pub fn new(
        config: C,
        tokenizer: Box<dyn LineTokenizer>,
        header_resolver: Box<dyn HeaderResolver>,
        row_validator: Box<dyn RowValidator>,
        batch_reporter: Box<dyn BatchReporter>,
    ) -> Self {
        Self {
            config,
            tokenizer,
            header_resolver,
            row_validator,
            batch_reporter,
        }
    }

    /// 按配置装配默认组件
    pub async fn from_config(config: C) -> ImportResult<Self> {
        let delimiter = config
            .get_delimiter()
            .await
            .map_err(|e| config_error("csv_delimiter", e))?;
        let policy = config
            .get_original_price_policy()
            .await
            .map_err(|e| config_error("original_price_policy", e))?;
        let preview_limit = config
            .get_preview_limit()
            .await
            .map_err(|e| config_error("preview_limit", e))?;

        debug!(%delimiter, %policy, preview_limit, "导入器配置已加载");

        Ok(Self::new(
            config,
            Box::new(QuoteAwareTokenizer::new(delimiter)),
            Box::new(DealHeaderResolver),
            Box::new(DealRowValidator::new(policy)),
            Box::new(DealBatchReporter::new(preview_limit)),
        ))
    }

    async fn max_input_bytes(&self) -> ImportResult<usize> {
        self.config
            .get_max_input_bytes()
            .await
            .map_err(|e| config_error("max_input_bytes", e))
    }

    /// 解析已读入内存的完整文本（同步核心，结果只依赖输入）
    pub fn parse_content(&self, text: &str) -> ImportResult<ImportOutcome> {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        // 行号按原始文本计数（表头 = 1），空白行跳过但占行号
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        if lines.len() < 2 {
            warn!(non_blank_lines = lines.len(), "CSV 行数不足");
            return Err(ImportError::NotEnoughRows);
        }

        // === 步骤 1: 表头解析 ===
        let (_, header_line) = lines[0];
        let header = self
            .header_resolver
            .resolve(&self.tokenizer.tokenize(header_line))?;

        // === 步骤 2: 逐行校验 ===
        let mut batch = ImportBatch::default();
        for &(line_no, line) in &lines[1..] {
            let values = self.tokenizer.tokenize(line);
            match self.row_validator.validate_row(&header, &values, line_no) {
                Ok(record) => batch.records.push(record),
                Err(errors) => {
                    debug!(line = line_no, errors = errors.len(), "行校验失败");
                    batch.errors.extend(errors);
                }
            }
        }

        // === 步骤 3: 汇总 ===
        let total_lines = lines.len() - 1;
        let summary = self.batch_reporter.summarize(&batch, total_lines);

        info!(
            total = total_lines,
            valid = summary.valid_count,
            error_rows = summary.error_line_count,
            errors = summary.error_count,
            "CSV 解析完成"
        );

        Ok(ImportOutcome { batch, summary })
    }
}

#[async_trait::async_trait]
impl<C> DealImporter for DealImporterImpl<C>
where
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path))]
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportOutcome> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "开始解析优惠 CSV");

        // 检查扩展名
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ImportError::UnsupportedFormat(path.display().to_string()));
        }

        // 检查文件存在与大小
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| ImportError::FileNotFound(path.display().to_string()))?;
        let limit = self.max_input_bytes().await?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > limit {
            return Err(ImportError::InputTooLarge { size, limit });
        }

        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ImportError::FileReadError(format!("file is not valid UTF-8: {}", e)))?;

        self.parse_content(&text)
    }

    #[instrument(skip(self, text), fields(bytes = text.len()))]
    async fn import_from_text(&self, text: &str) -> ImportResult<ImportOutcome> {
        let limit = self.max_input_bytes().await?;
        if text.len() > limit {
            return Err(ImportError::InputTooLarge {
                size: text.len(),
                limit,
            });
        }

        self.parse_content(text)
    }
}

fn config_error(key: &str, err: Box<dyn std::error::Error + Send + Sync>) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultImportConfig;
    use crate::domain::types::DealField;

    async fn importer() -> DealImporterImpl<DefaultImportConfig> {
        DealImporterImpl::from_config(DefaultImportConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let text = "title,price,external_url\n\
                    \"Smart Key, Universal\",49.99,https://example.com/a\n\
                    Bad Row,-5,https://example.com/b\n";

        let outcome = importer().await.import_from_text(text).await.unwrap();

        assert_eq!(outcome.batch.records.len(), 1);
        let record = &outcome.batch.records[0];
        assert_eq!(record.title, "Smart Key, Universal");
        assert_eq!(record.price, 49.99);
        assert_eq!(record.external_url, "https://example.com/a");

        assert_eq!(outcome.batch.errors.len(), 1);
        assert_eq!(outcome.batch.errors[0].line, 3);
        assert_eq!(outcome.batch.errors[0].field, DealField::Price);
        assert!(!outcome.batch.errors[0].message.is_empty());
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_but_numbered() {
        let text = "title,price,external_url\r\n\r\nA,1,https://e.com\r\n   \r\nB,x,https://e.com\r\n";

        let outcome = importer().await.import_from_text(text).await.unwrap();

        assert_eq!(outcome.batch.records.len(), 1);
        assert_eq!(outcome.batch.records[0].source_line, 3);
        assert_eq!(outcome.batch.errors[0].line, 5);
        assert_eq!(outcome.summary.total_lines, 2);
    }

    #[tokio::test]
    async fn test_bom_is_ignored() {
        let text = "\u{feff}title,price,external_url\nA,1,https://e.com\n";

        let outcome = importer().await.import_from_text(text).await.unwrap();
        assert_eq!(outcome.batch.records.len(), 1);
    }

    #[tokio::test]
    async fn test_header_only_is_structural_error() {
        let err = importer()
            .await
            .import_from_text("title,price,external_url\n\n")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::NotEnoughRows));

        let err = importer().await.import_from_text("").await.unwrap_err();
        assert!(matches!(err, ImportError::NotEnoughRows));
    }

    #[tokio::test]
    async fn test_input_too_large() {
        let config = DefaultImportConfig {
            max_input_bytes: 16,
            ..DefaultImportConfig::default()
        };
        let importer = DealImporterImpl::from_config(config).await.unwrap();

        let err = importer
            .import_from_text("title,price,external_url\nA,1,https://e.com\n")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::InputTooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn test_rejects_non_csv_extension() {
        let err = importer()
            .await
            .import_from_csv("deals.xlsx")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = importer()
            .await
            .import_from_csv("/definitely/not/here/deals.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }
}

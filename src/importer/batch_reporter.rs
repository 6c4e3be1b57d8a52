// ==========================================
// 优惠批量导入 - 批次汇总器实现
// ==========================================
// 职责: 有效记录/错误列表 → 汇总统计 + 预览（纯计算，无副作用）
// 附带: 错误清单文本渲染、错误清单 CSV 导出
// ==========================================

use crate::domain::deal::{ImportBatch, ImportSummary, ValidationError};
use crate::i18n::t_with_args;
use crate::importer::deal_importer_trait::BatchReporter;
use crate::importer::error::ImportResult;
use csv::WriterBuilder;
use std::io::Write;

/// 默认预览条数
pub const DEFAULT_PREVIEW_LIMIT: usize = 50;

pub struct DealBatchReporter {
    preview_limit: usize,
}

impl DealBatchReporter {
    pub fn new(preview_limit: usize) -> Self {
        Self { preview_limit }
    }
}

impl Default for DealBatchReporter {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_LIMIT)
    }
}

impl BatchReporter for DealBatchReporter {
    fn summarize(&self, batch: &ImportBatch, total_lines: usize) -> ImportSummary {
        let valid_count = batch.records.len();
        let error_line_count = batch.error_lines().len();

        let valid = valid_count.to_string();
        let message = if error_line_count > 0 {
            t_with_args(
                "summary.parsed_with_errors",
                &[("valid", &valid), ("error_rows", &error_line_count.to_string())],
            )
        } else {
            t_with_args("summary.parsed_ok", &[("valid", &valid)])
        };

        ImportSummary {
            total_lines,
            valid_count,
            error_line_count,
            error_count: batch.errors.len(),
            preview: batch.records.iter().take(self.preview_limit).cloned().collect(),
            preview_truncated: valid_count > self.preview_limit,
            message,
        }
    }
}

/// 渲染错误清单（每行一条: "Row L: field - message"）
pub fn render_error_report(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| {
            t_with_args(
                "summary.error_line",
                &[
                    ("line", &e.line.to_string()),
                    ("field", e.field.as_str()),
                    ("message", &e.message),
                ],
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 导出错误清单为 CSV（line,field,message）
pub fn write_error_csv<W: Write>(errors: &[ValidationError], writer: W) -> ImportResult<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    wtr.write_record(["line", "field", "message"])?;
    for e in errors {
        wtr.write_record([e.line.to_string().as_str(), e.field.as_str(), e.message.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deal::ParsedRecord;
    use crate::domain::types::DealField;

    fn records(n: usize) -> Vec<ParsedRecord> {
        (0..n)
            .map(|i| ParsedRecord::new(format!("Deal {}", i), 10.0, "https://example.com"))
            .collect()
    }

    fn error(line: usize, field: DealField) -> ValidationError {
        ValidationError {
            line,
            field,
            message: "bad".to_string(),
        }
    }

    #[test]
    fn test_summary_counts_distinct_error_lines() {
        let batch = ImportBatch {
            records: records(2),
            errors: vec![
                error(3, DealField::Title),
                error(3, DealField::ExternalUrl),
                error(5, DealField::Price),
            ],
        };

        let summary = DealBatchReporter::default().summarize(&batch, 4);

        assert_eq!(summary.total_lines, 4);
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.error_line_count, 2);
        assert_eq!(summary.error_count, 3);
        assert!(!summary.preview_truncated);
        assert!(!summary.message.is_empty());
    }

    #[test]
    fn test_preview_capped() {
        let batch = ImportBatch {
            records: records(60),
            errors: vec![],
        };

        let summary = DealBatchReporter::default().summarize(&batch, 60);

        assert_eq!(summary.preview.len(), DEFAULT_PREVIEW_LIMIT);
        assert_eq!(summary.preview[0].title, "Deal 0");
        assert!(summary.preview_truncated);
    }

    #[test]
    fn test_render_error_report_one_line_per_error() {
        let report = render_error_report(&[error(3, DealField::Price), error(4, DealField::Title)]);

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains('3') && lines[0].contains("price"));
        assert!(lines[1].contains('4') && lines[1].contains("title"));
    }

    #[test]
    fn test_write_error_csv() {
        let mut buf = Vec::new();
        write_error_csv(
            &[ValidationError {
                line: 3,
                field: DealField::Price,
                message: "Valid price is required, got \"-5\"".to_string(),
            }],
            &mut buf,
        )
        .unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("line,field,message"));
        assert_eq!(
            lines.next(),
            Some("3,price,\"Valid price is required, got \"\"-5\"\"\"")
        );
    }
}

// ==========================================
// 优惠批量导入 - 表头解析器实现
// ==========================================
// 职责: 表头列名归一化 + 列位置 → 标准字段映射 + 必填列检查
// 必填: title / (price 或 sale_price) / external_url
// ==========================================

use crate::domain::types::DealField;
use crate::importer::deal_importer_trait::HeaderResolver;
use crate::importer::error::{ImportError, ImportResult};
use tracing::{debug, warn};

/// 价格列缺失时的提示名（两列任一即可）
const PRICE_GROUP_LABEL: &str = "price or sale_price";

// ==========================================
// ResolvedHeader - 表头解析结果
// ==========================================
// columns[i] 对应第 i 列的标准字段（None = 未识别列，忽略）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    pub names: Vec<String>,
    pub columns: Vec<Option<DealField>>,
}

impl ResolvedHeader {
    /// 是否包含某标准字段
    pub fn contains(&self, field: DealField) -> bool {
        self.columns.iter().any(|c| *c == Some(field))
    }

    /// 未识别的列名
    pub fn ignored_columns(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.columns)
            .filter(|(_, field)| field.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// 列名归一化: TRIM → 去首尾引号 → 小写
pub fn normalize_column_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_ascii_lowercase()
}

pub struct DealHeaderResolver;

impl HeaderResolver for DealHeaderResolver {
    fn resolve(&self, header_values: &[String]) -> ImportResult<ResolvedHeader> {
        let names: Vec<String> = header_values
            .iter()
            .map(|h| normalize_column_name(h))
            .collect();
        let columns: Vec<Option<DealField>> =
            names.iter().map(|n| DealField::from_column(n)).collect();

        let header = ResolvedHeader { names, columns };
        debug!(columns = ?header.names, "CSV header detected");

        let mut missing = Vec::new();
        if !header.contains(DealField::Title) {
            missing.push(DealField::Title.as_str().to_string());
        }
        if !header.contains(DealField::Price) && !header.contains(DealField::SalePrice) {
            missing.push(PRICE_GROUP_LABEL.to_string());
        }
        if !header.contains(DealField::ExternalUrl) {
            missing.push(DealField::ExternalUrl.as_str().to_string());
        }

        if !missing.is_empty() {
            warn!(missing = ?missing, found = ?header.names, "Missing required columns");
            return Err(ImportError::MissingColumns {
                missing,
                found: header.names,
            });
        }

        let ignored = header.ignored_columns();
        if !ignored.is_empty() {
            warn!(ignored = ?ignored, "Ignoring unrecognized columns");
        }

        Ok(header)
    }
}

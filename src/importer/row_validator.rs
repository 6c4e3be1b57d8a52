// ==========================================
// 优惠批量导入 - 行校验器实现
// ==========================================
// 职责: 列值按位置落到标准字段 → 同义列合并 → 逐字段校验
// 规则:
// - title 非空
// - price 为有限正数
// - external_url 以 http:// 或 https:// 开头
// - original_price 按策略校验（见 OriginalPricePolicy）
// - expires_at 有值时必须可解析
// 同一行的错误全部累积，不只取第一个
// ==========================================

use crate::domain::deal::{ParsedRecord, ValidationError};
use crate::domain::types::{DealField, OriginalPricePolicy};
use crate::i18n::{t, t_with_args};
use crate::importer::deal_importer_trait::RowValidator;
use crate::importer::header_resolver::ResolvedHeader;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

// ==========================================
// 通用字段规则（导入端与存储端共用）
// ==========================================

/// 解析价格: 有限且 > 0
pub fn parse_price(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

/// 解析任意有限小数（原价先按数值比较，再判断大小关系）
fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 外链必须是 http(s) 绝对地址
pub fn is_valid_external_url(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    (lower.starts_with("http://") && lower.len() > "http://".len())
        || (lower.starts_with("https://") && lower.len() > "https://".len())
}

/// 解析过期时间
///
/// # 支持格式
/// - RFC 3339（如 2026-01-31T12:00:00Z）
/// - YYYY-MM-DD HH:MM:SS（按 UTC）
/// - YYYY-MM-DD（当日 00:00 UTC）
pub fn parse_expires_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// 单元格清洗: TRIM + 去残留首尾引号；空串视为缺失
fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ==========================================
// CandidateRow - 按标准字段收拢的一行原始值
// ==========================================
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub sale_price: Option<String>,
    pub original_price: Option<String>,
    pub external_url: Option<String>,
    pub deal_type_id: Option<String>,
    pub expires_at: Option<String>,
    pub image_url: Option<String>,
}

impl CandidateRow {
    /// 按表头位置装配（同字段重复出现时，后出现的非空值覆盖）
    pub fn from_values(header: &ResolvedHeader, values: &[String]) -> Self {
        let mut row = CandidateRow::default();
        for (idx, field) in header.columns.iter().enumerate() {
            let Some(field) = field else { continue };
            if let Some(value) = values.get(idx).and_then(|v| clean_cell(v)) {
                row.set(*field, value);
            }
        }
        row
    }

    fn set(&mut self, field: DealField, value: String) {
        let slot = match field {
            DealField::Title => &mut self.title,
            DealField::Description => &mut self.description,
            DealField::Price => &mut self.price,
            DealField::SalePrice => &mut self.sale_price,
            DealField::OriginalPrice => &mut self.original_price,
            DealField::ExternalUrl => &mut self.external_url,
            DealField::DealTypeId => &mut self.deal_type_id,
            DealField::ExpiresAt => &mut self.expires_at,
            DealField::ImageUrl => &mut self.image_url,
        };
        *slot = Some(value);
    }
}

// ==========================================
// DealRowValidator
// ==========================================
pub struct DealRowValidator {
    original_price_policy: OriginalPricePolicy,
}

impl DealRowValidator {
    pub fn new(original_price_policy: OriginalPricePolicy) -> Self {
        Self {
            original_price_policy,
        }
    }

    /// 校验已装配的候选行
    pub fn validate_candidate(
        &self,
        mut row: CandidateRow,
        line: usize,
    ) -> Result<ParsedRecord, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let error = |field: DealField, message: String| ValidationError {
            line,
            field,
            message,
        };

        // sale_price → price
        if row.price.is_none() {
            row.price = row.sale_price.take();
        }

        if row.title.is_none() {
            errors.push(error(DealField::Title, t("validation.title_required")));
        }

        let price = row.price.as_deref().and_then(parse_price);
        if price.is_none() {
            errors.push(error(DealField::Price, t("validation.price_invalid")));
        }

        let external_url = row.external_url.filter(|u| is_valid_external_url(u));
        if external_url.is_none() {
            errors.push(error(DealField::ExternalUrl, t("validation.url_invalid")));
        }

        let original_price = match row.original_price.as_deref() {
            None => None,
            Some(raw) => match (parse_decimal(raw), self.original_price_policy) {
                (Some(original), _) => {
                    if let Some(price) = price {
                        if original <= price {
                            errors.push(error(
                                DealField::OriginalPrice,
                                t_with_args(
                                    "validation.original_price_not_greater",
                                    &[
                                        ("original", &original.to_string()),
                                        ("price", &price.to_string()),
                                    ],
                                ),
                            ));
                        }
                    }
                    Some(original)
                }
                (None, OriginalPricePolicy::Lenient) => {
                    debug!(line, value = %raw, "Dropping non-numeric original_price");
                    None
                }
                (None, OriginalPricePolicy::Strict) => {
                    errors.push(error(
                        DealField::OriginalPrice,
                        t("validation.original_price_invalid"),
                    ));
                    None
                }
            },
        };

        let expires_at = match row.expires_at.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = parse_expires_at(raw);
                if parsed.is_none() {
                    errors.push(error(
                        DealField::ExpiresAt,
                        t_with_args("validation.expires_at_invalid", &[("value", raw)]),
                    ));
                }
                parsed
            }
        };

        match (row.title, price, external_url) {
            (Some(title), Some(price), Some(external_url)) if errors.is_empty() => {
                Ok(ParsedRecord {
                    title,
                    description: row.description,
                    price,
                    original_price,
                    external_url,
                    deal_type_id: row.deal_type_id,
                    expires_at,
                    image_url: row.image_url,
                    source_line: line,
                })
            }
            _ => Err(errors),
        }
    }
}

impl Default for DealRowValidator {
    fn default() -> Self {
        Self::new(OriginalPricePolicy::default())
    }
}

impl RowValidator for DealRowValidator {
    fn validate_row(
        &self,
        header: &ResolvedHeader,
        values: &[String],
        line: usize,
    ) -> Result<ParsedRecord, Vec<ValidationError>> {
        let row = CandidateRow::from_values(header, values);
        self.validate_candidate(row, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::deal_importer_trait::HeaderResolver;
    use crate::importer::header_resolver::DealHeaderResolver;

    fn header(cols: &[&str]) -> ResolvedHeader {
        let cols: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
        DealHeaderResolver.resolve(&cols).unwrap()
    }

    fn values(vals: &[&str]) -> Vec<String> {
        vals.iter().map(|v| v.to_string()).collect()
    }

    fn fields(errors: &[ValidationError]) -> Vec<DealField> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_parse_price_rules() {
        assert_eq!(parse_price("49.99"), Some(49.99));
        assert_eq!(parse_price(" 10 "), Some(10.0));
        assert_eq!(parse_price("-5"), None);
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn test_external_url_rules() {
        assert!(is_valid_external_url("https://example.com/a"));
        assert!(is_valid_external_url("HTTP://example.com"));
        assert!(!is_valid_external_url("not-a-url"));
        assert!(!is_valid_external_url("httpx://example.com"));
        assert!(!is_valid_external_url("https://"));
        assert!(!is_valid_external_url("ftp://example.com"));
    }

    #[test]
    fn test_parse_expires_at_formats() {
        assert!(parse_expires_at("2026-01-31T12:00:00Z").is_some());
        assert!(parse_expires_at("2026-01-31 12:00:00").is_some());
        assert_eq!(
            parse_expires_at("2026-01-31").map(|d| d.to_rfc3339()),
            Some("2026-01-31T00:00:00+00:00".to_string())
        );
        assert!(parse_expires_at("31/01/2026").is_none());
    }

    #[test]
    fn test_valid_row_builds_record() {
        let h = header(&["title", "description", "price", "original_price", "external_url"]);
        let record = DealRowValidator::default()
            .validate_row(
                &h,
                &values(&["Key Blank", " Honda ", "24.95", "34.95", "https://example.com/p"]),
                2,
            )
            .unwrap();

        assert_eq!(record.title, "Key Blank");
        assert_eq!(record.description.as_deref(), Some("Honda"));
        assert_eq!(record.price, 24.95);
        assert_eq!(record.original_price, Some(34.95));
        assert_eq!(record.source_line, 2);
    }

    #[test]
    fn test_sale_price_populates_price() {
        let h = header(&["title", "sale_price", "external_url"]);
        let record = DealRowValidator::default()
            .validate_row(&h, &values(&["Fob", "19.5", "https://example.com"]), 2)
            .unwrap();

        assert_eq!(record.price, 19.5);
    }

    #[test]
    fn test_price_column_wins_over_sale_price() {
        let h = header(&["title", "price", "sale_price", "external_url"]);
        let record = DealRowValidator::default()
            .validate_row(&h, &values(&["Fob", "10", "8", "https://example.com"]), 2)
            .unwrap();

        assert_eq!(record.price, 10.0);
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let h = header(&["title", "price", "external_url"]);
        let errors = DealRowValidator::default()
            .validate_row(&h, &values(&["", "12", "not-a-url"]), 5)
            .unwrap_err();

        assert_eq!(fields(&errors), vec![DealField::Title, DealField::ExternalUrl]);
        assert!(errors.iter().all(|e| e.line == 5 && !e.message.is_empty()));
    }

    #[test]
    fn test_short_row_reports_all_missing() {
        let h = header(&["title", "price", "external_url"]);
        let errors = DealRowValidator::default()
            .validate_row(&h, &values(&["only title"]), 3)
            .unwrap_err();

        assert_eq!(fields(&errors), vec![DealField::Price, DealField::ExternalUrl]);
    }

    #[test]
    fn test_original_price_not_greater_is_error() {
        let h = header(&["title", "price", "original_price", "external_url"]);
        let errors = DealRowValidator::default()
            .validate_row(&h, &values(&["A", "50", "40", "https://e.com"]), 2)
            .unwrap_err();

        assert_eq!(fields(&errors), vec![DealField::OriginalPrice]);
    }

    #[test]
    fn test_lenient_policy_drops_non_numeric_original_price() {
        let h = header(&["title", "price", "original_price", "external_url"]);
        let record = DealRowValidator::new(OriginalPricePolicy::Lenient)
            .validate_row(&h, &values(&["A", "50", "n/a", "https://e.com"]), 2)
            .unwrap();

        assert_eq!(record.original_price, None);
    }

    #[test]
    fn test_strict_policy_rejects_non_numeric_original_price() {
        let h = header(&["title", "price", "original_price", "external_url"]);
        let errors = DealRowValidator::new(OriginalPricePolicy::Strict)
            .validate_row(&h, &values(&["A", "50", "n/a", "https://e.com"]), 2)
            .unwrap_err();

        assert_eq!(fields(&errors), vec![DealField::OriginalPrice]);
    }

    #[test]
    fn test_invalid_expires_at_is_error() {
        let h = header(&["title", "price", "external_url", "expires_at"]);
        let errors = DealRowValidator::default()
            .validate_row(&h, &values(&["A", "5", "https://e.com", "tomorrow"]), 2)
            .unwrap_err();

        assert_eq!(fields(&errors), vec![DealField::ExpiresAt]);
    }

    #[test]
    fn test_optional_passthrough_fields() {
        let h = header(&["title", "price", "external_url", "deal_type_id", "image_url"]);
        let record = DealRowValidator::default()
            .validate_row(
                &h,
                &values(&["A", "5", "https://e.com", "type-1", "https://img/x.png"]),
                2,
            )
            .unwrap();

        assert_eq!(record.deal_type_id.as_deref(), Some("type-1"));
        assert_eq!(record.image_url.as_deref(), Some("https://img/x.png"));
        assert_eq!(record.expires_at, None);
    }
}

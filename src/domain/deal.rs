// ==========================================
// 优惠批量导入 - 优惠领域模型
// ==========================================
// 职责: 导入管道的中间结构 + 落库实体
// 流程: CSV 行 → ParsedRecord → 提交 → Deal
// ==========================================

use crate::domain::types::{DealField, DealStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// ParsedRecord - 单行解析结果
// ==========================================
// 用途: 通过行校验的一条候选优惠（仅内存，不直接落库）
// 说明: expires_at 为空时由存储端补默认过期时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    pub external_url: String,
    #[serde(default)]
    pub deal_type_id: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(skip)]
    pub source_line: usize, // 原始文件行号（含表头）
}

impl ParsedRecord {
    /// 仅含必填字段的记录
    pub fn new(title: impl Into<String>, price: f64, external_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            price,
            original_price: None,
            external_url: external_url.into(),
            deal_type_id: None,
            expires_at: None,
            image_url: None,
            source_line: 0,
        }
    }
}

// ==========================================
// ValidationError - 行级校验错误
// ==========================================
// line: 1 起，含表头（表头 = 1）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub line: usize,
    pub field: DealField,
    pub message: String,
}

// ==========================================
// ImportBatch - 整个文件的解析结果
// ==========================================
// 不变量: 每个非空数据行要么进入 records，要么在 errors 中至少出现一次
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub records: Vec<ParsedRecord>,
    pub errors: Vec<ValidationError>,
}

impl ImportBatch {
    /// 出错的行号集合（去重、升序）
    pub fn error_lines(&self) -> BTreeSet<usize> {
        self.errors.iter().map(|e| e.line).collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ==========================================
// ImportSummary - 批次汇总（供预览展示）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_lines: usize,      // 非空数据行数（不含表头）
    pub valid_count: usize,      // 有效记录数
    pub error_line_count: usize, // 出错行数（按行号去重）
    pub error_count: usize,      // 错误条数
    pub preview: Vec<ParsedRecord>,
    pub preview_truncated: bool,
    pub message: String,
}

// ==========================================
// ImportOutcome - 解析阶段的最终输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch: ImportBatch,
    pub summary: ImportSummary,
}

// ==========================================
// BulkCreateOutcome - 批量创建结果
// ==========================================
// 对齐远端 bulk-upload 成功响应 { count, message }
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateOutcome {
    pub count: usize,
    pub message: String,
}

// ==========================================
// Deal - 已落库优惠
// ==========================================
// 对齐 deals 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub retailer_profile_id: String,
    pub deal_type_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub external_url: String,
    pub expires_at: DateTime<Utc>,
    pub status: DealStatus,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// DealImage - 优惠图片
// ==========================================
// 对齐 deal_images 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealImage {
    pub id: String,
    pub deal_id: String,
    pub image_url: String,
    pub display_order: i32,
}

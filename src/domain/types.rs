// ==========================================
// 优惠批量导入 - 领域类型定义
// ==========================================
// 职责: 标准字段、原价校验策略、优惠状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 表头列名统一映射到此集合，未识别列名被忽略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealField {
    Title,
    Description,
    Price,
    SalePrice, // price 的同义列
    OriginalPrice,
    ExternalUrl,
    DealTypeId,
    ExpiresAt,
    ImageUrl,
}

impl DealField {
    /// 全部标准字段（按模板列顺序）
    pub const ALL: [DealField; 9] = [
        DealField::Title,
        DealField::Description,
        DealField::Price,
        DealField::SalePrice,
        DealField::OriginalPrice,
        DealField::ExternalUrl,
        DealField::DealTypeId,
        DealField::ExpiresAt,
        DealField::ImageUrl,
    ];

    /// 列名（小写、下划线）
    pub fn as_str(&self) -> &'static str {
        match self {
            DealField::Title => "title",
            DealField::Description => "description",
            DealField::Price => "price",
            DealField::SalePrice => "sale_price",
            DealField::OriginalPrice => "original_price",
            DealField::ExternalUrl => "external_url",
            DealField::DealTypeId => "deal_type_id",
            DealField::ExpiresAt => "expires_at",
            DealField::ImageUrl => "image_url",
        }
    }

    /// 由已归一化的列名解析
    pub fn from_column(name: &str) -> Option<Self> {
        DealField::ALL.iter().copied().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for DealField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 原价校验策略 (Original Price Policy)
// ==========================================
// LENIENT: 非数值原价静默丢弃，仅在数值且 <= 售价时报错
// STRICT: 原价列有值即必须为正数且 > 售价
// 序列化格式: SCREAMING_SNAKE_CASE (与 config_kv 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginalPricePolicy {
    #[default]
    Lenient,
    Strict,
}

impl fmt::Display for OriginalPricePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginalPricePolicy::Lenient => write!(f, "LENIENT"),
            OriginalPricePolicy::Strict => write!(f, "STRICT"),
        }
    }
}

impl FromStr for OriginalPricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LENIENT" => Ok(OriginalPricePolicy::Lenient),
            "STRICT" => Ok(OriginalPricePolicy::Strict),
            other => Err(format!("unknown original price policy: {}", other)),
        }
    }
}

// ==========================================
// 优惠状态 (Deal Status)
// ==========================================
// 对齐 deals.status 列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Active,
    Archived,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Active => "active",
            DealStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(DealStatus::Active),
            "archived" => Ok(DealStatus::Archived),
            other => Err(format!("unknown deal status: {}", other)),
        }
    }
}

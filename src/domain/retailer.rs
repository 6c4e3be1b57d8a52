// ==========================================
// 优惠批量导入 - 零售商档案
// ==========================================
// 对齐 retailer_profiles 表
// 批量上传前置条件: 拥有档案 + CSV 权限（管理员除外）+ 档案启用
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerProfile {
    pub id: String,
    pub owner_user_id: String,
    pub business_name: String,
    pub has_csv_permission: bool,
    pub is_active: bool,
    pub daily_deal_limit: i64, // 0 = 不限
    pub created_at: DateTime<Utc>,
}

impl RetailerProfile {
    /// 是否启用每日上限
    pub fn has_daily_limit(&self) -> bool {
        self.daily_deal_limit > 0
    }
}

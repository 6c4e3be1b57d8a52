// ==========================================
// 优惠批量导入 - CSV 模板
// ==========================================
// 职责: 生成可下载的示例文件（表头 + 3 行示例）
// 说明: 示例值仅作演示，不具约束含义
// ==========================================

use crate::importer::error::ImportResult;
use csv::WriterBuilder;
use std::path::Path;

/// 模板下载文件名
pub const TEMPLATE_FILE_NAME: &str = "deals_template.csv";

/// 模板表头
pub const TEMPLATE_HEADER: [&str; 6] = [
    "title",
    "description",
    "price",
    "original_price",
    "external_url",
    "deal_type_id",
];

const TEMPLATE_ROWS: [[&str; 6]; 3] = [
    [
        "Example Deal - 50% Off Smart Key",
        "High quality smart key with remote start",
        "49.99",
        "99.99",
        "https://example.com/product1",
        "",
    ],
    [
        "Transponder Key Blank",
        "Compatible with 2015-2023 Honda Accord",
        "24.95",
        "34.95",
        "https://example.com/product2",
        "",
    ],
    [
        "Key Fob Programming Tool",
        "Professional grade programming device",
        "199.00",
        "299.00",
        "https://example.com/product3",
        "",
    ],
];

/// 生成模板内容
pub fn template_csv() -> ImportResult<String> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(TEMPLATE_HEADER)?;
    for row in TEMPLATE_ROWS {
        wtr.write_record(row)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| crate::importer::ImportError::InternalError(e.to_string()))?;
    String::from_utf8(bytes)
        .map_err(|e| crate::importer::ImportError::InternalError(e.to_string()))
}

/// 写出模板到指定路径
pub fn write_template<P: AsRef<Path>>(path: P) -> ImportResult<()> {
    std::fs::write(path, template_csv()?)?;
    Ok(())
}

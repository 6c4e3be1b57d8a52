// ==========================================
// 优惠批量导入 - 行分词器实现
// ==========================================
// 职责: 单行文本 → 字段列表
// 规则: 双引号切换 in_quotes；引号内分隔符不切分；引号字符不写入字段
// 说明: 未闭合引号不报错，行尾照常 flush（后续由校验暴露问题）
// ==========================================

use crate::importer::deal_importer_trait::LineTokenizer;

/// 默认分隔符
pub const DEFAULT_DELIMITER: char = ',';

/// 按引号感知规则切分一行
pub fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            values.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }

    values.push(current);
    values
}

// ==========================================
// QuoteAwareTokenizer
// ==========================================
pub struct QuoteAwareTokenizer {
    delimiter: char,
}

impl QuoteAwareTokenizer {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl Default for QuoteAwareTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl LineTokenizer for QuoteAwareTokenizer {
    fn tokenize(&self, line: &str) -> Vec<String> {
        tokenize_line(line, self.delimiter)
    }
}

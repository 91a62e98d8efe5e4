//! 通用工具函数

/// 校验 SQL 标识符（表名、列名），仅允许小写字母、数字和下划线
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_identifier() {
        assert!(is_sql_identifier("site_id"));
        assert!(is_sql_identifier("_private"));
        assert!(is_sql_identifier("col2"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("2col"));
        assert!(!is_sql_identifier("Name"));
        assert!(!is_sql_identifier("name; drop table users"));
        assert!(!is_sql_identifier("a\"b"));
    }
}

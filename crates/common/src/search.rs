//! 列表搜索
//!
//! 按不区分大小写的子串匹配过滤列表

/// 规范化后的搜索词
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTerm(Option<String>);

impl SearchTerm {
    /// 空白搜索词视为不过滤
    pub fn new(raw: Option<&str>) -> Self {
        let term = raw
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        Self(term)
    }

    /// 任一字段包含搜索词即匹配
    pub fn matches<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        match &self.0 {
            None => true,
            Some(term) => fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(term.as_str())),
        }
    }
}

use std::collections::BTreeMap;

/// One fetched window of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub skip: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.skip + (self.items.len() as u64) < self.total
    }
}

/// A list resource plus its filter criteria.
///
/// Changing any of these means a different list, so the owning feed resets
/// when a new query is installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    path: String,
    keyword: String,
    filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// `{path}?keyword=..&skip=..&limit=..&{filters}`
    pub fn page_path(&self, skip: u64, limit: u64) -> String {
        let mut out = format!(
            "{}?keyword={}&skip={}&limit={}",
            self.path,
            urlencoding::encode(&self.keyword),
            skip,
            limit
        );
        for (name, value) in &self.filters {
            out.push('&');
            out.push_str(&urlencoding::encode(name));
            out.push('=');
            out.push_str(&urlencoding::encode(value));
        }
        out
    }
}

/// BlogFilter
///
/// Query parameters accepted by GET /blogs. Each field is sent only when it
/// carries a value; an empty string is never put on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    /// Case-insensitive match against title and content.
    pub keyword: String,
    /// Category name, as shown in the filter dropdown.
    pub category: String,
    /// Creation day in `YYYY-MM-DD` form.
    pub date: String,
    /// Maximum number of posts, newest first.
    pub limit: Option<u32>,
}

impl BlogFilter {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_text(&mut query, "keyword", &self.keyword);
        push_text(&mut query, "category", &self.category);
        push_text(&mut query, "date", &self.date);
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

/// EventFilter
///
/// Query parameters accepted by GET /events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Maximum number of events, soonest first.
    pub limit: Option<u32>,
}

impl EventFilter {
    pub fn upcoming(limit: u32) -> Self {
        Self { limit: Some(limit) }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        self.limit
            .map(|limit| vec![("limit", limit.to_string())])
            .unwrap_or_default()
    }
}

fn push_text(query: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        query.push((key, value.to_string()));
    }
}

use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 1000;

/// A page request. Always normalized: `page >= 1` and `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Builds a page request from raw query-string values.
    ///
    /// Non-numeric or non-positive pages fall back to 1, non-numeric or
    /// non-positive limits fall back to [`DEFAULT_LIMIT`], and limits above
    /// [`MAX_LIMIT`] are clamped.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + pagination.limit - 1) / pagination.limit
        };

        Self {
            data,
            total,
            total_pages,
            page: pagination.page,
            limit: pagination.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_to_maximum() {
        let p = Pagination::from_query(Some("2"), Some("100000"));
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.page, 2);
    }

    #[test]
    fn invalid_page_defaults_to_first() {
        assert_eq!(Pagination::from_query(Some("0"), None).page, 1);
        assert_eq!(Pagination::from_query(Some("abc"), None).page, 1);
        assert_eq!(Pagination::from_query(Some("-4"), None).page, 1);
        assert_eq!(Pagination::from_query(None, None).page, 1);
    }

    #[test]
    fn invalid_limit_defaults() {
        assert_eq!(Pagination::from_query(None, Some("0")).limit, DEFAULT_LIMIT);
        assert_eq!(Pagination::from_query(None, Some("ten")).limit, DEFAULT_LIMIT);
        assert_eq!(Pagination::from_query(None, Some("25")).limit, 25);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 21, Pagination { page: 1, limit: 10 });
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_pages, 0);
        assert_eq!(Pagination { page: 3, limit: 10 }.offset(), 20);
    }
}

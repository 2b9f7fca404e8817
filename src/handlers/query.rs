use serde::Deserialize;

/// Pagination plus an optional `name` substring filter.
///
/// Values stay strings so a malformed `page` or `limit` falls back to its
/// default instead of rejecting the request.
#[derive(Deserialize, Debug)]
pub struct NameFilterQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub name: Option<String>,
}

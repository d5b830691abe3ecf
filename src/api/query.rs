//! Pagination, search and filter query construction.
//!
//! Every paginated list endpoint takes the same `limit`/`offset`/`search`
//! parameters plus entity-specific filters. The encoded query string is
//! deterministic so identical queries always produce identical URLs.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, Result};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A page request for a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
    limit: u64,
    offset: u64,
    search: Option<String>,
    filters: BTreeMap<String, String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageQuery {
    /// Create a query for the first page. A zero limit is raised to 1.
    pub fn new(limit: u64) -> Self {
        Self {
            limit: limit.max(1),
            offset: 0,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The active search term, if any. Never returns an empty string.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Active filters. Never contains empty values.
    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Value of one filter field.
    pub fn filter(&self, field: &str) -> Option<&str> {
        self.filters.get(field).map(String::as_str)
    }

    /// True when a search term or any filter narrows the result set.
    pub fn is_narrowed(&self) -> bool {
        self.search.is_some() || !self.filters.is_empty()
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.set_search(search);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(field, Some(value.into()));
        self
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit.max(1);
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Set the search term. Blank input clears it.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        let trimmed = search.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Set or clear one filter. `None` and empty strings remove the field.
    pub fn set_filter(&mut self, field: impl Into<String>, value: Option<String>) {
        let field = field.into();
        match value.filter(|v| !v.trim().is_empty()) {
            Some(value) => {
                self.filters.insert(field, value);
            }
            None => {
                self.filters.remove(&field);
            }
        }
    }

    /// Remove the search term and every filter.
    pub fn clear_narrowing(&mut self) {
        self.search = None;
        self.filters.clear();
    }

    /// Encode as a query string (without the leading `?`).
    ///
    /// Order: `limit`, `offset`, `search`, then filters in `filter_order`,
    /// then any undeclared filters in lexicographic order.
    pub fn to_query_string(&self, filter_order: &[&str]) -> String {
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(3 + self.filters.len());
        let limit = self.limit.to_string();
        let offset = self.offset.to_string();
        pairs.push(("limit", limit.as_str()));
        pairs.push(("offset", offset.as_str()));

        if let Some(search) = &self.search {
            pairs.push(("search", search.as_str()));
        }

        for field in filter_order {
            if let Some(value) = self.filters.get(*field) {
                pairs.push((*field, value.as_str()));
            }
        }
        for (field, value) in &self.filters {
            if !filter_order.contains(&field.as_str()) {
                pairs.push((field.as_str(), value.as_str()));
            }
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append this query to an endpoint path.
    pub fn to_path(&self, base: &str, filter_order: &[&str]) -> String {
        format!("{}?{}", base, self.to_query_string(filter_order))
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    /// Items on this page, in server order.
    pub items: Vec<T>,
    /// Number of items matching the query across all pages.
    pub total: u64,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Decode a `{ <collection>: [...], total }` envelope.
///
/// A missing or `null` collection is an empty page. A missing `total` falls
/// back to the number of items received.
pub(crate) fn decode_page<T: DeserializeOwned>(
    body: Value,
    collection: &str,
) -> Result<PageResult<T>> {
    let total = body.get("total").and_then(Value::as_u64);
    let items: Vec<T> = decode_items(body, collection)?;
    let total = total.unwrap_or(items.len() as u64);
    Ok(PageResult { items, total })
}

/// Decode the collection field of a `{ <collection>: [...] }` envelope.
pub(crate) fn decode_items<T: DeserializeOwned>(mut body: Value, collection: &str) -> Result<Vec<T>> {
    match body.get_mut(collection).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => serde_json::from_value(items).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse '{}': {}", collection, e))
        }),
    }
}

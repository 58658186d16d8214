use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Standard response envelope: `{"success": true, "data": ...}`.
pub fn success(data: impl Serialize) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

/// Envelope for list endpoints, reporting the pre-pagination total.
pub fn success_list(data: impl Serialize, total: usize) -> Value {
    json!({
        "success": true,
        "data": data,
        "total": total
    })
}

/// `limit`/`offset` pagination, applied at the HTTP boundary only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Pagination {
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

use serde::Serialize;
use utoipa::ToSchema;

/// Paging information attached to list responses.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    /// A single unpaged list.
    pub fn total(total: usize) -> Self {
        Self {
            page: None,
            per_page: None,
            total: Some(total as i64),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// Envelope for every JSON body: `{ message, data, meta }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

/// Cuts one page out of `items`; `offset` past the end yields an empty page.
pub fn paginate<T>(items: Vec<T>, page: i64, per_page: i64, offset: i64) -> (Vec<T>, Meta) {
    let total = items.len() as i64;
    let page_items = items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(per_page.max(0) as usize)
        .collect();
    (page_items, Meta::new(page, per_page, total))
}

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderStatus, PrintMode, PrintOptions},
};

pub const MAX_DOCUMENT_SIZE: i64 = 52_428_800;
pub const MAX_COPIES: i32 = 100;
const MAX_FILE_NAME_LEN: usize = 255;

/// One file of a new order together with how it should be printed.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub content: Bytes,
    pub print_options: PrintOptions,
}

impl DocumentUpload {
    pub fn size(&self) -> i64 {
        self.content.len() as i64
    }

    pub fn validate(&self, index: usize) -> AppResult<()> {
        let invalid = |reason: String| {
            Err(AppError::InvalidArgument(format!(
                "document {} ({}): {reason}",
                index + 1,
                self.file_name
            )))
        };

        if self.file_name.trim().is_empty() || self.file_name.len() > MAX_FILE_NAME_LEN {
            return invalid(format!("file name must be 1..={MAX_FILE_NAME_LEN} characters"));
        }
        if self.mime_type.trim().is_empty() {
            return invalid("missing content type".into());
        }
        if !(1..=MAX_DOCUMENT_SIZE).contains(&self.size()) {
            return invalid(format!("size must be between 1 and {MAX_DOCUMENT_SIZE} bytes"));
        }
        if !(1..=MAX_COPIES).contains(&self.print_options.copies) {
            return invalid(format!("copies must be between 1 and {MAX_COPIES}"));
        }
        if self.print_options.pages.trim().is_empty() {
            return invalid("pages is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub print_mode: PrintMode,
    pub documents: Vec<DocumentUpload>,
}

/// Per-file settings sent as the `document_configs` multipart field.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentConfig {
    pub print_mode: PrintMode,
    pub print_options: PrintOptions,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

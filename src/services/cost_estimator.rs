use crate::models::{ColorMode, Order, PrintOptions};

/// Byte-size proxy for page count until real page extraction exists.
pub const BYTES_PER_PAGE: i64 = 50_000;
pub const DEFAULT_PRICE_PER_PAGE: i64 = 10;
/// Upper bound accepted from configuration.
pub const MAX_PRICE_PER_PAGE: i64 = 1_000_000;

/// Prices orders in minor currency units using integer arithmetic only.
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    price_per_page: i64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_PER_PAGE)
    }
}

impl CostEstimator {
    pub fn new(price_per_page: i64) -> Self {
        Self { price_per_page }
    }

    pub fn price_per_page(&self) -> i64 {
        self.price_per_page
    }

    /// Steps run in a fixed order: pages, rate, color, double-sided, copies.
    /// The double-sided discount truncates before copies are multiplied in.
    /// Products saturate at `i64::MAX` instead of wrapping.
    pub fn estimate_document_cost(&self, size: i64, options: &PrintOptions) -> i64 {
        let pages = estimated_pages(size);
        let mut cost = pages.saturating_mul(self.price_per_page);
        if options.color == ColorMode::Color {
            cost = cost.saturating_mul(3);
        }
        if options.double_sided {
            cost = cost.saturating_mul(6) / 10;
        }
        if options.copies > 1 {
            cost = cost.saturating_mul(i64::from(options.copies));
        }
        cost
    }

    pub fn estimate<'a, I>(&self, documents: I) -> i64
    where
        I: IntoIterator<Item = (i64, &'a PrintOptions)>,
    {
        documents
            .into_iter()
            .map(|(size, options)| self.estimate_document_cost(size, options))
            .fold(0, i64::saturating_add)
    }

    pub fn estimate_order_cost(&self, order: &Order) -> i64 {
        self.estimate(
            order
                .documents
                .iter()
                .map(|doc| (doc.size, &doc.print_options)),
        )
    }
}

/// `ceil(size / 50000)`, never less than one page.
pub fn estimated_pages(size: i64) -> i64 {
    if size <= 0 {
        return 1;
    }
    let pages = size / BYTES_PER_PAGE;
    if size % BYTES_PER_PAGE == 0 { pages } else { pages + 1 }
}

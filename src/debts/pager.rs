use serde_json::Value;

use super::criteria::FilterMode;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MIN_PAGE_SIZE: i64 = 1;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Zero-based page number and clamped size for one listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub size: i64,
}

impl PageWindow {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(0),
            size: size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    /// Reads `page` and `pageSize` the way clients send them: numbers or numeric strings.
    /// A missing or non-numeric size falls back to [`DEFAULT_PAGE_SIZE`]; anything numeric is
    /// clamped. A missing, non-numeric or negative page is page 0.
    pub fn from_request(page: Option<&Value>, page_size: Option<&Value>) -> Self {
        let size = page_size.and_then(leading_integer).unwrap_or(DEFAULT_PAGE_SIZE);
        let page = page.and_then(leading_integer).unwrap_or(0);
        Self::new(page, size)
    }

    /// Offset of the first row in the page.
    pub fn from(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// Offset of the last row in the page, inclusive.
    pub fn to(&self) -> i64 {
        self.from().saturating_add(self.size - 1)
    }

    /// 1-based absolute position of the `i`-th row of this page.
    pub fn row_index(&self, i: usize) -> i64 {
        self.from() + i as i64 + 1
    }
}

/// Total reported alongside a page.
///
/// In `all` mode this is the exact count of the filtered set. In `any` mode the union is
/// only computed over the fetched page, so the total is the number of rows that page
/// kept, not a global count.
pub fn resolve_total(mode: FilterMode, exact_count: Option<i64>, returned_rows: usize) -> i64 {
    match (mode, exact_count) {
        (FilterMode::All, Some(count)) => count,
        _ => returned_rows as i64,
    }
}

fn leading_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

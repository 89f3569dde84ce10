//! Cleaning of numbers scraped from page text.

use crate::error::{Result, VaxError};

/// Turn a displayed count such as `"12,345"` or `" 1 234 567 doses"` into an integer.
///
/// Every character that is not an ASCII digit is dropped, so thousands
/// separators of any locale disappear. Decimal points are dropped too; counts
/// on these pages are always whole numbers.
pub fn clean_count(text: &str) -> Result<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(VaxError::parse(format!("no digits in count {text:?}")));
    }

    digits
        .parse::<u64>()
        .map_err(|e| VaxError::parse(format!("count {text:?} out of range: {e}")))
}

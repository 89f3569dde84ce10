//! CSS-selector helpers over parsed HTML.
//!
//! All lookups return `Result` so a page whose markup changed fails the
//! scraper run with a message naming the selector, instead of panicking.

use scraper::{ElementRef, Html, Selector};

use vaxscrape_shared::{Result, VaxError};

/// Parse a CSS selector.
fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| VaxError::parse(format!("invalid selector '{css}': {e}")))
}

/// Collapse runs of whitespace into single spaces and trim.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element with whitespace normalized.
fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// The `n`th (zero-based) element matching `css`.
pub fn nth_element<'a>(doc: &'a Html, css: &str, n: usize) -> Result<ElementRef<'a>> {
    let sel = selector(css)?;
    doc.select(&sel).nth(n).ok_or_else(|| missing(css, n))
}

/// Text of the `n`th (zero-based) element matching `css`.
pub fn nth_text(doc: &Html, css: &str, n: usize) -> Result<String> {
    nth_element(doc, css, n).map(element_text)
}

/// Attribute `attr` of the first descendant of `scope` matching `css`.
pub fn descendant_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Result<String> {
    let sel = selector(css)?;
    let el = scope.select(&sel).next().ok_or_else(|| missing(css, 0))?;
    el.value()
        .attr(attr)
        .map(str::to_string)
        .ok_or_else(|| VaxError::parse(format!("'{css}' has no '{attr}' attribute")))
}

fn missing(css: &str, n: usize) -> VaxError {
    VaxError::parse(format!("no element #{n} matching '{css}'"))
}

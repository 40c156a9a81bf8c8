//! Display helpers for prices, dates and long strings.

pub mod format;

pub use format::{format_amount, format_date, format_price, truncate};

//! Module for additional computational capabilities
pub mod test_helper;
pub mod unit_format;
pub mod uom_macros;
pub use unit_format::format_fixed;

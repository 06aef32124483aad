//! Error handling foundation for stackflow.
//!
//! Only the `Result` alias lives here. Each crate defines its own
//! domain-specific error enums and wraps them in a rootcause `Report` when
//! they cross a store or service boundary.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

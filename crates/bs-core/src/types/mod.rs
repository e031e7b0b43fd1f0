//! Domain types for better-search.
//!
//! - [`entry`] - Discovered filesystem entries
//! - [`query`] - Search queries and match modes
//! - [`category`] - Extension-based result categories
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use bs_core::{Category, Entry, MatchMode, SearchQuery};
//! ```

mod category;
mod entry;
mod query;

pub use category::Category;
pub use entry::Entry;
pub use query::{MatchMode, SearchQuery};

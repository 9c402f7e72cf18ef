//! Response construction, one function per strategy.
//!
//! - **`text`**: movie fragment, search page, text assets and the fallback page
//! - **`image`**: image assets, re-encoded into the requested format

pub mod image;
pub mod text;

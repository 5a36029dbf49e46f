//! Context collectors over the local source tree

mod importers;

pub use importers::{find_importers, search_keys};

mod analytics;
mod tracker;

pub use analytics::*;
pub use tracker::*;

#[cfg(test)]
pub(crate) mod testing;

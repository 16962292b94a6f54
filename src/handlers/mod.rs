//! Built-in handler modules

mod infrastructure;
mod suggest;

pub use infrastructure::InfrastructureModule;
pub use suggest::{levenshtein, similar_names};

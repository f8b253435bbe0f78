mod analyze;
mod export;
mod health;
mod parse;
mod reattach;
#[cfg(feature = "cache")]
mod results;
mod summary;
mod table;
mod tree;
mod util;

pub use analyze::Analyze;
pub use export::Export;
pub use health::Health;
pub use parse::Parse;
pub use reattach::Reattach;
#[cfg(feature = "cache")]
pub use results::Results;
pub use summary::Summary;
pub use table::Table;
pub use tree::Tree;

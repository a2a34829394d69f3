pub mod proxy;
pub mod scrape;
pub mod stats;
pub mod transcript;

pub use proxy::*;
pub use scrape::*;
pub use stats::*;
pub use transcript::*;

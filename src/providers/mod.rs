pub mod arrow_file;
pub mod base;
pub mod yahoo;

pub use arrow_file::ArrowFileProvider;
pub use base::MarketDataProvider;
pub use yahoo::YahooProvider;

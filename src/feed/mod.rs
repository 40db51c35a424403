//! Feed assembly: filtering a listing, enriching its posts and writing RSS.

mod assemble;
pub mod filter;
pub mod model;
pub mod rss;

pub use assemble::{assemble, FeedError};
pub use filter::FeedFilters;
pub use model::{Feed, FeedImage, FeedItem};
pub use rss::generate_rss;

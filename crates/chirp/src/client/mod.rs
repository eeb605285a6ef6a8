//! Client side of the feed: a shared query cache, the pure reconciler that
//! patches it after confirmed mutations, and the HTTP client and infinite
//! feed driver built on top.

pub mod api_client;
pub mod error;
pub mod infinite_feed;
pub mod query_cache;
pub mod reconcile;

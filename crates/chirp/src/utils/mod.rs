pub mod errors;
pub mod pagination;
pub mod redis_keys;

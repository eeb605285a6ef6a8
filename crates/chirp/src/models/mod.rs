pub mod likes;
pub mod profiles;
pub mod tweets;
pub mod user_follows;
pub mod users;

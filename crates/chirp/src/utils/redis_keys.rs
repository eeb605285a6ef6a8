use uuid::Uuid;

pub struct RedisKeys;

impl RedisKeys {
    // Profile page keys
    pub const PROFILE_PREFIX: &'static str = "profile:";
    pub const PROFILE_GENERATION_PREFIX: &'static str = "profile_gen:";

    // Default TTL (5 minutes)
    pub const PROFILE_CACHE_TTL: u64 = 300;

    /// Cached profile stats for one generation of a user's profile.
    pub fn get_profile_key(user_id: Uuid, generation: u64) -> String {
        format!("{}{}:{}", Self::PROFILE_PREFIX, user_id, generation)
    }

    /// Counter bumped on every revalidation. Never expires.
    pub fn get_profile_generation_key(user_id: Uuid) -> String {
        format!("{}{}", Self::PROFILE_GENERATION_PREFIX, user_id)
    }
}

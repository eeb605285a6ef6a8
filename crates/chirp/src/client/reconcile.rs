use uuid::Uuid;

use super::query_cache::{CacheSnapshot, CachedQuery, QueryKey};
use crate::models::{
    profiles::ProfileResponse,
    tweets::{Tweet, TweetResponse},
    users::UserSummary,
};

/// A mutation the server has confirmed, carrying what the cache needs to
/// patch itself without refetching.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationResult {
    LikeToggled {
        tweet_id: Uuid,
        added: bool,
    },
    FollowToggled {
        follower_id: Uuid,
        followed_id: Uuid,
        added: bool,
    },
    TweetCreated {
        tweet: Tweet,
        author: UserSummary,
    },
    TweetDeleted {
        tweet_id: Uuid,
    },
}

/// Returns a copy of `snapshot` with `mutation` applied. Entries the
/// mutation does not touch come back unchanged.
pub fn reconcile(snapshot: &CacheSnapshot, mutation: &MutationResult) -> CacheSnapshot {
    let mut next = snapshot.clone();

    match mutation {
        MutationResult::LikeToggled { tweet_id, added } => {
            for (_, entry) in next.entries_mut() {
                if let CachedQuery::Pages(pages) = entry {
                    pages
                        .iter_mut()
                        .flat_map(|page| page.tweets.iter_mut())
                        .filter(|tweet| tweet.id == *tweet_id)
                        .for_each(|tweet| apply_like(tweet, *added));
                }
            }
        }
        MutationResult::FollowToggled {
            follower_id,
            followed_id,
            added,
        } => {
            let followed = QueryKey::Profile {
                user_id: *followed_id,
            };
            if let Some(CachedQuery::Profile(profile)) = next.get_mut(&followed) {
                if profile.is_following != *added {
                    profile.is_following = *added;
                    profile.follower_count = step(profile.follower_count, *added);
                }
            }

            let follower = QueryKey::Profile {
                user_id: *follower_id,
            };
            if let Some(CachedQuery::Profile(profile)) = next.get_mut(&follower) {
                bump_following(profile, *added);
            }
        }
        MutationResult::TweetCreated { tweet, author } => {
            if let Some(CachedQuery::Pages(pages)) = next.get_mut(&QueryKey::global_feed()) {
                if let Some(first) = pages.first_mut() {
                    let record = TweetResponse::from_created(tweet.clone(), author.clone());
                    first.tweets.insert(0, record);
                }
            }
        }
        MutationResult::TweetDeleted { tweet_id } => {
            for (_, entry) in next.entries_mut() {
                if let CachedQuery::Pages(pages) = entry {
                    for page in pages.iter_mut() {
                        page.tweets.retain(|tweet| tweet.id != *tweet_id);
                    }
                }
            }
        }
    }

    next
}

fn apply_like(tweet: &mut TweetResponse, added: bool) {
    if tweet.liked_by_me == added {
        return;
    }
    tweet.liked_by_me = added;
    tweet.like_count = step(tweet.like_count, added);
}

fn bump_following(profile: &mut ProfileResponse, added: bool) {
    profile.following_count = step(profile.following_count, added);
}

fn step(count: i64, up: bool) -> i64 {
    if up {
        count + 1
    } else {
        (count - 1).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tweets::{FeedCursor, TweetPage};
    use chrono::{TimeZone, Utc};

    fn user(id: u128) -> UserSummary {
        UserSummary {
            id: Uuid::from_u128(id),
            name: Some(format!("user{id}")),
            image: None,
        }
    }

    fn record(id: u128, secs: i64, likes: i64, liked: bool) -> TweetResponse {
        TweetResponse {
            id: Uuid::from_u128(id),
            content: format!("tweet {id}"),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            like_count: likes,
            liked_by_me: liked,
            user: user(100),
        }
    }

    fn profile(following: bool, followers: i64, follows: i64) -> ProfileResponse {
        ProfileResponse {
            name: Some("someone".to_string()),
            image: None,
            is_following: following,
            follower_count: followers,
            following_count: follows,
            tweet_count: 3,
        }
    }

    fn snapshot() -> CacheSnapshot {
        let mut snapshot = CacheSnapshot::default();
        let first = TweetPage {
            tweets: vec![record(5, 100, 2, false), record(3, 100, 0, false)],
            next_cursor: Some(record(3, 100, 0, false).cursor()),
        };
        let second = TweetPage {
            tweets: vec![record(9, 90, 1, true)],
            next_cursor: None,
        };
        snapshot.insert(
            QueryKey::global_feed(),
            CachedQuery::Pages(vec![first.clone(), second]),
        );
        snapshot.insert(
            QueryKey::ProfileFeed {
                user_id: Uuid::from_u128(100),
            },
            CachedQuery::Pages(vec![first]),
        );
        snapshot
    }

    fn global(snapshot: &CacheSnapshot) -> Vec<TweetPage> {
        snapshot.pages(&QueryKey::global_feed()).unwrap().to_vec()
    }

    #[test]
    fn like_patches_every_cached_page_set() {
        let before = snapshot();
        let after = reconcile(
            &before,
            &MutationResult::LikeToggled {
                tweet_id: Uuid::from_u128(5),
                added: true,
            },
        );

        let feed = global(&after);
        assert_eq!(feed[0].tweets[0].like_count, 3);
        assert!(feed[0].tweets[0].liked_by_me);
        assert_eq!(feed[0].tweets[1], before.pages(&QueryKey::global_feed()).unwrap()[0].tweets[1]);

        let profile_feed = after
            .pages(&QueryKey::ProfileFeed {
                user_id: Uuid::from_u128(100),
            })
            .unwrap();
        assert_eq!(profile_feed[0].tweets[0].like_count, 3);
        assert!(profile_feed[0].tweets[0].liked_by_me);
    }

    #[test]
    fn like_then_unlike_restores_snapshot() {
        let before = snapshot();
        let liked = reconcile(
            &before,
            &MutationResult::LikeToggled {
                tweet_id: Uuid::from_u128(3),
                added: true,
            },
        );
        let unliked = reconcile(
            &liked,
            &MutationResult::LikeToggled {
                tweet_id: Uuid::from_u128(3),
                added: false,
            },
        );
        assert_eq!(unliked, before);
    }

    #[test]
    fn repeated_confirmation_does_not_double_count() {
        let before = snapshot();
        let mutation = MutationResult::LikeToggled {
            tweet_id: Uuid::from_u128(9),
            added: true,
        };
        assert_eq!(reconcile(&before, &mutation), before);
    }

    #[test]
    fn unknown_tweet_leaves_cache_untouched() {
        let before = snapshot();
        let after = reconcile(
            &before,
            &MutationResult::LikeToggled {
                tweet_id: Uuid::from_u128(77),
                added: true,
            },
        );
        assert_eq!(after, before);
    }

    #[test]
    fn follow_updates_both_profiles() {
        let follower = Uuid::from_u128(1);
        let followed = Uuid::from_u128(2);
        let mut before = CacheSnapshot::default();
        before.insert(
            QueryKey::Profile { user_id: followed },
            CachedQuery::Profile(profile(false, 4, 0)),
        );
        before.insert(
            QueryKey::Profile { user_id: follower },
            CachedQuery::Profile(profile(false, 0, 7)),
        );

        let after = reconcile(
            &before,
            &MutationResult::FollowToggled {
                follower_id: follower,
                followed_id: followed,
                added: true,
            },
        );
        let target = after.profile(&QueryKey::Profile { user_id: followed }).unwrap();
        assert!(target.is_following);
        assert_eq!(target.follower_count, 5);
        assert_eq!(target.tweet_count, 3);
        let own = after.profile(&QueryKey::Profile { user_id: follower }).unwrap();
        assert_eq!(own.following_count, 8);

        let back = reconcile(
            &after,
            &MutationResult::FollowToggled {
                follower_id: follower,
                followed_id: followed,
                added: false,
            },
        );
        assert_eq!(back, before);
    }

    #[test]
    fn unfollow_never_goes_negative() {
        let follower = Uuid::from_u128(1);
        let followed = Uuid::from_u128(2);
        let mut before = CacheSnapshot::default();
        before.insert(
            QueryKey::Profile { user_id: followed },
            CachedQuery::Profile(profile(true, 0, 0)),
        );
        let after = reconcile(
            &before,
            &MutationResult::FollowToggled {
                follower_id: follower,
                followed_id: followed,
                added: false,
            },
        );
        let target = after.profile(&QueryKey::Profile { user_id: followed }).unwrap();
        assert!(!target.is_following);
        assert_eq!(target.follower_count, 0);
    }

    #[test]
    fn created_tweet_goes_to_top_of_global_feed_only() {
        let before = snapshot();
        let tweet = Tweet {
            id: Uuid::from_u128(42),
            user_id: Uuid::from_u128(100),
            content: "fresh".to_string(),
            created_at: Utc.timestamp_opt(200, 0).unwrap(),
        };
        let after = reconcile(
            &before,
            &MutationResult::TweetCreated {
                tweet: tweet.clone(),
                author: user(100),
            },
        );

        let feed = global(&after);
        assert_eq!(feed[0].tweets.len(), 3);
        let top = &feed[0].tweets[0];
        assert_eq!(top.id, tweet.id);
        assert_eq!(top.like_count, 0);
        assert!(!top.liked_by_me);
        assert_eq!(top.user, user(100));
        assert_eq!(feed[0].next_cursor, before.pages(&QueryKey::global_feed()).unwrap()[0].next_cursor);

        let key = QueryKey::ProfileFeed {
            user_id: Uuid::from_u128(100),
        };
        assert_eq!(after.get(&key), before.get(&key));
    }

    #[test]
    fn created_tweet_without_cached_feed_is_noop() {
        let before = CacheSnapshot::default();
        let after = reconcile(
            &before,
            &MutationResult::TweetCreated {
                tweet: Tweet {
                    id: Uuid::from_u128(42),
                    user_id: Uuid::from_u128(100),
                    content: "fresh".to_string(),
                    created_at: Utc::now(),
                },
                author: user(100),
            },
        );
        assert_eq!(after, before);
    }

    #[test]
    fn deleted_tweet_drops_from_pages_but_keeps_cursors() {
        let before = snapshot();
        let after = reconcile(
            &before,
            &MutationResult::TweetDeleted {
                tweet_id: Uuid::from_u128(3),
            },
        );
        let feed = global(&after);
        let ids: Vec<Uuid> = feed[0].tweets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(5)]);
        assert_eq!(
            feed[0].next_cursor,
            Some(FeedCursor {
                id: Uuid::from_u128(3),
                created_at: Utc.timestamp_opt(100, 0).unwrap(),
            })
        );
        assert_eq!(feed[1].tweets.len(), 1);
    }
}

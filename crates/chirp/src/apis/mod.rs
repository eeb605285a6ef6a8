use std::sync::Arc;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable};

use crate::AppState;

pub mod api_models;
pub mod middlewares;
pub mod profile_handlers;
pub mod tweet_handlers;
pub mod user_handlers;

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "tweets", description = "Feeds, tweets and likes"),
        (name = "profiles", description = "Profiles and profile feeds"),
        (name = "users", description = "Follow graph")
    )
)]
pub struct ApiDoc;

pub fn setup_routes() -> Router<Arc<AppState>> {
    let api_doc = ApiDoc::openapi();

    let tweet_router = OpenApiRouter::new()
        .routes(routes!(tweet_handlers::get_feed))
        .routes(routes!(tweet_handlers::create_tweet))
        .routes(routes!(tweet_handlers::delete_tweet))
        .routes(routes!(tweet_handlers::toggle_like));

    let profile_router = OpenApiRouter::new()
        .routes(routes!(profile_handlers::get_profile))
        .routes(routes!(profile_handlers::get_profile_feed));

    let user_router = OpenApiRouter::new().routes(routes!(user_handlers::toggle_follow));

    let profile_router =
        OpenApiRouter::with_openapi(api_doc.clone()).nest("/profiles", profile_router);
    let user_router = OpenApiRouter::with_openapi(api_doc.clone()).nest("/users", user_router);

    let router = OpenApiRouter::with_openapi(api_doc)
        .merge(tweet_router)
        .merge(profile_router)
        .merge(user_router);

    let (api_router, api_openapi) = OpenApiRouter::new()
        .nest("/api/v1", router)
        .split_for_parts();

    Router::new()
        .merge(Scalar::with_url("/docs", api_openapi))
        .route("/health", get(|| async { "ok" }))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build_router,
        models::users::User,
        repositories::memory::MemoryStore,
        services::{
            cache_service::InMemoryPageCache, feed_service::FeedService,
            profile_service::ProfileService, tweet_service::TweetService,
        },
        utils::pagination::PageLimits,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn setup() -> (Router, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let ana = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for (id, name) in [(ana, "ana"), (bob, "bob")] {
            store
                .insert_user(User {
                    id,
                    name: Some(name.to_string()),
                    image: None,
                    created_at: Utc::now(),
                })
                .await;
        }
        let profile_service =
            ProfileService::new(store.clone(), Arc::new(InMemoryPageCache::new()), 60);
        let state = AppState {
            feed_service: FeedService::new(store.clone(), PageLimits::default()),
            tweet_service: TweetService::new(store.clone(), profile_service.clone(), 280),
            profile_service,
        };
        (build_router(Arc::new(state)), ana, bob)
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
            None => Body::empty(),
        };
        let resp = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (r, _, _) = setup().await;
        let resp = r
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_callers() {
        let (r, _, bob) = setup().await;

        let (status, body) =
            send(&r, "POST", "/api/v1/tweets", None, Some(json!({ "content": "hi" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["type"], "UNAUTHORIZED");

        let uri = format!("/api/v1/users/{bob}/follow");
        let (status, _) = send(&r, "POST", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_user_header_is_rejected() {
        let (r, _, _) = setup().await;
        let req = Request::get("/api/v1/feed")
            .header("x-user-id", "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let resp = r.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_like_and_page_through_http() {
        let (r, ana, bob) = setup().await;

        let (status, created) = send(
            &r,
            "POST",
            "/api/v1/tweets",
            Some(ana),
            Some(json!({ "content": "first" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["userId"], ana.to_string());
        let tweet_id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/tweets/{tweet_id}/like");
        let (status, toggle) = send(&r, "POST", &uri, Some(bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggle, json!({ "added": true }));

        let (status, page) = send(&r, "GET", "/api/v1/feed?limit=5", Some(bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["tweets"][0]["id"], tweet_id);
        assert_eq!(page["tweets"][0]["likeCount"], 1);
        assert_eq!(page["tweets"][0]["likedByMe"], true);
        assert_eq!(page["tweets"][0]["user"]["name"], "ana");
        assert!(page.get("nextCursor").is_none());
    }

    #[tokio::test]
    async fn next_cursor_round_trips_through_query_string() {
        let (r, ana, _) = setup().await;
        for n in 0..3 {
            let body = json!({ "content": format!("tweet {n}") });
            send(&r, "POST", "/api/v1/tweets", Some(ana), Some(body)).await;
        }

        let (_, first) = send(&r, "GET", "/api/v1/feed?limit=2", None, None).await;
        assert_eq!(first["tweets"].as_array().unwrap().len(), 2);
        let cursor = &first["nextCursor"];
        let created_at: chrono::DateTime<Utc> =
            serde_json::from_value(cursor["createdAt"].clone()).unwrap();
        let uri = format!(
            "/api/v1/profiles/{ana}/tweets?limit=2&cursorId={}&cursorCreatedAt={}",
            cursor["id"].as_str().unwrap(),
            created_at.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
        );
        let (status, second) = send(&r, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["tweets"].as_array().unwrap().len(), 1);
        assert!(second.get("nextCursor").is_none());
    }

    #[tokio::test]
    async fn unknown_author_cannot_create_tweets() {
        let (r, _, _) = setup().await;
        let (status, body) = send(
            &r,
            "POST",
            "/api/v1/tweets",
            Some(Uuid::new_v4()),
            Some(json!({ "content": "ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["type"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn partial_cursor_is_a_bad_request() {
        let (r, _, _) = setup().await;
        let uri = format!("/api/v1/feed?cursorId={}", Uuid::new_v4());
        let (status, body) = send(&r, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn non_owner_delete_returns_false() {
        let (r, ana, bob) = setup().await;
        let (_, created) = send(
            &r,
            "POST",
            "/api/v1/tweets",
            Some(ana),
            Some(json!({ "content": "keep me" })),
        )
        .await;
        let uri = format!("/api/v1/tweets/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&r, "DELETE", &uri, Some(bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(false));

        let (_, body) = send(&r, "DELETE", &uri, Some(ana), None).await;
        assert_eq!(body, json!(true));
    }

    #[tokio::test]
    async fn profile_lookup_and_follow() {
        let (r, ana, bob) = setup().await;

        let (status, _) = send(
            &r,
            "GET",
            &format!("/api/v1/profiles/{}", Uuid::new_v4()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, toggle) =
            send(&r, "POST", &format!("/api/v1/users/{bob}/follow"), Some(ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggle, json!({ "added": true }));

        let (status, profile) =
            send(&r, "GET", &format!("/api/v1/profiles/{bob}"), Some(ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["isFollowing"], true);
        assert_eq!(profile["followerCount"], 1);
        assert_eq!(profile["followingCount"], 0);
        assert_eq!(profile["tweetCount"], 0);
    }
}

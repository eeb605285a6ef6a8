use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::{
    models::tweets::FeedCursor,
    utils::{errors::app_error::AppError, pagination::cursor_from_parts},
};

#[derive(Debug, Deserialize, Serialize, IntoParams, Default, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// Page size (default 10)
    pub limit: Option<u32>,
    /// Id of the last tweet of the previous page
    pub cursor_id: Option<uuid::Uuid>,
    /// Creation time of the last tweet of the previous page
    pub cursor_created_at: Option<DateTime<Utc>>,
    /// Only tweets from users the viewer follows
    #[serde(default)]
    pub only_following: bool,
}

impl FeedQuery {
    pub fn cursor(&self) -> Result<Option<FeedCursor>, AppError> {
        cursor_from_parts(self.cursor_id, self.cursor_created_at)
    }
}

#[derive(Debug, Deserialize, Serialize, IntoParams, Default, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProfileFeedQuery {
    /// Page size (default 10)
    pub limit: Option<u32>,
    pub cursor_id: Option<uuid::Uuid>,
    pub cursor_created_at: Option<DateTime<Utc>>,
}

impl ProfileFeedQuery {
    pub fn cursor(&self) -> Result<Option<FeedCursor>, AppError> {
        cursor_from_parts(self.cursor_id, self.cursor_created_at)
    }
}

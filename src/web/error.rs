use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::feed::FeedError;
use crate::reddit::ListingError;

/// A feed request that could not be answered with a feed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Listing(ListingError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Listing(ListingError::NotFound) | Self::Feed(_) => StatusCode::NOT_FOUND,
            Self::Listing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Feed request failed: {self}");
        }
        (status, self.to_string()).into_response()
    }
}

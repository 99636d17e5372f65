use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};

use crate::error::ListingError;
use crate::router::ListingState;

/// `true` when the requested image was missing and `default.jpg` was served.
pub const IMAGE_DEFAULT_HEADER: HeaderName = HeaderName::from_static("x-image-default");

/// GET /image/:imageFilename
pub async fn get_image(
    State(state): State<ListingState>,
    Path(filename): Path<String>,
) -> Result<Response, ListingError> {
    let served = state.images.load(&filename).await?;
    let defaulted = if served.defaulted {
        HeaderValue::from_static("true")
    } else {
        HeaderValue::from_static("false")
    };

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (IMAGE_DEFAULT_HEADER, defaulted),
        ],
        served.bytes,
    )
        .into_response())
}

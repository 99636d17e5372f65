use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ListingError;
use crate::service::items::{ImageSource, NewItem};

/// Raw fields as they arrive in an urlencoded body.
#[derive(Debug, Default, Deserialize)]
struct RawItemForm {
    name: Option<String>,
    category: Option<String>,
    image: Option<String>,
}

/// `POST /items` body, accepted as `application/x-www-form-urlencoded`
/// (`image` is a server-side path) or `multipart/form-data` (`image` is an
/// uploaded file part or a path).
#[derive(Debug)]
pub struct ItemForm(pub NewItem);

impl<S> FromRequest<S> for ItemForm
where
    S: Send + Sync,
{
    type Rejection = ListingError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        let item = if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| ListingError::MalformedForm(rejection.body_text()))?;
            read_multipart(multipart).await?
        } else {
            let Form(raw) = Form::<RawItemForm>::from_request(req, state)
                .await
                .map_err(|rejection| ListingError::MalformedForm(rejection.body_text()))?;
            NewItem {
                name: raw.name.ok_or(ListingError::MissingField("name"))?,
                category: raw.category.ok_or(ListingError::MissingField("category"))?,
                image: raw
                    .image
                    .map(|p| ImageSource::Path(PathBuf::from(p)))
                    .ok_or(ListingError::MissingField("image"))?,
            }
        };
        Ok(ItemForm(item))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<NewItem, ListingError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        ListingError::MalformedForm(e.body_text())
    };

    let mut name = None;
    let mut category = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(malformed)?),
            Some("category") => category = Some(field.text().await.map_err(malformed)?),
            Some("image") if field.file_name().is_some() => {
                // a file input with nothing selected sends `filename=""` and no bytes
                let selected = field.file_name().is_some_and(|f| !f.is_empty());
                let data = field.bytes().await.map_err(malformed)?;
                if selected && !data.is_empty() {
                    image = Some(ImageSource::Upload(data));
                }
            }
            Some("image") => {
                let path = field.text().await.map_err(malformed)?;
                image = Some(ImageSource::Path(PathBuf::from(path)));
            }
            _ => {}
        }
    }

    Ok(NewItem {
        name: name.ok_or(ListingError::MissingField("name"))?,
        category: category.ok_or(ListingError::MissingField("category"))?,
        image: image.ok_or(ListingError::MissingField("image"))?,
    })
}

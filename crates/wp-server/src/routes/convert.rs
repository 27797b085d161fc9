//! Image conversion route.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use wp_core::Error;
use wp_encoder::{convert_upload, Quality, UploadedImage};

use crate::context::AppContext;
use crate::error::{AppError, ErrorBody};

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";
/// Name of the optional quality parameter (query string or form field).
pub const QUALITY_FIELD: &str = "quality";

/// Query parameters for `POST /convert`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ConvertQuery {
    /// Encoder quality, an integer in 0..=100 (default 80).
    pub quality: Option<String>,
}

/// Multipart body of `POST /convert` (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct ConvertForm {
    /// The image to convert.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
    /// Encoder quality; the query parameter wins when both are given.
    quality: Option<String>,
}

/// Fields collected from the multipart body.
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<UploadedImage>,
    quality: Option<String>,
}

/// POST /convert
///
/// Converts the uploaded `image` to WebP and returns it as an attachment.
#[utoipa::path(
    post,
    path = "/convert",
    params(ConvertQuery),
    request_body(content = ConvertForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Converted image", content_type = "image/webp", body = Vec<u8>),
        (status = 400, description = "Missing image, invalid quality or malformed query", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "Encoder or filesystem failure", body = ErrorBody),
        (status = 504, description = "Encoder timed out", body = ErrorBody)
    )
)]
pub async fn convert(
    State(ctx): State<AppContext>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| {
        Error::InvalidInput(format!("invalid query string: {}", e.body_text()))
    })?;
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("not a multipart request: {e}");
        Error::InputMissing
    })?;

    let form = read_form(&mut multipart).await?;
    let upload = match form.image {
        Some(upload) if !upload.bytes.is_empty() => upload,
        _ => return Err(Error::InputMissing.into()),
    };

    let quality = match query.quality.or(form.quality) {
        Some(raw) => raw.parse::<Quality>()?,
        None => ctx.default_quality,
    };

    tracing::info!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        %quality,
        "received image"
    );

    let converted = convert_upload(
        ctx.converter.as_ref(),
        ctx.config.encoder.work_dir.as_deref(),
        upload,
        quality,
    )
    .await?;

    tracing::info!(
        filename = %converted.filename,
        size = converted.bytes.len(),
        "sending webp"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/webp")),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&converted.filename),
            ),
        ],
        converted.bytes,
    )
        .into_response())
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(IMAGE_FIELD) if form.image.is_none() => {
                let filename = field.file_name().map(str::to_owned).unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.image = Some(UploadedImage { filename, bytes });
            }
            Some(QUALITY_FIELD) => {
                form.quality = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        Error::InvalidInput(format!("invalid multipart body: {}", e.body_text()))
    }
}

/// `attachment; filename=<name>`, with characters that cannot appear in a
/// header value replaced by `_`.
fn content_disposition(filename: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("attachment; filename={filename}")).unwrap_or_else(|_| {
        let safe: String = filename
            .chars()
            .map(|c| if c.is_control() { '_' } else { c })
            .collect();
        HeaderValue::from_str(&format!("attachment; filename={safe}"))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
    })
}

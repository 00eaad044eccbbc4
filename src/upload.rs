/// Multipart and JSON submission handling for resource endpoints
///
/// Create/update requests arrive either as `multipart/form-data` (admin
/// forms with a file attached) or as plain JSON. Both decode into a
/// `Submission`: the text fields plus an optional staged image that has
/// already passed the allow-list and size checks. Writing the staged bytes
/// into the asset store is the service's job.
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Ceiling for an uploaded file and for any single text field value
pub const MAX_PART_BYTES: usize = 50 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A validated upload held in memory until the service stores it
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Form field the file arrived under
    pub field: String,
    /// Lowercased original extension
    pub extension: String,
    pub data: Vec<u8>,
}

/// Parsed request body: text fields plus at most one staged file
#[derive(Debug, Default)]
pub struct Submission {
    pub fields: Map<String, Value>,
    pub file: Option<StagedFile>,
}

impl Submission {
    /// Decode the collected text fields into a typed DTO
    pub fn decode<T: DeserializeOwned>(self) -> ApiResult<(T, Option<StagedFile>)> {
        let dto = serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| ApiError::Validation(format!("invalid request body: {}", e)))?;

        Ok((dto, self.file))
    }
}

/// Read a request body into a `Submission`
///
/// `file_field` names the one multipart field allowed to carry a file; a
/// file under any other name is rejected.
pub async fn read_submission(req: Request, file_field: &str) -> ApiResult<Submission> {
    if is_multipart(&req) {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::Validation(format!("invalid multipart request: {}", e)))?;

        read_multipart(multipart, file_field).await
    } else {
        let Json(value) = Json::<Value>::from_request(req, &())
            .await
            .map_err(|e| ApiError::Validation(format!("invalid JSON body: {}", e)))?;

        match value {
            Value::Object(fields) => Ok(Submission {
                fields,
                file: None,
            }),
            _ => Err(ApiError::Validation(
                "request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// Drain a multipart stream, staging the expected file field and collecting
/// the rest as text
pub async fn read_multipart(mut multipart: Multipart, file_field: &str) -> ApiResult<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(|s| s.to_string());

        if let Some(file_name) = file_name {
            if name != file_field {
                return Err(ApiError::Validation(format!(
                    "unexpected file field '{}', expected '{}'",
                    name, file_field
                )));
            }

            let content_type = field.content_type().map(|s| s.to_string());
            let extension = validate_image(&file_name, content_type.as_deref())?;

            let data = field.bytes().await.map_err(|e| {
                ApiError::Validation(format!("failed to read file field '{}': {}", name, e))
            })?;
            if data.len() > MAX_PART_BYTES {
                return Err(ApiError::PayloadTooLarge(format!(
                    "file exceeds the {} MiB upload limit",
                    MAX_PART_BYTES / (1024 * 1024)
                )));
            }

            submission.file = Some(StagedFile {
                field: name,
                extension,
                data: data.to_vec(),
            });
        } else {
            let text = field.text().await.map_err(|e| {
                ApiError::Validation(format!("failed to read field '{}': {}", name, e))
            })?;
            if text.len() > MAX_PART_BYTES {
                return Err(ApiError::PayloadTooLarge(format!(
                    "field '{}' exceeds the {} MiB limit",
                    name,
                    MAX_PART_BYTES / (1024 * 1024)
                )));
            }

            submission.fields.insert(name, Value::String(text));
        }
    }

    Ok(submission)
}

/// Stage the first file in a multipart stream regardless of field name
///
/// Used by the generic upload endpoint, where the field name only picks the
/// destination folder. Text fields are ignored.
pub async fn read_any_file(mut multipart: Multipart) -> ApiResult<Option<StagedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = match field.file_name() {
            Some(file_name) => file_name.to_string(),
            None => continue,
        };

        let content_type = field.content_type().map(|s| s.to_string());
        let extension = validate_image(&file_name, content_type.as_deref())?;

        let data = field.bytes().await.map_err(|e| {
            ApiError::Validation(format!("failed to read file field '{}': {}", name, e))
        })?;
        if data.len() > MAX_PART_BYTES {
            return Err(ApiError::PayloadTooLarge(format!(
                "file exceeds the {} MiB upload limit",
                MAX_PART_BYTES / (1024 * 1024)
            )));
        }

        return Ok(Some(StagedFile {
            field: name,
            extension,
            data: data.to_vec(),
        }));
    }

    Ok(None)
}

/// Check a file against the image allow-list; both the extension and the
/// declared MIME type must match. Returns the lowercased extension.
pub fn validate_image(file_name: &str, content_type: Option<&str>) -> ApiResult<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| {
            ApiError::Validation(format!("file '{}' has no extension", file_name))
        })?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::Validation(format!(
            "unsupported file type '.{}'; allowed: jpeg, jpg, png, webp",
            extension
        )));
    }

    let mime = content_type.unwrap_or_default().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(ApiError::Validation(format!(
            "unsupported content type '{}'",
            mime
        )));
    }

    Ok(extension)
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

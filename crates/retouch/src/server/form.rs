//! Multipart form parsing for `POST /api/enhance`.

use axum::extract::Multipart;
use retouch_core::{EnhanceParams, UpscaleFactor};

use super::error::ApiError;

/// A fully parsed enhance request.
#[derive(Debug)]
pub struct EnhanceForm {
    pub file: Vec<u8>,
    pub params: EnhanceParams,
}

impl EnhanceForm {
    /// Read every field of the form.
    ///
    /// `file` is required; `upscale`, `denoise` and `face_restore` fall back
    /// to their defaults when absent or empty. Unknown fields are ignored.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut file: Option<Vec<u8>> = None;
        let mut params = EnhanceParams::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    file = Some(field.bytes().await?.to_vec());
                }
                "upscale" => {
                    params.upscale = parse_upscale(&field.text().await?)?;
                }
                "denoise" => {
                    params.denoise = parse_bool("denoise", &field.text().await?)?;
                }
                "face_restore" => {
                    params.face_restore = parse_bool("face_restore", &field.text().await?)?;
                }
                other => {
                    tracing::debug!("Ignoring unknown form field {:?}", other);
                }
            }
        }

        let file = file.ok_or_else(|| ApiError::BadRequest("missing form field: file".into()))?;
        Ok(Self { file, params })
    }
}

/// Parse the `upscale` field. Only `2` enlarges; other integers are identity.
pub fn parse_upscale(value: &str) -> Result<UpscaleFactor, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(UpscaleFactor::default());
    }
    value
        .parse::<i64>()
        .map(UpscaleFactor::from_int)
        .map_err(|_| ApiError::BadRequest(format!("upscale must be an integer, got {value:?}")))
}

/// Parse a boolean form field the way HTML forms and most clients send them.
pub fn parse_bool(field: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "f" | "0" | "no" | "n" | "off" => Ok(false),
        "true" | "t" | "1" | "yes" | "y" | "on" => Ok(true),
        other => Err(ApiError::BadRequest(format!(
            "{field} must be a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upscale() {
        assert_eq!(parse_upscale("2").unwrap(), UpscaleFactor::X2);
        assert_eq!(parse_upscale(" 1 ").unwrap(), UpscaleFactor::X1);
        assert_eq!(parse_upscale("4").unwrap(), UpscaleFactor::X1);
        assert_eq!(parse_upscale("").unwrap(), UpscaleFactor::X1);
        assert!(parse_upscale("two").is_err());
        assert!(parse_upscale("2.0").is_err());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        for truthy in ["true", "TRUE", "t", "1", "yes", "Y", "On"] {
            assert!(parse_bool("denoise", truthy).unwrap(), "{truthy}");
        }
        for falsy in ["false", "False", "F", "0", "no", "n", "off", ""] {
            assert!(!parse_bool("denoise", falsy).unwrap(), "{falsy}");
        }
    }

    #[test]
    fn test_parse_bool_rejects_other_values() {
        let err = parse_bool("face_restore", "maybe").unwrap_err();
        assert!(err.to_string().contains("face_restore"));
        assert!(parse_bool("denoise", "2").is_err());
        assert!(parse_bool("denoise", "tru").is_err());
    }
}

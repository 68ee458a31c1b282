use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde_json::Value;

use super::error::BackendError;
use crate::gateway::IMAGE_FIELD;

/// A file received in the `image` part of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// FormPayload
///
/// Body of a write that may carry an image. Accepts either multipart (text
/// fields plus an optional `image` file) or a flat JSON object, and exposes
/// both as string fields.
#[derive(Debug, Default)]
pub struct FormPayload {
    fields: HashMap<String, String>,
    pub image: Option<UploadedFile>,
}

impl FormPayload {
    /// Trimmed value, with blank treated as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<String, BackendError> {
        self.text(name)
            .ok_or_else(|| BackendError::bad_request(format!("Please provide a {}", name)))
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, BackendError> {
        let mut payload = FormPayload::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BackendError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD && field.file_name().is_some() {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| BackendError::bad_request(e.body_text()))?;
                payload.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| BackendError::bad_request(e.body_text()))?;
                payload.fields.insert(name, value);
            }
        }
        Ok(payload)
    }

    fn from_json(value: Value) -> Result<Self, BackendError> {
        let Value::Object(map) = value else {
            return Err(BackendError::bad_request("Expected a JSON object"));
        };
        let fields = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        Ok(FormPayload {
            fields,
            image: None,
        })
    }
}

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| BackendError::bad_request(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| BackendError::bad_request(e.body_text()))?;
            Self::from_json(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_become_text_fields() {
        let payload = FormPayload::from_json(json!({
            "title": " Gala ",
            "order": 3,
            "isActive": false,
            "caption": null,
            "venue": ""
        }))
        .unwrap();

        assert_eq!(payload.text("title").as_deref(), Some("Gala"));
        assert_eq!(payload.text("order").as_deref(), Some("3"));
        assert_eq!(payload.text("isActive").as_deref(), Some("false"));
        assert!(payload.text("caption").is_none());
        assert!(payload.text("venue").is_none());
        assert!(payload.require("venue").is_err());
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(FormPayload::from_json(json!(["a"])).is_err());
    }
}

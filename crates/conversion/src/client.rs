//! HTTP client for the conversion backend
//!
//! Two endpoints: `POST /upload` takes a multipart form (`file`, `type`) and
//! answers with the ids of the stored original and converted files;
//! `GET /download/{id}` returns a stored file. Each call is made once, with
//! no automatic retries.

use crate::{
    Artifact, ClientConfig, ConversionError, ConversionType, DownloadLinks, Result, UploadFile,
    UploadResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    base: Url,
}

impl ConversionClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim()).map_err(|err| {
            ConversionError::InvalidUrl(format!("'{}': {}", config.base_url, err))
        })?;
        if base.cannot_be_a_base() {
            return Err(ConversionError::InvalidUrl(format!(
                "'{}' cannot be used as a service base",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConversionError::Network)?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Service URL with `segments` appended to the base path. Segments are
    /// percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ConversionError::InvalidUrl(format!("'{}' cannot be used as a service base", self.base))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    pub fn download_url(&self, id: &str) -> Result<Url> {
        self.endpoint(&["download", id])
    }

    /// Download links for both files named in an upload response
    pub fn links(&self, response: &UploadResponse) -> Result<DownloadLinks> {
        Ok(DownloadLinks {
            original: self.download_url(&response.original_id)?,
            converted: self.download_url(&response.converted_id)?,
        })
    }

    /// Upload a file for conversion
    pub async fn submit(&self, file: UploadFile, kind: ConversionType) -> Result<UploadResponse> {
        let url = self.endpoint(&["upload"])?;
        debug!(%url, file = %file.file_name, size = file.bytes.len(), %kind, "submitting conversion");

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|_| {
                ConversionError::InvalidUpload(format!(
                    "unsupported content type '{}'",
                    file.content_type
                ))
            })?;
        let form = Form::new().part("file", part).text("type", kind.as_str());

        let res = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ConversionError::Network)?;
        let res = ensure_success(res, "Upload").await?;
        let body = res.bytes().await.map_err(ConversionError::Network)?;
        serde_json::from_slice(&body).map_err(|err| ConversionError::InvalidResponse(err.to_string()))
    }

    /// Fetch a stored file. An empty body is an error.
    pub async fn fetch_artifact(&self, id: &str) -> Result<Artifact> {
        let url = self.download_url(id)?;
        debug!(%url, "fetching artifact");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ConversionError::Network)?;
        let res = ensure_success(res, "Download").await?;
        let bytes = res.bytes().await.map_err(ConversionError::Network)?;
        Artifact::new(id, bytes)
    }

    /// Upload a file and return links to the original and converted copies
    pub async fn convert(&self, file: UploadFile, kind: ConversionType) -> Result<DownloadLinks> {
        let response = self.submit(file, kind).await?;
        self.links(&response)
    }
}

async fn ensure_success(res: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    warn!(%status, %message, "{} failed", action);
    Err(ConversionError::ConversionRequest {
        status: status.as_u16(),
        message,
    })
}

/// Prefer the backend's JSON `error` field, then the raw body, then the
/// status reason
fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ConversionClient {
        ConversionClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn test_error_message_prefers_json_error_field() {
        let message = error_message_for_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Unsupported file"}"#,
        );
        assert_eq!(message, "Unsupported file");
    }

    #[test]
    fn test_error_message_uses_reason_for_empty_body() {
        let message = error_message_for_response(StatusCode::BAD_REQUEST, "  ");
        assert_eq!(message, "Bad Request");
        assert_eq!(
            error_message_for_response(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(
            c.endpoint(&["upload"]).unwrap().as_str(),
            "http://localhost:5000/api/upload"
        );
        assert_eq!(
            c.download_url("a b/c").unwrap().as_str(),
            "http://localhost:5000/api/download/a%20b%2Fc"
        );
    }

    #[test]
    fn test_links() {
        let c = client("http://127.0.0.1:5000");
        let links = c
            .links(&UploadResponse {
                original_id: "a".into(),
                converted_id: "b".into(),
            })
            .unwrap();
        assert_eq!(links.original.as_str(), "http://127.0.0.1:5000/download/a");
        assert_eq!(links.converted.as_str(), "http://127.0.0.1:5000/download/b");
    }

    #[tokio::test]
    async fn test_bad_content_type_is_rejected_locally() {
        // Nothing listens on the discard port; the request must never be sent
        let c = client("http://127.0.0.1:9");
        let file = UploadFile::new("notes.txt", "not a mime type", b"hello".to_vec());
        let err = c.submit(file, ConversionType::TextToDocx).await.unwrap_err();
        assert!(matches!(err, ConversionError::InvalidUpload(_)), "{err:?}");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ConversionClient::new(&ClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidUrl(_)));
        let err = ConversionClient::new(&ClientConfig::new("mailto:x@y.z")).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidUrl(_)));
    }
}

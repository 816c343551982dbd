use std::io::Read;
use std::time::Duration;

use crate::config::UploadConfig;
use crate::foundation::error::{MockupError, MockupResult};

/// Default ImgBB upload endpoint.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

const UPLOAD_FILENAME: &str = "mockup.png";
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

/// A hosted copy of the mockup image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedImage {
    /// Publicly fetchable URL.
    pub url: String,
    /// Host-side identifier of the image.
    pub asset_id: Option<String>,
    /// URL or token that removes the hosted image.
    pub delete_ref: Option<String>,
}

/// Remote image host.
///
/// Implementations block the calling thread until the host answers or times out. Any
/// failure is reported as [`MockupError::Upload`]; the serializer then falls back to an
/// inline copy.
pub trait ImageUploader: Send + Sync {
    /// Upload one PNG file.
    fn upload(&self, png: &[u8]) -> MockupResult<UploadedImage>;
}

/// ImgBB-compatible uploader speaking `multipart/form-data` over HTTPS.
#[derive(Clone)]
pub struct ImgbbUploader {
    endpoint: String,
    api_key: String,
    agent: ureq::Agent,
}

impl ImgbbUploader {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            agent,
        }
    }

    pub fn from_config(cfg: &UploadConfig) -> MockupResult<Self> {
        let api_key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MockupError::validation("upload.apiKey is not configured"))?;
        Ok(Self::new(
            cfg.endpoint.clone(),
            api_key,
            Duration::from_secs(cfg.timeout_secs),
        ))
    }
}

impl std::fmt::Debug for ImgbbUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImgbbUploader")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ImageUploader for ImgbbUploader {
    #[tracing::instrument(skip(self, png), fields(endpoint = %self.endpoint, len = png.len()))]
    fn upload(&self, png: &[u8]) -> MockupResult<UploadedImage> {
        let boundary = format!("mockup-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, &self.api_key, png);

        let response = match self
            .agent
            .post(&self.endpoint)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .send_bytes(&body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                // ImgBB explains rejections in the body; prefer that message.
                let detail = read_body(resp)
                    .ok()
                    .and_then(|b| parse_imgbb_response(&b).err())
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no error detail".to_string());
                return Err(MockupError::upload(format!("HTTP {code}: {detail}")));
            }
            Err(err) => return Err(MockupError::upload(format!("transport: {err}"))),
        };

        let text = read_body(response)?;
        let uploaded = parse_imgbb_response(&text)?;
        tracing::debug!(url = %uploaded.url, "mockup uploaded");
        Ok(uploaded)
    }
}

/// Uploader for hosts with no network access. Every save takes the inline fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineUploader;

impl ImageUploader for OfflineUploader {
    fn upload(&self, _png: &[u8]) -> MockupResult<UploadedImage> {
        Err(MockupError::upload("offline"))
    }
}

fn read_body(resp: ureq::Response) -> MockupResult<String> {
    let mut text = String::new();
    resp.into_reader()
        .take(MAX_RESPONSE_BYTES)
        .read_to_string(&mut text)
        .map_err(|e| MockupError::upload(format!("read response body: {e}")))?;
    Ok(text)
}

/// Build the two-part form: the API `key` and the `image` file.
pub(crate) fn multipart_body(boundary: &str, api_key: &str, png: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(png.len() + api_key.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"key\"\r\n\r\n{api_key}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{UPLOAD_FILENAME}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(png);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[derive(serde::Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgbbData>,
    error: Option<ImgbbErrorBody>,
}

#[derive(serde::Deserialize)]
struct ImgbbData {
    id: Option<String>,
    display_url: String,
    delete_url: Option<String>,
}

#[derive(serde::Deserialize)]
struct ImgbbErrorBody {
    message: Option<String>,
}

pub(crate) fn parse_imgbb_response(body: &str) -> MockupResult<UploadedImage> {
    let parsed: ImgbbResponse = serde_json::from_str(body)
        .map_err(|e| MockupError::upload(format!("malformed host response: {e}")))?;
    match (parsed.success, parsed.data) {
        (true, Some(data)) => Ok(UploadedImage {
            url: data.display_url,
            asset_id: data.id,
            delete_ref: data.delete_url,
        }),
        _ => {
            let message = parsed
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            Err(MockupError::upload(format!("host rejected image: {message}")))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/upload.rs"]
mod tests;

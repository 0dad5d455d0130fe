use engine_logging::{engine_debug, engine_info, engine_warn};
use quizzora_core::{FileInput, QuizOutcome, SubmissionOutcome, TaskStatus, UploadInput};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::wire::{decode_quiz, decode_status, decode_submission};
use crate::{EngineError, EngineSettings, FailureKind, TransportError};

/// The three round trips the client makes against the summarization backend.
///
/// Backend-reported failures come back inside the outcome types; `Err` is
/// reserved for round trips that produced no usable answer at all.
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    /// One submission: multipart upload for files, JSON for links.
    async fn submit(&self, input: &UploadInput) -> Result<SubmissionOutcome, TransportError>;

    /// One status request for a task.
    async fn status(&self, task_id: &str) -> Result<TaskStatus, TransportError>;

    /// One quiz request for a topic against the given summary.
    async fn generate_quiz(&self, summary: &str, topic: &str)
        -> Result<QuizOutcome, TransportError>;
}

#[derive(Serialize)]
struct LinkBody<'a> {
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    client: reqwest::Client,
    settings: EngineSettings,
}

impl ReqwestBackend {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let base = parse_base_url(&settings.backend_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            base,
            client,
            settings,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base.join(path).map_err(|err| {
            TransportError::new(FailureKind::Network, format!("invalid endpoint {path}: {err}"))
        })
    }

    fn status_url(&self, task_id: &str) -> Result<Url, TransportError> {
        let mut url = self.endpoint("api/status/")?;
        url.path_segments_mut()
            .map_err(|()| {
                TransportError::new(FailureKind::Network, "backend url cannot carry a path")
            })?
            .pop_if_empty()
            .push(task_id);
        Ok(url)
    }

    /// Sends the request and decodes the body as JSON whatever the HTTP
    /// status, since the backend reports failures in JSON on 4xx/5xx too.
    async fn send(&self, request: RequestBuilder) -> Result<Value, TransportError> {
        let response = request.send().await.map_err(|err| self.map_error(err))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| self.map_error(err))?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => {
                if !status.is_success() {
                    engine_debug!("Backend answered HTTP {status} with a JSON body");
                }
                Ok(value)
            }
            Err(err) if status.is_success() => Err(TransportError::new(
                FailureKind::InvalidBody,
                format!("The backend at {} returned an unreadable response: {err}", self.base),
            )),
            Err(_) => Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("The backend at {} answered with HTTP {status}.", self.base),
            )),
        }
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        engine_warn!("Request to backend failed: {err}");
        if err.is_timeout() {
            return TransportError::new(
                FailureKind::Timeout,
                format!("The backend at {} did not answer in time.", self.base),
            );
        }
        let kind = if err.is_connect() {
            FailureKind::Connect
        } else {
            FailureKind::Network
        };
        TransportError::new(
            kind,
            format!(
                "Cannot reach the backend at {}. Please ensure the backend server is running.",
                self.base
            ),
        )
    }
}

#[async_trait::async_trait]
impl BackendClient for ReqwestBackend {
    async fn submit(&self, input: &UploadInput) -> Result<SubmissionOutcome, TransportError> {
        let request = match input {
            UploadInput::Link { url } => {
                engine_info!("Submitting link {}", url.trim());
                self.client
                    .post(self.endpoint("api/youtube")?)
                    .json(&LinkBody { url: url.trim() })
            }
            UploadInput::File(file) => {
                engine_info!("Uploading {} ({} bytes)", file.name, file.size_bytes);
                let form = Form::new().part("file", file_part(file));
                self.client
                    .post(self.endpoint("api/upload")?)
                    .multipart(form)
                    .timeout(self.settings.upload_timeout)
            }
        };
        let body = self.send(request).await?;
        Ok(decode_submission(&body))
    }

    async fn status(&self, task_id: &str) -> Result<TaskStatus, TransportError> {
        let body = self.send(self.client.get(self.status_url(task_id)?)).await?;
        Ok(decode_status(&body))
    }

    async fn generate_quiz(
        &self,
        summary: &str,
        topic: &str,
    ) -> Result<QuizOutcome, TransportError> {
        engine_info!("Requesting quiz on {topic:?}");
        let form = Form::new()
            .text("topic", topic.to_string())
            .text("summary", summary.to_string());
        let request = self
            .client
            .post(self.endpoint("api/generate_quiz")?)
            .multipart(form)
            .timeout(self.settings.quiz_timeout);
        let body = self.send(request).await?;
        Ok(decode_quiz(&body))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, EngineError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|source| EngineError::InvalidBackendUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(EngineError::UnsupportedBackendUrl(raw.to_string()));
    }
    Ok(url)
}

fn file_part(file: &FileInput) -> Part {
    let part = || {
        Part::stream_with_length(Body::from(file.bytes.clone()), file.size_bytes)
            .file_name(file.name.clone())
    };
    if file.mime_type.trim().is_empty() {
        return part();
    }
    part().mime_str(&file.mime_type).unwrap_or_else(|err| {
        engine_debug!("Ignoring MIME type {:?}: {err}", file.mime_type);
        part()
    })
}

#[cfg(test)]
mod tests {
    use super::parse_base_url;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = parse_base_url("http://localhost:8000/prefix").unwrap();
        assert_eq!(url.join("api/upload").unwrap().path(), "/prefix/api/upload");
        let url = parse_base_url("http://localhost:8000").unwrap();
        assert_eq!(url.join("api/upload").unwrap().path(), "/api/upload");
    }

    #[test]
    fn base_url_must_parse() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }
}

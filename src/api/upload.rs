use super::client::ApiClient;
use super::error::ApiError;
use futures::stream;
use serde_json::Value;
use uuid::Uuid;

const CHUNK_SIZE: usize = 64 * 1024;

/// Multipart payload assembled locally so the total byte count is known
/// before the transfer starts. That is what makes percent-based progress
/// possible on this path; the plain `upload` hands framing to reqwest and
/// gets no byte visibility in exchange.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: Vec<(String, String)>,
    file: Option<FilePart>,
}

#[derive(Debug)]
struct FilePart {
    field: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.file = Some(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    fn encode(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    boundary, name, value
                )
                .as_bytes(),
            );
        }
        if let Some(file) = &self.file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    boundary, file.field, file.file_name, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(&file.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        body
    }
}

impl ApiClient {
    /// Upload variant that reports transfer progress. The encoded body is
    /// streamed in fixed-size chunks and `on_progress` receives
    /// `floor(sent / total * 100)` as each chunk is handed to the transport,
    /// so successive values never decrease and the last one is 100. The
    /// callback is never invoked after the call resolves.
    pub async fn upload_with_progress<F>(
        &self,
        path: &str,
        form: UploadForm,
        on_progress: F,
    ) -> Result<Value, ApiError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let boundary = format!("teamflow-{}", Uuid::new_v4());
        let body = form.encode(&boundary);
        let total = body.len() as u64;

        let chunks: Vec<Vec<u8>> = body.chunks(CHUNK_SIZE).map(|c| c.to_vec()).collect();
        let mut sent: u64 = 0;
        let counted = stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            let percent = if total == 0 {
                100
            } else {
                (sent * 100 / total) as u8
            };
            on_progress(percent);
            Ok::<Vec<u8>, std::io::Error>(chunk)
        }));

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .post(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .header(reqwest::header::CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(counted));
        if let Some(token) = self.credentials.token().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::into_outcome(response).await
    }
}

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use avatrope_types::{config::ApiConfig, credentials::Credentials, AvatropeError, Result};
use reqwest::{
    header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
    Request,
};
use tracing::{debug, info};
use url::Url;

use crate::{
    multipart::{build_multipart_body, FormField, FormValue},
    oauth::OAuthSigner,
    upload_error,
};

/// Result of one publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted { status: u16, body: String },
    Skipped,
}

#[async_trait]
pub trait ProfilePublisher: Send + Sync {
    async fn update_profile_image(&self, image_path: &Path) -> Result<UploadOutcome>;
    async fn update_status(&self, status: &str) -> Result<UploadOutcome>;
}

/// Publisher that talks to the remote API with OAuth-signed requests.
pub struct HttpPublisher {
    client: reqwest::Client,
    signer: OAuthSigner,
    profile_image_url: Url,
    status_url: Url,
}

impl HttpPublisher {
    pub fn new(api: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|err| upload_error(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            signer: OAuthSigner::new(credentials),
            profile_image_url: parse_endpoint(&api.profile_image_url)?,
            status_url: parse_endpoint(&api.status_url)?,
        })
    }

    /// Multipart POST carrying the image as its only field.
    pub fn profile_image_request(&self, image_path: &Path) -> Result<Request> {
        let fields = [FormField::new("image", FormValue::read_file(image_path)?)];
        let body = build_multipart_body(&fields);
        // multipart payload bytes never enter the signature
        let authorization = self
            .signer
            .authorization("POST", &self.profile_image_url, &[])?;
        self.client
            .post(self.profile_image_url.clone())
            .header(CONTENT_TYPE, body.content_type())
            .header(CONTENT_LENGTH, body.content_length())
            .header(AUTHORIZATION, authorization)
            .body(body.into_bytes())
            .build()
            .map_err(|err| upload_error(format!("failed to build image request: {err}")))
    }

    /// Form-encoded POST with a single `status` field.
    pub fn status_request(&self, status: &str) -> Result<Request> {
        let params = vec![("status".to_string(), status.to_string())];
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        let authorization = self.signer.authorization("POST", &self.status_url, &params)?;
        self.client
            .post(self.status_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(AUTHORIZATION, authorization)
            .body(body)
            .build()
            .map_err(|err| upload_error(format!("failed to build status request: {err}")))
    }

    async fn execute(&self, label: &str, request: Request) -> Result<UploadOutcome> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| upload_error(format!("{label} request failed: {err}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| upload_error(format!("{label} response unreadable: {err}")))?;
        debug!("{label} response ({status}):\n{}", pretty_body(&body));

        if !status.is_success() {
            return Err(AvatropeError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(UploadOutcome::Accepted {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ProfilePublisher for HttpPublisher {
    async fn update_profile_image(&self, image_path: &Path) -> Result<UploadOutcome> {
        info!("Uploading new profile picture from {:?}", image_path);
        let request = self.profile_image_request(image_path)?;
        self.execute("profile image", request).await
    }

    async fn update_status(&self, status: &str) -> Result<UploadOutcome> {
        info!("Posting status: {status}");
        let request = self.status_request(status)?;
        self.execute("status", request).await
    }
}

/// Stand-in used by pretend runs; never touches the network.
#[derive(Debug, Default, Clone)]
pub struct DryRunPublisher;

impl DryRunPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProfilePublisher for DryRunPublisher {
    async fn update_profile_image(&self, image_path: &Path) -> Result<UploadOutcome> {
        info!("Pretend mode: skipping upload of {:?}", image_path);
        Ok(UploadOutcome::Skipped)
    }

    async fn update_status(&self, status: &str) -> Result<UploadOutcome> {
        info!("Pretend mode: skipping status '{status}'");
        Ok(UploadOutcome::Skipped)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .map_err(|err| AvatropeError::Configuration(format!("invalid endpoint '{raw}': {err}")))
}

/// Pretty-prints JSON bodies, passes anything else through.
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn publisher() -> HttpPublisher {
        let api = ApiConfig {
            profile_image_url: "https://api.example.test/1.1/account/update_profile_image.json"
                .into(),
            status_url: "https://api.example.test/1.1/statuses/update.json".into(),
            timeout_secs: 5,
        };
        let credentials = Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            token: "tk".into(),
            token_secret: "ts".into(),
        };
        HttpPublisher::new(&api, credentials).expect("publisher")
    }

    fn header(request: &Request, name: reqwest::header::HeaderName) -> String {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn image_request_is_signed_multipart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("frame_42.png");
        fs::write(&path, b"ABC").unwrap();

        let request = publisher().profile_image_request(&path).expect("request");
        assert_eq!(request.method(), &reqwest::Method::POST);
        assert!(request.url().path().ends_with("update_profile_image.json"));

        let content_type = header(&request, CONTENT_TYPE);
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("multipart content type");
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .expect("buffered body");
        assert_eq!(header(&request, CONTENT_LENGTH), body.len().to_string());

        let text = String::from_utf8_lossy(body);
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("name=\"image\"; filename=\"frame_42.png\""));
        assert!(text.contains("Content-Type: image/png\r\n\r\nABC\r\n"));

        let auth = header(&request, AUTHORIZATION);
        assert!(auth.starts_with("OAuth "));
        assert!(auth.contains("oauth_token=\"tk\""));
        assert!(auth.contains("oauth_signature="));
    }

    #[test]
    fn status_request_is_form_encoded() {
        let request = publisher().status_request("ding: 17").expect("request");
        assert_eq!(
            header(&request, CONTENT_TYPE),
            "application/x-www-form-urlencoded"
        );
        let body = request.body().and_then(|b| b.as_bytes()).expect("body");
        assert_eq!(body, b"status=ding%3A+17");
        assert!(header(&request, AUTHORIZATION).contains("oauth_consumer_key=\"ck\""));
    }

    #[test]
    fn missing_image_is_an_upload_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = publisher()
            .profile_image_request(&dir.path().join("absent.png"))
            .unwrap_err();
        assert!(matches!(err, AvatropeError::Upload(_)));
    }

    #[test]
    fn bad_endpoint_is_rejected_at_construction() {
        let api = ApiConfig {
            profile_image_url: "not a url".into(),
            status_url: "https://api.example.test/status".into(),
            timeout_secs: 5,
        };
        let credentials = Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            token: "tk".into(),
            token_secret: "ts".into(),
        };
        assert!(matches!(
            HttpPublisher::new(&api, credentials),
            Err(AvatropeError::Configuration(_))
        ));
    }

    #[test]
    fn pretty_body_formats_json_only() {
        assert_eq!(pretty_body("plain"), "plain");
        assert_eq!(pretty_body("{\"a\":1}"), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn dry_run_never_publishes() {
        let publisher = DryRunPublisher::new();
        let image = publisher
            .update_profile_image(Path::new("img/frame_1.png"))
            .await
            .unwrap();
        let status = publisher.update_status("hi").await.unwrap();
        assert_eq!(image, UploadOutcome::Skipped);
        assert_eq!(status, UploadOutcome::Skipped);
    }
}

//! S3 upload of synthesized audio.
//!
//! Plain signed PUT to the bucket's virtual-hosted endpoint. Writes are
//! idempotent per key: re-running a batch with the same key overwrites
//! the previous object.

use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::info;

use crate::config::StorageConfig;
use crate::error::{PipelineError, Result};
use crate::sigv4::{uri_encode, RequestSigner};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Where an uploaded object ended up.
#[derive(Debug, Clone)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

pub struct S3Uploader {
    client: Client,
    signer: RequestSigner,
    bucket: String,
    region: String,
}

impl S3Uploader {
    pub fn new(signer: RequestSigner, region: &str, bucket: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            signer,
            bucket: bucket.to_string(),
            region: region.to_string(),
        }
    }

    /// Upload `audio` under `key`, returning the object location.
    pub async fn put_object(&self, key: &str, audio: &[u8]) -> Result<S3Location> {
        let resp = self
            .build_request(key, audio.to_vec(), Utc::now())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                service: "S3",
                status: status.as_u16(),
                message,
            });
        }

        let location = S3Location {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            url: self.object_url(key).to_string(),
        };
        info!("Uploaded s3://{}/{}", location.bucket, location.key);
        Ok(location)
    }

    fn object_url(&self, key: &str) -> reqwest::Url {
        let url = format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket,
            self.region,
            uri_encode(key, false)
        );
        reqwest::Url::parse(&url).expect("valid S3 object URL")
    }

    fn build_request(&self, key: &str, audio: Vec<u8>, now: DateTime<Utc>) -> reqwest::RequestBuilder {
        let url = self.object_url(key);
        let signed = self.signer.sign(
            "PUT",
            &url,
            &[("content-type", AUDIO_CONTENT_TYPE)],
            &audio,
            now,
        );

        let mut req = self
            .client
            .put(url)
            .header("Content-Type", AUDIO_CONTENT_TYPE)
            .body(audio);
        for (name, value) in signed {
            req = req.header(name, value);
        }
        req
    }
}

/// Derive the object key for a source file. A configured fixed output
/// name wins (the key is then identical across runs and files);
/// otherwise the key follows the source file's stem.
pub fn object_key(source: &Path, storage: &StorageConfig) -> String {
    let name = if storage.output_name.is_empty() {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        format!("{stem}.mp3")
    } else {
        storage.output_name.clone()
    };

    if storage.prefix.is_empty() {
        name
    } else {
        format!("{}/{name}", storage.prefix.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigv4::Credentials;
    use chrono::TimeZone;

    fn storage(output_name: &str) -> StorageConfig {
        StorageConfig {
            bucket: "voice-artifacts".into(),
            prefix: "audio".into(),
            output_name: output_name.into(),
        }
    }

    #[test]
    fn key_follows_source_stem_by_default() {
        let key = object_key(Path::new("text/welcome.txt"), &storage(""));
        assert_eq!(key, "audio/welcome.mp3");
    }

    #[test]
    fn fixed_output_name_yields_stable_key() {
        let storage = storage("output.mp3");
        let first = object_key(Path::new("text/welcome.txt"), &storage);
        let second = object_key(Path::new("text/other.txt"), &storage);
        assert_eq!(first, "audio/output.mp3");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_prefix_puts_objects_at_bucket_root() {
        let storage = StorageConfig {
            bucket: "b".into(),
            prefix: String::new(),
            output_name: String::new(),
        };
        assert_eq!(object_key(Path::new("text/a.txt"), &storage), "a.mp3");
    }

    #[tokio::test]
    async fn put_request_is_signed_for_virtual_hosted_url() {
        let signer = RequestSigner::new(
            Credentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            },
            "us-east-1",
            "s3",
        );
        let uploader = S3Uploader::new(signer, "us-east-1", "voice-artifacts");
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();

        let request = uploader
            .build_request("audio/welcome.mp3", b"mp3 bytes".to_vec(), now)
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://voice-artifacts.s3.us-east-1.amazonaws.com/audio/welcome.mp3"
        );
        assert_eq!(request.method(), "PUT");

        let headers = request.headers();
        assert_eq!(headers.get("content-type").unwrap(), "audio/mpeg");
        assert!(headers.get("x-amz-content-sha256").is_some());
        let auth = headers.get("authorization").unwrap().to_str().unwrap();
        assert!(auth.contains("/us-east-1/s3/aws4_request"));
    }

    #[tokio::test]
    async fn keys_with_spaces_are_percent_encoded_in_url() {
        let signer = RequestSigner::new(
            Credentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            },
            "us-east-1",
            "s3",
        );
        let uploader = S3Uploader::new(signer, "us-east-1", "voice-artifacts");
        let url = uploader.object_url("audio/my file.mp3");
        assert_eq!(
            url.as_str(),
            "https://voice-artifacts.s3.us-east-1.amazonaws.com/audio/my%20file.mp3"
        );
    }
}

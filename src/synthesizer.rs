//! Amazon Polly synthesis client.
//!
//! One HTTPS call per file: POST /v1/speech with the text and voice,
//! SigV4-signed, MP3 bytes back. Any failure propagates and aborts the
//! batch.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::sigv4::RequestSigner;
use crate::voice::Voice;

pub struct PollyClient {
    client: Client,
    signer: RequestSigner,
    endpoint: reqwest::Url,
}

impl PollyClient {
    pub fn new(signer: RequestSigner, region: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let endpoint = reqwest::Url::parse(&format!(
            "https://polly.{region}.amazonaws.com/v1/speech"
        ))
        .expect("valid Polly endpoint");

        Self {
            client,
            signer,
            endpoint,
        }
    }

    /// Synthesize `text` with the given voice, returning MP3 bytes.
    pub async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>> {
        debug!("Synthesizing {} chars with voice {voice}", text.chars().count());

        let resp = self.build_request(text, voice, Utc::now()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                service: "Polly",
                status: status.as_u16(),
                message,
            });
        }

        let audio = resp.bytes().await?.to_vec();
        info!("Polly returned {} bytes of audio", audio.len());
        Ok(audio)
    }

    /// Build the signed request. Split out so the URL, headers and body
    /// can be asserted without touching the network.
    fn build_request(&self, text: &str, voice: Voice, now: DateTime<Utc>) -> reqwest::RequestBuilder {
        let body = serde_json::to_vec(&json!({
            "OutputFormat": "mp3",
            "Text": text,
            "VoiceId": voice.as_str(),
        }))
        .expect("JSON body serializes");

        let signed = self.signer.sign(
            "POST",
            &self.endpoint,
            &[("content-type", "application/json")],
            &body,
            now,
        );

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .body(body);
        for (name, value) in signed {
            req = req.header(name, value);
        }
        req
    }
}

//! Sequential conversion pipeline: read, synthesize, upload, record.
//!
//! One pass over the batch, aborting on first failure. Failed jobs
//! produce no result entry and no results file is written for an
//! aborted batch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::reporter::ConversionResult;
use crate::sigv4::{Credentials, RequestSigner};
use crate::synthesizer::PollyClient;
use crate::uploader::{object_key, S3Location, S3Uploader};
use crate::voice::Voice;

pub struct Pipeline {
    polly: PollyClient,
    uploader: S3Uploader,
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config, credentials: Credentials) -> Result<Self> {
        if config.storage.bucket.is_empty() {
            return Err(PipelineError::MissingBucket);
        }

        let region = config.aws.region.clone();
        let polly = PollyClient::new(
            RequestSigner::new(credentials.clone(), &region, "polly"),
            &region,
        );
        let uploader = S3Uploader::new(
            RequestSigner::new(credentials, &region, "s3"),
            &region,
            &config.storage.bucket,
        );

        Ok(Self {
            polly,
            uploader,
            config,
        })
    }

    /// Convert and upload every file in order. An empty batch is a
    /// no-op: no API calls, no local artifacts.
    pub async fn run(&self, files: &[PathBuf], voice: Voice) -> Result<Vec<ConversionResult>> {
        if files.is_empty() {
            info!("No files to convert, nothing to do");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.convert(file, voice).await?);
        }
        Ok(results)
    }

    async fn convert(&self, source: &Path, voice: Voice) -> Result<ConversionResult> {
        let text = fs::read_to_string(source).map_err(|e| PipelineError::ReadInput {
            path: source.to_path_buf(),
            source: e,
        })?;

        let audio = self.polly.synthesize(&text, voice).await?;

        let key = object_key(source, &self.config.storage);
        let audio_file = local_audio_path(&self.config.report.audio_dir, &key);
        if let Some(parent) = audio_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&audio_file, &audio)?;

        let location = self.uploader.put_object(&key, &audio).await?;
        let result = build_result(source, &text, voice, &audio_file, &location);
        info!(
            "Converted {} ({} chars, voice {voice}) -> s3://{}/{}",
            source.display(),
            result.character_count,
            location.bucket,
            location.key
        );
        Ok(result)
    }
}

/// Assemble the record for one converted file. Character count follows
/// Polly's billing unit: Unicode characters, not bytes.
fn build_result(
    source: &Path,
    text: &str,
    voice: Voice,
    audio_file: &Path,
    location: &S3Location,
) -> ConversionResult {
    ConversionResult {
        source_file: source.display().to_string(),
        audio_file: audio_file.display().to_string(),
        voice_id: voice.as_str().to_string(),
        character_count: text.chars().count(),
        s3_key: location.key.clone(),
        s3_url: location.url.clone(),
    }
}

/// Local copy of the audio artifact, named after the object key's file
/// component.
fn local_audio_path(audio_dir: &Path, key: &str) -> PathBuf {
    let name = Path::new(key)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output.mp3"));
    audio_dir.join(name)
}

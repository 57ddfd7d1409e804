//! Remote soil classifier.
//!
//! The model server receives raw image bytes and answers with one probability per
//! class, in the order of `class_names` in the class mapping file. The label with the
//! highest probability wins and its advisory text is attached from the same file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, bail};
use serde::Deserialize;

use crate::domain::repository::InferenceEngine;
use crate::domain::types::SoilPrediction;

/// Advisory text for one soil label.
#[derive(Debug, Clone, Deserialize)]
pub struct SoilInfo {
    pub description: String,
    pub characteristics: String,
    pub crops: String,
    pub recommendations: String,
}

/// Contents of `class_mapping.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassMapping {
    pub class_names: Vec<String>,
    pub soil_info: HashMap<String, SoilInfo>,
}

impl ClassMapping {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mapping: Self = serde_json::from_str(raw).context("parse class mapping")?;
        if mapping.class_names.is_empty() {
            bail!("class mapping has no classes");
        }
        if let Some(missing) = mapping
            .class_names
            .iter()
            .find(|name| !mapping.soil_info.contains_key(*name))
        {
            bail!("class mapping has no soil_info for {missing:?}");
        }
        Ok(mapping)
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read class mapping {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Pick the most probable class. Ties go to the lower index.
    pub fn classify(&self, probabilities: &[f64]) -> anyhow::Result<SoilPrediction> {
        if probabilities.len() != self.class_names.len() {
            bail!(
                "model returned {} probabilities for {} classes",
                probabilities.len(),
                self.class_names.len()
            );
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            bail!("model returned a non-finite probability");
        }

        let (index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        let soil_type = &self.class_names[index];
        let info = &self.soil_info[soil_type];
        Ok(SoilPrediction {
            soil_type: soil_type.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            description: info.description.clone(),
            characteristics: info.characteristics.clone(),
            recommended_crops: info.crops.clone(),
            recommendations: info.recommendations.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probabilities: Vec<f64>,
}

/// Classifier backed by an HTTP model server.
#[derive(Clone)]
pub struct HttpInferenceEngine {
    client: reqwest::Client,
    endpoint: String,
    mapping: Arc<ClassMapping>,
}

impl HttpInferenceEngine {
    pub fn new(endpoint: String, mapping: ClassMapping, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build inference http client")?;
        Ok(Self {
            client,
            endpoint,
            mapping: Arc::new(mapping),
        })
    }
}

impl InferenceEngine for HttpInferenceEngine {
    async fn predict(&self, image: &Path) -> anyhow::Result<SoilPrediction> {
        let bytes = tokio::fs::read(image)
            .await
            .with_context(|| format!("read image {}", image.display()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .context("call model server")?
            .error_for_status()
            .context("model server returned an error status")?;

        let body: PredictResponse = response
            .json()
            .await
            .context("decode model server response")?;

        self.mapping.classify(&body.probabilities)
    }
}

/// Default location of the class mapping, relative to the working directory.
pub fn default_mapping_path() -> PathBuf {
    PathBuf::from("assets/class_mapping.json")
}

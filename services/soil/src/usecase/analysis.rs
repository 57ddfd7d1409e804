use std::time::Duration;

use anyhow::anyhow;
use serde::Serialize;
use uuid::Uuid;

use soilscan_domain::media::ImageFormat;
use soilscan_domain::pagination::OffsetPage;

use crate::domain::repository::{AnalysisRepository, ImageStore, InferenceEngine};
use crate::domain::types::{
    AnalysisRecord, STATS_WINDOW, SoilStats, SoilTypeStats, UploadPolicy,
};
use crate::error::SoilServiceError;

async fn discard_image<S: ImageStore>(images: &S, key: &str) {
    if let Err(e) = images.remove(key).await {
        tracing::warn!(key, error = format!("{e:#}"), "failed to remove image");
    }
}

// ── Analyze ──────────────────────────────────────────────────────────────────

pub struct AnalyzeInput {
    pub user_id: Uuid,
    /// File name as declared by the client.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Validate, store, classify and persist one uploaded image.
///
/// Once the file is written, any later failure removes it before the error is
/// returned. Removal failures are logged and do not change the error.
pub struct AnalyzeSoilUseCase<A: AnalysisRepository, S: ImageStore, I: InferenceEngine> {
    pub analyses: A,
    pub images: S,
    pub engine: I,
    pub policy: UploadPolicy,
    pub inference_timeout: Duration,
}

impl<A, S, I> AnalyzeSoilUseCase<A, S, I>
where
    A: AnalysisRepository,
    S: ImageStore,
    I: InferenceEngine,
{
    pub async fn execute(&self, input: AnalyzeInput) -> Result<AnalysisRecord, SoilServiceError> {
        let extension = self
            .policy
            .accepted_extension(&input.filename)
            .ok_or_else(|| SoilServiceError::UnsupportedMediaType {
                allowed: self.policy.allowed_list(),
            })?;

        if input.bytes.len() as u64 > self.policy.max_bytes {
            return Err(SoilServiceError::PayloadTooLarge {
                max_bytes: self.policy.max_bytes,
            });
        }
        if input.bytes.is_empty() {
            return Err(SoilServiceError::MissingImage);
        }

        let key = format!("{}{}", Uuid::new_v4(), extension);
        // A failed write may still leave a partial file behind.
        let path = match self.images.save(&key, &input.bytes).await {
            Ok(path) => path,
            Err(e) => {
                discard_image(&self.images, &key).await;
                return Err(SoilServiceError::StorageFailure(e));
            }
        };

        let prediction =
            match tokio::time::timeout(self.inference_timeout, self.engine.predict(&path)).await {
                Ok(Ok(prediction)) => prediction,
                Ok(Err(e)) => {
                    discard_image(&self.images, &key).await;
                    return Err(SoilServiceError::InferenceFailure(e));
                }
                Err(_) => {
                    discard_image(&self.images, &key).await;
                    return Err(SoilServiceError::InferenceFailure(anyhow!(
                        "inference timed out after {:?}",
                        self.inference_timeout
                    )));
                }
            };

        let record =
            AnalysisRecord::from_prediction(input.user_id, input.filename, key, prediction);
        if let Err(e) = self.analyses.create(&record).await {
            discard_image(&self.images, &record.image_path).await;
            return Err(match e {
                SoilServiceError::Internal(e) => SoilServiceError::PersistenceFailure(e),
                other => other,
            });
        }

        tracing::info!(
            analysis_id = %record.id,
            user_id = %record.user_id,
            soil_type = %record.soil_type,
            confidence = record.confidence,
            "soil analysis stored"
        );
        Ok(record)
    }
}

// ── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalysisPage {
    pub analyses: Vec<AnalysisRecord>,
    pub total: u64,
}

pub struct ListAnalysesUseCase<A: AnalysisRepository> {
    pub analyses: A,
}

impl<A: AnalysisRepository> ListAnalysesUseCase<A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: OffsetPage,
    ) -> Result<AnalysisPage, SoilServiceError> {
        let analyses = self.analyses.list(user_id, page.clamped()).await?;
        let total = self.analyses.count(user_id).await?;
        Ok(AnalysisPage { analyses, total })
    }
}

// ── Get ──────────────────────────────────────────────────────────────────────

pub struct GetAnalysisUseCase<A: AnalysisRepository> {
    pub analyses: A,
}

impl<A: AnalysisRepository> GetAnalysisUseCase<A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<AnalysisRecord, SoilServiceError> {
        self.analyses
            .find(user_id, id)
            .await?
            .ok_or(SoilServiceError::AnalysisNotFound)
    }
}

// ── Delete ───────────────────────────────────────────────────────────────────

/// Remove the record first, then its file. A missing file does not fail the delete.
pub struct DeleteAnalysisUseCase<A: AnalysisRepository, S: ImageStore> {
    pub analyses: A,
    pub images: S,
}

impl<A: AnalysisRepository, S: ImageStore> DeleteAnalysisUseCase<A, S> {
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<(), SoilServiceError> {
        let record = self
            .analyses
            .find(user_id, id)
            .await?
            .ok_or(SoilServiceError::AnalysisNotFound)?;

        if !self.analyses.delete(user_id, id).await? {
            return Err(SoilServiceError::AnalysisNotFound);
        }
        discard_image(&self.images, &record.image_path).await;

        tracing::info!(analysis_id = %id, %user_id, "soil analysis deleted");
        Ok(())
    }
}

// ── Image download ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ImageDownload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

pub struct FetchImageUseCase<A: AnalysisRepository, S: ImageStore> {
    pub analyses: A,
    pub images: S,
}

impl<A: AnalysisRepository, S: ImageStore> FetchImageUseCase<A, S> {
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> Result<ImageDownload, SoilServiceError> {
        let record = self
            .analyses
            .find(user_id, id)
            .await?
            .ok_or(SoilServiceError::AnalysisNotFound)?;

        let bytes = self
            .images
            .read(&record.image_path)
            .await
            .map_err(SoilServiceError::StorageFailure)?
            .ok_or(SoilServiceError::ImageNotFound)?;

        let content_type = record
            .image_format()
            .map_or("application/octet-stream", ImageFormat::content_type);

        Ok(ImageDownload {
            bytes,
            content_type,
            filename: record.image_filename,
        })
    }
}

// ── Stats ────────────────────────────────────────────────────────────────────

pub struct SoilStatsUseCase<A: AnalysisRepository> {
    pub analyses: A,
}

impl<A: AnalysisRepository> SoilStatsUseCase<A> {
    /// Aggregate over the owner's most recent analyses (at most [`STATS_WINDOW`]).
    pub async fn execute(&self, user_id: Uuid) -> Result<SoilStats, SoilServiceError> {
        let recent = self
            .analyses
            .list(user_id, OffsetPage::new(STATS_WINDOW, 0))
            .await?;
        Ok(summarize(&recent))
    }
}

/// Per-label counts and shares, most frequent first.
///
/// Labels with equal counts keep the order in which they first appear in `records`.
/// Percentages are rounded to one decimal place.
pub fn summarize(records: &[AnalysisRecord]) -> SoilStats {
    let total = records.len() as u64;
    if total == 0 {
        return SoilStats {
            total_analyses: 0,
            soil_types_breakdown: Vec::new(),
            most_common_type: None,
            latest_analysis_date: None,
        };
    }

    let mut counts: Vec<(&str, u64)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(label, _)| *label == record.soil_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.soil_type.as_str(), 1)),
        }
    }
    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let soil_types_breakdown: Vec<SoilTypeStats> = counts
        .iter()
        .map(|(label, count)| SoilTypeStats {
            soil_type: (*label).to_owned(),
            count: *count,
            percentage: round_one_decimal(*count as f64 / total as f64 * 100.0),
        })
        .collect();

    SoilStats {
        total_analyses: total,
        most_common_type: soil_types_breakdown.first().map(|s| s.soil_type.clone()),
        latest_analysis_date: records.iter().map(|r| r.created_at).max(),
        soil_types_breakdown,
    }
}

/// One decimal place, exact halves to even (`6.25` becomes `6.2`).
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

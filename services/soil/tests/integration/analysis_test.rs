use std::time::Duration;

use uuid::Uuid;

use soilscan_domain::pagination::OffsetPage;
use soilscan_soil::domain::types::{STATS_WINDOW, UploadPolicy};
use soilscan_soil::error::SoilServiceError;
use soilscan_soil::infra::storage::FsImageStore;
use soilscan_soil::usecase::analysis::{
    AnalyzeInput, AnalyzeSoilUseCase, DeleteAnalysisUseCase, FetchImageUseCase,
    GetAnalysisUseCase, ListAnalysesUseCase, SoilStatsUseCase,
};
use soilscan_testing::fixture::{ScratchDir, fake_jpeg};

use crate::helpers::{EngineMode, MockAnalysisRepo, PartialWriteStore, StubEngine, test_record};

const MAX_BYTES: u64 = 1024;

fn analyze_uc(
    dir: &ScratchDir,
    analyses: &MockAnalysisRepo,
    engine: &StubEngine,
) -> AnalyzeSoilUseCase<MockAnalysisRepo, FsImageStore, StubEngine> {
    AnalyzeSoilUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
        engine: engine.clone(),
        policy: UploadPolicy::new(MAX_BYTES, "jpg,jpeg,png"),
        inference_timeout: Duration::from_millis(200),
    }
}

fn upload(filename: &str, len: usize) -> AnalyzeInput {
    AnalyzeInput {
        user_id: Uuid::now_v7(),
        filename: filename.to_owned(),
        bytes: fake_jpeg(len),
    }
}

// ── Analyze ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_image_and_persist_prediction() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let engine = StubEngine::black_soil();

    let record = analyze_uc(&dir, &analyses, &engine)
        .execute(upload("North Field.JPG", 512))
        .await
        .unwrap();

    assert_eq!(record.soil_type, "Black Soil");
    assert_eq!(record.image_filename, "North Field.JPG");
    assert!(record.image_path.ends_with(".jpg"), "key keeps lower-cased extension");
    assert!(dir.path().join(&record.image_path).is_file());
    assert_eq!(dir.file_count(), 1);
    assert_eq!(analyses.records_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_accept_five_mib_jpeg_under_default_policy() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let uc = AnalyzeSoilUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
        engine: StubEngine::black_soil(),
        policy: UploadPolicy::default(),
        inference_timeout: Duration::from_secs(5),
    };

    let record = uc.execute(upload("field.jpg", 5 * 1024 * 1024)).await.unwrap();

    assert_eq!(record.soil_type, "Black Soil");
    assert_eq!(record.confidence, 0.92);
    assert_eq!(dir.file_count(), 1);
}

#[tokio::test]
async fn should_reject_disallowed_extension_without_writing() {
    let dir = ScratchDir::new();
    let engine = StubEngine::black_soil();

    let result = analyze_uc(&dir, &MockAnalysisRepo::empty(), &engine)
        .execute(upload("field.gif", 16))
        .await;

    match result {
        Err(SoilServiceError::UnsupportedMediaType { allowed }) => {
            assert_eq!(allowed, ".jpg, .jpeg, .png");
        }
        other => panic!("expected UnsupportedMediaType, got {other:?}"),
    }
    assert_eq!(dir.file_count(), 0);
    assert_eq!(*engine.calls_handle().lock().unwrap(), 0);
}

#[tokio::test]
async fn should_reject_file_without_extension() {
    let dir = ScratchDir::new();
    let result = analyze_uc(&dir, &MockAnalysisRepo::empty(), &StubEngine::black_soil())
        .execute(upload("field", 16))
        .await;

    assert!(
        matches!(result, Err(SoilServiceError::UnsupportedMediaType { .. })),
        "expected UnsupportedMediaType, got {result:?}"
    );
}

#[tokio::test]
async fn should_accept_exactly_max_bytes_and_reject_one_more() {
    let dir = ScratchDir::new();
    let uc = analyze_uc(&dir, &MockAnalysisRepo::empty(), &StubEngine::black_soil());

    uc.execute(upload("a.jpg", MAX_BYTES as usize)).await.unwrap();

    let result = uc.execute(upload("b.jpg", MAX_BYTES as usize + 1)).await;
    assert!(
        matches!(result, Err(SoilServiceError::PayloadTooLarge { max_bytes: MAX_BYTES })),
        "expected PayloadTooLarge, got {result:?}"
    );
    assert_eq!(dir.file_count(), 1);
}

#[tokio::test]
async fn should_reject_empty_file() {
    let dir = ScratchDir::new();
    let result = analyze_uc(&dir, &MockAnalysisRepo::empty(), &StubEngine::black_soil())
        .execute(upload("a.png", 0))
        .await;

    assert!(
        matches!(result, Err(SoilServiceError::MissingImage)),
        "expected MissingImage, got {result:?}"
    );
    assert_eq!(dir.file_count(), 0);
}

#[tokio::test]
async fn should_remove_image_when_inference_fails() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let engine = StubEngine::new(EngineMode::Fail);

    let result = analyze_uc(&dir, &analyses, &engine)
        .execute(upload("a.jpg", 64))
        .await;

    assert!(
        matches!(result, Err(SoilServiceError::InferenceFailure(_))),
        "expected InferenceFailure, got {result:?}"
    );
    assert_eq!(*engine.calls_handle().lock().unwrap(), 1);
    assert_eq!(dir.file_count(), 0, "image should be removed");
    assert!(analyses.records_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_remove_image_when_inference_times_out() {
    let dir = ScratchDir::new();
    let result = analyze_uc(&dir, &MockAnalysisRepo::empty(), &StubEngine::new(EngineMode::Hang))
        .execute(upload("a.jpg", 64))
        .await;

    assert!(
        matches!(result, Err(SoilServiceError::InferenceFailure(_))),
        "expected InferenceFailure, got {result:?}"
    );
    assert_eq!(dir.file_count(), 0);
}

#[tokio::test]
async fn should_remove_image_when_persistence_fails() {
    let dir = ScratchDir::new();
    let result = analyze_uc(&dir, &MockAnalysisRepo::failing(), &StubEngine::black_soil())
        .execute(upload("a.jpg", 64))
        .await;

    assert!(
        matches!(result, Err(SoilServiceError::PersistenceFailure(_))),
        "expected PersistenceFailure, got {result:?}"
    );
    assert_eq!(dir.file_count(), 0);
}

#[tokio::test]
async fn should_report_storage_failure_for_missing_root() {
    let dir = ScratchDir::new();
    let engine = StubEngine::black_soil();
    let uc = AnalyzeSoilUseCase {
        analyses: MockAnalysisRepo::empty(),
        images: FsImageStore::new(dir.path().join("does-not-exist")),
        engine: engine.clone(),
        policy: UploadPolicy::new(MAX_BYTES, "jpg,jpeg,png"),
        inference_timeout: Duration::from_millis(200),
    };

    let result = uc.execute(upload("a.jpg", 64)).await;

    assert!(
        matches!(result, Err(SoilServiceError::StorageFailure(_))),
        "expected StorageFailure, got {result:?}"
    );
    assert_eq!(*engine.calls_handle().lock().unwrap(), 0);
}

#[tokio::test]
async fn should_remove_partial_file_when_save_fails() {
    let images = PartialWriteStore::new();
    let engine = StubEngine::black_soil();
    let uc = AnalyzeSoilUseCase {
        analyses: MockAnalysisRepo::empty(),
        images: images.clone(),
        engine: engine.clone(),
        policy: UploadPolicy::new(MAX_BYTES, "jpg,jpeg,png"),
        inference_timeout: Duration::from_millis(200),
    };

    let result = uc.execute(upload("a.jpg", 64)).await;

    assert!(
        matches!(result, Err(SoilServiceError::StorageFailure(_))),
        "expected StorageFailure, got {result:?}"
    );
    assert!(
        images.files_handle().lock().unwrap().is_empty(),
        "partial file should be removed"
    );
    assert_eq!(*engine.calls_handle().lock().unwrap(), 0);
}

// ── History ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_newest_first_with_total() {
    let owner = Uuid::now_v7();
    let analyses = MockAnalysisRepo::empty();
    {
        let mut records = analyses.records.lock().unwrap();
        records.push(test_record(owner, "Red soil", 30));
        records.push(test_record(owner, "Clay soil", 10));
        records.push(test_record(owner, "Black Soil", 20));
        records.push(test_record(Uuid::now_v7(), "Red soil", 1));
    }

    let page = ListAnalysesUseCase {
        analyses: analyses.clone(),
    }
    .execute(owner, OffsetPage::new(2, 0))
    .await
    .unwrap();

    assert_eq!(page.total, 3);
    let labels: Vec<_> = page.analyses.iter().map(|r| r.soil_type.as_str()).collect();
    assert_eq!(labels, vec!["Clay soil", "Black Soil"]);
}

#[tokio::test]
async fn should_clamp_oversized_page() {
    let owner = Uuid::now_v7();
    let analyses = MockAnalysisRepo::empty();
    {
        let mut records = analyses.records.lock().unwrap();
        for i in 0..120 {
            records.push(test_record(owner, "Red soil", i));
        }
    }

    let page = ListAnalysesUseCase { analyses }
        .execute(owner, OffsetPage::new(500, 0))
        .await
        .unwrap();

    assert_eq!(page.analyses.len(), 100);
    assert_eq!(page.total, 120);
}

// ── Get / delete / image ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_other_users_analysis() {
    let owner = Uuid::now_v7();
    let record = test_record(owner, "Red soil", 1);
    let analyses = MockAnalysisRepo::empty();
    analyses.records.lock().unwrap().push(record.clone());

    let uc = GetAnalysisUseCase {
        analyses: analyses.clone(),
    };
    assert_eq!(uc.execute(owner, record.id).await.unwrap().id, record.id);

    let result = uc.execute(Uuid::now_v7(), record.id).await;
    assert!(
        matches!(result, Err(SoilServiceError::AnalysisNotFound)),
        "expected AnalysisNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_delete_record_and_file() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let record = analyze_uc(&dir, &analyses, &StubEngine::black_soil())
        .execute(upload("a.jpg", 64))
        .await
        .unwrap();

    let uc = DeleteAnalysisUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
    };

    let stranger = uc.execute(Uuid::now_v7(), record.id).await;
    assert!(
        matches!(stranger, Err(SoilServiceError::AnalysisNotFound)),
        "expected AnalysisNotFound, got {stranger:?}"
    );
    assert_eq!(dir.file_count(), 1);

    uc.execute(record.user_id, record.id).await.unwrap();
    assert!(analyses.records_handle().lock().unwrap().is_empty());
    assert_eq!(dir.file_count(), 0);

    let again = uc.execute(record.user_id, record.id).await;
    assert!(
        matches!(again, Err(SoilServiceError::AnalysisNotFound)),
        "expected AnalysisNotFound, got {again:?}"
    );
}

#[tokio::test]
async fn should_hide_deleted_analysis_from_every_read() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let kept = analyze_uc(&dir, &analyses, &StubEngine::black_soil())
        .execute(upload("kept.jpg", 64))
        .await
        .unwrap();
    let mut doomed_input = upload("doomed.jpg", 64);
    doomed_input.user_id = kept.user_id;
    let doomed = analyze_uc(&dir, &analyses, &StubEngine::black_soil())
        .execute(doomed_input)
        .await
        .unwrap();
    let owner = kept.user_id;

    DeleteAnalysisUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
    }
    .execute(owner, doomed.id)
    .await
    .unwrap();

    let get = GetAnalysisUseCase {
        analyses: analyses.clone(),
    }
    .execute(owner, doomed.id)
    .await;
    assert!(
        matches!(get, Err(SoilServiceError::AnalysisNotFound)),
        "expected AnalysisNotFound from get, got {get:?}"
    );

    let image = FetchImageUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
    }
    .execute(owner, doomed.id)
    .await;
    assert!(
        matches!(image, Err(SoilServiceError::AnalysisNotFound)),
        "expected AnalysisNotFound from image, got {image:?}"
    );

    let page = ListAnalysesUseCase {
        analyses: analyses.clone(),
    }
    .execute(owner, OffsetPage::default())
    .await
    .unwrap();
    assert_eq!(page.total, 1);
    let ids: Vec<_> = page.analyses.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![kept.id]);
}

#[tokio::test]
async fn should_delete_record_when_file_already_gone() {
    let dir = ScratchDir::new();
    let owner = Uuid::now_v7();
    let record = test_record(owner, "Red soil", 1);
    let analyses = MockAnalysisRepo::empty();
    analyses.records.lock().unwrap().push(record.clone());

    DeleteAnalysisUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
    }
    .execute(owner, record.id)
    .await
    .unwrap();

    assert!(analyses.records_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_serve_stored_image_with_content_type() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let input = upload("north.jpeg", 64);
    let expected = input.bytes.clone();
    let record = analyze_uc(&dir, &analyses, &StubEngine::black_soil())
        .execute(input)
        .await
        .unwrap();

    let download = FetchImageUseCase {
        analyses: analyses.clone(),
        images: FsImageStore::new(dir.path()),
    }
    .execute(record.user_id, record.id)
    .await
    .unwrap();

    assert_eq!(download.bytes, expected);
    assert_eq!(download.content_type, "image/jpeg");
    assert_eq!(download.filename, "north.jpeg");
}

#[tokio::test]
async fn should_hide_image_from_other_users() {
    let dir = ScratchDir::new();
    let analyses = MockAnalysisRepo::empty();
    let record = analyze_uc(&dir, &analyses, &StubEngine::black_soil())
        .execute(upload("a.png", 64))
        .await
        .unwrap();

    let result = FetchImageUseCase {
        analyses,
        images: FsImageStore::new(dir.path()),
    }
    .execute(Uuid::now_v7(), record.id)
    .await;

    assert!(
        matches!(result, Err(SoilServiceError::AnalysisNotFound)),
        "expected AnalysisNotFound, got {result:?}"
    );
    assert_eq!(dir.file_count(), 1);
}

#[tokio::test]
async fn should_report_missing_image_file() {
    let dir = ScratchDir::new();
    let owner = Uuid::now_v7();
    let record = test_record(owner, "Red soil", 1);
    let analyses = MockAnalysisRepo::empty();
    analyses.records.lock().unwrap().push(record.clone());

    let result = FetchImageUseCase {
        analyses,
        images: FsImageStore::new(dir.path()),
    }
    .execute(owner, record.id)
    .await;

    assert!(
        matches!(result, Err(SoilServiceError::ImageNotFound)),
        "expected ImageNotFound, got {result:?}"
    );
}

// ── Stats ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_aggregate_only_own_analyses() {
    let owner = Uuid::now_v7();
    let analyses = MockAnalysisRepo::empty();
    {
        let mut records = analyses.records.lock().unwrap();
        records.push(test_record(owner, "Black Soil", 5));
        records.push(test_record(owner, "Black Soil", 3));
        records.push(test_record(owner, "Red soil", 1));
        records.push(test_record(Uuid::now_v7(), "Red soil", 0));
        records.push(test_record(Uuid::now_v7(), "Red soil", 0));
    }

    let stats = SoilStatsUseCase { analyses }.execute(owner).await.unwrap();

    assert_eq!(stats.total_analyses, 3);
    assert_eq!(stats.most_common_type.as_deref(), Some("Black Soil"));
    assert_eq!(stats.soil_types_breakdown[0].count, 2);
    assert_eq!(stats.soil_types_breakdown[0].percentage, 66.7);
    assert_eq!(stats.soil_types_breakdown[1].percentage, 33.3);
}

#[tokio::test]
async fn should_return_zero_stats_for_new_user() {
    let stats = SoilStatsUseCase {
        analyses: MockAnalysisRepo::empty(),
    }
    .execute(Uuid::now_v7())
    .await
    .unwrap();

    assert_eq!(stats.total_analyses, 0);
    assert!(stats.most_common_type.is_none());
    assert!(stats.latest_analysis_date.is_none());
}

#[tokio::test]
async fn should_aggregate_only_the_most_recent_window() {
    let owner = Uuid::now_v7();
    let analyses = MockAnalysisRepo::empty();
    {
        let mut records = analyses.records.lock().unwrap();
        for i in 0..STATS_WINDOW as i64 {
            records.push(test_record(owner, "Red soil", i));
        }
        // Older than everything above, so outside the window.
        for i in 0..5 {
            records.push(test_record(owner, "Clay soil", 10_000 + i));
        }
    }

    let stats = SoilStatsUseCase { analyses }.execute(owner).await.unwrap();

    assert_eq!(stats.total_analyses, STATS_WINDOW);
    assert_eq!(stats.soil_types_breakdown.len(), 1);
    assert_eq!(stats.soil_types_breakdown[0].soil_type, "Red soil");
    assert_eq!(stats.soil_types_breakdown[0].percentage, 100.0);
}

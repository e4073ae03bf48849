mod helpers;

use std::time::Duration;

use crmkit_core::{NoticeLevel, PipelineError};
use crmkit_upload::{Destination, UploadEvent};
use helpers::fixtures::png_request;
use helpers::{config_from, drain, setup_pipeline, stalled_endpoint};

#[tokio::test]
async fn test_second_upload_is_refused_while_first_in_flight() {
    let api_url = stalled_endpoint().await;
    let (pipeline, _) = setup_pipeline(config_from(&[("CRMKIT_API_URL", api_url.as_str())]));

    let first = pipeline
        .start(Destination::ObjectStorage, png_request("a.png", 64), None)
        .unwrap();
    assert!(pipeline.state().is_uploading());

    let err = pipeline
        .start(Destination::ObjectStorage, png_request("b.png", 64), None)
        .unwrap_err();
    assert_eq!(err, PipelineError::UploadInProgress);
    // The refused attempt must not release the first one's claim.
    assert!(pipeline.state().is_uploading());

    first.cancel();
    let outcome = tokio::time::timeout(Duration::from_secs(5), drain(first))
        .await
        .unwrap();

    assert_eq!(
        outcome.terminal(),
        &UploadEvent::Failed(PipelineError::Cancelled)
    );
    assert!(!pipeline.state().is_uploading());
}

#[tokio::test]
async fn test_pipeline_is_reusable_after_cancellation() {
    let api_url = stalled_endpoint().await;
    let (pipeline, notifier) = setup_pipeline(config_from(&[("CRMKIT_API_URL", api_url.as_str())]));

    for name in ["a.png", "b.png"] {
        let task = pipeline
            .start(Destination::ObjectStorage, png_request(name, 64), None)
            .unwrap();
        task.cancel();
        let outcome = drain(task).await;
        assert_eq!(
            outcome.terminal(),
            &UploadEvent::Failed(PipelineError::Cancelled)
        );
    }

    assert!(!pipeline.state().is_uploading());
    assert_eq!(notifier.count(NoticeLevel::Error), 2);
}

#[tokio::test]
async fn test_task_ids_are_unique() {
    let api_url = stalled_endpoint().await;
    let (pipeline, _) = setup_pipeline(config_from(&[("CRMKIT_API_URL", api_url.as_str())]));

    let first = pipeline
        .start(Destination::ObjectStorage, png_request("a.png", 64), None)
        .unwrap();
    let first_id = first.id();
    first.cancel();
    drain(first).await;

    let second = pipeline
        .start(Destination::ObjectStorage, png_request("b.png", 64), None)
        .unwrap();
    assert_ne!(first_id, second.id());
    second.cancel();
    drain(second).await;
}

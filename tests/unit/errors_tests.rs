/*!
 * Tests for the error taxonomy
 */

use capsync::errors::{
    AppError, MediaError, OverlayWarning, PipelineError, Stage, StageContext, SubtitleError,
    UpstreamError,
};

/// Test that stage errors carry a user message naming the stage
#[test]
fn test_pipelineError_userMessage_shouldNameStageAndCause() {
    let error = PipelineError::new(
        Stage::Download,
        UpstreamError::Download {
            bucket: "videos".to_string(),
            key: "user1_clip.mp4".to_string(),
            reason: "HTTP 404".to_string(),
        },
    );

    let message = error.user_message();
    assert!(message.starts_with("Error downloading file: "));
    assert!(message.contains("videos"));
    assert!(message.contains("user1_clip.mp4"));
    assert_eq!(error.stage.name(), "download");
}

/// Test that download and upload failures are distinct
#[test]
fn test_upstreamError_downloadAndUpload_shouldBeDistinguishable() {
    let upload = PipelineError::new(
        Stage::Upload,
        UpstreamError::Upload {
            bucket: "videos".to_string(),
            key: "user1_captioned_20240101_000000.zip".to_string(),
            reason: "HTTP 403".to_string(),
        },
    );
    assert!(upload.user_message().starts_with("Error uploading zip file: "));
    assert!(matches!(upload.source, AppError::Upstream(UpstreamError::Upload { .. })));
}

/// Test the StageContext extension on plain results
#[test]
fn test_stageContext_onError_shouldWrapWithStage() {
    let result: Result<(), MediaError> = Err(MediaError::EncodeFailed("boom".to_string()));
    let error = result.stage(Stage::Compositing).unwrap_err();

    assert_eq!(error.stage, Stage::Compositing);
    assert!(matches!(error.source, AppError::Media(MediaError::EncodeFailed(_))));
    assert_eq!(error.to_string(), "compositing stage failed: Media error: Video encode failed: boom");
}

/// Test that io and anyhow errors convert into AppError
#[test]
fn test_appError_fromForeignErrors_shouldConvert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let any = anyhow::anyhow!("inner").context("outer");
    match AppError::from(any) {
        AppError::Unknown(message) => assert_eq!(message, "outer: inner"),
        other => panic!("unexpected {:?}", other),
    }
}

/// Test the display of subtitle errors and warnings
#[test]
fn test_subtitleError_display_shouldIncludeOffendingInput() {
    let error = SubtitleError::MalformedSegment {
        line: "[1.0 -> 2.0] x".to_string(),
        reason: "missing marker".to_string(),
    };
    assert!(error.to_string().contains("[1.0 -> 2.0] x"));

    let warning = OverlayWarning::NonPositiveDuration {
        index: 4,
        duration_seconds: -0.5,
    };
    assert_eq!(warning.to_string(), "Caption 4 has a non-positive duration (-0.500s)");
}

use crate::{Capabilities, SessionError, StatusLabel};

use std::panic::Location;

use error_location::ErrorLocation;

/// WHAT: Startup label follows capability detection
/// WHY: Users learn before pressing anything whether voice mode can work
#[test]
fn given_capability_combinations_when_choosing_initial_label_then_most_specific_reason() {
    assert_eq!(Capabilities::new(true, true).initial_label(), StatusLabel::Ready);
    assert_eq!(Capabilities::new(true, false).initial_label(), StatusLabel::Ready);
    assert_eq!(
        Capabilities::new(false, true).initial_label(),
        StatusLabel::NoMicSupport
    );
    assert_eq!(
        Capabilities::new(false, false).initial_label(),
        StatusLabel::VoiceUnsupported
    );
}

/// WHAT: Each session error maps to its own label
/// WHY: Start failures, runtime failures, and tutor failures read differently
#[test]
fn given_session_errors_when_labelling_then_distinct_error_labels() {
    let location = || ErrorLocation::from(Location::caller());
    let reason = || "x".to_string();

    let cases = [
        (
            SessionError::CaptureUnsupported {
                reason: reason(),
                location: location(),
            },
            StatusLabel::VoiceUnsupported,
        ),
        (
            SessionError::CaptureStartError {
                reason: reason(),
                location: location(),
            },
            StatusLabel::MicError,
        ),
        (
            SessionError::CaptureRuntimeError {
                reason: reason(),
                location: location(),
            },
            StatusLabel::VoiceError,
        ),
        (
            SessionError::CompletionRequestError {
                reason: reason(),
                status: None,
                location: location(),
            },
            StatusLabel::TutorError,
        ),
        (
            SessionError::CompletionParseError {
                reason: reason(),
                location: location(),
            },
            StatusLabel::TutorError,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.label(), expected, "{error}");
        assert!(expected.is_error());
    }
}

/// WHAT: Routine labels are not errors
/// WHY: Only failures get the error marker
#[test]
fn given_routine_labels_when_checking_error_then_false() {
    for label in [
        StatusLabel::Ready,
        StatusLabel::Listening,
        StatusLabel::DidNotCatch,
        StatusLabel::Thinking,
        StatusLabel::Speaking,
        StatusLabel::Stopped,
    ] {
        assert!(!label.is_error(), "{label}");
    }
}

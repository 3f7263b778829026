use crate::{audio::recognizer::reap_worker, clean_transcript};

use std::thread;

/// WHAT: Whisper's blank-audio marker cleans to nothing
/// WHY: Silence must reach the controller as an empty transcript
#[test]
fn given_blank_audio_marker_when_cleaning_then_empty() {
    // Given/When: A transcript of pure silence
    let cleaned = clean_transcript(" [BLANK_AUDIO]\n");

    // Then: Empty
    assert!(cleaned.is_empty());
}

/// WHAT: Sound annotations are stripped from speech
/// WHY: Only spoken words belong in the conversation
#[test]
fn given_annotated_speech_when_cleaning_then_only_words_kept() {
    // Given: Speech mixed with annotations
    let raw = " (keyboard clicking) explain   recursion [MUSIC] please ";

    // When: Cleaning
    let cleaned = clean_transcript(raw);

    // Then: Words only, single-spaced
    assert_eq!(cleaned, "explain recursion please");
}

/// WHAT: Unbalanced brackets do not swallow the rest of the text
/// WHY: A stray closing bracket must not hide later words
#[test]
fn given_stray_closing_bracket_when_cleaning_then_following_words_kept() {
    // Given: A closing bracket with no opener
    let raw = "what is a) closure";

    // When: Cleaning
    let cleaned = clean_transcript(raw);

    // Then: Everything but the bracket survives
    assert_eq!(cleaned, "what is a closure");
}

/// WHAT: Plain speech passes through trimmed
/// WHY: Cleaning must not alter ordinary transcripts
#[test]
fn given_plain_speech_when_cleaning_then_trimmed_only() {
    assert_eq!(clean_transcript("  What is a monad?  "), "What is a monad?");
}

/// WHAT: A cleanly finished listening worker is reaped without complaint
/// WHY: Each new listen joins the previous worker first
#[test]
fn given_finished_worker_when_reaped_then_reported_clean() {
    // Given: A worker thread that returned normally
    let worker = thread::spawn(|| {});

    // When: It is reaped
    let clean = reap_worker(worker);

    // Then: Reported as a clean exit
    assert!(clean);
}

/// WHAT: A panicked listening worker is reported instead of silently discarded
/// WHY: A crashed listen must leave a trace in the logs
#[test]
#[allow(clippy::panic)]
fn given_panicked_worker_when_reaped_then_reported_as_panicked() {
    // Given: A worker thread that panicked
    let worker = thread::spawn(|| panic!("listen crashed"));

    // When: It is reaped
    let clean = reap_worker(worker);

    // Then: The panic is reported and does not propagate
    assert!(!clean);
}

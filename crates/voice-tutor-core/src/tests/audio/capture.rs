use crate::audio::capture::{MAX_BUFFER_SAMPLES, downmix};

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// WHAT: Stereo frames are averaged to mono
/// WHY: The endpointer and Whisper work on a single channel
#[test]
fn given_stereo_frames_when_downmixing_then_one_average_per_frame() {
    // Given: Three interleaved stereo frames
    let data = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];

    // When: Downmixing two channels
    let mono: Vec<f32> = downmix(&data, 2).collect();

    // Then: One sample per frame, each the channel average
    assert_eq!(mono.len(), 3);
    assert!((mono[0] - 0.5).abs() < f32::EPSILON);
    assert!((mono[1] - 0.5).abs() < f32::EPSILON);
    assert!(mono[2].abs() < f32::EPSILON);
}

/// WHAT: Mono input passes through unchanged
/// WHY: Single-channel microphones are the common case
#[test]
fn given_mono_input_when_downmixing_then_samples_unchanged() {
    // Given: Mono samples
    let data = [0.1f32, -0.2, 0.3];

    // When: Downmixing one channel
    let mono: Vec<f32> = downmix(&data, 1).collect();

    // Then: Identical
    assert_eq!(mono, data.to_vec());
}

/// WHAT: A zero channel count is treated as mono
/// WHY: A bad device report must not divide by zero
#[test]
fn given_zero_channels_when_downmixing_then_treated_as_mono() {
    // Given: Samples with a bogus channel count
    let data = [0.25f32, 0.75];

    // When: Downmixing zero channels
    let mono: Vec<f32> = downmix(&data, 0).collect();

    // Then: Passed through
    assert_eq!(mono, data.to_vec());
}

/// WHAT: A trailing partial frame is averaged over what is present
/// WHY: Callbacks may deliver buffers that split a frame
#[test]
fn given_partial_last_frame_when_downmixing_then_partial_average() {
    // Given: One full stereo frame plus a lone sample
    let data = [0.2f32, 0.4, 0.9];

    // When: Downmixing
    let mono: Vec<f32> = downmix(&data, 2).collect();

    // Then: The lone sample stands alone
    assert_eq!(mono.len(), 2);
    assert!((mono[1] - 0.9).abs() < f32::EPSILON);
}

/// WHAT: Buffer respects MAX_BUFFER_SAMPLES limit
/// WHY: Prevents unbounded memory growth while waiting for speech
#[test]
fn given_buffer_at_max_capacity_when_adding_samples_then_oldest_discarded() {
    // Given: A VecDeque at max capacity filled with 0.0
    let mut buf = VecDeque::with_capacity(MAX_BUFFER_SAMPLES);
    buf.extend(std::iter::repeat_n(0.0f32, MAX_BUFFER_SAMPLES));

    // When: Adding 1024 downmixed samples (value 1.0) beyond the limit
    let stereo = vec![1.0f32; 2048];
    buf.extend(downmix(&stereo, 2));
    while buf.len() > MAX_BUFFER_SAMPLES {
        buf.pop_front();
    }

    // Then: Buffer stays at MAX_BUFFER_SAMPLES and newest samples preserved
    assert_eq!(buf.len(), MAX_BUFFER_SAMPLES);
    assert!((buf[MAX_BUFFER_SAMPLES - 1] - 1.0).abs() < f32::EPSILON);
    assert!((buf[MAX_BUFFER_SAMPLES - 1024] - 1.0).abs() < f32::EPSILON);
    assert!(buf[MAX_BUFFER_SAMPLES - 1025].abs() < f32::EPSILON);
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: A panicking reader must not lose the learner's utterance
#[test]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(VecDeque::from(vec![0.5f32; 100])));
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from the poisoned lock and draining
    let drained: Vec<f32> = buf
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .drain(..)
        .collect();

    // Then: Buffered data is fully preserved
    assert_eq!(drained.len(), 100);
    assert!(drained.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

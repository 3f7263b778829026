//! Spoken replies through the platform's command-line synthesizer.
//!
//! One child process per utterance, text on stdin. Starting a new utterance
//! or cancelling kills the running child.

use crate::{AppError, AppResult, config::PlaybackConfig};

use std::{
    env,
    ffi::OsString,
    panic::Location,
    path::{Path, PathBuf},
    process::Stdio,
};

use error_location::ErrorLocation;
use tokio::{io::AsyncWriteExt, process::Command, sync::mpsc, sync::oneshot};
use tracing::{debug, info, instrument, warn};
use voice_tutor_core::{PlaybackBackend, PlaybackSignal, SessionEvent, UtteranceId};

/// Words per minute that `say` and `espeak` use at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

const POWERSHELL_SPEAK: &str = "Add-Type -AssemblyName System.Speech; \
    $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
    $s.Rate = [int]$env:VOICE_TUTOR_RATE; \
    $s.Speak([Console]::In.ReadToEnd())";

/// A synthesizer program and how to drive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechProgram {
    /// macOS `say`.
    Say,
    /// `espeak-ng` or `espeak`, by program name.
    Espeak(String),
    /// Windows PowerShell with `System.Speech`.
    PowerShell,
    /// User-configured program reading text on stdin.
    Custom(String),
}

impl SpeechProgram {
    /// The platform default, if one is installed.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            find_on_path("say").map(|_| SpeechProgram::Say)
        } else if cfg!(target_os = "windows") {
            find_on_path("powershell").map(|_| SpeechProgram::PowerShell)
        } else {
            ["espeak-ng", "espeak"]
                .into_iter()
                .find(|name| find_on_path(name).is_some())
                .map(|name| SpeechProgram::Espeak(name.to_string()))
        }
    }

    /// Executable to run.
    pub fn program(&self) -> &str {
        match self {
            SpeechProgram::Say => "say",
            SpeechProgram::Espeak(name) | SpeechProgram::Custom(name) => name,
            SpeechProgram::PowerShell => "powershell",
        }
    }

    /// Arguments for one utterance; the text itself goes to stdin.
    pub fn args(&self, rate: f32, language: &str) -> Vec<String> {
        let wpm = (BASE_WORDS_PER_MINUTE * rate).round().max(1.0) as u32;
        match self {
            SpeechProgram::Say => vec!["-r".to_string(), wpm.to_string()],
            SpeechProgram::Espeak(_) => vec![
                "--stdin".to_string(),
                "-s".to_string(),
                wpm.to_string(),
                "-v".to_string(),
                language.to_ascii_lowercase(),
            ],
            SpeechProgram::PowerShell => vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                POWERSHELL_SPEAK.to_string(),
            ],
            SpeechProgram::Custom(_) => Vec::new(),
        }
    }

    /// SAPI rate (-10..=10) for PowerShell; 0 is the platform default.
    pub fn sapi_rate(rate: f32) -> i32 {
        (((rate - 1.0) * 10.0).round() as i32).clamp(-10, 10)
    }
}

/// Locate `name` on `PATH`, trying `.exe` on Windows.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    find_in(name, &path)
}

pub(crate) fn find_in(name: &str, search_path: &OsString) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    env::split_paths(search_path).find_map(|dir| {
        let plain = dir.join(name);
        if plain.is_file() {
            return Some(plain);
        }
        let exe = dir.join(format!("{}.exe", name));
        (cfg!(windows) && exe.is_file()).then_some(exe)
    })
}

/// [`PlaybackBackend`] running a synthesizer child process per utterance.
pub struct CommandSpeaker {
    program: SpeechProgram,
    rate: f32,
    language: String,
    events: mpsc::UnboundedSender<SessionEvent>,
    kill_current: Option<oneshot::Sender<()>>,
}

impl CommandSpeaker {
    /// Pick the configured or platform synthesizer.
    ///
    /// Returns `None` when playback is disabled or no program is installed.
    #[instrument(skip(events))]
    pub fn from_config(
        config: &PlaybackConfig,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Option<Self> {
        if !config.enabled {
            info!("Spoken replies disabled in config");
            return None;
        }

        let program = match &config.command {
            Some(command) if find_on_path(command).is_some() => {
                Some(SpeechProgram::Custom(command.clone()))
            }
            Some(command) => {
                warn!(%command, "Configured speech command not found");
                None
            }
            None => SpeechProgram::detect(),
        };

        let Some(program) = program else {
            warn!("No speech synthesizer found, replies will not be spoken");
            return None;
        };

        info!(program = program.program(), "Speech synthesizer selected");

        Some(Self::new(
            program,
            config.rate,
            config.language.clone(),
            events,
        ))
    }

    pub fn new(
        program: SpeechProgram,
        rate: f32,
        language: String,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            program,
            rate,
            language,
            events,
            kill_current: None,
        }
    }

    #[track_caller]
    fn spawn(&self) -> AppResult<tokio::process::Child> {
        Command::new(self.program.program())
            .args(self.program.args(self.rate, &self.language))
            .env("VOICE_TUTOR_RATE", SpeechProgram::sapi_rate(self.rate).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::PlaybackError {
                reason: format!("Failed to start {}: {}", self.program.program(), e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl PlaybackBackend for CommandSpeaker {
    fn speak(&mut self, id: UtteranceId, text: &str) -> Result<(), String> {
        self.cancel();

        let mut child = self.spawn().map_err(|e| e.to_string())?;
        let (kill_tx, kill_rx) = oneshot::channel();
        self.kill_current = Some(kill_tx);

        let events = self.events.clone();
        let text = text.to_string();
        let send = move |signal| {
            let _ = events.send(SessionEvent::Playback { id, signal });
        };

        tokio::spawn(async move {
            send(PlaybackSignal::Started);

            if let Some(mut stdin) = child.stdin.take() {
                if let Err(e) = stdin.write_all(text.as_bytes()).await {
                    let _ = child.kill().await;
                    send(PlaybackSignal::Failed(format!("Failed to pass text: {}", e)));
                    return;
                }
            }

            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => send(PlaybackSignal::Ended),
                    Ok(status) => send(PlaybackSignal::Failed(format!("Synthesizer exited with {}", status))),
                    Err(e) => send(PlaybackSignal::Failed(e.to_string())),
                },
                _ = kill_rx => {
                    let _ = child.kill().await;
                    debug!(utterance = %id, "Utterance killed");
                    send(PlaybackSignal::Ended);
                }
            }
        });

        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(kill) = self.kill_current.take() {
            let _ = kill.send(());
        }
    }
}

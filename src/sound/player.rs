//! Sound player implementation using rodio.
//!
//! `rodio::OutputStream` cannot leave the thread that created it, so the
//! player owns a dedicated audio thread and talks to it over a
//! `crossbeam-channel` command queue. The thread keeps two sinks: one for
//! alert sounds and one for the looping ambient sound.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundSource;
use super::SoundPlayer;

/// How long a caller waits for the audio thread to acknowledge a play.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Gain applied to generated tones.
const TONE_AMPLITUDE: f32 = 0.25;

type Reply = Sender<Result<(), SoundError>>;

enum AudioCommand {
    Play { source: SoundSource, reply: Reply },
    Stop,
    PlayLoop {
        source: SoundSource,
        volume: f32,
        reply: Reply,
    },
    SetLoopVolume(f32),
    StopLoop,
    Shutdown,
}

/// A sound player backed by a rodio output stream on its own thread.
pub struct RodioSoundPlayer {
    commands: Sender<AudioCommand>,
}

impl RodioSoundPlayer {
    /// Opens the default output device on a new audio thread.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (commands, rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        std::thread::Builder::new()
            .name("uibo-audio".to_string())
            .spawn(move || audio_thread(rx, ready_tx))
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| SoundError::DeviceNotAvailable("audio thread exited".to_string()))??;

        debug!("Audio output stream initialized");
        Ok(Self { commands })
    }

    fn request(&self, make: impl FnOnce(Reply) -> AudioCommand) -> Result<(), SoundError> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.commands
            .send(make(reply))
            .map_err(|_| SoundError::PlaybackError("audio thread stopped".to_string()))?;
        rx.recv_timeout(REPLY_TIMEOUT)
            .map_err(|e| SoundError::PlaybackError(e.to_string()))?
    }

    fn send(&self, command: AudioCommand) {
        if self.commands.send(command).is_err() {
            debug!("Audio thread stopped, command dropped");
        }
    }
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        let source = source.clone();
        self.request(|reply| AudioCommand::Play { source, reply })
    }

    fn stop(&self) {
        self.send(AudioCommand::Stop);
    }

    fn play_looped(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError> {
        let source = source.clone();
        self.request(|reply| AudioCommand::PlayLoop {
            source,
            volume,
            reply,
        })
    }

    fn set_loop_volume(&self, volume: f32) {
        self.send(AudioCommand::SetLoopVolume(volume));
    }

    fn stop_loop(&self) {
        self.send(AudioCommand::StopLoop);
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl Drop for RodioSoundPlayer {
    fn drop(&mut self) {
        let _ = self.commands.send(AudioCommand::Shutdown);
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

// ============================================================================
// Audio thread
// ============================================================================

fn audio_thread(commands: Receiver<AudioCommand>, ready: Sender<Result<(), SoundError>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    // Dropping a sink stops its playback
    let mut alert: Option<Sink> = None;
    let mut ambient: Option<Sink> = None;

    for command in commands.iter() {
        match command {
            AudioCommand::Play { source, reply } => {
                alert = None;
                let result = play_once(&handle, &source).map(|sink| alert = Some(sink));
                let _ = reply.send(result);
            }
            AudioCommand::Stop => {
                alert = None;
            }
            AudioCommand::PlayLoop {
                source,
                volume,
                reply,
            } => {
                ambient = None;
                let result =
                    play_loop(&handle, &source, volume).map(|sink| ambient = Some(sink));
                let _ = reply.send(result);
            }
            AudioCommand::SetLoopVolume(volume) => {
                if let Some(sink) = &ambient {
                    sink.set_volume(volume);
                }
            }
            AudioCommand::StopLoop => {
                ambient = None;
            }
            AudioCommand::Shutdown => break,
        }
    }
    debug!("Audio thread exiting");
}

fn new_sink(handle: &OutputStreamHandle) -> Result<Sink, SoundError> {
    Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))
}

fn open(path: &Path) -> Result<BufReader<File>, SoundError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SoundError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })
}

fn play_once(handle: &OutputStreamHandle, source: &SoundSource) -> Result<Sink, SoundError> {
    let sink = new_sink(handle)?;
    match source {
        SoundSource::File { name, path } => {
            debug!("Playing sound file: {}", name);
            let decoder =
                Decoder::new(open(path)?).map_err(|e| SoundError::DecodeError(e.to_string()))?;
            sink.append(decoder);
        }
        SoundSource::Tone {
            name,
            frequency_hz,
            duration_ms,
        } => {
            debug!("Playing tone: {}", name);
            sink.append(
                SineWave::new(*frequency_hz as f32)
                    .take_duration(Duration::from_millis(*duration_ms))
                    .amplify(TONE_AMPLITUDE),
            );
        }
    }
    Ok(sink)
}

fn play_loop(
    handle: &OutputStreamHandle,
    source: &SoundSource,
    volume: f32,
) -> Result<Sink, SoundError> {
    let sink = new_sink(handle)?;
    sink.set_volume(volume);
    match source {
        SoundSource::File { name, path } => {
            debug!("Looping sound file: {}", name);
            let decoder = Decoder::new_looped(open(path)?)
                .map_err(|e| SoundError::DecodeError(e.to_string()))?;
            sink.append(decoder);
        }
        SoundSource::Tone { frequency_hz, .. } => {
            sink.append(SineWave::new(*frequency_hz as f32).amplify(TONE_AMPLITUDE));
        }
    }
    Ok(sink)
}

// ============================================================================
// Silent fallback
// ============================================================================

/// Player used when no output device exists. Every play attempt fails with
/// `SoundError::DeviceNotAvailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSoundPlayer;

impl SoundPlayer for SilentSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        Err(SoundError::DeviceNotAvailable(format!(
            "no audio output for {}",
            source.name()
        )))
    }

    fn stop(&self) {}

    fn play_looped(&self, source: &SoundSource, _volume: f32) -> Result<(), SoundError> {
        self.play(source)
    }

    fn set_loop_volume(&self, _volume: f32) {}

    fn stop_loop(&self) {}

    fn is_available(&self) -> bool {
        false
    }
}

/// Opens the audio device, falling back to a silent player.
///
/// `muted` skips device initialization entirely.
#[must_use]
pub fn player_or_silent(muted: bool) -> Arc<dyn SoundPlayer> {
    if muted {
        debug!("Sound muted, using silent player");
        return Arc::new(SilentSoundPlayer);
    }
    match RodioSoundPlayer::new() {
        Ok(player) => Arc::new(player),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            Arc::new(SilentSoundPlayer)
        }
    }
}

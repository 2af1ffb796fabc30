//! # Galileu's Flute - Recorder Rhythm Game
//!
//! Desktop front end for the game. Play a real recorder into the microphone;
//! the score scrolls from right to left and every note reaching the judgment
//! line has to be played at that moment.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Audio Thread**: Owns the CPAL stream; the game session runs inside its callback
//! - **Communication**: Crossbeam channels for frames, commands and status
//! - **Updates**: 60 FPS polling via the subscription system

mod logging;
mod ui;

use anyhow::Context;
use clap::Parser;
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use flute_core::{Composition, GameConfig, SessionCommand, TickFrame, audio};
use iced::{Element, Subscription, Task, Theme};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use ui::main_display::create_main_view;

/// Frames kept between two GUI polls; older ones are dropped by the callback.
const FRAME_QUEUE: usize = 8;

#[derive(Parser, Debug)]
#[command(author, version, about = "A rhythm game for the recorder")]
struct Cli {
    /// Composition JSON file to play. The built-in piece is used when omitted.
    composition: Option<PathBuf>,

    /// Game settings in TOML.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write the built-in piece as JSON to this path and exit.
    #[arg(long = "export-demo", value_name = "PATH")]
    export_demo: Option<PathBuf>,
}

pub fn main() -> anyhow::Result<()> {
    logging::init(tracing::Level::INFO);
    let cli = Cli::parse();

    if let Some(path) = cli.export_demo {
        Composition::demo()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "built-in piece exported");
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let composition = match &cli.composition {
        Some(path) => Composition::load(path)
            .with_context(|| format!("Failed to load composition {}", path.display()))?,
        None => Composition::demo(),
    };
    info!(name = %composition.name, "{}", composition.description);

    iced::application("Galileu's Flute", FluteApp::update, FluteApp::view)
        .subscription(FluteApp::subscription)
        .theme(FluteApp::theme)
        .run_with(move || (FluteApp::new(config, composition), Task::none()))?;

    Ok(())
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    /// Poll the audio thread
    Tick,
    /// Show or hide the manual
    ToggleLegend,
    /// Start the piece again with a zero score
    Restart,
    Exit,
}

/// What the audio thread reports about itself.
#[derive(Debug, Clone)]
pub enum AudioStatus {
    Starting,
    Running { sample_rate: u32 },
    Failed(String),
    Stopped,
}

/// Everything the UI components read.
#[derive(Debug)]
pub struct AppDisplayData {
    pub composition_name: String,
    pub composition_description: String,
    pub viewport_width: usize,
    pub alignment_column: usize,
    pub last_frame: Option<TickFrame>,
    pub legend_visible: bool,
    pub audio_status: AudioStatus,
}

struct FluteApp {
    audio_worker: Option<AudioWorker>,
    frame_receiver: Receiver<TickFrame>,
    status_receiver: Receiver<AudioStatus>,
    command_sender: Sender<SessionCommand>,
    display_data: AppDisplayData,
}

/// The dedicated audio thread and the channel that stops it.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AudioWorker {
    /// Starts capture on its own thread. The CPAL stream is created, kept
    /// and dropped on that thread.
    fn spawn(
        config: GameConfig,
        composition: Composition,
        frame_tx: Sender<TickFrame>,
        command_rx: Receiver<SessionCommand>,
        status_tx: Sender<AudioStatus>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let thread_handle = thread::spawn(move || {
            debug!("audio thread starting");
            let (stream, sample_rate) =
                match audio::start_audio_capture(&config, &composition, frame_tx, command_rx) {
                    Ok(started) => started,
                    Err(e) => {
                        error!("Fatal error starting audio: {:#}", e);
                        let _ = status_tx.send(AudioStatus::Failed(format!("{e:#}")));
                        return;
                    }
                };
            let _ = status_tx.send(AudioStatus::Running { sample_rate });

            // Parked until the GUI asks us to stop or goes away.
            let _ = shutdown_rx.recv();

            debug!("stopping audio stream");
            if let Err(e) = stream.pause() {
                warn!("Error pausing stream: {}", e);
            }
            drop(stream);
            let _ = status_tx.send(AudioStatus::Stopped);
        });

        Self {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        }
    }

    fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("audio thread panicked");
            }
        }
    }
}

impl FluteApp {
    fn new(config: GameConfig, composition: Composition) -> Self {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(FRAME_QUEUE);
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (status_tx, status_rx) = crossbeam_channel::unbounded();

        let display_data = AppDisplayData {
            composition_name: composition.name.clone(),
            composition_description: composition.description.clone(),
            viewport_width: config.viewport_width,
            alignment_column: config.alignment_column,
            last_frame: None,
            legend_visible: false,
            audio_status: AudioStatus::Starting,
        };

        let audio_worker = AudioWorker::spawn(config, composition, frame_tx, command_rx, status_tx);

        Self {
            audio_worker: Some(audio_worker),
            frame_receiver: frame_rx,
            status_receiver: status_rx,
            command_sender: command_tx,
            display_data,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                while let Ok(status) = self.status_receiver.try_recv() {
                    self.display_data.audio_status = status;
                }
                // Only the newest frame is drawn.
                if let Some(frame) = self.frame_receiver.try_iter().last() {
                    self.display_data.last_frame = Some(frame);
                }
            }
            Message::ToggleLegend => {
                self.display_data.legend_visible = !self.display_data.legend_visible;
            }
            Message::Restart => {
                info!("restart requested");
                if self.command_sender.send(SessionCommand::Restart).is_err() {
                    warn!("audio session is not running");
                }
                let stale = discard_pending(&self.frame_receiver);
                debug!(stale, "frames from before the restart discarded");
                self.display_data.last_frame = None;
            }
            Message::Exit => {
                info!("exit requested");
                if let Some(worker) = self.audio_worker.take() {
                    worker.stop();
                }
                return iced::exit();
            }
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Polls every 16ms (60 FPS); a tick of the game lasts far longer.
    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Empties `receiver` without blocking and returns how many items were dropped.
fn discard_pending<T>(receiver: &Receiver<T>) -> usize {
    receiver.try_iter().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flute_core::{GameSession, NoteId};

    #[test]
    fn restart_drops_frames_from_the_old_pass() {
        let (tx, rx) = crossbeam_channel::bounded(FRAME_QUEUE);
        let mut session = GameSession::new(&GameConfig::default(), &Composition::demo()).unwrap();
        for _ in 0..31 {
            let _ = tx.try_send(session.step(NoteId::Si));
        }
        assert_eq!(rx.len(), FRAME_QUEUE);

        assert_eq!(discard_pending(&rx), FRAME_QUEUE);
        assert!(rx.is_empty());

        // Only frames produced after the restart are drawn.
        session.restart();
        tx.try_send(session.step(NoteId::Si)).unwrap();
        let newest = rx.try_iter().last().unwrap();
        assert_eq!(newest.score, 0);
        assert_eq!(newest.source_cursor, 0);
    }

    #[test]
    fn discarding_an_empty_queue() {
        let (_tx, rx) = crossbeam_channel::bounded::<TickFrame>(1);
        assert_eq!(discard_pending(&rx), 0);
    }
}

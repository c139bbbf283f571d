//! Spoken feedback output.
//!
//! Every spoken line goes through one [`SpeechOutputChannel`]. Callers enqueue
//! text and return immediately; a single consumer task renders the queue in
//! order. Each rendering holds the [`RenderDevice`] lock, so two utterances
//! never overlap on the shared device.

mod command;

pub use command::CommandRenderer;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{NovaError, Result};

/// Blocking text-to-speech backend.
///
/// Rendering is not reentrant; [`RenderDevice`] guarantees exclusive access.
pub trait SpeechRenderer: Send + Sync + 'static {
    /// Render `text` audibly, returning once playback finishes.
    fn render(&self, text: &str) -> Result<()>;
}

/// A renderer guarded by the device lock.
pub struct RenderDevice {
    renderer: Arc<dyn SpeechRenderer>,
    lock: Mutex<()>,
}

impl RenderDevice {
    pub fn new(renderer: Arc<dyn SpeechRenderer>) -> Self {
        Self {
            renderer,
            lock: Mutex::new(()),
        }
    }

    /// Render `text` under the device lock.
    ///
    /// Failures and panics inside the renderer are logged, never returned.
    pub async fn render(&self, text: &str) {
        let _guard = self.lock.lock().await;
        debug!("speaking: {text}");

        let renderer = Arc::clone(&self.renderer);
        let owned = text.to_owned();
        match tokio::task::spawn_blocking(move || renderer.render(&owned)).await {
            Ok(Ok(())) => debug!("finished speaking: {text}"),
            Ok(Err(e)) => error!("error in speak: {e}"),
            Err(e) => error!("speech renderer task failed: {e}"),
        }
    }
}

enum SpeechCommand {
    Say {
        text: String,
        done: Option<oneshot::Sender<()>>,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle for submitting spoken feedback.
#[derive(Clone)]
pub struct SpeechOutputChannel {
    tx: mpsc::Sender<SpeechCommand>,
}

/// Handle to the consumer task behind a [`SpeechOutputChannel`].
pub struct SpeechWorker {
    handle: JoinHandle<()>,
}

impl SpeechOutputChannel {
    /// Start the consumer task with a queue holding at most `capacity` pending utterances.
    pub fn spawn(renderer: Arc<dyn SpeechRenderer>, capacity: usize) -> (Self, SpeechWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let device = RenderDevice::new(renderer);
        let handle = tokio::spawn(run_worker(device, rx));
        (Self { tx }, SpeechWorker { handle })
    }

    /// Queue `text` for rendering without waiting.
    ///
    /// Returns `false` when the utterance was dropped because the queue is
    /// full or the channel has shut down.
    pub fn speak(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        match self.tx.try_send(SpeechCommand::Say { text, done: None }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(SpeechCommand::Say { text, .. })) => {
                warn!("speech queue full, dropping: {text}");
                false
            }
            Err(_) => {
                warn!("speech channel closed, dropping utterance");
                false
            }
        }
    }

    /// Queue `text` and wait until it has been rendered.
    ///
    /// # Errors
    ///
    /// Returns [`NovaError::Channel`] if the channel has shut down.
    pub async fn speak_and_wait(&self, text: impl Into<String>) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(SpeechCommand::Say {
                text: text.into(),
                done: Some(done_tx),
            })
            .await
            .map_err(|_| NovaError::Channel("speech channel closed".to_owned()))?;
        done_rx
            .await
            .map_err(|_| NovaError::Channel("speech worker stopped".to_owned()))
    }

    /// Render everything queued so far, then stop the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`NovaError::Channel`] if the channel was already shut down.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(SpeechCommand::Shutdown(ack_tx))
            .await
            .map_err(|_| NovaError::Channel("speech channel closed".to_owned()))?;
        ack_rx
            .await
            .map_err(|_| NovaError::Channel("speech worker stopped".to_owned()))
    }
}

impl SpeechWorker {
    /// Wait for the consumer task to exit.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            error!("speech worker panicked: {e}");
        }
    }
}

async fn run_worker(device: RenderDevice, mut rx: mpsc::Receiver<SpeechCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            SpeechCommand::Say { text, done } => {
                device.render(&text).await;
                if let Some(done) = done {
                    let _ = done.send(());
                }
            }
            SpeechCommand::Shutdown(ack) => {
                rx.close();
                // Drain anything that raced in ahead of the close.
                while let Ok(SpeechCommand::Say { text, done }) = rx.try_recv() {
                    device.render(&text).await;
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
                let _ = ack.send(());
                break;
            }
        }
    }
    debug!("speech worker stopped");
}

use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use reelgrab_core::{LogLine, ProgressEvent};

/// Where the runner publishes progress.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);

    fn log(&self, text: String) {
        self.emit(ProgressEvent::Log(LogLine::info(text)));
    }

    fn log_error(&self, text: String) {
        self.emit(ProgressEvent::Log(LogLine::error(text)));
    }

    fn status(&self, text: &str) {
        self.emit(ProgressEvent::Status(text.to_string()));
    }
}

/// Producer half of the progress channel, owned by the runner.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
}

impl EventSink for ProgressSender {
    fn emit(&self, event: ProgressEvent) {
        // A gone consumer only means nobody is watching any more.
        let _ = self.tx.send(event);
    }
}

/// Consumer half, owned by the controller. FIFO, unbounded.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressEvent>,
    disconnected: bool,
}

impl ProgressReceiver {
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Everything queued right now, in order. Never blocks.
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block for at most `timeout` waiting for the next event.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<ProgressEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    /// The producer is gone and every queued event has been read.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        ProgressSender { tx },
        ProgressReceiver {
            rx,
            disconnected: false,
        },
    )
}

pub mod protocol;
pub mod state;
pub mod types;

use state::OrientationState;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;
use types::ConnectionState;

/// Baud rate the sensor firmware talks at.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// How long `stop` waits for the reader before aborting it.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest line kept in memory. Anything longer is dropped up to its newline.
const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Could not open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },
    #[error("Serial link already running on {0}, stop it first")]
    AlreadyActive(String),
    #[error("Could not enumerate serial ports: {0}")]
    Enumerate(#[source] tokio_serial::Error),
}

/// Identifiers of the serial ports currently present on the host.
pub fn available_ports() -> Result<Vec<String>, LinkError> {
    let ports = tokio_serial::available_ports().map_err(LinkError::Enumerate)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// A running reader task and the means to stop it.
struct ActiveReader {
    label: String,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Owner of the serial connection to the orientation sensor.
///
/// `start` opens the port and spawns a background task that reads lines,
/// parses them and overwrites the shared [`OrientationState`]. Connection
/// changes are published as [`ConnectionState`] on a watch channel. A stream
/// failure ends the task and leaves the link `Failed`; reconnecting is an
/// explicit `start` by the caller.
///
/// Must be used from within a tokio runtime.
pub struct SerialLink {
    orientation: OrientationState,
    status_tx: Arc<watch::Sender<ConnectionState>>,
    active: Option<ActiveReader>,
}

impl SerialLink {
    pub fn new(orientation: OrientationState) -> Self {
        let (status_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            orientation,
            status_tx: Arc::new(status_tx),
            active: None,
        }
    }

    /// The orientation register this link writes into.
    pub fn state(&self) -> &OrientationState {
        &self.orientation
    }

    /// Receiver for connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.status_tx.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.status_tx.borrow().clone()
    }

    /// Whether a reader task is still running.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.task.is_finished())
    }

    /// Open `port` and start reading from it.
    ///
    /// On failure the link is left `Disconnected`.
    pub fn start(&mut self, port: &str, baud_rate: u32) -> Result<(), LinkError> {
        self.ensure_idle()?;

        tracing::info!(%port, baud_rate, "Opening serial port");
        let stream = tokio_serial::new(port, baud_rate)
            .open_native_async()
            .map_err(|source| {
                tracing::warn!(%port, %source, "Failed to open serial port");
                LinkError::Open {
                    port: port.to_string(),
                    source,
                }
            })?;

        self.attach(stream, port)
    }

    /// Start reading from an already-open byte stream.
    ///
    /// `label` names the source in logs and errors.
    pub fn attach<R>(&mut self, reader: R, label: &str) -> Result<(), LinkError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.ensure_idle()?;

        let (stop_tx, stop_rx) = oneshot::channel();
        self.status_tx.send_replace(ConnectionState::Connected);

        let task = tokio::spawn(serial_read_loop(
            BufReader::new(reader),
            self.orientation.clone(),
            self.status_tx.clone(),
            stop_rx,
            label.to_string(),
        ));

        self.active = Some(ActiveReader {
            label: label.to_string(),
            stop_tx,
            task,
        });

        tracing::info!(port = label, "Serial link connected");
        Ok(())
    }

    /// Stop the reader and release the port.
    ///
    /// Returns once the reader task has ended. Safe to call at any time,
    /// including after the reader already exited on its own.
    pub async fn stop(&mut self) {
        if let Some(ActiveReader {
            label,
            stop_tx,
            mut task,
        }) = self.active.take()
        {
            let _ = stop_tx.send(());
            match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(?e, port = %label, "Serial reader ended abnormally"),
                Err(_) => {
                    tracing::warn!(port = %label, "Serial reader did not stop in time, aborting");
                    task.abort();
                    let _ = task.await;
                }
            }
            tracing::info!(port = %label, "Serial link stopped");
        }
        self.status_tx.send_replace(ConnectionState::Disconnected);
    }

    /// Reject a second reader; clear out one that has already exited.
    fn ensure_idle(&mut self) -> Result<(), LinkError> {
        if let Some(active) = &self.active {
            let exited = active.task.is_finished()
                || matches!(*self.status_tx.borrow(), ConnectionState::Failed(_));
            if !exited {
                return Err(LinkError::AlreadyActive(active.label.clone()));
            }
        }
        if let Some(stale) = self.active.take() {
            stale.task.abort();
            tracing::debug!(port = %stale.label, "Cleared exited serial reader");
            self.status_tx.send_replace(ConnectionState::Disconnected);
        }
        Ok(())
    }
}

/// Background task: read lines, parse them, publish the latest sample.
///
/// Runs until stopped (or the `SerialLink` is dropped) or until the stream fails.
async fn serial_read_loop<R>(
    mut reader: BufReader<R>,
    orientation: OrientationState,
    status_tx: Arc<watch::Sender<ConnectionState>>,
    mut stop_rx: oneshot::Receiver<()>,
    label: String,
) where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::with_capacity(128);
    let mut discarding = false;
    let mut sample_count: u64 = 0;

    loop {
        // `line` never holds more than MAX_LINE_LEN bytes between reads.
        let budget = (MAX_LINE_LEN + 1 - line.len()) as u64;
        let mut limited = (&mut reader).take(budget);
        tokio::select! {
            _ = &mut stop_rx => {
                tracing::debug!(port = %label, "Serial reader stop requested");
                break;
            }
            result = limited.read_until(b'\n', &mut line) => {
                match result {
                    Ok(0) => {
                        tracing::error!(port = %label, "Serial stream closed by device");
                        status_tx.send_replace(ConnectionState::Failed(
                            "serial stream closed by device".to_string(),
                        ));
                        break;
                    }
                    Ok(_) if line.last() == Some(&b'\n') => {
                        if discarding {
                            discarding = false;
                        } else if let Some(sample) = protocol::decode_line(&line) {
                            orientation.set(sample);
                            sample_count += 1;
                            if sample_count % 1000 == 0 {
                                tracing::debug!(sample_count, "Orientation samples received");
                            }
                        }
                        line.clear();
                    }
                    Ok(_) if line.len() > MAX_LINE_LEN => {
                        if !discarding {
                            tracing::trace!(port = %label, limit = MAX_LINE_LEN, "Discarding overlong line");
                            discarding = true;
                        }
                        line.clear();
                    }
                    // Stream ended mid-line; the next read reports the close.
                    Ok(_) => {}
                    // A read timeout just means the device is quiet; keep any partial line.
                    Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                    Err(e) => {
                        tracing::error!(?e, port = %label, "Serial read error");
                        status_tx.send_replace(ConnectionState::Failed(e.to_string()));
                        break;
                    }
                }
            }
        }
    }
}

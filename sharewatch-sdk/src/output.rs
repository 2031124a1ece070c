//! Notification sinks for completed cycles.

use std::path::PathBuf;
use std::sync::Arc;

use sharewatch_types::Snapshot;
use tokio::sync::mpsc;

/// Where a coordinator reports completed cycles.
///
/// Every completed cycle, successful or not, is emitted to every output.
/// The coordinator does not know or care who is listening.
#[derive(Debug)]
pub enum Output {
    /// Write the snapshot as pretty JSON to a file.
    ///
    /// The file is overwritten after each cycle.
    File(PathBuf),

    /// Send the snapshot through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<Arc<Snapshot>>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sharewatch_sdk::Output;
    ///
    /// let output = Output::file("units.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sharewatch_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive snapshots
    /// // while let Some(snapshot) = rx.recv().await {
    /// //     println!("cycle done, {} units", snapshot.len());
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Arc<Snapshot>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit a snapshot to this output.
    pub(crate) async fn emit(&self, snapshot: &Arc<Snapshot>) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(snapshot.as_ref())?;
                tokio::fs::write(path, json).await?;
            }
            Output::Channel(tx) => {
                // Best effort send (don't block the cycle if the channel is full)
                let _ = tx.try_send(Arc::clone(snapshot));
            }
        }
        Ok(())
    }
}

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Output captured from one stream, cut at the configured limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl CapturedOutput {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

struct BoundedBuffer {
    limit: usize,
    output: CapturedOutput,
}

impl BoundedBuffer {
    fn append(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.output.bytes.len());
        if chunk.len() > room {
            self.output.bytes.extend_from_slice(&chunk[..room]);
            self.output.truncated = true;
        } else {
            self.output.bytes.extend_from_slice(chunk);
        }
    }
}

/// A stream being drained into a bounded buffer by a background task.
pub struct Drain {
    buffer: Arc<Mutex<BoundedBuffer>>,
    task: JoinHandle<()>,
}

impl Drain {
    pub fn spawn<R>(name: &'static str, mut reader: R, limit: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(BoundedBuffer {
            limit,
            output: CapturedOutput::default(),
        }));

        let task = {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                // keeps reading past the limit so the writer never blocks on a full pipe
                let mut chunk = vec![0u8; CHUNK_SIZE];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => {
                            lock(&buffer).append(&chunk[..n]);
                        }
                        Err(err) => {
                            warn!(stream = name, %err, "failed to read child output");
                            break;
                        }
                    }
                }
            })
        };

        Self { buffer, task }
    }

    /// Waits for EOF until `deadline`, then takes whatever has been captured.
    pub async fn finish(self, deadline: Instant) -> CapturedOutput {
        let Self { buffer, mut task } = self;
        if time::timeout_at(deadline, &mut task).await.is_err() {
            debug!("output stream still open after the child was reaped");
            task.abort();
        }
        let mut guard = lock(&buffer);
        std::mem::take(&mut guard.output)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writes `data` and closes the stream.
pub fn feed<W>(mut writer: W, data: Vec<u8>) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let result: io::Result<()> = async {
            writer.write_all(&data).await?;
            writer.shutdown().await
        }
        .await;

        match result {
            Ok(()) => {}
            // the child exited or closed stdin without reading everything
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("stdin closed early by child")
            }
            Err(err) => warn!(%err, "failed to write child stdin"),
        }
        drop(writer);
    })
}

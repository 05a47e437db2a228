//! Storage Writer: bounded-queue sink that appends quantized rows to the
//! capture's `fft_data_<tag>.bin` file, then performs the two `config.cfg`
//! substitutions on sentinel (spec.md §4.4).
//!
//! Threading model grounded on `Aes67OutputStream`'s dedicated OS thread
//! driven by a bounded channel (here `std::sync::mpsc::sync_channel`, the
//! same backpressure shape as the teacher's ring-buffer-backed transmitter
//! loop, generalized to a plain bounded queue since the Writer's consumer
//! side — disk I/O — has no need for lock-free access).

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use regex::Regex;

use crate::dsp::SpectrumRow;
use crate::error::{CaptureError, Result};

pub const QUEUE_DEPTH: usize = 10;

enum Message {
    Row(SpectrumRow),
    End,
}

/// Handle to a running Writer thread. A disk write failure is fatal
/// (spec.md §7): the thread records the `io::Error` and exits without
/// running the sentinel substitutions, and both [`push`](Writer::push) and
/// [`close`](Writer::close) surface it as a `CaptureError::DiskWrite` so the
/// orchestrator can abort the capture with a non-zero exit.
pub struct Writer {
    sender: SyncSender<Message>,
    handle: JoinHandle<()>,
    path: PathBuf,
    failure: Arc<Mutex<Option<io::Error>>>,
}

impl Writer {
    /// Opens `fft_data_<tag>.bin` under `data_dir` and spawns the sink
    /// thread. `config_path` and `schedule_time` are the two values needed
    /// for the sentinel-triggered `config.cfg` substitution.
    pub fn open(
        data_dir: &Path,
        tag: &str,
        config_path: PathBuf,
        schedule_time: String,
    ) -> io::Result<Self> {
        let path = data_dir.join(format!("fft_data_{tag}.bin"));
        let mut file = File::create(&path)?;
        let (sender, receiver) = sync_channel::<Message>(QUEUE_DEPTH);
        let failure = Arc::new(Mutex::new(None));

        let thread_path = path.clone();
        let thread_failure = failure.clone();
        let handle = thread::spawn(move || {
            loop {
                match receiver.recv() {
                    Ok(Message::Row(row)) => {
                        if let Err(e) = file.write_all(&row) {
                            log::error!("disk write failure writing {}: {e}", thread_path.display());
                            *thread_failure.lock().unwrap() = Some(e);
                            return;
                        }
                    }
                    Ok(Message::End) | Err(_) => break,
                }
            }
            if let Err(e) = file.flush() {
                log::error!("disk write failure flushing {}: {e}", thread_path.display());
                *thread_failure.lock().unwrap() = Some(e);
                return;
            }
            drop(file);

            if let Err(e) = substitute_config(&config_path, &schedule_time) {
                // Non-fatal: the downstream collaborator polls config.cfg
                // and will simply notice it was not updated (spec.md §7).
                log::warn!(
                    "failed to update {}: {e}; downstream will poll and notice",
                    config_path.display()
                );
            }
        });

        Ok(Self {
            sender,
            handle,
            path,
            failure,
        })
    }

    /// Blocks if the queue is full, exerting the intended backpressure on
    /// the DSP tick loop. Returns the recorded disk failure once the sink
    /// thread has given up on this file.
    pub fn push(&self, row: SpectrumRow) -> Result<()> {
        if self.sender.send(Message::Row(row)).is_err() {
            return Err(self.take_failure());
        }
        Ok(())
    }

    /// Sends the sentinel, waits for the Writer to drain and close, and
    /// surfaces any disk failure recorded along the way.
    pub fn close(self) -> Result<()> {
        let _ = self.sender.send(Message::End);
        let _ = self.handle.join();
        match self.failure.lock().unwrap().take() {
            Some(e) => Err(CaptureError::DiskWrite {
                path: self.path.display().to_string(),
                source: e,
            }),
            None => Ok(()),
        }
    }

    fn take_failure(&self) -> CaptureError {
        let source = self
            .failure
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| io::Error::other("writer thread terminated unexpectedly"));
        CaptureError::DiskWrite {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Performs the two contracted `config.cfg` substitutions (spec.md §4.4/§6).
/// Idempotent: re-running against an already-updated file is a no-op.
fn substitute_config(path: &Path, schedule_time: &str) -> io::Result<()> {
    let contents = fs::read_to_string(path)?;

    let last_time = Regex::new(r"(?m)^last_time_scheluded=\S*\s*#.*$").unwrap();
    let contents = last_time.replace(&contents, |_: &regex::Captures| {
        format!("last_time_scheluded={schedule_time} #")
    });

    let generation = Regex::new(r"(?m)^control_external_generation=0\s*$").unwrap();
    let contents = generation.replace(&contents, "control_external_generation=1");

    fs::write(path, contents.as_bytes())
}

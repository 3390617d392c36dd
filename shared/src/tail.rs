//! Continuous line follower for the EVE log.
//!
//! Live streaming shells out to the OS follow utility (`tail -F`), which
//! starts at the current end of the file (no historical backfill), retries
//! across truncation, and reattaches by name when the log is rotated and
//! recreated. Each [`TailFollower`] owns exactly one child process; shutdown
//! escalates from SIGTERM to SIGKILL after a bounded grace period so a
//! disconnected subscriber can never leak an OS process.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

/// How long a follower gets to exit on SIGTERM before being killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One observation from a running follower.
#[derive(Debug)]
pub enum TailEvent {
    /// A newly appended line.
    Line(String),
    /// The follow process exited; carries its exit code when available.
    Exited(Option<i32>),
}

/// A handle to a running `tail -F` child following one file.
///
/// # Example
///
/// ```no_run
/// use shared::tail::{TailEvent, TailFollower};
/// use std::path::Path;
///
/// # async fn follow() -> std::io::Result<()> {
/// let mut follower = TailFollower::spawn(Path::new("/var/log/suricata/eve.json"))?;
/// match follower.next_event().await {
///     TailEvent::Line(line) => println!("{line}"),
///     TailEvent::Exited(code) => eprintln!("follower exited: {code:?}"),
/// }
/// follower.stop().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TailFollower {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl TailFollower {
    /// Starts following `path` from its current end.
    ///
    /// `-n 0` suppresses existing content and `-F` (follow by name with
    /// retry) keeps the follower attached across rotation: when the file is
    /// deleted and recreated under the same path, new content is picked up
    /// from the replacement.
    ///
    /// # Errors
    ///
    /// Returns an error if the follow utility cannot be spawned or its
    /// stdout cannot be captured.
    pub fn spawn(path: &Path) -> io::Result<Self> {
        let mut child = Command::new("tail")
            .arg("-n")
            .arg("0")
            .arg("-F")
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            io::Error::other("follow process spawned without captured stdout")
        })?;

        tracing::debug!(path = %path.display(), pid = ?child.id(), "Started log follower");

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
        })
    }

    /// Waits for the next line or for the follower to exit.
    ///
    /// Lines arrive in file append order. Once `Exited` has been returned
    /// the follower only ever reports `Exited` again.
    pub async fn next_event(&mut self) -> TailEvent {
        match self.lines.next_line().await {
            Ok(Some(line)) => TailEvent::Line(line),
            Ok(None) | Err(_) => {
                let code = self.child.wait().await.ok().and_then(|status| status.code());
                TailEvent::Exited(code)
            }
        }
    }

    /// Stops the follower, escalating from graceful to forced termination.
    ///
    /// Sends SIGTERM, waits up to the grace period for the child to exit,
    /// then SIGKILLs it. Always reaps the child, so no zombie remains.
    pub async fn stop(mut self) {
        if let Some(pid) = self.child.id().and_then(|id| i32::try_from(id).ok()) {
            let _ = signal::kill(Pid::from_raw(pid), Signal::SIGTERM);
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(_) => tracing::debug!("Log follower exited after SIGTERM"),
            Err(_) => {
                tracing::warn!("Log follower ignored SIGTERM, killing");
                let _ = self.child.kill().await;
            }
        }
    }
}

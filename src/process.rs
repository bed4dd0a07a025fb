use crate::error::CaseError;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// 30 seconds per command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a rendered command and returns its combined stdout and stderr.
///
/// A command that cannot be started, exits unsuccessfully or times out is
/// reported as an error. The first argument is the program.
pub trait Launcher: Send + Sync {
    fn launch(&self, args: &[String]) -> impl Future<Output = Result<Vec<u8>, CaseError>> + Send;
}

/// Spawns the binary under test as a child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    pub timeout: Duration,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProcessLauncher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match reader {
        Some(r) => r.read(buf).await,
        None => Ok(0),
    }
}

/// Drain both pipes into one buffer in the order the bytes arrive.
async fn capture_combined<O, E>(mut stdout: Option<O>, mut stderr: Option<E>) -> io::Result<Vec<u8>>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut combined = Vec::new();
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = read_chunk(&mut stdout, &mut out_buf), if stdout.is_some() => {
                match read? {
                    0 => stdout = None,
                    n => combined.extend_from_slice(&out_buf[..n]),
                }
            }
            read = read_chunk(&mut stderr, &mut err_buf), if stderr.is_some() => {
                match read? {
                    0 => stderr = None,
                    n => combined.extend_from_slice(&err_buf[..n]),
                }
            }
        }
    }
    Ok(combined)
}

impl Launcher for ProcessLauncher {
    async fn launch(&self, args: &[String]) -> Result<Vec<u8>, CaseError> {
        let (program, rest) = args.split_first().ok_or(CaseError::NotRendered)?;
        debug!(program = %program, args = ?rest, "spawning command");

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CaseError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            let combined = capture_combined(stdout, stderr).await?;
            let status = child.wait().await?;
            Ok::<_, io::Error>((status, combined))
        };

        let (status, combined) = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(done)) => done,
            Ok(Err(source)) => {
                return Err(CaseError::Capture {
                    program: program.clone(),
                    source,
                });
            }
            Err(_) => {
                warn!(program = %program, timeout_s = self.timeout.as_secs(), "command timed out; killing");
                return Err(CaseError::Timeout {
                    program: program.clone(),
                    timeout: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(CaseError::NonZeroExit {
                program: program.clone(),
                status,
                output: String::from_utf8_lossy(&combined).into_owned(),
            });
        }
        Ok(combined)
    }
}

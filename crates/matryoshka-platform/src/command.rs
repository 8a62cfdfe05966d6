use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command as StdCommand, Stdio};

/// Builder for a short-lived helper process (decoder, compressor).
#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
    capture_stderr: bool,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            inner: StdCommand::new(&program),
            program,
            capture_stderr: false,
        }
    }

    pub fn search_at(mut self, dir: PathBuf) -> Self {
        let exe_path = executable_in(&dir, &self.program);
        if exe_path.exists() {
            let args: Vec<_> = self.inner.get_args().map(|a| a.to_os_string()).collect();
            self.inner = StdCommand::new(exe_path);
            self.inner.args(args);
        }
        self
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn stdin(mut self, stdin: impl Into<Stdio>) -> Self {
        self.inner.stdin(stdin);
        self
    }

    pub fn stdout(mut self, stdout: impl Into<Stdio>) -> Self {
        self.inner.stdout(stdout);
        self
    }

    /// Send the helper's stderr to an anonymous file, read back if it fails.
    ///
    /// A file rather than a pipe, so a chatty helper can never stall on a
    /// full stderr buffer nobody is draining.
    pub fn capture_stderr(mut self) -> Self {
        self.capture_stderr = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn spawn(mut self) -> Result<Helper> {
        let stderr = if self.capture_stderr {
            let file = tempfile::tempfile()?;
            self.inner.stderr(Stdio::from(file.try_clone()?));
            Some(file)
        } else {
            self.inner.stderr(Stdio::inherit());
            None
        };

        let child = self.inner.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound {
                    cmd: self.program.clone(),
                }
            } else {
                Error::CommandFailed {
                    cmd: self.program.clone(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(cmd = %self.program, pid = child.id(), "spawned helper");

        Ok(Helper {
            child,
            program: self.program,
            stderr,
        })
    }
}

/// Whether `program` resolves on `PATH`.
pub fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Whether `program` sits in `dir`, falling back to `PATH`.
pub fn is_available_at(program: &str, dir: Option<&Path>) -> bool {
    dir.is_some_and(|dir| executable_in(dir, program).exists()) || is_available(program)
}

fn executable_in(dir: &Path, program: &str) -> PathBuf {
    #[cfg(target_os = "windows")]
    let exe_path = dir.join(format!("{program}.exe"));
    #[cfg(not(target_os = "windows"))]
    let exe_path = dir.join(program);
    exe_path
}

/// A running helper process whose exit status gates the caller's outcome.
#[derive(Debug)]
pub struct Helper {
    child: Child,
    program: String,
    stderr: Option<File>,
}

impl Helper {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn take_stdin(&mut self) -> Result<ChildStdin> {
        self.child.stdin.take().ok_or_else(|| Error::MissingPipe {
            cmd: self.program.clone(),
            stream: "stdin",
        })
    }

    pub fn take_stdout(&mut self) -> Result<ChildStdout> {
        self.child.stdout.take().ok_or_else(|| Error::MissingPipe {
            cmd: self.program.clone(),
            stream: "stdout",
        })
    }

    /// Wait for the helper and turn a nonzero exit into [`Error::HelperFailed`].
    pub fn wait_success(mut self) -> Result<()> {
        // Close our end of stdin so the helper sees EOF.
        drop(self.child.stdin.take());

        let status = self.child.wait().map_err(|e| Error::CommandFailed {
            cmd: self.program.clone(),
            source: e,
        })?;

        if status.success() {
            return Ok(());
        }

        let stderr = self.read_stderr();
        Err(Error::HelperFailed {
            cmd: self.program,
            status,
            stderr,
        })
    }

    /// Kill and reap the helper. Used when the caller gives up on its output.
    pub fn abort(mut self) {
        drop(self.child.stdin.take());
        drop(self.child.stdout.take());
        if let Err(e) = self.child.kill() {
            tracing::debug!(cmd = %self.program, error = %e, "helper already gone");
        }
        let _ = self.child.wait();
    }

    fn read_stderr(&mut self) -> String {
        let Some(file) = self.stderr.as_mut() else {
            return String::new();
        };
        let mut raw = Vec::new();
        if file.rewind().is_ok() {
            let _ = file.take(64 * 1024).read_to_end(&mut raw);
        }
        // Helpers echo member names, which need not be UTF-8.
        String::from_utf8_lossy(&raw).into_owned()
    }
}

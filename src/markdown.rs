//! Markdown-to-HTML conversion by delegating to an external pandoc process.
//!
//! The conversion itself is a black box behind the [`Render`] trait: text
//! in, HTML fragment out, or an error. Production code uses [`Pandoc`];
//! tests substitute their own implementation so no subprocess ever runs.

use std::fmt;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// The Markdown-conversion capability: one synchronous invocation per
/// document, no retry.
pub trait Render {
    fn render(&self, markdown: &str) -> Result<String>;
}

/// Converts Markdown by piping it through a pandoc subprocess.
pub struct Pandoc {
    program: PathBuf,
    from_format: String,
}

impl Pandoc {
    pub fn new(program: impl Into<PathBuf>, from_format: impl Into<String>) -> Pandoc {
        Pandoc {
            program: program.into(),
            from_format: from_format.into(),
        }
    }
}

impl Render for Pandoc {
    /// Pipes `markdown` to pandoc's stdin and reads the HTML fragment from
    /// its stdout. A missing executable or non-zero exit is an error; the
    /// process's stderr is surfaced verbatim to aid diagnosis.
    fn render(&self, markdown: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .arg("--from")
            .arg(&self.from_format)
            .arg("--to")
            .arg("html")
            .arg("--wrap=none")
            .arg("--no-highlight")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::NotFound {
                    program: self.program.clone(),
                },
                _ => Error::Io(e),
            })?;

        // A converter that exits before draining stdin closes the pipe; the
        // interesting failure is its exit status, not the broken pipe.
        let mut stdin = child.stdin.take().expect("stdin was piped");
        match stdin.write_all(markdown.as_bytes()) {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(Error::Io(e)),
            _ => {}
        }
        drop(stdin);

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The result of a fallible Markdown conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to convert Markdown to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned when the converter executable cannot be located.
    NotFound { program: PathBuf },

    /// Returned when the converter exits with a non-zero status. Carries
    /// the converter's captured stderr.
    Failed {
        status: Option<i32>,
        stderr: String,
    },

    /// Returned for other I/O errors while driving the subprocess.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { program } => {
                write!(f, "pandoc not found at `{}`", program.display())
            }
            Error::Failed { status, stderr } => match status {
                Some(code) => write!(f, "pandoc failed with exit code {}:\n{}", code, stderr),
                None => write!(f, "pandoc terminated by signal:\n{}", stderr),
            },
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for I/O on the subprocess pipes.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

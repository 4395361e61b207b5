//! Rendering of fenced ` ```mermaid ` blocks to inline SVG via the external
//! mermaid-cli (`mmdc`) renderer.
//!
//! Each block is rendered through a scratch directory that is removed on
//! every exit path. A block that fails to render is left untouched in the
//! source with a warning; only a failed attempt to provision the renderer
//! itself aborts the run.

use log::{info, warn};
use regex::Regex;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

static BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```mermaid\n(.*?)```").unwrap());
static XML_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\?xml[^>]*\?>\s*").unwrap());

/// mmdc renders text labels through HTML `foreignObject` elements by
/// default, which clips long labels; native SVG text does not.
fn render_config() -> String {
    serde_json::json!({
        "htmlLabels": false,
        "flowchart": { "htmlLabels": false }
    })
    .to_string()
}

const PACKAGE: &str = "@mermaid-js/mermaid-cli";

/// True if the document contains at least one mermaid fence, i.e. whether
/// resolving the renderer is worth the trouble.
pub fn has_diagrams(markdown: &str) -> bool {
    markdown.contains("```mermaid")
}

/// How the mermaid renderer will be invoked. `locate` walks the discovery
/// chain once per run: a binary on `PATH` is used directly, otherwise the
/// package-runner proxy, otherwise a one-time global install.
pub enum Mmdc {
    /// `mmdc` found on the execution path (or freshly installed).
    Direct(PathBuf),

    /// No `mmdc`, but `npx` can fetch and run the package.
    Npx,
}

impl Mmdc {
    /// Resolves the renderer, installing it globally as a last resort.
    pub fn locate() -> Result<Mmdc> {
        if let Some(path) = find_on_path("mmdc") {
            return Ok(Mmdc::Direct(path));
        }

        if find_on_path("npx").is_some() {
            info!("mmdc not found, will use npx to run it");
            return Ok(Mmdc::Npx);
        }

        info!("mmdc not found, installing {}", PACKAGE);
        global_install("npm")?;
        Ok(Mmdc::Direct(
            find_on_path("mmdc").unwrap_or_else(|| PathBuf::from("mmdc")),
        ))
    }

    fn command(&self) -> Command {
        match self {
            Mmdc::Direct(path) => Command::new(path),
            Mmdc::Npx => {
                let mut cmd = Command::new("npx");
                cmd.args(["-y", PACKAGE]);
                cmd
            }
        }
    }
}

/// Installs the mermaid-cli package globally. Any failure, including `npm`
/// itself being absent, is [`Error::Install`], whose message carries the
/// manual-install command.
fn global_install(npm: &str) -> Result<()> {
    let output = Command::new(npm)
        .args(["install", "-g", PACKAGE])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::Install {
                stderr: format!("`{}` not found on PATH", npm),
            },
            _ => Error::Io(e),
        })?;
    if !output.status.success() {
        return Err(Error::Install {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Replaces every mermaid fence in `markdown` with its rendered SVG.
///
/// A block whose render exits non-zero is kept byte-for-byte as-is and
/// reported on the error stream; later blocks are still processed. I/O
/// failures around the scratch directory do abort, as does nothing else.
pub fn render_diagrams(markdown: &str, mmdc: &Mmdc) -> Result<String> {
    let mut out = String::with_capacity(markdown.len());
    let mut last_end = 0;

    for captures in BLOCK.captures_iter(markdown) {
        let whole = captures.get(0).expect("group 0 always matches");
        out.push_str(&markdown[last_end..whole.start()]);
        match render_block(mmdc, &captures[1]) {
            Ok(svg) => out.push_str(&svg),
            Err(Error::Render { stderr }) => {
                warn!("mmdc failed: {}", stderr);
                out.push_str(whole.as_str());
            }
            Err(e) => return Err(e),
        }
        last_end = whole.end();
    }

    out.push_str(&markdown[last_end..]);
    Ok(out)
}

/// Renders one diagram body, returning the SVG with any leading XML
/// declaration removed.
fn render_block(mmdc: &Mmdc, code: &str) -> Result<String> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("diagram.mmd");
    let output_path = dir.path().join("diagram.svg");
    let config_path = dir.path().join("config.json");

    fs::write(&input_path, code)?;
    fs::write(&config_path, render_config())?;

    let output = mmdc
        .command()
        .arg("-i")
        .arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .arg("-c")
        .arg(&config_path)
        .args(["-b", "transparent"])
        .output()?;
    if !output.status.success() {
        return Err(Error::Render {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let svg = fs::read_to_string(&output_path)?;
    Ok(XML_DECL.replace(&svg, "").into_owned())
}

/// The result of a fallible diagram-rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure while provisioning or running the diagram renderer.
#[derive(Debug)]
pub enum Error {
    /// Returned when the global install of mermaid-cli fails. Fatal.
    Install { stderr: String },

    /// Returned when rendering one block fails; handled per block by
    /// keeping the original fence.
    Render { stderr: String },

    /// Returned for I/O problems around the scratch files.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Install { stderr } => write!(
                f,
                "Failed to install mermaid-cli: {}\nInstall manually with: npm install -g {}",
                stderr, PACKAGE
            ),
            Error::Render { stderr } => write!(f, "mmdc failed: {}", stderr),
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
    /// the `?` operator for scratch-file I/O.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    const DIAGRAM: &str = "intro\n\n```mermaid\ngraph TD;\nA-->B;\n```\n\noutro\n";

    #[test]
    fn test_no_diagrams_passes_through() {
        let text = "# plain\n\n```rust\nfn main() {}\n```\n";
        assert!(!has_diagrams(text));
        let rendered = render_diagrams(text, &Mmdc::Direct(PathBuf::from("false"))).unwrap();
        assert_eq!(rendered, text);
    }

    #[test]
    fn test_failed_render_keeps_block_intact() {
        // `false` exits non-zero without writing an output file.
        let rendered = render_diagrams(DIAGRAM, &Mmdc::Direct(PathBuf::from("false"))).unwrap();
        assert_eq!(rendered, DIAGRAM);
    }

    #[test]
    fn test_successful_render_substitutes_svg() {
        let rendered = render_diagrams(DIAGRAM, &fake_renderer()).unwrap();
        assert_eq!(rendered, "intro\n\n<svg>fake</svg>\n\noutro\n");
    }

    #[test]
    fn test_missing_npm_reported_with_install_hint() {
        match global_install("definitely-not-a-real-npm-binary") {
            Err(err @ Error::Install { .. }) => {
                let message = err.to_string();
                assert!(message.contains("npm install -g @mermaid-js/mermaid-cli"));
            }
            other => panic!("expected Install, got {:?}", other),
        }
    }

    #[test]
    fn test_xml_declaration_stripped() {
        assert_eq!(
            XML_DECL.replace("<?xml version=\"1.0\"?>\n<svg/>", ""),
            "<svg/>"
        );
    }

    #[test]
    fn test_multiple_blocks_rendered_independently() {
        let text = "```mermaid\na\n```\nmiddle\n```mermaid\nb\n```\n";
        let rendered = render_diagrams(text, &fake_renderer()).unwrap();
        assert_eq!(rendered, "<svg>fake</svg>\nmiddle\n<svg>fake</svg>\n");
    }

    /// A stand-in renderer: a shell script that writes a fixed SVG (with an
    /// XML declaration, which rendering must strip) to the `-o` path.
    fn fake_renderer() -> Mmdc {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let script = std::env::temp_dir().join(format!(
            "fake-mmdc-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(
            &script,
            "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi\n  shift\ndone\nprintf '<?xml version=\"1.0\"?>\\n<svg>fake</svg>' > \"$out\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        Mmdc::Direct(script)
    }
}

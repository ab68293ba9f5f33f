//! Image export through the Mermaid CLI (`mmdc`)

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, error, info};

/// Program name looked up on `PATH` when no override is given
pub const DEFAULT_MMDC: &str = "mmdc";

/// Image formats `mmdc` can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Image export error
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Output file '{path}' must end in .{expected} for {expected} output")]
    ExtensionMismatch { path: String, expected: &'static str },

    #[error("Mermaid CLI '{program}' not found; install it with `npm install -g @mermaid-js/mermaid-cli`")]
    NotFound { program: String },

    #[error("Mermaid CLI exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Check that `output` carries the extension of `format`
pub fn check_extension(output: &Path, format: ImageFormat) -> Result<(), ExportError> {
    let matches = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(format.extension()));
    if matches {
        Ok(())
    } else {
        Err(ExportError::ExtensionMismatch {
            path: output.display().to_string(),
            expected: format.extension(),
        })
    }
}

/// Path of the `.mmd` file written next to an image
pub fn mermaid_path(image: &Path) -> PathBuf {
    image.with_extension("mmd")
}

/// Write diagram text to `path`, creating parent directories
pub fn write_diagram(path: &Path, diagram: &str) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, diagram).map_err(io_err)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Runs the Mermaid CLI
#[derive(Debug, Clone)]
pub struct MermaidCli {
    program: PathBuf,
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::new(DEFAULT_MMDC)
    }
}

impl MermaidCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Convert a `.mmd` file to an image, removing a partial image on failure
    pub fn convert(&self, input: &Path, output: &Path) -> Result<(), ExportError> {
        info!(
            "Converting {} to {} with {}",
            input.display(),
            output.display(),
            self.program.display()
        );

        let result = Command::new(&self.program)
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ExportError::NotFound {
                    program: self.program.display().to_string(),
                });
            }
            Err(source) => {
                return Err(ExportError::Io {
                    path: self.program.display().to_string(),
                    source,
                });
            }
        };

        if out.status.success() {
            debug!("mmdc stdout: {}", String::from_utf8_lossy(&out.stdout).trim());
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        error!("mmdc failed: {stderr}");
        if output.exists() {
            if let Err(e) = std::fs::remove_file(output) {
                error!("Could not remove partial output {}: {e}", output.display());
            }
        }
        Err(ExportError::Failed {
            status: out.status.to_string(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_must_match_format() {
        assert!(check_extension(Path::new("out/chart.png"), ImageFormat::Png).is_ok());
        assert!(check_extension(Path::new("chart.SVG"), ImageFormat::Svg).is_ok());

        let err = check_extension(Path::new("chart.png"), ImageFormat::Svg).unwrap_err();
        assert!(err.to_string().contains("must end in .svg"));
        assert!(check_extension(Path::new("chart"), ImageFormat::Png).is_err());
    }

    #[test]
    fn mermaid_file_sits_next_to_image() {
        assert_eq!(
            mermaid_path(Path::new("out/plan.png")),
            PathBuf::from("out/plan.mmd")
        );
    }

    #[test]
    fn write_diagram_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/plan.mmd");

        write_diagram(&path, "gantt\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "gantt\n");
    }

    #[test]
    fn missing_program_gives_install_hint() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plan.mmd");
        write_diagram(&input, "gantt\n").unwrap();

        let cli = MermaidCli::new(dir.path().join("no-such-mmdc"));
        let err = cli.convert(&input, &dir.path().join("plan.png")).unwrap_err();

        assert!(matches!(err, ExportError::NotFound { .. }));
        assert!(err.to_string().contains("npm install -g @mermaid-js/mermaid-cli"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_run_removes_partial_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plan.mmd");
        let output = dir.path().join("plan.png");
        write_diagram(&input, "gantt\n").unwrap();
        std::fs::write(&output, b"partial").unwrap();

        // `false` ignores its arguments and exits 1
        let cli = MermaidCli::new("false");
        let err = cli.convert(&input, &output).unwrap_err();

        assert!(matches!(err, ExportError::Failed { .. }));
        assert!(!output.exists());
    }
}

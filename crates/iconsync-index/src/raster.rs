//! SVG rasterization through an external converter

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use crate::error::RasterizeError;

/// Converts vector icon bytes into raster image bytes
pub trait Rasterizer {
    fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>, RasterizeError>;
}

/// Rasterizes by piping the SVG through `rsvg-convert`.
///
/// Output is a `size`×`size` PNG, aspect ratio kept, flattened onto an
/// opaque white background.
#[derive(Debug, Clone)]
pub struct CommandRasterizer {
    program: String,
    size: u32,
}

impl Default for CommandRasterizer {
    fn default() -> Self {
        Self::new("rsvg-convert")
    }
}

impl CommandRasterizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            size: 128,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    fn command(&self) -> Command {
        let size = self.size.to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(["--width", &size, "--height", &size])
            .arg("--keep-aspect-ratio")
            .args(["--background-color", "white"])
            .args(["--format", "png"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Rasterizer for CommandRasterizer {
    fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>, RasterizeError> {
        let spawn_err = |source| RasterizeError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = self.command().spawn().map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            // A converter that dies early closes its end; its exit status says why
            if let Err(e) = stdin.write_all(svg) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(spawn_err(e));
                }
            }
        }

        let output = child.wait_with_output().map_err(spawn_err)?;

        if !output.status.success() {
            return Err(RasterizeError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(RasterizeError::Empty(self.program.clone()));
        }

        Ok(output.stdout)
    }
}

//! Graphviz `dot` invocation with a text fallback.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::core::constants::{defaults, render_formats};
use crate::core::error::{EpmError, Result};
use crate::render::dot::Digraph;
use crate::reporting::logging;

/// How a graph ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// `dot` produced an image at this path
    Rendered(PathBuf),
    /// A text listing was written instead
    TextFallback { path: PathBuf, reason: String },
}

impl RenderOutcome {
    pub fn path(&self) -> &Path {
        match self {
            RenderOutcome::Rendered(path) => path,
            RenderOutcome::TextFallback { path, .. } => path,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RenderOutcome::TextFallback { .. })
    }
}

/// Files written for one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGraph {
    pub dot_path: PathBuf,
    pub outcome: RenderOutcome,
}

#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    binary: String,
    format: String,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new(defaults::DOT_BINARY, render_formats::DEFAULT)
    }
}

/// Search `PATH` for an executable named `binary`.
pub fn find_in_path(binary: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let names: Vec<String> = if cfg!(windows) {
        vec![format!("{binary}.exe"), binary.to_string()]
    } else {
        vec![binary.to_string()]
    };
    std::env::split_paths(path_var?)
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

impl GraphvizRenderer {
    pub fn new(binary: &str, format: &str) -> Self {
        Self {
            binary: binary.to_string(),
            format: format.to_string(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Resolved path of the `dot` executable, if present.
    pub fn locate(&self) -> Option<PathBuf> {
        find_in_path(&self.binary, std::env::var_os("PATH").as_deref())
    }

    fn missing_binary(&self) -> EpmError {
        EpmError::Render(format!(
            "Graphviz executable '{}' not found on PATH",
            self.binary
        ))
    }

    /// Render a `.dot` file into `output` in the configured format.
    pub fn render_file(&self, dot_path: &Path, output: &Path) -> Result<()> {
        let binary = self.locate().ok_or_else(|| self.missing_binary())?;
        let result = Command::new(binary)
            .arg(format!("-T{}", self.format))
            .arg(dot_path)
            .arg("-o")
            .arg(output)
            .output()
            .map_err(|e| EpmError::Render(format!("could not run dot: {e}")))?;

        if !result.status.success() {
            return Err(EpmError::Render(format!(
                "dot exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        Ok(())
    }

    /// Render a graph to SVG markup through stdin/stdout.
    pub fn render_svg(&self, graph: &Digraph) -> Result<String> {
        let binary = self.locate().ok_or_else(|| self.missing_binary())?;
        let mut child = Command::new(binary)
            .arg("-Tsvg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EpmError::Render(format!("could not run dot: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(graph.to_dot().as_bytes())?;
        }
        let result = child.wait_with_output()?;
        if !result.status.success() {
            return Err(EpmError::Render(format!(
                "dot exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&result.stdout).into_owned())
    }

    /// Write `<stem>.dot`, then either the rendered image or `<stem>.txt`.
    ///
    /// Rendering problems never fail the call; only IO errors on the output
    /// directory do.
    pub fn write_graph(&self, graph: &Digraph, out_dir: &Path, stem: &str) -> Result<RenderedGraph> {
        let dot_path = out_dir.join(format!("{stem}.dot"));
        fs::write(&dot_path, graph.to_dot())?;

        let image_path = out_dir.join(format!("{stem}.{}", self.format));
        let outcome = match self.render_file(&dot_path, &image_path) {
            Ok(()) => RenderOutcome::Rendered(image_path),
            Err(e) => {
                let text_path = out_dir.join(format!("{stem}.txt"));
                fs::write(&text_path, graph.to_text())?;
                logging::log_render_fallback(stem, &e);
                RenderOutcome::TextFallback {
                    path: text_path,
                    reason: e.to_string(),
                }
            }
        };

        Ok(RenderedGraph { dot_path, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn graph() -> Digraph {
        let mut graph = Digraph::new("g");
        graph.add_node("A", "A (1)");
        graph.add_node("B", "B (1)");
        graph.add_edge("A", "B", "1", 1.0);
        graph
    }

    #[test]
    fn test_find_in_path_missing() {
        let dir = TempDir::new().unwrap();
        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert!(find_in_path("definitely-not-dot", Some(&path_var)).is_none());
        assert!(find_in_path("dot", None).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_present() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("fake-dot");
        fs::write(&fake, "#!/bin/sh\n").unwrap();
        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in_path("fake-dot", Some(&path_var)), Some(fake));
    }

    #[test]
    fn test_write_graph_falls_back_to_text() -> Result<()> {
        let dir = TempDir::new()?;
        let renderer = GraphvizRenderer::new("epmine-missing-dot", "png");
        let rendered = renderer.write_graph(&graph(), dir.path(), "process")?;

        assert!(rendered.dot_path.ends_with("process.dot"));
        assert!(rendered.outcome.is_fallback());
        assert!(rendered.outcome.path().ends_with("process.txt"));
        let text = fs::read_to_string(rendered.outcome.path())?;
        assert!(text.contains("A -> B [1]"));
        match rendered.outcome {
            RenderOutcome::TextFallback { reason, .. } => assert!(reason.contains("not found")),
            other => panic!("Expected fallback, got {other:?}"),
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_dot_also_falls_back() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let fake = dir.path().join("broken-dot");
        fs::write(&fake, "#!/bin/sh\necho boom >&2\nexit 3\n")?;
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755))?;

        let renderer = GraphvizRenderer::new(&fake.to_string_lossy(), "png");
        let rendered = renderer.write_graph(&graph(), dir.path(), "process")?;
        match rendered.outcome {
            RenderOutcome::TextFallback { reason, .. } => assert!(reason.contains("boom")),
            other => panic!("Expected fallback, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_render_svg_without_dot() {
        let renderer = GraphvizRenderer::new("epmine-missing-dot", "svg");
        assert!(matches!(renderer.render_svg(&graph()), Err(EpmError::Render(_))));
    }
}

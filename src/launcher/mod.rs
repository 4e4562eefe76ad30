//! Dashboard launcher
//!
//! Starts the minimal and the enhanced dashboard as two independent child
//! processes and returns immediately. The children share nothing and are
//! shut down by hand; a port already in use only shows up in the child's
//! own output.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::core::constants::dataset;
use crate::core::error::{EpmError, Result};
use crate::core::types::DashboardVariant;
use crate::reporting::logging;

/// One dashboard process to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub variant: DashboardVariant,
    pub port: u16,
    /// Directory the child runs in
    pub working_dir: PathBuf,
}

/// Starts a detached process for a [`SpawnRequest`] and returns its PID.
pub trait ProcessSpawner {
    fn spawn(&mut self, request: &SpawnRequest) -> Result<u32>;
}

/// Re-invokes an executable (normally the running `epmine` binary) as
/// `dashboard --variant <v> --port <p>`.
pub struct CommandSpawner {
    program: PathBuf,
}

impl CommandSpawner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Spawner for the currently running executable
    pub fn current_exe() -> Result<Self> {
        let program = std::env::current_exe().map_err(|e| {
            EpmError::Launch(format!("Could not locate the epmine executable: {e}"))
        })?;
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, request: &SpawnRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("dashboard")
            .arg("--variant")
            .arg(request.variant.name())
            .arg("--port")
            .arg(request.port.to_string())
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl ProcessSpawner for CommandSpawner {
    fn spawn(&mut self, request: &SpawnRequest) -> Result<u32> {
        // The child is never waited on; it outlives the launcher
        let child = self.command(request).spawn().map_err(|e| {
            EpmError::Launch(format!(
                "Failed to start the {} dashboard ({}): {e}",
                request.variant,
                self.program.display()
            ))
        })?;
        Ok(child.id())
    }
}

/// Walk up from `start` to the first directory holding the dashboard data:
/// the folder of the bundled sample log or the default EPM dataset.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let sample_dir = Path::new(dataset::SAMPLE_LOG).parent()?;
    start
        .ancestors()
        .find(|dir| dir.join(sample_dir).is_dir() || dir.join(dataset::DEFAULT_DATASET).is_dir())
        .map(Path::to_path_buf)
}

/// Root the dashboards run in when none is given: the project directory
/// around the `epmine` executable, else the current directory.
pub fn default_launch_root() -> Result<PathBuf> {
    let from_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(find_project_root));
    match from_exe {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

/// A started dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchedDashboard {
    pub variant: DashboardVariant,
    pub port: u16,
    pub pid: u32,
}

impl LaunchedDashboard {
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaunchReport {
    pub children: Vec<LaunchedDashboard>,
}

impl LaunchReport {
    pub fn ports(&self) -> Vec<u16> {
        self.children.iter().map(|c| c.port).collect()
    }
}

/// Starts both dashboards, minimal first.
pub struct Launcher<S: ProcessSpawner> {
    spawner: S,
}

impl<S: ProcessSpawner> Launcher<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }

    /// Spawn exactly one process per dashboard variant on its fixed port.
    ///
    /// Stops at the first process the OS refuses to start; a child already
    /// running keeps running.
    pub fn launch(&mut self, root: &Path) -> Result<LaunchReport> {
        let mut report = LaunchReport::default();
        for variant in DashboardVariant::ALL {
            let request = SpawnRequest {
                variant,
                port: variant.port(),
                working_dir: root.to_path_buf(),
            };
            let pid = self.spawner.spawn(&request)?;
            logging::log_dashboard_spawned(variant.name(), request.port, pid);
            report.children.push(LaunchedDashboard {
                variant,
                port: request.port,
                pid,
            });
        }
        Ok(report)
    }

    pub fn into_spawner(self) -> S {
        self.spawner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSpawner {
        requests: Vec<SpawnRequest>,
        fail_on: Option<DashboardVariant>,
    }

    impl ProcessSpawner for RecordingSpawner {
        fn spawn(&mut self, request: &SpawnRequest) -> Result<u32> {
            if self.fail_on == Some(request.variant) {
                return Err(EpmError::Launch("refused".to_string()));
            }
            self.requests.push(request.clone());
            Ok(1000 + self.requests.len() as u32)
        }
    }

    #[test]
    fn test_launch_starts_exactly_two_dashboards() {
        let mut launcher = Launcher::new(RecordingSpawner::default());
        let report = launcher.launch(Path::new("/srv/epm")).unwrap();

        assert_eq!(report.children.len(), 2);
        assert_eq!(report.ports(), vec![8501, 8502]);
        assert_eq!(report.children[0].variant, DashboardVariant::Minimal);
        assert_eq!(report.children[1].variant, DashboardVariant::Enhanced);
        assert_ne!(report.children[0].pid, report.children[1].pid);
        assert_eq!(report.children[1].url(), "http://localhost:8502");

        let spawner = launcher.into_spawner();
        assert_eq!(spawner.requests.len(), 2);
        assert!(
            spawner
                .requests
                .iter()
                .all(|r| r.working_dir == Path::new("/srv/epm"))
        );
    }

    #[test]
    fn test_launch_ports_are_distinct_and_fixed() {
        let mut first = Launcher::new(RecordingSpawner::default());
        let mut second = Launcher::new(RecordingSpawner::default());
        let a = first.launch(Path::new(".")).unwrap();
        let b = second.launch(Path::new("/tmp")).unwrap();
        assert_eq!(a.ports(), b.ports());
        assert_ne!(a.ports()[0], a.ports()[1]);
    }

    #[test]
    fn test_launch_reports_spawn_failure() {
        let spawner = RecordingSpawner {
            fail_on: Some(DashboardVariant::Enhanced),
            ..Default::default()
        };
        let mut launcher = Launcher::new(spawner);
        let result = launcher.launch(Path::new("."));
        assert!(matches!(result, Err(EpmError::Launch(_))));
        assert_eq!(launcher.into_spawner().requests.len(), 1);
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("target/release");
        std::fs::create_dir_all(&bin).unwrap();
        assert_eq!(find_project_root(&bin), None);

        std::fs::create_dir(dir.path().join("data")).unwrap();
        assert_eq!(find_project_root(&bin), Some(dir.path().to_path_buf()));
        assert_eq!(find_project_root(dir.path()), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_project_root_by_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("tools/bin");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(dir.path().join("tools").join(dataset::DEFAULT_DATASET)).unwrap();
        assert_eq!(find_project_root(&nested), Some(dir.path().join("tools")));
    }

    #[test]
    fn test_default_launch_root_is_a_directory() {
        assert!(default_launch_root().unwrap().is_dir());
    }

    #[test]
    fn test_command_spawner_arguments() {
        let spawner = CommandSpawner::new("/usr/local/bin/epmine");
        let request = SpawnRequest {
            variant: DashboardVariant::Enhanced,
            port: 8502,
            working_dir: PathBuf::from("/srv/epm"),
        };
        let cmd = spawner.command(&request);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["dashboard", "--variant", "enhanced", "--port", "8502"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/srv/epm")));
        assert_eq!(spawner.program(), Path::new("/usr/local/bin/epmine"));
    }

    #[test]
    fn test_command_spawner_missing_program() {
        let mut spawner = CommandSpawner::new("/nonexistent/epmine-binary");
        let request = SpawnRequest {
            variant: DashboardVariant::Minimal,
            port: 8501,
            working_dir: std::env::temp_dir(),
        };
        match spawner.spawn(&request) {
            Err(EpmError::Launch(msg)) => assert!(msg.contains("minimal")),
            other => panic!("expected launch error, got {other:?}"),
        }
    }
}

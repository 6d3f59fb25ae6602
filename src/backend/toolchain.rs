//! External tool invocation
//!
//! SpiceView delegates all heavy lifting to two external programs: the
//! schematic exporter (`kicad-cli sch export netlist`) and the circuit
//! simulator (`ngspice -b`). This module builds those command lines, runs
//! them with captured exit status and stderr, and honors a cancellation
//! token by killing the child process.
//!
//! Both tools run against a per-session work directory: the netlist is
//! exported into it and the simulator runs with it as working directory, so
//! the fixed-name rawfile lands there instead of the application's cwd.

use crate::config::ToolSettings;
use crate::error::{Result, SpiceViewError};
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Netlist filename inside the work directory
pub const NETLIST_FILE_NAME: &str = "netlist.cir";

/// Fixed rawfile name written by the simulator's batch mode
pub const RAW_FILE_NAME: &str = "rawspice.raw";

/// Poll interval while waiting for a child process
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle on the configured external tools and the session work directory
#[derive(Debug, Clone)]
pub struct Toolchain {
    exporter: String,
    simulator: String,
    work_dir: PathBuf,
}

impl Toolchain {
    pub fn new(tools: &ToolSettings, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            exporter: tools.exporter_path.clone(),
            simulator: tools.simulator_path.clone(),
            work_dir: work_dir.into(),
        }
    }

    /// Path the exporter writes the netlist to
    pub fn netlist_path(&self) -> PathBuf {
        self.work_dir.join(NETLIST_FILE_NAME)
    }

    /// Path the simulator writes the rawfile to
    pub fn rawfile_path(&self) -> PathBuf {
        self.work_dir.join(RAW_FILE_NAME)
    }

    /// Export the schematic to a SPICE netlist
    ///
    /// Runs `<exporter> sch export netlist --output <work>/netlist.cir
    /// --format spice <schematic>` and returns the netlist path.
    pub fn export_netlist(&self, schematic: &Path, cancel: &AtomicBool) -> Result<PathBuf> {
        let netlist = self.netlist_path();

        let mut cmd = Command::new(&self.exporter);
        cmd.args(export_args(&netlist, schematic));
        run_tool("exporter", &self.exporter, cmd, cancel)?;

        if !netlist.is_file() {
            return Err(SpiceViewError::MissingOutput {
                tool: "exporter".to_string(),
                path: netlist,
            });
        }

        tracing::debug!("exported netlist to {:?}", netlist);
        Ok(netlist)
    }

    /// Simulate a netlist in batch mode
    ///
    /// Runs `<simulator> -b <netlist>` with the work directory as the
    /// child's cwd and returns the path of the produced rawfile.
    pub fn run_simulation(&self, netlist: &Path, cancel: &AtomicBool) -> Result<PathBuf> {
        let rawfile = self.rawfile_path();

        // Stale output from a previous run must not masquerade as fresh
        // results when the simulator fails.
        if rawfile.exists() {
            std::fs::remove_file(&rawfile)?;
        }

        let mut cmd = Command::new(&self.simulator);
        cmd.args(simulate_args(netlist));
        cmd.current_dir(&self.work_dir);
        run_tool("simulator", &self.simulator, cmd, cancel)?;

        if !rawfile.is_file() {
            return Err(SpiceViewError::MissingOutput {
                tool: "simulator".to_string(),
                path: rawfile,
            });
        }

        tracing::debug!("simulation wrote {:?}", rawfile);
        Ok(rawfile)
    }

    /// Open the exported netlist in the OS default viewer, detached
    pub fn open_netlist_in_viewer(&self, netlist: &Path) -> Result<()> {
        let (opener, args): (&str, Vec<OsString>) = if cfg!(target_os = "macos") {
            ("open", vec![netlist.into()])
        } else if cfg!(target_os = "windows") {
            ("cmd", vec!["/C".into(), "start".into(), "".into(), netlist.into()])
        } else {
            ("xdg-open", vec![netlist.into()])
        };

        Command::new(opener)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| map_spawn_error(e, "viewer", opener))?;
        Ok(())
    }
}

/// Argument list for the netlist export invocation
fn export_args(netlist: &Path, schematic: &Path) -> Vec<OsString> {
    vec![
        "sch".into(),
        "export".into(),
        "netlist".into(),
        "--output".into(),
        netlist.into(),
        "--format".into(),
        "spice".into(),
        schematic.into(),
    ]
}

/// Argument list for the batch simulation invocation
fn simulate_args(netlist: &Path) -> Vec<OsString> {
    vec!["-b".into(), netlist.into()]
}

fn map_spawn_error(err: std::io::Error, tool: &str, path: &str) -> SpiceViewError {
    if err.kind() == std::io::ErrorKind::NotFound {
        SpiceViewError::ToolNotFound {
            tool: tool.to_string(),
            path: path.to_string(),
        }
    } else {
        SpiceViewError::Io(err)
    }
}

/// Run a tool to completion, capturing stderr and honoring cancellation
///
/// The child's stderr is drained on a separate thread so a chatty tool
/// cannot fill the pipe and deadlock against the polling wait loop. On
/// cancellation the child is killed and `Cancelled` is returned.
pub(crate) fn run_tool(
    tool: &str,
    path: &str,
    mut cmd: Command,
    cancel: &AtomicBool,
) -> Result<()> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());

    tracing::info!("running {}: {:?}", tool, cmd);

    let mut child = cmd.spawn().map_err(|e| map_spawn_error(e, tool, path))?;

    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    let status = loop {
        if cancel.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SpiceViewError::Cancelled);
        }
        match child.try_wait()? {
            Some(status) => break status,
            None => std::thread::sleep(WAIT_POLL_INTERVAL),
        }
    };

    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    if !status.success() {
        return Err(SpiceViewError::Toolchain {
            tool: tool.to_string(),
            status: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    if !stderr.trim().is_empty() {
        tracing::debug!("{} stderr: {}", tool, stderr.trim());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain(work_dir: &Path) -> Toolchain {
        let tools = ToolSettings {
            exporter_path: "kicad-cli".to_string(),
            simulator_path: "ngspice".to_string(),
        };
        Toolchain::new(&tools, work_dir)
    }

    #[test]
    fn test_export_command_line() {
        let args = export_args(
            Path::new("/work/netlist.cir"),
            Path::new("/designs/amp.kicad_sch"),
        );
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            vec![
                "sch",
                "export",
                "netlist",
                "--output",
                "/work/netlist.cir",
                "--format",
                "spice",
                "/designs/amp.kicad_sch",
            ]
        );
    }

    #[test]
    fn test_simulate_command_line() {
        let args = simulate_args(Path::new("/work/netlist.cir"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, vec!["-b", "/work/netlist.cir"]);
    }

    #[test]
    fn test_output_paths_live_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tc = toolchain(dir.path());
        assert_eq!(tc.netlist_path(), dir.path().join(NETLIST_FILE_NAME));
        assert_eq!(tc.rawfile_path(), dir.path().join(RAW_FILE_NAME));
    }

    #[test]
    fn test_missing_binary_is_tool_not_found() {
        let cancel = AtomicBool::new(false);
        let cmd = Command::new("/definitely/not/here/kicad-cli");
        let err = run_tool("exporter", "/definitely/not/here/kicad-cli", cmd, &cancel).unwrap_err();
        assert!(matches!(err, SpiceViewError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_captures_status_and_stderr() {
        let cancel = AtomicBool::new(false);
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "echo simulation blew up >&2; exit 3"]);

        let err = run_tool("simulator", "/bin/sh", cmd, &cancel).unwrap_err();
        match err {
            SpiceViewError::Toolchain {
                tool,
                status,
                stderr,
            } => {
                assert_eq!(tool, "simulator");
                assert_eq!(status, Some(3));
                assert!(stderr.contains("simulation blew up"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_cancellation_kills_child() {
        let cancel = AtomicBool::new(true);
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "sleep 30"]);

        let start = std::time::Instant::now();
        let err = run_tool("simulator", "/bin/sh", cmd, &cancel).unwrap_err();
        assert!(matches!(err, SpiceViewError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

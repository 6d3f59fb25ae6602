//! Background simulation jobs
//!
//! External tools can run for minutes, so they never run on the UI thread.
//! Each user action that invokes the toolchain spawns one [`SimJob`]: a
//! worker thread that walks the export → simulate → read pipeline and
//! reports stage changes and the final result over a crossbeam channel the
//! UI polls non-blockingly each frame.
//!
//! Cancellation is a shared `AtomicBool`; the toolchain's wait loop checks
//! it and kills the child process, so a cancelled job ends promptly even
//! mid-simulation.

use crate::backend::rawfile::read_rawfile;
use crate::backend::toolchain::Toolchain;
use crate::config::ToolSettings;
use crate::error::{Result, SpiceViewError};
use crate::types::Waveform;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a job is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Export, simulate, read the rawfile
    Resimulate,
    /// Export only, then open the netlist in the OS viewer
    ShowNetlist,
}

/// Pipeline stage a running job is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStage {
    Exporting,
    Simulating,
    Reading,
}

impl std::fmt::Display for SimStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimStage::Exporting => write!(f, "Exporting netlist..."),
            SimStage::Simulating => write!(f, "Simulating..."),
            SimStage::Reading => write!(f, "Reading waveform..."),
        }
    }
}

/// Successful job outcome
#[derive(Debug)]
pub enum JobOutput {
    /// Resimulation produced a waveform
    Waveform(Box<Waveform>),
    /// Netlist was exported and handed to the viewer
    Netlist(PathBuf),
}

/// Events a job sends back to the UI
#[derive(Debug)]
pub enum SimEvent {
    Stage(SimStage),
    Finished(Result<JobOutput>),
}

/// Handle on one in-flight background job
pub struct SimJob {
    kind: JobKind,
    events: Receiver<SimEvent>,
    cancel: Arc<AtomicBool>,
}

impl SimJob {
    /// Spawn a worker thread for the given schematic
    pub fn spawn(
        kind: JobKind,
        tools: ToolSettings,
        work_dir: PathBuf,
        schematic: PathBuf,
    ) -> Self {
        let (tx, rx) = bounded(8);
        let cancel = Arc::new(AtomicBool::new(false));

        let worker_cancel = cancel.clone();
        std::thread::spawn(move || {
            let result = run_job(kind, &tools, work_dir, &schematic, &tx, &worker_cancel);
            // The receiver going away just means the app closed mid-job.
            let _ = tx.send(SimEvent::Finished(result));
        });

        Self {
            kind,
            events: rx,
            cancel,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Non-blocking poll for the next event
    pub fn try_event(&self) -> Option<SimEvent> {
        self.events.try_recv().ok()
    }

    /// Request cancellation; the worker kills its child process
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

fn run_job(
    kind: JobKind,
    tools: &ToolSettings,
    work_dir: PathBuf,
    schematic: &std::path::Path,
    tx: &Sender<SimEvent>,
    cancel: &AtomicBool,
) -> Result<JobOutput> {
    let toolchain = Toolchain::new(tools, work_dir);

    let _ = tx.send(SimEvent::Stage(SimStage::Exporting));
    let netlist = toolchain.export_netlist(schematic, cancel)?;

    match kind {
        JobKind::ShowNetlist => {
            toolchain.open_netlist_in_viewer(&netlist)?;
            Ok(JobOutput::Netlist(netlist))
        }
        JobKind::Resimulate => {
            let _ = tx.send(SimEvent::Stage(SimStage::Simulating));
            let rawfile = toolchain.run_simulation(&netlist, cancel)?;

            let _ = tx.send(SimEvent::Stage(SimStage::Reading));
            if cancel.load(Ordering::Relaxed) {
                return Err(SpiceViewError::Cancelled);
            }
            let waveform = read_rawfile(&rawfile)?;
            tracing::info!(
                "loaded {} signals x {} points from {:?}",
                waveform.traces.len(),
                waveform.points(),
                rawfile
            );
            Ok(JobOutput::Waveform(Box::new(waveform)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain_final_event(job: &SimJob) -> SimEvent {
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(event) = job.try_event() {
                if matches!(event, SimEvent::Finished(_)) {
                    return event;
                }
                continue;
            }
            assert!(std::time::Instant::now() < deadline, "job never finished");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_job_with_missing_exporter_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolSettings {
            exporter_path: "/definitely/not/here/kicad-cli".to_string(),
            simulator_path: "/definitely/not/here/ngspice".to_string(),
        };

        let job = SimJob::spawn(
            JobKind::Resimulate,
            tools,
            dir.path().to_path_buf(),
            dir.path().join("amp.kicad_sch"),
        );

        match drain_final_event(&job) {
            SimEvent::Finished(Err(SpiceViewError::ToolNotFound { tool, .. })) => {
                assert_eq!(tool, "exporter");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resimulate_runs_full_pipeline_with_stub_tools() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();

        // Stub exporter writes the requested netlist; stub simulator writes
        // an ASCII rawfile into its cwd.
        let exporter = dir.path().join("fake-kicad-cli");
        std::fs::write(
            &exporter,
            "#!/bin/sh\nwhile [ $# -gt 1 ]; do\n  if [ \"$1\" = \"--output\" ]; then out=\"$2\"; fi\n  shift\ndone\necho '* netlist' > \"$out\"\n",
        )
        .unwrap();

        let simulator = dir.path().join("fake-ngspice");
        std::fs::write(
            &simulator,
            concat!(
                "#!/bin/sh\n",
                "cat > rawspice.raw <<'EOF'\n",
                "Title: stub\n",
                "Plotname: Transient Analysis\n",
                "Flags: real\n",
                "No. Variables: 2\n",
                "No. Points: 2\n",
                "Variables:\n",
                "\t0\ttime\ttime\n",
                "\t1\tv(out)\tvoltage\n",
                "Values:\n",
                " 0\t0.0\n",
                "\t1.5\n",
                " 1\t1.0\n",
                "\t2.5\n",
                "EOF\n",
            ),
        )
        .unwrap();

        for tool in [&exporter, &simulator] {
            let mut perms = std::fs::metadata(tool).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(tool, perms).unwrap();
        }

        let tools = ToolSettings {
            exporter_path: exporter.display().to_string(),
            simulator_path: simulator.display().to_string(),
        };

        let job = SimJob::spawn(
            JobKind::Resimulate,
            tools,
            work.clone(),
            dir.path().join("amp.kicad_sch"),
        );

        match drain_final_event(&job) {
            SimEvent::Finished(Ok(JobOutput::Waveform(wf))) => {
                assert_eq!(wf.names().collect::<Vec<_>>(), vec!["v(out)"]);
                assert_eq!(wf.trace("v(out)").unwrap().values, vec![1.5, 2.5]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

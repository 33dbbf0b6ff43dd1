//! Spawn, drain, route, wait.

use crate::pipeline::capture::{self, Captured, StageChannels};
use crate::pipeline::report::{ChannelReport, RunReport, StageReport};
use crate::pipeline::spawn::{self, PipelinePlan, SpawnedStage};
use crate::routing::{Destination, Functionality, RoutingTable};
use crate::Result;

use anyhow::{Context, anyhow};
use std::io::Write;
use std::process::{Child, Stdio};
use tracing::{debug, info, warn};

/// Run the three-stage pipeline and route the captured buffers.
///
/// Stage I inherits our stdin. Nothing is written to `stdout`/`stderr` unless
/// every stage spawned and every channel was drained to end-of-stream. A stage
/// that exits unsuccessfully still has its buffers routed; the report records
/// the failure.
///
/// There is no timeout: a stage that never closes its output hangs the run.
///
/// Log events are written to our own stderr after routing. When stderr is also
/// a destination, a failed stage's warning follows the routed bytes there;
/// `RUST_LOG=off` keeps that stream pure data.
pub fn run(
    plan: &PipelinePlan,
    routes: &RoutingTable,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<RunReport> {
    let mut children: Vec<(String, Child)> = Vec::with_capacity(3);

    let source = spawn::spawn(&plan.source, Stdio::inherit())?;
    children.push((source.label, source.child));

    let performance = spawn::spawn(&plan.performance, Stdio::from(source.primary))
        .inspect_err(|_| terminate_all(&mut children))?;
    let performance = register(&mut children, performance);

    let rating = spawn::spawn(&plan.rating, Stdio::from(source.secondary))
        .inspect_err(|_| terminate_all(&mut children))?;
    let rating = register(&mut children, rating);

    info!(
        stages = children.len(),
        routed = routes.len(),
        "pipeline running"
    );

    let [performance, rating]: [_; 2] = capture::drain_stages(vec![performance, rating])
        .inspect_err(|_| terminate_all(&mut children))?
        .try_into()
        .map_err(|_| anyhow!("expected output from exactly two stages"))?;
    let captured = Captured {
        performance,
        rating,
    };

    let channels =
        route(&captured, routes, stdout, stderr).inspect_err(|_| terminate_all(&mut children))?;

    let stages = settle_all(children, |(label, mut child)| {
        let status = child
            .wait()
            .with_context(|| format!("wait for {} stage", label))?;
        if status.success() {
            debug!(stage = %label, "exited");
        } else {
            warn!(stage = %label, %status, "stage exited abnormally");
        }
        Ok(StageReport {
            stage: label,
            success: status.success(),
            exit_code: status.code(),
        })
    })?;

    Ok(RunReport {
        routes: routes.clone(),
        stages,
        channels,
    })
}

/// Write each routed buffer verbatim to its destination; drop the rest.
pub fn route(
    captured: &Captured,
    routes: &RoutingTable,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<Vec<ChannelReport>> {
    let mut reports = Vec::with_capacity(Functionality::ALL.len());

    for func in Functionality::ALL {
        let buf = captured.buffer(func);
        let dest = routes.get(func);

        match dest {
            Some(dest) => {
                let out: &mut dyn Write = match dest {
                    Destination::Stdout => &mut *stdout,
                    Destination::Stderr => &mut *stderr,
                };
                out.write_all(buf.as_bytes())
                    .and_then(|()| out.flush())
                    .with_context(|| format!("route {} to {}", func, dest))?;
                debug!(%func, %dest, bytes = buf.len(), "routed");
            }
            None => debug!(%func, bytes = buf.len(), "discarded"),
        }

        reports.push(ChannelReport {
            functionality: func,
            bytes: buf.len(),
            routed_to: dest,
        });
    }

    Ok(reports)
}

/// Apply `f` to every item, carrying on past failures; the first error wins.
fn settle_all<T, R>(
    items: impl IntoIterator<Item = T>,
    mut f: impl FnMut(T) -> Result<R>,
) -> Result<Vec<R>> {
    let mut done = Vec::new();
    let mut first_err = None;
    for item in items {
        match f(item) {
            Ok(r) => done.push(r),
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(done),
    }
}

fn register(children: &mut Vec<(String, Child)>, stage: SpawnedStage) -> StageChannels {
    let SpawnedStage {
        label,
        child,
        primary,
        secondary,
    } = stage;
    children.push((label.clone(), child));
    StageChannels {
        label,
        primary: Box::new(primary),
        secondary: Box::new(secondary),
    }
}

fn terminate_all(children: &mut Vec<(String, Child)>) {
    for (label, child) in children.iter_mut() {
        spawn::terminate(label, child);
    }
    children.clear();
}

//! Stage commands and the spawn step that wires their stdio.

use crate::stage::StageKind;
use crate::Result;

use anyhow::{Context, bail};
use std::ffi::OsString;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use tracing::{debug, warn};

/// Program + arguments for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    pub label: String,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl StageCommand {
    pub fn new(label: impl Into<String>, program: impl Into<OsString>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// The three commands that make up one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePlan {
    /// Stage I: external transformer; stdout feeds `performance`, stderr feeds `rating`.
    pub source: StageCommand,
    /// Stage II.
    pub performance: StageCommand,
    /// Stage III.
    pub rating: StageCommand,
}

impl PipelinePlan {
    /// Stages II and III re-run this executable's hidden `stage` subcommand.
    pub fn with_current_exe(source: StageCommand, strict: bool) -> Result<Self> {
        let exe = std::env::current_exe().context("locate current executable")?;
        Ok(Self::with_stage_program(source, exe, strict))
    }

    pub fn with_stage_program(
        source: StageCommand,
        program: impl Into<OsString>,
        strict: bool,
    ) -> Self {
        let program = program.into();
        let stage = |kind: StageKind| {
            let cmd = StageCommand::new(kind.as_str(), program.clone())
                .arg("stage")
                .arg(kind.as_str());
            if strict { cmd.arg("--strict") } else { cmd }
        };

        Self {
            source,
            performance: stage(StageKind::Performance),
            rating: stage(StageKind::Rating),
        }
    }
}

/// A running stage with both output channels still unread.
#[derive(Debug)]
pub struct SpawnedStage {
    pub label: String,
    pub child: Child,
    pub primary: ChildStdout,
    pub secondary: ChildStderr,
}

/// Start `cmd` reading from `stdin`, with stdout and stderr piped back to us.
///
/// The `Command` is dropped before returning, so our copy of a piped `stdin`
/// is closed and the child sees end-of-stream when its writer exits.
pub fn spawn(cmd: &StageCommand, stdin: Stdio) -> Result<SpawnedStage> {
    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| {
            format!(
                "spawn {} stage ({})",
                cmd.label,
                cmd.program.to_string_lossy()
            )
        })?;

    let (Some(primary), Some(secondary)) = (child.stdout.take(), child.stderr.take()) else {
        terminate(&cmd.label, &mut child);
        bail!("{} stage started without piped output", cmd.label);
    };

    debug!(stage = %cmd.label, pid = child.id(), "spawned");
    Ok(SpawnedStage {
        label: cmd.label.clone(),
        child,
        primary,
        secondary,
    })
}

/// Kill and reap a stage we are abandoning.
pub fn terminate(label: &str, child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(stage = %label, "kill: {}", err);
    }
    if let Err(err) = child.wait() {
        warn!(stage = %label, "reap after kill failed: {}", err);
    }
}

//! Draining stage output channels into memory.
//!
//! Every channel gets its own reader thread and all of them are started
//! before any is joined. Reading one channel to end-of-stream before touching
//! the next can deadlock: the stage blocks writing the unread channel once its
//! pipe buffer is full, and never closes the one being read.

use crate::pipeline::Channel;
use crate::routing::Functionality;
use crate::stage::StageKind;
use crate::Result;

use anyhow::{Context, anyhow};
use std::io::{self, Read};
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::debug;

/// The complete contents of one channel, read to end-of-stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedBuffer(Vec<u8>);

impl CapturedBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<u8>> for CapturedBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

pub type ChannelReader = Box<dyn Read + Send>;

/// The two readable ends of one stage.
pub struct StageChannels {
    pub label: String,
    pub primary: ChannelReader,
    pub secondary: ChannelReader,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutput {
    pub primary: CapturedBuffer,
    pub secondary: CapturedBuffer,
}

impl StageOutput {
    pub fn channel(&self, channel: Channel) -> &CapturedBuffer {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Secondary => &self.secondary,
        }
    }
}

/// Captured output of both downstream stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub performance: StageOutput,
    pub rating: StageOutput,
}

impl Captured {
    /// The buffer that carries `func`.
    pub fn buffer(&self, func: Functionality) -> &CapturedBuffer {
        let stage = match func.stage() {
            StageKind::Performance => &self.performance,
            StageKind::Rating => &self.rating,
        };
        stage.channel(func.channel())
    }
}

/// Read every channel of every stage to end-of-stream, concurrently.
///
/// Outputs come back in the order the stages were given.
pub fn drain_stages(stages: Vec<StageChannels>) -> Result<Vec<StageOutput>> {
    thread::scope(|s| -> Result<Vec<StageOutput>> {
        let mut pending = Vec::with_capacity(stages.len());
        for StageChannels {
            label,
            primary,
            secondary,
        } in stages
        {
            let primary = spawn_reader(s, format!("{label}-primary"), primary)?;
            let secondary = spawn_reader(s, format!("{label}-secondary"), secondary)?;
            pending.push((primary, secondary));
        }

        pending
            .into_iter()
            .map(|(primary, secondary)| -> Result<StageOutput> {
                Ok(StageOutput {
                    primary: join_reader(primary)?,
                    secondary: join_reader(secondary)?,
                })
            })
            .collect()
    })
}

type PendingRead<'scope> = (String, ScopedJoinHandle<'scope, io::Result<CapturedBuffer>>);

fn spawn_reader<'scope>(
    s: &'scope Scope<'scope, '_>,
    name: String,
    mut reader: ChannelReader,
) -> Result<PendingRead<'scope>> {
    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn_scoped(s, move || -> io::Result<CapturedBuffer> {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            Ok(CapturedBuffer(buf))
        })
        .with_context(|| format!("start reader thread for {}", name))?;
    Ok((name, handle))
}

fn join_reader((name, handle): PendingRead<'_>) -> Result<CapturedBuffer> {
    let buf = handle
        .join()
        .map_err(|_| anyhow!("reader thread for {} panicked", name))?
        .with_context(|| format!("read {}", name))?;
    debug!(channel = %name, bytes = buf.len(), "drained");
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn channels(label: &str, primary: &'static [u8], secondary: &'static [u8]) -> StageChannels {
        StageChannels {
            label: label.to_string(),
            primary: Box::new(Cursor::new(primary)),
            secondary: Box::new(Cursor::new(secondary)),
        }
    }

    #[test]
    fn keeps_stage_order_and_channel_identity() {
        let out = drain_stages(vec![
            channels("performance", b"p-out", b"p-err"),
            channels("rating", b"r-out", b""),
        ])
        .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].primary.as_bytes(), b"p-out");
        assert_eq!(out[0].secondary.as_bytes(), b"p-err");
        assert_eq!(out[1].primary.as_bytes(), b"r-out");
        assert!(out[1].secondary.as_bytes().is_empty());
    }

    #[test]
    fn functionality_picks_its_buffer() {
        let captured = Captured {
            performance: StageOutput {
                primary: b"ep".to_vec().into(),
                secondary: b"rp".to_vec().into(),
            },
            rating: StageOutput {
                primary: b"er".to_vec().into(),
                secondary: b"rr".to_vec().into(),
            },
        };

        assert_eq!(
            captured.buffer(Functionality::EntityPerformance).as_bytes(),
            b"ep"
        );
        assert_eq!(
            captured.buffer(Functionality::RegionPerformance).as_bytes(),
            b"rp"
        );
        assert_eq!(captured.buffer(Functionality::EntityRating).as_bytes(), b"er");
        assert_eq!(captured.buffer(Functionality::RegionRating).as_bytes(), b"rr");
    }

    #[cfg(unix)]
    #[test]
    fn large_secondary_output_does_not_block_primary() {
        use std::process::{Command, Stdio};

        // 256 KiB on stderr before anything on stdout: far past a pipe buffer.
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("head -c 262144 /dev/zero >&2; echo done")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let out = drain_stages(vec![StageChannels {
            label: "flood".into(),
            primary: Box::new(child.stdout.take().unwrap()),
            secondary: Box::new(child.stderr.take().unwrap()),
        }])
        .unwrap();

        assert!(child.wait().unwrap().success());
        assert_eq!(out[0].primary.as_bytes(), b"done\n");
        assert_eq!(out[0].secondary.len(), 262144);
    }
}

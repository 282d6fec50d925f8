//! Newline-delimited JSON event intake.

use crate::arbiter::Arbiter;
use crate::dispatch::Outbox;
use crate::event::InboundEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, instrument, warn};

/// Counts from one intake run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeSummary {
    /// Events handed to the arbiter.
    pub handled: usize,
    /// Lines dropped because they were not a valid event.
    pub skipped: usize,
    /// Whether intake stopped because the outbox refused a notification.
    pub halted: bool,
}

/// Feeds one JSON event per line from `input` into `arbiter` until EOF.
///
/// Lines are split on raw bytes, so a line that is not UTF-8 is skipped like
/// any other malformed event and never ends intake. Blank lines are ignored.
/// Only a failed read or a refused delivery stops early.
#[instrument(skip_all)]
pub async fn pump_events<R, O>(input: R, arbiter: &Arbiter<O>) -> std::io::Result<IntakeSummary>
where
    R: AsyncBufRead + Unpin,
    O: Outbox,
{
    let mut summary = IntakeSummary::default();
    let mut segments = input.split(b'\n');

    while let Some(segment) = segments.next_segment().await? {
        let line = segment.trim_ascii();
        if line.is_empty() {
            continue;
        }
        let event = match serde_json::from_slice::<InboundEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, bytes = line.len(), "Skipping malformed event");
                summary.skipped += 1;
                continue;
            }
        };
        summary.handled += 1;
        if let Err(e) = arbiter.handle(event) {
            error!(error = %e, "Notification writer is gone, stopping");
            summary.halted = true;
            break;
        }
    }

    Ok(summary)
}

use crate::decode::decode;
use crate::errors::{Error, Result};
use crate::model::Frame;
use crate::publish::Publisher;
use tracing::{debug, warn};

/// How the device stream ended. Both cases are fatal to the process.
#[derive(Debug)]
pub enum StreamEnd {
    Closed,
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Published,
    Blank,
    ReceiverError,
    Invalid,
}

/// Reads, decodes and publishes until the line stream ends.
///
/// Strictly sequential: a line is fully handled before the next one is
/// pulled, and a bad line never stops the loop.
pub fn run_ingest<I>(lines: I, publisher: &Publisher) -> StreamEnd
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    for line in lines {
        match line {
            Ok(line) => {
                process_line(&line, publisher);
            }
            Err(e) => return StreamEnd::Failed(e),
        }
    }
    StreamEnd::Closed
}

pub fn process_line(line: &[u8], publisher: &Publisher) -> LineOutcome {
    let metrics = publisher.metrics();
    metrics.lines_total.inc();

    if line.iter().all(u8::is_ascii_whitespace) {
        debug!("Skipping blank line");
        return LineOutcome::Blank;
    }

    match decode(line) {
        Ok(Frame::Reading(reading)) => {
            debug!("Received: {:?}", reading);
            publisher.publish(&reading);
            LineOutcome::Published
        }
        Ok(Frame::ReceiverError(e)) => {
            warn!("Receiver rejected packet: {:?}", e.error);
            metrics
                .receiver_errors_total
                .with_label_values(&[e.reason_label()])
                .inc();
            LineOutcome::ReceiverError
        }
        Err(e) => {
            warn!(
                "Dropping undecodable line {:?}: {}",
                String::from_utf8_lossy(line),
                e
            );
            metrics.invalid_lines_total.inc();
            LineOutcome::Invalid
        }
    }
}

use crate::errors::{Error, Result};
use serialport::{DataBits, Parity, StopBits};
use std::io::{self, BufRead, BufReader};
use std::time::Duration;
use tracing::info;

pub const BAUD_RATE: u32 = 115_200;

/// Device path that reads from standard input instead of a serial port.
pub const STDIN_PATH: &str = "-";

/// Longest record accepted before the stream is considered broken.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Poll interval for the port; an expired timeout just means no data yet.
const READ_TIMEOUT: Duration = Duration::from_secs(60);

pub type DeviceLines = LineReader<Box<dyn BufRead + Send>>;

/// Opens the receiver and returns its line stream.
pub fn open_device(path: &str) -> Result<DeviceLines> {
    if path == STDIN_PATH {
        info!("Reading receiver output from standard input");
        return Ok(LineReader::new(Box::new(BufReader::new(io::stdin()))));
    }

    info!("Opening serial port {} at {} baud", path, BAUD_RATE);
    let port = serialport::new(path, BAUD_RATE)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|source| Error::Serial {
            path: path.to_string(),
            source,
        })?;
    info!("Serial port {} opened", path);

    Ok(LineReader::new(Box::new(BufReader::new(port))))
}

/// Splits a byte stream into `\n`-terminated records.
///
/// Yields each line without its terminator (a trailing `\r` is dropped too).
/// The reader has a single terminal state: once it reports end of stream or
/// an error it yields `None` forever.
pub struct LineReader<R> {
    inner: R,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    fn finish(&mut self, item: Option<Result<Vec<u8>>>) -> Option<Result<Vec<u8>>> {
        self.done = true;
        item
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if is_idle(&e) => continue,
                Err(e) => return self.finish(Some(Err(e.into()))),
            };

            if available.is_empty() {
                // EOF; a final unterminated chunk still counts as a line.
                let last = (!line.is_empty()).then(|| Ok(strip_cr(line)));
                return self.finish(last);
            }

            let terminated = match available.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    line.extend_from_slice(&available[..end]);
                    self.inner.consume(end + 1);
                    true
                }
                None => {
                    let len = available.len();
                    line.extend_from_slice(available);
                    self.inner.consume(len);
                    false
                }
            };

            if line.len() > MAX_LINE_BYTES {
                return self.finish(Some(Err(Error::LineTooLong {
                    limit: MAX_LINE_BYTES,
                })));
            }
            if terminated {
                return Some(Ok(strip_cr(line)));
            }
        }
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted)
}

fn strip_cr(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{Cursor, Read};

    fn collect(input: &[u8]) -> Vec<Vec<u8>> {
        LineReader::new(Cursor::new(input.to_vec()))
            .map(|l| l.unwrap())
            .collect()
    }

    /// Serves scripted chunks, one per read call.
    struct ScriptedPort {
        script: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedPort {
        fn new(script: Vec<io::Result<Vec<u8>>>) -> BufReader<Self> {
            BufReader::new(Self {
                script: script.into(),
            })
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.script.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    #[test]
    fn test_splits_lines_and_strips_crlf() {
        assert_eq!(
            collect(b"{\"a\":1}\r\n{\"b\":2}\n\n"),
            vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec(), Vec::new()]
        );
    }

    #[test]
    fn test_final_unterminated_line() {
        assert_eq!(collect(b"one\ntwo"), vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(collect(b"").is_empty());
    }

    #[test]
    fn test_timeouts_keep_partial_line() {
        let port = ScriptedPort::new(vec![
            Ok(b"{\"device\":".to_vec()),
            Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
            Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
            Ok(b" 1}\r\nnext\n".to_vec()),
        ]);
        let lines: Vec<_> = LineReader::new(port).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec![b"{\"device\": 1}".to_vec(), b"next".to_vec()]);
    }

    #[test]
    fn test_error_is_terminal() {
        let port = ScriptedPort::new(vec![
            Ok(b"first\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")),
            Ok(b"never\n".to_vec()),
        ]);
        let mut reader = LineReader::new(port);
        assert_eq!(reader.next().unwrap().unwrap(), b"first".to_vec());
        assert!(matches!(reader.next(), Some(Err(Error::Io(_)))));
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_eof_is_terminal() {
        let mut reader = LineReader::new(Cursor::new(b"only\n".to_vec()));
        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_overlong_line_rejected() {
        let mut input = vec![b'x'; MAX_LINE_BYTES + 1];
        input.push(b'\n');
        let mut reader = LineReader::new(Cursor::new(input));
        assert!(matches!(
            reader.next(),
            Some(Err(Error::LineTooLong { limit: MAX_LINE_BYTES }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_open_missing_port_fails() {
        let err = open_device("/dev/does-not-exist-rtl433").err().unwrap();
        assert!(matches!(
            err,
            Error::Serial { ref path, .. } if path == "/dev/does-not-exist-rtl433"
        ));
    }
}

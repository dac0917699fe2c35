use crate::errors::Result;
use crate::model::{Frame, Reading, ReceiverError};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Decodes one line from the receiver.
///
/// A line is atomic: it either decodes into a full [`Frame`] or the whole
/// line is rejected. Unknown fields are ignored; `device` and `channel` are
/// required, the remaining reading fields default when absent. Only JSON
/// objects are accepted; derived struct decoding alone would also take a
/// positional array.
pub fn decode(line: &[u8]) -> Result<Frame> {
    let object = Value::Object(serde_json::from_slice::<Map<String, Value>>(line)?);
    match Reading::deserialize(&object) {
        Ok(reading) => Ok(Frame::Reading(reading)),
        Err(reading_err) => match ReceiverError::deserialize(&object) {
            Ok(receiver_error) => Ok(Frame::ReceiverError(receiver_error)),
            // Report why the line was not a reading, that is the common case.
            Err(_) => Err(reading_err.into()),
        },
    }
}

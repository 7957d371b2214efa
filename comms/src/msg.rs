use std::io;

use serde_json::Value;

use crate::{Deserialize, Serialize};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();

const ERR_KIND: Header = 0;
const CONTROL_KIND: Header = 1;
const DATA_KIND: Header = 2;

/// The command for the `Control` variant of the `Msg` enum.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Subscribe { topic: String },
    Unsubscribe { topic: String },
    Disconnect,
}

/// A payload addressed to a topic, the body of the `Data` variant.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    pub topic: String,
    pub payload: Value,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

/// The application layer message exchanged between the bus and its clients.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Control(Command),
    Data(Envelope),
    Err(String),
}

impl Msg {
    /// A short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Control(_) => "control",
            Msg::Data(_) => "data",
            Msg::Err(_) => "err",
        }
    }

    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {HEADER_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }
}

impl Serialize for Msg {
    fn serialize(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        let kind = match self {
            Msg::Err(_) => ERR_KIND,
            Msg::Control(_) => CONTROL_KIND,
            Msg::Data(_) => DATA_KIND,
        };
        buf.extend_from_slice(&kind.to_be_bytes());

        match self {
            Msg::Err(detail) => buf.extend_from_slice(detail.as_bytes()),
            Msg::Control(cmd) => serde_json::to_writer(&mut *buf, cmd)?,
            Msg::Data(envelope) => serde_json::to_writer(&mut *buf, envelope)?,
        }

        Ok(())
    }
}

impl Deserialize for Msg {
    fn deserialize(buf: &[u8]) -> io::Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Self::buf_is_too_small(buf.len());
        }

        let (kind_buf, rest) = buf.split_at(HEADER_SIZE);
        let mut header = [0; HEADER_SIZE];
        header.copy_from_slice(kind_buf);

        match Header::from_be_bytes(header) {
            ERR_KIND => {
                let detail = std::str::from_utf8(rest)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                Ok(Self::Err(detail.to_string()))
            }
            CONTROL_KIND => Ok(Self::Control(parse_body(rest)?)),
            DATA_KIND => Ok(Self::Data(parse_body(rest)?)),
            kind => Self::invalid_kind(kind),
        }
    }
}

/// Every malformed body is `InvalidData`, including truncated ones serde reports as EOF.
fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> io::Result<T> {
    serde_json::from_slice(body).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encode(msg: &Msg) -> Vec<u8> {
        let mut buf = Vec::new();
        msg.serialize(&mut buf).unwrap();
        buf
    }

    #[test]
    fn control_is_tagged_json() {
        let msg = Msg::Control(Command::Subscribe {
            topic: "prediction-output".into(),
        });

        let buf = encode(&msg);

        assert_eq!(&buf[..HEADER_SIZE], &CONTROL_KIND.to_be_bytes());
        let body: Value = serde_json::from_slice(&buf[HEADER_SIZE..]).unwrap();
        assert_eq!(body, json!({ "subscribe": { "topic": "prediction-output" } }));
    }

    #[test]
    fn disconnect_is_a_bare_string() {
        let buf = encode(&Msg::Control(Command::Disconnect));
        assert_eq!(&buf[HEADER_SIZE..], b"\"disconnect\"");
    }

    #[test]
    fn data_keeps_the_payload_intact() {
        let payload = json!({ "pmmlModel": "Sample", "inputData": { "age": 30 } });
        let msg = Msg::Data(Envelope::new("prediction-input", payload.clone()));

        let decoded = Msg::deserialize(&encode(&msg)).unwrap();

        let Msg::Data(envelope) = decoded else {
            panic!("expected data, got {decoded:?}");
        };
        assert_eq!(envelope.topic, "prediction-input");
        assert_eq!(envelope.payload, payload);
    }

    #[test]
    fn rejects_short_buffers() {
        let err = Msg::deserialize(&[0, 0]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_unknown_kinds() {
        let err = Msg::deserialize(&7u32.to_be_bytes()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_invalid_json() {
        let mut buf = DATA_KIND.to_be_bytes().to_vec();
        buf.extend_from_slice(b"{not json");

        let err = Msg::deserialize(&buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_and_empty_bodies_are_invalid_data() {
        let mut truncated = DATA_KIND.to_be_bytes().to_vec();
        truncated.extend_from_slice(br#"{"topic":"t""#);

        let header_only = DATA_KIND.to_be_bytes().to_vec();
        let empty_control = CONTROL_KIND.to_be_bytes().to_vec();

        for buf in [truncated, header_only, empty_control] {
            let err = Msg::deserialize(&buf).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        }
    }
}

//! Cross-view messages
//!
//! Every message travels as `{"type": "...", "payload": {...}}` and is
//! answered with exactly one [`Ack`], serialized as `{}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::types::Slide;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("unknown message type {0:?}")]
    UnknownType(String),
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid step {0:?}")]
    InvalidStep(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum Request {
    /// Persist a committed slide (`querySelector`, `displayName`)
    CreateSlide(Slide),
    StartElementPicker,
    StopElementPicker,
    GoSlide { step: i64 },
    UpdateSlide { slides: Vec<Slide> },
    ClearSlides,
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::CreateSlide(_) => "CREATE_SLIDE",
            Request::StartElementPicker => "START_ELEMENT_PICKER",
            Request::StopElementPicker => "STOP_ELEMENT_PICKER",
            Request::GoSlide { .. } => "GO_SLIDE",
            Request::UpdateSlide { .. } => "UPDATE_SLIDE",
            Request::ClearSlides => "CLEAR_SLIDES",
        }
    }
}

/// Empty acknowledgement sent for every request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}

/// Wire shape shared by all requests
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct GoSlidePayload {
    step: StepValue,
}

/// List views send the step as a dataset string
#[derive(Deserialize)]
#[serde(untagged)]
enum StepValue {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct UpdateSlidePayload {
    slides: Vec<Slide>,
}

fn payload<T: serde::de::DeserializeOwned>(kind: &str, value: Value) -> Result<T, MessageError> {
    serde_json::from_value(value).map_err(|source| MessageError::InvalidPayload {
        kind: kind.to_string(),
        source,
    })
}

impl TryFrom<Envelope> for Request {
    type Error = MessageError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope { kind, payload: value } = envelope;
        match kind.as_str() {
            "CREATE_SLIDE" => Ok(Request::CreateSlide(payload(&kind, value)?)),
            "START_ELEMENT_PICKER" => Ok(Request::StartElementPicker),
            "STOP_ELEMENT_PICKER" => Ok(Request::StopElementPicker),
            "GO_SLIDE" => {
                let GoSlidePayload { step } = payload(&kind, value)?;
                let step = match step {
                    StepValue::Number(step) => step,
                    StepValue::Text(text) => text
                        .trim()
                        .parse()
                        .map_err(|_| MessageError::InvalidStep(text))?,
                };
                Ok(Request::GoSlide { step })
            }
            "UPDATE_SLIDE" => {
                let UpdateSlidePayload { slides } = payload(&kind, value)?;
                Ok(Request::UpdateSlide { slides })
            }
            "CLEAR_SLIDES" => Ok(Request::ClearSlides),
            _ => Err(MessageError::UnknownType(kind)),
        }
    }
}

impl From<Request> for Envelope {
    fn from(request: Request) -> Self {
        let kind = request.kind().to_string();
        let payload = match request {
            Request::CreateSlide(slide) => json!({
                "querySelector": slide.selector,
                "displayName": slide.display_name,
            }),
            Request::GoSlide { step } => json!({ "step": step }),
            Request::UpdateSlide { slides } => json!({ "slides": slides }),
            Request::StartElementPicker | Request::StopElementPicker | Request::ClearSlides => {
                json!({})
            }
        };
        Envelope { kind, payload }
    }
}

#[cfg(test)]
#[path = "messaging_test.rs"]
mod messaging_test;

//! NCCO (call control object) actions.
//!
//! Each action is built from an options struct through a validating
//! constructor. The resulting value is immutable and serializes to a single
//! element of the NCCO array, `action` first, then fields in declaration order.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::endpoint::Endpoint;
use crate::domain::validation::{
    ValidationError, check_decimal_range, check_length, check_positive, check_range,
    require_non_blank,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Talk(TalkAction),
    Stream(StreamAction),
    Record(RecordAction),
    Connect(ConnectAction),
    Input(InputAction),
    Notify(NotifyAction),
    Pay(PayAction),
    Conversation(ConversationAction),
    Transfer(TransferAction),
    Wait(WaitAction),
}

macro_rules! into_action {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Action {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

into_action!(
    TalkAction => Talk,
    StreamAction => Stream,
    RecordAction => Record,
    ConnectAction => Connect,
    InputAction => Input,
    NotifyAction => Notify,
    PayAction => Pay,
    ConversationAction => Conversation,
    TransferAction => Transfer,
    WaitAction => Wait,
);

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
/// Ordered list of actions sent to control a call.
pub struct Ncco(Vec<Action>);

impl Ncco {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self(actions.into_iter().collect())
    }

    pub fn push(&mut self, action: impl Into<Action>) {
        self.0.push(action.into());
    }

    pub fn with(mut self, action: impl Into<Action>) -> Self {
        self.push(action);
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as the JSON array Vonage expects.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn check_event_url(urls: &[Url]) -> Result<(), ValidationError> {
    if urls.len() > 1 {
        return Err(ValidationError::TooMany {
            field: "eventUrl",
            max: 1,
            actual: urls.len(),
        });
    }
    Ok(())
}

fn check_level(level: Option<f64>) -> Result<(), ValidationError> {
    if let Some(level) = level {
        check_decimal_range("level", level, -1.0, 1.0)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barge_in: Option<bool>,
    /// Number of repetitions, `0` loops until the call ends.
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkAction {
    text: String,
    #[serde(flatten)]
    options: TalkOptions,
}

impl TalkAction {
    pub const MAX_TEXT: usize = 1500;

    pub fn new(text: impl Into<String>, options: TalkOptions) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }
        check_length("text", &text, 1, Self::MAX_TEXT)?;
        check_level(options.level)?;
        Ok(Self { text, options })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &TalkOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barge_in: Option<bool>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamAction {
    stream_url: Vec<Url>,
    #[serde(flatten)]
    options: StreamOptions,
}

impl StreamAction {
    pub fn new(stream_url: Url, options: StreamOptions) -> Result<Self, ValidationError> {
        check_level(options.level)?;
        Ok(Self {
            stream_url: vec![stream_url],
            options,
        })
    }

    pub fn stream_url(&self) -> &Url {
        &self.stream_url[0]
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingFormat {
    Mp3,
    Wav,
    Ogg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitRecording {
    Conversation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<EventMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Options of a `record` action.
///
/// `split` is derived from `channels`: more than one channel records the
/// conversation split, a single channel never does.
pub struct RecordOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<RecordingFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitRecording>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_silence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_key: Option<char>,
    #[serde(rename = "timeOut", skip_serializing_if = "Option::is_none")]
    pub time_out: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beep_start: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<EventMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordAction {
    #[serde(flatten)]
    options: RecordOptions,
}

impl RecordAction {
    pub const MAX_CHANNELS: u32 = 32;

    pub fn new(mut options: RecordOptions) -> Result<Self, ValidationError> {
        if let Some(channels) = options.channels {
            check_range("channels", i64::from(channels), 1, i64::from(Self::MAX_CHANNELS))?;
            options.split = (channels > 1).then_some(SplitRecording::Conversation);
        }
        if let Some(silence) = options.end_on_silence {
            check_range("endOnSilence", i64::from(silence), 3, 10)?;
        }
        if let Some(timeout) = options.time_out {
            check_range("timeOut", i64::from(timeout), 3, 7200)?;
        }
        if let Some(key) = options.end_on_key {
            if !(key.is_ascii_digit() || key == '*' || key == '#') {
                return Err(ValidationError::Invalid {
                    field: "endOnKey",
                    reason: "expected a digit, '*' or '#'",
                });
            }
        }
        check_event_url(&options.event_url)?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Synchronous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineDetection {
    Continue,
    Hangup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvancedMachineDetectionMode {
    Default,
    Detect,
    DetectBeep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvancedMachineDetection {
    pub behavior: MachineDetection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AdvancedMachineDetectionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beep_timeout: Option<u32>,
}

impl AdvancedMachineDetection {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if let Some(timeout) = self.beep_timeout {
            check_range("beep_timeout", i64::from(timeout), 45, 120)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_from_number: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    /// Seconds to wait for the endpoint to answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Maximum call length in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_detection: Option<MachineDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_machine_detection: Option<AdvancedMachineDetection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<EventMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ringback_tone: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectAction {
    endpoint: Vec<Endpoint>,
    #[serde(flatten)]
    options: ConnectOptions,
}

impl ConnectAction {
    pub const LIMIT_MAX: u32 = 7200;
    pub const TIMEOUT_MIN: u32 = 3;
    pub const TIMEOUT_MAX: u32 = 7200;

    pub fn new(endpoint: impl Into<Endpoint>, options: ConnectOptions) -> Result<Self, ValidationError> {
        if let Some(limit) = options.limit {
            check_range("limit", i64::from(limit), 1, i64::from(Self::LIMIT_MAX))?;
        }
        if let Some(timeout) = options.timeout {
            check_range(
                "timeout",
                i64::from(timeout),
                i64::from(Self::TIMEOUT_MIN),
                i64::from(Self::TIMEOUT_MAX),
            )?;
        }
        if options.from.is_some() && options.random_from_number == Some(true) {
            return Err(ValidationError::Conflict {
                field: "randomFromNumber",
                other: "from",
            });
        }
        if let Some(from) = options.from.as_deref() {
            require_non_blank("from", from)?;
        }
        if options.machine_detection.is_some() && options.advanced_machine_detection.is_some() {
            return Err(ValidationError::Conflict {
                field: "advancedMachineDetection",
                other: "machineDetection",
            });
        }
        if let Some(amd) = options.advanced_machine_detection.as_ref() {
            amd.validate()?;
        }
        check_event_url(&options.event_url)?;
        Ok(Self {
            endpoint: vec![endpoint.into()],
            options,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint[0]
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Dtmf,
    Speech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Synchronous,
    Asynchronous,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtmfSettings {
    #[serde(rename = "timeOut", skip_serializing_if = "Option::is_none")]
    pub time_out: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_on_hash: Option<bool>,
}

impl DtmfSettings {
    pub const MAX_DIGITS: u32 = 20;
    pub const MAX_TIME_OUT: u32 = 10;

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(time_out) = self.time_out {
            check_range("dtmf.timeOut", i64::from(time_out), 0, i64::from(Self::MAX_TIME_OUT))?;
        }
        if let Some(max_digits) = self.max_digits {
            check_range("dtmf.maxDigits", i64::from(max_digits), 0, i64::from(Self::MAX_DIGITS))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSettings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uuid: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_silence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<u32>,
}

impl SpeechSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(silence) = self.end_on_silence {
            check_decimal_range("speech.endOnSilence", silence, 0.4, 10.0)?;
        }
        if let Some(start) = self.start_timeout {
            check_range("speech.startTimeout", i64::from(start), 1, 60)?;
        }
        if let Some(duration) = self.max_duration {
            check_range("speech.maxDuration", i64::from(duration), 1, 60)?;
        }
        if let Some(sensitivity) = self.sensitivity {
            check_range("speech.sensitivity", i64::from(sensitivity), 10, 100)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmf: Option<DtmfSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechSettings>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<EventMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<InputMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputAction {
    #[serde(rename = "type")]
    input_types: Vec<InputType>,
    #[serde(flatten)]
    options: InputOptions,
}

impl InputAction {
    /// `types` must name at least one of `dtmf` and `speech`. Settings are only
    /// accepted for declared types, and asynchronous mode takes no DTMF settings.
    pub fn new(types: Vec<InputType>, options: InputOptions) -> Result<Self, ValidationError> {
        let mut input_types = Vec::with_capacity(2);
        for kind in types {
            if !input_types.contains(&kind) {
                input_types.push(kind);
            }
        }
        if input_types.is_empty() {
            return Err(ValidationError::Empty { field: "type" });
        }

        if let Some(dtmf) = options.dtmf.as_ref() {
            if !input_types.contains(&InputType::Dtmf) {
                return Err(ValidationError::Requires {
                    field: "dtmf",
                    requires: "type dtmf",
                });
            }
            if options.mode == Some(InputMode::Asynchronous) {
                return Err(ValidationError::Conflict {
                    field: "dtmf",
                    other: "mode asynchronous",
                });
            }
            dtmf.validate()?;
        }
        if let Some(speech) = options.speech.as_ref() {
            if !input_types.contains(&InputType::Speech) {
                return Err(ValidationError::Requires {
                    field: "speech",
                    requires: "type speech",
                });
            }
            speech.validate()?;
        }
        check_event_url(&options.event_url)?;

        Ok(Self {
            input_types,
            options,
        })
    }

    pub fn input_types(&self) -> &[InputType] {
        &self.input_types
    }

    pub fn options(&self) -> &InputOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyAction {
    payload: serde_json::Map<String, Value>,
    event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_method: Option<EventMethod>,
}

impl NotifyAction {
    pub fn new(
        payload: serde_json::Map<String, Value>,
        event_url: Url,
        event_method: Option<EventMethod>,
    ) -> Result<Self, ValidationError> {
        if payload.is_empty() {
            return Err(ValidationError::Empty { field: "payload" });
        }
        Ok(Self {
            payload,
            event_url: vec![event_url],
            event_method,
        })
    }

    pub fn payload(&self) -> &serde_json::Map<String, Value> {
        &self.payload
    }

    pub fn event_url(&self) -> &Url {
        &self.event_url[0]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PayVoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<PayVoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayAction {
    amount: f64,
    #[serde(flatten)]
    options: PayOptions,
}

impl PayAction {
    pub fn new(amount: f64, options: PayOptions) -> Result<Self, ValidationError> {
        check_positive("amount", amount)?;
        if let Some(currency) = options.currency.as_deref() {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::Invalid {
                    field: "currency",
                    reason: "expected an ISO 4217 code",
                });
            }
        }
        check_event_url(&options.event_url)?;
        Ok(Self { amount, options })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn options(&self) -> &PayOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub music_on_hold_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_on_enter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_exit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub can_speak: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub can_hear: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_url: Vec<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<EventMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationAction {
    name: String,
    #[serde(flatten)]
    options: ConversationOptions,
}

impl ConversationAction {
    pub fn new(name: impl Into<String>, options: ConversationOptions) -> Result<Self, ValidationError> {
        let name = require_non_blank("name", name)?;
        if options.mute == Some(true) && !options.can_speak.is_empty() {
            return Err(ValidationError::Conflict {
                field: "mute",
                other: "canSpeak",
            });
        }
        if options.music_on_hold_url.len() > 1 {
            return Err(ValidationError::TooMany {
                field: "musicOnHoldUrl",
                max: 1,
                actual: options.music_on_hold_url.len(),
            });
        }
        check_event_url(&options.event_url)?;
        Ok(Self { name, options })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ConversationOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferAction {
    endpoint: Vec<Endpoint>,
}

impl TransferAction {
    pub fn new(endpoint: impl Into<Endpoint>) -> Self {
        Self {
            endpoint: vec![endpoint.into()],
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint[0]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitAction {
    /// Seconds to wait.
    timeout: f64,
}

impl WaitAction {
    pub fn new(timeout: f64) -> Result<Self, ValidationError> {
        if !timeout.is_finite() || timeout < 0.0 {
            return Err(ValidationError::Invalid {
                field: "timeout",
                reason: "must be a non-negative number",
            });
        }
        Ok(Self { timeout })
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }
}

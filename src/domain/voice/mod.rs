//! Voice API: NCCO actions, call endpoints and call records.

mod call;
mod endpoint;
mod ncco;

pub use call::{
    CallDirection, CallInfo, CallInstructions, CallModification, CallParty, CallResponse,
    CallStatus, CallsEmbedded, CallsFilter, CallsFilterOptions, CreateCall, CreateCallOptions,
    ModifyCall,
};
pub use endpoint::{
    AppEndpoint, Endpoint, OnAnswer, PhoneEndpoint, PhoneOptions, SipEndpoint, SipOptions,
    SipStandardHeaders, VbcEndpoint, WebSocketEndpoint,
};
pub use ncco::{
    Action, AdvancedMachineDetection, AdvancedMachineDetectionMode, ConnectAction,
    ConnectOptions, ConversationAction, ConversationOptions, DtmfSettings, EventMethod, EventType,
    InputAction, InputMode, InputOptions, InputType, MachineDetection, Ncco, NotifyAction,
    PayAction, PayOptions, PayVoice, RecordAction, RecordOptions, RecordingFormat,
    SpeechSettings, SplitRecording, StreamAction, StreamOptions, TalkAction, TalkOptions,
    TranscriptionSettings, TransferAction, WaitAction,
};

//! Speech-recognition `ask` for voice applications.
//!
//! An ask plays a prompt, records the caller, sends the recording to the
//! AT&T speech-to-text service and reports a match or nomatch. See
//! [`ask::AskController`] for the entry point and [`asr`] for the service
//! client.

pub mod ask;
pub mod asr;
pub mod config_manager;
pub mod error;
pub mod grammar;
pub mod local;
pub mod output;
pub mod state;
pub mod utils;

pub use ask::{AskController, AskOptions, AskRequest, AskResult, Prompt, ResultStatus};
pub use error::{AskError, AsrError};
pub use state::AppState;

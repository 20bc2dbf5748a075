pub mod asr;
pub mod main;
pub mod utils;

pub use asr::{SpeechServiceConfig, WatsonConfig};
pub use main::Config;

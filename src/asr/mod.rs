pub mod interface;
pub mod types;
pub mod client;
pub mod worker;
pub mod factory;

pub use interface::{AudioFormat, PendingRecognition, RecognitionClient, SpeechRequest, SpeechToText};
pub use types::{parse_response, Hypothesis, Recognition, RecognitionOutcome, STATUS_NOT_RECOGNIZED, STATUS_OK};
pub use client::WatsonClient;
pub use worker::RecognizerHandle;
pub use factory::RecognizerFactory;

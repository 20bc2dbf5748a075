pub mod classifier;
pub mod collaborators;
pub mod controller;
pub mod options;
pub mod request;
pub mod result;

pub use classifier::classify;
pub use collaborators::{
    FallbackCollector, GrammarBuilder, OutputFormatter, Playback, RecordDirection, RecordParams,
    Recorder, Recording,
};
pub use controller::{AskController, Collaborators};
pub use options::{AskDefaults, AskOptions, ResolvedOptions};
pub use request::{AskRequest, Prompt};
pub use result::{AskResult, ResultStatus};

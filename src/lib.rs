pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod replicate;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;

pub use config::{Config, ReplicateConfig, ServerConfig, StudioConfig};
pub use error::{Result, StudioError};
pub use models::*;
pub use prompt::{build_prompt, BuiltPrompt};
pub use replicate::{GenerationJob, ImageGenerator, ReplicateClient};
pub use studio::{
    FormSubmissionController, HttpTransport, Page, StudioElements, StudioView,
    SubmissionOutcome, SubmissionState, TerminalView,
};

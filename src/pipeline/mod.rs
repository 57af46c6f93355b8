pub mod assess;
pub mod generation;
pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use assess::{assess, fallback_assessment};
pub use generation::{
    ChatCompletionsClient, GenerationClient, GenerationError, GenerationOptions,
    MockGenerationClient, MockReply,
};
pub use orchestrator::{AssessmentPipeline, PipelineFailure, Stage};

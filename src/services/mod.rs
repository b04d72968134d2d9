pub mod openai; // OpenAI chat-completions client
pub mod vision; // Provider-agnostic vision trait

pub use openai::OpenAiService;
pub use vision::{ImageDetail, VisionRequest, VisionService};

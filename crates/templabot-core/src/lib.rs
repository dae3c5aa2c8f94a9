pub mod gate;
pub mod template;

pub use gate::{DEFAULT_MIN_PROMPT_CHARS, GREETING, GateOutcome, PromptGate};
pub use template::{DOWNLOAD_FILE_NAME, DOWNLOAD_MIME, DisplayFormatError, TemplateView};

pub mod features;
pub mod registry;

pub use registry::{CompletionSource, LanguageServiceRegistry, Linter, PromqlExtension};

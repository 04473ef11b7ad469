//! Completion and lint services behind swappable strategy objects
//!
//! - `traits.rs` - the `CompletionStrategy` and `LintStrategy` contracts
//! - `completion.rs` - default completion strategy and its configuration
//! - `lint.rs` - default lint strategy and its configuration

pub mod completion;
pub mod lint;
pub mod traits;

pub use completion::{new_complete_strategy, CompleteConfiguration, DefaultCompleteStrategy};
pub use lint::{new_lint_strategy, DefaultLintStrategy, LintConfiguration, LintSeverity};
pub use traits::{CompletionContext, CompletionResult, CompletionStrategy, LintStrategy};

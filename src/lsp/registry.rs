//! Hot-swappable holder for the active completion and lint strategies
//!
//! [`LanguageServiceRegistry`] owns exactly one strategy per service. The
//! host receives a [`PromqlExtension`] built by
//! [`LanguageServiceRegistry::compose_extension`]; its callbacks keep a
//! reference to the registry's slots rather than to the strategies present at
//! compose time, so installing a new strategy takes effect for every request
//! issued afterwards without re-registering the extension.
//!
//! Each callback reads its slot once, clones the `Arc`, and then awaits the
//! strategy with the lock released. A request already running keeps the
//! strategy it started with alive until it finishes; the registry itself
//! keeps no history.

use std::sync::Arc;

use parking_lot::RwLock;
use tower_lsp::lsp_types::Diagnostic;
use tracing::{debug, info, trace};

use super::features::completion::{
    new_complete_strategy, CompleteConfiguration, DefaultCompleteStrategy,
};
use super::features::lint::{new_lint_strategy, DefaultLintStrategy, LintConfiguration};
use super::features::traits::{
    CompletionContext, CompletionResult, CompletionStrategy, LintStrategy,
};
use crate::config::PluginConfig;
use crate::syntax::{promql_syntax, SyntaxDefinition, SyntaxNode};

struct StrategySlots {
    complete: RwLock<Arc<dyn CompletionStrategy>>,
    lint: RwLock<Arc<dyn LintStrategy>>,
}

/// Holds the active strategies and hands out the composed host extension
#[derive(Clone)]
pub struct LanguageServiceRegistry {
    slots: Arc<StrategySlots>,
}

impl LanguageServiceRegistry {
    /// Create a registry with the default completion and lint strategies
    pub fn new() -> Self {
        let complete: Arc<dyn CompletionStrategy> = Arc::new(DefaultCompleteStrategy::default());
        let lint: Arc<dyn LintStrategy> = Arc::new(DefaultLintStrategy::default());

        debug!(
            "Initialized language services (completion: {}, lint: {})",
            complete.strategy_name(),
            lint.strategy_name()
        );

        Self {
            slots: Arc::new(StrategySlots {
                complete: RwLock::new(complete),
                lint: RwLock::new(lint),
            }),
        }
    }

    /// Build a completion strategy from `conf` and make it the active one
    ///
    /// Construction errors are returned unchanged and leave the current
    /// strategy installed.
    pub fn install_completion_strategy(
        &self,
        conf: Option<CompleteConfiguration>,
    ) -> anyhow::Result<()> {
        let strategy = new_complete_strategy(conf)?;
        self.set_completion_strategy(Arc::new(strategy));
        Ok(())
    }

    /// Build a lint strategy from `conf` and make it the active one
    pub fn install_lint_strategy(&self, conf: Option<LintConfiguration>) -> anyhow::Result<()> {
        let strategy = new_lint_strategy(conf)?;
        self.set_lint_strategy(Arc::new(strategy));
        Ok(())
    }

    /// Install an externally built completion strategy
    pub fn set_completion_strategy(&self, strategy: Arc<dyn CompletionStrategy>) {
        info!("Installing completion strategy: {}", strategy.strategy_name());
        *self.slots.complete.write() = strategy;
    }

    /// Install an externally built lint strategy
    pub fn set_lint_strategy(&self, strategy: Arc<dyn LintStrategy>) {
        info!("Installing lint strategy: {}", strategy.strategy_name());
        *self.slots.lint.write() = strategy;
    }

    /// Install both strategies from a loaded plugin configuration
    ///
    /// The lint strategy is only replaced once the completion strategy was
    /// installed successfully.
    pub fn apply_config(&self, config: &PluginConfig) -> anyhow::Result<()> {
        self.install_completion_strategy(config.completion.clone())?;
        self.install_lint_strategy(config.lint.clone())
    }

    pub fn completion_strategy(&self) -> Arc<dyn CompletionStrategy> {
        self.slots.complete.read().clone()
    }

    pub fn lint_strategy(&self) -> Arc<dyn LintStrategy> {
        self.slots.lint.read().clone()
    }

    /// Bundle the syntax definition with late-bound completion and lint
    /// callbacks for the host
    pub fn compose_extension(&self) -> PromqlExtension {
        PromqlExtension {
            syntax: promql_syntax(),
            completion: CompletionSource {
                slots: Arc::clone(&self.slots),
            },
            linter: Linter {
                slots: Arc::clone(&self.slots),
            },
        }
    }
}

impl Default for LanguageServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The single value the host consumes to activate PromQL support
#[derive(Clone)]
pub struct PromqlExtension {
    pub syntax: &'static SyntaxDefinition,
    pub completion: CompletionSource,
    pub linter: Linter,
}

/// Completion callback bound to the registry
#[derive(Clone)]
pub struct CompletionSource {
    slots: Arc<StrategySlots>,
}

impl CompletionSource {
    /// Forward `context` to the completion strategy active right now
    pub async fn complete(
        &self,
        context: &CompletionContext,
    ) -> anyhow::Result<Option<CompletionResult>> {
        let strategy = self.slots.complete.read().clone();
        trace!("Dispatching completion to {}", strategy.strategy_name());
        strategy.promql(context).await
    }
}

/// Diagnostics integration bound to the registry
#[derive(Clone)]
pub struct Linter {
    slots: Arc<StrategySlots>,
}

impl Linter {
    /// The lint strategy active right now, for configuration introspection
    pub fn active_strategy(&self) -> Arc<dyn LintStrategy> {
        self.slots.lint.read().clone()
    }

    /// Lint `tree` with the active strategy
    ///
    /// Returns no diagnostics when the active strategy's configuration has
    /// linting disabled.
    pub async fn diagnostics(
        &self,
        tree: &SyntaxNode,
        source: &str,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        let strategy = self.active_strategy();
        if !strategy.configuration().enabled {
            trace!("Linting disabled, skipping {}", strategy.strategy_name());
            return Ok(Vec::new());
        }
        trace!("Dispatching lint to {}", strategy.strategy_name());
        strategy.promql(tree, source).await
    }
}

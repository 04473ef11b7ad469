//! Default PromQL completion strategy
//!
//! Offers the built-in PromQL vocabulary (functions, aggregations, modifiers,
//! binary keywords) plus any statically configured metric names whose
//! spelling starts with the identifier typed before the cursor.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};
use tracing::trace;

use super::traits::{CompletionContext, CompletionResult, CompletionStrategy};

const FUNCTIONS: &[&str] = &[
    "abs", "absent", "absent_over_time", "avg_over_time", "ceil", "changes", "clamp_max",
    "clamp_min", "count_over_time", "days_in_month", "day_of_month", "day_of_week", "delta",
    "deriv", "exp", "floor", "histogram_quantile", "holt_winters", "hour", "idelta", "increase",
    "irate", "label_join", "label_replace", "ln", "log10", "log2", "max_over_time",
    "min_over_time", "minute", "month", "predict_linear", "quantile_over_time", "rate", "resets",
    "round", "scalar", "sort", "sort_desc", "sqrt", "stddev_over_time", "stdvar_over_time",
    "sum_over_time", "time", "timestamp", "vector", "year",
];

const AGGREGATIONS: &[&str] = &[
    "avg", "bottomk", "count", "count_values", "group", "max", "min", "quantile", "stddev",
    "stdvar", "sum", "topk",
];

const MODIFIERS: &[&str] = &[
    "by", "without", "bool", "on", "ignoring", "group_left", "group_right", "offset",
];

const BINARY_KEYWORDS: &[&str] = &["and", "or", "unless"];

/// Options accepted by [`new_complete_strategy`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteConfiguration {
    /// Upper bound on returned items; must be positive when set
    pub max_items: Option<usize>,
    /// Metric names offered next to the built-in vocabulary
    pub metric_names: Vec<String>,
}

/// Build a completion strategy from an optional configuration
///
/// `None` always succeeds and yields [`DefaultCompleteStrategy::default`].
pub fn new_complete_strategy(
    conf: Option<CompleteConfiguration>,
) -> anyhow::Result<DefaultCompleteStrategy> {
    let Some(conf) = conf else {
        return Ok(DefaultCompleteStrategy::default());
    };
    if conf.max_items == Some(0) {
        anyhow::bail!("completion maxItems must be greater than zero");
    }
    Ok(DefaultCompleteStrategy { conf })
}

/// Prefix-matching completion over the PromQL vocabulary
#[derive(Debug, Clone, Default)]
pub struct DefaultCompleteStrategy {
    conf: CompleteConfiguration,
}

impl DefaultCompleteStrategy {
    pub fn configuration(&self) -> &CompleteConfiguration {
        &self.conf
    }

    fn candidates(&self) -> impl Iterator<Item = (&str, CompletionItemKind)> {
        let builtin = FUNCTIONS
            .iter()
            .map(|f| (*f, CompletionItemKind::FUNCTION))
            .chain(AGGREGATIONS.iter().map(|a| (*a, CompletionItemKind::OPERATOR)))
            .chain(MODIFIERS.iter().map(|m| (*m, CompletionItemKind::KEYWORD)))
            .chain(BINARY_KEYWORDS.iter().map(|k| (*k, CompletionItemKind::KEYWORD)));

        self.conf
            .metric_names
            .iter()
            .map(|m| (m.as_str(), CompletionItemKind::CONSTANT))
            .chain(builtin)
    }
}

#[async_trait::async_trait]
impl CompletionStrategy for DefaultCompleteStrategy {
    async fn promql(&self, context: &CompletionContext) -> anyhow::Result<Option<CompletionResult>> {
        let (from, word) = context.word_before();
        if word.is_empty() && !context.explicit {
            return Ok(None);
        }

        let mut items: Vec<CompletionItem> = self
            .candidates()
            .filter(|(label, _)| label.starts_with(word))
            .map(|(label, kind)| CompletionItem {
                label: label.to_string(),
                kind: Some(kind),
                ..Default::default()
            })
            .collect();

        if let Some(max) = self.conf.max_items {
            items.truncate(max);
        }

        trace!("Completion for '{}' produced {} items", word, items.len());

        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResult { from, items }))
    }

    fn strategy_name(&self) -> &'static str {
        "promql-vocabulary"
    }
}

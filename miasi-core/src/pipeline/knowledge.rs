//! Knowledge resolution: conditions → advice.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::Knowledge;
use crate::config::EngineConfig;
use crate::error::{Error, InternalResult};
use crate::eval::{CompiledExpression, Variables};
use crate::preprocessor::{ConditionSplitter, Preprocessor};

/// Advice selected for a submission: one string in single-advice mode, every
/// match in multi-advice mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Advice {
    Single(String),
    Multiple(Vec<String>),
}

/// Number of satisfied (truthy) sub-conditions of `entry`.
pub fn satisfied_conditions(
    entry: &Knowledge,
    variables: &Variables,
    config: &EngineConfig,
) -> InternalResult<usize> {
    let splitter = ConditionSplitter::new(config.condition_delimiter.as_str());
    let mut satisfied = 0;
    for condition in splitter.process(entry.condition.as_str()) {
        let truthy = CompiledExpression::compile_with_limit(condition, config.max_expression_depth)
            .and_then(|expression| expression.evaluate_truthy(variables))
            .map_err(|e| Error::condition(&entry.condition, e))?;
        if truthy {
            satisfied += 1;
        }
    }
    tracing::debug!(knowledge = entry.id, satisfied, "condition evaluated");
    Ok(satisfied)
}

/// Picks the advice for a submission.
///
/// With `multi_advice` every entry with at least one satisfied sub-condition
/// is returned in catalog order. Otherwise the entry with the strictly
/// highest count wins and ties keep the earlier entry. `None` when nothing
/// matched. Every condition is evaluated, so a defective one fails the
/// request even when an earlier entry already matched.
#[tracing::instrument(level = "debug", skip_all, fields(entries = knowledge.len(), multi_advice = multi_advice))]
pub fn evaluate_knowledge(
    knowledge: &[Knowledge],
    multi_advice: bool,
    variables: &Variables,
    config: &EngineConfig,
) -> InternalResult<Option<Advice>> {
    if multi_advice {
        let mut matching = Vec::new();
        for entry in knowledge {
            if satisfied_conditions(entry, variables, config)? > 0 {
                matching.push(entry.advice.clone());
            }
        }
        return Ok((!matching.is_empty()).then_some(Advice::Multiple(matching)));
    }

    let mut best: Option<&Knowledge> = None;
    let mut best_count = 0;
    for entry in knowledge {
        let count = satisfied_conditions(entry, variables, config)?;
        if count > best_count {
            best_count = count;
            best = Some(entry);
        }
    }
    Ok(best.map(|entry| Advice::Single(entry.advice.clone())))
}

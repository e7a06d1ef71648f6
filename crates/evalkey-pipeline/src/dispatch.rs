use crate::registry::TransformerEntry;
use crate::value::{AllTransformersFailed, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Runs the retry-until-no-progress algorithm over a registry snapshot.
///
/// Each pass scans `remaining` in priority order. A success rewrites the
/// working value, permanently retires the entry, clears its recorded
/// failure, and restarts the scan from the top so higher-priority
/// transformers get the first look at the new value. A pass that produces
/// zero successes ends the run. Termination is bounded: every restart is
/// paid for by the removal of exactly one entry, so there are at most N full
/// rescans.
pub(crate) fn run(
    snapshot: Vec<Arc<TransformerEntry>>,
    input: Value,
) -> Result<Value, AllTransformersFailed> {
    let mut remaining = snapshot;
    let mut working = input.clone();
    let mut failures = BTreeMap::new();
    let mut any_succeeded = false;

    while !remaining.is_empty() {
        let mut progressed = false;
        let mut index = 0;
        while index < remaining.len() {
            let entry = &remaining[index];
            match entry.invoke(&working) {
                Ok(next) => {
                    working = next;
                    any_succeeded = true;
                    failures.remove(entry.name());
                    remaining.remove(index);
                    progressed = true;
                    break; // back to the top of the shorter list
                }
                Err(error) => {
                    failures.insert(entry.name().to_string(), error);
                    index += 1;
                }
            }
        }
        if !progressed {
            break; // a full pass without progress: nothing more will change
        }
    }

    if any_succeeded {
        return Ok(working);
    }
    if !failures.is_empty() {
        return Err(AllTransformersFailed { input, failures });
    }
    // Empty registry: the input passes through unchanged.
    Ok(input)
}

//! Locale-based fragment selection.
//!
//! Responsibilities:
//! - Filter fragments down to those whose locale matches the environment.
//! - Resolve fragments that share a name.
//!
//! Invariants:
//! - Output is ordered by the first declaration of each surviving name.
//! - Among matching fragments with the same name, the one with the most
//!   literal locale components wins, so any literal locale beats `*::*::*::*`.
//! - Two matching fragments with the same name and equal specificity are a
//!   configuration mistake. The first declared is kept and a warning names
//!   both. This is a chosen rule, not one derived from any contract.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::locale::Environment;
use crate::types::Fragment;

/// Keep the fragments that apply to `env`, one per name.
pub fn select_fragments<F: Fragment>(fragments: Vec<F>, env: &Environment) -> Vec<F> {
    let mut winners: Vec<F> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for fragment in fragments {
        if fragment.name().is_empty() {
            continue;
        }
        if !fragment.locale().matches(env) {
            debug!(
                fragment = fragment.name(),
                locale = %fragment.locale(),
                "Skipping fragment for non-matching locale"
            );
            continue;
        }

        let Some(&slot) = by_name.get(fragment.name()) else {
            by_name.insert(fragment.name().to_string(), winners.len());
            winners.push(fragment);
            continue;
        };

        let current = &winners[slot];
        let current_rank = current.locale().specificity();
        let candidate_rank = fragment.locale().specificity();
        if candidate_rank > current_rank {
            debug!(
                fragment = fragment.name(),
                replaced = %current.locale(),
                locale = %fragment.locale(),
                "More specific locale replaces earlier fragment"
            );
            winners[slot] = fragment;
        } else if candidate_rank == current_rank {
            warn!(
                fragment = fragment.name(),
                kept = %current.locale(),
                ignored = %fragment.locale(),
                "Duplicate fragment with equally specific locale; keeping the first declared"
            );
        }
    }

    winners
}

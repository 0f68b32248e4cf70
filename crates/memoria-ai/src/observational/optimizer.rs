//! Display-only compaction of accepted observations.
//!
//! Applied to the text shown to the acting agent, never to what is stored.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static MINOR_PRIORITY_GLYPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:🟡|🟢)\s*").expect("Invalid regex"));

static SEMANTIC_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]").expect("Invalid regex"));

// `[72 items collapsed - ID: b1fa]` carries a count and an id the agent can
// use to expand the group.
static COLLAPSED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[\d\s]*items collapsed").expect("Invalid regex"));

static ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*->\s*").expect("Invalid regex"));

static REPEATED_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("Invalid regex"));

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid regex"));

/// Strip low-value markup from observations before showing them to the agent.
///
/// Keeps only the high-priority glyph, drops bracketed tags except collapsed
/// item markers, removes `->` continuation arrows and collapses whitespace.
pub fn optimize_observations_for_context(observations: &str) -> String {
    let optimized = MINOR_PRIORITY_GLYPH.replace_all(observations, "");
    let optimized = SEMANTIC_TAG.replace_all(&optimized, |caps: &Captures| {
        let tag = &caps[0];
        if COLLAPSED_MARKER.is_match(tag) {
            tag.to_string()
        } else {
            String::new()
        }
    });
    let optimized = ARROW.replace_all(&optimized, " ");
    let optimized = REPEATED_SPACES.replace_all(&optimized, " ");
    let optimized = EXCESS_NEWLINES.replace_all(&optimized, "\n\n");
    optimized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_high_priority_glyph() {
        let input = "* 🔴 (14:30) fact\n* 🟡 (14:31) detail\n* 🟢 (14:32) minor";
        assert_eq!(
            optimize_observations_for_context(input),
            "* 🔴 (14:30) fact\n* (14:31) detail\n* (14:32) minor"
        );
    }

    #[test]
    fn strips_semantic_tags_but_keeps_collapsed_markers() {
        let input = "* note [preference, food] here\n[72 items collapsed - ID: b1fa]";
        assert_eq!(
            optimize_observations_for_context(input),
            "* note here\n[72 items collapsed - ID: b1fa]"
        );
    }

    #[test]
    fn removes_arrows() {
        let input = "* 🟡 (14:33) debugging\n  * -> ran git status";
        assert_eq!(
            optimize_observations_for_context(input),
            "* (14:33) debugging\n * ran git status"
        );
    }

    #[test]
    fn collapses_blank_lines() {
        let input = "a\n\n\n\n\nb";
        assert_eq!(optimize_observations_for_context(input), "a\n\nb");
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "日期：2025年12月4日\n* 🔴 (14:30) fact [tag]\n* 🟡 (14:31) x -> y\n\n\n\n* 🟢  done",
            "[3 items collapsed - ID: ab12] -> [other]   end",
            "-[x]> odd  \n\n\n  ",
            "",
        ];
        for input in inputs {
            let once = optimize_observations_for_context(input);
            let twice = optimize_observations_for_context(&once);
            assert_eq!(once, twice, "input: {input:?}");
        }
    }
}

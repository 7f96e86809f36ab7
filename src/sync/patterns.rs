//! Failure classification for package manager diagnostics.
//!
//! When a sync exits non-zero, its stderr is matched against known patterns
//! from uv, pdm and poetry to pick the [`SyncError`] variant. Output that
//! matches nothing becomes [`SyncError::SyncFailed`] with the exit code.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::SyncError;

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

// uv: "Group `docs` is not defined in the project's `dependency-groups` table"
lazy_regex!(RE_UV_GROUP, r"[Gg]roup `([^`]+)` is not defined");
// pdm: "Requested groups not in lockfile: docs,test"
lazy_regex!(
    RE_PDM_GROUP,
    r"[Rr]equested groups? not in lock ?file: *([A-Za-z0-9_.\-]+)"
);
// pdm/other: "Dependency group 'docs' does not exist"
lazy_regex!(
    RE_GROUP_MISSING,
    r#"[Dd]ependency group ['"`]?([A-Za-z0-9_.\-]+)['"`]? (?:does not exist|not found)"#
);
// poetry: "Group(s) not found: docs (via --with)"
lazy_regex!(RE_POETRY_GROUP, r"Group\(s\) not found: *([A-Za-z0-9_.\-]+)");

lazy_regex!(
    RE_NETWORK,
    r"(?i)failed to download|failed to fetch|error sending request|network (?:is )?unreachable|connection (?:refused|reset|timed out|aborted)|dns error|temporary failure in name resolution|could not connect|max retries exceeded|read ?timeout|connect ?timeout|ssl(?:error| error)"
);

lazy_regex!(
    RE_RESOLUTION,
    r"(?i)no solution found|can't be installed because|not compatible with the current platform|incompatible with the project's python requirement|requires-python|version solving failed|unable to find a resolution|resolutionimpossible|no matching distribution|unsatisfiable"
);

static GROUP_PATTERNS: [&LazyLock<Regex>; 4] =
    [&RE_UV_GROUP, &RE_PDM_GROUP, &RE_GROUP_MISSING, &RE_POETRY_GROUP];

/// Classify a failed sync from its diagnostics and exit code.
pub fn classify_failure(diagnostics: &str, exit_code: i32) -> SyncError {
    let code = Some(exit_code);

    for pattern in GROUP_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(diagnostics) {
            if let Some(group) = caps.get(1) {
                return SyncError::GroupNotFound {
                    group: group.as_str().trim_end_matches([',', '.']).to_string(),
                    code,
                };
            }
        }
    }

    if let Some(line) = first_matching_line(&RE_NETWORK, diagnostics) {
        return SyncError::NetworkError {
            message: line,
            code,
        };
    }

    if let Some(line) = first_matching_line(&RE_RESOLUTION, diagnostics) {
        return SyncError::ResolutionConflict {
            message: line,
            code,
        };
    }

    SyncError::SyncFailed { code: exit_code }
}

fn first_matching_line(pattern: &Regex, text: &str) -> Option<String> {
    text.lines()
        .find(|line| pattern.is_match(line))
        .map(|line| {
            line.trim()
                .trim_start_matches("error:")
                .trim_start_matches("×")
                .trim()
                .to_string()
        })
}

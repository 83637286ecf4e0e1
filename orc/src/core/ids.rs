//! Human-readable entity identifiers and derived names.
//!
//! Ids are `{PREFIX}-{NNN}`: the prefix is fixed per entity kind and the
//! number is zero-padded to at least three digits. Wider numbers are never
//! truncated (`MISSION-1000` follows `MISSION-999`).

use std::fmt;

/// Entity kinds that carry generated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Mission,
    Grove,
    Operation,
    Shipment,
    Workbench,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Mission => "MISSION",
            Self::Grove => "GROVE",
            Self::Operation => "OP",
            Self::Shipment => "SHIP",
            Self::Workbench => "BENCH",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Return the id following `current_max` (use `0` when none exist yet).
///
/// Returns `None` when `current_max` is the largest representable number,
/// since no unused id follows it.
pub fn generate_id(kind: IdKind, current_max: u32) -> Option<String> {
    let next = current_max.checked_add(1)?;
    Some(format!("{}-{next:03}", kind.prefix()))
}

/// Extract the numeric suffix of `id`.
///
/// Returns `None` unless `id` is exactly `{PREFIX}-<digits>` for `kind`.
pub fn parse_number(kind: IdKind, id: &str) -> Option<u32> {
    let digits = id.strip_prefix(kind.prefix())?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Highest number among `ids` of the given kind; malformed ids are ignored.
pub fn max_number<'a>(kind: IdKind, ids: impl IntoIterator<Item = &'a str>) -> u32 {
    ids.into_iter()
        .filter_map(|id| parse_number(kind, id))
        .max()
        .unwrap_or(0)
}

/// tmux session name for a mission: `{prefix}-{mission_id}`.
pub fn session_name(prefix: &str, mission_id: &str) -> String {
    format!("{prefix}-{mission_id}")
}

/// Directory name of a grove workspace: `{mission_id}-{grove_name}`.
pub fn grove_dir_name(mission_id: &str, grove_name: &str) -> String {
    format!("{mission_id}-{grove_name}")
}

/// Branch a grove's worktrees are checked out on: `{mission_id}/{grove_name}`.
pub fn grove_branch(mission_id: &str, grove_name: &str) -> String {
    format!("{mission_id}/{grove_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_id_pads_to_three_digits() {
        assert_eq!(generate_id(IdKind::Mission, 0).as_deref(), Some("MISSION-001"));
        assert_eq!(generate_id(IdKind::Grove, 41).as_deref(), Some("GROVE-042"));
        assert_eq!(generate_id(IdKind::Operation, 998).as_deref(), Some("OP-999"));
    }

    /// Past 999 the number widens instead of wrapping or truncating.
    #[test]
    fn generate_id_grows_past_three_digits() {
        assert_eq!(generate_id(IdKind::Mission, 999).as_deref(), Some("MISSION-1000"));
        assert_eq!(generate_id(IdKind::Shipment, 12_344).as_deref(), Some("SHIP-12345"));
    }

    /// The largest stored number has no successor; reusing it would collide.
    #[test]
    fn generate_id_is_exhausted_at_max_number() {
        let max = max_number(IdKind::Mission, ["MISSION-4294967295"]);
        assert_eq!(max, u32::MAX);
        assert_eq!(generate_id(IdKind::Mission, max), None);
        assert_eq!(
            generate_id(IdKind::Mission, u32::MAX - 1).as_deref(),
            Some("MISSION-4294967295")
        );
    }

    #[test]
    fn parse_number_round_trips_generated_ids() {
        for n in [0, 1, 9, 98, 99, 998, 999, 1000, 65_535, u32::MAX - 1] {
            for kind in [IdKind::Mission, IdKind::Grove, IdKind::Operation] {
                let id = generate_id(kind, n).expect("next id");
                assert_eq!(parse_number(kind, &id), Some(n + 1));
            }
        }
    }

    #[test]
    fn parse_number_rejects_malformed_ids() {
        for bad in [
            "",
            "MISSION",
            "MISSION-",
            "MISSION001",
            "GROVE-001",
            "mission-001",
            "MISSION-00a",
            "MISSION--01",
            "MISSION-+01",
            " MISSION-001",
            "MISSION-001 ",
        ] {
            assert_eq!(parse_number(IdKind::Mission, bad), None, "input {bad:?}");
        }
    }

    /// A prefix that is itself a prefix of another must not match it.
    #[test]
    fn parse_number_requires_dash_after_prefix() {
        assert_eq!(parse_number(IdKind::Operation, "OPS-001"), None);
        assert_eq!(parse_number(IdKind::Operation, "OP-001"), Some(1));
    }

    #[test]
    fn parse_number_rejects_overflow() {
        assert_eq!(parse_number(IdKind::Mission, "MISSION-99999999999"), None);
    }

    #[test]
    fn max_number_skips_foreign_ids() {
        let ids = ["MISSION-003", "MISSION-010", "GROVE-500", "junk"];
        assert_eq!(max_number(IdKind::Mission, ids), 10);
        assert_eq!(max_number(IdKind::Workbench, ids), 0);
    }

    #[test]
    fn derived_names_concatenate_ids() {
        assert_eq!(session_name("orc", "MISSION-001"), "orc-MISSION-001");
        assert_eq!(grove_dir_name("MISSION-001", "auth"), "MISSION-001-auth");
        assert_eq!(grove_branch("MISSION-001", "auth"), "MISSION-001/auth");
    }
}

//! Effect vocabulary: descriptions of side effects, never the side effects.
//!
//! Every kind carries a constant discriminator so an executor can dispatch on
//! [`Effect::kind`] without inspecting types. The set is closed: a new I/O
//! category gets a new kind, never a specialization of an existing one.
//! Effects hold plain data only and may be serialized, logged or diffed
//! before anything runs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

/// One desired side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    File(FileEffect),
    Persist(PersistEffect),
    Git(GitEffect),
    Tmux(TmuxEffect),
    Log(LogEffect),
    Query(QueryEffect),
    /// Effects the caller books as one unit. Executors still apply the
    /// sub-effects one by one.
    Composite { effects: Vec<Effect> },
    /// Explicitly nothing to do.
    None,
}

impl Effect {
    pub const COMPOSITE: &'static str = "composite";
    pub const NONE: &'static str = "none";

    /// Stable discriminator string for this effect.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => FileEffect::KIND,
            Self::Persist(_) => PersistEffect::KIND,
            Self::Git(_) => GitEffect::KIND,
            Self::Tmux(_) => TmuxEffect::KIND,
            Self::Log(_) => LogEffect::KIND,
            Self::Query(_) => QueryEffect::KIND,
            Self::Composite { .. } => Self::COMPOSITE,
            Self::None => Self::NONE,
        }
    }

    /// Leaf effects in application order: composites are expanded
    /// depth-first and `None` is dropped.
    pub fn leaves(&self) -> Vec<&Effect> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(effect: &'a Effect, out: &mut Vec<&'a Effect>) {
    match effect {
        Effect::Composite { effects } => {
            for inner in effects {
                collect_leaves(inner, out);
            }
        }
        Effect::None => {}
        leaf => out.push(leaf),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOp {
    /// Create the directory and any missing parents.
    Mkdir,
    Write,
    Read,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEffect {
    pub op: FileOp,
    pub path: PathBuf,
    pub content: Option<Vec<u8>>,
    /// Unix permission bits, e.g. `0o755`.
    pub mode: Option<u32>,
}

impl FileEffect {
    pub const KIND: &'static str = "file";
    pub const DIR_MODE: u32 = 0o755;
    pub const FILE_MODE: u32 = 0o644;

    pub fn mkdir(path: impl Into<PathBuf>) -> Self {
        Self {
            op: FileOp::Mkdir,
            path: path.into(),
            content: None,
            mode: Some(Self::DIR_MODE),
        }
    }

    pub fn write(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            op: FileOp::Write,
            path: path.into(),
            content: Some(content.into()),
            mode: Some(Self::FILE_MODE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOp {
    Create,
    Update,
    Delete,
}

/// A mutation of one persisted entity table.
///
/// Maps are ordered so serialized payloads are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistEffect {
    /// Table name, e.g. `missions` or `groves`.
    pub entity: String,
    pub op: PersistOp,
    pub data: BTreeMap<String, Value>,
    pub filters: BTreeMap<String, Value>,
}

impl PersistEffect {
    pub const KIND: &'static str = "persist";

    pub fn create(entity: &str, data: BTreeMap<String, Value>) -> Self {
        Self {
            entity: entity.to_string(),
            op: PersistOp::Create,
            data,
            filters: BTreeMap::new(),
        }
    }

    /// Update the row whose `id` equals `id`.
    pub fn update_by_id(entity: &str, id: &str, data: BTreeMap<String, Value>) -> Self {
        Self {
            entity: entity.to_string(),
            op: PersistOp::Update,
            data,
            filters: id_filter("id", id),
        }
    }

    /// Delete every row whose `field` equals `value`.
    pub fn delete_where(entity: &str, field: &str, value: &str) -> Self {
        Self {
            entity: entity.to_string(),
            op: PersistOp::Delete,
            data: BTreeMap::new(),
            filters: id_filter(field, value),
        }
    }
}

fn id_filter(field: &str, value: &str) -> BTreeMap<String, Value> {
    BTreeMap::from([(field.to_string(), Value::String(value.to_string()))])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitOp {
    Clone,
    WorktreeAdd,
    WorktreeRemove,
    Fetch,
    Commit,
    Push,
}

impl GitOp {
    /// Leading `git` subcommand words for this operation.
    pub fn subcommand(self) -> &'static [&'static str] {
        match self {
            Self::Clone => &["clone"],
            Self::WorktreeAdd => &["worktree", "add"],
            Self::WorktreeRemove => &["worktree", "remove"],
            Self::Fetch => &["fetch"],
            Self::Commit => &["commit"],
            Self::Push => &["push"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitEffect {
    pub op: GitOp,
    /// Repository the command runs against (`git -C <repo_path>`).
    pub repo_path: PathBuf,
    /// Arguments following the subcommand.
    pub args: Vec<String>,
}

impl GitEffect {
    pub const KIND: &'static str = "git";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TmuxOp {
    NewSession,
    NewWindow,
    SplitVertical,
    SplitHorizontal,
    SendKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TmuxEffect {
    pub op: TmuxOp,
    pub session: String,
    pub window: Option<String>,
    /// Pane index within the window, counted from 0.
    pub pane: Option<u32>,
    pub command: Option<String>,
    pub start_dir: Option<PathBuf>,
}

impl TmuxEffect {
    pub const KIND: &'static str = "tmux";

    /// `session[:window[.pane]]` target string.
    pub fn target(&self) -> String {
        let mut target = self.session.clone();
        if let Some(window) = &self.window {
            target.push(':');
            target.push_str(window);
            if let Some(pane) = self.pane {
                target.push('.');
                target.push_str(&pane.to_string());
            }
        }
        target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEffect {
    pub level: LogLevel,
    pub message: String,
}

impl LogEffect {
    pub const KIND: &'static str = "log";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryEffect {
    pub entity: String,
    pub filters: BTreeMap<String, Value>,
}

impl QueryEffect {
    pub const KIND: &'static str = "query";
}

impl From<FileEffect> for Effect {
    fn from(effect: FileEffect) -> Self {
        Self::File(effect)
    }
}

impl From<PersistEffect> for Effect {
    fn from(effect: PersistEffect) -> Self {
        Self::Persist(effect)
    }
}

impl From<GitEffect> for Effect {
    fn from(effect: GitEffect) -> Self {
        Self::Git(effect)
    }
}

impl From<TmuxEffect> for Effect {
    fn from(effect: TmuxEffect) -> Self {
        Self::Tmux(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(message: &str) -> Effect {
        Effect::Log(LogEffect {
            level: LogLevel::Info,
            message: message.to_string(),
        })
    }

    #[test]
    fn kinds_are_stable_strings() {
        assert_eq!(Effect::from(FileEffect::mkdir("/tmp/x")).kind(), "file");
        assert_eq!(
            Effect::from(PersistEffect::create("missions", BTreeMap::new())).kind(),
            "persist"
        );
        assert_eq!(log("hi").kind(), "log");
        assert_eq!(Effect::None.kind(), "none");
        assert_eq!(Effect::Composite { effects: vec![] }.kind(), "composite");
    }

    /// The serialized tag matches the discriminator an executor dispatches on.
    #[test]
    fn serialized_tag_matches_kind() {
        let effect = Effect::from(FileEffect::write("/tmp/a.json", "{}"));
        let json = serde_json::to_value(&effect).expect("serialize");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["op"], "write");
        assert_eq!(json["mode"], 0o644);

        let none = serde_json::to_value(Effect::None).expect("serialize");
        assert_eq!(none["kind"], "none");
    }

    #[test]
    fn leaves_flatten_nested_composites_and_drop_none() {
        let effect = Effect::Composite {
            effects: vec![
                log("a"),
                Effect::None,
                Effect::Composite {
                    effects: vec![log("b"), log("c")],
                },
            ],
        };
        let messages: Vec<&str> = effect
            .leaves()
            .into_iter()
            .map(|leaf| match leaf {
                Effect::Log(log) => log.message.as_str(),
                other => panic!("unexpected leaf {other:?}"),
            })
            .collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert!(Effect::None.leaves().is_empty());
    }

    #[test]
    fn tmux_target_includes_window_and_pane() {
        let mut effect = TmuxEffect {
            op: TmuxOp::SendKeys,
            session: "orc-MISSION-001".to_string(),
            window: Some("auth".to_string()),
            pane: Some(1),
            command: Some("orc prime".to_string()),
            start_dir: None,
        };
        assert_eq!(effect.target(), "orc-MISSION-001:auth.1");
        effect.pane = None;
        assert_eq!(effect.target(), "orc-MISSION-001:auth");
        effect.window = None;
        assert_eq!(effect.target(), "orc-MISSION-001");
    }

    #[test]
    fn persist_helpers_filter_on_single_field() {
        let effect = PersistEffect::delete_where("shipments", "mission_id", "MISSION-002");
        assert_eq!(effect.op, PersistOp::Delete);
        assert!(effect.data.is_empty());
        assert_eq!(effect.filters.get("mission_id"), Some(&Value::from("MISSION-002")));
    }
}

//! Grove planners: creating a grove workspace and opening it in tmux.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::{
    MissionLayout, Plan, Planned, grove_config_dir, grove_config_path, path_value, timestamp,
};
use crate::core::effect::{FileEffect, GitEffect, GitOp, PersistEffect, TmuxEffect, TmuxOp};
use crate::core::ids::{IdKind, generate_id, grove_branch};

/// Version stamped into `.orc/config.json`.
pub const GROVE_CONFIG_VERSION: u32 = 1;

/// A source repository a grove gets a worktree of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSource {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroveInput {
    /// Highest grove number currently on record.
    pub current_max: u32,
    pub mission_id: String,
    pub name: String,
    pub workspaces_root: PathBuf,
    pub repos: Vec<RepoSource>,
    pub now: DateTime<Utc>,
}

/// Plan a new grove.
///
/// Order: mkdir mission dir, mkdir groves dir, mkdir grove dir, mkdir
/// `.orc`, write config; persist create; one `worktree add` per repo into
/// `{grove_dir}/{repo}` on the branch `{mission_id}/{grove_name}`.
///
/// `None` when the grove id space is exhausted.
pub fn plan_create_grove(input: &CreateGroveInput) -> Option<Planned> {
    let id = generate_id(IdKind::Grove, input.current_max)?;
    let layout = MissionLayout::new(&input.workspaces_root, &input.mission_id);
    let grove_dir = layout.grove_dir(&input.mission_id, &input.name);
    let repo_names: Vec<String> = input.repos.iter().map(|repo| repo.name.clone()).collect();

    let mut plan = Plan::default();
    plan.file.push(FileEffect::mkdir(&layout.mission_dir));
    plan.file.push(FileEffect::mkdir(&layout.groves_dir));
    plan.file.push(FileEffect::mkdir(&grove_dir));
    plan.file.push(FileEffect::mkdir(grove_config_dir(&grove_dir)));
    plan.file.push(FileEffect::write(
        grove_config_path(&grove_dir),
        grove_config(&id, &input.mission_id, &input.name, &repo_names, input.now),
    ));

    let data = BTreeMap::from([
        ("id".to_string(), Value::String(id.clone())),
        (
            "mission_id".to_string(),
            Value::String(input.mission_id.clone()),
        ),
        ("name".to_string(), Value::String(input.name.clone())),
        ("path".to_string(), path_value(&grove_dir)),
        ("repos".to_string(), json!(repo_names)),
    ]);
    plan.persist.push(PersistEffect::create("groves", data));

    let branch = grove_branch(&input.mission_id, &input.name);
    for repo in &input.repos {
        let dest = grove_dir.join(&repo.name);
        plan.git.push(GitEffect {
            op: GitOp::WorktreeAdd,
            repo_path: repo.path.clone(),
            args: vec![
                "-b".to_string(),
                branch.clone(),
                dest.to_string_lossy().into_owned(),
            ],
        });
    }

    Some(Planned { id, plan })
}

/// Contents of a grove's `.orc/config.json`: pretty JSON with sorted keys
/// and a trailing newline.
pub fn grove_config(
    grove_id: &str,
    mission_id: &str,
    name: &str,
    repos: &[String],
    now: DateTime<Utc>,
) -> String {
    let value = json!({
        "version": GROVE_CONFIG_VERSION,
        "grove_id": grove_id,
        "mission_id": mission_id,
        "name": name,
        "repos": repos,
        "created_at": timestamp(now),
    });
    format!("{value:#}\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenGroveInput {
    /// Mission session the window is added to.
    pub session: String,
    pub grove_name: String,
    pub grove_path: PathBuf,
    /// Runs in pane 0.
    pub editor_command: String,
    /// Starts the IMP in pane 1.
    pub bootstrap_command: String,
}

/// Plan the fixed five-effect pane layout for one grove:
/// new-window, split-vertical, split-horizontal, send-keys(editor),
/// send-keys(IMP bootstrap).
pub fn plan_open_grove(input: &OpenGroveInput) -> Plan {
    let effect = |op: TmuxOp, pane: Option<u32>, command: Option<&str>, dir: Option<&Path>| {
        TmuxEffect {
            op,
            session: input.session.clone(),
            window: Some(input.grove_name.clone()),
            pane,
            command: command.map(str::to_string),
            start_dir: dir.map(Path::to_path_buf),
        }
    };
    let dir = Some(input.grove_path.as_path());

    let mut plan = Plan::default();
    plan.tmux.push(effect(TmuxOp::NewWindow, None, None, dir));
    plan.tmux.push(effect(TmuxOp::SplitVertical, Some(0), None, dir));
    plan.tmux.push(effect(TmuxOp::SplitHorizontal, Some(1), None, dir));
    plan.tmux.push(effect(
        TmuxOp::SendKeys,
        Some(0),
        Some(input.editor_command.as_str()),
        None,
    ));
    plan.tmux.push(effect(
        TmuxOp::SendKeys,
        Some(1),
        Some(input.bootstrap_command.as_str()),
        None,
    ));
    plan
}

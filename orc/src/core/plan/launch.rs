//! Mission launch planner: materialize the mission workspace and its groves.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{MissionLayout, Plan, grove_config_dir, grove_config_path, path_value};
use crate::core::effect::{FileEffect, PersistEffect, TmuxEffect, TmuxOp};
use crate::core::ids::session_name;
use crate::core::plan::grove::grove_config;

/// A grove as recorded before launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchGrove {
    pub id: String,
    pub name: String,
    pub repos: Vec<String>,
    /// Location currently on record, if any.
    pub current_path: Option<PathBuf>,
    /// Whether the grove's workspace is already materialized on disk.
    pub workspace_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchInput {
    pub mission_id: String,
    pub workspaces_root: PathBuf,
    pub groves: Vec<LaunchGrove>,
    /// Also plan the mission's tmux session.
    pub create_session: bool,
    pub session_prefix: String,
    pub now: DateTime<Utc>,
}

/// Plan a mission launch.
///
/// File effects: mission dir, groves dir, then per grove its `.orc` dir and
/// config file. Persist effects: a `groves.path` update only for groves whose
/// recorded path differs from the computed one. Tmux effects (when
/// requested): one `new_session`, then one `new_window` per grove whose
/// workspace exists. Flattened order is file, persist, git, tmux.
pub fn plan_launch(input: &LaunchInput) -> Plan {
    let layout = MissionLayout::new(&input.workspaces_root, &input.mission_id);
    let mut plan = Plan::default();

    plan.file.push(FileEffect::mkdir(&layout.mission_dir));
    plan.file.push(FileEffect::mkdir(&layout.groves_dir));

    for grove in &input.groves {
        let grove_dir = layout.grove_dir(&input.mission_id, &grove.name);
        plan.file.push(FileEffect::mkdir(grove_config_dir(&grove_dir)));
        plan.file.push(FileEffect::write(
            grove_config_path(&grove_dir),
            grove_config(
                &grove.id,
                &input.mission_id,
                &grove.name,
                &grove.repos,
                input.now,
            ),
        ));

        if grove.current_path.as_deref() != Some(grove_dir.as_path()) {
            let data = BTreeMap::from([("path".to_string(), path_value(&grove_dir))]);
            plan.persist
                .push(PersistEffect::update_by_id("groves", &grove.id, data));
        }
    }

    if input.create_session {
        let session = session_name(&input.session_prefix, &input.mission_id);
        plan.tmux.push(TmuxEffect {
            op: TmuxOp::NewSession,
            session: session.clone(),
            window: None,
            pane: None,
            command: None,
            start_dir: Some(layout.mission_dir.clone()),
        });
        for grove in input.groves.iter().filter(|grove| grove.workspace_exists) {
            plan.tmux.push(TmuxEffect {
                op: TmuxOp::NewWindow,
                session: session.clone(),
                window: Some(grove.name.clone()),
                pane: None,
                command: None,
                start_dir: Some(layout.grove_dir(&input.mission_id, &grove.name)),
            });
        }
    }

    plan
}

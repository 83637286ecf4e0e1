//! Executor seam: the shell hands plans here, one leaf effect at a time.
//!
//! The [`Executor`] trait decouples commands from whatever actually performs
//! effects. [`DryRunExecutor`] only renders what would run.
//! [`MemoryExecutor`] applies `persist` effects to a [`MemoryStore`] and
//! records everything else, which is what the tests drive.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument};

use crate::core::effect::{
    Effect, FileEffect, FileOp, GitEffect, LogLevel, PersistEffect, TmuxEffect, TmuxOp,
};
use crate::core::plan::Plan;
use crate::io::store::MemoryStore;

/// Performs leaf effects.
pub trait Executor {
    /// Apply one effect. Never called with `Composite` or `None`.
    fn apply(&self, effect: &Effect) -> Result<()>;
}

/// Outcome of a fully applied plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Kinds of the applied leaf effects, in order.
    pub kinds: Vec<&'static str>,
}

impl ExecutionReport {
    pub fn applied(&self) -> usize {
        self.kinds.len()
    }
}

/// Apply every effect of `plan` in order, stopping at the first failure.
#[instrument(skip_all, fields(effects = plan.len()))]
pub fn execute_plan<E: Executor + ?Sized>(executor: &E, plan: &Plan) -> Result<ExecutionReport> {
    let mut report = ExecutionReport::default();
    for effect in plan.effects() {
        for leaf in effect.leaves() {
            let index = report.kinds.len();
            executor
                .apply(leaf)
                .with_context(|| format!("apply effect #{index} ({})", leaf.kind()))?;
            report.kinds.push(leaf.kind());
        }
    }
    debug!(applied = report.applied(), "plan executed");
    Ok(report)
}

/// `git -C <repo> <subcommand…> <args…>`.
pub fn git_argv(effect: &GitEffect) -> Vec<String> {
    let mut argv = vec![
        "git".to_string(),
        "-C".to_string(),
        effect.repo_path.to_string_lossy().into_owned(),
    ];
    argv.extend(effect.op.subcommand().iter().map(|word| (*word).to_string()));
    argv.extend(effect.args.iter().cloned());
    argv
}

/// tmux argv for one effect. `split_vertical` puts the panes side by side.
pub fn tmux_argv(effect: &TmuxEffect) -> Vec<String> {
    let mut argv = vec!["tmux".to_string()];
    let mut push = |words: &[&str]| argv.extend(words.iter().map(|word| (*word).to_string()));
    match effect.op {
        TmuxOp::NewSession => push(&["new-session", "-d", "-s", effect.session.as_str()]),
        TmuxOp::NewWindow => {
            push(&["new-window", "-t", effect.session.as_str()]);
            if let Some(window) = &effect.window {
                push(&["-n", window.as_str()]);
            }
        }
        TmuxOp::SplitVertical => push(&["split-window", "-h", "-t", effect.target().as_str()]),
        TmuxOp::SplitHorizontal => push(&["split-window", "-v", "-t", effect.target().as_str()]),
        TmuxOp::SendKeys => {
            push(&["send-keys", "-t", effect.target().as_str()]);
            if let Some(command) = &effect.command {
                push(&[command.as_str(), "Enter"]);
            }
        }
    }
    if let Some(dir) = &effect.start_dir {
        argv.push("-c".to_string());
        argv.push(dir.to_string_lossy().into_owned());
    }
    argv
}

/// One human-readable line describing a leaf effect.
pub fn render_effect(effect: &Effect) -> String {
    match effect {
        Effect::File(file) => render_file(file),
        Effect::Persist(persist) => render_persist(persist),
        Effect::Git(git) => git_argv(git).join(" "),
        Effect::Tmux(tmux) => tmux_argv(tmux).join(" "),
        Effect::Log(log) => {
            let level = match log.level {
                LogLevel::Debug => "debug",
                LogLevel::Info => "info",
                LogLevel::Warn => "warn",
            };
            format!("log {level}: {}", log.message)
        }
        Effect::Query(query) => format!("query {} where {}", query.entity, json(&query.filters)),
        Effect::Composite { effects } => format!("composite ({} effects)", effects.len()),
        Effect::None => "none".to_string(),
    }
}

fn render_file(file: &FileEffect) -> String {
    let path = file.path.display();
    let mode = file.mode.map(|mode| format!(" mode {mode:o}")).unwrap_or_default();
    match file.op {
        FileOp::Mkdir => format!("mkdir -p {path}{mode}"),
        FileOp::Write => {
            let bytes = file.content.as_ref().map_or(0, Vec::len);
            format!("write {path} ({bytes} bytes){mode}")
        }
        FileOp::Read => format!("read {path}"),
        FileOp::Exists => format!("exists {path}"),
    }
}

fn render_persist(persist: &PersistEffect) -> String {
    let op = serde_json::to_value(persist.op)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", persist.op));
    let mut line = format!("persist {op} {}", persist.entity);
    if !persist.filters.is_empty() {
        line.push_str(&format!(" where {}", json(&persist.filters)));
    }
    if !persist.data.is_empty() {
        line.push_str(&format!(" set {}", json(&persist.data)));
    }
    line
}

fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unserializable>".to_string())
}

fn lock_lines(lines: &Mutex<Vec<String>>) -> Result<MutexGuard<'_, Vec<String>>> {
    lines.lock().map_err(|_| anyhow!("executor log lock poisoned"))
}

/// Renders effects instead of performing them. Clones share the rendered
/// lines.
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor {
    lines: Arc<Mutex<Vec<String>>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines so far, in application order.
    pub fn lines(&self) -> Result<Vec<String>> {
        Ok(lock_lines(&self.lines)?.clone())
    }
}

impl Executor for DryRunExecutor {
    fn apply(&self, effect: &Effect) -> Result<()> {
        let line = render_effect(effect);
        info!(kind = effect.kind(), "dry run: {line}");
        lock_lines(&self.lines)?.push(line);
        Ok(())
    }
}

/// Applies `persist` effects to a shared [`MemoryStore`] and records every
/// effect it sees.
#[derive(Debug, Clone)]
pub struct MemoryExecutor {
    store: MemoryStore,
    applied: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl MemoryExecutor {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            applied: Arc::default(),
            fail_on: None,
        }
    }

    /// Fail every effect of the given kind (for exercising partial failure).
    pub fn failing_on(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Rendered lines of every applied effect, in order.
    pub fn applied(&self) -> Result<Vec<String>> {
        Ok(lock_lines(&self.applied)?.clone())
    }
}

impl Executor for MemoryExecutor {
    fn apply(&self, effect: &Effect) -> Result<()> {
        if self.fail_on == Some(effect.kind()) {
            bail!("{} effects are configured to fail", effect.kind());
        }
        match effect {
            Effect::Persist(persist) => {
                let touched = self.store.apply(persist)?;
                debug!(entity = %persist.entity, touched, "persist applied");
            }
            Effect::Composite { .. } | Effect::None => {
                bail!("executor given non-leaf effect '{}'", effect.kind())
            }
            _ => {}
        }
        lock_lines(&self.applied)?.push(render_effect(effect));
        Ok(())
    }
}

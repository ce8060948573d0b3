//! Interactive, line-oriented review session.
//!
//! Each line is one command; replies and notifications are written back
//! after every command. Operation errors are reported and the session keeps
//! going. Only I/O failures on the terminal end it.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::str::FromStr;

use review::consts::INTERVAL_COUNT;
use review::geometry::Point;
use review::input::{Key, Modifiers};
use review::{Action, ItemId, ItemKind, ReviewCore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::api::ReviewApi;
use crate::api::types::Job;
use crate::error::ApiError;
use crate::notify::NotificationKind;
use crate::poll::{NO_JOB_MESSAGE, PollEvent};
use crate::workspace::ReviewWorkspace;

const PROMPT: &str = "review> ";

const STAT_KEYS: &[&str] = &["cv", "nor", "slant", "avg_height_mm", "avg_spacing_mm"];

const HELP: &str = "\
commands:
  show                      workspace summary
  edit [on|off]             toggle or set edit mode
  overlay                   show or hide overlays
  width <px>                natural width of the displayed image
  click <x> <y>             click at display coordinates
  delete <id> <palo|mark>   delete an item
  undo | ctrl-z             restore the last deleted item
  override on|off           enter or cancel override mode
  override set <n> <count>  set interval n (1-5)
  override save             send the override counts
  calibrate                 arm the ruler (next two clicks)
  escape                    cancel calibration
  reload                    fetch the case again
  reprocess [confirm]       rerun detection (discards manual edits)
  approve                   approve the case for the dataset
  status                    latest processing job
  quit
";

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Show,
    Edit(Option<bool>),
    Overlay,
    Width(f64),
    Click(Point),
    Delete { id: ItemId, kind: ItemKind },
    Undo,
    CtrlZ,
    OverrideOn,
    OverrideOff,
    OverrideSet { index: usize, raw: String },
    OverrideSave,
    Calibrate,
    Escape,
    Reload,
    Reprocess { confirmed: bool },
    Approve,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellParseError {
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellParseError`] for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellParseError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Ok(None);
        };
        let command = match (head.to_ascii_lowercase().as_str(), args) {
            ("show", []) => Self::Show,
            ("edit", []) => Self::Edit(None),
            ("edit", [flag]) => Self::Edit(Some(parse_switch(flag).ok_or(ShellParseError::Usage("edit [on|off]"))?)),
            ("overlay", []) => Self::Overlay,
            ("width", [px]) => Self::Width(number(px, "width <px>")?),
            ("click", [x, y]) => Self::Click(Point::new(number(x, "click <x> <y>")?, number(y, "click <x> <y>")?)),
            ("delete", [id, kind]) => Self::Delete {
                id: ItemId::parse(id),
                kind: ItemKind::from_str(kind).map_err(|_| ShellParseError::Usage("delete <id> <palo|mark>"))?,
            },
            ("undo", []) => Self::Undo,
            ("ctrl-z" | "cmd-z", []) => Self::CtrlZ,
            ("override", ["on"]) => Self::OverrideOn,
            ("override", ["off"]) => Self::OverrideOff,
            ("override", ["save"]) => Self::OverrideSave,
            ("override", ["set", n, raw]) => Self::OverrideSet { index: interval_index(n)?, raw: (*raw).to_owned() },
            ("calibrate", []) => Self::Calibrate,
            ("escape" | "esc", []) => Self::Escape,
            ("reload", []) => Self::Reload,
            ("reprocess", []) => Self::Reprocess { confirmed: false },
            ("reprocess", ["confirm"]) => Self::Reprocess { confirmed: true },
            ("approve", []) => Self::Approve,
            ("status", []) => Self::Status,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("override", _) => return Err(ShellParseError::Usage("override on|off|save|set <n> <count>")),
            ("delete", _) => return Err(ShellParseError::Usage("delete <id> <palo|mark>")),
            ("click", _) => return Err(ShellParseError::Usage("click <x> <y>")),
            _ => return Err(ShellParseError::Unknown(line.trim().to_owned())),
        };
        Ok(Some(command))
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn number(raw: &str, usage: &'static str) -> Result<f64, ShellParseError> {
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(ShellParseError::Usage(usage))
}

/// Intervals are numbered 1..=5 at the prompt.
fn interval_index(raw: &str) -> Result<usize, ShellParseError> {
    match raw.parse::<usize>() {
        Ok(n) if (1..=INTERVAL_COUNT).contains(&n) => Ok(n - 1),
        _ => Err(ShellParseError::Usage("override set <n> <count>, n in 1-5")),
    }
}

// =============================================================================
// SESSION LOOP
// =============================================================================

#[derive(Debug, thiserror::Error)]
enum ShellError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Drive `workspace` from `input` until `quit` or end of input.
///
/// # Errors
///
/// Returns an I/O error when reading input or writing output fails.
pub async fn run<A, R, W>(workspace: &mut ReviewWorkspace<A>, input: R, mut out: W) -> std::io::Result<()>
where
    A: ReviewApi + ?Sized + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    out.write_all(render_summary(workspace.core()).as_bytes()).await?;
    out.write_all(PROMPT.as_bytes()).await?;
    out.flush().await?;

    while let Some(line) = lines.next_line().await? {
        match ShellCommand::parse(&line) {
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => match execute(workspace, command, &mut out).await {
                Ok(()) => {}
                Err(ShellError::Api(e)) => {
                    workspace.take_notification();
                    out.write_all(format!("error: {}\n", e.user_message()).as_bytes()).await?;
                }
                Err(ShellError::Io(e)) => return Err(e),
            },
            Ok(None) => {}
            Err(e) => out.write_all(format!("{e}\n").as_bytes()).await?,
        }
        if let Some(notification) = workspace.take_notification() {
            let tag = match notification.kind {
                NotificationKind::Success => "ok",
                NotificationKind::Error => "error",
            };
            out.write_all(format!("[{tag}] {}\n", notification.message).as_bytes()).await?;
        }
        out.write_all(PROMPT.as_bytes()).await?;
        out.flush().await?;
    }
    out.flush().await?;
    Ok(())
}

async fn execute<A, W>(ws: &mut ReviewWorkspace<A>, command: ShellCommand, out: &mut W) -> Result<(), ShellError>
where
    A: ReviewApi + ?Sized + 'static,
    W: AsyncWrite + Unpin,
{
    let reply = match command {
        ShellCommand::Show => render_summary(ws.core()),
        ShellCommand::Edit(flag) => {
            let on = match flag {
                Some(on) => {
                    ws.core_mut().set_edit_mode(on);
                    on
                }
                None => ws.core_mut().toggle_edit_mode(),
            };
            format!("edit mode {}\n", on_off(on))
        }
        ShellCommand::Overlay => {
            let shown = ws.core_mut().toggle_overlay();
            format!("overlays {}\n", if shown { "shown" } else { "hidden" })
        }
        ShellCommand::Width(px) => {
            ws.core_mut().set_natural_width(px);
            format!("display scale {:.4}\n", ws.core().display_scale())
        }
        ShellCommand::Click(pt) => describe_action(&ws.click(pt).await?),
        ShellCommand::Delete { id, kind } => {
            if ws.delete(&id, kind).await? {
                String::new()
            } else {
                format!("no {} with id {id}\n", kind.as_str())
            }
        }
        ShellCommand::Undo => {
            if ws.undo().await? { String::new() } else { "nothing to undo\n".to_owned() }
        }
        ShellCommand::CtrlZ => {
            let mods = Modifiers { ctrl: true, ..Modifiers::default() };
            let depth = ws.core().undo_depth();
            ws.key(&Key::new("z"), mods).await?;
            if depth == 0 { "nothing to undo\n".to_owned() } else { String::new() }
        }
        ShellCommand::OverrideOn => {
            ws.core_mut().begin_override();
            format!("override mode on: {:?}\n", ws.core().override_counts())
        }
        ShellCommand::OverrideOff => {
            ws.core_mut().cancel_override();
            format!("override cancelled: {:?}\n", ws.core().override_counts())
        }
        ShellCommand::OverrideSet { index, raw } => {
            ws.set_override(index, &raw)?;
            format!("{:?}\n", ws.core().override_counts())
        }
        ShellCommand::OverrideSave => {
            ws.save_overrides().await?;
            String::new()
        }
        ShellCommand::Calibrate => {
            ws.core_mut().arm_calibration();
            "calibration armed: click both ends of the 100 mm reference\n".to_owned()
        }
        ShellCommand::Escape => describe_action(&ws.key(&Key::new("Escape"), Modifiers::default()).await?),
        ShellCommand::Reload => {
            ws.load().await.into_result()?;
            render_summary(ws.core())
        }
        ShellCommand::Reprocess { confirmed: false } => {
            "reprocessing discards all manual edits; run `reprocess confirm` to continue\n".to_owned()
        }
        ShellCommand::Reprocess { confirmed: true } => {
            if let Some(mut poller) = ws.reprocess(true).await? {
                while let Some(event) = poller.next().await {
                    out.write_all(describe_event(&event).as_bytes()).await?;
                    out.flush().await?;
                    if event.is_final() {
                        break;
                    }
                }
                let report = ws.load().await;
                if !report.is_complete() {
                    tracing::warn!(case_id = ws.case_id(), "reload after reprocess incomplete");
                }
            }
            String::new()
        }
        ShellCommand::Approve => {
            ws.approve_dataset().await?;
            String::new()
        }
        ShellCommand::Status => {
            let mut poller = ws.watch_job();
            match poller.next().await {
                Some(event) => describe_event(&event),
                None => describe_event(&poller.latest()),
            }
        }
        ShellCommand::Help => HELP.to_owned(),
        ShellCommand::Quit => String::new(),
    };
    out.write_all(reply.as_bytes()).await?;
    Ok(())
}

// =============================================================================
// RENDERING
// =============================================================================

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

/// Multi-line description of the workspace state.
#[must_use]
pub fn render_summary(core: &ReviewCore) -> String {
    let mut out = format!("case {}\n", core.case_id());
    out.push_str(&format!("image: {}\n", core.image_url().unwrap_or("(not loaded)")));
    if core.items().is_empty() {
        out.push_str("palos: 0  marks: 0 (no detections)\n");
    } else {
        out.push_str(&format!(
            "palos: {}  marks: {}\n",
            core.items().len(ItemKind::Palo),
            core.items().len(ItemKind::Mark)
        ));
    }
    let backend_scale = core
        .backend_mm_per_px()
        .map_or_else(|| "N/A".to_owned(), |s| format!("{s:.4} mm/px"));
    out.push_str(&format!("scale: {backend_scale}"));
    if let Some(manual) = core.manual_mm_per_px() {
        out.push_str(&format!("  manual: {manual:.4} mm/px"));
    }
    out.push('\n');

    if let Some(metrics) = core.metrics() {
        out.push_str(&format!(
            "metrics: total {}  confidence {}  intervals {:?}\n",
            metrics.total_count,
            if metrics.confidence_level.is_empty() { "N/A" } else { metrics.confidence_level.as_str() },
            metrics.interval_counts()
        ));
        let stats: Vec<String> = STAT_KEYS
            .iter()
            .map(|key| match metrics.stat(key) {
                Some(value) => format!("{key}={value:.2}"),
                None => format!("{key}={}", metrics.stat_display(key)),
            })
            .collect();
        out.push_str(&format!("stats: {}\n", stats.join("  ")));
        if !metrics.confidence_level.is_empty() && !metrics.is_high_confidence() {
            out.push_str("note: detection confidence is not high; check the overlays\n");
        }
        if metrics.is_manual_override() {
            out.push_str("note: interval counts were set manually\n");
        }
        if metrics.tremor_suggested() {
            out.push_str("note: possible tremor\n");
        }
    } else {
        out.push_str("metrics: (not loaded)\n");
    }

    out.push_str(&format!(
        "edit {}  overlays {}  calibrating {}  undo {}\n",
        on_off(core.is_editing()),
        if core.overlay_visible() { "shown" } else { "hidden" },
        on_off(core.is_calibrating()),
        core.undo_depth()
    ));
    if core.is_overriding() {
        let unsaved = if core.overrides_dirty() { " (unsaved)" } else { "" };
        out.push_str(&format!("override: {:?}{unsaved}\n", core.override_counts()));
    }
    out
}

fn describe_action(action: &Action) -> String {
    match action {
        Action::None => "no effect\n".to_owned(),
        Action::DeleteRequested { id, kind } => format!("clicked {} {id}\n", kind.as_str()),
        Action::UndoRequested | Action::Calibrated { .. } | Action::CalibrationRejected => String::new(),
        Action::CalibrationPoint(p) => format!("first point at ({}, {}); click the second\n", p.x, p.y),
        Action::CalibrationCancelled => "calibration cancelled\n".to_owned(),
    }
}

/// One-line description of a job.
#[must_use]
pub fn describe_job(job: &Job) -> String {
    let mut line = format!("job {}: {} {}%", job.id, job.status, job.progress);
    if let Some(step) = &job.current_step {
        line.push_str(&format!(" ({step})"));
    }
    if let Some(err) = &job.error_message {
        line.push_str(&format!(" error: {err}"));
    }
    line
}

/// One-line description of a poll observation, newline-terminated.
#[must_use]
pub fn describe_event(event: &PollEvent) -> String {
    match event {
        PollEvent::Waiting => "waiting for job status\n".to_owned(),
        PollEvent::Running(job) | PollEvent::Finished(job) => format!("{}\n", describe_job(job)),
        PollEvent::NoJob => format!("{NO_JOB_MESSAGE}\n"),
        PollEvent::Stopped(message) => format!("polling stopped: {message}\n"),
    }
}

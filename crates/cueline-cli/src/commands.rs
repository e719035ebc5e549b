//! Command handlers
//!
//! Each handler reads its inputs from disk, drives the engine, and writes
//! the result. Handlers that produce text return it so tests can check it
//! without capturing stdout.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use tracing::{info, warn};

use cueline_lib::core::captions::{parse_srt, Cue};
use cueline_lib::core::saved::SavedCues;
use cueline_lib::core::settings::{default_settings_dir, EngineSettings, SettingsManager};
use cueline_lib::core::storage::JsonFileStore;
use cueline_lib::core::timeline::TimelineModel;
use cueline_lib::core::TimeSec;

use crate::error::CliError;
use crate::output::{self, BoundaryReport, CheckReport, SavedReport};
use crate::Command;

/// Settings and output mode shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: EngineSettings,
    pub json: bool,
}

impl Context {
    /// Loads settings from `settings_dir` (or the platform default)
    pub fn new(settings_dir: Option<&Path>, json: bool) -> Self {
        let dir = settings_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(default_settings_dir);
        let settings = SettingsManager::new(&dir).load();
        Self { settings, json }
    }

    /// Uses the given settings as-is
    pub fn with_settings(settings: EngineSettings, json: bool) -> Self {
        Self { settings, json }
    }

    fn saved_cues(&self) -> SavedCues {
        SavedCues::new(Arc::new(JsonFileStore::new(self.settings.storage_dir())))
    }
}

/// Dispatches a parsed command
pub fn run(ctx: &Context, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Check { file } => {
            let report = check(&file)?;
            if ctx.json {
                output::print_json(&report)
            } else {
                println!("{}", output::check_text(&report));
                Ok(())
            }
        }
        Command::Shift {
            file,
            offset,
            output,
        } => {
            let shifted = shift(ctx, &file, offset)?;
            emit(&shifted, output.as_deref())
        }
        Command::Active { file, at } => {
            let cues = active(&file, at)?;
            if ctx.json {
                output::print_json(&cues)
            } else {
                for cue in &cues {
                    println!("{}", output::cue_line(cue));
                }
                Ok(())
            }
        }
        Command::Next { file, at } => print_boundary(ctx, boundary(&file, at, Direction::Next)?),
        Command::Prev { file, at } => print_boundary(ctx, boundary(&file, at, Direction::Prev)?),
        Command::Save { file, ids, key } => {
            let report = save(ctx, &file, &ids, key)?;
            print_saved(ctx, &report)
        }
        Command::Unsave { key, ids } => {
            let report = unsave(ctx, &key, &ids)?;
            print_saved(ctx, &report)
        }
        Command::ExportSaved {
            key,
            output,
            stdout,
        } => {
            let srt = export_saved(ctx, &key)?;
            if stdout {
                emit(&srt, None)
            } else {
                let path = output
                    .unwrap_or_else(|| PathBuf::from(&ctx.settings.export.default_filename));
                emit(&srt, Some(&path))
            }
        }
    }
}

// =============================================================================
// Input / Output
// =============================================================================

/// Reads and parses an SRT file
pub fn read_cues(path: &Path) -> anyhow::Result<Vec<Cue>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cues = parse_srt(&content).map_err(|e| CliError::UnreadableSubtitleFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!("Read {} cue(s) from {}", cues.len(), path.display());
    Ok(cues)
}

fn load_timeline(path: &Path) -> anyhow::Result<TimelineModel> {
    Ok(TimelineModel::from_cues(read_cues(path)?))
}

fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn validate_time(at: TimeSec) -> Result<TimeSec, CliError> {
    if at.is_finite() {
        Ok(at)
    } else {
        Err(CliError::InvalidTime(at))
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub fn check(file: &Path) -> anyhow::Result<CheckReport> {
    let model = load_timeline(file)?;
    Ok(CheckReport {
        cue_count: model.len(),
        first_start: model.cues().first().map(|c| c.start_time),
        last_end: model
            .cues()
            .iter()
            .map(|c| c.end_time)
            .max_by(|a, b| a.total_cmp(b)),
    })
}

pub fn shift(ctx: &Context, file: &Path, offset: TimeSec) -> anyhow::Result<String> {
    if !ctx.settings.is_offset_allowed(offset) {
        return Err(CliError::OffsetOutOfRange {
            offset,
            max: ctx.settings.retime.max_offset_seconds,
        }
        .into());
    }

    let mut model = load_timeline(file)?;
    model.retime(offset, 0.0);
    if model.cues().iter().any(|c| c.start_time < 0.0) {
        warn!("Offset {}s moves some cues before zero; they are written as 0", offset);
    }
    Ok(model.export_all())
}

pub fn active(file: &Path, at: TimeSec) -> anyhow::Result<Vec<Cue>> {
    let at = validate_time(at)?;
    let mut model = load_timeline(file)?;
    model.update_active(at);
    Ok(model.active_cues().into_iter().cloned().collect())
}

#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Next,
    Prev,
}

pub fn boundary(file: &Path, at: TimeSec, direction: Direction) -> anyhow::Result<BoundaryReport> {
    let at = validate_time(at)?;
    let mut model = load_timeline(file)?;
    model.update_active(at);

    let boundary = match direction {
        Direction::Next => model.next_sub_time(at),
        Direction::Prev => model.prev_sub_time(at),
    };
    Ok(BoundaryReport { at, boundary })
}

fn print_boundary(ctx: &Context, report: BoundaryReport) -> anyhow::Result<()> {
    if ctx.json {
        output::print_json(&report)
    } else {
        println!("{}", output::boundary_text(&report));
        Ok(())
    }
}

fn store_key_for(file: &Path, key: Option<String>) -> Result<String, CliError> {
    match key {
        Some(key) => Ok(key),
        None => file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::MissingStoreKey(file.to_path_buf())),
    }
}

pub fn save(
    ctx: &Context,
    file: &Path,
    ids: &[String],
    key: Option<String>,
) -> anyhow::Result<SavedReport> {
    let key = store_key_for(file, key)?;
    let mut model = load_timeline(file)?;
    let mut saved = ctx.saved_cues();
    saved.retrieve(&key)?;

    // Previously saved cues flow back into the timeline first.
    model.save_batch(saved.items());

    let mut unknown_ids = Vec::new();
    for id in ids {
        let Some(cue) = model.get(id).cloned() else {
            unknown_ids.push(id.clone());
            continue;
        };
        model.save(&cue);
        saved.save(&cue)?;
    }

    Ok(SavedReport {
        key,
        saved_count: saved.len(),
        unknown_ids,
    })
}

pub fn unsave(ctx: &Context, key: &str, ids: &[String]) -> anyhow::Result<SavedReport> {
    let mut saved = ctx.saved_cues();
    saved.retrieve(key)?;

    let mut unknown_ids = Vec::new();
    for id in ids {
        let Some(cue) = saved.items().iter().find(|c| &c.id == id).cloned() else {
            unknown_ids.push(id.clone());
            continue;
        };
        saved.delete(&cue)?;
    }

    Ok(SavedReport {
        key: key.to_string(),
        saved_count: saved.len(),
        unknown_ids,
    })
}

pub fn export_saved(ctx: &Context, key: &str) -> anyhow::Result<String> {
    let mut saved = ctx.saved_cues();
    saved.retrieve(key)?;
    Ok(saved.export_srt())
}

fn print_saved(ctx: &Context, report: &SavedReport) -> anyhow::Result<()> {
    if ctx.json {
        output::print_json(report)
    } else {
        println!("{}", output::saved_text(report));
        Ok(())
    }
}

use std::{fs, path::Path};

use anyhow::{Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Serializer;

use crate::{
    canvas::CanvasManager,
    project::Project,
    state::{EditorState, GlobalConfig},
};

fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &data_bytes)?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes = std::fs::read(path)?;
    let data: T = serde_json::from_slice(&data_bytes)?;
    Ok(data)
}

/// Reads the global config, or the defaults if none has been saved yet.
pub fn load_global_config(path: &Path) -> Result<GlobalConfig> {
    if !path.exists() {
        info!("No global config at {}", path.display());
        return Ok(GlobalConfig::default());
    }
    load_json(path).with_context(|| format!("Unable to load {}", path.display()))
}

pub fn save_global_config(state: &mut EditorState) -> Result<()> {
    state.sync_global_config();
    if state.global_config.modified {
        let path = state
            .global_config_path
            .as_ref()
            .context("Global config path not set.")?;
        save_json(path, &state.global_config)?;
        state.global_config.modified = false;
    }
    Ok(())
}

pub fn load_project(path: &Path) -> Result<Project> {
    let mut project: Project =
        load_json(path).with_context(|| format!("Unable to load project {}", path.display()))?;
    project.fill_missing_defaults();
    Ok(project)
}

pub fn save_project(path: &Path, project: &Project) -> Result<()> {
    save_json(path, project).with_context(|| format!("Unable to save project {}", path.display()))
}

/// Saves the open project if it has unsaved changes and a location.
pub fn save_modified_project(state: &mut EditorState) -> Result<()> {
    if !state.modified {
        return Ok(());
    }
    let Some(path) = &state.project_path else {
        return Ok(());
    };
    save_project(path, &state.project)?;
    state.modified = false;
    Ok(())
}

/// Writes the tile set as a PNG at scale 1, coloured with palette
/// `palette_idx`.
pub fn export_png(project: &Project, palette_idx: usize, path: &Path) -> Result<()> {
    let palette = project
        .palette_list
        .get_palette(palette_idx)
        .context("Unable to select export palette")?;
    let canvas = CanvasManager::new(Some(project.tile_set.clone()), Some(palette.clone()));
    let png = canvas.to_png()?;
    info!("Exporting {}", path.display());
    fs::write(path, png).with_context(|| format!("Unable to write {}", path.display()))?;
    Ok(())
}

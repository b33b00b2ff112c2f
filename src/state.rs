use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    canvas::{CanvasManager, Surface},
    common::{ColourIdx, PixelCoord, TileIdx, DEFAULT_SCALE, MAX_SCALE, MIN_SCALE},
    message::Tool,
    palette::Palette,
    persist,
    project::Project,
    undo::UndoManager,
};

/// Editor preferences kept between sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(skip_serializing, skip_deserializing)]
    pub modified: bool,
    pub project_path: Option<PathBuf>,
    pub palette_index: usize,
    pub scale: u32,
    pub display_native: bool,
    pub show_tile_grid: bool,
    pub show_pixel_grid: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            modified: false,
            project_path: None,
            palette_index: 0,
            scale: DEFAULT_SCALE,
            display_native: false,
            show_tile_grid: false,
            show_pixel_grid: false,
        }
    }
}

pub struct EditorState {
    pub global_config_path: Option<PathBuf>,
    pub global_config: GlobalConfig,

    // Project data:
    pub project: Project,
    pub project_path: Option<PathBuf>,
    pub modified: bool,
    pub undo: UndoManager,

    // Temporary editor state:
    pub canvas: CanvasManager,
    pub tool: Tool,
    pub colour_idx: ColourIdx,
    pub palette_idx: usize,
    pub display_native: bool,
    pub pointer: Option<(PixelCoord, PixelCoord)>,
    pub pointer_down: bool,
    pub last_painted: Option<(PixelCoord, PixelCoord)>,
    pub stroke_active: bool,
}

impl EditorState {
    pub fn new(project: Project) -> Self {
        let mut state = EditorState {
            global_config_path: None,
            global_config: GlobalConfig::default(),
            project,
            project_path: None,
            modified: false,
            undo: UndoManager::default(),
            canvas: CanvasManager::default(),
            tool: Tool::Pencil,
            colour_idx: 0,
            palette_idx: 0,
            display_native: false,
            pointer: None,
            pointer_down: false,
            last_painted: None,
            stroke_active: false,
        };
        state.refresh_canvas();
        state
    }

    /// The palette selected for drawing.
    pub fn palette(&self) -> Option<&Palette> {
        self.project.palette_list.get_palette(self.palette_idx).ok()
    }

    /// Pushes the selected palette to the canvas, as native colours when
    /// that display mode is on.
    pub fn refresh_canvas_palette(&mut self) {
        if self.palette_idx >= self.project.palette_list.len() {
            self.palette_idx = 0;
        }
        let palette = match self.palette() {
            Some(p) if self.display_native => p.native_preview(),
            Some(p) => p.clone(),
            None => return,
        };
        self.canvas.set_palette(palette);
    }

    pub fn refresh_canvas_tile_set(&mut self) {
        self.canvas.set_tile_set(self.project.tile_set.clone());
    }

    pub fn refresh_canvas(&mut self) {
        self.refresh_canvas_tile_set();
        self.refresh_canvas_palette();
    }

    /// Copies changed tiles to the canvas so only they are redrawn.
    pub fn refresh_canvas_tiles(&mut self, tiles: &[TileIdx]) -> Result<()> {
        for &idx in tiles {
            let tile = *self.project.tile_set.get_tile(idx)?;
            self.canvas.update_tile(idx, tile)?;
        }
        Ok(())
    }

    /// Replaces the whole project, e.g. after undo or loading.
    pub fn replace_project(&mut self, project: Project) {
        self.project = project;
        self.refresh_canvas();
    }

    /// Composites the current frame onto `surface`.
    pub fn draw(&mut self, surface: &mut impl Surface) -> Result<()> {
        self.canvas.draw(surface, self.pointer)?;
        Ok(())
    }

    /// Adopts saved preferences, falling back to defaults for values the
    /// current project cannot honour.
    pub fn apply_global_config(&mut self, mut config: GlobalConfig) {
        if config.palette_index >= self.project.palette_list.len() {
            warn!("Invalid palette index {} in config", config.palette_index);
            config.palette_index = 0;
        }
        if !(MIN_SCALE..=MAX_SCALE).contains(&config.scale) {
            warn!("Invalid scale {} in config", config.scale);
            config.scale = DEFAULT_SCALE;
        }
        self.palette_idx = config.palette_index;
        self.display_native = config.display_native;
        self.canvas.set_show_tile_grid(config.show_tile_grid);
        self.canvas.set_show_pixel_grid(config.show_pixel_grid);
        // The scale was validated above.
        let _ = self.canvas.set_scale(config.scale);
        self.global_config = config;
        self.refresh_canvas_palette();
    }

    /// Mirrors the current preferences into the global config, flagging it
    /// for saving when anything changed.
    pub fn sync_global_config(&mut self) {
        let config = GlobalConfig {
            modified: self.global_config.modified,
            project_path: self.project_path.clone(),
            palette_index: self.palette_idx,
            scale: self.canvas.scale(),
            display_native: self.display_native,
            show_tile_grid: self.canvas.show_tile_grid(),
            show_pixel_grid: self.canvas.show_pixel_grid(),
        };
        if config != self.global_config {
            self.global_config = config;
            self.global_config.modified = true;
        }
    }
}

pub fn get_global_config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "SmsGfxEditor")
        .context("Unable to open global config directory.")?;
    let config_dir = project_dirs.config_dir();
    let config_path = config_dir.join("config.json");
    Ok(config_path)
}

/// Builds the start-up state: the saved preferences, then `project_path`
/// or the last opened project, or a new project.
pub fn get_initial_state(project_path: Option<&Path>) -> Result<EditorState> {
    let config_path = get_global_config_path()?;
    let config = persist::load_global_config(&config_path)?;

    let path = project_path
        .map(Path::to_path_buf)
        .or_else(|| config.project_path.clone());
    let (project, path) = match path {
        Some(p) if p.exists() => (persist::load_project(&p)?, Some(p)),
        Some(p) => {
            info!("Starting new project at {}", p.display());
            (Project::default(), Some(p))
        }
        None => (Project::default(), None),
    };

    let mut state = EditorState::new(project);
    state.global_config_path = Some(config_path);
    state.project_path = path;
    state.apply_global_config(config);
    Ok(state)
}

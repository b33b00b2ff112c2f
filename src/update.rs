use anyhow::{Context, Result};
use hashbrown::HashSet;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    canvas::brush_footprint,
    common::{PixelCoord, TileIdx},
    error::check_colour_index,
    fill::flood_fill,
    message::{Message, Tool},
    palette::Palette,
    project::BLANK_TILE_COLOUR,
    state::EditorState,
    tile::Tile,
    undo::{get_undo_action, UndoAction},
};

fn blank_tile() -> Tile {
    Tile::filled(BLANK_TILE_COLOUR)
}

/// Applies the brush at `(x, y)` with the current colour and redraws the
/// tiles it touched.
fn paint(state: &mut EditorState, x: PixelCoord, y: PixelCoord) -> Result<()> {
    if state.last_painted == Some((x, y)) {
        return Ok(());
    }
    state.last_painted = Some((x, y));
    let colour = state.colour_idx;
    let tile_set = &mut state.project.tile_set;
    let mut touched: HashSet<TileIdx> = HashSet::new();
    for (px, py) in brush_footprint(x, y, state.canvas.cursor_size()) {
        if tile_set.set_pixel_at(px, py, colour)? {
            if let Some(idx) = tile_set.get_tile_index_by_coordinate(px, py) {
                touched.insert(idx);
            }
        }
    }
    let touched: Vec<TileIdx> = touched.into_iter().sorted().collect();
    state.refresh_canvas_tiles(&touched)
}

fn fill(state: &mut EditorState, x: PixelCoord, y: PixelCoord) -> Result<()> {
    let touched = flood_fill(&mut state.project.tile_set, x, y, state.colour_idx)?;
    debug!("Filled from ({}, {}) over {} tiles", x, y, touched.len());
    state.refresh_canvas_tiles(&touched)
}

fn end_stroke(state: &mut EditorState) {
    state.pointer_down = false;
    state.stroke_active = false;
    state.last_painted = None;
}

/// Structural tile set changes redraw everything and move the selection to
/// `selected`.
fn tiles_changed(state: &mut EditorState, selected: Option<TileIdx>) {
    state.refresh_canvas_tile_set();
    state.canvas.set_selected_tile(selected);
}

fn palette_changed(state: &mut EditorState, palette_idx: usize) {
    if palette_idx == state.palette_idx {
        state.refresh_canvas_palette();
    }
}

pub fn update(state: &mut EditorState, message: Message) -> Result<()> {
    let action = get_undo_action(state, &message);
    let before = match action {
        UndoAction::None => None,
        UndoAction::Snapshot => Some(state.project.clone()),
        UndoAction::Stroke => (!state.stroke_active).then(|| state.project.clone()),
    };
    // A command that fails records nothing.
    apply(state, message)?;
    if let Some(before) = before {
        state.undo.add_undo_state(&before)?;
    }
    match action {
        UndoAction::None => {}
        UndoAction::Snapshot => state.modified = true,
        UndoAction::Stroke => {
            state.stroke_active = true;
            state.modified = true;
        }
    }
    Ok(())
}

fn apply(state: &mut EditorState, message: Message) -> Result<()> {
    match message {
        Message::Nothing => {}
        Message::PointerDown { x, y } => {
            state.pointer = Some((x, y));
            state.pointer_down = true;
            state.last_painted = None;
            match state.tool {
                Tool::Pencil => paint(state, x, y)?,
                Tool::Bucket => fill(state, x, y)?,
            }
        }
        Message::PointerMove { x, y } => {
            state.pointer = Some((x, y));
            if state.pointer_down && state.tool == Tool::Pencil {
                paint(state, x, y)?;
            }
        }
        Message::PointerUp => end_stroke(state),
        Message::PointerLeft => {
            state.pointer = None;
            end_stroke(state);
        }
        Message::SelectTool(tool) => {
            state.tool = tool;
        }
        Message::SelectColour(colour_idx) => {
            state.colour_idx = check_colour_index(colour_idx)?;
        }
        Message::SetBrushSize(size) => {
            state.canvas.set_cursor_size(size)?;
        }
        Message::SetScale(scale) => {
            state.canvas.set_scale(scale)?;
        }
        Message::SetTileWidth(width) => {
            state.project.tile_set.set_tile_width(width);
            let selected = state.canvas.selected_tile();
            tiles_changed(state, selected);
        }
        Message::SetTileGrid(show) => state.canvas.set_show_tile_grid(show),
        Message::SetPixelGrid(show) => state.canvas.set_show_pixel_grid(show),
        Message::SetTransparencyIndex(index) => {
            state.canvas.set_transparency_index(index)?;
        }
        Message::SetDisplayNative(display_native) => {
            state.display_native = display_native;
            state.refresh_canvas_palette();
        }
        Message::SelectTile(idx) => state.canvas.set_selected_tile(idx),
        Message::AddTile => {
            state.project.tile_set.add_tile(blank_tile());
            let last = state.project.tile_set.len() - 1;
            tiles_changed(state, Some(last));
        }
        Message::InsertTileBefore(idx) => {
            state.project.tile_set.insert_tile_at(blank_tile(), idx)?;
            tiles_changed(state, Some(idx));
        }
        Message::InsertTileAfter(idx) => {
            state.project.tile_set.get_tile(idx)?;
            state
                .project
                .tile_set
                .insert_tile_at(blank_tile(), idx + 1)?;
            tiles_changed(state, Some(idx + 1));
        }
        Message::RemoveTile(idx) => {
            state.project.tile_set.remove_tile(idx)?;
            let len = state.project.tile_set.len();
            let selected = state
                .canvas
                .selected_tile()
                .filter(|&s| s != idx)
                .map(|s| if s > idx { s - 1 } else { s })
                .filter(|&s| s < len);
            tiles_changed(state, selected);
        }
        Message::CloneTile(idx) => {
            state.project.tile_set.clone_tile(idx)?;
            tiles_changed(state, Some(idx + 1));
        }
        Message::MoveTileLeft(idx) => {
            if idx == 0 {
                warn!("Tile 0 cannot move further left.");
                return Ok(());
            }
            state.project.tile_set.move_tile(idx, idx - 1)?;
            tiles_changed(state, Some(idx - 1));
        }
        Message::MoveTileRight(idx) => {
            state.project.tile_set.get_tile(idx)?;
            if idx + 1 >= state.project.tile_set.len() {
                warn!("Tile {} cannot move further right.", idx);
                return Ok(());
            }
            state.project.tile_set.move_tile(idx, idx + 1)?;
            tiles_changed(state, Some(idx + 1));
        }
        Message::MirrorTileHorizontal(idx) => {
            state.project.tile_set.mirror_tile_horizontal(idx)?;
            state.refresh_canvas_tiles(&[idx])?;
        }
        Message::MirrorTileVertical(idx) => {
            state.project.tile_set.mirror_tile_vertical(idx)?;
            state.refresh_canvas_tiles(&[idx])?;
        }
        Message::ReplaceColourIndex { source, target } => {
            state.project.tile_set.replace_colour_index(source, target)?;
            let selected = state.canvas.selected_tile();
            tiles_changed(state, selected);
        }
        Message::SwapColourIndex { first, second } => {
            state.project.tile_set.swap_colour_index(first, second)?;
            let selected = state.canvas.selected_tile();
            tiles_changed(state, selected);
        }
        Message::SelectPalette(palette_idx) => {
            state.project.palette_list.get_palette(palette_idx)?;
            state.palette_idx = palette_idx;
            state.refresh_canvas_palette();
        }
        Message::NewPalette => {
            let system = state.palette().map(|p| p.system).unwrap_or_default();
            let palette = Palette::standard("New palette", system);
            state.project.palette_list.add_palette(palette);
            state.palette_idx = state.project.palette_list.len() - 1;
            state.refresh_canvas_palette();
        }
        Message::DeletePalette(palette_idx) => {
            if state.project.palette_list.len() <= 1 {
                warn!("Not allowed to delete the last palette.");
                return Ok(());
            }
            let removed = state.project.palette_list.remove_at(palette_idx)?;
            info!("Deleted palette {}", removed.title);
            if state.palette_idx > palette_idx
                || state.palette_idx >= state.project.palette_list.len()
            {
                state.palette_idx -= 1;
            }
            state.refresh_canvas_palette();
        }
        Message::SetPaletteTitle { palette_idx, title } => {
            state.project.palette_list.get_palette_mut(palette_idx)?.title = title;
        }
        Message::SetPaletteSystem {
            palette_idx,
            system,
        } => {
            state.project.palette_list.get_palette_mut(palette_idx)?.system = system;
            palette_changed(state, palette_idx);
        }
        Message::SetPaletteColour {
            palette_idx,
            colour_idx,
            colour,
        } => {
            state
                .project
                .palette_list
                .get_palette_mut(palette_idx)?
                .set_colour(colour_idx, colour)?;
            palette_changed(state, palette_idx);
        }
        Message::SetProjectTitle(title) => {
            state.project.title = title;
        }
        Message::AddReferenceImage(reference) => state.canvas.add_reference_image(reference),
        Message::ClearReferenceImages => state.canvas.clear_reference_images(),
        Message::Undo => {
            if state.undo.can_undo() {
                let project = state
                    .undo
                    .undo(&state.project)
                    .context("Unable to restore undo state")?;
                state.replace_project(project);
                state.modified = true;
            }
        }
        Message::Redo => {
            if state.undo.can_redo() {
                let project = state
                    .undo
                    .redo(&state.project)
                    .context("Unable to restore redo state")?;
                state.replace_project(project);
                state.modified = true;
            }
        }
        Message::ProjectLoaded(project) => {
            let mut project = *project;
            project.fill_missing_defaults();
            info!("Loaded project \"{}\"", project.title);
            state.replace_project(project);
            state.canvas.set_selected_tile(None);
        }
    }
    Ok(())
}

use std::collections::VecDeque;

use log::debug;

use crate::{
    canvas::brush_footprint,
    common::{ColourIdx, PixelCoord},
    error::{check_colour_index, Result},
    message::{Message, Tool},
    project::Project,
    state::EditorState,
};

pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Bounded undo/redo history of serialized project snapshots.
pub struct UndoManager {
    max_depth: usize,
    past: VecDeque<Vec<u8>>,
    future: Vec<Vec<u8>>,
}

impl Default for UndoManager {
    fn default() -> Self {
        UndoManager::new(DEFAULT_MAX_DEPTH)
    }
}

fn snapshot(project: &Project) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(project)?)
}

fn restore(data: &[u8]) -> Result<Project> {
    Ok(serde_json::from_slice(data)?)
}

impl UndoManager {
    pub fn new(max_depth: usize) -> Self {
        UndoManager {
            max_depth,
            past: VecDeque::new(),
            future: vec![],
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn push_past(&mut self, data: Vec<u8>) {
        self.past.push_back(data);
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }

    /// Records `current` as the state to return to, discarding any redo
    /// branch.
    pub fn add_undo_state(&mut self, current: &Project) -> Result<()> {
        let data = snapshot(current)?;
        self.push_past(data);
        self.future.clear();
        debug!("Undo history: {} past, 0 future", self.past.len());
        Ok(())
    }

    /// Returns the previous project, or a copy of `current` when there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &Project) -> Result<Project> {
        let Some(data) = self.past.back() else {
            return Ok(current.clone());
        };
        let previous = restore(data)?;
        self.future.push(snapshot(current)?);
        self.past.pop_back();
        Ok(previous)
    }

    /// Returns the next project, or a copy of `current` when there is
    /// nothing to redo.
    pub fn redo(&mut self, current: &Project) -> Result<Project> {
        let Some(data) = self.future.last() else {
            return Ok(current.clone());
        };
        let next = restore(data)?;
        let current = snapshot(current)?;
        self.future.pop();
        self.push_past(current);
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum UndoAction {
    None,
    /// Record the project before applying the message.
    Snapshot,
    /// Record the project only if no pencil stroke is in progress.
    Stroke,
}

fn valid_tile(state: &EditorState, idx: usize) -> bool {
    idx < state.project.tile_set.len()
}

fn valid_palette(state: &EditorState, idx: usize) -> bool {
    idx < state.project.palette_list.len()
}

fn valid_colour(idx: ColourIdx) -> bool {
    check_colour_index(idx).is_ok()
}

/// Whether any cell the brush would paint at `(x, y)` lies on the tile set.
fn brush_on_tiles(state: &EditorState, x: PixelCoord, y: PixelCoord) -> bool {
    let tile_set = &state.project.tile_set;
    brush_footprint(x, y, state.canvas.cursor_size())
        .into_iter()
        .any(|(px, py)| tile_set.get_pixel_at(px, py).is_some())
}

fn snapshot_if(cond: bool) -> UndoAction {
    if cond {
        UndoAction::Snapshot
    } else {
        UndoAction::None
    }
}

pub fn get_undo_action(state: &EditorState, message: &Message) -> UndoAction {
    // Only changes to the project data are undoable, not transient editor
    // state. Commands that would be rejected record nothing.
    match message {
        Message::Nothing => UndoAction::None,
        &Message::PointerDown { x, y } => match state.tool {
            Tool::Pencil if brush_on_tiles(state, x, y) => UndoAction::Stroke,
            Tool::Pencil => UndoAction::None,
            Tool::Bucket => {
                let start = state.project.tile_set.get_pixel_at(x, y);
                snapshot_if(start.is_some() && start != Some(state.colour_idx))
            }
        },
        &Message::PointerMove { x, y } => {
            if state.pointer_down && state.tool == Tool::Pencil && brush_on_tiles(state, x, y) {
                UndoAction::Stroke
            } else {
                UndoAction::None
            }
        }
        Message::PointerUp => UndoAction::None,
        Message::PointerLeft => UndoAction::None,
        Message::SelectTool(_) => UndoAction::None,
        Message::SelectColour(_) => UndoAction::None,
        Message::SetBrushSize(_) => UndoAction::None,
        Message::SetScale(_) => UndoAction::None,
        &Message::SetTileWidth(width) => {
            snapshot_if(width != state.project.tile_set.tile_width())
        }
        Message::SetTileGrid(_) => UndoAction::None,
        Message::SetPixelGrid(_) => UndoAction::None,
        Message::SetTransparencyIndex(_) => UndoAction::None,
        Message::SetDisplayNative(_) => UndoAction::None,
        Message::SelectTile(_) => UndoAction::None,
        Message::AddTile => UndoAction::Snapshot,
        &Message::InsertTileBefore(idx) => snapshot_if(idx <= state.project.tile_set.len()),
        &Message::InsertTileAfter(idx) => snapshot_if(valid_tile(state, idx)),
        &Message::RemoveTile(idx) => snapshot_if(valid_tile(state, idx)),
        &Message::CloneTile(idx) => snapshot_if(valid_tile(state, idx)),
        &Message::MoveTileLeft(idx) => snapshot_if(idx > 0 && valid_tile(state, idx)),
        &Message::MoveTileRight(idx) => {
            snapshot_if(idx.checked_add(1).is_some_and(|i| valid_tile(state, i)))
        }
        &Message::MirrorTileHorizontal(idx) => snapshot_if(valid_tile(state, idx)),
        &Message::MirrorTileVertical(idx) => snapshot_if(valid_tile(state, idx)),
        &Message::ReplaceColourIndex { source, target } => {
            snapshot_if(source != target && valid_colour(source) && valid_colour(target))
        }
        &Message::SwapColourIndex { first, second } => {
            snapshot_if(first != second && valid_colour(first) && valid_colour(second))
        }
        Message::SelectPalette(_) => UndoAction::None,
        Message::NewPalette => UndoAction::Snapshot,
        &Message::DeletePalette(idx) => {
            snapshot_if(valid_palette(state, idx) && state.project.palette_list.len() > 1)
        }
        &Message::SetPaletteTitle { palette_idx, .. } => snapshot_if(valid_palette(state, palette_idx)),
        &Message::SetPaletteSystem { palette_idx, .. } => {
            snapshot_if(valid_palette(state, palette_idx))
        }
        &Message::SetPaletteColour {
            palette_idx,
            colour_idx,
            ..
        } => snapshot_if(valid_palette(state, palette_idx) && valid_colour(colour_idx)),
        Message::SetProjectTitle(_) => UndoAction::Snapshot,
        Message::AddReferenceImage(_) => UndoAction::None,
        Message::ClearReferenceImages => UndoAction::None,
        Message::Undo => UndoAction::None,
        Message::Redo => UndoAction::None,
        Message::ProjectLoaded(_) => UndoAction::Snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(title: &str) -> Project {
        Project::new(title)
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut undo = UndoManager::default();
        let p1 = project("one");
        let mut p2 = p1.clone();
        p2.tile_set.set_pixel_at(0, 0, 3).unwrap();

        undo.add_undo_state(&p1).unwrap();
        assert!(undo.can_undo());
        assert!(!undo.can_redo());

        let undone = undo.undo(&p2).unwrap();
        assert_eq!(undone, p1);
        assert!(!undo.can_undo());
        assert!(undo.can_redo());

        let redone = undo.redo(&undone).unwrap();
        assert_eq!(redone, p2);
        assert!(undo.can_undo());
        assert!(!undo.can_redo());
    }

    #[test]
    fn test_empty_history_returns_current() {
        let mut undo = UndoManager::default();
        let p = project("only");
        assert_eq!(undo.undo(&p).unwrap(), p);
        assert_eq!(undo.redo(&p).unwrap(), p);
    }

    #[test]
    fn test_oldest_snapshots_are_evicted() {
        let mut undo = UndoManager::new(3);
        for i in 0..5 {
            undo.add_undo_state(&project(&format!("p{i}"))).unwrap();
        }
        let mut current = project("current");
        let mut titles = vec![];
        while undo.can_undo() {
            current = undo.undo(&current).unwrap();
            titles.push(current.title.clone());
        }
        assert_eq!(titles, vec!["p4", "p3", "p2"]);
    }

    #[test]
    fn test_new_state_discards_redo_branch() {
        let mut undo = UndoManager::default();
        undo.add_undo_state(&project("a")).unwrap();
        let b = undo.undo(&project("b")).unwrap();
        assert!(undo.can_redo());
        undo.add_undo_state(&b).unwrap();
        assert!(!undo.can_redo());
        undo.clear();
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_policy_checks_brush_footprint_and_indices() {
        let mut state = EditorState::new(project("policy"));
        let edge = Message::PointerDown { x: -1, y: 0 };
        assert_eq!(get_undo_action(&state, &edge), UndoAction::None);
        state.canvas.set_cursor_size(3).unwrap();
        assert_eq!(get_undo_action(&state, &edge), UndoAction::Stroke);

        let bad_swap = Message::SwapColourIndex {
            first: 2,
            second: 16,
        };
        assert_eq!(get_undo_action(&state, &bad_swap), UndoAction::None);
        let overflow = Message::MoveTileRight(usize::MAX);
        assert_eq!(get_undo_action(&state, &overflow), UndoAction::None);
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    common::TILE_PIXELS,
    palette::{Palette, PaletteList, System},
    tileset::TileSet,
};

/// Colour index new tiles are filled with.
pub const BLANK_TILE_COLOUR: u8 = 15;

/// The unit that is saved, loaded and snapshotted for undo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub tile_set: TileSet,
    pub palette_list: PaletteList,
}

impl Default for Project {
    fn default() -> Self {
        Project::new("New project")
    }
}

impl Project {
    /// An 8x8 grid of blank tiles with one default palette per system.
    pub fn new(title: &str) -> Self {
        let mut project = Project {
            title: title.to_string(),
            tile_set: TileSet::new(8),
            palette_list: PaletteList::new(),
        };
        project.fill_missing_defaults();
        project
    }

    /// Restores the minimum a project needs to be editable: a title, at least
    /// one tile and at least one palette.
    pub fn fill_missing_defaults(&mut self) {
        if self.title.is_empty() {
            self.title = "New project".to_string();
        }
        if self.tile_set.is_empty() {
            let data = vec![BLANK_TILE_COLOUR; TILE_PIXELS * 64];
            self.tile_set = TileSet::from_bytes(&data, 8);
        }
        if self.palette_list.is_empty() {
            self.palette_list.add_palette(Palette::standard(
                "Default Master System",
                System::MasterSystem,
            ));
            self.palette_list
                .add_palette(Palette::standard("Default Game Gear", System::GameGear));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_project() {
        let project = Project::default();
        assert_eq!(project.title, "New project");
        assert_eq!(project.tile_set.len(), 64);
        assert_eq!(project.tile_set.tile_width(), 8);
        assert_eq!(project.tile_set.get_pixel_at(63, 63), Some(BLANK_TILE_COLOUR));
        assert_eq!(project.palette_list.len(), 2);
        assert_eq!(
            project.palette_list.get_palette(1).unwrap().system,
            System::GameGear
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mut project = Project::new("Round trip");
        project.tile_set.set_pixel_at(3, 4, 7).unwrap();
        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"system\":\"gg\""));
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);
    }
}

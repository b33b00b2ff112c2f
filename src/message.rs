use crate::{
    canvas::ReferenceImage,
    common::{ColourIdx, PixelCoord, TileIdx},
    palette::{PaletteColour, System},
    project::Project,
};

/// Paint tool applied by pointer input over the tile set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Pencil,
    Bucket,
}

#[derive(Debug, Clone)]
pub enum Message {
    Nothing,
    // Pointer input, in unscaled tile set pixels:
    PointerDown { x: PixelCoord, y: PixelCoord },
    PointerMove { x: PixelCoord, y: PixelCoord },
    PointerUp,
    PointerLeft,
    SelectTool(Tool),
    SelectColour(ColourIdx),
    SetBrushSize(u32),
    SetScale(u32),
    SetTileWidth(usize),
    SetTileGrid(bool),
    SetPixelGrid(bool),
    SetTransparencyIndex(Option<ColourIdx>),
    SetDisplayNative(bool),
    SelectTile(Option<TileIdx>),
    AddTile,
    InsertTileBefore(TileIdx),
    InsertTileAfter(TileIdx),
    RemoveTile(TileIdx),
    CloneTile(TileIdx),
    MoveTileLeft(TileIdx),
    MoveTileRight(TileIdx),
    MirrorTileHorizontal(TileIdx),
    MirrorTileVertical(TileIdx),
    ReplaceColourIndex {
        source: ColourIdx,
        target: ColourIdx,
    },
    SwapColourIndex {
        first: ColourIdx,
        second: ColourIdx,
    },
    SelectPalette(usize),
    NewPalette,
    DeletePalette(usize),
    SetPaletteTitle {
        palette_idx: usize,
        title: String,
    },
    SetPaletteSystem {
        palette_idx: usize,
        system: System,
    },
    SetPaletteColour {
        palette_idx: usize,
        colour_idx: ColourIdx,
        colour: PaletteColour,
    },
    SetProjectTitle(String),
    AddReferenceImage(ReferenceImage),
    ClearReferenceImages,
    Undo,
    Redo,
    ProjectLoaded(Box<Project>),
}

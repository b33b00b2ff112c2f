use serde::{Deserialize, Serialize};

pub use crate::colour::System;
use crate::{
    colour::{self, ColourRGB},
    common::{ColourIdx, ColourValue, PALETTE_SIZE},
    error::{check_colour_index, EditorError, Result},
};

/// A single palette entry. Colours are values: changing a palette slot
/// replaces the entry rather than editing it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaletteColour {
    pub r: ColourValue,
    pub g: ColourValue,
    pub b: ColourValue,
}

impl PaletteColour {
    pub const fn new(r: ColourValue, g: ColourValue, b: ColourValue) -> Self {
        PaletteColour { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        Ok(colour::rgb_from_hex(hex)?.into())
    }

    pub fn rgb(&self) -> ColourRGB {
        (self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        colour::to_hex(self.r, self.g, self.b)
    }

    /// The colour as the given system displays it.
    pub fn to_native(&self, system: System) -> Self {
        colour::to_native_rgb(system, self.rgb()).into()
    }
}

impl From<ColourRGB> for PaletteColour {
    fn from((r, g, b): ColourRGB) -> Self {
        PaletteColour { r, g, b }
    }
}

const STANDARD_COLOURS: [ColourRGB; PALETTE_SIZE] = [
    (0, 0, 0),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (0, 255, 255),
    (255, 0, 255),
    (170, 0, 0),
    (0, 170, 0),
    (0, 0, 170),
    (255, 170, 0),
    (170, 85, 255),
    (85, 85, 85),
    (170, 170, 170),
    (255, 170, 170),
    (255, 255, 255),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub title: String,
    pub system: System,
    colours: [PaletteColour; PALETTE_SIZE],
}

impl Palette {
    pub fn new(title: &str, system: System, colours: [PaletteColour; PALETTE_SIZE]) -> Self {
        Palette {
            title: title.to_string(),
            system,
            colours,
        }
    }

    /// A general purpose palette, already snapped to the system's colour depth.
    pub fn standard(title: &str, system: System) -> Self {
        let colours = STANDARD_COLOURS.map(|c| PaletteColour::from(c).to_native(system));
        Palette::new(title, system, colours)
    }

    /// Builds a palette from Master System CRAM bytes (`00bbggrr`).
    pub fn from_native_ms(title: &str, data: &[u8]) -> Self {
        let words: Vec<u16> = data.iter().map(|&b| b as u16).collect();
        Palette::from_native(title, System::MasterSystem, &words)
    }

    /// Builds a palette from Game Gear CRAM words (`0000bbbbggggrrrr`).
    pub fn from_native_gg(title: &str, data: &[u16]) -> Self {
        Palette::from_native(title, System::GameGear, data)
    }

    // Missing entries are black; entries past the 16th are ignored.
    fn from_native(title: &str, system: System, data: &[u16]) -> Self {
        let mut colours = [PaletteColour::default(); PALETTE_SIZE];
        for (slot, &value) in colours.iter_mut().zip(data) {
            let levels = colour::native_levels(system, value);
            *slot = colour::expand(system, levels).into();
        }
        Palette::new(title, system, colours)
    }

    /// The palette in the system's packed native format.
    pub fn to_native(&self) -> Vec<u16> {
        self.colours
            .iter()
            .map(|c| colour::native_colour(self.system, c.rgb()))
            .collect()
    }

    /// A copy whose colours are what the target system would display.
    pub fn native_preview(&self) -> Palette {
        Palette {
            title: self.title.clone(),
            system: self.system,
            colours: self.colours.map(|c| c.to_native(self.system)),
        }
    }

    pub fn colour(&self, idx: ColourIdx) -> Result<PaletteColour> {
        Ok(self.colours[check_colour_index(idx)? as usize])
    }

    pub fn set_colour(&mut self, idx: ColourIdx, colour: PaletteColour) -> Result<()> {
        self.colours[check_colour_index(idx)? as usize] = colour;
        Ok(())
    }

    pub fn colours(&self) -> &[PaletteColour; PALETTE_SIZE] {
        &self.colours
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteList {
    palettes: Vec<Palette>,
}

impl PaletteList {
    pub fn new() -> Self {
        PaletteList::default()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn add_palette(&mut self, palette: Palette) {
        self.palettes.push(palette);
    }

    pub fn insert_at(&mut self, index: usize, palette: Palette) -> Result<()> {
        if index > self.palettes.len() {
            return Err(self.out_of_range(index));
        }
        self.palettes.insert(index, palette);
        Ok(())
    }

    pub fn get_palette(&self, index: usize) -> Result<&Palette> {
        self.palettes
            .get(index)
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn get_palette_mut(&mut self, index: usize) -> Result<&mut Palette> {
        let err = self.out_of_range(index);
        self.palettes.get_mut(index).ok_or(err)
    }

    pub fn set_palette(&mut self, index: usize, palette: Palette) -> Result<()> {
        *self.get_palette_mut(index)? = palette;
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Palette> {
        if index >= self.palettes.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.palettes.remove(index))
    }

    fn out_of_range(&self, index: usize) -> EditorError {
        EditorError::IndexOutOfRange {
            what: "palette",
            index,
            len: self.palettes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_colour_replaces_slot() {
        let mut pal = Palette::standard("Test", System::MasterSystem);
        let before = pal.clone();
        pal.set_colour(3, PaletteColour::new(1, 2, 3)).unwrap();
        assert_eq!(pal.colour(3).unwrap(), PaletteColour::new(1, 2, 3));
        // The earlier copy still holds the old entry.
        assert_ne!(before.colour(3).unwrap(), pal.colour(3).unwrap());
    }

    #[test]
    fn test_colour_index_is_validated() {
        let mut pal = Palette::standard("Test", System::GameGear);
        assert!(matches!(
            pal.colour(16),
            Err(EditorError::InvalidColourIndex(16))
        ));
        assert!(pal.set_colour(200, PaletteColour::default()).is_err());
    }

    #[test]
    fn test_standard_palette_is_native() {
        for system in [System::MasterSystem, System::GameGear] {
            let pal = Palette::standard("Std", system);
            assert_eq!(pal.native_preview(), pal);
        }
        let pal = Palette::standard("Std", System::MasterSystem);
        assert_eq!(pal.colour(15).unwrap(), PaletteColour::new(255, 255, 255));
    }

    #[test]
    fn test_native_import_export() {
        let data = [0x00, 0x3f, 0x03, 0x0c, 0x30];
        let pal = Palette::from_native_ms("Imported", &data);
        assert_eq!(pal.system, System::MasterSystem);
        assert_eq!(pal.colour(1).unwrap(), PaletteColour::new(255, 255, 255));
        assert_eq!(pal.colour(2).unwrap(), PaletteColour::new(255, 0, 0));
        assert_eq!(pal.colour(4).unwrap(), PaletteColour::new(0, 0, 255));
        assert_eq!(pal.colour(5).unwrap(), PaletteColour::default());
        assert_eq!(&pal.to_native()[..5], &[0x00, 0x3f, 0x03, 0x0c, 0x30]);

        let pal = Palette::from_native_gg("Imported", &[0x0fff, 0x0a51]);
        assert_eq!(pal.colour(0).unwrap(), PaletteColour::new(255, 255, 255));
        assert_eq!(pal.colour(1).unwrap(), PaletteColour::new(17, 85, 170));
        assert_eq!(pal.to_native()[1], 0x0a51);
    }

    #[test]
    fn test_native_preview() {
        let mut pal = Palette::standard("Test", System::MasterSystem);
        pal.set_colour(0, PaletteColour::new(128, 40, 200)).unwrap();
        let preview = pal.native_preview();
        assert_eq!(preview.colour(0).unwrap(), PaletteColour::new(170, 0, 170));
    }

    #[test]
    fn test_palette_list_indexing() {
        let mut list = PaletteList::new();
        assert!(list.is_empty());
        list.add_palette(Palette::standard("A", System::MasterSystem));
        list.add_palette(Palette::standard("C", System::GameGear));
        list.insert_at(1, Palette::standard("B", System::MasterSystem))
            .unwrap();
        let titles: Vec<&str> = list.palettes().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert!(list.get_palette(3).is_err());
        assert!(list.insert_at(5, Palette::standard("X", System::GameGear)).is_err());
        assert_eq!(list.remove_at(0).unwrap().title, "A");
        assert!(list.remove_at(2).is_err());
        assert_eq!(list.len(), 2);
    }
}

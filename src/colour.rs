// Colour conversion between 8-bit RGB, hex strings and the native colour
// depth of the target systems.
use std::{fmt::Display, str::FromStr};

use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::{
    common::ColourValue,
    error::{EditorError, Result},
};

pub type ColourRGB = (ColourValue, ColourValue, ColourValue);

/// Target system, which determines the native colour depth.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum System {
    /// Sega Master System: 2 bits per channel.
    #[default]
    #[serde(rename = "ms")]
    MasterSystem,
    /// Sega Game Gear: 4 bits per channel.
    #[serde(rename = "gg")]
    GameGear,
}

impl System {
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "ms" => Ok(System::MasterSystem),
            "gg" => Ok(System::GameGear),
            _ => Err(EditorError::InvalidSystem(code.to_string())),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            System::MasterSystem => "ms",
            System::GameGear => "gg",
        }
    }

    /// Highest native level of a single channel.
    pub fn max_level(self) -> u8 {
        match self {
            System::MasterSystem => 3,
            System::GameGear => 15,
        }
    }

    /// Distance in 8-bit RGB between two adjacent native levels.
    pub fn level_step(self) -> u8 {
        255 / self.max_level()
    }

    fn channel_bits(self) -> u32 {
        match self {
            System::MasterSystem => 2,
            System::GameGear => 4,
        }
    }
}

impl FromStr for System {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self> {
        System::from_code(s)
    }
}

impl Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub fn to_hex(r: ColourValue, g: ColourValue, b: ColourValue) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parses a `#rrggbb` colour string (either case).
pub fn rgb_from_hex(hex: &str) -> Result<ColourRGB> {
    let invalid = || EditorError::InvalidHex(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Quantizes one 8-bit channel to the native level, rounding to nearest.
pub fn quantize_channel(system: System, c: ColourValue) -> u8 {
    let levels = system.max_level() as u32;
    ((2 * c as u32 * levels + 255) / 510) as u8
}

/// Expands a native level back to an 8-bit channel value.
pub fn expand_channel(system: System, level: u8) -> ColourValue {
    level.min(system.max_level()) * system.level_step()
}

pub fn quantize(system: System, rgb: ColourRGB) -> (u8, u8, u8) {
    (
        quantize_channel(system, rgb.0),
        quantize_channel(system, rgb.1),
        quantize_channel(system, rgb.2),
    )
}

pub fn expand(system: System, levels: (u8, u8, u8)) -> ColourRGB {
    (
        expand_channel(system, levels.0),
        expand_channel(system, levels.1),
        expand_channel(system, levels.2),
    )
}

/// Packs a colour into the system's native word: `R | G<<n | B<<2n`.
pub fn native_colour(system: System, rgb: ColourRGB) -> u16 {
    let (r, g, b) = quantize(system, rgb);
    let bits = system.channel_bits();
    r as u16 | (g as u16) << bits | (b as u16) << (2 * bits)
}

/// Unpacks a native colour word into channel levels.
pub fn native_levels(system: System, value: u16) -> (u8, u8, u8) {
    let bits = system.channel_bits();
    let mask = (1u16 << bits) - 1;
    (
        (value & mask) as u8,
        (value >> bits & mask) as u8,
        (value >> (2 * bits) & mask) as u8,
    )
}

/// The packed native value as hex digits: 2 for Master System, 3 for Game Gear.
pub fn native_colour_hex(system: System, rgb: ColourRGB) -> String {
    let value = native_colour(system, rgb);
    match system {
        System::MasterSystem => format!("{:02x}", value),
        System::GameGear => format!("{:03x}", value),
    }
}

pub fn native_colour_from_hex(system: System, hex: &str) -> Result<String> {
    Ok(native_colour_hex(system, rgb_from_hex(hex)?))
}

/// The colour as the target system would display it, as `#rrggbb`.
pub fn to_native_hex(system: System, rgb: ColourRGB) -> String {
    let (r, g, b) = to_native_rgb(system, rgb);
    to_hex(r, g, b)
}

pub fn to_native_rgb(system: System, rgb: ColourRGB) -> ColourRGB {
    expand(system, quantize(system, rgb))
}

/// Every colour the system can display, ordered blue-major then green then red.
pub fn full_system_palette(system: System) -> Vec<ColourRGB> {
    let shades: Vec<ColourValue> = (0..=system.max_level())
        .map(|level| expand_channel(system, level))
        .collect();
    iproduct!(shades.iter(), shades.iter(), shades.iter())
        .map(|(&b, &g, &r)| (r, g, b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(to_hex(255, 0, 16), "#ff0010");
        assert_eq!(rgb_from_hex("#FF0010").unwrap(), (255, 0, 16));
        assert_eq!(rgb_from_hex("#a0b0c0").unwrap(), (0xa0, 0xb0, 0xc0));
    }

    #[test]
    fn test_malformed_hex_is_rejected() {
        for bad in ["", "ff0010", "#ff001", "#ff00100", "#gg0010", "#+f0010"] {
            assert!(
                matches!(rgb_from_hex(bad), Err(EditorError::InvalidHex(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_system_is_rejected() {
        assert_eq!(System::from_code("ms").unwrap(), System::MasterSystem);
        assert_eq!("gg".parse::<System>().unwrap(), System::GameGear);
        assert!(matches!(
            System::from_code("nes"),
            Err(EditorError::InvalidSystem(_))
        ));
    }

    #[test]
    fn test_master_system_levels() {
        assert_eq!(quantize(System::MasterSystem, (255, 255, 255)), (3, 3, 3));
        assert_eq!(to_native_hex(System::MasterSystem, (255, 255, 255)), "#ffffff");
        assert_eq!(quantize(System::MasterSystem, (128, 128, 128)), (2, 2, 2));
        assert_eq!(
            to_native_rgb(System::MasterSystem, (128, 128, 128)),
            (170, 170, 170)
        );
        assert_eq!(quantize_channel(System::MasterSystem, 42), 0);
        assert_eq!(quantize_channel(System::MasterSystem, 43), 1);
    }

    #[test]
    fn test_native_packing() {
        assert_eq!(native_colour(System::MasterSystem, (255, 0, 0)), 0x03);
        assert_eq!(native_colour(System::MasterSystem, (0, 255, 0)), 0x0c);
        assert_eq!(native_colour(System::MasterSystem, (0, 0, 255)), 0x30);
        assert_eq!(native_colour_hex(System::MasterSystem, (255, 255, 255)), "3f");
        assert_eq!(native_colour(System::GameGear, (255, 0, 0)), 0x00f);
        assert_eq!(native_colour(System::GameGear, (0, 0, 255)), 0xf00);
        assert_eq!(native_colour_hex(System::GameGear, (0, 17, 0)), "010");
        assert_eq!(
            native_colour_from_hex(System::GameGear, "#ffffff").unwrap(),
            "fff"
        );
        assert_eq!(native_levels(System::GameGear, 0x3a1), (1, 10, 3));
        assert_eq!(native_levels(System::MasterSystem, 0x39), (1, 2, 3));
    }

    #[test]
    fn test_quantization_round_trip_is_fixed_point() {
        for system in [System::MasterSystem, System::GameGear] {
            for c in 0..=255u8 {
                let level = quantize_channel(system, c);
                assert!(level <= system.max_level());
                let expanded = expand_channel(system, level);
                assert_eq!(
                    quantize_channel(system, expanded),
                    level,
                    "{system} channel {c}"
                );
            }
        }
    }

    #[test]
    fn test_full_system_palettes() {
        let ms = full_system_palette(System::MasterSystem);
        assert_eq!(ms.len(), 64);
        assert_eq!(ms[0], (0, 0, 0));
        assert_eq!(ms[1], (85, 0, 0));
        assert_eq!(ms[4], (0, 85, 0));
        assert_eq!(ms[63], (255, 255, 255));

        let gg = full_system_palette(System::GameGear);
        assert_eq!(gg.len(), 4096);
        assert_eq!(gg[1], (17, 0, 0));
        assert_eq!(gg[4095], (255, 255, 255));
    }
}

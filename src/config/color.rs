//! RGBA colours and the default colour scheme.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::overrides::OverrideValue;

/// Number of colours in the room palette
pub const ROOM_PALETTE_SIZE: usize = 16;

/// RGBA colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (255 = opaque)
    pub a: u8,
}

impl Color {
    /// Opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Channels as an array
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from 3 or 4 channel values
    pub fn from_channels(channels: &[u8]) -> Option<Self> {
        match *channels {
            [r, g, b] => Some(Color::rgb(r, g, b)),
            [r, g, b, a] => Some(Color::rgba(r, g, b, a)),
            _ => None,
        }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(format!("expected #RRGGBB or #RRGGBBAA, got {s:?}"));
        }
        let channels = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| format!("invalid hex colour {s:?}: {e}"))?;
        Color::from_channels(&channels).ok_or_else(|| format!("invalid colour {s:?}"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels(Vec<u8>),
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => s.parse(),
            ColorRepr::Channels(c) => {
                Color::from_channels(&c).ok_or_else(|| format!("expected 3 or 4 channels, got {}", c.len()))
            }
        }
    }
}

impl OverrideValue {
    /// Interpret as a colour (`"#RRGGBB[AA]"` or `[r, g, b(, a)]`)
    pub fn as_color(&self, key: &str) -> Result<Color, ConfigError> {
        match self {
            OverrideValue::Text(s) => s.parse().map_err(|e: String| ConfigError::invalid(key, e)),
            OverrideValue::List(items) => {
                let channels = items
                    .iter()
                    .map(|item| match item {
                        OverrideValue::Number(n) if (0.0..=255.0).contains(n) && n.fract() == 0.0 => {
                            Ok(*n as u8)
                        }
                        other => Err(ConfigError::invalid(
                            key,
                            format!("colour channel must be 0-255, got {other}"),
                        )),
                    })
                    .collect::<Result<Vec<u8>, _>>()?;
                Color::from_channels(&channels)
                    .ok_or_else(|| ConfigError::invalid(key, "expected 3 or 4 channels"))
            }
            other => Err(ConfigError::invalid(key, format!("expected colour, got {other}"))),
        }
    }
}

/// Colour per drawable category
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorScheme {
    /// Explored floor outside rooms
    pub map_inside: Color,
    /// Unexplored space
    pub map_outside: Color,
    /// Walls from the bitmap
    pub map_wall: Color,
    /// Bitmap codes this decoder does not know
    pub unknown: Color,
    /// Room outlines
    pub room_outline: Color,
    /// Carpet runs
    pub carpet: Color,
    /// No-carpet area fill
    pub no_carpet_zones: Color,
    /// No-carpet area outline
    pub no_carpet_zones_outline: Color,
    /// No-go area fill
    pub no_go_zones: Color,
    /// No-go area outline
    pub no_go_zones_outline: Color,
    /// No-mopping area fill
    pub no_mop_zones: Color,
    /// No-mopping area outline
    pub no_mop_zones_outline: Color,
    /// Cleaning zone fill
    pub zones: Color,
    /// Cleaning zone outline
    pub zones_outline: Color,
    /// Virtual walls
    pub virtual_walls: Color,
    /// Driven path
    pub path: Color,
    /// Path towards the go-to target
    pub goto_path: Color,
    /// Planned path
    pub predicted_path: Color,
    /// Mop path
    pub mop_path: Color,
    /// Go-to target marker
    pub goto_target: Color,
    /// Obstacles
    pub obstacle: Color,
    /// Obstacles with photo
    pub obstacle_with_photo: Color,
    /// Ignored obstacles
    pub ignored_obstacle: Color,
    /// Ignored obstacles with photo
    pub ignored_obstacle_with_photo: Color,
    /// Charger fill
    pub charger: Color,
    /// Charger outline
    pub charger_outline: Color,
    /// Vacuum fill
    pub robot: Color,
    /// Vacuum outline
    pub robot_outline: Color,
    /// Room name labels
    pub room_names: Color,
    /// Room palette, indexed by room id modulo the palette size
    pub rooms: [Color; ROOM_PALETTE_SIZE],
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            map_inside: Color::rgb(32, 115, 185),
            map_outside: Color::rgb(19, 87, 148),
            map_wall: Color::rgb(100, 196, 254),
            unknown: Color::rgb(0, 0, 0),
            room_outline: Color::rgba(255, 255, 255, 96),
            carpet: Color::rgba(0xA9, 0xF7, 0xA9, 0x7F),
            no_carpet_zones: Color::rgba(255, 33, 55, 127),
            no_carpet_zones_outline: Color::rgb(255, 0, 0),
            no_go_zones: Color::rgba(255, 33, 55, 127),
            no_go_zones_outline: Color::rgb(255, 0, 0),
            no_mop_zones: Color::rgba(163, 130, 211, 127),
            no_mop_zones_outline: Color::rgb(163, 130, 211),
            zones: Color::rgba(0xAD, 0xD8, 0xFF, 0x8F),
            zones_outline: Color::rgb(0xAD, 0xD8, 0xFF),
            virtual_walls: Color::rgb(255, 0, 0),
            path: Color::rgb(147, 194, 238),
            goto_path: Color::rgb(0, 255, 0),
            predicted_path: Color::rgb(255, 255, 0),
            mop_path: Color::rgba(255, 255, 255, 0x48),
            goto_target: Color::rgb(0, 255, 0),
            obstacle: Color::rgba(0, 0, 0, 128),
            obstacle_with_photo: Color::rgba(0, 0, 0, 128),
            ignored_obstacle: Color::rgba(0, 0, 0, 127),
            ignored_obstacle_with_photo: Color::rgba(0, 0, 0, 127),
            charger: Color::rgb(0x66, 0xFE, 0xDA),
            charger_outline: Color::rgb(0x1A, 0x80, 0x6B),
            robot: Color::rgb(0xFF, 0xFF, 0xFF),
            robot_outline: Color::rgb(0, 0, 0),
            room_names: Color::rgb(0, 0, 0),
            rooms: [
                Color::rgb(240, 178, 122),
                Color::rgb(133, 193, 233),
                Color::rgb(217, 136, 128),
                Color::rgb(52, 152, 219),
                Color::rgb(205, 97, 85),
                Color::rgb(243, 156, 18),
                Color::rgb(88, 214, 141),
                Color::rgb(245, 176, 65),
                Color::rgb(252, 212, 81),
                Color::rgb(72, 201, 176),
                Color::rgb(84, 153, 199),
                Color::rgb(133, 193, 233),
                Color::rgb(245, 176, 65),
                Color::rgb(82, 190, 128),
                Color::rgb(72, 201, 176),
                Color::rgb(165, 105, 189),
            ],
        }
    }
}

/// Named colour fields, looked up by their configuration key
macro_rules! named_colors {
    ($($field:ident),* $(,)?) => {
        impl ColorScheme {
            fn named(&self, name: &str) -> Option<&Color> {
                match name {
                    $(stringify!($field) => Some(&self.$field),)*
                    _ => None,
                }
            }

            fn named_mut(&mut self, name: &str) -> Option<&mut Color> {
                match name {
                    $(stringify!($field) => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

named_colors!(
    map_inside,
    map_outside,
    map_wall,
    unknown,
    room_outline,
    carpet,
    no_carpet_zones,
    no_carpet_zones_outline,
    no_go_zones,
    no_go_zones_outline,
    no_mop_zones,
    no_mop_zones_outline,
    zones,
    zones_outline,
    virtual_walls,
    path,
    goto_path,
    predicted_path,
    mop_path,
    goto_target,
    obstacle,
    obstacle_with_photo,
    ignored_obstacle,
    ignored_obstacle_with_photo,
    charger,
    charger_outline,
    robot,
    robot_outline,
    room_names,
);

impl ColorScheme {
    /// Names of all scalar colour keys, in declaration order
    pub const KEYS: [&'static str; 29] = [
        "map_inside",
        "map_outside",
        "map_wall",
        "unknown",
        "room_outline",
        "carpet",
        "no_carpet_zones",
        "no_carpet_zones_outline",
        "no_go_zones",
        "no_go_zones_outline",
        "no_mop_zones",
        "no_mop_zones_outline",
        "zones",
        "zones_outline",
        "virtual_walls",
        "path",
        "goto_path",
        "predicted_path",
        "mop_path",
        "goto_target",
        "obstacle",
        "obstacle_with_photo",
        "ignored_obstacle",
        "ignored_obstacle_with_photo",
        "charger",
        "charger_outline",
        "robot",
        "robot_outline",
        "room_names",
    ];

    /// Colour for a room id
    #[inline]
    pub fn room(&self, id: u32) -> Color {
        self.rooms[id as usize % ROOM_PALETTE_SIZE]
    }

    /// Palette index addressed by a `room_<n>` key
    fn palette_index(name: &str) -> Option<usize> {
        name.strip_prefix("room_")?.parse().ok()
    }

    fn slot(&self, name: &str) -> Option<&Color> {
        match self.named(name) {
            Some(slot) => Some(slot),
            None => self.rooms.get(Self::palette_index(name)?),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        if self.named(name).is_some() {
            return self.named_mut(name);
        }
        let index = Self::palette_index(name)?;
        self.rooms.get_mut(index)
    }

    /// Colour by key (`room_<n>` addresses the palette)
    pub fn get(&self, name: &str) -> Option<Color> {
        self.slot(name).copied()
    }

    /// Apply a `colors.<name>` override
    pub(crate) fn apply(&mut self, key: &str, name: &str, value: &OverrideValue) -> Result<(), ConfigError> {
        let color = value.as_color(key)?;
        let slot = self
            .slot_mut(name)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        *slot = color;
        Ok(())
    }

    /// Every colour as `(key, colour)`, palette last
    pub fn entries(&self) -> Vec<(String, Color)> {
        let mut entries: Vec<(String, Color)> = Self::KEYS
            .iter()
            .filter_map(|k| self.get(k).map(|c| (k.to_string(), c)))
            .collect();
        entries.extend(
            self.rooms
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("room_{i}"), *c)),
        );
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#FF0000".parse::<Color>(), Ok(Color::rgb(255, 0, 0)));
        assert_eq!("00ff0080".parse::<Color>(), Ok(Color::rgba(0, 255, 0, 128)));
        assert!("#FFF".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let color = Color::rgba(1, 2, 3, 4);
        assert_eq!(color.to_string(), "#01020304");
        assert_eq!(color.to_string().parse::<Color>(), Ok(color));
    }

    #[test]
    fn test_apply_override() {
        let mut scheme = ColorScheme::default();
        scheme
            .apply("colors.path", "path", &OverrideValue::Text("#102030".into()))
            .unwrap();
        assert_eq!(scheme.path, Color::rgb(0x10, 0x20, 0x30));

        let channels = OverrideValue::List(vec![
            OverrideValue::Number(1.0),
            OverrideValue::Number(2.0),
            OverrideValue::Number(3.0),
            OverrideValue::Number(4.0),
        ]);
        scheme.apply("colors.room_3", "room_3", &channels).unwrap();
        assert_eq!(scheme.room(3), Color::rgba(1, 2, 3, 4));
        assert_eq!(scheme.room(19), Color::rgba(1, 2, 3, 4));
    }

    #[test]
    fn test_apply_rejects_unknown_and_invalid() {
        let mut scheme = ColorScheme::default();
        let red = OverrideValue::Text("#FF0000".into());
        assert!(matches!(
            scheme.apply("colors.nope", "nope", &red),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            scheme.apply("colors.room_16", "room_16", &red),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            scheme.apply("colors.path", "path", &OverrideValue::Bool(true)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_named_keys_sharing_the_palette_prefix() {
        let mut scheme = ColorScheme::default();
        let red = OverrideValue::Text("#FF0000".into());
        let blue = OverrideValue::Text("#0000FF".into());
        scheme.apply("colors.room_names", "room_names", &red).unwrap();
        scheme.apply("colors.room_outline", "room_outline", &blue).unwrap();
        assert_eq!(scheme.room_names, Color::rgb(255, 0, 0));
        assert_eq!(scheme.room_outline, Color::rgb(0, 0, 255));
        assert_eq!(scheme.get("room_names"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(scheme.rooms, ColorScheme::default().rooms);
    }

    #[test]
    fn test_every_key_accepts_an_override() {
        let mut scheme = ColorScheme::default();
        let color = Color::rgba(9, 8, 7, 6);
        let value = OverrideValue::Text(color.to_string());
        for (key, _) in ColorScheme::default().entries() {
            scheme
                .apply(&format!("colors.{key}"), &key, &value)
                .unwrap_or_else(|e| panic!("{key}: {e}"));
            assert_eq!(scheme.get(&key), Some(color), "{key}");
        }
    }

    #[test]
    fn test_entries_cover_every_key() {
        let scheme = ColorScheme::default();
        let entries = scheme.entries();
        assert_eq!(entries.len(), ColorScheme::KEYS.len() + ROOM_PALETTE_SIZE);
        assert_eq!(entries[0], ("map_inside".to_string(), scheme.map_inside));
    }
}

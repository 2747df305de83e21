//! Tab color tags.
//!
//! Tabs carry a color tag drawn from a fixed eight-entry palette: a neutral
//! slate default plus seven accents. Normalization is total — any input hex
//! string maps to the nearest palette member, and anything unparseable maps
//! to the default — so persisted state can never hold an off-palette color.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A tab color tag, always one of the fixed palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabColor([u8; 3]);

/// The fixed palette, in cycle order. Index 0 is the neutral default.
pub const PALETTE: [TabColor; 8] = [
    TabColor([0x64, 0x74, 0x8b]), // slate (default)
    TabColor([0xef, 0x44, 0x44]), // red
    TabColor([0xf9, 0x73, 0x16]), // orange
    TabColor([0xea, 0xb3, 0x08]), // yellow
    TabColor([0x22, 0xc5, 0x5e]), // green
    TabColor([0x3b, 0x82, 0xf6]), // blue
    TabColor([0xa8, 0x55, 0xf7]), // purple
    TabColor([0xec, 0x48, 0x99]), // pink
];

impl TabColor {
    /// The neutral default color.
    pub const DEFAULT: TabColor = PALETTE[0];

    /// Red, green and blue components (0-255).
    pub fn rgb(self) -> [u8; 3] {
        self.0
    }

    /// Lowercase `#rrggbb` form, the persisted representation.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }

    /// True for the neutral default.
    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }

    /// The next palette entry in cycle order, wrapping to the default after
    /// the last accent.
    pub fn next(self) -> TabColor {
        let idx = PALETTE.iter().position(|&c| c == self).unwrap_or(0);
        PALETTE[(idx + 1) % PALETTE.len()]
    }

    /// Map arbitrary input to a palette member.
    ///
    /// Accepts `#rgb` and `#rrggbb` (case-insensitive, `#` optional) and
    /// snaps to the nearest palette entry by squared RGB distance. Anything
    /// unparseable yields the default.
    pub fn normalize(input: &str) -> TabColor {
        match parse_hex(input.trim()) {
            Some(rgb) => nearest(rgb),
            None => Self::DEFAULT,
        }
    }
}

impl Default for TabColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for TabColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for TabColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for TabColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Total: corrupt persisted colors snap to the palette instead of
        // failing the whole metadata decode.
        let raw = String::deserialize(deserializer)?;
        Ok(TabColor::normalize(&raw))
    }
}

fn parse_hex(input: &str) -> Option<[u8; 3]> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in digits.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
                rgb[i] = u8::from_str_radix(std::str::from_utf8(chunk).ok()?, 16).ok()?;
            }
            Some(rgb)
        }
        _ => None,
    }
}

fn nearest(rgb: [u8; 3]) -> TabColor {
    let dist = |c: &TabColor| -> u32 {
        c.0.iter()
            .zip(rgb.iter())
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum()
    };
    *PALETTE
        .iter()
        .min_by_key(|c| dist(c))
        .expect("palette is non-empty")
}

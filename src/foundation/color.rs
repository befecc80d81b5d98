use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA8 color as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with alpha forced to 255.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

impl std::fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => parse_color(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self {
                    r: *r,
                    g: *g,
                    b: *b,
                    a: *a,
                }),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

/// Parse any CSS color: hex forms, the full named palette, `rgb()`, `hsl()` and friends.
pub fn parse_color(s: &str) -> Result<Rgba8, String> {
    let parsed = vello_cpu::color::parse_color(s)
        .map_err(|e| format!("invalid color \"{}\": {e}", s.trim()))?;
    let vello_cpu::color::Rgba8 { r, g, b, a } = parsed
        .to_alpha_color::<vello_cpu::color::Srgb>()
        .to_rgba8();
    Ok(Rgba8 { r, g, b, a })
}

/// [`parse_color`], or `fallback` with a warning naming the field.
pub fn parse_color_or(field: &str, s: &str, fallback: Rgba8) -> Rgba8 {
    match parse_color(s) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(field, error = %e, fallback = %fallback, "using default color");
            fallback
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;

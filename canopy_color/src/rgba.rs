// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Rgba`] color type, CSS-style parsing, and alpha compositing.

use core::fmt;
use core::str::FromStr;

use crate::round;

/// An sRGB color with 8-bit channels and a floating point alpha in `0..=1`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha, `0.0` fully transparent to `1.0` fully opaque.
    pub a: f64,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0.0);

    /// A color from channels and alpha.
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// A fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// This color with its alpha replaced.
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// This color with its lightness shifted by `amount` in HSL space.
    ///
    /// Positive amounts lighten, negative darken; the result is clamped to
    /// the valid lightness range. Alpha is preserved.
    pub fn shift_lightness(self, amount: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        let shifted = Self::from_hsl(h, s, (l + amount).clamp(0.0, 1.0));
        shifted.with_alpha(self.a)
    }

    /// Hue (degrees), saturation, and lightness (both `0..=1`).
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s, l)
    }

    /// An opaque color from hue (degrees), saturation, and lightness.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        fn hue_channel(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        }
        if s == 0.0 {
            let c = channel_from_unit(l);
            return Self::opaque(c, c, c);
        }
        // Wrap the hue into a turn; `%` can leave a negative remainder.
        let mut h = h % 360.0;
        if h < 0.0 {
            h += 360.0;
        }
        let h = h / 360.0;
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::opaque(
            channel_from_unit(hue_channel(p, q, h + 1.0 / 3.0)),
            channel_from_unit(hue_channel(p, q, h)),
            channel_from_unit(hue_channel(p, q, h - 1.0 / 3.0)),
        )
    }
}

#[allow(clippy::cast_possible_truncation, reason = "clamped before the cast")]
#[allow(clippy::cast_sign_loss, reason = "clamped before the cast")]
fn channel_from_unit(v: f64) -> u8 {
    round(v * 255.0).clamp(0.0, 255.0) as u8
}

/// Source-over compositing of `fg` on top of `bg`.
///
/// A fully opaque foreground returns itself; a fully transparent pair
/// returns [`Rgba::TRANSPARENT`].
pub fn combine_colors(fg: Rgba, bg: Rgba) -> Rgba {
    let a = fg.a + bg.a * (1.0 - fg.a);
    if a == 0.0 {
        return Rgba::TRANSPARENT;
    }
    let blend = |f: u8, b: u8| {
        let f = f64::from(f);
        let b = f64::from(b);
        channel_from_unit((f * fg.a + b * bg.a * (1.0 - fg.a)) / a / 255.0)
    };
    Rgba::new(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b), a)
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Error parsing a color string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorParseError {
    /// The string matched no supported syntax.
    UnknownFormat,
    /// A hex form had the wrong number of digits or a non-hex digit.
    InvalidHex,
    /// An `rgb()`/`rgba()` component was missing or out of range.
    InvalidComponent,
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFormat => write!(f, "unrecognized color syntax"),
            Self::InvalidHex => write!(f, "invalid hex color"),
            Self::InvalidComponent => write!(f, "invalid color component"),
        }
    }
}

impl core::error::Error for ColorParseError {}

impl FromStr for Rgba {
    type Err = ColorParseError;

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)`, and the keywords `transparent`, `black`, and
    /// `white`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_components(body);
        }
        match s {
            "transparent" => Ok(Self::TRANSPARENT),
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::WHITE),
            _ => Err(ColorParseError::UnknownFormat),
        }
    }
}

fn parse_hex(hex: &str) -> Result<Rgba, ColorParseError> {
    fn nibble(c: u8) -> Result<u8, ColorParseError> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(ColorParseError::InvalidHex),
        }
    }
    let d = hex.as_bytes();
    let (r, g, b, a) = match d.len() {
        3 | 4 => {
            let wide = |i: usize| nibble(d[i]).map(|n| n * 17);
            (
                wide(0)?,
                wide(1)?,
                wide(2)?,
                if d.len() == 4 { wide(3)? } else { 255 },
            )
        }
        6 | 8 => {
            let byte = |i: usize| Ok::<u8, ColorParseError>(nibble(d[i])? * 16 + nibble(d[i + 1])?);
            (
                byte(0)?,
                byte(2)?,
                byte(4)?,
                if d.len() == 8 { byte(6)? } else { 255 },
            )
        }
        _ => return Err(ColorParseError::InvalidHex),
    };
    Ok(Rgba::new(r, g, b, f64::from(a) / 255.0))
}

fn parse_components(body: &str) -> Result<Rgba, ColorParseError> {
    let mut parts = body.split(',').map(str::trim);
    let mut channel = || {
        parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or(ColorParseError::InvalidComponent)
    };
    let (r, g, b) = (channel()?, channel()?, channel()?);
    let a = match parts.next() {
        Some(p) => {
            let a: f64 = p.parse().map_err(|_| ColorParseError::InvalidComponent)?;
            if !(0.0..=1.0).contains(&a) {
                return Err(ColorParseError::InvalidComponent);
            }
            a
        }
        None => 1.0,
    };
    if parts.next().is_some() {
        return Err(ColorParseError::InvalidComponent);
    }
    Ok(Rgba::new(r, g, b, a))
}

// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! WCAG 2 luminance, contrast ratios, and readable text color selection.

use crate::powf;
use crate::rgba::{ColorParseError, Rgba, combine_colors};

/// Alpha below which a fill is not trusted as a text backdrop.
///
/// A fill this transparent is dominated by whatever sits behind it, so
/// [`fill_text_color`] measures contrast against the container background
/// instead.
pub const TRANSPARENT_LIMIT: f64 = 0.6;

/// WCAG 2 relative luminance of a color, ignoring alpha.
///
/// `0.0` for black through `1.0` for white.
pub fn relative_luminance(color: Rgba) -> f64 {
    fn linearize(channel: u8) -> f64 {
        let c = f64::from(channel) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            powf((c + 0.055) / 1.055, 2.4)
        }
    }
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// WCAG 2 contrast ratio between two colors, in `1.0..=21.0`.
///
/// Symmetric in its arguments; alpha is ignored, so composite translucent
/// layers with [`combine_colors`] first.
pub fn contrast_ratio(a: Rgba, b: Rgba) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// White or black, whichever contrasts more with `background`.
pub fn high_contrast_color(background: Rgba) -> Rgba {
    if contrast_ratio(Rgba::WHITE, background) >= contrast_ratio(Rgba::BLACK, background) {
        Rgba::WHITE
    } else {
        Rgba::BLACK
    }
}

/// Pick a readable text color for content drawn on `background`.
///
/// When `background` is more transparent than [`TRANSPARENT_LIMIT`] it is
/// replaced by `fallback`, the container background. A translucent
/// `foreground` layer (a hover veil, say) is composited over the backdrop
/// before contrast is measured. The result is always [`Rgba::WHITE`] or
/// [`Rgba::BLACK`].
pub fn fill_text_color(fallback: Rgba, foreground: Option<Rgba>, background: Rgba) -> Rgba {
    let backdrop = if background.a < TRANSPARENT_LIMIT {
        fallback
    } else {
        background
    };
    let base = match foreground {
        Some(fg) => combine_colors(fg, backdrop),
        None => backdrop,
    };
    high_contrast_color(base)
}

/// [`fill_text_color`] over CSS color strings.
pub fn fill_text_color_str(
    fallback: &str,
    foreground: Option<&str>,
    background: &str,
) -> Result<Rgba, ColorParseError> {
    let fg = foreground.map(str::parse).transpose()?;
    Ok(fill_text_color(fallback.parse()?, fg, background.parse()?))
}

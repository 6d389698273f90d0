// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Color: fill assignment and text contrast for partition charts.
//!
//! Two concerns live here:
//!
//! - **Fill assignment** ([`assign_colors`]): every node in a
//!   [`RollupTree`](canopy_rollup::RollupTree) gets a deterministic fill.
//!   Depth-1 nodes index a categorical palette by sibling sort position;
//!   deeper nodes derive their fill from the parent's by a lightness shift,
//!   so a branch reads as one hue family.
//! - **Text contrast** ([`fill_text_color`]): picks a readable text color for
//!   a fill, following WCAG 2 relative luminance. Fills more transparent
//!   than [`TRANSPARENT_LIMIT`] are not trusted as a backdrop; the configured
//!   container background is used instead.
//!
//! ```rust
//! use canopy_color::{Rgba, fill_text_color};
//!
//! // A nearly transparent white says nothing about the real backdrop, so the
//! // black container wins and the text comes out white.
//! let bg: Rgba = "rgba(255, 255, 255, 0.2)".parse().unwrap();
//! let text = fill_text_color(Rgba::BLACK, None, bg);
//! assert_eq!(text, Rgba::WHITE);
//! ```
//!
//! This crate is `no_std` and uses `alloc`. It requires either the `std`
//! (default) or `libm` feature for floating point math.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod assign;
mod contrast;
mod rgba;

pub use assign::{
    AssignOptions, DiscretePalette, FillPalette, NodeColors, assign_colors, assign_fill,
};
pub use contrast::{
    TRANSPARENT_LIMIT, contrast_ratio, fill_text_color, fill_text_color_str, high_contrast_color,
    relative_luminance,
};
pub use rgba::{ColorParseError, Rgba, combine_colors};

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("canopy_color requires either the `std` or `libm` feature");

/// `f64::powf`, which is not available in `core`.
#[inline]
pub(crate) fn powf(x: f64, y: f64) -> f64 {
    #[cfg(feature = "std")]
    return x.powf(y);
    #[cfg(all(not(feature = "std"), feature = "libm"))]
    return libm::pow(x, y);
    #[cfg(all(not(feature = "std"), not(feature = "libm")))]
    unreachable!()
}

/// `f64::round`, which is not available in `core`.
#[inline]
pub(crate) fn round(x: f64) -> f64 {
    #[cfg(feature = "std")]
    return x.round();
    #[cfg(all(not(feature = "std"), feature = "libm"))]
    return libm::round(x);
    #[cfg(all(not(feature = "std"), not(feature = "libm")))]
    unreachable!()
}

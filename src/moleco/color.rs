//! Substance colors
//!
//!     A substance's color is a pure function of its identifier text. The text is hashed with
//!     SHA-512 and disjoint slices of the digest pick a point in OkLCh:
//!
//!         - bytes  0..8   hue, uniformly over [0, 360)
//!         - bytes  8..16  lightness, inside the configured lightness range
//!         - bytes 16..24  chroma, inside the configured chroma range
//!         - bytes 24..48  accent hues of the substance's [Scheme]
//!
//!     The ranges keep colors away from near-black, near-white and gray, where swatches stop
//!     being told apart. Narrower ranges separate substances better along hue and use less of
//!     the gamut.
//!
//! Gamut mapping
//!
//!     Not every OkLCh point in the ranges is displayable in sRGB. Such points keep their
//!     lightness and hue, and their chroma is lowered to the largest in-gamut value, found by
//!     binary search. [Color] records both the requested and the mapped chroma.
//!
//!     Nothing here consults a registry or earlier results: two runs on any machine give
//!     bit-identical colors. [ColorCache] memoizes results for callers that see the same
//!     substances often; it never changes them.

use crate::moleco::ast::{ComponentTable, SubstanceIdentifier};
use crate::moleco::error::ParseResult;
use palette::convert::FromColorUnclamped;
use palette::{Clamp, IsWithinBounds, Oklch, Srgb};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::fmt;

/// Iterations of the chroma search; the last step is below 1e-8 of the requested chroma
const GAMUT_SEARCH_STEPS: usize = 28;

/// Complementary hue sits this far from the primary hue, plus up to [COMPLEMENT_SPREAD]
const COMPLEMENT_OFFSET: f32 = 165.0;
const COMPLEMENT_SPREAD: f32 = 30.0;
/// Minimum hue distance between an accent and the hues it sits between
const ACCENT_MARGIN: f32 = 5.0;

/// Inclusive range of a color coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Map `unit` in [0, 1) onto the range
    pub fn at(&self, unit: f64) -> f32 {
        self.min + (self.max - self.min) * unit as f32
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Ranges the color assigner picks lightness and chroma from
///
/// Only valid ranges can be built: [ColorOptions::new] and deserialization both reject
/// inverted ranges and values outside OkLCh's useful domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRanges")]
pub struct ColorOptions {
    lightness: Bounds,
    chroma: Bounds,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            lightness: Bounds::new(0.62, 0.82),
            chroma: Bounds::new(0.09, 0.16),
        }
    }
}

/// Largest chroma accepted in options; sRGB never reaches beyond it
pub const MAX_CHROMA: f32 = 0.4;

impl ColorOptions {
    pub fn new(lightness: Bounds, chroma: Bounds) -> Result<Self, InvalidBounds> {
        check_bounds("lightness", lightness, Bounds::new(0.0, 1.0))?;
        check_bounds("chroma", chroma, Bounds::new(0.0, MAX_CHROMA))?;
        Ok(Self { lightness, chroma })
    }

    pub fn lightness(&self) -> Bounds {
        self.lightness
    }

    pub fn chroma(&self) -> Bounds {
        self.chroma
    }
}

/// Unchecked form of [ColorOptions] as written in configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
struct ColorRanges {
    lightness: Bounds,
    chroma: Bounds,
}

impl Default for ColorRanges {
    fn default() -> Self {
        let defaults = ColorOptions::default();
        Self {
            lightness: defaults.lightness,
            chroma: defaults.chroma,
        }
    }
}

impl TryFrom<ColorRanges> for ColorOptions {
    type Error = InvalidBounds;

    fn try_from(ranges: ColorRanges) -> Result<Self, Self::Error> {
        ColorOptions::new(ranges.lightness, ranges.chroma)
    }
}

fn check_bounds(field: &'static str, bounds: Bounds, domain: Bounds) -> Result<(), InvalidBounds> {
    let valid = bounds.min.is_finite()
        && bounds.max.is_finite()
        && bounds.min <= bounds.max
        && domain.contains(bounds.min)
        && domain.contains(bounds.max);
    if valid {
        Ok(())
    } else {
        Err(InvalidBounds {
            field,
            bounds,
            domain,
        })
    }
}

/// A lightness or chroma range that cannot be used
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidBounds {
    pub field: &'static str,
    pub bounds: Bounds,
    pub domain: Bounds,
}

impl fmt::Display for InvalidBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} range {}..{}: expected min <= max within {}..{}",
            self.field, self.bounds.min, self.bounds.max, self.domain.min, self.domain.max
        )
    }
}

impl std::error::Error for InvalidBounds {}

/// The color of one substance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub lightness: f32,
    /// Chroma picked from the hash, before gamut mapping
    pub chroma: f32,
    /// Hue in degrees, [0, 360)
    pub hue: f32,
    /// Chroma actually displayed; equal to `chroma` unless the point was out of gamut
    pub mapped_chroma: f32,
    /// 8-bit sRGB channels
    pub srgb: [u8; 3],
}

impl Color {
    /// Color at an OkLCh point, gamut mapped into sRGB
    pub fn from_oklch(lightness: f32, chroma: f32, hue: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let mapped_chroma = max_displayable_chroma(lightness, chroma, hue);
        let display: Srgb<u8> =
            Srgb::<f32>::from_color_unclamped(Oklch::new(lightness, mapped_chroma, hue))
                .clamp()
                .into_format();
        Self {
            lightness,
            chroma,
            hue,
            mapped_chroma,
            srgb: [display.red, display.green, display.blue],
        }
    }

    pub fn was_gamut_mapped(&self) -> bool {
        self.mapped_chroma < self.chroma
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        let [red, green, blue] = self.srgb;
        format!("#{:02x}{:02x}{:02x}", red, green, blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} oklch({:.3} {:.3} {:.1})",
            self.to_hex(),
            self.lightness,
            self.mapped_chroma,
            self.hue
        )
    }
}

fn in_gamut(lightness: f32, chroma: f32, hue: f32) -> bool {
    Srgb::<f32>::from_color_unclamped(Oklch::new(lightness, chroma, hue)).is_within_bounds()
}

fn max_displayable_chroma(lightness: f32, chroma: f32, hue: f32) -> f32 {
    if in_gamut(lightness, chroma, hue) {
        return chroma;
    }
    let (mut low, mut high) = (0.0f32, chroma);
    for _ in 0..GAMUT_SEARCH_STEPS {
        let middle = (low + high) / 2.0;
        if in_gamut(lightness, middle, hue) {
            low = middle;
        } else {
            high = middle;
        }
    }
    low
}

/// Four related colors of one substance: its own color, two accents and a complement
///
/// Hues follow the substance's primary hue: the complement lies 165 to 195 degrees away, one
/// accent strictly between primary and complement, the other strictly between complement and
/// primary going on around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scheme {
    pub primary: Color,
    pub first_accent: Color,
    pub second_accent: Color,
    pub complementary: Color,
}

/// Deterministic identifier-to-color mapping for a set of options
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorAssigner {
    options: ColorOptions,
}

impl ColorAssigner {
    pub fn new(options: ColorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ColorOptions {
        &self.options
    }

    pub fn assign(&self, substance: &SubstanceIdentifier) -> Color {
        let digest = Digest512::of(substance);
        let color = self.primary(&digest);
        log::trace!("{} -> {}", substance, color);
        color
    }

    pub fn scheme(&self, substance: &SubstanceIdentifier) -> Scheme {
        let digest = Digest512::of(substance);
        let primary = self.primary(&digest);

        let complement_offset = COMPLEMENT_OFFSET + COMPLEMENT_SPREAD * digest.unit(24) as f32;
        let first_span = complement_offset - 2.0 * ACCENT_MARGIN;
        let second_span = 360.0 - complement_offset - 2.0 * ACCENT_MARGIN;
        let first_offset = ACCENT_MARGIN + first_span * digest.unit(32) as f32;
        let second_offset = complement_offset + ACCENT_MARGIN + second_span * digest.unit(40) as f32;

        let related = |offset: f32| {
            Color::from_oklch(primary.lightness, primary.chroma, primary.hue + offset)
        };
        Scheme {
            primary,
            first_accent: related(first_offset),
            second_accent: related(second_offset),
            complementary: related(complement_offset),
        }
    }

    fn primary(&self, digest: &Digest512) -> Color {
        let hue = 360.0 * digest.unit(0) as f32;
        let lightness = self.options.lightness.at(digest.unit(8));
        let chroma = self.options.chroma.at(digest.unit(16));
        Color::from_oklch(lightness, chroma, hue)
    }
}

struct Digest512([u8; 64]);

impl Digest512 {
    fn of(substance: &SubstanceIdentifier) -> Self {
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&Sha512::digest(substance.as_str().as_bytes()));
        Self(bytes)
    }

    /// Eight bytes starting at `start`, read big-endian, as a fraction in [0, 1)
    fn unit(&self, start: usize) -> f64 {
        let value = self.0[start..start + 8]
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
        // Top 53 bits fit an f64 mantissa exactly, so the result never rounds up to 1
        (value >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Color of a substance with the default options
pub fn assign_color(substance: &SubstanceIdentifier) -> Color {
    ColorAssigner::default().assign(substance)
}

/// Color of raw identifier text; empty text is rejected
pub fn color_for_str(text: &str) -> ParseResult<Color> {
    Ok(assign_color(&SubstanceIdentifier::new(text)?))
}

/// Colors of a component table, indexed like the table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorMap {
    colors: Vec<Color>,
}

impl ColorMap {
    pub fn get(&self, component: usize) -> Option<&Color> {
        self.colors.get(component)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }
}

impl FromIterator<Color> for ColorMap {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}

/// Colors of every component with the default options
pub fn assign_colors(components: &ComponentTable) -> ColorMap {
    assign_colors_with(components, &ColorOptions::default())
}

#[cfg(not(feature = "parallel"))]
pub fn assign_colors_with(components: &ComponentTable, options: &ColorOptions) -> ColorMap {
    let assigner = ColorAssigner::new(*options);
    components
        .iter()
        .map(|substance| assigner.assign(substance))
        .collect()
}

/// Colors of every component, one rayon task per component
#[cfg(feature = "parallel")]
pub fn assign_colors_with(components: &ComponentTable, options: &ColorOptions) -> ColorMap {
    use rayon::prelude::*;

    let assigner = ColorAssigner::new(*options);
    let colors: Vec<Color> = components
        .as_slice()
        .par_iter()
        .map(|substance| assigner.assign(substance))
        .collect();
    ColorMap { colors }
}

/// Memoizes colors by identifier
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    assigner: ColorAssigner,
    colors: HashMap<SubstanceIdentifier, Color>,
}

impl ColorCache {
    pub fn new(options: ColorOptions) -> Self {
        Self {
            assigner: ColorAssigner::new(options),
            colors: HashMap::new(),
        }
    }

    pub fn get_or_assign(&mut self, substance: &SubstanceIdentifier) -> Color {
        if let Some(color) = self.colors.get(substance) {
            return *color;
        }
        let color = self.assigner.assign(substance);
        self.colors.insert(substance.clone(), color);
        color
    }

    /// Colors of a component table, reusing cached substances
    pub fn assign_colors(&mut self, components: &ComponentTable) -> ColorMap {
        components
            .iter()
            .map(|substance| self.get_or_assign(substance))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moleco::testing::factories::table;

    fn substance(text: &str) -> SubstanceIdentifier {
        SubstanceIdentifier::new(text).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let water = substance("H2O/h1H2");
        assert_eq!(assign_color(&water), assign_color(&water));
        assert_eq!(
            ColorAssigner::default().scheme(&water),
            ColorAssigner::default().scheme(&water)
        );
    }

    #[test]
    fn test_digest_slices() {
        let digest = Digest512::of(&substance("H2O/h1H2"));
        assert!((digest.unit(0) - 0.5927337968872803).abs() < 1e-15);
        assert!((digest.unit(8) - 0.5649356013709568).abs() < 1e-15);
        assert!((digest.unit(16) - 0.13855353905040868).abs() < 1e-15);

        let color = assign_color(&substance("H2O/h1H2"));
        assert!((color.hue - 213.3842).abs() < 1e-3, "{}", color);
        assert!((color.lightness - 0.73299).abs() < 1e-4, "{}", color);
        assert!((color.chroma - 0.09970).abs() < 1e-4, "{}", color);
    }

    #[test]
    fn test_coordinates_within_ranges() {
        let options = ColorOptions::default();
        for index in 0..200 {
            let color = assign_color(&substance(&format!("C{}H{}", index, index * 2 + 2)));
            assert!((0.0..360.0).contains(&color.hue), "{}", color);
            assert!(options.lightness().contains(color.lightness), "{}", color);
            assert!(options.chroma().contains(color.chroma), "{}", color);
            assert!(color.mapped_chroma <= color.chroma);
        }
    }

    #[test]
    fn test_gamut_mapping_keeps_lightness_and_hue() {
        // Saturated cyan at high lightness is outside sRGB
        let color = Color::from_oklch(0.8, 0.35, 200.0);
        assert!(color.was_gamut_mapped());
        assert!(color.mapped_chroma > 0.0);
        assert!(in_gamut(0.8, color.mapped_chroma, 200.0));
        assert_eq!(color.lightness, 0.8);
        assert_eq!(color.hue, 200.0);

        let gray = Color::from_oklch(0.7, 0.0, 0.0);
        assert!(!gray.was_gamut_mapped());
        assert_eq!(gray.srgb[0], gray.srgb[1]);
        assert_eq!(gray.srgb[1], gray.srgb[2]);
    }

    #[test]
    fn test_hex() {
        let color = Color {
            lightness: 0.0,
            chroma: 0.0,
            hue: 0.0,
            mapped_chroma: 0.0,
            srgb: [255, 8, 160],
        };
        assert_eq!(color.to_hex(), "#ff08a0");
    }

    #[test]
    fn test_scheme_hue_layout() {
        for text in ["H2O/h1H2", "CH4O/c1-2/h2H,1H3", "CH2O/c1-2/h1H2", "ClH.Na/h1H;/q;+1/p-1"] {
            let scheme = ColorAssigner::default().scheme(&substance(text));
            let offset = |color: &Color| (color.hue - scheme.primary.hue).rem_euclid(360.0);

            let complement = offset(&scheme.complementary);
            assert!((165.0..=195.0).contains(&complement), "{text}: {complement}");
            let first = offset(&scheme.first_accent);
            assert!(first > 0.0 && first < complement, "{text}: {first}");
            let second = offset(&scheme.second_accent);
            assert!(second > complement && second < 360.0, "{text}: {second}");
        }
    }

    #[test]
    fn test_color_for_str_rejects_empty() {
        assert_eq!(color_for_str("").unwrap_err().kind(), "EmptyIdentifier");
        assert_eq!(
            color_for_str("H2O/h1H2").unwrap(),
            assign_color(&substance("H2O/h1H2"))
        );
    }

    #[test]
    fn test_color_map_follows_table() {
        let components = table(&["H2O/h1H2", "CH4O/c1-2/h2H,1H3"]);
        let colors = assign_colors(&components);
        assert_eq!(colors.len(), 2);
        for (index, substance) in components.iter().enumerate() {
            assert_eq!(colors.get(index), Some(&assign_color(substance)));
        }
    }

    #[test]
    fn test_cache_matches_direct_assignment() {
        let components = table(&["H2O/h1H2", "CH4O/c1-2/h2H,1H3", "H2O/h1H2"]);
        let mut cache = ColorCache::default();
        let cached = cache.assign_colors(&components);
        assert_eq!(cached, assign_colors(&components));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_options_validation() {
        let defaults = ColorOptions::default();
        assert_eq!(
            ColorOptions::new(defaults.lightness(), defaults.chroma()),
            Ok(defaults)
        );

        let error = ColorOptions::new(Bounds::new(0.8, 0.6), defaults.chroma()).unwrap_err();
        assert_eq!(error.field, "lightness");

        let error = ColorOptions::new(defaults.lightness(), Bounds::new(0.1, 0.9)).unwrap_err();
        assert_eq!(error.field, "chroma");

        let error = ColorOptions::new(Bounds::new(f32::NAN, 0.7), defaults.chroma()).unwrap_err();
        assert_eq!(error.field, "lightness");
    }

    #[test]
    fn test_deserialization_validates() {
        let options: ColorOptions =
            serde_json::from_str(r#"{"chroma": {"min": 0.05, "max": 0.1}}"#).unwrap();
        assert_eq!(options.lightness(), ColorOptions::default().lightness());
        assert_eq!(options.chroma(), Bounds::new(0.05, 0.1));

        let error = serde_json::from_str::<ColorOptions>(r#"{"lightness": {"min": 0.9, "max": 0.2}}"#)
            .unwrap_err();
        assert!(error.to_string().contains("Invalid lightness range"), "{}", error);
    }

    #[test]
    fn test_narrow_options_are_honored() {
        let options = ColorOptions::new(Bounds::new(0.5, 0.5), Bounds::new(0.05, 0.05)).unwrap();
        let color = ColorAssigner::new(options).assign(&substance("H2O/h1H2"));
        assert_eq!(color.lightness, 0.5);
        assert_eq!(color.chroma, 0.05);
    }
}

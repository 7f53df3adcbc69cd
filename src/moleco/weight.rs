//! Weight literals of the weighting section
//!
//!     A weight literal is a compact `<mantissa><kind><exponent>` token, for example `37wf-2`
//!     (37 × 10⁻² by weight) or `10:15pp0` (somewhere between 10 and 15 percent). An empty
//!     slot in the weighting section is an unknown weight.
//!
//! Kinds
//!
//!     The kind tag is drawn from a fixed vocabulary:
//!
//!         - wf: weight fraction                     mantissa × 10^exp of the whole
//!         - wv: weight by volume                    mantissa × 10^exp of the whole
//!         - rf: volume fraction                     mantissa × 10^exp of the whole
//!         - mf: mole fraction                       mantissa × 10^exp of the whole
//!         - pp: percentage points                   mantissa percent of the whole
//!         - mr: molar ratio                         relative amount only
//!         - vp: volume parts                        relative amount only
//!         - mb: molality                            relative amount only
//!
//!     Percentage points are read on the scale of the largest exponent among their percentage
//!     siblings: the mantissa at that exponent is a percent, and each step below it divides by
//!     ten. `30pp1` alone is thirty percent; `5:7pp1` next to `1:5pp0` is 6% against 0.3%.
//!
//!     Kinds with a known share of the whole are "absolute"; they allow the normalizer to hand
//!     the remaining share to unknown siblings. Relative kinds only compare against their
//!     siblings.

use crate::moleco::error::{ParseError, ParseResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Splits a literal at its first alphabetic run: mantissa, kind tag, exponent
static LITERAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<mantissa>[^a-zA-Z]*)(?P<tag>[a-zA-Z]+)(?P<exponent>.*)$").unwrap()
});

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());

static EXPONENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// The unit tag of a weight value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKind {
    WeightFraction,
    WeightByVolume,
    PercentagePoints,
    MolarRatio,
    VolumeFraction,
    MoleFraction,
    VolumeParts,
    Molality,
}

impl WeightKind {
    pub const ALL: [WeightKind; 8] = [
        WeightKind::WeightFraction,
        WeightKind::WeightByVolume,
        WeightKind::PercentagePoints,
        WeightKind::MolarRatio,
        WeightKind::VolumeFraction,
        WeightKind::MoleFraction,
        WeightKind::VolumeParts,
        WeightKind::Molality,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            WeightKind::WeightFraction => "wf",
            WeightKind::WeightByVolume => "wv",
            WeightKind::PercentagePoints => "pp",
            WeightKind::MolarRatio => "mr",
            WeightKind::VolumeFraction => "rf",
            WeightKind::MoleFraction => "mf",
            WeightKind::VolumeParts => "vp",
            WeightKind::Molality => "mb",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        WeightKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether a value of this kind states its share of the whole
    pub fn is_absolute(self) -> bool {
        !matches!(
            self,
            WeightKind::MolarRatio | WeightKind::VolumeParts | WeightKind::Molality
        )
    }
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Numeric part of a weight: a single value or an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mantissa {
    Exact(f64),
    Range { low: f64, high: f64 },
}

impl Mantissa {
    /// The value used for proportions; ranges count as their midpoint
    pub fn value(&self) -> f64 {
        match *self {
            Mantissa::Exact(value) => value,
            Mantissa::Range { low, high } => (low + high) / 2.0,
        }
    }
}

impl fmt::Display for Mantissa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mantissa::Exact(value) => write!(f, "{}", value),
            Mantissa::Range { low, high } => write!(f, "{}:{}", low, high),
        }
    }
}

/// A known weight: `mantissa × 10^exponent` of the given kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weight {
    pub kind: WeightKind,
    pub mantissa: Mantissa,
    pub exponent: i32,
}

impl Weight {
    pub fn new(kind: WeightKind, mantissa: f64, exponent: i32) -> Self {
        Self {
            kind,
            mantissa: Mantissa::Exact(mantissa),
            exponent,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.mantissa.value() * 10f64.powi(self.exponent)
    }

    /// Share of the parent this weight claims, for absolute kinds
    ///
    /// Percentage points are read against `percentage_exponent`, the largest exponent among
    /// the percentage siblings (see [percentage_exponent]). Other kinds ignore it.
    pub fn fraction_of_whole(&self, percentage_exponent: i32) -> Option<f64> {
        match self.kind {
            WeightKind::PercentagePoints => {
                let shift = self.exponent.saturating_sub(percentage_exponent);
                Some(self.mantissa.value() * 10f64.powi(shift) / 100.0)
            }
            kind if kind.is_absolute() => Some(self.magnitude()),
            _ => None,
        }
    }

    /// Parse a literal located at `offset` in the identifier text
    pub fn parse_at(literal: &str, offset: usize) -> ParseResult<Self> {
        let malformed = |reason: &str| ParseError::MalformedWeight {
            literal: literal.to_string(),
            offset,
            reason: reason.to_string(),
        };

        let captures = LITERAL_REGEX
            .captures(literal)
            .ok_or_else(|| malformed("missing kind tag"))?;
        let tag = &captures["tag"];
        let kind = WeightKind::from_tag(tag).ok_or_else(|| ParseError::UnknownWeightKind {
            tag: tag.to_string(),
            literal: literal.to_string(),
            offset,
        })?;

        let mantissa = parse_mantissa(&captures["mantissa"])
            .ok_or_else(|| malformed("mantissa is not a number or range"))?;

        let exponent_text = &captures["exponent"];
        if !EXPONENT_REGEX.is_match(exponent_text) {
            return Err(malformed("exponent is not a signed integer"));
        }
        let exponent = exponent_text
            .parse::<i32>()
            .map_err(|_| malformed("exponent out of range"))?;

        Ok(Self {
            kind,
            mantissa,
            exponent,
        })
    }
}

/// Largest exponent among the percentage-point weights of one sibling set, 0 if there are none
pub fn percentage_exponent<'a>(weights: impl IntoIterator<Item = &'a Weight>) -> i32 {
    weights
        .into_iter()
        .filter(|weight| weight.kind == WeightKind::PercentagePoints)
        .map(|weight| weight.exponent)
        .max()
        .unwrap_or(0)
}

fn parse_mantissa(text: &str) -> Option<Mantissa> {
    let number = |part: &str| -> Option<f64> {
        if NUMBER_REGEX.is_match(part) {
            part.parse::<f64>().ok()
        } else {
            None
        }
    };

    match text.split_once(':') {
        Some((low, high)) => Some(Mantissa::Range {
            low: number(low)?,
            high: number(high)?,
        }),
        None => number(text).map(Mantissa::Exact),
    }
}

impl FromStr for Weight {
    type Err = ParseError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        Weight::parse_at(literal, 0)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.mantissa, self.kind, self.exponent)
    }
}

/// Weight attached to a mixture node; empty slots are `Unknown`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightDescriptor {
    #[default]
    Unknown,
    Known(Weight),
}

impl WeightDescriptor {
    /// Parse a weighting-section payload; an empty payload is `Unknown`
    pub fn parse_at(literal: &str, offset: usize) -> ParseResult<Self> {
        if literal.is_empty() {
            return Ok(WeightDescriptor::Unknown);
        }
        Weight::parse_at(literal, offset).map(WeightDescriptor::Known)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, WeightDescriptor::Known(_))
    }

    pub fn weight(&self) -> Option<&Weight> {
        match self {
            WeightDescriptor::Known(weight) => Some(weight),
            WeightDescriptor::Unknown => None,
        }
    }
}

impl fmt::Display for WeightDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightDescriptor::Known(weight) => write!(f, "{}", weight),
            WeightDescriptor::Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_fraction() {
        let weight: Weight = "37wf-2".parse().unwrap();
        assert_eq!(weight.kind, WeightKind::WeightFraction);
        assert_eq!(weight.mantissa, Mantissa::Exact(37.0));
        assert_eq!(weight.exponent, -2);
        assert!((weight.magnitude() - 0.37).abs() < 1e-12);
        assert!((weight.fraction_of_whole(0).unwrap() - 0.37).abs() < 1e-12);
        assert_eq!(weight.fraction_of_whole(3), weight.fraction_of_whole(0));
    }

    #[test]
    fn test_range_takes_midpoint() {
        let weight: Weight = "5:7wf-3".parse().unwrap();
        assert_eq!(weight.mantissa, Mantissa::Range { low: 5.0, high: 7.0 });
        assert_eq!(weight.mantissa.value(), 6.0);

        let weight: Weight = "10:15pp0".parse().unwrap();
        assert_eq!(weight.mantissa.value(), 12.5);
    }

    #[test]
    fn test_percentage_points_read_at_sibling_scale() {
        let coarse: Weight = "30pp1".parse().unwrap();
        let fine: Weight = "30pp0".parse().unwrap();
        assert_eq!(coarse.magnitude(), 300.0);

        // Alone, each reads as thirty percent
        assert!((coarse.fraction_of_whole(1).unwrap() - 0.3).abs() < 1e-12);
        assert!((fine.fraction_of_whole(0).unwrap() - 0.3).abs() < 1e-12);
        // Next to an exponent-1 sibling the finer one is ten times smaller
        assert!((fine.fraction_of_whole(1).unwrap() - 0.03).abs() < 1e-12);

        let scale = percentage_exponent([&coarse, &fine]);
        assert_eq!(scale, 1);
        let isomer: Weight = "1:5pp0".parse().unwrap();
        let hexane: Weight = "5:7pp1".parse().unwrap();
        let ratio = hexane.fraction_of_whole(1).unwrap() / isomer.fraction_of_whole(1).unwrap();
        assert!((ratio - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_exponent_ignores_other_kinds() {
        let weights: Vec<Weight> = ["3wf2", "1pp-1", "7vp4"]
            .iter()
            .map(|literal| literal.parse().unwrap())
            .collect();
        assert_eq!(percentage_exponent(&weights), -1);
        assert_eq!(percentage_exponent(&weights[..1]), 0);
    }

    #[test]
    fn test_extreme_exponents_do_not_overflow() {
        let weight = Weight::new(WeightKind::PercentagePoints, 5.0, i32::MIN);
        let fraction = weight.fraction_of_whole(i32::MAX).unwrap();
        assert!(fraction.is_finite() && fraction < 1e-300);
    }

    #[test]
    fn test_relative_kinds_have_no_fraction() {
        for literal in ["1mr0", "7vp0", "55mb-1"] {
            let weight: Weight = literal.parse().unwrap();
            assert!(!weight.kind.is_absolute());
            assert_eq!(weight.fraction_of_whole(0), None);
        }
    }

    #[test]
    fn test_every_tag_round_trips() {
        for kind in WeightKind::ALL {
            assert_eq!(WeightKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn test_display_matches_notation() {
        for literal in ["37wf-2", "10:15pp0", "7vp0", "117wf-3"] {
            let weight: Weight = literal.parse().unwrap();
            assert_eq!(weight.to_string(), literal);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let error = Weight::parse_at("12xx0", 9).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnknownWeightKind {
                tag: "xx".to_string(),
                literal: "12xx0".to_string(),
                offset: 9,
            }
        );
    }

    #[test]
    fn test_malformed_weights() {
        for literal in ["wf-2", "3.wf0", "1:2:3pp0", "37wf", "37wf-", "37wf2.5", "12"] {
            let error = Weight::parse_at(literal, 0).unwrap_err();
            assert_eq!(error.kind(), "MalformedWeight", "literal {literal}");
        }
    }

    #[test]
    fn test_empty_payload_is_unknown() {
        assert_eq!(
            WeightDescriptor::parse_at("", 3).unwrap(),
            WeightDescriptor::Unknown
        );
        assert!(WeightDescriptor::parse_at("6pp1", 3).unwrap().is_known());
    }
}

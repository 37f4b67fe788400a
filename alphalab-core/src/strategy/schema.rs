//! Parameter schemas and typed parameter values.
//!
//! Every strategy declares an ordered [`ParamSchema`]: one [`ParamSpec`] per
//! parameter, carrying its value shape (indicator vs. scalar), its distance
//! metric for run comparison, and its default. `cost_per_trade` appears in
//! every schema with `DistanceMetric::None`; it is excluded from both
//! optimizer sampling and distance computation.
//!
//! Parameter values are typed ([`ParamValue`]) end to end. They render to a
//! stable external form (`"SMA, 20"`, `"0.05"`) only at storage boundaries
//! and come back through the total parser in `FromStr` — there is no
//! substring sniffing anywhere downstream.

use crate::error::CoreError;
use crate::indicators::{IndicatorKey, IndicatorKind};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the fee parameter present in every schema.
pub const COST_PER_TRADE: &str = "cost_per_trade";

/// How a parameter contributes to the input-distance metric between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Indicator parameters: kind mismatch plus window distance.
    Discrete,
    /// Scalar parameters: exponential distance on the value.
    Exponential,
    /// Excluded from the metric entirely.
    None,
}

/// Value shape of a parameter, with its default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Indicator {
        allowed: &'static [IndicatorKind],
        default: (IndicatorKind, usize),
    },
    Scalar {
        default: f64,
    },
}

/// One parameter descriptor in a strategy's schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub metric: DistanceMetric,
    pub step: f64,
}

impl ParamSpec {
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Indicator {
                default: (kind, window),
                ..
            } => ParamValue::Indicator(kind, window),
            ParamKind::Scalar { default } => ParamValue::Scalar(default),
        }
    }
}

/// Ordered parameter schema for one strategy.
#[derive(Debug, Clone, Copy)]
pub struct ParamSchema {
    pub params: &'static [ParamSpec],
}

impl ParamSchema {
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }

    /// Parameters that participate in sampling and distance computation:
    /// everything except `cost_per_trade`.
    pub fn compared(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|spec| spec.name != COST_PER_TRADE)
    }

    /// Defaults for every parameter, in schema order.
    pub fn default_set(&self) -> ParamSet {
        let mut set = ParamSet::new();
        for spec in self.params {
            set.insert(spec.name, spec.default_value());
        }
        set
    }
}

/// A typed parameter value: an indicator selection or a scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Indicator(IndicatorKind, usize),
    Scalar(f64),
}

impl ParamValue {
    pub fn as_indicator(&self) -> Option<(IndicatorKind, usize)> {
        match self {
            ParamValue::Indicator(kind, window) => Some((*kind, *window)),
            ParamValue::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Indicator(..) => None,
        }
    }

    pub fn as_key(&self) -> Option<IndicatorKey> {
        self.as_indicator()
            .map(|(kind, window)| IndicatorKey::new(kind, window))
    }
}

impl fmt::Display for ParamValue {
    /// The stable external representation used at storage boundaries.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Indicator(kind, window) => write!(f, "{kind}, {window}"),
            ParamValue::Scalar(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse parameter value '{0}'")]
pub struct ParseParamValueError(pub String);

impl FromStr for ParamValue {
    type Err = ParseParamValueError;

    /// Total parser for the external form: `"KIND, window"` for indicators,
    /// a float for scalars. Anything else is an error, never a passthrough.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseParamValueError(s.to_string());
        if s.contains(',') {
            let mut parts = s.splitn(2, ',');
            let kind: IndicatorKind = parts
                .next()
                .map(str::trim)
                .ok_or_else(err)?
                .parse()
                .map_err(|_: CoreError| err())?;
            let window: usize = parts
                .next()
                .map(str::trim)
                .ok_or_else(err)?
                .parse()
                .map_err(|_| err())?;
            Ok(ParamValue::Indicator(kind, window))
        } else {
            s.trim()
                .parse::<f64>()
                .map(ParamValue::Scalar)
                .map_err(|_| err())
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Ordered name → value mapping, as drawn by the sampler or supplied by a
/// caller. Insertion order is preserved; inserting an existing name replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    values: Vec<(String, ParamValue)>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn indicator(&self, name: &str) -> Option<(IndicatorKind, usize)> {
        self.get(name).and_then(ParamValue::as_indicator)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_scalar)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ParamValue)> for ParamSet {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        let mut set = ParamSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_value_roundtrips() {
        let value = ParamValue::Indicator(IndicatorKind::Sma, 20);
        assert_eq!(value.to_string(), "SMA, 20");
        assert_eq!("SMA, 20".parse::<ParamValue>().unwrap(), value);
    }

    #[test]
    fn scalar_value_roundtrips() {
        let value = ParamValue::Scalar(0.05);
        assert_eq!(value.to_string(), "0.05");
        assert_eq!("0.05".parse::<ParamValue>().unwrap(), value);
    }

    #[test]
    fn parser_is_total() {
        assert!("garbage".parse::<ParamValue>().is_err());
        assert!("SMA, x".parse::<ParamValue>().is_err());
        assert!("WMA, 20".parse::<ParamValue>().is_err());
        assert!("SMA, 20, 5".parse::<ParamValue>().is_err());
        assert!("".parse::<ParamValue>().is_err());
    }

    #[test]
    fn parser_tolerates_spacing() {
        assert_eq!(
            "EMA,7".parse::<ParamValue>().unwrap(),
            ParamValue::Indicator(IndicatorKind::Ema, 7)
        );
        assert_eq!(
            "  0.5 ".parse::<ParamValue>().unwrap(),
            ParamValue::Scalar(0.5)
        );
    }

    #[test]
    fn serde_uses_the_external_form() {
        let value = ParamValue::Indicator(IndicatorKind::Rsi, 14);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"RSI, 14\"");
        let back: ParamValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn param_set_preserves_order_and_replaces() {
        let mut set = ParamSet::new();
        set.insert("indicator", ParamValue::Indicator(IndicatorKind::Sma, 10));
        set.insert("margin", ParamValue::Scalar(0.05));
        set.insert("indicator", ParamValue::Indicator(IndicatorKind::Ema, 12));

        let names: Vec<&str> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["indicator", "margin"]);
        assert_eq!(set.indicator("indicator"), Some((IndicatorKind::Ema, 12)));
        assert_eq!(set.scalar("margin"), Some(0.05));
        assert_eq!(set.scalar("indicator"), None);
    }
}

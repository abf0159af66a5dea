//! Frequency (count) encoding of categorical columns.

use super::{not_fitted, Transformer};
use crate::table::{Column, Frame};
use fd_common::{Error, Result};
use std::collections::HashMap;

/// Replaces each category with its share (or count) in the fitted data.
///
/// Keeps dimensionality flat on high-cardinality features such as
/// merchant or account identifiers. Numeric columns can be listed
/// explicitly; their values are keyed by their text form.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEncoder {
    columns: Option<Vec<String>>,
    normalize: bool,
    maps: Option<Vec<(String, HashMap<String, f64>)>>,
}

impl FrequencyEncoder {
    /// `columns = None` encodes every categorical column seen at fit time.
    pub fn new(columns: Option<Vec<String>>, normalize: bool) -> Self {
        Self {
            columns,
            normalize,
            maps: None,
        }
    }

    /// Value for unseen or missing categories.
    pub fn fill_value(&self) -> f64 {
        if self.normalize {
            0.0
        } else {
            1.0
        }
    }

    /// Learned frequencies for one column.
    pub fn frequencies(&self, column: &str) -> Option<&HashMap<String, f64>> {
        self.maps
            .as_ref()?
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, map)| map)
    }

    /// Columns encoded by the fitted encoder.
    pub fn fitted_columns(&self) -> Vec<&str> {
        self.maps
            .iter()
            .flatten()
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn cell_keys(column: &Column) -> Vec<Option<String>> {
    match column {
        Column::Categorical(v) => v.clone(),
        Column::Numeric(v) => v.iter().map(|c| c.map(|x| x.to_string())).collect(),
    }
}

impl Transformer for FrequencyEncoder {
    fn name(&self) -> &'static str {
        "frequency_encoder"
    }

    fn fit(&mut self, frame: &Frame) -> Result<()> {
        let columns = match &self.columns {
            Some(cols) => cols.clone(),
            None => frame.categorical_column_names(),
        };
        let mut maps = Vec::with_capacity(columns.len());
        for name in columns {
            let column = frame
                .column(&name)
                .ok_or_else(|| Error::UnknownColumn { name: name.clone() })?;
            let mut counts: HashMap<String, f64> = HashMap::new();
            let mut total = 0usize;
            for key in cell_keys(column).into_iter().flatten() {
                *counts.entry(key).or_insert(0.0) += 1.0;
                total += 1;
            }
            if self.normalize && total > 0 {
                for v in counts.values_mut() {
                    *v /= total as f64;
                }
            }
            maps.push((name, counts));
        }
        self.maps = Some(maps);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let maps = self.maps.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let fill = self.fill_value();
        let mut out = frame.clone();
        for (name, map) in maps {
            let column = frame
                .column(name)
                .ok_or_else(|| Error::UnknownColumn { name: name.clone() })?;
            let encoded = cell_keys(column)
                .into_iter()
                .map(|key| Some(key.and_then(|k| map.get(&k).copied()).unwrap_or(fill)))
                .collect();
            out.set_column(name.clone(), Column::Numeric(encoded))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Frame {
        Frame::new()
            .with_column("color", Column::from_strs(["red", "red", "blue", "green", "red"]))
            .unwrap()
            .with_column("x", Column::from_f64([1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap()
    }

    #[test]
    fn test_normalized_frequencies() {
        let mut enc = FrequencyEncoder::new(None, true);
        let out = enc.fit_transform(&colors()).unwrap();
        assert_eq!(
            out.numeric("color").unwrap(),
            &[Some(0.6), Some(0.6), Some(0.2), Some(0.2), Some(0.6)]
        );
        // Numeric columns are left alone by default.
        assert_eq!(out.column("x"), colors().column("x"));
        assert_eq!(enc.fitted_columns(), vec!["color"]);
    }

    #[test]
    fn test_counts_and_unseen() {
        let mut enc = FrequencyEncoder::new(Some(vec!["color".into()]), false);
        enc.fit(&colors()).unwrap();
        assert_eq!(enc.frequencies("color").unwrap()["red"], 3.0);

        let new = Frame::new()
            .with_column(
                "color",
                Column::Categorical(vec![Some("blue".into()), Some("purple".into()), None]),
            )
            .unwrap();
        let out = enc.transform(&new).unwrap();
        assert_eq!(out.numeric("color").unwrap(), &[Some(1.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_unseen_normalized_is_zero() {
        let mut enc = FrequencyEncoder::new(None, true);
        enc.fit(&colors()).unwrap();
        let new = Frame::new()
            .with_column("color", Column::Categorical(vec![Some("teal".into()), None]))
            .unwrap();
        let out = enc.transform(&new).unwrap();
        assert_eq!(out.numeric("color").unwrap(), &[Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_cells_excluded_from_denominator() {
        let frame = Frame::new()
            .with_column(
                "c",
                Column::Categorical(vec![Some("a".into()), None, Some("b".into()), Some("a".into())]),
            )
            .unwrap();
        let mut enc = FrequencyEncoder::new(None, true);
        enc.fit(&frame).unwrap();
        let map = enc.frequencies("c").unwrap();
        assert!((map["a"] - 2.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_explicit_numeric_column() {
        let mut enc = FrequencyEncoder::new(Some(vec!["x".into()]), false);
        let out = enc.fit_transform(&colors()).unwrap();
        assert_eq!(out.numeric("x").unwrap()[0], Some(1.0));
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let enc = FrequencyEncoder::new(None, true);
        assert!(matches!(enc.transform(&colors()), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_unknown_column() {
        let mut enc = FrequencyEncoder::new(Some(vec!["nope".into()]), true);
        assert!(matches!(enc.fit(&colors()), Err(Error::UnknownColumn { .. })));
    }
}

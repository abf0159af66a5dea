//! Clipping numeric columns to bounds learned at fit time.

use super::{not_fitted, Transformer};
use crate::table::{Column, Frame};
use fd_common::{Error, Result};
use fd_math::{percentile_sorted, sorted_copy};
use serde::{Deserialize, Serialize};

/// How clip bounds are derived from the fitted data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ClipMethod {
    /// `[Q1 - factor * IQR, Q3 + factor * IQR]`.
    Iqr { factor: f64 },
    /// `[P_lower, P_upper]`, percentiles in `[0, 100]`.
    Percentile { lower: f64, upper: f64 },
}

impl Default for ClipMethod {
    fn default() -> Self {
        ClipMethod::Iqr { factor: 1.5 }
    }
}

impl ClipMethod {
    /// Percentile bounds with the usual 1st / 99th cut.
    pub fn default_percentile() -> Self {
        ClipMethod::Percentile {
            lower: 1.0,
            upper: 99.0,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            ClipMethod::Iqr { factor } => {
                if !(factor.is_finite() && factor >= 0.0) {
                    return Err(Error::invalid(format!(
                        "IQR factor must be a non-negative number, got {}",
                        factor
                    )));
                }
            }
            ClipMethod::Percentile { lower, upper } => {
                let in_range = |q: f64| (0.0..=100.0).contains(&q);
                if !(in_range(lower) && in_range(upper) && lower <= upper) {
                    return Err(Error::invalid(format!(
                        "percentile bounds must satisfy 0 <= lower <= upper <= 100, got {} and {}",
                        lower, upper
                    )));
                }
            }
        }
        Ok(())
    }

    fn bounds(&self, sorted: &[f64]) -> (f64, f64) {
        match *self {
            ClipMethod::Iqr { factor } => {
                let q1 = percentile_sorted(sorted, 25.0);
                let q3 = percentile_sorted(sorted, 75.0);
                let iqr = q3 - q1;
                (q1 - factor * iqr, q3 + factor * iqr)
            }
            ClipMethod::Percentile { lower, upper } => (
                percentile_sorted(sorted, lower),
                percentile_sorted(sorted, upper),
            ),
        }
    }
}

/// Learned bounds for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipBounds {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
}

/// Clamps numeric columns into per-column bounds.
///
/// Missing cells stay missing. A column with no values at fit time gets no
/// bounds and passes through unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutlierClipper {
    method: ClipMethod,
    columns: Option<Vec<String>>,
    bounds: Option<Vec<ClipBounds>>,
}

impl OutlierClipper {
    /// Clip every numeric column.
    pub fn new(method: ClipMethod) -> Self {
        Self {
            method,
            columns: None,
            bounds: None,
        }
    }

    /// Restrict clipping to `columns`.
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn method(&self) -> ClipMethod {
        self.method
    }

    /// Fitted bounds, if any.
    pub fn bounds(&self) -> Option<&[ClipBounds]> {
        self.bounds.as_deref()
    }
}

impl Transformer for OutlierClipper {
    fn name(&self) -> &'static str {
        "outlier_clipper"
    }

    fn fit(&mut self, frame: &Frame) -> Result<()> {
        self.method.validate()?;
        let columns = match &self.columns {
            Some(cols) => cols.clone(),
            None => frame.numeric_column_names(),
        };
        let mut bounds = Vec::with_capacity(columns.len());
        for column in columns {
            let values = frame.numeric_values(&column)?;
            if values.is_empty() {
                continue;
            }
            let (lower, upper) = self.method.bounds(&sorted_copy(&values));
            bounds.push(ClipBounds {
                column,
                lower,
                upper,
            });
        }
        self.bounds = Some(bounds);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let bounds = self.bounds.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let mut out = frame.clone();
        for b in bounds {
            let clipped = frame
                .numeric(&b.column)?
                .iter()
                .map(|c| c.map(|v| v.clamp(b.lower, b.upper)))
                .collect();
            out.set_column(b.column.clone(), Column::Numeric(clipped))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new()
            .with_column(
                "amount",
                Column::Numeric(vec![
                    Some(1.0),
                    Some(2.0),
                    Some(3.0),
                    Some(4.0),
                    None,
                    Some(1000.0),
                ]),
            )
            .unwrap()
            .with_column("type", Column::from_strs(["A", "B", "A", "B", "A", "B"]))
            .unwrap()
    }

    #[test]
    fn test_iqr_bounds() {
        let mut clipper = OutlierClipper::new(ClipMethod::default());
        let out = clipper.fit_transform(&frame()).unwrap();
        // Values 1,2,3,4,1000: Q1 = 2, Q3 = 4, IQR = 2.
        let b = &clipper.bounds().unwrap()[0];
        assert_eq!((b.lower, b.upper), (-1.0, 7.0));
        assert_eq!(
            out.numeric("amount").unwrap(),
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), None, Some(7.0)]
        );
        assert_eq!(out.column("type"), frame().column("type"));
    }

    #[test]
    fn test_percentile_bounds() {
        let mut clipper = OutlierClipper::new(ClipMethod::Percentile {
            lower: 25.0,
            upper: 75.0,
        });
        let out = clipper.fit_transform(&frame()).unwrap();
        assert_eq!(out.numeric("amount").unwrap()[0], Some(2.0));
        assert_eq!(out.numeric("amount").unwrap()[5], Some(4.0));
    }

    #[test]
    fn test_all_missing_column_passes_through() {
        let f = Frame::new()
            .with_column("x", Column::Numeric(vec![None, None]))
            .unwrap();
        let mut clipper = OutlierClipper::new(ClipMethod::default());
        let out = clipper.fit_transform(&f).unwrap();
        assert_eq!(out, f);
        assert!(clipper.bounds().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut bad_factor = OutlierClipper::new(ClipMethod::Iqr { factor: -1.0 });
        assert!(bad_factor.fit(&frame()).is_err());
        let mut bad_pct = OutlierClipper::new(ClipMethod::Percentile {
            lower: 90.0,
            upper: 10.0,
        });
        assert!(bad_pct.fit(&frame()).is_err());
    }

    #[test]
    fn test_listed_categorical_column_rejected() {
        let mut clipper = OutlierClipper::new(ClipMethod::default()).with_columns(["type"]);
        assert!(matches!(
            clipper.fit(&frame()),
            Err(Error::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let clipper = OutlierClipper::new(ClipMethod::default_percentile());
        assert!(clipper.transform(&frame()).is_err());
    }
}

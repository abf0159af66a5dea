//! Fit/transform preprocessing over [`Frame`]s.
//!
//! Transformers learn their parameters in [`Transformer::fit`] and apply
//! them in [`Transformer::transform`], which always returns a new frame.
//! Calling `transform` before `fit` is an `InvalidInput` error.

pub mod balance;
pub mod frequency;
pub mod outlier;

pub use balance::{BalanceDeltaTransformer, BALANCE_FEATURES};
pub use frequency::FrequencyEncoder;
pub use outlier::{ClipBounds, ClipMethod, OutlierClipper};

use crate::table::Frame;
use fd_common::{Error, Result};

/// A stateful frame-to-frame transformation.
pub trait Transformer {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Learn parameters from `frame`.
    fn fit(&mut self, frame: &Frame) -> Result<()>;

    /// Apply learned parameters to `frame`.
    fn transform(&self, frame: &Frame) -> Result<Frame>;

    fn fit_transform(&mut self, frame: &Frame) -> Result<Frame> {
        self.fit(frame)?;
        self.transform(frame)
    }
}

pub(crate) fn not_fitted(name: &str) -> Error {
    Error::invalid(format!("{} must be fitted before transform", name))
}

/// Transformers applied in sequence. Each step is fitted on the output of
/// the previous one.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transformer>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, step: impl Transformer + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Transformer for Pipeline {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn fit(&mut self, frame: &Frame) -> Result<()> {
        self.fit_transform(frame).map(|_| ())
    }

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let mut current = frame.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }

    fn fit_transform(&mut self, frame: &Frame) -> Result<Frame> {
        let mut current = frame.clone();
        for step in &mut self.steps {
            tracing::debug!(step = step.name(), rows = current.n_rows(), "fitting step");
            current = step.fit_transform(&current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_pipeline_chains_steps() {
        let frame = Frame::new()
            .with_column("kind", Column::from_strs(["a", "a", "b", "c"]))
            .unwrap()
            .with_column("x", Column::from_f64([1.0, 2.0, 3.0, 100.0]))
            .unwrap();
        let mut pipeline = Pipeline::new()
            .push(FrequencyEncoder::new(None, true))
            .push(
                OutlierClipper::new(ClipMethod::Percentile {
                    lower: 0.0,
                    upper: 50.0,
                })
                .with_columns(["x"]),
            );
        assert_eq!(pipeline.step_names(), vec!["frequency_encoder", "outlier_clipper"]);

        let out = pipeline.fit_transform(&frame).unwrap();
        assert_eq!(
            out.numeric("kind").unwrap(),
            &[Some(0.5), Some(0.5), Some(0.25), Some(0.25)]
        );
        assert_eq!(out.numeric("x").unwrap()[3], Some(2.5));

        let again = pipeline.transform(&frame).unwrap();
        assert_eq!(again, out);
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let frame = Frame::new()
            .with_column("x", Column::from_f64([1.0]))
            .unwrap();
        let mut pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.fit_transform(&frame).unwrap(), frame);
    }
}

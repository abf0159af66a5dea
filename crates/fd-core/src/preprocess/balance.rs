//! Balance-discrepancy features for transactional data.
//!
//! For a legitimate transfer the sender's new balance equals
//! `old - amount` and the receiver's equals `old + amount`. The deltas
//! from those expectations are strong fraud signals in PaySim-style data.

use super::Transformer;
use crate::table::{Column, Frame};
use fd_common::Result;

/// Generated column names, in output order.
pub const BALANCE_FEATURES: [&str; 5] = [
    "orig_balance_delta",
    "orig_balance_error",
    "orig_balance_zeroed",
    "dest_balance_delta",
    "dest_balance_error",
];

/// Appends sender and receiver balance deltas.
///
/// Missing inputs give missing outputs, except `orig_balance_zeroed`,
/// which is 0 when the new sender balance is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDeltaTransformer {
    pub amount_col: String,
    pub old_orig_col: String,
    pub new_orig_col: String,
    pub old_dest_col: String,
    pub new_dest_col: String,
}

impl Default for BalanceDeltaTransformer {
    fn default() -> Self {
        Self {
            amount_col: "amount".to_string(),
            old_orig_col: "oldbalanceOrg".to_string(),
            new_orig_col: "newbalanceOrig".to_string(),
            old_dest_col: "oldbalanceDest".to_string(),
            new_dest_col: "newbalanceDest".to_string(),
        }
    }
}

fn zip3(
    a: &[Option<f64>],
    b: &[Option<f64>],
    c: &[Option<f64>],
    f: impl Fn(f64, f64, f64) -> f64,
) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((x, y), z)| Some(f((*x)?, (*y)?, (*z)?)))
        .collect()
}

fn abs_cells(cells: &[Option<f64>]) -> Vec<Option<f64>> {
    cells.iter().map(|c| c.map(f64::abs)).collect()
}

impl Transformer for BalanceDeltaTransformer {
    fn name(&self) -> &'static str {
        "balance_delta"
    }

    /// Stateless.
    fn fit(&mut self, _frame: &Frame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let amount = frame.numeric(&self.amount_col)?;
        let old_orig = frame.numeric(&self.old_orig_col)?;
        let new_orig = frame.numeric(&self.new_orig_col)?;
        let old_dest = frame.numeric(&self.old_dest_col)?;
        let new_dest = frame.numeric(&self.new_dest_col)?;

        let orig_delta = zip3(new_orig, old_orig, amount, |new, old, amt| new - (old - amt));
        let dest_delta = zip3(new_dest, old_dest, amount, |new, old, amt| new - (old + amt));
        let zeroed: Vec<Option<f64>> = new_orig
            .iter()
            .map(|c| Some(if *c == Some(0.0) { 1.0 } else { 0.0 }))
            .collect();

        let orig_error = abs_cells(&orig_delta);
        let dest_error = abs_cells(&dest_delta);
        let mut derived = Frame::new();
        for (name, cells) in BALANCE_FEATURES
            .into_iter()
            .zip([orig_delta, orig_error, zeroed, dest_delta, dest_error])
        {
            derived.set_column(name, Column::Numeric(cells))?;
        }

        // Inputs first, then the derived features in their fixed order.
        let mut out = Frame::new();
        for (name, column) in frame.iter() {
            if !BALANCE_FEATURES.contains(&name) {
                out.set_column(name, column.clone())?;
            }
        }
        for (name, column) in derived.iter() {
            out.set_column(name, column.clone())?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_common::Error;

    fn paysim() -> Frame {
        Frame::new()
            .with_column("amount", Column::from_f64([100.0, 50.0, 10.0]))
            .unwrap()
            .with_column("oldbalanceOrg", Column::from_f64([100.0, 200.0, 30.0]))
            .unwrap()
            .with_column(
                "newbalanceOrig",
                Column::Numeric(vec![Some(0.0), Some(150.0), None]),
            )
            .unwrap()
            .with_column("oldbalanceDest", Column::from_f64([0.0, 10.0, 5.0]))
            .unwrap()
            .with_column("newbalanceDest", Column::from_f64([0.0, 60.0, 20.0]))
            .unwrap()
    }

    #[test]
    fn test_deltas() {
        let out = BalanceDeltaTransformer::default()
            .fit_transform(&paysim())
            .unwrap();
        assert_eq!(
            out.numeric("orig_balance_delta").unwrap(),
            &[Some(0.0), Some(0.0), None]
        );
        assert_eq!(
            out.numeric("dest_balance_delta").unwrap(),
            &[Some(-100.0), Some(0.0), Some(5.0)]
        );
        assert_eq!(
            out.numeric("dest_balance_error").unwrap(),
            &[Some(100.0), Some(0.0), Some(5.0)]
        );
        assert_eq!(
            out.numeric("orig_balance_zeroed").unwrap(),
            &[Some(1.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn test_column_order() {
        let out = BalanceDeltaTransformer::default()
            .fit_transform(&paysim())
            .unwrap();
        let names: Vec<&str> = out.column_names().iter().map(String::as_str).collect();
        assert_eq!(&names[5..], &BALANCE_FEATURES);
        assert_eq!(names[0], "amount");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let t = BalanceDeltaTransformer::default();
        let once = t.transform(&paysim()).unwrap();
        let twice = t.transform(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_input_column() {
        let t = BalanceDeltaTransformer {
            amount_col: "amt".into(),
            ..Default::default()
        };
        assert!(matches!(
            t.transform(&paysim()),
            Err(Error::UnknownColumn { ref name }) if name == "amt"
        ));
    }
}

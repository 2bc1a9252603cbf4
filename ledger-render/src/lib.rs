use ledger_core::*;
use rust_decimal::RoundingStrategy;
use std::{io, io::Write};
use thiserror::Error;


/// Decimal places every amount is rendered with.
pub const CURRENCY_PRECISION: u32 = 2;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderOptions {
    /// Written in front of every rendered amount.
    pub currency_symbol: String,
    /// Whether the balancing line shows its computed amount.
    pub include_final_line_amount: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            currency_symbol: "$".to_string(),
            include_final_line_amount: false,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BasicRenderer {
    options: RenderOptions,
}

impl BasicRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

/// Renders a balanced copy of `tx` into `w`.
pub fn render<W: Write>(
    w: &mut W,
    tx: &Transaction,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    BasicRenderer::new(options.clone()).render(tx, w)
}

/// Formats `tx` as a block ready to be appended to a ledger file.
///
/// The block starts with a newline so that it is visually separated from whatever precedes it.
/// The final expense line is rewritten so the transaction sums to zero; `tx` itself is not
/// modified.
///
/// ```
/// use ledger_core::{Decimal, ExpenseLine, Transaction};
/// use ledger_render::{format_expense, RenderOptions};
///
/// let tx = Transaction::builder()
///     .date("2024-01-01".into())
///     .payee("Store".into())
///     .expenselines(vec![
///         ExpenseLine::builder().account("Checking".into()).amount(Decimal::new(-4250, 2)).build(),
///         ExpenseLine::builder().account("Groceries".into()).amount(Decimal::ZERO).build(),
///     ])
///     .build();
/// let text = format_expense(&tx, &RenderOptions::default()).unwrap();
/// assert_eq!(text, "\n2024-01-01 Store\n    Checking    $-42.50\n    Groceries");
/// ```
pub fn format_expense(tx: &Transaction, options: &RenderOptions) -> Result<String, RenderError> {
    let mut rendered = Vec::new();
    writeln!(rendered)?;
    render(&mut rendered, tx, options)?;
    String::from_utf8(rendered)
        .map_err(|e| RenderError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Returns a copy of `tx` whose last expense line carries the negated sum of the others.
///
/// The other amounts are first brought to currency precision, so the figures that get rendered
/// are exactly the figures that were summed.
pub fn balance(tx: &Transaction) -> Result<Transaction, RenderError> {
    let lines = tx.expenselines.len();
    if lines < 2 {
        return Err(RenderError::InvalidTransaction { lines });
    }
    let mut balanced = tx.clone();
    let (last, rest) = balanced
        .expenselines
        .split_last_mut()
        .ok_or(RenderError::InvalidTransaction { lines })?;
    let mut total = Decimal::ZERO;
    for line in rest {
        line.amount = currency_amount(line.amount);
        total += line.amount;
    }
    last.amount = currency_amount(-total);
    Ok(balanced)
}

/// Rounds to [`CURRENCY_PRECISION`] places, midpoint away from zero, with a fixed scale and no
/// negative zero.
pub fn currency_amount(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(CURRENCY_PRECISION);
    rounded
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("an io error occurred")]
    Io(#[from] io::Error),
    #[error("a transaction needs at least two expense lines to balance, found {lines}")]
    InvalidTransaction { lines: usize },
}

pub trait Renderer<T, W: Write> {
    type Error;
    fn render(&self, renderable: T, write: &mut W) -> Result<(), Self::Error>;
}

impl<'a, W: Write> Renderer<&'a Transaction, W> for BasicRenderer {
    type Error = RenderError;
    fn render(&self, transaction: &'a Transaction, w: &mut W) -> Result<(), Self::Error> {
        let balanced = balance(transaction)?;
        write!(w, "{} {}", balanced.date, balanced.payee)?;
        let last = balanced.expenselines.len() - 1;
        for (i, line) in balanced.expenselines.iter().enumerate() {
            writeln!(w)?;
            if i != last || self.options.include_final_line_amount {
                self.render(line, w)?;
            } else {
                // The amount is optional on the final line.
                write!(w, "    {}", line.account)?;
            }
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a ExpenseLine, W> for BasicRenderer {
    type Error = RenderError;
    fn render(&self, line: &'a ExpenseLine, w: &mut W) -> Result<(), Self::Error> {
        write!(
            w,
            "    {}    {}{}",
            line.account,
            self.options.currency_symbol,
            currency_amount(line.amount)
        )?;
        Ok(())
    }
}

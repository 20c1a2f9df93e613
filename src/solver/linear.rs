// Linear building blocks of the native model: columns, literals, affine
// expressions over columns and the values the expression converter produces.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Not;

use crate::domain::value_objects::CmpOp;

/// Integer column of the native model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Col(pub(crate) usize);

impl Col {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Boolean literal: a 0/1 column or its complement `1 - col`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    col: Col,
    negated: bool,
}

impl Lit {
    pub fn positive(col: Col) -> Lit {
        Lit {
            col,
            negated: false,
        }
    }

    pub fn col(self) -> Col {
        self.col
    }

    pub fn to_linear(self) -> LinExpr {
        if self.negated {
            LinExpr {
                terms: BTreeMap::from([(self.col, -1)]),
                constant: 1,
            }
        } else {
            LinExpr::from(self.col)
        }
    }

    /// Truth value under a column assignment.
    pub fn value(self, columns: &[f64]) -> i64 {
        let v = columns[self.col.0].round() as i64;
        if self.negated {
            1 - v
        } else {
            v
        }
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit {
            col: self.col,
            negated: !self.negated,
        }
    }
}

/// `sum(coef * col) + constant` with integer coefficients
///
/// Arithmetic is checked: a coefficient or constant leaving `i64` is a
/// [`LoweringError::Overflow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LinExpr {
    terms: BTreeMap<Col, i64>,
    constant: i64,
}

impl LinExpr {
    pub fn constant(c: i64) -> LinExpr {
        LinExpr {
            terms: BTreeMap::new(),
            constant: c,
        }
    }

    pub fn term(col: Col, coef: i64) -> LinExpr {
        let mut terms = BTreeMap::new();
        if coef != 0 {
            terms.insert(col, coef);
        }
        LinExpr { terms, constant: 0 }
    }

    fn add_term(&mut self, col: Col, coef: i64) -> LoweringResult<()> {
        let entry = self.terms.entry(col).or_insert(0);
        *entry = entry.checked_add(coef).ok_or(LoweringError::Overflow)?;
        if *entry == 0 {
            self.terms.remove(&col);
        }
        Ok(())
    }

    pub fn terms(&self) -> impl Iterator<Item = (Col, i64)> + '_ {
        self.terms.iter().map(|(&c, &k)| (c, k))
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn constant_part(&self) -> i64 {
        self.constant
    }

    pub fn as_constant(&self) -> Option<i64> {
        if self.terms.is_empty() {
            Some(self.constant)
        } else {
            None
        }
    }

    /// `Some(col)` when the expression is exactly one column with coefficient 1.
    pub fn as_column(&self) -> Option<Col> {
        if self.constant != 0 || self.terms.len() != 1 {
            return None;
        }
        match self.terms.iter().next() {
            Some((&col, 1)) => Some(col),
            _ => None,
        }
    }

    pub fn plus(mut self, rhs: impl Into<LinExpr>) -> LoweringResult<LinExpr> {
        let rhs = rhs.into();
        for (col, k) in rhs.terms {
            self.add_term(col, k)?;
        }
        self.constant = self
            .constant
            .checked_add(rhs.constant)
            .ok_or(LoweringError::Overflow)?;
        Ok(self)
    }

    pub fn minus(self, rhs: impl Into<LinExpr>) -> LoweringResult<LinExpr> {
        self.plus(rhs.into().negated()?)
    }

    pub fn scale(mut self, k: i64) -> LoweringResult<LinExpr> {
        if k == 0 {
            return Ok(LinExpr::default());
        }
        for coef in self.terms.values_mut() {
            *coef = coef.checked_mul(k).ok_or(LoweringError::Overflow)?;
        }
        self.constant = self.constant.checked_mul(k).ok_or(LoweringError::Overflow)?;
        Ok(self)
    }

    pub fn negated(self) -> LoweringResult<LinExpr> {
        self.scale(-1)
    }

    pub fn evaluate(&self, columns: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(col, &k)| k as f64 * columns[col.0])
            .sum::<f64>()
            + self.constant as f64
    }
}

impl From<i64> for LinExpr {
    fn from(c: i64) -> LinExpr {
        LinExpr::constant(c)
    }
}

impl From<i32> for LinExpr {
    fn from(c: i32) -> LinExpr {
        LinExpr::constant(c as i64)
    }
}

impl From<Col> for LinExpr {
    fn from(col: Col) -> LinExpr {
        LinExpr::term(col, 1)
    }
}

impl From<Lit> for LinExpr {
    fn from(lit: Lit) -> LinExpr {
        lit.to_linear()
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (col, k) in self.terms() {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(f, "{}*c{}", k, col.0)?;
        }
        if first || self.constant != 0 {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

/// Comparison between two linear expressions, not yet posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub lhs: LinExpr,
    pub op: CmpOp,
    pub rhs: LinExpr,
}

impl Relation {
    pub fn new(lhs: impl Into<LinExpr>, op: CmpOp, rhs: impl Into<LinExpr>) -> Relation {
        Relation {
            lhs: lhs.into(),
            op,
            rhs: rhs.into(),
        }
    }

    pub fn negated(&self) -> Relation {
        Relation {
            lhs: self.lhs.clone(),
            op: self.op.negate(),
            rhs: self.rhs.clone(),
        }
    }

    /// `lhs - rhs`
    pub fn difference(&self) -> LoweringResult<LinExpr> {
        self.lhs.clone().minus(self.rhs.clone())
    }
}

/// Native value of a converted subexpression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Native {
    Const(i64),
    Lit(Lit),
    Int(Col),
    Linear(LinExpr),
    Relation(Relation),
    Seq(Vec<Native>),
}

impl Native {
    /// Collapse constant and single-column expressions to their simplest form.
    pub fn from_linear(e: LinExpr) -> Native {
        match (e.as_constant(), e.as_column()) {
            (Some(c), _) => Native::Const(c),
            (None, Some(col)) => Native::Int(col),
            _ => Native::Linear(e),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Native::Seq(items) => items.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Failure to express a construct with columns and rows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoweringError {
    #[error("expected a boolean operand, got {0}")]
    NotBoolean(String),

    #[error("expected a scalar, got a sequence of length {0}")]
    NotScalar(usize),

    #[error("domain of size {size} exceeds the enumeration limit of {limit}")]
    DomainTooLarge { size: u64, limit: u64 },

    #[error("exponent must be a non-negative constant, got {0}")]
    BadExponent(String),

    #[error("division by the constant zero")]
    DivisionByZero,

    #[error("divisor domain [{lo}, {hi}] contains zero")]
    DivisorMayBeZero { lo: i64, hi: i64 },

    #[error("arithmetic overflows i64")]
    Overflow,
}

pub type LoweringResult<T> = std::result::Result<T, LoweringError>;

// Domain value objects shared by the modeling layer, the translator and the backends

use std::fmt;

/// Relational operator of a comparison expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmpOp {
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Less than or equal (<=)
    Le,
    /// Strictly less (<)
    Lt,
    /// Greater than or equal (>=)
    Ge,
    /// Strictly greater (>)
    Gt,
}

impl CmpOp {
    /// The operator whose truth value is the complement of this one.
    pub fn negate(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Gt => CmpOp::Le,
        }
    }

}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Le => "<=",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Gt => ">",
        };
        write!(f, "{}", s)
    }
}

/// Arithmetic and boolean operators of the expression tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Conjunction, n-ary
    And,
    /// Disjunction, n-ary
    Or,
    /// Exclusive or, n-ary
    Xor,
    /// Implication, binary
    Implies,
    /// Arithmetic negation, unary
    Neg,
    /// Absolute value, unary
    Abs,
    /// Subtraction, binary
    Sub,
    /// Multiplication, binary
    Mul,
    /// Integer division truncating toward zero, binary
    Div,
    /// Remainder with the sign of the dividend, binary
    Mod,
    /// Power with a constant exponent, binary
    Pow,
    /// Addition, n-ary
    Sum,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Xor => "xor",
            Operator::Implies => "->",
            Operator::Neg => "-",
            Operator::Abs => "abs",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Mod => "mod",
            Operator::Pow => "pow",
            Operator::Sum => "sum",
        }
    }

    /// Fixed number of arguments, or `None` for n-ary operators.
    pub fn arity(self) -> Option<usize> {
        match self {
            Operator::And | Operator::Or | Operator::Xor | Operator::Sum => None,
            Operator::Neg | Operator::Abs => Some(1),
            Operator::Implies
            | Operator::Sub
            | Operator::Mul
            | Operator::Div
            | Operator::Mod
            | Operator::Pow => Some(2),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizationType {
    /// Minimize the objective expression
    Minimize,
    /// Maximize the objective expression
    Maximize,
}

/// Outcome of a solve, independent of the engine that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitStatus {
    /// Proven optimal (or any solution, for satisfaction models)
    Optimal,
    /// Solution found, optimality not proven
    Feasible,
    /// Proven to have no solution
    Unsatisfiable,
}

impl ExitStatus {
    /// Whether values were written back for this status.
    pub fn has_solution(self) -> bool {
        matches!(self, ExitStatus::Optimal | ExitStatus::Feasible)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Optimal => write!(f, "Optimal"),
            ExitStatus::Feasible => write!(f, "Feasible"),
            ExitStatus::Unsatisfiable => write!(f, "Unsatisfiable"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolverBackend {
    /// Best backend compiled into this build
    #[default]
    Auto,
    /// Pure-Rust microlp engine through good_lp
    Microlp,
    /// COIN-OR CBC through good_lp
    CoinCbc,
    /// HiGHS
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::Microlp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

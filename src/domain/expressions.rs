// Expression tree of the modeling layer
// A closed sum type: the translator matches on it exhaustively.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Sub};

use super::globals::GlobalConstraint;
use super::value_objects::{CmpOp, Operator};
use super::variables::Var;

/// Constraint or value expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// Integer constant; booleans are 0 and 1
    Const(i64),
    /// Reference to a decision variable
    Var(Var),
    /// Logical complement of a boolean variable
    NegBoolView(Var),
    /// Sequence of expressions, used for vectorized comparisons
    List(Vec<Expr>),
    /// Arithmetic or boolean operator applied to its arguments
    Op(Operator, Vec<Expr>),
    /// Comparison between two expressions
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    /// `array[index]`
    Element { array: Vec<Expr>, index: Box<Expr> },
    /// Named global constraint or global function
    Global(GlobalConstraint),
}

impl Expr {
    pub fn list<I, T>(items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::List(items.into_iter().map(Into::into).collect())
    }

    fn nary<I, T>(op: Operator, items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        let mut args = Vec::new();
        for item in items {
            match item.into() {
                Expr::Op(inner, nested) if inner == op => args.extend(nested),
                other => args.push(other),
            }
        }
        Expr::Op(op, args)
    }

    pub fn sum<I, T>(items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::nary(Operator::Sum, items)
    }

    pub fn and<I, T>(items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::nary(Operator::And, items)
    }

    pub fn or<I, T>(items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::nary(Operator::Or, items)
    }

    pub fn xor<I, T>(items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::nary(Operator::Xor, items)
    }

    pub fn element<I, T>(array: I, index: impl Into<Expr>) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::Element {
            array: array.into_iter().map(Into::into).collect(),
            index: Box::new(index.into()),
        }
    }

    pub fn global(constraint: GlobalConstraint) -> Expr {
        Expr::Global(constraint)
    }

    pub fn compare(op: CmpOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::Cmp(op, Box::new(lhs.into()), Box::new(rhs.into()))
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        Expr::compare(CmpOp::Eq, self, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Expr {
        Expr::compare(CmpOp::Ne, self, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        Expr::compare(CmpOp::Le, self, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::compare(CmpOp::Lt, self, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        Expr::compare(CmpOp::Ge, self, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::compare(CmpOp::Gt, self, rhs)
    }

    pub fn implies(self, rhs: impl Into<Expr>) -> Expr {
        Expr::Op(Operator::Implies, vec![self, rhs.into()])
    }

    pub fn abs(self) -> Expr {
        Expr::Op(Operator::Abs, vec![self])
    }

    pub fn pow(self, exponent: impl Into<Expr>) -> Expr {
        Expr::Op(Operator::Pow, vec![self, exponent.into()])
    }

    /// `Some(var)` when the expression is a boolean variable or its negated
    /// view, i.e. something the native layer handles as a literal directly.
    pub fn as_bool_literal(&self) -> Option<&Var> {
        match self {
            Expr::Var(v) if v.is_bool() => Some(v),
            Expr::NegBoolView(v) => Some(v),
            _ => None,
        }
    }

    /// Direct subexpressions, in argument order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_) | Expr::Var(_) | Expr::NegBoolView(_) => Vec::new(),
            Expr::List(items) | Expr::Op(_, items) => items.iter().collect(),
            Expr::Cmp(_, lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Element { array, index } => {
                let mut out: Vec<&Expr> = array.iter().collect();
                out.push(index.as_ref());
                out
            }
            Expr::Global(g) => g.args(),
        }
    }

    /// Pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Expr)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Variables referenced by this expression, in first-occurrence order.
    pub fn variables(&self) -> Vec<Var> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        collect_variables(self, &mut seen, &mut out);
        out
    }
}

pub(crate) fn collect_variables(expr: &Expr, seen: &mut HashSet<Var>, out: &mut Vec<Var>) {
    collect_visible(expr, &[], seen, out);
}

// Opaque decompositions are searched too; the variables a decomposition
// introduces are auxiliaries and stay out of `out`.
fn collect_visible(expr: &Expr, hidden: &[Var], seen: &mut HashSet<Var>, out: &mut Vec<Var>) {
    expr.visit(&mut |e| match e {
        Expr::Var(v) | Expr::NegBoolView(v) => {
            if !hidden.contains(v) && seen.insert(v.clone()) {
                out.push(v.clone());
            }
        }
        Expr::Global(GlobalConstraint::Opaque {
            decomposition: Some(d),
            ..
        }) => {
            let hidden: Vec<Var> = hidden.iter().chain(&d.new_vars).cloned().collect();
            for constraint in &d.constraints {
                collect_visible(constraint, &hidden, &mut *seen, &mut *out);
            }
        }
        _ => {}
    });
}

/// Ordered, de-duplicated variables of a list of expressions.
pub fn vars_expr<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> Vec<Var> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for expr in exprs {
        collect_variables(expr, &mut seen, &mut out);
    }
    out
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{}", c),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::NegBoolView(v) => write!(f, "~{}", v),
            Expr::List(items) => {
                write!(f, "[")?;
                write_args(f, items)?;
                write!(f, "]")
            }
            Expr::Op(op, args) => match (op, args.as_slice()) {
                (Operator::Neg, [a]) => write!(f, "-({})", a),
                (Operator::Implies, [a, b]) => write!(f, "({}) -> ({})", a, b),
                (Operator::Sub, [a, b]) => write!(f, "({}) - ({})", a, b),
                (Operator::Mul, [a, b]) => write!(f, "({}) * ({})", a, b),
                (Operator::Div, [a, b]) => write!(f, "({}) div ({})", a, b),
                (Operator::Mod, [a, b]) => write!(f, "({}) mod ({})", a, b),
                (Operator::Pow, [a, b]) => write!(f, "({}) ** ({})", a, b),
                _ => {
                    write!(f, "{}(", op.name())?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            },
            Expr::Cmp(op, lhs, rhs) => write!(f, "({}) {} ({})", lhs, op, rhs),
            Expr::Element { array, index } => {
                write!(f, "[")?;
                write_args(f, array)?;
                write!(f, "][{}]", index)
            }
            Expr::Global(g) => write!(f, "{}", g),
        }
    }
}

impl From<i64> for Expr {
    fn from(c: i64) -> Expr {
        Expr::Const(c)
    }
}

impl From<i32> for Expr {
    fn from(c: i32) -> Expr {
        Expr::Const(c as i64)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Expr {
        Expr::Const(b as i64)
    }
}

impl From<Var> for Expr {
    fn from(v: Var) -> Expr {
        Expr::Var(v)
    }
}

impl From<&Var> for Expr {
    fn from(v: &Var) -> Expr {
        Expr::Var(v.clone())
    }
}

impl From<GlobalConstraint> for Expr {
    fn from(g: GlobalConstraint) -> Expr {
        Expr::Global(g)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        match self {
            Expr::Var(v) if v.is_bool() => Expr::NegBoolView(v),
            Expr::NegBoolView(v) => Expr::Var(v),
            Expr::Const(c) => Expr::Const((c == 0) as i64),
            Expr::Cmp(op, lhs, rhs) => Expr::Cmp(op.negate(), lhs, rhs),
            other => other.eq(0),
        }
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Op(Operator::Neg, vec![self])
    }
}

macro_rules! binary_ops {
    ($($trait:ident, $method:ident, $body:expr;)*) => {
        $(
            impl<T: Into<Expr>> $trait<T> for Expr {
                type Output = Expr;

                fn $method(self, rhs: T) -> Expr {
                    let build: fn(Expr, Expr) -> Expr = $body;
                    build(self, rhs.into())
                }
            }

            impl<T: Into<Expr>> $trait<T> for &Var {
                type Output = Expr;

                fn $method(self, rhs: T) -> Expr {
                    let build: fn(Expr, Expr) -> Expr = $body;
                    build(self.expr(), rhs.into())
                }
            }
        )*
    };
}

binary_ops! {
    Add, add, |a, b| Expr::sum([a, b]);
    Sub, sub, |a, b| Expr::Op(Operator::Sub, vec![a, b]);
    Mul, mul, |a, b| Expr::Op(Operator::Mul, vec![a, b]);
    Div, div, |a, b| Expr::Op(Operator::Div, vec![a, b]);
    Rem, rem, |a, b| Expr::Op(Operator::Mod, vec![a, b]);
    BitAnd, bitand, |a, b| Expr::and([a, b]);
    BitOr, bitor, |a, b| Expr::or([a, b]);
    BitXor, bitxor, |a, b| Expr::xor([a, b]);
}

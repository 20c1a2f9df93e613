// Global constraints and global functions of the modeling layer

use std::fmt;

use super::expressions::Expr;
use super::variables::Var;

/// Rewriting of a global constraint into simpler constraints
///
/// `new_vars` lists every variable the constraints introduce that is not part
/// of the original model, so the translator can declare them before posting.
#[derive(Debug, Clone, Default)]
pub struct Decomposition {
    pub constraints: Vec<Expr>,
    pub new_vars: Vec<Var>,
}

impl Decomposition {
    pub fn new(constraints: Vec<Expr>) -> Decomposition {
        Decomposition {
            constraints,
            new_vars: Vec::new(),
        }
    }

    pub fn with_new_vars(mut self, new_vars: Vec<Var>) -> Decomposition {
        self.new_vars = new_vars;
        self
    }
}

/// Named global constraint (boolean) or global function (integer valued)
#[derive(Debug, Clone)]
pub enum GlobalConstraint {
    /// All arguments take pairwise distinct values
    AllDifferent(Vec<Expr>),
    /// All non-zero arguments take pairwise distinct values
    AllDifferentExceptZero(Vec<Expr>),
    /// All arguments take the same value
    AllEqual(Vec<Expr>),
    /// The successor array forms a single Hamiltonian cycle over `0..n`
    Circuit(Vec<Expr>),
    /// Smallest argument
    Min(Vec<Expr>),
    /// Largest argument
    Max(Vec<Expr>),
    /// Number of arguments equal to `value`
    Count { args: Vec<Expr>, value: Box<Expr> },
    /// `counts[i]` is the number of arguments equal to `values[i]`
    GlobalCardinalityCount {
        args: Vec<Expr>,
        values: Vec<i64>,
        counts: Vec<Expr>,
    },
    /// User-named global, translatable only through its decomposition
    Opaque {
        name: String,
        args: Vec<Expr>,
        decomposition: Option<Box<Decomposition>>,
    },
}

impl GlobalConstraint {
    pub fn name(&self) -> &str {
        match self {
            GlobalConstraint::AllDifferent(_) => "alldifferent",
            GlobalConstraint::AllDifferentExceptZero(_) => "alldifferent_except0",
            GlobalConstraint::AllEqual(_) => "allequal",
            GlobalConstraint::Circuit(_) => "circuit",
            GlobalConstraint::Min(_) => "min",
            GlobalConstraint::Max(_) => "max",
            GlobalConstraint::Count { .. } => "count",
            GlobalConstraint::GlobalCardinalityCount { .. } => "gcc",
            GlobalConstraint::Opaque { name, .. } => name,
        }
    }

    pub fn args(&self) -> Vec<&Expr> {
        match self {
            GlobalConstraint::AllDifferent(args)
            | GlobalConstraint::AllDifferentExceptZero(args)
            | GlobalConstraint::AllEqual(args)
            | GlobalConstraint::Circuit(args)
            | GlobalConstraint::Min(args)
            | GlobalConstraint::Max(args)
            | GlobalConstraint::Opaque { args, .. } => args.iter().collect(),
            GlobalConstraint::Count { args, value } => {
                args.iter().chain(std::iter::once(value.as_ref())).collect()
            }
            GlobalConstraint::GlobalCardinalityCount { args, counts, .. } => {
                args.iter().chain(counts.iter()).collect()
            }
        }
    }

    /// Whether the global is a constraint (truth valued) rather than a
    /// function computing an integer.
    pub fn is_boolean(&self) -> bool {
        !matches!(
            self,
            GlobalConstraint::Min(_) | GlobalConstraint::Max(_) | GlobalConstraint::Count { .. }
        )
    }

    /// Equivalent conjunction of simpler constraints, if one is known.
    ///
    /// Global functions have no constraint decomposition; see
    /// [`GlobalConstraint::value_decomposition`].
    pub fn decompose(&self) -> Option<Decomposition> {
        match self {
            GlobalConstraint::AllDifferent(args) => Some(Decomposition::new(
                pairs(args).map(|(a, b)| a.clone().ne(b.clone())).collect(),
            )),
            GlobalConstraint::AllDifferentExceptZero(args) => Some(Decomposition::new(
                pairs(args)
                    .map(|(a, b)| {
                        (a.clone().ne(0) & b.clone().ne(0)).implies(a.clone().ne(b.clone()))
                    })
                    .collect(),
            )),
            GlobalConstraint::AllEqual(args) => Some(Decomposition::new(
                args.windows(2)
                    .map(|w| w[0].clone().eq(w[1].clone()))
                    .collect(),
            )),
            GlobalConstraint::Circuit(succ) => Some(decompose_circuit(succ)),
            GlobalConstraint::GlobalCardinalityCount {
                args,
                values,
                counts,
            } => Some(Decomposition::new(
                values
                    .iter()
                    .zip(counts)
                    .map(|(&v, c)| c.clone().eq(count(args.iter().cloned(), v)))
                    .collect(),
            )),
            GlobalConstraint::Opaque { decomposition, .. } => {
                decomposition.as_deref().cloned()
            }
            GlobalConstraint::Min(_)
            | GlobalConstraint::Max(_)
            | GlobalConstraint::Count { .. } => None,
        }
    }

    /// Integer expression computing the same value as a global function,
    /// for functions without native support.
    pub fn value_decomposition(&self) -> Option<Expr> {
        match self {
            GlobalConstraint::Count { args, value } => Some(Expr::sum(
                args.iter().map(|a| a.clone().eq(value.as_ref().clone())),
            )),
            _ => None,
        }
    }
}

fn pairs(args: &[Expr]) -> impl Iterator<Item = (&Expr, &Expr)> {
    args.iter()
        .enumerate()
        .flat_map(move |(i, a)| args[i + 1..].iter().map(move |b| (a, b)))
}

// Follows the successor chain from node 0: order[i] is the node visited at
// step i, and the tour must come back to 0 after exactly n steps.
fn decompose_circuit(succ: &[Expr]) -> Decomposition {
    let n = succ.len();
    if n == 0 {
        return Decomposition::default();
    }
    let order = Var::integers("circuit_order", n, 0, n as i64 - 1);
    let mut constraints = vec![
        all_different(succ.iter().cloned()),
        all_different(order.iter()),
        order[n - 1].expr().eq(0),
        order[0].expr().eq(succ[0].clone()),
    ];
    for i in 1..n {
        constraints.push(
            order[i]
                .expr()
                .eq(Expr::element(succ.iter().cloned(), &order[i - 1])),
        );
    }
    Decomposition::new(constraints).with_new_vars(order)
}

impl fmt::Display for GlobalConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        match self {
            GlobalConstraint::Count { args, value } => {
                write!(f, "{}, {}", Expr::List(args.clone()), value)?;
            }
            GlobalConstraint::GlobalCardinalityCount {
                args,
                values,
                counts,
            } => {
                write!(
                    f,
                    "{}, {:?}, {}",
                    Expr::List(args.clone()),
                    values,
                    Expr::List(counts.clone())
                )?;
            }
            _ => {
                for (i, arg) in self.args().into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
            }
        }
        write!(f, ")")
    }
}

fn collect<I, T>(items: I) -> Vec<Expr>
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    items.into_iter().map(Into::into).collect()
}

pub fn all_different<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::AllDifferent(collect(items)))
}

pub fn all_different_except_zero<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::AllDifferentExceptZero(collect(items)))
}

pub fn all_equal<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::AllEqual(collect(items)))
}

pub fn circuit<I, T>(successors: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::Circuit(collect(successors)))
}

pub fn min<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::Min(collect(items)))
}

pub fn max<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::Max(collect(items)))
}

pub fn count<I, T>(items: I, value: impl Into<Expr>) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::Count {
        args: collect(items),
        value: Box::new(value.into()),
    })
}

pub fn global_cardinality_count<I, T, C, U>(items: I, values: Vec<i64>, counts: C) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
    C: IntoIterator<Item = U>,
    U: Into<Expr>,
{
    Expr::Global(GlobalConstraint::GlobalCardinalityCount {
        args: collect(items),
        values,
        counts: collect(counts),
    })
}

/// Global known only by name; `decomposition` is what the translator posts.
pub fn opaque<I, T>(name: impl Into<String>, args: I, decomposition: Option<Decomposition>) -> Expr
where
    I: IntoIterator<Item = T>,
    T: Into<Expr>,
{
    Expr::Global(GlobalConstraint::Opaque {
        name: name.into(),
        args: collect(args),
        decomposition: decomposition.map(Box::new),
    })
}

// Decision variables of the modeling layer
// Variables are shared handles: the translator maps them to native columns and
// writes solved values back into the same objects the caller holds.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::expressions::Expr;

static NEXT_VAR_ID: AtomicUsize = AtomicUsize::new(0);

/// Kind and domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Boolean variable (x ∈ {0, 1})
    Bool,
    /// Integer variable (x ∈ [lb, ub])
    Int { lb: i64, ub: i64 },
}

impl VarKind {
    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            VarKind::Bool => (0, 1),
            VarKind::Int { lb, ub } => (lb, ub),
        }
    }
}

#[derive(Debug)]
struct VarData {
    id: usize,
    name: String,
    kind: VarKind,
    value: Mutex<Option<i64>>,
}

/// Decision variable with identity
///
/// Cloning yields another handle to the same variable. Equality, ordering and
/// hashing follow the identity, never the name.
#[derive(Clone)]
pub struct Var(Arc<VarData>);

impl Var {
    fn with_kind(name: impl Into<String>, kind: VarKind) -> Var {
        Var(Arc::new(VarData {
            id: NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            kind,
            value: Mutex::new(None),
        }))
    }

    pub fn boolean(name: impl Into<String>) -> Var {
        Var::with_kind(name, VarKind::Bool)
    }

    /// Integer variable with domain `[lb, ub]`. Empty domains are reported by
    /// `Model::validate`.
    pub fn integer(name: impl Into<String>, lb: i64, ub: i64) -> Var {
        Var::with_kind(name, VarKind::Int { lb, ub })
    }

    /// `n` boolean variables named `prefix[i]`.
    pub fn booleans(prefix: &str, n: usize) -> Vec<Var> {
        (0..n)
            .map(|i| Var::boolean(format!("{}[{}]", prefix, i)))
            .collect()
    }

    /// `n` integer variables named `prefix[i]`, all with domain `[lb, ub]`.
    pub fn integers(prefix: &str, n: usize, lb: i64, ub: i64) -> Vec<Var> {
        (0..n)
            .map(|i| Var::integer(format!("{}[{}]", prefix, i), lb, ub))
            .collect()
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> VarKind {
        self.0.kind
    }

    pub fn is_bool(&self) -> bool {
        self.0.kind == VarKind::Bool
    }

    pub fn lb(&self) -> i64 {
        self.0.kind.bounds().0
    }

    pub fn ub(&self) -> i64 {
        self.0.kind.bounds().1
    }

    /// Value assigned by the last successful solve, if any.
    pub fn value(&self) -> Option<i64> {
        *self.0.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_value(&self, value: Option<i64>) {
        *self.0.value.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn clear_value(&self) {
        self.set_value(None);
    }

    pub fn expr(&self) -> Expr {
        Expr::Var(self.clone())
    }

    /// Negated view of a boolean variable.
    pub fn not(&self) -> Expr {
        Expr::NegBoolView(self.clone())
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Var) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Var {
    fn partial_cmp(&self, other: &Var) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Var {
    fn cmp(&self, other: &Var) -> std::cmp::Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            VarKind::Bool => write!(f, "BoolVar({})", self.0.name),
            VarKind::Int { lb, ub } => write!(f, "IntVar({}, {}..={})", self.0.name, lb, ub),
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

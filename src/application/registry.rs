// Variable registry: source variable identity -> native column

use std::collections::HashMap;

use crate::domain::variables::{Var, VarKind};
use crate::solver::cp_model::CpModel;
use crate::solver::linear::{Col, Lit, Native};

/// Native handle of a registered variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Bool(Lit),
    Int(Col),
}

impl Handle {
    pub fn col(self) -> Col {
        match self {
            Handle::Bool(lit) => lit.col(),
            Handle::Int(col) => col,
        }
    }

    pub fn to_native(self) -> Native {
        match self {
            Handle::Bool(lit) => Native::Lit(lit),
            Handle::Int(col) => Native::Int(col),
        }
    }

    /// Integer value under an engine assignment.
    pub fn value(self, columns: &[f64]) -> i64 {
        match self {
            Handle::Bool(lit) => lit.value(columns),
            Handle::Int(col) => columns[col.index()].round() as i64,
        }
    }
}

/// Lazily populated mapping, owned by one translation
#[derive(Debug, Default)]
pub struct VarRegistry {
    handles: HashMap<Var, Handle>,
}

impl VarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing handle of `var`, or a fresh column matching its kind and
    /// bounds, named after it.
    pub fn ensure(&mut self, var: &Var, model: &mut CpModel) -> Handle {
        if let Some(&handle) = self.handles.get(var) {
            return handle;
        }
        let handle = match var.kind() {
            VarKind::Bool => Handle::Bool(model.new_bool_var(var.name())),
            VarKind::Int { lb, ub } => Handle::Int(model.new_int_var(lb, ub, var.name())),
        };
        self.handles.insert(var.clone(), handle);
        handle
    }

    pub fn get(&self, var: &Var) -> Option<Handle> {
        self.handles.get(var).copied()
    }

    pub fn contains(&self, var: &Var) -> bool {
        self.handles.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

// Constraint poster: top-level constraint -> native rows
//
// Every constraint is posted under an enforcement list. The list is empty
// for top-level constraints and grows by one literal per implication
// antecedent, so `a -> (b -> c)` posts `c` enforced by both `a` and `b`.

use tracing::{debug, trace};

use crate::domain::{
    expressions::{vars_expr, Expr},
    globals::{Decomposition, GlobalConstraint},
    solver_service::{Result, SolverError},
    value_objects::{CmpOp, Operator},
};
use crate::solver::linear::{Lit, Native, Relation};

use super::{lowering_failed, untranslatable, Translator};

/// Pair two converted sides of a comparison.
///
/// Scalars pair with each other. Sequences pair element-wise, and a side of
/// length 1 is reused against every element of the other side. Lengths that
/// are neither equal nor 1 are a shape error.
pub fn zip_cycle(left: Native, right: Native) -> Result<Vec<(Native, Native)>> {
    let (left, right) = match (left, right) {
        (Native::Seq(l), Native::Seq(r)) => (l, r),
        (Native::Seq(l), r) => (l, vec![r]),
        (l, Native::Seq(r)) => (vec![l], r),
        (l, r) => return Ok(vec![(l, r)]),
    };
    let (n, m) = (left.len(), right.len());
    if n != m && n != 1 && m != 1 {
        return Err(SolverError::ShapeMismatch { left: n, right: m });
    }
    if n == 0 || m == 0 {
        return Ok(Vec::new());
    }
    Ok((0..n.max(m))
        .map(|i| (left[i % n].clone(), right[i % m].clone()))
        .collect())
}

impl Translator<'_> {
    /// Post a top-level constraint.
    pub fn post_constraint(&mut self, expr: &Expr) -> Result<()> {
        self.post_enforced(expr, &[])
    }

    /// Post `expr` so that it must hold whenever every literal of `enforce`
    /// is true.
    pub fn post_enforced(&mut self, expr: &Expr, enforce: &[Lit]) -> Result<()> {
        match expr {
            Expr::Var(_) | Expr::NegBoolView(_) => {
                let lit = self.literal(expr)?;
                self.model
                    .add_bool_or(&[lit], enforce)
                    .map_err(lowering_failed(expr))
            }
            Expr::Const(0) => self
                .model
                .add_bool_or(&[], enforce)
                .map_err(lowering_failed(expr)),
            Expr::Const(_) => Ok(()),
            Expr::List(items) => items
                .iter()
                .try_for_each(|item| self.post_enforced(item, enforce)),
            Expr::Cmp(op, lhs, rhs) => self.post_comparison(expr, *op, lhs, rhs, enforce),
            Expr::Op(Operator::Implies, args) if args.len() == 2 => {
                if enforce.is_empty()
                    && args[0].as_bool_literal().is_some()
                    && args[1].as_bool_literal().is_some()
                {
                    let a = self.literal(&args[0])?;
                    let b = self.literal(&args[1])?;
                    return self
                        .model
                        .add_implication(a, b)
                        .map_err(lowering_failed(expr));
                }
                // A plain boolean antecedent is its own literal; anything
                // else is fully reified.
                if args[0].as_bool_literal().is_none() {
                    trace!(antecedent = %args[0], "reifying implication antecedent");
                }
                let condition = self.literal(&args[0])?;
                let mut with = enforce.to_vec();
                with.push(condition);
                self.post_enforced(&args[1], &with)
            }
            Expr::Op(Operator::And, args) => args
                .iter()
                .try_for_each(|arg| self.post_enforced(arg, enforce)),
            Expr::Op(Operator::Or, args) => {
                let lits = self.literals(args)?;
                self.model
                    .add_bool_or(&lits, enforce)
                    .map_err(lowering_failed(expr))
            }
            Expr::Op(Operator::Xor, args) => {
                let lits = self.literals(args)?;
                self.model
                    .add_bool_xor(&lits, enforce)
                    .map_err(lowering_failed(expr))
            }
            Expr::Op(..) | Expr::Element { .. } => {
                let lit = self.literal(expr)?;
                self.model
                    .add_bool_or(&[lit], enforce)
                    .map_err(lowering_failed(expr))
            }
            Expr::Global(global) => self.post_global(expr, global, enforce),
        }
    }

    fn post_comparison(
        &mut self,
        expr: &Expr,
        op: CmpOp,
        lhs: &Expr,
        rhs: &Expr,
        enforce: &[Lit],
    ) -> Result<()> {
        if op == CmpOp::Eq {
            match (lhs, rhs) {
                (Expr::Element { array, index }, other) | (other, Expr::Element { array, index }) => {
                    return self.post_element(expr, array, index, other, enforce);
                }
                _ => {}
            }
        }

        let left = self.convert_subexpr(lhs)?;
        let right = self.convert_subexpr(rhs)?;
        for (l, r) in zip_cycle(left, right)? {
            let l = self.model.linear_of(l).map_err(lowering_failed(expr))?;
            let r = self.model.linear_of(r).map_err(lowering_failed(expr))?;
            self.model
                .add_enforced(&Relation::new(l, op, r), enforce)
                .map_err(lowering_failed(expr))?;
        }
        Ok(())
    }

    // array[index] == other
    fn post_element(
        &mut self,
        expr: &Expr,
        array: &[Expr],
        index: &Expr,
        other: &Expr,
        enforce: &[Lit],
    ) -> Result<()> {
        let index = self.linear(index)?;
        let items = self.linears(array)?;
        let target = self.linear(other)?;
        self.model
            .add_element(&index, &items, &target, enforce)
            .map_err(lowering_failed(expr))
    }

    fn post_global(&mut self, expr: &Expr, global: &GlobalConstraint, enforce: &[Lit]) -> Result<()> {
        match global {
            GlobalConstraint::AllDifferent(args) => {
                let items = self.linears(args)?;
                self.model
                    .add_all_different(&items, enforce)
                    .map_err(lowering_failed(expr))
            }
            // Global functions posted on their own only define their value.
            GlobalConstraint::Min(_) | GlobalConstraint::Max(_) | GlobalConstraint::Count { .. } => {
                debug!(global = global.name(), "global function posted as a constraint");
                self.convert_subexpr(expr).map(|_| ())
            }
            _ => {
                let constraints = self.decomposition(expr, global)?;
                self.nested(|t| {
                    constraints
                        .iter()
                        .try_for_each(|c| t.post_enforced(c, enforce))
                })
            }
        }
    }

    /// Decompose `global`, registering every variable the decomposition
    /// introduces or references.
    pub(crate) fn decomposition(
        &mut self,
        expr: &Expr,
        global: &GlobalConstraint,
    ) -> Result<Vec<Expr>> {
        let limit = self.config.max_decomposition_depth;
        if self.depth >= limit {
            return Err(SolverError::DecompositionDepth {
                expr: expr.to_string(),
                limit,
            });
        }
        let Some(Decomposition {
            constraints,
            new_vars,
        }) = global.decompose()
        else {
            return Err(untranslatable(
                expr,
                format!(
                    "global constraint '{}' has no native form and no decomposition",
                    global.name()
                ),
            ));
        };
        debug!(
            global = global.name(),
            constraints = constraints.len(),
            new_vars = new_vars.len(),
            depth = self.depth,
            "decomposing global constraint"
        );
        for var in new_vars.iter().chain(&vars_expr(&constraints)) {
            self.register(var);
        }
        Ok(constraints)
    }
}

// Subexpression converter: expression tree -> native value
//
// Integer-valued constructs become linear expressions over columns, boolean
// ones become literals, comparisons stay deferred relations until a context
// needs them as a value.

use crate::domain::{
    expressions::Expr,
    globals::GlobalConstraint,
    solver_service::{Result, SolverError},
    value_objects::Operator,
    variables::Var,
};
use crate::solver::linear::{LinExpr, Lit, LoweringError, Native, Relation};

use super::{lowering_failed, registry::Handle, untranslatable, Translator};

impl Translator<'_> {
    /// Convert `expr` into its native value.
    ///
    /// Variables must already be registered; anything without a native
    /// equivalent is an error carrying the offending expression.
    pub fn convert_subexpr(&mut self, expr: &Expr) -> Result<Native> {
        match expr {
            Expr::Const(c) => Ok(Native::Const(*c)),
            Expr::List(items) => items
                .iter()
                .map(|item| self.convert_subexpr(item))
                .collect::<Result<Vec<_>>>()
                .map(Native::Seq),
            Expr::Var(var) => Ok(self.handle(var)?.to_native()),
            Expr::NegBoolView(var) => match self.handle(var)? {
                Handle::Bool(lit) => Ok(Native::Lit(!lit)),
                Handle::Int(_) => Err(untranslatable(
                    expr,
                    "negated view of a non-boolean variable",
                )),
            },
            Expr::Op(op, args) => self.convert_operator(expr, *op, args),
            Expr::Cmp(op, lhs, rhs) => {
                let lhs = self.linear(lhs)?;
                let rhs = self.linear(rhs)?;
                Ok(Native::Relation(Relation::new(lhs, *op, rhs)))
            }
            Expr::Element { array, index } => self.convert_element(expr, array, index),
            Expr::Global(global) => self.convert_global(expr, global),
        }
    }

    fn handle(&self, var: &Var) -> Result<Handle> {
        self.registry
            .get(var)
            .ok_or_else(|| SolverError::UnregisteredVariable(var.name().to_string()))
    }

    /// Integer form of `expr`.
    pub(crate) fn linear(&mut self, expr: &Expr) -> Result<LinExpr> {
        let value = self.convert_subexpr(expr)?;
        self.model.linear_of(value).map_err(lowering_failed(expr))
    }

    /// Literal form of `expr`; relations are reified.
    pub(crate) fn literal(&mut self, expr: &Expr) -> Result<Lit> {
        let value = self.convert_subexpr(expr)?;
        self.model.literal_of(value).map_err(lowering_failed(expr))
    }

    pub(crate) fn linears(&mut self, exprs: &[Expr]) -> Result<Vec<LinExpr>> {
        exprs.iter().map(|e| self.linear(e)).collect()
    }

    pub(crate) fn literals(&mut self, exprs: &[Expr]) -> Result<Vec<Lit>> {
        exprs.iter().map(|e| self.literal(e)).collect()
    }

    fn convert_operator(&mut self, expr: &Expr, op: Operator, args: &[Expr]) -> Result<Native> {
        if let Some(arity) = op.arity() {
            if args.len() != arity {
                return Err(untranslatable(
                    expr,
                    format!("'{}' expects {} arguments, got {}", op, arity, args.len()),
                ));
            }
        }
        let lowered = |r: std::result::Result<LinExpr, LoweringError>| {
            r.map(Native::from_linear).map_err(lowering_failed(expr))
        };

        match op {
            Operator::And => {
                let lits = self.literals(args)?;
                let lit = self.model.and_lit(&lits).map_err(lowering_failed(expr))?;
                Ok(Native::Lit(lit))
            }
            Operator::Or => {
                let lits = self.literals(args)?;
                let lit = self.model.or_lit(&lits).map_err(lowering_failed(expr))?;
                Ok(Native::Lit(lit))
            }
            // No enforcement is possible inside a value: a -> b is !a | b
            Operator::Implies => {
                let a = self.literal(&args[0])?;
                let b = self.literal(&args[1])?;
                let lit = self.model.or_lit(&[!a, b]).map_err(lowering_failed(expr))?;
                Ok(Native::Lit(lit))
            }
            Operator::Xor => Err(untranslatable(
                expr,
                "xor has no subexpression form, post it as a top-level constraint",
            )),
            Operator::Neg => lowered(self.linear(&args[0])?.negated()),
            Operator::Abs => {
                let e = self.linear(&args[0])?;
                lowered(self.model.abs(e))
            }
            Operator::Sub => {
                let a = self.linear(&args[0])?;
                let b = self.linear(&args[1])?;
                lowered(a.minus(b))
            }
            Operator::Sum => {
                let terms = self.linears(args)?;
                lowered(
                    terms
                        .into_iter()
                        .try_fold(LinExpr::default(), |acc, t| acc.plus(t)),
                )
            }
            Operator::Mul => {
                let a = self.linear(&args[0])?;
                let b = self.linear(&args[1])?;
                lowered(self.model.product(a, b))
            }
            Operator::Div => {
                let a = self.linear(&args[0])?;
                let b = self.linear(&args[1])?;
                lowered(self.model.division(a, b))
            }
            Operator::Mod => {
                let a = self.linear(&args[0])?;
                let b = self.linear(&args[1])?;
                lowered(self.model.modulo(a, b))
            }
            Operator::Pow => {
                let base = self.linear(&args[0])?;
                let exponent = self.linear(&args[1])?;
                let Some(k) = exponent.as_constant() else {
                    return Err(untranslatable(
                        expr,
                        LoweringError::BadExponent(args[1].to_string()),
                    ));
                };
                lowered(self.model.power(base, k))
            }
        }
    }

    fn convert_element(&mut self, expr: &Expr, array: &[Expr], index: &Expr) -> Result<Native> {
        let index = self.linear(index)?;
        let items = self.linears(array)?;
        if let Some(i) = index.as_constant() {
            return usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .map(Native::from_linear)
                .ok_or_else(|| untranslatable(expr, format!("index {} is out of range", i)));
        }
        let Some((lo, hi)) = self.hull(expr, &items)? else {
            return Err(untranslatable(expr, "element of an empty array"));
        };
        // Every index the domain allows must select an item.
        let last = items.len() - 1;
        let (ilo, ihi) = self.model.bounds(&index).map_err(lowering_failed(expr))?;
        if ilo < 0 || usize::try_from(ihi).map_or(true, |i| i > last) {
            return Err(untranslatable(
                expr,
                format!(
                    "index domain [{}, {}] leaves the array bounds [0, {}]",
                    ilo, ihi, last
                ),
            ));
        }
        let target = LinExpr::from(self.model.new_aux_int("element", lo, hi));
        self.model
            .add_element(&index, &items, &target, &[])
            .map_err(lowering_failed(expr))?;
        Ok(Native::from_linear(target))
    }

    // Smallest interval containing every expression's bounds.
    fn hull(&self, expr: &Expr, items: &[LinExpr]) -> Result<Option<(i64, i64)>> {
        let mut hull: Option<(i64, i64)> = None;
        for e in items {
            let (a, b) = self.model.bounds(e).map_err(lowering_failed(expr))?;
            hull = Some(match hull {
                Some((lo, hi)) => (lo.min(a), hi.max(b)),
                None => (a, b),
            });
        }
        Ok(hull)
    }

    fn convert_global(&mut self, expr: &Expr, global: &GlobalConstraint) -> Result<Native> {
        match global {
            GlobalConstraint::Min(args) | GlobalConstraint::Max(args) => {
                let items = self.linears(args)?;
                let Some((lo, hi)) = self.hull(expr, &items)? else {
                    return Err(untranslatable(expr, "global function without arguments"));
                };
                let target = LinExpr::from(self.model.new_aux_int(global.name(), lo, hi));
                let posted = if matches!(global, GlobalConstraint::Min(_)) {
                    self.model.add_min_equality(&target, &items)
                } else {
                    self.model.add_max_equality(&target, &items)
                };
                posted.map_err(lowering_failed(expr))?;
                Ok(Native::from_linear(target))
            }
            _ if !global.is_boolean() => match global.value_decomposition() {
                Some(value) => self.convert_subexpr(&value),
                None => Err(untranslatable(
                    expr,
                    format!("global function '{}' has no native form", global.name()),
                )),
            },
            // A boolean global as a value is the conjunction of its
            // decomposition, fully reified.
            _ => {
                let constraints = self.decomposition(expr, global)?;
                let lit = self.nested(|t| t.literal(&Expr::and(constraints)))?;
                Ok(Native::Lit(lit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::globals::{all_different, count, max};
    use crate::domain::models::SolverConfig;
    use crate::domain::value_objects::CmpOp;
    use crate::solver::linear::Col;

    fn translator_with<'a>(config: &'a SolverConfig, vars: &[&Var]) -> Translator<'a> {
        let mut t = Translator::new(config);
        for var in vars {
            t.register(var);
        }
        t
    }

    #[test]
    fn constants_convert_to_themselves() {
        let config = SolverConfig::default();
        let mut t = Translator::new(&config);
        for c in [-7, 0, 1, 42] {
            assert_eq!(t.convert_subexpr(&Expr::Const(c)).unwrap(), Native::Const(c));
        }
        assert!(t.native_model().columns().is_empty());
    }

    #[test]
    fn negated_view_is_the_complement_of_the_handle() {
        let config = SolverConfig::default();
        let b = Var::boolean("b");
        let mut t = translator_with(&config, &[&b]);
        let Native::Lit(positive) = t.convert_subexpr(&b.expr()).unwrap() else {
            panic!("boolean variable must convert to a literal");
        };
        assert_eq!(t.convert_subexpr(&b.not()).unwrap(), Native::Lit(!positive));
    }

    #[test]
    fn unregistered_variables_are_reported() {
        let config = SolverConfig::default();
        let mut t = Translator::new(&config);
        let x = Var::integer("ghost", 0, 3);
        assert!(matches!(
            t.convert_subexpr(&(x.expr() + 1)),
            Err(SolverError::UnregisteredVariable(name)) if name == "ghost"
        ));
    }

    #[test]
    fn linear_arithmetic_adds_no_columns() {
        let config = SolverConfig::default();
        let x = Var::integer("x", 0, 5);
        let y = Var::integer("y", -3, 3);
        let mut t = translator_with(&config, &[&x, &y]);
        let e = Expr::sum([x.expr() * 2, -y.expr(), Expr::Const(4)]) - &y;
        let Native::Linear(lin) = t.convert_subexpr(&e).unwrap() else {
            panic!("expected a linear expression");
        };
        assert_eq!(lin.constant_part(), 4);
        assert_eq!(lin.terms().collect::<Vec<_>>(), vec![(Col(0), 2), (Col(1), -2)]);
        assert_eq!(t.native_model().columns().len(), 2);
    }

    #[test]
    fn comparisons_stay_deferred() {
        let config = SolverConfig::default();
        let x = Var::integer("x", 0, 5);
        let mut t = translator_with(&config, &[&x]);
        let converted = t.convert_subexpr(&x.expr().ne(0)).unwrap();
        assert!(matches!(converted, Native::Relation(Relation { op: CmpOp::Ne, .. })));
        assert!(t.native_model().rows().is_empty());
    }

    #[test]
    fn xor_subexpression_is_an_error() {
        let config = SolverConfig::default();
        let a = Var::boolean("a");
        let b = Var::boolean("b");
        let mut t = translator_with(&config, &[&a, &b]);
        let nested = Expr::or([Expr::xor([a.expr(), b.expr()]), a.expr()]);
        assert!(matches!(
            t.convert_subexpr(&nested),
            Err(SolverError::Untranslatable { reason, .. }) if reason.contains("xor")
        ));
    }

    #[test]
    fn variable_exponent_is_rejected() {
        let config = SolverConfig::default();
        let x = Var::integer("x", 0, 3);
        let mut t = translator_with(&config, &[&x]);
        let err = t.convert_subexpr(&x.expr().pow(&x)).unwrap_err();
        assert!(err.to_string().contains("exponent"), "{}", err);
        assert!(t.convert_subexpr(&x.expr().pow(2)).is_ok());
    }

    #[test]
    fn constant_index_selects_directly() {
        let config = SolverConfig::default();
        let xs = Var::integers("x", 3, 0, 9);
        let refs: Vec<&Var> = xs.iter().collect();
        let mut t = translator_with(&config, &refs);
        let columns = t.native_model().columns().len();
        let picked = t.convert_subexpr(&Expr::element(xs.iter(), 2)).unwrap();
        assert_eq!(picked, t.convert_subexpr(&xs[2].expr()).unwrap());
        assert_eq!(t.native_model().columns().len(), columns);
        assert!(t.convert_subexpr(&Expr::element(xs.iter(), 3)).is_err());
    }

    #[test]
    fn variable_index_must_stay_inside_the_array() {
        let config = SolverConfig::default();
        let xs = Var::integers("x", 3, 0, 9);
        let inside = Var::integer("i", 0, 2);
        let wide = Var::integer("j", -1, 2);
        let mut refs: Vec<&Var> = xs.iter().collect();
        refs.extend([&inside, &wide]);
        let mut t = translator_with(&config, &refs);
        assert!(matches!(
            t.convert_subexpr(&Expr::element(xs.iter(), &inside)).unwrap(),
            Native::Int(_)
        ));
        assert!(matches!(
            t.convert_subexpr(&Expr::element(xs.iter(), &wide)),
            Err(SolverError::Untranslatable { reason, .. }) if reason.contains("[-1, 2]")
        ));
    }

    #[test]
    fn wrapping_arithmetic_is_untranslatable() {
        let config = SolverConfig::default();
        let x = Var::integer("x", 0, 3);
        let mut t = translator_with(&config, &[&x]);
        assert!(matches!(
            t.convert_subexpr(&-Expr::Const(i64::MIN)),
            Err(SolverError::Untranslatable { reason, .. }) if reason.contains("overflow")
        ));
        let sum = Expr::sum([Expr::Const(i64::MAX), x.expr(), Expr::Const(1)]);
        assert!(matches!(
            t.convert_subexpr(&sum),
            Err(SolverError::Untranslatable { .. })
        ));
    }

    #[test]
    fn value_globals_become_auxiliary_columns() {
        let config = SolverConfig::default();
        let xs = Var::integers("x", 3, -1, 4);
        let refs: Vec<&Var> = xs.iter().collect();
        let mut t = translator_with(&config, &refs);
        let Native::Int(col) = t.convert_subexpr(&max(xs.iter())).unwrap() else {
            panic!("max must convert to a column");
        };
        let aux = t.native_model().column(col);
        assert_eq!((aux.lb, aux.ub), (-1, 4));
        assert!(t.convert_subexpr(&count(xs.iter(), 2)).is_ok());
    }

    #[test]
    fn boolean_globals_reify_their_decomposition() {
        let config = SolverConfig::default();
        let xs = Var::integers("x", 3, 0, 2);
        let refs: Vec<&Var> = xs.iter().collect();
        let mut t = translator_with(&config, &refs);
        let converted = t.convert_subexpr(&all_different(xs.iter())).unwrap();
        assert!(matches!(converted, Native::Lit(_)));
        assert!(!t.native_model().rows().is_empty());
    }
}

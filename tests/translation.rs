use cpbridge::application::{zip_cycle, Handle};
use cpbridge::solver::linear::Native;
use cpbridge::{solve, Expr, Model, SolverConfig, SolverError, Translator, Var};
use proptest::prelude::*;

fn native_consts(values: &[i64]) -> Native {
    Native::Seq(values.iter().map(|&v| Native::Const(v)).collect())
}

proptest! {
    #[test]
    fn constants_convert_unchanged(c in any::<i64>()) {
        let config = SolverConfig::default();
        let mut translator = Translator::new(&config);
        prop_assert_eq!(translator.convert_subexpr(&Expr::Const(c)).unwrap(), Native::Const(c));
    }

    #[test]
    fn integer_handles_keep_declared_bounds(lb in -1000i64..1000, width in 0i64..1000) {
        let config = SolverConfig::default();
        let mut translator = Translator::new(&config);
        let x = Var::integer("x", lb, lb + width);
        let handle = translator.register(&x);
        prop_assert!(matches!(handle, Handle::Int(_)));
        let column = translator.native_model().column(handle.col());
        prop_assert_eq!((column.lb, column.ub), (lb, lb + width));
    }

    #[test]
    fn boolean_handles_are_zero_one(n in 1usize..8) {
        let config = SolverConfig::default();
        let mut translator = Translator::new(&config);
        for b in Var::booleans("b", n) {
            let handle = translator.register(&b);
            prop_assert!(matches!(handle, Handle::Bool(_)));
            let column = translator.native_model().column(handle.col());
            prop_assert_eq!((column.lb, column.ub), (0, 1));
        }
    }

    #[test]
    fn negated_views_complement_their_handle(n in 1usize..8) {
        let config = SolverConfig::default();
        let mut translator = Translator::new(&config);
        let bs = Var::booleans("b", n);
        for b in &bs {
            translator.register(b);
        }
        for b in &bs {
            let view = translator.convert_subexpr(&b.not()).unwrap();
            let Native::Lit(lit) = translator.convert_subexpr(&b.expr()).unwrap() else {
                panic!("boolean variable must convert to a literal");
            };
            prop_assert_eq!(view, Native::Lit(!lit));
        }
    }

    #[test]
    fn single_elements_cycle_against_sequences(n in 1usize..12, single in any::<i64>()) {
        let others: Vec<i64> = (0..n as i64).collect();
        let pairs = zip_cycle(native_consts(&[single]), native_consts(&others)).unwrap();
        prop_assert_eq!(pairs.len(), n);
        for (i, (l, r)) in pairs.into_iter().enumerate() {
            prop_assert_eq!(l, Native::Const(single));
            prop_assert_eq!(r, Native::Const(i as i64));
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected(n in 2usize..10, m in 2usize..10) {
        prop_assume!(n != m);
        let left: Vec<i64> = vec![0; n];
        let right: Vec<i64> = vec![0; m];
        let result = zip_cycle(native_consts(&left), native_consts(&right));
        let is_shape_error = matches!(
            result,
            Err(SolverError::ShapeMismatch { left, right }) if left == n && right == m
        );
        prop_assert!(is_shape_error);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn solved_equalities_write_back_their_constant(lb in -20i64..0, ub in 0i64..20, pick in 0u32..100) {
        let target = lb + (pick as i64) % (ub - lb + 1);
        let x = Var::integer("x", lb, ub);
        let mut model = Model::new();
        model.add(x.expr().eq(target));
        let status = solve(&model, &SolverConfig::default()).unwrap();
        prop_assert!(status.is_feasible());
        prop_assert_eq!(x.value(), Some(target));
    }
}

#[test]
fn vectorized_comparison_posts_one_row_per_pair() {
    let config = SolverConfig::default();
    let x = Var::integer("x", 0, 9);
    let ys = Var::integers("y", 3, 0, 9);
    let mut model = Model::new();
    model.add(Expr::list([&x]).ne(Expr::list(ys.iter())));
    let translation = Translator::new(&config).make_model(&model).unwrap();
    let x_col = translation.registry().get(&x).unwrap().col();
    // each != over a mixed-sign difference is two rows sharing a selector
    let rows = translation.model().rows();
    assert_eq!(rows.len(), 6);
    assert!(rows
        .iter()
        .all(|r| r.terms.iter().any(|&(c, _)| c == x_col)));
    assert_eq!(translation.statistics().num_auxiliary_columns, 3);
}

#[test]
fn xor_as_a_subexpression_is_an_error() {
    let config = SolverConfig::default();
    let bs = Var::booleans("b", 3);
    let mut model = Model::new();
    model.add(Expr::xor(bs.iter()).implies(&bs[0]));
    let result = Translator::new(&config).make_model(&model);
    assert!(matches!(result, Err(SolverError::Untranslatable { .. })));
}

#[test]
fn multi_level_decomposition_terminates() {
    let config = SolverConfig::default();
    let xs = Var::integers("x", 3, 0, 2);
    let counts = Var::integers("c", 3, 0, 3);
    let mut model = Model::new();
    model.add(cpbridge::global_cardinality_count(
        xs.iter(),
        vec![0, 1, 2],
        counts.iter(),
    ));
    let translation = Translator::new(&config).make_model(&model).unwrap();
    assert!(!translation.model().rows().is_empty());
}

#[test]
fn arithmetic_past_i64_is_untranslatable() {
    let config = SolverConfig::default();
    let x = Var::integer("x", -(1 << 61), 1 << 61);
    let y = Var::integer("y", -(1 << 61), 1 << 61);
    let a = Var::boolean("a");
    let b = Var::boolean("b");
    let mut model = Model::new();
    model.add(a.expr().implies(b.expr().implies(x.expr().le(&y))));
    let result = Translator::new(&config).make_model(&model);
    assert!(matches!(result, Err(SolverError::Untranslatable { .. })));

    let z = Var::integer("z", 0, 3);
    let mut model = Model::new();
    model.add((-Expr::Const(i64::MIN)).ge(&z));
    let result = Translator::new(&config).make_model(&model);
    assert!(matches!(
        result,
        Err(SolverError::Untranslatable { ref reason, .. }) if reason.contains("overflow")
    ));
}

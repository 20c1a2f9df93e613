use cpbridge::{
    all_different, circuit, global_cardinality_count, max, min, opaque, solve, Decomposition,
    ExitStatus, Expr, Model, SolverBackend, SolverConfig, SolverError, Var,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn run(model: &Model) -> cpbridge::SolverStatus {
    init_tracing();
    solve(model, &SolverConfig::default()).unwrap()
}

fn value(var: &Var) -> i64 {
    var.value()
        .unwrap_or_else(|| panic!("no value written back for {}", var))
}

#[test]
fn disjunction_of_two_booleans() {
    let b1 = Var::boolean("b1");
    let b2 = Var::boolean("b2");
    let mut model = Model::new().with_name("scenario A");
    model.add(&b1 | &b2);

    let status = run(&model);
    assert!(status.is_feasible());
    assert!(value(&b1) == 1 || value(&b2) == 1);
}

#[test]
fn fixed_integer() {
    let x = Var::integer("x", 0, 5);
    let mut model = Model::new().with_name("scenario B");
    model.add(x.expr().eq(3));

    let status = run(&model);
    assert!(status.is_feasible());
    assert_eq!(value(&x), 3);
}

#[test]
fn maximize_without_constraints() {
    let x = Var::integer("x", 0, 9);
    let mut model = Model::new().with_name("scenario C");
    model.maximize(&x);

    let status = run(&model);
    assert_eq!(status.exit_status, ExitStatus::Optimal);
    assert_eq!(value(&x), 9);
    assert_eq!(status.objective_value, Some(9));
    assert_eq!(status.statistics.num_user_variables, 1);
}

#[test]
fn pigeonhole_is_unsatisfiable() {
    let xs = Var::integers("x", 3, 0, 1);
    let mut model = Model::new().with_name("scenario D");
    model.add(all_different(xs.iter()));

    let status = run(&model);
    assert_eq!(status.exit_status, ExitStatus::Unsatisfiable);
    assert!(xs.iter().all(|x| x.value().is_none()));
    assert_eq!(status.objective_value, None);
}

#[test]
fn implication_with_a_comparison_antecedent() {
    // antecedent true forces the consequent
    let x = Var::integer("x", 0, 5);
    let y = Var::boolean("y");
    let mut model = Model::new();
    model.add(x.expr().ge(3).implies(&y)).add(x.expr().eq(4));
    run(&model);
    assert_eq!(value(&y), 1);

    // a false consequent forces the antecedent to be false
    let x = Var::integer("x", 0, 5);
    let y = Var::boolean("y");
    let mut model = Model::new();
    model
        .add(x.expr().ge(3).implies(&y))
        .add(y.not())
        .maximize(&x);
    let status = run(&model);
    assert!(status.is_optimal());
    assert_eq!(value(&x), 2);
}

#[test]
fn implication_with_a_boolean_antecedent() {
    let b = Var::boolean("b");
    let x = Var::integer("x", 0, 5);
    let mut model = Model::new();
    model.add(b.expr().implies(x.expr().eq(2))).add(&b).maximize(&x);
    run(&model);
    assert_eq!(value(&x), 2);

    let b = Var::boolean("b");
    let x = Var::integer("x", 0, 5);
    let mut model = Model::new();
    model.add(b.expr().implies(x.expr().eq(2))).add(b.not()).maximize(&x);
    run(&model);
    assert_eq!(value(&x), 5);
}

#[test]
fn nested_implications_accumulate_conditions() {
    let a = Var::boolean("a");
    let b = Var::boolean("b");
    let x = Var::integer("x", 0, 5);
    let mut model = Model::new();
    model
        .add(a.expr().implies(b.expr().implies(x.expr().le(1))))
        .add(&a)
        .add(&b)
        .maximize(&x);
    run(&model);
    assert_eq!(value(&x), 1);
}

#[test]
fn reified_inequality_equals_a_boolean() {
    let x = Var::integer("x", 0, 3);
    let b = Var::boolean("b");
    let mut model = Model::new();
    model.add(x.expr().ne(0).eq(&b)).add(&b).minimize(&x);
    run(&model);
    assert_eq!(value(&x), 1);

    let x = Var::integer("x", 0, 3);
    let b = Var::boolean("b");
    let mut model = Model::new();
    model.add(x.expr().ne(0).eq(&b)).add(x.expr().eq(0)).maximize(&b);
    run(&model);
    assert_eq!(value(&b), 0);
}

#[test]
fn top_level_xor() {
    let bs = Var::booleans("b", 3);
    let mut model = Model::new();
    model
        .add(Expr::xor(bs.iter()))
        .add(&bs[0])
        .add(&bs[1]);
    run(&model);
    assert_eq!(value(&bs[2]), 1);
}

#[test]
fn element_constraint_and_subexpression() {
    let i = Var::integer("i", 0, 2);
    let v = Var::integer("v", 0, 10);
    let mut model = Model::new();
    model.add(Expr::element([3, 7, 1], &i).eq(&v)).maximize(&v);
    run(&model);
    assert_eq!((value(&i), value(&v)), (1, 7));

    let xs = Var::integers("x", 3, 0, 9);
    let i = Var::integer("i", 0, 2);
    let mut model = Model::new();
    model
        .add((Expr::element(xs.iter(), &i) + 1).eq(5))
        .add(xs[0].expr().eq(1))
        .add(xs[1].expr().eq(4))
        .add(xs[2].expr().eq(6));
    run(&model);
    assert_eq!(value(&i), 1);

    // Posted as a constraint, indices outside the array are simply excluded.
    let xs = Var::integers("x", 3, 0, 9);
    let i = Var::integer("i", -5, 5);
    let mut model = Model::new();
    model
        .add(Expr::element(xs.iter(), &i).eq(4))
        .add(xs[0].expr().eq(1))
        .add(xs[1].expr().eq(4))
        .add(xs[2].expr().eq(6));
    run(&model);
    assert_eq!(value(&i), 1);
}

#[test]
fn element_value_with_a_wider_index_is_untranslatable() {
    init_tracing();
    let xs = Var::integers("x", 3, 0, 9);
    let i = Var::integer("i", -5, 5);
    let mut model = Model::new();
    model.add((Expr::element(xs.iter(), &i) + 1).eq(5));
    let err = solve(&model, &SolverConfig::default()).unwrap_err();
    assert!(
        matches!(err, SolverError::Untranslatable { ref reason, .. } if reason.contains("[-5, 5]")),
        "{}",
        err
    );
    assert_eq!(i.value(), None);
}

#[test]
fn division_and_modulo_follow_truncation() {
    let x = Var::integer("x", -7, 7);
    let mut model = Model::new();
    model
        .add((&x / 2).eq(-3))
        .add((&x % 2).eq(-1));
    run(&model);
    assert_eq!(value(&x), -7);
}

#[test]
fn variable_divisor_away_from_zero() {
    let x = Var::integer("x", 0, 9);
    let y = Var::integer("y", 1, 3);
    let mut model = Model::new();
    model
        .add((&x / &y).eq(2))
        .add(y.expr().eq(3))
        .maximize(&x);
    let status = run(&model);
    assert_eq!(status.exit_status, ExitStatus::Optimal);
    assert_eq!((value(&x), value(&y)), (8, 3));
}

#[test]
fn divisor_domains_containing_zero_are_rejected() {
    init_tracing();
    let x = Var::integer("x", 0, 9);
    let y = Var::integer("y", 0, 3);
    let mut model = Model::new();
    model
        .add(y.expr().ne(0).implies((&x / &y).eq(2)))
        .add(y.expr().eq(0));
    let err = solve(&model, &SolverConfig::default()).unwrap_err();
    assert!(
        matches!(err, SolverError::Untranslatable { ref reason, .. } if reason.contains("zero")),
        "{}",
        err
    );
    assert_eq!(x.value(), None);
}

#[test]
fn products_and_absolute_values() {
    let x = Var::integer("x", -4, 4);
    let y = Var::integer("y", -4, 4);
    let mut model = Model::new();
    model
        .add((&x * &y).eq(-6))
        .add(x.expr().abs().eq(2))
        .add(x.expr().gt(0));
    run(&model);
    assert_eq!((value(&x), value(&y)), (2, -3));

    let x = Var::integer("x", -3, 3);
    let mut model = Model::new();
    model.add(x.expr().pow(2).eq(9)).minimize(&x);
    run(&model);
    assert_eq!(value(&x), -3);
}

#[test]
fn min_and_max_globals() {
    let xs = Var::integers("x", 3, 2, 6);
    let mut model = Model::new();
    model
        .add(min(xs.iter()).eq(4))
        .add(max(xs.iter()).eq(5))
        .maximize(Expr::sum(xs.iter()));
    let status = run(&model);
    assert_eq!(status.objective_value, Some(14));
    let values: Vec<i64> = xs.iter().map(value).collect();
    assert_eq!(values.iter().min(), Some(&4));
    assert_eq!(values.iter().max(), Some(&5));
}

#[test]
fn circuit_forms_a_single_tour() {
    let succ = Var::integers("succ", 4, 0, 3);
    let mut model = Model::new();
    model.add(circuit(succ.iter()));

    let status = run(&model);
    assert!(status.is_feasible());
    let next: Vec<i64> = succ.iter().map(value).collect();
    let mut node = 0usize;
    let mut visited = vec![false; 4];
    for _ in 0..4 {
        assert!(!visited[node], "revisited node {} in {:?}", node, next);
        visited[node] = true;
        node = next[node] as usize;
    }
    assert_eq!(node, 0, "tour does not close: {:?}", next);
    assert!(status.statistics.num_auxiliary_columns > 0);
}

#[test]
fn cardinality_decomposes_through_count() {
    let xs = Var::integers("x", 4, 0, 2);
    let counts = Var::integers("n", 3, 0, 4);
    let mut model = Model::new();
    model
        .add(global_cardinality_count(xs.iter(), vec![0, 1, 2], counts.iter()))
        .add(counts[0].expr().eq(2))
        .add(counts[1].expr().eq(2));
    run(&model);
    let values: Vec<i64> = xs.iter().map(value).collect();
    assert_eq!(values.iter().filter(|&&v| v == 0).count(), 2);
    assert_eq!(values.iter().filter(|&&v| v == 1).count(), 2);
    assert_eq!(value(&counts[2]), 0);
}

#[test]
fn boolean_global_as_a_value() {
    let xs = Var::integers("x", 2, 0, 1);
    let b = Var::boolean("b");
    let mut model = Model::new();
    model
        .add(all_different(xs.iter()).eq(&b))
        .add(xs[0].expr().eq(&xs[1]))
        .maximize(&b);
    run(&model);
    assert_eq!(value(&b), 0);
}

fn nested_opaque(levels: usize, innermost: Expr) -> Expr {
    (0..levels).fold(innermost, |inner, level| {
        opaque(
            format!("wrap{}", level),
            Vec::<Expr>::new(),
            Some(Decomposition::new(vec![inner])),
        )
    })
}

#[test]
fn deep_decompositions_hit_the_depth_guard() {
    init_tracing();
    let x = Var::integer("x", 0, 3);
    let mut model = Model::new();
    model.add(nested_opaque(40, x.expr().eq(1)));

    let err = solve(&model, &SolverConfig::default()).unwrap_err();
    assert!(matches!(err, SolverError::DecompositionDepth { limit: 32, .. }));

    let config = SolverConfig::default().with_max_decomposition_depth(64);
    let status = solve(&model, &config).unwrap();
    assert!(status.is_feasible());
    assert_eq!(value(&x), 1);
}

#[test]
fn opaque_without_decomposition_is_untranslatable() {
    init_tracing();
    let x = Var::integer("x", 0, 3);
    let mut model = Model::new();
    model.add(opaque("table", [&x], None));
    let err = solve(&model, &SolverConfig::default()).unwrap_err();
    assert!(matches!(err, SolverError::Untranslatable { ref expr, .. } if expr.contains("table")));
    assert_eq!(x.value(), None);
}

#[test]
fn xor_inside_a_subexpression_is_rejected() {
    init_tracing();
    let bs = Var::booleans("b", 2);
    let c = Var::boolean("c");
    let mut model = Model::new();
    model.add(Expr::or([Expr::xor(bs.iter()), c.expr()]));
    let err = solve(&model, &SolverConfig::default()).unwrap_err();
    assert!(matches!(err, SolverError::Untranslatable { .. }));
}

#[test]
fn invalid_models_are_rejected_before_solving() {
    init_tracing();
    let x = Var::integer("x", 5, 1);
    let mut model = Model::new();
    model.add(x.expr().eq(3));
    let err = solve(&model, &SolverConfig::default()).unwrap_err();
    assert!(matches!(err, SolverError::InvalidProblem(_)));
}

#[cfg(not(feature = "highs"))]
#[test]
fn unavailable_backend_fails_before_translation() {
    init_tracing();
    let x = Var::integer("x", 0, 3);
    let mut model = Model::new();
    model.add(opaque("never_translated", [&x], None));
    let config = SolverConfig::default().with_backend(SolverBackend::Highs);
    let err = solve(&model, &config).unwrap_err();
    assert!(matches!(err, SolverError::SolverNotAvailable(_)));
}

#[test]
fn worker_count_is_only_a_hint() {
    init_tracing();
    let x = Var::integer("x", 0, 9);
    let mut model = Model::new();
    model.add(x.expr().le(6)).maximize(&x);
    let config = SolverConfig::default()
        .with_backend(SolverBackend::Auto)
        .with_num_workers(4);
    let status = solve(&model, &config).unwrap();
    assert!(status.is_optimal());
    assert_eq!(value(&x), 6);
}

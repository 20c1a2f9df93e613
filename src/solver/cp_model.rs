// Native constraint model
//
// `CpModel` offers the constraint vocabulary of a CP model builder (literals,
// reification, element, all-different, min/max, non-linear arithmetic) and
// lowers every call into bounded integer columns and linear rows, the only
// input the MILP engines accept. Big-M constants are derived from column
// bounds, so every column must be bounded. Bounds and row arithmetic are
// checked; a value leaving i64 fails the call with `LoweringError::Overflow`.

use std::collections::HashMap;

use tracing::debug;

use super::linear::{Col, LinExpr, Lit, LoweringError, LoweringResult, Native, Relation};
use crate::domain::value_objects::{CmpOp, OptimizationType};

const TOLERANCE: f64 = 1e-5;

/// Integer column with inclusive bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub lb: i64,
    pub ub: i64,
    pub is_bool: bool,
}

/// `lower <= sum(coef * col) <= upper`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub terms: Vec<(Col, i64)>,
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl Row {
    pub fn activity(&self, columns: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(col, k)| k as f64 * columns[col.index()])
            .sum()
    }

    pub fn is_satisfied_by(&self, columns: &[f64]) -> bool {
        let activity = self.activity(columns);
        self.lower.map_or(true, |l| activity >= l as f64 - TOLERANCE)
            && self.upper.map_or(true, |u| activity <= u as f64 + TOLERANCE)
    }
}

#[derive(Debug, Clone)]
pub struct CpModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
    objective: Option<(OptimizationType, LinExpr)>,
    true_lit: Option<Lit>,
    encodings: HashMap<LinExpr, Vec<(i64, Lit)>>,
    max_enumeration: u64,
}

fn span(lo: i64, hi: i64) -> u64 {
    (hi as i128 - lo as i128 + 1).clamp(0, u64::MAX as i128) as u64
}

fn checked_abs(v: i64) -> LoweringResult<i64> {
    v.checked_abs().ok_or(LoweringError::Overflow)
}

impl CpModel {
    pub fn new(max_enumeration: u64) -> CpModel {
        CpModel {
            columns: Vec::new(),
            rows: Vec::new(),
            objective: None,
            true_lit: None,
            encodings: HashMap::new(),
            max_enumeration,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: Col) -> &Column {
        &self.columns[col.index()]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn objective(&self) -> Option<&(OptimizationType, LinExpr)> {
        self.objective.as_ref()
    }

    pub fn num_bool_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.is_bool).count()
    }

    fn push_column(&mut self, name: String, lb: i64, ub: i64, is_bool: bool) -> Col {
        let col = Col(self.columns.len());
        self.columns.push(Column {
            name,
            lb,
            ub,
            is_bool,
        });
        col
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> Lit {
        Lit::positive(self.push_column(name.into(), 0, 1, true))
    }

    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: impl Into<String>) -> Col {
        self.push_column(name.into(), lb, ub, false)
    }

    pub(crate) fn new_aux_bool(&mut self, prefix: &str) -> Lit {
        let name = format!("_{}{}", prefix, self.columns.len());
        self.new_bool_var(name)
    }

    pub(crate) fn new_aux_int(&mut self, prefix: &str, lb: i64, ub: i64) -> Col {
        let name = format!("_{}{}", prefix, self.columns.len());
        self.new_int_var(lb, ub, name)
    }

    /// Literal fixed to true, created on first use.
    pub fn true_lit(&mut self) -> Lit {
        if let Some(lit) = self.true_lit {
            return lit;
        }
        let lit = Lit::positive(self.push_column("_true".to_string(), 1, 1, true));
        self.true_lit = Some(lit);
        lit
    }

    pub fn constant_lit(&mut self, value: bool) -> Lit {
        let t = self.true_lit();
        if value {
            t
        } else {
            !t
        }
    }

    /// Smallest and largest value `e` can take over the column bounds.
    pub fn bounds(&self, e: &LinExpr) -> LoweringResult<(i64, i64)> {
        let mut lo = i128::from(e.constant_part());
        let mut hi = lo;
        for (col, k) in e.terms() {
            let c = &self.columns[col.index()];
            let a = i128::from(k) * i128::from(c.lb);
            let b = i128::from(k) * i128::from(c.ub);
            lo = lo.checked_add(a.min(b)).ok_or(LoweringError::Overflow)?;
            hi = hi.checked_add(a.max(b)).ok_or(LoweringError::Overflow)?;
        }
        let narrow = |v: i128| i64::try_from(v).map_err(|_| LoweringError::Overflow);
        Ok((narrow(lo)?, narrow(hi)?))
    }

    // Rows with no terms cannot be handed to every engine; an unsatisfiable
    // constant row is expressed on the fixed true column instead.
    fn push_infeasible(&mut self) {
        let t = self.true_lit();
        self.rows.push(Row {
            terms: vec![(t.col(), 1)],
            lower: None,
            upper: Some(0),
        });
    }

    // e <= 0
    fn push_le(&mut self, e: LinExpr) -> LoweringResult<()> {
        let (_, hi) = self.bounds(&e)?;
        if hi <= 0 {
            return Ok(());
        }
        if e.num_terms() == 0 {
            self.push_infeasible();
            return Ok(());
        }
        let upper = e
            .constant_part()
            .checked_neg()
            .ok_or(LoweringError::Overflow)?;
        self.rows.push(Row {
            terms: e.terms().collect(),
            lower: None,
            upper: Some(upper),
        });
        Ok(())
    }

    // e == 0
    fn push_eq(&mut self, e: LinExpr) -> LoweringResult<()> {
        let (lo, hi) = self.bounds(&e)?;
        if lo == 0 && hi == 0 {
            return Ok(());
        }
        if e.num_terms() == 0 {
            self.push_infeasible();
            return Ok(());
        }
        let rhs = e
            .constant_part()
            .checked_neg()
            .ok_or(LoweringError::Overflow)?;
        self.rows.push(Row {
            terms: e.terms().collect(),
            lower: Some(rhs),
            upper: Some(rhs),
        });
        Ok(())
    }

    /// `(all of enforce) -> e <= 0`, relaxed by `max(e)` for each false
    /// enforcement literal.
    pub fn add_enforced_le(&mut self, e: LinExpr, enforce: &[Lit]) -> LoweringResult<()> {
        let (_, big_m) = self.bounds(&e)?;
        if big_m <= 0 {
            return Ok(());
        }
        let mut row = e;
        for &lit in enforce {
            row = row.minus((!lit).to_linear().scale(big_m)?)?;
        }
        self.push_le(row)
    }

    /// Post `rel` unconditionally.
    pub fn add_linear(&mut self, rel: &Relation) -> LoweringResult<()> {
        self.add_enforced(rel, &[])
    }

    /// Post `rel` only when every enforcement literal is true
    /// (half-reification).
    pub fn add_enforced(&mut self, rel: &Relation, enforce: &[Lit]) -> LoweringResult<()> {
        let diff = rel.difference()?;
        match rel.op {
            CmpOp::Le => self.add_enforced_le(diff, enforce),
            CmpOp::Lt => self.add_enforced_le(diff.plus(1)?, enforce),
            CmpOp::Ge => self.add_enforced_le(diff.negated()?, enforce),
            CmpOp::Gt => self.add_enforced_le(diff.negated()?.plus(1)?, enforce),
            CmpOp::Eq if enforce.is_empty() => self.push_eq(diff),
            CmpOp::Eq => {
                self.add_enforced_le(diff.clone(), enforce)?;
                self.add_enforced_le(diff.negated()?, enforce)
            }
            CmpOp::Ne => self.add_not_equal(diff, enforce),
        }
    }

    fn add_not_equal(&mut self, diff: LinExpr, enforce: &[Lit]) -> LoweringResult<()> {
        let (lo, hi) = self.bounds(&diff)?;
        if lo > 0 || hi < 0 {
            return Ok(());
        }
        if lo == 0 {
            return self.add_enforced_le(diff.negated()?.plus(1)?, enforce);
        }
        if hi == 0 {
            return self.add_enforced_le(diff.plus(1)?, enforce);
        }
        let below = self.new_aux_bool("ne");
        let mut with = enforce.to_vec();
        with.push(below);
        self.add_enforced_le(diff.clone().plus(1)?, &with)?;
        with.pop();
        with.push(!below);
        self.add_enforced_le(diff.negated()?.plus(1)?, &with)
    }

    /// Truth value of `rel` when the bounds already decide it.
    pub fn truth(&self, rel: &Relation) -> LoweringResult<Option<bool>> {
        let (lo, hi) = self.bounds(&rel.difference()?)?;
        let decide = |always: bool, never: bool| {
            if always {
                Some(true)
            } else if never {
                Some(false)
            } else {
                None
            }
        };
        Ok(match rel.op {
            CmpOp::Eq => decide(lo == 0 && hi == 0, lo > 0 || hi < 0),
            CmpOp::Ne => decide(lo > 0 || hi < 0, lo == 0 && hi == 0),
            CmpOp::Le => decide(hi <= 0, lo > 0),
            CmpOp::Lt => decide(hi < 0, lo >= 0),
            CmpOp::Ge => decide(lo >= 0, hi < 0),
            CmpOp::Gt => decide(lo > 0, hi <= 0),
        })
    }

    /// Literal equivalent to `rel` (full two-sided reification).
    pub fn reify(&mut self, rel: &Relation) -> LoweringResult<Lit> {
        if let Some(value) = self.truth(rel)? {
            return Ok(self.constant_lit(value));
        }
        let r = self.new_aux_bool("reif");
        self.add_enforced(rel, &[r])?;
        self.add_enforced(&rel.negated(), &[!r])?;
        Ok(r)
    }

    pub fn add_bool_or(&mut self, lits: &[Lit], enforce: &[Lit]) -> LoweringResult<()> {
        let e = lits
            .iter()
            .try_fold(LinExpr::constant(1), |acc, &l| acc.minus(l))?;
        self.add_enforced_le(e, enforce)
    }

    /// `a -> b` as the clause `!a | b`.
    pub fn add_implication(&mut self, a: Lit, b: Lit) -> LoweringResult<()> {
        self.add_bool_or(&[!a, b], &[])
    }

    /// Odd number of true literals: `sum(lits) - 2k == 1`.
    pub fn add_bool_xor(&mut self, lits: &[Lit], enforce: &[Lit]) -> LoweringResult<()> {
        if lits.is_empty() {
            return self.add_bool_or(&[], enforce);
        }
        let n = lits.len() as i64;
        let half = self.new_aux_int("xor", 0, (n - 1) / 2);
        let parity = lits
            .iter()
            .try_fold(LinExpr::default(), |acc, &l| acc.plus(l))?
            .minus(LinExpr::term(half, 2))?;
        self.add_enforced(&Relation::new(parity, CmpOp::Eq, 1), enforce)
    }

    pub fn and_lit(&mut self, lits: &[Lit]) -> LoweringResult<Lit> {
        match lits {
            [] => return Ok(self.constant_lit(true)),
            [l] => return Ok(*l),
            _ => {}
        }
        let r = self.new_aux_bool("and");
        for &l in lits {
            self.add_bool_or(&[!r, l], &[])?;
        }
        let mut clause: Vec<Lit> = lits.iter().map(|&l| !l).collect();
        clause.push(r);
        self.add_bool_or(&clause, &[])?;
        Ok(r)
    }

    pub fn or_lit(&mut self, lits: &[Lit]) -> LoweringResult<Lit> {
        match lits {
            [] => return Ok(self.constant_lit(false)),
            [l] => return Ok(*l),
            _ => {}
        }
        let r = self.new_aux_bool("or");
        for &l in lits {
            self.add_bool_or(&[!l, r], &[])?;
        }
        let mut clause = lits.to_vec();
        clause.push(!r);
        self.add_bool_or(&clause, &[])?;
        Ok(r)
    }

    /// Pairwise distinct values.
    pub fn add_all_different(&mut self, exprs: &[LinExpr], enforce: &[Lit]) -> LoweringResult<()> {
        for (i, a) in exprs.iter().enumerate() {
            for b in &exprs[i + 1..] {
                self.add_enforced(&Relation::new(a.clone(), CmpOp::Ne, b.clone()), enforce)?;
            }
        }
        Ok(())
    }

    pub fn add_min_equality(&mut self, target: &LinExpr, exprs: &[LinExpr]) -> LoweringResult<()> {
        self.add_extremum(target, exprs, CmpOp::Le)
    }

    pub fn add_max_equality(&mut self, target: &LinExpr, exprs: &[LinExpr]) -> LoweringResult<()> {
        self.add_extremum(target, exprs, CmpOp::Ge)
    }

    // target `op` every expression, and equal to at least one of them
    fn add_extremum(&mut self, target: &LinExpr, exprs: &[LinExpr], op: CmpOp) -> LoweringResult<()> {
        let mut witnesses = Vec::with_capacity(exprs.len());
        for e in exprs {
            self.add_linear(&Relation::new(target.clone(), op, e.clone()))?;
            let witness = self.new_aux_bool("witness");
            self.add_enforced(
                &Relation::new(target.clone(), CmpOp::Eq, e.clone()),
                &[witness],
            )?;
            witnesses.push(witness);
        }
        self.add_bool_or(&witnesses, &[])
    }

    /// `array[index] == target`; index values outside the array are
    /// forbidden.
    pub fn add_element(
        &mut self,
        index: &LinExpr,
        array: &[LinExpr],
        target: &LinExpr,
        enforce: &[Lit],
    ) -> LoweringResult<()> {
        for (v, selected) in self.value_encoding(index)? {
            match usize::try_from(v).ok().and_then(|i| array.get(i)) {
                Some(item) => {
                    let mut with = enforce.to_vec();
                    with.push(selected);
                    self.add_enforced(
                        &Relation::new(target.clone(), CmpOp::Eq, item.clone()),
                        &with,
                    )?;
                }
                None => self.add_bool_or(&[!selected], enforce)?,
            }
        }
        Ok(())
    }

    /// One literal per value of `e`, exactly one of them true, channelled
    /// with `e`. Encodings are shared between callers.
    pub fn value_encoding(&mut self, e: &LinExpr) -> LoweringResult<Vec<(i64, Lit)>> {
        let (lo, hi) = self.bounds(e)?;
        if lo == hi {
            let t = self.true_lit();
            return Ok(vec![(lo, t)]);
        }
        if let Some(encoding) = self.encodings.get(e) {
            return Ok(encoding.clone());
        }
        let size = span(lo, hi);
        if size > self.max_enumeration {
            return Err(LoweringError::DomainTooLarge {
                size,
                limit: self.max_enumeration,
            });
        }
        debug!(expr = %e, size, "encoding domain by value");
        let mut encoding = Vec::with_capacity(size as usize);
        let mut one_hot = LinExpr::default();
        let mut channel = e.clone();
        for v in lo..=hi {
            let lit = self.new_aux_bool("val");
            one_hot = one_hot.plus(lit)?;
            channel = channel.minus(LinExpr::from(lit).scale(v)?)?;
            encoding.push((v, lit));
        }
        self.push_eq(one_hot.minus(1)?)?;
        self.push_eq(channel)?;
        self.encodings.insert(e.clone(), encoding.clone());
        Ok(encoding)
    }

    // Literal view of a 0/1 column used as `col` or `1 - col`.
    fn literal_view(&self, e: &LinExpr) -> Option<Lit> {
        if e.num_terms() != 1 {
            return None;
        }
        let (col, k) = e.terms().next()?;
        let c = &self.columns[col.index()];
        if c.lb < 0 || c.ub > 1 {
            return None;
        }
        match (k, e.constant_part()) {
            (1, 0) => Some(Lit::positive(col)),
            (-1, 1) => Some(!Lit::positive(col)),
            _ => None,
        }
    }

    pub fn abs(&mut self, e: LinExpr) -> LoweringResult<LinExpr> {
        let (lo, hi) = self.bounds(&e)?;
        if lo >= 0 {
            return Ok(e);
        }
        if hi <= 0 {
            return e.negated();
        }
        let y = self.new_aux_int("abs", 0, hi.max(checked_abs(lo)?));
        let positive = self.new_aux_bool("sign");
        self.add_enforced(&Relation::new(y, CmpOp::Eq, e.clone()), &[positive])?;
        self.add_enforced(&Relation::new(y, CmpOp::Eq, e.negated()?), &[!positive])?;
        Ok(LinExpr::from(y))
    }

    pub fn product(&mut self, a: LinExpr, b: LinExpr) -> LoweringResult<LinExpr> {
        if let Some(k) = a.as_constant() {
            return b.scale(k);
        }
        if let Some(k) = b.as_constant() {
            return a.scale(k);
        }
        if let Some(lit) = self.literal_view(&a) {
            return self.bool_times(lit, b);
        }
        if let Some(lit) = self.literal_view(&b) {
            return self.bool_times(lit, a);
        }
        let (alo, ahi) = self.bounds(&a)?;
        let (blo, bhi) = self.bounds(&b)?;
        let corners = [
            i128::from(alo) * i128::from(blo),
            i128::from(alo) * i128::from(bhi),
            i128::from(ahi) * i128::from(blo),
            i128::from(ahi) * i128::from(bhi),
        ];
        let narrow = |v: Option<i128>| {
            v.and_then(|v| i64::try_from(v).ok())
                .ok_or(LoweringError::Overflow)
        };
        let lo = narrow(corners.iter().copied().min())?;
        let hi = narrow(corners.iter().copied().max())?;
        let (small, other) = if span(alo, ahi) <= span(blo, bhi) {
            (a, b)
        } else {
            (b, a)
        };
        let encoding = self.value_encoding(&small)?;
        let y = self.new_aux_int("mul", lo, hi);
        for (v, lit) in encoding {
            self.add_enforced(&Relation::new(y, CmpOp::Eq, other.clone().scale(v)?), &[lit])?;
        }
        Ok(LinExpr::from(y))
    }

    fn bool_times(&mut self, lit: Lit, e: LinExpr) -> LoweringResult<LinExpr> {
        let (lo, hi) = self.bounds(&e)?;
        let y = self.new_aux_int("mul", lo.min(0), hi.max(0));
        self.add_enforced(&Relation::new(y, CmpOp::Eq, e), &[lit])?;
        self.add_enforced(&Relation::new(y, CmpOp::Eq, 0), &[!lit])?;
        Ok(LinExpr::from(y))
    }

    /// Quotient truncated toward zero.
    pub fn division(&mut self, a: LinExpr, b: LinExpr) -> LoweringResult<LinExpr> {
        Ok(self.div_mod(a, b)?.0)
    }

    /// Remainder with the sign of the dividend.
    pub fn modulo(&mut self, a: LinExpr, b: LinExpr) -> LoweringResult<LinExpr> {
        Ok(self.div_mod(a, b)?.1)
    }

    // a == b * q + r with |r| < |b| and r carrying the sign of a. The
    // divisor's domain must exclude zero, so the quotient is defined in
    // every context the value is used in.
    fn div_mod(&mut self, a: LinExpr, b: LinExpr) -> LoweringResult<(LinExpr, LinExpr)> {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            if y == 0 {
                return Err(LoweringError::DivisionByZero);
            }
            let q = x.checked_div(y).ok_or(LoweringError::Overflow)?;
            let r = x.checked_rem(y).ok_or(LoweringError::Overflow)?;
            return Ok((LinExpr::constant(q), LinExpr::constant(r)));
        }
        let (blo, bhi) = self.bounds(&b)?;
        if blo == 0 && bhi == 0 {
            return Err(LoweringError::DivisionByZero);
        }
        if blo <= 0 && bhi >= 0 {
            return Err(LoweringError::DivisorMayBeZero { lo: blo, hi: bhi });
        }
        let cases: Vec<(i64, Option<Lit>)> = match b.as_constant() {
            Some(v) => vec![(v, None)],
            None => self
                .value_encoding(&b)?
                .into_iter()
                .map(|(v, lit)| (v, Some(lit)))
                .collect(),
        };
        let (vmin, vmax) = {
            let (p, q) = (checked_abs(blo)?, checked_abs(bhi)?);
            (p.min(q), p.max(q))
        };

        let (alo, ahi) = self.bounds(&a)?;
        let amax = checked_abs(alo)?.max(checked_abs(ahi)?);
        let qmax = amax / vmin;
        let rmax = (vmax - 1).min(amax);
        let q = self.new_aux_int("div", -qmax, qmax);
        let r = self.new_aux_int(
            "mod",
            if alo < 0 { -rmax } else { 0 },
            if ahi > 0 { rmax } else { 0 },
        );
        if alo < 0 && ahi > 0 {
            let nonneg = self.reify(&Relation::new(a.clone(), CmpOp::Ge, 0))?;
            self.add_enforced(&Relation::new(r, CmpOp::Ge, 0), &[nonneg])?;
            self.add_enforced(&Relation::new(r, CmpOp::Le, 0), &[!nonneg])?;
        }
        for (v, lit) in cases {
            let enforce: Vec<Lit> = lit.into_iter().collect();
            let rebuilt = LinExpr::term(q, v).plus(r)?;
            self.add_enforced(&Relation::new(a.clone(), CmpOp::Eq, rebuilt), &enforce)?;
            let bound = checked_abs(v)? - 1;
            self.add_enforced(&Relation::new(r, CmpOp::Le, bound), &enforce)?;
            self.add_enforced(&Relation::new(r, CmpOp::Ge, -bound), &enforce)?;
        }
        Ok((LinExpr::from(q), LinExpr::from(r)))
    }

    pub fn power(&mut self, base: LinExpr, exponent: i64) -> LoweringResult<LinExpr> {
        if !(0..=63).contains(&exponent) {
            return Err(LoweringError::BadExponent(exponent.to_string()));
        }
        if let Some(b) = base.as_constant() {
            return b
                .checked_pow(exponent as u32)
                .map(LinExpr::constant)
                .ok_or(LoweringError::Overflow);
        }
        let mut acc = LinExpr::constant(1);
        for _ in 0..exponent {
            acc = self.product(acc, base.clone())?;
        }
        Ok(acc)
    }

    pub fn minimize(&mut self, e: LinExpr) {
        self.objective = Some((OptimizationType::Minimize, e));
    }

    pub fn maximize(&mut self, e: LinExpr) {
        self.objective = Some((OptimizationType::Maximize, e));
    }

    /// Integer form of a converted value; relations are reified.
    pub fn linear_of(&mut self, value: Native) -> LoweringResult<LinExpr> {
        match value {
            Native::Const(c) => Ok(LinExpr::constant(c)),
            Native::Lit(lit) => Ok(lit.to_linear()),
            Native::Int(col) => Ok(LinExpr::from(col)),
            Native::Linear(e) => Ok(e),
            Native::Relation(rel) => Ok(self.reify(&rel)?.to_linear()),
            Native::Seq(items) => Err(LoweringError::NotScalar(items.len())),
        }
    }

    /// Literal form of a converted value. Integers qualify only when their
    /// domain lies within {0, 1}.
    pub fn literal_of(&mut self, value: Native) -> LoweringResult<Lit> {
        match value {
            Native::Const(c) => Ok(self.constant_lit(c != 0)),
            Native::Lit(lit) => Ok(lit),
            Native::Relation(rel) => self.reify(&rel),
            Native::Seq(items) => Err(LoweringError::NotScalar(items.len())),
            Native::Int(col) => self.boolean_view(LinExpr::from(col)),
            Native::Linear(e) => self.boolean_view(e),
        }
    }

    fn boolean_view(&mut self, e: LinExpr) -> LoweringResult<Lit> {
        if let Some(lit) = self.literal_view(&e) {
            return Ok(lit);
        }
        let (lo, hi) = self.bounds(&e)?;
        if lo >= 0 && hi <= 1 {
            return self.reify(&Relation::new(e, CmpOp::Eq, 1));
        }
        Err(LoweringError::NotBoolean(format!(
            "integer expression with domain [{}, {}]",
            lo, hi
        )))
    }

    /// Whether an engine assignment respects bounds, integrality and rows.
    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        if values.len() != self.columns.len() {
            return false;
        }
        let columns_ok = self.columns.iter().zip(values).all(|(c, &v)| {
            v >= c.lb as f64 - TOLERANCE
                && v <= c.ub as f64 + TOLERANCE
                && (v - v.round()).abs() <= TOLERANCE
        });
        columns_ok && self.rows.iter().all(|row| row.is_satisfied_by(values))
    }
}

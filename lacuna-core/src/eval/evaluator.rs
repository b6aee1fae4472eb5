// In: src/eval/evaluator.rs

//! The central propagation routine.
//!
//! Every dynamic operation goes through `Evaluator`, which looks up the
//! operation's `Policy` and resolves Missing operands by that policy before a
//! scalar kernel from `promote` ever sees a value. Element-wise forms infer
//! the result's possible kinds from the operand kind sets and build the
//! result through `make_collection`, so the storage strategy of a result is
//! chosen the same way as for any other collection.

use std::sync::Arc;

use crate::adapter::coalesce::coalesce;
use crate::config::LacunaConfig;
use crate::error::{LacunaError, Result};
use crate::eval::classify::{Arity, Operation, OperationTable, Policy, PropagationBehavior};
use crate::eval::promote;
use crate::logic::control;
use crate::logic::kleene::{self, Tri};
use crate::logic::order::{sort_missing_last, SortOrd};
use crate::slot::Slot;
use crate::storage::{make_collection, Column, InitialState};
use crate::types::{ElementKind, Scalar, Value};

/// One side of an element-wise operation.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Column(&'a Column),
    /// Broadcast against every position.
    Scalar(Value),
}

impl<'a> Operand<'a> {
    fn len(&self) -> Option<usize> {
        match self {
            Operand::Column(c) => Some(c.len()),
            Operand::Scalar(_) => None,
        }
    }

    fn kinds(&self) -> Vec<ElementKind> {
        match self {
            Operand::Column(c) => c.kinds().to_vec(),
            Operand::Scalar(Slot::Value(s)) => vec![s.kind()],
            Operand::Scalar(Slot::Missing) => Vec::new(),
        }
    }

    fn get(&self, i: usize) -> Result<Value> {
        match self {
            Operand::Column(c) => c.get(i),
            Operand::Scalar(v) => Ok(v.clone()),
        }
    }
}

impl<'a> From<&'a Column> for Operand<'a> {
    fn from(column: &'a Column) -> Self {
        Operand::Column(column)
    }
}

impl From<Value> for Operand<'_> {
    fn from(value: Value) -> Self {
        Operand::Scalar(value)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(scalar: Scalar) -> Self {
        Operand::Scalar(Slot::Value(scalar))
    }
}

fn boolean(b: bool) -> Value {
    Slot::Value(Scalar::Boolean(b))
}

fn from_tri(t: Tri) -> Value {
    t.map(Scalar::Boolean)
}

/// Reads a value as a three-valued boolean.
fn to_tri(op: Operation, v: &Value) -> Result<Tri> {
    match v {
        Slot::Missing => Ok(Slot::Missing),
        Slot::Value(Scalar::Boolean(b)) => Ok(Slot::Value(*b)),
        Slot::Value(other) => Err(LacunaError::type_mismatch(
            op.name(),
            "Union{Boolean, Missing}",
            other.kind().to_string(),
        )),
    }
}

fn check_arity(op: Operation, arity: Arity, found: usize) -> Result<()> {
    if op.arity() == arity {
        return Ok(());
    }
    Err(LacunaError::Arity {
        op: op.name(),
        expected: op.arity().operand_count().unwrap_or(found),
        found,
    })
}

// Same kind and identity-equal: distinguishes `Int8(1)` from `Int64(1)` and
// treats NaN as identical to itself.
fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Slot::Value(x), Slot::Value(y)) => x.kind() == y.kind() && x.sort_eq(y),
        (Slot::Missing, Slot::Missing) => true,
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    config: Arc<LacunaConfig>,
    table: OperationTable,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Arc::new(LacunaConfig::default()))
    }
}

impl Evaluator {
    pub fn new(config: Arc<LacunaConfig>) -> Self {
        let table = OperationTable::new(&config.evaluator);
        Self { config, table }
    }

    pub fn config(&self) -> &LacunaConfig {
        &self.config
    }

    pub fn table(&self) -> &OperationTable {
        &self.table
    }

    /// Registers a named operation for [`apply_named`](Self::apply_named).
    pub fn register(&mut self, name: impl Into<String>, policy: Policy) -> Option<Policy> {
        self.table.register(name, policy)
    }

    //==============================================================================
    // 1. Scalar entry points
    //==============================================================================

    pub fn unary(&self, op: Operation, x: &Value) -> Result<Value> {
        check_arity(op, Arity::Unary, 1)?;
        match op.policy() {
            Policy::AutoPropagate => match x {
                Slot::Missing => Ok(Slot::Missing),
                Slot::Value(s) => promote::apply_unary(op, s).map(Slot::Value),
            },
            // IsMissing
            Policy::AlwaysBoolean => Ok(boolean(x.is_missing())),
            // Not
            Policy::Kleene => Ok(from_tri(kleene::not(to_tri(op, x)?))),
            // Branch
            Policy::ControlFlow => control::branch(op.name(), to_tri(op, x)?).map(boolean),
            Policy::Comparison | Policy::ExplicitRemoval => Err(LacunaError::InternalError(
                format!("{} is classified unary but has no unary semantics", op),
            )),
        }
    }

    pub fn binary(&self, op: Operation, lhs: &Value, rhs: &Value) -> Result<Value> {
        check_arity(op, Arity::Binary, 2)?;
        match op.policy() {
            Policy::AutoPropagate | Policy::Comparison => match (lhs, rhs) {
                (Slot::Value(a), Slot::Value(b)) => promote::apply_binary(op, a, b).map(Slot::Value),
                _ => Ok(Slot::Missing),
            },
            Policy::AlwaysBoolean => Ok(boolean(match op {
                Operation::Identical => identical(lhs, rhs),
                Operation::SortEq => lhs.sort_eq(rhs),
                _ => lhs.sort_less(rhs),
            })),
            Policy::Kleene => {
                let (a, b) = (to_tri(op, lhs)?, to_tri(op, rhs)?);
                Ok(from_tri(match op {
                    Operation::And => kleene::and(a, b),
                    Operation::Or => kleene::or(a, b),
                    _ => kleene::xor(a, b),
                }))
            }
            Policy::ControlFlow => {
                let (a, b) = (to_tri(op, lhs)?, to_tri(op, rhs)?);
                let out = if op == Operation::ShortAnd {
                    control::short_and(a, || b)?
                } else {
                    control::short_or(a, || b)?
                };
                Ok(from_tri(out))
            }
            Policy::ExplicitRemoval => Err(LacunaError::InternalError(format!(
                "{} is classified binary but has no binary semantics",
                op
            ))),
        }
    }

    /// Short-circuit `&&` with a lazily evaluated right-hand side.
    pub fn short_and<F>(&self, lhs: &Value, rhs: F) -> Result<Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        if control::branch("&&", to_tri(Operation::ShortAnd, lhs)?)? {
            let tail = rhs()?;
            to_tri(Operation::ShortAnd, &tail)?;
            Ok(tail)
        } else {
            Ok(boolean(false))
        }
    }

    /// Short-circuit `||` with a lazily evaluated right-hand side.
    pub fn short_or<F>(&self, lhs: &Value, rhs: F) -> Result<Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        if control::branch("||", to_tri(Operation::ShortOr, lhs)?)? {
            Ok(boolean(true))
        } else {
            let tail = rhs()?;
            to_tri(Operation::ShortOr, &tail)?;
            Ok(tail)
        }
    }

    /// Resolves a condition for an `if`/`while`.
    pub fn branch(&self, condition: &Value) -> Result<bool> {
        control::branch("branch", to_tri(Operation::Branch, condition)?)
    }

    /// Applies a caller-supplied kernel under the policy registered for
    /// `name`.
    ///
    /// * `AutoPropagate` (also the default for unknown names): the kernel is
    ///   not called when any argument is Missing; the result is Missing.
    /// * `ControlFlow`: a Missing argument is a `ControlFlowOnMissing` fault.
    /// * Every other policy hands Missing to the kernel unchanged.
    ///
    /// # Errors
    /// `UndefinedOperation` for an unknown name under `UnclassifiedPolicy::Reject`.
    pub fn apply_named<F>(&self, name: &str, args: &[Value], kernel: F) -> Result<Value>
    where
        F: FnOnce(&[Value]) -> Result<Value>,
    {
        let policy = self.table.classify(name)?;
        match policy {
            Policy::AutoPropagate if args.iter().any(Slot::is_missing) => {
                log::trace!("apply_named: '{}' propagated Missing", name);
                Ok(Slot::Missing)
            }
            Policy::ControlFlow if args.iter().any(Slot::is_missing) => {
                log::debug!("apply_named: '{}' received Missing in a control-flow position", name);
                Err(LacunaError::control_flow("apply_named"))
            }
            _ => kernel(args),
        }
    }

    //==============================================================================
    // 2. Element-wise entry points
    //==============================================================================

    pub fn map_unary(&self, op: Operation, column: &Column) -> Result<Column> {
        check_arity(op, Arity::Unary, 1)?;
        let kinds = unary_kinds(op, column.kinds())?;
        log_metric!("event"="map_unary", "op"=op, "len"=column.len(), "result_kinds"=kinds.len());
        let values = column
            .iter()
            .map(|v| self.unary(op, &v))
            .collect::<Result<Vec<_>>>()?;
        make_collection(&kinds, values.len(), InitialState::FromSequence(values))
    }

    /// Element-wise binary operation. Two columns must have equal length; a
    /// scalar operand broadcasts. Two scalars give a one-slot column.
    pub fn map_binary(&self, op: Operation, lhs: Operand<'_>, rhs: Operand<'_>) -> Result<Column> {
        check_arity(op, Arity::Binary, 2)?;
        let len = match (lhs.len(), rhs.len()) {
            (Some(l), Some(r)) if l != r => {
                return Err(LacunaError::length_mismatch(op.name(), l, r))
            }
            (Some(l), _) | (None, Some(l)) => l,
            (None, None) => 1,
        };
        let kinds = binary_kinds(op, &lhs.kinds(), &rhs.kinds())?;
        log_metric!("event"="map_binary", "op"=op, "len"=len, "result_kinds"=kinds.len());

        let mut values = Vec::with_capacity(len);
        for i in 0..len {
            values.push(self.binary(op, &lhs.get(i)?, &rhs.get(i)?)?);
        }
        make_collection(&kinds, len, InitialState::FromSequence(values))
    }

    //==============================================================================
    // 3. Whole-collection entry points
    //==============================================================================

    /// Folds a column into one value: `Sum`, `Prod`, `Minimum`, `Maximum`,
    /// `Mean`, `All`, `Any` or `Coalesce`.
    pub fn reduce(&self, op: Operation, column: &Column) -> Result<Value> {
        use Operation::*;
        match op {
            Sum | Prod => {
                let step = if op == Sum { Add } else { Mul };
                let mut acc = identity_element(op, column.kinds())?;
                for v in column.iter() {
                    match v {
                        Slot::Missing => return Ok(Slot::Missing),
                        Slot::Value(s) => acc = promote::apply_binary(step, &acc, &s)?,
                    }
                }
                Ok(Slot::Value(acc))
            }
            Minimum | Maximum => {
                let step = if op == Minimum { Min } else { Max };
                let mut acc: Option<Scalar> = None;
                for v in column.iter() {
                    let s = match v {
                        Slot::Missing => return Ok(Slot::Missing),
                        Slot::Value(s) => s,
                    };
                    acc = Some(match acc {
                        None => extremum(step, &s, &s)?,
                        Some(a) => extremum(step, &a, &s)?,
                    });
                }
                acc.map(Slot::Value)
                    .ok_or(LacunaError::EmptyReduction { op: op.name() })
            }
            Mean => {
                let mut total = 0.0;
                let mut count = 0usize;
                for v in column.iter() {
                    let s = match v {
                        Slot::Missing => return Ok(Slot::Missing),
                        Slot::Value(s) => s,
                    };
                    total += s.as_f64().ok_or_else(|| {
                        LacunaError::type_mismatch("mean", "a numeric kind", s.kind().to_string())
                    })?;
                    count += 1;
                }
                if count == 0 {
                    return Err(LacunaError::EmptyReduction { op: "mean" });
                }
                Ok(Slot::Value(Scalar::Float64(total / count as f64)))
            }
            All | Any => {
                let tris = column
                    .iter()
                    .map(|v| to_tri(op, &v))
                    .collect::<Result<Vec<_>>>()?;
                let out = if op == All {
                    crate::logic::compare::all(tris)
                } else {
                    crate::logic::compare::any(tris)
                };
                Ok(from_tri(out))
            }
            Coalesce => Ok(coalesce(column.iter())),
            _ => Err(LacunaError::Arity {
                op: op.name(),
                expected: op.arity().operand_count().unwrap_or(1),
                found: column.len(),
            }),
        }
    }

    /// Aggregate comparison of two whole columns.
    ///
    /// `Eq`/`Ne` compare element-wise and stop at the first definitely unequal
    /// pair; columns of different length are definitely unequal. The ordering
    /// comparisons are lexicographic: the first position that is not definitely
    /// equal decides, Missing there gives Missing, and an exhausted common
    /// prefix compares lengths.
    pub fn compare_columns(&self, op: Operation, lhs: &Column, rhs: &Column) -> Result<Value> {
        use Operation::*;
        if !op.is_comparison() {
            return Err(LacunaError::type_mismatch(
                "compare_columns",
                "a value comparison",
                op.name(),
            ));
        }
        match op {
            Eq => return Ok(from_tri(self.columns_equal(lhs, rhs)?)),
            Ne => return Ok(from_tri(kleene::not(self.columns_equal(lhs, rhs)?))),
            _ => {}
        }

        for (a, b) in lhs.iter().zip(rhs.iter()) {
            match self.binary(Eq, &a, &b)? {
                Slot::Value(Scalar::Boolean(true)) => continue,
                Slot::Missing => return Ok(Slot::Missing),
                _ => return self.binary(op, &a, &b),
            }
        }
        let (l, r) = (lhs.len(), rhs.len());
        Ok(boolean(match op {
            Lt => l < r,
            Le => l <= r,
            Gt => l > r,
            _ => l >= r,
        }))
    }

    fn columns_equal(&self, lhs: &Column, rhs: &Column) -> Result<Tri> {
        if lhs.len() != rhs.len() {
            return Ok(kleene::FALSE);
        }
        let mut saw_missing = false;
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            match to_tri(Operation::Eq, &self.binary(Operation::Eq, &a, &b)?)? {
                Slot::Value(false) => return Ok(kleene::FALSE),
                Slot::Value(true) => {}
                Slot::Missing => saw_missing = true,
            }
        }
        Ok(if saw_missing { Slot::Missing } else { kleene::TRUE })
    }

    /// Membership test: `true` on the first equal element, otherwise Missing
    /// if any comparison was Missing.
    pub fn contains(&self, column: &Column, needle: &Value) -> Result<Value> {
        let mut acc = kleene::FALSE;
        for v in column.iter() {
            let eq = to_tri(Operation::Contains, &self.binary(Operation::Eq, &v, needle)?)?;
            acc = kleene::or(acc, eq);
            if acc == kleene::TRUE {
                break;
            }
        }
        Ok(from_tri(acc))
    }

    /// First present value among the candidates.
    pub fn coalesce_values(&self, candidates: &[Value]) -> Value {
        coalesce(candidates.iter().cloned())
    }

    /// Element-wise coalesce with scalar broadcasting.
    pub fn coalesce_columns(&self, candidates: &[Operand<'_>]) -> Result<Column> {
        if candidates.is_empty() {
            return Err(LacunaError::Arity {
                op: "coalesce",
                expected: 1,
                found: 0,
            });
        }
        let mut len: Option<usize> = None;
        let mut kinds: Vec<ElementKind> = Vec::new();
        for candidate in candidates {
            if let Some(n) = candidate.len() {
                match len {
                    Some(m) if m != n => return Err(LacunaError::length_mismatch("coalesce", m, n)),
                    _ => len = Some(n),
                }
            }
            for kind in candidate.kinds() {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        let len = len.unwrap_or(1);
        let mut values = Vec::with_capacity(len);
        for i in 0..len {
            let mut slot = Slot::Missing;
            for candidate in candidates {
                let v = candidate.get(i)?;
                if v.is_value() {
                    slot = v;
                    break;
                }
            }
            values.push(slot);
        }
        make_collection(&kinds, len, InitialState::FromSequence(values))
    }

    /// A sorted copy of `column`, with Missing after every present value.
    pub fn sort(&self, column: &Column) -> Result<Column> {
        let mut values: Vec<Value> = column.iter().collect();
        sort_missing_last(&mut values);
        let sorted = make_collection(
            column.kinds(),
            values.len(),
            InitialState::FromSequence(values),
        )?;
        if column.missing_capable() {
            return Ok(sorted);
        }
        sorted
            .narrow()
            .ok_or_else(|| LacunaError::InternalError("sort introduced a missing slot".into()))
    }
}

//==================================================================================
// 4. Result-kind inference
//==================================================================================

fn unary_kinds(op: Operation, input: &[ElementKind]) -> Result<Vec<ElementKind>> {
    if op.policy() != Policy::AutoPropagate {
        return Ok(vec![ElementKind::Boolean]);
    }
    let mut out = Vec::new();
    let mut last_err = None;
    for &kind in input {
        match promote::unary_result_kind(op, kind) {
            Ok(k) if !out.contains(&k) => out.push(k),
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) if out.is_empty() => Err(e),
        _ => Ok(out),
    }
}

fn binary_kinds(op: Operation, lhs: &[ElementKind], rhs: &[ElementKind]) -> Result<Vec<ElementKind>> {
    if op.policy() != Policy::AutoPropagate {
        return Ok(vec![ElementKind::Boolean]);
    }
    let mut out = Vec::new();
    let mut last_err = None;
    for &l in lhs {
        for &r in rhs {
            match promote::result_kind(op, l, r) {
                Ok(k) if !out.contains(&k) => out.push(k),
                Ok(_) => {}
                Err(e) => last_err = Some(e),
            }
        }
    }
    match last_err {
        Some(e) if out.is_empty() => Err(e),
        _ => Ok(out),
    }
}

/// One step of a `Minimum`/`Maximum` fold. Strings pick by their order;
/// everything else goes through the numeric kernel.
fn extremum(step: Operation, acc: &Scalar, next: &Scalar) -> Result<Scalar> {
    match (acc, next) {
        (Scalar::Utf8(a), Scalar::Utf8(b)) => {
            let take_next = if step == Operation::Min { b < a } else { b > a };
            Ok(if take_next { next.clone() } else { acc.clone() })
        }
        _ => promote::apply_binary(step, acc, next),
    }
}

/// Zero (for `Sum`) or one (for `Prod`) of the kind the fold produces.
fn identity_element(op: Operation, kinds: &[ElementKind]) -> Result<Scalar> {
    let step = if op == Operation::Sum { Operation::Add } else { Operation::Mul };
    let mut kind = match kinds.first() {
        Some(&k) => promote::result_kind(step, k, k)?,
        None => ElementKind::Int64,
    };
    for &k in kinds.iter().skip(1) {
        kind = promote::result_kind(step, kind, k)?;
    }
    let unit = if op == Operation::Sum { 0 } else { 1 };
    match kind {
        ElementKind::Float32 => Ok(Scalar::Float32(unit as f32)),
        ElementKind::Float64 => Ok(Scalar::Float64(unit as f64)),
        k => Scalar::from_i128(k, unit).ok_or_else(|| {
            LacunaError::InternalError(format!("no identity element for {} over {}", op, k))
        }),
    }
}

//! Suite for the central propagation routine: one test group per policy, then
//! the element-wise and whole-collection entry points.

use std::sync::Arc;

use crate::config::{EvaluatorConfig, LacunaConfig, UnclassifiedPolicy};
use crate::error::LacunaError;
use crate::eval::classify::{Operation, Policy};
use crate::eval::evaluator::{Evaluator, Operand};
use crate::slot::Slot;
use crate::storage::{make_collection, Column, InitialState};
use crate::types::{ElementKind, Scalar, Value};

// Test Helpers
fn int(v: i64) -> Value {
    Slot::Value(Scalar::Int64(v))
}

fn tri(v: Option<bool>) -> Value {
    Slot::from(v.map(Scalar::Boolean))
}

const M: Value = Slot::Missing;

fn int_column(values: &[Option<i64>]) -> Column {
    let seq: Vec<Value> = values
        .iter()
        .map(|v| Slot::from(v.map(Scalar::Int64)))
        .collect();
    make_collection(&[ElementKind::Int64], seq.len(), InitialState::FromSequence(seq)).unwrap()
}

fn bool_column(values: &[Option<bool>]) -> Column {
    let seq: Vec<Value> = values.iter().map(|v| tri(*v)).collect();
    make_collection(&[ElementKind::Boolean], seq.len(), InitialState::FromSequence(seq)).unwrap()
}

fn strict() -> Evaluator {
    Evaluator::new(Arc::new(LacunaConfig {
        evaluator: EvaluatorConfig {
            unclassified_policy: UnclassifiedPolicy::Reject,
        },
        ..LacunaConfig::default()
    }))
}

//==================================================================================
// 1. Policies on scalars
//==================================================================================

#[test]
fn test_auto_propagate_closure() {
    let ev = Evaluator::default();
    for op in [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
        Operation::Rem,
        Operation::Min,
        Operation::Max,
        Operation::Pow,
    ] {
        assert_eq!(ev.binary(op, &int(3), &M).unwrap(), M, "{} (x, M)", op);
        assert_eq!(ev.binary(op, &M, &int(3)).unwrap(), M, "{} (M, x)", op);
    }
    for op in [Operation::Neg, Operation::Abs, Operation::Sqrt] {
        assert_eq!(ev.unary(op, &M).unwrap(), M);
    }
    // Operand values are not consulted: no kind check against Missing.
    let text = Slot::Value(Scalar::utf8("x"));
    assert_eq!(ev.binary(Operation::Add, &text, &M).unwrap(), M);
    assert_eq!(ev.binary(Operation::Add, &int(1), &int(2)).unwrap(), int(3));
}

#[test]
fn test_always_boolean_never_missing() {
    let ev = Evaluator::default();
    assert_eq!(ev.unary(Operation::IsMissing, &M).unwrap(), tri(Some(true)));
    assert_eq!(ev.unary(Operation::IsMissing, &int(5)).unwrap(), tri(Some(false)));
    assert_eq!(ev.binary(Operation::SortEq, &M, &M).unwrap(), tri(Some(true)));
    assert_eq!(ev.binary(Operation::Identical, &M, &int(1)).unwrap(), tri(Some(false)));
    assert_eq!(ev.binary(Operation::SortLess, &int(1), &M).unwrap(), tri(Some(true)));
    assert_eq!(ev.binary(Operation::SortLess, &M, &int(1)).unwrap(), tri(Some(false)));

    let a = Slot::Value(Scalar::Int8(1));
    assert_eq!(ev.binary(Operation::SortEq, &a, &int(1)).unwrap(), tri(Some(true)));
    assert_eq!(ev.binary(Operation::Identical, &a, &int(1)).unwrap(), tri(Some(false)));
    let nan = Slot::Value(Scalar::Float64(f64::NAN));
    assert_eq!(ev.binary(Operation::Identical, &nan, &nan).unwrap(), tri(Some(true)));
}

#[test]
fn test_value_equality_of_missing_is_missing() {
    let ev = Evaluator::default();
    assert_eq!(ev.binary(Operation::Eq, &M, &M).unwrap(), M);
    assert_eq!(ev.binary(Operation::Lt, &int(1), &M).unwrap(), M);
    assert_eq!(ev.binary(Operation::Eq, &int(2), &int(2)).unwrap(), tri(Some(true)));
}

#[test]
fn test_wide_integer_equality_against_float_is_exact() {
    let ev = Evaluator::default();
    let two_63 = Slot::Value(Scalar::Float64(9_223_372_036_854_775_808.0));
    assert_eq!(ev.binary(Operation::Eq, &int(i64::MAX - 1), &two_63).unwrap(), tri(Some(false)));
    assert_eq!(ev.binary(Operation::Eq, &two_63, &int(i64::MAX)).unwrap(), tri(Some(false)));
    assert_eq!(ev.binary(Operation::Lt, &int(i64::MAX), &two_63).unwrap(), tri(Some(true)));
    assert_eq!(
        ev.binary(Operation::Identical, &int(i64::MAX), &two_63).unwrap(),
        tri(Some(false))
    );
}

#[test]
fn test_kleene_through_evaluator() {
    let ev = Evaluator::default();
    assert_eq!(ev.binary(Operation::And, &tri(Some(false)), &M).unwrap(), tri(Some(false)));
    assert_eq!(ev.binary(Operation::And, &tri(Some(true)), &M).unwrap(), M);
    assert_eq!(ev.binary(Operation::Or, &tri(Some(true)), &M).unwrap(), tri(Some(true)));
    assert_eq!(ev.binary(Operation::Xor, &tri(Some(true)), &M).unwrap(), M);
    assert_eq!(ev.unary(Operation::Not, &M).unwrap(), M);
    assert!(matches!(
        ev.binary(Operation::And, &int(1), &M),
        Err(LacunaError::TypeMismatch { op: "and", .. })
    ));
}

#[test]
fn test_control_flow_faults_on_missing() {
    let ev = Evaluator::default();
    assert!(ev.branch(&tri(Some(true))).unwrap());
    assert!(matches!(
        ev.branch(&M),
        Err(LacunaError::ControlFlowOnMissing { op: "branch" })
    ));
    assert!(ev.unary(Operation::Branch, &M).is_err());

    let mut called = false;
    let out = ev
        .short_and(&tri(Some(false)), || {
            called = true;
            Ok(M)
        })
        .unwrap();
    assert_eq!(out, tri(Some(false)));
    assert!(!called);
    assert_eq!(ev.short_or(&tri(Some(false)), || Ok(M)).unwrap(), M);
    assert!(ev.short_or(&M, || Ok(tri(Some(true)))).is_err());
    assert_eq!(
        ev.binary(Operation::ShortAnd, &tri(Some(true)), &M).unwrap(),
        M
    );
}

#[test]
fn test_arity_is_enforced() {
    let ev = Evaluator::default();
    assert!(matches!(
        ev.unary(Operation::Add, &int(1)),
        Err(LacunaError::Arity { op: "add", expected: 2, found: 1 })
    ));
    assert!(matches!(
        ev.binary(Operation::Sum, &int(1), &int(2)),
        Err(LacunaError::Arity { op: "sum", .. })
    ));
}

#[test]
fn test_arithmetic_faults_surface() {
    let ev = Evaluator::default();
    assert!(matches!(
        ev.binary(Operation::Div, &int(1), &int(0)),
        Err(LacunaError::Arithmetic { op: "div", .. })
    ));
    assert!(matches!(
        ev.binary(Operation::Add, &int(i64::MAX), &int(1)),
        Err(LacunaError::Arithmetic { .. })
    ));
}

//==================================================================================
// 2. Named operations
//==================================================================================

#[test]
fn test_apply_named_skips_kernel_on_missing() {
    let ev = Evaluator::default();
    let mut calls = 0;
    let out = ev
        .apply_named("hypot", &[int(3), M], |_| {
            calls += 1;
            Ok(int(0))
        })
        .unwrap();
    assert_eq!(out, M);
    assert_eq!(calls, 0);

    let out = ev
        .apply_named("hypot", &[int(3), int(4)], |args| {
            let sq: i64 = args
                .iter()
                .filter_map(|a| a.as_ref().into_option().and_then(Scalar::as_i128))
                .map(|v| (v * v) as i64)
                .sum();
            Ok(int((sq as f64).sqrt() as i64))
        })
        .unwrap();
    assert_eq!(out, int(5));
}

#[test]
fn test_apply_named_rejects_unknown_when_strict() {
    let ev = strict();
    assert!(matches!(
        ev.apply_named("hypot", &[int(1)], |_| Ok(int(1))),
        Err(LacunaError::UndefinedOperation { op }) if op == "hypot"
    ));
    // Built-in names are always classified.
    assert_eq!(ev.apply_named("add", &[M], |_| Ok(int(1))).unwrap(), M);
}

#[test]
fn test_apply_named_registered_policies() {
    let mut ev = strict();
    ev.register("nvl", Policy::ExplicitRemoval);
    ev.register("assert_true", Policy::ControlFlow);

    let out = ev
        .apply_named("nvl", &[M, int(2)], |args| Ok(crate::adapter::coalesce(args.to_vec())))
        .unwrap();
    assert_eq!(out, int(2));
    assert!(matches!(
        ev.apply_named("assert_true", &[M], |_| Ok(tri(Some(true)))),
        Err(LacunaError::ControlFlowOnMissing { .. })
    ));
}

//==================================================================================
// 3. Element-wise and whole-collection entry points
//==================================================================================

#[test]
fn test_map_binary_broadcasts_and_infers_kinds() {
    let ev = Evaluator::default();
    let col = int_column(&[Some(1), None, Some(3)]);
    let out = ev
        .map_binary(Operation::Add, Operand::Column(&col), Operand::Scalar(int(10)))
        .unwrap();
    assert!(out.is_bits());
    assert_eq!(out.kinds(), &[ElementKind::Int64]);
    let values: Vec<Value> = out.iter().collect();
    assert_eq!(values, vec![int(11), M, int(13)]);

    let halves = ev
        .map_binary(
            Operation::Div,
            Operand::Column(&col),
            Operand::Scalar(Slot::Value(Scalar::Float64(2.0))),
        )
        .unwrap();
    assert_eq!(halves.kinds(), &[ElementKind::Float64]);
    assert_eq!(halves.get(2).unwrap(), Slot::Value(Scalar::Float64(1.5)));
}

#[test]
fn test_map_binary_shape_and_kind_errors() {
    let ev = Evaluator::default();
    let a = int_column(&[Some(1), Some(2)]);
    let b = int_column(&[Some(1)]);
    assert!(matches!(
        ev.map_binary(Operation::Add, (&a).into(), (&b).into()),
        Err(LacunaError::LengthMismatch { .. })
    ));
    assert!(matches!(
        ev.map_binary(Operation::Add, (&a).into(), Scalar::utf8("x").into()),
        Err(LacunaError::TypeMismatch { .. })
    ));
}

#[test]
fn test_map_unary_comparisons_yield_boolean_columns() {
    let ev = Evaluator::default();
    let col = int_column(&[Some(4), None]);
    let flags = ev.map_unary(Operation::IsMissing, &col).unwrap();
    assert_eq!(flags.kinds(), &[ElementKind::Boolean]);
    assert_eq!(flags.missing_count(), 0);
    let neg = ev.map_unary(Operation::Neg, &col).unwrap();
    assert_eq!(neg.get(0).unwrap(), int(-4));
    assert!(neg.get(1).unwrap().is_missing());

    let cmp = ev
        .map_binary(Operation::Gt, (&col).into(), int(1).into())
        .unwrap();
    assert_eq!(cmp.iter().collect::<Vec<_>>(), vec![tri(Some(true)), M]);
}

#[test]
fn test_pointer_result_strategy() {
    let ev = Evaluator::default();
    let words = make_collection(
        &[ElementKind::Utf8],
        2,
        InitialState::FromSequence(vec![Slot::Value(Scalar::utf8("a")), Slot::Missing]),
    )
    .unwrap();
    let out = ev
        .map_binary(Operation::Concat, (&words).into(), Scalar::utf8("!").into())
        .unwrap();
    assert!(!out.is_bits());
    assert_eq!(out.get(0).unwrap(), Slot::Value(Scalar::utf8("a!")));
    assert!(out.get(1).unwrap().is_missing());
}

#[test]
fn test_reductions() {
    let ev = Evaluator::default();
    let col = int_column(&[Some(1), None, Some(2)]);
    assert_eq!(ev.reduce(Operation::Sum, &col).unwrap(), M);
    assert_eq!(ev.reduce(Operation::Coalesce, &col).unwrap(), int(1));

    let full = int_column(&[Some(2), Some(4), Some(9)]);
    assert_eq!(ev.reduce(Operation::Sum, &full).unwrap(), int(15));
    assert_eq!(ev.reduce(Operation::Prod, &full).unwrap(), int(72));
    assert_eq!(ev.reduce(Operation::Maximum, &full).unwrap(), int(9));
    assert_eq!(ev.reduce(Operation::Minimum, &full).unwrap(), int(2));
    assert_eq!(
        ev.reduce(Operation::Mean, &full).unwrap(),
        Slot::Value(Scalar::Float64(5.0))
    );

    let empty = int_column(&[]);
    assert_eq!(ev.reduce(Operation::Sum, &empty).unwrap(), int(0));
    assert!(matches!(
        ev.reduce(Operation::Maximum, &empty),
        Err(LacunaError::EmptyReduction { op: "maximum" })
    ));
    assert!(ev.reduce(Operation::Add, &full).is_err());
}

#[test]
fn test_string_extrema() {
    let ev = Evaluator::default();
    let words = make_collection(
        &[ElementKind::Utf8],
        3,
        InitialState::FromSequence(vec![
            Slot::Value(Scalar::utf8("pear")),
            Slot::Value(Scalar::utf8("apple")),
            Slot::Value(Scalar::utf8("quince")),
        ]),
    )
    .unwrap();
    assert_eq!(
        ev.reduce(Operation::Minimum, &words).unwrap(),
        Slot::Value(Scalar::utf8("apple"))
    );
    assert_eq!(
        ev.reduce(Operation::Maximum, &words).unwrap(),
        Slot::Value(Scalar::utf8("quince"))
    );

    let mut gappy = words.clone();
    gappy.set(1, M).unwrap();
    assert_eq!(ev.reduce(Operation::Minimum, &gappy).unwrap(), M);

    let mixed = make_collection(
        &[ElementKind::Utf8, ElementKind::Int64],
        2,
        InitialState::FromSequence(vec![Slot::Value(Scalar::utf8("a")), int(1)]),
    )
    .unwrap();
    assert!(matches!(
        ev.reduce(Operation::Maximum, &mixed),
        Err(LacunaError::TypeMismatch { .. })
    ));
}

#[test]
fn test_all_any_over_columns() {
    let ev = Evaluator::default();
    let col = bool_column(&[Some(true), None]);
    assert_eq!(ev.reduce(Operation::All, &col).unwrap(), M);
    assert_eq!(ev.reduce(Operation::Any, &col).unwrap(), tri(Some(true)));
    let col = bool_column(&[None, Some(false)]);
    assert_eq!(ev.reduce(Operation::All, &col).unwrap(), tri(Some(false)));
}

#[test]
fn test_compare_columns_short_circuits() {
    let ev = Evaluator::default();
    let a = int_column(&[Some(1), Some(2), Some(3)]);
    let b = int_column(&[Some(1), Some(9), None]);
    assert_eq!(ev.compare_columns(Operation::Eq, &a, &b).unwrap(), tri(Some(false)));
    assert_eq!(ev.compare_columns(Operation::Ne, &a, &b).unwrap(), tri(Some(true)));
    assert_eq!(ev.compare_columns(Operation::Lt, &a, &b).unwrap(), tri(Some(true)));

    let c = int_column(&[Some(1), Some(2), None]);
    assert_eq!(ev.compare_columns(Operation::Eq, &a, &c).unwrap(), M);
    assert_eq!(ev.compare_columns(Operation::Le, &a, &c).unwrap(), M);

    let prefix = int_column(&[Some(1), Some(2)]);
    assert_eq!(ev.compare_columns(Operation::Lt, &prefix, &a).unwrap(), tri(Some(true)));
    assert_eq!(ev.compare_columns(Operation::Eq, &prefix, &a).unwrap(), tri(Some(false)));
    assert!(ev.compare_columns(Operation::Add, &a, &a).is_err());
}

#[test]
fn test_contains() {
    let ev = Evaluator::default();
    let col = int_column(&[Some(1), None, Some(3)]);
    assert_eq!(ev.contains(&col, &int(3)).unwrap(), tri(Some(true)));
    assert_eq!(ev.contains(&col, &int(2)).unwrap(), M);
    assert_eq!(ev.contains(&int_column(&[]), &M).unwrap(), tri(Some(false)));
}

#[test]
fn test_coalesce_columns_pairs_elementwise() {
    let ev = Evaluator::default();
    let a = int_column(&[Some(1), None, Some(2)]);
    let b = int_column(&[Some(2), Some(3), None]);
    let out = ev.coalesce_columns(&[(&a).into(), (&b).into()]).unwrap();
    assert_eq!(out.iter().collect::<Vec<_>>(), vec![int(1), int(3), int(2)]);

    let filled = ev.coalesce_columns(&[(&b).into(), int(0).into()]).unwrap();
    assert_eq!(filled.missing_count(), 0);
    assert!(ev.coalesce_columns(&[]).is_err());
    assert_eq!(ev.coalesce_values(&[M, M, int(7)]), int(7));
}

#[test]
fn test_sort_places_missing_last() {
    let ev = Evaluator::default();
    let col = int_column(&[None, Some(3), Some(-1), None, Some(2)]);
    let sorted = ev.sort(&col).unwrap();
    assert_eq!(
        sorted.iter().collect::<Vec<_>>(),
        vec![int(-1), int(2), int(3), M, M]
    );
}

#[test]
fn test_sort_of_narrowed_column_stays_tag_free() {
    let ev = Evaluator::default();
    let narrowed = int_column(&[Some(3), Some(1), Some(2)]).narrow().unwrap();
    assert_eq!(narrowed.footprint().tag_bytes, 0);
    let sorted = ev.sort(&narrowed).unwrap();
    assert!(!sorted.missing_capable());
    assert_eq!(sorted.footprint().tag_bytes, 0);
    assert_eq!(sorted.iter().collect::<Vec<_>>(), vec![int(1), int(2), int(3)]);
}

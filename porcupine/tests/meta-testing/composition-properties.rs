//! Composition properties
//!
//! Recursive and lazily defined generators terminate and respect their
//! depth budgets.

use crate::{arbitrary_seed, arbitrary_size, assert_holds, fast_config};
use porcupine::*;

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Lit(u8),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn depth(&self) -> usize {
        match self {
            Expr::Lit(_) => 0,
            Expr::Neg(inner) => 1 + inner.depth(),
            Expr::Add(left, right) => 1 + left.depth().max(right.depth()),
        }
    }
}

fn literal() -> Gen<Expr> {
    Gen::<u8>::between(0, 9).expect("valid range").map(Expr::Lit)
}

fn negated(inner: Gen<Expr>) -> Gen<Expr> {
    inner.map(|expr| Expr::Neg(Box::new(expr)))
}

fn sum() -> Gen<Expr> {
    Gen::combine((Gen::lazy(expr), Gen::lazy(expr)))
        .map(|(left, right)| Expr::Add(Box::new(left), Box::new(right)))
}

fn expr() -> Gen<Expr> {
    Gen::lazy_of(vec![
        Box::new(literal) as Supplier<Expr>,
        Box::new(|| negated(Gen::lazy(expr))),
        Box::new(sum),
    ])
    .expect("non-empty")
}

/// Property: `recursive` never nests deeper than its budget
pub fn test_recursive_depth_is_bounded() {
    let nested = Gen::recursive(literal, negated, 6);
    let prop = for_all(
        (arbitrary_size(), arbitrary_seed()),
        move |(size, seed): (Size, Seed)| {
            let candidate = nested.generate(size, seed).expect("generates");
            let shallow_shrinks = candidate
                .shrinks()
                .take(10)
                .all(|shrunk| shrunk.value().depth() <= candidate.value().depth());
            candidate.value().depth() <= 6 && shallow_shrinks
        },
    );
    assert_holds("Recursive depth is bounded", prop, &fast_config());
}

/// Property: mutually lazy definitions produce finite trees at any size
pub fn test_lazy_trees_terminate() {
    let prop = for_all(
        (Gen::<usize>::between(0, 200).expect("valid range").map(Size::new), arbitrary_seed()),
        |(size, seed): (Size, Seed)| {
            let tree = expr().generate(size, seed).expect("generates");
            let at_zero = expr().generate(Size::new(0), seed).expect("generates");
            tree.value().depth() < 64 && at_zero.value().depth() == 0
        },
    );
    assert_holds("Lazy trees terminate", prop, &fast_config());

    let failing = for_all(expr(), |e: Expr| e.depth() < 2);
    match failing.run(&fast_config()).expect("runs") {
        TestResult::Fail {
            minimal, shrinking, ..
        } => {
            assert_eq!(shrinking, ShrinkingState::Converged);
            assert!(minimal[0].starts_with("Neg(") || minimal[0].starts_with("Add("));
            assert!(!minimal[0].chars().any(|c| c.is_ascii_digit() && c != '0'));
        }
        other => panic!("Expected failure, got: {other:?}"),
    }
}

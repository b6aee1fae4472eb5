// In: src/eval/classify.rs

//! The propagation classification table.
//!
//! Every operation the evaluator knows belongs to exactly one `Policy`, and
//! the `PropagationBehavior` impl for `Operation` below is the single place
//! that assignment is made. Operations looked up by *name* (including ones a
//! caller registers at runtime) go through `OperationTable`, which falls back
//! to the configured `UnclassifiedPolicy` for names it has never seen.

use std::fmt;

use hashbrown::HashMap;

use crate::config::{EvaluatorConfig, UnclassifiedPolicy};
use crate::error::{LacunaError, Result};

/// How an operation treats Missing operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Any Missing operand makes the result Missing.
    AutoPropagate,
    /// Never returns Missing; Missing is an ordinary value here.
    AlwaysBoolean,
    /// Three-valued logic.
    Kleene,
    /// Value comparison; Missing unless the outcome is already determined.
    Comparison,
    /// Requires a definite boolean; Missing is a fault.
    ControlFlow,
    /// Consumes Missing by construction.
    ExplicitRemoval,
}

/// Number of operands an operation takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
    /// Consumes a whole sequence (reductions, aggregate comparisons).
    Sequence,
}

impl Arity {
    pub fn operand_count(self) -> Option<usize> {
        match self {
            Arity::Unary => Some(1),
            Arity::Binary => Some(2),
            Arity::Sequence => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Arithmetic and string building.
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Abs,
    Min,
    Max,
    Pow,
    Sqrt,
    Concat,
    // Reductions.
    Sum,
    Prod,
    Minimum,
    Maximum,
    Mean,
    // Identity-level predicates.
    IsMissing,
    Identical,
    SortEq,
    SortLess,
    // Connectives.
    And,
    Or,
    Xor,
    Not,
    // Comparisons.
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    All,
    Any,
    Contains,
    // Control flow.
    Branch,
    ShortAnd,
    ShortOr,
    // Explicit removal.
    SkipMissing,
    Coalesce,
}

impl Operation {
    pub const ALL: [Operation; 39] = [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
        Operation::Rem,
        Operation::Neg,
        Operation::Abs,
        Operation::Min,
        Operation::Max,
        Operation::Pow,
        Operation::Sqrt,
        Operation::Concat,
        Operation::Sum,
        Operation::Prod,
        Operation::Minimum,
        Operation::Maximum,
        Operation::Mean,
        Operation::IsMissing,
        Operation::Identical,
        Operation::SortEq,
        Operation::SortLess,
        Operation::And,
        Operation::Or,
        Operation::Xor,
        Operation::Not,
        Operation::Eq,
        Operation::Ne,
        Operation::Lt,
        Operation::Le,
        Operation::Gt,
        Operation::Ge,
        Operation::All,
        Operation::Any,
        Operation::Contains,
        Operation::Branch,
        Operation::ShortAnd,
        Operation::ShortOr,
        Operation::SkipMissing,
        Operation::Coalesce,
    ];

    /// The snake_case name used for lookup by name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Div => "div",
            Operation::Rem => "rem",
            Operation::Neg => "neg",
            Operation::Abs => "abs",
            Operation::Min => "min",
            Operation::Max => "max",
            Operation::Pow => "pow",
            Operation::Sqrt => "sqrt",
            Operation::Concat => "concat",
            Operation::Sum => "sum",
            Operation::Prod => "prod",
            Operation::Minimum => "minimum",
            Operation::Maximum => "maximum",
            Operation::Mean => "mean",
            Operation::IsMissing => "is_missing",
            Operation::Identical => "identical",
            Operation::SortEq => "sort_eq",
            Operation::SortLess => "sort_less",
            Operation::And => "and",
            Operation::Or => "or",
            Operation::Xor => "xor",
            Operation::Not => "not",
            Operation::Eq => "eq",
            Operation::Ne => "ne",
            Operation::Lt => "lt",
            Operation::Le => "le",
            Operation::Gt => "gt",
            Operation::Ge => "ge",
            Operation::All => "all",
            Operation::Any => "any",
            Operation::Contains => "contains",
            Operation::Branch => "branch",
            Operation::ShortAnd => "short_and",
            Operation::ShortOr => "short_or",
            Operation::SkipMissing => "skip_missing",
            Operation::Coalesce => "coalesce",
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.iter().copied().find(|op| op.name() == name)
    }

    pub fn arity(self) -> Arity {
        use Operation::*;
        match self {
            Neg | Abs | Sqrt | IsMissing | Not | Branch => Arity::Unary,
            Add | Sub | Mul | Div | Rem | Min | Max | Pow | Concat | Identical | SortEq
            | SortLess | And | Or | Xor | Eq | Ne | Lt | Le | Gt | Ge | ShortAnd | ShortOr => {
                Arity::Binary
            }
            Sum | Prod | Minimum | Maximum | Mean | All | Any | Contains | SkipMissing
            | Coalesce => Arity::Sequence,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operation::Eq
                | Operation::Ne
                | Operation::Lt
                | Operation::Le
                | Operation::Gt
                | Operation::Ge
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declares how an operation treats Missing.
pub trait PropagationBehavior {
    fn policy(&self) -> Policy;
}

impl PropagationBehavior for Operation {
    fn policy(&self) -> Policy {
        use Operation::*;
        match self {
            //======================================================================
            // Group 1: Missing in, Missing out.
            //======================================================================
            Add | Sub | Mul | Div | Rem | Neg | Abs | Min | Max | Pow | Sqrt | Concat | Sum
            | Prod | Minimum | Maximum | Mean => Policy::AutoPropagate,

            //======================================================================
            // Group 2: Operations that must reason about Missing itself.
            //======================================================================
            IsMissing | Identical | SortEq | SortLess => Policy::AlwaysBoolean,
            And | Or | Xor | Not => Policy::Kleene,
            Eq | Ne | Lt | Le | Gt | Ge | All | Any | Contains => Policy::Comparison,

            //======================================================================
            // Group 3: Consumers of definite values, and explicit removal.
            //======================================================================
            Branch | ShortAnd | ShortOr => Policy::ControlFlow,
            SkipMissing | Coalesce => Policy::ExplicitRemoval,
        }
    }
}

/// Name-keyed policy lookup with a configurable fallback.
#[derive(Debug, Clone)]
pub struct OperationTable {
    policies: HashMap<String, Policy>,
    unclassified: UnclassifiedPolicy,
}

impl OperationTable {
    pub fn new(config: &EvaluatorConfig) -> Self {
        let policies = Operation::ALL
            .iter()
            .map(|op| (op.name().to_string(), op.policy()))
            .collect();
        Self {
            policies,
            unclassified: config.unclassified_policy,
        }
    }

    /// Adds (or reclassifies) a named operation.
    pub fn register(&mut self, name: impl Into<String>, policy: Policy) -> Option<Policy> {
        let name = name.into();
        log::debug!("classify: registering '{}' as {:?}", name, policy);
        self.policies.insert(name, policy)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// # Errors
    /// `UndefinedOperation` for an unregistered name when the table was built
    /// with `UnclassifiedPolicy::Reject`.
    pub fn classify(&self, name: &str) -> Result<Policy> {
        match self.policies.get(name) {
            Some(policy) => Ok(*policy),
            None => match self.unclassified {
                UnclassifiedPolicy::Propagate => Ok(Policy::AutoPropagate),
                UnclassifiedPolicy::Reject => {
                    log::debug!("classify: no policy for '{}'", name);
                    Err(LacunaError::UndefinedOperation {
                        op: name.to_string(),
                    })
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

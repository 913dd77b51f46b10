//! `LIKE` pattern extraction.

use std::ops::ControlFlow;

use qperf_core::ParamValue;
use serde::Serialize;
use sqlparser::ast::{
    Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Statement, Value, Visit, Visitor,
};

/// A pattern compared with `LIKE`/`ILIKE`, inline or resolved from a bound value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikePattern {
    pub pattern: String,
    /// `true` when the pattern came from a bound parameter.
    pub bound: bool,
}

impl LikePattern {
    /// `%` or `_` as first character defeats index range scans.
    #[must_use]
    pub fn has_leading_wildcard(&self) -> bool {
        self.pattern.starts_with(['%', '_'])
    }
}

/// Every resolvable `LIKE` pattern, including those under `NOT LIKE`.
///
/// Function wrappers such as `lower(?)` are looked through. Placeholders are
/// resolved with SQLite numbering; bound values that are not text are skipped.
#[must_use]
pub fn like_patterns(statements: &[Statement], params: &[ParamValue]) -> Vec<LikePattern> {
    let mut walk = PatternWalk::default();
    for statement in statements {
        let _ = statement.visit(&mut walk);
    }

    walk.operands
        .into_iter()
        .filter_map(|operand| match operand {
            Operand::Inline(pattern) => Some(LikePattern {
                pattern,
                bound: false,
            }),
            Operand::Bound(target) => {
                let index = walk
                    .slots
                    .iter()
                    .find(|(placeholder, _)| std::ptr::eq(*placeholder, target))
                    .map(|(_, index)| *index)?;
                let text = params.get(index.checked_sub(1)?)?.as_text()?;
                Some(LikePattern {
                    pattern: text.to_string(),
                    bound: true,
                })
            }
        })
        .collect()
}

enum Operand {
    Inline(String),
    /// Address of the placeholder expression inside the walked statements.
    Bound(*const Expr),
}

/// One pre-order pass: numbers placeholders and notes pattern operands.
#[derive(Default)]
struct PatternWalk {
    max_index: usize,
    named: Vec<(String, usize)>,
    slots: Vec<(*const Expr, usize)>,
    operands: Vec<Operand>,
}

impl PatternWalk {
    /// One-based SQLite parameter index of a placeholder.
    fn number(&mut self, name: &str) -> usize {
        let index = if name == "?" {
            self.max_index + 1
        } else if let Some(n) = name.strip_prefix('?').and_then(|d| d.parse().ok()) {
            n
        } else if let Some((_, n)) = self.named.iter().find(|(seen, _)| seen == name) {
            *n
        } else {
            let n = self.max_index + 1;
            self.named.push((name.to_string(), n));
            n
        };
        self.max_index = self.max_index.max(index);
        index
    }
}

impl Visitor for PatternWalk {
    type Break = ();

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
        match expr {
            Expr::Value(v) => {
                if let Value::Placeholder(name) = &v.value {
                    let index = self.number(name);
                    self.slots.push((std::ptr::from_ref(expr), index));
                }
            }
            Expr::Like { pattern, .. } | Expr::ILike { pattern, .. } => {
                let operand = unwrap_functions(pattern);
                if let Expr::Value(v) = operand {
                    match &v.value {
                        Value::SingleQuotedString(text) | Value::DoubleQuotedString(text) => {
                            self.operands.push(Operand::Inline(text.clone()));
                        }
                        Value::Placeholder(_) => {
                            self.operands.push(Operand::Bound(std::ptr::from_ref(operand)));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

/// First argument of nested function calls: `lower(trim(?))` yields `?`.
fn unwrap_functions(expr: &Expr) -> &Expr {
    let mut current = expr;
    loop {
        current = match current {
            Expr::Nested(inner) => inner.as_ref(),
            Expr::Function(function) => {
                let FunctionArguments::List(list) = &function.args else {
                    return current;
                };
                match list.args.first() {
                    Some(FunctionArg::Unnamed(FunctionArgExpr::Expr(first))) => first,
                    _ => return current,
                }
            }
            _ => return current,
        };
    }
}

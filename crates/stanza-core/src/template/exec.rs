//! Tree-walking interpreter for compiled units

use serde_json::{json, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

use super::unit::{CompareOp, CompiledUnit, Expr, FilterCall, Node, Operand, PathExpr, Segment};
use super::value::{compare, escape_html, is_truthy, iter_items, loose_eq, to_output, walk};
use super::Variables;
use crate::error::{CallableKind, Result, StanzaError};
use crate::registry::Registry;

/// Name bound to loop metadata inside every `for` body
const LOOP_VARIABLE: &str = "loop";

/// Execute `unit` against `vars`
///
/// Returns the complete output or the first error; partial output is discarded.
pub fn execute(unit: &CompiledUnit, vars: &Variables, registry: &Registry) -> Result<String> {
    let mut interpreter = Interpreter {
        registry,
        scope: Scope {
            globals: vars,
            locals: Vec::new(),
        },
        out: String::new(),
    };
    interpreter.run(&unit.nodes)?;
    Ok(interpreter.out)
}

/// Global variables plus a stack of loop-scoped bindings
struct Scope<'v> {
    globals: &'v Variables,
    locals: Vec<(String, Value)>,
}

impl Scope<'_> {
    fn lookup(&self, path: &PathExpr) -> Option<&Value> {
        let (root, rest) = path.segments.split_first()?;
        let Segment::Key(root) = root else {
            return None;
        };
        let base = self
            .locals
            .iter()
            .rev()
            .find(|(name, _)| name == root)
            .map(|(_, value)| value)
            .or_else(|| self.globals.get(root))?;
        walk(base, rest)
    }

    fn operand<'s>(&'s self, operand: &'s Operand) -> Cow<'s, Value> {
        match operand {
            Operand::Literal(value) => Cow::Borrowed(value),
            Operand::Path(path) => self
                .lookup(path)
                .map(Cow::Borrowed)
                .unwrap_or(Cow::Owned(Value::Null)),
        }
    }
}

struct Interpreter<'a> {
    registry: &'a Registry,
    scope: Scope<'a>,
    out: String,
}

impl Interpreter<'_> {
    fn run(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text { text } => self.out.push_str(text),
                Node::Output {
                    value,
                    filters,
                    escape,
                } => {
                    let value = self.apply_filters(value, filters)?;
                    let text = to_output(&value);
                    if *escape {
                        self.out.push_str(&escape_html(&text));
                    } else {
                        self.out.push_str(&text);
                    }
                }
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let taken = branches
                        .iter()
                        .find(|branch| self.condition(&branch.condition))
                        .map(|branch| &branch.body)
                        .or(otherwise.as_ref());
                    if let Some(body) = taken {
                        self.run(body)?;
                    }
                }
                Node::For {
                    binding,
                    iterable,
                    body,
                } => self.run_loop(binding, iterable, body)?,
                Node::Macro { name, args } => {
                    let mac = self.registry.macro_named(name).ok_or_else(|| {
                        StanzaError::UnregisteredCallable {
                            kind: CallableKind::Macro,
                            name: name.clone(),
                        }
                    })?;
                    let args = self.evaluate_all(args);
                    let result =
                        mac.execute(&args)
                            .map_err(|source| StanzaError::ExecutionFailure {
                                kind: CallableKind::Macro,
                                name: name.clone(),
                                source,
                            })?;
                    self.out.push_str(&to_output(&result));
                }
            }
        }
        Ok(())
    }

    fn run_loop(&mut self, binding: &str, iterable: &PathExpr, body: &[Node]) -> Result<()> {
        // Cloned so the body can push bindings while iterating
        let items: Vec<Value> = iter_items(self.scope.lookup(iterable))
            .into_iter()
            .cloned()
            .collect();
        let length = items.len();

        for (index, item) in items.into_iter().enumerate() {
            let meta = json!({
                "index": index + 1,
                "index0": index,
                "first": index == 0,
                "last": index + 1 == length,
                "length": length,
            });
            self.scope.locals.push((LOOP_VARIABLE.to_string(), meta));
            self.scope.locals.push((binding.to_string(), item));
            let result = self.run(body);
            self.scope.locals.truncate(self.scope.locals.len() - 2);
            result?;
        }
        Ok(())
    }

    fn evaluate_all(&self, operands: &[Operand]) -> Vec<Value> {
        operands
            .iter()
            .map(|operand| self.scope.operand(operand).into_owned())
            .collect()
    }

    fn apply_filters(&self, value: &Operand, filters: &[FilterCall]) -> Result<Value> {
        let mut current = self.scope.operand(value).into_owned();
        for call in filters {
            let filter = self.registry.filter(&call.name).ok_or_else(|| {
                StanzaError::UnregisteredCallable {
                    kind: CallableKind::Filter,
                    name: call.name.clone(),
                }
            })?;
            let args = self.evaluate_all(&call.args);
            current = filter
                .apply(&current, &args)
                .map_err(|source| StanzaError::ExecutionFailure {
                    kind: CallableKind::Filter,
                    name: call.name.clone(),
                    source,
                })?;
        }
        Ok(current)
    }

    fn condition(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Operand { operand } => is_truthy(&self.scope.operand(operand)),
            Expr::Not { inner } => !self.condition(inner),
            Expr::And { left, right } => self.condition(left) && self.condition(right),
            Expr::Or { left, right } => self.condition(left) || self.condition(right),
            Expr::Compare { op, left, right } => {
                let left = self.comparand(left);
                let right = self.comparand(right);
                compare_values(*op, &left, &right)
            }
        }
    }

    /// Value of one side of a comparison; nested logic compares as a boolean
    fn comparand<'s>(&'s self, expr: &'s Expr) -> Cow<'s, Value> {
        match expr {
            Expr::Operand { operand } => self.scope.operand(operand),
            other => Cow::Owned(Value::Bool(self.condition(other))),
        }
    }
}

fn compare_values(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => loose_eq(left, right),
        CompareOp::Ne => !loose_eq(left, right),
        CompareOp::Lt => compare(left, right) == Some(Ordering::Less),
        CompareOp::Le => matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => compare(left, right) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

//! Query expression trees.
//!
//! An [`Expr`] is a closed tagged union the compiler pattern-matches on.
//! Trees are built with the helpers in this module and the `std::ops`
//! overloads:
//!
//! ```ignore
//! use quarry_core::expr::*;
//!
//! // u => u.age >= 18 && (u.name.starts_with("A") || !u.active)
//! let adults = Lambda::new(["u"], {
//!     let u = root("u");
//!     u.get("age").ge(18) & (u.get("name").starts_with("A") | !u.get("active"))
//! });
//! ```

mod build;
mod method;
mod ops;

pub use build::*;
pub use method::Method;

use core::fmt;

use compact_str::CompactString;
use quarry_types::ScalarKind;
use smallvec::SmallVec;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
    Convert(ScalarKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Coalesce,
}

impl BinaryOp {
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Rem
                | Self::BitAnd
                | Self::BitOr
                | Self::BitXor
        )
    }

    /// Comparison that holds exactly when `self` does not.
    pub const fn inverse(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
            Self::And => Self::Or,
            Self::Or => Self::And,
            other => other,
        }
    }

    /// Binding strength in SQL text; higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => 3,
            Self::BitOr | Self::BitXor => 4,
            Self::BitAnd => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Rem => 7,
            Self::Coalesce => 8,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::And => "AND",
            Self::Or => "OR",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Coalesce => "??",
        }
    }
}

/// A node of a query expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal from the query text.
    Constant(Value),
    /// A value captured from the caller; always bound as a parameter.
    Variable { name: CompactString, value: Value },
    /// A lambda parameter.
    Root(CompactString),
    /// Member access.
    Member {
        parent: Box<Expr>,
        name: CompactString,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Method or function call; `target` is the receiver, if any.
    Call {
        method: Method,
        target: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
    /// Object construction: ordered member/value pairs.
    New {
        type_name: Option<CompactString>,
        members: Vec<(CompactString, Expr)>,
    },
    Array(Vec<Expr>),
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    /// The grouping key, or one member of a composite key.
    GroupKey(Option<CompactString>),
    /// A nested lambda, e.g. the predicate of `any`.
    Lambda(Box<Lambda>),
}

impl Expr {
    /// Constant boolean, if this node is one.
    pub fn as_bool_constant(&self) -> Option<bool> {
        match self {
            Self::Constant(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Self::Constant(Value::Null))
    }
}

/// A lambda over the tables of a query, bound positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: SmallVec<[CompactString; 2]>,
    pub body: Expr,
}

impl Lambda {
    pub fn new<I, S>(params: I, body: Expr) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            body,
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}| {}", self.params.join(", "), self.body)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Float(v) => write!(f, "{v:?}"),
        Value::Text(s) => write!(f, "{s:?}"),
        Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        Value::DateTime(dt) => write!(f, "{dt}"),
        Value::List(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item)?;
            }
            f.write_str("]")
        }
        Value::Record(_) => f.write_str("{..}"),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write_value(f, value),
            Self::Variable { name, .. } => write!(f, "@{name}"),
            Self::Root(name) => f.write_str(name),
            Self::Member { parent, name } => write!(f, "{parent}.{name}"),
            Self::Unary { op, operand } => match op {
                UnaryOp::Negate => write!(f, "-{operand}"),
                UnaryOp::Not => write!(f, "!{operand}"),
                UnaryOp::Convert(kind) => write!(f, "({operand} as {kind})"),
            },
            Self::Binary { op, left, right } => {
                let symbol = match op {
                    BinaryOp::Eq => "==",
                    BinaryOp::Ne => "!=",
                    BinaryOp::And => "&&",
                    BinaryOp::Or => "||",
                    other => other.symbol(),
                };
                write!(f, "({left} {symbol} {right})")
            }
            Self::Call {
                method,
                target,
                args,
            } => {
                if let Some(target) = target {
                    write!(f, "{target}.")?;
                }
                write!(f, "{method}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Self::New { type_name, members } => {
                if let Some(name) = type_name {
                    write!(f, "{name} ")?;
                }
                f.write_str("{ ")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(" }")
            }
            Self::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Self::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "(if {test} {{ {if_true} }} else {{ {if_false} }})"),
            Self::GroupKey(None) => f.write_str("key"),
            Self::GroupKey(Some(name)) => write!(f, "key.{name}"),
            Self::Lambda(lambda) => write!(f, "{lambda}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_readable() {
        let u = root("u");
        let expr = u.get("age").ge(18) & u.get("name").starts_with("A");
        assert_eq!(
            expr.to_string(),
            r#"((u.age >= 18) && u.name.starts_with("A"))"#
        );
        assert_eq!(var("min", 3).to_string(), "@min");
        assert_eq!(
            Lambda::new(["o"], root("o").get("total").gt(1.5)).to_string(),
            "|o| (o.total > 1.5)"
        );
    }

    #[test]
    fn test_inverse() {
        assert_eq!(BinaryOp::Lt.inverse(), BinaryOp::Ge);
        assert_eq!(BinaryOp::Ne.inverse(), BinaryOp::Eq);
        assert_eq!(BinaryOp::And.inverse(), BinaryOp::Or);
        assert_eq!(BinaryOp::Add.inverse(), BinaryOp::Add);
    }
}

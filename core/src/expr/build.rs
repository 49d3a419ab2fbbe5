use compact_str::CompactString;
use quarry_types::ScalarKind;

use super::{BinaryOp, Expr, Lambda, Method, UnaryOp};
use crate::value::{Record, Value};

/// Conversion into an expression node.
///
/// Plain values become [`Expr::Constant`]; expressions pass through.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    #[inline]
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    #[inline]
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for Lambda {
    fn into_expr(self) -> Expr {
        Expr::Lambda(Box::new(self))
    }
}

macro_rules! impl_into_expr {
    ($($t:ty),+ $(,)?) => {
        $(
            impl IntoExpr for $t {
                #[inline]
                fn into_expr(self) -> Expr {
                    Expr::Constant(Value::from(self))
                }
            }
        )+
    };
}

impl_into_expr!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    Value,
    Record,
    chrono::NaiveDateTime,
);

impl<T: Into<Value>> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Constant(Value::from(self))
    }
}

/// A lambda parameter.
pub fn root(name: impl Into<CompactString>) -> Expr {
    Expr::Root(name.into())
}

/// A literal.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Constant(value.into())
}

/// SQL `NULL`.
pub fn null() -> Expr {
    Expr::Constant(Value::Null)
}

/// A caller-supplied value, always sent as a parameter.
pub fn var(name: impl Into<CompactString>, value: impl Into<Value>) -> Expr {
    Expr::Variable {
        name: name.into(),
        value: value.into(),
    }
}

pub fn array<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: IntoExpr,
{
    Expr::Array(items.into_iter().map(IntoExpr::into_expr).collect())
}

/// Anonymous object construction.
pub fn object<I, S>(members: I) -> Expr
where
    I: IntoIterator<Item = (S, Expr)>,
    S: Into<CompactString>,
{
    Expr::New {
        type_name: None,
        members: members
            .into_iter()
            .map(|(name, expr)| (name.into(), expr))
            .collect(),
    }
}

/// Named object construction.
pub fn new_object<I, S>(type_name: impl Into<CompactString>, members: I) -> Expr
where
    I: IntoIterator<Item = (S, Expr)>,
    S: Into<CompactString>,
{
    match object(members) {
        Expr::New { members, .. } => Expr::New {
            type_name: Some(type_name.into()),
            members,
        },
        other => other,
    }
}

/// `if test { a } else { b }`
pub fn cond(test: Expr, if_true: impl IntoExpr, if_false: impl IntoExpr) -> Expr {
    Expr::Conditional {
        test: Box::new(test),
        if_true: Box::new(if_true.into_expr()),
        if_false: Box::new(if_false.into_expr()),
    }
}

/// The grouping key.
pub fn key() -> Expr {
    Expr::GroupKey(None)
}

/// One member of a composite grouping key.
pub fn key_member(name: impl Into<CompactString>) -> Expr {
    Expr::GroupKey(Some(name.into()))
}

/// Calls a function without a receiver.
pub fn call<I>(method: Method, args: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    Expr::Call {
        method,
        target: None,
        args: args.into_iter().collect(),
    }
}

/// Calls a custom function registered on the dialect adapter.
pub fn func<I>(name: impl Into<CompactString>, args: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    call(Method::Custom(name.into()), args)
}

/// `COUNT(*)`
pub fn count() -> Expr {
    call(Method::Count, [])
}

pub fn count_of(expr: Expr) -> Expr {
    call(Method::Count, [expr])
}

pub fn count_distinct(expr: Expr) -> Expr {
    call(Method::CountDistinct, [expr])
}

pub fn sum(expr: Expr) -> Expr {
    call(Method::Sum, [expr])
}

pub fn avg(expr: Expr) -> Expr {
    call(Method::Avg, [expr])
}

pub fn max(expr: Expr) -> Expr {
    call(Method::Max, [expr])
}

pub fn min(expr: Expr) -> Expr {
    call(Method::Min, [expr])
}

pub fn now() -> Expr {
    call(Method::Now, [])
}

/// N-ary string concatenation.
pub fn concat<I>(parts: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    call(Method::Concat, parts)
}

impl Expr {
    /// Member access.
    pub fn get(&self, member: impl Into<CompactString>) -> Expr {
        Expr::Member {
            parent: Box::new(self.clone()),
            name: member.into(),
        }
    }

    pub fn binary(self, op: BinaryOp, rhs: impl IntoExpr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into_expr()),
        }
    }

    pub fn unary(self, op: UnaryOp) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(self),
        }
    }

    fn method<I>(self, method: Method, args: I) -> Expr
    where
        I: IntoIterator<Item = Expr>,
    {
        Expr::Call {
            method,
            target: Some(Box::new(self)),
            args: args.into_iter().collect(),
        }
    }

    pub fn eq(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn lt(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn gt(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Ge, rhs)
    }

    pub fn and(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn is_null(self) -> Expr {
        self.eq(null())
    }

    pub fn is_not_null(self) -> Expr {
        self.ne(null())
    }

    /// `self ?? fallback`
    pub fn coalesce(self, fallback: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::Coalesce, fallback)
    }

    pub fn bit_xor(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::BitXor, rhs)
    }

    /// Bitwise AND; `&` is logical AND.
    pub fn bit_and(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::BitAnd, rhs)
    }

    /// Bitwise OR; `|` is logical OR.
    pub fn bit_or(self, rhs: impl IntoExpr) -> Expr {
        self.binary(BinaryOp::BitOr, rhs)
    }

    pub fn cast(self, kind: ScalarKind) -> Expr {
        self.unary(UnaryOp::Convert(kind))
    }

    /// Substring test on text, membership test on arrays and lists.
    pub fn contains(self, needle: impl IntoExpr) -> Expr {
        self.method(Method::Contains, [needle.into_expr()])
    }

    pub fn starts_with(self, prefix: impl IntoExpr) -> Expr {
        self.method(Method::StartsWith, [prefix.into_expr()])
    }

    pub fn ends_with(self, suffix: impl IntoExpr) -> Expr {
        self.method(Method::EndsWith, [suffix.into_expr()])
    }

    pub fn to_upper(self) -> Expr {
        self.method(Method::ToUpper, [])
    }

    pub fn to_lower(self) -> Expr {
        self.method(Method::ToLower, [])
    }

    pub fn trim(self) -> Expr {
        self.method(Method::Trim, [])
    }

    pub fn trim_start(self) -> Expr {
        self.method(Method::TrimStart, [])
    }

    pub fn trim_end(self) -> Expr {
        self.method(Method::TrimEnd, [])
    }

    pub fn length(self) -> Expr {
        self.method(Method::Length, [])
    }

    /// Zero-based `start`.
    pub fn substring(self, start: impl IntoExpr, len: impl IntoExpr) -> Expr {
        self.method(Method::Substring, [start.into_expr(), len.into_expr()])
    }

    pub fn replace(self, from: impl IntoExpr, to: impl IntoExpr) -> Expr {
        self.method(Method::Replace, [from.into_expr(), to.into_expr()])
    }

    /// Zero-based position of `needle`, `-1` when absent.
    pub fn index_of(self, needle: impl IntoExpr) -> Expr {
        self.method(Method::IndexOf, [needle.into_expr()])
    }

    pub fn is_null_or_empty(self) -> Expr {
        self.method(Method::IsNullOrEmpty, [])
    }

    pub fn to_text(self) -> Expr {
        self.method(Method::ToString, [])
    }

    pub fn has_value(self) -> Expr {
        self.method(Method::HasValue, [])
    }

    /// The value of a nullable member.
    pub fn value(self) -> Expr {
        self.method(Method::Value, [])
    }

    /// `EXISTS` over a to-many navigation, filtered by `predicate`.
    pub fn any(self, predicate: Lambda) -> Expr {
        self.method(Method::Any, [predicate.into_expr()])
    }

    /// `EXISTS` over a to-many navigation.
    pub fn exists(self) -> Expr {
        self.method(Method::Any, [])
    }

    /// Row count of a to-many navigation.
    pub fn count(self) -> Expr {
        self.method(Method::Count, [])
    }

    pub fn abs(self) -> Expr {
        self.method(Method::Abs, [])
    }

    pub fn round(self, digits: impl IntoExpr) -> Expr {
        self.method(Method::Round, [digits.into_expr()])
    }

    pub fn floor(self) -> Expr {
        self.method(Method::Floor, [])
    }

    pub fn ceiling(self) -> Expr {
        self.method(Method::Ceiling, [])
    }

    pub fn year(self) -> Expr {
        self.method(Method::Year, [])
    }

    pub fn month(self) -> Expr {
        self.method(Method::Month, [])
    }

    pub fn day(self) -> Expr {
        self.method(Method::Day, [])
    }
}

impl From<Lambda> for Expr {
    fn from(value: Lambda) -> Self {
        value.into_expr()
    }
}

//! `std::ops` overloads.
//!
//! `&` and `|` build logical AND/OR; bitwise forms are the named
//! `bit_and`/`bit_or` methods.

use core::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Rem, Sub};

use super::{BinaryOp, Expr, IntoExpr, UnaryOp};

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Negate)
    }
}

macro_rules! impl_binary_op {
    ($($trait:ident :: $fn:ident => $op:ident),+ $(,)?) => {
        $(
            impl<Rhs: IntoExpr> $trait<Rhs> for Expr {
                type Output = Expr;

                fn $fn(self, rhs: Rhs) -> Expr {
                    self.binary(BinaryOp::$op, rhs)
                }
            }
        )+
    };
}

impl_binary_op!(
    BitAnd::bitand => And,
    BitOr::bitor => Or,
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Rem,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::root;

    #[test]
    fn test_operators_build_nodes() {
        let u = root("u");
        assert!(matches!(
            u.get("a") & u.get("b"),
            Expr::Binary { op: BinaryOp::And, .. }
        ));
        assert!(matches!(!u.get("a"), Expr::Unary { op: UnaryOp::Not, .. }));
        assert_eq!((u.get("n") + 1).to_string(), "(u.n + 1)");
        assert_eq!((-u.get("n")).to_string(), "-u.n");
    }
}

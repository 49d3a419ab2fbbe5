//! Deferred-expression and scope stack.
//!
//! Frames are pushed when a node's SQL depends on context that is only
//! known further up or further along the walk, and popped once that
//! context is reached. Every clause must leave the stack empty.

use super::Segment;
use crate::error::{QuarryError, Result};

/// Logical connective of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub const fn flip(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Comparison operator of a pending boolean comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone)]
pub enum Frame<'a> {
    /// A pending logical NOT.
    Not,
    /// A pending comparison of the operand being compiled with a boolean
    /// constant: `operand == value` or `operand != value`.
    Compare { op: CompareOp, value: bool },
    /// An AND/OR group, or a barrier (`op: None`) isolating a nested
    /// predicate such as a subquery or a `CASE` test.
    Scope { op: Option<LogicalOp>, negated: bool },
    /// Operands of a `+` chain collected so far.
    Concat(Vec<Segment<'a>>),
}

impl Frame<'_> {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Compare { .. } => "compare",
            Self::Scope { .. } => "scope",
            Self::Concat(_) => "concat",
        }
    }

    /// Whether this frame inverts the polarity of the operand below it.
    const fn flips(&self) -> bool {
        match self {
            Self::Not => true,
            Self::Compare { op, value } => matches!(
                (op, value),
                (CompareOp::Eq, false) | (CompareOp::Ne, true)
            ),
            Self::Scope { .. } | Self::Concat(_) => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct DeferredStack<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> DeferredStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame<'a>) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Polarity of the operand currently being compiled.
    ///
    /// Walks from the top to the nearest scope, which supplies the base
    /// polarity; each flipping frame on the way inverts it.
    pub fn negated(&self) -> bool {
        let mut flips = false;
        for frame in self.frames.iter().rev() {
            if let Frame::Scope { negated, .. } = frame {
                return *negated ^ flips;
            }
            flips ^= frame.flips();
        }
        flips
    }

    /// Connective of the nearest enclosing scope, `None` at a barrier or at
    /// the top of a clause.
    pub fn scope_op(&self) -> Option<LogicalOp> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Scope { op, .. } => Some(*op),
            _ => None,
        })?
    }

    fn pop_frame(&mut self, expected: &'static str) -> Result<Frame<'a>> {
        self.frames.pop().ok_or(QuarryError::UnexpectedFrame {
            expected,
            found: "nothing",
        })
    }

    pub fn pop_not(&mut self) -> Result<()> {
        match self.pop_frame("not")? {
            Frame::Not => Ok(()),
            other => Err(mismatch("not", &other)),
        }
    }

    pub fn pop_compare(&mut self) -> Result<(CompareOp, bool)> {
        match self.pop_frame("compare")? {
            Frame::Compare { op, value } => Ok((op, value)),
            other => Err(mismatch("compare", &other)),
        }
    }

    pub fn pop_scope(&mut self) -> Result<(Option<LogicalOp>, bool)> {
        match self.pop_frame("scope")? {
            Frame::Scope { op, negated } => Ok((op, negated)),
            other => Err(mismatch("scope", &other)),
        }
    }

    /// Adds an operand to the concat frame on top.
    pub fn push_concat(&mut self, segment: Segment<'a>) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Concat(parts)) => {
                parts.push(segment);
                Ok(())
            }
            Some(other) => Err(mismatch("concat", other)),
            None => Err(QuarryError::UnexpectedFrame {
                expected: "concat",
                found: "nothing",
            }),
        }
    }

    pub fn pop_concat(&mut self) -> Result<Vec<Segment<'a>>> {
        match self.pop_frame("concat")? {
            Frame::Concat(parts) => Ok(parts),
            other => Err(mismatch("concat", &other)),
        }
    }

    /// Drops every frame after a failed clause.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Clause boundary: the stack must be drained.
    pub fn finish(&mut self, clause: &'static str) -> Result<()> {
        match self.frames.last() {
            None => Ok(()),
            Some(frame) => {
                let frame = frame.name();
                self.frames.clear();
                Err(QuarryError::PendingDeferred { clause, frame })
            }
        }
    }
}

fn mismatch(expected: &'static str, found: &Frame<'_>) -> QuarryError {
    QuarryError::UnexpectedFrame {
        expected,
        found: found.name(),
    }
}

//! Symbolic SQL fragments and their final rendering.

mod chunk;

pub use chunk::*;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::dialect::DialectAdapter;
use crate::error::{QuarryError, Result};
use crate::param::{BoundParam, ParamCollector};

/// SQL fragment builder with flat chunk storage.
///
/// Adjacent raw text is merged into one chunk, so most fragments stay inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    chunks: SmallVec<[Chunk; 4]>,
}

impl Fragment {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    pub fn raw(text: impl Into<CompactString>) -> Self {
        let mut fragment = Self::empty();
        fragment.push_raw(text.into().as_str());
        fragment
    }

    pub fn column(table: usize, column: impl Into<CompactString>) -> Self {
        Self::empty().push(Chunk::column(table, column))
    }

    pub fn table(index: usize) -> Self {
        Self::empty().push(Chunk::Table(index))
    }

    pub fn param(index: usize) -> Self {
        Self::empty().push(Chunk::Param(index))
    }

    /// Creates `NAME(args, ...)`.
    pub fn func<I>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = Fragment>,
    {
        Self::raw(name)
            .push_str("(")
            .append(Self::join(args, ", "))
            .push_str(")")
    }

    /// Joins fragments with a raw separator.
    pub fn join<I>(parts: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = Fragment>,
    {
        let mut out = Self::empty();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push_raw(separator);
            }
            out.append_mut(part);
        }
        out
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The fragment is a single column reference.
    pub fn as_column(&self) -> Option<(usize, &str)> {
        match self.chunks.as_slice() {
            [Chunk::Column { table, column }] => Some((*table, column.as_str())),
            _ => None,
        }
    }

    /// Raw text if the fragment contains nothing symbolic.
    pub fn as_raw(&self) -> Option<&str> {
        match self.chunks.as_slice() {
            [Chunk::Raw(text)] => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn push(mut self, chunk: Chunk) -> Self {
        self.push_chunk(chunk);
        self
    }

    pub fn push_str(mut self, text: &str) -> Self {
        self.push_raw(text);
        self
    }

    pub fn push_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Chunk::Raw(last)) = self.chunks.last_mut() {
            last.push_str(text);
        } else {
            self.chunks.push(Chunk::raw(text));
        }
    }

    pub fn push_chunk(&mut self, chunk: Chunk) {
        match chunk {
            Chunk::Raw(text) => self.push_raw(&text),
            other => self.chunks.push(other),
        }
    }

    pub fn append(mut self, other: Fragment) -> Self {
        self.append_mut(other);
        self
    }

    pub fn append_mut(&mut self, other: Fragment) {
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        for chunk in other.chunks {
            self.push_chunk(chunk);
        }
    }

    /// Wraps the fragment in parentheses.
    pub fn parens(self) -> Self {
        Self::raw("(").append(self).push_str(")")
    }

    /// Parameter indices in textual order.
    pub fn params(&self) -> impl Iterator<Item = usize> + '_ {
        self.chunks.iter().filter_map(|chunk| match chunk {
            Chunk::Param(index) => Some(*index),
            _ => None,
        })
    }
}

impl From<&str> for Fragment {
    fn from(value: &str) -> Self {
        Self::raw(value)
    }
}

/// Name and alias of one table of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: CompactString,
    pub alias: CompactString,
}

/// A rendered statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub parameters: Vec<BoundParam>,
}

/// Renders a statement fragment.
///
/// Aliases are written only when `tables` holds more than one entry.
/// Parameters are numbered in the order their placeholders appear in the text.
pub fn render(
    fragment: &Fragment,
    tables: &[TableRef],
    params: &ParamCollector,
    adapter: &dyn DialectAdapter,
) -> Result<Rendered> {
    let qualify = tables.len() > 1;
    let mut sql = String::with_capacity(fragment.chunks.len().saturating_mul(12).max(64));
    let mut parameters = Vec::with_capacity(params.len());

    let table = |index: usize| {
        tables
            .get(index)
            .ok_or(QuarryError::UnknownTable { index })
    };

    for chunk in &fragment.chunks {
        match chunk {
            Chunk::Raw(text) => sql.push_str(text),
            Chunk::Column { table: index, column } => {
                let table = table(*index)?;
                if qualify {
                    sql.push_str(&table.alias);
                    sql.push('.');
                }
                sql.push_str(&adapter.quote_identifier(column));
            }
            Chunk::Table(index) => {
                let table = table(*index)?;
                sql.push_str(&adapter.quote_identifier(&table.name));
                if qualify {
                    sql.push(' ');
                    sql.push_str(&table.alias);
                }
            }
            Chunk::Param(index) => {
                let position = parameters.len() + 1;
                let bound = params.bind(*index, position, adapter)?;
                sql.push_str(&bound.placeholder);
                parameters.push(bound);
            }
        }
    }

    Ok(Rendered { sql, parameters })
}

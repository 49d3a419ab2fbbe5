use compact_str::{CompactString, format_compact};

use crate::error::{QuarryError, Result};
use crate::sql::{Fragment, TableRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

/// How a table entered the statement.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    From,
    /// Declared join.
    Join(JoinKind),
    /// Joined implicitly by member access through a to-one navigation.
    Navigation { parent: usize, member: CompactString },
    /// Joined to materialize an included navigation.
    Include { parent: usize, member: CompactString },
    /// Root of a correlated subquery; never part of the outer FROM.
    Subquery,
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    /// Entity whose columns the table exposes.
    pub entity: CompactString,
    pub table: CompactString,
    pub alias: CompactString,
    pub source: TableSource,
    /// Join condition, for everything but the FROM table and subquery roots.
    pub on: Option<Fragment>,
    /// Subquery root the table belongs to, `None` for the outer statement.
    pub scope: Option<usize>,
}

impl TableInfo {
    pub fn join_kind(&self) -> Option<JoinKind> {
        match self.source {
            TableSource::Join(kind) => Some(kind),
            TableSource::Navigation { .. } | TableSource::Include { .. } => Some(JoinKind::Left),
            TableSource::From | TableSource::Subquery => None,
        }
    }
}

/// Alias for the table registered at `index`: `a` through `z`, then `t26`...
pub fn alias_for(index: usize) -> CompactString {
    match u8::try_from(index) {
        Ok(i) if i < 26 => CompactString::from(char::from(b'a' + i).to_string()),
        _ => format_compact!("t{index}"),
    }
}

/// Tables of one statement, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: Vec<TableInfo>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        entity: impl Into<CompactString>,
        table: impl Into<CompactString>,
        source: TableSource,
        scope: Option<usize>,
    ) -> usize {
        let index = self.tables.len();
        self.tables.push(TableInfo {
            entity: entity.into(),
            table: table.into(),
            alias: alias_for(index),
            source,
            on: None,
            scope,
        });
        index
    }

    pub fn get(&self, index: usize) -> Result<&TableInfo> {
        self.tables
            .get(index)
            .ok_or(QuarryError::UnknownTable { index })
    }

    pub fn set_on(&mut self, index: usize, on: Fragment) -> Result<()> {
        let table = self
            .tables
            .get_mut(index)
            .ok_or(QuarryError::UnknownTable { index })?;
        table.on = Some(on);
        Ok(())
    }

    /// Existing implicit join for `parent.member`.
    pub fn find_navigation(&self, parent: usize, member: &str) -> Option<usize> {
        self.tables.iter().position(|t| {
            matches!(&t.source, TableSource::Navigation { parent: p, member: m } if *p == parent && m == member)
        })
    }

    pub fn find_include(&self, parent: usize, member: &str) -> Option<usize> {
        self.tables.iter().position(|t| {
            matches!(&t.source, TableSource::Include { parent: p, member: m } if *p == parent && m == member)
        })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TableInfo)> + '_ {
        self.tables.iter().enumerate()
    }

    /// Name/alias pairs for rendering.
    pub fn refs(&self) -> Vec<TableRef> {
        self.tables
            .iter()
            .map(|t| TableRef {
                name: t.table.clone(),
                alias: t.alias.clone(),
            })
            .collect()
    }

    /// `JOIN` clauses of tables in `scope`, in registration order.
    pub fn joins(&self, scope: Option<usize>) -> Fragment {
        let mut out = Fragment::empty();
        for (index, table) in self.iter() {
            if table.scope != scope {
                continue;
            }
            let Some(kind) = table.join_kind() else {
                continue;
            };
            out.push_raw(" ");
            out.push_raw(kind.keyword());
            out.push_raw(" ");
            out.append_mut(Fragment::table(index));
            if let Some(on) = &table.on {
                out.push_raw(" ON ");
                out.append_mut(on.clone());
            }
        }
        out
    }
}

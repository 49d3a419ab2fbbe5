//! SELECT statement assembly.

use compact_str::CompactString;

use crate::compiler::TableSet;
use crate::sql::Fragment;

/// Compiled pieces of one SELECT, ready to be stitched together.
#[derive(Debug, Default)]
pub(crate) struct SelectParts {
    pub distinct: bool,
    pub columns: Vec<Fragment>,
    pub root: usize,
    pub filter: Option<Fragment>,
    pub group_by: Vec<Fragment>,
    pub having: Option<Fragment>,
    pub order_by: Vec<Fragment>,
    pub limit: Option<CompactString>,
}

impl SelectParts {
    pub fn assemble(self, tables: &TableSet) -> Fragment {
        let mut sql = Fragment::raw(if self.distinct {
            "SELECT DISTINCT "
        } else {
            "SELECT "
        });
        sql.append_mut(Fragment::join(self.columns, ", "));
        sql.push_raw(" FROM ");
        sql.append_mut(Fragment::table(self.root));
        sql.append_mut(tables.joins(None));

        if let Some(filter) = self.filter {
            sql.push_raw(" WHERE ");
            sql.append_mut(filter);
        }
        if !self.group_by.is_empty() {
            sql.push_raw(" GROUP BY ");
            sql.append_mut(Fragment::join(self.group_by, ", "));
        }
        if let Some(having) = self.having {
            sql.push_raw(" HAVING ");
            sql.append_mut(having);
        }
        if !self.order_by.is_empty() {
            sql.push_raw(" ORDER BY ");
            sql.append_mut(Fragment::join(self.order_by, ", "));
        }
        if let Some(limit) = self.limit {
            sql.push_raw(" ");
            sql.push_raw(&limit);
        }
        sql
    }
}

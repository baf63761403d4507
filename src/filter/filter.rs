use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::*;

/// Builder-style helpers for composing store queries
impl FilterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, column: impl Into<String>, data: impl Serialize) -> Self {
        self.clauses.push(Clause::Where(FilterWhereInfo {
            column: column.into(),
            operator: FilterOp::Eq,
            data: json!(data),
        }));
        self
    }

    pub fn where_in<T: Serialize>(mut self, column: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(|v| json!(v)).collect();
        self.clauses.push(Clause::Where(FilterWhereInfo {
            column: column.into(),
            operator: FilterOp::In,
            data: Value::Array(values),
        }));
        self
    }

    pub fn where_ids(self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.where_in("_id", ids.into_iter().map(|id| id.to_string()))
    }

    pub fn where_any(mut self, column: impl Into<String>, data: impl Serialize) -> Self {
        self.clauses.push(Clause::Where(FilterWhereInfo {
            column: column.into(),
            operator: FilterOp::Any,
            data: json!(data),
        }));
        self
    }

    /// Case-insensitive substring match on any of the given columns
    pub fn where_search(mut self, columns: &[&str], needle: &str) -> Self {
        let alternatives = columns
            .iter()
            .map(|column| {
                Clause::Where(FilterWhereInfo {
                    column: column.to_string(),
                    operator: FilterOp::ILike,
                    data: Value::String(needle.to_string()),
                })
            })
            .collect();
        self.clauses.push(Clause::Or(alternatives));
        self
    }

    pub fn with_clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, sort: SortDirection) -> Self {
        self.order = Some(FilterOrderInfo { column: column.into(), sort });
        self
    }

    pub fn paginate(mut self, page: u64, limit: u64) -> Self {
        self.limit = Some(limit);
        // offsets are bound as BIGINT
        let offset = page.saturating_sub(1).saturating_mul(limit);
        self.offset = Some(offset.min(i64::MAX as u64));
        self
    }

    /// Same conditions without ordering or paging, for counting
    pub fn without_paging(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    /// SELECT over a JSONB document table
    pub fn to_sql(&self, table: &str) -> SqlResult {
        let (where_clause, mut params) = FilterWhere::generate(&self.clauses, 0);
        let mut query = format!("SELECT doc FROM \"{}\" WHERE {}", table, where_clause);

        if let Some(order) = &self.order {
            let (order_sql, order_params) = FilterOrder::generate(order, params.len());
            query.push_str(&order_sql);
            params.extend(order_params);
        } else {
            query.push_str(" ORDER BY created_at ASC");
        }
        if let Some(limit) = self.limit {
            params.push(SqlParam::Int(limit as i64));
            query.push_str(&format!(" LIMIT ${}", params.len()));
        }
        if let Some(offset) = self.offset {
            params.push(SqlParam::Int(offset as i64));
            query.push_str(&format!(" OFFSET ${}", params.len()));
        }

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self, table: &str) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.clauses, 0);
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table, where_clause),
            params,
        }
    }
}

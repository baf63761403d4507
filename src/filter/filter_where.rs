use serde_json::Value;

use super::types::{Clause, FilterOp, FilterWhereInfo, SqlParam};

/// Generates the WHERE clause for JSONB document tables.
/// Column paths and values are always bound, never interpolated.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(clauses: &[Clause], starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let conditions: Vec<String> = clauses.iter().map(|c| filter_where.build_clause(c)).collect();
        let where_clause = if conditions.is_empty() { "1=1".to_string() } else { conditions.join(" AND ") };
        (where_clause, filter_where.param_values)
    }

    fn build_clause(&mut self, clause: &Clause) -> String {
        match clause {
            Clause::Where(info) => self.build_condition(info),
            Clause::Or(alternatives) if alternatives.is_empty() => "1=0".to_string(),
            Clause::Or(alternatives) => {
                let parts: Vec<String> = alternatives.iter().map(|c| self.build_clause(c)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    fn build_condition(&mut self, info: &FilterWhereInfo) -> String {
        let path = self.push(SqlParam::Path(info.path()));
        match info.operator {
            FilterOp::Eq => {
                let value = self.push(SqlParam::Json(info.data.clone()));
                format!("(doc #> {}::text[]) = {}::jsonb", path, value)
            }
            FilterOp::In => {
                let values = match &info.data {
                    Value::Array(_) => info.data.clone(),
                    other => Value::Array(vec![other.clone()]),
                };
                let value = self.push(SqlParam::Json(values));
                format!("{}::jsonb @> jsonb_build_array(doc #> {}::text[])", value, path)
            }
            FilterOp::Any => {
                let value = self.push(SqlParam::Json(info.data.clone()));
                format!("COALESCE(doc #> {}::text[], '[]'::jsonb) @> jsonb_build_array({}::jsonb)", path, value)
            }
            FilterOp::ILike => {
                let needle = info.data.as_str().map(str::to_string).unwrap_or_else(|| info.data.to_string());
                let pattern = self.push(SqlParam::Text(format!("%{}%", escape_like(&needle))));
                format!("(doc #>> {}::text[]) ILIKE {}", path, pattern)
            }
        }
    }

    fn push(&mut self, param: SqlParam) -> String {
        self.param_values.push(param);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

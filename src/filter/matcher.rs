use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::types::{Clause, FilterData, FilterOp, FilterWhereInfo, SortDirection};

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Map<String, Value>, column: &str) -> Option<&'a Value> {
    let mut segments = column.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// In-process evaluation of a filter, mirroring the SQL generated by `FilterWhere`
pub fn matches(doc: &Map<String, Value>, clauses: &[Clause]) -> bool {
    clauses.iter().all(|clause| matches_clause(doc, clause))
}

fn matches_clause(doc: &Map<String, Value>, clause: &Clause) -> bool {
    match clause {
        Clause::Where(info) => matches_condition(doc, info),
        Clause::Or(alternatives) => alternatives.iter().any(|c| matches_clause(doc, c)),
    }
}

fn matches_condition(doc: &Map<String, Value>, info: &FilterWhereInfo) -> bool {
    let field = lookup(doc, &info.column);
    match info.operator {
        FilterOp::Eq => field == Some(&info.data),
        FilterOp::In => match (&info.data, field) {
            (Value::Array(values), Some(field)) => values.contains(field),
            (other, Some(field)) => other == field,
            (_, None) => false,
        },
        FilterOp::Any => match field {
            Some(Value::Array(items)) => items.contains(&info.data),
            _ => false,
        },
        FilterOp::ILike => {
            let needle = info.data.as_str().map(str::to_lowercase).unwrap_or_default();
            match field {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                Some(Value::Null) | None => false,
                Some(other) => other.to_string().to_lowercase().contains(&needle),
            }
        }
    }
}

/// Filter, order and page a set of documents the way the SQL backend would
pub fn select(docs: Vec<Map<String, Value>>, filter: &FilterData) -> Vec<Map<String, Value>> {
    let mut selected: Vec<_> = docs.into_iter().filter(|doc| matches(doc, &filter.clauses)).collect();

    if let Some(order) = &filter.order {
        selected.sort_by(|a, b| {
            let ordering = compare(lookup(a, &order.column), lookup(b, &order.column));
            match order.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    let offset = filter.offset.unwrap_or(0) as usize;
    let iter = selected.into_iter().skip(offset);
    match filter.limit {
        Some(limit) => iter.take(limit as usize).collect(),
        None => iter.collect(),
    }
}

// Text ordering, like `doc #>> path` in PostgreSQL; missing values sort last
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn text(v: &Value) -> String {
        match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
    match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
        (Some(a), Some(b)) => text(a).cmp(&text(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

use serde_json::Value;

/// Comparison operators understood by both store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals the value
    Eq,
    /// Field equals one of the values in an array
    In,
    /// Array field contains the value
    Any,
    /// Case-insensitive substring match on a string field
    ILike,
}

/// A single `column <op> data` condition. Columns are dotted paths into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

impl FilterWhereInfo {
    /// Path segments of the column (`name.firstName` → `["name", "firstName"]`)
    pub fn path(&self) -> Vec<String> {
        self.column.split('.').map(str::to_string).collect()
    }
}

/// Conditions are AND-ed at the top level; `Or` groups alternatives.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Where(FilterWhereInfo),
    Or(Vec<Clause>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterData {
    pub clauses: Vec<Clause>,
    pub order: Option<FilterOrderInfo>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Bind parameter produced by the SQL generator
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Path(Vec<String>),
    Json(Value),
    Text(String),
    Int(i64),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

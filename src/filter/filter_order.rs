use super::types::{FilterOrderInfo, SqlParam};

pub struct FilterOrder;

impl FilterOrder {
    /// ` ORDER BY ...` fragment; the column path is bound after `param_count` existing params
    pub fn generate(order: &FilterOrderInfo, param_count: usize) -> (String, Vec<SqlParam>) {
        let path = order.column.split('.').map(str::to_string).collect();
        (
            format!(" ORDER BY doc #>> ${}::text[] {}", param_count + 1, order.sort.to_sql()),
            vec![SqlParam::Path(path)],
        )
    }
}

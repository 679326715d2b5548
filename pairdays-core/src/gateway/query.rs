//! Row selection: table, equality / membership filters, ordering.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::In(column, _) => column,
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        let actual = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, expected) => actual == expected,
            Filter::In(_, candidates) => candidates.contains(actual),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Query {
            table: table.to_string(),
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters.push(Filter::In(column.to_string(), values));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_filters_must_match() {
        let row = json!({"id": "m1", "user_id": "alice"});
        let query = Query::table("daily_messages").eq("id", "m1").eq("user_id", "alice");
        assert!(query.matches(&row));

        let wrong_owner = Query::table("daily_messages").eq("id", "m1").eq("user_id", "bob");
        assert!(!wrong_owner.matches(&row));
    }

    #[test]
    fn test_in_filter() {
        let row = json!({"memory_id": "b"});
        assert!(Query::table("memory_images").is_in("memory_id", ["a", "b"]).matches(&row));
        assert!(!Query::table("memory_images").is_in("memory_id", ["c"]).matches(&row));
    }

    #[test]
    fn test_missing_column_is_null() {
        let row = json!({});
        assert!(Query::table("events").eq("note", Value::Null).matches(&row));
    }
}

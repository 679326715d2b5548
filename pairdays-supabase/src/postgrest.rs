//! PostgREST query-string encoding.
//!
//! `?select=*&user_id=eq.<id>&memory_id=in.("a","b")&order=date.asc,start_time.asc`

use pairdays_core::gateway::{Filter, Query};
use serde_json::Value;
use url::Url;

/// Text form of a filter operand. Strings go in raw; everything else uses
/// its JSON spelling (`true`, `42`, `null`).
fn operand(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Members of an `in.(...)` list are double-quoted so commas and parentheses
/// inside values survive.
fn quoted(value: &Value) -> String {
    let raw = operand(value).replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{raw}\"")
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, Value::Null) => (column.clone(), "is.null".to_string()),
        Filter::Eq(column, value) => (column.clone(), format!("eq.{}", operand(value))),
        Filter::In(column, values) => {
            let list: Vec<String> = values.iter().map(quoted).collect();
            (column.clone(), format!("in.({})", list.join(",")))
        }
    }
}

/// Append the query's filters (and, when `with_order`, its select list and
/// ordering) to `url`.
pub fn apply(url: &mut Url, query: &Query, with_order: bool) {
    let mut pairs = url.query_pairs_mut();

    if with_order {
        pairs.append_pair("select", "*");
    }

    for filter in &query.filters {
        let (column, expr) = filter_param(filter);
        pairs.append_pair(&column, &expr);
    }

    if with_order && !query.order.is_empty() {
        let order: Vec<String> = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect();
        pairs.append_pair("order", &order.join(","));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(query: &Query, with_order: bool) -> String {
        let mut url = Url::parse("https://abc.supabase.co/rest/v1/events").unwrap();
        apply(&mut url, query, with_order);
        let pairs: Vec<String> = url
            .query_pairs()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        pairs.join("&")
    }

    #[test]
    fn test_select_with_order() {
        let query = Query::table("events").order_asc("date").order_asc("start_time");
        assert_eq!(encoded(&query, true), "select=*&order=date.asc,start_time.asc");
    }

    #[test]
    fn test_owner_filter_and_desc_order() {
        let query = Query::table("daily_messages")
            .eq("user_id", "a3f0f7f2-9a0c-4d35-8b3f-5e2a6f1d7c02")
            .order_desc("created_at");
        assert_eq!(
            encoded(&query, true),
            "select=*&user_id=eq.a3f0f7f2-9a0c-4d35-8b3f-5e2a6f1d7c02&order=created_at.desc"
        );
    }

    #[test]
    fn test_delete_has_no_select_or_order() {
        let query = Query::table("daily_messages").eq("id", "m1").eq("user_id", "u1");
        assert_eq!(encoded(&query, false), "id=eq.m1&user_id=eq.u1");
    }

    #[test]
    fn test_in_filter_quotes_members() {
        let query = Query::table("memory_images").is_in("memory_id", ["a", "b,c"]);
        assert_eq!(encoded(&query, false), "memory_id=in.(\"a\",\"b,c\")");
    }

    #[test]
    fn test_null_and_number_operands() {
        let query = Query::table("events").eq("note", Value::Null).eq("n", 3);
        assert_eq!(encoded(&query, false), "note=is.null&n=eq.3");
    }
}

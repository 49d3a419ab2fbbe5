#![allow(dead_code)]

use quarry::prelude::*;

/// Stores a list of text values as one comma-separated column.
pub fn csv_handler() -> FnTypeHandler {
    FnTypeHandler::new(
        ScalarKind::Text,
        |value| match value {
            Value::List(items) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                Ok(Value::Text(parts.join(",")))
            }
            other => Err(format!("expected a list, got {}", other.type_name())),
        },
        |value| match value {
            Value::Text(text) if text.is_empty() => Ok(Value::List(Vec::new())),
            Value::Text(text) => Ok(Value::List(text.split(',').map(Value::from).collect())),
            other => Err(format!("expected text, got {}", other.type_name())),
        },
    )
}

/// Shop model shared by the integration tests.
///
/// - `User` (`users`): `name` stored as `user_name`, optional `company`,
///   `orders` through `Order.buyer_id`, `tags` through a CSV handler
/// - `Order` (`orders`): `lines`, `buyer`
/// - `OrderLine` (`order_lines`)
/// - `Company` (`companies`): `info`, `employees`
/// - `CompanyInfo` (`company_infos`)
/// - `CompanySummary`: projection of `Company`, exposed by `User.employer`
pub fn registry() -> EntityRegistry {
    RegistryBuilder::new()
        .entity("User", |e| {
            e.to_table("users");
            e.member("id", ScalarKind::Int).key().auto_increment();
            e.member("name", ScalarKind::Text).field("user_name");
            e.member("age", ScalarKind::Int);
            e.member("email", ScalarKind::Text);
            e.member("active", ScalarKind::Bool);
            e.member("company_id", ScalarKind::Int);
            e.member("tags", MemberType::custom("Tags"))
                .type_handler(csv_handler());
            e.ignore("display_name", ScalarKind::Text);
            e.has_one("company", "Company");
            e.has_one("employer", "Company")
                .has_foreign_key("company_id")
                .map_to("CompanySummary");
            e.has_many("orders", "Order").has_foreign_key("buyer_id");
        })
        .entity("Order", |e| {
            e.to_table("orders");
            e.member("id", ScalarKind::Int).key().auto_increment();
            e.member("buyer_id", ScalarKind::Int);
            e.member("total", ScalarKind::Float);
            e.member("placed_at", ScalarKind::DateTime);
            e.member("status", ScalarKind::Text);
            e.has_many("lines", "OrderLine");
            e.has_one("buyer", "User").has_foreign_key("buyer_id");
        })
        .entity("OrderLine", |e| {
            e.to_table("order_lines");
            e.member("id", ScalarKind::Int).key();
            e.member("order_id", ScalarKind::Int);
            e.member("sku", ScalarKind::Text);
            e.member("qty", ScalarKind::Int);
        })
        .entity("Company", |e| {
            e.to_table("companies");
            e.member("id", ScalarKind::Int).key();
            e.member("title", ScalarKind::Text);
            e.member("info_id", ScalarKind::Int);
            e.has_one("info", "CompanyInfo");
            e.has_many("employees", "User");
        })
        .entity("CompanyInfo", |e| {
            e.to_table("company_infos");
            e.member("id", ScalarKind::Int).key();
            e.member("founded", ScalarKind::Int);
        })
        .projection("CompanySummary", "Company", ["title"])
        .build()
        .expect("shop registry builds")
}

pub fn lambda(param: &str, body: Expr) -> Lambda {
    Lambda::new([param], body)
}

pub fn u() -> Expr {
    root("u")
}

pub fn o() -> Expr {
    root("o")
}

/// Compiles `query` with the ANSI adapter.
pub fn ansi(query: &Query) -> CompiledQuery {
    query
        .compile(&registry(), &AnsiDialect)
        .expect("query compiles")
}

/// Compiles a `User` query with the single filter `body` over `u`.
pub fn user_where(body: Expr) -> CompiledQuery {
    ansi(&Query::from("User").r#where(lambda("u", body)))
}

/// The WHERE clause of `sql`, or the empty string.
pub fn where_clause(sql: &str) -> &str {
    sql.split_once(" WHERE ").map_or("", |(_, rest)| rest)
}

/// Parameter values in placeholder order.
pub fn values(compiled: &CompiledQuery) -> Vec<Value> {
    compiled.parameters.iter().map(|p| p.value.clone()).collect()
}

/// `true` when every `(` in `sql` outside string literals is closed in order.
pub fn balanced(sql: &str) -> bool {
    let mut depth = 0i32;
    let mut quoted = false;
    for c in sql.chars() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !quoted
}

mod common;

use common::*;
use quarry::prelude::*;

fn sample_queries() -> Vec<Query> {
    vec![
        Query::from("User").r#where(lambda(
            "u",
            !(u().get("age").gt(1) & (u().get("name").contains("a") | u().get("active"))),
        )),
        Query::from("User")
            .r#where(lambda(
                "u",
                u().get("orders")
                    .any(lambda("o", o().get("status").eq("a") | o().get("total").lt(3.5))),
            ))
            .r#where(lambda("u", u().get("company").get("title").starts_with("A"))),
        Query::from("Order")
            .group_by(lambda("o", o().get("buyer_id")))
            .having(lambda("o", !(count().gt(2) | sum(o().get("total")).lt(10))))
            .select(lambda("o", object([("b", key()), ("n", count())]))),
        Query::from("User")
            .include(Include::new("orders").then_include("lines"))
            .include("company")
            .order_by(lambda("u", u().get("name"))),
        Query::from("User")
            .include("employer")
            .order_by_desc(lambda("u", u().get("age")))
            .skip(10)
            .take(5),
        Query::from("User").select(lambda(
            "u",
            object([
                ("label", cond(u().get("email").is_null_or_empty(), "none", u().get("email"))),
                ("n", u().get("orders").count()),
            ]),
        )),
    ]
}

#[test]
fn test_compilation_is_deterministic() {
    let registry = registry();
    for query in sample_queries() {
        let first = query.compile(&registry, &AnsiDialect).unwrap();
        let second = query.clone().compile(&registry, &AnsiDialect).unwrap();
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.parameters, second.parameters);
    }
}

#[test]
fn test_parentheses_balance() {
    for query in sample_queries() {
        let compiled = ansi(&query);
        assert!(balanced(&compiled.sql), "{}", compiled.sql);
    }
}

#[test]
fn test_placeholders_match_parameters() {
    for query in sample_queries() {
        let compiled = ansi(&query);
        assert_eq!(
            compiled.sql.matches('?').count(),
            compiled.parameters.len(),
            "{}",
            compiled.sql
        );
    }
}

#[test]
fn test_aliases_follow_registration_order() {
    let compiled = ansi(
        &Query::from("User")
            .r#where(lambda("u", u().get("company").get("info").get("founded").gt(1)))
            .include("orders"),
    );
    let from = compiled.sql.split_once(" FROM ").map(|(_, rest)| rest).unwrap();
    let a = from.find(r#""users" a"#).unwrap();
    let b = from.find(r#""orders" b"#).unwrap();
    let c = from.find(r#""companies" c"#).unwrap();
    let d = from.find(r#""company_infos" d"#).unwrap();
    assert!(a < b && b < c && c < d, "{from}");
}

#[test]
fn test_double_negation_is_identity() {
    let predicates = [
        u().get("age").gt(3),
        u().get("name").eq("x") | u().get("age").le(2),
        u().get("active") & u().get("email").is_not_null(),
        u().get("orders").exists(),
        u().get("email").is_null_or_empty(),
    ];
    for predicate in predicates {
        let plain = user_where(predicate.clone());
        let doubled = user_where(!!predicate);
        assert_eq!(plain.sql, doubled.sql);
        assert_eq!(plain.parameters, doubled.parameters);
    }
}

#[test]
fn test_null_comparisons_never_bind() {
    for expr in [
        u().get("email").eq(null()),
        null().eq(u().get("email")),
        u().get("email").ne(var("e", None::<&str>)),
    ] {
        let compiled = user_where(expr);
        assert!(compiled.parameters.is_empty());
        assert!(where_clause(&compiled.sql).contains("IS"), "{}", compiled.sql);
        assert!(!compiled.sql.contains("= NULL"));
    }
}

#[test]
fn test_concat_chain_renders_once() {
    let compiled = ansi(&Query::from("User").select(lambda(
        "u",
        u().get("name") + "-" + u().get("email") + "-" + u().get("age").to_text(),
    )));
    assert_eq!(compiled.sql.matches("CONCAT(").count(), 1, "{}", compiled.sql);

    #[cfg(feature = "sqlite")]
    {
        let registry = registry();
        let compiled = Query::from("User")
            .select(lambda("u", u().get("name") + "-" + u().get("email")))
            .compile(&registry, &SQLiteDialect::new())
            .unwrap();
        assert_eq!(compiled.sql.matches('(').count(), 1, "{}", compiled.sql);
    }
}

#[test]
fn test_empty_list_membership_binds_nothing() {
    let compiled = user_where(!var("ids", Vec::<i64>::new()).contains(u().get("id")));
    assert!(compiled.parameters.is_empty());
    assert_eq!(where_clause(&compiled.sql), "1 = 1");
}

fn user_row(id: i64) -> Vec<Value> {
    vec![
        Value::Int(id),
        Value::from("ann"),
        Value::Int(30),
        Value::Null,
        Value::Bool(true),
        Value::Null,
        Value::from(""),
    ]
}

#[test]
fn test_to_one_with_null_identity_is_null() {
    let registry = registry();
    let compiled = Query::from("User")
        .include("company")
        .compile(&registry, &AnsiDialect)
        .unwrap();
    let plan = compiled.plan(&registry).unwrap();
    let mut row = user_row(1);
    row.extend([Value::Null, Value::Null, Value::Null]);
    let users = Materializer::new(&plan).materialize(vec![row]).unwrap();
    let user = users[0].as_record().unwrap();
    assert_eq!(user.get("company"), Some(&Value::Null));
}

#[test]
fn test_to_many_rows_fold_back() {
    let registry = registry();
    let compiled = Query::from("Order")
        .include("lines")
        .compile(&registry, &AnsiDialect)
        .unwrap();
    let plan = compiled.plan(&registry).unwrap();
    let order = |id: i64| {
        vec![
            Value::Int(id),
            Value::Int(1),
            Value::Float(1.0),
            Value::Null,
            Value::from("new"),
        ]
    };
    let line = |id: i64, order: i64| vec![Value::Int(id), Value::Int(order), Value::from("s"), Value::Int(1)];

    let mut rows = Vec::new();
    for order_id in 1..=3 {
        for line_id in 0..order_id {
            rows.push([order(order_id), line(order_id * 10 + line_id, order_id)].concat());
        }
    }
    let orders = Materializer::new(&plan).materialize(&rows).unwrap();
    let counts: Vec<usize> = orders
        .iter()
        .map(|o| {
            o.as_record()
                .and_then(|r| r.get("lines"))
                .and_then(Value::as_list)
                .map_or(0, <[Value]>::len)
        })
        .collect();
    assert_eq!(counts, [1, 2, 3]);
}

#[test]
fn test_shared_types_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EntityRegistry>();
    assert_send_sync::<CompiledQuery>();
    assert_send_sync::<MaterializationPlan>();
    assert_send_sync::<AnsiDialect>();
    #[cfg(feature = "sqlite")]
    assert_send_sync::<SQLiteDialect>();
    #[cfg(feature = "postgres")]
    assert_send_sync::<PostgresDialect>();
    #[cfg(feature = "mysql")]
    assert_send_sync::<MySQLDialect>();
}

mod common;

use common::*;
use quarry::prelude::*;

#[test]
fn test_scalar_projection() {
    let compiled = ansi(&Query::from("User").select(lambda("u", u().get("name"))));
    assert_eq!(compiled.sql, r#"SELECT "user_name" FROM "users""#);
    assert_eq!(compiled.fields.len(), 1);
    assert!(compiled.fields[0].path.is_empty());
    assert!(matches!(
        compiled.plan(&registry()).unwrap(),
        MaterializationPlan::Scalar(_)
    ));
}

#[test]
fn test_object_projection_aliases_by_member() {
    let compiled = ansi(&Query::from("User").select(lambda(
        "u",
        object([
            ("id", u().get("id")),
            ("shout", u().get("name").to_upper()),
            ("next_age", u().get("age") + 1),
        ]),
    )));
    assert_eq!(
        compiled.sql,
        r#"SELECT "id", UPPER("user_name") AS "shout", "age" + 1 AS "next_age" FROM "users""#
    );
    let names: Vec<&str> = compiled.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id", "shout", "next_age"]);
}

#[test]
fn test_predicate_in_projection_becomes_case() {
    let compiled = ansi(&Query::from("User").select(lambda(
        "u",
        object([
            ("adult", u().get("age").ge(18)),
            ("label", cond(u().get("active"), "on", "off")),
        ]),
    )));
    assert_eq!(
        compiled.sql,
        r#"SELECT CASE WHEN "age" >= 18 THEN TRUE ELSE FALSE END AS "adult", CASE WHEN "active" = TRUE THEN ? ELSE ? END AS "label" FROM "users""#
    );
    assert_eq!(
        values(&compiled),
        vec![Value::from("on"), Value::from("off")]
    );
}

#[test]
fn test_arithmetic_precedence_in_projection() {
    let compiled = ansi(&Query::from("User").select(lambda("u", u().get("age") * 2 + 1)));
    assert_eq!(compiled.sql, r#"SELECT "age" * 2 + 1 FROM "users""#);

    let compiled = ansi(&Query::from("User").select(lambda("u", u().get("age") - (u().get("age") - 1))));
    assert_eq!(compiled.sql, r#"SELECT "age" - ("age" - 1) FROM "users""#);

    let compiled = ansi(&Query::from("User").select(lambda("u", -(u().get("age") + 1))));
    assert_eq!(compiled.sql, r#"SELECT -("age" + 1) FROM "users""#);
}

#[test]
fn test_cast_and_functions() {
    let compiled = ansi(&Query::from("Order").select(lambda(
        "o",
        object([
            ("cents", (o().get("total") * 100).cast(ScalarKind::Int)),
            ("year", o().get("placed_at").year()),
            ("code", o().get("status").substring(0, 3)),
        ]),
    )));
    assert_eq!(
        compiled.sql,
        r#"SELECT CAST("total" * 100 AS INTEGER) AS "cents", EXTRACT(YEAR FROM "placed_at") AS "year", SUBSTR("status", 1, 3) AS "code" FROM "orders""#
    );
}

#[test]
fn test_entity_member_in_projection_is_flattened() {
    let compiled = ansi(&Query::from("User").select(lambda(
        "u",
        object([("id", u().get("id")), ("company", u().get("company"))]),
    )));
    assert_eq!(
        compiled.sql,
        r#"SELECT a."id", b."id" AS "company_id", b."title" AS "company_title", b."info_id" AS "company_info_id" FROM "users" a LEFT JOIN "companies" b ON a."company_id" = b."id""#
    );
    assert_eq!(compiled.fields[1].path.as_slice(), ["company", "id"]);
    assert!(compiled.fields[1].is_key);
}

#[test]
fn test_group_by_with_aggregates_and_having() {
    let query = Query::from("Order")
        .group_by(lambda("o", o().get("buyer_id")))
        .having(lambda("o", count().gt(1)))
        .select(lambda(
            "o",
            object([
                ("buyer", key()),
                ("spent", sum(o().get("total"))),
                ("orders", count()),
            ]),
        ));
    assert_eq!(
        ansi(&query).sql,
        r#"SELECT "buyer_id" AS "buyer", SUM("total") AS "spent", COUNT(*) AS "orders" FROM "orders" GROUP BY "buyer_id" HAVING COUNT(*) > 1"#
    );
}

#[test]
fn test_composite_group_key() {
    let query = Query::from("Order")
        .group_by(lambda(
            "o",
            object([("buyer", o().get("buyer_id")), ("status", o().get("status"))]),
        ))
        .select(lambda(
            "o",
            object([
                ("b", key_member("buyer")),
                ("s", key_member("status")),
                ("n", count_distinct(o().get("id"))),
            ]),
        ));
    assert_eq!(
        ansi(&query).sql,
        r#"SELECT "buyer_id" AS "b", "status" AS "s", COUNT(DISTINCT "id") AS "n" FROM "orders" GROUP BY "buyer_id", "status""#
    );

    let err = Query::from("Order")
        .group_by(lambda(
            "o",
            object([("buyer", o().get("buyer_id")), ("status", o().get("status"))]),
        ))
        .select(lambda("o", key()))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
}

#[test]
fn test_group_key_must_be_a_member() {
    let err = Query::from("Order")
        .group_by(lambda("o", o().get("total") + 1))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);

    let err = Query::from("User")
        .group_by(lambda("u", u().get("company")))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
}

#[test]
fn test_key_outside_group_by() {
    let err = Query::from("Order")
        .select(lambda("o", key()))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
}

#[test]
fn test_ordering_distinct_and_paging() {
    let query = Query::from("User")
        .select(lambda("u", u().get("name")))
        .distinct()
        .order_by(lambda("u", u().get("name")))
        .order_by_desc(lambda("u", u().get("age")))
        .skip(20)
        .take(10);
    assert_eq!(
        ansi(&query).sql,
        r#"SELECT DISTINCT "user_name" FROM "users" ORDER BY "user_name", "age" DESC LIMIT 10 OFFSET 20"#
    );

    let skip_only = Query::from("User").select(lambda("u", u().get("id"))).skip(5);
    assert_eq!(ansi(&skip_only).sql, r#"SELECT "id" FROM "users" OFFSET 5"#);
}

#[test]
fn test_order_by_navigation_member() {
    let query = Query::from("Order")
        .select(lambda("o", o().get("id")))
        .order_by(lambda("o", o().get("buyer").get("name")));
    assert_eq!(
        ansi(&query).sql,
        r#"SELECT a."id" FROM "orders" a LEFT JOIN "users" b ON a."buyer_id" = b."id" ORDER BY b."user_name""#
    );
}

#[test]
fn test_whole_entity_projection() {
    let compiled = ansi(&Query::from("Order").select(lambda("o", o())));
    assert_eq!(
        compiled.sql,
        r#"SELECT "id", "buyer_id", "total", "placed_at", "status" FROM "orders""#
    );

    let compiled = ansi(&Query::from("Order").select(lambda("o", o().get("buyer"))));
    assert!(compiled.sql.starts_with(r#"SELECT b."id", b."user_name" AS "name""#));
    let plan = compiled.plan(&registry()).unwrap();
    assert_eq!(plan.root().and_then(|r| r.entity.as_deref()), Some("User"));
}

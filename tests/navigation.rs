mod common;

use common::*;
use quarry::prelude::*;

const QUALIFIED_USER_COLUMNS: &str = r#"a."id", a."user_name" AS "name", a."age", a."email", a."active", a."company_id", a."tags""#;

#[test]
fn test_to_one_member_access_joins_once() {
    let body = u().get("company").get("title").eq("Acme") | u().get("company").get("id").eq(3);
    let compiled = user_where(body);
    assert_eq!(
        compiled.sql,
        format!(
            r#"SELECT {QUALIFIED_USER_COLUMNS} FROM "users" a LEFT JOIN "companies" b ON a."company_id" = b."id" WHERE b."title" = ? OR b."id" = 3"#
        )
    );
}

#[test]
fn test_navigation_chain_joins_each_hop() {
    let compiled = user_where(u().get("company").get("info").get("founded").lt(2000));
    assert_eq!(
        compiled.sql.split_once(" FROM ").map(|(_, rest)| rest),
        Some(
            r#""users" a LEFT JOIN "companies" b ON a."company_id" = b."id" LEFT JOIN "company_infos" c ON b."info_id" = c."id" WHERE c."founded" < 2000"#
        )
    );
}

#[test]
fn test_any_compiles_to_correlated_exists() {
    let compiled = user_where(
        u().get("orders")
            .any(lambda("o", o().get("total").gt(100.0))),
    );
    assert_eq!(
        where_clause(&compiled.sql),
        r#"EXISTS (SELECT 1 FROM "orders" b WHERE a."id" = b."buyer_id" AND b."total" > 100.0)"#
    );
    assert!(compiled.sql.contains(r#"FROM "users" a WHERE"#));
}

#[test]
fn test_negated_exists() {
    let compiled = user_where(!u().get("orders").exists());
    assert_eq!(
        where_clause(&compiled.sql),
        r#"NOT EXISTS (SELECT 1 FROM "orders" b WHERE a."id" = b."buyer_id")"#
    );
}

#[test]
fn test_navigation_count_is_a_scalar_subquery() {
    let compiled = user_where(u().get("orders").count().gt(2));
    assert_eq!(
        where_clause(&compiled.sql),
        r#"(SELECT COUNT(*) FROM "orders" b WHERE a."id" = b."buyer_id") > 2"#
    );

    let compiled = user_where(!u().get("orders").count().gt(2));
    assert_eq!(
        where_clause(&compiled.sql),
        r#"(SELECT COUNT(*) FROM "orders" b WHERE a."id" = b."buyer_id") <= 2"#
    );
}

#[test]
fn test_nested_any() {
    let lines = lambda("l", root("l").get("qty").gt(5));
    let compiled = user_where(
        u().get("orders")
            .any(lambda("o", o().get("lines").any(lines))),
    );
    assert_eq!(
        where_clause(&compiled.sql),
        r#"EXISTS (SELECT 1 FROM "orders" b WHERE a."id" = b."buyer_id" AND EXISTS (SELECT 1 FROM "order_lines" c WHERE b."id" = c."order_id" AND c."qty" > 5))"#
    );
}

#[test]
fn test_navigation_inside_subquery_joins_inside_it() {
    let compiled = ansi(&Query::from("Company").r#where(lambda(
        "c",
        root("c")
            .get("employees")
            .any(lambda("e", root("e").get("company").get("title").eq("x"))),
    )));
    assert_eq!(
        where_clause(&compiled.sql),
        r#"EXISTS (SELECT 1 FROM "users" b LEFT JOIN "companies" c ON b."company_id" = c."id" WHERE a."id" = b."company_id" AND c."title" = ?)"#
    );
    assert!(compiled.sql.contains(r#"FROM "companies" a WHERE"#));
}

#[test]
fn test_any_filter_with_or_is_parenthesized() {
    let filter = lambda("o", o().get("status").eq("new") | o().get("status").eq("paid"));
    let compiled = user_where(u().get("orders").any(filter));
    assert!(
        compiled
            .sql
            .ends_with(r#"AND (b."status" = ? OR b."status" = ?))"#),
        "{}",
        compiled.sql
    );
}

#[test]
fn test_declared_join_with_condition() {
    let both = |body: Expr| Lambda::new(["o", "u"], body);
    let query = Query::from("Order")
        .inner_join("User", both(o().get("buyer_id").eq(u().get("id"))))
        .r#where(both(u().get("age").gt(30)))
        .select(both(object([
            ("id", o().get("id")),
            ("buyer", u().get("name")),
        ])));
    let compiled = ansi(&query);
    assert_eq!(
        compiled.sql,
        r#"SELECT a."id", b."user_name" AS "buyer" FROM "orders" a INNER JOIN "users" b ON a."buyer_id" = b."id" WHERE b."age" > 30"#
    );
}

#[test]
fn test_join_condition_inferred_from_navigation() {
    let query = Query::from("Order")
        .join("User")
        .select(Lambda::new(["o", "u"], u().get("name")));
    assert_eq!(
        ansi(&query).sql,
        r#"SELECT b."user_name" FROM "orders" a INNER JOIN "users" b ON a."buyer_id" = b."id""#
    );

    let query = Query::from("User")
        .join("Order")
        .select(Lambda::new(["u", "o"], o().get("total")));
    assert_eq!(
        ansi(&query).sql,
        r#"SELECT b."total" FROM "users" a INNER JOIN "orders" b ON a."id" = b."buyer_id""#
    );
}

#[test]
fn test_left_and_right_joins() {
    let on = Lambda::new(["u", "c"], u().get("company_id").eq(root("c").get("id")));
    let left = Query::from("User")
        .left_join("Company", on.clone())
        .select(Lambda::new(["u", "c"], root("c").get("title")));
    assert!(ansi(&left).sql.contains(r#"LEFT JOIN "companies" b ON a."company_id" = b."id""#));

    let right = Query::from("User")
        .right_join("Company", on)
        .select(Lambda::new(["u", "c"], root("c").get("title")));
    assert!(ansi(&right).sql.contains(r#"RIGHT JOIN "companies" b"#));
}

#[test]
fn test_unrelated_join_needs_a_condition() {
    let err = Query::from("OrderLine")
        .join("CompanyInfo")
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_unbound_parameters() {
    let err = Query::from("Order")
        .join("User")
        .r#where(lambda("o", root("x").get("age").gt(1)))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert!(matches!(err, QuarryError::UnboundParameter { ref name } if name == "x"));

    let err = Query::from("User")
        .r#where(Lambda::new(["u", "extra"], u().get("age").gt(1)))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert!(matches!(err, QuarryError::UnboundParameter { ref name } if name == "extra"));
}

#[test]
fn test_to_many_member_needs_any_or_count() {
    let err = Query::from("User")
        .select(lambda("u", u().get("orders")))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);

    let err = Query::from("User")
        .r#where(lambda("u", u().get("name").exists()))
        .compile(&registry(), &AnsiDialect)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
}

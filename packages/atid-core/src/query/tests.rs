use super::*;

fn catalog_builder(engine: Engine) -> QueryBuilder {
    let mut qb = QueryBuilder::new(engine);
    for column in ["OBJECT_ID", "NAME", "RA", "DEC"] {
        qb.register_column("TBL_STELLAROBJECTS", column);
    }
    for column in ["OBJECT_ID", "NAME"] {
        qb.register_column("TBL_NAMES", column);
    }
    qb
}

#[test]
fn test_select_join_where_sqlite() {
    let mut qb = catalog_builder(Engine::Sqlite);
    qb.select([
        col("TBL_STELLAROBJECTS", "NAME"),
        col("TBL_STELLAROBJECTS", "RA"),
    ])
    .from("TBL_NAMES")
    .join(
        "TBL_STELLAROBJECTS",
        col("TBL_NAMES", "OBJECT_ID"),
        col("TBL_STELLAROBJECTS", "OBJECT_ID"),
    )
    .where_(Predicate::eq(col("TBL_NAMES", "NAME"), "Vega"));

    let stmt = qb.build().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT \"TBL_STELLAROBJECTS\".\"NAME\", \"TBL_STELLAROBJECTS\".\"RA\" \
         FROM \"TBL_NAMES\" \
         INNER JOIN \"TBL_STELLAROBJECTS\" ON \"TBL_NAMES\".\"OBJECT_ID\" = \"TBL_STELLAROBJECTS\".\"OBJECT_ID\" \
         WHERE \"TBL_NAMES\".\"NAME\" = ?"
    );
    assert_eq!(stmt.params, vec![SqlValue::from("Vega")]);
}

#[test]
fn test_placeholders_are_numbered_per_engine() {
    let predicate = Predicate::All(vec![
        Predicate::between(col("TBL_STELLAROBJECTS", "DEC"), -10.0, 10.0),
        Predicate::Any(vec![
            Predicate::between(col("TBL_STELLAROBJECTS", "RA"), 0.0, 2.0),
            Predicate::between(col("TBL_STELLAROBJECTS", "RA"), 358.0, 360.0),
        ]),
    ]);

    let mut pg = catalog_builder(Engine::PostgreSql);
    pg.select([col("TBL_STELLAROBJECTS", "NAME")])
        .from("TBL_STELLAROBJECTS")
        .where_(predicate.clone());
    let stmt = pg.build().unwrap();
    assert!(stmt.sql.ends_with(
        "WHERE (\"TBL_STELLAROBJECTS\".\"DEC\" BETWEEN $1 AND $2 AND \
         (\"TBL_STELLAROBJECTS\".\"RA\" BETWEEN $3 AND $4 OR \
         \"TBL_STELLAROBJECTS\".\"RA\" BETWEEN $5 AND $6))"
    ));
    assert_eq!(stmt.params.len(), 6);
    assert_eq!(stmt.params[4], SqlValue::Real(358.0));

    let mut ora = catalog_builder(Engine::Oracle);
    ora.select([col("TBL_STELLAROBJECTS", "NAME")])
        .from("TBL_STELLAROBJECTS")
        .where_(predicate);
    let stmt = ora.build().unwrap();
    assert!(stmt.sql.contains("BETWEEN :1 AND :2"));
    assert!(stmt.sql.contains("BETWEEN :5 AND :6"));
}

#[test]
fn test_mysql_quotes_with_backticks() {
    let mut qb = catalog_builder(Engine::MySql);
    qb.select([col("TBL_NAMES", "NAME")])
        .from("TBL_NAMES")
        .order_by(col("TBL_NAMES", "NAME"));
    assert_eq!(
        qb.build().unwrap().sql,
        "SELECT `TBL_NAMES`.`NAME` FROM `TBL_NAMES` ORDER BY `TBL_NAMES`.`NAME`"
    );
}

#[test]
fn test_values_never_reach_sql_text() {
    let mut qb = catalog_builder(Engine::Sqlite);
    let hostile = "x'; DROP TABLE TBL_NAMES; --";
    qb.select([col("TBL_NAMES", "NAME")])
        .from("TBL_NAMES")
        .where_(Predicate::compare(
            col("TBL_NAMES", "NAME"),
            Operator::Like,
            hostile,
        ));
    let stmt = qb.build().unwrap();
    assert!(!stmt.sql.contains("DROP"));
    assert_eq!(stmt.params, vec![SqlValue::from(hostile)]);
}

#[test]
fn test_unregistered_identifiers_rejected() {
    let mut qb = catalog_builder(Engine::Sqlite);
    qb.select([col("TBL_NAMES", "ALIAS")]).from("TBL_NAMES");
    assert_eq!(
        qb.build(),
        Err(QueryError::UnknownColumn {
            table: "TBL_NAMES".to_string(),
            column: "ALIAS".to_string(),
        })
    );

    qb.reset_query();
    qb.select([col("TBL_NAMES", "NAME")]).from("TBL_OBSERVATIONS");
    assert_eq!(
        qb.build(),
        Err(QueryError::UnknownTable("TBL_OBSERVATIONS".to_string()))
    );
}

#[test]
fn test_incomplete_statements_rejected() {
    let mut qb = catalog_builder(Engine::Sqlite);
    assert_eq!(qb.build(), Err(QueryError::NoColumns));

    qb.select([col("TBL_NAMES", "NAME")]);
    assert_eq!(qb.build(), Err(QueryError::NoTable));

    qb.from("TBL_NAMES").where_(Predicate::Any(Vec::new()));
    assert_eq!(qb.build(), Err(QueryError::EmptyGroup));
}

#[test]
fn test_reset_keeps_vocabulary() {
    let mut qb = catalog_builder(Engine::Sqlite);
    qb.select([col("TBL_NAMES", "NAME")])
        .from("TBL_NAMES")
        .where_(Predicate::IsNull(col("TBL_NAMES", "OBJECT_ID")));
    let first = qb.build().unwrap();
    assert!(first.sql.ends_with("IS NULL"));

    qb.reset_query();
    qb.select([col("TBL_STELLAROBJECTS", "RA")])
        .from("TBL_STELLAROBJECTS");
    let second = qb.build().unwrap();
    assert_eq!(
        second.sql,
        "SELECT \"TBL_STELLAROBJECTS\".\"RA\" FROM \"TBL_STELLAROBJECTS\""
    );
    assert!(second.params.is_empty());
}

#[test]
fn test_identifier_quote_is_escaped() {
    let dialect = Dialect::for_engine(Engine::PostgreSql);
    assert_eq!(dialect.quote_identifier("odd\"name"), "\"odd\"\"name\"");
    let dialect = Dialect::for_engine(Engine::MySql);
    assert_eq!(dialect.quote_identifier("a`b"), "`a``b`");
}

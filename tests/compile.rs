use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx_path_bind::{
    build_query, Binding, Dialect, Error, ParamInfo, QueryKind, ScalarType, Signature,
    TypeDescriptor,
};

fn int64() -> TypeDescriptor {
    TypeDescriptor::scalar(ScalarType::Int64)
}

fn text() -> TypeDescriptor {
    TypeDescriptor::scalar(ScalarType::Text)
}

fn id_status(status: TypeDescriptor) -> Signature {
    Signature::with_executor().input(int64()).input(status)
}

#[test]
fn queries_without_colons_pass_through() {
    for sql in ["SELECT 1", "", "SELECT * FROM t WHERE a = 'x' -- comment"] {
        let q = build_query(sql, "", &Signature::with_executor(), Dialect::MySql).unwrap();
        assert_eq!(q.kind(), QueryKind::Simple);
        assert_eq!(q.literal(), Some(sql));
        assert!(q.scalar_params().is_empty());
        assert!(q.collection_params().is_empty());
    }
}

#[test]
fn scalar_placeholders_become_positional() {
    let q = build_query(
        "WHERE id = :id: AND status = :status:",
        "id,status",
        &id_status(text()),
        Dialect::MySql,
    )
    .unwrap();

    assert_eq!(q.kind(), QueryKind::Simple);
    assert_eq!(q.literal(), Some("WHERE id = ? AND status = ?"));
    assert_eq!(
        q.scalar_params(),
        &[ParamInfo::new("id", 1), ParamInfo::new("status", 2)]
    );
}

#[test]
fn collection_placeholders_expand_at_bind_time() {
    let q = build_query(
        "WHERE id = :id: AND status IN (:status:)",
        "id,status",
        &id_status(TypeDescriptor::collection(text())),
        Dialect::Postgres,
    )
    .unwrap();
    assert_eq!(q.kind(), QueryKind::Templated);

    let bound = q.bind(&[json!(10), json!(["a", "b", "c"])]).unwrap();
    assert_eq!(bound.sql, "WHERE id = $1 AND status IN ($2, $3, $4)");
    assert_eq!(
        bound.bindings,
        vec![
            Binding { position: 1, value: json!(10) },
            Binding { position: 2, value: json!("a") },
            Binding { position: 3, value: json!("b") },
            Binding { position: 4, value: json!("c") },
        ]
    );

    // a shorter list on the next call starts from the same position
    let bound = q.bind(&[json!(10), json!(["z"])]).unwrap();
    assert_eq!(bound.sql, "WHERE id = $1 AND status IN ($2)");
}

#[test]
fn multiple_collections_take_consecutive_ranges() {
    let sig = Signature::with_executor()
        .input(TypeDescriptor::collection(int64()))
        .input(int64())
        .input(TypeDescriptor::collection(text()));
    let q = build_query(
        "a IN (:a:) AND x = :x: AND b IN (:b:)",
        "a,x,b",
        &sig,
        Dialect::Postgres,
    )
    .unwrap();

    let bound = q.bind(&[json!([1, 2]), json!(9), json!(["p", "q", "r"])]).unwrap();
    assert_eq!(bound.sql, "a IN ($2, $3) AND x = $1 AND b IN ($4, $5, $6)");
    let by_position: Vec<_> = bound.values().cloned().collect();
    assert_eq!(
        by_position,
        vec![json!(9), json!(1), json!(2), json!("p"), json!("q"), json!("r")]
    );
    let by_text: Vec<_> = bound.values_in_text_order().cloned().collect();
    assert_eq!(
        by_text,
        vec![json!(1), json!(2), json!(9), json!("p"), json!("q"), json!("r")]
    );
}

#[test]
fn record_paths_bind_nested_values() {
    let user = TypeDescriptor::record([
        ("id", int64()),
        (
            "address",
            TypeDescriptor::record([("zip", text()), ("city", text())]),
        ),
        ("meta", TypeDescriptor::mapping(text())),
    ]);
    let q = build_query(
        "WHERE zip = :user.address.zip: AND tag = :user.meta.tag:",
        "user",
        &Signature::with_executor().input(user),
        Dialect::MySql,
    )
    .unwrap();

    let bound = q
        .bind(&[json!({"id": 1, "address": {"zip": "90210"}, "meta": {}})])
        .unwrap();
    assert_eq!(bound.sql, "WHERE zip = ? AND tag = ?");
    let values: Vec<_> = bound.values().cloned().collect();
    assert_eq!(values, vec![json!("90210"), json!(null)]);
}

#[test]
fn bind_errors() {
    let q = build_query(
        "WHERE id = :id: AND status IN (:status:)",
        "id,status",
        &id_status(TypeDescriptor::collection(text())),
        Dialect::MySql,
    )
    .unwrap();

    assert!(matches!(q.bind(&[json!(1)]), Err(Error::MissingArgument(2))));
    assert!(matches!(
        q.bind(&[json!(1), json!("open")]),
        Err(Error::NotACollection(ref name)) if name == "status"
    ));

    let bound = q.bind(&[json!(1), json!(null)]).unwrap();
    assert_eq!(bound.sql, "WHERE id = ? AND status IN ()");
}

#[test]
fn compiling_twice_is_deterministic() {
    let compile = || {
        build_query(
            "WHERE id = :id: AND status IN (:status:)",
            "id,status",
            &id_status(TypeDescriptor::collection(text())),
            Dialect::Postgres,
        )
        .unwrap()
    };
    let args = [json!(3), json!(["x", "y"])];
    assert_eq!(compile().bind(&args).unwrap(), compile().bind(&args).unwrap());
}

#[test]
fn compile_errors() {
    let sig = id_status(text());
    let cases: [(&str, fn(&Error) -> bool); 10] = [
        ("a = ::", |e: &Error| matches!(e, Error::EmptyVariableDeclaration { .. })),
        ("a = :id", |e: &Error| matches!(e, Error::UnterminatedPlaceholder { .. })),
        ("a = :.id:", |e: &Error| matches!(e, Error::MalformedPath(_))),
        ("a = :id.:", |e: &Error| matches!(e, Error::MalformedPath(_))),
        ("a = :id..name:", |e: &Error| matches!(e, Error::MalformedPath(_))),
        ("a = :id;drop:", |e: &Error| matches!(e, Error::IllegalCharacter(_))),
        ("a = :id name:", |e: &Error| matches!(e, Error::MissingPathSeparator(_))),
        ("a = :1id:", |e: &Error| matches!(e, Error::InvalidIdentifierCharacter(_))),
        ("a = :nonexistent:", |e: &Error| matches!(e, Error::UnknownParameter(_))),
        ("a = :id.foo:", |e: &Error| matches!(e, Error::PathOnNonStructuredParameter(_))),
    ];
    for (sql, check) in cases {
        let err = build_query(sql, "id,status", &sig, Dialect::MySql).unwrap_err();
        assert!(check(&err), "{sql}: unexpected error {err:?}");
    }
}

#[test]
fn compiled_query_is_shareable_across_threads() {
    let q = build_query(
        "WHERE id IN (:ids:)",
        "ids",
        &Signature::with_executor().input(TypeDescriptor::collection(int64())),
        Dialect::Postgres,
    )
    .unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let q = &q;
                s.spawn(move || {
                    let ids: Vec<_> = (0..n).map(|i| json!(i)).collect();
                    (n, q.bind(&[json!(ids)]).unwrap().sql)
                })
            })
            .collect();
        for handle in handles {
            let (n, sql) = handle.join().unwrap();
            let expected: Vec<_> = (1..=n).map(|p| format!("${p}")).collect();
            assert_eq!(sql, format!("WHERE id IN ({})", expected.join(", ")));
        }
    });
}

//! CREATE, INSERT, and SELECT scenarios (§8).

use qdb::Database;

fn run(db: &mut Database, request: &str) -> Result<String, qdb::error::QdbError> {
    let mut out = Vec::new();
    db.run(request, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn create_insert_and_duplicate_primary_key() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk, "b" int, "c" varchar(32));"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (123, 456, 'abc');"#).unwrap();
    let err = run(&mut db, r#"INSERT INTO "u" VALUES (123, 1, 'x');"#).unwrap_err();
    assert!(err.to_string().contains("123"));
}

#[test]
fn select_projection_with_or_predicate() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk, "b" int, "c" varchar(32));"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (123, 456, 'abc');"#).unwrap();

    let output = run(
        &mut db,
        r#"SELECT "b", "c", "a" FROM "u" WHERE (( "c" = 'abc' ) OR ( "b" = 456 ));"#,
    )
    .unwrap();
    assert!(output.contains("456"));
    assert!(output.contains("abc"));
    assert!(output.contains("123"));
}

#[test]
fn pk_must_be_non_empty() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" varchar(8) pk, "b" int);"#).unwrap();
    let err = run(&mut db, r#"INSERT INTO "u" VALUES ('', 1);"#).unwrap_err();
    assert!(err.to_string().contains("empty"));
}

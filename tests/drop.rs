//! DROP TABLE scenarios (§8), including the empty-catalog edge case.

use qdb::Database;

fn run(db: &mut Database, request: &str) -> Result<String, qdb::error::QdbError> {
    let mut out = Vec::new();
    db.run(request, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn drop_on_empty_catalog_fails() {
    let mut db = Database::new();
    assert!(run(&mut db, r#"DROP TABLE "u";"#).is_err());
}

#[test]
fn drop_table_twice_fails_the_second_time() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk);"#).unwrap();
    run(&mut db, r#"DROP TABLE "u";"#).unwrap();
    assert!(run(&mut db, r#"DROP TABLE "u";"#).is_err());
}

#[test]
fn drop_keeps_relative_order_of_remaining_tables() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "a" ("x" int pk);"#).unwrap();
    run(&mut db, r#"CREATE TABLE "b" ("x" int pk);"#).unwrap();
    run(&mut db, r#"CREATE TABLE "c" ("x" int pk);"#).unwrap();

    run(&mut db, r#"DROP TABLE "b";"#).unwrap();

    let names: Vec<&str> = db.catalog().tables().map(|t| t.schema().table_name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

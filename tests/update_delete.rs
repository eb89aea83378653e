//! UPDATE and DELETE scenarios (§8), including the primary-key self-compare
//! wart and the no-rollback-on-conflict behavior (§4.4, §9).

use qdb::Database;

fn run(db: &mut Database, request: &str) -> Result<String, qdb::error::QdbError> {
    let mut out = Vec::new();
    db.run(request, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn delete_then_select_sees_no_rows() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk, "b" int, "c" varchar(32));"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (123, 456, 'abc');"#).unwrap();

    run(&mut db, r#"DELETE FROM "u" WHERE ("b" = 456);"#).unwrap();

    let table = db.catalog().find("u").unwrap();
    assert_eq!(table.nb_rows(), 0);
}

#[test]
fn update_then_conflicting_update_fails() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk, "b" int, "c" varchar(32));"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (123, 456, 'abc');"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (789, 123, 'defgh');"#).unwrap();

    run(&mut db, r#"UPDATE "u" SET "a" = 999 WHERE ("a" = 123);"#).unwrap();
    let err = run(&mut db, r#"UPDATE "u" SET "a" = 999 WHERE ("a" = 789);"#).unwrap_err();
    assert!(err.to_string().contains("999"));
}

#[test]
fn delete_with_no_where_clears_the_table() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk, "b" int);"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (1, 2);"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (3, 4);"#).unwrap();

    run(&mut db, r#"DELETE FROM "u";"#).unwrap();
    assert_eq!(db.catalog().find("u").unwrap().nb_rows(), 0);
}

#[test]
fn delete_on_empty_table_fails() {
    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk);"#).unwrap();
    assert!(run(&mut db, r#"DELETE FROM "u";"#).is_err());
}

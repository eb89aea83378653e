//! `.save`/`.open` round-trip scenarios (§8, §4.7), including the
//! does-not-clear-first wart (§9).

use qdb::Database;

fn run(db: &mut Database, request: &str) -> Result<String, qdb::error::QdbError> {
    let mut out = Vec::new();
    db.run(request, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn save_clear_open_round_trip() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("qdb-snapshot-round-trip-{}.bin", std::process::id()));

    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "u" ("a" int pk, "b" int, "c" varchar(32));"#).unwrap();
    run(&mut db, r#"INSERT INTO "u" VALUES (123, 456, 'abc');"#).unwrap();

    db.save(&path).unwrap();
    db.clear();
    assert!(db.catalog().is_empty());

    db.open(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let output = run(&mut db, r#"SELECT * FROM "u";"#).unwrap();
    assert!(output.contains("123"));
    assert!(output.contains("456"));
    assert!(output.contains("abc"));
}

#[test]
fn open_does_not_clear_an_already_resident_table() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("qdb-snapshot-no-clear-{}.bin", std::process::id()));

    let mut saved = Database::new();
    run(&mut saved, r#"CREATE TABLE "u" ("a" int pk);"#).unwrap();
    run(&mut saved, r#"INSERT INTO "u" VALUES (1);"#).unwrap();
    saved.save(&path).unwrap();

    let mut db = Database::new();
    run(&mut db, r#"CREATE TABLE "v" ("a" int pk);"#).unwrap();
    run(&mut db, r#"INSERT INTO "v" VALUES (99);"#).unwrap();

    db.open(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(db.catalog().find("u").is_some());
    assert!(db.catalog().find("v").is_some());
}

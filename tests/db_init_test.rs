mod helpers;

use helpers::*;

use neurovault::db;
use neurovault::vault::store;

#[test]
fn on_disk_database_persists_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("neurovault.db");

    let doc_id = {
        let mut conn = db::open_database(&db_path).unwrap();
        let doc = insert_document(&mut conn, "alice", "a.txt", "persistent text", spike_embedding(1));
        doc.id
    };
    assert!(db_path.exists());

    // Reopen: schema init is idempotent and the document survives
    let conn = db::open_database(&db_path).unwrap();
    let doc = store::get_document(&conn, &doc_id).unwrap();
    assert_eq!(doc.filename, "a.txt");
    assert_eq!(count_rows(&conn, "chunks_vec"), 1);
}

#[test]
fn on_disk_database_uses_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let conn = db::open_database(dir.path().join("wal.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    let fk: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn schema_version_is_recorded() {
    let conn = test_db();
    assert_eq!(
        db::migrations::get_schema_version(&conn).unwrap(),
        db::migrations::CURRENT_SCHEMA_VERSION
    );
}

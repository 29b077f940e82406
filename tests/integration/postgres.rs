//! The same engine scenarios against a real server. Skipped unless
//! DATABASE_URL is set.

use crate::helpers::changesets::{fixture, numbered_changesets, write_changelog};
use crate::helpers::harness::{TestDatabase, with_test_db};
use pgchangeset::config::ChangelogTable;
use pgchangeset::db::PgDatabase;
use pgchangeset::migrate::{ChangesetState, MigrateError, Migrator};
use tempfile::TempDir;

fn migrator(db: &TestDatabase) -> Migrator<PgDatabase> {
    let pg = PgDatabase::new(db.pool().clone(), &ChangelogTable::default()).unwrap();
    Migrator::new(pg)
}

async fn changelog_count(db: &TestDatabase) -> i64 {
    db.fetch_count("SELECT count(*) FROM databasechangelog").await
}

#[tokio::test]
async fn test_success_scenario() {
    with_test_db(async |db| {
        let migrator = migrator(db);
        let file = fixture("success.sql");

        migrator.migrate(&file, 0).await.unwrap();
        assert_eq!(changelog_count(db).await, 3);
        assert!(db.table_exists("app_user").await);
        assert_eq!(db.fetch_count("SELECT count(*) FROM user_status").await, 2);

        migrator.reset(&file, 0).await.unwrap();
        assert_eq!(changelog_count(db).await, 0);
        assert!(!db.table_exists("user_status").await);

        migrator.migrate(&file, 2).await.unwrap();
        assert_eq!(changelog_count(db).await, 2);

        migrator.reset(&file, 1).await.unwrap();
        assert_eq!(changelog_count(db).await, 1);
        assert!(db.table_exists("user_status").await);
        assert_eq!(db.fetch_count("SELECT count(*) FROM user_status").await, 0);
    })
    .await;
}

#[tokio::test]
async fn test_duplicate_conflict() {
    with_test_db(async |db| {
        let migrator = migrator(db);

        let err = migrator
            .migrate(&fixture("fail-duplicate.sql"), 0)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("checksum does not match"));
        assert_eq!(changelog_count(db).await, 2);
        assert!(db.table_exists("tag").await);
        assert!(!db.table_exists("note_archive").await);
    })
    .await;
}

#[tokio::test]
async fn test_changelog_rows() {
    with_test_db(async |db| {
        let migrator = migrator(db);
        migrator.migrate(&fixture("parent.sql"), 0).await.unwrap();

        let rows: Vec<(String, String, String, i32, String, String)> = sqlx::query_as(
            "SELECT author, id, filename, orderexecuted, description, version \
             FROM databasechangelog ORDER BY orderexecuted",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let summary: Vec<(String, String, i32)> = rows
            .iter()
            .map(|r| (format!("{}:{}", r.0, r.1), r.2.clone(), r.3))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("parent:1".to_string(), "parent.sql".to_string(), 1),
                ("child:1".to_string(), "child.sql".to_string(), 2),
                ("child:2".to_string(), "child.sql".to_string(), 3),
                ("parent:2".to_string(), "parent.sql".to_string(), 4),
            ]
        );
        assert!(rows.iter().all(|r| r.4 == "sql" && r.5 == "1.0"));

        let md5: String = sqlx::query_scalar(
            "SELECT md5sum FROM databasechangelog WHERE author = 'parent' AND id = '1'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(md5, format!("{:x}", md5::compute("CREATE TABLE parent_before (id INT);")));
    })
    .await;
}

#[tokio::test]
async fn test_failing_statement_leaves_no_trace() {
    with_test_db(async |db| {
        let migrator = migrator(db);
        let temp_dir = TempDir::new().unwrap();
        let file = write_changelog(
            temp_dir.path(),
            "broken.sql",
            "--changeset app:1\nCREATE TABLE kept (id INT);\n\n\
             --changeset app:2\nCREATE TABLE half (id INT);\nINSERT INTO missing_table VALUES (1);\n",
        );

        let err = migrator.migrate(&file, 0).await.unwrap_err();
        assert!(matches!(err, MigrateError::Statement { .. }), "got {err:?}");
        assert!(err.to_string().contains("missing_table"));

        assert_eq!(changelog_count(db).await, 1);
        assert!(db.table_exists("kept").await);
        assert!(!db.table_exists("half").await);
    })
    .await;
}

#[tokio::test]
async fn test_max_and_drift() {
    with_test_db(async |db| {
        let migrator = migrator(db);
        let temp_dir = TempDir::new().unwrap();
        let file = write_changelog(temp_dir.path(), "app.sql", &numbered_changesets(4));

        migrator.migrate(&file, 2).await.unwrap();
        assert!(db.table_exists("t2").await);
        assert!(!db.table_exists("t3").await);

        let edited = numbered_changesets(4).replacen("(id INT)", "(id BIGINT)", 1);
        write_changelog(temp_dir.path(), "app.sql", &edited);

        let err = migrator.migrate(&file, 0).await.unwrap_err();
        assert!(matches!(err, MigrateError::ChecksumMismatch { .. }));
        assert_eq!(changelog_count(db).await, 2);
        assert!(!db.table_exists("t3").await);
    })
    .await;
}

#[tokio::test]
async fn test_status_and_custom_changelog_table() {
    with_test_db(async |db| {
        let table = ChangelogTable {
            schema: "ops".to_string(),
            name: "history".to_string(),
        };
        let migrator = Migrator::new(PgDatabase::new(db.pool().clone(), &table).unwrap());
        let temp_dir = TempDir::new().unwrap();
        let file = write_changelog(temp_dir.path(), "app.sql", &numbered_changesets(2));

        migrator.migrate(&file, 1).await.unwrap();
        assert_eq!(db.fetch_count("SELECT count(*) FROM ops.history").await, 1);

        let states: Vec<ChangesetState> = migrator
            .status(&file)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.state)
            .collect();
        assert_eq!(states, vec![ChangesetState::Applied, ChangesetState::Pending]);
    })
    .await;
}

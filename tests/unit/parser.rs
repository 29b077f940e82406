use crate::helpers::changesets::{fixture, write_changelog};
use pgchangeset::changeset::{ParseError, parse_file, parse_file_to_map};
use rstest::rstest;
use tempfile::TempDir;

fn labels(path: &std::path::Path) -> Vec<String> {
    parse_file(path)
        .unwrap()
        .iter()
        .map(|cs| cs.label())
        .collect()
}

#[test]
fn test_success_fixture_has_three_changesets() {
    let changesets = parse_file(&fixture("success.sql")).unwrap();

    assert_eq!(changesets.len(), 3);
    assert_eq!(changesets[1].label(), "jdoe:2");
    assert_eq!(changesets[1].filename, "success.sql");
    assert_eq!(changesets[1].change_statements().len(), 2);
    assert_eq!(
        changesets[2].rollback_statements(),
        vec!["DROP TABLE app_user"]
    );
}

#[test]
fn test_include_is_spliced_in_place() {
    assert_eq!(
        labels(&fixture("parent.sql")),
        vec!["parent:1", "child:1", "child:2", "parent:2"]
    );
}

#[test]
fn test_included_changesets_carry_their_own_filename() {
    let changesets = parse_file(&fixture("parent.sql")).unwrap();
    let filenames: Vec<&str> = changesets.iter().map(|cs| cs.filename.as_str()).collect();

    assert_eq!(
        filenames,
        vec!["parent.sql", "child.sql", "child.sql", "parent.sql"]
    );
}

#[test]
fn test_include_resolves_relative_to_including_file() {
    let temp_dir = TempDir::new().unwrap();
    write_changelog(
        temp_dir.path(),
        "db/changelog.sql",
        "--include tables/users.sql\n--changeset app:2\nCREATE INDEX idx ON users (id);\n",
    );
    write_changelog(
        temp_dir.path(),
        "db/tables/users.sql",
        "--include ../../shared/types.sql\n--changeset app:1\nCREATE TABLE users (id INT);\n",
    );
    write_changelog(
        temp_dir.path(),
        "shared/types.sql",
        "--changeset shared:1\nCREATE TYPE mood AS ENUM ('ok');\n",
    );

    assert_eq!(
        labels(&temp_dir.path().join("db/changelog.sql")),
        vec!["shared:1", "app:1", "app:2"]
    );
}

#[test]
fn test_include_cycle_is_rejected() {
    let err = parse_file(&fixture("cycle-a.sql")).unwrap_err();
    assert!(matches!(err, ParseError::IncludeCycle(_)), "got {err:?}");
}

#[test]
fn test_missing_include_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_changelog(temp_dir.path(), "main.sql", "--include missing.sql\n");

    let err = parse_file(&path).unwrap_err();
    assert!(matches!(err, ParseError::Io(_)), "got {err:?}");
}

#[test]
fn test_duplicate_key_rejected_when_indexing() {
    let err = parse_file_to_map(&fixture("fail-duplicate.sql")).unwrap_err();

    assert!(matches!(err, ParseError::DuplicateEntry(_)));
    assert!(
        err.to_string()
            .contains("Duplicate entry found: jdoe:1:fail-duplicate.sql")
    );
}

#[test]
fn test_map_is_keyed_by_author_id_filename() {
    let map = parse_file_to_map(&fixture("parent.sql")).unwrap();

    assert_eq!(map.len(), 4);
    assert!(map.contains_key("parent:1:parent.sql"));
    assert!(map.contains_key("child:2:child.sql"));
}

#[test]
fn test_same_author_id_in_different_files_is_not_a_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    write_changelog(temp_dir.path(), "a.sql", "--changeset jdoe:1\nSELECT 1;\n");
    write_changelog(temp_dir.path(), "b.sql", "--changeset jdoe:1\nSELECT 2;\n");
    let root = write_changelog(
        temp_dir.path(),
        "root.sql",
        "--include a.sql\n--include b.sql\n",
    );

    let map = parse_file_to_map(&root).unwrap();
    assert_eq!(map.len(), 2);
}

#[rstest]
#[case::no_colon("--changeset jdoe\nSELECT 1;\n")]
#[case::two_colons("--changeset jdoe:1:2\nSELECT 1;\n")]
#[case::empty_author("--changeset :1\nSELECT 1;\n")]
#[case::empty_id("--changeset jdoe:\nSELECT 1;\n")]
fn test_invalid_headers(#[case] content: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_changelog(temp_dir.path(), "bad.sql", content);

    let err = parse_file(&path).unwrap_err();
    assert!(err.is_invalid_header(), "got {err:?}");
    assert!(err.to_string().starts_with("invalid changeset header"));
}

#[rstest]
#[case::sql_before_header("CREATE TABLE a (id INT);\n--changeset jdoe:1\n", 1)]
#[case::rollback_before_header("\n--rollback DROP TABLE a;\n", 2)]
#[case::after_comment("-- header comment\nSELECT 1;\n", 2)]
fn test_content_before_header(#[case] content: &str, #[case] line: usize) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_changelog(temp_dir.path(), "bad.sql", content);

    match parse_file(&path).unwrap_err() {
        ParseError::InvalidFormat { line: actual, .. } => assert_eq!(actual, line),
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[test]
fn test_sql_after_include_joins_last_included_changeset() {
    let temp_dir = TempDir::new().unwrap();
    write_changelog(
        temp_dir.path(),
        "child.sql",
        "--changeset c:1
CREATE TABLE c1 (id INT);
",
    );
    let root = write_changelog(
        temp_dir.path(),
        "root.sql",
        "--changeset p:1
CREATE TABLE p1 (id INT);
--include child.sql
         CREATE TABLE tail (id INT);
--rollback DROP TABLE tail;
",
    );

    let changesets = parse_file(&root).unwrap();
    assert_eq!(changesets.len(), 2);
    assert_eq!(changesets[0].changes(), "CREATE TABLE p1 (id INT);");
    assert_eq!(
        changesets[1].changes(),
        "CREATE TABLE c1 (id INT);
CREATE TABLE tail (id INT);"
    );
    assert_eq!(changesets[1].rollbacks(), "DROP TABLE tail;");
}

#[test]
fn test_root_may_start_with_include() {
    let temp_dir = TempDir::new().unwrap();
    write_changelog(
        temp_dir.path(),
        "child.sql",
        "--changeset c:1
CREATE TABLE c1 (id INT);
",
    );
    let root = write_changelog(
        temp_dir.path(),
        "root.sql",
        "--include child.sql
CREATE TABLE after_inc (id INT);
",
    );

    let changesets = parse_file(&root).unwrap();
    assert_eq!(changesets.len(), 1);
    assert_eq!(
        changesets[0].changes(),
        "CREATE TABLE c1 (id INT);
CREATE TABLE after_inc (id INT);"
    );
}

#[test]
fn test_included_file_content_joins_including_changeset() {
    let temp_dir = TempDir::new().unwrap();
    write_changelog(temp_dir.path(), "child.sql", "SELECT 1;
");
    let root = write_changelog(
        temp_dir.path(),
        "root.sql",
        "--changeset jdoe:1
SELECT 0;
--include child.sql
",
    );

    let changesets = parse_file(&root).unwrap();
    assert_eq!(changesets.len(), 1);
    assert_eq!(changesets[0].changes(), "SELECT 0;
SELECT 1;");
}

#[test]
fn test_included_file_with_content_before_any_changeset() {
    let temp_dir = TempDir::new().unwrap();
    write_changelog(temp_dir.path(), "child.sql", "SELECT 1;
");
    let root = write_changelog(temp_dir.path(), "root.sql", "--include child.sql
");

    match parse_file(&root).unwrap_err() {
        ParseError::InvalidFormat { file, line } => {
            assert_eq!(file.file_name().unwrap(), "child.sql");
            assert_eq!(line, 1);
        }
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[rstest]
#[case::spacing("--changeset jdoe:1\nCREATE TABLE a (id INT);\n", "--changeset jdoe:1\n   CREATE TABLE a (id INT);   \n\n")]
#[case::comments("--changeset jdoe:1\nCREATE TABLE a (id INT);\n", "--changeset jdoe:1\n-- note\nCREATE TABLE a (id INT);\n")]
#[case::rollbacks("--changeset jdoe:1\nCREATE TABLE a (id INT);\n", "--changeset jdoe:1\nCREATE TABLE a (id INT);\n--rollback DROP TABLE a;\n")]
fn test_checksum_ignores_formatting_noise(#[case] left: &str, #[case] right: &str) {
    let temp_dir = TempDir::new().unwrap();
    let left = write_changelog(temp_dir.path(), "same.sql", left);
    let left = parse_file(&left).unwrap()[0].checksum();
    let right = write_changelog(temp_dir.path(), "same.sql", right);
    let right = parse_file(&right).unwrap()[0].checksum();

    assert_eq!(left, right);
}

#[test]
fn test_checksum_changes_with_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_changelog(
        temp_dir.path(),
        "c.sql",
        "--changeset jdoe:1\nCREATE TABLE a (id INT);\n",
    );
    let before = parse_file(&path).unwrap()[0].checksum();

    write_changelog(
        temp_dir.path(),
        "c.sql",
        "--changeset jdoe:1\nCREATE TABLE a (id BIGINT);\n",
    );
    let after = parse_file(&path).unwrap()[0].checksum();

    assert_ne!(before, after);
}

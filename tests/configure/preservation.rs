use super::custom_config;
use crate::fixtures::*;
use pentaho_postgres::backup::backup_path;
use pentaho_postgres::configure::configure_all;
use pentaho_postgres::connection::ConnectionConfig;

/// Lines of `after` that are not in `before`, in order
fn added_lines<'a>(before: &str, after: &'a str) -> Vec<&'a str> {
    let before: Vec<&str> = before.lines().collect();
    after.lines().filter(|line| !before.contains(line)).collect()
}

#[test]
fn test_quartz_unmatched_lines_are_identical_and_ordered() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &ConnectionConfig::default());

    let output = tree.read(QUARTZ_PROPERTIES);
    let recognised = [
        "org.quartz.dataSource.myDS.driver",
        "org.quartz.dataSource.myDS.URL",
        "org.quartz.dataSource.myDS.user",
        "org.quartz.dataSource.myDS.password",
        "org.quartz.jobStore.driverDelegateClass",
    ];
    let untouched = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|line| {
                let trimmed = line.trim_start_matches('#').trim();
                !recognised.iter().any(|key| trimmed.starts_with(key))
            })
            .map(str::to_string)
            .collect()
    };

    assert_eq!(untouched(STOCK_QUARTZ), untouched(&output));
}

#[test]
fn test_repository_only_targeted_lines_change() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &custom_config());

    let output = tree.read(REPOSITORY_XML);
    assert_eq!(STOCK_REPOSITORY.lines().count(), output.lines().count());

    for line in added_lines(STOCK_REPOSITORY, &output) {
        let trimmed = line.trim();
        assert!(
            trimmed.starts_with("<param name=\"driver\"")
                || trimmed.starts_with("<param name=\"url\"")
                || trimmed.starts_with("<param name=\"user\"")
                || trimmed.starts_with("<param name=\"password\"")
                || trimmed.starts_with("<param name=\"databaseType\"")
                || trimmed.starts_with("<PersistenceManager class="),
            "unexpected change: {}",
            line
        );
    }
    // Repository-level file system and search index are outside the rewrite.
    assert!(output.contains(r#"<FileSystem class="org.apache.jackrabbit.core.fs.local.LocalFileSystem">"#));
    assert!(output.contains(r#"<param name="path" value="${wsp.home}/index"/>"#));
}

#[test]
fn test_settings_only_pointer_changes() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &ConnectionConfig::default());

    assert_eq!(
        tree.read(HIBERNATE_SETTINGS),
        STOCK_SETTINGS.replace("hsqldb.hibernate.cfg.xml", "postgresql.hibernate.cfg.xml")
    );
}

#[test]
fn test_identical_inputs_give_identical_outputs() {
    let first = ServerTree::stock();
    let second = ServerTree::stock();

    configure_all(first.root(), &custom_config());
    configure_all(second.root(), &custom_config());

    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_rerun_keeps_first_backups_and_output() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &custom_config());
    let after_first = tree.snapshot();

    let summary = configure_all(tree.root(), &custom_config());

    assert!(summary.success());
    assert_eq!(tree.snapshot(), after_first);
    assert_eq!(tree.read_backup(REPOSITORY_XML), STOCK_REPOSITORY);
    assert_eq!(tree.read_backup(QUARTZ_PROPERTIES), STOCK_QUARTZ);
    assert_eq!(tree.read_backup(HIBERNATE_SETTINGS), STOCK_SETTINGS);
    assert_eq!(tree.read_backup(POSTGRES_HIBERNATE_CFG), STOCK_FRAGMENT);
}

#[test]
fn test_quartz_latin1_file_is_rewritten_byte_for_byte() {
    let tree = ServerTree::stock();
    let path = tree.path(QUARTZ_PROPERTIES);
    let mut original = b"# Planificateur: r\xe9glages\n".to_vec();
    original.extend_from_slice(STOCK_QUARTZ.as_bytes());
    std::fs::write(&path, &original).unwrap();

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(summary.success());
    let output = std::fs::read(&path).unwrap();
    assert!(output.starts_with(b"# Planificateur: r\xe9glages\n"));
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("org.quartz.jobStore.driverDelegateClass = org.quartz.impl.jdbcjobstore.PostgreSQLDelegate"));
    assert_eq!(std::fs::read(backup_path(&path)).unwrap(), original);
}

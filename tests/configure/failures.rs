use crate::fixtures::*;
use pentaho_postgres::configure::configure_all;
use pentaho_postgres::connection::ConnectionConfig;
use pentaho_postgres::rewrite::{Target, TargetOutcome};

#[test]
fn test_missing_repository_does_not_stop_other_targets() {
    let tree = ServerTree::stock();
    tree.remove(REPOSITORY_XML);

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(!summary.success());
    let repository = summary.get(Target::Repository).unwrap();
    assert!(matches!(
        repository.outcome.as_ref().unwrap(),
        TargetOutcome::NotFound(path) if *path == tree.path(REPOSITORY_XML)
    ));
    assert!(summary.get(Target::Scheduler).unwrap().is_success());
    assert!(summary.get(Target::Settings).unwrap().is_success());
    assert!(tree.read(QUARTZ_PROPERTIES).contains("PostgreSQLDelegate"));
}

#[test]
fn test_missing_quartz_reports_fallback_path() {
    let tree = ServerTree::stock();
    tree.remove(QUARTZ_PROPERTIES);

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(!summary.success());
    match summary.get(Target::Scheduler).unwrap().outcome.as_ref().unwrap() {
        TargetOutcome::NotFound(path) => assert_eq!(*path, tree.path(QUARTZ_PROPERTIES_PLUGIN)),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_malformed_repository_is_reported_not_fatal() {
    let tree = ServerTree::stock();
    let broken = "<Repository><Workspace name=\"x\"></Repository>";
    tree.write(REPOSITORY_XML, broken);

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(!summary.success());
    let error = summary
        .get(Target::Repository)
        .unwrap()
        .outcome
        .as_ref()
        .unwrap_err();
    assert!(format!("{:#}", error).contains("repository.xml"));
    // The malformed file itself is left as it was.
    assert_eq!(tree.read(REPOSITORY_XML), broken);
    assert!(summary.get(Target::Scheduler).unwrap().is_success());
    assert!(summary.get(Target::Settings).unwrap().is_success());
}

#[test]
fn test_malformed_fragment_fails_settings_target() {
    let tree = ServerTree::stock();
    tree.write(POSTGRES_HIBERNATE_CFG, "<hibernate-configuration>");

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(!summary.success());
    let error = summary
        .get(Target::Settings)
        .unwrap()
        .outcome
        .as_ref()
        .unwrap_err();
    // No rollback: the settings pointer was already rewritten, and the error says so.
    assert!(tree.read(HIBERNATE_SETTINGS).contains("postgresql.hibernate.cfg.xml"));
    let message = format!("{:#}", error);
    assert!(message.contains("was already rewritten"));
    assert!(message.contains("hibernate-settings.xml.bak"));
}

#[test]
fn test_empty_tree_fails_every_target() {
    let tree = ServerTree::empty();

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert_eq!(summary.results.len(), 3);
    assert!(summary.results.iter().all(|r| !r.is_success()));
    assert!(tree.snapshot().is_empty());
}

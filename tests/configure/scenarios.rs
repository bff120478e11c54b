use super::custom_config;
use crate::fixtures::*;
use pentaho_postgres::configure::configure_all;
use pentaho_postgres::connection::ConnectionConfig;
use pentaho_postgres::rewrite::{Target, TargetOutcome};

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_stock_tree_is_fully_configured() {
    let tree = ServerTree::stock();
    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(summary.success());
    assert_eq!(summary.results.len(), 3);

    let mut backups = tree.backups();
    backups.sort();
    assert_eq!(backups.len(), 4);
    for relative in [
        REPOSITORY_XML,
        QUARTZ_PROPERTIES,
        HIBERNATE_SETTINGS,
        POSTGRES_HIBERNATE_CFG,
    ] {
        assert!(tree.path(&format!("{}.bak", relative)).exists(), "{} backed up", relative);
    }
}

#[test]
fn test_repository_workspace_filesystem() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &custom_config());

    let xml = tree.read(REPOSITORY_XML);
    assert_eq!(
        section_params(&xml, "Workspace", "FileSystem"),
        pairs(&[
            ("driver", "org.postgresql.Driver"),
            ("url", "jdbc:postgresql://db1:5433/jackrabbit"),
            ("user", "jcr_user"),
            ("password", "secret"),
            ("schema", "hsqldb"),
            ("schemaObjectPrefix", "fs_ws_"),
        ])
    );
}

#[test]
fn test_repository_persistence_managers() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &custom_config());

    let xml = tree.read(REPOSITORY_XML);
    for (section, prefix) in [("Workspace", "${wsp.name}_pm_ws_"), ("Versioning", "pm_ver_")] {
        assert_eq!(
            section_params(&xml, section, "PersistenceManager"),
            pairs(&[
                ("url", "jdbc:postgresql://db1:5433/jackrabbit"),
                ("user", "jcr_user"),
                ("password", "secret"),
                ("driver", "org.postgresql.Driver"),
                ("databaseType", "postgresql"),
                ("schemaObjectPrefix", prefix),
            ])
        );
    }
    assert_eq!(
        xml.matches(r#"<PersistenceManager class="org.apache.jackrabbit.core.persistence.pool.PostgreSQLPersistenceManager">"#)
            .count(),
        2
    );
}

#[test]
fn test_quartz_driver_and_user_lines() {
    let tree = ServerTree::stock();
    tree.write(
        QUARTZ_PROPERTIES,
        "org.quartz.dataSource.myDS.driver = org.hsqldb.jdbcDriver\norg.quartz.dataSource.myDS.user = sa\n",
    );

    configure_all(tree.root(), &ConnectionConfig::default());

    assert_eq!(
        tree.read(QUARTZ_PROPERTIES),
        "#org.quartz.dataSource.myDS.driver = org.hsqldb.jdbcDriver\n\
         org.quartz.dataSource.myDS.driver = org.postgresql.Driver\n\
         org.quartz.dataSource.myDS.user = pentaho_user\n"
    );
}

#[test]
fn test_quartz_plugin_location_fallback() {
    let tree = ServerTree::stock();
    tree.remove(QUARTZ_PROPERTIES);
    tree.write(QUARTZ_PROPERTIES_PLUGIN, STOCK_QUARTZ);

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(summary.success());
    let output = tree.read(QUARTZ_PROPERTIES_PLUGIN);
    assert!(output.contains("\norg.quartz.dataSource.myDS.URL = jdbc:postgresql://localhost:5432/quartz\n"));
    assert!(output.contains("\norg.quartz.jobStore.driverDelegateClass = org.quartz.impl.jdbcjobstore.PostgreSQLDelegate\n"));
    assert_eq!(tree.read_backup(QUARTZ_PROPERTIES_PLUGIN), STOCK_QUARTZ);
}

#[test]
fn test_settings_pointer_and_fragment() {
    let tree = ServerTree::stock();
    configure_all(tree.root(), &custom_config());

    let settings = tree.read(HIBERNATE_SETTINGS);
    assert!(settings.contains("<config-file>system/hibernate/postgresql.hibernate.cfg.xml</config-file>"));

    let fragment = tree.read(POSTGRES_HIBERNATE_CFG);
    assert!(fragment.contains(r#"<property name="connection.url">jdbc:postgresql://db1:5433/hibernate</property>"#));
    assert!(fragment.contains(r#"<property name="connection.pool_size">10</property>"#));
}

#[test]
fn test_missing_fragment_is_skipped() {
    let tree = ServerTree::stock();
    tree.remove(POSTGRES_HIBERNATE_CFG);

    let summary = configure_all(tree.root(), &ConnectionConfig::default());

    assert!(summary.success());
    let result = summary.get(Target::Settings).unwrap();
    match result.outcome.as_ref().unwrap() {
        TargetOutcome::Configured { files, skipped } => {
            assert_eq!(files.len(), 1);
            assert_eq!(skipped, &vec![tree.path(POSTGRES_HIBERNATE_CFG)]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!tree.path(&format!("{}.bak", POSTGRES_HIBERNATE_CFG)).exists());
}

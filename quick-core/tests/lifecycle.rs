// quick-core/tests/lifecycle.rs
#![cfg(unix)]

mod common;

use std::fs;

use common::{tar_gz, tool_descriptor, Harness, ARCH};
use pretty_assertions::assert_eq;
use quick_common::error::QuickError;
use quick_common::model::Version;
use quick_core::{InstallOptions, InstallOutcome, LifecycleEvent, UpgradeStatus};

fn installed_version(h: &Harness) -> Option<String> {
    h.manager()
        .ledger()
        .get("tool")
        .map(|r| r.version.as_str().to_string())
}

#[test]
fn install_links_binary_and_records_ledger() {
    let h = Harness::new();
    h.publish_tool("1.0");
    let mut manager = h.manager();

    let outcome = manager.install("tool", InstallOptions::default()).unwrap();
    assert_eq!(
        outcome,
        InstallOutcome::Installed {
            version: Version::new("1.0"),
            upgraded: false
        }
    );

    let install_dir = h.config.package_install_dir("tool");
    let link = h.config.bin_dir.join("tool");
    assert_eq!(
        fs::read_link(&link).unwrap(),
        install_dir.join("tool-dist/bin/tool")
    );
    assert_eq!(fs::read_to_string(&link).unwrap(), "#!/bin/sh\necho 1.0\n");
    let desktop = fs::read_to_string(h.config.desktop_entry_path("tool")).unwrap();
    assert!(desktop.contains(&format!(
        "Exec=\"{}\"",
        install_dir.join("tool-dist/bin/tool").display()
    )));
    assert_eq!(installed_version(&h).as_deref(), Some("1.0"));

    let events = h.take_events();
    assert_eq!(
        events.first(),
        Some(&LifecycleEvent::InstallStarted {
            name: "tool".to_string(),
            version: Version::new("1.0"),
            upgrade: false,
        })
    );
    assert_eq!(
        events.last(),
        Some(&LifecycleEvent::InstallFinished {
            name: "tool".to_string(),
            upgrade: false,
        })
    );
}

#[test]
fn forced_reinstall_overwrites_artifacts_cleanly() {
    let h = Harness::new();
    h.publish_tool("1.0");
    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();

    let fetches = h.transport.fetches.get();
    let outcome = manager
        .install(
            "tool",
            InstallOptions {
                force: true,
                skip_verify: false,
            },
        )
        .unwrap();
    assert!(matches!(outcome, InstallOutcome::Installed { .. }));
    assert_eq!(h.transport.fetches.get(), fetches, "cached archive is reused");
    assert_eq!(h.extractions.get(), 2);

    let bin_entries: Vec<_> = fs::read_dir(&h.config.bin_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(bin_entries, vec![h.config.bin_dir.join("tool")]);
    assert!(bin_entries[0].exists(), "link must not dangle");
    let desktop_entries = fs::read_dir(&h.config.desktop_dir).unwrap().count();
    assert_eq!(desktop_entries, 1);
    assert_eq!(manager.ledger().all().len(), 1);
}

#[test]
fn remove_after_install_leaves_nothing() {
    let h = Harness::new();
    h.publish_tool("1.0");
    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();

    let summary = manager.remove("tool").unwrap();
    assert_eq!(summary.file_count, 2);
    assert_eq!(summary.artifacts_removed, 2);

    assert!(!h.config.package_install_dir("tool").exists());
    assert!(fs::symlink_metadata(h.config.bin_dir.join("tool")).is_err());
    assert!(!h.config.desktop_entry_path("tool").exists());
    assert_eq!(installed_version(&h), None);

    assert!(matches!(
        manager.remove("tool"),
        Err(QuickError::NotInstalled(name)) if name == "tool"
    ));
}

#[test]
fn hash_mismatch_keeps_ledger_and_retry_succeeds() {
    let h = Harness::new();
    let url = h.publish_tool("1.0");
    let good = tar_gz(&[("tool-dist/bin/tool", b"#!/bin/sh\n")]);
    let good_sha1 = h.serve_archive(
        "https://dl.test/reference.tar.gz",
        &[("tool-dist/bin/tool", b"#!/bin/sh\n")],
    );
    h.publish("tool", &tool_descriptor("1.0", &format!("{url} {ARCH} {good_sha1} tool-dist")));

    let mut manager = h.manager();
    let err = manager.install("tool", InstallOptions::default()).unwrap_err();
    assert!(matches!(err, QuickError::HashMismatch { .. }), "got {err:?}");
    assert!(manager.ledger().is_empty());
    assert!(!h.config.binaries_dir.join("tool-1.0.tar.gz").exists());
    assert_eq!(h.extractions.get(), 0);

    h.transport.serve(&url, good);
    manager.install("tool", InstallOptions::default()).unwrap();
    assert_eq!(installed_version(&h).as_deref(), Some("1.0"));
}

#[test]
fn newer_catalog_version_is_installed_and_same_version_is_skipped() {
    let h = Harness::new();
    h.publish_tool("1.5");
    h.manager().install("tool", InstallOptions::default()).unwrap();

    h.publish_tool("2.0");
    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();
    assert_eq!(installed_version(&h).as_deref(), Some("2.0"));
    assert_eq!(
        fs::read_to_string(h.config.bin_dir.join("tool")).unwrap(),
        "#!/bin/sh\necho 2.0\n"
    );

    let fetches = h.transport.fetches.get();
    let extractions = h.extractions.get();
    h.take_events();
    let outcome = manager.install("tool", InstallOptions::default()).unwrap();
    assert_eq!(
        outcome,
        InstallOutcome::AlreadyLatest {
            version: Version::new("2.0")
        }
    );
    assert_eq!(h.transport.fetches.get(), fetches);
    assert_eq!(h.extractions.get(), extractions);
    assert_eq!(
        h.take_events(),
        vec![LifecycleEvent::AlreadyLatest {
            name: "tool".to_string(),
            version: Version::new("2.0"),
        }]
    );
}

#[test]
fn upgrade_with_unchanged_catalog_does_nothing() {
    let h = Harness::new();
    h.publish_tool("1.0");
    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();
    let extractions = h.extractions.get();

    let report = manager.upgrade(false).unwrap();
    assert!(matches!(
        report.packages.as_slice(),
        [(name, UpgradeStatus::UpToDate { .. })] if name == "tool"
    ));
    assert_eq!(h.extractions.get(), extractions);
    assert_eq!(installed_version(&h).as_deref(), Some("1.0"));
}

#[test]
fn upgrade_replaces_outdated_packages() {
    let h = Harness::new();
    h.publish_tool("1.0");
    h.publish(
        "gone",
        "Name: Gone\nVersion: 1.0\nDownload:\n  - https://dl.test/gone.tar.gz all -\n",
    );
    h.serve_archive("https://dl.test/gone.tar.gz", &[("gone/readme", b"hi")]);
    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();
    manager.install("gone", InstallOptions::default()).unwrap();

    h.publish_tool("1.1");
    fs::remove_file(h.config.descriptor_path("gone")).unwrap();
    h.take_events();

    let report = manager.upgrade(false).unwrap();
    assert!(!report.has_failures());
    assert_eq!(report.upgraded().collect::<Vec<_>>(), vec!["tool"]);
    assert!(matches!(report.packages[0], (ref n, UpgradeStatus::NotInCatalog) if n == "gone"));
    assert_eq!(installed_version(&h).as_deref(), Some("1.1"));
    assert!(h.take_events().contains(&LifecycleEvent::InstallStarted {
        name: "tool".to_string(),
        version: Version::new("1.1"),
        upgrade: true,
    }));
}

#[test]
fn failed_entry_is_skipped_when_another_succeeds() {
    let h = Harness::new();
    let sha1 = h.serve_archive(
        "https://dl.test/tool-good.tar.gz",
        &[("tool-dist/bin/tool", b"#!/bin/sh\n")],
    );
    let yaml = format!(
        "Name: Tool\nVersion: 3.0\nDownload:\n  - https://dl.test/missing.tar.gz all -\n  \
         - https://dl.test/tool-good.tar.gz {ARCH} {sha1} tool-dist\n  \
         - https://dl.test/other-arch.tar.gz armhf - other\nSymlink:\n  - bin/tool\n"
    );
    h.publish("tool", &yaml);

    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();
    assert!(h.config.bin_dir.join("tool").exists());
    assert!(h.take_events().iter().any(|e| matches!(
        e,
        LifecycleEvent::DownloadFailed { url, .. } if url == "https://dl.test/missing.tar.gz"
    )));
}

#[test]
fn install_fails_when_every_entry_fails() {
    let h = Harness::new();
    h.publish(
        "single",
        "Name: Single\nVersion: 1.0\nDownload:\n  - https://dl.test/nope.tar.gz all -\n",
    );
    h.publish(
        "double",
        "Name: Double\nVersion: 1.0\nDownload:\n  - https://dl.test/a.tar.gz all -\n  \
         - https://dl.test/b.tar.gz all -\n",
    );
    h.publish(
        "foreign",
        "Name: Foreign\nVersion: 1.0\nDownload:\n  - https://dl.test/f.tar.gz armhf -\n",
    );

    let mut manager = h.manager();
    assert!(matches!(
        manager.install("single", InstallOptions::default()),
        Err(QuickError::FetchError { .. })
    ));
    assert!(matches!(
        manager.install("double", InstallOptions::default()),
        Err(QuickError::InstallFailed { name, .. }) if name == "double"
    ));
    match manager.install("foreign", InstallOptions::default()) {
        Err(QuickError::InstallFailed { reason, .. }) => {
            assert_eq!(reason, format!("no download for {ARCH}"))
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(manager.ledger().is_empty());
}

#[test]
fn unknown_and_unsynced_packages_are_rejected() {
    let h = Harness::new();
    let mut manager = h.manager();
    assert!(matches!(
        manager.install("nothing", InstallOptions::default()),
        Err(QuickError::UnknownPackage(_))
    ));

    fs::remove_file(h.config.index_path()).unwrap();
    assert!(matches!(
        manager.install("nothing", InstallOptions::default()),
        Err(QuickError::NotSynced)
    ));
    assert!(matches!(manager.upgrade(false), Err(QuickError::NotSynced)));
}

#[test]
fn remove_all_clears_every_package() {
    let h = Harness::new();
    h.publish_tool("1.0");
    h.publish(
        "extra",
        "Name: Extra\nVersion: 0.1\nDownload:\n  - https://dl.test/extra.tar.gz all -\n",
    );
    h.serve_archive("https://dl.test/extra.tar.gz", &[("extra/file", b"x")]);
    let mut manager = h.manager();
    manager.install("tool", InstallOptions::default()).unwrap();
    manager.install("extra", InstallOptions::default()).unwrap();

    let results = manager.remove_all();
    let names: Vec<_> = results.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["extra", "tool"]);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert!(manager.ledger().is_empty());
    assert_eq!(fs::read_dir(&h.config.install_dir).unwrap().count(), 0);
}

#[test]
fn sync_then_clean_round_trip() {
    let h = Harness::new();
    fs::remove_file(h.config.index_path()).unwrap();
    h.transport.serve(
        &format!("{}.index", common::CATALOG),
        b"tool.yaml\n".to_vec(),
    );
    h.transport.serve(
        &format!("{}tool.yaml", common::CATALOG),
        tool_descriptor("4.2", "https://dl.test/t.tar.gz all -").into_bytes(),
    );
    let mut manager = h.manager();
    let report = manager.sync().unwrap();
    assert!(report.is_complete());
    assert_eq!(
        manager.catalog().load_descriptor("tool").unwrap().version,
        Version::new("4.2")
    );
    assert!(h.take_events().contains(&LifecycleEvent::SyncFetching {
        position: 1,
        total: 1,
        filename: "tool.yaml".to_string(),
    }));

    fs::write(h.config.binaries_dir.join("t.tar.gz"), b"x").unwrap();
    manager.clean().unwrap();
    assert!(!manager.catalog().is_synced());
    assert_eq!(fs::read_dir(&h.config.binaries_dir).unwrap().count(), 0);
}

#[test]
fn corrupt_archive_fails_install_without_recording() {
    let h = Harness::new();
    let url = "https://dl.test/tool-1.0.tar.gz";
    h.transport.serve(url, b"not a gzip stream".to_vec());
    h.publish("tool", &tool_descriptor("1.0", &format!("{url} {ARCH} - tool-dist")));

    let mut manager = h.manager();
    let err = manager.install("tool", InstallOptions::default()).unwrap_err();
    assert!(matches!(err, QuickError::ExtractionFailed { .. }), "got {err:?}");
    assert_eq!(h.extractions.get(), 1);
    assert!(manager.ledger().is_empty());
    assert!(fs::symlink_metadata(h.config.bin_dir.join("tool")).is_err());
    assert!(!h.config.desktop_entry_path("tool").exists());
    assert_eq!(installed_version(&h), None);
}

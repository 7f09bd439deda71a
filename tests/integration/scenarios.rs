// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{FakeUnison, ScriptedConsole, Workstation};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    env::current_dir,
    fs::{create_dir_all, read_dir, read_to_string, write},
    path::Path,
};
use synchome::{
    error::ErrorKind, profile::ProfileWriter, Error, ExitOutcome, Orchestrator, SyncTarget,
    UserIdentity,
};

fn exit_outcome<T>(result: Result<T, Error>) -> ExitOutcome {
    match result {
        Ok(_) => ExitOutcome::success(),
        Err(error) => ExitOutcome::from(&error),
    }
}

fn profile_names(root: &Path) -> Result<Vec<String>> {
    let mut names = read_dir(root)?
        .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

#[sealed_test]
fn eligible_user_syncs_all_targets() -> Result<()> {
    let station = Workstation::new(current_dir()?)?.with_destination("alice")?;
    let tool = FakeUnison::default();
    let orchestrator = station.orchestrator(UserIdentity::new("alice", 600, 20), &tool);

    let result = orchestrator.run();
    assert!(matches!(&result, Ok(reports) if reports.len() == 3));
    assert_eq!(exit_outcome(result), ExitOutcome::success());
    assert_eq!(
        tool.synced_targets(),
        vec!["Dokument", "Skrivbord", "Bibliotek"]
    );

    assert_eq!(
        profile_names(&station.profile_dir("alice"))?,
        vec!["Bibliotek.prf", "Dokument.prf", "Skrivbord.prf"]
    );
    let last = read_to_string(station.profile_dir("alice").join("Bibliotek.prf"))?;
    let expect = indoc! {r#"
        root = /Users/alice
        root = ssh://files.local//Volumes/alice
        path = Bibliotek
    "#};
    assert_eq!(last, expect);

    Ok(())
}

#[sealed_test]
fn sync_tool_called_in_order_with_extra_args() -> Result<()> {
    let station = Workstation::new(current_dir()?)?.with_destination("alice")?;
    let tool = FakeUnison::default();
    let orchestrator = station.orchestrator(UserIdentity::new("alice", 600, 20), &tool);

    orchestrator.run()?;
    assert_eq!(
        tool.calls(),
        vec![
            ("Dokument".to_string(), vec!["-silent".to_string()]),
            ("Skrivbord".to_string(), vec!["-silent".to_string()]),
            ("Bibliotek".to_string(), vec!["-silent".to_string()]),
        ]
    );

    Ok(())
}

#[sealed_test]
fn user_below_threshold_is_refused() -> Result<()> {
    let station = Workstation::new(current_dir()?)?.with_destination("bob")?;
    let tool = FakeUnison::default();
    let orchestrator = station.orchestrator(UserIdentity::new("bob", 200, 20), &tool);

    let outcome = exit_outcome(orchestrator.run());
    assert_eq!(outcome.code, 12);
    assert!(tool.synced_targets().is_empty());
    assert!(!station.profile_dir("bob").exists());

    Ok(())
}

#[sealed_test]
fn unknown_console_user_is_refused() -> Result<()> {
    let station = Workstation::new(current_dir()?)?;
    let tool = FakeUnison::default();

    for console in [
        ScriptedConsole(None),
        ScriptedConsole(Some(UserIdentity::new("", 0, 0))),
        ScriptedConsole(Some(UserIdentity::new("loginwindow", 88, 0))),
    ] {
        let orchestrator = Orchestrator::new(station.settings().clone(), console, &tool);
        let outcome = exit_outcome(orchestrator.run());
        assert_eq!(outcome.code, 11);
    }
    assert!(tool.synced_targets().is_empty());

    Ok(())
}

#[sealed_test]
fn missing_destination_is_refused() -> Result<()> {
    let station = Workstation::new(current_dir()?)?;
    let tool = FakeUnison::default();
    let orchestrator = station.orchestrator(UserIdentity::new("alice", 600, 20), &tool);

    let result = orchestrator.run();
    assert!(matches!(&result, Err(error) if error.kind() == ErrorKind::MissingSyncTarget));
    assert_eq!(exit_outcome(result).code, 13);
    assert!(tool.synced_targets().is_empty());

    Ok(())
}

#[sealed_test]
fn missing_target_template_stops_run() -> Result<()> {
    let station = Workstation::new(current_dir()?)?
        .with_destination("alice")?
        .without_target_template("Skrivbord")?;
    let tool = FakeUnison::default();
    let orchestrator = station.orchestrator(UserIdentity::new("alice", 600, 20), &tool);

    let outcome = exit_outcome(orchestrator.run());
    assert_eq!(outcome.code, 15);
    assert!(outcome.message.contains("Skrivbord"));
    assert_eq!(tool.synced_targets(), vec!["Dokument"]);

    Ok(())
}

#[sealed_test]
fn sync_tool_failure_stops_run() -> Result<()> {
    let station = Workstation::new(current_dir()?)?.with_destination("alice")?;
    let tool = FakeUnison::default().exit_with("Skrivbord", 2);
    let orchestrator = station.orchestrator(UserIdentity::new("alice", 600, 20), &tool);

    let outcome = exit_outcome(orchestrator.run());
    assert_eq!(outcome.code, 2);
    assert!(outcome
        .message
        .contains("Synchronization incomplete for Skrivbord"));
    assert_eq!(tool.synced_targets(), vec!["Dokument", "Skrivbord"]);

    Ok(())
}

#[sealed_test]
fn last_target_failure_passes_code_through() -> Result<()> {
    let station = Workstation::new(current_dir()?)?.with_destination("alice")?;
    let tool = FakeUnison::default().exit_with("Bibliotek", 2);
    let orchestrator = station.orchestrator(UserIdentity::new("alice", 600, 20), &tool);

    let outcome = exit_outcome(orchestrator.run());
    assert_eq!(outcome.code, 2);
    assert!(outcome
        .message
        .contains("Synchronization incomplete for Bibliotek"));
    assert_eq!(
        tool.synced_targets(),
        vec!["Dokument", "Skrivbord", "Bibliotek"]
    );

    Ok(())
}

#[sealed_test]
fn regeneration_never_accumulates_profiles() -> Result<()> {
    let station = Workstation::new(current_dir()?)?.with_destination("alice")?;
    let root = station.profile_dir("alice");
    create_dir_all(&root)?;
    write(root.join("Retired.prf"), "path = Retired\n")?;

    let tool = FakeUnison::default();
    for _ in 0..2 {
        station
            .orchestrator(UserIdentity::new("alice", 600, 20), &tool)
            .run()?;
        assert_eq!(
            profile_names(&root)?,
            vec!["Bibliotek.prf", "Dokument.prf", "Skrivbord.prf"]
        );
    }

    Ok(())
}

#[sealed_test]
fn single_target_regeneration_keeps_siblings() -> Result<()> {
    let station = Workstation::new(current_dir()?)?;
    let writer = ProfileWriter::new(station.settings());
    let root = station.profile_dir("alice");

    for target in ["Dokument", "Dokument", "Skrivbord", "Skrivbord"] {
        writer.generate("alice", &SyncTarget::new(target))?;
    }
    assert_eq!(profile_names(&root)?, vec!["Dokument.prf", "Skrivbord.prf"]);

    Ok(())
}

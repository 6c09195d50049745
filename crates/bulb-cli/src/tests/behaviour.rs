//! Behaviour scenarios for `tests/features/bulb_cli.feature`.

use std::cell::RefCell;
use std::process::ExitCode;

use bulb_config::SocketEndpoint;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{TestWorld, closed_port};

const BRIDGE_INPUT: &str = concat!(
    r#"{"jsonrpc":"2.0","id":"p1","method":"ping"}"#,
    "\n",
    r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"toggle"}}"#,
    "\n",
);

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("a daemon serving a fresh bulb")]
fn given_daemon(world: &RefCell<TestWorld>) {
    world.borrow_mut().start_daemon();
}

#[given("no daemon is listening")]
fn given_no_daemon(world: &RefCell<TestWorld>) {
    world.borrow_mut().config.rpc_socket = SocketEndpoint::tcp("127.0.0.1", closed_port());
}

#[when("the operator runs {command}")]
fn when_operator_runs(world: &RefCell<TestWorld>, command: String) {
    world.borrow_mut().run(&command, "");
}

#[when("the operator bridges a ping and a toggle notification")]
fn when_operator_bridges(world: &RefCell<TestWorld>) {
    world.borrow_mut().run("bridge", BRIDGE_INPUT);
}

#[then("the CLI succeeds")]
fn then_succeeds(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert_eq!(
        world.exit_code(),
        ExitCode::SUCCESS,
        "stderr: {}",
        world.stderr_text()
    );
}

#[then("the CLI fails")]
fn then_fails(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().exit_code(), ExitCode::FAILURE);
}

#[then("stdout contains {snippet}")]
fn then_stdout_contains(world: &RefCell<TestWorld>, snippet: String) {
    let stdout = world.borrow().stdout_text();
    assert!(stdout.contains(&snippet), "{stdout:?} should contain {snippet:?}");
}

#[then("stdout is empty")]
fn then_stdout_empty(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().stdout_text(), "");
}

#[then("stderr contains {snippet}")]
fn then_stderr_contains(world: &RefCell<TestWorld>, snippet: String) {
    let stderr = world.borrow().stderr_text();
    assert!(stderr.contains(&snippet), "{stderr:?} should contain {snippet:?}");
}

#[then("stdout lists {first}, {second}, {third}, {fourth} and {fifth}")]
fn then_stdout_lists(
    world: &RefCell<TestWorld>,
    first: String,
    second: String,
    third: String,
    fourth: String,
    fifth: String,
) {
    let stdout = world.borrow().stdout_text();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, [first, second, third, fourth, fifth]);
}

#[then("stdout has {count} reply line")]
fn then_stdout_reply_lines(world: &RefCell<TestWorld>, count: usize) {
    let stdout = world.borrow().stdout_text();
    let replies: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply line is JSON"))
        .collect();
    assert_eq!(replies.len(), count, "{stdout}");
    assert_eq!(replies[0]["id"], "p1");
}

#[then("the daemon received tool {tool}")]
fn then_daemon_received(world: &RefCell<TestWorld>, tool: String) {
    let world = world.borrow();
    let last = world.requests().last().expect("daemon saw a request");
    assert_eq!(last["method"], "tools/call");
    assert_eq!(last["params"]["name"], tool.as_str());
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 0)]
fn state_prints_report(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 1)]
fn presets_print_color(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 2)]
fn error_replies_on_stderr(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 3)]
fn tools_lists_catalogue(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 4)]
fn unreachable_daemon(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 5)]
fn bridge_relays(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/bulb_cli.feature", index = 6)]
fn missing_arguments(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

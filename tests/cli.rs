use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tiny-client"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn tiny-client")
}

fn assert_failure(output: &Output, stderr_prefix: &str) {
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "unexpected stdout: {:?}", output.stdout);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.starts_with(stderr_prefix),
        "stderr {stderr:?} does not start with {stderr_prefix:?}"
    );
    assert!(stderr.ends_with('\n'));
    assert_eq!(stderr.lines().count(), 1, "expected one diagnostic line: {stderr:?}");
}

#[test]
fn no_arguments_prints_usage() {
    assert_failure(&run(&[]), "usage: ");
}

#[test]
fn extra_arguments_print_usage() {
    let output = run(&["127.0.0.1", "127.0.0.2"]);
    assert_failure(&output, "usage: ");
    assert!(String::from_utf8_lossy(&output.stderr).contains("<server IPv4 address>"));
}

#[test]
fn invalid_addresses_fail_before_connecting() {
    for input in ["999.1.1.1", "abc", "1.2.3", "example.com", "::1"] {
        let output = run(&[input]);
        assert_failure(&output, &format!("invalid IPv4 address: {input}"));
    }
}

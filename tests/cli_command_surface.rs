use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::tempdir;

fn run_with_env(home: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bothost"));
    cmd.args(args)
        .env("HOME", home)
        .env("BOTHOST_HOME", home.join(".bothost"))
        .env_remove("BOTHOST_PROVIDER_ENDPOINT");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("run bothost")
}

fn run(home: &Path, args: &[&str]) -> Output {
    run_with_env(home, args, &[])
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn assert_err_contains(output: &Output, needle: &str) {
    assert!(
        !output.status.success(),
        "expected failure, stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
    let text = format!("{}{}", stdout(output), stderr(output));
    assert!(
        text.contains(needle),
        "expected error to contain `{needle}`, got:\n{text}"
    );
}

fn kv_lines(output: &Output) -> BTreeMap<String, String> {
    stdout(output)
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Serves `body` to every request and records each request target.
fn spawn_bundle_server(body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let targets = Arc::new(Mutex::new(Vec::new()));
    let seen = targets.clone();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("read request line");
            if let Some(target) = request_line.split_whitespace().nth(1) {
                seen.lock().expect("targets lock").push(target.to_string());
            }
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header line");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
        }
    });

    (
        format!("http://{addr}/providers/{{provider}}?nightly={{nightly}}"),
        targets,
    )
}

const SINGLE_PROVIDER_BUNDLE: &str = r#"{"format":1,"classes":[
  {"name":"org.foo.FooProvider","implements":["server_provider"],"entry":"foo-provider"},
  {"name":"org.foo.Util"}
]}"#;

const AMBIGUOUS_BUNDLE: &str = r#"{"format":1,"classes":[
  {"name":"org.foo.A","implements":["server_provider"]},
  {"name":"org.foo.B","implements":["server_provider"]}
]}"#;

#[test]
fn help_lists_commands_and_unknown_command_fails() {
    let temp = tempdir().expect("tempdir");

    let help = run(temp.path(), &["help"]);
    assert_ok(&help);
    assert!(stdout(&help).contains("fetch <provider>"));
    assert!(stderr(&help).contains("bothost"));

    let unknown = run(temp.path(), &["launch"]);
    assert_err_contains(&unknown, "unknown command `launch`");
}

#[test]
fn fetch_then_cache_path_and_inspect() {
    let temp = tempdir().expect("tempdir");
    let (endpoint, targets) = spawn_bundle_server(SINGLE_PROVIDER_BUNDLE);
    let envs = [("BOTHOST_PROVIDER_ENDPOINT", endpoint.as_str())];

    let before = run_with_env(temp.path(), &["cache", "path", "foo"], &envs);
    assert_ok(&before);
    assert_eq!(kv_lines(&before).get("cached").map(String::as_str), Some("false"));

    let fetched = run_with_env(temp.path(), &["fetch", "foo"], &envs);
    assert_ok(&fetched);
    let fetched_kv = kv_lines(&fetched);
    assert_eq!(fetched_kv.get("channel").map(String::as_str), Some("stable"));
    assert_eq!(fetched_kv.get("cached").map(String::as_str), Some("true"));

    let after = run_with_env(temp.path(), &["cache", "path", "foo"], &envs);
    assert_ok(&after);
    let after_kv = kv_lines(&after);
    assert_eq!(after_kv.get("cached").map(String::as_str), Some("true"));
    assert_eq!(after_kv.get("path"), fetched_kv.get("path"));
    assert!(Path::new(after_kv.get("path").expect("path")).is_file());

    let inspect = run_with_env(temp.path(), &["inspect", "foo"], &envs);
    assert_ok(&inspect);
    let inspect_kv = kv_lines(&inspect);
    assert_eq!(
        inspect_kv.get("candidates").map(String::as_str),
        Some("org.foo.FooProvider")
    );
    assert_eq!(
        inspect_kv.get("resolved").map(String::as_str),
        Some("org.foo.FooProvider")
    );

    let refetch = run_with_env(temp.path(), &["fetch", "foo"], &envs);
    assert_ok(&refetch);
    assert_eq!(targets.lock().expect("targets").len(), 1);
    assert_eq!(
        targets.lock().expect("targets")[0],
        "/providers/foo?nightly=false"
    );

    let listed = run_with_env(temp.path(), &["cache", "list"], &envs);
    assert_ok(&listed);
    assert_eq!(kv_lines(&listed).get("artifacts").map(String::as_str), Some("1"));

    let log = std::fs::read_to_string(temp.path().join(".bothost/logs/runtime.log"))
        .expect("runtime log");
    assert!(log.contains("provider.download.complete"));
    assert!(log.contains("provider.cache.hit"));
}

#[test]
fn fetch_with_nightly_flag_requests_nightly_artifact() {
    let temp = tempdir().expect("tempdir");
    let (endpoint, targets) = spawn_bundle_server(SINGLE_PROVIDER_BUNDLE);
    let envs = [("BOTHOST_PROVIDER_ENDPOINT", endpoint.as_str())];

    let fetched = run_with_env(temp.path(), &["fetch", "foo", "--nightly"], &envs);
    assert_ok(&fetched);
    assert_eq!(kv_lines(&fetched).get("channel").map(String::as_str), Some("nightly"));
    assert_eq!(
        targets.lock().expect("targets").as_slice(),
        ["/providers/foo?nightly=true".to_string()]
    );

    let bad_flag = run_with_env(temp.path(), &["fetch", "foo", "--beta"], &envs);
    assert_err_contains(&bad_flag, "unknown flag `--beta`");
}

#[test]
fn inspect_reports_ambiguous_artifact() {
    let temp = tempdir().expect("tempdir");
    let (endpoint, _targets) = spawn_bundle_server(AMBIGUOUS_BUNDLE);
    let envs = [("BOTHOST_PROVIDER_ENDPOINT", endpoint.as_str())];

    assert_ok(&run_with_env(temp.path(), &["fetch", "multi"], &envs));
    let inspect = run_with_env(temp.path(), &["inspect", "multi"], &envs);
    assert_ok(&inspect);
    let kv = kv_lines(&inspect);
    assert_eq!(
        kv.get("candidates").map(String::as_str),
        Some("org.foo.A,org.foo.B")
    );
    assert!(kv.contains_key("resolve_error"));
    assert!(!kv.contains_key("resolved"));
}

#[test]
fn inspect_of_uncached_provider_points_at_fetch() {
    let temp = tempdir().expect("tempdir");
    let inspect = run(temp.path(), &["inspect", "foo"]);
    assert_err_contains(&inspect, "remediation: run `bothost fetch foo`");
}

#[test]
fn fetch_against_unreachable_endpoint_fails_and_caches_nothing() {
    let temp = tempdir().expect("tempdir");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let endpoint = format!("http://{addr}/providers/{{provider}}");
    let envs = [("BOTHOST_PROVIDER_ENDPOINT", endpoint.as_str())];

    let fetched = run_with_env(temp.path(), &["fetch", "foo"], &envs);
    assert_err_contains(&fetched, "Failed to download server provider");

    let path = run_with_env(temp.path(), &["cache", "path", "foo"], &envs);
    assert_ok(&path);
    assert_eq!(kv_lines(&path).get("cached").map(String::as_str), Some("false"));
}

#[test]
fn malformed_settings_file_is_reported() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().join(".bothost");
    std::fs::create_dir_all(&root).expect("state root");
    std::fs::write(root.join("config.yaml"), "release_channel: [nope\n").expect("write config");

    let output = run(temp.path(), &["cache", "path", "foo"]);
    assert!(!output.status.success());
}

#![cfg(all(unix, feature = "cli"))]

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "castpipe-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Accept one connection and answer each request with `respond(request)`.
/// Returns the requests it saw once the client hangs up.
fn fake_peer(
    sock_path: &Path,
    respond: fn(&str) -> Vec<String>,
) -> JoinHandle<Vec<String>> {
    let listener = UnixListener::bind(sock_path).expect("listener should bind");
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("peer should accept");
        let mut seen = Vec::new();
        let mut current = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte) {
                Ok(1) if byte[0] == 0 => {
                    let request = String::from_utf8_lossy(&current).into_owned();
                    current.clear();
                    for reply in respond(&request) {
                        stream.write_all(reply.as_bytes()).expect("peer write");
                        stream.write_all(&[0]).expect("peer write");
                    }
                    seen.push(request);
                }
                Ok(1) => current.push(byte[0]),
                _ => break,
            }
        }
        seen
    })
}

fn castpipe(sock_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_castpipe"))
        .arg("--log-level")
        .arg("off")
        .arg("--format")
        .arg("json")
        .arg("--endpoint")
        .arg(sock_path)
        .args(args)
        .output()
        .expect("castpipe should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn ping_prints_reply_json() {
    let dir = unique_temp_dir("ping");
    let sock_path = dir.join("peer.sock");
    let peer = fake_peer(&sock_path, |_| vec!["PONG".to_string()]);

    let output = castpipe(&sock_path, &["ping"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let payload = stdout_json(&output);
    assert_eq!(payload["schema_id"], "castpipe/cli/v1/ping");
    assert_eq!(payload["result"]["reply"], "PONG");
    assert_eq!(peer.join().expect("peer thread"), vec!["ping"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cooldown_skips_stray_frames_and_fetches_game_time() {
    let dir = unique_temp_dir("cooldown");
    let sock_path = dir.join("peer.sock");
    let peer = fake_peer(&sock_path, |request| match request {
        "GET_CD:53" => vec!["OTHER:x".to_string(), "CD:1000,1500,0".to_string()],
        "GET_TIME_MS" => vec!["TIME_MS:2000".to_string()],
        _ => vec!["ERR:Unknown command".to_string()],
    });

    let output = castpipe(&sock_path, &["cooldown", "53"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let payload = stdout_json(&output);
    assert_eq!(payload["result"]["is_ready"], false);
    assert_eq!(payload["result"]["remaining_secs"], 0.5);
    assert_eq!(peer.join().expect("peer thread"), vec!["GET_CD:53", "GET_TIME_MS"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn peer_error_reply_exits_with_failure() {
    let dir = unique_temp_dir("spellerr");
    let sock_path = dir.join("peer.sock");
    let peer = fake_peer(&sock_path, |_| vec!["SPELLINFO_ERR:Not found".to_string()]);

    let output = castpipe(&sock_path, &["spell-info", "999999"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SPELLINFO_ERR"));
    peer.join().expect("peer thread");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_raw_command_is_usage_error() {
    let dir = unique_temp_dir("unknown");
    let sock_path = dir.join("peer.sock");
    let peer = fake_peer(&sock_path, |_| vec!["PONG".to_string()]);

    let output = castpipe(&sock_path, &["request", "HELLO"]);

    assert_eq!(output.status.code(), Some(64));
    assert!(peer.join().expect("peer thread").is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn silent_peer_times_out_with_124() {
    let dir = unique_temp_dir("silent");
    let sock_path = dir.join("peer.sock");
    let peer = fake_peer(&sock_path, |_| Vec::new());

    let output = castpipe(&sock_path, &["request", "GET_TIME_MS", "--timeout", "200ms"]);

    assert_eq!(output.status.code(), Some(124));
    assert_eq!(peer.join().expect("peer thread"), vec!["GET_TIME_MS"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn declined_cast_exits_with_failure() {
    let dir = unique_temp_dir("cast");
    let sock_path = dir.join("peer.sock");
    let peer = fake_peer(&sock_path, |_| vec!["CAST_RESULT:133,0".to_string()]);

    let output = castpipe(&sock_path, &["cast", "133", "--target", "0xF130"]);

    assert_eq!(output.status.code(), Some(1));
    let payload = stdout_json(&output);
    assert_eq!(payload["result"]["accepted"], false);
    assert_eq!(peer.join().expect("peer thread"), vec!["CAST_SPELL:133,61744"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_endpoint_times_out_with_124() {
    let dir = unique_temp_dir("missing");
    let sock_path = dir.join("absent.sock");

    let output = Command::new(env!("CARGO_BIN_EXE_castpipe"))
        .arg("--log-level")
        .arg("off")
        .arg("ping")
        .arg("--endpoint")
        .arg(&sock_path)
        .arg("--connect-timeout")
        .arg("300ms")
        .output()
        .expect("castpipe should run");

    assert_eq!(output.status.code(), Some(124));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_castpipe"))
        .arg("version")
        .output()
        .expect("castpipe should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("vcn-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

/// `vcn` with an isolated home and a registry URL nothing listens on.
fn vcn(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vcn"));
    cmd.env("VCN_HOME", home)
        .env("VCN_API_URL", "http://127.0.0.1:1")
        .env("VCN_TIMEOUT_SECS", "5")
        .env_remove("VCN_TOKEN")
        .env_remove("VCN_STAGE")
        .env_remove("RUST_LOG");
    cmd
}

fn with_wallet(home: &Path) {
    let keystore = home.join("keystore");
    fs::create_dir_all(&keystore).expect("failed to create keystore");
    fs::write(
        keystore.join("UTC--2019-01-01--wallet.json"),
        r#"{"address":"5b8fd1b1fd5c4e3b8ea4d1f0f4f7e0b1c2d3e4f5","crypto":{}}"#,
    )
    .expect("failed to write keystore entry");
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn help_works() {
    let home = make_temp_dir("help");
    let out = vcn(&home)
        .arg("--help")
        .output()
        .expect("failed to run vcn --help");
    assert!(
        out.status.success(),
        "vcn --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    for verb in ["sign", "untrust", "unsupport", "verify", "list", "login", "dashboard"] {
        assert!(stdout.contains(verb), "help is missing {verb}:\n{stdout}");
    }

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn unknown_command_prints_help() {
    let home = make_temp_dir("unknown");
    let out = vcn(&home)
        .arg("frobnicate")
        .output()
        .expect("failed to run vcn frobnicate");
    assert!(out.status.success(), "status: {}", out.status);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("No such command: frobnicate"),
        "unexpected output:\n{stdout}"
    );
    assert!(stdout.contains("Usage"), "help not shown:\n{stdout}");

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn sign_without_session_asks_to_login() {
    let home = make_temp_dir("no-session");
    with_wallet(&home);
    let file = home.join("app.tar.gz");
    fs::write(&file, b"release bits").expect("failed to write artifact");

    let out = vcn(&home)
        .arg("sign")
        .arg(&file)
        .output()
        .expect("failed to run vcn sign");
    assert_eq!(out.status.code(), Some(1), "stderr:\n{}", stderr(&out));
    assert!(
        stderr(&out).contains("vcn login"),
        "missing login guidance:\n{}",
        stderr(&out)
    );

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn sign_on_fresh_home_asks_to_login() {
    let home = make_temp_dir("fresh");
    let file = home.join("a.bin");
    fs::write(&file, b"release bits").expect("failed to write artifact");

    let out = vcn(&home)
        .arg("sign")
        .arg(&file)
        .output()
        .expect("failed to run vcn sign");
    assert_eq!(out.status.code(), Some(1), "stderr:\n{}", stderr(&out));
    assert!(
        stderr(&out).contains("You need to be logged in."),
        "missing login guidance:\n{}",
        stderr(&out)
    );
    assert!(stderr(&out).contains("vcn login"), "stderr:\n{}", stderr(&out));

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn list_on_fresh_home_asks_to_login() {
    let home = make_temp_dir("fresh-list");
    let out = vcn(&home)
        .arg("list")
        .output()
        .expect("failed to run vcn list");
    assert_eq!(out.status.code(), Some(1), "stderr:\n{}", stderr(&out));
    assert!(stderr(&out).contains("vcn login"), "stderr:\n{}", stderr(&out));

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn fatal_errors_reach_stderr_with_logging_off() {
    let home = make_temp_dir("log-off");
    let out = vcn(&home)
        .arg("v")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run vcn v");
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains("error: assets required"),
        "stderr:\n{}",
        stderr(&out)
    );

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn sign_requires_an_artifact() {
    let home = make_temp_dir("no-arg");
    let out = vcn(&home)
        .arg("s")
        .output()
        .expect("failed to run vcn s");
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("filename or type:reference required"),
        "stderr:\n{}",
        stderr(&out)
    );

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn untrust_rejects_unsupported_reference_types() {
    let home = make_temp_dir("bad-ref");
    let out = vcn(&home)
        .args(["untrust", "docker:nginx", "--yes"])
        .output()
        .expect("failed to run vcn untrust");
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("unsupported artifact type"),
        "stderr:\n{}",
        stderr(&out)
    );

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn verify_reports_unreachable_registry_per_asset() {
    let home = make_temp_dir("verify-offline");
    let out = vcn(&home)
        .args(["verify", "--hash", "deadbeef"])
        .output()
        .expect("failed to run vcn verify");
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).contains("failed to verify deadbeef"),
        "stderr:\n{}",
        stderr(&out)
    );

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn verify_requires_assets() {
    let home = make_temp_dir("verify-empty");
    let out = vcn(&home)
        .arg("v")
        .output()
        .expect("failed to run vcn v");
    assert!(!out.status.success());
    assert!(stderr(&out).contains("assets required"), "stderr:\n{}", stderr(&out));

    let _ = fs::remove_dir_all(&home);
}

#[test]
fn login_stores_token_and_creates_layout() {
    let home = make_temp_dir("login");
    let out = vcn(&home)
        .args(["login", "--token", "session-123"])
        .output()
        .expect("failed to run vcn login");
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));

    assert!(home.join("keystore").is_dir(), "keystore/ not created");
    let token = fs::read_to_string(home.join("t")).expect("token file not written");
    assert_eq!(token, "session-123\n");

    let _ = fs::remove_dir_all(&home);
}

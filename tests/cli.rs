use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn libtester(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("libtester").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_help_mentions_subcommands() {
    let dir = TempDir::new().unwrap();
    let out = libtester(&dir)
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let s = String::from_utf8(out).unwrap();

    for needle in ["parse", "junit", "compare", "batch", "validate", "--config"] {
        assert!(s.contains(needle), "help missing `{needle}`");
    }
}

#[test]
fn test_parse_log() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("test.log"),
        "collected 12 items\n==== 9 passed, 2 failed, 1 skipped in 3.10s ====\n",
    )
    .unwrap();

    libtester(&dir)
        .args(["parse", "test.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "passed: 9, failed: 2, skipped: 1, unknown: 0",
        ));
}

#[test]
fn test_parse_log_without_summary_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("test.log"), "ERROR: could not install\n").unwrap();

    libtester(&dir)
        .args(["parse", "test.log"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Couldn't parse test results"));
}

#[test]
fn test_parse_lenient_keeps_crashed_results() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("test.log"),
        "INTERNALERROR> Traceback (most recent call last):\n==== 3 passed in 0.2s ====\n",
    )
    .unwrap();

    libtester(&dir)
        .args(["parse", "test.log"])
        .assert()
        .code(1);
    libtester(&dir)
        .args(["parse", "--lenient", "test.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passed: 3"));
}

#[test]
fn test_junit_sums_reports() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("a.xml"),
        r#"<testsuite tests="4" failures="1" errors="1" skipped="0"/>"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("b.xml"), "not xml at all").unwrap();

    libtester(&dir)
        .args(["junit", "a.xml", "b.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "passed: 2, failed: 3, skipped: 0, unknown: 0",
        ));
}

#[test]
fn test_compare_writes_results() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ref.log"), "==== 10 passed in 1.0s ====\n").unwrap();
    std::fs::write(dir.path().join("alt.log"), "==== 7 passed in 4.0s ====\n").unwrap();

    libtester(&dir)
        .args([
            "compare",
            "requests",
            "--reference-log",
            "ref.log",
            "--alternative-log",
            "alt.log",
            "--alternative-time",
            "4.5",
            "--output",
            "out/result.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("were not executed"));

    let written: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/result.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(written[0]["name"], "cpython-test");
    assert_eq!(written[0]["reference_impl"], true);
    assert_eq!(written[1]["name"], "graalpy-test");
    assert_eq!(written[1]["passed"], 7);
    assert_eq!(written[1]["failed"], 3);
    assert_eq!(written[1]["test_time"], 4.5);
}

#[test]
fn test_batch_writes_per_package_results() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("results/six");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("cpython-test.log"), "Ran 5 tests in 0.1s\n\nOK\n").unwrap();
    std::fs::write(pkg.join("graalpy-test.log"), "Ran 5 tests in 0.3s\n\nOK\n").unwrap();

    libtester(&dir)
        .args(["batch", "results"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "six: compared reference 5/5 alternative 5/5",
        ));

    assert!(pkg.join("result.json").is_file());
}

#[test]
fn test_validate_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("libtester.toml"),
        "[interpreters]\nalternative = \"pypy\"\n\n[packages.lxml]\njunit_xml = \"junit*.xml\"\n",
    )
    .unwrap();

    libtester(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alternative interpreter: pypy"))
        .stdout(predicate::str::contains("lxml: junit junit*.xml"));
}

#[test]
fn test_validate_invalid_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "[packages.a]\nallow_lower_total = 1\n").unwrap();

    libtester(&dir)
        .args(["--config", "bad.toml", "validate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

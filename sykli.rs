//! Sykli CI pipeline for hostinfo
//!
//! Run locally: sykli run
//! Or: cargo run --bin sykli --features sykli -- --emit | sykli run -

use sykli::{Condition, Pipeline, Template};

fn main() {
    let mut p = Pipeline::new();

    // === RESOURCES ===
    let src = p.dir(".");
    let cargo_registry = p.cache("cargo-registry");
    let cargo_git = p.cache("cargo-git");
    let target_cache = p.cache("target");

    // === TEMPLATE ===
    let rust = Template::new()
        .container("rust:1.85")
        .mount_dir(&src, "/src")
        .mount_cache(&cargo_registry, "/usr/local/cargo/registry")
        .mount_cache(&cargo_git, "/usr/local/cargo/git")
        .mount_cache(&target_cache, "/src/target")
        .workdir("/src");

    // === TASKS ===

    let _ = p
        .task("test")
        .from(&rust)
        .run("cargo test")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("lint")
        .from(&rust)
        .run("cargo clippy --all-targets -- -D warnings")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("fmt")
        .from(&rust)
        .run("cargo fmt -- --check")
        .inputs(&["**/*.rs"]);

    let _ = p
        .task("build")
        .from(&rust)
        .run("cargo build --release --bin hostinfo")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"])
        .output("binary", "target/release/hostinfo")
        .after(&["test", "lint", "fmt"]);

    // Start the release binary and hit both endpoints
    let _ = p
        .task("smoke-test")
        .from(&rust)
        .run(
            r#"#!/bin/bash
set -e

HOSTINFO_HOST=127.0.0.1 HOSTINFO_PORT=5000 RUST_LOG=debug \
  ./target/release/hostinfo 2>&1 | tee /tmp/hostinfo-log.txt &
sleep 2

BODY=$(curl -sf http://127.0.0.1:5000/)
case "$BODY" in
  "Hostname: "*) ;;
  *) echo "ERROR: unexpected greeting: $BODY"; cat /tmp/hostinfo-log.txt; exit 1 ;;
esac

curl -sf http://127.0.0.1:5000/metrics \
  | grep -q 'http_requests_total{method="GET",path="/",status="200"} 1' \
  || { echo "ERROR: request counter missing"; cat /tmp/hostinfo-log.txt; exit 1; }

STATUS=$(curl -s -o /dev/null -w '%{http_code}' http://127.0.0.1:5000/nonexistent)
if [ "$STATUS" != "404" ]; then
  echo "ERROR: expected 404 for unknown path, got $STATUS"
  exit 1
fi

pkill -TERM hostinfo
echo "Smoke test passed"
"#,
        )
        .input_from("build", "binary", "/src/target/release/hostinfo")
        .when_cond(Condition::event("push").or(Condition::negate(Condition::branch("*"))))
        .timeout(120);

    p.emit();
}

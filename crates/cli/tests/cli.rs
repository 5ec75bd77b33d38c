// ABOUTME: CLI integration tests: argument handling, JSON output, rules-file loading.
// ABOUTME: Network-facing commands run against a local mock server with the delay disabled.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    Command::cargo_bin("shuyuan").unwrap()
}

#[test]
fn help_lists_the_operations() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("toc"))
        .stdout(predicate::str::contains("content"))
        .stdout(predicate::str::contains("random"));
}

#[test]
fn toc_prints_chapters_from_the_site() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/book/1/");
        then.status(200).body(
            r#"<div>x</div>
               <ul class="chapter"><li><a href="/c/99">teaser</a></li></ul>
               <div>正文</div>
               <ul class="chapter"><li><a href="/c/1">第一章</a></li></ul>"#,
        );
    });

    let base = server.base_url();
    let url = format!("{}/book/1/", base);
    cli()
        .args(["--site", base.as_str(), "--delay-ms", "0", "toc", url.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("第一章"))
        .stdout(predicate::str::contains("/c/1"))
        .stdout(predicate::str::contains("teaser").not());
}

#[test]
fn content_renders_plain_text_paragraphs() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/c/1");
        then.status(200).body(
            r#"<h1 id="_bqgmb_h1">第一章</h1>
               <div id="nr1"><p>一段。</p><p>二段。</p></div>"#,
        );
    });

    let base = server.base_url();
    let url = format!("{}/c/1", base);
    cli()
        .args([
            "--site",
            base.as_str(),
            "--delay-ms",
            "0",
            "content",
            url.as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("第一章"))
        .stdout(predicate::str::contains("一段。"))
        .stdout(predicate::str::contains("<div").not());
}

#[test]
fn custom_rules_file_overrides_the_defaults() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cats");
        then.status(200)
            .body(r#"<nav class="cats"><li><a href="/sort/7">仙侠</a></li></nav>"#);
    });

    let mut rules_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        rules_file,
        r#"{{"ruleFind":{{"findList":"nav.cats li","findName":"a@text","findUrl":"a@href"}}}}"#
    )
    .unwrap();

    let base = server.base_url();
    let url = format!("{}/cats", base);
    cli()
        .args([
            "--site",
            base.as_str(),
            "--delay-ms",
            "0",
            "--rules",
            rules_file.path().to_str().unwrap(),
            "--json",
            "find",
            url.as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("仙侠"))
        .stdout(predicate::str::contains("/sort/7"));
}

#[test]
fn invalid_rules_file_fails_fast() {
    let mut rules_file = tempfile::NamedTempFile::new().unwrap();
    write!(rules_file, "not json").unwrap();

    cli()
        .args(["--rules", rules_file.path().to_str().unwrap(), "find"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid rules JSON"));
}

#[test]
fn empty_results_exit_nonzero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.any_request();
        then.status(404);
    });

    let base = server.base_url();
    let url = format!("{}/book/1/", base);
    cli()
        .args(["--site", base.as_str(), "--delay-ms", "0", "toc", url.as_str()])
        .assert()
        .failure();
}

//! End-to-end tests of the `pdf2txt` binary on PDFs generated with
//! [`pdf2txt_lopdf::fixtures`].

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pdf2txt_lopdf::fixtures::{FixturePage, write_pdf};

fn run(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pdf2txt"))
        .args(args)
        .arg("--no-progress")
        .arg("--no-color")
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("PDF2TXT_MIN_CHARS")
        .env_remove("PDF2TXT_MIN_CHARS_PER_PAGE")
        .env_remove("PDF2TXT_LOG_FILE")
        .output()
        .expect("failed to run pdf2txt")
}

fn text_page(line: &str) -> FixturePage {
    FixturePage::text(&[line])
}

#[test]
fn converts_tree_and_isolates_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pdfs");
    let output = dir.path().join("out");
    fs::create_dir_all(input.join("reports")).unwrap();

    write_pdf(
        &input.join("file1.pdf"),
        &[
            text_page("The first page of the first file has plenty of text"),
            text_page("The second page of the first file follows it"),
        ],
    )
    .unwrap();
    write_pdf(
        &input.join("reports/report1.pdf"),
        &[text_page(
            "Annual report with comfortably more than fifty characters of body text",
        )],
    )
    .unwrap();
    fs::write(input.join("reports/broken.pdf"), b"not a pdf").unwrap();

    let log = dir.path().join("run.log");
    let result = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--log-file",
            log.to_str().unwrap(),
        ],
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(result.status.success(), "{stdout}");
    assert!(stdout.contains("Found 3 PDF files."), "{stdout}");
    assert!(stdout.contains("Converted   : 2"), "{stdout}");
    assert!(stdout.contains("Failed      : 1"), "{stdout}");

    let first = fs::read_to_string(output.join("file1.txt")).unwrap();
    let p1 = first.find("first page").unwrap();
    let p2 = first.find("second page").unwrap();
    assert!(p1 < p2);
    assert!(
        fs::read_to_string(output.join("reports/report1.txt"))
            .unwrap()
            .contains("Annual report")
    );
    assert!(!output.join("reports/broken.txt").exists());

    let log_text = fs::read_to_string(&log).unwrap();
    let failures: Vec<&str> = log_text
        .lines()
        .filter(|l| l.contains("conversion failed"))
        .collect();
    assert_eq!(failures.len(), 1, "{log_text}");
    assert!(failures[0].contains("broken.pdf"));
}

#[test]
fn second_run_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_pdf(
        &input.join("doc.pdf"),
        &[text_page("Deterministic output is expected from every single run")],
    )
    .unwrap();

    let args = [
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ];
    assert!(run(dir.path(), &args).status.success());
    let first = fs::read(output.join("doc.txt")).unwrap();
    assert!(run(dir.path(), &args).status.success());
    let second = fs::read(output.join("doc.txt")).unwrap();
    assert_eq!(first, second);

    // Default log file lands in the working directory.
    assert!(dir.path().join("pdf_processing.log").exists());
}

#[test]
fn image_only_pdf_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_pdf(&input.join("scan.pdf"), &[FixturePage::blank()]).unwrap();

    let result = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert!(result.status.success());
    assert!(!output.join("scan.txt").exists());
    let log_text = fs::read_to_string(dir.path().join("pdf_processing.log")).unwrap();
    assert!(log_text.contains("fallback triggered"), "{log_text}");
    assert!(log_text.contains("no extractable text"), "{log_text}");
}

#[test]
fn missing_input_directory_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(
        dir.path(),
        &[
            "--input",
            dir.path().join("missing").to_str().unwrap(),
            "--output",
            dir.path().join("out").to_str().unwrap(),
        ],
    );
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("does not exist"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn input_and_output_are_required() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(dir.path(), &["--input", "somewhere"]);
    assert!(!result.status.success());
}

#[test]
fn broken_local_config_is_reported_in_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_pdf(
        &input.join("doc.pdf"),
        &[text_page("A config typo must not stop the conversion of this file")],
    )
    .unwrap();
    fs::write(dir.path().join(".pdf2txt.toml"), "[extraction\nmin_chars = ").unwrap();

    let result = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert!(result.status.success());
    assert!(output.join("doc.txt").exists());

    let log_text = fs::read_to_string(dir.path().join("pdf_processing.log")).unwrap();
    let line = log_text
        .lines()
        .find(|l| l.contains("ignoring config file"))
        .expect("config warning in log");
    assert!(line.contains("WARN"), "{line}");
    assert!(line.contains(".pdf2txt.toml"), "{line}");
}

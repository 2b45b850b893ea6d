use clap::Parser;
use phos::cli::Args;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("phos")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./template", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.template, PathBuf::from("./template"));
    assert_eq!(parsed.output_dir, PathBuf::from("./output"));
    assert!(!parsed.force);
    assert!(!parsed.verbose);
    assert!(!parsed.stdin);
    assert!(!parsed.skip_hooks_check);
    assert!(!parsed.skip_overwrite_check);
    assert!(parsed.answers.is_none());
    assert!(parsed.set.is_empty());
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--force",
        "--verbose",
        "--stdin",
        "--skip-hooks-check",
        "--skip-overwrite-check",
        "--answers",
        "answers.yaml",
        "./template",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
    assert!(parsed.stdin);
    assert!(parsed.skip_hooks_check);
    assert!(parsed.skip_overwrite_check);
    assert_eq!(parsed.answers, Some(PathBuf::from("answers.yaml")));
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-v", "-a", "a.json", "./template", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
    assert_eq!(parsed.answers, Some(PathBuf::from("a.json")));
}

#[test]
fn test_repeated_set() {
    let args = make_args(&[
        "--set",
        "projectName=nova",
        "--set",
        "frontend.eslint=false",
        "./template",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.set, vec!["projectName=nova", "frontend.eslint=false"]);
}

#[test]
fn test_missing_args() {
    let args = make_args(&["./template"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./template", "./output", "extra"]);
    assert!(Args::try_parse_from(args).is_err());
}

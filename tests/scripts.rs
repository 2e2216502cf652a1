mod common;

use std::fs;
use std::io::Cursor;
use std::path::Path;

use common::fixture;
use imgfe::io::{decode_ppm, encode_ppm, load_image};
use imgfe::{RunnerConfig, ScriptRunner, SessionCache};

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Run `script` (from memory) and return the cache plus everything printed.
fn run_inline(script: &str) -> (SessionCache, String, imgfe::RunSummary) {
    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_reader("inline", Cursor::new(script.to_string())).unwrap();
    let (cache, out) = runner.into_parts();
    (cache, String::from_utf8(out).unwrap(), summary)
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fixture.ppm"), encode_ppm(&fixture())).unwrap();
    dir
}

#[test]
fn load_transform_save_pipeline() {
    let dir = fixture_dir();
    let script = format!(
        "# sample pipeline\n\
         load {d}/fixture.ppm img\n\
         \n\
         brighten 30 img bright\n\
         horizontal-flip bright flipped\n\
         save {d}/flipped.ppm flipped\n",
        d = dir.path().display()
    );
    let (cache, out, summary) = run_inline(&script);
    assert_eq!(out, "");
    assert_eq!(summary.executed, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(cache.get("img"), Some(&fixture()));

    let saved = load_image(&dir.path().join("flipped.ppm")).unwrap();
    assert_eq!(saved.get(0, 0), [241, 42, 120]);
    assert_eq!(&saved, cache.get("flipped").unwrap());
}

#[test]
fn quoted_paths_with_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("my images");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("in put.ppm"), encode_ppm(&fixture())).unwrap();
    let script = format!(
        "load \"{d}/in put.ppm\" img\nsave '{d}/out put.png' img\n",
        d = sub.display()
    );
    let (_, out, summary) = run_inline(&script);
    assert_eq!(out, "");
    assert_eq!(summary.executed, 2);
    assert_eq!(load_image(&sub.join("out put.png")).unwrap(), fixture());
}

#[test]
fn nested_run_resumes_parent() {
    let dir = fixture_dir();
    let d = dir.path().display().to_string();
    write(dir.path(), "child.txt", &format!("load {d}/fixture.ppm img\nsepia img child-done\n"));
    let parent = write(
        dir.path(),
        "parent.txt",
        &format!("run {d}/child.txt\nvertical-flip img parent-done\n"),
    );

    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&parent).unwrap();
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.executed, 3);
    assert!(runner.cache().contains("child-done"));
    assert!(runner.cache().contains("parent-done"));
}

#[test]
fn quit_in_child_discards_parent() {
    let dir = fixture_dir();
    let d = dir.path().display().to_string();
    write(dir.path(), "child.txt", &format!("load {d}/fixture.ppm img\nquit\nsepia img never\n"));
    let parent = write(
        dir.path(),
        "parent.txt",
        &format!("run {d}/child.txt\nsepia img also-never\n"),
    );

    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&parent).unwrap();
    assert!(summary.quit);
    assert!(runner.cache().contains("img"));
    assert!(!runner.cache().contains("never"));
    assert!(!runner.cache().contains("also-never"));
}

#[test]
fn self_referential_script_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loop.txt");
    fs::write(&path, format!("run {}\nhelp\n", path.display())).unwrap();

    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&path).unwrap();
    assert_eq!(summary.failed, 1);
    let (_, out) = runner.into_parts();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("is already running"), "{text}");
    // the line after the rejected `run` still executes
    assert!(text.contains("commands:"), "{text}");
}

#[test]
fn mutual_recursion_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, format!("run {}\n", b.display())).unwrap();
    fs::write(&b, format!("run {}\n", a.display())).unwrap();

    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&a).unwrap();
    assert_eq!(summary.failed, 1);
}

#[test]
fn depth_limit_applies() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        let next = dir.path().join(format!("s{}.txt", i + 1));
        fs::write(dir.path().join(format!("s{i}.txt")), format!("run {}\n", next.display())).unwrap();
    }
    fs::write(dir.path().join("s5.txt"), "").unwrap();

    let config = RunnerConfig { max_depth: 3, ..RunnerConfig::default() };
    let mut runner = ScriptRunner::new(Vec::new(), config);
    let summary = runner.run_file(&dir.path().join("s0.txt")).unwrap();
    assert_eq!(summary.failed, 1);
    let (_, out) = runner.into_parts();
    assert!(String::from_utf8(out).unwrap().contains("limited to 3 levels"));
}

#[test]
fn errors_are_reported_and_do_not_corrupt_cache() {
    let dir = fixture_dir();
    let script = format!(
        "load {d}/fixture.ppm img\n\
         rgb-split img r g\n\
         rgb-split img r g b\n\
         rgb-combine out r g nope\n\
         load {d}/fixture.ppm other\n\
         red-component other r\n\
         brighten up img x\n",
        d = dir.path().display()
    );
    let (cache, out, summary) = run_inline(&script);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "{out}");
    assert!(lines[0].starts_with("error: inline:2: 'rgb-split' expects 4 argument(s), got 3"), "{out}");
    assert_eq!(lines[1], "error: inline:4: no image named 'nope' has been loaded");
    assert_eq!(lines[2], "error: inline:7: 'brighten': invalid delta 'up'");
    assert_eq!(summary.failed, 3);

    assert!(!cache.contains("out"));
    // `r` was overwritten by red-component with identical data
    assert_eq!(cache.get("r").unwrap().get(0, 0), [145, 0, 0]);
}

#[test]
fn unreadable_image_abandons_current_script() {
    let dir = fixture_dir();
    let script = format!(
        "load {d}/missing.ppm gone\nload {d}/fixture.ppm after\n",
        d = dir.path().display()
    );
    let (cache, out, summary) = run_inline(&script);
    assert!(out.starts_with("error: inline:1: could not read"), "{out}");
    assert_eq!(out.lines().count(), 1, "{out}");
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.executed, 0);
    assert!(!cache.contains("gone"));
    assert!(!cache.contains("after"));
}

#[test]
fn unreadable_image_in_child_resumes_parent() {
    let dir = fixture_dir();
    let d = dir.path().display().to_string();
    write(
        dir.path(),
        "child.txt",
        &format!("load {d}/fixture.ppm img\nload {d}/missing.ppm gone\nsepia img never\n"),
    );
    let parent = write(
        dir.path(),
        "parent.txt",
        &format!("run {d}/child.txt\nvertical-flip img parent-done\n"),
    );

    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&parent).unwrap();
    assert_eq!(summary.failed, 1);
    assert!(runner.cache().contains("img"));
    assert!(!runner.cache().contains("never"));
    assert!(runner.cache().contains("parent-done"));
}

#[test]
fn missing_run_target_keeps_caller_going() {
    let dir = fixture_dir();
    let script = format!(
        "run {d}/absent.txt\nload {d}/fixture.ppm img\n",
        d = dir.path().display()
    );
    let (cache, out, summary) = run_inline(&script);
    assert!(out.starts_with("error: inline:1: could not read"), "{out}");
    assert_eq!(summary.failed, 1);
    assert!(cache.contains("img"));
}

#[test]
fn unreadable_child_text_pops_to_parent() {
    let dir = fixture_dir();
    let d = dir.path().display().to_string();
    let mut child = format!("load {d}/fixture.ppm img\n").into_bytes();
    child.extend_from_slice(b"sepia \xff\xfe img\nsepia img never\n");
    fs::write(dir.path().join("child.txt"), child).unwrap();
    let parent = write(
        dir.path(),
        "parent.txt",
        &format!("run {d}/child.txt\nsepia img parent-done\n"),
    );

    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&parent).unwrap();
    assert_eq!(summary.failed, 1);
    assert!(runner.cache().contains("img"));
    assert!(!runner.cache().contains("never"));
    assert!(runner.cache().contains("parent-done"));
    let (_, out) = runner.into_parts();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("could not read").count(), 1, "{text}");
}

#[test]
fn missing_top_level_script_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = ScriptRunner::new(Vec::new(), RunnerConfig::default());
    let summary = runner.run_file(&dir.path().join("nope.txt")).unwrap();
    assert_eq!(summary.failed, 1);
    let (_, out) = runner.into_parts();
    assert!(String::from_utf8(out).unwrap().starts_with("error: <args>:0: could not read"));
}

#[test]
fn combine_dimension_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("big.ppm"), encode_ppm(&fixture())).unwrap();
    fs::write(dir.path().join("small.ppm"), "P3 1 1 255 1 2 3\n").unwrap();
    let script = format!(
        "load {d}/big.ppm r\nload {d}/big.ppm g\nload {d}/small.ppm b\nrgb-combine out r g b\n",
        d = dir.path().display()
    );
    let (cache, out, _) = run_inline(&script);
    assert_eq!(
        out.trim_end(),
        "error: inline:4: image 'b' is 1x1, expected 4x3 to match 'r'"
    );
    assert!(!cache.contains("out"));
}

#[test]
fn malformed_ppm_is_a_reported_format_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.ppm"), "P3 2 2 100 0 0 0\n").unwrap();
    let script = format!("load {}/bad.ppm img\n", dir.path().display());
    let (cache, out, summary) = run_inline(&script);
    assert!(out.contains("maximum value must be 255"), "{out}");
    assert_eq!(summary.failed, 1);
    assert!(cache.is_empty());
}

#[test]
fn split_combine_through_commands() {
    let dir = fixture_dir();
    let script = format!(
        "load {d}/fixture.ppm img\n\
         rgb-split img r g b\n\
         rgb-combine back r g b\n",
        d = dir.path().display()
    );
    let (cache, out, _) = run_inline(&script);
    assert_eq!(out, "");
    assert_eq!(cache.get("back"), Some(&fixture()));
    assert_eq!(cache.get("g").unwrap().get(0, 0), [0, 203, 0]);
}

#[test]
fn overwriting_a_name_keeps_derived_images_frozen() {
    let dir = fixture_dir();
    let script = format!(
        "load {d}/fixture.ppm img\n\
         blur img soft\n\
         brighten 10 img img\n",
        d = dir.path().display()
    );
    let (cache, _, _) = run_inline(&script);
    assert_eq!(cache.get("soft").unwrap().get(0, 0), [94, 93, 76]);
    assert_eq!(cache.get("img").unwrap().get(0, 0), [155, 213, 142]);
}

#[test]
fn echo_prints_each_command() {
    let config = RunnerConfig { echo: true, ..RunnerConfig::default() };
    let mut runner = ScriptRunner::new(Vec::new(), config);
    runner.run_reader("inline", Cursor::new("sepia a b\n")).unwrap();
    let (_, out) = runner.into_parts();
    assert_eq!(String::from_utf8(out).unwrap(), "> sepia a b\n");
}

#[test]
fn ppm_text_round_trip_via_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.ppm");
    fs::write(&path, encode_ppm(&fixture())).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(decode_ppm(&text, &path).unwrap(), fixture());
}

//! Integration tests for the `wayfarer` binary.
//!
//! Each test runs the real executable against a temporary data directory,
//! with `XDG_CONFIG_HOME` pointed at a temporary directory so no user
//! config leaks in.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use wayfarer_test_utils::sample_payload;

// -----------------------------------------------------------------------
// Harness
// -----------------------------------------------------------------------

struct TestEnv {
    _root: TempDir,
    data_dir: PathBuf,
    config_home: PathBuf,
    images_dir: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let data_dir = root.path().join("data");
        let config_home = root.path().join("config");
        let images_dir = root.path().join("images");
        std::fs::create_dir_all(&images_dir).unwrap();
        Self {
            data_dir,
            config_home,
            images_dir,
            _root: root,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_wayfarer"))
            .args(args)
            .env("XDG_CONFIG_HOME", &self.config_home)
            .env("WAYFARER_DATA_DIR", &self.data_dir)
            .env("WAYFARER_IMAGES_DIR", &self.images_dir)
            .env("WAYFARER_LOAD_MORE_DELAY_MS", "0")
            .env_remove("WAYFARER_PAGE_SIZE")
            .env("RUST_LOG", "warn")
            .output()
            .expect("failed to run wayfarer binary")
    }

    fn ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "wayfarer {args:?} failed:\n{}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8(out.stdout).unwrap()
    }

    fn fails(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(!out.status.success(), "wayfarer {args:?} unexpectedly succeeded");
        String::from_utf8_lossy(&out.stderr).into_owned()
    }

    fn write_payload(&self, destinations: &[&str]) -> PathBuf {
        let path = self.data_dir.with_file_name("payload.txt");
        std::fs::write(&path, sample_payload(destinations)).unwrap();
        path
    }

    fn import(&self, destinations: &[&str]) -> String {
        let payload = self.write_payload(destinations);
        let mut args = vec![
            "import",
            path_str(&payload),
            "--origin",
            "Lisbon",
            "--year",
            "2026",
            "--adults",
            "2",
            "--children",
            "1",
        ];
        for d in destinations {
            args.push("--dest");
            args.push(*d);
        }
        self.ok(&args)
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[test]
fn import_then_show() {
    let env = TestEnv::new();
    std::fs::write(env.images_dir.join("paris.png"), b"png").unwrap();

    let out = env.import(&["Paris", "Rome"]);
    assert!(out.contains("Installed plan with 2 destination(s) and 30 flight(s)."));
    assert!(out.contains("Images: 1 of 2 ready"));

    let show = env.ok(&["show"]);
    assert!(show.starts_with("Lisbon to Paris, Rome (2026, international, economy)"));
    assert!(show.contains("1. Paris [image: ready]"));
    assert!(show.contains("2. Rome [image: unavailable]"));
    assert!(show.contains("Selected flight: none"));
}

#[test]
fn commands_without_a_saved_plan_fail_with_a_hint() {
    let env = TestEnv::new();
    let err = env.fails(&["show"]);
    assert!(err.contains("no saved plan"));
}

#[test]
fn malformed_payload_is_rejected() {
    let env = TestEnv::new();
    let path = env.data_dir.with_file_name("bad.txt");
    std::fs::write(&path, "I could not build a plan, sorry.").unwrap();

    let err = env.fails(&["import", path_str(&path), "--origin", "Lisbon", "--dest", "Paris"]);
    assert!(err.contains("malformed plan payload"));
    assert!(err.contains("(retryable)"));
}

#[test]
fn flights_page_filter_and_select() {
    let env = TestEnv::new();
    env.import(&["Paris"]);

    let first = env.ok(&["flights"]);
    assert!(first.contains("Showing 10 of 30 flight(s):"));
    assert!(first.contains("More flights available: pass --pages 2"));
    assert!(first.contains("Airlines: TAP, Iberia, Ryanair"));

    let all = env.ok(&["flights", "--pages", "5"]);
    assert!(all.contains("Showing 30 of 30 flight(s):"));
    assert!(!all.contains("More flights available"));

    let filtered = env.ok(&["flights", "--airline", "Iberia", "--max-price", "200"]);
    assert!(filtered.contains("Showing 4 of 4 flight(s):"));

    let selected = env.ok(&["select", "2", "--airline", "Iberia"]);
    assert!(selected.contains("Selected: Iberia, 1 stop, 140.00 (economy)"));
    // 1000 + 140 * (2 adults + 1 child)
    assert!(selected.contains("Trip total: 1420.00"));

    let show = env.ok(&["show"]);
    assert!(show.contains("Selected flight: Iberia, 1 stop, 140.00 (economy)"));

    let deselected = env.ok(&["select", "2", "--airline", "Iberia"]);
    assert!(deselected.contains("Deselected:"));

    let err = env.fails(&["select", "40"]);
    assert!(err.contains("flight 40 does not exist"));
}

#[test]
fn toggle_and_export() {
    let env = TestEnv::new();
    env.import(&["Paris"]);

    assert_eq!(env.ok(&["toggle", "checklist", "1"]), "[x] Passport\n");
    assert_eq!(env.ok(&["toggle", "packing", "1", "2"]), "[x] Rain jacket\n");

    let checklist = env.ok(&["export", "checklist"]);
    assert!(checklist.starts_with("[x] Passport\n- Valid for six months\n[ ] Travel insurance\n"));

    let packing = env.ok(&["export", "packing"]);
    assert_eq!(
        packing,
        "Clothes:\n[ ] Socks x4\n[x] Rain jacket x1\n\nDocuments:\n[ ] Tickets x1\n"
    );

    let out_file = env.data_dir.with_file_name("flights.csv");
    env.ok(&["export", "flights", "--stops", "0", "--output", path_str(&out_file)]);
    let csv = std::fs::read_to_string(&out_file).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("airline,stops,price,class"));
    assert_eq!(lines.next(), Some("TAP,0,100,economy"));
    assert_eq!(csv.lines().count(), 11);

    let err = env.fails(&["toggle", "checklist", "9"]);
    assert!(err.contains("no such checklist item"));
}

#[test]
fn history_list_show_and_clear() {
    let env = TestEnv::new();
    env.import(&["Paris"]);
    env.import(&["Rome"]);
    env.import(&["Paris"]);

    let list = env.ok(&["history", "list"]);
    let titles: Vec<&str> = list
        .lines()
        .map(|l| l.rsplit("  ").next().unwrap())
        .collect();
    assert_eq!(titles, vec!["Lisbon to Paris", "Lisbon to Rome"]);

    let id = list.lines().next().unwrap().split_whitespace().next().unwrap();
    let params = env.ok(&["history", "show", id]);
    assert!(params.contains("\"origin\": \"Lisbon\""));

    let err = env.fails(&["history", "clear"]);
    assert!(err.contains("--yes"));
    assert_eq!(env.ok(&["history", "clear", "--yes"]), "Cleared 2 history entries.\n");
    assert_eq!(env.ok(&["history", "list"]), "No history.\n");
}

#[test]
fn discard_requires_confirmation() {
    let env = TestEnv::new();
    env.import(&["Paris"]);

    env.fails(&["discard"]);
    env.ok(&["show"]);
    env.ok(&["discard", "--yes"]);
    let err = env.fails(&["show"]);
    assert!(err.contains("no saved plan"));
}

#[test]
fn init_writes_config_once() {
    let env = TestEnv::new();
    let out = env.ok(&["init"]);
    assert!(out.contains("Config written to"));
    assert!(env.config_home.join("wayfarer/config.toml").exists());

    let err = env.fails(&["init"]);
    assert!(err.contains("already exists"));
    env.ok(&["init", "--force"]);
}

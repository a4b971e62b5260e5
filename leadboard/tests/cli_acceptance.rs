use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.xdg_config.join("leadboard/config.toml");
        fs::create_dir_all(path.parent().expect("missing config parent"))
            .expect("failed to create config dir");
        fs::write(&path, contents).expect("failed to write config");
        path
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("leadboard"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("LEADBOARD_API_URL")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute leadboard: {e}"))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let env = CliTestEnv::new();
    let output = run_bin(&env, &["--help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["board", "move", "watch"] {
        assert!(stdout.contains(command), "missing {command} in help:\n{stdout}");
    }
}

#[test]
fn move_rejects_unknown_stage() {
    let env = CliTestEnv::new();
    let output = run_bin(&env, &["move", "lead-1", "archived"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown pipeline stage"));
}

#[test]
fn invalid_config_is_reported() {
    let env = CliTestEnv::new();
    let path = env.write_config("[sync]\npoll_interval_secs = 0\n");
    let output = run_bin(&env, &["--config", path_str(&path), "board"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("poll_interval_secs"));
}

#[test]
fn board_fails_cleanly_when_backend_is_down() {
    let env = CliTestEnv::new();
    env.write_config("[api]\nbase_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n");
    let output = run_bin(&env, &["board"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("failed to fetch leads"),
        "stderr: {}",
        stderr(&output)
    );
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("non-utf8 temp path")
}

//! Config files feeding the verifier and the visual session.

use std::fs;

use lyapviz_config::{ConfigError, LyapvizConfig};
use lyapviz_engine::{GridSpec, LyapunovProblem, Session, SurfaceKind};
use lyapviz_types::ui::CameraPreset;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn custom_system_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[system]
f1 = "q"
f2 = "-p - q"
v = "p**2 + q**2"
variables = ["p", "q"]

[verifier]
num_points = 21

[visualizer]
resolution = 11

[app]
ascii_only = true
"#,
    );
    let config = LyapvizConfig::load_from(&path).unwrap().unwrap();
    let system = &config.system;
    let problem =
        LyapunovProblem::parse(&system.f1, &system.f2, &system.v, &system.variables).unwrap();

    let spec = GridSpec::new(config.verifier.domain_limit, config.verifier.num_points).unwrap();
    let verdict = problem.verify(&spec);
    assert!(verdict.passed());
    assert!(verdict.report().contains("Vdot(x) : -2*q**2"));

    let grid = GridSpec::new(config.visualizer.limit, config.visualizer.resolution).unwrap();
    let session = Session::new(problem.v(), problem.vdot(), problem.vars().clone(), grid)
        .with_options(config.app.ui_options());
    assert_eq!(session.surface().size(), 11);
    assert_eq!(session.surfaces().get(SurfaceKind::Vdot).size(), 11);
    assert!(session.options().ascii_only);
    assert_eq!(CameraPreset::X2Side.label(session.vars()), "q-z plane");
}

#[test]
fn unknown_variable_in_config_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[system]
f1 = "-x1"
f2 = "-y"
"#,
    );
    let config = LyapvizConfig::load_from(&path).unwrap().unwrap();
    let system = &config.system;
    let err = LyapunovProblem::parse(&system.f1, &system.f2, &system.v, &system.variables)
        .unwrap_err();
    assert!(err.is_parse());
    assert!(err.to_string().starts_with("invalid f2"));
}

#[test]
fn malformed_config_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[verifier]\nnum_points = \"many\"\n");
    let err = LyapvizConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), path.as_path());
}

#[test]
fn invalid_verifier_grid_does_not_block_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[verifier]\nnum_points = 1\n");
    let config = LyapvizConfig::load_from(&path).unwrap().unwrap();
    assert!(GridSpec::new(config.verifier.domain_limit, config.verifier.num_points).is_err());

    let system = &config.system;
    let problem =
        LyapunovProblem::parse(&system.f1, &system.f2, &system.v, &system.variables).unwrap();
    let grid = GridSpec::new(config.visualizer.limit, config.visualizer.resolution).unwrap();
    let session = Session::new(problem.v(), problem.vdot(), problem.vars().clone(), grid);
    assert_eq!(session.surface().size(), 80);
}

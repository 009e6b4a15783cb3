use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to a solver artifact.
pub struct Payload {
    pub params: Value,
    /// Files the artifact was derived from (instruction files).
    pub inputs: Vec<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
        }
    }

    pub fn with_input<P: AsRef<Path>>(mut self, input: P) -> Self {
        self.inputs
            .push(input.as_ref().to_string_lossy().into_owned());
        self
    }
}

/// Provenance block without outputs (what `report` prints).
pub fn base_document() -> Value {
    json!({
        "code_rev": current_git_rev(),
        "origami_version": origami::VERSION,
        "inputs": [],
        "params": {},
        "outputs": []
    })
}

/// Write `<artifact>.provenance.json` with the git commit, library version,
/// callsite, inputs, params and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let mut doc = base_document();
    doc["callsite"] = json!({
        "file": callsite.file(),
        "line": callsite.line()
    });
    doc["inputs"] = json!(payload.inputs);
    doc["params"] = payload.params;
    doc["outputs"] = json!([artifact.to_string_lossy()]);
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

/// Read the sidecar of `artifact`.
pub fn read_sidecar<P: AsRef<Path>>(artifact: P) -> Result<Value> {
    let path = provenance_path(artifact.as_ref());
    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    let mut name = stem;
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_rewrites_extension() {
        let base = Path::new("/tmp/output/crane.json");
        let derived = provenance_path(base);
        assert_eq!(derived, Path::new("/tmp/output/crane.provenance.json"));
    }

    #[test]
    fn sidecar_round_trips_inputs_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("solve.json");
        fs::write(&artifact, "{}").unwrap();
        let payload = Payload::new(json!({"eps": 1e-4})).with_input("folds/crane.txt");
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        assert!(prov_path.exists());
        let parsed = read_sidecar(&artifact).unwrap();
        assert_eq!(parsed["outputs"][0], &*artifact.to_string_lossy());
        assert_eq!(parsed["inputs"][0], "folds/crane.txt");
        assert_eq!(parsed["params"]["eps"], 1e-4);
        assert_eq!(parsed["origami_version"], origami::VERSION);
        assert!(parsed["callsite"]["line"].as_u64().is_some());
    }
}

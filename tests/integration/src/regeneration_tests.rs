//! End-to-end regeneration scenarios
//!
//! These tests drive several generator runs over the same files, the way a
//! scaffolding tool would, and check that hand-written code survives every
//! run: config loading -> registry load -> apply -> registry save.

use pretty_assertions::assert_eq;
use regen_core::{
    Applier, ApplyStatus, ChecksumRegistry, RegenConfig,
    get_merge_statistics, has_custom_code, orphan_path, validate_markers,
};
use regen_markers::parse;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

/// Renders the service for an entity with the given generated methods.
fn render_service(entity: &str, methods: &[&str], hooks: &[&str]) -> String {
    let mut text = format!("import {{ Injectable }} from '@nestjs/common';\n\n@Injectable()\nexport class {entity}Service {{\n");
    for method in methods {
        text.push_str(&format!(
            "  // GENERATED_METHOD_START: {method}\n  {method}() {{\n    return this.repo.{method}();\n  }}\n  // GENERATED_METHOD_END: {method}\n\n"
        ));
    }
    for hook in hooks {
        text.push_str(&format!(
            "  // CUSTOM_START: {hook}\n  // add custom logic here\n  // CUSTOM_END: {hook}\n\n"
        ));
    }
    text.push_str("}\n");
    text
}

fn fill_hook(text: &str, hook: &str, body: &str) -> String {
    let start = format!("  // CUSTOM_START: {hook}\n  // add custom logic here\n");
    text.replace(&start, &format!("  // CUSTOM_START: {hook}\n{body}"))
}

struct Project {
    dir: TempDir,
    config: RegenConfig,
}

impl Project {
    fn new(config_toml: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(RegenConfig::FILE_NAME), config_toml).unwrap();
        let config = RegenConfig::discover(dir.path()).unwrap();
        Self { dir, config }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    /// One generator run over `files`, persisting the registry between runs.
    fn run(&self, files: &[(&str, &str)]) -> Vec<ApplyStatus> {
        let registry_path = self.config.registry_path(self.root());
        let mut registry = ChecksumRegistry::load(&registry_path).unwrap();
        let applier = Applier::new(&self.config, self.root());

        let statuses = files
            .iter()
            .map(|(path, content)| {
                applier
                    .apply(&mut registry, &self.root().join(path), content)
                    .unwrap()
                    .status
            })
            .collect();

        registry.save(&registry_path).unwrap();
        statuses
    }

    fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root().join(path)).unwrap()
    }

    fn write(&self, path: &str, content: &str) {
        fs::write(self.root().join(path), content).unwrap();
    }
}

#[test]
fn test_three_generations_keep_custom_code() {
    let project = Project::new("");
    let path = "src/user/user.service.ts";

    // Generation 1: scaffold.
    let v1 = render_service("User", &["findAll"], &["before-save"]);
    assert_eq!(project.run(&[(path, &v1)]), vec![ApplyStatus::Created]);
    assert!(validate_markers(&project.read(path)).valid);

    // The developer fills the hook.
    let edited = fill_hook(&project.read(path), "before-save", "    this.audit.log(entity);\n");
    project.write(path, &edited);
    assert!(has_custom_code(&edited));

    // Generation 2: a new method and a new hook.
    let v2 = render_service("User", &["findAll", "findOne"], &["before-save", "after-save"]);
    assert_eq!(project.run(&[(path, &v2)]), vec![ApplyStatus::Updated]);

    let expected = fill_hook(&v2, "before-save", "    this.audit.log(entity);\n");
    let expected = expected.replace(
        "  // CUSTOM_START: after-save\n  // add custom logic here\n",
        "  // CUSTOM_START: after-save\n",
    );
    assert_eq!(project.read(path), expected);

    // Generation 3: same template again is a no-op.
    assert_eq!(project.run(&[(path, &v2)]), vec![ApplyStatus::Unchanged]);
}

#[test]
fn test_removed_hook_is_backed_up_not_lost() {
    let project = Project::new("on_conflict = \"backup\"\n");
    let path = "order.service.ts";

    let v1 = render_service("Order", &["findAll"], &["validate", "notify"]);
    project.run(&[(path, &v1)]);
    let edited = fill_hook(&project.read(path), "notify", "    this.mailer.send(order);\n");
    project.write(path, &edited);

    // The generator no longer emits the notify hook.
    let v2 = render_service("Order", &["findAll"], &["validate"]);
    let stats = get_merge_statistics(path, &edited, &v2);
    assert_eq!(stats.conflicting_blocks, 1);

    let statuses = project.run(&[(path, &v2)]);
    let backup = orphan_path(&project.root().join(path));
    assert_eq!(
        statuses,
        vec![ApplyStatus::Conflicted {
            written: true,
            backup: Some(backup.clone()),
        }]
    );

    let saved = parse("backup", &fs::read_to_string(&backup).unwrap());
    assert_eq!(
        saved.custom("notify").unwrap().content,
        "    this.mailer.send(order);\n"
    );
    assert!(!project.read(path).contains("notify"));
}

#[test]
fn test_skip_policy_leaves_file_and_registry_alone() {
    let project = Project::new("on_conflict = \"skip\"\n");
    let path = "a.service.ts";

    let v1 = render_service("A", &["findAll"], &["hook"]);
    project.run(&[(path, &v1)]);
    let before_registry = ChecksumRegistry::load(&project.config.registry_path(project.root())).unwrap();

    let v2 = render_service("A", &["findAll", "count"], &[]);
    let statuses = project.run(&[(path, &v2)]);

    assert_eq!(
        statuses,
        vec![ApplyStatus::Conflicted {
            written: false,
            backup: None,
        }]
    );
    assert_eq!(project.read(path), v1);
    let after_registry = ChecksumRegistry::load(&project.config.registry_path(project.root())).unwrap();
    assert_eq!(after_registry, before_registry);
}

#[test]
fn test_batch_continues_past_a_conflicting_file() {
    let project = Project::new("");
    let (a, b) = ("a.service.ts", "b.service.ts");

    project.run(&[
        (a, &render_service("A", &["findAll"], &["hook"])),
        (b, &render_service("B", &["findAll"], &["hook"])),
    ]);

    let statuses = project.run(&[
        (a, &render_service("A", &["findAll"], &[])),
        (b, &render_service("B", &["findAll", "count"], &["hook"])),
    ]);

    assert!(matches!(statuses[0], ApplyStatus::Conflicted { written: false, .. }));
    assert_eq!(statuses[1], ApplyStatus::Updated);
    assert!(project.read(b).contains("count()"));
}

#[test]
fn test_hand_edit_is_detected_after_reload() {
    let project = Project::new("");
    let path = "x.service.ts";
    let v1 = render_service("X", &["findAll"], &[]);
    project.run(&[(path, &v1)]);

    project.write(path, &v1.replace("this.repo.findAll()", "this.repo.findAll({ cache: true })"));

    let registry = ChecksumRegistry::load(&project.config.registry_path(project.root())).unwrap();
    let report = registry.detect_modifications(path, &project.read(path));
    assert_eq!(report.modified_markers, vec!["findAll".to_string()]);
}

#[test]
fn test_registry_snapshot_is_json_keyed_by_file() {
    let project = Project::new("registry = \"state/checksums.json\"\n");
    let path = "y.service.ts";
    project.run(&[(path, &render_service("Y", &["findAll", "count"], &[]))]);

    let raw = fs::read_to_string(project.root().join("state/checksums.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = json[path].as_object().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records["count"]["checksum"].as_str().unwrap().starts_with("sha256:"));
}

#[test]
fn test_parallel_regeneration_with_shared_registry() {
    let project = Project::new("");
    let registry = Arc::new(Mutex::new(ChecksumRegistry::new()));
    let config = Arc::new(project.config.clone());
    let root = project.root().to_path_buf();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let config = Arc::clone(&config);
            let root = root.clone();
            thread::spawn(move || {
                let target = root.join(format!("entity{i}.service.ts"));
                let content = render_service(&format!("Entity{i}"), &["findAll"], &["hook"]);
                let applier = Applier::new(&config, &root);
                let mut registry = registry.lock().unwrap();
                applier.apply(&mut registry, &target, &content).unwrap().status
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), ApplyStatus::Created);
    }
    let registry = registry.lock().unwrap();
    assert_eq!(registry.len(), 6);
    assert!(registry.get("entity0.service.ts").is_some());
}

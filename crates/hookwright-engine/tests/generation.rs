use hookwright_engine::{ExistingExtension, GenerationResult, Pipeline};
use hookwright_types::{ComponentId, GenerationError, GeneratorConfig, LogicError};
use proptest::prelude::*;
use serde_json::{json, Value};

fn pipeline() -> Pipeline {
    Pipeline::new(GeneratorConfig::default()).unwrap()
}

fn generate(data: Value) -> GenerationResult {
    pipeline().generate("module", data, None).unwrap()
}

fn file<'a>(result: &'a GenerationResult, path: &str) -> &'a str {
    match result.file(path) {
        Some(file) => &file.content,
        None => panic!("{} not generated; got {:?}", path, result.paths()),
    }
}

#[test]
fn test_hooks_go_to_their_own_files() {
    let result = generate(json!({
        "root_name": "test_module",
        "hooks": ["hook_help", "hook_form_alter", "hook_tokens", "hook_install"],
    }));

    let mut paths = result.paths();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "test_module.info.yml",
            "test_module.install",
            "test_module.module",
            "test_module.tokens.inc",
        ]
    );

    let module = file(&result, "test_module.module");
    assert!(module.contains("function test_module_help("));
    assert!(module.contains("function test_module_form_alter("));
    assert!(!module.contains("function test_module_tokens("));
    assert!(!module.contains("function test_module_install("));

    assert!(file(&result, "test_module.tokens.inc").contains("function test_module_tokens("));
    assert!(file(&result, "test_module.install").contains("function test_module_install("));
    assert!(result.files.values().all(|f| !f.pre_existing && !f.merged));
}

#[test]
fn test_info_file() {
    let result = generate(json!({
        "root_name": "test_module",
        "dependencies": ["node"],
    }));
    assert_eq!(
        file(&result, "test_module.info.yml"),
        "name: 'Test module'\ntype: module\ndescription: 'Provides Test module.'\npackage: Custom\n\
         core_version_requirement: ^10\ndependencies:\n  - 'drupal:node'\n"
    );
}

#[test]
fn test_repeated_service_is_generated_once() {
    let result = generate(json!({
        "root_name": "test_module",
        "services": [{"service_name": "alpha"}, {"service_name": "alpha"}],
    }));

    let services: Vec<&ComponentId> = result
        .components
        .iter()
        .filter(|id| id.as_str().starts_with("service:"))
        .collect();
    assert_eq!(services, vec![&ComponentId::from("service:test_module:alpha")]);
    assert_eq!(
        result.paths().iter().filter(|p| p.starts_with("src/")).count(),
        1
    );
    assert_eq!(file(&result, "test_module.services.yml").matches("test_module.alpha:").count(), 1);
}

#[test]
fn test_repeated_service_injections_are_unioned() {
    let result = generate(json!({
        "root_name": "test_module",
        "services": [
            {"service_name": "alpha", "injected_services": ["current_user"]},
            {"service_name": "alpha", "injected_services": ["current_user", "entity_type.manager"]},
        ],
    }));

    let services = file(&result, "test_module.services.yml");
    assert!(services.contains("arguments: ['@current_user', '@entity_type.manager']"));
    let class = file(&result, "src/Alpha.php");
    assert!(class.contains("protected AccountProxyInterface $currentUser;"));
    assert!(class.contains("protected EntityTypeManagerInterface $entityTypeManager;"));
}

#[test]
fn test_conflicting_repeated_service_is_a_logic_error() {
    let err = pipeline()
        .generate(
            "module",
            json!({
                "root_name": "test_module",
                "services": [
                    {"service_name": "alpha", "description": "value"},
                    {"service_name": "alpha", "description": "value 2"},
                ],
            }),
            None,
        )
        .unwrap_err();

    assert!(matches!(err, GenerationError::Logic(LogicError::DuplicateId { .. })));
    assert!(!err.is_user_error());
}

#[test]
fn test_only_root_types_can_be_requested() {
    let err = pipeline()
        .generate("service", json!({"service_name": "alpha"}), None)
        .unwrap_err();
    assert!(err.is_user_error());

    let err = pipeline().generate("no_such_type", json!({}), None).unwrap_err();
    assert!(matches!(err, GenerationError::Logic(LogicError::UnknownComponentType(_))));
}

#[test]
fn test_invalid_input_reports_its_path() {
    let err = pipeline()
        .generate("module", json!({"root_name": "test_module", "hooks": ["hook_nope"]}), None)
        .unwrap_err();
    match err {
        GenerationError::Input(input) => assert!(input.path.contains("hooks"), "{}", input.path),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_derived_class_name_cannot_be_requested() {
    let err = pipeline()
        .generate(
            "module",
            json!({
                "root_name": "test_module",
                "config_entity_types": [{"entity_type_id": "robot", "class_name": "Android"}],
            }),
            None,
        )
        .unwrap_err();
    match err {
        GenerationError::Input(input) => assert!(input.path.ends_with("class_name"), "{}", input.path),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_test_module_is_placed_below_its_parent() {
    let result = generate(json!({
        "root_name": "test_module",
        "test_modules": [{"root_name": "test_module_test", "hooks": ["hook_help"]}],
    }));

    let info = file(&result, "tests/modules/test_module_test/test_module_test.info.yml");
    assert!(info.contains("package: Testing\n"));
    assert!(file(&result, "tests/modules/test_module_test/test_module_test.module")
        .contains("function test_module_test_help("));
    assert!(result.file("test_module.info.yml").is_some());
}

#[test]
fn test_merged_request_keeps_what_it_adds() {
    let result = generate(json!({
        "root_name": "test_module",
        "test_modules": [
            {"root_name": "fixture_mod", "hooks": ["hook_help"]},
            {"root_name": "fixture_mod", "hooks": ["hook_cron"]},
        ],
    }));

    let hooks: Vec<&str> = result
        .components
        .iter()
        .map(ComponentId::as_str)
        .filter(|id| id.starts_with("hook_implementation:fixture_mod:"))
        .collect();
    assert_eq!(
        hooks,
        vec![
            "hook_implementation:fixture_mod:hook_help",
            "hook_implementation:fixture_mod:hook_cron",
        ]
    );

    let module = file(&result, "tests/modules/fixture_mod/fixture_mod.module");
    assert!(module.contains("function fixture_mod_help("));
    assert!(module.contains("function fixture_mod_cron("));
    assert_eq!(module.matches("function fixture_mod_help(").count(), 1);
}

#[test]
fn test_update_is_inserted_among_existing_updates() {
    let existing = ExistingExtension::from_files([(
        "test_module.install",
        "<?php\n\n/**\n * @file\n * Install functions.\n */\n\n\
         /**\n * First.\n */\nfunction test_module_update_8001() {\n}\n\n\
         /**\n * Second.\n */\nfunction test_module_update_8002() {\n}\n\n\
         /**\n * Hand-written helper.\n */\nfunction test_module_helper() {\n  return 42;\n}\n",
    )]);

    let result = pipeline()
        .generate(
            "module",
            json!({"root_name": "test_module", "update_functions": ["Add a column."]}),
            Some(&existing),
        )
        .unwrap();

    let install = result.file("test_module.install").unwrap();
    assert!(install.pre_existing);
    assert!(install.merged);

    let text = &install.content;
    assert!(text.starts_with("<?php\n\n/**\n * @file\n * Install functions.\n */\n"));
    let second = text.find("function test_module_update_8002(").unwrap();
    let third = text.find("function test_module_update_8003(").unwrap();
    let helper = text.find("function test_module_helper(").unwrap();
    assert!(second < third && third < helper);
    assert!(text.contains(" * Add a column.\n */\nfunction test_module_update_8003("));
    assert!(text.ends_with("function test_module_helper() {\n  return 42;\n}\n"));

    let info = result.file("test_module.info.yml").unwrap();
    assert!(!info.pre_existing);
}

#[test]
fn test_existing_readme_is_kept() {
    let existing = ExistingExtension::from_files([("README.md", "# Hand-written\n")]);
    let result = pipeline()
        .generate("module", json!({"root_name": "test_module", "readme": true}), Some(&existing))
        .unwrap();

    let readme = result.file("README.md").unwrap();
    assert_eq!(readme.content, "# Hand-written\n");
    assert!(readme.pre_existing);
    assert!(!readme.merged);
}

#[test]
fn test_existing_yaml_conflict_is_data_loss() {
    let existing = ExistingExtension::from_files([(
        "test_module.services.yml",
        "services:\n  test_module.alpha:\n    class: Drupal\\other\\Alpha\n",
    )]);
    let err = pipeline()
        .generate(
            "module",
            json!({"root_name": "test_module", "services": [{"service_name": "alpha"}]}),
            Some(&existing),
        )
        .unwrap_err();
    assert!(matches!(err, GenerationError::DataLoss(_)));
    assert!(err.is_user_error());
}

fn regenerate(data: Value) -> (GenerationResult, GenerationResult) {
    let pipeline = pipeline();
    let first = pipeline.generate("module", data.clone(), None).unwrap();
    let existing = ExistingExtension::from_files(
        first
            .files
            .values()
            .map(|f| (f.path.clone(), f.content.clone())),
    );
    let second = pipeline.generate("module", data, Some(&existing)).unwrap();
    (first, second)
}

#[test]
fn test_regeneration_changes_nothing() {
    let (first, second) = regenerate(json!({
        "root_name": "test_module",
        "hooks": ["hook_help", "hook_install"],
        "update_functions": ["Add a column."],
        "services": [{"service_name": "alpha", "injected_services": ["current_user"]}],
        "readme": true,
    }));

    assert_eq!(first.paths(), second.paths());
    for (path, file) in &second.files {
        assert!(file.pre_existing, "{}", path);
        assert_eq!(file.hash, first.files[path].hash, "{} changed:\n{}", path, file.content);
    }
}

const HOOKS: &[&str] = &[
    "hook_help",
    "hook_cron",
    "hook_form_alter",
    "hook_tokens",
    "hook_token_info",
    "hook_install",
    "hook_uninstall",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_hook_subsets_regenerate_unchanged(selected in proptest::sample::subsequence(HOOKS, 1..HOOKS.len())) {
        let (first, second) = regenerate(json!({"root_name": "test_module", "hooks": selected}));
        prop_assert_eq!(first.paths(), second.paths());
        for (path, file) in &second.files {
            prop_assert_eq!(&file.content, &first.files[path].content);
        }
    }

    #[test]
    fn prop_every_hook_is_implemented_once(selected in proptest::sample::subsequence(HOOKS, 1..HOOKS.len())) {
        let result = generate(json!({"root_name": "test_module", "hooks": selected.clone()}));
        for hook in &selected {
            let function = format!("function test_module_{}(", hook.trim_start_matches("hook_"));
            let count: usize = result.files.values().map(|f| f.content.matches(&function).count()).sum();
            prop_assert_eq!(count, 1, "{}", function);
        }
    }
}

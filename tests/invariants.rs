//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees of the naming rewrite.

use std::io::Write;
use std::sync::Arc;

use littlefs_naming::{
    BuildConfig, BuildPipeline, ConfigEnv, NamingField, NamingTemplate, OutputConfig,
    OutputRecord, PipelineError,
};
use serde_json::json;

fn example_record() -> OutputRecord {
    OutputRecord::default()
        .with_field(NamingField::Asset, "assets/[name].[hash][extname]")
        .with_field(NamingField::Chunk, "chunks/[name].[hash].js")
        .with_field(NamingField::Entry, "[name].js")
}

fn run_build(config: &mut BuildConfig) {
    BuildPipeline::littlefs(ConfigEnv::build())
        .run_config(config)
        .unwrap();
}

#[test]
fn invariant_example_record_normalizes() {
    let mut config = BuildConfig::with_output(OutputConfig::Single(example_record()));
    run_build(&mut config);

    let out = serde_json::to_value(&config).unwrap();
    assert_eq!(
        out["build"]["rollupOptions"]["output"],
        json!({
            "assetFileNames": "assets/[name][extname]",
            "chunkFileNames": "chunks/[name].js",
            "entryFileNames": "[name].js"
        })
    );
}

#[test]
fn invariant_only_hash_segment_removed() {
    let templates = [
        ("x.[hash].js", "x.js"),
        ("static/[name].[hash].css", "static/[name].css"),
        (".[hash]", ""),
        ("[name].[hash]", "[name]"),
    ];
    for (input, expected) in templates {
        let t = NamingTemplate::pattern(input).normalized();
        assert_eq!(t.as_pattern(), Some(expected), "input {input}");
    }
}

#[test]
fn invariant_no_segment_is_idempotent() {
    for input in ["[name].js", "[name]-[hash].js", "", "assets/[name][extname]"] {
        let once = NamingTemplate::pattern(input).normalized();
        let twice = once.normalized();
        assert_eq!(once.as_pattern(), Some(input));
        assert_eq!(once, twice);
    }
}

#[test]
fn invariant_computed_reference_untouched() {
    let f = NamingTemplate::computed(|info| format!("{}.bin", info.name));
    let NamingTemplate::Computed(original) = &f else { unreachable!() };

    let record = OutputRecord::default().with_field(NamingField::Asset, f.clone());
    let mut config = BuildConfig::with_output(OutputConfig::Single(record));
    run_build(&mut config);

    match config.output().unwrap().records()[0].field(NamingField::Asset) {
        Some(NamingTemplate::Computed(after)) => assert!(Arc::ptr_eq(original, after)),
        other => panic!("expected computed template, got {:?}", other),
    }
}

#[test]
fn invariant_shape_preserved() {
    let mut single = BuildConfig::with_output(OutputConfig::Single(example_record()));
    run_build(&mut single);
    assert!(matches!(single.output(), Some(OutputConfig::Single(_))));

    let mut many = BuildConfig::with_output(OutputConfig::Many(vec![
        example_record(),
        OutputRecord::default().with_field(NamingField::Entry, "worker.[hash].js"),
        OutputRecord::default(),
    ]));
    run_build(&mut many);
    let Some(OutputConfig::Many(records)) = many.output() else {
        panic!("expected many records");
    };
    assert_eq!(records.len(), 3);
    assert_eq!(
        records[1].entry_file_names,
        Some(NamingTemplate::pattern("worker.js"))
    );
    assert_eq!(records[2], OutputRecord::default());
}

#[test]
fn invariant_absent_output_not_created() {
    for input in [
        json!({}),
        json!({"build": {}}),
        json!({"build": null}),
        json!({"build": {"rollupOptions": {}}}),
        json!({"build": {"rollupOptions": null}}),
        json!({"build": {"rollupOptions": {"output": null}}}),
    ] {
        let mut config: BuildConfig = serde_json::from_value(input.clone()).unwrap();
        let before = config.clone();
        run_build(&mut config);
        assert_eq!(config, before);
        assert!(config.output().is_none());
        assert_eq!(serde_json::to_value(&config).unwrap(), input);
    }
}

#[test]
fn invariant_malformed_output_passes_through() {
    for output in [
        json!(false),
        json!(""),
        json!(0),
        json!([{"entryFileNames": "[name].[hash].js"}, "x"]),
    ] {
        let input = json!({"build": {"rollupOptions": {"output": output}}});
        let mut config = BuildConfig::from_json_str(&input.to_string()).unwrap();

        let report = BuildPipeline::default().run_config(&mut config).unwrap();

        assert!(!report.naming_changed());
        assert!(report.diagnostics.is_empty());
        assert_eq!(serde_json::to_value(&config).unwrap(), input);
    }
}

#[test]
fn invariant_serve_leaves_config_alone() {
    let original = BuildConfig::with_output(OutputConfig::Single(example_record()));
    let mut config = original.clone();

    let report = BuildPipeline::littlefs(ConfigEnv::serve())
        .run_config(&mut config)
        .unwrap();

    assert_eq!(config, original);
    assert!(report.plugins.is_empty());
    assert!(!report.naming_changed());
}

#[test]
fn invariant_other_fields_untouched() {
    let input = json!({
        "base": "./",
        "build": {
            "outDir": "../data/www",
            "rollupOptions": {
                "external": ["fs"],
                "output": [
                    {"format": "es", "entryFileNames": "[name].[hash].js", "assetFileNames": 3},
                    {"format": "iife", "chunkFileNames": "[name].js"}
                ]
            }
        }
    });
    let mut config: BuildConfig = serde_json::from_value(input).unwrap();
    run_build(&mut config);

    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({
            "base": "./",
            "build": {
                "outDir": "../data/www",
                "rollupOptions": {
                    "external": ["fs"],
                    "output": [
                        {"format": "es", "entryFileNames": "[name].js", "assetFileNames": 3},
                        {"format": "iife", "chunkFileNames": "[name].js"}
                    ]
                }
            }
        })
    );
}

#[test]
fn invariant_repeated_builds_same_names() {
    let mut first = BuildConfig::with_output(OutputConfig::Single(example_record()));
    let mut second = first.clone();

    let r1 = BuildPipeline::default().run_config(&mut first).unwrap();
    let r2 = BuildPipeline::default().run_config(&mut second).unwrap();

    assert!(r1.naming_changed());
    assert_eq!(r1.naming_after, r2.naming_after);
    assert_ne!(r1.id, r2.id);
}

#[test]
fn invariant_residual_hash_reported_not_rewritten() {
    let record = OutputRecord::default().with_field(NamingField::Chunk, "[name]-[hash].js");
    let mut config = BuildConfig::with_output(OutputConfig::Single(record));

    let report = BuildPipeline::default().run_config(&mut config).unwrap();

    assert_eq!(
        config.output().unwrap().records()[0].chunk_file_names,
        Some(NamingTemplate::pattern("[name]-[hash].js"))
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].rule, "residual_hash");
}

#[test]
fn invariant_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"build": {{"rollupOptions": {{"output": {{"chunkFileNames": "c/[name].[hash].js"}}}}}}}}"#
    )
    .unwrap();

    let mut config = BuildConfig::load_from_path(file.path()).unwrap();
    run_build(&mut config);
    assert_eq!(
        config.output().unwrap().records()[0].chunk_file_names,
        Some(NamingTemplate::pattern("c/[name].js"))
    );
}

#[test]
fn invariant_missing_file_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BuildConfig::load_from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigRead { .. }));
}

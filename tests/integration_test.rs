//! Integration tests running the seed passes end to end against files

use seedcodes::report::append_reports;
use seedcodes::{run_passes, LookupTable, PassRegistry, PassReport, RunOptions, ToolConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/full_chain.sql");

/// Test helper copying the fixture into a fresh temp dir
fn setup_seed() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("test_3_recipes_full_chain.sql");
    fs::write(&path, FIXTURE).expect("Failed to write fixture");
    (temp_dir, path)
}

fn registry() -> PassRegistry {
    PassRegistry::with_defaults(&ToolConfig::default(), LookupTable::builtin().unwrap())
        .expect("Failed to build registry")
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn run(path: &PathBuf, passes: &[&str]) -> Vec<PassReport> {
    run_passes(&registry(), &names(passes), path, RunOptions::default())
        .expect("Failed to run passes")
        .reports
}

#[test]
fn test_annotate_fixture() {
    let (_temp_dir, path) = setup_seed();

    let reports = run(&path, &["annotate"]);
    let seed = fs::read_to_string(&path).unwrap();

    assert_eq!(reports[0].rewritten, 6);
    assert_eq!(reports[0].count("products"), 3);
    assert_eq!(reports[0].count("preparations"), 1);
    assert_eq!(reports[0].count("recipes"), 2);
    assert!(reports[0].misses.is_empty());

    assert!(seed.contains(
        "INSERT INTO products (code, name, name_ru, base_unit, base_cost_per_unit)\n\
         VALUES ('A-1', 'Water', 'Water', 'ml', 0.00);"
    ));
    assert!(seed.contains("VALUES ('P-16', 'Tuna portion 150g', 150, 'gram');"));
    assert!(seed.contains(
        "INSERT INTO recipes (code, name, category) VALUES ('R-7', 'TomYum', 'soup');"
    ));
    // relational inserts are not entity rows
    assert!(seed.contains("INSERT INTO recipe_components (recipe_id, component_id, quantity)\nVALUES (\n"));
}

#[test]
fn test_annotate_twice_is_a_no_op() {
    let (_temp_dir, path) = setup_seed();

    run(&path, &["annotate"]);
    let first = fs::read_to_string(&path).unwrap();
    let reports = run(&path, &["annotate"]);
    let second = fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
    assert!(!reports[0].changed);
}

#[test]
fn test_full_chain() {
    let (_temp_dir, path) = setup_seed();

    let reports = run(&path, &["annotate", "add-conflicts", "rewrite-refs"]);
    let seed = fs::read_to_string(&path).unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[1].rewritten, 7);
    assert_eq!(reports[2].rewritten, 4);
    assert_eq!(reports[2].misses, vec!["Z-9".to_string()]);
    assert_eq!(reports[2].count("products"), 3);

    assert!(!seed.contains("VALUES ('Water', 'Water', 'ml', 0.00)"));
    assert!(seed.contains("VALUES ('A-1', 'Water', 'Water', 'ml', 0.00) ON CONFLICT (code) DO NOTHING;"));
    assert!(seed.contains("(SELECT id FROM recipes WHERE name = 'TomYum'),"));
    assert!(seed.contains("(SELECT id FROM products WHERE name = 'Tom yam paste'),"));
    assert!(seed.contains("(SELECT id FROM preparations WHERE name = 'Tuna portion 150g'),"));
    assert!(seed.contains("  1\n) ON CONFLICT DO NOTHING;"));
    assert!(seed.contains("WHERE p.code = 'P-16' AND pr.code = 'M-2' ON CONFLICT DO NOTHING;"));
    assert!(seed.contains("SELECT id FROM products WHERE code = 'Z-9';"));
}

#[test]
fn test_chain_is_stable_on_rerun() {
    let (_temp_dir, path) = setup_seed();

    run(&path, &["annotate", "add-conflicts", "rewrite-refs"]);
    let first = fs::read_to_string(&path).unwrap();
    let reports = run(&path, &["annotate", "add-conflicts", "rewrite-refs"]);

    assert_eq!(fs::read_to_string(&path).unwrap(), first);
    assert!(reports.iter().all(|r| !r.changed));
}

#[test]
fn test_dry_run_leaves_file_untouched() {
    let (_temp_dir, path) = setup_seed();

    let summary = run_passes(
        &registry(),
        &names(&["annotate"]),
        &path,
        RunOptions {
            dry_run: true,
            backup: false,
        },
    )
    .unwrap();

    assert!(summary.changed());
    assert!(!summary.written);
    assert_eq!(fs::read_to_string(&path).unwrap(), FIXTURE);
}

#[test]
fn test_backup_keeps_original() {
    let (temp_dir, path) = setup_seed();

    let summary = run_passes(
        &registry(),
        &names(&["rewrite-refs"]),
        &path,
        RunOptions {
            dry_run: false,
            backup: true,
        },
    )
    .unwrap();

    let backup = temp_dir.path().join("test_3_recipes_full_chain.sql.bak");
    assert_eq!(summary.backup.as_ref(), Some(&backup));
    assert_eq!(fs::read_to_string(&backup).unwrap(), FIXTURE);
    assert_ne!(fs::read_to_string(&path).unwrap(), FIXTURE);
}

#[test]
fn test_custom_lookup_file() {
    let (temp_dir, path) = setup_seed();
    let lookup_path = temp_dir.path().join("lookup.yaml");
    fs::write(&lookup_path, "products:\n  Z-9: Sea salt\n").unwrap();

    let config_path = temp_dir.path().join("seedcodes.yaml");
    fs::write(&config_path, "lookup: lookup.yaml\n").unwrap();
    let config = ToolConfig::load_from_file(&config_path).unwrap();

    let lookup = config.resolve_lookup(None).unwrap();
    let registry = PassRegistry::with_defaults(&config, lookup).unwrap();
    let summary =
        run_passes(&registry, &names(&["rewrite-refs"]), &path, RunOptions::default()).unwrap();

    let seed = fs::read_to_string(&path).unwrap();
    assert!(seed.contains("SELECT id FROM products WHERE name = 'Sea salt';"));
    // the custom table replaces the built-in one entirely
    assert!(seed.contains("WHERE code = 'R-7'"));
    assert_eq!(summary.reports[0].rewritten, 1);
}

#[test]
fn test_reports_written_as_ndjson() {
    let (temp_dir, path) = setup_seed();
    let report_path = temp_dir.path().join("reports.ndjson");

    let reports = run(&path, &["annotate", "rewrite-refs"]);
    append_reports(&report_path, &reports).unwrap();

    let contents = fs::read_to_string(&report_path).unwrap();
    let parsed: Vec<PassReport> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(parsed, reports);
    assert_eq!(
        parsed[0].file.as_deref(),
        Some(path.display().to_string().as_str())
    );
}

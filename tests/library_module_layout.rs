use std::fs;
use std::path::Path;

#[test]
fn lib_root_exports_the_engine_modules() {
    let lib_rs = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/lib.rs");
    let source = fs::read_to_string(&lib_rs).expect("read src/lib.rs");

    for module in ["binder", "catalog", "exec", "generate", "run", "shared", "templates"] {
        assert!(
            source.contains(&format!("pub mod {module};")),
            "src/lib.rs must export `{module}`"
        );
    }
}

#[test]
fn engine_sources_do_not_reach_for_a_ui_layer() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut pending = vec![src];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("read src dir") {
            let entry = entry.expect("dir entry");
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
                continue;
            }
            let source = fs::read_to_string(&path).expect("read source file");
            assert!(
                !source.contains("ratatui") && !source.contains("crossterm"),
                "{} must not depend on terminal UI crates",
                path.display()
            );
        }
    }
}

//! Builds against real files in a temporary directory.

#[cfg(test)]
mod tests {
    use crate::{Bundle, BundleOptions, ErrorKind};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, code: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, code).unwrap();
    }

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "main.js",
            "import { square } from './lib/math';\nconsole.log(square(4));",
        );
        write(
            dir.path(),
            "lib/math.js",
            "export function square(n) { return n * n; }\nexport function cube(n) { return n * n * n; }",
        );
        dir
    }

    #[test]
    fn test_build_from_disk() {
        let dir = project();
        let entry = dir.path().join("main").display().to_string();
        let mut bundle = Bundle::new(BundleOptions::new(entry));

        let mut sink: Vec<u8> = Vec::new();
        let output = bundle.build(&mut sink).unwrap();

        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "function square(n) { return n * n; }\nconsole.log(square(4));"
        );
        assert_eq!(output.modules.len(), 2);
        assert!(bundle.module_by_path(dir.path().join("lib/math.js")).is_some());
    }

    #[test]
    fn test_options_from_json_build_from_disk() {
        let dir = project();
        let json = serde_json::json!({
            "entry": dir.path().join("main.js"),
            "separator": "\n\n",
        });
        let options = BundleOptions::from_json(&json.to_string()).unwrap();
        let output = crate::bundle(options).unwrap();

        assert_eq!(
            output.code,
            "function square(n) { return n * n; }\n\nconsole.log(square(4));"
        );
    }

    #[test]
    fn test_missing_file_on_disk() {
        let dir = project();
        write(
            dir.path(),
            "main.js",
            "import { square } from './lib/missing';\nconsole.log(square(4));",
        );
        let entry = dir.path().join("main.js").display().to_string();
        let err = Bundle::new(BundleOptions::new(entry)).run().unwrap_err();

        assert_eq!(err.kind, ErrorKind::ModuleNotFound);
        let expected = dir.path().join("lib/missing.js").display().to_string();
        assert_eq!(err.context.as_deref(), Some(expected.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use crx_packager::packager::{
        Error, PackInvocation, PackTool, Packager, RawOptions, Result, Settings, SettingsBuilder,
        ToolOutput, UpdateInfo,
    };
    use serde_json::json;
    use std::fs;
    use std::io::Read;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Stands in for the browser: writes `<dir>.crx` and, without a key, `<dir>.pem`.
    #[derive(Default)]
    struct FakeChrome {
        calls: Mutex<Vec<PackInvocation>>,
        exit_code: i32,
        skip_package: bool,
    }

    impl FakeChrome {
        fn failing(exit_code: i32) -> Self {
            Self {
                exit_code,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<PackInvocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PackTool for FakeChrome {
        async fn pack(&self, invocation: &PackInvocation) -> Result<ToolOutput> {
            self.calls.lock().unwrap().push(invocation.clone());

            if self.exit_code != 0 {
                return Ok(ToolOutput {
                    code: Some(self.exit_code),
                    stdout: String::new(),
                    stderr: "Manifest file is missing or unreadable".to_string(),
                });
            }

            let key = match &invocation.key {
                Some(key) => fs::read_to_string(key).unwrap(),
                None => {
                    let generated = format!("KEY-{}", self.calls.lock().unwrap().len());
                    fs::write(invocation.produced_key(), &generated).unwrap();
                    generated
                }
            };
            if !self.skip_package {
                fs::write(invocation.produced_package(), format!("Cr24 signed with {key}"))
                    .unwrap();
            }

            Ok(ToolOutput {
                code: Some(0),
                ..Default::default()
            })
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Project layout: sources in `src/`, staging in `src/build/ext`, outputs elsewhere.
    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        write(&src, "js/background.js", "chrome.runtime.onInstalled");
        write(&src, "js/lib/util.js", "export {}");
        write(&src, "images/icon.png", "PNG");
        write(&src, "popup.html", "<html></html>");
        write(&src, "README.md", "not shipped");
        temp
    }

    fn options() -> RawOptions {
        RawOptions {
            name: Some("ext".into()),
            chrome: Some("fake-chrome-for-tests".into()),
            cert_path: Some("keys/ext.pem".into()),
            crx_path: Some("dist/ext.crx".into()),
            build_dir: Some("src/build/ext".into()),
            zip_path: Some("dist/ext.zip".into()),
            cwd: Some("src".into()),
            ..Default::default()
        }
    }

    fn settings(root: &Path, options: RawOptions) -> Settings {
        SettingsBuilder::new()
            .options(options)
            .base_dir(root)
            .build()
            .unwrap()
    }

    fn zip_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_first_run_generates_and_relocates_key() {
        let temp = project();
        let root = temp.path();
        let packager = Packager::with_tool(settings(root, options()), FakeChrome::default());

        let report = packager.package().await.unwrap();

        assert!(report.key_generated);
        assert_eq!(report.crx, root.join("dist/ext.crx"));
        assert_eq!(fs::read_to_string(root.join("keys/ext.pem")).unwrap(), "KEY-1");
        assert!(!root.join("src/build/ext.crx").exists());
        assert!(!root.join("src/build/ext.pem").exists());
        assert_eq!(report.size, fs::metadata(&report.crx).unwrap().len());
        assert_eq!(report.checksum.len(), 64);
        assert_eq!(report.staged_files.len(), 4);
        assert_eq!(report.name, packager.settings().name());
    }

    #[tokio::test]
    async fn test_second_run_reuses_key() {
        let temp = project();
        let root = temp.path();
        let tool = FakeChrome::default();
        let packager = Packager::with_tool(settings(root, options()), tool);

        let first = packager.package().await.unwrap();
        let key_before = fs::read_to_string(root.join("keys/ext.pem")).unwrap();
        let second = packager.package().await.unwrap();

        assert!(first.key_generated);
        assert!(!second.key_generated);
        assert_eq!(
            fs::read_to_string(root.join("keys/ext.pem")).unwrap(),
            key_before
        );
        assert_eq!(first.checksum, second.checksum);
    }

    #[tokio::test]
    async fn test_invocation_passes_existing_key() {
        let temp = project();
        let root = temp.path();
        write(root, "keys/ext.pem", "EXISTING");
        let tool = FakeChrome::default();
        let packager = Packager::with_tool(settings(root, options()), tool);

        packager.package().await.unwrap();

        let crx = fs::read_to_string(root.join("dist/ext.crx")).unwrap();
        assert_eq!(crx, "Cr24 signed with EXISTING");
    }

    #[tokio::test]
    async fn test_tool_failure_leaves_outputs_untouched() {
        let temp = project();
        let root = temp.path();
        write(root, "dist/ext.crx", "previous package");
        let mut opts = options();
        opts.clean = Some(true);
        let packager = Packager::with_tool(settings(root, opts), FakeChrome::failing(1));

        let err = packager.package().await.unwrap_err();

        assert!(matches!(err, Error::PackToolFailed { code: Some(1), .. }));
        assert!(err.is_recoverable());
        assert_eq!(
            fs::read_to_string(root.join("dist/ext.crx")).unwrap(),
            "previous package"
        );
        assert!(!root.join("keys/ext.pem").exists());
        // The staged tree stays for inspection even with clean enabled.
        assert!(root.join("src/build/ext/popup.html").exists());
    }

    #[tokio::test]
    async fn test_missing_package_output_is_reported() {
        let temp = project();
        let root = temp.path();
        let tool = FakeChrome {
            skip_package: true,
            ..Default::default()
        };
        let packager = Packager::with_tool(settings(root, options()), tool);

        let err = packager.package().await.unwrap_err();
        assert!(matches!(err, Error::MissingOutput { kind: "package", .. }));
        assert!(!root.join("keys/ext.pem").exists());
    }

    #[tokio::test]
    async fn test_sign_without_stage_does_not_run_tool() {
        let temp = project();
        let root = temp.path();
        let settings = settings(root, options());
        let tool = FakeChrome::default();

        let err = crx_packager::packager::sign::sign_extension(&settings, &tool)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingStage { .. }));
        assert!(tool.calls().is_empty());
    }

    #[tokio::test]
    async fn test_archive_entries_are_rooted_at_name() {
        let temp = project();
        let root = temp.path();
        let mut opts = options();
        opts.manifest = json!({ "name": "Ext", "version": "1.0.0", "manifest_version": 3 })
            .as_object()
            .cloned();
        let packager = Packager::with_tool(settings(root, opts), FakeChrome::default());

        let report = packager.package().await.unwrap();
        let names = zip_names(&report.zip);

        assert!(names.iter().all(|name| name.starts_with("ext/")));
        assert!(names.contains(&"ext/".to_string()));
        assert!(names.contains(&"ext/js/lib/util.js".to_string()));
        assert!(names.contains(&"ext/manifest.json".to_string()));
        assert!(!names.iter().any(|name| name.ends_with("README.md")));
        assert_eq!(names.len(), report.zip_entries);
    }

    #[tokio::test]
    async fn test_metadata_written_into_stage_and_archive() {
        let temp = project();
        let root = temp.path();
        let mut opts = options();
        opts.manifest = json!({ "name": "Ext", "version": "2.0.0" }).as_object().cloned();
        opts.update_url = Some("https://cdn.example.com/ext/update.xml".into());
        opts.update = Some(UpdateInfo {
            id: "abcdefghijklmnopabcdefghijklmnop".into(),
            url: "https://cdn.example.com/ext/".into(),
            version: "2.0.0".into(),
        });
        let packager = Packager::with_tool(settings(root, opts), FakeChrome::default());

        let report = packager.package().await.unwrap();
        assert_eq!(report.metadata_files.len(), 2);

        let staged = fs::read_to_string(root.join("src/build/ext/manifest.json")).unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&staged).unwrap();
        assert_eq!(manifest["update_url"], "https://cdn.example.com/ext/update.xml");

        let mut archive = zip::ZipArchive::new(fs::File::open(&report.zip).unwrap()).unwrap();
        let mut xml = String::new();
        archive
            .by_name("ext/update.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains(r#"codebase="https://cdn.example.com/ext/ext.crx""#));
        assert!(xml.contains(r#"version="2.0.0""#));
    }

    #[tokio::test]
    async fn test_stale_build_files_are_removed() {
        let temp = project();
        let root = temp.path();
        write(root, "src/build/ext/stale.js", "old");
        let packager = Packager::with_tool(settings(root, options()), FakeChrome::default());

        packager.package().await.unwrap();

        assert!(!root.join("src/build/ext/stale.js").exists());
        assert!(root.join("src/build/ext/js/background.js").exists());
    }

    #[tokio::test]
    async fn test_clean_removes_build_dir() {
        let temp = project();
        let root = temp.path();
        let mut opts = options();
        opts.clean = Some(true);
        let packager = Packager::with_tool(settings(root, opts), FakeChrome::default());

        let report = packager.package().await.unwrap();

        assert!(report.cleaned);
        assert!(!root.join("src/build/ext").exists());
        assert!(root.join("dist/ext.crx").exists());
        assert!(root.join("dist/ext.zip").exists());
    }

    #[tokio::test]
    async fn test_two_clean_runs_are_idempotent() {
        let temp = project();
        let root = temp.path();
        let mut opts = options();
        opts.build_dir = Some(PathBuf::from("build/ext"));
        opts.clean = Some(true);
        let packager = Packager::with_tool(settings(root, opts), FakeChrome::default());

        let first = packager.package().await.unwrap();
        let key = fs::read_to_string(root.join("keys/ext.pem")).unwrap();
        let second = packager.package().await.unwrap();

        assert!(first.cleaned);
        assert!(second.cleaned);
        assert!(first.key_generated);
        assert!(!second.key_generated);
        assert_eq!(fs::read_to_string(root.join("keys/ext.pem")).unwrap(), key);
        assert!(root.join("dist/ext.crx").is_file());
        assert!(!root.join("build/ext").exists());
    }

    #[tokio::test]
    async fn test_outputs_already_in_place_are_kept() {
        let temp = project();
        let root = temp.path();
        let mut opts = options();
        opts.build_dir = Some(PathBuf::from("build/ext"));
        opts.crx_path = Some(PathBuf::from("build/ext.crx"));
        opts.cert_path = Some(PathBuf::from("build/ext.pem"));
        let packager = Packager::with_tool(settings(root, opts), FakeChrome::default());

        let report = packager.package().await.unwrap();

        assert!(report.key_generated);
        assert_eq!(fs::read_to_string(root.join("build/ext.pem")).unwrap(), "KEY-1");
        assert_eq!(
            fs::read_to_string(root.join("build/ext.crx")).unwrap(),
            "Cr24 signed with KEY-1"
        );
        assert_eq!(report.size, fs::metadata(root.join("build/ext.crx")).unwrap().len());
    }

    #[tokio::test]
    async fn test_build_dir_outside_project_requires_force() {
        let temp = project();
        let root = temp.path();
        write(root, "out/ext/old.js", "old");
        let project_dir = root.join("project");
        fs::create_dir_all(&project_dir).unwrap();
        let mut opts = options();
        opts.cwd = Some(root.join("src"));
        opts.build_dir = Some(root.join("out/ext"));

        let refused =
            Packager::with_tool(settings(&project_dir, opts.clone()), FakeChrome::default());
        let err = refused.package().await.unwrap_err();
        assert!(matches!(err, Error::DeletionRefused { .. }));
        assert!(root.join("out/ext/old.js").exists());

        opts.force = Some(true);
        let forced = Packager::with_tool(settings(&project_dir, opts), FakeChrome::default());
        forced.package().await.unwrap();
        assert!(!root.join("out/ext/old.js").exists());
        assert!(project_dir.join("dist/ext.crx").exists());
    }

    #[tokio::test]
    async fn test_invalid_update_url_aborts_before_signing() {
        let temp = project();
        let root = temp.path();
        let mut opts = options();
        opts.update = Some(UpdateInfo {
            id: "abcdefghijklmnopabcdefghijklmnop".into(),
            url: "ftp://cdn.example.com/ext/".into(),
            version: "1.0.0".into(),
        });
        let tool = FakeChrome::default();
        let packager = Packager::with_tool(settings(root, opts), tool);

        let err = packager.package().await.unwrap_err();
        assert!(matches!(err, Error::InvalidUpdateUrl { .. }));
        assert!(!root.join("dist/ext.crx").exists());
    }
}

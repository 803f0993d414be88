//! Integration tests for Proxima

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const LOCAL_CONFIG: &str = r#"
[cache]
dir = "build/cache"

[[proxies]]
group = "test"
name = "hello"
tags = ["img"]
command = ["sh", "-c", "printf hello > \"$1\"", "sh", "{output}"]

[[proxies]]
group = "mime"
name = "hello"
tags = ["img"]
command = ["true"]
content_type = "text/plain"
"#;

    /// A project with one image and two command proxies
    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("_assets/subdir")).unwrap();
        fs::write(dir.path().join("_assets/ruby.png"), b"\x89PNG ruby").unwrap();
        fs::write(dir.path().join("_assets/subdir/ubuntu.png"), b"\x89PNG ubuntu").unwrap();
        fs::write(dir.path().join(".proxima.toml"), LOCAL_CONFIG).unwrap();
        dir
    }

    /// Binary isolated from any user-level config
    fn proxima(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("proxima");
        cmd.current_dir(dir)
            .env("PROXIMA_CONFIG", dir.join("global.toml"))
            .env("CI", "1");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        proxima(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached proxy transforms for site assets"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        proxima(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("proxima"));
    }

    #[test]
    fn config_path_honours_env() {
        let dir = TempDir::new().unwrap();
        proxima(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("global.toml"));
    }

    #[test]
    fn config_show_merges_local() {
        let dir = project();
        proxima(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("build/cache"));
    }

    #[test]
    fn config_init_writes_global() {
        let dir = TempDir::new().unwrap();
        proxima(dir.path()).args(["config", "init"]).assert().success();
        assert!(dir.path().join("global.toml").exists());
    }

    #[test]
    fn proxies_lists_configured() {
        let dir = project();
        proxima(dir.path())
            .arg("proxies")
            .assert()
            .success()
            .stdout(predicate::str::contains("test:hello"))
            .stdout(predicate::str::contains("mime:hello"));
    }

    #[test]
    fn resolve_then_hit() {
        let dir = project();
        proxima(dir.path())
            .args(["resolve", "ruby.png test:hello", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"miss\""));

        proxima(dir.path())
            .args(["resolve", "ruby.png test:hello", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"hit\""));

        let entries: Vec<_> = fs::read_dir(dir.path().join("build/cache"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().unwrap().is_file())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read(entries[0].path()).unwrap(), b"hello");
    }

    #[test]
    fn resolve_many_plain() {
        let dir = project();
        proxima(dir.path())
            .args([
                "resolve",
                "ruby.png mime:hello test:hello",
                "subdir/ubuntu.png test:hello",
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("/assets/ruby-"))
            .stdout(predicate::str::contains("/assets/subdir/ubuntu-"));
    }

    #[test]
    fn digest_does_not_run_proxies() {
        let dir = project();
        proxima(dir.path())
            .args(["digest", "ruby.png test:hello"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ruby-"))
            .stdout(predicate::str::is_match(r"cached:\s+no").unwrap());
        assert!(!dir.path().join("build/cache").exists());
    }

    #[test]
    fn unknown_proxy_fails_with_hint() {
        let dir = project();
        proxima(dir.path())
            .args(["resolve", "ruby.png nope:missing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown proxy nope:missing"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn resolve_reports_each_failure_and_keeps_successes() {
        let dir = project();
        proxima(dir.path())
            .args([
                "resolve",
                "ruby.png test:hello",
                "ruby.png nope:missing",
                "--format",
                "plain",
            ])
            .assert()
            .failure()
            .stdout(predicate::str::contains("/assets/ruby-"))
            .stderr(predicate::str::contains("ruby.png nope:missing"))
            .stderr(predicate::str::contains("Unknown proxy nope:missing"))
            .stderr(predicate::str::contains("1 of 2 tags failed"));
    }

    #[test]
    fn missing_asset_fails() {
        let dir = project();
        proxima(dir.path())
            .args(["resolve", "absent.png test:hello"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("absent.png"));
    }

    #[test]
    fn cache_list_and_clear() {
        let dir = project();
        proxima(dir.path())
            .args(["resolve", "ruby.png test:hello"])
            .assert()
            .success();

        proxima(dir.path())
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("ruby-"));

        proxima(dir.path())
            .args(["cache", "clear", "--yes"])
            .assert()
            .success();

        proxima(dir.path())
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached entries"));
    }

    #[test]
    fn cache_remove_missing_fails() {
        let dir = project();
        proxima(dir.path())
            .args(["cache", "remove", "ruby-none.png"])
            .assert()
            .failure();
    }

    #[test]
    fn no_local_ignores_project_config() {
        let dir = project();
        proxima(dir.path())
            .args(["--no-local", "proxies"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No proxies configured"));
    }
}

mod resolution_tests {
    use proxima::cache::fingerprint;
    use proxima::{
        transform, AssetFinder, CacheStore, Env, ProxiedAsset, ProxyArgs, ProxyInvocation,
        ProxyRegistry, WorkingAsset,
    };
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Site {
        _dir: TempDir,
        env: Env,
        runs: Arc<AtomicUsize>,
    }

    fn site() -> Site {
        let dir = TempDir::new().unwrap();
        let sources = dir.path().join("_assets");
        fs::create_dir_all(sources.join("subdir")).unwrap();
        fs::write(sources.join("ruby.png"), b"\x89PNG ruby").unwrap();
        fs::write(sources.join("subdir/foo.png"), b"\x89PNG foo").unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut registry = ProxyRegistry::new();
        registry
            .register_fn("test", "hello", &[], move |_asset, _opts, _args| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(transform(|asset: WorkingAsset| {
                    fs::write(asset.filename(), "hello")?;
                    Ok(asset)
                }))
            })
            .unwrap();
        registry
            .register_fn("mime", "hello", &[], |_asset, _opts, _args| {
                Ok(transform(|mut asset: WorkingAsset| {
                    asset.set_content_type("text/plain");
                    Ok(asset)
                }))
            })
            .unwrap();

        let env = Env::new(
            AssetFinder::new(vec![sources]),
            registry,
            CacheStore::new(dir.path().join("cache")),
        );
        Site {
            _dir: dir,
            env,
            runs,
        }
    }

    fn resolve(site: &Site, body: &str) -> ProxiedAsset {
        site.env.resolve_tag("img", body).unwrap()
    }

    #[test]
    fn hello_is_written_to_file() {
        let site = site();
        let proxied = resolve(&site, "ruby.png test:hello");
        assert_eq!(fs::read(proxied.filename()).unwrap(), b"hello");
        assert_eq!(proxied.source(), b"hello");
    }

    #[test]
    fn content_type_survives_second_resolution() {
        let site = site();
        let first = resolve(&site, "ruby.png mime:hello test:hello");
        assert_eq!(first.content_type(), "text/plain");
        assert!(first.is_cached());

        let second = resolve(&site, "ruby.png mime:hello test:hello");
        assert!(second.is_cached());
        assert_eq!(second.filename(), first.filename());
        assert_eq!(second.content_type(), "text/plain");
        assert_eq!(second.source(), first.source());
        assert_eq!(site.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn logical_path_matches_digest_path() {
        let site = site();
        for body in ["ruby.png test:hello", "subdir/foo.png mime:hello"] {
            let proxied = resolve(&site, body);
            assert_eq!(proxied.logical_path(), proxied.digest_path());
        }
    }

    #[test]
    fn subdir_is_preserved() {
        let site = site();
        let proxied = resolve(&site, "subdir/foo.png test:hello");
        assert!(proxied.logical_path().starts_with("subdir/"));
        assert!(proxied.logical_path().ends_with(".png"));
    }

    #[test]
    fn digest_is_request_fingerprint() {
        let site = site();
        let proxied = resolve(&site, "ruby.png mime:hello test:hello");
        let args = ProxyArgs::new(vec![
            ProxyInvocation::new("mime", "hello", None).unwrap(),
            ProxyInvocation::new("test", "hello", None).unwrap(),
        ]);
        assert_eq!(proxied.digest(), fingerprint(&args));
        assert_ne!(proxied.digest(), proxied.content_digest());
    }

    #[test]
    fn deleted_file_is_not_cached_and_recreated() {
        let site = site();
        let first = resolve(&site, "ruby.png test:hello");
        fs::remove_file(first.filename()).unwrap();
        assert!(!first.is_cached());

        let again = resolve(&site, "ruby.png test:hello");
        assert!(again.is_cached());
        assert_eq!(again.filename(), first.filename());
        assert_eq!(fs::read(again.filename()).unwrap(), b"hello");
    }

    #[test]
    fn concurrent_resolutions_agree() {
        let site = site();
        let results: Vec<ProxiedAsset> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let env = &site.env;
                    scope.spawn(move || {
                        let body = if i % 2 == 0 {
                            "ruby.png test:hello"
                        } else {
                            "subdir/foo.png mime:hello test:hello"
                        };
                        env.resolve_tag("img", body).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for proxied in &results {
            assert!(proxied.is_cached());
            assert_eq!(fs::read(proxied.filename()).unwrap(), b"hello");
        }
        assert_eq!(site.env.store().entries().unwrap().len(), 2);
    }
}

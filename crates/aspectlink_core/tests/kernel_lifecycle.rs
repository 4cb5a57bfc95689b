use aspectlink_core::{
    AnnotationRegistry, AnnotationResolver, AspectContainer, CacheClearEvent, CacheState,
    CacheStateProvider, ClassLoader, HostConfig, KernelLifecycleManager, LoadResult, LoaderChain,
    SourceIncluder, WeaverConfig, WeaverError, WeavingEngine,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

struct StubComposer;

impl ClassLoader for StubComposer {
    fn loader_id(&self) -> &str {
        "composer"
    }

    fn autoload(&self, _class_name: &str) -> LoadResult<()> {
        Ok(())
    }

    fn is_class_defined(&self, _class_name: &str) -> bool {
        false
    }
}

struct EmptyCacheProvider;

impl CacheStateProvider for EmptyCacheProvider {
    fn query_cache_state(&self) -> CacheState {
        CacheState::default()
    }
}

struct CountingWeaver {
    init_calls: Mutex<Vec<WeaverConfig>>,
    fail_init: bool,
}

impl CountingWeaver {
    fn new() -> Self {
        Self {
            init_calls: Mutex::new(Vec::new()),
            fail_init: false,
        }
    }

    fn failing() -> Self {
        Self {
            init_calls: Mutex::new(Vec::new()),
            fail_init: true,
        }
    }

    fn init_configs(&self) -> Vec<WeaverConfig> {
        self.init_calls.lock().unwrap().clone()
    }
}

impl WeavingEngine for CountingWeaver {
    fn initialize(&self, config: &WeaverConfig) -> Result<(), WeaverError> {
        if self.fail_init {
            return Err(WeaverError::Initialize("engine unavailable".to_string()));
        }
        self.init_calls.lock().unwrap().push(config.clone());
        Ok(())
    }

    fn rewrite(&self, path: &Path) -> Result<PathBuf, WeaverError> {
        Ok(path.to_path_buf())
    }
}

struct NoopAnnotations;

impl AnnotationRegistry for NoopAnnotations {
    fn register_resolver(&self, _resolver: Arc<dyn AnnotationResolver>) {}
}

struct NoopIncluder;

impl SourceIncluder for NoopIncluder {
    fn include(&self, _path: &Path) -> LoadResult<()> {
        Ok(())
    }
}

fn container(weaver: Arc<CountingWeaver>) -> AspectContainer {
    AspectContainer::new(
        Arc::new(EmptyCacheProvider),
        weaver,
        Arc::new(NoopAnnotations),
        Arc::new(NoopIncluder),
    )
}

fn config(base_dir: &Path, cache_base_dir: &Path) -> HostConfig {
    HostConfig {
        developer_mode: false,
        use_aop_cache: true,
        base_dir: base_dir.to_path_buf(),
        cache_base_dir: cache_base_dir.to_path_buf(),
        compiler_include_path: None,
        include_paths: vec![],
        source_extension: "php".to_string(),
        original_loader_id: "composer".to_string(),
        loader_install_dir: Some(base_dir.join("vendor/composer")),
    }
}

#[test]
fn initialize_kernel_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let weaver = Arc::new(CountingWeaver::new());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver.clone()))
            .unwrap();

    manager.initialize_kernel().unwrap();
    manager.initialize_kernel().unwrap();

    assert!(manager.state().is_initialized());
    assert_eq!(weaver.init_configs().len(), 1);
}

#[test]
fn initialize_kernel_computes_debug_cache_dir_and_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let weaver = Arc::new(CountingWeaver::new());
    let mut host_config = config(dir.path(), dir.path());
    host_config.use_aop_cache = false;
    let manager = KernelLifecycleManager::new(host_config, container(weaver.clone())).unwrap();

    manager.initialize_kernel().unwrap();

    let configs = weaver.init_configs();
    assert_eq!(configs.len(), 1);
    // Cache disabled forces debug even without developer mode.
    assert!(configs[0].debug);
    assert_eq!(configs[0].cache_dir, dir.path().join("aop"));
    assert!(configs[0].exclude_paths.contains(&dir.path().join("app")));
    assert!(configs[0].exclude_paths.contains(&dir.path().join("lib")));
    assert!(configs[0]
        .exclude_paths
        .contains(&dir.path().join("vendor/composer")));
}

#[test]
fn failed_engine_initialization_leaves_kernel_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let weaver = Arc::new(CountingWeaver::failing());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver)).unwrap();

    assert!(manager.initialize_kernel().is_err());
    assert!(!manager.state().is_initialized());

    let mut chain = LoaderChain::new();
    chain.register(Arc::new(StubComposer)).unwrap();
    assert!(!manager.register_autoloader(&mut chain).unwrap());
    assert!(!manager.state().is_registered());
}

#[test]
fn register_autoloader_runs_once_after_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let weaver = Arc::new(CountingWeaver::new());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver)).unwrap();

    let mut chain = LoaderChain::new();
    chain.register(Arc::new(StubComposer)).unwrap();

    // Not initialized yet: nothing happens.
    assert!(!manager.register_autoloader(&mut chain).unwrap());
    assert!(!manager.state().is_registered());

    manager.initialize_kernel().unwrap();
    assert!(manager.register_autoloader(&mut chain).unwrap());
    assert!(manager.state().is_registered());

    // Second call is a guarded no-op.
    assert!(!manager.register_autoloader(&mut chain).unwrap());
    assert_eq!(chain.len(), 1);
}

#[test]
fn register_autoloader_marks_registered_even_without_target() {
    let dir = tempfile::tempdir().unwrap();
    let weaver = Arc::new(CountingWeaver::new());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver)).unwrap();

    manager.initialize_kernel().unwrap();

    let mut chain = LoaderChain::new();
    assert!(!manager.register_autoloader(&mut chain).unwrap());
    assert!(manager.state().is_registered());
}

#[test]
fn purge_cache_is_idempotent_and_keeps_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("aop");
    fs::create_dir_all(cache_dir.join("proxies/deep")).unwrap();
    fs::write(cache_dir.join("proxies/deep/Order.php"), "<?php").unwrap();
    fs::write(cache_dir.join("index.php"), "<?php").unwrap();

    let weaver = Arc::new(CountingWeaver::new());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver)).unwrap();

    manager.purge_cache(&CacheClearEvent::all()).unwrap();
    manager.purge_cache(&CacheClearEvent::for_type("aop")).unwrap();

    assert!(cache_dir.is_dir());
    assert_eq!(fs::read_dir(&cache_dir).unwrap().count(), 0);
}

#[test]
fn purge_cache_ignores_other_cache_types() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("aop");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("Order.php"), "<?php").unwrap();

    let weaver = Arc::new(CountingWeaver::new());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver)).unwrap();

    manager
        .purge_cache(&CacheClearEvent::for_type("layout"))
        .unwrap();

    assert_eq!(fs::read_dir(&cache_dir).unwrap().count(), 1);
}

#[test]
fn purge_cache_tolerates_missing_cache_directory() {
    let dir = tempfile::tempdir().unwrap();
    let weaver = Arc::new(CountingWeaver::new());
    let manager =
        KernelLifecycleManager::new(config(dir.path(), dir.path()), container(weaver)).unwrap();

    manager.purge_cache(&CacheClearEvent::all()).unwrap();
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::models::RunResult;
use crate::runner::TestRunner;

/// Key for memoized runs. Results are cached per `(path, keyword)` pair;
/// invalidation is manual (the `force` flag on the run endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    pub project: PathBuf,
    pub keyword: Option<String>,
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<dyn TestRunner>,
    pub project: PathBuf,
    cache: Arc<Mutex<HashMap<RunKey, Arc<RunResult>>>>,
}

impl AppState {
    pub fn new(runner: Arc<dyn TestRunner>, project: PathBuf) -> Self {
        Self {
            runner,
            project,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn key(&self, keyword: Option<&str>) -> RunKey {
        RunKey {
            project: self.project.clone(),
            keyword: keyword.map(str::to_string),
        }
    }

    pub fn cached(&self, keyword: Option<&str>) -> Option<Arc<RunResult>> {
        self.cache.lock().unwrap().get(&self.key(keyword)).cloned()
    }

    pub fn store(&self, keyword: Option<&str>, run: RunResult) -> Arc<RunResult> {
        let run = Arc::new(run);
        self.cache
            .lock()
            .unwrap()
            .insert(self.key(keyword), Arc::clone(&run));
        run
    }
}

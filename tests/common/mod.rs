#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use basket_budget::{
    core::SessionManager,
    storage::{JsonStorage, SessionStore},
    utils::PathResolver,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Unique data directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens the session persisted under `base`, as the shell would.
pub fn open_session(base: &PathBuf) -> SessionManager {
    let storage = JsonStorage::open(PathResolver::session_file_in(base)).expect("open json storage");
    let (session, _report) =
        SessionManager::open(SessionStore::new(Box::new(storage))).expect("open session");
    session
}

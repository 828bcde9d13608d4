//! Shared helpers: a tiny scripted host and fixture trees.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use autoload::{Definition, Host, LoadError, Materialize, QualifiedName, Resolver, Result};
use filetime::FileTime;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tempfile::TempDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Class,
    Module,
}

/// What the scripted host defines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub name: QualifiedName,
    pub kind: UnitKind,
    pub version: u32,
    /// Enclosing namespace handed over by the resolver.
    pub namespace: Option<QualifiedName>,
}

impl Definition for Unit {
    fn name(&self) -> &QualifiedName {
        &self.name
    }
}

/// Host understanding one statement per line:
///
/// ```text
/// define Some::Name   # define this name instead of the requested one
/// version 2           # version reported by the unit
/// require Other       # resolve another name while loading
/// sleep 50            # hold the load open for 50 ms
/// ```
#[derive(Debug, Default)]
pub struct ScriptHost {
    /// Every materialize call, in order, with whether it was a redefinition.
    pub calls: Mutex<Vec<(QualifiedName, bool)>>,
    /// The host's own symbol table.
    pub defined: Mutex<IndexMap<String, Unit>>,
}

impl ScriptHost {
    pub fn materialized(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(_, redefined)| !redefined)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn redefinitions(&self) -> usize {
        self.calls.lock().iter().filter(|(_, r)| *r).count()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.lock().contains_key(name)
    }
}

impl Host for ScriptHost {
    type Definition = Unit;

    fn materialize(&self, resolver: &Resolver<Self>, request: Materialize<'_, Unit>) -> Result<Unit> {
        self.calls
            .lock()
            .push((request.name().clone(), request.is_redefinition()));

        let namespace = match &request {
            Materialize::Define { namespace, .. } => namespace.map(|ns| ns.name.clone()),
            Materialize::Redefine { previous, .. } => previous.namespace.clone(),
        };

        let mut name = request.name().clone();
        let mut version = 1;
        for line in request.source().content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("define ") {
                name = QualifiedName::parse(rest.trim())?;
            } else if let Some(rest) = line.strip_prefix("version ") {
                version = rest.trim().parse().map_err(LoadError::host)?;
            } else if let Some(rest) = line.strip_prefix("sleep ") {
                let millis = rest.trim().parse().map_err(LoadError::host)?;
                std::thread::sleep(Duration::from_millis(millis));
            } else if let Some(rest) = line.strip_prefix("require ") {
                resolver.resolve_str(rest.trim())?;
            } else {
                return Err(LoadError::host(format!("unknown statement: {line}")));
            }
        }

        let unit = Unit {
            name,
            kind: UnitKind::Class,
            version,
            namespace,
        };
        self.defined.lock().insert(unit.name.to_string(), unit.clone());
        Ok(unit)
    }

    fn namespace(&self, name: &QualifiedName, parent: Option<&Unit>) -> Result<Unit> {
        let unit = Unit {
            name: name.clone(),
            kind: UnitKind::Module,
            version: 0,
            namespace: parent.map(|p| p.name.clone()),
        };
        self.defined.lock().insert(unit.name.to_string(), unit.clone());
        Ok(unit)
    }
}

/// Write `files` (relative path, content) under a fresh temp dir.
pub fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        write(dir.path(), rel, content);
    }
    dir
}

pub fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Move a file's modification time `secs` seconds into the future.
///
/// Filesystem timestamps are too coarse to tell quick successive writes
/// apart, so tests set them explicitly.
pub fn touch_ahead(path: &Path, secs: u64) {
    let when = SystemTime::now() + Duration::from_secs(secs);
    filetime::set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

pub fn set_mtime(path: &Path, when: SystemTime) {
    filetime::set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

pub fn name(s: &str) -> QualifiedName {
    QualifiedName::parse(s).unwrap()
}

/// A resolver over `root`, watched.
pub fn resolver_for(root: &Path) -> Resolver<ScriptHost> {
    let resolver = Resolver::new(ScriptHost::default());
    resolver.add_path(root).unwrap();
    resolver
}

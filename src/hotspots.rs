// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Persisted per-directory `cursor-hotspots.json`: records each rendered
//! cursor's final hotspot so a later `--update-existing` run can compare
//! against it without re-rasterizing. Read once per directory, mutated only
//! by the worker that owns that directory, written back with an atomic
//! rename so a crash mid-run never leaves a half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const FILE_NAME: &str = "cursor-hotspots.json";

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Hotspot {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HotspotLedger(BTreeMap<String, Hotspot>);

impl HotspotLedger {
    pub fn load(dir: &Path) -> io::Result<Self> {
        match fs::read_to_string(dir.join(FILE_NAME)) {
            Ok(contents) => Ok(serde_json::from_str(&contents).unwrap_or_default()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HotspotLedger::default()),
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, cursor_name: &str) -> Option<Hotspot> {
        self.0.get(cursor_name).copied()
    }

    pub fn set(&mut self, cursor_name: impl Into<String>, hotspot: Hotspot) {
        self.0.insert(cursor_name.into(), hotspot);
    }

    /// Serializes to a temp file in the same directory and renames it over
    /// the ledger, so a reader never observes a partially written file.
    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let final_path = dir.join(FILE_NAME);
        let tmp_path = final_path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&self.0)?;
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

pub fn ledger_path(dir: &Path) -> PathBuf {
    dir.join(FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = HotspotLedger::load(dir.path()).unwrap();
        assert!(ledger.get("pointer").is_none());

        ledger.set("pointer", Hotspot { x: 4, y: 4 });
        ledger.save(dir.path()).unwrap();

        let reloaded = HotspotLedger::load(dir.path()).unwrap();
        assert_eq!(reloaded.get("pointer"), Some(Hotspot { x: 4, y: 4 }));
    }

    #[test]
    fn missing_ledger_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HotspotLedger::load(dir.path()).unwrap();
        assert!(ledger.get("anything").is_none());
    }
}

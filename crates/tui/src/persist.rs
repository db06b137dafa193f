use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::BaseDirs;
use glow_core::SelectionSet;

/// Where the selection lives on this machine. `None` when the platform gives
/// us no base directories; the session then runs without persistence.
pub fn selection_path() -> Option<PathBuf> {
    let base = BaseDirs::new()?;
    Some(base.data_dir().join("glow").join("selection.json"))
}

pub fn load_selection(path: &Path) -> Result<SelectionSet> {
    if !path.exists() {
        return Ok(SelectionSet::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("read selection file: {}", path.display()))?;
    Ok(SelectionSet::from_json(&data))
}

/// Rewrite the persisted selection after every toggle or removal. Atomic via
/// tmp file + rename so a crash mid-write cannot truncate the stored set.
pub fn save_selection(path: &Path, selection: &SelectionSet) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let data = selection.to_json();
    let mut tmp = path.to_path_buf();
    tmp.set_extension("json.tmp");
    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create tmp: {}", tmp.display()))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
    }
    fs::rename(tmp, path).with_context(|| format!("persist selection to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glow-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn selection_round_trips_through_the_store() {
        let path = scratch_path("roundtrip");
        let mut s = SelectionSet::new();
        s.toggle("vitamin-c-serum");
        s.toggle("clay-mask");
        save_selection(&path, &s).unwrap();
        let loaded = load_selection(&path).unwrap();
        assert_eq!(loaded, s);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_store_loads_an_empty_selection() {
        let loaded = load_selection(&scratch_path("absent")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn toggling_twice_restores_the_stored_form() {
        let path = scratch_path("involution");
        let mut s = SelectionSet::new();
        s.toggle("toner");
        save_selection(&path, &s).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        s.toggle("clay-mask");
        save_selection(&path, &s).unwrap();
        s.toggle("clay-mask");
        save_selection(&path, &s).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        fs::remove_file(&path).unwrap();
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Board configuration: page geometry, FeRAM file size, UDP ports, and the
//! device roster, loaded from an optional TOML file. Mirrors the teacher
//! host tools' `serde`+`toml` app-description loaders (`build/xtask/src/
//! config.rs`), including `deny_unknown_fields` so a typo'd key fails loudly
//! instead of being silently ignored.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct BoardConfig {
    pub flash_file: PathBuf,
    pub flash_page_size: usize,
    pub flash_page_count: usize,
    pub flash_array_count: usize,
    pub feram_file: PathBuf,
    pub feram_element_count: usize,
    pub mqttsn_client_id: String,
    pub mqttsn_keep_alive_s: u16,
    pub bus_pan_id: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            flash_file: PathBuf::from("room-control.flash"),
            flash_page_size: 4096,
            flash_page_count: 8,
            flash_array_count: 2,
            feram_file: PathBuf::from("room-control.feram"),
            feram_element_count: 64,
            mqttsn_client_id: "room-control".to_string(),
            mqttsn_keep_alive_s: 60,
            bus_pan_id: 0x1234,
        }
    }
}

impl BoardConfig {
    /// Array index of the bus device roster within the flash store.
    pub const BUS_ROSTER_ARRAY: usize = 0;
    /// Array index of the Green Power device roster within the flash store.
    pub const RADIO_ROSTER_ARRAY: usize = 1;

    pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<BoardConfig> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
                let config: BoardConfig = toml::from_str(&text)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))?;
                Ok(config)
            }
            None => Ok(BoardConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = BoardConfig::load(None).unwrap();
        assert_eq!(config.bus_pan_id, 0x1234);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = std::env::temp_dir().join(format!("room-control-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "bogus-key = 1\n").unwrap();
        assert!(BoardConfig::load(Some(&path)).is_err());
        let _ = std::fs::remove_file(&path);
    }
}

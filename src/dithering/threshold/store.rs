use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use rand::Rng;

use crate::{
    dithering::threshold::{
        ThresholdMap,
        blue_noise::{self, BlueNoiseGenerator},
    },
    error::{DitherError, Result},
    texture::{Texture, TextureRef},
    utils,
};

pub const DEFAULT_MAP_DIR: &str = "bnoisemaps";

/// A blue noise map found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMap {
    pub depth: i32,
    pub side: usize,
    /// sigma as written in the file name
    pub sigma: String,
    pub path: PathBuf,
}

/// Directory of generated blue noise maps, one grayscale png per
/// (side, sigma).
#[derive(Debug, Clone)]
pub struct MapStore {
    dir: PathBuf,
    seed: Option<u64>,
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_DIR)
    }
}

impl MapStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            seed: None,
        }
    }

    /// Seed used for new maps. A random one is drawn (and logged) otherwise.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn map_path(&self, side: usize, sigma: f64) -> PathBuf {
        self.dir.join(map_file_name(side, sigma))
    }

    /// Generate and save a new map, or load the saved one.
    pub fn blue_noise(&self, depth: i32, sigma: f64, generate: bool) -> Result<ThresholdMap> {
        let side = blue_noise::side_for_depth(depth)?;
        let path = self.map_path(side, sigma);

        let levels = if generate {
            let seed = self.seed.unwrap_or_else(|| rand::rng().random());
            log::info!("blue noise seed {}", seed);
            let levels = BlueNoiseGenerator::new(depth, sigma, seed)?.generate_levels()?;
            save_map(&path, &levels)?;
            levels
        } else {
            load_map(&path, side)?
        };
        ThresholdMap::from_levels(&levels)
    }

    /// Every map in the directory, sorted by side then sigma.
    pub fn list(&self) -> Result<Vec<StoredMap>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;

        let maps = paths
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let (side, sigma) = parse_map_file_name(name)?;
                Some(StoredMap {
                    depth: side.trailing_zeros() as i32 - 5,
                    side,
                    sigma: sigma.to_string(),
                    path: path.clone(),
                })
            })
            .sorted_by(|a, b| a.side.cmp(&b.side).then_with(|| a.sigma.cmp(&b.sigma)))
            .collect();
        Ok(maps)
    }
}

/// `bnoise{side}-{sigma}.png`, sigma with 3 significant digits.
pub fn map_file_name(side: usize, sigma: f64) -> String {
    format!("bnoise{}-{}.png", side, format_sigma(sigma))
}

fn parse_map_file_name(name: &str) -> Option<(usize, &str)> {
    let stem = name.strip_prefix("bnoise")?.strip_suffix(".png")?;
    let (side, sigma) = stem.split_once('-')?;
    let side: usize = side.parse().ok()?;
    if !side.is_power_of_two() || side < 32 {
        return None;
    }
    Some((side, sigma))
}

/// Three significant digits, trailing zeros dropped but at least one
/// decimal kept: 1.9 -> "1.9", 2.0 -> "2.0", 1.2345 -> "1.23",
/// 1234.0 -> "1.23e+03".
pub fn format_sigma(sigma: f64) -> String {
    const DIGITS: i32 = 3;
    if sigma == 0.0 || !sigma.is_finite() {
        return format!("{:.1}", sigma);
    }
    // rounds to the significant digits and exposes the decimal exponent
    let scientific = format!("{:.*e}", (DIGITS - 1) as usize, sigma);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..DIGITS).contains(&exponent) {
        let decimals = (DIGITS - 1 - exponent).max(0) as usize;
        let fixed = format!("{:.*}", decimals, sigma);
        let trimmed = if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.')
        } else {
            fixed.as_str()
        };
        if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{}.0", trimmed)
        }
    } else {
        let mantissa = if mantissa.contains('.') {
            mantissa.trim_end_matches('0').trim_end_matches('.')
        } else {
            mantissa
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Write map levels as an 8-bit grayscale png, creating the directory.
pub fn save_map(path: &Path, levels: &Texture<u8>) -> Result {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    utils::image::save_levels(path, levels)?;
    log::info!("saved blue noise map {}", path.display());
    Ok(())
}

/// Read back map levels saved by [save_map].
pub fn load_map(path: &Path, side: usize) -> Result<Texture<u8>> {
    if !path.is_file() {
        return Err(DitherError::configuration(format!(
            "blue noise map {} does not exist. Use --generate to create it and \
             --sigma <x.x> for its sigma (default {})",
            path.display(),
            blue_noise::DEFAULT_SIGMA
        )));
    }
    let levels: Texture<u8> = image::open(path)
        .map_err(|e| DitherError::resource(path, e))?
        .to_luma8()
        .into();
    if levels.shape() != (side, side) {
        return Err(DitherError::configuration(format!(
            "blue noise map {} is {}x{}, expected {}x{}",
            path.display(),
            levels.width(),
            levels.height(),
            side,
            side
        )));
    }
    log::info!("loaded blue noise map {}", path.display());
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sigma() {
        assert_eq!(format_sigma(1.9), "1.9");
        assert_eq!(format_sigma(2.0), "2.0");
        assert_eq!(format_sigma(1.2345), "1.23");
        assert_eq!(format_sigma(0.5), "0.5");
        assert_eq!(format_sigma(12.5), "12.5");
        assert_eq!(format_sigma(1234.0), "1.23e+03");
    }

    #[test]
    fn test_map_file_name() {
        assert_eq!(map_file_name(64, 1.9), "bnoise64-1.9.png");
        assert_eq!(parse_map_file_name("bnoise64-1.9.png"), Some((64, "1.9")));
        assert_eq!(parse_map_file_name("bnoise48-1.9.png"), None);
        assert_eq!(parse_map_file_name("notes.txt"), None);
    }

    #[test]
    fn test_missing_map_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = MapStore::new(dir.path());
        let err = store.blue_noise(0, 1.9, false).unwrap_err();
        match err {
            DitherError::Configuration(msg) => assert!(msg.contains("--generate")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_depth_checked_before_loading() {
        let store = MapStore::new("unused");
        assert!(matches!(
            store.blue_noise(4, 1.9, true),
            Err(DitherError::Configuration(_))
        ));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(map_file_name(32, 1.9));
        let values: Vec<u8> = (0..32 * 32).map(|i| (i * 7 % 256) as u8).collect();
        let levels = Texture::from_vec(32, 32, values).unwrap();

        save_map(&path, &levels).unwrap();
        assert_eq!(load_map(&path, 32).unwrap(), levels);
        assert!(load_map(&path, 64).is_err());
    }

    #[test]
    fn test_generate_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = MapStore::new(dir.path()).with_seed(Some(3));

        let generated = store.blue_noise(0, 1.9, true).unwrap();
        let reloaded = store.blue_noise(0, 1.9, false).unwrap();
        assert_eq!(generated, reloaded);

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].depth, 0);
        assert_eq!(listed[0].side, 32);
        assert_eq!(listed[0].sigma, "1.9");
    }
}

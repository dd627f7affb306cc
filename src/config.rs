use std::{
    fmt::Display,
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use json::{JsonValue, object};

use crate::{
    dithering::{
        DitheringType,
        threshold::{
            blue_noise::DEFAULT_SIGMA,
            store::{DEFAULT_MAP_DIR, MapStore},
        },
    },
    error::{DitherError, Result},
    transform::prelude::Brightness,
    utils::image::Channel,
};

pub const DEFAULT_STYLE: &str = "bayer";
pub const DEFAULT_DEPTH: i32 = 1;

/// What happens to the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Dither,
    /// Threshold at 127, the style is ignored
    Quantize,
    /// Uniform random threshold per pixel, the style is ignored
    Randomize,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Dither => "dither",
            Mode::Quantize => "quantize",
            Mode::Randomize => "randomize",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dither" => Ok(Mode::Dither),
            "quantize" => Ok(Mode::Quantize),
            "randomize" => Ok(Mode::Randomize),
            other => Err(DitherError::configuration(format!(
                "unknown mode '{}', expected dither, quantize or randomize",
                other
            ))),
        }
    }
}

/// Everything needed to turn one image into a binary one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    pub dithering_type: DitheringType,
    pub invert: bool,
    pub gamma_correct: bool,
    pub channel: Channel,
    pub mode: Mode,
    /// where blue noise maps are saved and loaded
    pub map_dir: PathBuf,
    /// seed for blue noise generation and randomize, random when unset
    pub seed: Option<u64>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            dithering_type: DitheringType::Bayer {
                depth: DEFAULT_DEPTH,
            },
            invert: false,
            gamma_correct: true,
            channel: Channel::All,
            mode: Mode::Dither,
            map_dir: PathBuf::from(DEFAULT_MAP_DIR),
            seed: None,
        }
    }
}

impl ProcessConfig {
    pub fn brightness(&self) -> Brightness {
        Brightness::from_gamma_flag(self.gamma_correct)
    }

    pub fn map_store(&self) -> MapStore {
        MapStore::new(&self.map_dir).with_seed(self.seed)
    }

    /// Parse a JSON config. Every key is optional and falls back to
    /// [ProcessConfig::default].
    ///
    /// ```json
    /// {
    ///     "style": "bluenoise", "depth": 1, "sigma": 1.9, "generate": false,
    ///     "invert": false, "gamma_correct": true, "channel": "all",
    ///     "mode": "dither", "map_dir": "bnoisemaps", "seed": 42
    /// }
    /// ```
    pub fn from_json(json_string: &str) -> Result<ProcessConfig> {
        let json = json::parse(json_string)?;
        if !json.is_object() {
            return Err(DitherError::configuration("config must be a JSON object"));
        }
        let defaults = ProcessConfig::default();

        let style = match &json["style"] {
            JsonValue::Null => DEFAULT_STYLE,
            value => match value.as_str() {
                Some(val) => val,
                None => return config_error("Couldn't parse style"),
            },
        };
        let depth = match &json["depth"] {
            JsonValue::Null => DEFAULT_DEPTH,
            value => match value.as_i32() {
                Some(val) => val,
                None => return config_error("Couldn't parse depth"),
            },
        };
        let sigma = match &json["sigma"] {
            JsonValue::Null => DEFAULT_SIGMA,
            value => match value.as_f64() {
                Some(val) => val,
                None => return config_error("Couldn't parse sigma"),
            },
        };
        let generate = read_bool(&json, "generate", false)?;

        let channel = match &json["channel"] {
            JsonValue::Null => defaults.channel,
            value => match value.as_str() {
                Some(val) => val.parse()?,
                None => return config_error("Couldn't parse channel"),
            },
        };
        let mode = match &json["mode"] {
            JsonValue::Null => defaults.mode,
            value => match value.as_str() {
                Some(val) => val.parse()?,
                None => return config_error("Couldn't parse mode"),
            },
        };
        let map_dir = match &json["map_dir"] {
            JsonValue::Null => defaults.map_dir,
            value => match value.as_str() {
                Some(val) => PathBuf::from(val),
                None => return config_error("Couldn't parse map_dir"),
            },
        };
        let seed = match &json["seed"] {
            JsonValue::Null => None,
            value => match value.as_u64() {
                Some(val) => Some(val),
                None => return config_error("Couldn't parse seed"),
            },
        };

        Ok(ProcessConfig {
            dithering_type: DitheringType::from_style(style, depth, sigma, generate),
            invert: read_bool(&json, "invert", defaults.invert)?,
            gamma_correct: read_bool(&json, "gamma_correct", defaults.gamma_correct)?,
            channel,
            mode,
            map_dir,
            seed,
        })
    }

    pub fn to_json(&self) -> String {
        let (depth, sigma, generate) = match self.dithering_type {
            DitheringType::Bayer { depth } => (depth, DEFAULT_SIGMA, false),
            DitheringType::BlueNoise {
                depth,
                sigma,
                generate,
            } => (depth, sigma, generate),
            DitheringType::ErrorDiffusion(_) => (DEFAULT_DEPTH, DEFAULT_SIGMA, false),
        };

        let mut data = object! {
            style: self.dithering_type.name(),
            depth: depth,
            sigma: sigma,
            generate: generate,
            invert: self.invert,
            gamma_correct: self.gamma_correct,
            channel: self.channel.name(),
            mode: self.mode.name(),
            map_dir: self.map_dir.to_string_lossy().into_owned()
        };
        if let Some(seed) = self.seed {
            data["seed"] = seed.into();
        }
        data.pretty(4)
    }

    pub fn read_config<P: AsRef<Path>>(path: P) -> Result<ProcessConfig> {
        let mut file = File::open(path.as_ref())?;
        let mut json_string = String::new();
        file.read_to_string(&mut json_string)?;

        log::debug!("read config {}", path.as_ref().display());
        ProcessConfig::from_json(&json_string)
    }

    pub fn write_config<P: AsRef<Path>>(&self, path: P) -> Result {
        let mut file = File::create(path)?;
        file.write_all(self.to_json().as_bytes())?;
        Ok(())
    }
}

fn read_bool(json: &JsonValue, key: &str, default: bool) -> Result<bool> {
    match &json[key] {
        JsonValue::Null => Ok(default),
        value => match value.as_bool() {
            Some(val) => Ok(val),
            None => config_error(&format!("Couldn't parse {}", key)),
        },
    }
}

fn config_error<T>(msg: &str) -> Result<T> {
    Err(DitherError::configuration(msg))
}

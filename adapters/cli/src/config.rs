use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use pulse_grid_system_clock::DEFAULT_TEMPO;
use pulse_grid_system_seeding::SeedingPolicy;
use serde::Deserialize;

const DEFAULT_ROWS: u32 = 5;
const DEFAULT_COLUMNS: u32 = 5;
const DEFAULT_STEPS: u64 = 16;

/// Resize requested once the session has completed `after_step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScheduledResize {
    /// Step after which the request is made; it takes effect one step later.
    #[serde(rename = "step")]
    pub(crate) after_step: u64,
    /// New row count, or `None` to keep the current one.
    #[serde(default)]
    pub(crate) rows: Option<u32>,
    /// New column count, or `None` to keep the current one.
    #[serde(default)]
    pub(crate) columns: Option<u32>,
}

impl FromStr for ScheduledResize {
    type Err = String;

    /// Parses `STEP:ROWSxCOLUMNS`, where either dimension may be `_`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (step, dimensions) = value
            .split_once(':')
            .ok_or_else(|| format!("expected STEP:ROWSxCOLUMNS, got '{value}'"))?;
        let (rows, columns) = dimensions
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected ROWSxCOLUMNS, got '{dimensions}'"))?;

        let after_step = step
            .trim()
            .parse()
            .map_err(|error| format!("invalid step '{step}': {error}"))?;
        Ok(Self {
            after_step,
            rows: parse_dimension(rows)?,
            columns: parse_dimension(columns)?,
        })
    }
}

fn parse_dimension(value: &str) -> Result<Option<u32>, String> {
    let value = value.trim();
    if value == "_" {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|error| format!("invalid dimension '{value}': {error}"))
}

/// Settings read from a TOML configuration file. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) rows: Option<u32>,
    pub(crate) columns: Option<u32>,
    pub(crate) tempo: Option<f64>,
    pub(crate) steps: Option<u64>,
    pub(crate) presses: Vec<u32>,
    #[serde(rename = "resize")]
    pub(crate) resizes: Vec<ScheduledResize>,
    pub(crate) seeding: Option<SeedingPolicy>,
}

impl FileConfig {
    /// Loads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid pulse grid toml")
    }
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) rows: u32,
    pub(crate) columns: u32,
    pub(crate) tempo: f64,
    pub(crate) steps: u64,
    pub(crate) presses: Vec<u32>,
    pub(crate) resizes: Vec<ScheduledResize>,
    pub(crate) seeding: SeedingPolicy,
    pub(crate) realtime: bool,
}

/// Values given on the command line, which take precedence over the file.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) rows: Option<u32>,
    pub(crate) columns: Option<u32>,
    pub(crate) tempo: Option<f64>,
    pub(crate) steps: Option<u64>,
    pub(crate) presses: Vec<u32>,
    pub(crate) resizes: Vec<ScheduledResize>,
    pub(crate) seeding: Option<SeedingPolicy>,
    pub(crate) realtime: bool,
}

impl RunConfig {
    /// Layers command-line overrides over file settings over defaults.
    ///
    /// Presses and resizes from both sources are concatenated, file first.
    pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        let mut presses = file.presses;
        presses.extend(overrides.presses);
        let mut resizes = file.resizes;
        resizes.extend(overrides.resizes);
        resizes.sort_by_key(|resize| resize.after_step);

        Self {
            rows: overrides.rows.or(file.rows).unwrap_or(DEFAULT_ROWS),
            columns: overrides.columns.or(file.columns).unwrap_or(DEFAULT_COLUMNS),
            tempo: overrides.tempo.or(file.tempo).unwrap_or(DEFAULT_TEMPO),
            steps: overrides.steps.or(file.steps).unwrap_or(DEFAULT_STEPS),
            presses,
            resizes,
            seeding: overrides.seeding.or(file.seeding).unwrap_or_default(),
            realtime: overrides.realtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_grid_core::{AbsoluteDirection, CellBehaviors, RelativeDirection};

    #[test]
    fn parses_scheduled_resize() {
        assert_eq!(
            "4:3x6".parse::<ScheduledResize>(),
            Ok(ScheduledResize {
                after_step: 4,
                rows: Some(3),
                columns: Some(6),
            })
        );
        assert_eq!(
            "2:_x8".parse::<ScheduledResize>(),
            Ok(ScheduledResize {
                after_step: 2,
                rows: None,
                columns: Some(8),
            })
        );
        assert!("2:8".parse::<ScheduledResize>().is_err());
        assert!("x:3x3".parse::<ScheduledResize>().is_err());
    }

    #[test]
    fn parses_full_file() {
        let file = FileConfig::parse(
            r#"
rows = 4
columns = 6
tempo = 90.0
steps = 8
presses = [0, 5]

[[resize]]
step = 3
rows = 2

[seeding]
kind = "uniform"
on_press = ["right"]
on_cell = ["clockwise"]
"#,
        )
        .expect("parse config");

        assert_eq!(file.rows, Some(4));
        assert_eq!(file.presses, vec![0, 5]);
        assert_eq!(
            file.resizes,
            vec![ScheduledResize {
                after_step: 3,
                rows: Some(2),
                columns: None,
            }]
        );
        assert_eq!(
            file.seeding,
            Some(SeedingPolicy::Uniform(CellBehaviors::new(
                vec![AbsoluteDirection::Right.into()],
                vec![RelativeDirection::Clockwise.into()],
            )))
        );
    }

    #[test]
    fn demo_config_parses() {
        let file = FileConfig::parse(include_str!("../../../demos/clockwise_spiral.toml"))
            .expect("parse demo config");
        assert_eq!(file.presses, vec![0]);
        assert_eq!(file.resizes.len(), 1);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(FileConfig::parse("colour = \"red\"").is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let file = FileConfig {
            rows: Some(9),
            columns: Some(9),
            tempo: Some(60.0),
            presses: vec![1],
            ..FileConfig::default()
        };
        let overrides = Overrides {
            rows: Some(3),
            presses: vec![2],
            ..Overrides::default()
        };

        let config = RunConfig::resolve(file, overrides);
        assert_eq!(config.rows, 3);
        assert_eq!(config.columns, 9);
        assert_eq!(config.tempo, 60.0);
        assert_eq!(config.steps, DEFAULT_STEPS);
        assert_eq!(config.presses, vec![1, 2]);
        assert_eq!(config.seeding, SeedingPolicy::default());
    }
}

use crate::output::OutputPaths;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_INPUT: &str = "pal.xlsx";
const DEFAULT_GRAPH_OUT: &str = "graph_data.json";
const DEFAULT_ID_MAP_OUT: &str = "id_name_map.json";
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub graph_out: PathBuf,
    pub id_map_out: PathBuf,
}

impl ConvertConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            input: cli_input,
            sheet: cli_sheet,
            graph_out: cli_graph_out,
            id_map_out: cli_id_map_out,
            output_dir: cli_output_dir,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            input: file_input,
            sheet: file_sheet,
            graph_out: file_graph_out,
            id_map_out: file_id_map_out,
            output_dir: file_output_dir,
        } = file_config;

        let input = cli_input
            .or(file_input)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

        let sheet = cli_sheet
            .or(file_sheet)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let output_dir = cli_output_dir.or(file_output_dir);
        let resolve = |path: PathBuf| match output_dir.as_ref() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        };

        let graph_out = resolve(
            cli_graph_out
                .or(file_graph_out)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH_OUT)),
        );
        let id_map_out = resolve(
            cli_id_map_out
                .or(file_id_map_out)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ID_MAP_OUT)),
        );

        Ok(Self {
            input,
            sheet,
            graph_out,
            id_map_out,
        })
    }

    /// Checks the configuration before any work starts.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.input.exists(),
            "input workbook {:?} does not exist",
            self.input
        );
        anyhow::ensure!(
            self.input.is_file(),
            "input workbook {:?} is not a file",
            self.input
        );
        let allowed = self
            .input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        anyhow::ensure!(
            allowed,
            "input workbook {:?} does not match allowed extensions {:?}",
            self.input,
            SUPPORTED_EXTENSIONS
        );
        anyhow::ensure!(
            self.graph_out != self.id_map_out,
            "graph and id map outputs both point at {:?}",
            self.graph_out
        );
        Ok(())
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            graph: self.graph_out.clone(),
            id_map: self.id_map_out.clone(),
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "pal-graph",
    about = "Convert a combination table into a JSON graph and id map",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        env = "PAL_GRAPH_INPUT",
        value_name = "INPUT",
        help = "Workbook holding the combination table [default: pal.xlsx]"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        long,
        env = "PAL_GRAPH_SHEET",
        value_name = "NAME",
        help = "Worksheet to read (defaults to the first sheet)"
    )]
    pub sheet: Option<String>,

    #[arg(
        long,
        env = "PAL_GRAPH_GRAPH_OUT",
        value_name = "FILE",
        help = "Adjacency document path [default: graph_data.json]"
    )]
    pub graph_out: Option<PathBuf>,

    #[arg(
        long,
        env = "PAL_GRAPH_ID_MAP_OUT",
        value_name = "FILE",
        help = "Id map document path [default: id_name_map.json]"
    )]
    pub id_map_out: Option<PathBuf>,

    #[arg(
        long,
        env = "PAL_GRAPH_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory that relative output paths are resolved against"
    )]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    input: Option<PathBuf>,
    sheet: Option<String>,
    graph_out: Option<PathBuf>,
    id_map_out: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

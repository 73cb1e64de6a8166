//! The `Tabviz` facade tying loading, profiling, cleaning and rendering together.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartRequest, ChartSpec};
use crate::cleaning::{Cleaner, CleaningPolicy, CleaningResult};
use crate::dataset::Dataset;
use crate::error::{Result, TabvizError};
use crate::input::{Loader, LoaderConfig, SourceMetadata};
use crate::profile::{DatasetProfile, Profiler, ProfilerConfig};
use crate::render::{self, Figure, GridFigure, RenderConfig};

/// Configuration for every stage of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TabvizConfig {
    pub loader: LoaderConfig,
    pub profiler: ProfilerConfig,
    pub render: RenderConfig,
}

impl TabvizConfig {
    /// Read a configuration from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TabvizError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| TabvizError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// A loaded dataset with its source metadata and profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub source: SourceMetadata,
    pub profile: DatasetProfile,
}

/// Entry point for the load, profile, clean and chart pipeline.
pub struct Tabviz {
    config: TabvizConfig,
    loader: Loader,
    profiler: Profiler,
    cleaner: Cleaner,
}

impl Tabviz {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(TabvizConfig::default())
    }

    pub fn with_config(config: TabvizConfig) -> Self {
        let loader = Loader::with_config(config.loader.clone());
        let profiler = Profiler::with_config(config.profiler.clone());

        Self {
            config,
            loader,
            profiler,
            cleaner: Cleaner::new(),
        }
    }

    pub fn config(&self) -> &TabvizConfig {
        &self.config
    }

    /// Load a data file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.loader.load(path)
    }

    /// Load a data file and profile it.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<ProfileReport> {
        let (dataset, source) = self.load(path)?;
        let profile = self.profile(&dataset);
        Ok(ProfileReport { source, profile })
    }

    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        self.profiler.profile(dataset)
    }

    /// Apply a cleaning policy, returning a new dataset.
    pub fn clean(&self, dataset: &Dataset, policy: &CleaningPolicy) -> Result<CleaningResult> {
        self.cleaner.apply(dataset, policy)
    }

    /// Validate a chart spec against `dataset` and render it.
    pub fn chart(&self, spec: &ChartSpec, dataset: &Dataset) -> Result<Figure> {
        let request = spec.validate(dataset)?;
        self.render(&request, dataset)
    }

    /// Render an already validated request.
    pub fn render(&self, request: &ChartRequest, dataset: &Dataset) -> Result<Figure> {
        render::render(request, dataset, &self.config.render)
    }

    /// Render several charts into one grid figure.
    pub fn render_grid(
        &self,
        specs: &[ChartSpec],
        dataset: &Dataset,
        columns: usize,
    ) -> Result<GridFigure> {
        let grid = render::render_grid(specs, dataset, columns, &self.config.render)?;
        log_grid(&grid);
        Ok(grid)
    }

    /// Render a grid from a JSON layout; unreadable entries become failed panels.
    pub fn render_grid_json(
        &self,
        specs: &[serde_json::Value],
        dataset: &Dataset,
        columns: usize,
    ) -> Result<GridFigure> {
        let grid = render::render_grid_json(specs, dataset, columns, &self.config.render)?;
        log_grid(&grid);
        Ok(grid)
    }
}

fn log_grid(grid: &GridFigure) {
    info!(
        "Grid of {} charts rendered, {} failed",
        grid.outcomes.len(),
        grid.failed().count()
    );
}

impl Default for Tabviz {
    fn default() -> Self {
        Self::new()
    }
}

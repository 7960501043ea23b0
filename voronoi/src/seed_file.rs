//! Seed and diagram files.
//!
//! A [`SeedFile`] holds the grid size, the site coordinates and the options of
//! a run. A [`DiagramFile`] holds the relaxed sites and their diagram. Both are
//! stored as YAML or JSON, picked from the file extension.

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use common::FileFormat;

use crate::diagram::{Diagram, DiagramBuilder, DiagramConfig};
use crate::grid::GridSize;
use crate::lloyd::{relax, LloydOptions};
use crate::site::Sites;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    pub width: i32,
    pub height: i32,
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    #[serde(default)]
    pub diagram: DiagramConfig,
    #[serde(default)]
    pub lloyd: LloydOptions,
}

impl SeedFile {
    pub fn new(size: GridSize, sites: &Sites) -> Self {
        Self {
            width: size.width,
            height: size.height,
            x: sites.xs().to_vec(),
            y: sites.ys().to_vec(),
            diagram: DiagramConfig::default(),
            lloyd: LloydOptions::default(),
        }
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    pub fn sites(&self) -> anyhow::Result<Sites> {
        Ok(Sites::from_slices(&self.x, &self.y)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_extents(self.width, self.height)?;
        self.sites()?;
        if !(self.lloyd.convergence_threshold >= 0.0) {
            bail!(
                "Convergence threshold must be non-negative, got {}",
                self.lloyd.convergence_threshold
            );
        }
        Ok(())
    }

    pub fn from_file(path: &str) -> anyhow::Result<SeedFile> {
        let seeds: SeedFile = load(path)?;
        seeds.validate()?;
        Ok(seeds)
    }

    pub fn from_text(text: &str, format: FileFormat) -> anyhow::Result<SeedFile> {
        let seeds: SeedFile = common::deserialize(text, format)?;
        seeds.validate()?;
        Ok(seeds)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        save(self, path)
    }

    /// Relaxes the seeds with the stored options and returns the result.
    pub fn run(&self) -> anyhow::Result<DiagramFile> {
        let size = self.size();
        let builder = DiagramBuilder::from_config(self.diagram);
        let relaxation = relax(size, self.sites()?, &self.lloyd, &builder)?;
        Ok(DiagramFile::new(size, &relaxation.sites, relaxation.diagram))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagramFile {
    pub width: i32,
    pub height: i32,
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub regions: Diagram,
}

impl DiagramFile {
    pub fn new(size: GridSize, sites: &Sites, diagram: Diagram) -> Self {
        Self {
            width: size.width,
            height: size.height,
            x: sites.xs().to_vec(),
            y: sites.ys().to_vec(),
            regions: diagram,
        }
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    pub fn sites(&self) -> anyhow::Result<Sites> {
        Ok(Sites::from_slices(&self.x, &self.y)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_extents(self.width, self.height)?;
        let sites = self.sites()?;
        if self.regions.site_count() != sites.len() {
            bail!(
                "Diagram has {} regions for {} sites",
                self.regions.site_count(),
                sites.len()
            );
        }
        let size = self.size();
        for (site, cells) in self.regions.iter() {
            if let Some(cell) = cells.iter().find(|&&cell| !size.contains(cell)) {
                bail!("Region {} holds cell {:?} outside the grid", site, cell);
            }
        }
        Ok(())
    }

    pub fn from_file(path: &str) -> anyhow::Result<DiagramFile> {
        let file: DiagramFile = load(path)?;
        file.validate()?;
        Ok(file)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        save(self, path)
    }
}

fn validate_extents(width: i32, height: i32) -> anyhow::Result<()> {
    if width < 0 || height < 0 {
        bail!("Grid extents must be non-negative, got {}x{}", width, height);
    }
    Ok(())
}

fn load<T: DeserializeOwned + 'static>(path: &str) -> anyhow::Result<T> {
    let format = FileFormat::from_file_name(path)?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))?;
    let value = common::deserialize(&text, format)
        .with_context(|| format!("Failed to parse file '{}'", path))?;
    Ok(value)
}

fn save<T: Serialize>(value: &T, path: &str) -> anyhow::Result<()> {
    let format = FileFormat::from_file_name(path)?;
    let text = common::serialize(value, format)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write file '{}'", path))?;
    info!("Data dumped as file '{}'", path);
    Ok(())
}

use std::{fs, path::Path};

use glam::*;
use palette::Srgba;
use serde_derive::{Deserialize, Serialize};

use crate::{
    bindings::ShadingParams,
    pipeline::{ShadingProgram, Topology},
    HexShadeError,
};

/// One draw call: hexagon offsets in clip space shaded by a single program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexDraw {
    pub program: ShadingProgram,
    #[serde(default)]
    pub topology: Topology,
    pub offsets: Vec<Vec2>,
    /// Only read by the outlined program
    #[serde(default)]
    pub params: ShadingParams,
}

impl HexDraw {
    pub fn outlined(offsets: impl IntoIterator<Item = Vec2>, params: ShadingParams) -> Self {
        Self {
            program: ShadingProgram::Outlined,
            topology: Topology::Triangles,
            offsets: offsets.into_iter().collect(),
            params,
        }
    }

    pub fn silhouette(offsets: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            program: ShadingProgram::Silhouette,
            topology: Topology::Triangles,
            offsets: offsets.into_iter().collect(),
            params: ShadingParams::default(),
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_params(mut self, params: ShadingParams) -> Self {
        self.params = params;
        self
    }
}

/// Everything drawn into one target, in order, over a cleared background.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexFrame {
    #[serde(default = "transparent")]
    pub background: Srgba,
    #[serde(default)]
    pub draws: Vec<HexDraw>,
}

fn transparent() -> Srgba {
    Srgba::new(0., 0., 0., 0.)
}

impl Default for HexFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl HexFrame {
    pub fn new() -> Self {
        Self {
            background: transparent(),
            draws: Vec::new(),
        }
    }

    pub fn background(&mut self, background: Srgba) {
        self.background = background;
    }

    pub fn with_background(mut self, background: Srgba) -> Self {
        self.background(background);
        self
    }

    pub fn add_draw(&mut self, draw: HexDraw) {
        self.draws.push(draw);
    }

    pub fn with_draw(mut self, draw: HexDraw) -> Self {
        self.add_draw(draw);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, HexShadeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HexShadeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

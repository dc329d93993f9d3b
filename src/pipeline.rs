use std::fmt;

use log::debug;
use serde_derive::{Deserialize, Serialize};
use wgpu::*;

use crate::{
    contract::{hex_vertex_layout, BindingContract, OUTLINED_CONTRACT, SILHOUETTE_CONTRACT},
    shader::ShaderModules,
    HexShadeError,
};

/// The fragment variant a draw is shaded with. Both share the hexagon
/// vertex stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingProgram {
    /// Red fill or a uniform edge color, picked by the draw mode
    Outlined,
    /// Opaque black
    Silhouette,
}

impl ShadingProgram {
    pub const ALL: [ShadingProgram; 2] = [ShadingProgram::Outlined, ShadingProgram::Silhouette];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Outlined => "outlined",
            Self::Silhouette => "silhouette",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|program| program.name() == name)
    }

    pub fn contract(&self) -> &'static BindingContract {
        match self {
            Self::Outlined => &OUTLINED_CONTRACT,
            Self::Silhouette => &SILHOUETTE_CONTRACT,
        }
    }

    pub fn uses_uniforms(&self) -> bool {
        !self.contract().uniforms.is_empty()
    }
}

impl fmt::Display for ShadingProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the offsets of a draw are assembled. Lists are used for fills, strips
/// and lines for edge overlays.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Triangles,
    TriangleStrip,
    Lines,
    LineStrip,
}

impl From<Topology> for PrimitiveTopology {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::Triangles => PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => PrimitiveTopology::TriangleStrip,
            Topology::Lines => PrimitiveTopology::LineList,
            Topology::LineStrip => PrimitiveTopology::LineStrip,
        }
    }
}

pub struct HexPipeline {
    pub program: ShadingProgram,
    pub topology: Topology,
    /// Layout of group 0. `None` for programs without uniforms
    pub bind_group_layout: Option<BindGroupLayout>,
    pub render_pipeline: RenderPipeline,
}

impl HexPipeline {
    pub async fn new(
        device: &Device,
        shaders: &ShaderModules,
        program: ShadingProgram,
        format: TextureFormat,
        topology: Topology,
    ) -> Result<Self, HexShadeError> {
        let shader_module =
            shaders
                .get(program.name())
                .ok_or_else(|| HexShadeError::PipelineCreation {
                    program,
                    message: format!("shader module {} was not loaded", program.name()),
                })?;
        let contract = program.contract();

        device.push_error_scope(ErrorFilter::Validation);

        let bind_group_layout = program.uses_uniforms().then(|| {
            device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some(&format!("{program} bind group layout")),
                entries: &contract.bind_group_layout_entries(),
            })
        });
        let bind_group_layouts = bind_group_layout.iter().collect::<Vec<_>>();

        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{program} pipeline layout")),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&format!("{program} {topology:?} pipeline")),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader_module,
                entry_point: contract.vertex_entry,
                buffers: &[hex_vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: shader_module,
                entry_point: contract.fragment_entry,
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: topology.into(),
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState {
                count: 1,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        if let Some(error) = device.pop_error_scope().await {
            return Err(HexShadeError::PipelineCreation {
                program,
                message: error.to_string(),
            });
        }

        debug!("Created {program} pipeline for {topology:?} targeting {format:?}");
        Ok(Self {
            program,
            topology,
            bind_group_layout,
            render_pipeline,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn programs_round_trip_through_their_names() {
        for program in ShadingProgram::ALL {
            assert_eq!(ShadingProgram::from_name(program.name()), Some(program));
        }
        assert_eq!(ShadingProgram::from_name("hex_vertex"), None);
    }

    #[test]
    fn only_outlined_has_uniforms() {
        assert!(ShadingProgram::Outlined.uses_uniforms());
        assert!(!ShadingProgram::Silhouette.uses_uniforms());
    }

    #[test]
    fn topologies_map_to_primitive_topologies() {
        assert_eq!(
            PrimitiveTopology::from(Topology::Triangles),
            PrimitiveTopology::TriangleList
        );
        assert_eq!(
            PrimitiveTopology::from(Topology::LineStrip),
            PrimitiveTopology::LineStrip
        );
        assert_eq!(Topology::default(), Topology::Triangles);
    }

    #[test]
    fn names_are_snake_case_in_json() {
        assert_eq!(
            serde_json::to_string(&ShadingProgram::Silhouette).unwrap(),
            "\"silhouette\""
        );
        assert_eq!(
            serde_json::from_str::<Topology>("\"triangle_strip\"").unwrap(),
            Topology::TriangleStrip
        );
    }
}

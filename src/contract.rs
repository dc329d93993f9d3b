//! The slots a host has to bind for the hexagon programs, and a check that a
//! compiled module actually declares them.
//!
//! Mismatches are caught when the shader is loaded instead of surfacing as a
//! device validation error in the middle of a frame.

use std::{fmt, num::NonZeroU64};

use hexshade_shader::{
    DRAW_MODE_BINDING, EDGE_COLOR_BINDING, HEX_OFFSET_LOCATION, OUTLINE_UNIFORM_GROUP,
};
use naga::{
    AddressSpace, Binding, BuiltIn, Handle, Module, Scalar, ScalarKind, ShaderStage, Type,
    TypeInner, VectorSize,
};
use thiserror::Error;
use wgpu::{
    BindGroupLayoutEntry, BindingType, BufferAddress, BufferBindingType, ShaderStages,
    VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderType {
    U32,
    Vec2F32,
    Vec4F32,
}

impl ShaderType {
    fn of(inner: &TypeInner) -> Option<Self> {
        const F32: Scalar = Scalar {
            kind: ScalarKind::Float,
            width: 4,
        };
        match *inner {
            TypeInner::Scalar(Scalar {
                kind: ScalarKind::Uint,
                width: 4,
            }) => Some(Self::U32),
            TypeInner::Vector {
                size: VectorSize::Bi,
                scalar,
            } if scalar == F32 => Some(Self::Vec2F32),
            TypeInner::Vector {
                size: VectorSize::Quad,
                scalar,
            } if scalar == F32 => Some(Self::Vec4F32),
            _ => None,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::U32 => 4,
            Self::Vec2F32 => 8,
            Self::Vec4F32 => 16,
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U32 => write!(f, "u32"),
            Self::Vec2F32 => write!(f, "vec2<f32>"),
            Self::Vec4F32 => write!(f, "vec4<f32>"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: &'static str,
    pub group: u32,
    pub binding: u32,
    pub ty: ShaderType,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocationSlot {
    pub location: u32,
    pub ty: ShaderType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingContract {
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub vertex_attribute: LocationSlot,
    pub uniforms: &'static [UniformSlot],
    pub fragment_output: LocationSlot,
}

const HEX_OFFSET: LocationSlot = LocationSlot {
    location: HEX_OFFSET_LOCATION,
    ty: ShaderType::Vec2F32,
};

const FRAGMENT_COLOR: LocationSlot = LocationSlot {
    location: 0,
    ty: ShaderType::Vec4F32,
};

pub const OUTLINED_CONTRACT: BindingContract = BindingContract {
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
    vertex_attribute: HEX_OFFSET,
    uniforms: &[
        UniformSlot {
            name: "draw_mode",
            group: OUTLINE_UNIFORM_GROUP,
            binding: DRAW_MODE_BINDING,
            ty: ShaderType::U32,
        },
        UniformSlot {
            name: "edge_color",
            group: OUTLINE_UNIFORM_GROUP,
            binding: EDGE_COLOR_BINDING,
            ty: ShaderType::Vec4F32,
        },
    ],
    fragment_output: FRAGMENT_COLOR,
};

pub const SILHOUETTE_CONTRACT: BindingContract = BindingContract {
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
    vertex_attribute: HEX_OFFSET,
    uniforms: &[],
    fragment_output: FRAGMENT_COLOR,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("missing {stage} entry point `{name}`")]
    MissingEntryPoint {
        stage: &'static str,
        name: &'static str,
    },

    #[error("no vertex attribute at location {location}")]
    MissingVertexAttribute { location: u32 },

    #[error("vertex attribute {location} should be {expected} but is {found}")]
    VertexAttributeType {
        location: u32,
        expected: ShaderType,
        found: String,
    },

    #[error("unexpected vertex attribute at location {location}")]
    UnexpectedVertexAttribute { location: u32 },

    #[error("vertex entry point does not write the clip position")]
    MissingPosition,

    #[error("uniform `{name}` is not bound at group {group}, binding {binding}")]
    MissingUniform {
        name: &'static str,
        group: u32,
        binding: u32,
    },

    #[error("uniform at group {group}, binding {binding} should be {expected} but is {found}")]
    UniformType {
        group: u32,
        binding: u32,
        expected: ShaderType,
        found: String,
    },

    #[error("unexpected uniform at group {group}, binding {binding}")]
    UnexpectedUniform { group: u32, binding: u32 },

    #[error("unexpected fragment output at location {location}")]
    UnexpectedFragmentOutput { location: u32 },

    #[error("fragment output {location} should be {expected} but is {found}")]
    FragmentOutput {
        location: u32,
        expected: ShaderType,
        found: String,
    },
}

fn describe(module: &Module, ty: Handle<Type>) -> String {
    let inner = &module.types[ty].inner;
    ShaderType::of(inner)
        .map(|ty| ty.to_string())
        .unwrap_or_else(|| format!("{inner:?}"))
}

/// Collects the bindings of an argument or result, looking through structs.
fn bindings(module: &Module, binding: Option<&Binding>, ty: Handle<Type>) -> Vec<(Binding, Handle<Type>)> {
    match (binding, &module.types[ty].inner) {
        (Some(binding), _) => vec![(binding.clone(), ty)],
        (None, TypeInner::Struct { members, .. }) => members
            .iter()
            .filter_map(|member| Some((member.binding.clone()?, member.ty)))
            .collect(),
        _ => Vec::new(),
    }
}

fn location_of(binding: &Binding) -> Option<u32> {
    match *binding {
        Binding::Location { location, .. } => Some(location),
        Binding::BuiltIn(_) => None,
    }
}

impl BindingContract {
    /// Verifies the entry points against the contract: the one vertex
    /// attribute, a position output, exactly the listed uniforms and the one
    /// fragment output. Other location slots on the vertex input or the
    /// fragment output are rejected.
    pub fn check(&self, module: &Module) -> Result<(), ContractError> {
        let entry_point = |stage: ShaderStage, stage_name: &'static str, name: &'static str| {
            module
                .entry_points
                .iter()
                .find(|entry_point| entry_point.stage == stage && entry_point.name == name)
                .ok_or(ContractError::MissingEntryPoint {
                    stage: stage_name,
                    name,
                })
        };

        let vertex = entry_point(ShaderStage::Vertex, "vertex", self.vertex_entry)?;
        let attribute = vertex
            .function
            .arguments
            .iter()
            .flat_map(|argument| bindings(module, argument.binding.as_ref(), argument.ty))
            .find(|(binding, _)| location_of(binding) == Some(self.vertex_attribute.location))
            .ok_or(ContractError::MissingVertexAttribute {
                location: self.vertex_attribute.location,
            })?;
        if ShaderType::of(&module.types[attribute.1].inner) != Some(self.vertex_attribute.ty) {
            return Err(ContractError::VertexAttributeType {
                location: self.vertex_attribute.location,
                expected: self.vertex_attribute.ty,
                found: describe(module, attribute.1),
            });
        }

        let extra_attribute = vertex
            .function
            .arguments
            .iter()
            .flat_map(|argument| bindings(module, argument.binding.as_ref(), argument.ty))
            .filter_map(|(binding, _)| location_of(&binding))
            .find(|location| *location != self.vertex_attribute.location);
        if let Some(location) = extra_attribute {
            return Err(ContractError::UnexpectedVertexAttribute { location });
        }

        let writes_position = vertex.function.result.as_ref().is_some_and(|result| {
            bindings(module, result.binding.as_ref(), result.ty)
                .iter()
                .any(|(binding, _)| matches!(binding, Binding::BuiltIn(BuiltIn::Position { .. })))
        });
        if !writes_position {
            return Err(ContractError::MissingPosition);
        }

        for (_, global) in module.global_variables.iter() {
            let (AddressSpace::Uniform, Some(resource)) = (global.space, global.binding.as_ref())
            else {
                continue;
            };
            let slot = self
                .uniforms
                .iter()
                .find(|slot| slot.group == resource.group && slot.binding == resource.binding)
                .ok_or(ContractError::UnexpectedUniform {
                    group: resource.group,
                    binding: resource.binding,
                })?;
            if ShaderType::of(&module.types[global.ty].inner) != Some(slot.ty) {
                return Err(ContractError::UniformType {
                    group: slot.group,
                    binding: slot.binding,
                    expected: slot.ty,
                    found: describe(module, global.ty),
                });
            }
        }

        for slot in self.uniforms {
            let declared = module.global_variables.iter().any(|(_, global)| {
                global.space == AddressSpace::Uniform
                    && global.binding.as_ref().is_some_and(|resource| {
                        resource.group == slot.group && resource.binding == slot.binding
                    })
            });
            if !declared {
                return Err(ContractError::MissingUniform {
                    name: slot.name,
                    group: slot.group,
                    binding: slot.binding,
                });
            }
        }

        let fragment = entry_point(ShaderStage::Fragment, "fragment", self.fragment_entry)?;
        let outputs = fragment
            .function
            .result
            .as_ref()
            .map(|result| bindings(module, result.binding.as_ref(), result.ty))
            .unwrap_or_default();
        let extra_output = outputs
            .iter()
            .filter_map(|(binding, _)| location_of(binding))
            .find(|location| *location != self.fragment_output.location);
        if let Some(location) = extra_output {
            return Err(ContractError::UnexpectedFragmentOutput { location });
        }
        let output = outputs
            .into_iter()
            .find(|(binding, _)| location_of(binding) == Some(self.fragment_output.location));
        match output {
            Some((_, ty)) if ShaderType::of(&module.types[ty].inner) == Some(self.fragment_output.ty) => {
                Ok(())
            }
            Some((_, ty)) => Err(ContractError::FragmentOutput {
                location: self.fragment_output.location,
                expected: self.fragment_output.ty,
                found: describe(module, ty),
            }),
            None => Err(ContractError::FragmentOutput {
                location: self.fragment_output.location,
                expected: self.fragment_output.ty,
                found: "nothing".to_string(),
            }),
        }
    }

    /// Layout entries for the uniform group, in binding order. Empty for
    /// programs without uniforms.
    pub fn bind_group_layout_entries(&self) -> Vec<BindGroupLayoutEntry> {
        self.uniforms
            .iter()
            .map(|slot| BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(slot.ty.size()),
                },
                count: None,
            })
            .collect()
    }
}

const HEX_VERTEX_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    format: VertexFormat::Float32x2,
    offset: 0,
    shader_location: HEX_OFFSET_LOCATION,
}];

/// Vertex buffer layout matching [`hexshade_shader::HexVertex`].
pub fn hex_vertex_layout() -> VertexBufferLayout<'static> {
    VertexBufferLayout {
        array_stride: std::mem::size_of::<hexshade_shader::HexVertex>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: &HEX_VERTEX_ATTRIBUTES,
    }
}

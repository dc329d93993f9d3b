mod error;
mod preprocessor;

use error::Diagnose;
pub(crate) use preprocessor::Preprocessor;

use std::{borrow::Cow, collections::HashMap, path::Path};

use log::{debug, error};
use naga::valid::{Capabilities, ValidationFlags, Validator};
use rust_embed::*;
use wgpu::{Device, ErrorFilter, ShaderModule, ShaderModuleDescriptor, ShaderSource};

use crate::{pipeline::ShadingProgram, HexShadeError};

#[derive(RustEmbed)]
#[folder = "shaders/"]
pub(crate) struct Shader;

/// A program after include expansion, parsing, validation and the binding
/// contract check.
pub struct CompiledShader {
    pub(crate) preprocessor: Preprocessor,
    pub module: naga::Module,
}

impl CompiledShader {
    /// The flattened wgsl handed to the device.
    pub fn source(&self) -> &str {
        &self.preprocessor.content
    }
}

#[derive(Default)]
pub struct ShaderModules(HashMap<String, ShaderModule>);

impl ShaderModules {
    pub fn get(&self, name: &str) -> Option<&ShaderModule> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Default)]
pub struct ShaderLoader;

impl ShaderLoader {
    pub fn new() -> Self {
        Self
    }

    /// Names of the embedded programs, without the shared includes.
    pub fn programs(&self) -> Vec<String> {
        Shader::iter()
            .filter(|path| !path.starts_with("include/"))
            .filter_map(|path| {
                Path::new(&*path)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect()
    }

    pub fn compile(&self, name: &str) -> Result<CompiledShader, HexShadeError> {
        let filename = format!("{name}.wgsl");
        let file =
            Shader::get(&filename).ok_or_else(|| HexShadeError::ShaderMissing(name.to_string()))?;
        self.compile_source(name, &file.data, &filename)
    }

    pub(crate) fn compile_source(
        &self,
        name: &str,
        data: &[u8],
        filename: &str,
    ) -> Result<CompiledShader, HexShadeError> {
        let preprocessor = Preprocessor::new(data, filename)?;

        let module = naga::front::wgsl::parse_str(&preprocessor.content).map_err(|error| {
            HexShadeError::ShaderCompilation {
                name: name.to_string(),
                diagnostics: error.diagnose(&preprocessor),
            }
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .map_err(|error| HexShadeError::ShaderCompilation {
                name: name.to_string(),
                diagnostics: error.diagnose(&preprocessor),
            })?;

        if let Some(program) = ShadingProgram::from_name(name) {
            program
                .contract()
                .check(&module)
                .map_err(|source| HexShadeError::Contract {
                    name: name.to_string(),
                    source,
                })?;
        }

        debug!("Compiled shader {name} from {} file(s)", preprocessor.files.len());
        Ok(CompiledShader {
            preprocessor,
            module,
        })
    }

    pub async fn load(&self, device: &Device) -> Result<ShaderModules, HexShadeError> {
        let mut modules = HashMap::new();
        for name in self.programs() {
            let compiled = self.compile(&name)?;

            device.push_error_scope(ErrorFilter::Validation);
            let label = format!("{name}_wgsl");
            let module = device.create_shader_module(ShaderModuleDescriptor {
                label: Some(&label),
                source: ShaderSource::Wgsl(Cow::from(compiled.source())),
            });
            if let Some(device_error) = device.pop_error_scope().await {
                error!("Device rejected shader {name}: {device_error}");
                return Err(HexShadeError::ShaderCompilation {
                    name,
                    diagnostics: device_error.to_string(),
                });
            }
            modules.insert(name, module);
        }
        Ok(ShaderModules(modules))
    }
}

use std::collections::HashMap;

use log::{info, warn};
use wgpu::{util::DeviceExt, *};

use hexshade_shader::HexVertex;

use crate::{
    bindings::OutlineBindings,
    frame::HexFrame,
    pipeline::{HexPipeline, ShadingProgram, Topology},
    shader::{ShaderLoader, ShaderModules},
    HexShadeError,
};

type PipelineKey = (ShadingProgram, Topology, TextureFormat);

pub struct Renderer {
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
    pub shaders: ShaderModules,

    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,

    pipelines: HashMap<PipelineKey, HexPipeline>,
}

// Per draw resources. They have to outlive the render pass that uses them
struct PreparedDraw {
    key: PipelineKey,
    vertex_buffer: Buffer,
    vertex_count: u32,
    bindings: Option<OutlineBindings>,
}

impl Renderer {
    // Creating some of the wgpu types requires async code
    pub async fn new(
        width: u32,
        height: u32,
        adapter: Adapter,
        format: TextureFormat,
    ) -> Result<Self, HexShadeError> {
        let adapter_info = adapter.get_info();
        info!(
            "Rendering with {} ({:?}, {:?})",
            adapter_info.name, adapter_info.backend, adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Hexagon device"),
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_defaults().using_resolution(adapter.limits()),
                    ..Default::default()
                },
                None,
            )
            .await?;
        check_size(width, height, &device.limits())?;

        let shaders = ShaderLoader::new().load(&device).await?;

        Ok(Self {
            adapter,
            device,
            queue,
            shaders,

            format,
            width,
            height,

            pipelines: HashMap::new(),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), HexShadeError> {
        check_size(new_width, new_height, &self.device.limits())?;
        self.width = new_width;
        self.height = new_height;
        Ok(())
    }

    /// Number of pipelines created so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    async fn prepare_pipeline(
        &mut self,
        program: ShadingProgram,
        topology: Topology,
    ) -> Result<PipelineKey, HexShadeError> {
        let key = (program, topology, self.format);
        if !self.pipelines.contains_key(&key) {
            let pipeline =
                HexPipeline::new(&self.device, &self.shaders, program, self.format, topology)
                    .await?;
            self.pipelines.insert(key, pipeline);
        }
        Ok(key)
    }

    async fn prepare_draws(&mut self, frame: &HexFrame) -> Result<Vec<PreparedDraw>, HexShadeError> {
        let mut prepared = Vec::new();
        for (index, draw) in frame.draws.iter().enumerate() {
            if draw.offsets.is_empty() {
                warn!("Skipping draw {index} ({}) without offsets", draw.program);
                continue;
            }

            let key = self.prepare_pipeline(draw.program, draw.topology).await?;

            let vertices = draw
                .offsets
                .iter()
                .map(|offset| HexVertex::new(*offset))
                .collect::<Vec<_>>();
            let vertex_buffer = self.device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some(&format!("Hex offsets {index}")),
                contents: bytemuck::cast_slice(&vertices),
                usage: BufferUsages::VERTEX,
            });

            let bindings = self.pipelines[&key]
                .bind_group_layout
                .as_ref()
                .map(|layout| OutlineBindings::new(&self.device, layout, &draw.params));

            prepared.push(PreparedDraw {
                key,
                vertex_buffer,
                vertex_count: vertices.len() as u32,
                bindings,
            });
        }
        Ok(prepared)
    }

    /// Clears `target` to the frame background and issues every draw in
    /// order within one render pass.
    pub async fn render(&mut self, frame: &HexFrame, target: &Texture) -> Result<(), HexShadeError> {
        let prepared = self.prepare_draws(frame).await?;
        let target_view = target.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Hexagon encoder"),
            });
        {
            let background = frame.background;
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Hexagon pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: background.red as f64,
                            g: background.green as f64,
                            b: background.blue as f64,
                            a: background.alpha as f64,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            for draw in &prepared {
                let pipeline = &self.pipelines[&draw.key];
                render_pass.set_pipeline(&pipeline.render_pipeline);
                if let Some(bindings) = &draw.bindings {
                    render_pass.set_bind_group(0, &bindings.bind_group, &[]);
                }
                render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                render_pass.draw(0..draw.vertex_count, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));

        Ok(())
    }
}

/// Render targets need both sides in `1..=max_texture_dimension_2d`.
pub(crate) fn check_size(width: u32, height: u32, limits: &Limits) -> Result<(), HexShadeError> {
    let max = limits.max_texture_dimension_2d;
    if (1..=max).contains(&width) && (1..=max).contains(&height) {
        Ok(())
    } else {
        Err(HexShadeError::InvalidSize { width, height, max })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sizes_inside_the_texture_limit_are_accepted() {
        let limits = Limits::downlevel_defaults();
        assert!(check_size(1, 1, &limits).is_ok());
        assert!(check_size(300, 20, &limits).is_ok());
        assert!(check_size(2048, 2048, &limits).is_ok());
    }

    #[test]
    fn empty_sizes_are_rejected() {
        let limits = Limits::downlevel_defaults();
        for (width, height) in [(0, 0), (0, 64), (64, 0)] {
            assert!(matches!(
                check_size(width, height, &limits),
                Err(HexShadeError::InvalidSize { width: w, height: h, max: 2048 })
                    if w == width && h == height
            ));
        }
    }

    #[test]
    fn sizes_past_the_texture_limit_are_rejected() {
        let limits = Limits::downlevel_defaults();
        assert!(matches!(
            check_size(4096, 4096, &limits),
            Err(HexShadeError::InvalidSize { max: 2048, .. })
        ));
        assert!(matches!(
            check_size(2049, 1, &limits),
            Err(HexShadeError::InvalidSize { width: 2049, .. })
        ));
    }
}

use futures_intrusive::channel::shared::oneshot_channel;
use image::{imageops::crop_imm, ImageBuffer, Rgba, RgbaImage};
use log::warn;
use wgpu::{Backends, Instance, PowerPreference, RequestAdapterOptions, TextureFormat};

use crate::{frame::HexFrame, HexShadeError, Renderer};

/// Linear so that fragment outputs land in the image without conversion.
pub const OFFSCREEN_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

pub struct OffscreenRenderer {
    pub instance: Instance,
    pub renderer: Renderer,
}

impl OffscreenRenderer {
    // Creating some of the wgpu types requires async code
    pub async fn new(width: u32, height: u32) -> Result<Self, HexShadeError> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: Self::instance_backends(),
            ..Default::default()
        });

        let fallback = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: true,
                compatible_surface: None,
            })
            .await;
        let adapter = match fallback {
            Some(adapter) => adapter,
            None => {
                warn!("No fallback adapter available, trying any adapter");
                instance
                    .request_adapter(&RequestAdapterOptions::default())
                    .await
                    .ok_or(HexShadeError::NoAdapter)?
            }
        };

        let renderer = Renderer::new(width, height, adapter, OFFSCREEN_FORMAT).await?;

        Ok(Self { instance, renderer })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), HexShadeError> {
        self.renderer.resize(new_width, new_height)
    }

    fn instance_backends() -> Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }

        #[cfg(not(target_os = "macos"))]
        {
            wgpu::Backends::VULKAN
        }
    }

    pub async fn draw(&mut self, frame: &HexFrame) -> Result<RgbaImage, HexShadeError> {
        let texture_desc = wgpu::TextureDescriptor {
            size: wgpu::Extent3d {
                width: self.renderer.width,
                height: self.renderer.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            label: Some("Offscreen target"),
            view_formats: &[],
        };
        let texture = self.renderer.device.create_texture(&texture_desc);

        self.renderer.render(frame, &texture).await?;

        let mut encoder =
            self.renderer
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Readback encoder"),
                });

        let pixel_size = std::mem::size_of::<u32>() as u32;
        let bytes_per_row = pixel_size * self.renderer.width;
        // Rows of a texture copy must be aligned to COPY_BYTES_PER_ROW_ALIGNMENT (256)
        let padded_bytes_per_row = bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_width = padded_bytes_per_row / pixel_size;
        let output_buffer = self.renderer.device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded_bytes_per_row * self.renderer.height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Readback buffer"),
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.renderer.height),
                },
            },
            texture_desc.size,
        );

        self.renderer.queue.submit(Some(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);

        // The mapping has to be requested and the device polled before
        // awaiting the result, otherwise nothing drives the map to completion
        let (tx, rx) = oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver only goes away if draw was cancelled
            let _ = tx.send(result);
        });
        self.renderer.device.poll(wgpu::Maintain::Wait);
        rx.receive().await.ok_or(HexShadeError::ReadbackCancelled)??;

        let data = buffer_slice.get_mapped_range().to_vec();
        output_buffer.unmap();
        let padded_image =
            ImageBuffer::<Rgba<u8>, _>::from_raw(padded_width, self.renderer.height, data)
                .ok_or(HexShadeError::ReadbackSize {
                    width: padded_width,
                    height: self.renderer.height,
                })?;

        Ok(crop_imm(
            &padded_image,
            0,
            0,
            self.renderer.width,
            self.renderer.height,
        )
        .to_image())
    }
}

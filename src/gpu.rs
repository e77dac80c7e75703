//! Turning wgpu device errors into `DemoError`s.

use crate::error::{DemoError, Result};

/// Run `create` inside out-of-memory and validation error scopes.
///
/// Any error the device reports while `create` runs is returned as
/// `DemoError::Gpu` instead of reaching the uncaptured error handler.
pub fn capture_errors<T>(
    device: &wgpu::Device,
    what: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(error) => Err(DemoError::Gpu {
            what,
            message: error.to_string(),
        }),
        None => Ok(value),
    }
}

/// Log device errors raised outside any error scope (e.g. during a frame)
pub fn log_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Box::new(|error| {
        log::error!("Uncaptured GPU error: {error}");
    }));
}

/// Device on any available adapter without a surface; `None` on machines
/// without one, so GPU tests can return early.
#[cfg(test)]
pub(crate) fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Test Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_shader_becomes_error() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };

        let result = capture_errors(&device, "shader", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Broken Shader"),
                source: wgpu::ShaderSource::Wgsl("@vertex fn vs_main( -> {".into()),
            })
        });

        assert!(matches!(result, Err(DemoError::Gpu { what: "shader", .. })));
    }

    #[test]
    fn test_invalid_buffer_becomes_error() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };

        // MAP_READ may only be combined with COPY_DST
        let result = capture_errors(&device, "buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Broken Buffer"),
                size: 64,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::VERTEX,
                mapped_at_creation: false,
            })
        });

        assert!(matches!(result, Err(DemoError::Gpu { what: "buffer", .. })));
    }

    #[test]
    fn test_valid_creation_passes_through() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };

        let buffer = capture_errors(&device, "buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Vertex Buffer"),
                size: 64,
                usage: wgpu::BufferUsages::VERTEX,
                mapped_at_creation: false,
            })
        })
        .unwrap();

        assert_eq!(buffer.size(), 64);
    }
}

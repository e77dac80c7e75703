//! Per-frame CPU work: pick a ring slot, advance the simulation and refresh
//! the slot's constants.

use glam::Mat4;

use crate::camera::OrbitCamera;
use crate::error::Result;
use crate::frame::{CompletionCounter, FrameConstants, FrameResourceRing, FrameSlot, PassConstants};
use crate::geometry::{colors, Vertex};
use crate::params::{DemoConfig, RenderConfig};
use crate::scene::RenderItemRegistry;
use crate::waves::{WaveDisturber, Waves};

/// Drives one frame through acquire, simulate and refresh.
///
/// Recording and presenting belong to the render system; once the frame is
/// submitted, `finish_frame` stamps the slot with a new completion value.
pub struct FrameOrchestrator<R, C> {
    ring: FrameResourceRing<R>,
    counter: C,

    waves: Waves,
    disturber: WaveDisturber,
    camera: OrbitCamera,

    render_config: RenderConfig,
    viewport: (u32, u32),
    proj: Mat4,

    /// Wave vertices rebuilt every frame before being copied into the slot
    wave_vertices: Vec<Vertex>,
}

impl<R, C> FrameOrchestrator<R, C>
where
    R: FrameConstants,
    C: CompletionCounter,
{
    pub fn new(ring: FrameResourceRing<R>, counter: C, waves: Waves, config: &DemoConfig) -> Self {
        let viewport = (config.render.window_width, config.render.window_height);
        let mut orchestrator = Self {
            ring,
            counter,
            wave_vertices: Vec::with_capacity(waves.vertex_count()),
            waves,
            disturber: WaveDisturber::new(&config.disturbance),
            camera: OrbitCamera::new(&config.camera),
            render_config: config.render.clone(),
            viewport,
            proj: Mat4::IDENTITY,
        };
        orchestrator.resize(viewport.0, viewport.1);
        orchestrator
    }

    /// Prepare the next frame.
    ///
    /// Blocks only when the slot about to be reused is still in flight.
    pub fn update(
        &mut self,
        items: &mut RenderItemRegistry,
        total_time_s: f32,
        delta_time_s: f32,
    ) -> Result<()> {
        self.ring.acquire_next_slot(&mut self.counter)?;

        self.disturber.tick(total_time_s, &mut self.waves);
        self.waves.update(delta_time_s);

        let view = self.camera.view_matrix();
        let pass = PassConstants::new(
            view,
            self.proj,
            self.camera.eye_position(),
            self.viewport,
            (self.render_config.near_plane_m, self.render_config.far_plane_m),
            total_time_s,
            delta_time_s,
        );

        self.wave_vertices.clear();
        self.wave_vertices.extend(
            self.waves
                .positions()
                .iter()
                .map(|p| Vertex::new(p.to_array(), colors::BLUE)),
        );

        let frame = &mut self.ring.current_mut().resources;
        items.update_object_constants(frame);
        frame.write_pass_constants(&pass);
        frame.write_wave_vertices(&self.wave_vertices);

        Ok(())
    }

    /// Slot prepared by the last `update`
    pub fn current_frame(&self) -> &FrameSlot<R> {
        self.ring.current()
    }

    pub fn current_frame_mut(&mut self) -> &mut FrameSlot<R> {
        self.ring.current_mut()
    }

    /// Signal a completion value after the frame's submission and stamp it on the slot
    pub fn finish_frame(&mut self) -> u64 {
        let fence = self.counter.signal();
        self.ring.stamp_current(fence);
        log::trace!(
            "Frame {} submitted from slot {} with fence {fence}",
            self.ring.frames_acquired(),
            self.ring.current_index()
        );
        fence
    }

    /// Wait until the GPU has finished everything submitted so far
    pub fn flush(&mut self) -> Result<()> {
        let fence = self.counter.signal();
        log::debug!("Flushing GPU work up to fence {fence}");
        self.counter.wait_until(fence)
    }

    /// New viewport size; rebuilds the projection
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.render_config.window_width = self.viewport.0;
        self.render_config.window_height = self.viewport.1;
        self.proj = Mat4::perspective_lh(
            self.render_config.fov_y_rad,
            self.render_config.aspect_ratio(),
            self.render_config.near_plane_m,
            self.render_config.far_plane_m,
        );
    }

    pub fn projection(&self) -> Mat4 {
        self.proj
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn waves(&self) -> &Waves {
        &self.waves
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}

use dynres_engine::device::{DynamicTargets, Gpu, GpuFrame};
use dynres_engine::gpu_timer::{Phase, PhaseTimers, WgpuTimestampQueries};
use dynres_engine::session::FramePlan;

pub type SceneTimers = PhaseTimers<WgpuTimestampQueries>;

/// Records one frame: clear, scene, post-process and scale, each bracketed by
/// its phase timer and all of them inside `Phase::InnerFrame`.
///
/// The scene and post-process passes carry no draws; they bind the dynamic
/// targets and viewport that a scene renderer would record into.
pub fn record_frame(
    gpu: &Gpu<'_>,
    frame: &mut GpuFrame,
    plan: &FramePlan,
    targets: &DynamicTargets,
    mut timers: Option<&mut SceneTimers>,
    scene_time: f64,
) {
    let GpuFrame {
        surface_texture,
        view,
        encoder,
    } = frame;
    let background = background_color(scene_time);

    if let Some(t) = timers.as_deref_mut() {
        t.begin(Phase::InnerFrame, encoder);
    }

    timed(&mut timers, Phase::Clear, encoder, |encoder| {
        if plan.dynamic {
            clear_dynamic(encoder, plan, targets, background);
        } else {
            clear_view(encoder, "backbuffer clear", view, background);
        }
    });

    timed(&mut timers, Phase::Scene, encoder, |encoder| {
        if plan.dynamic && plan.viewport.is_valid() {
            scene_pass(encoder, plan, targets);
        }
    });

    timed(&mut timers, Phase::PostProcess, encoder, |encoder| {
        if plan.dynamic {
            let extent = targets.active_extent(plan.viewport);
            encoder.copy_texture_to_texture(
                targets.color.texture.as_image_copy(),
                targets
                    .history(plan.write_index)
                    .final_color
                    .texture
                    .as_image_copy(),
                extent,
            );
        }
    });

    if let Some(t) = timers.as_deref_mut() {
        t.end(Phase::InnerFrame, encoder);
    }

    timed(&mut timers, Phase::Scale, encoder, |encoder| {
        if !plan.dynamic {
            return;
        }
        clear_view(encoder, "scale clear", view, wgpu::Color::BLACK);
        if !gpu.surface_accepts_copies() {
            return;
        }

        let backbuffer = &surface_texture.texture;
        let mut extent = targets.active_extent(plan.viewport);
        extent.width = extent.width.min(backbuffer.width());
        extent.height = extent.height.min(backbuffer.height());
        encoder.copy_texture_to_texture(
            targets
                .history(plan.resolve.current_index)
                .final_color
                .texture
                .as_image_copy(),
            backbuffer.as_image_copy(),
            extent,
        );
    });
}

fn timed(
    timers: &mut Option<&mut SceneTimers>,
    phase: Phase,
    encoder: &mut wgpu::CommandEncoder,
    record: impl FnOnce(&mut wgpu::CommandEncoder),
) {
    if let Some(t) = timers.as_deref_mut() {
        t.begin(phase, encoder);
    }
    record(encoder);
    if let Some(t) = timers.as_deref_mut() {
        t.end(phase, encoder);
    }
}

/// Slowly cycling clear color driven by the smoothed scene clock, so pausing
/// visibly freezes the scene.
fn background_color(time: f64) -> wgpu::Color {
    let phase = time * 0.5;
    wgpu::Color {
        r: 0.15 + 0.1 * phase.sin(),
        g: 0.12 + 0.08 * (phase * 0.7).cos(),
        b: 0.2 + 0.1 * (phase * 1.3).sin(),
        a: 1.0,
    }
}

fn clear_view(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    color: wgpu::Color,
) {
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

fn color_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}

fn depth_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<f32>,
) -> Option<wgpu::RenderPassDepthStencilAttachment<'_>> {
    Some(wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    })
}

/// Clears scene color, depth and this frame's velocity target.
fn clear_dynamic(
    encoder: &mut wgpu::CommandEncoder,
    plan: &FramePlan,
    targets: &DynamicTargets,
    background: wgpu::Color,
) {
    let velocity = &targets.history(plan.write_index).velocity;
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("dynamic clear"),
        color_attachments: &[
            color_attachment(&targets.color.view, wgpu::LoadOp::Clear(background)),
            color_attachment(&velocity.view, wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)),
        ],
        depth_stencil_attachment: depth_attachment(&targets.depth.view, wgpu::LoadOp::Clear(1.0)),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

fn scene_pass(encoder: &mut wgpu::CommandEncoder, plan: &FramePlan, targets: &DynamicTargets) {
    let velocity = &targets.history(plan.write_index).velocity;
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("scene"),
        color_attachments: &[
            color_attachment(&targets.color.view, wgpu::LoadOp::Load),
            color_attachment(&velocity.view, wgpu::LoadOp::Load),
        ],
        depth_stencil_attachment: depth_attachment(&targets.depth.view, wgpu::LoadOp::Load),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    let vp = plan.viewport;
    pass.set_viewport(vp.x, vp.y, vp.width, vp.height, vp.min_depth, vp.max_depth);
    let extent = targets.active_extent(vp);
    pass.set_scissor_rect(0, 0, extent.width, extent.height);
}

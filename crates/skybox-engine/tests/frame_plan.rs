//! First-frame scenario for the standard scene, without a GPU.

use glam::{Mat4, Vec3, Vec4};

use skybox_engine::frame::{
    ClearValues, Draw, FrameCycle, FramePlan, FrameState, Layer, Layers, MatrixUploads,
    StandardDraws,
};
use skybox_engine::pipeline::DepthMode;
use skybox_engine::resources::{
    self, BindingSetHandle, BufferHandle, MeshHandle, ProgramHandle, ShaderPairDesc,
};
use skybox_engine::scene::{SceneConfig, SceneState};

const EPS: f32 = 1e-4;

struct Standard {
    config: SceneConfig,
    sky_indices: u32,
    cube_indices: u32,
    plan: FramePlan,
}

fn standard() -> Standard {
    let config = SceneConfig::default();
    let sky = resources::sky_sphere(config.sky.slices, config.sky.stacks, config.sky.radius);
    let cube = resources::cube(config.cube_half_extent);
    sky.validate().unwrap();
    cube.validate().unwrap();

    let draws = StandardDraws {
        sky: Some(Draw {
            mesh: MeshHandle::from_raw(0),
            program: ProgramHandle::from_raw(0),
            bindings: BindingSetHandle::from_raw(0),
            index_count: sky.index_count(),
        }),
        cube: Some(Draw {
            mesh: MeshHandle::from_raw(1),
            program: ProgramHandle::from_raw(1),
            bindings: BindingSetHandle::from_raw(1),
            index_count: cube.index_count(),
        }),
    };
    let plan = FramePlan::standard(
        Layers::default(),
        draws,
        ClearValues::new(config.clear_color),
    );

    Standard {
        sky_indices: sky.index_count(),
        cube_indices: cube.index_count(),
        config,
        plan,
    }
}

#[test]
fn first_frame_matrices() {
    let s = standard();
    let scene = SceneState::new(1280, 720);
    let m = scene.matrices(&s.config);

    assert!(m.model.abs_diff_eq(Mat4::IDENTITY, EPS));

    let eye = scene.eye(&s.config.camera);
    assert!(eye.abs_diff_eq(Vec3::new(0.0, 2.0, 6.0), EPS));

    // The origin sits in front of the camera.
    let clip = m.view_projection * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < EPS && ndc.y.abs() < EPS);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);

    let origin = scene.background_view(&s.config.camera) * Vec4::W;
    assert!(origin.truncate().abs_diff_eq(Vec3::ZERO, EPS));
}

#[test]
fn first_frame_pass_order_and_counts() {
    let s = standard();
    let counts = |mesh: MeshHandle| match mesh.index() {
        0 => Some(s.sky_indices),
        1 => Some(s.cube_indices),
        _ => None,
    };
    s.plan.validate(counts).unwrap();

    let passes = s.plan.passes();
    assert_eq!(passes.len(), 2);

    let sky = &passes[0];
    assert_eq!(sky.layer, Layer::Background);
    assert_eq!(sky.depth, DepthMode::Background);
    assert!(sky.clear.is_some());
    assert_eq!(sky.draw.map(|d| d.index_count), Some(s.sky_indices));
    assert_eq!(s.sky_indices, s.config.sky.slices * s.config.sky.stacks * 6);

    let cube = &passes[1];
    assert_eq!(cube.layer, Layer::Foreground);
    assert_eq!(cube.depth, DepthMode::Default);
    assert!(cube.clear.is_none());
    assert_eq!(cube.draw.map(|d| d.index_count), Some(36));
}

#[test]
fn first_frame_walks_the_cycle() {
    let mut cycle = FrameCycle::new();
    cycle.advance(FrameState::Ready).unwrap();
    for next in [
        FrameState::Updating,
        FrameState::DrawingBackground,
        FrameState::DrawingForeground,
        FrameState::Presenting,
        FrameState::Ready,
    ] {
        cycle.advance(next).unwrap();
    }
    assert!(cycle.terminate());
    assert_eq!(cycle.state(), FrameState::Terminated);
}

#[test]
fn shipped_programs_compile() {
    resources::compile_pair(&ShaderPairDesc::sky()).unwrap();
    resources::compile_pair(&ShaderPairDesc::cube()).unwrap();
}

#[test]
fn first_frame_uploads_the_scene_matrices() {
    let s = standard();
    let mut scene = SceneState::new(1280, 720);
    scene.advance(s.config.motion.spin.step(1.0 / 60.0), 0.0);
    let m = scene.matrices(&s.config);

    let mut next = 0;
    let uploads = MatrixUploads::standard(Layers::default(), |_| {
        next += 1;
        Ok(BufferHandle::from_raw(next - 1))
    })
    .unwrap();

    let sky: Vec<_> = uploads.buffers(Layer::Background);
    let cube: Vec<_> = uploads.buffers(Layer::Foreground);
    let written: Vec<_> = uploads.writes(&m).collect();
    assert_eq!(written.len(), 3);

    let contents = |handle: BufferHandle| {
        written
            .iter()
            .find(|(buffer, _)| *buffer == handle)
            .map(|(_, cols)| *cols)
            .unwrap()
    };
    assert_eq!(contents(sky[0]), m.background_view_projection.to_cols_array_2d());
    assert_eq!(contents(cube[0]), m.model.to_cols_array_2d());
    assert_eq!(contents(cube[1]), m.view_projection.to_cols_array_2d());
}

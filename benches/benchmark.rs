use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::math::{IVec3, Vec2, Vec3};
use voxel_builder::block::{blocks, raycast, Block, MaterialRegistry};
use voxel_builder::player::{Body, InputAction, InputIntent, Mode, MovementIntegrator, Phase, Player, PlayerLook};
use voxel_builder::player::CollisionResolver;
use voxel_builder::settings::{BuildSettings, PhysicsSettings, Settings, TerrainSettings};
use voxel_builder::terrain::HeightField;
use voxel_builder::world::{VoxelWorld, WorldSnapshot};

fn hilly_world() -> VoxelWorld {
    VoxelWorld::new(&TerrainSettings::default(), &BuildSettings::default(), MaterialRegistry::builtin())
}

/// Flat ground at y = 30 with a wall of placed stone along x = 3.
fn walled_world() -> VoxelWorld {
    let terrain = TerrainSettings { amplitude: 0, stone_threshold: 10.0, ..TerrainSettings::default() };
    let mut world = VoxelWorld::new(&terrain, &BuildSettings::default(), MaterialRegistry::builtin());
    let blocks: Vec<Block> = (-8..=8)
        .flat_map(|z| (31..=33).map(move |y| Block { position: IVec3::new(3, y, z), material: blocks::STONE, placed: true }))
        .collect();
    if let Err(e) = world.restore(&WorldSnapshot { seed: terrain.seed, blocks }) {
        panic!("bench world: {e}");
    }
    world
}

/// Lazy height sampling over the whole play area.
fn bench_height_sampling(c: &mut Criterion) {
    let field = HeightField::new(&TerrainSettings::default());
    c.bench_function("height_sampling", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for x in -64..64 {
                for z in -64..64 {
                    sum += i64::from(field.height_at(black_box(x), black_box(z)));
                }
            }
            black_box(sum)
        })
    });
}

fn bench_height_bake(c: &mut Criterion) {
    let settings = TerrainSettings::default();
    c.bench_function("height_bake", |b| {
        b.iter(|| {
            let mut field = HeightField::new(black_box(&settings));
            field.bake();
            black_box(field.baked_map().map(|m| m.side()))
        })
    });
}

/// Crosshair rays in a fan around the spawn point, hitting terrain at various distances.
fn bench_raycast(c: &mut Criterion) {
    let world = hilly_world();
    let eye = world.spawn_position(1.8);
    c.bench_function("raycast_fan", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for i in 0..256 {
                let yaw = i as f32 * std::f32::consts::TAU / 256.0;
                let dir = Vec3::new(yaw.sin(), -0.4, yaw.cos());
                hits += usize::from(raycast(&world, black_box(eye), dir, 8.0).is_some());
            }
            black_box(hits)
        })
    });
}

fn bench_collision_resolve(c: &mut Criterion) {
    let world = walled_world();
    let physics = PhysicsSettings::default();
    let resolver = CollisionResolver::new(&world, &physics);
    let body = Body::new(0.3, 1.8, Vec3::new(2.6, 31.8, 0.0));
    c.bench_function("collision_resolve", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&body), Mode::Walking, physics.ground_probe)))
    });
}

/// One simulated second of walking into a wall, jumping every half second.
fn bench_movement_steps(c: &mut Criterion) {
    let world = walled_world();
    let physics = PhysicsSettings::default();
    let integrator = MovementIntegrator::new(&world, &physics);
    c.bench_function("movement_walk_jump", |b| {
        b.iter(|| {
            let mut player = Player::new(Body::from_settings(&physics, Vec3::new(0.0, 31.8, 0.0)), &physics);
            let mut intent = InputIntent { yaw: -std::f32::consts::FRAC_PI_2, ..InputIntent::default() };
            intent.apply(InputAction::MoveForward, Phase::Held);
            for tick in 0..60 {
                intent.begin_frame();
                let phase = if tick % 30 == 0 { Phase::Pressed } else { Phase::Released };
                intent.apply(InputAction::Jump, phase);
                integrator.update(&mut player, &intent, 1.0 / 60.0);
            }
            black_box(player.body.position)
        })
    });
}

fn bench_camera_look(c: &mut Criterion) {
    let settings = Settings::default();
    c.bench_function("camera_look", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            let mut state: u32 = 0x1234_5678;
            for _ in 0..1_000usize {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dx = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dy = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((look.yaw, look.pitch))
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_height_sampling,
        bench_height_bake,
        bench_raycast,
        bench_collision_resolve,
        bench_movement_steps,
        bench_camera_look
}
criterion_main!(benches);

//! Cube-per-cell renderer for the viewer.
//!
//! Every exposed cell within `graphics.view_radius` columns of the origin
//! gets one entity sharing a unit cube mesh and a per-material
//! `StandardMaterial`. A world observer queues each `BlockEvent`; the
//! `apply_block_events` system drains the queue once per frame and refreshes
//! the edited cell and its neighbours. A restore or reset rebuilds everything.
use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use voxel_builder::block::{BlockId, MaterialRegistry};
use voxel_builder::settings::Settings;
use voxel_builder::world::cell::cell_center;
use voxel_builder::world::view::affected_cells;
use voxel_builder::world::{BlockEvent, VoxelWorld};

#[derive(Component)]
pub struct CellCube;

/// Shared render handles.
#[derive(Resource)]
pub struct BlockRenderAssets {
    mesh: Handle<Mesh>,
    materials: HashMap<BlockId, Handle<StandardMaterial>>,
    fallback: Handle<StandardMaterial>,
}

impl BlockRenderAssets {
    fn material(&self, id: BlockId) -> Handle<StandardMaterial> {
        self.materials.get(&id).unwrap_or(&self.fallback).clone()
    }
}

/// Entities currently drawn, by cell, with the material they were drawn with.
#[derive(Resource, Default)]
pub struct CellEntities(HashMap<IVec3, (Entity, BlockId)>);

/// Events queued by the world observer since the last frame.
#[derive(Resource, Clone, Default)]
pub struct PendingBlockEvents(Arc<Mutex<Vec<BlockEvent>>>);

impl PendingBlockEvents {
    fn push(&self, event: BlockEvent) {
        match self.0.lock() {
            Ok(mut queue) => queue.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    fn drain(&self) -> Vec<BlockEvent> {
        let mut queue = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("block event queue mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        std::mem::take(&mut *queue)
    }
}

fn material_for(registry: &MaterialRegistry, id: BlockId) -> StandardMaterial {
    let (r, g, b) = registry.get_by_id(id).map_or((0.8, 0.2, 0.8), |m| m.color_tint);
    let translucent = registry.get_by_id(id).is_some_and(|m| m.name == "glass");
    StandardMaterial {
        base_color: if translucent { Color::srgba(r, g, b, 0.5) } else { Color::srgb(r, g, b) },
        alpha_mode: if translucent { AlphaMode::Blend } else { AlphaMode::Opaque },
        perceptual_roughness: 0.9,
        ..default()
    }
}

/// Create the shared mesh and materials, subscribe to the world and draw the
/// initial view.
#[allow(clippy::needless_pass_by_value)]
pub fn setup_block_render(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut world: ResMut<VoxelWorld>,
    settings: Res<Settings>,
) {
    let registry = world.registry();
    let assets = BlockRenderAssets {
        mesh: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        materials: registry
            .names_by_id
            .keys()
            .map(|&id| (id, materials.add(material_for(registry, id))))
            .collect(),
        fallback: materials.add(material_for(registry, BlockId::MAX)),
    };

    let pending = PendingBlockEvents::default();
    let queue = pending.clone();
    world.observers_mut().subscribe(move |event| queue.push(*event));

    let mut entities = CellEntities::default();
    let cells = world.exposed_cells(settings.graphics.view_radius);
    info!("drawing {} exposed cells", cells.len());
    for cell in cells {
        refresh_cell(&mut commands, &assets, &mut entities, &world, cell);
    }

    commands.insert_resource(assets);
    commands.insert_resource(entities);
    commands.insert_resource(pending);
}

fn in_view(cell: IVec3, radius: i32) -> bool {
    cell.x.abs() <= radius && cell.z.abs() <= radius
}

/// Bring the entity for `cell` in line with the world.
fn refresh_cell(
    commands: &mut Commands,
    assets: &BlockRenderAssets,
    entities: &mut CellEntities,
    world: &VoxelWorld,
    cell: IVec3,
) {
    let wanted = world.is_exposed(cell).then(|| world.material_at(cell)).flatten();
    match (entities.0.get(&cell).copied(), wanted) {
        (Some((_, drawn)), Some(material)) if drawn == material => {}
        (current, wanted) => {
            if let Some((entity, _)) = current {
                commands.entity(entity).despawn();
                entities.0.remove(&cell);
            }
            if let Some(material) = wanted {
                let entity = commands
                    .spawn((
                        PbrBundle {
                            mesh: assets.mesh.clone(),
                            material: assets.material(material),
                            transform: Transform::from_translation(cell_center(cell)),
                            ..default()
                        },
                        CellCube,
                    ))
                    .id();
                entities.0.insert(cell, (entity, material));
            }
        }
    }
}

/// Apply queued block events to the drawn cubes.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_block_events(
    mut commands: Commands,
    pending: Res<PendingBlockEvents>,
    assets: Res<BlockRenderAssets>,
    mut entities: ResMut<CellEntities>,
    world: Res<VoxelWorld>,
    settings: Res<Settings>,
) {
    let events = pending.drain();
    if events.is_empty() {
        return;
    }
    let radius = settings.graphics.view_radius;

    if events.iter().any(|e| matches!(e, BlockEvent::Restored)) {
        for (_, (entity, _)) in entities.0.drain() {
            commands.entity(entity).despawn();
        }
        for cell in world.exposed_cells(radius) {
            refresh_cell(&mut commands, &assets, &mut entities, &world, cell);
        }
        debug!("rebuilt view after restore, {} cubes", entities.0.len());
        return;
    }

    for event in events {
        let Some(position) = event.position() else { continue };
        if let BlockEvent::ProtectedHit { .. } = event {
            continue;
        }
        for cell in affected_cells(position) {
            if in_view(cell, radius) {
                refresh_cell(&mut commands, &assets, &mut entities, &world, cell);
            }
        }
    }
}

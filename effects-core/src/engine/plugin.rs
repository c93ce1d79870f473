use bevy::prelude::*;

use crate::aggregator::PlayerStats;
use crate::engine::EffectsEngine;

/// Wires effect aggregation into a Bevy app. Stats are only recomputed for
/// entities that receive a [`RecomputeStats`] event.
pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RecomputeStats>()
            .add_event::<StatsRecomputed>()
            .add_systems(Update, apply_recompute_requests);
    }
}

/// Per-entity equipment state
#[derive(Component, Debug, Clone, Default)]
pub struct Loadout(pub EffectsEngine);

/// Request an aggregation pass for one entity after a batch of equip changes
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeStats {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StatsRecomputed {
    pub entity: Entity,
    pub stats: PlayerStats,
}

fn apply_recompute_requests(
    mut commands: Commands,
    mut requests: EventReader<RecomputeStats>,
    mut loadouts: Query<&mut Loadout>,
    mut recomputed: EventWriter<StatsRecomputed>,
) {
    let mut handled: Vec<Entity> = Vec::new();
    for request in requests.read() {
        if handled.contains(&request.entity) {
            continue;
        }
        handled.push(request.entity);

        let Ok(mut loadout) = loadouts.get_mut(request.entity) else {
            tracing::warn!(entity = ?request.entity, "recompute requested for entity without loadout");
            continue;
        };
        let stats = *loadout.0.recompute();
        commands.entity(request.entity).insert(stats);
        recomputed.send(StatsRecomputed {
            entity: request.entity,
            stats,
        });
    }
}

//! Block change notifications.
//!
//! Observers are plain callbacks owned by the world. They run synchronously,
//! in subscription order, right after the grid has been mutated, so an
//! observer always sees the world in its post-mutation state.

use crate::block::BlockId;
use bevy::math::IVec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEvent {
    /// A player block now fills `position`.
    Placed { position: IVec3, material: BlockId },
    /// `position` became air; `material` is what was there.
    Removed { position: IVec3, material: BlockId },
    /// A removal hit an indestructible cell. Nothing changed, but listeners
    /// may want to rebuild the neighbourhood.
    ProtectedHit { position: IVec3 },
    /// The whole layout was replaced (reset or snapshot restore).
    Restored,
}

impl BlockEvent {
    /// Cell the event concerns, if it is about a single cell.
    #[must_use]
    pub fn position(&self) -> Option<IVec3> {
        match *self {
            BlockEvent::Placed { position, .. }
            | BlockEvent::Removed { position, .. }
            | BlockEvent::ProtectedHit { position } => Some(position),
            BlockEvent::Restored => None,
        }
    }
}

/// Handle returned by [`BlockObservers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut(&BlockEvent) + Send + Sync>;

#[derive(Default)]
pub struct BlockObservers {
    next_id: u64,
    callbacks: Vec<(ObserverId, Callback)>,
}

impl BlockObservers {
    pub fn subscribe(&mut self, callback: impl FnMut(&BlockEvent) + Send + Sync + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(other, _)| *other != id);
        self.callbacks.len() != before
    }

    pub fn notify(&mut self, event: &BlockEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for BlockObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockObservers").field("subscribed", &self.callbacks.len()).finish()
    }
}

//! Map directory and the active collision set
//!
//! Switching maps swaps the whole collision set in one step, so movement
//! queries never see a half-built map.

use crate::WorldHandle;
use indexmap::IndexMap;
use skald_core::{MapId, MapRegistry};
use skald_script::MapDef;

/// An axis-aligned impassable rectangle in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Static shape of one map
#[derive(Debug, Clone)]
pub struct MapPlan {
    pub name: String,
    pub blockers: Vec<Rect>,
}

/// All known maps and the collision set of the active one
#[derive(Debug, Default)]
pub struct MapDirectory {
    maps: IndexMap<MapId, MapPlan>,
    active: Option<MapId>,
    collision: Vec<Rect>,
}

impl MapDirectory {
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a MapDef>) -> Self {
        let maps = defs
            .into_iter()
            .map(|def| {
                (
                    def.id,
                    MapPlan {
                        name: def.name.clone(),
                        blockers: def
                            .blockers
                            .iter()
                            .map(|b| Rect {
                                x: b.x,
                                y: b.y,
                                w: b.w,
                                h: b.h,
                            })
                            .collect(),
                    },
                )
            })
            .collect();
        Self {
            maps,
            active: None,
            collision: Vec::new(),
        }
    }

    /// Switch to a map and rebuild collision; false for unknown ids
    pub fn activate(&mut self, map: MapId) -> bool {
        let Some(plan) = self.maps.get(&map) else {
            return false;
        };
        self.active = Some(map);
        self.collision = plan.blockers.clone();
        true
    }

    pub fn active(&self) -> Option<MapId> {
        self.active
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active
            .and_then(|id| self.maps.get(&id))
            .map(|plan| plan.name.as_str())
    }

    /// True when a blocker of the active map covers this tile
    pub fn blocked_at(&self, x: i32, y: i32) -> bool {
        self.collision.iter().any(|rect| rect.contains(x, y))
    }
}

impl MapRegistry for WorldHandle<MapDirectory> {
    fn set_active(&mut self, map: MapId) -> bool {
        self.0.borrow_mut().activate(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skald_script::BlockerDef;

    fn directory() -> MapDirectory {
        let mut town = MapDef::new(MapId(1), "Town");
        town.blockers = vec![BlockerDef { x: 0, y: 0, w: 2, h: 2 }];
        let mut cellar = MapDef::new(MapId(2), "Cellar");
        cellar.blockers = vec![BlockerDef { x: 5, y: 5, w: 1, h: 3 }];
        MapDirectory::from_defs([&town, &cellar])
    }

    #[test]
    fn test_activate_unknown_map_fails() {
        let mut directory = directory();
        assert!(!directory.activate(MapId(9)));
        assert!(directory.active().is_none());
        assert!(!directory.blocked_at(0, 0));
    }

    #[test]
    fn test_activate_rebuilds_collision() {
        let mut directory = directory();
        assert!(directory.activate(MapId(1)));
        assert_eq!(directory.active_name(), Some("Town"));
        assert!(directory.blocked_at(1, 1));
        assert!(!directory.blocked_at(2, 2));

        assert!(directory.activate(MapId(2)));
        assert!(!directory.blocked_at(1, 1));
        assert!(directory.blocked_at(5, 7));
        assert!(!directory.blocked_at(5, 8));
    }
}

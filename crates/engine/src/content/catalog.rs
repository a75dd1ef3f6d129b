use std::collections::HashMap;

use super::types::{Inspectable, Wall, WallId, Zone};
use super::validation::{validate_catalog, CatalogIntegrityError};

/// Immutable room content for one chapter. Runtime status never lives here.
#[derive(Debug, Clone)]
pub struct RoomCatalog {
    chapter: String,
    walls: Vec<Wall>,
    flags: Vec<String>,
    inspectables: Vec<Inspectable>,
    zone_locations: HashMap<String, (WallId, usize)>,
}

impl RoomCatalog {
    pub fn new(
        chapter: impl Into<String>,
        walls: Vec<Wall>,
        flags: Vec<String>,
        inspectables: Vec<Inspectable>,
    ) -> Result<Self, CatalogIntegrityError> {
        validate_catalog(&walls, &inspectables)?;

        let mut zone_locations = HashMap::new();
        for wall in &walls {
            for (zone_index, zone) in wall.zones.iter().enumerate() {
                zone_locations.insert(zone.id.clone(), (wall.id, zone_index));
            }
        }

        Ok(Self {
            chapter: chapter.into(),
            walls,
            flags,
            inspectables,
            zone_locations,
        })
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall(&self, id: WallId) -> &Wall {
        // Construction guarantees one wall per WallId.
        &self.walls[id.index()]
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        let (wall_id, zone_index) = self.zone_locations.get(zone_id)?;
        self.walls[wall_id.index()].zones.get(*zone_index)
    }

    pub fn wall_of_zone(&self, zone_id: &str) -> Option<WallId> {
        self.zone_locations.get(zone_id).map(|(wall_id, _)| *wall_id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.walls.iter().flat_map(|wall| wall.zones.iter())
    }

    /// Flags the chapter starts with, all initially false.
    pub fn declared_flags(&self) -> &[String] {
        &self.flags
    }

    pub fn inspectable(&self, id: &str) -> Option<&Inspectable> {
        self.inspectables
            .iter()
            .find(|inspectable| inspectable.id == id)
    }

    pub fn inspectables(&self) -> &[Inspectable] {
        &self.inspectables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::{ColorType, PercentRect, ZoneKind, WALL_COUNT};

    fn walls_with_zone_on(wall_index: usize, zone_id: &str) -> Vec<Wall> {
        (0..WALL_COUNT)
            .map(|index| Wall {
                id: WallId::new(index).expect("wall"),
                name: format!("wall{index}"),
                color: [10, 10, 10],
                background: None,
                zones: if index == wall_index {
                    vec![Zone {
                        id: zone_id.to_string(),
                        name: "Sofa".to_string(),
                        rect: PercentRect {
                            top: 1.0,
                            left: 1.0,
                            width: 5.0,
                            height: 5.0,
                        },
                        color_type: ColorType::Item,
                        kind: ZoneKind::PickupItem {
                            item_name: "Coin".to_string(),
                        },
                    }]
                } else {
                    Vec::new()
                },
                props: Vec::new(),
                overlays: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn zone_lookup_spans_all_walls() {
        let catalog =
            RoomCatalog::new("test", walls_with_zone_on(2, "south-sofa"), Vec::new(), Vec::new())
                .expect("catalog");
        assert_eq!(catalog.zone("south-sofa").map(|zone| zone.name.as_str()), Some("Sofa"));
        assert_eq!(catalog.wall_of_zone("south-sofa"), WallId::new(2));
        assert!(catalog.zone("missing").is_none());
        assert_eq!(catalog.zones().count(), 1);
    }

    #[test]
    fn construction_runs_integrity_checks() {
        let mut walls = walls_with_zone_on(0, "a");
        walls.truncate(2);
        let err = RoomCatalog::new("test", walls, Vec::new(), Vec::new()).expect_err("err");
        assert!(matches!(err, CatalogIntegrityError::WallCount { .. }));
    }
}

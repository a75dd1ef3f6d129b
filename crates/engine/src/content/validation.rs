use std::collections::HashSet;

use thiserror::Error;

use crate::image_keys::{validate_image_key, ImageKeyError};

use super::types::{Inspectable, PercentRect, Wall, ZoneKind, WALL_COUNT};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogIntegrityError {
    #[error("catalog must define exactly {expected} walls, found {found}")]
    WallCount { expected: usize, found: usize },
    #[error("wall at position {position} has index {index}; walls must be ordered 0..3")]
    WallOrder { position: usize, index: usize },
    #[error("zone id '{zone_id}' is defined more than once")]
    DuplicateZoneId { zone_id: String },
    #[error("{owner} '{id}' has geometry outside the viewport: {rect:?}")]
    GeometryOutOfBounds {
        owner: &'static str,
        id: String,
        rect: PercentRect,
    },
    #[error("prop '{prop_id}' on wall {wall} links to zone '{zone_id}', which is not on that wall")]
    PropZoneMissing {
        wall: usize,
        prop_id: String,
        zone_id: String,
    },
    #[error("prop id '{prop_id}' is repeated on wall {wall}")]
    DuplicatePropId { wall: usize, prop_id: String },
    #[error("zone '{zone_id}' inspects '{inspect_item}', which has no InspectDef")]
    InspectableMissing {
        zone_id: String,
        inspect_item: String,
    },
    #[error("codelock zone '{zone_id}' needs a non-empty numeric code")]
    InvalidCode { zone_id: String },
    #[error("placement zone '{zone_id}' needs at least one slot")]
    PlacementWithoutSlots { zone_id: String },
    #[error("placement zone '{zone_id}' accepts '{item}' in more than one slot")]
    DuplicatePlacementItem { zone_id: String, item: String },
    #[error("{owner} '{id}' has an invalid image key '{key}': {source}")]
    InvalidImageKey {
        owner: &'static str,
        id: String,
        key: String,
        #[source]
        source: ImageKeyError,
    },
}

pub(crate) fn validate_catalog(
    walls: &[Wall],
    inspectables: &[Inspectable],
) -> Result<(), CatalogIntegrityError> {
    if walls.len() != WALL_COUNT {
        return Err(CatalogIntegrityError::WallCount {
            expected: WALL_COUNT,
            found: walls.len(),
        });
    }

    let inspectable_ids = inspectables
        .iter()
        .map(|inspectable| inspectable.id.as_str())
        .collect::<HashSet<_>>();
    let mut zone_ids = HashSet::<&str>::new();

    for (position, wall) in walls.iter().enumerate() {
        if wall.id.index() != position {
            return Err(CatalogIntegrityError::WallOrder {
                position,
                index: wall.id.index(),
            });
        }
        if let Some(key) = wall.background.as_deref() {
            check_image_key("wall", &wall.name, key)?;
        }

        for zone in &wall.zones {
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(CatalogIntegrityError::DuplicateZoneId {
                    zone_id: zone.id.clone(),
                });
            }
            check_rect("zone", &zone.id, zone.rect)?;
            validate_zone_kind(&zone.id, &zone.kind, &inspectable_ids)?;
        }

        let mut prop_ids = HashSet::<&str>::new();
        for prop in &wall.props {
            if !prop_ids.insert(prop.id.as_str()) {
                return Err(CatalogIntegrityError::DuplicatePropId {
                    wall: position,
                    prop_id: prop.id.clone(),
                });
            }
            let rect = PercentRect {
                top: prop.top,
                left: prop.left,
                width: prop.width,
                height: prop.height.unwrap_or(0.0),
            };
            check_rect("prop", &prop.id, rect)?;
            if let Some(key) = prop.image.as_deref() {
                check_image_key("prop", &prop.id, key)?;
            }
            if let Some(zone_id) = prop.zone_id.as_deref() {
                if wall.zone(zone_id).is_none() {
                    return Err(CatalogIntegrityError::PropZoneMissing {
                        wall: position,
                        prop_id: prop.id.clone(),
                        zone_id: zone_id.to_string(),
                    });
                }
            }
        }

        for overlay in &wall.overlays {
            check_rect("overlay", &overlay.flag, overlay.rect)?;
        }
    }

    Ok(())
}

fn validate_zone_kind(
    zone_id: &str,
    kind: &ZoneKind,
    inspectable_ids: &HashSet<&str>,
) -> Result<(), CatalogIntegrityError> {
    match kind {
        ZoneKind::Inspect { inspect_item } if !inspectable_ids.contains(inspect_item.as_str()) => {
            Err(CatalogIntegrityError::InspectableMissing {
                zone_id: zone_id.to_string(),
                inspect_item: inspect_item.clone(),
            })
        }
        ZoneKind::CodeLock(spec)
            if spec.correct_code.is_empty()
                || !spec.correct_code.chars().all(|ch| ch.is_ascii_digit()) =>
        {
            Err(CatalogIntegrityError::InvalidCode {
                zone_id: zone_id.to_string(),
            })
        }
        ZoneKind::Placement(spec) => {
            if spec.slots.is_empty() {
                return Err(CatalogIntegrityError::PlacementWithoutSlots {
                    zone_id: zone_id.to_string(),
                });
            }
            let mut items = HashSet::<&str>::new();
            for slot in &spec.slots {
                if !items.insert(slot.item.as_str()) {
                    return Err(CatalogIntegrityError::DuplicatePlacementItem {
                        zone_id: zone_id.to_string(),
                        item: slot.item.clone(),
                    });
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_rect(owner: &'static str, id: &str, rect: PercentRect) -> Result<(), CatalogIntegrityError> {
    if rect.fits_viewport() {
        Ok(())
    } else {
        Err(CatalogIntegrityError::GeometryOutOfBounds {
            owner,
            id: id.to_string(),
            rect,
        })
    }
}

fn check_image_key(owner: &'static str, id: &str, key: &str) -> Result<(), CatalogIntegrityError> {
    validate_image_key(key).map_err(|source| CatalogIntegrityError::InvalidImageKey {
        owner,
        id: id.to_string(),
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::{
        CodeLockSpec, ColorType, PlacementSlot, PlacementSpec, Prop, WallId, Zone,
    };

    fn rect(top: f32, left: f32, width: f32, height: f32) -> PercentRect {
        PercentRect {
            top,
            left,
            width,
            height,
        }
    }

    fn zone(id: &str, kind: ZoneKind) -> Zone {
        Zone {
            id: id.to_string(),
            name: id.to_string(),
            rect: rect(10.0, 10.0, 10.0, 10.0),
            color_type: ColorType::Default,
            kind,
        }
    }

    fn pickup(id: &str) -> Zone {
        zone(
            id,
            ZoneKind::PickupItem {
                item_name: format!("{id} item"),
            },
        )
    }

    fn four_walls() -> Vec<Wall> {
        (0..WALL_COUNT)
            .map(|index| Wall {
                id: WallId::new(index).expect("wall"),
                name: format!("wall{index}"),
                color: [0, 0, 0],
                background: None,
                zones: Vec::new(),
                props: Vec::new(),
                overlays: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn empty_four_wall_catalog_is_valid() {
        assert_eq!(validate_catalog(&four_walls(), &[]), Ok(()));
    }

    #[test]
    fn wrong_wall_count_fails() {
        let mut walls = four_walls();
        walls.pop();
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::WallCount { found: 3, .. })
        ));
    }

    #[test]
    fn zone_ids_are_unique_across_walls() {
        let mut walls = four_walls();
        walls[0].zones.push(pickup("dup"));
        walls[2].zones.push(pickup("dup"));
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::DuplicateZoneId { zone_id }) if zone_id == "dup"
        ));
    }

    #[test]
    fn prop_must_link_to_zone_on_same_wall() {
        let mut walls = four_walls();
        walls[0].zones.push(pickup("elsewhere"));
        walls[1].props.push(Prop {
            id: "unit".to_string(),
            image: None,
            top: 0.0,
            left: 0.0,
            width: 10.0,
            height: None,
            zone_id: Some("elsewhere".to_string()),
        });
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::PropZoneMissing { wall: 1, .. })
        ));
    }

    #[test]
    fn zone_geometry_outside_viewport_fails() {
        let mut walls = four_walls();
        let mut wide = pickup("wide");
        wide.rect = rect(0.0, 80.0, 30.0, 5.0);
        walls[3].zones.push(wide);
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::GeometryOutOfBounds { owner: "zone", .. })
        ));
    }

    #[test]
    fn inspect_zone_needs_inspectable() {
        let mut walls = four_walls();
        walls[0].zones.push(zone(
            "note",
            ZoneKind::Inspect {
                inspect_item: "letter".to_string(),
            },
        ));
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::InspectableMissing { .. })
        ));
        let letter = Inspectable {
            id: "letter".to_string(),
            title: "Letter".to_string(),
            lines: Vec::new(),
        };
        assert_eq!(validate_catalog(&walls, &[letter]), Ok(()));
    }

    #[test]
    fn codelock_code_must_be_digits() {
        let mut walls = four_walls();
        walls[1].zones.push(zone(
            "lock",
            ZoneKind::CodeLock(CodeLockSpec {
                correct_code: "31a".to_string(),
                unlocked_flag: "u".to_string(),
                open_flag: "o".to_string(),
                noun: "drawer".to_string(),
                contents: None,
            }),
        ));
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::InvalidCode { .. })
        ));
    }

    #[test]
    fn placement_slots_must_be_distinct() {
        let slot = PlacementSlot {
            item: "Half".to_string(),
            flag: "hasHalf".to_string(),
        };
        let mut walls = four_walls();
        walls[3].zones.push(zone(
            "frame",
            ZoneKind::Placement(PlacementSpec {
                slots: vec![slot.clone(), slot],
                noun: "frame".to_string(),
                reveals_flag: "revealed".to_string(),
                bonus_item: "Key".to_string(),
                reveal_text: String::new(),
                empty_text: String::new(),
                partial_text: String::new(),
                complete_text: String::new(),
            }),
        ));
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::DuplicatePlacementItem { .. })
        ));
    }

    #[test]
    fn bad_background_key_fails() {
        let mut walls = four_walls();
        walls[2].background = Some("Walls/South.png".to_string());
        assert!(matches!(
            validate_catalog(&walls, &[]),
            Err(CatalogIntegrityError::InvalidImageKey { owner: "wall", .. })
        ));
    }
}

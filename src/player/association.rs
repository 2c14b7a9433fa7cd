//! Assigns detected icon boxes to players by row.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::record::Player;
use crate::geometry::BoundingBox;

/// Icon boxes found on the screenshot, not yet tied to any player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedBoxes {
    #[serde(default)]
    pub artifacts: Vec<BoundingBox>,
    #[serde(default)]
    pub heroes: Vec<BoundingBox>,
    #[serde(default)]
    pub traits: Vec<BoundingBox>,
}

impl DetectedBoxes {
    pub fn total(&self) -> usize {
        self.artifacts.len() + self.heroes.len() + self.traits.len()
    }
}

/// Boxes that no player row accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Unassociated {
    pub artifacts: usize,
    pub heroes: usize,
    pub traits: usize,
}

impl Unassociated {
    pub fn total(&self) -> usize {
        self.artifacts + self.heroes + self.traits
    }
}

/// Gives each box to every player whose row center crosses it.
///
/// A player keeps only its first hero box. Artifact and trait boxes end up
/// ordered left to right.
pub fn associate(players: &mut [Player], boxes: &DetectedBoxes) -> Unassociated {
    let mut lost = Unassociated::default();

    for bbox in &boxes.artifacts {
        if !assign(players, bbox, |p, b| {
            p.artifact_boxes.push(b);
            true
        }) {
            lost.artifacts += 1;
        }
    }

    for bbox in &boxes.heroes {
        let accepted = assign(players, bbox, |p, b| {
            if p.hero_box.is_some() {
                warn!(player = %p.name(), "player already has a hero box");
                return false;
            }
            p.hero_box = Some(b);
            true
        });
        if !accepted {
            lost.heroes += 1;
        }
    }

    for bbox in &boxes.traits {
        if !assign(players, bbox, |p, b| {
            p.trait_boxes.push(b);
            true
        }) {
            lost.traits += 1;
        }
    }

    for player in players.iter_mut() {
        player.order_boxes();
    }

    if lost.total() > 0 {
        warn!(
            ?lost,
            total = boxes.total(),
            "some boxes could not be associated with a player"
        );
    } else {
        debug!(total = boxes.total(), "all boxes associated");
    }
    lost
}

fn assign(
    players: &mut [Player],
    bbox: &BoundingBox,
    mut accept: impl FnMut(&mut Player, BoundingBox) -> bool,
) -> bool {
    let mut accepted = false;
    for player in players.iter_mut() {
        if bbox.spans_y(player.placement.y_center) && accept(player, *bbox) {
            accepted = true;
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::record::Placement;

    fn player(rank: u32, y_center: f32) -> Player {
        Player::new(Placement {
            rank,
            name: format!("p{}", rank),
            confidence: 1.0,
            y_center,
        })
    }

    #[test]
    fn test_boxes_follow_rows() {
        let mut players = vec![player(1, 100.0), player(2, 200.0)];
        let boxes = DetectedBoxes {
            artifacts: vec![
                BoundingBox::new(300, 80, 40, 40),
                BoundingBox::new(200, 85, 40, 40),
                BoundingBox::new(200, 180, 40, 40),
            ],
            heroes: vec![BoundingBox::new(50, 180, 40, 40)],
            traits: vec![BoundingBox::new(400, 90, 20, 20)],
        };

        let lost = associate(&mut players, &boxes);

        assert_eq!(lost, Unassociated::default());
        assert_eq!(players[0].artifact_boxes[0].x, 200);
        assert_eq!(players[0].artifact_boxes[1].x, 300);
        assert_eq!(players[0].trait_boxes.len(), 1);
        assert!(players[0].hero_box.is_none());
        assert_eq!(players[1].artifact_boxes.len(), 1);
        assert_eq!(players[1].hero_box, Some(BoundingBox::new(50, 180, 40, 40)));
    }

    #[test]
    fn test_row_edges_are_inclusive() {
        let mut players = vec![player(1, 120.0)];
        let boxes = DetectedBoxes {
            artifacts: vec![BoundingBox::new(0, 80, 40, 40)],
            ..Default::default()
        };
        associate(&mut players, &boxes);
        assert_eq!(players[0].artifact_boxes.len(), 1);
    }

    #[test]
    fn test_tall_box_goes_to_every_crossed_row() {
        let mut players = vec![player(1, 100.0), player(2, 140.0)];
        let boxes = DetectedBoxes {
            traits: vec![BoundingBox::new(0, 90, 20, 60)],
            ..Default::default()
        };
        associate(&mut players, &boxes);
        assert_eq!(players[0].trait_boxes.len(), 1);
        assert_eq!(players[1].trait_boxes.len(), 1);
    }

    #[test]
    fn test_unmatched_and_second_hero_are_counted() {
        let mut players = vec![player(1, 100.0)];
        let boxes = DetectedBoxes {
            artifacts: vec![BoundingBox::new(0, 500, 40, 40)],
            heroes: vec![
                BoundingBox::new(10, 80, 40, 40),
                BoundingBox::new(60, 80, 40, 40),
            ],
            traits: Vec::new(),
        };

        let lost = associate(&mut players, &boxes);

        assert_eq!(
            lost,
            Unassociated {
                artifacts: 1,
                heroes: 1,
                traits: 0
            }
        );
        assert_eq!(players[0].hero_box.map(|b| b.x), Some(10));
    }
}

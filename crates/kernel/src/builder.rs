//! Seeded town generation.
//!
//! Every random draw comes from one world stream, in a fixed order: roads,
//! building clusters, forest ring, anchors. Reordering any step changes every
//! layout for every seed.

use ashfield_common::{Pose, RandomStream, Seed};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::layout::{
    Anchor, AnchorKind, BuildingPlacement, DeepZone, GroundExtent, LampPlacement, RoadSegment,
    TreePlacement, WorldLayout,
};
use crate::solid::Solid;

/// Decorative text used when the theme supplied none.
pub const PLACEHOLDER_MOTIF: &str = "The page tears. The text won't hold.";

/// Town name printed on the welcome sign.
pub const TOWN_NAME: &str = "ASHFIELD";

/// Label of the world generation stream derived from the run seed.
pub const WORLD_STREAM: &str = "world";

/// Road templates: center x, center z, width, length, yaw.
const ROAD_TEMPLATES: [(f32, f32, f32, f32, f32); 5] = [
    (0.0, 0.0, 10.0, 120.0, 0.0),
    (-18.0, 10.0, 9.0, 90.0, 0.15),
    (24.0, -14.0, 8.0, 80.0, -0.18),
    (0.0, 26.0, 56.0, 10.0, 0.03),
    (-6.0, -30.0, 52.0, 9.0, -0.06),
];

/// Building clusters: center x, center z, building count.
const CLUSTERS: [(f32, f32, usize); 3] = [(-16.0, 18.0, 10), (18.0, -14.0, 9), (6.0, 36.0, 8)];

const SIGN_AT: (f32, f32) = (8.0, -12.0);
const CLUES_AT: [(f32, f32); 3] = [(-22.0, 16.0), (26.0, -22.0), (10.0, 42.0)];
const TERMINAL_AT: (f32, f32) = (30.0, 10.0);
const BEACON_AT: (f32, f32) = (-34.0, -6.0);
const BEACON_HALF_EXTENTS: Vec3 = Vec3::new(6.0, 3.75, 4.5);

const TERMINAL_EXCERPT_CHARS: usize = 680;
const TERMINAL_NOTE: &str = "NOTE: The archive is not a memory.\nIt is a mouth.";
const HEADLINE_WORDS: usize = 5;
const HEADLINE_CHARS: usize = 42;

/// Closed interval a value is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut RandomStream) -> f32 {
        rng.range(self.min, self.max)
    }

    pub fn is_ordered(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Tunables of the layout generator. Defaults reproduce the reference town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Half side of the square ground plane.
    pub ground_half_size: f32,
    /// Town boundary radius as a fraction of `ground_half_size`.
    pub bounds_fraction: f32,
    /// Height of the player's eye, used for the spawn point.
    pub eye_height: f32,
    /// Per-axis jitter of road centers.
    pub road_jitter: f32,
    /// Jitter of road yaw.
    pub road_yaw_jitter: f32,
    /// Per-axis offset of a building from its cluster center.
    pub cluster_spread: f32,
    pub building_width: Span,
    pub building_depth: Span,
    pub building_height: Span,
    /// Buildings are yawed within `±building_yaw`.
    pub building_yaw: f32,
    pub window_count_min: i32,
    pub window_count_max: i32,
    /// Chance that a building gets a streetlamp nearby.
    pub lamp_chance: f32,
    pub lamp_offset: f32,
    /// Number of forest samples drawn, before the keep-out filter.
    pub forest_samples: usize,
    /// Annulus the forest samples fall in, measured from the town origin.
    pub forest_radius: Span,
    pub forest_jitter: f32,
    /// Samples with `|x| < keep_out && |z| < keep_out` are dropped.
    pub forest_keep_out: f32,
    pub trunk_height: Span,
    pub crown_radius: Span,
    pub crown_height: Span,
    /// Chance a tree registers a trunk collider.
    pub trunk_collider_chance: f32,
    pub trunk_radius: f32,
    /// Per-axis jitter of sign, clue and terminal anchors.
    pub anchor_jitter: f32,
    pub deep_zone_radius: f32,
    /// Spawn offset from the town origin (x, z).
    pub spawn_offset: [f32; 2],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ground_half_size: 140.0,
            bounds_fraction: 0.92,
            eye_height: 1.7,
            road_jitter: 1.5,
            road_yaw_jitter: 0.04,
            cluster_spread: 18.0,
            building_width: Span::new(4.2, 8.6),
            building_depth: Span::new(4.2, 8.6),
            building_height: Span::new(3.8, 8.8),
            building_yaw: 0.4,
            window_count_min: 2,
            window_count_max: 6,
            lamp_chance: 0.18,
            lamp_offset: 4.0,
            forest_samples: 220,
            forest_radius: Span::new(48.0, 122.0),
            forest_jitter: 4.0,
            forest_keep_out: 12.0,
            trunk_height: Span::new(2.6, 4.2),
            crown_radius: Span::new(0.8, 1.6),
            crown_height: Span::new(2.6, 4.4),
            trunk_collider_chance: 0.65,
            trunk_radius: 0.35,
            anchor_jitter: 2.0,
            deep_zone_radius: 9.0,
            spawn_offset: [0.0, 6.0],
        }
    }
}

/// Produces the one [`WorldLayout`] of a run.
///
/// `build` has no failure mode and no inputs besides the seed, the theme text
/// and the builder itself: the same inputs give a byte-identical layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    config: LayoutConfig,
    theme_name: Option<String>,
}

impl LayoutBuilder {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            theme_name: None,
        }
    }

    /// Name printed on the terminal imprint. Geometry never depends on it.
    pub fn with_theme_name(mut self, name: impl Into<String>) -> Self {
        self.theme_name = Some(name.into());
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn build(&self, seed: Seed, theme_text: &str) -> WorldLayout {
        let _span = tracing::info_span!("layout_build", seed).entered();
        let cfg = &self.config;
        let mut rng = RandomStream::derive(seed, WORLD_STREAM);

        let motif = if theme_text.trim().is_empty() {
            tracing::debug!("empty theme text, using placeholder motif");
            PLACEHOLDER_MOTIF
        } else {
            theme_text
        };

        let mut layout = WorldLayout {
            seed,
            ground: GroundExtent {
                half_size: cfg.ground_half_size,
            },
            bounds_radius: cfg.ground_half_size * cfg.bounds_fraction,
            roads: Vec::with_capacity(ROAD_TEMPLATES.len()),
            buildings: Vec::new(),
            forest: Vec::new(),
            lamps: Vec::new(),
            anchors: Vec::new(),
            spawn: Pose::new(
                Vec3::new(cfg.spawn_offset[0], cfg.eye_height, cfg.spawn_offset[1]),
                0.0,
            ),
            deep_zone: DeepZone {
                center: Vec3::new(BEACON_AT.0, 0.0, BEACON_AT.1),
                radius: cfg.deep_zone_radius,
            },
            solids: Vec::new(),
        };

        self.place_roads(&mut rng, &mut layout);
        self.place_buildings(&mut rng, &mut layout);
        self.place_forest(&mut rng, &mut layout);
        self.place_anchors(&mut rng, &mut layout, motif);

        tracing::debug!(
            roads = layout.roads.len(),
            buildings = layout.buildings.len(),
            trees = layout.forest.len(),
            lamps = layout.lamps.len(),
            anchors = layout.anchors.len(),
            solids = layout.solids.len(),
            "layout generated"
        );
        layout
    }

    fn place_roads(&self, rng: &mut RandomStream, layout: &mut WorldLayout) {
        let j = self.config.road_jitter;
        let yj = self.config.road_yaw_jitter;
        for (x, z, width, length, yaw) in ROAD_TEMPLATES {
            let cx = x + rng.range(-j, j);
            let cz = z + rng.range(-j, j);
            let yaw = yaw + rng.range(-yj, yj);
            layout.roads.push(RoadSegment {
                center: Vec3::new(cx, 0.0, cz),
                width,
                length,
                yaw,
            });
        }
    }

    fn place_buildings(&self, rng: &mut RandomStream, layout: &mut WorldLayout) {
        let cfg = &self.config;
        let spread = cfg.cluster_spread;
        for (cx, cz, count) in CLUSTERS {
            for _ in 0..count {
                let x = cx + rng.range(-spread, spread);
                let z = cz + rng.range(-spread, spread);
                let w = cfg.building_width.sample(rng);
                let h = cfg.building_height.sample(rng);
                let d = cfg.building_depth.sample(rng);
                let yaw = rng.range(-cfg.building_yaw, cfg.building_yaw);
                let windows = rng.int_range(cfg.window_count_min, cfg.window_count_max).max(0) as u32;

                let footprint = Solid::Box {
                    center: Vec3::new(x, h / 2.0, z),
                    half_extents: Vec3::new(w / 2.0, h / 2.0, d / 2.0),
                    yaw,
                };
                layout.solids.push(footprint);
                layout.buildings.push(BuildingPlacement { footprint, windows });

                if rng.chance(cfg.lamp_chance) {
                    let o = cfg.lamp_offset;
                    let lx = x + rng.range(-o, o);
                    let lz = z + rng.range(-o, o);
                    layout.lamps.push(LampPlacement {
                        position: Vec3::new(lx, 0.0, lz),
                    });
                }
            }
        }
    }

    fn place_forest(&self, rng: &mut RandomStream, layout: &mut WorldLayout) {
        let cfg = &self.config;
        let j = cfg.forest_jitter;
        let keep_out = cfg.forest_keep_out;
        for _ in 0..cfg.forest_samples {
            let angle = rng.angle();
            let r = cfg.forest_radius.sample(rng);
            let x = angle.cos() * r + rng.range(-j, j);
            let z = angle.sin() * r + rng.range(-j, j);
            if x.abs() < keep_out && z.abs() < keep_out {
                continue;
            }

            let trunk_height = cfg.trunk_height.sample(rng);
            let crown_radius = cfg.crown_radius.sample(rng);
            let crown_height = cfg.crown_height.sample(rng);
            let has_collider = rng.chance(cfg.trunk_collider_chance);
            let position = Vec3::new(x, 0.0, z);

            if has_collider {
                layout.solids.push(Solid::Cylinder {
                    center: position,
                    radius: cfg.trunk_radius,
                    height: trunk_height,
                });
            }
            layout.forest.push(TreePlacement {
                position,
                trunk_height,
                crown_radius,
                crown_height,
                has_collider,
            });
        }
    }

    fn place_anchors(&self, rng: &mut RandomStream, layout: &mut WorldLayout, motif: &str) {
        let j = self.config.anchor_jitter;
        let mut jittered = |(x, z): (f32, f32), y: f32| {
            Vec3::new(x + rng.range(-j, j), y, z + rng.range(-j, j))
        };

        let sign = jittered(SIGN_AT, 1.6);
        layout.anchors.push(Anchor {
            position: sign,
            kind: AnchorKind::Sign,
            payload: format!("{TOWN_NAME} / {}", headline(motif)),
        });

        for (i, at) in CLUES_AT.into_iter().enumerate() {
            let position = jittered(at, 0.12);
            layout.anchors.push(Anchor {
                position,
                kind: AnchorKind::Clue,
                payload: format!("fragment {}", i + 1),
            });
        }

        let terminal = jittered(TERMINAL_AT, 1.2);
        layout.anchors.push(Anchor {
            position: terminal,
            kind: AnchorKind::Terminal,
            payload: format!(
                "IMPRINT: {}\n\n{}\n\n{TERMINAL_NOTE}",
                self.theme_name.as_deref().unwrap_or(TOWN_NAME),
                excerpt(motif, TERMINAL_EXCERPT_CHARS)
            ),
        });

        let beacon = Vec3::new(BEACON_AT.0, BEACON_HALF_EXTENTS.y, BEACON_AT.1);
        layout.solids.push(Solid::Box {
            center: beacon,
            half_extents: BEACON_HALF_EXTENTS,
            yaw: 0.0,
        });
        layout.anchors.push(Anchor {
            position: beacon,
            kind: AnchorKind::Beacon,
            payload: "the house with the warm light".into(),
        });
        layout.anchors.push(Anchor {
            position: Vec3::new(BEACON_AT.0, 1.1, BEACON_AT.1 + BEACON_HALF_EXTENTS.z + 0.6),
            kind: AnchorKind::Door,
            payload: "a door that should not be warm".into(),
        });
    }
}

impl WorldLayout {
    /// Build with the default [`LayoutConfig`].
    pub fn generate(seed: Seed, theme_text: &str) -> Self {
        LayoutBuilder::default().build(seed, theme_text)
    }
}

/// First few words of the motif, upper-cased, for the welcome sign.
fn headline(motif: &str) -> String {
    let words: Vec<&str> = motif.split_whitespace().take(HEADLINE_WORDS).collect();
    words
        .join(" ")
        .to_uppercase()
        .chars()
        .take(HEADLINE_CHARS)
        .collect()
}

fn excerpt(motif: &str, max_chars: usize) -> String {
    let flat = motif.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(max_chars).collect()
}

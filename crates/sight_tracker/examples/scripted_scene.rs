//! Scripted host session driving a token and a wall tracker.
//!
//! Simulates the event stream a host scene graph would deliver: an
//! initial population scan, incremental moves, a door opening, and a
//! teardown, logging the buffer state after each step.

use sight_geometry::{glam::Vec3, PlanarBackend, Shape2d};
use sight_tracker::{
    ChangeValue, HookRegistry, HostEvent, KindTracker, PlaceableId, PlaceableState, PlaceableType,
    SceneSource, SightRestriction, Token, TrackError, TrackerSettings, Wall, WallData,
};

struct ScriptedScene {
    placeables: Vec<PlaceableState>,
}

impl SceneSource for ScriptedScene {
    fn current(&self, kind: PlaceableType) -> Vec<PlaceableState> {
        self.placeables
            .iter()
            .filter(|state| state.kind == kind)
            .cloned()
            .collect()
    }

    fn get(&self, id: &PlaceableId) -> Option<PlaceableState> {
        self.placeables.iter().find(|state| &state.id == id).cloned()
    }
}

fn token(id: &str, x: f32, y: f32) -> PlaceableState {
    PlaceableState {
        id: PlaceableId::from(id),
        kind: PlaceableType::Token,
        x,
        y,
        width: 1.0,
        height: 1.0,
        rotation_deg: 0.0,
        elevation_bottom: 0.0,
        elevation_top: 2.0,
        shape: Shape2d::Rect {
            x,
            y,
            width: 1.0,
            height: 1.0,
        },
        hidden: false,
        wall: None,
        tile: None,
        region: None,
    }
}

fn wall(id: &str, c: [f32; 4], door_open: bool) -> PlaceableState {
    PlaceableState {
        id: PlaceableId::from(id),
        kind: PlaceableType::Wall,
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        rotation_deg: 0.0,
        elevation_bottom: 0.0,
        elevation_top: 10.0,
        shape: Shape2d::Polygon { points: Vec::new() },
        hidden: false,
        wall: Some(WallData {
            c,
            sight: SightRestriction::Normal,
            door_open,
        }),
        tile: None,
        region: None,
    }
}

fn main() -> Result<(), TrackError> {
    tracing_subscriber::fmt::init();

    let mut scene = ScriptedScene {
        placeables: vec![
            token("hero", 2.0, 2.0),
            token("goblin", 8.0, 3.0),
            wall("north-wall", [0.0, 10.0, 10.0, 10.0], false),
            wall("door", [5.0, 0.0, 5.0, 4.0], false),
        ],
    };

    let mut registry = HookRegistry::new();
    let mut tokens: KindTracker<Token> =
        KindTracker::new(Box::new(PlanarBackend), TrackerSettings::default());
    let mut walls: KindTracker<Wall> =
        KindTracker::new(Box::new(PlanarBackend), TrackerSettings::default());
    tokens.register_hooks(&mut registry);
    walls.register_hooks(&mut registry);

    tokens.initialize_placeables(&scene)?;
    walls.initialize_placeables(&scene)?;
    tracing::info!(
        tokens = tokens.num_tracked(),
        walls = walls.num_tracked(),
        "initial scan complete"
    );

    // The hero moves; the host reports the changed attributes.
    let mut moved = token("hero", 6.0, 2.0);
    moved.rotation_deg = 90.0;
    let event = HostEvent::Update {
        state: moved,
        changes: vec![
            ("x".to_owned(), ChangeValue::Leaf),
            ("rotation".to_owned(), ChangeValue::Leaf),
        ],
    };
    tokens.handle_event(&registry, &scene, &event)?;
    tracing::info!(
        counter = tokens.update_counter(),
        bytes = tokens.models().view_whole_buffer_bytes().len(),
        "token moved"
    );

    // A ray from above the hero straight down hits its top cap.
    let hit = tokens.first_hit(
        &PlaceableId::from("hero"),
        Vec3::new(6.5, 2.5, 10.0),
        Vec3::NEG_Z,
        0.0,
        100.0,
    );
    tracing::info!(?hit, "ray query against the hero");

    // The door opens: no longer sight-blocking, so the wall tracker
    // drops it and frees its facet.
    let open = wall("door", [5.0, 0.0, 5.0, 4.0], true);
    scene.placeables.retain(|p| p.id.as_str() != "door");
    scene.placeables.push(open.clone());
    let event = HostEvent::Update {
        state: open,
        changes: vec![("ds".to_owned(), ChangeValue::Leaf)],
    };
    walls.handle_event(&registry, &scene, &event)?;
    tracing::info!(
        walls = walls.num_tracked(),
        counter = walls.update_counter(),
        "door opened"
    );

    // The goblin is destroyed; only the id survives the event.
    tokens.handle_event(
        &registry,
        &scene,
        &HostEvent::Destroy(PlaceableId::from("goblin")),
    )?;
    tracing::info!(tokens = tokens.num_tracked(), "goblin removed");

    tokens.clear();
    walls.clear();
    registry.unregister(PlaceableType::Token);
    registry.unregister(PlaceableType::Wall);
    tracing::info!("session closed");
    Ok(())
}

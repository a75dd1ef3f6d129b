use std::path::Path;
use std::sync::Arc;

use room_engine::{
    compile_room_catalog, CodeVerdict, Direction, FeedbackRecorder, InputError, RoomCatalog,
    RoomSession, SessionOptions,
};

use super::*;

const MAJLIS_XML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../assets/base/chapters/majlis.xml"
));

fn catalog() -> Arc<RoomCatalog> {
    let catalog = compile_room_catalog(MAJLIS, Path::new("chapters/majlis.xml"), MAJLIS_XML)
        .expect("shipped chapter compiles");
    Arc::new(catalog)
}

fn new_session() -> (RoomSession, FeedbackRecorder) {
    let recorder = FeedbackRecorder::new();
    let session = RoomSession::new(
        catalog(),
        majlis_puzzles(),
        Box::new(recorder.clone()),
        SessionOptions::default(),
    )
    .expect("session");
    (session, recorder)
}

fn face(session: &mut RoomSession, wall: usize) {
    while session.current_wall().index() != wall {
        session.rotate(Direction::Right).expect("rotate");
    }
}

fn select(session: &mut RoomSession, item: &str) {
    let selected = session.select_item(item).expect("select").map(str::to_string);
    assert_eq!(selected.as_deref(), Some(item));
}

fn count_of(session: &RoomSession, item: &str) -> usize {
    session
        .state()
        .inventory()
        .iter()
        .filter(|held| held.as_str() == item)
        .count()
}

fn open_drawer(session: &mut RoomSession) {
    face(session, 1);
    session.click_zone("east-drawer").expect("drawer");
    assert_eq!(session.submit_code_str("314"), Ok(CodeVerdict::Accepted));
}

/// Sofa, drawer, knob, TV and clock: leaves both photo halves in hand.
fn collect_photo_halves(session: &mut RoomSession) {
    face(session, 2);
    session.click_zone("south-sofa").expect("sofa");
    open_drawer(session);
    session.click_zone("east-tv-knob").expect("knob");
    select(session, "TV Knob");
    session.click_zone("east-tv").expect("attach knob");
    session.click_zone("east-tv").expect("fix tv");
    face(session, 3);
    session.click_zone("west-clock").expect("clock");
    assert_eq!(count_of(session, "Photo Half A"), 1);
    assert_eq!(count_of(session, "Photo Half B"), 1);
}

#[test]
fn shipped_chapter_matches_registered_puzzles() {
    let catalog = catalog();
    assert_eq!(catalog.walls().len(), 4);
    assert_eq!(catalog.declared_flags().len(), 9);
    assert!(catalog.inspectable("letter").is_some());
    assert!(catalog.inspectable("coaster").is_some());
    assert!(puzzles_for(MAJLIS).contains("west-clock"));
    assert!(!puzzles_for("unknown").contains("west-clock"));
}

#[test]
fn tv_unit_prop_hides_its_zone_but_routes_clicks() {
    let (mut session, recorder) = new_session();
    face(&mut session, 1);
    assert!(session
        .visible_zones()
        .iter()
        .all(|zone| zone.id != "east-tv" && zone.id != "east-tv-knob"));
    session.click_prop("tv-unit").expect("prop");
    assert!(recorder.contains("It's missing a knob. I can't change the channel."));
}

#[test]
fn drawer_code_reveals_the_knob() {
    let (mut session, recorder) = new_session();
    face(&mut session, 1);
    session.click_zone("east-drawer").expect("drawer");
    assert_eq!(
        session.code_entry().map(|entry| entry.code_length()),
        Some(3)
    );
    assert_eq!(session.submit_code_str("999"), Ok(CodeVerdict::Rejected));
    assert!(recorder.contains("It won't budge."));
    assert_eq!(session.submit_code_str("314"), Ok(CodeVerdict::Accepted));

    let state = session.state();
    assert!(state.flag("drawerUnlocked"));
    assert!(state.flag("drawerOpen"));
    let messages = recorder.take();
    assert!(messages.iter().any(|message| message.contains("unlocks")));
    assert!(messages.iter().any(|message| message.contains("TV Knob")));

    assert!(session
        .visible_zones()
        .iter()
        .any(|zone| zone.id == "east-tv-knob"));
    session.click_zone("east-tv-knob").expect("knob");
    assert_eq!(session.state().inventory(), ["TV Knob"]);
    assert!(session.state().is_picked_up("east-tv-knob"));

    session.click_zone("east-drawer").expect("drawer again");
    assert!(recorder.contains("The drawer is already open"));
    assert!(session.code_entry().is_none());
}

#[test]
fn tv_takes_knob_then_shows_time() {
    let (mut session, recorder) = new_session();
    open_drawer(&mut session);
    session.click_zone("east-tv-knob").expect("knob");
    select(&mut session, "TV Knob");

    session.click_zone("east-tv").expect("attach");
    assert!(session.state().flag("tvHasKnob"));
    assert!(!session.state().has_item("TV Knob"));
    assert_eq!(session.state().active_item(), None);
    assert!(recorder.contains("You attach the TV Knob to the TV"));

    session.click_zone("east-tv").expect("fix");
    assert!(session.state().flag("tvFixed"));
    assert!(recorder.contains("TV Fixed - Time: 09:30"));

    let flags_before = session.state().flags().clone();
    let inventory_before = session.state().inventory().to_vec();
    session.click_zone("east-tv").expect("show");
    assert_eq!(
        recorder.messages().last().map(String::as_str),
        Some("The TV shows: 09:30")
    );
    assert_eq!(session.state().flags(), &flags_before);
    assert_eq!(session.state().inventory(), inventory_before.as_slice());
}

#[test]
fn clock_stays_stuck_until_tv_is_fixed() {
    let (mut session, recorder) = new_session();
    face(&mut session, 3);
    session.click_zone("west-clock").expect("clock");
    assert!(recorder.contains("The hands are stuck. I don't know the time."));
    assert!(!session.state().flag("clockOpen"));
    assert!(session.state().inventory().is_empty());
}

#[test]
fn frame_summaries_follow_progress() {
    let (mut session, recorder) = new_session();
    collect_photo_halves(&mut session);
    session.click_zone("west-frame").expect("frame");
    assert_eq!(
        recorder.messages().last().map(String::as_str),
        Some("An empty picture frame")
    );

    select(&mut session, "Photo Half A");
    session.click_zone("west-frame").expect("place");
    session.click_zone("west-frame").expect("frame");
    assert_eq!(
        recorder.messages().last().map(String::as_str),
        Some("Half of a photo... there must be another piece")
    );
}

fn place_halves(order: [&str; 2]) -> (RoomSession, FeedbackRecorder) {
    let (mut session, recorder) = new_session();
    collect_photo_halves(&mut session);
    for half in order {
        select(&mut session, half);
        session.click_zone("west-frame").expect("place");
    }
    (session, recorder)
}

#[test]
fn photo_halves_complete_the_frame_in_either_order() {
    let (forward, forward_log) = place_halves(["Photo Half A", "Photo Half B"]);
    let (reverse, reverse_log) = place_halves(["Photo Half B", "Photo Half A"]);

    for (session, log) in [(&forward, &forward_log), (&reverse, &reverse_log)] {
        let state = session.state();
        assert!(state.flag("frameHasA"));
        assert!(state.flag("frameHasB"));
        assert!(state.flag("brassKeyRevealed"));
        assert!(!state.has_item("Photo Half A"));
        assert!(!state.has_item("Photo Half B"));
        let reveals = log
            .messages()
            .iter()
            .filter(|message| message.as_str() == "A Brass Key falls to the floor")
            .count();
        assert_eq!(reveals, 1);
        assert!(log.contains("The complete photo reveals a hidden compartment!"));
    }
    assert_eq!(forward.state().flags(), reverse.state().flags());
    assert_eq!(forward.state().inventory(), reverse.state().inventory());
}

#[test]
fn brass_key_is_granted_once_and_opens_the_door() {
    let (mut session, recorder) = place_halves(["Photo Half A", "Photo Half B"]);
    session.click_zone("west-frame").expect("frame");
    assert!(recorder.contains("The complete photo of the Majlis"));

    session.click_zone("west-brass-key").expect("key");
    assert_eq!(
        session.click_zone("west-brass-key"),
        Err(InputError::ZoneNotClickable {
            zone_id: "west-brass-key".to_string()
        })
    );
    assert_eq!(count_of(&session, "Brass Key"), 1);

    face(&mut session, 0);
    session.click_zone("north-door").expect("door");
    assert!(recorder.contains("It is locked."));
    assert!(!session.state().flag("doorOpen"));

    select(&mut session, "Brass Key");
    session.click_zone("north-door").expect("door");
    assert!(session.state().flag("doorOpen"));
    assert!(recorder.contains("The door unlocks!"));
    assert!(session.state().inventory().is_empty());
    assert_eq!(
        session
            .active_overlays()
            .iter()
            .map(|overlay| overlay.label.as_str())
            .collect::<Vec<_>>(),
        vec!["OPEN"]
    );
}

#[test]
fn wrong_item_does_not_fit_the_frame() {
    let (mut session, recorder) = new_session();
    open_drawer(&mut session);
    session.click_zone("east-tv-knob").expect("knob");
    select(&mut session, "TV Knob");
    face(&mut session, 3);
    session.click_zone("west-frame").expect("frame");
    assert!(recorder.contains("This item doesn't fit here"));
    assert!(session.state().has_item("TV Knob"));
}

#[test]
fn coaster_holds_the_drawer_code() {
    let (mut session, recorder) = new_session();
    face(&mut session, 1);
    session.click_zone("east-coaster").expect("coaster");
    assert!(recorder.contains("Inspecting [Coaster]"));
    let lines = session
        .inspecting()
        .map(|item| item.lines.clone())
        .unwrap_or_default();
    assert_eq!(lines.first().map(String::as_str), Some("3 - 1 - 4"));

    session.click_zone("east-drawer").expect("dismiss");
    assert!(session.inspecting().is_none());
    assert!(session.code_entry().is_none());
}

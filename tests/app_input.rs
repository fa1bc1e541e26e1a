use holotopics::hud::{question_card_rect, sector_card_rect};
use holotopics::starmap::PICK_RADIUS;
use holotopics::{App, Catalog, CardState, Config, KeyPress, Phase, SectorId, Vec2, ViewRequest};

fn app() -> App {
    let config = Config {
        seed: Some(2024),
        fps: 20,
        particles: 30,
        nodes: 12,
        ..Config::default()
    };
    App::new(&config, Catalog::builtin())
}

fn run_until(app: &mut App, ms: u64) {
    let target = app.now_ms() + ms;
    while app.now_ms() < target {
        app.frame();
    }
}

fn transcript(app: &App) -> Vec<String> {
    app.terminal().output().iter().map(|l| l.text.clone()).collect()
}

#[test]
fn pointer_flow_from_overview_to_reveal_and_back() {
    let mut app = app();
    app.pointer_clicked(sector_card_rect(SectorId::Gaming.index(), 800).center());
    assert_eq!(app.session().phase(), Phase::SectorActive(SectorId::Gaming));

    app.pointer_clicked(question_card_rect(2, 800).center());
    let revealed = app.session().revealed().unwrap();
    assert_eq!(revealed.ordinal, 2);

    // Clicking a sibling while the grid is still up is a denial, not a second pick.
    app.pointer_clicked(question_card_rect(0, 800).center());
    assert_eq!(app.session().revealed(), Some(revealed));

    run_until(&mut app, 1600);
    assert_eq!(app.visible_view(), ViewRequest::Revealed);
    assert!(app
        .session()
        .cards()
        .iter()
        .all(|c| c.state == CardState::Revealed || c.state == CardState::Blocked));

    app.key_pressed(KeyPress::Backspace);
    assert_eq!(app.visible_view(), ViewRequest::SectorActive);
    assert!(app.session().cards().iter().all(|c| c.state == CardState::Blocked));

    app.key_pressed(KeyPress::Escape);
    assert_eq!(app.visible_view(), ViewRequest::Overview);
    assert_eq!(app.session().locked_in(SectorId::Gaming), 4);
    assert!(app.effects().fired() > 0);
}

#[test]
fn star_map_click_warps_to_the_sector() {
    let mut app = app();
    app.key_pressed(KeyPress::Digit(1));
    app.key_pressed(KeyPress::ToggleStarMap);
    assert!(app.star_map_visible());

    let star = app
        .starmap()
        .stars()
        .iter()
        .find(|s| s.sector == SectorId::Fantasy)
        .unwrap()
        .clone();
    let on_screen = app.starmap().view().apply(star.anchor);
    app.star_map_clicked(on_screen.add(Vec2::new(PICK_RADIUS * 0.5, 0.0)));

    assert!(!app.star_map_visible());
    assert_eq!(app.session().phase(), Phase::SectorActive(SectorId::Fantasy));
    assert!(transcript(&app).contains(&"> WARPING TO FANTASY SECTOR...".to_string()));
}

#[test]
fn star_map_hit_test_follows_zoom_and_pan() {
    let mut app = app();
    app.key_pressed(KeyPress::ToggleStarMap);
    app.key_pressed(KeyPress::ZoomIn);
    app.key_pressed(KeyPress::ZoomIn);
    app.key_pressed(KeyPress::Left);

    for star in app.starmap().stars() {
        let screen = app.starmap().view().apply(star.anchor);
        assert_eq!(app.starmap().hit_test(screen), Some(star.sector));
    }
    assert_eq!(app.starmap().hit_test(app.starmap().view().apply(Vec2::new(400.0, 300.0))), None);

    app.key_pressed(KeyPress::ZoomReset);
    assert_eq!(app.starmap().view().zoom, 1.0);
    assert_eq!(app.starmap().view().offset, Vec2::ZERO);
}

#[test]
fn terminal_mirrors_pointer_interactions() {
    let mut app = app();
    app.terminal_line_submitted("random");
    assert!(transcript(&app).contains(&"> ERROR: NO SECTOR SELECTED".to_string()));

    app.terminal_line_submitted("warp sitcoms");
    run_until(&mut app, 1100);
    assert_eq!(app.session().phase(), Phase::SectorActive(SectorId::Sitcoms));

    app.terminal_line_submitted("random");
    assert!(matches!(app.session().phase(), Phase::QuestionRevealed(id) if id.sector == SectorId::Sitcoms));
    app.terminal_line_submitted("RANDOM");
    assert_eq!(transcript(&app).last().map(String::as_str), Some("> ERROR: ALL QUESTIONS LOCKED"));

    app.terminal_line_submitted("warp atlantis");
    assert_eq!(transcript(&app).last().map(String::as_str), Some("> ERROR: SECTOR \"atlantis\" NOT FOUND"));

    app.terminal_line_submitted("quantum");
    assert!(app.theme().quantum);
}

#[test]
fn session_end_returns_to_overview_on_its_own() {
    let mut app = app();
    app.key_pressed(KeyPress::Digit(4));
    app.key_pressed(KeyPress::EndSession);
    assert_eq!(app.visible_view(), ViewRequest::SessionEnd);
    assert_eq!(app.session().phase(), Phase::SessionEnded);

    app.key_pressed(KeyPress::Digit(2));
    assert_eq!(app.session().phase(), Phase::SessionEnded);

    run_until(&mut app, 8100);
    assert_eq!(app.session().phase(), Phase::Overview);
    assert_eq!(app.visible_view(), ViewRequest::Overview);
}

#[test]
fn resize_keeps_entity_positions() {
    let mut app = app();
    app.frame();
    let particles: Vec<Vec2> = app.particles().particles().iter().map(|p| p.pos).collect();
    let nodes: Vec<Vec2> = app.neural().nodes().iter().map(|n| n.pos).collect();

    app.surface_resized(1024, 768);
    assert_eq!(app.particles().particles().iter().map(|p| p.pos).collect::<Vec<_>>(), particles);
    assert_eq!(app.neural().nodes().iter().map(|n| n.pos).collect::<Vec<_>>(), nodes);
    assert_eq!(app.frame().len(), 1024 * 768);
}

#[test]
fn hover_tone_only_on_entering_live_cards() {
    let mut app = app();
    app.key_pressed(KeyPress::Digit(3));
    let first = question_card_rect(0, 800).center();
    let second = question_card_rect(1, 800).center();

    let before = app.effects().fired();
    app.pointer_moved(first);
    assert_eq!(app.effects().fired(), before + 1);
    app.pointer_moved(first.add(Vec2::new(3.0, 2.0)));
    assert_eq!(app.effects().fired(), before + 1);
    app.pointer_moved(second);
    assert_eq!(app.effects().fired(), before + 2);

    app.card_clicked(SectorId::Gaming, 0, first);
    app.key_pressed(KeyPress::Escape);
    app.key_pressed(KeyPress::Digit(3));
    assert!(app.session().cards().iter().all(|c| c.state == CardState::Blocked));

    let before = app.effects().fired();
    app.pointer_moved(first);
    app.pointer_moved(second);
    assert_eq!(app.effects().fired(), before);
}

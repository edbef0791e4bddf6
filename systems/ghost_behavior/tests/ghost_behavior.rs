use std::time::Duration;

use maze_chase_core::{
    Direction, GhostCondition, GhostMode, GhostPersonality, Maze, MazeMetadata, Vector2D,
};
use maze_chase_system_ghost_behavior::{Ghost, GhostContext, GhostUpdate, SPAWN_DELAY};
use rand::rngs::mock::StepRng;

const TICK: Duration = Duration::from_millis(16);
const VULNERABILITY: Duration = Duration::from_millis(8000);

fn open_room(size: usize) -> Maze {
    let layout: Vec<Vec<u8>> = (0..size)
        .map(|row| {
            (0..size)
                .map(|column| {
                    let border = row == 0 || column == 0 || row == size - 1 || column == size - 1;
                    u8::from(border)
                })
                .collect()
        })
        .collect();
    Maze::from_rows(&layout, 16.0, MazeMetadata::new("room", 0, "")).expect("valid layout")
}

/// Random source whose every roll lands just below 1.0, disabling random branches.
fn high_rolls() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

/// Random source whose every roll is 0.0, so every probability check passes.
fn low_rolls() -> StepRng {
    StepRng::new(0, 0)
}

fn player_at(position: Vector2D) -> GhostContext {
    GhostContext {
        player_position: position,
        player_direction: Direction::None,
        chaser_position: None,
    }
}

fn chasing_ghost(position: Vector2D) -> Ghost {
    let mut ghost = Ghost::new(GhostPersonality::Chaser, position, 1.0, 16.0);
    ghost.set_mode(GhostMode::Chase);
    ghost
}

#[test]
fn chaser_closes_distance_in_one_tick_with_heuristic_steering() {
    let maze = open_room(12);
    let mut ghost = chasing_ghost(Vector2D::new(100.0, 84.0));
    let context = player_at(Vector2D::new(100.0, 100.0));

    let outcome = ghost.update(TICK, &context, maze.view(), &mut high_rolls());

    assert_eq!(outcome, GhostUpdate::Active);
    assert!(ghost.position().approx_eq(Vector2D::new(100.0, 85.0)));
    assert_eq!(ghost.direction(), Direction::Down);
}

#[test]
fn chaser_closes_distance_in_one_tick_with_astar_steering() {
    let maze = open_room(12);
    let mut ghost = chasing_ghost(Vector2D::new(100.0, 84.0));
    let context = player_at(Vector2D::new(100.0, 100.0));

    let _ = ghost.update(TICK, &context, maze.view(), &mut low_rolls());

    assert!(ghost.position().approx_eq(Vector2D::new(100.0, 85.0)));
    assert_eq!(ghost.path().len(), 2);
}

#[test]
fn vulnerable_ghost_picks_the_direction_that_maximises_distance() {
    let maze = open_room(12);
    let mut ghost = chasing_ghost(Vector2D::new(100.0, 84.0));
    ghost.set_vulnerable(VULNERABILITY);
    let player = Vector2D::new(100.0, 100.0);

    assert_eq!(ghost.choose_direction(maze.view(), player), Direction::Up);
    assert_eq!(
        ghost.choose_direction_advanced(maze.view(), player, &mut low_rolls()),
        Direction::Up
    );

    let _ = ghost.update(TICK, &player_at(player), maze.view(), &mut high_rolls());
    assert!(ghost.position().y() < 84.0);
}

#[test]
fn vulnerable_ghost_keeps_fleeing_when_every_roll_favours_astar() {
    let maze = open_room(12);
    let mut ghost = chasing_ghost(Vector2D::new(100.0, 84.0));
    ghost.set_vulnerable(VULNERABILITY);
    let player = Vector2D::new(100.0, 100.0);
    let context = player_at(player);

    let mut previous = ghost.position().distance_to(player);
    for _ in 0..10 {
        let _ = ghost.update(TICK, &context, maze.view(), &mut low_rolls());
        let distance = ghost.position().distance_to(player);
        assert!(distance > previous, "ghost moved to {:?}", ghost.position());
        previous = distance;
    }
    assert!(ghost.path().is_empty());
    assert!(ghost.position().y() < 84.0);
}

/// Single-row corridor just wide enough for a 21 px ghost to travel sideways.
fn corridor(columns: usize) -> Maze {
    let walls = vec![1; columns];
    let mut middle = vec![0; columns];
    middle[0] = 1;
    middle[columns - 1] = 1;
    Maze::from_rows(
        &[walls.clone(), middle, walls],
        16.0,
        MazeMetadata::new("corridor", 0, ""),
    )
    .expect("valid corridor")
}

#[test]
fn vulnerable_ghost_holds_its_heading_away_from_the_player() {
    let maze = corridor(20);
    let mut ghost = Ghost::new(GhostPersonality::Chaser, Vector2D::new(200.0, 24.0), 3.0, 21.0);
    ghost.set_mode(GhostMode::Chase);
    ghost.set_vulnerable(VULNERABILITY);
    let player = Vector2D::new(40.0, 24.0);
    let context = player_at(player);

    assert!(!ghost.body().can_move(Direction::Up, maze.view()));
    assert!(!ghost.body().can_move(Direction::Down, maze.view()));

    let _ = ghost.update(TICK, &context, maze.view(), &mut low_rolls());
    assert_eq!(ghost.direction(), Direction::Right);
    assert!(ghost.position().approx_eq(Vector2D::new(202.0, 24.0)));

    for _ in 0..3 {
        assert_eq!(
            ghost.choose_direction_advanced(maze.view(), player, &mut low_rolls()),
            Direction::Right
        );
        assert_eq!(
            ghost.choose_direction_advanced(maze.view(), player, &mut high_rolls()),
            Direction::Right
        );
        let _ = ghost.update(TICK, &context, maze.view(), &mut low_rolls());
    }
    assert_eq!(ghost.direction(), Direction::Right);
    assert!(ghost.position().x() > 202.0);
}

#[test]
fn normal_ghost_in_the_same_corridor_turns_toward_the_player() {
    let maze = corridor(20);
    let mut ghost = Ghost::new(GhostPersonality::Chaser, Vector2D::new(200.0, 24.0), 3.0, 21.0);
    ghost.set_mode(GhostMode::Chase);

    let context = player_at(Vector2D::new(40.0, 24.0));

    let _ = ghost.update(TICK, &context, maze.view(), &mut high_rolls());
    assert_eq!(ghost.direction(), Direction::Left);
}

#[test]
fn normal_ghost_greedy_choice_minimises_distance() {
    let maze = open_room(12);
    let ghost = chasing_ghost(Vector2D::new(100.0, 84.0));
    assert_eq!(
        ghost.choose_direction(maze.view(), Vector2D::new(40.0, 84.0)),
        Direction::Left
    );
}

#[test]
fn harder_maps_shorten_vulnerability_and_patrol_windows() {
    let mut easy = Ghost::new(GhostPersonality::Ambusher, Vector2D::new(40.0, 40.0), 1.5, 16.0);
    let mut hard = easy.clone();
    easy.set_difficulty(0);
    hard.set_difficulty(200);
    easy.set_vulnerable(VULNERABILITY);
    hard.set_vulnerable(VULNERABILITY);

    assert!(hard.vulnerable_remaining() < easy.vulnerable_remaining());
    assert!(hard.difficulty().patrol_duration() < easy.difficulty().patrol_duration());
    assert!(hard.astar_interval() < easy.astar_interval());
    assert!(hard.astar_interval() >= Duration::from_millis(200));
}

#[test]
fn vulnerability_slows_the_ghost_until_it_expires() {
    let maze = open_room(12);
    let mut ghost = Ghost::new(GhostPersonality::Flanker, Vector2D::new(40.0, 40.0), 1.5, 16.0);
    ghost.set_vulnerable(VULNERABILITY);
    assert_eq!(ghost.condition(), GhostCondition::Vulnerable);
    assert!((ghost.speed() - 1.0).abs() < f32::EPSILON);

    let context = player_at(Vector2D::new(150.0, 150.0));
    let _ = ghost.update(VULNERABILITY, &context, maze.view(), &mut high_rolls());

    assert_eq!(ghost.condition(), GhostCondition::Normal);
    assert!((ghost.speed() - 1.5).abs() < f32::EPSILON);
}

#[test]
fn captured_ghost_waits_at_spawn_then_is_released() {
    let maze = open_room(12);
    let spawn = Vector2D::new(40.0, 40.0);
    let mut ghost = Ghost::new(GhostPersonality::Opportunist, spawn, 1.5, 16.0);
    let context = player_at(Vector2D::new(150.0, 150.0));
    for _ in 0..30 {
        let _ = ghost.update(TICK, &context, maze.view(), &mut high_rolls());
    }
    ghost.set_vulnerable(VULNERABILITY);

    ghost.capture();
    assert!(ghost.in_spawn_delay());
    assert_eq!(ghost.position(), spawn);
    assert_eq!(ghost.condition(), GhostCondition::Normal);

    let early = SPAWN_DELAY - Duration::from_millis(10);
    assert_eq!(
        ghost.update(early, &context, maze.view(), &mut high_rolls()),
        GhostUpdate::Waiting
    );
    assert_eq!(ghost.position(), spawn);

    ghost.set_vulnerable(VULNERABILITY);
    assert!(!ghost.is_vulnerable());

    assert_eq!(
        ghost.update(TICK, &context, maze.view(), &mut high_rolls()),
        GhostUpdate::Released
    );
    assert!(!ghost.in_spawn_delay());
}

#[test]
fn patrol_window_gives_way_to_chase() {
    let maze = open_room(12);
    let mut ghost = Ghost::new(GhostPersonality::Chaser, Vector2D::new(40.0, 40.0), 1.5, 16.0);
    let context = player_at(Vector2D::new(150.0, 150.0));
    assert_eq!(ghost.mode(), GhostMode::Patrol);

    let window = ghost.difficulty().patrol_duration() + Duration::from_millis(1);
    let _ = ghost.update(window, &context, maze.view(), &mut high_rolls());
    assert_eq!(ghost.mode(), GhostMode::Chase);
}

#[test]
fn patrol_mode_targets_the_current_waypoint() {
    let maze = open_room(12);
    let route = vec![Vector2D::new(24.0, 24.0), Vector2D::new(152.0, 24.0)];
    let ghost = Ghost::new(GhostPersonality::Ambusher, Vector2D::new(88.0, 88.0), 1.5, 16.0)
        .with_patrol_route(route.clone());

    let target = ghost.target_position(&player_at(Vector2D::new(150.0, 150.0)), maze.view());
    assert_eq!(target, route[0]);
}

#[test]
fn empty_patrol_route_targets_spawn() {
    let maze = open_room(12);
    let spawn = Vector2D::new(88.0, 88.0);
    let ghost = Ghost::new(GhostPersonality::Ambusher, spawn, 1.5, 16.0).with_patrol_route(Vec::new());

    let target = ghost.target_position(&player_at(Vector2D::new(150.0, 150.0)), maze.view());
    assert_eq!(target, spawn);
}

#[test]
fn opportunist_flees_to_the_bottom_left_corner_when_close() {
    let maze = open_room(12);
    let mut ghost = Ghost::new(GhostPersonality::Opportunist, Vector2D::new(100.0, 84.0), 1.5, 16.0);
    ghost.set_mode(GhostMode::Chase);

    let near = ghost.target_position(&player_at(Vector2D::new(100.0, 100.0)), maze.view());
    assert_eq!(near, Vector2D::new(24.0, 168.0));

    let far = ghost.target_position(&player_at(Vector2D::new(168.0, 168.0)), maze.view());
    assert_eq!(far, Vector2D::new(168.0, 168.0));
}

#[test]
fn flanker_mirrors_around_the_chaser() {
    let maze = open_room(12);
    let mut ghost = Ghost::new(GhostPersonality::Flanker, Vector2D::new(40.0, 40.0), 1.5, 16.0);
    ghost.set_mode(GhostMode::Chase);
    let context = GhostContext {
        player_position: Vector2D::new(100.0, 100.0),
        player_direction: Direction::Up,
        chaser_position: Some(Vector2D::new(40.0, 100.0)),
    };

    let target = ghost.target_position(&context, maze.view());
    assert_eq!(target, Vector2D::new(70.0, 84.0));
}

#[test]
fn configure_astar_clamps_the_interval_and_can_disable_search() {
    let mut ghost = Ghost::new(GhostPersonality::Chaser, Vector2D::new(40.0, 40.0), 1.5, 16.0);
    ghost.configure_astar(true, Duration::from_millis(50));
    assert_eq!(ghost.astar_interval(), Duration::from_millis(200));

    ghost.configure_astar(false, Duration::from_millis(1500));
    assert!(!ghost.astar_enabled());
    assert!(ghost.path().is_empty());
}

#[test]
fn disabled_astar_never_plans_paths() {
    let maze = open_room(12);
    let mut ghost = chasing_ghost(Vector2D::new(100.0, 84.0));
    ghost.configure_astar(false, Duration::from_millis(2000));
    let context = player_at(Vector2D::new(100.0, 150.0));

    for _ in 0..20 {
        let _ = ghost.update(TICK, &context, maze.view(), &mut low_rolls());
    }
    assert!(ghost.path().is_empty());
}

#[test]
fn should_use_astar_honours_personality_odds() {
    let ghost = Ghost::new(GhostPersonality::Chaser, Vector2D::new(40.0, 40.0), 1.5, 16.0);
    let target = Vector2D::new(100.0, 100.0);
    assert!(ghost.should_use_astar(target, &mut low_rolls()));
    assert!(!ghost.should_use_astar(target, &mut high_rolls()));
}

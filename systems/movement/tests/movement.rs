use std::time::Duration;

use maze_chase_core::{Direction, EntityKind, Maze, MazeMetadata, Vector2D};
use maze_chase_system_movement::{Kinematics, Player};

const TICK: Duration = Duration::from_millis(16);

fn maze_from(rows: &[&str]) -> Maze {
    let layout: Vec<Vec<u8>> = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|cell| if cell == '#' { 1 } else { 0 })
                .collect()
        })
        .collect();
    Maze::from_rows(&layout, 16.0, MazeMetadata::new("test", 0, "")).expect("valid layout")
}

#[test]
fn player_stops_at_the_end_of_a_corridor() {
    let maze = maze_from(&["######", "#....#", "######"]);
    let mut player = Player::new(Vector2D::new(24.0, 24.0), 2.0, 16.0, 3);
    player.request_direction(Direction::Right);

    for _ in 0..60 {
        player.update(TICK, maze.view());
    }

    assert!(player.position().approx_eq(Vector2D::new(72.0, 24.0)));
    assert_eq!(player.direction(), Direction::None);
}

#[test]
fn queued_turn_is_taken_once_the_corner_is_reached() {
    let maze = maze_from(&["######", "#....#", "####.#", "####.#", "######"]);
    let mut player = Player::new(Vector2D::new(24.0, 24.0), 2.0, 16.0, 3);
    player.request_direction(Direction::Right);
    player.update(TICK, maze.view());
    player.request_direction(Direction::Down);

    let mut turned_at = None;
    for _ in 0..60 {
        player.update(TICK, maze.view());
        if turned_at.is_none() && player.direction() == Direction::Down {
            turned_at = Some(player.position());
        }
    }

    let turned_at = turned_at.expect("player should turn down");
    assert!((turned_at.x() - 72.0).abs() < 1e-3);
    assert!(player.position().approx_eq(Vector2D::new(72.0, 56.0)));
}

#[test]
fn reversing_is_immediate_in_open_corridors() {
    let maze = maze_from(&["#######", "#.....#", "#######"]);
    let mut player = Player::new(Vector2D::new(56.0, 24.0), 2.0, 16.0, 3);
    player.request_direction(Direction::Right);
    player.update(TICK, maze.view());
    assert!(player.position().approx_eq(Vector2D::new(58.0, 24.0)));

    player.request_direction(Direction::Left);
    player.update(TICK, maze.view());
    assert!(player.position().approx_eq(Vector2D::new(56.0, 24.0)));
    assert_eq!(player.direction(), Direction::Left);
}

#[test]
fn blocked_request_keeps_the_current_heading() {
    let maze = maze_from(&["#######", "#.....#", "#######"]);
    let mut player = Player::new(Vector2D::new(40.0, 24.0), 2.0, 16.0, 3);
    player.request_direction(Direction::Right);
    player.update(TICK, maze.view());
    player.request_direction(Direction::Up);
    player.update(TICK, maze.view());

    assert_eq!(player.direction(), Direction::Right);
    assert!(player.position().approx_eq(Vector2D::new(44.0, 24.0)));
    assert_eq!(player.body().requested_direction(), Direction::Up);
}

#[test]
fn respawn_clears_pending_movement() {
    let maze = maze_from(&["######", "#....#", "######"]);
    let spawn = Vector2D::new(24.0, 24.0);
    let mut player = Player::new(spawn, 2.0, 16.0, 3);
    player.request_direction(Direction::Right);
    for _ in 0..5 {
        player.update(TICK, maze.view());
    }
    player.respawn();

    assert_eq!(player.position(), spawn);
    assert_eq!(player.direction(), Direction::None);
    player.update(TICK, maze.view());
    assert_eq!(player.position(), spawn);
}

#[test]
fn score_only_grows() {
    let mut player = Player::new(Vector2D::new(24.0, 24.0), 2.0, 16.0, 3);
    player.add_score(10);
    player.add_score(50);
    player.add_score(u32::MAX);
    assert_eq!(player.score(), u32::MAX);
}

#[test]
fn ghost_clearance_allows_looser_cornering() {
    let maze = maze_from(&["######", "#....#", "####.#", "######"]);
    let ghost = Kinematics::new(Vector2D::new(70.0, 24.0), 1.5, EntityKind::Ghost, 16.0);
    let player = Kinematics::new(Vector2D::new(70.0, 24.0), 1.5, EntityKind::Player, 16.0);

    assert!(ghost.can_move(Direction::Down, maze.view()));
    assert!(!player.can_move(Direction::Down, maze.view()));
}

#[test]
fn committed_steps_ignore_the_queue() {
    let mut ghost = Kinematics::new(Vector2D::new(24.0, 24.0), 1.5, EntityKind::Ghost, 16.0);
    ghost.request(Direction::Up);
    ghost.commit(Direction::Right);
    ghost.step();
    assert!(ghost.position().approx_eq(Vector2D::new(25.5, 24.0)));
}

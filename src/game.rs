//! Game state: board, active piece, phase, fall timer, snapshot.

use crate::GameConfig;
use crate::board::{Board, EMPTY};
use crate::piece::Piece;
use crate::timer::FallTimer;
use crate::vector::Vector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::time::{Duration, Instant};

pub const BOARD_WIDTH: u16 = 10;
pub const BOARD_HEIGHT: u16 = 16;
/// Narrowest board on which every catalog piece spawns inside the walls at `width / 2`.
/// The horizontal I spans columns -1..=2 around its anchor.
pub const MIN_BOARD_WIDTH: u16 = 5;

/// Gravity interval while nothing accelerates the piece.
pub const BASE_FALL_MS: u64 = 700;
/// Soft drop: next fall tick fires after this.
pub const SOFT_DROP_MS: u64 = 50;
/// Hard drop: re-arm so the next loop iteration locks the piece.
pub const HARD_DROP_MS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, waiting for start.
    Init,
    Playing,
    /// A new piece collided on spawn. Terminal for this instance.
    Over,
}

/// Owned render input: board with the active piece composited in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub lines_cleared: u32,
    pub pieces_locked: u32,
    grid: Vec<Vec<u8>>,
}

impl Snapshot {
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.grid[row][col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.grid.iter().map(Vec::as_slice)
    }
}

/// One text line per row: `#` for a block, `.` for empty.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for &c in row {
                f.write_str(if c == EMPTY { "." } else { "#" })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct GameState {
    board: Board,
    piece: Piece,
    /// Board-space anchor of the active piece.
    position: Vector,
    phase: Phase,
    fall_timer: FallTimer,
    fall_interval: Duration,
    soft_drop_interval: Duration,
    hard_drop_interval: Duration,
    rng: StdRng,
    lines_cleared: u32,
    pieces_locked: u32,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let width = usize::from(config.width.max(MIN_BOARD_WIDTH));
        let height = usize::from(config.height);
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            board: Board::new(height, width),
            piece: Piece::placeholder(),
            position: Vector::new(1, (width / 2) as i32),
            phase: Phase::Init,
            fall_timer: FallTimer::stopped(),
            fall_interval: config.fall_interval,
            soft_drop_interval: config.soft_drop_interval,
            hard_drop_interval: config.hard_drop_interval,
            rng,
            lines_cleared: 0,
            pieces_locked: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fall_timer(&self) -> &FallTimer {
        &self.fall_timer
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Any cell of the active piece outside the board or on a locked block.
    pub fn collides(&self) -> bool {
        self.piece
            .cells(self.position)
            .any(|p| !self.board.contains(p) || self.board.cell_at(p) != EMPTY)
    }

    fn spawn_piece(&mut self) {
        self.piece = Piece::random(&mut self.rng);
        self.position = Vector::new(0, (self.board.width() / 2) as i32);
    }

    /// Translate the piece, reverting on collision.
    fn try_move(&mut self, delta: Vector) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.position += delta;
        if self.collides() {
            self.position -= delta;
            return false;
        }
        true
    }

    fn try_rotate(&mut self, clockwise: bool) {
        if !self.is_playing() {
            return;
        }
        self.piece.rotate(clockwise);
        if self.collides() {
            self.piece.rotate_back(clockwise);
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Init {
            return;
        }
        self.phase = Phase::Playing;
        self.spawn_piece();
        self.fall_timer.reset(now, self.fall_interval);
    }

    pub fn move_left(&mut self) {
        self.try_move(Vector::LEFT);
    }

    pub fn move_right(&mut self) {
        self.try_move(Vector::RIGHT);
    }

    pub fn rotate(&mut self) {
        self.try_rotate(true);
    }

    pub fn rotate_ccw(&mut self) {
        self.try_rotate(false);
    }

    /// Soft drop: pull the next fall tick in.
    pub fn speed_up(&mut self, now: Instant) {
        if !self.is_playing() {
            return;
        }
        self.fall_timer.reset(now, self.soft_drop_interval);
    }

    /// Hard drop: sink to the lowest legal row; the next tick locks.
    pub fn fall(&mut self, now: Instant) {
        if !self.is_playing() {
            return;
        }
        while self.try_move(Vector::DOWN) {}
        self.fall_timer.reset(now, self.hard_drop_interval);
    }

    /// One gravity step: move down, or lock, clear rows and spawn the next piece.
    pub fn tick(&mut self, now: Instant) {
        if !self.is_playing() {
            return;
        }
        if !self.try_move(Vector::DOWN) {
            self.board.lock(&self.piece, self.position);
            self.pieces_locked += 1;
            self.lines_cleared += self.board.clear_full_rows() as u32;
            self.spawn_piece();
            if self.collides() {
                self.fall_timer.stop();
                self.phase = Phase::Over;
                return;
            }
        }
        self.fall_timer.reset(now, self.fall_interval);
    }

    /// Run `tick` if the fall timer is due. Returns true if it fired.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.fall_timer.fire(now) {
            self.tick(now);
            true
        } else {
            false
        }
    }

    pub fn fall_deadline(&self) -> Option<Instant> {
        self.fall_timer.deadline()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut grid = self.board.to_grid();
        for p in self.piece.cells(self.position) {
            if self.board.contains(p) {
                grid[p.row as usize][p.col as usize] = self.piece.color;
            }
        }
        Snapshot {
            phase: self.phase,
            lines_cleared: self.lines_cleared,
            pieces_locked: self.pieces_locked,
            grid,
        }
    }

    #[cfg(test)]
    fn place(&mut self, piece: Piece, position: Vector) {
        self.piece = piece;
        self.position = position;
    }

    #[cfg(test)]
    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::CATALOG;

    const W: i32 = BOARD_WIDTH as i32;
    const H: i32 = BOARD_HEIGHT as i32;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        }
    }

    fn started(now: Instant) -> GameState {
        let mut game = GameState::new(&config());
        game.start(now);
        game
    }

    fn cells(game: &GameState) -> Vec<Vector> {
        game.piece().cells(game.position()).collect()
    }

    #[test]
    fn test_new_is_init() {
        let game = GameState::new(&config());
        assert_eq!(game.phase(), Phase::Init);
        assert!(!game.fall_timer().is_armed());
        let snap = game.snapshot();
        assert_eq!(snap.height(), BOARD_HEIGHT as usize);
        assert_eq!(snap.width(), BOARD_WIDTH as usize);
        assert!(snap.rows().all(|r| r.iter().all(|&c| c == EMPTY)));
    }

    #[test]
    fn test_actions_ignored_before_start() {
        let now = Instant::now();
        let mut game = GameState::new(&config());
        let pos = game.position();
        game.move_left();
        game.move_right();
        game.rotate();
        game.tick(now);
        game.fall(now);
        game.speed_up(now);
        assert_eq!(game.position(), pos);
        assert_eq!(game.phase(), Phase::Init);
        assert!(!game.fall_timer().is_armed());
    }

    #[test]
    fn test_start_spawns_centered_and_arms_timer() {
        let now = Instant::now();
        let mut game = started(now);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.position(), Vector::new(0, W / 2));
        assert_ne!(game.piece().color, 0);
        assert!(!game.collides());
        assert_eq!(
            game.fall_timer().remaining(now),
            Some(Duration::from_millis(BASE_FALL_MS))
        );

        // Second start does not respawn.
        game.move_left();
        let pos = game.position();
        let piece = game.piece().clone();
        game.start(now);
        assert_eq!(game.position(), pos);
        assert_eq!(game.piece(), &piece);
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut game = started(Instant::now());
        for _ in 0..W {
            game.move_left();
        }
        assert_eq!(cells(&game).iter().map(|c| c.col).min(), Some(0));
        let pos = game.position();
        game.move_left();
        assert_eq!(game.position(), pos);

        for _ in 0..W {
            game.move_right();
        }
        assert_eq!(cells(&game).iter().map(|c| c.col).max(), Some(W - 1));
        let pos = game.position();
        game.move_right();
        assert_eq!(game.position(), pos);
    }

    #[test]
    fn test_move_blocked_by_locked_cell() {
        let mut game = started(Instant::now());
        game.place(Piece::from_template(&CATALOG[2]), Vector::new(5, 4));
        game.board_mut().set(Vector::new(5, 3), 1);
        game.move_left();
        assert_eq!(game.position(), Vector::new(5, 4));
        game.move_right();
        assert_eq!(game.position(), Vector::new(5, 5));
    }

    #[test]
    fn test_rotate_reverted_on_collision() {
        let mut game = started(Instant::now());
        let i_piece = Piece::from_template(&CATALOG[1]);

        // Vertical I would poke above row 0.
        game.place(i_piece.clone(), Vector::new(0, 5));
        game.rotate();
        assert_eq!(game.piece(), &i_piece);
        game.rotate_ccw();
        assert_eq!(game.piece(), &i_piece);

        game.place(i_piece.clone(), Vector::new(5, 5));
        game.rotate();
        assert_ne!(game.piece(), &i_piece);
        assert!(cells(&game).iter().all(|c| c.col == 5));
        game.rotate_ccw();
        assert_eq!(game.piece(), &i_piece);
    }

    #[test]
    fn test_rotate_blocked_by_locked_cell() {
        let mut game = started(Instant::now());
        let t_piece = Piece::from_template(&CATALOG[3]);
        game.place(t_piece.clone(), Vector::new(5, 5));
        // Clockwise T turns (0,-1) into (-1,0).
        game.board_mut().set(Vector::new(4, 5), 1);
        game.rotate();
        assert_eq!(game.piece(), &t_piece);
    }

    #[test]
    fn test_non_rotatable_piece_keeps_shape() {
        let mut game = started(Instant::now());
        let o_piece = Piece::from_template(&CATALOG[2]);
        game.place(o_piece.clone(), Vector::new(5, 5));
        game.rotate();
        assert_eq!(game.piece(), &o_piece);
    }

    #[test]
    fn test_tick_moves_down_and_rearms() {
        let now = Instant::now();
        let mut game = started(now);
        let later = now + Duration::from_millis(BASE_FALL_MS);
        game.tick(later);
        assert_eq!(game.position(), Vector::new(1, W / 2));
        assert_eq!(
            game.fall_timer().deadline(),
            Some(later + Duration::from_millis(BASE_FALL_MS))
        );
    }

    #[test]
    fn test_ticks_land_and_lock_piece() {
        let now = Instant::now();
        let mut game = started(now);
        let piece = game.piece().clone();
        let mut landed = None;
        for _ in 0..H + 2 {
            let pos = game.position();
            game.tick(now);
            if game.pieces_locked() == 1 {
                landed = Some(pos);
                break;
            }
        }
        let landed = landed.expect("piece never locked");

        let locked: Vec<_> = piece.cells(landed).collect();
        assert!(locked.iter().all(|&c| game.board().cell_at(c) == piece.color));
        assert_eq!(locked.iter().map(|c| c.row).max(), Some(H - 1));
        assert_eq!(game.position(), Vector::new(0, W / 2));
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.fall_timer().is_armed());
    }

    #[test]
    fn test_tick_clears_completed_row() {
        let now = Instant::now();
        let mut game = started(now);
        for col in 2..W {
            game.board_mut().set(Vector::new(H - 1, col), 1);
        }
        let o_piece = Piece::from_template(&CATALOG[2]);
        game.place(o_piece.clone(), Vector::new(H - 2, 0));

        game.tick(now);

        assert_eq!(game.lines_cleared(), 1);
        let bottom: Vec<u8> = game.board().rows().last().unwrap().to_vec();
        let mut expected = vec![EMPTY; W as usize];
        expected[0] = o_piece.color;
        expected[1] = o_piece.color;
        assert_eq!(bottom, expected);
        assert!(
            game.board()
                .rows()
                .take(H as usize - 1)
                .all(|r| r.iter().all(|&c| c == EMPTY))
        );
    }

    #[test]
    fn test_tick_clears_several_rows_at_once() {
        let now = Instant::now();
        let mut game = started(now);
        for row in [H - 2, H - 1] {
            for col in 2..W {
                game.board_mut().set(Vector::new(row, col), 4);
            }
        }
        game.place(Piece::from_template(&CATALOG[2]), Vector::new(H - 2, 0));
        game.tick(now);
        assert_eq!(game.lines_cleared(), 2);
        assert!(game.board().rows().all(|r| r.iter().all(|&c| c == EMPTY)));
    }

    #[test]
    fn test_fall_drops_to_lowest_row() {
        let now = Instant::now();
        let mut game = started(now);
        game.fall(now);
        assert!(!game.collides());
        assert_eq!(cells(&game).iter().map(|c| c.row).max(), Some(H - 1));
        assert_eq!(game.pieces_locked(), 0);
        assert_eq!(
            game.fall_timer().remaining(now),
            Some(Duration::from_millis(HARD_DROP_MS))
        );

        assert!(game.advance(now + Duration::from_millis(HARD_DROP_MS)));
        assert_eq!(game.pieces_locked(), 1);
    }

    #[test]
    fn test_fall_stops_on_stack() {
        let now = Instant::now();
        let mut game = started(now);
        for col in 0..W {
            game.board_mut().set(Vector::new(10, col), 1);
        }
        game.fall(now);
        assert!(!game.collides());
        assert_eq!(cells(&game).iter().map(|c| c.row).max(), Some(9));
    }

    #[test]
    fn test_speed_up_shortens_timer() {
        let now = Instant::now();
        let mut game = started(now);
        game.speed_up(now);
        assert_eq!(
            game.fall_timer().remaining(now),
            Some(Duration::from_millis(SOFT_DROP_MS))
        );
        assert_eq!(game.position(), Vector::new(0, W / 2));
    }

    #[test]
    fn test_advance_waits_for_deadline() {
        let now = Instant::now();
        let mut game = started(now);
        assert!(!game.advance(now + Duration::from_millis(BASE_FALL_MS - 1)));
        assert_eq!(game.position(), Vector::new(0, W / 2));
        assert!(game.advance(now + Duration::from_millis(BASE_FALL_MS)));
        assert_eq!(game.position(), Vector::new(1, W / 2));
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let now = Instant::now();
        let mut game = started(now);
        // Stack reaching row 2, column 0 left open so nothing clears.
        for row in 2..H {
            for col in 1..W {
                game.board_mut().set(Vector::new(row, col), 1);
            }
        }
        for _ in 0..10 {
            game.tick(now);
            if game.phase() == Phase::Over {
                break;
            }
        }
        assert_eq!(game.phase(), Phase::Over);
        assert!(!game.fall_timer().is_armed());
        assert_eq!(game.lines_cleared(), 0);

        let pos = game.position();
        let snap = game.snapshot();
        game.move_left();
        game.move_right();
        game.rotate();
        game.fall(now);
        game.tick(now);
        game.start(now);
        assert_eq!(game.position(), pos);
        assert_eq!(game.snapshot(), snap);
        assert_eq!(game.phase(), Phase::Over);
        assert!(!game.advance(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_snapshot_overlays_piece_without_mutating_board() {
        let mut game = started(Instant::now());
        game.place(Piece::from_template(&CATALOG[2]), Vector::new(3, 3));
        let snap = game.snapshot();
        for c in [(3, 3), (3, 4), (4, 3), (4, 4)] {
            assert_eq!(snap.cell(c.0, c.1), CATALOG[2].color);
        }
        assert!(game.board().rows().all(|r| r.iter().all(|&c| c == EMPTY)));
        assert_eq!(game.snapshot(), snap);
    }

    #[test]
    fn test_snapshot_display() {
        let mut game = GameState::new(&GameConfig {
            width: 5,
            height: 3,
            ..config()
        });
        game.start(Instant::now());
        game.place(Piece::from_template(&CATALOG[2]), Vector::new(1, 1));
        assert_eq!(game.snapshot().to_string(), ".....\n.##..\n.##..");
    }

    #[test]
    fn test_every_piece_spawns_inside_narrowest_board() {
        let board = Board::new(2, usize::from(MIN_BOARD_WIDTH));
        let anchor = Vector::new(0, i32::from(MIN_BOARD_WIDTH) / 2);
        for t in CATALOG.iter() {
            let piece = Piece::from_template(t);
            assert!(piece.cells(anchor).all(|c| board.contains(c)), "{t:?}");
        }

        // One column less and the I pokes through the right wall.
        let narrower = Board::new(2, usize::from(MIN_BOARD_WIDTH) - 1);
        let anchor = Vector::new(0, i32::from(MIN_BOARD_WIDTH - 1) / 2);
        let i_piece = Piece::from_template(&CATALOG[1]);
        assert!(!i_piece.cells(anchor).all(|c| narrower.contains(c)));
    }

    #[test]
    fn test_narrow_config_is_widened() {
        let now = Instant::now();
        for seed in 0..20 {
            let mut game = GameState::new(&GameConfig {
                width: 4,
                seed: Some(seed),
                ..GameConfig::default()
            });
            assert_eq!(game.board().width(), usize::from(MIN_BOARD_WIDTH));
            game.start(now);
            assert!(!game.collides(), "seed {seed}: {:?}", game.piece());
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let now = Instant::now();
        let a = started(now);
        let b = started(now);
        assert_eq!(a.piece(), b.piece());
    }
}

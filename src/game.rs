use crate::ai::RandomMoveSelector;
use crate::board::Board;
use crate::error::{GameError, RelayError};
use crate::relay::{ClientEvent, RelaySession, ServerEvent, SessionUpdate};
use crate::render::pixel_to_cell;
use crate::types::{AppliedMove, GameMode, GameState, Move, MoveKind, Player, Position};

/// The side played by the computer in `GameMode::VsAi`.
pub const AI_PLAYER: Player = Player::Black;

pub trait MoveSelector: Send + Sync {
    fn select_move(&mut self, board: &Board, player: Player) -> Option<Move>;
}

/// Result of one click on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Input is not accepted right now, or the click picked nothing.
    Ignored,
    Selected(Position),
    /// The destination was not a legal move; the selection was dropped.
    Deselected,
    /// `emit` carries the relay event for online games.
    Moved {
        applied: AppliedMove,
        emit: Option<ClientEvent>,
    },
}

pub struct GameInstance {
    board: Board,
    pub current_player: Player,
    pub mode: GameMode,
    pub selected: Option<Position>,
    pub winner: Option<Player>,
    pub last_move: Option<AppliedMove>,
    session: RelaySession,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(mode: GameMode, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            board: Board::new(),
            current_player: Player::Red,
            mode,
            selected: None,
            winner: None,
            last_move: None,
            session: RelaySession::new(),
            selector,
        }
    }

    pub fn new_with_default_selector(mode: GameMode) -> Self {
        Self::new(mode, Box::new(RandomMoveSelector::new()))
    }

    /// Resets the board and turn for a fresh game in `mode`.
    pub fn start(&mut self, mode: GameMode) {
        self.board = Board::new();
        self.current_player = Player::Red;
        self.mode = mode;
        self.selected = None;
        self.winner = None;
        self.last_move = None;
        log::info!("new {:?} game started", mode);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn session(&self) -> &RelaySession {
        &self.session
    }

    pub fn accepts_input(&self) -> bool {
        if self.winner.is_some() {
            return false;
        }
        match self.mode {
            GameMode::Local => true,
            GameMode::VsAi => self.current_player != AI_PLAYER,
            GameMode::Online => self.session.room_id().is_some() && self.session.is_my_turn(),
        }
    }

    /// Two-click input: the first click picks up a piece of the side to
    /// move, the second one tries to move it there.
    pub fn click_cell(&mut self, pos: Position) -> Result<ClickOutcome, GameError> {
        if !pos.in_bounds() {
            return Err(GameError::OutOfRange(pos));
        }
        if !self.accepts_input() {
            return Ok(ClickOutcome::Ignored);
        }

        let Some(from) = self.selected.take() else {
            if self.board.get(pos) == Some(self.current_player) {
                self.selected = Some(pos);
                return Ok(ClickOutcome::Selected(pos));
            }
            return Ok(ClickOutcome::Ignored);
        };

        match self.board.classify_move(from, pos, self.current_player) {
            Some(kind) => {
                let mv = Move::new(from, pos);
                let emit = if self.mode == GameMode::Online {
                    let mut next = self.board;
                    next.apply_move(mv, kind);
                    Some(self.session.send_move(&next, self.current_player.opponent())?)
                } else {
                    None
                };
                let applied = self.apply(mv, kind);
                Ok(ClickOutcome::Moved { applied, emit })
            }
            None => {
                log::debug!("rejected move {:?} -> {:?}", from, pos);
                Ok(ClickOutcome::Deselected)
            }
        }
    }

    /// Clicks outside the board are ignored.
    pub fn click_pixel(&mut self, x: f64, y: f64, tile_size: u32) -> Result<ClickOutcome, GameError> {
        match pixel_to_cell(x, y, tile_size) {
            Some(pos) => self.click_cell(pos),
            None => Ok(ClickOutcome::Ignored),
        }
    }

    pub fn needs_ai_move(&self) -> bool {
        self.mode == GameMode::VsAi && self.current_player == AI_PLAYER && self.winner.is_none()
    }

    /// Plays one move for the AI side. Returns `Ok(None)` when it has no
    /// legal move; the turn then stays with the AI.
    pub fn do_ai_move(&mut self) -> Result<Option<AppliedMove>, GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }
        if self.current_player != AI_PLAYER {
            return Err(GameError::NotAiTurn);
        }

        let Some(mv) = self.selector.select_move(&self.board, AI_PLAYER) else {
            log::warn!("AI has no legal moves; game is stalled");
            return Ok(None);
        };

        let kind = self
            .board
            .classify_move(mv.from, mv.to, AI_PLAYER)
            .filter(|_| self.board.get(mv.from) == Some(AI_PLAYER))
            .ok_or(GameError::IllegalAiMove)?;

        Ok(Some(self.apply(mv, kind)))
    }

    /// Replaces board and turn with a snapshot received from the peer.
    pub fn apply_remote(&mut self, board: Board, turn: Player) {
        self.board = board;
        self.current_player = turn;
        self.selected = None;
        self.last_move = None;
        self.winner = Self::winner_on(&self.board, turn);
    }

    pub fn create_room(&mut self) -> ClientEvent {
        self.session.create_room()
    }

    pub fn join_room(&mut self, room_id: &str) -> Result<ClientEvent, RelayError> {
        self.session.join_room(room_id)
    }

    /// Feeds a relay event to the session and applies its effect: a joined
    /// room starts an online game, a peer move replaces the board.
    pub fn handle_server_event(&mut self, event: ServerEvent) -> Result<SessionUpdate, RelayError> {
        let update = self.session.handle(event)?;
        match &update {
            SessionUpdate::GameStarted => self.start(GameMode::Online),
            SessionUpdate::RemoteMove { board, turn } => self.apply_remote(*board, *turn),
            SessionUpdate::RoomCreated(_) | SessionUpdate::Error(_) => {}
        }
        Ok(update)
    }

    pub fn to_game_state(&self) -> GameState {
        let (red_count, black_count) = self.board.count();
        GameState {
            board: self.board.to_rows(),
            current_player: self.current_player,
            red_count,
            black_count,
            mode: self.mode,
            selected: self.selected,
            winner: self.winner,
            last_move: self.last_move,
            accepts_input: self.accepts_input(),
        }
    }

    fn apply(&mut self, mv: Move, kind: MoveKind) -> AppliedMove {
        let player = self.current_player;
        self.board.apply_move(mv, kind);
        self.selected = None;
        self.current_player = player.opponent();

        let applied = AppliedMove { player, mv, kind };
        self.last_move = Some(applied);
        log::debug!("{:?} played {:?} ({:?})", player, mv, kind);

        if self.board.pieces_of(player.opponent()) == 0 {
            self.winner = Some(player);
            log::info!("{:?} wins", player);
        }

        applied
    }

    /// The side that still has pieces once the side to move has none.
    fn winner_on(board: &Board, to_move: Player) -> Option<Player> {
        if board.pieces_of(to_move) == 0 && board.pieces_of(to_move.opponent()) > 0 {
            Some(to_move.opponent())
        } else {
            None
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, current_player: Player) {
        self.board = board;
        self.current_player = current_player;
        self.selected = None;
        self.winner = None;
        self.last_move = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::UniformMoveSelector;

    struct FixedMoveSelector {
        mv: Option<Move>,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(&mut self, _board: &Board, _player: Player) -> Option<Move> {
            self.mv
        }
    }

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn board_with(pieces: &[(u8, u8, Player)]) -> Board {
        let mut board = Board::empty();
        for &(row, col, player) in pieces {
            board.set(pos(row, col), Some(player));
        }
        board
    }

    fn seeded(mode: GameMode) -> GameInstance {
        GameInstance::new(mode, Box::new(RandomMoveSelector::with_seed(42)))
    }

    #[test]
    fn initial_state_is_correct() {
        let game = seeded(GameMode::Local);
        let state = game.to_game_state();

        assert_eq!(state.current_player, Player::Red);
        assert_eq!(state.red_count, 12);
        assert_eq!(state.black_count, 12);
        assert_eq!(state.selected, None);
        assert_eq!(state.winner, None);
        assert!(state.accepts_input);
    }

    #[test]
    fn first_click_selects_only_pieces_of_side_to_move() {
        let mut game = seeded(GameMode::Local);

        assert_eq!(game.click_cell(pos(2, 1)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(game.click_cell(pos(4, 4)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(game.selected, None);

        assert_eq!(game.click_cell(pos(5, 2)).unwrap(), ClickOutcome::Selected(pos(5, 2)));
        assert_eq!(game.selected, Some(pos(5, 2)));
    }

    #[test]
    fn accepted_move_flips_turn_exactly_once() {
        let mut game = seeded(GameMode::Local);

        game.click_cell(pos(5, 2)).unwrap();
        let outcome = game.click_cell(pos(4, 3)).unwrap();

        assert_eq!(
            outcome,
            ClickOutcome::Moved {
                applied: AppliedMove {
                    player: Player::Red,
                    mv: Move::new(pos(5, 2), pos(4, 3)),
                    kind: MoveKind::Step,
                },
                emit: None,
            }
        );
        assert_eq!(game.current_player, Player::Black);
        assert_eq!(game.selected, None);
        assert_eq!(game.board().get(pos(4, 3)), Some(Player::Red));

        game.click_cell(pos(2, 1)).unwrap();
        game.click_cell(pos(3, 2)).unwrap();
        assert_eq!(game.current_player, Player::Red);
    }

    #[test]
    fn invalid_destination_clears_selection_and_keeps_turn() {
        let mut game = seeded(GameMode::Local);
        let before = *game.board();

        game.click_cell(pos(5, 2)).unwrap();
        let outcome = game.click_cell(pos(3, 2)).unwrap();

        assert_eq!(outcome, ClickOutcome::Deselected);
        assert_eq!(game.selected, None);
        assert_eq!(game.current_player, Player::Red);
        assert_eq!(*game.board(), before);
    }

    #[test]
    fn jump_removes_captured_piece_and_last_piece_wins() {
        let mut game = seeded(GameMode::Local);
        game.set_board_for_test(
            board_with(&[(5, 2, Player::Red), (4, 3, Player::Black)]),
            Player::Red,
        );

        game.click_cell(pos(5, 2)).unwrap();
        let outcome = game.click_cell(pos(3, 4)).unwrap();

        let ClickOutcome::Moved { applied, .. } = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(applied.kind, MoveKind::Jump { captured: pos(4, 3) });
        assert_eq!(game.current_player, Player::Black);
        assert_eq!(game.board().get(pos(4, 3)), None);
        assert_eq!(game.winner, Some(Player::Red));
        assert!(!game.accepts_input());
        assert_eq!(game.click_cell(pos(3, 4)).unwrap(), ClickOutcome::Ignored);
    }

    #[test]
    fn off_board_click_is_an_error_and_off_canvas_pixel_is_ignored() {
        let mut game = seeded(GameMode::Local);

        assert_eq!(game.click_cell(pos(8, 0)), Err(GameError::OutOfRange(pos(8, 0))));
        assert_eq!(game.click_pixel(601.0, 10.0, 75).unwrap(), ClickOutcome::Ignored);
        assert_eq!(
            game.click_pixel(2.0 * 75.0 + 10.0, 5.0 * 75.0 + 74.0, 75).unwrap(),
            ClickOutcome::Selected(pos(5, 2))
        );
    }

    #[test]
    fn vs_ai_blocks_input_until_ai_has_moved() {
        let mut game = seeded(GameMode::VsAi);

        game.click_cell(pos(5, 2)).unwrap();
        game.click_cell(pos(4, 3)).unwrap();

        assert!(game.needs_ai_move());
        assert!(!game.accepts_input());
        assert_eq!(game.click_cell(pos(2, 1)).unwrap(), ClickOutcome::Ignored);

        let applied = game.do_ai_move().unwrap().unwrap();

        assert_eq!(applied.player, Player::Black);
        assert_eq!(game.current_player, Player::Red);
        assert!(!game.needs_ai_move());
        assert!(game.accepts_input());
    }

    #[test]
    fn ai_takes_the_only_capture_in_the_example_position() {
        let mut game = seeded(GameMode::VsAi);
        game.set_board_for_test(
            board_with(&[(2, 3, Player::Black), (3, 4, Player::Red)]),
            Player::Black,
        );

        let applied = game.do_ai_move().unwrap().unwrap();

        assert_eq!(applied.mv, Move::new(pos(2, 3), pos(4, 5)));
        assert_eq!(applied.kind, MoveKind::Jump { captured: pos(3, 4) });
        assert_eq!(game.board().get(pos(4, 5)), Some(Player::Black));
        assert_eq!(game.board().get(pos(3, 4)), None);
        assert_eq!(game.winner, Some(Player::Black));
    }

    #[test]
    fn ai_without_moves_leaves_turn_unchanged() {
        let mut game = GameInstance::new(GameMode::VsAi, Box::new(UniformMoveSelector::with_seed(3)));
        game.set_board_for_test(
            board_with(&[(7, 0, Player::Black), (5, 2, Player::Red)]),
            Player::Black,
        );

        assert_eq!(game.do_ai_move(), Ok(None));
        assert_eq!(game.current_player, Player::Black);
        assert!(game.needs_ai_move());
    }

    #[test]
    fn ai_move_out_of_turn_or_illegal_is_rejected() {
        let mut game = seeded(GameMode::VsAi);
        assert_eq!(game.do_ai_move(), Err(GameError::NotAiTurn));

        let mut game = GameInstance::new(
            GameMode::VsAi,
            Box::new(FixedMoveSelector {
                mv: Some(Move::new(pos(5, 2), pos(4, 3))),
            }),
        );
        game.set_board_for_test(Board::new(), Player::Black);

        assert_eq!(game.do_ai_move(), Err(GameError::IllegalAiMove));
        assert_eq!(*game.board(), Board::new());
    }

    fn online_game_in_room(room_id: &str) -> GameInstance {
        let mut game = seeded(GameMode::Local);
        game.join_room(room_id).unwrap();
        game.handle_server_event(ServerEvent::RoomJoined).unwrap();
        game
    }

    fn remote_move(board: &Board, turn: Player) -> ServerEvent {
        ServerEvent::Move(crate::relay::InboundMove {
            payload: crate::relay::MovePayload::new(board, turn),
        })
    }

    #[test]
    fn online_game_without_room_ignores_input_and_keeps_board() {
        let mut game = seeded(GameMode::Online);

        assert!(!game.accepts_input());
        assert_eq!(game.click_cell(pos(5, 2)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(game.click_cell(pos(4, 3)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(*game.board(), Board::new());
        assert_eq!(game.current_player, Player::Red);
    }

    #[test]
    fn online_move_emits_snapshot_and_waits_for_peer() {
        let mut game = online_game_in_room("ROOM01");
        assert_eq!(game.mode, GameMode::Online);
        assert!(game.accepts_input());

        game.click_cell(pos(5, 2)).unwrap();
        let outcome = game.click_cell(pos(4, 3)).unwrap();

        let ClickOutcome::Moved { emit: Some(ClientEvent::Move(outbound)), .. } = outcome else {
            panic!("expected an emitted move, got {outcome:?}");
        };
        assert_eq!(outbound.room_id, "ROOM01");
        assert_eq!(outbound.payload.decode(), Ok((*game.board(), Player::Black)));
        assert!(!game.session().is_my_turn());
        assert!(!game.accepts_input());
        assert_eq!(game.click_cell(pos(2, 1)).unwrap(), ClickOutcome::Ignored);

        let mut remote = *game.board();
        remote.apply_move(Move::new(pos(2, 1), pos(3, 2)), MoveKind::Step);
        game.handle_server_event(remote_move(&remote, Player::Red)).unwrap();

        assert!(game.accepts_input());
        assert_eq!(game.current_player, Player::Red);
        assert_eq!(*game.board(), remote);
    }

    #[test]
    fn remote_snapshot_without_pieces_for_side_to_move_ends_game() {
        let mut game = online_game_in_room("ROOM01");

        let lost = board_with(&[(3, 4, Player::Black)]);
        game.handle_server_event(remote_move(&lost, Player::Red)).unwrap();

        assert_eq!(game.winner, Some(Player::Black));
        assert!(!game.accepts_input());
        assert_eq!(game.click_cell(pos(3, 4)).unwrap(), ClickOutcome::Ignored);
    }

    #[test]
    fn remote_snapshot_with_both_sides_on_board_has_no_winner() {
        let mut game = online_game_in_room("ROOM01");

        let open = board_with(&[(3, 4, Player::Black), (6, 1, Player::Red)]);
        game.handle_server_event(remote_move(&open, Player::Red)).unwrap();

        assert_eq!(game.winner, None);
        assert!(game.accepts_input());
    }

    #[test]
    fn start_resets_everything() {
        let mut game = seeded(GameMode::Local);
        game.click_cell(pos(5, 2)).unwrap();
        game.click_cell(pos(4, 3)).unwrap();

        game.start(GameMode::VsAi);

        assert_eq!(*game.board(), Board::new());
        assert_eq!(game.current_player, Player::Red);
        assert_eq!(game.mode, GameMode::VsAi);
        assert_eq!(game.last_move, None);
    }
}

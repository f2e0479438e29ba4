//! 将棋棋盘（规则引擎）
//!
//! 使用定长数组存储棋子，实现 `Rules` 供搜索核心使用。

use crate::rules::Rules;
use crate::sfen::{parse_sfen, to_sfen, SfenError, STARTPOS};
use crate::types::{
    Color, GameResult, Move, Piece, PieceType, Square, HAND_TYPES, SQUARE_COUNT,
};

// 偏移量都以先手视角给出（row -1 为前进），后手使用时翻转 row

const PAWN_STEPS: [(i8, i8); 1] = [(-1, 0)];
const KNIGHT_STEPS: [(i8, i8); 2] = [(-2, -1), (-2, 1)];
const SILVER_STEPS: [(i8, i8); 5] = [(-1, -1), (-1, 0), (-1, 1), (1, -1), (1, 1)];
const GOLD_STEPS: [(i8, i8); 6] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0)];
const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const LANCE_DIRS: [(i8, i8); 1] = [(-1, 0)];

/// 单步走法
fn step_offsets(pt: PieceType) -> &'static [(i8, i8)] {
    match pt {
        PieceType::Pawn => &PAWN_STEPS,
        PieceType::Knight => &KNIGHT_STEPS,
        PieceType::Silver => &SILVER_STEPS,
        PieceType::Gold
        | PieceType::ProPawn
        | PieceType::ProLance
        | PieceType::ProKnight
        | PieceType::ProSilver => &GOLD_STEPS,
        PieceType::King => &KING_STEPS,
        PieceType::Horse => &ORTHOGONALS,
        PieceType::Dragon => &DIAGONALS,
        PieceType::Lance | PieceType::Bishop | PieceType::Rook => &[],
    }
}

/// 直线滑行方向
fn slide_dirs(pt: PieceType) -> &'static [(i8, i8)] {
    match pt {
        PieceType::Lance => &LANCE_DIRS,
        PieceType::Bishop | PieceType::Horse => &DIAGONALS,
        PieceType::Rook | PieceType::Dragon => &ORTHOGONALS,
        _ => &[],
    }
}

/// 把先手视角的偏移转成 color 的实际偏移（自逆）
#[inline]
fn orient(color: Color, (dr, dc): (i8, i8)) -> (i8, i8) {
    (-dr * color.forward(), dc)
}

/// 走到 to 后是否再也无法移动（必须升变）
#[inline]
fn must_promote(pt: PieceType, to: Square, color: Color) -> bool {
    let adv = to.advancement(color);
    match pt {
        PieceType::Pawn | PieceType::Lance => adv == 8,
        PieceType::Knight => adv >= 7,
        _ => false,
    }
}

/// 撤销信息
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    mv: Move,
    moved: Option<Piece>,
    captured: Option<Piece>,
}

/// 将棋棋盘
#[derive(Clone)]
pub struct Board {
    /// 81 个格子，索引 = row * 9 + col
    squares: [Option<Piece>; SQUARE_COUNT],
    /// 持驹 [color][hand_index]
    hands: [[u8; 7]; 2],
    turn: Color,
    move_number: u32,
    /// 缓存王的位置
    king_pos: [Option<Square>; 2],
}

impl Board {
    /// 初始局面
    pub fn startpos() -> Board {
        match Board::from_sfen(STARTPOS) {
            Ok(board) => board,
            Err(e) => unreachable!("built-in start position must parse: {}", e),
        }
    }

    /// 从 SFEN 字符串创建棋盘
    pub fn from_sfen(sfen: &str) -> Result<Board, SfenError> {
        let state = parse_sfen(sfen)?;
        let mut squares = [None; SQUARE_COUNT];
        let mut king_pos = [None; 2];

        for (sq, piece) in state.pieces {
            if piece.piece_type == PieceType::King {
                king_pos[piece.color.index()] = Some(sq);
            }
            squares[sq.to_index()] = Some(piece);
        }

        Ok(Board {
            squares,
            hands: state.hands,
            turn: state.turn,
            move_number: state.move_number,
            king_pos,
        })
    }

    /// 生成 SFEN
    pub fn to_sfen(&self) -> String {
        to_sfen(&self.squares, &self.hands, self.turn, self.move_number)
    }

    #[inline]
    pub fn current_turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn get_piece(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.to_index()]
    }

    /// 获取所有棋子
    pub fn get_all_pieces(&self, color: Option<Color>) -> Vec<(Square, Piece)> {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (Square::from_index(i), p)))
            .filter(|(_, p)| color.map_or(true, |c| p.color == c))
            .collect()
    }

    #[inline]
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.king_pos[color.index()]
    }

    /// 持驹数量
    #[inline]
    pub fn hand(&self, color: Color, pt: PieceType) -> u8 {
        pt.hand_index().map_or(0, |idx| self.hands[color.index()][idx])
    }

    /// 执行走法，返回撤销信息
    pub fn make_move(&mut self, mv: &Move) -> Undo {
        let color = self.turn;
        let mut undo = Undo {
            mv: *mv,
            moved: None,
            captured: None,
        };

        match *mv {
            Move::Normal { from, to, promote } => {
                if let Some(piece) = self.squares[from.to_index()].take() {
                    let captured = self.squares[to.to_index()].take();
                    if let Some(cap) = captured {
                        if let Some(idx) = cap.piece_type.unpromote().hand_index() {
                            self.hands[color.index()][idx] += 1;
                        }
                        if cap.piece_type == PieceType::King {
                            self.king_pos[cap.color.index()] = None;
                        }
                    }

                    let piece_type = if promote {
                        piece.piece_type.promote().unwrap_or(piece.piece_type)
                    } else {
                        piece.piece_type
                    };
                    if piece_type == PieceType::King {
                        self.king_pos[color.index()] = Some(to);
                    }
                    self.squares[to.to_index()] = Some(Piece::new(piece_type, color));

                    undo.moved = Some(piece);
                    undo.captured = captured;
                }
            }
            Move::Drop { piece_type, to } => {
                if let Some(idx) = piece_type.hand_index() {
                    self.hands[color.index()][idx] = self.hands[color.index()][idx].saturating_sub(1);
                }
                self.squares[to.to_index()] = Some(Piece::new(piece_type, color));
            }
        }

        self.turn = color.opposite();
        self.move_number += 1;
        undo
    }

    /// 撤销走法
    pub fn undo_move(&mut self, undo: Undo) {
        self.turn = self.turn.opposite();
        self.move_number -= 1;
        let color = self.turn;

        match undo.mv {
            Move::Normal { from, to, .. } => {
                if let Some(piece) = undo.moved {
                    self.squares[from.to_index()] = Some(piece);
                    self.squares[to.to_index()] = undo.captured;
                    if piece.piece_type == PieceType::King {
                        self.king_pos[color.index()] = Some(from);
                    }
                    if let Some(cap) = undo.captured {
                        if let Some(idx) = cap.piece_type.unpromote().hand_index() {
                            self.hands[color.index()][idx] -= 1;
                        }
                        if cap.piece_type == PieceType::King {
                            self.king_pos[cap.color.index()] = Some(to);
                        }
                    }
                }
            }
            Move::Drop { piece_type, to } => {
                self.squares[to.to_index()] = None;
                if let Some(idx) = piece_type.hand_index() {
                    self.hands[color.index()][idx] += 1;
                }
            }
        }
    }

    /// 某格棋子的伪合法目标格
    pub fn get_destinations(&self, from: Square) -> Vec<Square> {
        let piece = match self.get_piece(from) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let mut targets = Vec::with_capacity(16);

        for &step in step_offsets(piece.piece_type) {
            let (dr, dc) = orient(piece.color, step);
            let to = from.offset(dr, dc);
            if to.is_valid() && self.get_piece(to).map_or(true, |t| t.color != piece.color) {
                targets.push(to);
            }
        }

        for &dir in slide_dirs(piece.piece_type) {
            let (dr, dc) = orient(piece.color, dir);
            let mut to = from.offset(dr, dc);
            while to.is_valid() {
                match self.get_piece(to) {
                    None => targets.push(to),
                    Some(target) => {
                        if target.color != piece.color {
                            targets.push(to);
                        }
                        break;
                    }
                }
                to = to.offset(dr, dc);
            }
        }

        targets
    }

    /// 检测某格是否被 attacker 攻击
    pub fn is_square_attacked(&self, target: Square, attacker: Color) -> bool {
        // 八个方向：相邻的单步攻击，或更远的滑行攻击
        for (dr, dc) in KING_STEPS {
            let mut sq = target.offset(dr, dc);
            let mut distance = 1;
            while sq.is_valid() {
                if let Some(piece) = self.get_piece(sq) {
                    if piece.color == attacker {
                        let rel = orient(attacker, (-dr, -dc));
                        if distance == 1 && step_offsets(piece.piece_type).contains(&rel) {
                            return true;
                        }
                        if slide_dirs(piece.piece_type).contains(&rel) {
                            return true;
                        }
                    }
                    break;
                }
                sq = sq.offset(dr, dc);
                distance += 1;
            }
        }

        // 桂马
        for step in KNIGHT_STEPS {
            let (dr, dc) = orient(attacker, step);
            let sq = target.offset(-dr, -dc);
            if let Some(piece) = self.get_piece(sq) {
                if piece.color == attacker && piece.piece_type == PieceType::Knight {
                    return true;
                }
            }
        }

        false
    }

    /// 检查是否被将军
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// 该列是否已有己方未成的步（二步）
    fn has_pawn_on_file(&self, color: Color, col: i8) -> bool {
        (0..9).any(|row| {
            self.get_piece(Square::new(row, col)) == Some(Piece::new(PieceType::Pawn, color))
        })
    }

    /// 盘上棋子的伪合法走法（含升变选项）
    fn board_moves(&self, color: Color, moves: &mut Vec<Move>) {
        for idx in 0..SQUARE_COUNT {
            let piece = match self.squares[idx] {
                Some(p) if p.color == color => p,
                _ => continue,
            };
            let from = Square::from_index(idx);

            for to in self.get_destinations(from) {
                let can_promote = piece.piece_type.can_promote()
                    && (from.in_promotion_zone(color) || to.in_promotion_zone(color));
                if can_promote {
                    moves.push(Move::normal(from, to, true));
                }
                if !must_promote(piece.piece_type, to, color) {
                    moves.push(Move::normal(from, to, false));
                }
            }
        }
    }

    /// 打入的伪合法走法（已排除二步、无处可走的打入）
    fn drop_moves(&self, color: Color, moves: &mut Vec<Move>) {
        for pt in HAND_TYPES {
            if self.hand(color, pt) == 0 {
                continue;
            }
            for idx in 0..SQUARE_COUNT {
                if self.squares[idx].is_some() {
                    continue;
                }
                let to = Square::from_index(idx);
                if must_promote(pt, to, color) {
                    continue;
                }
                if pt == PieceType::Pawn && self.has_pawn_on_file(color, to.col) {
                    continue;
                }
                moves.push(Move::drop(pt, to));
            }
        }
    }

    fn pseudo_legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(128);
        self.board_moves(color, &mut moves);
        self.drop_moves(color, &mut moves);
        moves
    }

    /// 走法是否合法（不送将、不打步诘）
    fn is_legal(&self, mv: &Move) -> bool {
        let color = self.turn;
        let mut next = self.clone();
        next.make_move(mv);
        if next.is_in_check(color) {
            return false;
        }

        if let Move::Drop {
            piece_type: PieceType::Pawn,
            ..
        } = mv
        {
            let enemy = color.opposite();
            if next.is_in_check(enemy) && !next.has_board_evasion(enemy) {
                return false;
            }
        }
        true
    }

    /// 是否存在盘上走法可以解除将军（用于打步诘判断，打入无法解除步的将军）
    fn has_board_evasion(&self, color: Color) -> bool {
        let mut moves = Vec::with_capacity(64);
        self.board_moves(color, &mut moves);
        moves.iter().any(|mv| {
            let mut next = self.clone();
            next.make_move(mv);
            !next.is_in_check(color)
        })
    }

    /// 获取所有合法走法
    pub fn get_legal_moves(&self) -> Vec<Move> {
        if self.find_king(self.turn).is_none() {
            return Vec::new();
        }
        self.pseudo_legal_moves(self.turn)
            .into_iter()
            .filter(|mv| self.is_legal(mv))
            .collect()
    }

    /// 是否至少有一个合法走法
    pub fn has_legal_moves(&self) -> bool {
        if self.find_king(self.turn).is_none() {
            return false;
        }
        self.pseudo_legal_moves(self.turn)
            .iter()
            .any(|mv| self.is_legal(mv))
    }

    /// 获取所有合法走法（USI 字符串）
    pub fn get_legal_moves_str(&self) -> Vec<String> {
        self.get_legal_moves().iter().map(|m| m.to_usi()).collect()
    }

    /// 按 USI 查找合法走法
    pub fn find_legal_move(&self, usi: &str) -> Option<Move> {
        let mv = Move::from_usi(usi).ok()?;
        self.get_legal_moves().into_iter().find(|m| *m == mv)
    }

    /// 判断游戏结果
    pub fn get_game_result(&self) -> GameResult {
        if self.find_king(Color::Black).is_none() {
            return GameResult::WhiteWin;
        }
        if self.find_king(Color::White).is_none() {
            return GameResult::BlackWin;
        }

        if self.has_legal_moves() {
            return GameResult::Ongoing;
        }
        if self.is_in_check(self.turn) {
            match self.turn {
                Color::Black => GameResult::WhiteWin,
                Color::White => GameResult::BlackWin,
            }
        } else {
            GameResult::Draw
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::startpos()
    }
}

impl Rules for Board {
    type Undo = Undo;

    fn side_to_move(&self) -> Color {
        self.turn
    }

    fn move_number(&self) -> u32 {
        self.move_number
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.get_legal_moves()
    }

    fn make_move(&mut self, mv: &Move) -> Undo {
        Board::make_move(self, mv)
    }

    fn undo_move(&mut self, undo: Undo) {
        Board::undo_move(self, undo)
    }

    fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.get_piece(sq)
    }

    fn hand_count(&self, color: Color, piece_type: PieceType) -> u8 {
        self.hand(color, piece_type)
    }

    fn destinations(&self, sq: Square) -> Vec<Square> {
        self.get_destinations(sq)
    }

    fn is_check(&self) -> bool {
        self.is_in_check(self.turn)
    }

    fn is_checkmate(&self) -> bool {
        self.is_in_check(self.turn) && !self.has_legal_moves()
    }

    fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.turn) && !self.has_legal_moves()
    }

    fn is_game_over(&self) -> bool {
        !self.has_legal_moves()
    }

    fn to_sfen(&self) -> String {
        Board::to_sfen(self)
    }
}

/// 从 SFEN 获取所有合法走法
pub fn get_legal_moves_from_sfen(sfen: &str) -> Result<Vec<String>, SfenError> {
    let board = Board::from_sfen(sfen)?;
    Ok(board.get_legal_moves_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;

    #[test]
    fn test_initial_board() {
        let board = Board::startpos();
        assert_eq!(board.get_all_pieces(Some(Color::Black)).len(), 20);
        assert_eq!(board.get_all_pieces(Some(Color::White)).len(), 20);
        assert_eq!(board.current_turn(), Color::Black);
        assert_eq!(board.find_king(Color::Black), Some(Square::new(8, 4)));
        assert_eq!(board.find_king(Color::White), Some(Square::new(0, 4)));
    }

    #[test]
    fn test_legal_moves_initial() {
        let board = Board::startpos();
        // 初始局面先手有 30 个合法走法
        assert_eq!(board.get_legal_moves().len(), 30);
        assert!(board.find_legal_move("7g7f").is_some());
        assert!(board.find_legal_move("2h2c").is_none());
    }

    #[test]
    fn test_make_undo_restores_position() {
        let mut board = Board::from_sfen(test_positions::MID_1).unwrap();
        let before = board.to_sfen();
        for mv in board.get_legal_moves() {
            let undo = board.make_move(&mv);
            assert_ne!(board.to_sfen(), before);
            board.undo_move(undo);
            assert_eq!(board.to_sfen(), before, "undo of {} did not restore", mv);
        }
    }

    #[test]
    fn test_capture_goes_to_hand_unpromoted() {
        let mut board = Board::from_sfen("4k4/9/4+r4/9/9/9/9/4R4/4K4 b - 1").unwrap();
        let mv = board.find_legal_move("5h5c").unwrap();
        let undo = board.make_move(&mv);
        assert_eq!(board.hand(Color::Black, PieceType::Rook), 1);
        board.undo_move(undo);
        assert_eq!(board.hand(Color::Black, PieceType::Rook), 0);
        assert_eq!(
            board.get_piece(Square::new(2, 4)),
            Some(Piece::new(PieceType::Dragon, Color::White))
        );
    }

    #[test]
    fn test_check_detection() {
        let board = Board::from_sfen(test_positions::ONE_EVASION).unwrap();
        assert!(board.is_in_check(Color::Black));
        assert!(!board.is_in_check(Color::White));

        // 桂马将军
        let board = Board::from_sfen("9/9/9/9/4k4/9/3N5/9/4K4 w - 1").unwrap();
        assert!(board.is_in_check(Color::White));
    }

    #[test]
    fn test_single_evasion() {
        let board = Board::from_sfen(test_positions::ONE_EVASION).unwrap();
        assert_eq!(board.get_legal_moves_str(), vec!["8g9e".to_string()]);
    }

    #[test]
    fn test_forced_promotion() {
        let board = Board::from_sfen("k8/4P4/9/9/9/9/9/9/4K4 b - 1").unwrap();
        let moves = board.get_legal_moves_str();
        assert!(moves.contains(&"5b5a+".to_string()));
        assert!(!moves.contains(&"5b5a".to_string()));
    }

    #[test]
    fn test_drop_restrictions() {
        // 二步：5 筋已有步
        let board = Board::from_sfen("4k4/9/9/9/9/9/4P4/9/4K4 b PNL 1").unwrap();
        let moves = board.get_legal_moves_str();
        assert!(!moves.contains(&"P*5e".to_string()));
        assert!(moves.contains(&"P*4e".to_string()));
        // 底线不能打步、香，桂不能打在前两段
        assert!(!moves.contains(&"P*4a".to_string()));
        assert!(!moves.contains(&"L*4a".to_string()));
        assert!(!moves.contains(&"N*4b".to_string()));
        assert!(moves.contains(&"N*4c".to_string()));
    }

    #[test]
    fn test_drop_pawn_mate_forbidden() {
        let board = Board::from_sfen(test_positions::DROP_PAWN_MATE).unwrap();
        let moves = board.get_legal_moves_str();
        assert!(!moves.contains(&"P*1b".to_string()));
        assert!(moves.contains(&"P*2b".to_string()));

        // 没有金保护时步可以被吃，打步将军合法
        let board = Board::from_sfen("8k/9/9/9/9/9/9/9/K6L1 b P 1").unwrap();
        assert!(board.find_legal_move("P*1b").is_some());
    }

    #[test]
    fn test_game_results() {
        let board = Board::from_sfen(test_positions::CHECKMATED).unwrap();
        assert!(board.is_checkmate());
        assert_eq!(board.get_game_result(), GameResult::BlackWin);

        let board = Board::from_sfen(test_positions::STALEMATE).unwrap();
        assert!(board.is_stalemate());
        assert_eq!(board.get_game_result(), GameResult::Draw);

        assert_eq!(Board::startpos().get_game_result(), GameResult::Ongoing);
    }

    #[test]
    fn test_position_index() {
        for idx in 0..SQUARE_COUNT {
            assert_eq!(Square::from_index(idx).to_index(), idx);
        }
    }
}

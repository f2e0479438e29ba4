//! 将棋核心类型定义
//!
//! 坐标约定：`Square { row, col }`，row 0 是段 `a`（后手底线），row 8 是段 `i`
//! （先手底线）；col 0 是筋 9，col 8 是筋 1。先手（Black）向 row 0 方向前进。

use std::fmt;
use thiserror::Error;

/// 棋盘边长
pub const BOARD_SIZE: i8 = 9;

/// 格子总数
pub const SQUARE_COUNT: usize = 81;

/// 阵营：先手 Black（▲），后手 White（△）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// 获取对方阵营
    pub fn opposite(&self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// 前进方向（row 增量）
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            Color::Black => -1,
            Color::White => 1,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// 从 SFEN 回合字符解析
    pub fn from_sfen_char(c: char) -> Option<Color> {
        match c {
            'b' => Some(Color::Black),
            'w' => Some(Color::White),
            _ => None,
        }
    }

    pub fn to_sfen_char(&self) -> char {
        match self {
            Color::Black => 'b',
            Color::White => 'w',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// 棋子类型（含成驹）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    /// 步
    Pawn,
    /// 香车
    Lance,
    /// 桂马
    Knight,
    /// 银将
    Silver,
    /// 金将
    Gold,
    /// 角行
    Bishop,
    /// 飞车
    Rook,
    /// 王将
    King,
    /// と金
    ProPawn,
    /// 成香
    ProLance,
    /// 成桂
    ProKnight,
    /// 成银
    ProSilver,
    /// 龙马
    Horse,
    /// 龙王
    Dragon,
}

/// 可以持驹的类型（打入顺序与 SFEN 持驹顺序一致）
pub const HAND_TYPES: [PieceType; 7] = [
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Gold,
    PieceType::Silver,
    PieceType::Knight,
    PieceType::Lance,
    PieceType::Pawn,
];

/// 所有棋子类型
pub const ALL_PIECE_TYPES: [PieceType; 14] = [
    PieceType::Pawn,
    PieceType::Lance,
    PieceType::Knight,
    PieceType::Silver,
    PieceType::Gold,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::King,
    PieceType::ProPawn,
    PieceType::ProLance,
    PieceType::ProKnight,
    PieceType::ProSilver,
    PieceType::Horse,
    PieceType::Dragon,
];

impl PieceType {
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            PieceType::Pawn => 0,
            PieceType::Lance => 1,
            PieceType::Knight => 2,
            PieceType::Silver => 3,
            PieceType::Gold => 4,
            PieceType::Bishop => 5,
            PieceType::Rook => 6,
            PieceType::King => 7,
            PieceType::ProPawn => 8,
            PieceType::ProLance => 9,
            PieceType::ProKnight => 10,
            PieceType::ProSilver => 11,
            PieceType::Horse => 12,
            PieceType::Dragon => 13,
        }
    }

    /// 持驹索引（只对未成、非王的类型有意义）
    #[inline]
    pub fn hand_index(&self) -> Option<usize> {
        match self {
            PieceType::Pawn => Some(0),
            PieceType::Lance => Some(1),
            PieceType::Knight => Some(2),
            PieceType::Silver => Some(3),
            PieceType::Gold => Some(4),
            PieceType::Bishop => Some(5),
            PieceType::Rook => Some(6),
            _ => None,
        }
    }

    /// 升变后的类型
    pub fn promote(&self) -> Option<PieceType> {
        match self {
            PieceType::Pawn => Some(PieceType::ProPawn),
            PieceType::Lance => Some(PieceType::ProLance),
            PieceType::Knight => Some(PieceType::ProKnight),
            PieceType::Silver => Some(PieceType::ProSilver),
            PieceType::Bishop => Some(PieceType::Horse),
            PieceType::Rook => Some(PieceType::Dragon),
            _ => None,
        }
    }

    /// 还原为未成类型（被吃进持驹时使用）
    pub fn unpromote(&self) -> PieceType {
        match self {
            PieceType::ProPawn => PieceType::Pawn,
            PieceType::ProLance => PieceType::Lance,
            PieceType::ProKnight => PieceType::Knight,
            PieceType::ProSilver => PieceType::Silver,
            PieceType::Horse => PieceType::Bishop,
            PieceType::Dragon => PieceType::Rook,
            other => *other,
        }
    }

    #[inline]
    pub fn is_promoted(&self) -> bool {
        self.unpromote() != *self
    }

    #[inline]
    pub fn can_promote(&self) -> bool {
        self.promote().is_some()
    }

    /// 棋子价值（步 = 1）
    pub fn value(&self) -> f64 {
        match self {
            PieceType::Pawn => 1.0,
            PieceType::Lance => 3.0,
            PieceType::Knight => 4.0,
            PieceType::Silver => 5.0,
            PieceType::Gold => 6.0,
            PieceType::Bishop => 8.0,
            PieceType::Rook => 10.0,
            PieceType::King => 1000.0,
            PieceType::ProPawn => 12.0,
            PieceType::ProLance => 10.0,
            PieceType::ProKnight => 10.0,
            PieceType::ProSilver => 10.0,
            PieceType::Horse => 12.0,
            PieceType::Dragon => 12.0,
        }
    }

    /// 从 SFEN 字母解析（不含 `+`）
    pub fn from_sfen_char(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'L' => Some(PieceType::Lance),
            'N' => Some(PieceType::Knight),
            'S' => Some(PieceType::Silver),
            'G' => Some(PieceType::Gold),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// SFEN 字母（大写，成驹返回基础字母）
    pub fn to_sfen_char(&self) -> char {
        match self.unpromote() {
            PieceType::Pawn => 'P',
            PieceType::Lance => 'L',
            PieceType::Knight => 'N',
            PieceType::Silver => 'S',
            PieceType::Gold => 'G',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            _ => 'K',
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_promoted() {
            write!(f, "+{}", self.to_sfen_char())
        } else {
            write!(f, "{}", self.to_sfen_char())
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Self {
        Piece { piece_type, color }
    }
}

/// 棋盘格子 (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Self {
        Square { row, col }
    }

    /// 检查是否在棋盘内
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    #[inline]
    pub fn offset(&self, row_delta: i8, col_delta: i8) -> Square {
        Square {
            row: self.row + row_delta,
            col: self.col + col_delta,
        }
    }

    #[inline]
    pub fn to_index(&self) -> usize {
        (self.row as usize) * 9 + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Square {
        Square {
            row: (idx / 9) as i8,
            col: (idx % 9) as i8,
        }
    }

    /// 上下翻转（换到对方视角的同一段）
    #[inline]
    pub fn mirror(&self) -> Square {
        Square::new(BOARD_SIZE - 1 - self.row, self.col)
    }

    /// 180 度旋转
    #[inline]
    pub fn rotate(&self) -> Square {
        Square::new(BOARD_SIZE - 1 - self.row, BOARD_SIZE - 1 - self.col)
    }

    /// 从己方看的前进段数（0 = 己方底线，8 = 对方底线）
    #[inline]
    pub fn advancement(&self, color: Color) -> i8 {
        match color {
            Color::Black => BOARD_SIZE - 1 - self.row,
            Color::White => self.row,
        }
    }

    /// 是否在 color 的敌阵（升变区，前方三段）
    #[inline]
    pub fn in_promotion_zone(&self, color: Color) -> bool {
        self.advancement(color) >= 6
    }

    /// 是否在中央 3x3
    #[inline]
    pub fn is_center(&self) -> bool {
        (3..=5).contains(&self.row) && (3..=5).contains(&self.col)
    }

    /// 从 USI 坐标解析（如 "7g"）
    pub fn from_usi(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = match bytes[0] {
            b'1'..=b'9' => (bytes[0] - b'0') as i8,
            _ => return None,
        };
        let row = match bytes[1] {
            b'a'..=b'i' => (bytes[1] - b'a') as i8,
            _ => return None,
        };
        Some(Square::new(row, BOARD_SIZE - file))
    }

    /// 转换为 USI 坐标
    pub fn to_usi(&self) -> String {
        let file = (BOARD_SIZE - self.col) as u8;
        format!("{}{}", (b'0' + file) as char, (b'a' + self.row as u8) as char)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_usi())
    }
}

/// USI 走法解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid USI move: {0}")]
    Malformed(String),
    #[error("invalid square in move: {0}")]
    BadSquare(String),
    #[error("invalid drop piece: {0}")]
    BadDropPiece(char),
}

/// 走法：盘上移动或打入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Normal {
        from: Square,
        to: Square,
        promote: bool,
    },
    Drop {
        piece_type: PieceType,
        to: Square,
    },
}

impl Move {
    pub fn normal(from: Square, to: Square, promote: bool) -> Self {
        Move::Normal { from, to, promote }
    }

    pub fn drop(piece_type: PieceType, to: Square) -> Self {
        Move::Drop { piece_type, to }
    }

    #[inline]
    pub fn to(&self) -> Square {
        match self {
            Move::Normal { to, .. } | Move::Drop { to, .. } => *to,
        }
    }

    #[inline]
    pub fn from(&self) -> Option<Square> {
        match self {
            Move::Normal { from, .. } => Some(*from),
            Move::Drop { .. } => None,
        }
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        matches!(self, Move::Normal { promote: true, .. })
    }

    /// 从 USI 字符串解析
    ///
    /// 格式：
    /// - 盘上移动：`7g7f`
    /// - 升变：`8h2b+`
    /// - 打入：`P*5e`
    pub fn from_usi(s: &str) -> Result<Move, MoveParseError> {
        let s = s.trim();
        if let Some((piece, to)) = s.split_once('*') {
            let mut chars = piece.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(MoveParseError::Malformed(s.to_string())),
            };
            let piece_type = PieceType::from_sfen_char(c)
                .filter(|pt| pt.hand_index().is_some() && c.is_ascii_uppercase())
                .ok_or(MoveParseError::BadDropPiece(c))?;
            let to = Square::from_usi(to).ok_or_else(|| MoveParseError::BadSquare(to.to_string()))?;
            return Ok(Move::drop(piece_type, to));
        }

        let (body, promote) = match s.strip_suffix('+') {
            Some(body) => (body, true),
            None => (s, false),
        };
        if body.len() != 4 || !body.is_ascii() {
            return Err(MoveParseError::Malformed(s.to_string()));
        }
        let from = Square::from_usi(&body[0..2])
            .ok_or_else(|| MoveParseError::BadSquare(body[0..2].to_string()))?;
        let to = Square::from_usi(&body[2..4])
            .ok_or_else(|| MoveParseError::BadSquare(body[2..4].to_string()))?;
        Ok(Move::normal(from, to, promote))
    }

    /// 转换为 USI 字符串
    pub fn to_usi(&self) -> String {
        match self {
            Move::Normal { from, to, promote } => {
                let suffix = if *promote { "+" } else { "" };
                format!("{}{}{}", from.to_usi(), to.to_usi(), suffix)
            }
            Move::Drop { piece_type, to } => {
                format!("{}*{}", piece_type.to_sfen_char(), to.to_usi())
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_usi())
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Ongoing,
    BlackWin,
    WhiteWin,
    Draw,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameResult::Ongoing => "ongoing",
            GameResult::BlackWin => "black_win",
            GameResult::WhiteWin => "white_win",
            GameResult::Draw => "draw",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_from_usi() {
        assert_eq!(Square::from_usi("9a"), Some(Square::new(0, 0)));
        assert_eq!(Square::from_usi("5e"), Some(Square::new(4, 4)));
        assert_eq!(Square::from_usi("1i"), Some(Square::new(8, 8)));
        assert_eq!(Square::from_usi("7g"), Some(Square::new(6, 2)));
        assert_eq!(Square::from_usi("0a"), None);
        assert_eq!(Square::from_usi("5j"), None);
    }

    #[test]
    fn test_square_to_usi() {
        assert_eq!(Square::new(0, 0).to_usi(), "9a");
        assert_eq!(Square::new(8, 8).to_usi(), "1i");
        assert_eq!(Square::new(6, 2).to_usi(), "7g");
    }

    #[test]
    fn test_move_from_usi() {
        let m = Move::from_usi("7g7f").unwrap();
        assert_eq!(
            m,
            Move::normal(Square::new(6, 2), Square::new(5, 2), false)
        );

        let m = Move::from_usi("8h2b+").unwrap();
        assert!(m.is_promotion());
        assert_eq!(m.to_usi(), "8h2b+");

        let m = Move::from_usi("P*5e").unwrap();
        assert_eq!(m, Move::drop(PieceType::Pawn, Square::new(4, 4)));
        assert_eq!(m.from(), None);

        assert!(Move::from_usi("K*5e").is_err());
        assert!(Move::from_usi("7g7").is_err());
        assert!(Move::from_usi("p*5e").is_err());
    }

    #[test]
    fn test_promotion_table() {
        for pt in ALL_PIECE_TYPES {
            if let Some(promoted) = pt.promote() {
                assert!(promoted.is_promoted());
                assert_eq!(promoted.unpromote(), pt);
                assert!(promoted.value() > pt.value());
            }
        }
        assert!(!PieceType::Gold.can_promote());
        assert!(!PieceType::King.can_promote());
    }

    #[test]
    fn test_promotion_zone() {
        assert!(Square::new(2, 4).in_promotion_zone(Color::Black));
        assert!(!Square::new(3, 4).in_promotion_zone(Color::Black));
        assert!(Square::new(6, 4).in_promotion_zone(Color::White));
        assert!(!Square::new(5, 4).in_promotion_zone(Color::White));
    }
}

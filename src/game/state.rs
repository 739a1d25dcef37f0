use super::action::Direction;

/// A position on the playing field, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a direction
    pub fn stepped(&self, direction: Direction, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * cell_size, dy * cell_size)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with its body trailing behind the head
    pub fn new(head: Position, direction: Direction, length: usize, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length as i32)
            .map(|i| head.moved_by(-dx * cell_size * i, -dy * cell_size * i))
            .collect();

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Option<Position> {
        self.body.last().copied()
    }

    /// Segments a head moving this step could run into
    ///
    /// The tail is excluded because it moves away on a non-growing step, and a
    /// growing step can only happen on the food cell, which never holds a
    /// segment.
    pub fn blocking_segments(&self) -> &[Position] {
        &self.body[..self.body.len().saturating_sub(1)]
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Reason an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Episode ran past its step budget
    StepBudget,
}

/// Complete game state
///
/// This is everything a view needs to draw the game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
    pub score: u32,
    pub steps: u32,
    pub is_alive: bool,
}

impl GameState {
    pub fn new(snake: Snake, food: Position, width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            snake,
            food,
            width,
            height,
            cell_size,
            score: 0,
            steps: 0,
            is_alive: true,
        }
    }

    /// Check if a position lies on the field
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x <= self.width - self.cell_size
            && pos.y >= 0
            && pos.y <= self.height - self.cell_size
    }

    /// What the head would hit if it moved onto `pos` this step
    pub fn collision_at(&self, pos: Position) -> Option<CollisionType> {
        if !self.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if self.snake.blocking_segments().contains(&pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(pos)
    }
}

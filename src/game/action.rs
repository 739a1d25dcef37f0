use super::error::GameError;

/// Direction the snake is heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// Headings in clockwise order, starting from Right (y grows downward)
    const CLOCKWISE: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    fn clockwise_index(&self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Heading after applying a relative action
    pub fn turned(&self, action: RelativeAction) -> Direction {
        let offset = match action {
            RelativeAction::Straight => 0,
            RelativeAction::Right => 1,
            RelativeAction::Left => 3,
        };
        Self::CLOCKWISE[(self.clockwise_index() + offset) % 4]
    }

    /// Unit step (dx, dy) in grid cells
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Move relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeAction {
    Straight,
    Left,
    Right,
}

impl RelativeAction {
    /// All actions, ordered by their one-hot index
    pub const ALL: [RelativeAction; 3] = [
        RelativeAction::Straight,
        RelativeAction::Left,
        RelativeAction::Right,
    ];

    pub const COUNT: usize = 3;

    pub fn index(&self) -> usize {
        match self {
            RelativeAction::Straight => 0,
            RelativeAction::Left => 1,
            RelativeAction::Right => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, GameError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| GameError::InvalidAction(format!("action index {index} out of range")))
    }

    pub fn one_hot(&self) -> [f32; Self::COUNT] {
        let mut encoded = [0.0; Self::COUNT];
        encoded[self.index()] = 1.0;
        encoded
    }

    /// Decode a one-hot vector, rejecting anything but exactly one set bit
    pub fn from_one_hot(encoded: &[f32]) -> Result<Self, GameError> {
        if encoded.len() != Self::COUNT {
            return Err(GameError::InvalidAction(format!(
                "expected {} elements, got {}",
                Self::COUNT,
                encoded.len()
            )));
        }

        let mut hot = None;
        for (idx, &value) in encoded.iter().enumerate() {
            if value == 1.0 {
                if hot.is_some() {
                    return Err(GameError::InvalidAction(format!(
                        "multiple bits set in {encoded:?}"
                    )));
                }
                hot = Some(idx);
            } else if value != 0.0 {
                return Err(GameError::InvalidAction(format!(
                    "non-binary value {value} in {encoded:?}"
                )));
            }
        }

        match hot {
            Some(idx) => Self::from_index(idx),
            None => Err(GameError::InvalidAction(format!("no bit set in {encoded:?}"))),
        }
    }
}

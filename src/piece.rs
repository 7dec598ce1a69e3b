//! Piece catalog and the active piece cloned from it.

use crate::vector::Vector;
use rand::Rng;

/// Immutable catalog entry. Offsets are relative to the piece anchor.
#[derive(Debug)]
pub struct PieceTemplate {
    pub shape: &'static [Vector],
    /// Palette index 1..=7; 0 only for the placeholder.
    pub color: u8,
    pub rotatable: bool,
}

/// Catalog index of the pre-start placeholder. Never drawn at random.
pub const PLACEHOLDER: usize = 0;

const fn v(row: i32, col: i32) -> Vector {
    Vector::new(row, col)
}

/// Placeholder, then I, O, T, S, Z, J, L. Pivot at (0, 0); spawn orientation occupies rows 0..=1.
pub static CATALOG: [PieceTemplate; 8] = [
    PieceTemplate {
        shape: &[v(0, 0)],
        color: 0,
        rotatable: false,
    },
    // I
    PieceTemplate {
        shape: &[v(0, -1), v(0, 0), v(0, 1), v(0, 2)],
        color: 1,
        rotatable: true,
    },
    // O
    PieceTemplate {
        shape: &[v(0, 0), v(0, 1), v(1, 0), v(1, 1)],
        color: 2,
        rotatable: false,
    },
    // T
    PieceTemplate {
        shape: &[v(0, -1), v(0, 0), v(0, 1), v(1, 0)],
        color: 3,
        rotatable: true,
    },
    // S
    PieceTemplate {
        shape: &[v(0, 0), v(0, 1), v(1, -1), v(1, 0)],
        color: 4,
        rotatable: true,
    },
    // Z
    PieceTemplate {
        shape: &[v(0, -1), v(0, 0), v(1, 0), v(1, 1)],
        color: 5,
        rotatable: true,
    },
    // J
    PieceTemplate {
        shape: &[v(0, -1), v(0, 0), v(0, 1), v(1, 1)],
        color: 6,
        rotatable: true,
    },
    // L
    PieceTemplate {
        shape: &[v(0, -1), v(0, 0), v(0, 1), v(1, -1)],
        color: 7,
        rotatable: true,
    },
];

/// Active piece: owns its shape so rotation never touches the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub shape: Vec<Vector>,
    pub color: u8,
    pub rotatable: bool,
}

impl Piece {
    pub fn from_template(template: &PieceTemplate) -> Self {
        Self {
            shape: template.shape.to_vec(),
            color: template.color,
            rotatable: template.rotatable,
        }
    }

    pub fn placeholder() -> Self {
        Self::from_template(&CATALOG[PLACEHOLDER])
    }

    /// Uniform draw over the playable templates (placeholder excluded).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let idx = rng.random_range(PLACEHOLDER + 1..CATALOG.len());
        Self::from_template(&CATALOG[idx])
    }

    /// Quarter turn in place. Rows grow downward, so clockwise maps right to down.
    pub fn rotate(&mut self, clockwise: bool) {
        if !self.rotatable {
            return;
        }
        for offset in &mut self.shape {
            let Vector { row, col } = *offset;
            *offset = if clockwise {
                Vector::new(col, -row)
            } else {
                Vector::new(-col, row)
            };
        }
    }

    /// Undo a `rotate(clockwise)`.
    pub fn rotate_back(&mut self, clockwise: bool) {
        self.rotate(!clockwise);
    }

    /// Absolute cells when anchored at `position`.
    pub fn cells(&self, position: Vector) -> impl Iterator<Item = Vector> + '_ {
        self.shape.iter().map(move |&offset| position + offset)
    }
}
